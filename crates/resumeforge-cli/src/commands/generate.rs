//! Content generation command handlers

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use resumeforge_core::{GenerateOptions, Section, Workflow};

use crate::output::Output;

/// Generate a section; summary and skills are saved to the resume
pub async fn section(
    workflow: &Workflow,
    section: String,
    context: Option<String>,
    job_title: Option<String>,
    language: Option<String>,
    cancel: &CancellationToken,
    output: &Output,
) -> Result<()> {
    let section: Section = section.parse()?;
    let options = GenerateOptions {
        section,
        context,
        job_title,
        language,
    };

    let generated = workflow.generate_section(options, cancel).await?;
    output.print_generated(&generated.response, Some(&generated.applied));
    Ok(())
}

/// Generate a cover letter for a company
pub async fn cover_letter(
    workflow: &Workflow,
    company: String,
    job_title: Option<String>,
    language: Option<String>,
    cancel: &CancellationToken,
    output: &Output,
) -> Result<()> {
    let response = workflow
        .cover_letter(&company, job_title, language, cancel)
        .await?;
    output.print_generated(&response, None);
    Ok(())
}
