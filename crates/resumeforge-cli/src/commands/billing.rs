//! Quota and payment command handlers

use anyhow::{bail, Result};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use resumeforge_core::{Plan, Workflow, WorkflowError};

use crate::output::Output;

/// Shown when a checkout cannot be started
const CHECKOUT_FAILED: &str = "Failed to start checkout. Please try again.";

pub async fn tokens(workflow: &Workflow, cancel: &CancellationToken, output: &Output) -> Result<()> {
    let status = workflow.token_status(cancel).await?;
    output.print_token_status(&status);
    Ok(())
}

pub fn plans(output: &Output) -> Result<()> {
    output.print_plans(Plan::ALL);
    Ok(())
}

pub async fn products(workflow: &Workflow, cancel: &CancellationToken, output: &Output) -> Result<()> {
    let products = workflow.products(cancel).await?;
    output.print_products(&products);
    Ok(())
}

/// Start a checkout for a plan and open it in the browser
pub async fn checkout(
    workflow: &Workflow,
    plan: String,
    no_open: bool,
    cancel: &CancellationToken,
    output: &Output,
) -> Result<()> {
    let plan: Plan = plan.parse()?;
    let Some(sku) = plan.sku() else {
        bail!("The {} plan needs no checkout.", plan);
    };

    let session = match workflow.checkout(&sku, cancel).await {
        Ok(session) => session,
        Err(WorkflowError::Cancelled) => return Err(WorkflowError::Cancelled.into()),
        Err(e) => {
            warn!(%sku, error = %e, "Checkout failed");
            bail!(CHECKOUT_FAILED);
        }
    };

    let opened = !no_open && output.should_prompt() && open::that(&session.checkout_url).is_ok();
    output.print_checkout(&session, opened);
    Ok(())
}
