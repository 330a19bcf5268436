//! Resume editing command handlers

use anyhow::{bail, Result};

use resumeforge_core::store::split_skills;
use resumeforge_core::{
    EducationField, EntryId, ExperienceField, PersonalField, ResumeStore, StorageError,
};

use crate::editor::{confirm, edit_text};
use crate::output::Output;

/// Show the whole resume
pub fn show(store: &ResumeStore, output: &Output) -> Result<()> {
    output.print_resume(&store.resume());
    Ok(())
}

/// Set a personal info field, opening the editor when no value is given
pub fn personal_set(
    store: &mut ResumeStore,
    field: String,
    value: Option<String>,
    output: &Output,
) -> Result<()> {
    let field: PersonalField = field.parse()?;
    let value = match value {
        Some(v) => v,
        None => edit_text(store.resume().personal_info.get(field))?,
    };

    store
        .update_personal_info(field, value)
        .map_err(save_failed)?;

    output.success(&format!("Updated {}", field));
    Ok(())
}

// ==================== Experience ====================

/// Add a blank experience entry, then fill any fields given
pub fn experience_add(
    store: &mut ResumeStore,
    fields: Vec<(ExperienceField, String)>,
    output: &Output,
) -> Result<()> {
    let id = store.add_experience().map_err(save_failed)?;
    for (field, value) in fields {
        store
            .update_experience(id, field, value)
            .map_err(save_failed)?;
    }

    output.success(&format!("Added experience: {}", id));
    if let Some(entry) = store.find_experience(id) {
        output.print_experience(std::slice::from_ref(entry));
    }
    Ok(())
}

pub fn experience_set(
    store: &mut ResumeStore,
    id: String,
    field: String,
    value: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = parse_experience_id(store, &id)?;
    let field: ExperienceField = field.parse()?;
    let value = match value {
        Some(v) => v,
        None => {
            let current = store.find_experience(id).map(|e| e.get(field)).unwrap_or("");
            edit_text(current)?
        }
    };

    if !store
        .update_experience(id, field, value)
        .map_err(save_failed)?
    {
        bail!("No experience entry with ID: {}", id);
    }

    output.success(&format!("Updated experience {}", field));
    Ok(())
}

pub fn experience_remove(store: &mut ResumeStore, id: String, output: &Output) -> Result<()> {
    let id = parse_experience_id(store, &id)?;

    if output.should_prompt() {
        if let Some(entry) = store.find_experience(id) {
            println!("Delete experience: {} at {}", entry.title, entry.company);
        }
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    if !store.remove_experience(id).map_err(save_failed)? {
        bail!("No experience entry with ID: {}", id);
    }

    output.success(&format!("Deleted experience: {}", id));
    Ok(())
}

pub fn experience_list(store: &ResumeStore, output: &Output) -> Result<()> {
    output.print_experience(&store.resume().experience);
    Ok(())
}

fn parse_experience_id(store: &ResumeStore, input: &str) -> Result<EntryId> {
    let resume = store.resume();
    let candidates: Vec<_> = resume
        .experience
        .iter()
        .map(|e| (e.id, format!("{} at {}", e.title, e.company)))
        .collect();
    resolve_entry_id(input, "experience", &candidates)
}

// ==================== Education ====================

/// Add a blank education entry, then fill any fields given
pub fn education_add(
    store: &mut ResumeStore,
    fields: Vec<(EducationField, String)>,
    output: &Output,
) -> Result<()> {
    let id = store.add_education().map_err(save_failed)?;
    for (field, value) in fields {
        store
            .update_education(id, field, value)
            .map_err(save_failed)?;
    }

    output.success(&format!("Added education: {}", id));
    if let Some(entry) = store.find_education(id) {
        output.print_education(std::slice::from_ref(entry));
    }
    Ok(())
}

pub fn education_set(
    store: &mut ResumeStore,
    id: String,
    field: String,
    value: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = parse_education_id(store, &id)?;
    let field: EducationField = field.parse()?;
    let value = match value {
        Some(v) => v,
        None => {
            let current = store.find_education(id).map(|e| e.get(field)).unwrap_or("");
            edit_text(current)?
        }
    };

    if !store
        .update_education(id, field, value)
        .map_err(save_failed)?
    {
        bail!("No education entry with ID: {}", id);
    }

    output.success(&format!("Updated education {}", field));
    Ok(())
}

pub fn education_remove(store: &mut ResumeStore, id: String, output: &Output) -> Result<()> {
    let id = parse_education_id(store, &id)?;

    if output.should_prompt() {
        if let Some(entry) = store.find_education(id) {
            println!("Delete education: {} at {}", entry.degree, entry.school);
        }
        if !confirm("Are you sure?")? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    if !store.remove_education(id).map_err(save_failed)? {
        bail!("No education entry with ID: {}", id);
    }

    output.success(&format!("Deleted education: {}", id));
    Ok(())
}

pub fn education_list(store: &ResumeStore, output: &Output) -> Result<()> {
    output.print_education(&store.resume().education);
    Ok(())
}

fn parse_education_id(store: &ResumeStore, input: &str) -> Result<EntryId> {
    let resume = store.resume();
    let candidates: Vec<_> = resume
        .education
        .iter()
        .map(|e| (e.id, format!("{} at {}", e.degree, e.school)))
        .collect();
    resolve_entry_id(input, "education", &candidates)
}

// ==================== Skills / Reset ====================

/// Replace the skills list from a comma-separated argument
pub fn skills_set(store: &mut ResumeStore, skills: String, output: &Output) -> Result<()> {
    let skills = split_skills(&skills);
    let count = skills.len();
    store.update_skills(skills).map_err(save_failed)?;

    output.success(&format!("Saved {} skill(s)", count));
    Ok(())
}

pub fn skills_list(store: &ResumeStore, output: &Output) -> Result<()> {
    output.print_skills(&store.resume().skills);
    Ok(())
}

pub fn reset(store: &mut ResumeStore, output: &Output) -> Result<()> {
    if output.should_prompt() && !confirm("Erase the whole resume?")? {
        output.message("Cancelled.");
        return Ok(());
    }

    store.reset_resume().map_err(save_failed)?;

    output.success("Resume reset");
    Ok(())
}

/// Report a failed write, with a hint when the storage layer has one
fn save_failed(e: StorageError) -> anyhow::Error {
    let message = match e.hint() {
        Some(hint) => format!("Failed to save resume. {}", hint),
        None => "Failed to save resume".to_string(),
    };
    anyhow::Error::new(e).context(message)
}

/// Resolve an entry id from a full UUID or a unique prefix
fn resolve_entry_id(input: &str, kind: &str, candidates: &[(EntryId, String)]) -> Result<EntryId> {
    if let Ok(id) = input.parse::<EntryId>() {
        return Ok(id);
    }

    let matches: Vec<_> = candidates
        .iter()
        .filter(|(id, _)| id.to_string().starts_with(input))
        .collect();

    match matches.len() {
        0 => bail!("No {} entry found matching: {}", kind, input),
        1 => Ok(matches[0].0),
        _ => {
            eprintln!("Multiple {} entries match '{}':", kind, input);
            for (id, label) in &matches {
                eprintln!("  {} - {}", id, label);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
