//! Resume document store
//!
//! The `ResumeStore` owns the one resume being edited and is its only write
//! path. Every operation:
//!
//! - runs synchronously to completion (no partially applied state is visible)
//! - replaces the current snapshot with a new `Arc<Resume>` value; nested
//!   data is never mutated in place, so `Arc::ptr_eq` on two snapshots tells
//!   whether anything changed
//! - writes the full document to local storage
//!
//! Operations that match nothing (unknown entry id) keep the current snapshot
//! and skip the write.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = ResumeStore::open(&config);
//!
//! let id = store.add_experience()?;
//! store.update_experience(id, ExperienceField::Company, "Acme")?;
//!
//! let resume = store.resume();
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::models::{
    Education, EducationField, EntryId, Experience, ExperienceField, PersonalField, Resume,
    Section,
};
use crate::storage::{ResumePersistence, StorageResult};

/// Where a generated result ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedTo {
    /// Written to `personalInfo.summary`
    Summary,
    /// Replaced the skills list with this many entries
    Skills(usize),
    /// Section has no target field; the caller decides what to do with it
    NotRouted,
}

/// Owner of the resume document
pub struct ResumeStore {
    resume: Arc<Resume>,
    persistence: ResumePersistence,
    revision: u64,
}

impl ResumeStore {
    /// Open the store, restoring the persisted document
    ///
    /// Never fails: a missing or corrupt document yields an empty resume.
    pub fn open(config: &Config) -> Self {
        Self::with_persistence(ResumePersistence::new(config))
    }

    pub fn with_persistence(persistence: ResumePersistence) -> Self {
        let resume = persistence.load_or_default();
        Self {
            resume: Arc::new(resume),
            persistence,
            revision: 0,
        }
    }

    /// Current snapshot
    ///
    /// Snapshots are immutable; later mutations produce new ones.
    pub fn resume(&self) -> Arc<Resume> {
        Arc::clone(&self.resume)
    }

    /// Number of effective mutations since the store was opened
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn find_experience(&self, id: EntryId) -> Option<&Experience> {
        self.resume.experience(id)
    }

    pub fn find_education(&self, id: EntryId) -> Option<&Education> {
        self.resume.education(id)
    }

    // ==================== Personal Info ====================

    /// Replace one personal info field
    ///
    /// The value is taken as-is: empty strings and malformed emails are fine.
    pub fn update_personal_info(
        &mut self,
        field: PersonalField,
        value: impl Into<String>,
    ) -> StorageResult<()> {
        let mut next = (*self.resume).clone();
        next.personal_info.set(field, value);
        self.commit(next)
    }

    // ==================== Experience ====================

    /// Replace one field of an experience entry
    ///
    /// Returns `false` without changing anything if no entry has `id`.
    pub fn update_experience(
        &mut self,
        id: EntryId,
        field: ExperienceField,
        value: impl Into<String>,
    ) -> StorageResult<bool> {
        let Some(index) = self.resume.experience.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        let mut next = (*self.resume).clone();
        next.experience[index].set(field, value);
        self.commit(next)?;
        Ok(true)
    }

    /// Append an empty experience entry and return its id
    pub fn add_experience(&mut self) -> StorageResult<EntryId> {
        let entry = Experience::new();
        let id = entry.id;
        let mut next = (*self.resume).clone();
        next.experience.push(entry);
        self.commit(next)?;
        Ok(id)
    }

    /// Remove an experience entry
    ///
    /// Returns `false` if no entry has `id`.
    pub fn remove_experience(&mut self, id: EntryId) -> StorageResult<bool> {
        if self.resume.experience(id).is_none() {
            return Ok(false);
        }
        let mut next = (*self.resume).clone();
        next.experience.retain(|e| e.id != id);
        self.commit(next)?;
        Ok(true)
    }

    // ==================== Education ====================

    /// Replace one field of an education entry
    ///
    /// Returns `false` without changing anything if no entry has `id`.
    pub fn update_education(
        &mut self,
        id: EntryId,
        field: EducationField,
        value: impl Into<String>,
    ) -> StorageResult<bool> {
        let Some(index) = self.resume.education.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        let mut next = (*self.resume).clone();
        next.education[index].set(field, value);
        self.commit(next)?;
        Ok(true)
    }

    /// Append an empty education entry and return its id
    pub fn add_education(&mut self) -> StorageResult<EntryId> {
        let entry = Education::new();
        let id = entry.id;
        let mut next = (*self.resume).clone();
        next.education.push(entry);
        self.commit(next)?;
        Ok(id)
    }

    /// Remove an education entry
    ///
    /// Returns `false` if no entry has `id`.
    pub fn remove_education(&mut self, id: EntryId) -> StorageResult<bool> {
        if self.resume.education(id).is_none() {
            return Ok(false);
        }
        let mut next = (*self.resume).clone();
        next.education.retain(|e| e.id != id);
        self.commit(next)?;
        Ok(true)
    }

    // ==================== Skills ====================

    /// Replace the skills list wholesale
    ///
    /// No dedup and no trimming: the list is stored exactly as given.
    pub fn update_skills(&mut self, skills: Vec<String>) -> StorageResult<()> {
        let mut next = (*self.resume).clone();
        next.skills = skills;
        self.commit(next)
    }

    // ==================== Whole Document ====================

    /// Replace the document with the empty default
    pub fn reset_resume(&mut self) -> StorageResult<()> {
        info!("Resetting resume to defaults");
        self.commit(Resume::default())
    }

    /// Route generated text into the field its section targets
    ///
    /// - `summary` overwrites `personalInfo.summary`
    /// - `skills` is split on commas, each piece trimmed, and replaces the
    ///   skills list (empty pieces are kept)
    /// - other sections are left for the caller
    pub fn apply_generated(&mut self, section: Section, content: &str) -> StorageResult<AppliedTo> {
        match section {
            Section::Summary => {
                self.update_personal_info(PersonalField::Summary, content)?;
                Ok(AppliedTo::Summary)
            }
            Section::Skills => {
                let skills = split_skills(content);
                let count = skills.len();
                self.update_skills(skills)?;
                Ok(AppliedTo::Skills(count))
            }
            Section::Experience | Section::Improve => Ok(AppliedTo::NotRouted),
        }
    }

    /// Swap in the new snapshot, then persist it
    ///
    /// If the write fails the new snapshot stays current and the error is
    /// returned to the caller.
    fn commit(&mut self, next: Resume) -> StorageResult<()> {
        self.resume = Arc::new(next);
        self.revision += 1;
        self.persistence.save(&self.resume)
    }
}

/// Split a comma-separated generator answer into skills
pub fn split_skills(content: &str) -> Vec<String> {
    content.split(',').map(|s| s.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn open_store(temp_dir: &TempDir) -> ResumeStore {
        ResumeStore::with_persistence(ResumePersistence::with_storage(LocalStorage::new(
            temp_dir.path(),
        )))
    }

    fn populated_store(temp_dir: &TempDir) -> ResumeStore {
        let mut store = open_store(temp_dir);
        store.update_personal_info(PersonalField::Name, "Grace Hopper").unwrap();
        store.update_personal_info(PersonalField::Title, "Rear Admiral").unwrap();
        let exp = store.add_experience().unwrap();
        store.update_experience(exp, ExperienceField::Company, "US Navy").unwrap();
        let edu = store.add_education().unwrap();
        store.update_education(edu, EducationField::School, "Yale").unwrap();
        store.update_skills(vec!["COBOL".into(), "Compilers".into()]).unwrap();
        store
    }

    #[test]
    fn test_open_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        assert!(store.resume().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_unreadable_file_survives_first_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(crate::config::RESUME_STORAGE_KEY);
        let raw = [0xff, 0xfe, b'{', b'}'];
        std::fs::write(&path, raw).unwrap();

        let mut store = open_store(&temp_dir);
        assert!(store.resume().is_empty());
        store.update_personal_info(PersonalField::Name, "Grace Hopper").unwrap();

        let backup = temp_dir
            .path()
            .join(format!("{}.corrupt.backup", crate::config::RESUME_STORAGE_KEY));
        assert_eq!(std::fs::read(backup).unwrap(), raw);
    }

    #[test]
    fn test_update_personal_info_changes_only_that_field() {
        for field in PersonalField::ALL {
            let temp_dir = TempDir::new().unwrap();
            let mut store = populated_store(&temp_dir);
            let before = store.resume();

            store.update_personal_info(*field, "changed").unwrap();
            let after = store.resume();

            assert_eq!(after.personal_info.get(*field), "changed");
            for other in PersonalField::ALL.iter().filter(|f| *f != field) {
                assert_eq!(after.personal_info.get(*other), before.personal_info.get(*other));
            }
            assert_eq!(after.experience, before.experience);
            assert_eq!(after.education, before.education);
            assert_eq!(after.skills, before.skills);
        }
    }

    #[test]
    fn test_update_accepts_any_value() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);

        store.update_personal_info(PersonalField::Email, "not-an-email").unwrap();
        store.update_personal_info(PersonalField::Phone, "").unwrap();

        assert_eq!(store.resume().personal_info.email, "not-an-email");
        assert_eq!(store.resume().personal_info.phone, "");
    }

    #[test]
    fn test_mutation_produces_new_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);
        let before = store.resume();

        store.update_personal_info(PersonalField::Name, "Ada").unwrap();

        let after = store.resume();
        assert!(!Arc::ptr_eq(&before, &after));
        // Old snapshot is untouched
        assert_eq!(before.personal_info.name, "");
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_add_then_remove_experience_restores_sequence() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = populated_store(&temp_dir);
        let before = store.resume().experience.clone();

        let id = store.add_experience().unwrap();
        assert_eq!(store.resume().experience.len(), before.len() + 1);

        assert!(store.remove_experience(id).unwrap());
        assert_eq!(store.resume().experience, before);
    }

    #[test]
    fn test_add_experience_appends_blank_entry() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = populated_store(&temp_dir);

        let id = store.add_experience().unwrap();
        let resume = store.resume();
        let last = resume.experience.last().unwrap();

        assert_eq!(last.id, id);
        assert!(last.title.is_empty());
        assert!(last.company.is_empty());
        assert!(last.description.is_empty());
    }

    #[test]
    fn test_two_adds_have_distinct_ids() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);

        let a = store.add_experience().unwrap();
        let b = store.add_experience().unwrap();
        assert_ne!(a, b);
        assert!(!a.to_string().is_empty());
        assert!(!b.to_string().is_empty());

        let c = store.add_education().unwrap();
        let d = store.add_education().unwrap();
        assert_ne!(c, d);
    }

    #[test]
    fn test_update_unknown_experience_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = populated_store(&temp_dir);
        let before = store.resume();
        let revision = store.revision();

        let found = store
            .update_experience(EntryId::new(), ExperienceField::Title, "Ghost")
            .unwrap();

        assert!(!found);
        assert!(Arc::ptr_eq(&before, &store.resume()));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = populated_store(&temp_dir);
        let before = store.resume();

        assert!(!store.remove_experience(EntryId::new()).unwrap());
        assert!(!store.remove_education(EntryId::new()).unwrap());
        assert!(Arc::ptr_eq(&before, &store.resume()));
    }

    #[test]
    fn test_update_experience_field() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);
        let first = store.add_experience().unwrap();
        let second = store.add_experience().unwrap();

        store
            .update_experience(second, ExperienceField::StartDate, "2021-03")
            .unwrap();

        let resume = store.resume();
        assert_eq!(resume.experience(second).unwrap().start_date, "2021-03");
        assert_eq!(resume.experience(first).unwrap().start_date, "");
        assert_eq!(resume.experience[1].id, second);
    }

    #[test]
    fn test_education_operations() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);

        let id = store.add_education().unwrap();
        assert!(store
            .update_education(id, EducationField::Degree, "BSc")
            .unwrap());
        assert_eq!(store.find_education(id).unwrap().degree, "BSc");

        assert!(!store
            .update_education(EntryId::new(), EducationField::Degree, "PhD")
            .unwrap());

        assert!(store.remove_education(id).unwrap());
        assert!(store.resume().education.is_empty());
    }

    #[test]
    fn test_skills_keep_order_and_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = open_store(&temp_dir);

        store.update_skills(vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(store.resume().skills, vec!["a", "b"]);

        store
            .update_skills(vec!["b".into(), " a ".into(), "b".into(), "".into()])
            .unwrap();
        assert_eq!(store.resume().skills, vec!["b", " a ", "b", ""]);
    }

    #[test]
    fn test_reset_resume() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = populated_store(&temp_dir);

        store.reset_resume().unwrap();

        let resume = store.resume();
        assert!(resume.personal_info.is_empty());
        assert!(resume.experience.is_empty());
        assert!(resume.education.is_empty());
        assert!(resume.skills.is_empty());
        assert!(resume.is_empty());
    }

    #[test]
    fn test_apply_generated_summary() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = populated_store(&temp_dir);

        let applied = store
            .apply_generated(Section::Summary, "Seasoned engineer.")
            .unwrap();

        assert_eq!(applied, AppliedTo::Summary);
        assert_eq!(store.resume().personal_info.summary, "Seasoned engineer.");
    }

    #[test]
    fn test_apply_generated_skills_replaces_list() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = populated_store(&temp_dir);

        let applied = store
            .apply_generated(Section::Skills, "Rust , Tokio,SQL")
            .unwrap();

        assert_eq!(applied, AppliedTo::Skills(3));
        assert_eq!(store.resume().skills, vec!["Rust", "Tokio", "SQL"]);
    }

    #[test]
    fn test_apply_generated_other_sections_not_routed() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = populated_store(&temp_dir);
        let before = store.resume();

        let applied = store
            .apply_generated(Section::Experience, "Led a team")
            .unwrap();

        assert_eq!(applied, AppliedTo::NotRouted);
        assert!(Arc::ptr_eq(&before, &store.resume()));
    }

    #[test]
    fn test_split_skills() {
        assert_eq!(split_skills("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_skills("a,,b"), vec!["a", "", "b"]);
        assert_eq!(split_skills("solo"), vec!["solo"]);
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let original = {
            let store = populated_store(&temp_dir);
            store.resume()
        };

        let reopened = open_store(&temp_dir);
        assert_eq!(*reopened.resume(), *original);
    }

    #[test]
    fn test_reset_persists() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut store = populated_store(&temp_dir);
            store.reset_resume().unwrap();
        }

        assert!(open_store(&temp_dir).resume().is_empty());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let temp_dir = TempDir::new().unwrap();
        // Point storage at a path whose parent is a regular file
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let mut store = ResumeStore::with_persistence(ResumePersistence::with_storage(
            LocalStorage::new(blocker.join("data")),
        ));

        let result = store.update_personal_info(PersonalField::Name, "Still here");

        assert!(result.is_err());
        assert_eq!(store.resume().personal_info.name, "Still here");
    }
}
