//! Resume document persistence
//!
//! The whole resume is written as one JSON blob under a fixed storage key on
//! every change. Loading never fails the application: a missing document
//! means "start empty", and a corrupt one is moved aside before starting
//! empty.
//!
//! Files:
//! - `resume-storage.json` - `{ "version", "savedAt", "resume" }`

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::local::LocalStorage;
use crate::config::{Config, RESUME_STORAGE_KEY};
use crate::models::Resume;

/// Version written into the envelope
pub const ENVELOPE_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    resume: &'a Resume,
}

/// Decode any stored shape we know how to read
///
/// - `{version, savedAt, resume}`: written by this crate
/// - `{state: {resume}}`: exported from the web client's local storage
/// - a plain resume object
///
/// The shape is picked by its marker key before decoding, so a damaged
/// envelope is reported instead of being read as an empty bare resume.
/// Bytes that are not UTF-8 fail here like any other malformed JSON.
fn decode_document(content: &[u8]) -> Result<Resume, serde_json::Error> {
    let inner = match serde_json::from_slice::<Value>(content)? {
        Value::Object(mut map) if map.contains_key("version") && map.contains_key("resume") => {
            map.remove("resume").unwrap_or(Value::Null)
        }
        Value::Object(mut map) if map.contains_key("state") => match map.remove("state") {
            Some(Value::Object(mut state)) => state.remove("resume").unwrap_or(Value::Null),
            other => other.unwrap_or(Value::Null),
        },
        other => other,
    };
    serde_json::from_value(inner)
}

/// Persistence layer for the resume document
#[derive(Debug, Clone)]
pub struct ResumePersistence {
    storage: LocalStorage,
}

impl ResumePersistence {
    /// Create a persistence handler rooted at the configured data directory
    pub fn new(config: &Config) -> Self {
        Self::with_storage(LocalStorage::new(config.data_dir.clone()))
    }

    pub fn with_storage(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Path of the stored document
    pub fn path(&self) -> PathBuf {
        self.storage.path_for(RESUME_STORAGE_KEY)
    }

    /// Write the document (atomic replace)
    pub fn save(&self, resume: &Resume) -> StorageResult<()> {
        let envelope = EnvelopeRef {
            version: ENVELOPE_VERSION,
            saved_at: Utc::now(),
            resume,
        };
        let json = serde_json::to_string_pretty(&envelope)?;
        self.storage.set_item(RESUME_STORAGE_KEY, &json)?;
        debug!("Saved resume to {:?}", self.path());
        Ok(())
    }

    /// Read the document
    ///
    /// Returns `None` if nothing has been saved yet. A document that exists
    /// but cannot be decoded (bad JSON, wrong shape, or not UTF-8) is copied
    /// byte for byte to a `.corrupt.backup` file and reported as
    /// [`StorageError::CorruptDocument`].
    pub fn load(&self) -> StorageResult<Option<Resume>> {
        let Some(content) = self.storage.get_bytes(RESUME_STORAGE_KEY)? else {
            return Ok(None);
        };

        match decode_document(&content) {
            Ok(resume) => Ok(Some(resume)),
            Err(e) => {
                let path = self.path();
                let backup_path = self.backup_corrupt(&content)?;
                Err(StorageError::CorruptDocument {
                    path,
                    backup_path,
                    details: e.to_string(),
                })
            }
        }
    }

    /// Read the document, falling back to the empty default on any failure
    pub fn load_or_default(&self) -> Resume {
        match self.load() {
            Ok(Some(resume)) => resume,
            Ok(None) => Resume::default(),
            Err(e) => {
                warn!("Starting from an empty resume: {}", e);
                Resume::default()
            }
        }
    }

    fn backup_corrupt(&self, content: &[u8]) -> StorageResult<PathBuf> {
        let path = self.path();
        let mut name = path.as_os_str().to_owned();
        name.push(".corrupt.backup");
        let backup_path = PathBuf::from(name);

        fs::write(&backup_path, content)
            .map_err(|e| StorageError::write(e, backup_path.clone()))?;
        // The corrupt original is dropped so the next save starts clean
        let _ = fs::remove_file(&path);
        Ok(backup_path)
    }
}
