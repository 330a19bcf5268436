//! Storage layer
//!
//! Durable local state lives in the data directory:
//!
//! - **LocalStorage**: key/value files with atomic writes
//! - **ResumePersistence**: the resume document, stored under one key
//!
//! Read failures degrade to defaults; write failures are reported as
//! [`StorageError`].

pub mod error;
pub mod local;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use local::LocalStorage;
pub use persistence::ResumePersistence;
