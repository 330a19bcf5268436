//! ResumeForge Core Library
//!
//! Client core for ResumeForge, an AI-assisted resume builder. It owns the
//! resume being edited, talks to the generation and payment API, and gives
//! each installation a stable anonymous device identifier.
//!
//! # Architecture
//!
//! - **ResumeStore**: single in-memory document, persisted on every change
//! - **ApiClient**: async HTTP calls, each cancellable
//! - **DeviceIdentity**: resolved once per profile, then cached
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let workflow = Workflow::from_config(&config)?;
//! let cancel = CancellationToken::new();
//!
//! // Generate a summary and store it in the resume
//! let generated = workflow
//!     .generate_section(GenerateOptions::new(Section::Summary), &cancel)
//!     .await?;
//!
//! // Check the remaining quota
//! let status = workflow.token_status(&cancel).await?;
//! ```
//!
//! # Modules
//!
//! - `store`: resume document store (main entry point for editing)
//! - `models`: resume data structures and field keys
//! - `api`: HTTP client, wire types, error classification, plans
//! - `identity`: device identifier resolution
//! - `workflow`: generation and checkout flows over a shared store
//! - `storage`: local file persistence
//! - `config`: application configuration

pub mod api;
pub mod config;
pub mod identity;
pub mod models;
pub mod storage;
pub mod store;
pub mod workflow;

pub use api::{ApiClient, ApiError, ErrorDetail, Plan, ProductSku};
pub use config::Config;
pub use identity::{
    DeviceId, DeviceIdStatus, DeviceIdentity, EnvironmentFingerprinter, Fingerprinter, IdSource,
};
pub use models::{
    Education, EducationField, EntryId, Experience, ExperienceField, PersonalField, PersonalInfo,
    Resume, Section, UnknownField,
};
pub use storage::{ResumePersistence, StorageError, StorageResult};
pub use store::{AppliedTo, ResumeStore};
pub use workflow::{GenerateOptions, Generated, Workflow, WorkflowError};
