//! Generation and billing flows
//!
//! A `Workflow` wires the device identity, the API client and the shared
//! store together. The store lock is held only while a result is applied,
//! never across a network call. A cancelled caller never sees its late
//! result written to the document.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{
    ApiClient, ApiError, CheckoutSession, CoverLetterRequest, GenerateRequest, GenerateResponse,
    Product, ProductSku, TokenStatus,
};
use crate::config::Config;
use crate::identity::{DeviceId, DeviceIdentity};
use crate::models::Section;
use crate::storage::StorageError;
use crate::store::{AppliedTo, ResumeStore};

/// Failure of a workflow step
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Api(ApiError),

    /// The result was applied in memory but could not be saved
    #[error("Failed to save resume: {0}")]
    Storage(#[from] StorageError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl From<ApiError> for WorkflowError {
    fn from(err: ApiError) -> Self {
        if err.is_cancelled() {
            WorkflowError::Cancelled
        } else {
            WorkflowError::Api(err)
        }
    }
}

/// Options for one section generation
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub section: Section,
    pub context: Option<String>,
    /// Overrides the resume's title
    pub job_title: Option<String>,
    /// Overrides the configured language
    pub language: Option<String>,
}

impl GenerateOptions {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            context: None,
            job_title: None,
            language: None,
        }
    }
}

/// A finished generation and where it landed
#[derive(Debug, Clone)]
pub struct Generated {
    pub section: Section,
    pub response: GenerateResponse,
    pub applied: AppliedTo,
}

pub struct Workflow {
    client: ApiClient,
    identity: Arc<DeviceIdentity>,
    store: Arc<Mutex<ResumeStore>>,
    language: String,
    success_url: String,
}

impl Workflow {
    pub fn new(
        config: &Config,
        client: ApiClient,
        identity: Arc<DeviceIdentity>,
        store: Arc<Mutex<ResumeStore>>,
    ) -> Self {
        Self {
            client,
            identity,
            store,
            language: config.language.clone(),
            success_url: config.checkout_success_url(),
        }
    }

    /// Build every component from configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            config,
            ApiClient::from_config(config)?,
            Arc::new(DeviceIdentity::new(config)),
            Arc::new(Mutex::new(ResumeStore::open(config))),
        ))
    }

    pub fn store(&self) -> Arc<Mutex<ResumeStore>> {
        Arc::clone(&self.store)
    }

    async fn device_id(&self, cancel: &CancellationToken) -> Result<DeviceId, WorkflowError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(WorkflowError::Cancelled),
            id = self.identity.resolve() => Ok(id),
        }
    }

    /// Generate a section and route it into the resume
    pub async fn generate_section(
        &self,
        options: GenerateOptions,
        cancel: &CancellationToken,
    ) -> Result<Generated, WorkflowError> {
        let device_id = self.device_id(cancel).await?;
        let resume = self.store.lock().await.resume();

        let language = options.language.unwrap_or_else(|| self.language.clone());
        let mut request = GenerateRequest::for_resume(&resume, options.section, language);
        if let Some(job_title) = options.job_title {
            request = request.with_job_title(job_title);
        }
        if let Some(context) = options.context {
            request = request.with_context(context);
        }

        let response = self
            .client
            .generate_content(&request, &device_id, cancel)
            .await?;

        let mut store = self.store.lock().await;
        if cancel.is_cancelled() {
            debug!(section = %options.section, "Discarding generated content for cancelled request");
            return Err(WorkflowError::Cancelled);
        }
        let applied = store.apply_generated(options.section, &response.content)?;
        info!(section = %options.section, ?applied, "Applied generated content");

        Ok(Generated {
            section: options.section,
            response,
            applied,
        })
    }

    /// Generate a cover letter from the resume summary; the store is untouched
    pub async fn cover_letter(
        &self,
        company: &str,
        job_title: Option<String>,
        language: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, WorkflowError> {
        let device_id = self.device_id(cancel).await?;
        let resume = self.store.lock().await.resume();

        let language = language.unwrap_or_else(|| self.language.clone());
        let mut request = CoverLetterRequest::for_resume(&resume, company, language);
        if let Some(job_title) = job_title {
            request.job_title = job_title;
        }

        Ok(self
            .client
            .generate_cover_letter(&request, &device_id, cancel)
            .await?)
    }

    pub async fn token_status(&self, cancel: &CancellationToken) -> Result<TokenStatus, WorkflowError> {
        let device_id = self.device_id(cancel).await?;
        Ok(self.client.get_token_status(&device_id, cancel).await?)
    }

    /// Create a checkout session returning to the configured success URL
    pub async fn checkout(
        &self,
        sku: &ProductSku,
        cancel: &CancellationToken,
    ) -> Result<CheckoutSession, WorkflowError> {
        let device_id = self.device_id(cancel).await?;
        info!(%sku, "Creating checkout session");
        Ok(self
            .client
            .create_checkout(sku, &device_id, &self.success_url, cancel)
            .await?)
    }

    pub async fn products(&self, cancel: &CancellationToken) -> Result<Vec<Product>, WorkflowError> {
        Ok(self.client.list_products(cancel).await?)
    }
}
