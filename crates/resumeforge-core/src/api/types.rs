//! Wire types for the ResumeForge API

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Resume, Section};

/// Job title sent when the resume has no title
pub const DEFAULT_JOB_TITLE: &str = "Professional";

/// Job title for generation: the resume title, or [`DEFAULT_JOB_TITLE`]
pub fn job_title_for(resume: &Resume) -> String {
    let title = resume.personal_info.title.trim();
    if title.is_empty() {
        DEFAULT_JOB_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// Body of `POST /resume/generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub job_title: String,
    pub section: Section,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub language: String,
}

impl GenerateRequest {
    pub fn new(job_title: impl Into<String>, section: Section, language: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            section,
            context: None,
            language: language.into(),
        }
    }

    /// Request for `section` using the resume's job title
    pub fn for_resume(resume: &Resume, section: Section, language: impl Into<String>) -> Self {
        Self::new(job_title_for(resume), section, language)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_job_title(mut self, job_title: impl Into<String>) -> Self {
        self.job_title = job_title.into();
        self
    }
}

/// Body of `POST /resume/cover-letter`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverLetterRequest {
    pub job_title: String,
    pub company: String,
    pub resume_summary: String,
    pub language: String,
}

impl CoverLetterRequest {
    /// Cover letter request from the resume's title and summary
    pub fn for_resume(resume: &Resume, company: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            job_title: job_title_for(resume),
            company: company.into(),
            resume_summary: resume.personal_info.summary.clone(),
            language: language.into(),
        }
    }
}

/// Which quota paid for a generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenSource {
    Free,
    Paid,
    Other(String),
}

impl From<String> for TokenSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "free" => TokenSource::Free,
            "paid" => TokenSource::Paid,
            _ => TokenSource::Other(value),
        }
    }
}

impl From<TokenSource> for String {
    fn from(source: TokenSource) -> Self {
        source.to_string()
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Free => f.write_str("free"),
            TokenSource::Paid => f.write_str("paid"),
            TokenSource::Other(s) => f.write_str(s),
        }
    }
}

/// Successful generation response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub content: String,
    pub tokens_remaining: i64,
    pub source: TokenSource,
}

/// Quota snapshot for a device, as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStatus {
    pub tokens_remaining: i64,
    pub daily_used: i64,
    pub daily_limit: i64,
    pub can_generate: bool,
}

/// Body of `POST /payment/create-checkout`
#[derive(Debug, Serialize)]
pub(crate) struct CheckoutRequest<'a> {
    pub product_sku: &'a str,
    pub device_id: &'a str,
    pub success_url: &'a str,
}

/// Checkout session created by the payment provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub checkout_url: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Purchasable package from `GET /payment/products`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    pub generations: i64,
    #[serde(default)]
    pub discount_percent: Option<i64>,
}
