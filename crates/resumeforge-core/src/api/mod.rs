//! ResumeForge API client
//!
//! - **ApiClient**: generation, token status, checkout and product calls
//! - **ApiError**: failures with one user-facing message each
//! - **Plan**: the fixed pricing catalog

pub mod client;
pub mod error;
pub mod plans;
pub mod types;

pub use client::{ApiClient, DEVICE_ID_HEADER};
pub use error::{ApiError, ErrorDetail, Operation};
pub use plans::{format_price, Plan, ProductSku};
pub use types::{
    job_title_for, CheckoutSession, CoverLetterRequest, GenerateRequest, GenerateResponse, Product,
    TokenSource, TokenStatus, DEFAULT_JOB_TITLE,
};
