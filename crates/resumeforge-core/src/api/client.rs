//! HTTP client for the ResumeForge API
//!
//! Every call takes a [`CancellationToken`]; cancelling it abandons the
//! request and returns [`ApiError::Cancelled`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::{ApiError, ErrorDetail, Operation};
use super::plans::ProductSku;
use super::types::{
    CheckoutRequest, CheckoutSession, CoverLetterRequest, GenerateRequest, GenerateResponse,
    Product, TokenStatus,
};
use crate::config::Config;
use crate::identity::DeviceId;

/// Header carrying the device identifier
pub const DEVICE_ID_HEADER: &str = "X-Device-Id";

/// Client for the generation, token and payment endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000/api/v1`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("resumeforge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.api_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Generate content for one resume section
    pub async fn generate_content(
        &self,
        request: &GenerateRequest,
        device_id: &DeviceId,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, ApiError> {
        let builder = self
            .http
            .post(self.url("/resume/generate"))
            .header(DEVICE_ID_HEADER, device_id.as_str())
            .json(request);

        self.execute(Operation::Generate, builder, cancel).await
    }

    /// Generate a cover letter
    pub async fn generate_cover_letter(
        &self,
        request: &CoverLetterRequest,
        device_id: &DeviceId,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, ApiError> {
        let builder = self
            .http
            .post(self.url("/resume/cover-letter"))
            .header(DEVICE_ID_HEADER, device_id.as_str())
            .json(request);

        self.execute(Operation::CoverLetter, builder, cancel).await
    }

    /// Fetch the device's remaining quota
    pub async fn get_token_status(
        &self,
        device_id: &DeviceId,
        cancel: &CancellationToken,
    ) -> Result<TokenStatus, ApiError> {
        let builder = self
            .http
            .get(self.url("/resume/tokens"))
            .header(DEVICE_ID_HEADER, device_id.as_str());

        self.execute(Operation::TokenStatus, builder, cancel).await
    }

    /// Start a checkout session for a product
    ///
    /// The caller is expected to send the user to `checkout_url`.
    pub async fn create_checkout(
        &self,
        sku: &ProductSku,
        device_id: &DeviceId,
        success_url: &str,
        cancel: &CancellationToken,
    ) -> Result<CheckoutSession, ApiError> {
        let body = CheckoutRequest {
            product_sku: sku.as_str(),
            device_id: device_id.as_str(),
            success_url,
        };
        let builder = self
            .http
            .post(self.url("/payment/create-checkout"))
            .json(&body);

        self.execute(Operation::Checkout, builder, cancel).await
    }

    /// List purchasable packages
    pub async fn list_products(&self, cancel: &CancellationToken) -> Result<Vec<Product>, ApiError> {
        let builder = self.http.get(self.url("/payment/products"));
        self.execute(Operation::Products, builder, cancel).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: Operation,
        builder: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        debug!(%operation, "Sending API request");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%operation, "API request cancelled");
                return Err(ApiError::Cancelled { operation });
            }
            result = builder.send() => result.map_err(|e| {
                warn!(%operation, error = %e, "API request failed to send");
                ApiError::transport(operation, e)
            })?,
        };

        let status = response.status();
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled { operation }),
            result = response.bytes() => result.map_err(|e| ApiError::transport(operation, e))?,
        };

        if !status.is_success() {
            let detail = ErrorDetail::from_body(&body);
            warn!(%operation, status = status.as_u16(), ?detail, "API request rejected");
            return Err(ApiError::status(operation, status.as_u16(), detail));
        }

        debug!(%operation, status = status.as_u16(), bytes = body.len(), "API request succeeded");
        serde_json::from_slice(&body).map_err(|e| {
            warn!(%operation, error = %e, "Unexpected API response body");
            ApiError::decode(operation, e)
        })
    }
}
