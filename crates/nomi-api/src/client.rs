//! HTTP client for the Nomi API
//!
//! # Example
//!
//! ```rust,ignore
//! use nomi_api::{NomiApi, NomiClient, RemoteCall};
//!
//! let client = NomiClient::new()?;
//! let nomis = client.call(&api_key, &RemoteCall::get(["nomis"])).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::call::RemoteCall;
use crate::error::{ApiError, Result};

/// Production endpoint of the Nomi API
pub const DEFAULT_BASE_URL: &str = "https://api.nomi.ai/v1";

/// Executes [`RemoteCall`]s against the Nomi API
#[async_trait]
pub trait NomiApi: Send + Sync {
    /// Perform one request, authorized with `credential`
    async fn call(&self, credential: &str, request: &RemoteCall) -> Result<Value>;
}

/// reqwest-backed [`NomiApi`] implementation
#[derive(Debug, Clone)]
pub struct NomiClient {
    base_url: Url,
    http: Client,
}

impl NomiClient {
    /// Create a client for the production endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client for a custom endpoint
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|_| ApiError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let http = Client::builder().build()?;

        Ok(Self {
            base_url: parsed,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, request: &RemoteCall) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }
}

#[async_trait]
impl NomiApi for NomiClient {
    async fn call(&self, credential: &str, request: &RemoteCall) -> Result<Value> {
        let url = self.endpoint(request)?;

        tracing::debug!(method = %request.method, path = %request.path(), "Calling Nomi API");

        let mut builder = self
            .http
            .request(request.method.into(), url)
            .header(AUTHORIZATION, credential);

        // `json` also sets Content-Type, so bodiless requests carry none
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = error_message(status, &body);
            tracing::debug!(status = status.as_u16(), %message, "Nomi API rejected request");
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(json!({ "success": true }));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Transport {
            message: format!("invalid response body: {}", e),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Extract the error category from a failure body
///
/// Falls back to the status reason phrase when the body is not JSON or has no
/// `error.type` field.
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|d| d.kind)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or(status.as_str())
                .to_string()
        })
}
