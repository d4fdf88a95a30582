//! REST API client for the markup backend.
//!
//! [`MarkupApi`] wraps the measurement, annotation and key-image endpoints
//! using [`reqwest`]. The per-kind operations live in
//! [`measurements`](crate::measurements), [`annotations`](crate::annotations)
//! and [`key_images`](crate::key_images); this module holds the shared
//! transport and status handling.

use std::time::Duration;

use serde::Deserialize;

/// HTTP client for a single markup backend.
#[derive(Clone)]
pub struct MarkupApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the markup REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Markup API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend reported that the addressed record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Error body the backend sends with `400` responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    message: String,
}

/// `{<uid field>, count}` envelope of the count endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct CountResponse {
    pub count: i64,
}

impl MarkupApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL including the API prefix, e.g.
    ///   `http://host:8080/api`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create an API client whose requests time out after `timeout`.
    pub fn with_timeout(
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- crate helpers ----

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success. A `400` carrying the backend's
    /// `NOT_FOUND` error body becomes [`ApiError::NotFound`]; any other
    /// failure becomes [`ApiError::ApiError`] with the status and body.
    pub(crate) async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        if let Ok(err) = serde_json::from_str::<ErrorBody>(&body) {
            if err.error == "NOT_FOUND" {
                return Err(ApiError::NotFound(err.message));
            }
        }

        Err(ApiError::ApiError {
            status: status.as_u16(),
            body,
        })
    }

    /// Parse a successful JSON response body into the expected type.
    pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Like [`parse_response`](Self::parse_response), but a `404` yields
    /// `Ok(None)`.
    pub(crate) async fn parse_optional<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<T>, ApiError> {
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }

    /// Assert the response has a success status code, discarding the body.
    pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
