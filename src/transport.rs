use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use crate::config::D1Options;
use crate::error::D1MiddlewareError;
use crate::statement::PreparedStatement;
use crate::types::RowValues;

/// Wire payload: `{"sql": "...", "params": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRequest<'a> {
    pub sql: &'a str,
    pub params: &'a [RowValues],
}

impl<'a> From<&'a PreparedStatement> for ExecutionRequest<'a> {
    fn from(statement: &'a PreparedStatement) -> Self {
        Self {
            sql: &statement.text,
            params: &statement.parameters,
        }
    }
}

/// Sends one statement and returns the raw response body.
///
/// Implementations make exactly one attempt. A body is returned for any HTTP status; only
/// failing to obtain a response at all is an error, and it must be
/// `D1MiddlewareError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute_remote(
        &self,
        request: &ExecutionRequest<'_>,
    ) -> Result<String, D1MiddlewareError>;
}

/// `reqwest`-backed transport for the D1 query endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    bearer: String,
}

impl HttpTransport {
    /// # Errors
    /// Returns `D1MiddlewareError::ConfigError` if the options are invalid or the HTTP client
    /// cannot be built.
    pub fn new(opts: &D1Options) -> Result<Self, D1MiddlewareError> {
        opts.validate()?;
        let client = reqwest::Client::builder()
            .timeout(opts.timeout)
            .build()
            .map_err(|e| {
                D1MiddlewareError::ConfigError(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            endpoint: opts.endpoint(),
            bearer: format!("Bearer {}", opts.api_token),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute_remote(
        &self,
        request: &ExecutionRequest<'_>,
    ) -> Result<String, D1MiddlewareError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.bearer)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::debug!(%status, "D1 endpoint answered with non-success status");
        }
        Ok(body)
    }
}
