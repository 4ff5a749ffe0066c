use std::fmt;
use std::time::Duration;

use crate::error::D1MiddlewareError;

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
/// Query log entries kept per client; older entries are dropped first.
pub const DEFAULT_QUERY_LOG_CAPACITY: usize = 100;

pub const ENV_ACCOUNT_ID: &str = "D1_ACCOUNT_ID";
pub const ENV_DATABASE_ID: &str = "D1_DATABASE_ID";
pub const ENV_API_TOKEN: &str = "D1_API_TOKEN";
pub const ENV_BASE_URL: &str = "D1_BASE_URL";

/// Options for reaching one D1 database over the HTTP query API.
#[derive(Clone)]
pub struct D1Options {
    pub account_id: String,
    pub database_id: String,
    pub api_token: String,
    pub base_url: String,
    pub timeout: Duration,
    /// 0 disables the query log; statements are still counted.
    pub query_log_capacity: usize,
}

impl fmt::Debug for D1Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("D1Options")
            .field("account_id", &self.account_id)
            .field("database_id", &self.database_id)
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("query_log_capacity", &self.query_log_capacity)
            .finish()
    }
}

impl D1Options {
    #[must_use]
    pub fn new(account_id: String, database_id: String, api_token: String) -> Self {
        Self {
            account_id,
            database_id,
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            query_log_capacity: DEFAULT_QUERY_LOG_CAPACITY,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_query_log_capacity(mut self, query_log_capacity: usize) -> Self {
        self.query_log_capacity = query_log_capacity;
        self
    }

    /// Read `D1_ACCOUNT_ID`, `D1_DATABASE_ID`, `D1_API_TOKEN` and optionally `D1_BASE_URL`.
    ///
    /// # Errors
    /// Returns `D1MiddlewareError::ConfigError` if a required variable is unset or empty.
    pub fn from_env() -> Result<Self, D1MiddlewareError> {
        let required = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|value| !value.is_empty())
                .ok_or_else(|| D1MiddlewareError::ConfigError(format!("{key} is not set")))
        };
        let mut opts = Self::new(
            required(ENV_ACCOUNT_ID)?,
            required(ENV_DATABASE_ID)?,
            required(ENV_API_TOKEN)?,
        );
        if let Ok(base_url) = std::env::var(ENV_BASE_URL)
            && !base_url.is_empty()
        {
            opts.base_url = base_url;
        }
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// Returns `D1MiddlewareError::ConfigError` naming the first empty field.
    pub fn validate(&self) -> Result<(), D1MiddlewareError> {
        for (field, value) in [
            ("account_id", &self.account_id),
            ("database_id", &self.database_id),
            ("api_token", &self.api_token),
            ("base_url", &self.base_url),
        ] {
            if value.trim().is_empty() {
                return Err(D1MiddlewareError::ConfigError(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if self.timeout.is_zero() {
            return Err(D1MiddlewareError::ConfigError(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// `{base_url}/accounts/{account_id}/d1/database/{database_id}/query`
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/accounts/{}/d1/database/{}/query",
            self.base_url.trim_end_matches('/'),
            self.account_id,
            self.database_id
        )
    }
}

/// Fluent builder for D1 options.
#[derive(Debug, Clone)]
pub struct D1OptionsBuilder {
    opts: D1Options,
}

impl D1OptionsBuilder {
    #[must_use]
    pub fn new(account_id: String, database_id: String, api_token: String) -> Self {
        Self {
            opts: D1Options::new(account_id, database_id, api_token),
        }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.opts.base_url = base_url;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    #[must_use]
    pub fn query_log_capacity(mut self, query_log_capacity: usize) -> Self {
        self.opts.query_log_capacity = query_log_capacity;
        self
    }

    #[must_use]
    pub fn finish(self) -> D1Options {
        self.opts
    }

    /// Validate and build an HTTP-backed client.
    ///
    /// # Errors
    /// Returns `D1MiddlewareError::ConfigError` for invalid options or if the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<crate::client::D1Client, D1MiddlewareError> {
        crate::client::D1Client::new(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_from_identifiers() {
        let opts = D1Options::new("acc".into(), "db".into(), "tok".into());
        assert_eq!(
            opts.endpoint(),
            "https://api.cloudflare.com/client/v4/accounts/acc/d1/database/db/query"
        );
        let opts = opts.with_base_url("http://127.0.0.1:8787/".into());
        assert_eq!(
            opts.endpoint(),
            "http://127.0.0.1:8787/accounts/acc/d1/database/db/query"
        );
    }

    #[test]
    fn defaults_and_validation() {
        let opts = D1OptionsBuilder::new("acc".into(), "db".into(), "tok".into()).finish();
        assert_eq!(opts.timeout, Duration::from_secs(15));
        assert_eq!(opts.query_log_capacity, DEFAULT_QUERY_LOG_CAPACITY);
        assert!(opts.validate().is_ok());

        let bad = D1Options::new("acc".into(), String::new(), "tok".into());
        assert!(matches!(
            bad.validate(),
            Err(D1MiddlewareError::ConfigError(msg)) if msg.contains("database_id")
        ));
        let bad = D1Options::new("acc".into(), "db".into(), "tok".into())
            .with_timeout(Duration::ZERO);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let opts = D1Options::new("acc".into(), "db".into(), "secret-token".into());
        let rendered = format!("{opts:?}");
        assert!(!rendered.contains("secret-token"));
    }
}
