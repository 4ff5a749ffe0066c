use thiserror::Error;

/// Message recorded as `last_error` when the service answers with something that is not a
/// response envelope.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Malformed response from D1 API";

/// Message recorded when the envelope reports failure but carries no usable error text.
pub const UNKNOWN_API_ERROR: &str = "Unknown D1 API error";

#[derive(Debug, Error)]
pub enum D1MiddlewareError {
    /// The request never produced a response (connect failure, timeout, body read error).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered and rejected the statement.
    #[error("D1 API error: {0}")]
    Api(String),

    #[error("Malformed response from D1 API: {0}")]
    MalformedResponse(String),

    #[error("Parameter count mismatch: template needs {placeholders} argument(s), {supplied} supplied")]
    ParameterCountMismatch { placeholders: usize, supplied: usize },

    /// An argument cannot be bound as the placeholder's type.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Empty statement")]
    EmptyStatement,
}

impl D1MiddlewareError {
    /// True when the service could not be reached at all.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The text stored in session state for this failure.
    ///
    /// API errors keep the upstream message verbatim; malformed responses collapse to a
    /// generic message so callers never see half-parsed payload fragments.
    #[must_use]
    pub fn session_message(&self) -> String {
        match self {
            Self::Api(message) => message.clone(),
            Self::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for D1MiddlewareError {
    fn from(err: reqwest::Error) -> Self {
        D1MiddlewareError::Transport(err.to_string())
    }
}
