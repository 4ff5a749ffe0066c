//! Response translation: the D1 JSON envelope to rows plus execution counters.
//!
//! Only the first entry of `result` is read. D1 answers a multi-statement request with
//! one entry per statement; anything past the first is discarded.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::{D1MiddlewareError, UNKNOWN_API_ERROR};
use crate::results::ResultSet;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    errors: Option<Vec<ApiMessage>>,
    #[serde(default)]
    result: Option<Vec<ResultEntry>>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry {
    #[serde(default)]
    results: Option<Vec<Map<String, JsonValue>>>,
    #[serde(default)]
    meta: Option<WireMeta>,
    #[serde(default)]
    error: Option<String>,
}

/// Counters the service reports. A value of the wrong type or out of range reads as absent
/// rather than failing the whole envelope.
#[derive(Debug, Default, Deserialize)]
struct WireMeta {
    #[serde(default, deserialize_with = "lenient")]
    changes: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    rows_read: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    last_row_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    rows_written: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    changed_db: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    size_after: Option<u64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Execution metadata of the first result entry, with defaults applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMeta {
    /// Rows changed by the statement (0 when absent).
    pub changes: u64,
    /// Rows read; the number of returned rows when absent.
    pub rows_read: u64,
    /// Rowid of the last inserted row (0 when absent).
    pub last_row_id: i64,
    pub rows_written: Option<u64>,
    /// Server-side duration in milliseconds.
    pub duration_ms: Option<f64>,
    pub changed_db: Option<bool>,
    pub size_after: Option<u64>,
}

/// Successfully translated response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translated {
    pub rows: ResultSet,
    pub meta: ResultMeta,
}

/// What a response body turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The service rejected the statement.
    ApiError(String),
    /// The body is not a response envelope.
    MalformedResponse(String),
    Success(Translated),
}

impl Outcome {
    /// # Errors
    ///
    /// `ApiError` and `MalformedResponse` map onto the matching `D1MiddlewareError`.
    pub fn into_result(self) -> Result<Translated, D1MiddlewareError> {
        match self {
            Outcome::Success(translated) => Ok(translated),
            Outcome::ApiError(message) => Err(D1MiddlewareError::Api(message)),
            Outcome::MalformedResponse(detail) => {
                Err(D1MiddlewareError::MalformedResponse(detail))
            }
        }
    }
}

/// Interpret a raw response body.
#[must_use]
pub fn translate(body: &str) -> Outcome {
    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => return Outcome::MalformedResponse(e.to_string()),
    };

    if envelope.success != Some(true) {
        return Outcome::ApiError(api_error_message(&envelope));
    }

    let Some(first) = envelope.result.and_then(|entries| entries.into_iter().next()) else {
        return Outcome::Success(Translated::default());
    };

    let rows = ResultSet::from_records(first.results.as_deref().unwrap_or_default());
    let meta = first.meta.unwrap_or_default();
    let meta = ResultMeta {
        changes: meta.changes.unwrap_or(0),
        rows_read: meta.rows_read.unwrap_or(rows.len() as u64),
        last_row_id: meta.last_row_id.unwrap_or(0),
        rows_written: meta.rows_written,
        duration_ms: meta.duration,
        changed_db: meta.changed_db,
        size_after: meta.size_after,
    };

    Outcome::Success(Translated { rows, meta })
}

/// `errors[0].message`, then `result[0].error`, then a fixed message.
fn api_error_message(envelope: &Envelope) -> String {
    envelope
        .errors
        .as_ref()
        .and_then(|errors| errors.first())
        .and_then(|error| error.message.clone())
        .or_else(|| {
            envelope
                .result
                .as_ref()
                .and_then(|entries| entries.first())
                .and_then(|entry| entry.error.clone())
        })
        .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string())
}

/// Which counter a raw execution hands back, decided from the statement's leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    /// Changed-row count (`INSERT`, `DELETE`, `UPDATE`, `REPLACE`)
    Count,
    /// Plain success (`CREATE`, `ALTER`, `DROP`)
    Bool,
    /// Read-row count (everything else)
    Rows,
}

/// Value returned by a raw statement execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryReturn {
    Count(u64),
    Bool(bool),
    Rows(u64),
}

impl ReturnShape {
    #[must_use]
    pub fn project(self, meta: &ResultMeta) -> QueryReturn {
        match self {
            ReturnShape::Count => QueryReturn::Count(meta.changes),
            ReturnShape::Bool => QueryReturn::Bool(true),
            ReturnShape::Rows => QueryReturn::Rows(meta.rows_read),
        }
    }
}

/// Classify by the first six characters of the trimmed statement, case-insensitively.
///
/// This looks at the keyword only, not at what the statement does: `WITH ... INSERT` is
/// classified as a read.
#[must_use]
pub fn classify_return_shape(statement_text: &str) -> ReturnShape {
    let head: String = statement_text
        .trim()
        .chars()
        .take(6)
        .collect::<String>()
        .to_ascii_uppercase();

    match head.as_str() {
        "INSERT" | "DELETE" | "UPDATE" | "REPLAC" => ReturnShape::Count,
        "CREATE" => ReturnShape::Bool,
        _ if head.starts_with("ALTER") || head.starts_with("DROP") => ReturnShape::Bool,
        _ => ReturnShape::Rows,
    }
}
