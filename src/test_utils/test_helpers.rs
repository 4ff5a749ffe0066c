//! Helper utilities for testing and development.

use std::sync::Arc;

use serde_json::{Value as JsonValue, json};

use crate::results::CustomDbRow;
use crate::types::RowValues;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<RowValues>) -> CustomDbRow {
    CustomDbRow::new(Arc::new(column_names), values)
}

/// Successful envelope with one result entry holding `rows` and `meta`.
#[must_use]
pub fn success_body(rows: JsonValue, meta: JsonValue) -> String {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": [{ "results": rows, "success": true, "meta": meta }]
    })
    .to_string()
}

/// Failed envelope carrying `message` as `errors[0].message`.
#[must_use]
pub fn error_body(message: &str) -> String {
    json!({
        "success": false,
        "errors": [{ "code": 7500, "message": message }],
        "messages": [],
        "result": []
    })
    .to_string()
}
