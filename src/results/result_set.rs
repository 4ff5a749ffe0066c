use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use super::row::{CustomDbRow, index_columns};
use crate::types::RowValues;

/// A result set from one executed statement
///
/// Rows normally share one column list; the first record is authoritative for column
/// order and introspection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// The rows returned by the statement
    pub results: Vec<CustomDbRow>,
    /// Column names of the first record
    column_names: Option<Arc<Vec<String>>>,
}

impl ResultSet {
    /// Create a new result set with a known capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names: None,
        }
    }

    /// Build rows from the `results` array of a response entry.
    ///
    /// Records whose keys match the first record's keys share its column list and index
    /// cache; any other record gets its own.
    #[must_use]
    pub fn from_records(records: &[Map<String, JsonValue>]) -> ResultSet {
        let mut result_set = ResultSet::with_capacity(records.len());
        let mut shared: Option<(Arc<Vec<String>>, Arc<HashMap<String, usize>>)> = None;

        for record in records {
            let values: Vec<RowValues> = record.values().map(RowValues::from_json).collect();

            let reusable = shared
                .as_ref()
                .filter(|(names, _)| {
                    names.len() == record.len()
                        && names.iter().zip(record.keys()).all(|(a, b)| a == b)
                })
                .cloned();

            let (names, cache) = match reusable {
                Some(pair) => pair,
                None => {
                    let names: Arc<Vec<String>> = Arc::new(record.keys().cloned().collect());
                    let cache = Arc::new(index_columns(&names));
                    if shared.is_none() {
                        result_set.set_column_names(names.clone());
                        shared = Some((names.clone(), cache.clone()));
                    }
                    (names, cache)
                }
            };

            result_set
                .results
                .push(CustomDbRow::with_cache(names, values, cache));
        }

        result_set
    }

    /// Set the column names for this result set
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_names = Some(column_names);
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn get_column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CustomDbRow> {
        self.results.get(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&CustomDbRow> {
        self.results.first()
    }
}
