//! Read-only projections of the last result into caller-chosen shapes.
//!
//! Every reader returns `None` (or an empty column) when the last execution failed, so a
//! failed statement is never confused with one that matched zero rows.

use indexmap::IndexMap;

use crate::results::{AssociativeRow, CustomDbRow, ResultSet};
use crate::session::SessionState;
use crate::types::{RecordShape, ResultsShape, RowValues};

/// One row in the requested [`RecordShape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Object(CustomDbRow),
    Associative(AssociativeRow),
    Positional(Vec<RowValues>),
}

/// All rows in the requested [`ResultsShape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    Objects(Vec<CustomDbRow>),
    /// Keyed by the first column's value rendered as text.
    Keyed(IndexMap<String, CustomDbRow>),
    Associative(Vec<AssociativeRow>),
    Positional(Vec<Vec<RowValues>>),
}

impl Records {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Records::Objects(rows) => rows.len(),
            Records::Keyed(rows) => rows.len(),
            Records::Associative(rows) => rows.len(),
            Records::Positional(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionState {
    /// The result set readers may look at: present only after a successful execution.
    fn readable(&self) -> Option<&ResultSet> {
        if self.last_error().is_some() {
            return None;
        }
        self.last_result()
    }

    /// Value at `(row, column)` of the last result.
    #[must_use]
    pub fn var(&self, row: usize, column: usize) -> Option<RowValues> {
        self.readable()?.get(row)?.get_by_index(column).cloned()
    }

    /// Row `row` of the last result.
    #[must_use]
    pub fn row(&self, row: usize, shape: RecordShape) -> Option<Record> {
        let record = self.readable()?.get(row)?;
        Some(match shape {
            RecordShape::Object => Record::Object(record.clone()),
            RecordShape::Associative => Record::Associative(record.to_associative()),
            RecordShape::Positional => Record::Positional(record.to_positional()),
        })
    }

    /// Values at `column` across all rows; rows without that column are skipped.
    #[must_use]
    pub fn col(&self, column: usize) -> Vec<RowValues> {
        self.readable()
            .map(|rows| {
                rows.results
                    .iter()
                    .filter_map(|record| record.get_by_index(column).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every row of the last result.
    #[must_use]
    pub fn results(&self, shape: ResultsShape) -> Option<Records> {
        let rows = &self.readable()?.results;
        Some(match shape {
            ResultsShape::Object => Records::Objects(rows.clone()),
            ResultsShape::ObjectKeyed => {
                let mut keyed = IndexMap::with_capacity(rows.len());
                for record in rows {
                    let key = record
                        .get_by_index(0)
                        .map(RowValues::coerce_text)
                        .unwrap_or_default();
                    keyed.insert(key, record.clone());
                }
                Records::Keyed(keyed)
            }
            ResultsShape::Associative => {
                Records::Associative(rows.iter().map(CustomDbRow::to_associative).collect())
            }
            ResultsShape::Positional => {
                Records::Positional(rows.iter().map(CustomDbRow::to_positional).collect())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Outcome, translate};

    fn state_with(body: &str) -> SessionState {
        let mut state = SessionState::new();
        state.begin("SELECT * FROM t");
        match translate(body) {
            Outcome::Success(t) => state.record_success(t),
            other => panic!("unexpected {other:?}"),
        }
        state
    }

    const THREE_ROWS: &str = r#"{"success":true,"result":[{"results":[
        {"id":7,"name":"ann"},{"id":8,"name":"bob"},{"id":7,"name":"cat"}]}]}"#;

    #[test]
    fn scalar_and_row_shapes() {
        let state = state_with(THREE_ROWS);
        assert_eq!(state.var(0, 0), Some(RowValues::Int(7)));
        assert_eq!(state.var(1, 1), Some(RowValues::Text("bob".into())));
        assert_eq!(state.var(9, 0), None);
        assert_eq!(state.var(0, 9), None);

        match state.row(0, RecordShape::Associative) {
            Some(Record::Associative(row)) => {
                assert_eq!(row.get("name"), Some(&RowValues::Text("ann".into())));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            state.row(1, RecordShape::Positional),
            Some(Record::Positional(vec![
                RowValues::Int(8),
                RowValues::Text("bob".into())
            ]))
        );
        assert!(state.row(3, RecordShape::Object).is_none());
    }

    #[test]
    fn column_projection() {
        let state = state_with(THREE_ROWS);
        assert_eq!(
            state.col(1),
            vec![
                RowValues::Text("ann".into()),
                RowValues::Text("bob".into()),
                RowValues::Text("cat".into())
            ]
        );
        assert!(state.col(5).is_empty());
    }

    #[test]
    fn keyed_results_last_row_wins() {
        let state = state_with(THREE_ROWS);
        let Some(Records::Keyed(keyed)) = state.results(ResultsShape::ObjectKeyed) else {
            panic!("expected keyed records");
        };
        assert_eq!(keyed.len(), 2);
        assert_eq!(
            keyed.get("7").and_then(|row| row.get("name")),
            Some(&RowValues::Text("cat".into()))
        );
        assert_eq!(keyed.keys().next().map(String::as_str), Some("7"));
    }

    #[test]
    fn empty_result_is_not_failure() {
        let state = state_with(r#"{"success":true,"result":[{"results":[]}]}"#);
        let records = state.results(ResultsShape::Associative).expect("succeeded");
        assert!(records.is_empty());
    }

    #[test]
    fn readers_return_sentinel_after_error() {
        let mut state = state_with(THREE_ROWS);
        state.record_error("no such table: t".into());
        assert_eq!(state.var(0, 0), None);
        assert_eq!(state.row(0, RecordShape::Object), None);
        assert!(state.col(0).is_empty());
        assert_eq!(state.results(ResultsShape::Positional), None);
    }

    #[test]
    fn nothing_executed_yet() {
        let state = SessionState::new();
        assert_eq!(state.results(ResultsShape::Object), None);
        assert_eq!(state.var(0, 0), None);
    }
}
