use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::columns::{self, ColumnDescriptor};
use crate::config::DEFAULT_QUERY_LOG_CAPACITY;
use crate::response::{ResultMeta, Translated};
use crate::results::ResultSet;

/// One executed (or attempted) statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryLogEntry {
    pub statement: String,
    /// Wall-clock time of the HTTP attempt, including failed ones.
    pub duration: Duration,
    /// Public entry point that issued the statement (`query`, `get_row`, ...).
    pub caller: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// State describing the most recent execution on a client.
///
/// Only the execution pipeline writes to it; everything public here is a reader.
/// Per-execution fields are cleared before every attempt, so a failed call never shows
/// the previous call's rows or counters.
///
/// The query log is a ring buffer: once `query_log_capacity` entries are held the oldest
/// is dropped. A capacity of 0 keeps no entries; `num_queries` counts every attempt
/// regardless.
#[derive(Debug, Clone)]
pub struct SessionState {
    last_query: String,
    last_result: Option<ResultSet>,
    last_error: Option<String>,
    last_meta: Option<ResultMeta>,
    rows_affected: u64,
    rows_read: u64,
    insert_id: i64,
    col_info: Option<Vec<ColumnDescriptor>>,
    num_queries: u64,
    queries: VecDeque<QueryLogEntry>,
    query_log_capacity: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::with_log_capacity(DEFAULT_QUERY_LOG_CAPACITY)
    }
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_log_capacity(query_log_capacity: usize) -> Self {
        Self {
            last_query: String::new(),
            last_result: None,
            last_error: None,
            last_meta: None,
            rows_affected: 0,
            rows_read: 0,
            insert_id: 0,
            col_info: None,
            num_queries: 0,
            queries: VecDeque::new(),
            query_log_capacity,
        }
    }

    pub(crate) fn set_log_capacity(&mut self, query_log_capacity: usize) {
        self.query_log_capacity = query_log_capacity;
        while self.queries.len() > query_log_capacity {
            self.queries.pop_front();
        }
    }

    pub(crate) fn clear_queries(&mut self) {
        self.queries.clear();
    }

    /// Clear everything tied to the previous execution. Query count, log and last
    /// statement text survive.
    pub(crate) fn reset(&mut self) {
        self.last_result = None;
        self.last_error = None;
        self.last_meta = None;
        self.rows_affected = 0;
        self.rows_read = 0;
        self.insert_id = 0;
        self.col_info = None;
    }

    pub(crate) fn begin(&mut self, statement_text: &str) {
        self.reset();
        self.last_query = statement_text.to_string();
    }

    pub(crate) fn record_attempt(&mut self, entry: QueryLogEntry) {
        self.num_queries += 1;
        if self.query_log_capacity == 0 {
            return;
        }
        if self.queries.len() == self.query_log_capacity {
            self.queries.pop_front();
        }
        self.queries.push_back(entry);
    }

    pub(crate) fn record_success(&mut self, translated: Translated) {
        let Translated { rows, meta } = translated;
        self.rows_affected = meta.changes;
        self.rows_read = meta.rows_read;
        self.insert_id = meta.last_row_id;
        self.last_meta = Some(meta);
        self.last_result = Some(rows);
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    /// Text of the last statement sent (with `?` markers).
    #[must_use]
    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&ResultSet> {
        self.last_result.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn last_meta(&self) -> Option<&ResultMeta> {
        self.last_meta.as_ref()
    }

    /// Rows changed by the last statement.
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    #[must_use]
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Rows returned by the last statement.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.last_result.as_ref().map_or(0, ResultSet::len)
    }

    /// Rowid of the last inserted row, 0 if none.
    #[must_use]
    pub fn insert_id(&self) -> i64 {
        self.insert_id
    }

    /// Statements attempted over the client's lifetime.
    #[must_use]
    pub fn num_queries(&self) -> u64 {
        self.num_queries
    }

    /// Logged attempts, oldest first.
    #[must_use]
    pub fn queries(&self) -> &VecDeque<QueryLogEntry> {
        &self.queries
    }

    #[must_use]
    pub fn query_log_capacity(&self) -> usize {
        self.query_log_capacity
    }

    /// Column descriptors of the last result, inferred on first use.
    ///
    /// Empty when the last execution failed or returned no rows.
    pub fn col_info(&mut self) -> &[ColumnDescriptor] {
        if let Some(rows) = &self.last_result {
            columns::describe(rows, &mut self.col_info);
        }
        self.col_info.as_deref().unwrap_or_default()
    }

    /// Descriptor of the column at `offset`.
    pub fn col_info_at(&mut self, offset: usize) -> Option<&ColumnDescriptor> {
        self.col_info().get(offset)
    }

    /// Whether descriptors have been inferred for the current result.
    #[must_use]
    pub fn has_col_info(&self) -> bool {
        self.col_info.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Outcome, translate};

    fn translated(body: &str) -> Translated {
        match translate(body) {
            Outcome::Success(t) => t,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn begin_clears_previous_execution() {
        let mut state = SessionState::new();
        state.begin("SELECT 1");
        state.record_success(translated(
            r#"{"success":true,"result":[{"results":[{"id":7}],"meta":{"changes":1,"last_row_id":9}}]}"#,
        ));
        assert_eq!(state.col_info().len(), 1);
        assert_eq!(state.insert_id(), 9);

        state.begin("SELECT 2");
        assert_eq!(state.last_query(), "SELECT 2");
        assert!(state.last_result().is_none());
        assert!(state.last_meta().is_none());
        assert!(!state.has_col_info());
        assert_eq!(state.rows_affected(), 0);
        assert_eq!(state.rows_read(), 0);
        assert_eq!(state.insert_id(), 0);
        assert!(state.col_info().is_empty());
    }

    #[test]
    fn log_survives_reset() {
        let mut state = SessionState::new();
        state.record_attempt(QueryLogEntry {
            statement: "SELECT 1".into(),
            duration: Duration::from_millis(3),
            caller: "query",
            timestamp: Utc::now(),
        });
        state.record_error("boom".into());
        state.reset();
        assert_eq!(state.num_queries(), 1);
        assert_eq!(state.queries()[0].caller, "query");
        assert!(state.last_error().is_none());
    }

    fn entry(statement: &str) -> QueryLogEntry {
        QueryLogEntry {
            statement: statement.into(),
            duration: Duration::from_millis(1),
            caller: "query",
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn log_keeps_only_the_newest_entries() {
        let mut state = SessionState::with_log_capacity(2);
        for n in 0..5 {
            state.record_attempt(entry(&format!("SELECT {n}")));
        }
        assert_eq!(state.num_queries(), 5);
        let kept: Vec<&str> = state.queries().iter().map(|e| e.statement.as_str()).collect();
        assert_eq!(kept, vec!["SELECT 3", "SELECT 4"]);

        state.set_log_capacity(1);
        assert_eq!(state.queries().len(), 1);
        assert_eq!(state.queries()[0].statement, "SELECT 4");

        state.clear_queries();
        assert!(state.queries().is_empty());
        assert_eq!(state.num_queries(), 5);
    }

    #[test]
    fn zero_capacity_only_counts() {
        let mut state = SessionState::with_log_capacity(0);
        state.record_attempt(entry("SELECT 1"));
        assert_eq!(state.num_queries(), 1);
        assert!(state.queries().is_empty());
    }
}
