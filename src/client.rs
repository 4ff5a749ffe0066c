use std::time::Instant;

use chrono::Utc;

use crate::accessor::{Record, Records};
use crate::columns::ColumnDescriptor;
use crate::config::{D1Options, D1OptionsBuilder};
use crate::error::D1MiddlewareError;
use crate::response::{QueryReturn, classify_return_shape, translate};
use crate::session::{QueryLogEntry, SessionState};
use crate::statement::{self, PreparedStatement};
use crate::transport::{ExecutionRequest, HttpTransport, Transport};
use crate::types::{RecordShape, ResultsShape, RowValues};

/// Client for one D1 database plus the state of its most recent execution.
///
/// Every executing method takes `&mut self`: one statement is in flight per client and
/// the reset -> execute -> populate sequence cannot interleave with a read. To share a
/// client between tasks, wrap it explicitly (e.g. `Arc<tokio::sync::Mutex<D1Client>>`).
///
/// ```rust,no_run
/// use d1_middleware::prelude::*;
///
/// # async fn demo() -> Result<(), D1MiddlewareError> {
/// let mut db = D1Client::from_env()?;
/// let stmt = db
///     .prepare(Some("SELECT * FROM users WHERE id = %d"), &params![7])?
///     .expect("template given");
/// if let Some(Record::Associative(user)) =
///     db.get_row(Some(&stmt), 0, RecordShape::Associative).await
/// {
///     println!("{user:?}");
/// } else if let Some(err) = db.last_error() {
///     eprintln!("lookup failed: {err}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct D1Client<T: Transport = HttpTransport> {
    transport: T,
    session: SessionState,
}

impl D1Client<HttpTransport> {
    /// # Errors
    /// Returns `D1MiddlewareError::ConfigError` for invalid options.
    pub fn new(opts: D1Options) -> Result<Self, D1MiddlewareError> {
        Ok(Self::with_transport(HttpTransport::new(&opts)?)
            .with_query_log_capacity(opts.query_log_capacity))
    }

    /// # Errors
    /// Returns `D1MiddlewareError::ConfigError` if the environment is incomplete.
    pub fn from_env() -> Result<Self, D1MiddlewareError> {
        Self::new(D1Options::from_env()?)
    }

    #[must_use]
    pub fn builder(
        account_id: String,
        database_id: String,
        api_token: String,
    ) -> D1OptionsBuilder {
        D1OptionsBuilder::new(account_id, database_id, api_token)
    }
}

impl<T: Transport> D1Client<T> {
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            session: SessionState::new(),
        }
    }

    /// Keep at most `query_log_capacity` log entries; 0 disables the log.
    #[must_use]
    pub fn with_query_log_capacity(mut self, query_log_capacity: usize) -> Self {
        self.session.set_log_capacity(query_log_capacity);
        self
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.session.last_error()
    }

    /// See [`statement::prepare`].
    ///
    /// # Errors
    /// Returns `D1MiddlewareError::ParameterCountMismatch` on argument underflow and
    /// `D1MiddlewareError::ParameterError` for a non-finite `%f` argument.
    pub fn prepare(
        &self,
        template: Option<&str>,
        args: &[RowValues],
    ) -> Result<Option<PreparedStatement>, D1MiddlewareError> {
        statement::prepare(template, args)
    }

    /// Execute a statement and return the counter its leading keyword selects.
    ///
    /// # Errors
    /// Transport, API and malformed-response failures; each is also recorded as
    /// `last_error`.
    pub async fn query(
        &mut self,
        statement: &PreparedStatement,
    ) -> Result<QueryReturn, D1MiddlewareError> {
        self.run(statement, "query").await
    }

    /// Prepare `template` with `args` and execute it.
    ///
    /// A parameter count mismatch is recorded like any other failure of this call.
    ///
    /// # Errors
    /// Same as [`D1Client::query`], plus `ParameterCountMismatch` and `EmptyStatement`.
    pub async fn query_template(
        &mut self,
        template: &str,
        args: &[RowValues],
    ) -> Result<QueryReturn, D1MiddlewareError> {
        match statement::prepare(Some(template), args) {
            Ok(Some(stmt)) => self.run(&stmt, "query_template").await,
            Ok(None) => self.fail_before_send(template, D1MiddlewareError::EmptyStatement),
            Err(err) => self.fail_before_send(template, err),
        }
    }

    /// Value at `(row, column)`, executing `statement` first when given.
    pub async fn get_var(
        &mut self,
        statement: Option<&PreparedStatement>,
        row: usize,
        column: usize,
    ) -> Option<RowValues> {
        self.run_optional(statement, "get_var").await;
        self.session.var(row, column)
    }

    /// Row `row` in `shape`, executing `statement` first when given.
    pub async fn get_row(
        &mut self,
        statement: Option<&PreparedStatement>,
        row: usize,
        shape: RecordShape,
    ) -> Option<Record> {
        self.run_optional(statement, "get_row").await;
        self.session.row(row, shape)
    }

    /// Column `column` across all rows, executing `statement` first when given.
    pub async fn get_col(
        &mut self,
        statement: Option<&PreparedStatement>,
        column: usize,
    ) -> Vec<RowValues> {
        self.run_optional(statement, "get_col").await;
        self.session.col(column)
    }

    /// All rows in `shape`, executing `statement` first when given. `None` means the
    /// execution failed; a successful empty result is `Some` and empty.
    pub async fn get_results(
        &mut self,
        statement: Option<&PreparedStatement>,
        shape: ResultsShape,
    ) -> Option<Records> {
        self.run_optional(statement, "get_results").await;
        self.session.results(shape)
    }

    /// Column descriptors of the last result, inferred on first call.
    pub fn col_info(&mut self) -> &[ColumnDescriptor] {
        self.session.col_info()
    }

    /// Descriptor of the column at `offset` in the last result.
    pub fn col_info_at(&mut self, offset: usize) -> Option<&ColumnDescriptor> {
        self.session.col_info_at(offset)
    }

    /// Drop logged statements. `num_queries` keeps counting.
    pub fn clear_queries(&mut self) {
        self.session.clear_queries();
    }

    /// Drop the last result, error and counters without executing anything.
    pub fn flush(&mut self) {
        self.session.reset();
    }

    async fn run_optional(&mut self, statement: Option<&PreparedStatement>, caller: &'static str) {
        if let Some(statement) = statement {
            // Readers report failure through the session, not through a Result.
            let _ = self.run(statement, caller).await;
        }
    }

    async fn run(
        &mut self,
        statement: &PreparedStatement,
        caller: &'static str,
    ) -> Result<QueryReturn, D1MiddlewareError> {
        self.session.begin(&statement.text);
        match self.execute(statement, caller).await {
            Ok(ret) => Ok(ret),
            Err(err) => {
                tracing::warn!(
                    caller,
                    transport = err.is_transport(),
                    error = %err,
                    "D1 statement failed"
                );
                self.session.record_error(err.session_message());
                Err(err)
            }
        }
    }

    async fn execute(
        &mut self,
        statement: &PreparedStatement,
        caller: &'static str,
    ) -> Result<QueryReturn, D1MiddlewareError> {
        if statement.text.trim().is_empty() {
            return Err(D1MiddlewareError::EmptyStatement);
        }

        tracing::debug!(
            sql = %statement.text,
            params = statement.parameters.len(),
            caller,
            "executing D1 statement"
        );

        let request = ExecutionRequest::from(statement);
        let timestamp = Utc::now();
        let started = Instant::now();
        let body = self.transport.execute_remote(&request).await;
        self.session.record_attempt(QueryLogEntry {
            statement: statement.text.clone(),
            duration: started.elapsed(),
            caller,
            timestamp,
        });

        let translated = translate(&body?).into_result()?;
        let ret = classify_return_shape(&statement.text).project(&translated.meta);
        tracing::debug!(
            rows = translated.rows.len(),
            changes = translated.meta.changes,
            rows_read = translated.meta.rows_read,
            last_row_id = translated.meta.last_row_id,
            "D1 statement succeeded"
        );
        self.session.record_success(translated);
        Ok(ret)
    }

    fn fail_before_send(
        &mut self,
        template: &str,
        err: D1MiddlewareError,
    ) -> Result<QueryReturn, D1MiddlewareError> {
        self.session.begin(template);
        tracing::warn!(error = %err, "D1 statement not sent");
        self.session.record_error(err.session_message());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use crate::test_utils::{StaticTransport, error_body, success_body};
    use serde_json::json;

    fn client(transport: StaticTransport) -> D1Client<StaticTransport> {
        D1Client::with_transport(transport)
    }

    #[tokio::test]
    async fn query_returns_keyword_classified_counter() {
        let transport = StaticTransport::new()
            .with_body(success_body(json!([]), json!({"changes": 3, "last_row_id": 11})))
            .with_body(success_body(json!([]), json!({})))
            .with_body(success_body(json!([{"a": 1}, {"a": 2}]), json!({"rows_read": 5})));
        let mut db = client(transport);

        let ret = db
            .query(&PreparedStatement::raw("INSERT INTO t VALUES (1)"))
            .await
            .unwrap();
        assert_eq!(ret, QueryReturn::Count(3));
        assert_eq!(db.session().insert_id(), 11);

        let ret = db
            .query(&PreparedStatement::raw("CREATE TABLE t (a INT)"))
            .await
            .unwrap();
        assert_eq!(ret, QueryReturn::Bool(true));

        let ret = db
            .query(&PreparedStatement::raw("SELECT a FROM t"))
            .await
            .unwrap();
        assert_eq!(ret, QueryReturn::Rows(5));
        assert_eq!(db.session().num_rows(), 2);
        assert_eq!(db.session().num_queries(), 3);
    }

    #[tokio::test]
    async fn failure_clears_previous_state() {
        let transport = StaticTransport::new()
            .with_body(success_body(json!([{"id": 7}]), json!({"changes": 1, "last_row_id": 4})))
            .with_transport_error("connection refused");
        let mut db = client(transport);

        assert_eq!(
            db.get_var(Some(&PreparedStatement::raw("SELECT id FROM t")), 0, 0)
                .await,
            Some(RowValues::Int(7))
        );
        assert_eq!(db.col_info().len(), 1);

        let err = db
            .query(&PreparedStatement::raw("SELECT id FROM t"))
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(db.last_error().unwrap().contains("connection refused"));
        assert_eq!(db.session().rows_affected(), 0);
        assert_eq!(db.session().insert_id(), 0);
        assert!(db.col_info().is_empty());
        assert_eq!(db.get_var(None, 0, 0).await, None);
        // The failed attempt is still logged.
        assert_eq!(db.session().queries().len(), 2);
    }

    #[tokio::test]
    async fn api_error_is_recorded() {
        let transport = StaticTransport::new().with_body(error_body("no such table: t"));
        let mut db = client(transport);
        let rows = db
            .get_results(
                Some(&PreparedStatement::raw("SELECT * FROM t")),
                ResultsShape::Associative,
            )
            .await;
        assert!(rows.is_none());
        assert_eq!(db.last_error(), Some("no such table: t"));
    }

    #[tokio::test]
    async fn malformed_body_records_generic_message() {
        let transport = StaticTransport::new().with_body("<html>502</html>");
        let mut db = client(transport);
        let err = db
            .query(&PreparedStatement::raw("SELECT 1"))
            .await
            .unwrap_err();
        assert!(matches!(err, D1MiddlewareError::MalformedResponse(_)));
        assert_eq!(
            db.last_error(),
            Some(crate::error::MALFORMED_RESPONSE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn template_mismatch_never_reaches_transport() {
        let mut db = client(StaticTransport::new());
        let err = db
            .query_template("SELECT * FROM t WHERE a = %d AND b = %s", &params![1])
            .await
            .unwrap_err();
        assert!(matches!(err, D1MiddlewareError::ParameterCountMismatch { .. }));
        assert!(db.last_error().unwrap().contains("mismatch"));
        assert!(db.transport().requests().is_empty());
        assert_eq!(db.session().num_queries(), 0);
    }

    #[tokio::test]
    async fn empty_statement_is_rejected() {
        let mut db = client(StaticTransport::new());
        let err = db.query(&PreparedStatement::raw("   ")).await.unwrap_err();
        assert!(matches!(err, D1MiddlewareError::EmptyStatement));
        assert!(db.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn flush_drops_result() {
        let transport =
            StaticTransport::new().with_body(success_body(json!([{"id": 1}]), json!({})));
        let mut db = client(transport);
        db.query(&PreparedStatement::raw("SELECT id FROM t"))
            .await
            .unwrap();
        db.flush();
        assert_eq!(db.session().num_rows(), 0);
        assert_eq!(db.get_results(None, ResultsShape::Object).await, None);
        assert_eq!(db.session().last_query(), "SELECT id FROM t");
    }

    #[tokio::test]
    async fn single_column_descriptor_by_offset() {
        let transport = StaticTransport::new().with_body(success_body(
            json!([{"id": 1, "name": "ann"}]),
            json!({}),
        ));
        let mut db = client(transport);
        db.query(&PreparedStatement::raw("SELECT id, name FROM t"))
            .await
            .unwrap();

        let name = db.col_info_at(1).expect("second column");
        assert_eq!(name.name, "name");
        assert!(!name.numeric);
        assert!(db.col_info_at(0).unwrap().numeric);
        assert!(db.col_info_at(2).is_none());

        db.flush();
        assert!(db.col_info_at(0).is_none());
    }

    #[tokio::test]
    async fn query_log_is_bounded_and_clearable() {
        let mut transport = StaticTransport::new();
        for _ in 0..4 {
            transport = transport.with_body(success_body(json!([]), json!({})));
        }
        let mut db = client(transport).with_query_log_capacity(2);
        for n in 0..4 {
            db.query(&PreparedStatement::raw(format!("SELECT {n}")))
                .await
                .unwrap();
        }
        assert_eq!(db.session().num_queries(), 4);
        assert_eq!(db.session().queries().len(), 2);
        assert_eq!(db.session().queries()[0].statement, "SELECT 2");

        db.clear_queries();
        assert!(db.session().queries().is_empty());
        assert_eq!(db.session().num_queries(), 4);
    }
}
