//! Async client for parameterized SQL over the Cloudflare D1 HTTP query API.
//!
//! A call runs one pass through the pipeline: a `%d`/`%f`/`%s` template is prepared into
//! `?` markers plus parameters, posted to the D1 query endpoint, the JSON envelope is
//! translated, and the outcome is stored in the client's [`SessionState`]. Results are
//! then read back as a scalar, a record, a column or the full set.
//!
//! ```rust,no_run
//! use d1_middleware::prelude::*;
//!
//! # async fn demo() -> Result<(), D1MiddlewareError> {
//! let mut db = D1Client::builder("account".into(), "database".into(), "token".into()).build()?;
//! db.query_template("INSERT INTO users (name) VALUES (%s)", &params!["ann"])
//!     .await?;
//! println!("new id {}", db.session().insert_id());
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod client;
pub mod columns;
pub mod config;
pub mod error;
pub mod prelude;
pub mod response;
pub mod results;
pub mod session;
pub mod statement;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use accessor::{Record, Records};
pub use client::D1Client;
pub use columns::{ColumnDescriptor, InferredType};
pub use config::{D1Options, D1OptionsBuilder};
pub use error::D1MiddlewareError;
pub use response::{Outcome, QueryReturn, ResultMeta, ReturnShape, classify_return_shape, translate};
pub use results::{AssociativeRow, CustomDbRow, ResultSet};
pub use session::{QueryLogEntry, SessionState};
pub use statement::{PreparedStatement, prepare};
pub use transport::{ExecutionRequest, HttpTransport, Transport};
pub use types::{RecordShape, ResultsShape, RowValues};
