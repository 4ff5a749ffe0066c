//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::accessor::{Record, Records};
pub use crate::client::D1Client;
pub use crate::config::{D1Options, D1OptionsBuilder};
pub use crate::error::D1MiddlewareError;
pub use crate::params;
pub use crate::response::{QueryReturn, ReturnShape, classify_return_shape};
pub use crate::results::{AssociativeRow, CustomDbRow, ResultSet};
pub use crate::session::SessionState;
pub use crate::statement::{PreparedStatement, prepare};
pub use crate::transport::{HttpTransport, Transport};
pub use crate::types::{RecordShape, ResultsShape, RowValues};
