//! Row and result-set containers built from D1 response records.

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::{AssociativeRow, CustomDbRow};
