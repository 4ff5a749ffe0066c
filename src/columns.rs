//! Column descriptors inferred from the first row of a result set.
//!
//! The query API returns bare records, so the only knowable facts are the column name
//! and what the first value looks like. Table, key and nullability metadata are fixed
//! defaults.

use crate::results::ResultSet;
use crate::types::{RowValues, numeric_text};

/// Type tag inferred from a sampled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Integer,
    Real,
    Text,
    Boolean,
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub numeric: bool,
    pub inferred_type: InferredType,
    /// Always empty.
    pub table: String,
    /// Always 0.
    pub max_length: usize,
    pub not_null: bool,
    pub primary_key: bool,
    pub unique_key: bool,
    pub multiple_key: bool,
    pub blob: bool,
    pub unsigned: bool,
    pub zerofill: bool,
}

impl ColumnDescriptor {
    fn sampled(name: &str, value: &RowValues) -> Self {
        Self {
            name: name.to_string(),
            numeric: value.is_numeric(),
            inferred_type: infer_type(value),
            table: String::new(),
            max_length: 0,
            not_null: false,
            primary_key: false,
            unique_key: false,
            multiple_key: false,
            blob: false,
            unsigned: false,
            zerofill: false,
        }
    }
}

fn infer_type(value: &RowValues) -> InferredType {
    match value {
        RowValues::Int(_) => InferredType::Integer,
        RowValues::Float(_) => InferredType::Real,
        RowValues::Bool(_) => InferredType::Boolean,
        RowValues::Null => InferredType::Null,
        RowValues::Text(s) => match numeric_text(s) {
            Some(_) if s.trim().parse::<i64>().is_ok() => InferredType::Integer,
            Some(_) => InferredType::Real,
            None => InferredType::Text,
        },
    }
}

/// Fill `cache` from the first row of `rows` unless it is already filled or there are no
/// rows.
pub fn describe(rows: &ResultSet, cache: &mut Option<Vec<ColumnDescriptor>>) {
    if cache.is_some() {
        return;
    }
    let Some(first) = rows.first() else {
        return;
    };
    *cache = Some(
        first
            .iter()
            .map(|(name, value)| ColumnDescriptor::sampled(name, value))
            .collect(),
    );
}
