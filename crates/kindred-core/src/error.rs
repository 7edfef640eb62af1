//! Error types for schema derivation and table validation.

use thiserror::Error;

/// Schema-level failures. These abort the import of their sheet only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column {index} ({raw:?}) normalizes to an empty key")]
    EmptyColumn { index: usize, raw: String },

    #[error("columns {first:?} and {second:?} both normalize to {key:?}")]
    DuplicateColumn {
        first: String,
        second: String,
        key: String,
    },

    #[error("sheet name {raw:?} is not a valid label (expected [A-Za-z_][A-Za-z0-9_]*)")]
    InvalidLabel { raw: String },

    #[error("label {label:?} is reserved")]
    ReservedLabel { label: String },

    #[error("relationship type {raw:?} is not a valid identifier")]
    InvalidRelationshipType { raw: String },
}

/// Structural failures in fetched tabular data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("table {name:?} has no header row")]
    MissingHeader { name: String },

    #[error("table {name:?} row {row} has {width} cells, header has {expected}")]
    RaggedRow {
        name: String,
        row: usize,
        width: usize,
        expected: usize,
    },
}
