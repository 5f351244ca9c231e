//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid parameters or input shapes.
/// Degenerate numbers (zero weights, zero spans) are not errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid layout parameter {field}: {value}")]
    InvalidLayout { field: &'static str, value: f64 },

    #[error("no extraction strategy matches columns: {columns:?}")]
    NoMatchingStrategy { columns: Vec<String> },

    #[error("row {row} has {found} cells, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
