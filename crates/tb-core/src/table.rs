//! Typed column store and frame orchestration
//!
//! A `Frame` owns an ordered set of typed columns of equal length, a header
//! describing them, and a registry of indices kept consistent with every
//! row-level mutation.

mod column;
mod frame;
mod row;
mod schema;
mod value;

#[cfg(test)]
mod tests;

// Re-exports
pub use column::{AnyColumn, Cell, Column, Numeric};
pub use frame::Frame;
pub use row::{RowHandle, RowIter, RowView};
pub use schema::{ColumnFactory, FrameConfig, Header, TypeRegistry};
pub use value::{Key, Value, ValueKind};

pub(crate) use value::{format_values, key_tuple};

/// Error types for table operations
#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("Type mismatch in column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: ValueKind,
        actual: &'static str,
    },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Row index out of bounds: index {index}, length {len}")]
    RowOutOfBounds { index: usize, len: usize },

    #[error("Row has {actual} values, frame has {expected} columns")]
    RowArity { expected: usize, actual: usize },

    #[error("Column length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Index '{0}' not found")]
    IndexNotFound(String),

    #[error("Duplicate index name: {0}")]
    DuplicateIndex(String),

    #[error("Index '{index}' does not answer {query} queries")]
    WrongIndexKind { index: String, query: &'static str },

    #[error("Unique index '{index}' already maps key [{key}]")]
    UniqueViolation { index: String, key: String },

    #[error("Headers are not compatible for concatenation: {left} vs {right}")]
    IncompatibleHeaders { left: String, right: String },

    #[error("Column '{column}' is not numeric (kind {kind})")]
    NotNumeric { column: String, kind: ValueKind },

    #[error("Row view is stale: captured generation {captured}, frame is at {current}")]
    StaleRow { captured: u64, current: u64 },
}

/// Result type for table operations
pub type Result<T> = std::result::Result<T, TableError>;
