//! External collaborators for the tabulon core engine
//!
//! CSV ingestion and serialization (with transparent gzip) plus the JSON
//! "meta" schema format. Everything here talks to the core through its
//! public frame, header and cell accessors only.

pub mod csv;
pub mod meta;

pub use crate::csv::{open, read_csv, read_csv_path, write_csv, write_csv_path};
pub use crate::meta::Schema;

use thiserror::Error;

/// Convenience result type for io operations
pub type IoResult<T> = Result<T, IoError>;

/// Error type shared by the csv and meta collaborators
#[derive(Debug, Error)]
pub enum IoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("meta error: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("engine error: {0}")]
    Core(#[from] tb_core::TableError),
}
