//! Tabulon core: an embedded typed tabular data engine
//!
//! The crate is organised around four subsystems:
//!
//! - [`table`] holds the typed column store, the frame, and row views;
//! - [`index`] provides hash and interval indices kept in step with the frame;
//! - [`expr`] compiles and evaluates row predicates;
//! - [`query`] implements grouping and hash joins across frames.

pub mod error;
pub mod expr;
pub mod index;
pub mod query;
pub mod table;

pub use error::TabulonError;
pub use expr::{Predicate, PredicateCache};
pub use table::{Frame, FrameConfig, Header, RowHandle, RowView, TableError, Value, ValueKind};

/// Result type for crate-level operations
pub type Result<T> = std::result::Result<T, TabulonError>;
