//! Index subsystem
//!
//! Hash-based unique and non-unique indices over key tuples, plus an
//! augmented interval search tree for range-overlap and point-containment
//! queries. Indices are owned by a frame; maintenance is incremental for
//! single-cell updates and a full rebuild for structural mutations.

mod hash;
mod interval;
mod registry;


pub use hash::{MultiIndex, UniqueIndex};
pub use interval::IntervalIndex;
pub use registry::{Index, IndexRegistry};
