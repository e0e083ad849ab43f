//! Join and group-by engines
//!
//! Both engines are built on the same key-tuple grouping primitive: group-by
//! exposes it directly, the hash join uses it to bucket the build side
//! before streaming the probe side.

mod group;
mod join;

#[cfg(test)]
mod tests;

pub use group::{group_by, Group, Grouping};
pub use join::{join, JoinInfo, JoinKind};
