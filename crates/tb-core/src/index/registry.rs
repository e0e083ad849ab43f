//! Named index registry and maintenance plumbing
//!
//! The registry owns every index of one frame. The frame routes mutations
//! here: appends insert incrementally, single-cell updates patch only the
//! touched row's entries, and structural mutations rebuild affected indices
//! in full.

use super::hash::{key_at, resolve, values_at, Columns, MultiIndex, UniqueIndex};
use super::interval::IntervalIndex;
use crate::table::{format_values, Key, Result, TableError, Value};

use indexmap::IndexMap;

/// A named index of any kind
#[derive(Debug, Clone)]
pub enum Index {
    Unique(UniqueIndex),
    Multi(MultiIndex),
    Interval(IntervalIndex),
}

impl Index {
    pub fn name(&self) -> &str {
        match self {
            Index::Unique(idx) => idx.name(),
            Index::Multi(idx) => idx.name(),
            Index::Interval(idx) => idx.name(),
        }
    }

    /// Columns this index is derived from
    pub fn referenced_columns(&self) -> Vec<&str> {
        match self {
            Index::Unique(idx) => idx.columns().iter().map(String::as_str).collect(),
            Index::Multi(idx) => idx.columns().iter().map(String::as_str).collect(),
            Index::Interval(idx) => idx.columns().to_vec(),
        }
    }

    pub fn references(&self, column: &str) -> bool {
        self.referenced_columns().iter().any(|c| *c == column)
    }

    pub(crate) fn rebuild(&mut self, columns: &Columns, nrows: usize) -> Result<()> {
        match self {
            Index::Unique(idx) => idx.build(columns, nrows),
            Index::Multi(idx) => idx.build(columns, nrows),
            Index::Interval(idx) => idx.build(columns, nrows),
        }
    }

    pub fn as_unique(&self) -> Option<&UniqueIndex> {
        match self {
            Index::Unique(idx) => Some(idx),
            _ => None,
        }
    }

    pub fn as_multi(&self) -> Option<&MultiIndex> {
        match self {
            Index::Multi(idx) => Some(idx),
            _ => None,
        }
    }

    pub fn as_interval(&self) -> Option<&IntervalIndex> {
        match self {
            Index::Interval(idx) => Some(idx),
            _ => None,
        }
    }
}

/// One pending index patch for a single-cell update
#[derive(Debug)]
pub(crate) enum CellPatch {
    Unique {
        index: String,
        old_key: Vec<Key>,
        new_key: Vec<Key>,
    },
    Multi {
        index: String,
        old_key: Vec<Key>,
        new_key: Vec<Key>,
    },
    Interval {
        index: String,
        old: Option<(f64, f64)>,
        new: Option<(f64, f64)>,
    },
}

/// Registry of all indices owned by one frame
#[derive(Debug, Clone, Default)]
pub struct IndexRegistry {
    indices: IndexMap<String, Index>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indices.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Result<&Index> {
        self.indices
            .get(name)
            .ok_or_else(|| TableError::IndexNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Register and build a new index
    pub(crate) fn add(&mut self, mut index: Index, columns: &Columns, nrows: usize) -> Result<()> {
        if self.indices.contains_key(index.name()) {
            return Err(TableError::DuplicateIndex(index.name().to_string()));
        }
        index.rebuild(columns, nrows)?;
        self.indices.insert(index.name().to_string(), index);
        Ok(())
    }

    pub(crate) fn remove(&mut self, name: &str) -> Result<Index> {
        self.indices
            .shift_remove(name)
            .ok_or_else(|| TableError::IndexNotFound(name.to_string()))
    }

    /// Drop every index derived from a column; returns the dropped names
    pub(crate) fn drop_referencing(&mut self, column: &str) -> Vec<String> {
        let doomed: Vec<String> = self
            .indices
            .values()
            .filter(|idx| idx.references(column))
            .map(|idx| idx.name().to_string())
            .collect();
        for name in &doomed {
            self.indices.shift_remove(name);
        }
        doomed
    }

    /// Rebuild every index, e.g. after a row removal or sort
    pub(crate) fn rebuild_all(&mut self, columns: &Columns, nrows: usize) -> Result<()> {
        for index in self.indices.values_mut() {
            index.rebuild(columns, nrows)?;
        }
        Ok(())
    }

    /// Point index definitions at a renamed column
    pub(crate) fn rename_column(&mut self, old: &str, new: &str) {
        for index in self.indices.values_mut() {
            match index {
                Index::Unique(idx) => idx.rename_column(old, new),
                Index::Multi(idx) => idx.rename_column(old, new),
                Index::Interval(idx) => idx.rename_column(old, new),
            }
        }
    }

    /// Rebuild only indices derived from one column
    pub(crate) fn rebuild_referencing(
        &mut self,
        column: &str,
        columns: &Columns,
        nrows: usize,
    ) -> Result<()> {
        for index in self.indices.values_mut() {
            if index.references(column) {
                index.rebuild(columns, nrows)?;
            }
        }
        Ok(())
    }

    /// Pre-check a candidate row against every unique index.
    ///
    /// `key_values` resolves the candidate's value for an index column; the
    /// frame supplies it from the not-yet-appended row.
    pub(crate) fn check_unique_row<F>(&self, key_values: F) -> Result<()>
    where
        F: Fn(&[String]) -> Vec<Value>,
    {
        for index in self.indices.values() {
            if let Index::Unique(idx) = index {
                let values = key_values(idx.columns());
                let key: Vec<Key> = values.iter().map(Key::from).collect();
                if idx.contains(&key) {
                    return Err(TableError::UniqueViolation {
                        index: idx.name().to_string(),
                        key: format_values(&values),
                    });
                }
            }
        }
        Ok(())
    }

    /// Incrementally index a newly appended row
    pub(crate) fn insert_row(&mut self, columns: &Columns, row: usize) -> Result<()> {
        for index in self.indices.values_mut() {
            match index {
                Index::Unique(idx) => {
                    let resolved = resolve(columns, idx.columns())?;
                    let key = key_at(&resolved, row);
                    let display = format_values(&values_at(&resolved, row));
                    idx.insert(key, row, &display)?;
                }
                Index::Multi(idx) => {
                    let resolved = resolve(columns, idx.columns())?;
                    idx.insert(key_at(&resolved, row), row);
                }
                Index::Interval(idx) => {
                    let [low_name, high_name] = idx.columns();
                    let lo = columns.get(low_name).and_then(|c| c.value_at(row).as_f64());
                    let hi = columns
                        .get(high_name)
                        .and_then(|c| c.value_at(row).as_f64());
                    if let (Some(lo), Some(hi)) = (lo, hi) {
                        idx.insert(lo, hi, row);
                    }
                }
            }
        }
        Ok(())
    }

    /// Plan the incremental patches for a single-cell update.
    ///
    /// Fails before any state changes if the new key would violate a unique
    /// index, leaving frame and indices untouched.
    pub(crate) fn plan_cell_update(
        &self,
        columns: &Columns,
        column: &str,
        row: usize,
        new_value: &Value,
    ) -> Result<Vec<CellPatch>> {
        let mut patches = Vec::new();

        for index in self.indices.values() {
            if !index.references(column) {
                continue;
            }

            match index {
                Index::Unique(idx) => {
                    let resolved = resolve(columns, idx.columns())?;
                    let old_key = key_at(&resolved, row);
                    let new_values = substitute(idx.columns(), &resolved, row, column, new_value);
                    let new_key: Vec<Key> = new_values.iter().map(Key::from).collect();
                    if let Some(existing) = idx.find(&new_key) {
                        if existing != row {
                            return Err(TableError::UniqueViolation {
                                index: idx.name().to_string(),
                                key: format_values(&new_values),
                            });
                        }
                    }
                    patches.push(CellPatch::Unique {
                        index: idx.name().to_string(),
                        old_key,
                        new_key,
                    });
                }
                Index::Multi(idx) => {
                    let resolved = resolve(columns, idx.columns())?;
                    let old_key = key_at(&resolved, row);
                    let new_values = substitute(idx.columns(), &resolved, row, column, new_value);
                    patches.push(CellPatch::Multi {
                        index: idx.name().to_string(),
                        old_key,
                        new_key: new_values.iter().map(Key::from).collect(),
                    });
                }
                Index::Interval(idx) => {
                    let [low_name, high_name] = idx.columns();
                    let endpoint = |name: &str| -> Option<f64> {
                        if name == column {
                            new_value.as_f64()
                        } else {
                            columns.get(name).and_then(|c| c.value_at(row).as_f64())
                        }
                    };
                    let old_lo = columns
                        .get(low_name)
                        .and_then(|c| c.value_at(row).as_f64());
                    let old_hi = columns
                        .get(high_name)
                        .and_then(|c| c.value_at(row).as_f64());
                    patches.push(CellPatch::Interval {
                        index: idx.name().to_string(),
                        old: old_lo.zip(old_hi),
                        new: endpoint(low_name).zip(endpoint(high_name)),
                    });
                }
            }
        }
        Ok(patches)
    }

    /// Apply a planned single-cell update
    pub(crate) fn apply_cell_update(&mut self, patches: Vec<CellPatch>, row: usize) {
        for patch in patches {
            match patch {
                CellPatch::Unique {
                    index,
                    old_key,
                    new_key,
                } => {
                    if let Some(Index::Unique(idx)) = self.indices.get_mut(&index) {
                        idx.remove_key(&old_key);
                        // Planned and pre-checked; cannot collide here.
                        let _ = idx.insert(new_key, row, "");
                    }
                }
                CellPatch::Multi {
                    index,
                    old_key,
                    new_key,
                } => {
                    if let Some(Index::Multi(idx)) = self.indices.get_mut(&index) {
                        idx.remove_row(&old_key, row);
                        idx.insert(new_key, row);
                    }
                }
                CellPatch::Interval { index, old, new } => {
                    if let Some(Index::Interval(idx)) = self.indices.get_mut(&index) {
                        if let Some((lo, _)) = old {
                            idx.remove(lo, row);
                        }
                        if let Some((lo, hi)) = new {
                            idx.insert(lo, hi, row);
                        }
                    }
                }
            }
        }
    }
}

// Candidate key values for a cell update: the current row with `column`
// replaced by the new value at every position that names it.
fn substitute(
    names: &[String],
    resolved: &[&crate::table::AnyColumn],
    row: usize,
    column: &str,
    new_value: &Value,
) -> Vec<Value> {
    names
        .iter()
        .zip(resolved.iter())
        .map(|(name, col)| {
            if name == column {
                new_value.clone()
            } else {
                col.value_at(row)
            }
        })
        .collect()
}
