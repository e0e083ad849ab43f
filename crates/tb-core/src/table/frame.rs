//! Frame orchestration
//!
//! The frame owns its header, columns and index registry and routes every
//! mutation through all three so they stay mutually consistent. Structural
//! changes (row count, column identity) bump the generation counter that
//! invalidates outstanding row views.

use super::*;

use crate::index::{Index, IndexRegistry, IntervalIndex, MultiIndex, UniqueIndex};

use indexmap::IndexMap;
use std::collections::HashSet;

/// An embedded table: typed columns, header, indices
#[derive(Debug, Clone, Default)]
pub struct Frame {
    header: Header,
    columns: IndexMap<String, AnyColumn>,
    indices: IndexRegistry,
    nrows: usize,
    generation: u64,
    config: FrameConfig,
}

impl Frame {
    /// Create an empty frame with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty frame with an explicit configuration
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Pre-create columns from (name, kind) pairs, e.g. a schema loader
    pub fn from_schema<I, S>(pairs: I, config: FrameConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ValueKind)>,
        S: Into<String>,
    {
        let mut frame = Frame::with_config(config);
        for (name, kind) in pairs {
            frame.add_column(name.into(), kind)?;
        }
        Ok(frame)
    }

    /// Build a frame from fully populated columns of equal length
    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = AnyColumn>,
    {
        let mut frame = Frame::new();
        for column in columns {
            frame.insert_column(column)?;
        }
        Ok(frame)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nrows == 0
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Monotonic counter bumped on every structural change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn get_column(&self, name: &str) -> Result<&AnyColumn> {
        self.columns
            .get(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    pub(crate) fn columns(&self) -> &IndexMap<String, AnyColumn> {
        &self.columns
    }

    // ---- column-level mutation -------------------------------------------

    /// Add an empty column of the given kind, NA-filled to the frame size
    pub fn add_column(&mut self, name: impl Into<String>, kind: ValueKind) -> Result<()> {
        let name = name.into();
        self.header.add(name.clone(), kind)?;

        let mut column = self.config.registry.make_column(&name, kind);
        for _ in 0..self.nrows {
            column.push_na();
        }
        self.columns.insert(name, column);
        self.generation += 1;
        Ok(())
    }

    /// Attach an existing column; it defines the frame size when first
    pub fn insert_column(&mut self, column: AnyColumn) -> Result<()> {
        let name = column.name().to_string();
        if self.columns.is_empty() {
            self.nrows = column.len();
        } else if column.len() != self.nrows {
            return Err(TableError::LengthMismatch {
                expected: self.nrows,
                actual: column.len(),
            });
        }

        self.header.add(name.clone(), column.kind())?;
        self.columns.insert(name, column);
        self.generation += 1;
        Ok(())
    }

    /// Remove a column; indices derived from it are dropped
    pub fn remove_column(&mut self, name: &str) -> Result<AnyColumn> {
        self.header.remove(name)?;
        let column = self
            .columns
            .shift_remove(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))?;

        let dropped = self.indices.drop_referencing(name);
        if !dropped.is_empty() {
            tracing::warn!(column = name, indices = ?dropped, "dropped indices with removed column");
        }

        if self.columns.is_empty() {
            self.nrows = 0;
        }
        self.generation += 1;
        Ok(column)
    }

    /// Rename a column, keeping its position; indices follow the new name
    pub fn rename_column(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let new = new.into();
        self.header.rename(old, new.clone())?;

        self.columns = self
            .columns
            .drain(..)
            .map(|(name, mut column)| {
                if name == old {
                    column.set_name(&new);
                    (new.clone(), column)
                } else {
                    (name, column)
                }
            })
            .collect();

        self.indices.rename_column(old, &new);
        self.generation += 1;
        Ok(())
    }

    /// Swap in a replacement column under the same name; affected indices are
    /// rebuilt in full
    pub fn replace_column(&mut self, name: &str, mut column: AnyColumn) -> Result<()> {
        if !self.columns.contains_key(name) {
            return Err(TableError::ColumnNotFound(name.to_string()));
        }
        if column.len() != self.nrows {
            return Err(TableError::LengthMismatch {
                expected: self.nrows,
                actual: column.len(),
            });
        }

        column.set_name(name);
        self.header.replace(name, column.kind())?;
        self.columns.insert(name.to_string(), column);
        self.generation += 1;
        self.indices
            .rebuild_referencing(name, &self.columns, self.nrows)
    }

    // ---- row-level mutation ----------------------------------------------

    /// Append one row of values in header order.
    ///
    /// Fails fast before any state changes on arity, type or unique-key
    /// violations; indices are updated incrementally on success.
    pub fn append_row(&mut self, values: Vec<Value>) -> Result<usize> {
        if values.len() != self.columns.len() {
            return Err(TableError::RowArity {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        for ((name, kind), value) in self.header.iter().zip(values.iter()) {
            if !kind_accepts(kind, value) {
                return Err(TableError::TypeMismatch {
                    column: name.to_string(),
                    expected: kind,
                    actual: value.type_name(),
                });
            }
        }

        self.indices.check_unique_row(|names| {
            names
                .iter()
                .map(|n| {
                    self.header
                        .position(n)
                        .map(|i| values[i].clone())
                        .unwrap_or(Value::Na)
                })
                .collect()
        })?;

        let row = self.nrows;
        for (column, value) in self.columns.values_mut().zip(values) {
            column.push_value(value)?;
        }
        self.nrows += 1;
        self.generation += 1;
        self.indices.insert_row(&self.columns, row)?;
        Ok(row)
    }

    /// Remove one row; every index is rebuilt since row ids shift
    pub fn remove_row(&mut self, row: usize) -> Result<()> {
        if row >= self.nrows {
            return Err(TableError::RowOutOfBounds {
                index: row,
                len: self.nrows,
            });
        }

        for column in self.columns.values_mut() {
            column.remove(row)?;
        }
        self.nrows -= 1;
        self.generation += 1;
        self.indices.rebuild_all(&self.columns, self.nrows)
    }

    /// Overwrite a single cell.
    ///
    /// Index maintenance is incremental: only entries derived from this row
    /// are patched, and a unique-key conflict is detected before anything
    /// mutates. Row views stay valid; the generation does not change.
    pub fn set_value(&mut self, column: &str, row: usize, value: Value) -> Result<()> {
        let kind = self
            .header
            .kind(column)
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))?;
        if row >= self.nrows {
            return Err(TableError::RowOutOfBounds {
                index: row,
                len: self.nrows,
            });
        }
        if !kind_accepts(kind, &value) {
            return Err(TableError::TypeMismatch {
                column: column.to_string(),
                expected: kind,
                actual: value.type_name(),
            });
        }

        let patches = self
            .indices
            .plan_cell_update(&self.columns, column, row, &value)?;

        let slot = self
            .columns
            .get_mut(column)
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))?;
        slot.set_value(row, value)?;

        self.indices.apply_cell_update(patches, row);
        Ok(())
    }

    /// Sort rows by one or more columns; all indices are rebuilt
    pub fn sort_by(&mut self, specs: &[(&str, bool)]) -> Result<()> {
        if specs.is_empty() {
            return Ok(());
        }

        let mut keys = Vec::with_capacity(specs.len());
        for (name, ascending) in specs {
            keys.push((self.get_column(name)?, *ascending));
        }

        let mut permutation: Vec<usize> = (0..self.nrows).collect();
        permutation.sort_by(|&a, &b| {
            for (column, ascending) in &keys {
                let ord = column.value_at(a).total_cmp(&column.value_at(b));
                if ord != std::cmp::Ordering::Equal {
                    return if *ascending { ord } else { ord.reverse() };
                }
            }
            std::cmp::Ordering::Equal
        });

        for column in self.columns.values_mut() {
            column.permute(&permutation);
        }
        self.generation += 1;
        self.indices.rebuild_all(&self.columns, self.nrows)
    }

    /// Reverse row order; all indices are rebuilt
    pub fn reverse_rows(&mut self) -> Result<()> {
        for column in self.columns.values_mut() {
            column.reverse();
        }
        self.generation += 1;
        self.indices.rebuild_all(&self.columns, self.nrows)
    }

    /// Keep only rows the predicate accepts, in place
    pub fn retain<F>(&mut self, mut predicate: F) -> Result<()>
    where
        F: FnMut(&RowView<'_>) -> Result<bool>,
    {
        let mut mask = Vec::with_capacity(self.nrows);
        for row in self.rows() {
            mask.push(predicate(&row)?);
        }

        for column in self.columns.values_mut() {
            column.retain_mask(&mask);
        }
        self.nrows = mask.iter().filter(|&&keep| keep).count();
        self.generation += 1;
        self.indices.rebuild_all(&self.columns, self.nrows)
    }

    /// Produce a new frame with the rows the predicate accepts.
    ///
    /// The result carries no indices; add them on the new frame as needed.
    pub fn filter<F>(&self, mut predicate: F) -> Result<Frame>
    where
        F: FnMut(&RowView<'_>) -> Result<bool>,
    {
        let mut mask = Vec::with_capacity(self.nrows);
        for row in self.rows() {
            mask.push(predicate(&row)?);
        }

        let mut columns = self.columns.clone();
        for column in columns.values_mut() {
            column.retain_mask(&mask);
        }

        Ok(Frame {
            header: self.header.clone(),
            nrows: mask.iter().filter(|&&keep| keep).count(),
            columns,
            indices: IndexRegistry::new(),
            generation: 0,
            config: self.config.clone(),
        })
    }

    /// Append all rows of a structurally compatible frame
    pub fn concat(&mut self, other: &Frame) -> Result<()> {
        if !self.header.is_compatible(other.header()) {
            return Err(TableError::IncompatibleHeaders {
                left: self.header.describe(),
                right: other.header.describe(),
            });
        }

        self.check_unique_batch(other)?;

        let first_new = self.nrows;
        for row in 0..other.nrows {
            for (name, column) in self.columns.iter_mut() {
                let value = other.columns[name].value_at(row);
                column.push_value(value)?;
            }
        }
        self.nrows += other.nrows;
        self.generation += 1;

        for row in first_new..self.nrows {
            self.indices.insert_row(&self.columns, row)?;
        }
        Ok(())
    }

    // Incoming rows must not collide with existing unique keys or each other.
    fn check_unique_batch(&self, other: &Frame) -> Result<()> {
        for name in self.indices.names().map(str::to_string).collect::<Vec<_>>() {
            if let Index::Unique(idx) = self.indices.get(&name)? {
                let mut seen: HashSet<Vec<Key>> = HashSet::new();
                for row in 0..other.nrows {
                    let values: Vec<Value> = idx
                        .columns()
                        .iter()
                        .map(|c| {
                            other
                                .columns
                                .get(c)
                                .map(|col| col.value_at(row))
                                .unwrap_or(Value::Na)
                        })
                        .collect();
                    let key = key_tuple(&values);
                    if idx.contains(&key) || !seen.insert(key) {
                        return Err(TableError::UniqueViolation {
                            index: idx.name().to_string(),
                            key: format_values(&values),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Drop all rows, keeping columns and indices registered
    pub fn clear(&mut self) -> Result<()> {
        for column in self.columns.values_mut() {
            column.clear();
        }
        self.nrows = 0;
        self.generation += 1;
        self.indices.rebuild_all(&self.columns, 0)
    }

    // ---- cell access ------------------------------------------------------

    pub fn value(&self, column: &str, row: usize) -> Result<Value> {
        self.get_column(column)?.value(row)
    }

    pub fn is_na(&self, column: &str, row: usize) -> Result<bool> {
        self.get_column(column)?.is_na(row)
    }

    pub fn row(&self, row: usize) -> Result<RowView<'_>> {
        if row >= self.nrows {
            return Err(TableError::RowOutOfBounds {
                index: row,
                len: self.nrows,
            });
        }
        Ok(RowView::new(self, row))
    }

    pub fn rows(&self) -> RowIter<'_> {
        RowIter::new(self)
    }

    pub(crate) fn row_values(&self, row: usize) -> Result<Vec<Value>> {
        self.columns.values().map(|c| c.value(row)).collect()
    }

    // ---- index facade -----------------------------------------------------

    /// Add a non-unique index over one or more columns
    pub fn add_index(&mut self, name: impl Into<String>, columns: &[&str]) -> Result<()> {
        let index = MultiIndex::new(name, columns.iter().map(|c| c.to_string()).collect());
        self.indices
            .add(Index::Multi(index), &self.columns, self.nrows)
    }

    /// Add a unique-key index; building fails fast on duplicate keys
    pub fn add_unique_index(&mut self, name: impl Into<String>, columns: &[&str]) -> Result<()> {
        let index = UniqueIndex::new(name, columns.iter().map(|c| c.to_string()).collect());
        self.indices
            .add(Index::Unique(index), &self.columns, self.nrows)
    }

    /// Add an interval index over two numeric columns read as [low, high]
    pub fn add_interval_index(
        &mut self,
        name: impl Into<String>,
        low_column: &str,
        high_column: &str,
    ) -> Result<()> {
        let index = IntervalIndex::new(name, low_column, high_column);
        self.indices
            .add(Index::Interval(index), &self.columns, self.nrows)
    }

    pub fn remove_index(&mut self, name: &str) -> Result<()> {
        self.indices.remove(name).map(|_| ())
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indices.contains(name)
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.indices.names().collect()
    }

    /// Rows matching a key tuple through a hash index
    pub fn find_rows(&self, index: &str, key: &[Value]) -> Result<Vec<usize>> {
        let key = key_tuple(key);
        match self.indices.get(index)? {
            Index::Unique(idx) => Ok(idx.find(&key).into_iter().collect()),
            Index::Multi(idx) => Ok(idx.find(&key).to_vec()),
            Index::Interval(_) => Err(TableError::WrongIndexKind {
                index: index.to_string(),
                query: "key",
            }),
        }
    }

    /// First row matching a key tuple
    pub fn find_first(&self, index: &str, key: &[Value]) -> Result<Option<usize>> {
        Ok(self.find_rows(index, key)?.first().copied())
    }

    /// Rows whose interval intersects [lo, hi]
    pub fn interval_search(&self, index: &str, lo: f64, hi: f64) -> Result<Vec<usize>> {
        match self.indices.get(index)? {
            Index::Interval(idx) => Ok(idx.search(lo, hi)),
            _ => Err(TableError::WrongIndexKind {
                index: index.to_string(),
                query: "interval",
            }),
        }
    }

    /// Rows whose interval contains the point
    pub fn interval_stab(&self, index: &str, point: f64) -> Result<Vec<usize>> {
        match self.indices.get(index)? {
            Index::Interval(idx) => Ok(idx.stab(point)),
            _ => Err(TableError::WrongIndexKind {
                index: index.to_string(),
                query: "interval",
            }),
        }
    }
}

// Na always fits; ints fit float columns.
fn kind_accepts(kind: ValueKind, value: &Value) -> bool {
    match value {
        Value::Na => true,
        Value::Int(_) if kind == ValueKind::Float => true,
        v => v.kind() == Some(kind),
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({} rows × {} cols)", self.nrows, self.ncols())
    }
}
