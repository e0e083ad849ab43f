//! Hash indices over key tuples

use crate::table::{AnyColumn, Key, Result, TableError, Value};

use indexmap::IndexMap;
use std::collections::HashMap;

pub(crate) type Columns = IndexMap<String, AnyColumn>;

/// Resolve the indexed columns inside a frame's column registry
pub(crate) fn resolve<'a>(columns: &'a Columns, names: &[String]) -> Result<Vec<&'a AnyColumn>> {
    names
        .iter()
        .map(|name| {
            columns
                .get(name)
                .ok_or_else(|| TableError::ColumnNotFound(name.clone()))
        })
        .collect()
}

pub(crate) fn key_at(resolved: &[&AnyColumn], row: usize) -> Vec<Key> {
    resolved
        .iter()
        .map(|col| Key::from(&col.value_at(row)))
        .collect()
}

pub(crate) fn values_at(resolved: &[&AnyColumn], row: usize) -> Vec<Value> {
    resolved.iter().map(|col| col.value_at(row)).collect()
}

/// An index enforcing exactly one row per key tuple
#[derive(Debug, Clone)]
pub struct UniqueIndex {
    name: String,
    columns: Vec<String>,
    map: HashMap<Vec<Key>, usize>,
}

impl UniqueIndex {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            map: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rebuild from scratch; fails fast on the first duplicate key
    pub fn build(&mut self, columns: &Columns, nrows: usize) -> Result<()> {
        let resolved = resolve(columns, &self.columns)?;
        let mut map = HashMap::with_capacity(nrows);

        for row in 0..nrows {
            let key = key_at(&resolved, row);
            if map.insert(key, row).is_some() {
                return Err(TableError::UniqueViolation {
                    index: self.name.clone(),
                    key: crate::table::format_values(&values_at(&resolved, row)),
                });
            }
        }

        self.map = map;
        Ok(())
    }

    /// The row for a key tuple, if any
    pub fn find(&self, key: &[Key]) -> Option<usize> {
        self.map.get(key).copied()
    }

    pub fn contains(&self, key: &[Key]) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn insert(&mut self, key: Vec<Key>, row: usize, display: &str) -> Result<()> {
        if let Some(existing) = self.map.get(&key) {
            if *existing != row {
                return Err(TableError::UniqueViolation {
                    index: self.name.clone(),
                    key: display.to_string(),
                });
            }
        }
        self.map.insert(key, row);
        Ok(())
    }

    pub(crate) fn remove_key(&mut self, key: &[Key]) {
        self.map.remove(key);
    }

    pub(crate) fn rename_column(&mut self, old: &str, new: &str) {
        for column in self.columns.iter_mut() {
            if column == old {
                *column = new.to_string();
            }
        }
    }
}

/// An index mapping each key tuple to its rows in insertion order
#[derive(Debug, Clone)]
pub struct MultiIndex {
    name: String,
    columns: Vec<String>,
    map: IndexMap<Vec<Key>, Vec<usize>>,
}

impl MultiIndex {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            map: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rebuild from scratch
    pub fn build(&mut self, columns: &Columns, nrows: usize) -> Result<()> {
        let resolved = resolve(columns, &self.columns)?;
        let mut map: IndexMap<Vec<Key>, Vec<usize>> = IndexMap::new();

        for row in 0..nrows {
            map.entry(key_at(&resolved, row)).or_default().push(row);
        }

        self.map = map;
        Ok(())
    }

    /// Rows for a key tuple, in insertion order
    pub fn find(&self, key: &[Key]) -> &[usize] {
        self.map.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_first(&self, key: &[Key]) -> Option<usize> {
        self.find(key).first().copied()
    }

    /// Number of distinct key tuples
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn insert(&mut self, key: Vec<Key>, row: usize) {
        self.map.entry(key).or_default().push(row);
    }

    pub(crate) fn remove_row(&mut self, key: &[Key], row: usize) {
        if let Some(rows) = self.map.get_mut(key) {
            rows.retain(|&r| r != row);
            if rows.is_empty() {
                self.map.shift_remove(key);
            }
        }
    }

    pub(crate) fn rename_column(&mut self, old: &str, new: &str) {
        for column in self.columns.iter_mut() {
            if column == old {
                *column = new.to_string();
            }
        }
    }
}
