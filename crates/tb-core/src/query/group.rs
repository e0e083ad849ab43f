//! Order-preserving group-by

use crate::expr::Predicate;
use crate::table::{key_tuple, Frame, Key, Result, TableError, Value};

use indexmap::IndexMap;

/// One partition of rows sharing a key tuple
#[derive(Debug, Clone)]
pub struct Group {
    key: Vec<Value>,
    rows: Vec<usize>,
}

impl Group {
    /// The key tuple shared by every row of the group
    pub fn key(&self) -> &[Value] {
        &self.key
    }

    /// Row ids in insertion order
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row of the group, used as its representative
    pub fn representative(&self) -> Option<usize> {
        self.rows.first().copied()
    }
}

/// A partition of a frame's rows keyed by value tuples, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    columns: Vec<String>,
    groups: IndexMap<Vec<Key>, Group>,
}

impl Grouping {
    /// The grouping columns
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of distinct groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn get(&self, position: usize) -> Option<&Group> {
        self.groups.get_index(position).map(|(_, group)| group)
    }

    /// The group matching a key tuple, if any
    pub fn find_by_values(&self, values: &[Value]) -> Option<&Group> {
        self.groups.get(&key_tuple(values))
    }

    /// Sub-grouping of the groups whose representative row satisfies the
    /// predicate
    pub fn find(&self, frame: &Frame, predicate: &Predicate) -> Result<Grouping> {
        let mut groups = IndexMap::new();

        for (key, group) in &self.groups {
            let Some(row) = group.representative() else {
                continue;
            };
            if predicate.valid(&frame.row(row)?)? {
                groups.insert(key.clone(), group.clone());
            }
        }

        Ok(Grouping {
            columns: self.columns.clone(),
            groups,
        })
    }
}

/// Partition a frame's rows by their key tuple over the given columns.
///
/// Single pass; groups appear in first-occurrence order and rows keep their
/// insertion order within each group.
pub fn group_by(frame: &Frame, columns: &[&str]) -> Result<Grouping> {
    let resolved: Vec<_> = columns
        .iter()
        .map(|name| {
            frame
                .columns()
                .get(*name)
                .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
        })
        .collect::<Result<_>>()?;

    let mut groups: IndexMap<Vec<Key>, Group> = IndexMap::new();
    for row in 0..frame.nrows() {
        let values: Vec<Value> = resolved.iter().map(|col| col.value_at(row)).collect();
        groups
            .entry(key_tuple(&values))
            .or_insert_with(|| Group {
                key: values,
                rows: Vec::new(),
            })
            .rows
            .push(row);
    }

    Ok(Grouping {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        groups,
    })
}
