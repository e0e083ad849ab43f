//! Header and column-factory configuration
//!
//! The header is an ordered name-to-kind registry owned by exactly one
//! frame. Column construction goes through an explicit type registry held in
//! a `FrameConfig`, never through a mutable global.

use super::*;

use indexmap::IndexMap;

/// Ordered registry of column names and kinds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    columns: IndexMap<String, ValueKind>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Append a column description
    pub fn add(&mut self, name: impl Into<String>, kind: ValueKind) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        self.columns.insert(name, kind);
        Ok(())
    }

    /// Remove a column description
    pub fn remove(&mut self, name: &str) -> Result<ValueKind> {
        self.columns
            .shift_remove(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    /// Rename a column, keeping its position
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let new = new.into();
        if !self.columns.contains_key(old) {
            return Err(TableError::ColumnNotFound(old.to_string()));
        }
        if old != new && self.columns.contains_key(&new) {
            return Err(TableError::DuplicateColumn(new));
        }

        self.columns = self
            .columns
            .drain(..)
            .map(|(name, kind)| {
                if name == old {
                    (new.clone(), kind)
                } else {
                    (name, kind)
                }
            })
            .collect();
        Ok(())
    }

    /// Replace a column's kind in place
    pub fn replace(&mut self, name: &str, kind: ValueKind) -> Result<()> {
        match self.columns.get_mut(name) {
            Some(slot) => {
                *slot = kind;
                Ok(())
            }
            None => Err(TableError::ColumnNotFound(name.to_string())),
        }
    }

    pub fn kind(&self, name: &str) -> Option<ValueKind> {
        self.columns.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Position of a column in declaration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ValueKind)> {
        self.columns.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Structural compatibility for concatenation: same names mapped to the
    /// same kinds, in the same declaration order
    pub fn is_compatible(&self, other: &Header) -> bool {
        self.columns.iter().eq(other.columns.iter())
    }

    pub(crate) fn describe(&self) -> String {
        self.iter()
            .map(|(name, kind)| format!("{}:{}", name, kind))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Factory producing an empty column for a type tag
pub type ColumnFactory = fn(&str) -> AnyColumn;

/// Explicit registry mapping type tags to column factories.
///
/// Populated by explicit `register` calls; the default registry covers the
/// four builtin kinds.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    factories: IndexMap<ValueKind, ColumnFactory>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = Self {
            factories: IndexMap::new(),
        };
        registry.register(ValueKind::Int, |name| AnyColumn::Int(Column::new(name)));
        registry.register(ValueKind::Float, |name| AnyColumn::Float(Column::new(name)));
        registry.register(ValueKind::Bool, |name| AnyColumn::Bool(Column::new(name)));
        registry.register(ValueKind::Str, |name| AnyColumn::Str(Column::new(name)));
        registry
    }
}

impl TypeRegistry {
    /// Register or override the factory for a type tag
    pub fn register(&mut self, kind: ValueKind, factory: ColumnFactory) {
        self.factories.insert(kind, factory);
    }

    /// Construct an empty column for a type tag
    pub fn make_column(&self, name: &str, kind: ValueKind) -> AnyColumn {
        match self.factories.get(&kind) {
            Some(factory) => factory(name),
            None => AnyColumn::empty(name, kind),
        }
    }
}

/// Per-frame configuration, passed at construction time
#[derive(Debug, Clone, Default)]
pub struct FrameConfig {
    pub registry: TypeRegistry,
}
