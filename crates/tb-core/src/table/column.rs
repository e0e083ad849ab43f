//! Growable typed columns with NA slots
//!
//! `Column<T>` is the storage primitive: a growable array where each slot is
//! either a real value of one static type or NA. The `Cell` trait is the
//! value-type descriptor; `Numeric` adds elementwise arithmetic and
//! aggregates for int and float columns. `AnyColumn` wraps the concrete
//! columns for heterogeneous storage inside a frame.

use super::*;

use std::cmp::Ordering;

/// Value-type descriptor for column cells
pub trait Cell: Clone + PartialOrd + std::fmt::Debug {
    /// Type tag of this cell type
    const KIND: ValueKind;

    /// Convert into a dynamic value
    fn into_value(self) -> Value;

    /// Extract from a dynamic value; `None` on kind mismatch
    fn from_value(value: Value) -> Option<Self>;

    /// Ordering between two cells of the same type
    fn compare(&self, other: &Self) -> Ordering;
}

impl Cell for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Cell for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            Value::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl Cell for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Cell for String {
    const KIND: ValueKind = ValueKind::Str;

    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// Optional arithmetic capability, implemented only by numeric cell types
pub trait Numeric: Cell {
    /// `None` marks a slot that becomes NA (e.g. integer division by zero)
    fn add(self, other: Self) -> Option<Self>;
    fn sub(self, other: Self) -> Option<Self>;
    fn mul(self, other: Self) -> Option<Self>;
    fn div(self, other: Self) -> Option<Self>;

    fn to_f64(&self) -> f64;
}

impl Numeric for i64 {
    fn add(self, other: Self) -> Option<Self> {
        self.checked_add(other)
    }

    fn sub(self, other: Self) -> Option<Self> {
        self.checked_sub(other)
    }

    fn mul(self, other: Self) -> Option<Self> {
        self.checked_mul(other)
    }

    fn div(self, other: Self) -> Option<Self> {
        self.checked_div(other)
    }

    fn to_f64(&self) -> f64 {
        *self as f64
    }
}

impl Numeric for f64 {
    fn add(self, other: Self) -> Option<Self> {
        Some(self + other)
    }

    fn sub(self, other: Self) -> Option<Self> {
        Some(self - other)
    }

    fn mul(self, other: Self) -> Option<Self> {
        Some(self * other)
    }

    fn div(self, other: Self) -> Option<Self> {
        Some(self / other)
    }

    fn to_f64(&self) -> f64 {
        *self
    }
}

/// A named, growable array of one static cell type with NA tracking
#[derive(Debug, Clone, PartialEq)]
pub struct Column<T: Cell> {
    name: String,
    slots: Vec<Option<T>>,
}

impl<T: Cell> Column<T> {
    /// Create an empty column
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
        }
    }

    /// Create an empty column with pre-sized capacity
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Create a column from explicit slots
    pub fn from_slots(name: impl Into<String>, slots: Vec<Option<T>>) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    /// Create a column from real values, no NA
    pub fn from_values(name: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Self {
            name: name.into(),
            slots: values.into_iter().map(Some).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Get the value at a row; `None` for NA
    pub fn get(&self, row: usize) -> Result<Option<&T>> {
        self.slots
            .get(row)
            .map(|slot| slot.as_ref())
            .ok_or(TableError::RowOutOfBounds {
                index: row,
                len: self.slots.len(),
            })
    }

    /// Overwrite the slot at a row; `None` writes NA
    pub fn set(&mut self, row: usize, value: Option<T>) -> Result<()> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(row)
            .ok_or(TableError::RowOutOfBounds { index: row, len })?;
        *slot = value;
        Ok(())
    }

    /// Append a real value
    pub fn push(&mut self, value: T) {
        self.grow_for_push();
        self.slots.push(Some(value));
    }

    /// Append an NA slot
    pub fn push_na(&mut self) {
        self.grow_for_push();
        self.slots.push(None);
    }

    // Geometric growth at ~1.6x instead of Vec's doubling.
    fn grow_for_push(&mut self) {
        let cap = self.slots.capacity();
        if self.slots.len() == cap {
            let next = (cap + cap * 3 / 5).max(4);
            self.slots.reserve_exact(next - self.slots.len());
        }
    }

    pub fn is_na(&self, row: usize) -> Result<bool> {
        Ok(self.get(row)?.is_none())
    }

    /// Count of NA slots
    pub fn na_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn reverse(&mut self) {
        self.slots.reverse();
    }

    /// Sort slots in place; NA sorts below every real value
    pub fn sort(&mut self, ascending: bool) {
        self.sort_by(|a, b| a.compare(b), ascending);
    }

    /// Sort with a caller-supplied comparator over real values.
    /// NA slots always order below real values regardless of the comparator.
    pub fn sort_by<F>(&mut self, mut cmp: F, ascending: bool)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.slots.sort_by(|a, b| {
            let ord = match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => cmp(a, b),
            };
            if ascending { ord } else { ord.reverse() }
        });
    }

    /// Transform each real value in place, skipping NA
    pub fn map<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> T,
    {
        for slot in self.slots.iter_mut() {
            if let Some(v) = slot {
                *v = f(v);
            }
        }
    }

    /// Iterate over slots
    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> {
        self.slots.iter().map(|s| s.as_ref())
    }

    /// Collect slots into a plain vector
    pub fn to_vec(&self) -> Vec<Option<T>> {
        self.slots.clone()
    }

    pub(crate) fn remove(&mut self, row: usize) -> Result<()> {
        if row >= self.slots.len() {
            return Err(TableError::RowOutOfBounds {
                index: row,
                len: self.slots.len(),
            });
        }
        self.slots.remove(row);
        Ok(())
    }

    pub(crate) fn retain_mask(&mut self, mask: &[bool]) {
        let mut keep = mask.iter();
        self.slots.retain(|_| *keep.next().unwrap_or(&false));
    }

    pub(crate) fn permute(&mut self, permutation: &[usize]) {
        let old = std::mem::take(&mut self.slots);
        let mut new = Vec::with_capacity(old.len());
        for &src in permutation {
            new.push(old[src].clone());
        }
        self.slots = new;
    }
}

impl<T: Numeric> Column<T> {
    /// Elementwise addition against another column of the same type
    pub fn add_column(&mut self, other: &Column<T>) -> Result<()> {
        self.zip_apply("add", other, T::add)
    }

    pub fn sub_column(&mut self, other: &Column<T>) -> Result<()> {
        self.zip_apply("subtract", other, T::sub)
    }

    pub fn mul_column(&mut self, other: &Column<T>) -> Result<()> {
        self.zip_apply("multiply", other, T::mul)
    }

    pub fn div_column(&mut self, other: &Column<T>) -> Result<()> {
        self.zip_apply("divide", other, T::div)
    }

    /// Elementwise addition of a scalar
    pub fn add_scalar(&mut self, value: T) {
        self.scalar_apply("add", value, T::add);
    }

    pub fn sub_scalar(&mut self, value: T) {
        self.scalar_apply("subtract", value, T::sub);
    }

    pub fn mul_scalar(&mut self, value: T) {
        self.scalar_apply("multiply", value, T::mul);
    }

    pub fn div_scalar(&mut self, value: T) {
        self.scalar_apply("divide", value, T::div);
    }

    // NA on either side leaves the output slot NA; the skipped count goes to
    // the warning channel, never to an error.
    fn zip_apply<F>(&mut self, op: &str, other: &Column<T>, f: F) -> Result<()>
    where
        F: Fn(T, T) -> Option<T>,
    {
        if other.len() != self.len() {
            return Err(TableError::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }

        let mut skipped = 0usize;
        for (slot, rhs) in self.slots.iter_mut().zip(other.slots.iter()) {
            *slot = match (slot.take(), rhs) {
                (Some(a), Some(b)) => {
                    let out = f(a, b.clone());
                    if out.is_none() {
                        skipped += 1;
                    }
                    out
                }
                _ => {
                    skipped += 1;
                    None
                }
            };
        }

        if skipped > 0 {
            tracing::warn!(
                column = %self.name,
                op,
                skipped,
                "elementwise operation left NA slots"
            );
        }
        Ok(())
    }

    fn scalar_apply<F>(&mut self, op: &str, value: T, f: F)
    where
        F: Fn(T, T) -> Option<T>,
    {
        let mut skipped = 0usize;
        for slot in self.slots.iter_mut() {
            *slot = match slot.take() {
                Some(a) => {
                    let out = f(a, value.clone());
                    if out.is_none() {
                        skipped += 1;
                    }
                    out
                }
                None => {
                    skipped += 1;
                    None
                }
            };
        }

        if skipped > 0 {
            tracing::warn!(
                column = %self.name,
                op,
                skipped,
                "scalar operation left NA slots"
            );
        }
    }

    fn real_values(&self, op: &str) -> Vec<f64> {
        let values: Vec<f64> = self
            .slots
            .iter()
            .filter_map(|s| s.as_ref().map(Numeric::to_f64))
            .collect();

        let skipped = self.slots.len() - values.len();
        if skipped > 0 {
            tracing::warn!(column = %self.name, op, skipped, "aggregate skipped NA slots");
        }
        values
    }

    /// Sum of real values; 0 when the column holds none
    pub fn sum(&self) -> f64 {
        self.real_values("sum").iter().sum()
    }

    /// Mean over real values
    pub fn mean(&self) -> Option<f64> {
        let values = self.real_values("mean");
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    pub fn min(&self) -> Option<T> {
        self.slots
            .iter()
            .flatten()
            .cloned()
            .reduce(|a, b| if b.compare(&a) == Ordering::Less { b } else { a })
    }

    pub fn max(&self) -> Option<T> {
        self.slots
            .iter()
            .flatten()
            .cloned()
            .reduce(|a, b| if b.compare(&a) == Ordering::Greater { b } else { a })
    }

    /// Median over real values; sorts a copy
    pub fn median(&self) -> Option<f64> {
        self.quantile(0.5)
    }

    /// Linear-interpolated quantile over real values; sorts a copy
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if !(0.0..=1.0).contains(&q) {
            return None;
        }

        let mut values = self.real_values("quantile");
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let index = (values.len() as f64 - 1.0) * q;
        let lower = index.floor() as usize;
        let upper = index.ceil() as usize;

        if lower == upper {
            Some(values[lower])
        } else {
            let weight = index - lower as f64;
            Some(values[lower] * (1.0 - weight) + values[upper] * weight)
        }
    }
}

/// A column of any supported cell type
#[derive(Debug, Clone, PartialEq)]
pub enum AnyColumn {
    Int(Column<i64>),
    Float(Column<f64>),
    Bool(Column<bool>),
    Str(Column<String>),
}

macro_rules! dispatch {
    ($self:expr, $col:ident => $body:expr) => {
        match $self {
            AnyColumn::Int($col) => $body,
            AnyColumn::Float($col) => $body,
            AnyColumn::Bool($col) => $body,
            AnyColumn::Str($col) => $body,
        }
    };
}

impl AnyColumn {
    /// Create an empty column of the given kind
    pub fn empty(name: &str, kind: ValueKind) -> Self {
        match kind {
            ValueKind::Int => AnyColumn::Int(Column::new(name)),
            ValueKind::Float => AnyColumn::Float(Column::new(name)),
            ValueKind::Bool => AnyColumn::Bool(Column::new(name)),
            ValueKind::Str => AnyColumn::Str(Column::new(name)),
        }
    }

    pub fn name(&self) -> &str {
        dispatch!(self, c => c.name())
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        dispatch!(self, c => c.set_name(name))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            AnyColumn::Int(_) => ValueKind::Int,
            AnyColumn::Float(_) => ValueKind::Float,
            AnyColumn::Bool(_) => ValueKind::Bool,
            AnyColumn::Str(_) => ValueKind::Str,
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, c => c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dynamic value at a row; NA slots read as `Value::Na`
    pub fn value(&self, row: usize) -> Result<Value> {
        match self {
            AnyColumn::Int(c) => Ok(c.get(row)?.map(|v| Value::Int(*v)).unwrap_or(Value::Na)),
            AnyColumn::Float(c) => Ok(c.get(row)?.map(|v| Value::Float(*v)).unwrap_or(Value::Na)),
            AnyColumn::Bool(c) => Ok(c.get(row)?.map(|v| Value::Bool(*v)).unwrap_or(Value::Na)),
            AnyColumn::Str(c) => Ok(c
                .get(row)?
                .map(|v| Value::Str(v.clone()))
                .unwrap_or(Value::Na)),
        }
    }

    // Bounds are the caller's responsibility; out of range reads as NA.
    pub(crate) fn value_at(&self, row: usize) -> Value {
        self.value(row).unwrap_or(Value::Na)
    }

    /// Overwrite a cell from a dynamic value
    pub fn set_value(&mut self, row: usize, value: Value) -> Result<()> {
        if value.is_na() {
            return dispatch!(self, c => c.set(row, None));
        }

        let expected = self.kind();
        let actual = value.type_name();
        let column = self.name().to_string();
        let mismatch = move || TableError::TypeMismatch {
            column,
            expected,
            actual,
        };

        match self {
            AnyColumn::Int(c) => c.set(row, Some(Cell::from_value(value).ok_or_else(mismatch)?)),
            AnyColumn::Float(c) => c.set(row, Some(Cell::from_value(value).ok_or_else(mismatch)?)),
            AnyColumn::Bool(c) => c.set(row, Some(Cell::from_value(value).ok_or_else(mismatch)?)),
            AnyColumn::Str(c) => c.set(row, Some(Cell::from_value(value).ok_or_else(mismatch)?)),
        }
    }

    /// Append a dynamic value; `Value::Na` appends an NA slot
    pub fn push_value(&mut self, value: Value) -> Result<()> {
        if value.is_na() {
            self.push_na();
            return Ok(());
        }

        let expected = self.kind();
        let actual = value.type_name();
        let column = self.name().to_string();
        let mismatch = move || TableError::TypeMismatch {
            column,
            expected,
            actual,
        };

        match self {
            AnyColumn::Int(c) => c.push(Cell::from_value(value).ok_or_else(mismatch)?),
            AnyColumn::Float(c) => c.push(Cell::from_value(value).ok_or_else(mismatch)?),
            AnyColumn::Bool(c) => c.push(Cell::from_value(value).ok_or_else(mismatch)?),
            AnyColumn::Str(c) => c.push(Cell::from_value(value).ok_or_else(mismatch)?),
        }
        Ok(())
    }

    pub fn push_na(&mut self) {
        dispatch!(self, c => c.push_na())
    }

    pub fn is_na(&self, row: usize) -> Result<bool> {
        dispatch!(self, c => c.is_na(row))
    }

    pub fn na_count(&self) -> usize {
        dispatch!(self, c => c.na_count())
    }

    pub fn clear(&mut self) {
        dispatch!(self, c => c.clear())
    }

    pub fn reverse(&mut self) {
        dispatch!(self, c => c.reverse())
    }

    pub(crate) fn remove(&mut self, row: usize) -> Result<()> {
        dispatch!(self, c => c.remove(row))
    }

    pub(crate) fn retain_mask(&mut self, mask: &[bool]) {
        dispatch!(self, c => c.retain_mask(mask))
    }

    pub(crate) fn permute(&mut self, permutation: &[usize]) {
        dispatch!(self, c => c.permute(permutation))
    }

    /// Sum of real values; errors for non-numeric columns
    pub fn sum(&self) -> Result<f64> {
        match self {
            AnyColumn::Int(c) => Ok(c.sum()),
            AnyColumn::Float(c) => Ok(c.sum()),
            other => Err(other.not_numeric()),
        }
    }

    pub fn mean(&self) -> Result<Option<f64>> {
        match self {
            AnyColumn::Int(c) => Ok(c.mean()),
            AnyColumn::Float(c) => Ok(c.mean()),
            other => Err(other.not_numeric()),
        }
    }

    pub fn min(&self) -> Result<Value> {
        match self {
            AnyColumn::Int(c) => Ok(c.min().map(Value::Int).unwrap_or(Value::Na)),
            AnyColumn::Float(c) => Ok(c.min().map(Value::Float).unwrap_or(Value::Na)),
            other => Err(other.not_numeric()),
        }
    }

    pub fn max(&self) -> Result<Value> {
        match self {
            AnyColumn::Int(c) => Ok(c.max().map(Value::Int).unwrap_or(Value::Na)),
            AnyColumn::Float(c) => Ok(c.max().map(Value::Float).unwrap_or(Value::Na)),
            other => Err(other.not_numeric()),
        }
    }

    pub fn median(&self) -> Result<Option<f64>> {
        self.quantile(0.5)
    }

    pub fn quantile(&self, q: f64) -> Result<Option<f64>> {
        match self {
            AnyColumn::Int(c) => Ok(c.quantile(q)),
            AnyColumn::Float(c) => Ok(c.quantile(q)),
            other => Err(other.not_numeric()),
        }
    }

    fn not_numeric(&self) -> TableError {
        TableError::NotNumeric {
            column: self.name().to_string(),
            kind: self.kind(),
        }
    }
}
