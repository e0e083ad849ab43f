//! Row views with generation-based invalidation
//!
//! A `RowView` captures the frame's generation counter at creation; while
//! the view is alive its borrow of the frame rules out structural mutation.
//! To keep a row reference across mutations, `detach` it into a `RowHandle`
//! and `bind` it again later: binding re-checks the captured generation and
//! fails with `StaleRow` instead of silently reading reshuffled data.

use super::*;

/// A lightweight reference into one row of a frame
#[derive(Clone, Copy)]
pub struct RowView<'a> {
    frame: &'a Frame,
    row: usize,
    generation: u64,
}

impl<'a> RowView<'a> {
    pub(crate) fn new(frame: &'a Frame, row: usize) -> Self {
        Self {
            frame,
            row,
            generation: frame.generation(),
        }
    }

    /// Position of this row at the time the view was created
    pub fn index(&self) -> usize {
        self.row
    }

    /// Detach into a handle that can outlive this view's borrow
    pub fn detach(&self) -> RowHandle {
        RowHandle {
            row: self.row,
            generation: self.generation,
        }
    }

    /// Get a cell value by column name
    pub fn get(&self, column: &str) -> Result<Value> {
        self.frame.value(column, self.row)
    }

    pub fn is_na(&self, column: &str) -> Result<bool> {
        Ok(self.get(column)?.is_na())
    }

    /// Get as integer; `None` for NA or non-integer kinds
    pub fn get_int(&self, column: &str) -> Result<Option<i64>> {
        match self.get(column)? {
            Value::Int(v) => Ok(Some(v)),
            Value::Bool(v) => Ok(Some(if v { 1 } else { 0 })),
            _ => Ok(None),
        }
    }

    /// Get as float; ints coerce
    pub fn get_float(&self, column: &str) -> Result<Option<f64>> {
        match self.get(column)? {
            Value::Float(v) => Ok(Some(v)),
            Value::Int(v) => Ok(Some(v as f64)),
            _ => Ok(None),
        }
    }

    pub fn get_bool(&self, column: &str) -> Result<Option<bool>> {
        match self.get(column)? {
            Value::Bool(v) => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    pub fn get_str(&self, column: &str) -> Result<Option<String>> {
        match self.get(column)? {
            Value::Str(v) => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    /// All cell values in header order
    pub fn values(&self) -> Result<Vec<Value>> {
        self.frame.row_values(self.row)
    }
}

/// A row position detached from any frame borrow.
///
/// Holding a `RowHandle` lets a caller keep a row reference across frame
/// mutations; `bind` revalidates the captured generation and fails with
/// `StaleRow` if a structural change happened in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHandle {
    row: usize,
    generation: u64,
}

impl RowHandle {
    /// Reattach to a frame, failing if the frame changed structurally
    pub fn bind<'a>(&self, frame: &'a Frame) -> Result<RowView<'a>> {
        let current = frame.generation();
        if self.generation != current {
            return Err(TableError::StaleRow {
                captured: self.generation,
                current,
            });
        }
        Ok(RowView::new(frame, self.row))
    }
}

/// Iterator over the rows of a frame
pub struct RowIter<'a> {
    frame: &'a Frame,
    current: usize,
}

impl<'a> RowIter<'a> {
    pub(crate) fn new(frame: &'a Frame) -> Self {
        Self { frame, current: 0 }
    }
}

impl<'a> Iterator for RowIter<'a> {
    type Item = RowView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.frame.nrows() {
            let view = RowView::new(self.frame, self.current);
            self.current += 1;
            Some(view)
        } else {
            None
        }
    }
}
