//! Predicate engine
//!
//! Predicates are pure functions of a row, built either through combinator
//! constructors (`eq`, `lt`, `and`, ...) or compiled from a textual
//! expression like `(age >= 21) AND (name ~= /^J/)`. Both paths produce the
//! same tree.

pub mod error;
mod parser;
mod token;


pub use error::{ExprError, ExprResult};
pub use parser::ExprParser;
pub use token::{CmpOp, Token};

use crate::table::{Header, Result, RowView, Value};

use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

/// Right-hand side of a comparison: a literal or another column
#[derive(Debug, Clone)]
pub enum Operand {
    Literal(Value),
    Column(String),
}

/// A predicate tree over frame rows
#[derive(Debug, Clone)]
pub enum Predicate {
    Compare {
        column: String,
        op: CmpOp,
        rhs: Operand,
    },
    Match {
        column: String,
        regex: Regex,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Xor(Box<Predicate>, Box<Predicate>),
    Nor(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Compile a textual expression against a header
    pub fn compile(text: &str, header: &Header) -> ExprResult<Predicate> {
        ExprParser::parse(text, header)
    }

    // ---- combinator constructors -----------------------------------------

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(column.into(), CmpOp::Eq, Operand::Literal(value.into()))
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(column.into(), CmpOp::Ne, Operand::Literal(value.into()))
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(column.into(), CmpOp::Lt, Operand::Literal(value.into()))
    }

    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(column.into(), CmpOp::Le, Operand::Literal(value.into()))
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(column.into(), CmpOp::Gt, Operand::Literal(value.into()))
    }

    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Predicate {
        Predicate::compare(column.into(), CmpOp::Ge, Operand::Literal(value.into()))
    }

    /// Column compared against another column of the same frame
    pub fn column_cmp(
        column: impl Into<String>,
        op: CmpOp,
        other: impl Into<String>,
    ) -> Predicate {
        Predicate::compare(column.into(), op, Operand::Column(other.into()))
    }

    /// Membership in an explicit value set
    pub fn is_in(column: impl Into<String>, values: Vec<Value>) -> Predicate {
        Predicate::In {
            column: column.into(),
            values,
        }
    }

    /// Regex match over string cells
    pub fn matches(column: impl Into<String>, pattern: &str) -> ExprResult<Predicate> {
        let regex = Regex::new(pattern).map_err(|source| ExprError::BadRegex {
            pattern: pattern.to_string(),
            position: 0,
            source,
        })?;
        Ok(Predicate::Match {
            column: column.into(),
            regex,
        })
    }

    pub fn and(left: Predicate, right: Predicate) -> Predicate {
        Predicate::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Predicate, right: Predicate) -> Predicate {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    pub fn xor(left: Predicate, right: Predicate) -> Predicate {
        Predicate::Xor(Box::new(left), Box::new(right))
    }

    pub fn nor(left: Predicate, right: Predicate) -> Predicate {
        Predicate::Nor(Box::new(left), Box::new(right))
    }

    pub fn negate(inner: Predicate) -> Predicate {
        Predicate::Not(Box::new(inner))
    }

    pub(crate) fn compare(column: impl Into<String>, op: CmpOp, rhs: Operand) -> Predicate {
        Predicate::Compare {
            column: column.into(),
            op,
            rhs,
        }
    }

    // ---- evaluation -------------------------------------------------------

    /// Evaluate against one row.
    ///
    /// Comparison follows the value total order: NA sorts below every real
    /// value and equals only NA. `and`/`or` short-circuit left to right.
    pub fn valid(&self, row: &RowView<'_>) -> Result<bool> {
        match self {
            Predicate::Compare { column, op, rhs } => {
                let left = row.get(column)?;
                let right = match rhs {
                    Operand::Literal(value) => value.clone(),
                    Operand::Column(other) => row.get(other)?,
                };
                Ok(apply_cmp(*op, left.total_cmp(&right)))
            }
            Predicate::Match { column, regex } => match row.get(column)? {
                Value::Str(text) => Ok(regex.is_match(&text)),
                _ => Ok(false),
            },
            Predicate::In { column, values } => {
                let cell = row.get(column)?;
                Ok(values.iter().any(|v| cell.total_cmp(v) == Ordering::Equal))
            }
            Predicate::And(left, right) => Ok(left.valid(row)? && right.valid(row)?),
            Predicate::Or(left, right) => Ok(left.valid(row)? || right.valid(row)?),
            Predicate::Xor(left, right) => Ok(left.valid(row)? ^ right.valid(row)?),
            Predicate::Nor(left, right) => Ok(!(left.valid(row)? || right.valid(row)?)),
            Predicate::Not(inner) => Ok(!inner.valid(row)?),
        }
    }
}

fn apply_cmp(op: CmpOp, ord: Ordering) -> bool {
    match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Le => ord != Ordering::Greater,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Ge => ord != Ordering::Less,
    }
}

/// Memo of compiled predicates keyed by their source string
#[derive(Debug, Default)]
pub struct PredicateCache {
    compiled: HashMap<String, Rc<Predicate>>,
}

impl PredicateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile through the cache; identical source text compiles once
    pub fn get(&mut self, text: &str, header: &Header) -> ExprResult<Rc<Predicate>> {
        if let Some(predicate) = self.compiled.get(text) {
            return Ok(Rc::clone(predicate));
        }
        let predicate = Rc::new(Predicate::compile(text, header)?);
        self.compiled.insert(text.to_string(), Rc::clone(&predicate));
        Ok(predicate)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}
