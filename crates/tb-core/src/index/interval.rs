//! Interval search tree
//!
//! An augmented AVL tree keyed by interval low endpoint (row id as tie
//! breaker). Each node stores the maximum high endpoint across its subtree,
//! which lets overlap and stabbing queries prune whole subtrees and run in
//! O(log n + k).

use crate::table::{Result, TableError};

use std::cmp::Ordering;

type Link = Option<Box<Node>>;

#[derive(Debug, Clone)]
struct Node {
    low: f64,
    high: f64,
    row: usize,
    max_high: f64,
    height: i32,
    left: Link,
    right: Link,
}

impl Node {
    fn new(low: f64, high: f64, row: usize) -> Box<Node> {
        Box::new(Node {
            low,
            high,
            row,
            max_high: high,
            height: 1,
            left: None,
            right: None,
        })
    }

    // Tree order: (low, row), so equal lows from different rows coexist.
    fn key_cmp(&self, low: f64, row: usize) -> Ordering {
        self.low
            .total_cmp(&low)
            .then_with(|| self.row.cmp(&row))
    }
}

fn height(link: &Link) -> i32 {
    link.as_ref().map(|n| n.height).unwrap_or(0)
}

fn max_high(link: &Link) -> f64 {
    link.as_ref().map(|n| n.max_high).unwrap_or(f64::NEG_INFINITY)
}

fn update(node: &mut Box<Node>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
    node.max_high = node
        .high
        .max(max_high(&node.left))
        .max(max_high(&node.right));
}

fn balance_factor(node: &Box<Node>) -> i32 {
    height(&node.left) - height(&node.right)
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let mut pivot = node.left.take().expect("rotate_right without left child");
    node.left = pivot.right.take();
    update(&mut node);
    pivot.right = Some(node);
    update(&mut pivot);
    pivot
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let mut pivot = node.right.take().expect("rotate_left without right child");
    node.right = pivot.left.take();
    update(&mut node);
    pivot.left = Some(node);
    update(&mut pivot);
    pivot
}

fn rebalance(mut node: Box<Node>) -> Box<Node> {
    update(&mut node);
    let factor = balance_factor(&node);

    if factor > 1 {
        if balance_factor(node.left.as_ref().expect("left-heavy without left")) < 0 {
            node.left = Some(rotate_left(node.left.take().expect("left child")));
        }
        return rotate_right(node);
    }
    if factor < -1 {
        if balance_factor(node.right.as_ref().expect("right-heavy without right")) > 0 {
            node.right = Some(rotate_right(node.right.take().expect("right child")));
        }
        return rotate_left(node);
    }
    node
}

fn insert(link: Link, new: Box<Node>) -> Box<Node> {
    match link {
        None => new,
        Some(mut node) => {
            match node.key_cmp(new.low, new.row) {
                Ordering::Greater => node.left = Some(insert(node.left.take(), new)),
                _ => node.right = Some(insert(node.right.take(), new)),
            }
            rebalance(node)
        }
    }
}

// Detach the minimum node of a subtree, returning (rest, min).
fn extract_min(mut node: Box<Node>) -> (Link, Box<Node>) {
    match node.left.take() {
        None => (node.right.take(), node),
        Some(left) => {
            let (rest, min) = extract_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

fn remove(link: Link, low: f64, row: usize, removed: &mut bool) -> Link {
    let mut node = link?;

    match node.key_cmp(low, row) {
        Ordering::Greater => node.left = remove(node.left.take(), low, row, removed),
        Ordering::Less => node.right = remove(node.right.take(), low, row, removed),
        Ordering::Equal => {
            *removed = true;
            return match (node.left.take(), node.right.take()) {
                (None, right) => right,
                (left, None) => left,
                (left, Some(right)) => {
                    let (rest, mut successor) = extract_min(right);
                    successor.left = left;
                    successor.right = rest;
                    Some(rebalance(successor))
                }
            };
        }
    }
    Some(rebalance(node))
}

fn search(link: &Link, lo: f64, hi: f64, out: &mut Vec<usize>) {
    let Some(node) = link else { return };

    // No interval in this subtree reaches lo.
    if node.max_high < lo {
        return;
    }

    search(&node.left, lo, hi, out);

    if node.low <= hi && node.high >= lo {
        out.push(node.row);
    }

    // Right subtree lows are all >= node.low; skip it past hi.
    if node.low <= hi {
        search(&node.right, lo, hi, out);
    }
}

/// Interval index over two numeric columns interpreted as [low, high] per row
#[derive(Debug, Clone)]
pub struct IntervalIndex {
    name: String,
    low_column: String,
    high_column: String,
    root: Link,
    len: usize,
}

impl IntervalIndex {
    pub fn new(
        name: impl Into<String>,
        low_column: impl Into<String>,
        high_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            low_column: low_column.into(),
            high_column: high_column.into(),
            root: None,
            len: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> [&str; 2] {
        [&self.low_column, &self.high_column]
    }

    /// Number of indexed intervals
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rebuild from scratch. Rows with an NA endpoint are not indexed.
    pub fn build(&mut self, columns: &super::hash::Columns, nrows: usize) -> Result<()> {
        let low = columns
            .get(&self.low_column)
            .ok_or_else(|| TableError::ColumnNotFound(self.low_column.clone()))?;
        let high = columns
            .get(&self.high_column)
            .ok_or_else(|| TableError::ColumnNotFound(self.high_column.clone()))?;

        for column in [low, high] {
            if !column.kind().is_numeric() {
                return Err(TableError::NotNumeric {
                    column: column.name().to_string(),
                    kind: column.kind(),
                });
            }
        }

        self.root = None;
        self.len = 0;
        for row in 0..nrows {
            if let (Some(lo), Some(hi)) =
                (low.value_at(row).as_f64(), high.value_at(row).as_f64())
            {
                self.insert(lo, hi, row);
            }
        }
        Ok(())
    }

    /// Insert one interval; O(log n)
    pub fn insert(&mut self, low: f64, high: f64, row: usize) {
        self.root = Some(insert(self.root.take(), Node::new(low, high, row)));
        self.len += 1;
    }

    /// Remove the interval stored for a row; O(log n)
    pub fn remove(&mut self, low: f64, row: usize) -> bool {
        let mut removed = false;
        self.root = remove(self.root.take(), low, row, &mut removed);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Rows whose interval intersects [lo, hi]
    pub fn search(&self, lo: f64, hi: f64) -> Vec<usize> {
        let mut out = Vec::new();
        search(&self.root, lo, hi, &mut out);
        out
    }

    /// Rows whose interval contains the point
    pub fn stab(&self, point: f64) -> Vec<usize> {
        self.search(point, point)
    }

    pub(crate) fn rename_column(&mut self, old: &str, new: &str) {
        if self.low_column == old {
            self.low_column = new.to_string();
        }
        if self.high_column == old {
            self.high_column = new.to_string();
        }
    }
}
