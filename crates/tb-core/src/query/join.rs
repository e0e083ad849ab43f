//! Hash joins over two frames

use super::group::group_by;
use crate::table::{Frame, Header, Result, TableError, Value, ValueKind};

/// Join direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Rows without a match are dropped
    Inner,
    /// Unmatched left rows are kept, right-origin columns NA
    Left,
    /// Unmatched right rows are kept, left-origin columns NA
    Right,
}

/// Per-join mapping from each source column to its slot in the merged header.
///
/// Built once before row materialization so every cell placement is O(1);
/// discarded with the join call.
#[derive(Debug)]
pub struct JoinInfo {
    header: Header,
    /// Output position per left column, in left header order
    left_dst: Vec<usize>,
    /// Output position per right column; `None` for right key columns,
    /// which merge into the left key column
    right_dst: Vec<Option<usize>>,
    /// Output position of each merged key column, in key-pair order
    key_dst: Vec<usize>,
}

impl JoinInfo {
    /// Plan the merged header for a join.
    ///
    /// Key pairs merge into a single output column named after the left
    /// side; non-key columns colliding by name across the inputs get the
    /// caller's suffixes.
    pub fn build(
        left: &Frame,
        right: &Frame,
        keys: &[(&str, &str)],
        suffix_left: &str,
        suffix_right: &str,
    ) -> Result<JoinInfo> {
        for (left_name, right_name) in keys {
            let left_kind = lookup(left, left_name)?;
            let right_kind = lookup(right, right_name)?;
            if left_kind != right_kind {
                return Err(TableError::IncompatibleHeaders {
                    left: format!("{}:{}", left_name, left_kind),
                    right: format!("{}:{}", right_name, right_kind),
                });
            }
        }

        let left_keys: Vec<&str> = keys.iter().map(|(l, _)| *l).collect();
        let right_keys: Vec<&str> = keys.iter().map(|(_, r)| *r).collect();

        let mut header = Header::new();
        let mut left_dst = Vec::with_capacity(left.ncols());
        for (name, kind) in left.header().iter() {
            let out_name = if collides(name, &left_keys, right, &right_keys) {
                format!("{}{}", name, suffix_left)
            } else {
                name.to_string()
            };
            left_dst.push(header.len());
            header.add(out_name, kind)?;
        }

        let mut right_dst = Vec::with_capacity(right.ncols());
        for (name, kind) in right.header().iter() {
            if right_keys.contains(&name) {
                // Merged into the left key column.
                right_dst.push(None);
                continue;
            }
            // A left key column keeps its plain name, so a right non-key
            // column sharing that name must take the suffix too.
            let out_name = if collides(name, &right_keys, left, &left_keys)
                || header.contains(name)
            {
                format!("{}{}", name, suffix_right)
            } else {
                name.to_string()
            };
            right_dst.push(Some(header.len()));
            header.add(out_name, kind)?;
        }

        let key_dst = left_keys
            .iter()
            .map(|name| {
                left.header()
                    .position(name)
                    .map(|i| left_dst[i])
                    .unwrap_or(0)
            })
            .collect();

        Ok(JoinInfo {
            header,
            left_dst,
            right_dst,
            key_dst,
        })
    }

    /// The merged output header
    pub fn header(&self) -> &Header {
        &self.header
    }
}

/// Join two frames on one or more column pairs.
///
/// The build side is grouped once by its key columns; the probe side streams
/// in original row order. Matched key tuples fan out one output row per
/// (probe, build) pair; unmatched probe rows are NA-padded for outer kinds
/// and dropped for `Inner`. O(|A| + |B|) grouping, O(probe + matches)
/// materialization.
pub fn join(
    left: &Frame,
    right: &Frame,
    kind: JoinKind,
    keys: &[(&str, &str)],
    suffix_left: &str,
    suffix_right: &str,
) -> Result<Frame> {
    let info = JoinInfo::build(left, right, keys, suffix_left, suffix_right)?;
    let out_cols = info.header.len();

    let left_keys: Vec<&str> = keys.iter().map(|(l, _)| *l).collect();
    let right_keys: Vec<&str> = keys.iter().map(|(_, r)| *r).collect();

    let mut out = Frame::from_schema(
        info.header.iter().map(|(n, k)| (n.to_string(), k)),
        left.config().clone(),
    )?;

    match kind {
        JoinKind::Inner | JoinKind::Left => {
            let grouping = group_by(right, &right_keys)?;
            let probe_cols = resolve_columns(left, &left_keys)?;

            for row in 0..left.nrows() {
                let key: Vec<Value> = probe_cols.iter().map(|c| c.value_at(row)).collect();
                match grouping.find_by_values(&key) {
                    Some(group) => {
                        for &build_row in group.rows() {
                            out.append_row(merge_row(
                                &info, out_cols, left, row, right, build_row,
                            ))?;
                        }
                    }
                    None if kind == JoinKind::Left => {
                        out.append_row(pad_left_row(&info, out_cols, left, row))?;
                    }
                    None => {}
                }
            }
        }
        JoinKind::Right => {
            let grouping = group_by(left, &left_keys)?;
            let probe_cols = resolve_columns(right, &right_keys)?;

            for row in 0..right.nrows() {
                let key: Vec<Value> = probe_cols.iter().map(|c| c.value_at(row)).collect();
                match grouping.find_by_values(&key) {
                    Some(group) => {
                        for &build_row in group.rows() {
                            out.append_row(merge_row(
                                &info, out_cols, left, build_row, right, row,
                            ))?;
                        }
                    }
                    None => {
                        out.append_row(pad_right_row(&info, out_cols, right, row, &key))?;
                    }
                }
            }
        }
    }

    Ok(out)
}

// A non-key name collides when the other side also carries it outside its
// own key set.
fn collides(name: &str, own_keys: &[&str], other: &Frame, other_keys: &[&str]) -> bool {
    !own_keys.contains(&name) && other.header().contains(name) && !other_keys.contains(&name)
}

fn lookup(frame: &Frame, name: &str) -> Result<ValueKind> {
    frame
        .header()
        .kind(name)
        .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
}

fn resolve_columns<'a>(
    frame: &'a Frame,
    names: &[&str],
) -> Result<Vec<&'a crate::table::AnyColumn>> {
    names.iter().map(|name| frame.get_column(name)).collect()
}

// One output row from a matched (left, right) pair.
fn merge_row(
    info: &JoinInfo,
    out_cols: usize,
    left: &Frame,
    left_row: usize,
    right: &Frame,
    right_row: usize,
) -> Vec<Value> {
    let mut values = vec![Value::Na; out_cols];
    for (column, &dst) in left.columns().values().zip(info.left_dst.iter()) {
        values[dst] = column.value_at(left_row);
    }
    for (column, dst) in right.columns().values().zip(info.right_dst.iter()) {
        if let Some(dst) = dst {
            values[*dst] = column.value_at(right_row);
        }
    }
    values
}

// Unmatched left row: right-origin columns stay NA.
fn pad_left_row(info: &JoinInfo, out_cols: usize, left: &Frame, row: usize) -> Vec<Value> {
    let mut values = vec![Value::Na; out_cols];
    for (column, &dst) in left.columns().values().zip(info.left_dst.iter()) {
        values[dst] = column.value_at(row);
    }
    values
}

// Unmatched right row: left-origin columns stay NA except the merged key
// columns, which take the right row's key values.
fn pad_right_row(
    info: &JoinInfo,
    out_cols: usize,
    right: &Frame,
    row: usize,
    key: &[Value],
) -> Vec<Value> {
    let mut values = vec![Value::Na; out_cols];
    for (column, dst) in right.columns().values().zip(info.right_dst.iter()) {
        if let Some(dst) = dst {
            values[*dst] = column.value_at(row);
        }
    }
    for (&dst, value) in info.key_dst.iter().zip(key.iter()) {
        values[dst] = value.clone();
    }
    values
}
