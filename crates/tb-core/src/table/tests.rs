//! Tests for table module

use super::*;

use approx::assert_relative_eq;

fn sample_frame() -> Frame {
    let mut frame = Frame::from_schema(
        vec![
            ("id", ValueKind::Int),
            ("score", ValueKind::Float),
            ("name", ValueKind::Str),
        ],
        FrameConfig::default(),
    )
    .unwrap();

    frame
        .append_row(vec![Value::Int(1), Value::Float(0.5), Value::from("ada")])
        .unwrap();
    frame
        .append_row(vec![Value::Int(2), Value::Na, Value::from("bob")])
        .unwrap();
    frame
        .append_row(vec![Value::Int(3), Value::Float(2.5), Value::from("cyd")])
        .unwrap();
    frame
}

#[test]
fn test_column_creation_and_na() {
    let column = Column::<i64>::from_slots("x", vec![Some(1), None, Some(3)]);
    assert_eq!(column.len(), 3);
    assert_eq!(column.na_count(), 1);
    assert!(column.is_na(1).unwrap());
    assert_eq!(column.get(0).unwrap(), Some(&1));
    assert_eq!(column.get(1).unwrap(), None);
}

#[test]
fn test_column_out_of_bounds() {
    let column = Column::<i64>::from_values("x", vec![1, 2]);
    let err = column.get(5).unwrap_err();
    assert!(matches!(
        err,
        TableError::RowOutOfBounds { index: 5, len: 2 }
    ));
}

#[test]
fn test_column_arithmetic_skips_na() {
    let mut a = Column::<f64>::from_slots("a", vec![Some(1.0), None, Some(3.0)]);
    let b = Column::<f64>::from_values("b", vec![10.0, 20.0, 30.0]);
    a.add_column(&b).unwrap();

    assert_eq!(a.to_vec(), vec![Some(11.0), None, Some(33.0)]);
}

#[test]
fn test_int_arithmetic_overflow_becomes_na() {
    let mut a = Column::<i64>::from_values("a", vec![i64::MAX, 1]);
    a.add_scalar(1);
    assert_eq!(a.to_vec(), vec![None, Some(2)]);

    let mut b = Column::<i64>::from_values("b", vec![10, 7]);
    let zero = Column::<i64>::from_values("z", vec![0, 2]);
    b.div_column(&zero).unwrap();
    assert_eq!(b.to_vec(), vec![None, Some(3)]);
}

#[test]
fn test_column_length_mismatch() {
    let mut a = Column::<f64>::from_values("a", vec![1.0, 2.0]);
    let b = Column::<f64>::from_values("b", vec![1.0]);
    assert!(matches!(
        a.add_column(&b),
        Err(TableError::LengthMismatch {
            expected: 2,
            actual: 1
        })
    ));
}

#[test]
fn test_column_clone_is_isolated() {
    let original = Column::<i64>::from_slots("x", vec![Some(1), None, Some(3)]);
    let mut copy = original.clone();
    assert_eq!(copy.to_vec(), original.to_vec());

    copy.set(0, Some(99)).unwrap();
    copy.push(4);
    assert_eq!(original.to_vec(), vec![Some(1), None, Some(3)]);
    assert_eq!(original.len(), 3);
}

#[test]
fn test_column_reverse_twice_restores_order() {
    let mut column = Column::<i64>::from_slots("x", vec![Some(1), None, Some(3), Some(2)]);
    let before = column.to_vec();
    column.reverse();
    assert_eq!(column.to_vec(), vec![Some(2), Some(3), None, Some(1)]);
    column.reverse();
    assert_eq!(column.to_vec(), before);
}

#[test]
fn test_column_sort_na_first_and_idempotent() {
    let mut column =
        Column::<i64>::from_slots("x", vec![Some(3), None, Some(1), Some(2), None]);
    column.sort(true);
    assert_eq!(
        column.to_vec(),
        vec![None, None, Some(1), Some(2), Some(3)]
    );
    let once = column.to_vec();
    column.sort(true);
    assert_eq!(column.to_vec(), once);
}

#[test]
fn test_any_column_rejects_wrong_kind() {
    let mut column = AnyColumn::Int(Column::from_values("id", vec![1, 2]));

    let err = column.set_value(0, Value::from("x")).unwrap_err();
    assert!(matches!(
        err,
        TableError::TypeMismatch {
            column,
            expected: ValueKind::Int,
            ..
        } if column == "id"
    ));

    let err = column.push_value(Value::Bool(true)).unwrap_err();
    assert!(matches!(err, TableError::TypeMismatch { .. }));

    // The column is untouched on either failure.
    assert_eq!(column.len(), 2);
    assert_eq!(column.value(0).unwrap(), Value::Int(1));
}

#[test]
fn test_column_map_skips_na() {
    let mut column = Column::<i64>::from_slots("x", vec![Some(1), None, Some(3)]);
    column.map(|v| v * 10);
    assert_eq!(column.to_vec(), vec![Some(10), None, Some(30)]);

    let mut names = Column::<String>::from_values("n", vec!["ada".into(), "bob".into()]);
    names.map(|v| v.to_uppercase());
    assert_eq!(
        names.to_vec(),
        vec![Some("ADA".to_string()), Some("BOB".to_string())]
    );
}

#[test]
fn test_column_stats_skip_na() {
    let column = Column::<f64>::from_slots(
        "x",
        vec![Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)],
    );
    assert_eq!(column.sum(), 10.0);
    assert_eq!(column.mean(), Some(2.5));
    assert_eq!(column.min(), Some(1.0));
    assert_eq!(column.max(), Some(4.0));
    assert_eq!(column.median(), Some(2.5));
    assert_eq!(column.quantile(0.0), Some(1.0));
    assert_eq!(column.quantile(1.0), Some(4.0));
    assert_relative_eq!(column.quantile(0.25).unwrap(), 1.75);

    let all_na = Column::<f64>::from_slots("y", vec![None, None]);
    assert_eq!(all_na.mean(), None);
    assert_eq!(all_na.median(), None);
}

#[test]
fn test_value_total_order() {
    use std::cmp::Ordering;

    // NA is strictly least and equal only to NA.
    assert_eq!(Value::Na.total_cmp(&Value::Na), Ordering::Equal);
    assert_eq!(Value::Na.total_cmp(&Value::Int(i64::MIN)), Ordering::Less);
    assert_eq!(
        Value::Float(f64::NEG_INFINITY).total_cmp(&Value::Na),
        Ordering::Greater
    );

    // Int and Float compare numerically.
    assert_eq!(Value::Int(2).total_cmp(&Value::Float(2.0)), Ordering::Equal);
    assert_eq!(Value::Int(2).total_cmp(&Value::Float(2.5)), Ordering::Less);
    assert_eq!(
        Value::Float(3.0).total_cmp(&Value::Int(2)),
        Ordering::Greater
    );

    assert_eq!(
        Value::from("a").total_cmp(&Value::from("b")),
        Ordering::Less
    );
}

#[test]
fn test_key_normalizes_negative_zero() {
    assert_eq!(Key::from(&Value::Float(-0.0)), Key::from(&Value::Float(0.0)));
    assert_ne!(Key::from(&Value::Float(1.0)), Key::from(&Value::Float(2.0)));
    assert_eq!(Key::from(&Value::Na), Key::Na);
}

#[test]
fn test_value_kind_parse() {
    assert_eq!(ValueKind::Int.parse("42"), Value::Int(42));
    assert_eq!(ValueKind::Int.parse(""), Value::Na);
    assert_eq!(ValueKind::Int.parse("abc"), Value::Na);
    assert_eq!(ValueKind::Float.parse("2.5"), Value::Float(2.5));
    assert_eq!(ValueKind::Bool.parse("TRUE"), Value::Bool(true));
    assert_eq!(ValueKind::Bool.parse("maybe"), Value::Na);
    assert_eq!(ValueKind::Str.parse(" hi "), Value::from("hi"));
}

#[test]
fn test_frame_creation() {
    let frame = sample_frame();
    assert_eq!(frame.nrows(), 3);
    assert_eq!(frame.ncols(), 3);
    assert_eq!(frame.column_names(), vec!["id", "score", "name"]);
    assert_eq!(frame.value("id", 1).unwrap(), Value::Int(2));
    assert!(frame.is_na("score", 1).unwrap());
}

#[test]
fn test_frame_from_columns() {
    let frame = Frame::from_columns(vec![
        AnyColumn::Int(Column::from_values("a", vec![1, 2])),
        AnyColumn::Str(Column::from_values(
            "b",
            vec!["x".to_string(), "y".to_string()],
        )),
    ])
    .unwrap();
    assert_eq!(frame.nrows(), 2);

    let err = Frame::from_columns(vec![
        AnyColumn::Int(Column::from_values("a", vec![1, 2])),
        AnyColumn::Int(Column::from_values("b", vec![1])),
    ])
    .unwrap_err();
    assert!(matches!(err, TableError::LengthMismatch { .. }));
}

#[test]
fn test_append_row_type_check() {
    let mut frame = sample_frame();

    let err = frame
        .append_row(vec![Value::from("four"), Value::Na, Value::Na])
        .unwrap_err();
    assert!(matches!(
        err,
        TableError::TypeMismatch {
            expected: ValueKind::Int,
            ..
        }
    ));

    // Nothing was appended.
    assert_eq!(frame.nrows(), 3);

    // Ints are accepted into float columns.
    frame
        .append_row(vec![Value::Int(4), Value::Int(7), Value::from("dee")])
        .unwrap();
    assert_eq!(frame.value("score", 3).unwrap(), Value::Float(7.0));
}

#[test]
fn test_append_row_arity() {
    let mut frame = sample_frame();
    let err = frame.append_row(vec![Value::Int(9)]).unwrap_err();
    assert!(matches!(
        err,
        TableError::RowArity {
            expected: 3,
            actual: 1
        }
    ));
}

#[test]
fn test_duplicate_column() {
    let mut frame = sample_frame();
    let err = frame.add_column("id", ValueKind::Int).unwrap_err();
    assert!(matches!(err, TableError::DuplicateColumn(name) if name == "id"));
}

#[test]
fn test_add_column_backfills_na() {
    let mut frame = sample_frame();
    frame.add_column("flag", ValueKind::Bool).unwrap();
    assert_eq!(frame.ncols(), 4);
    for row in 0..frame.nrows() {
        assert!(frame.is_na("flag", row).unwrap());
    }
}

#[test]
fn test_rename_column_keeps_position() {
    let mut frame = sample_frame();
    frame.rename_column("score", "rating").unwrap();
    assert_eq!(frame.column_names(), vec!["id", "rating", "name"]);
    assert_eq!(frame.value("rating", 0).unwrap(), Value::Float(0.5));
    assert!(matches!(
        frame.value("score", 0),
        Err(TableError::ColumnNotFound(_))
    ));
}

#[test]
fn test_remove_last_column_resets_rows() {
    let mut frame = Frame::from_schema(vec![("only", ValueKind::Int)], FrameConfig::default())
        .unwrap();
    frame.append_row(vec![Value::Int(1)]).unwrap();
    frame.remove_column("only").unwrap();
    assert_eq!(frame.ncols(), 0);
    assert_eq!(frame.nrows(), 0);
}

#[test]
fn test_set_value_keeps_views_valid() {
    let mut frame = sample_frame();
    let before = frame.generation();

    frame.set_value("score", 1, Value::Float(9.9)).unwrap();
    assert_eq!(frame.generation(), before);
    assert_eq!(frame.value("score", 1).unwrap(), Value::Float(9.9));
}

#[test]
fn test_row_view_access() {
    let mut frame = sample_frame();

    {
        let row = frame.row(0).unwrap();
        assert_eq!(row.get_int("id").unwrap(), Some(1));
    }

    let row_values = {
        let row = frame.row(2).unwrap();
        row.values().unwrap()
    };
    assert_eq!(row_values[0], Value::Int(3));

    // Re-reading after a structural change goes through a fresh view.
    frame
        .append_row(vec![Value::Int(4), Value::Na, Value::from("dee")])
        .unwrap();
    let row = frame.row(0).unwrap();
    assert_eq!(row.get("id").unwrap(), Value::Int(1));
}

#[test]
fn test_detached_row_handle_goes_stale() {
    let mut frame = sample_frame();
    let handle = frame.row(0).unwrap().detach();

    // Rebinding works while the frame is structurally unchanged.
    let row = handle.bind(&frame).unwrap();
    assert_eq!(row.get("id").unwrap(), Value::Int(1));

    // Cell edits are not structural; the handle stays valid.
    frame.set_value("score", 0, Value::Float(7.5)).unwrap();
    assert!(handle.bind(&frame).is_ok());

    frame.remove_row(2).unwrap();
    assert!(matches!(
        handle.bind(&frame),
        Err(TableError::StaleRow { .. })
    ));
}

#[test]
fn test_row_accessor_coercions() {
    let frame = sample_frame();
    let row = frame.row(0).unwrap();

    assert_eq!(row.get_float("id").unwrap(), Some(1.0));
    assert_eq!(row.get_float("score").unwrap(), Some(0.5));
    assert_eq!(row.get_str("name").unwrap(), Some("ada".to_string()));
    assert_eq!(row.get_int("name").unwrap(), None);

    let row = frame.row(1).unwrap();
    assert_eq!(row.get_float("score").unwrap(), None);
    assert!(row.is_na("score").unwrap());
}

#[test]
fn test_sort_by_na_first() {
    let mut frame = sample_frame();
    frame.sort_by(&[("score", true)]).unwrap();

    // NA sorts strictly below every real value.
    assert!(frame.is_na("score", 0).unwrap());
    assert_eq!(frame.value("score", 1).unwrap(), Value::Float(0.5));
    assert_eq!(frame.value("score", 2).unwrap(), Value::Float(2.5));
    // Whole rows move together.
    assert_eq!(frame.value("name", 0).unwrap(), Value::from("bob"));
}

#[test]
fn test_sort_by_descending_and_tiebreak() {
    let mut frame = Frame::from_schema(
        vec![("a", ValueKind::Int), ("b", ValueKind::Int)],
        FrameConfig::default(),
    )
    .unwrap();
    for (a, b) in [(1, 9), (2, 1), (1, 3)] {
        frame.append_row(vec![Value::Int(a), Value::Int(b)]).unwrap();
    }

    frame.sort_by(&[("a", true), ("b", false)]).unwrap();
    let rows: Vec<(Value, Value)> = (0..3)
        .map(|r| (frame.value("a", r).unwrap(), frame.value("b", r).unwrap()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (Value::Int(1), Value::Int(9)),
            (Value::Int(1), Value::Int(3)),
            (Value::Int(2), Value::Int(1)),
        ]
    );
}

#[test]
fn test_reverse_rows() {
    let mut frame = sample_frame();
    frame.reverse_rows().unwrap();
    assert_eq!(frame.value("id", 0).unwrap(), Value::Int(3));
    assert_eq!(frame.value("id", 2).unwrap(), Value::Int(1));
}

#[test]
fn test_retain_and_filter() {
    let mut frame = sample_frame();

    let kept = frame
        .filter(|row| Ok(row.get_int("id").unwrap_or(None).unwrap_or(0) >= 2))
        .unwrap();
    assert_eq!(kept.nrows(), 2);
    assert_eq!(kept.value("id", 0).unwrap(), Value::Int(2));
    // Source unchanged.
    assert_eq!(frame.nrows(), 3);

    frame
        .retain(|row| Ok(!row.is_na("score")?))
        .unwrap();
    assert_eq!(frame.nrows(), 2);
    assert_eq!(frame.value("name", 1).unwrap(), Value::from("cyd"));
}

#[test]
fn test_concat() {
    let mut left = sample_frame();
    let mut right = Frame::from_schema(
        vec![
            ("id", ValueKind::Int),
            ("score", ValueKind::Float),
            ("name", ValueKind::Str),
        ],
        FrameConfig::default(),
    )
    .unwrap();
    right
        .append_row(vec![Value::Int(4), Value::Float(4.5), Value::from("dee")])
        .unwrap();

    left.concat(&right).unwrap();
    assert_eq!(left.nrows(), 4);
    assert_eq!(left.value("name", 3).unwrap(), Value::from("dee"));
}

#[test]
fn test_concat_incompatible_headers() {
    let mut left = sample_frame();
    let right = Frame::from_schema(vec![("id", ValueKind::Int)], FrameConfig::default()).unwrap();
    assert!(matches!(
        left.concat(&right),
        Err(TableError::IncompatibleHeaders { .. })
    ));
}

#[test]
fn test_clear() {
    let mut frame = sample_frame();
    frame.clear().unwrap();
    assert!(frame.is_empty());
    assert_eq!(frame.ncols(), 3);
}

#[test]
fn test_any_column_stats_dispatch() {
    let frame = sample_frame();
    let score = frame.get_column("score").unwrap();
    assert_eq!(score.mean().unwrap(), Some(1.5));
    assert_eq!(score.min().unwrap(), Value::Float(0.5));

    let name = frame.get_column("name").unwrap();
    assert!(matches!(
        name.mean(),
        Err(TableError::NotNumeric {
            kind: ValueKind::Str,
            ..
        })
    ));
}

#[test]
fn test_type_registry_custom_factory() {
    let mut registry = TypeRegistry::default();
    registry.register(ValueKind::Float, |name| {
        AnyColumn::Float(Column::with_capacity(name, 128))
    });
    let config = FrameConfig { registry };

    let mut frame = Frame::from_schema(vec![("x", ValueKind::Float)], config).unwrap();
    frame.append_row(vec![Value::Float(1.0)]).unwrap();
    assert_eq!(frame.value("x", 0).unwrap(), Value::Float(1.0));
}

#[test]
fn test_header_compatibility() {
    let mut a = Header::new();
    a.add("x", ValueKind::Int).unwrap();
    a.add("y", ValueKind::Float).unwrap();

    let mut b = Header::new();
    b.add("x", ValueKind::Int).unwrap();
    b.add("y", ValueKind::Float).unwrap();
    assert!(a.is_compatible(&b));

    let mut c = Header::new();
    c.add("y", ValueKind::Float).unwrap();
    c.add("x", ValueKind::Int).unwrap();
    // Order matters.
    assert!(!a.is_compatible(&c));
}
