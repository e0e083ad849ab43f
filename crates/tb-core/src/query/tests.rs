//! Tests for join and group-by engines

use super::*;
use crate::expr::Predicate;
use crate::table::{Frame, FrameConfig, TableError, Value, ValueKind};

fn orders() -> Frame {
    let mut frame = Frame::from_schema(
        vec![
            ("order_id", ValueKind::Int),
            ("customer", ValueKind::Str),
            ("amount", ValueKind::Float),
        ],
        FrameConfig::default(),
    )
    .unwrap();

    for (id, customer, amount) in [
        (1, "ada", 10.0),
        (2, "bob", 20.0),
        (3, "ada", 30.0),
        (4, "cyd", 40.0),
        (5, "bob", 50.0),
    ] {
        frame
            .append_row(vec![
                Value::Int(id),
                Value::from(customer),
                Value::Float(amount),
            ])
            .unwrap();
    }
    frame
}

fn customers() -> Frame {
    let mut frame = Frame::from_schema(
        vec![
            ("name", ValueKind::Str),
            ("city", ValueKind::Str),
            ("amount", ValueKind::Float),
        ],
        FrameConfig::default(),
    )
    .unwrap();

    for (name, city, limit) in [
        ("ada", "oslo", 100.0),
        ("bob", "bergen", 200.0),
        ("dan", "tromso", 300.0),
    ] {
        frame
            .append_row(vec![
                Value::from(name),
                Value::from(city),
                Value::Float(limit),
            ])
            .unwrap();
    }
    frame
}

#[test]
fn test_group_by_first_seen_order() {
    let frame = orders();
    let grouping = group_by(&frame, &["customer"]).unwrap();

    assert_eq!(grouping.len(), 3);
    let keys: Vec<&[Value]> = grouping.iter().map(|g| g.key()).collect();
    assert_eq!(
        keys,
        vec![
            &[Value::from("ada")][..],
            &[Value::from("bob")][..],
            &[Value::from("cyd")][..],
        ]
    );

    let ada = grouping.find_by_values(&[Value::from("ada")]).unwrap();
    assert_eq!(ada.rows(), &[0, 2]);
    assert_eq!(ada.representative(), Some(0));

    assert!(grouping.find_by_values(&[Value::from("zed")]).is_none());
}

#[test]
fn test_group_by_composite_key_and_na() {
    let mut frame = orders();
    frame
        .append_row(vec![Value::Int(6), Value::Na, Value::Float(0.0)])
        .unwrap();
    frame
        .append_row(vec![Value::Int(7), Value::Na, Value::Float(1.0)])
        .unwrap();

    let grouping = group_by(&frame, &["customer"]).unwrap();
    // NA keys group together.
    let na_group = grouping.find_by_values(&[Value::Na]).unwrap();
    assert_eq!(na_group.rows(), &[5, 6]);

    let err = group_by(&frame, &["nope"]).unwrap_err();
    assert!(matches!(err, TableError::ColumnNotFound(name) if name == "nope"));
}

#[test]
fn test_grouping_find_by_predicate() {
    let frame = orders();
    let grouping = group_by(&frame, &["customer"]).unwrap();

    // Representative row is the group's first; ada's is order 1, bob's is
    // order 2, cyd's is order 4.
    let predicate = Predicate::gt("amount", 15.0);
    let filtered = grouping.find(&frame, &predicate).unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(filtered.find_by_values(&[Value::from("bob")]).is_some());
    assert!(filtered.find_by_values(&[Value::from("cyd")]).is_some());
}

#[test]
fn test_inner_join() {
    let left = orders();
    let right = customers();

    let joined = join(
        &left,
        &right,
        JoinKind::Inner,
        &[("customer", "name")],
        "_l",
        "_r",
    )
    .unwrap();

    // cyd has no customer record, dan has no orders.
    assert_eq!(joined.nrows(), 4);
    // Key columns merge under the left name; colliding "amount" is suffixed.
    assert_eq!(
        joined.column_names(),
        vec!["order_id", "customer", "amount_l", "city", "amount_r"]
    );

    assert_eq!(joined.value("order_id", 0).unwrap(), Value::Int(1));
    assert_eq!(joined.value("city", 0).unwrap(), Value::from("oslo"));
    assert_eq!(joined.value("amount_l", 0).unwrap(), Value::Float(10.0));
    assert_eq!(joined.value("amount_r", 0).unwrap(), Value::Float(100.0));

    // Probe rows stream in original order.
    let ids: Vec<Value> = (0..4).map(|r| joined.value("order_id", r).unwrap()).collect();
    assert_eq!(
        ids,
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(5)]
    );
}

#[test]
fn test_left_join_pads_unmatched() {
    let left = orders();
    let right = customers();

    let joined = join(
        &left,
        &right,
        JoinKind::Left,
        &[("customer", "name")],
        "_l",
        "_r",
    )
    .unwrap();

    assert_eq!(joined.nrows(), 5);
    // cyd's row keeps its left values and pads right columns with NA.
    assert_eq!(joined.value("customer", 3).unwrap(), Value::from("cyd"));
    assert_eq!(joined.value("amount_l", 3).unwrap(), Value::Float(40.0));
    assert!(joined.is_na("city", 3).unwrap());
    assert!(joined.is_na("amount_r", 3).unwrap());
}

#[test]
fn test_right_join_pads_unmatched() {
    let left = orders();
    let right = customers();

    let joined = join(
        &left,
        &right,
        JoinKind::Right,
        &[("customer", "name")],
        "_l",
        "_r",
    )
    .unwrap();

    // ada x2, bob x2, dan unmatched.
    assert_eq!(joined.nrows(), 5);

    // dan's row fills the merged key from the right side and pads the rest.
    let dan = (0..joined.nrows())
        .find(|&r| joined.value("customer", r).unwrap() == Value::from("dan"))
        .unwrap();
    assert!(joined.is_na("order_id", dan).unwrap());
    assert!(joined.is_na("amount_l", dan).unwrap());
    assert_eq!(joined.value("city", dan).unwrap(), Value::from("tromso"));
    assert_eq!(joined.value("amount_r", dan).unwrap(), Value::Float(300.0));
}

#[test]
fn test_join_fan_out() {
    // Duplicate keys on both sides produce the cross product per key.
    let mut left = Frame::from_schema(
        vec![("k", ValueKind::Int), ("l", ValueKind::Int)],
        FrameConfig::default(),
    )
    .unwrap();
    for (k, l) in [(1, 10), (1, 11)] {
        left.append_row(vec![Value::Int(k), Value::Int(l)]).unwrap();
    }

    let mut right = Frame::from_schema(
        vec![("k", ValueKind::Int), ("r", ValueKind::Int)],
        FrameConfig::default(),
    )
    .unwrap();
    for (k, r) in [(1, 20), (1, 21), (1, 22)] {
        right.append_row(vec![Value::Int(k), Value::Int(r)]).unwrap();
    }

    let joined = join(&left, &right, JoinKind::Inner, &[("k", "k")], "_l", "_r").unwrap();
    assert_eq!(joined.nrows(), 6);
    assert_eq!(joined.column_names(), vec!["k", "l", "r"]);
}

#[test]
fn test_join_suffixes_right_column_shadowing_left_key() {
    let mut left = Frame::from_schema(
        vec![("k", ValueKind::Int), ("l", ValueKind::Str)],
        FrameConfig::default(),
    )
    .unwrap();
    left.append_row(vec![Value::Int(1), Value::from("a")])
        .unwrap();

    // The right side carries a non-key column named after the left key.
    let mut right = Frame::from_schema(
        vec![("rk", ValueKind::Int), ("k", ValueKind::Str)],
        FrameConfig::default(),
    )
    .unwrap();
    right
        .append_row(vec![Value::Int(1), Value::from("b")])
        .unwrap();

    let joined = join(&left, &right, JoinKind::Inner, &[("k", "rk")], "_l", "_r").unwrap();
    assert_eq!(joined.nrows(), 1);
    assert_eq!(joined.column_names(), vec!["k", "l", "k_r"]);
    assert_eq!(joined.value("k", 0).unwrap(), Value::Int(1));
    assert_eq!(joined.value("k_r", 0).unwrap(), Value::from("b"));
}

#[test]
fn test_join_key_kind_mismatch() {
    let left = orders();
    let right = customers();

    let err = join(
        &left,
        &right,
        JoinKind::Inner,
        &[("order_id", "name")],
        "_l",
        "_r",
    )
    .unwrap_err();
    assert!(matches!(err, TableError::IncompatibleHeaders { .. }));
}

#[test]
fn test_join_missing_column() {
    let left = orders();
    let right = customers();

    let err = join(
        &left,
        &right,
        JoinKind::Inner,
        &[("customer", "nope")],
        "_l",
        "_r",
    )
    .unwrap_err();
    assert!(matches!(err, TableError::ColumnNotFound(name) if name == "nope"));
}

#[test]
fn test_join_on_composite_key() {
    let mut left = Frame::from_schema(
        vec![
            ("a", ValueKind::Int),
            ("b", ValueKind::Str),
            ("x", ValueKind::Int),
        ],
        FrameConfig::default(),
    )
    .unwrap();
    for (a, b, x) in [(1, "p", 100), (1, "q", 200), (2, "p", 300)] {
        left.append_row(vec![Value::Int(a), Value::from(b), Value::Int(x)])
            .unwrap();
    }

    let mut right = Frame::from_schema(
        vec![
            ("a", ValueKind::Int),
            ("b", ValueKind::Str),
            ("y", ValueKind::Int),
        ],
        FrameConfig::default(),
    )
    .unwrap();
    for (a, b, y) in [(1, "q", 7), (2, "p", 8)] {
        right
            .append_row(vec![Value::Int(a), Value::from(b), Value::Int(y)])
            .unwrap();
    }

    let joined = join(
        &left,
        &right,
        JoinKind::Inner,
        &[("a", "a"), ("b", "b")],
        "_l",
        "_r",
    )
    .unwrap();

    assert_eq!(joined.nrows(), 2);
    assert_eq!(joined.column_names(), vec!["a", "b", "x", "y"]);
    assert_eq!(joined.value("x", 0).unwrap(), Value::Int(200));
    assert_eq!(joined.value("y", 0).unwrap(), Value::Int(7));
}

#[test]
fn test_join_result_is_queryable() {
    let left = orders();
    let right = customers();
    let mut joined = join(
        &left,
        &right,
        JoinKind::Inner,
        &[("customer", "name")],
        "_l",
        "_r",
    )
    .unwrap();

    // The output is a full frame: indexable and groupable.
    joined.add_index("by_customer", &["customer"]).unwrap();
    assert_eq!(
        joined
            .find_rows("by_customer", &[Value::from("ada")])
            .unwrap(),
        vec![0, 2]
    );

    let grouping = group_by(&joined, &["city"]).unwrap();
    assert_eq!(grouping.len(), 2);
}
