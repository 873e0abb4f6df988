use chrono::NaiveDate;
use polars_tidy::prelude::{from_literals, unify, unify_with_literals, Dtype, Literal, TidyError};

fn l<T: Into<Literal>>(v: T) -> Literal {
    v.into()
}

#[test]
fn test_mixed_numbers_are_float() {
    let (dtype, items) = unify_with_literals(&[l(1), l(2.5), l(3)], None).unwrap();
    assert_eq!(dtype, Dtype::F64);
    assert_eq!(items, vec![l(1.0), l(2.5), l(3.0)]);
}

#[test]
fn test_string_and_integer_mismatch() {
    let err = unify(&[l("a"), l(1)], None).unwrap_err();
    assert!(matches!(err, TidyError::TypeMismatch { .. }));
}

#[test]
fn test_nan_is_numeric() {
    let dtype = unify(&[l(1), Literal::NaN, l(2.5)], None).unwrap();
    assert_eq!(dtype, Dtype::F64);
}

#[test]
fn test_nested_lists_are_promoted() {
    let items = [l(vec![1, 2]), l(vec![3.0])];
    let (dtype, items) = unify_with_literals(&items, None).unwrap();
    assert_eq!(dtype, Dtype::list(Dtype::F64));
    assert_eq!(items, vec![l(vec![1.0, 2.0]), l(vec![3.0])]);
}

#[test]
fn test_empty_input_uses_preference() {
    assert_eq!(unify(&[], None).unwrap(), Dtype::F64);
    assert_eq!(unify(&[], Some(&Dtype::Integer)).unwrap(), Dtype::Integer);
    assert_eq!(unify(&[Literal::Nil], Some(&Dtype::String)).unwrap(), Dtype::String);
}

#[test]
fn test_incompatible_nested_leaves() {
    let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let err = unify(&[l(vec![d]), l(vec!["x"])], None).unwrap_err();
    assert!(matches!(err, TidyError::TypeMismatch { .. }));
}

#[test]
fn test_series_follows_unified_dtype() {
    let s = from_literals("x", &[l(1), Literal::Nil, Literal::Infinity], None).unwrap();
    assert_eq!(s.dtype().unwrap(), Dtype::F64);
    assert_eq!(s.as_series().null_count(), 1);
    assert_eq!(s.name(), "x");
}
