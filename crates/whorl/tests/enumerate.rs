//! Tests for the enumerate adapter, through both the host API and the builtin.

use std::iter;

use pretty_assertions::assert_eq;
use whorl::{Builtins, ExcType, Exception, Object, Runtime};

fn pair(index: i64, value: impl Into<Object>) -> Object {
    Object::Tuple(vec![Object::Int(index), value.into()])
}

/// Drains `it`, returning everything it produced.
fn drain(rt: &mut Runtime, it: &whorl::Handle) -> Vec<Object> {
    let mut out = Vec::new();
    while let Some(value) = rt.next(it).unwrap() {
        out.push(value);
    }
    out
}

// =============================================================================
// 1. Index sequence
// =============================================================================

#[test]
fn pairs_items_with_index_from_zero() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec!["a", "b", "c"])).unwrap();
    let it = rt.enumerate(&list, 0).unwrap();

    assert_eq!(drain(&mut rt, &it), vec![pair(0, "a"), pair(1, "b"), pair(2, "c")]);
}

#[test]
fn negative_start_counts_up_through_zero() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![10_i64, 20, 30])).unwrap();
    let it = rt.enumerate(&list, -1).unwrap();

    assert_eq!(drain(&mut rt, &it), vec![pair(-1, 10_i64), pair(0, 20_i64), pair(1, 30_i64)]);
}

#[test]
fn empty_source_is_exhausted_immediately() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::List(vec![])).unwrap();
    let it = rt.enumerate(&list, 5).unwrap();

    assert_eq!(rt.next(&it).unwrap(), None);
}

/// Exhaustion does not consume an index: once the inner iterator is drained, every
/// further call reports exhaustion again.
#[test]
fn exhaustion_is_sticky_for_sequence_sources() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![1_i64])).unwrap();
    let it = rt.enumerate(&list, 0).unwrap();

    assert_eq!(rt.next(&it).unwrap(), Some(pair(0, 1_i64)));
    assert_eq!(rt.next(&it).unwrap(), None);
    assert_eq!(rt.next(&it).unwrap(), None);
}

/// A host iterator may produce items again after reporting exhaustion; the index
/// picks up where the last pair left off.
#[test]
fn exhaustion_does_not_advance_the_index() {
    let mut rt = Runtime::default();
    let mut steps = vec![Some(7_i64), None, Some(8)].into_iter();
    let resumable = rt
        .host_iter(
            "resumable",
            iter::from_fn(move || steps.next().flatten().map(|n| Ok::<_, Exception>(Object::Int(n)))),
        )
        .unwrap();
    let it = rt.enumerate(&resumable, 5).unwrap();

    assert_eq!(rt.next(&it).unwrap(), Some(pair(5, 7_i64)));
    assert_eq!(rt.next(&it).unwrap(), None);
    assert_eq!(rt.next(&it).unwrap(), Some(pair(6, 8_i64)));
    assert_eq!(rt.next(&it).unwrap(), None);
}

#[test]
fn enumerating_a_str_yields_characters() {
    let mut rt = Runtime::default();
    let s = rt.load(Object::from("hé")).unwrap();
    let it = rt.enumerate(&s, 1).unwrap();

    assert_eq!(drain(&mut rt, &it), vec![pair(1, "h"), pair(2, "é")]);
}

// =============================================================================
// 2. Overflow at the top of the index range
// =============================================================================

#[test]
fn last_representable_index_is_yielded() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![1_i64, 2])).unwrap();
    let it = rt.enumerate(&list, i64::MAX - 1).unwrap();

    assert_eq!(rt.next(&it).unwrap(), Some(pair(i64::MAX - 1, 1_i64)));
    let err = rt.next(&it).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::OverflowError);
}

/// The overflow check runs before the inner iterator is advanced, so no item is lost.
#[test]
fn overflow_does_not_consume_an_item() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![1_i64, 2])).unwrap();
    let inner = rt.get_iter(&list).unwrap();
    let it = rt.enumerate(&inner, i64::MAX).unwrap();

    assert_eq!(rt.next(&it).unwrap_err().exc_type(), ExcType::OverflowError);
    assert_eq!(rt.next(&inner).unwrap(), Some(Object::Int(1)));
}

// =============================================================================
// 3. The enumerate builtin
// =============================================================================

#[test]
fn builtin_takes_start_positionally() {
    let mut rt = Runtime::default();
    let enumerate = rt.builtin(Builtins::Enumerate);
    let list = rt.load(Object::from(vec!["x"])).unwrap();
    let start = rt.load(Object::Int(3)).unwrap();
    let it = rt.call(&enumerate, &[&list, &start], &[]).unwrap();

    assert_eq!(drain(&mut rt, &it), vec![pair(3, "x")]);
}

#[test]
fn builtin_takes_start_by_keyword() {
    let mut rt = Runtime::default();
    let enumerate = rt.builtin(Builtins::Enumerate);
    let list = rt.load(Object::from(vec!["x", "y"])).unwrap();
    let start = rt.load(Object::Int(-5)).unwrap();
    let it = rt.call(&enumerate, &[&list], &[("start", &start)]).unwrap();

    assert_eq!(drain(&mut rt, &it), vec![pair(-5, "x"), pair(-4, "y")]);
}

#[test]
fn builtin_takes_everything_by_keyword() {
    let mut rt = Runtime::default();
    let enumerate = rt.builtin(Builtins::Enumerate);
    let list = rt.load(Object::from(vec!["x"])).unwrap();
    let start = rt.load(Object::Int(1)).unwrap();
    let it = rt
        .call(&enumerate, &[], &[("start", &start), ("iterable", &list)])
        .unwrap();

    assert_eq!(drain(&mut rt, &it), vec![pair(1, "x")]);
}

#[test]
fn builtin_accepts_bool_start() {
    let mut rt = Runtime::default();
    let enumerate = rt.builtin(Builtins::Enumerate);
    let list = rt.load(Object::from(vec!["x"])).unwrap();
    let start = rt.load(Object::Bool(true)).unwrap();
    let it = rt.call(&enumerate, &[&list, &start], &[]).unwrap();

    assert_eq!(drain(&mut rt, &it), vec![pair(1, "x")]);
}

#[test]
fn builtin_rejects_non_integer_start() {
    let mut rt = Runtime::default();
    let enumerate = rt.builtin(Builtins::Enumerate);
    let list = rt.load(Object::from(vec!["x"])).unwrap();
    let start = rt.load(Object::from("1")).unwrap();
    let err = rt.call(&enumerate, &[&list, &start], &[]).unwrap_err();

    assert_eq!(err.exc_type(), ExcType::TypeError);
    assert_eq!(err.message(), Some("'str' object cannot be interpreted as an integer"));
}

#[test]
fn builtin_rejects_missing_iterable() {
    let mut rt = Runtime::default();
    let enumerate = rt.builtin(Builtins::Enumerate);
    let err = rt.call(&enumerate, &[], &[]).unwrap_err();

    assert_eq!(err.exc_type(), ExcType::TypeError);
}

#[test]
fn builtin_rejects_unknown_keyword() {
    let mut rt = Runtime::default();
    let enumerate = rt.builtin(Builtins::Enumerate);
    let list = rt.load(Object::from(vec!["x"])).unwrap();
    let err = rt.call(&enumerate, &[&list], &[("begin", &list)]).unwrap_err();

    assert_eq!(err.message(), Some("enumerate() got an unexpected keyword argument 'begin'"));
}

#[test]
fn builtin_rejects_start_given_twice() {
    let mut rt = Runtime::default();
    let enumerate = rt.builtin(Builtins::Enumerate);
    let list = rt.load(Object::from(vec!["x"])).unwrap();
    let start = rt.load(Object::Int(0)).unwrap();
    let err = rt
        .call(&enumerate, &[&list, &start], &[("start", &start)])
        .unwrap_err();

    assert_eq!(err.message(), Some("enumerate() got multiple values for argument 'start'"));
    assert_eq!(rt.root_depth(), 0);
}

#[test]
fn non_iterable_source_raises_type_error() {
    let mut rt = Runtime::default();
    let n = rt.load(Object::None).unwrap();
    let err = rt.enumerate(&n, 0).unwrap_err();

    assert_eq!(err.message(), Some("'NoneType' object is not iterable"));
}
