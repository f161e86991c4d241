//! Tests for the repeat adapter.
//!
//! Repeat never buffers: it re-derives a fresh iterator from its source every time
//! the current one runs out, so what it cycles through depends on what "get
//! iterator" does for the source.

use pretty_assertions::assert_eq;
use whorl::{ExcType, Handle, Object, Runtime};

/// Pulls `n` values, panicking if the iterator runs out early.
fn take(rt: &mut Runtime, it: &Handle, n: usize) -> Vec<Object> {
    (0..n).map(|_| rt.next(it).unwrap().expect("iterator ended early")).collect()
}

fn ints(values: &[i64]) -> Vec<Object> {
    values.iter().copied().map(Object::Int).collect()
}

// =============================================================================
// 1. Cycling over re-iterable sources
// =============================================================================

#[test]
fn list_source_cycles_forever() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![1_i64, 2, 3])).unwrap();
    let cycled = rt.repeat(&list).unwrap();

    assert_eq!(take(&mut rt, &cycled, 8), ints(&[1, 2, 3, 1, 2, 3, 1, 2]));
}

#[test]
fn single_item_source_repeats_that_item() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![7_i64])).unwrap();
    let cycled = rt.repeat(&list).unwrap();

    assert_eq!(take(&mut rt, &cycled, 4), ints(&[7, 7, 7, 7]));
}

#[test]
fn str_source_cycles_through_characters() {
    let mut rt = Runtime::default();
    let s = rt.load(Object::from("ab")).unwrap();
    let cycled = rt.repeat(&s).unwrap();

    let expected: Vec<Object> = ["a", "b", "a", "b", "a"].into_iter().map(Object::from).collect();
    assert_eq!(take(&mut rt, &cycled, 5), expected);
}

#[test]
fn tuple_source_cycles() {
    let mut rt = Runtime::default();
    let tuple = rt.load(Object::Tuple(ints(&[4, 5]))).unwrap();
    let cycled = rt.repeat(&tuple).unwrap();

    assert_eq!(take(&mut rt, &cycled, 3), ints(&[4, 5, 4]));
}

/// Each repeat derives its own iterators, so two repeats over the same list do not
/// interfere with each other.
#[test]
fn two_repeats_over_one_list_are_independent() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![1_i64, 2])).unwrap();
    let a = rt.repeat(&list).unwrap();
    let b = rt.repeat(&list).unwrap();

    assert_eq!(rt.next(&a).unwrap(), Some(Object::Int(1)));
    assert_eq!(rt.next(&a).unwrap(), Some(Object::Int(2)));
    assert_eq!(rt.next(&b).unwrap(), Some(Object::Int(1)));
    assert_eq!(rt.next(&a).unwrap(), Some(Object::Int(1)));
}

// =============================================================================
// 2. Degenerate sources
// =============================================================================

/// An empty source gives endless exhaustion, never an error.
#[test]
fn empty_source_is_exhausted_on_every_call() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::List(vec![])).unwrap();
    let cycled = rt.repeat(&list).unwrap();

    for _ in 0..5 {
        assert_eq!(rt.next(&cycled).unwrap(), None);
    }
}

/// "Get iterator" on an iterator returns the iterator itself, so once it is drained
/// the repeat has nothing to restart from.
#[test]
fn iterator_source_plays_once_then_stays_exhausted() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![1_i64, 2])).unwrap();
    let it = rt.get_iter(&list).unwrap();
    let cycled = rt.repeat(&it).unwrap();

    assert_eq!(take(&mut rt, &cycled, 2), ints(&[1, 2]));
    assert_eq!(rt.next(&cycled).unwrap(), None);
    assert_eq!(rt.next(&cycled).unwrap(), None);
}

/// The repeat shares its iterator source with the host: advancing one advances the other.
#[test]
fn iterator_source_is_shared_with_the_host() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![1_i64, 2, 3])).unwrap();
    let it = rt.get_iter(&list).unwrap();
    let cycled = rt.repeat(&it).unwrap();

    assert_eq!(rt.next(&it).unwrap(), Some(Object::Int(1)));
    assert_eq!(rt.next(&cycled).unwrap(), Some(Object::Int(2)));
    assert_eq!(rt.next(&it).unwrap(), Some(Object::Int(3)));
    assert_eq!(rt.next(&cycled).unwrap(), None);
}

// =============================================================================
// 3. Errors
// =============================================================================

#[test]
fn non_iterable_source_fails_at_construction() {
    let mut rt = Runtime::default();
    let n = rt.load(Object::Int(5)).unwrap();
    let err = rt.repeat(&n).unwrap_err();

    assert_eq!(err.exc_type(), ExcType::TypeError);
    assert_eq!(err.message(), Some("'int' object is not iterable"));
    assert_eq!(rt.root_depth(), 0);
}

#[test]
fn repeat_is_its_own_iterator() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![1_i64])).unwrap();
    let cycled = rt.repeat(&list).unwrap();
    let same = rt.get_iter(&cycled).unwrap();

    assert_eq!(rt.next(&same).unwrap(), Some(Object::Int(1)));
    assert_eq!(rt.type_of(&same), whorl::Type::Repeat);
}
