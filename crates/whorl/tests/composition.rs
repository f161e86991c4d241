//! Adapters composed with each other and with host iterators.

use std::{cell::Cell, rc::Rc};

use pretty_assertions::assert_eq;
use whorl::{Builtins, ExcType, Exception, Object, Runtime};

fn pair(index: i64, value: i64) -> Object {
    Object::Tuple(vec![Object::Int(index), Object::Int(value)])
}

/// `enumerate(map(add, repeat([1, 2]), [10, 20, 30]))`.
///
/// The repeat restarts once, after the second item, and the map ends with the
/// three-item list.
#[test]
fn enumerate_of_map_over_repeat() {
    let mut rt = Runtime::default();
    let add = rt.builtin(Builtins::Add);
    let left = rt.load(Object::from(vec![1_i64, 2])).unwrap();
    let right = rt.load(Object::from(vec![10_i64, 20, 30])).unwrap();
    let cycled = rt.repeat(&left).unwrap();
    let sums = rt.map(&add, &[&cycled, &right]).unwrap();
    let pairs = rt.enumerate(&sums, 0).unwrap();

    assert_eq!(rt.next(&pairs).unwrap(), Some(pair(0, 11)));
    assert_eq!(rt.next(&pairs).unwrap(), Some(pair(1, 22)));
    assert_eq!(rt.next(&pairs).unwrap(), Some(pair(2, 31)));
    assert_eq!(rt.next(&pairs).unwrap(), None);
    assert_eq!(rt.root_depth(), 0);
}

#[test]
fn repeat_of_enumerate_stays_exhausted_after_one_pass() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![5_i64, 6])).unwrap();
    let pairs = rt.enumerate(&list, 0).unwrap();
    let cycled = rt.repeat(&pairs).unwrap();

    assert_eq!(rt.next(&cycled).unwrap(), Some(pair(0, 5)));
    assert_eq!(rt.next(&cycled).unwrap(), Some(pair(1, 6)));
    assert_eq!(rt.next(&cycled).unwrap(), None);
}

#[test]
fn map_of_map_feeds_results_forward() {
    let mut rt = Runtime::default();
    let add = rt.builtin(Builtins::Add);
    let mul = rt.builtin(Builtins::Mul);
    let a = rt.load(Object::from(vec![1_i64, 2, 3])).unwrap();
    let b = rt.load(Object::from(vec![1_i64, 1, 1])).unwrap();
    let threes = rt.load(Object::from(vec![3_i64])).unwrap();
    let scale = rt.repeat(&threes).unwrap();
    let sums = rt.map(&add, &[&a, &b]).unwrap();
    let scaled = rt.map(&mul, &[&sums, &scale]).unwrap();

    let mut out = Vec::new();
    while let Some(value) = rt.next(&scaled).unwrap() {
        out.push(value);
    }
    assert_eq!(out, vec![Object::Int(6), Object::Int(9), Object::Int(12)]);
}

// =============================================================================
// Host iterators
// =============================================================================

#[test]
fn host_iterator_feeds_an_adapter() {
    let mut rt = Runtime::default();
    let source = (0..3_i64).map(|i| Ok::<_, Exception>(Object::Int(i * i)));
    let squares = rt.host_iter("squares", source).unwrap();
    let pairs = rt.enumerate(&squares, 1).unwrap();

    assert_eq!(rt.next(&pairs).unwrap(), Some(pair(1, 0)));
    assert_eq!(rt.next(&pairs).unwrap(), Some(pair(2, 1)));
    assert_eq!(rt.next(&pairs).unwrap(), Some(pair(3, 4)));
    assert_eq!(rt.next(&pairs).unwrap(), None);
}

#[test]
fn host_iterator_can_yield_containers() {
    let mut rt = Runtime::default();
    let rows: Vec<Result<Object, Exception>> = vec![
        Ok(Object::from(vec!["a", "b"])),
        Ok(Object::Tuple(vec![Object::Int(1), Object::from("c")])),
    ];
    let it = rt.host_iter("rows", rows.into_iter()).unwrap();

    assert_eq!(rt.next(&it).unwrap(), Some(Object::from(vec!["a", "b"])));
    assert_eq!(
        rt.next(&it).unwrap(),
        Some(Object::Tuple(vec![Object::Int(1), Object::from("c")]))
    );
    assert_eq!(rt.next(&it).unwrap(), None);
}

/// An exception raised deep inside a pipeline reaches the host with its type and
/// message intact, and the pipeline's scoped roots are all released.
#[test]
fn host_exception_surfaces_through_every_adapter() {
    let mut rt = Runtime::default();
    let source = vec![
        Ok(Object::Int(1)),
        Err(Exception::with_message(ExcType::KeyError, "missing row 7")),
    ];
    let rows = rt.host_iter("rows", source.into_iter()).unwrap();
    let add = rt.builtin(Builtins::Add);
    let ones = rt.load(Object::from(vec![1_i64])).unwrap();
    let repeated_ones = rt.repeat(&ones).unwrap();
    let sums = rt.map(&add, &[&repeated_ones, &rows]).unwrap();
    let pairs = rt.enumerate(&sums, 0).unwrap();

    assert_eq!(rt.next(&pairs).unwrap(), Some(pair(0, 2)));
    let err = rt.next(&pairs).unwrap_err();
    assert_eq!(err, Exception::with_message(ExcType::KeyError, "missing row 7"));
    assert_eq!(rt.root_depth(), 0);
}

/// An error leaves the enumerate index where it was: the next successful item gets
/// the index the failed one would have had.
#[test]
fn error_does_not_advance_enumerate_index() {
    let mut rt = Runtime::default();
    let source = vec![
        Ok(Object::Int(10)),
        Err(Exception::with_message(ExcType::ValueError, "flaky")),
        Ok(Object::Int(30)),
    ];
    let rows = rt.host_iter("rows", source.into_iter()).unwrap();
    let pairs = rt.enumerate(&rows, 0).unwrap();

    assert_eq!(rt.next(&pairs).unwrap(), Some(pair(0, 10)));
    assert!(rt.next(&pairs).is_err());
    assert_eq!(rt.next(&pairs).unwrap(), Some(pair(1, 30)));
}

#[test]
fn host_function_sees_values_produced_by_adapters() {
    let mut rt = Runtime::default();
    let seen = Rc::new(Cell::new(0_i64));
    let seen_by_fn = Rc::clone(&seen);
    let total = rt
        .function("total", move |args: Vec<Object>| -> Result<Object, Exception> {
            let Some(Object::Tuple(pair)) = args.first() else {
                return Err(Exception::with_message(ExcType::TypeError, "expected a pair"));
            };
            if let [Object::Int(i), Object::Int(v)] = pair.as_slice() {
                seen_by_fn.set(seen_by_fn.get() + i * v);
            }
            Ok(Object::None)
        })
        .unwrap();
    let list = rt.load(Object::from(vec![2_i64, 3])).unwrap();
    let pairs = rt.enumerate(&list, 1).unwrap();
    let mapped = rt.map(&total, &[&pairs]).unwrap();

    while rt.next(&mapped).unwrap().is_some() {}
    // 1 * 2 + 2 * 3
    assert_eq!(seen.get(), 8);
}

#[test]
fn next_on_a_non_iterator_is_a_type_error() {
    let mut rt = Runtime::default();
    let list = rt.load(Object::from(vec![1_i64])).unwrap();
    let err = rt.next(&list).unwrap_err();

    assert_eq!(err.exc_type(), ExcType::TypeError);
    assert_eq!(err.message(), Some("'list' object is not an iterator"));
}
