//! Garbage-collection safety of the adapters.
//!
//! With `gc_interval(1)` a full mark-sweep runs before every allocation, so any value
//! held only by a Rust local across an allocation would be swept and the next access
//! would panic on a freed slot. These tests run the adapters under that setting and
//! check results, the root stack and the final heap.

use pretty_assertions::assert_eq;
use whorl::{Builtins, Exception, ExcType, Handle, LimitedTracker, NoopTracer, Object, ResourceLimits, Runtime};

fn stress_runtime() -> Runtime<LimitedTracker, NoopTracer> {
    Runtime::with_limits(ResourceLimits::new().gc_interval(1))
}

fn drain(rt: &mut Runtime<LimitedTracker, NoopTracer>, it: &Handle) -> Vec<Object> {
    let mut out = Vec::new();
    while let Some(value) = rt.next(it).unwrap() {
        out.push(value);
        assert_eq!(rt.root_depth(), 0);
    }
    out
}

fn strs(values: &[&str]) -> Vec<Object> {
    values.iter().copied().map(Object::from).collect()
}

#[test]
fn pipeline_survives_collection_before_every_allocation() {
    let mut rt = stress_runtime();
    let add = rt.builtin(Builtins::Add);
    let left = rt.load(Object::from(vec!["a", "b"])).unwrap();
    let right = rt.load(Object::from("xyz")).unwrap();
    let cycled = rt.repeat(&left).unwrap();
    let joined = rt.map(&add, &[&cycled, &right]).unwrap();
    let pairs = rt.enumerate(&joined, 0).unwrap();

    let expected: Vec<Object> = [(0, "ax"), (1, "by"), (2, "az")]
        .into_iter()
        .map(|(i, s)| Object::Tuple(vec![Object::Int(i), Object::from(s)]))
        .collect();
    assert_eq!(drain(&mut rt, &pairs), expected);
}

/// Every str character is a fresh allocation, and so is every concatenation, so a
/// three-way map over strs allocates several times per step.
#[test]
fn map_over_three_strs_keeps_gathered_arguments_alive() {
    let mut rt = stress_runtime();
    let pack = rt.builtin(Builtins::Pack);
    let a = rt.load(Object::from("abc")).unwrap();
    let b = rt.load(Object::from("de")).unwrap();
    let c = rt.load(Object::from("fgh")).unwrap();
    let packed = rt.map(&pack, &[&a, &b, &c]).unwrap();

    assert_eq!(
        drain(&mut rt, &packed),
        vec![
            Object::Tuple(strs(&["a", "d", "f"])),
            Object::Tuple(strs(&["b", "e", "g"])),
        ]
    );
}

#[test]
fn repeat_rederive_survives_collection() {
    let mut rt = stress_runtime();
    let s = rt.load(Object::from("pq")).unwrap();
    let cycled = rt.repeat(&s).unwrap();

    let mut out = Vec::new();
    for _ in 0..7 {
        out.push(rt.next(&cycled).unwrap().unwrap());
    }
    assert_eq!(out, strs(&["p", "q", "p", "q", "p", "q", "p"]));
}

/// Sources passed only as temporaries are kept alive by the adapter itself.
#[test]
fn released_source_handles_stay_reachable_through_the_adapter() {
    let mut rt = stress_runtime();
    let list = rt.load(Object::from(vec!["k", "l"])).unwrap();
    let pairs = rt.enumerate(&list, 0).unwrap();
    rt.release(list);
    rt.collect_garbage();

    assert_eq!(
        rt.next(&pairs).unwrap(),
        Some(Object::Tuple(vec![Object::Int(0), Object::from("k")]))
    );
}

#[test]
fn failed_step_leaves_no_roots_behind() {
    let mut rt = stress_runtime();
    let add = rt.builtin(Builtins::Add);
    let good = rt.load(Object::from(vec!["x", "y"])).unwrap();
    let source = vec![Ok(Object::from("1")), Err(Exception::with_message(ExcType::ValueError, "boom"))];
    let bad = rt.host_iter("bad", source.into_iter()).unwrap();
    let mapped = rt.map(&add, &[&good, &bad]).unwrap();

    assert_eq!(rt.next(&mapped).unwrap(), Some(Object::from("x1")));
    assert_eq!(rt.next(&mapped).unwrap_err().message(), Some("boom"));
    assert_eq!(rt.root_depth(), 0);
}

/// Once every handle is released, a collection leaves nothing behind: no leaked
/// argument buffers, iterators or intermediate strs.
#[test]
fn releasing_everything_empties_the_heap() {
    let mut rt = stress_runtime();
    let add = rt.builtin(Builtins::Add);
    let left = rt.load(Object::from(vec!["a", "b"])).unwrap();
    let right = rt.load(Object::from("xyz")).unwrap();
    let cycled = rt.repeat(&left).unwrap();
    let joined = rt.map(&add, &[&cycled, &right]).unwrap();
    let pairs = rt.enumerate(&joined, 0).unwrap();
    drain(&mut rt, &pairs);

    for handle in [add, left, right, cycled, joined, pairs] {
        rt.release(handle);
    }
    rt.collect_garbage();

    let stats = rt.heap_stats();
    assert_eq!(stats.live_objects, 0, "leaked: {:?}", stats.objects_by_type);
    assert_eq!(stats.pinned, 0);
    assert_eq!(stats.root_depth, 0);
}

/// Reference counting alone frees a released pipeline; no collection is needed
/// because adapters never form cycles.
#[test]
fn releasing_everything_frees_without_collection() {
    let mut rt = Runtime::default();
    let add = rt.builtin(Builtins::Add);
    let left = rt.load(Object::from(vec![1_i64, 2])).unwrap();
    let right = rt.load(Object::from(vec![3_i64, 4])).unwrap();
    let cycled = rt.repeat(&left).unwrap();
    let sums = rt.map(&add, &[&cycled, &right]).unwrap();
    assert_eq!(rt.next(&sums).unwrap(), Some(Object::Int(4)));

    for handle in [add, left, right, cycled, sums] {
        rt.release(handle);
    }
    assert_eq!(rt.heap_stats().live_objects, 0);
}
