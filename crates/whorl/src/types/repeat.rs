//! `repeat(iterable)`: cycles through an iterable forever.
//!
//! Instead of buffering items, the adapter keeps the original iterable and asks it for
//! a fresh iterator each time the current one runs dry. A list or a str therefore
//! cycles indefinitely, while a source that is itself an iterator hands back the same
//! exhausted object and the repeat stays exhausted.

use std::mem::{self, size_of};

use crate::{
    defer_drop,
    exception_private::{RunError, RunResult},
    heap::{HeapData, HeapId, RootGuard},
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::{
        HeapItem, Type,
        iter::{IterNext, get_iter, iter_next},
    },
    value::Value,
};

#[derive(Debug)]
pub(crate) struct RepeatIter {
    /// The iterable new iterators are derived from.
    source: Value,
    /// The iterator currently being drained.
    current: Value,
}

impl RepeatIter {
    fn source(rt: &Runtime<impl ResourceTracker, impl IterTracer>, id: HeapId) -> RunResult<Value> {
        match rt.heap.get(id) {
            HeapData::Repeat(repeat) => Ok(repeat.source.clone_with_heap(&rt.heap)),
            _ => Err(RunError::internal("RepeatIter: wrong heap type")),
        }
    }

    fn current(rt: &Runtime<impl ResourceTracker, impl IterTracer>, id: HeapId) -> RunResult<Value> {
        match rt.heap.get(id) {
            HeapData::Repeat(repeat) => Ok(repeat.current.clone_with_heap(&rt.heap)),
            _ => Err(RunError::internal("RepeatIter: wrong heap type")),
        }
    }
}

/// Builds a repeat adapter over `source`, consuming the reference.
///
/// The first iterator is derived eagerly, so a non-iterable source fails here with
/// `TypeError` rather than on the first `next`.
pub(crate) fn new_repeat(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, source: Value) -> RunResult<Value> {
    let mut source = RootGuard::new(source, rt);
    let (iterable, inner) = source.as_parts();
    let iterable = iterable.clone_with_heap(&inner.heap);
    let current = get_iter(inner, iterable)?;
    let source = source.into_inner();

    let id = rt.allocate(HeapData::Repeat(RepeatIter { source, current }))?;
    rt.trace().on_construct(Type::Repeat, 1);
    Ok(Value::Ref(id))
}

impl HeapItem for RepeatIter {
    fn py_type(&self) -> Type {
        Type::Repeat
    }

    fn estimate_size(&self) -> usize {
        size_of::<Self>()
    }

    fn collect_ref_ids(&self, out: &mut Vec<HeapId>) {
        out.extend(self.source.ref_id());
        out.extend(self.current.ref_id());
    }

    fn dec_ref_ids(&mut self, out: &mut Vec<HeapId>) {
        self.source.dec_ref_ids(out);
        self.current.dec_ref_ids(out);
    }
}

impl IterNext for RepeatIter {
    fn next(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, id: HeapId) -> RunResult<Option<Value>> {
        let current = RepeatIter::current(rt, id)?;
        {
            defer_drop!(current, rt);
            if let Some(value) = iter_next(rt, current)? {
                return Ok(Some(value));
            }
        }

        // Current iterator is spent: derive a fresh one and install it before advancing,
        // so it stays reachable through this adapter while `next` runs.
        let source = RepeatIter::source(rt, id)?;
        let fresh = get_iter(rt, source)?;
        let installed = fresh.clone_with_heap(&rt.heap);
        let HeapData::Repeat(repeat) = rt.heap.get_mut(id) else {
            fresh.drop_with_heap(&mut rt.heap);
            installed.drop_with_heap(&mut rt.heap);
            return Err(RunError::internal("RepeatIter::next: wrong heap type"));
        };
        let old = mem::replace(&mut repeat.current, installed);
        old.drop_with_heap(&mut rt.heap);
        rt.trace().on_rederive(Type::Repeat);

        defer_drop!(fresh, rt);
        iter_next(rt, fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{object::Object, resource::NoLimitTracker, tracer::NoopTracer};

    #[test]
    fn rederive_replaces_current_iterator() {
        let mut rt: Runtime<NoLimitTracker, NoopTracer> = Runtime::default();
        let list = Object::List(vec![Object::Int(1)]).to_value(&mut rt).unwrap();
        let repeat = new_repeat(&mut rt, list).unwrap();
        let id = repeat.ref_id().unwrap();

        let first = RepeatIter::current(&rt, id).unwrap();
        let first_id = first.ref_id();
        first.drop_with_heap(&mut rt.heap);

        for _ in 0..2 {
            iter_next(&mut rt, &repeat).unwrap().unwrap().drop_with_heap(&mut rt.heap);
        }
        let second = RepeatIter::current(&rt, id).unwrap();
        assert_ne!(second.ref_id(), first_id);
        second.drop_with_heap(&mut rt.heap);
        repeat.drop_with_heap(&mut rt.heap);
        assert_eq!(rt.heap.live_objects(), 0);
    }
}
