//! `enumerate(iterable, start)`: pairs each item with a running index.
//!
//! `index` is the number attached to the next item. It only advances once a pair has
//! been produced, so exhaustion or an error from the inner iterator leaves it unchanged.

use std::mem::size_of;

use crate::{
    defer_drop,
    exception_private::{ExcType, RunError, RunResult},
    heap::{HeapData, HeapId},
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::{
        HeapItem, Type, allocate_tuple,
        iter::{IterNext, get_iter, iter_next},
    },
    value::Value,
};

/// Inner iterator plus the index for the next pair.
#[derive(Debug)]
pub(crate) struct EnumerateIter {
    inner: Value,
    index: i64,
}

/// Builds an enumerate adapter over `iterable`, consuming the reference.
pub(crate) fn new_enumerate(
    rt: &mut Runtime<impl ResourceTracker, impl IterTracer>,
    iterable: Value,
    start: i64,
) -> RunResult<Value> {
    let inner = get_iter(rt, iterable)?;
    let id = rt.allocate(HeapData::Enumerate(EnumerateIter { inner, index: start }))?;
    rt.trace().on_construct(Type::Enumerate, 1);
    Ok(Value::Ref(id))
}

impl HeapItem for EnumerateIter {
    fn py_type(&self) -> Type {
        Type::Enumerate
    }

    fn estimate_size(&self) -> usize {
        size_of::<Self>()
    }

    fn collect_ref_ids(&self, out: &mut Vec<HeapId>) {
        out.extend(self.inner.ref_id());
    }

    fn dec_ref_ids(&mut self, out: &mut Vec<HeapId>) {
        self.inner.dec_ref_ids(out);
    }
}

impl IterNext for EnumerateIter {
    fn next(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, id: HeapId) -> RunResult<Option<Value>> {
        let HeapData::Enumerate(enumerate) = rt.heap.get(id) else {
            return Err(RunError::internal("EnumerateIter::next: wrong heap type"));
        };
        let index = enumerate.index;
        let inner = enumerate.inner.clone_with_heap(&rt.heap);
        defer_drop!(inner, rt);

        let Some(next_index) = index.checked_add(1) else {
            return Err(ExcType::overflow_error("enumerate index overflowed"));
        };
        let Some(item) = iter_next(rt, inner)? else {
            return Ok(None);
        };
        let pair = allocate_tuple(rt, vec![Value::Int(index), item])?;

        if let HeapData::Enumerate(enumerate) = rt.heap.get_mut(id) {
            enumerate.index = next_index;
        }
        Ok(Some(pair))
    }
}
