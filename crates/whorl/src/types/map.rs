//! `map(func, *iterables)`: lazily applies `func` across one or more iterators in lockstep.
//!
//! Each step advances every iterator left to right, collecting one value from each into
//! a heap-allocated [`ArgBuffer`]. The buffer is a real heap object, rooted for the
//! duration of the step, so values gathered from earlier iterators survive any
//! collection triggered while later iterators run. The first exhausted iterator ends
//! the whole map; values already gathered in that step are discarded.

use std::mem::{self, size_of};

use crate::{
    args::ArgValues,
    defer_drop, defer_root,
    exception_private::{RunError, RunResult},
    function::call_value,
    heap::{HeapData, HeapId, RootGuard},
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::{
        HeapItem, Type, collect_value_ids,
        iter::{IterNext, get_iter, iter_next},
    },
    value::Value,
};

#[derive(Debug)]
pub(crate) struct MapIter {
    func: Value,
    /// One iterator per source, in argument order. Never empty.
    iters: Box<[Value]>,
}

/// Builds a map adapter applying `func` over `sources`, consuming every reference.
///
/// The adapter is allocated first with empty slots and rooted, then an iterator is
/// acquired for each source left to right. If any source is not iterable, everything
/// acquired so far is released along with the adapter.
pub(crate) fn new_map(
    rt: &mut Runtime<impl ResourceTracker, impl IterTracer>,
    func: Value,
    sources: Vec<Value>,
) -> RunResult<Value> {
    let arity = sources.len();
    if arity == 0 {
        func.drop_with_heap(&mut rt.heap);
        return Err(RunError::internal("new_map: no iterables"));
    }

    let mut sources = RootGuard::new(sources, rt);
    let (sources, rt) = sources.as_parts();

    let placeholders = (0..arity).map(|_| Value::None).collect();
    let map_id = rt.allocate(HeapData::Map(MapIter {
        func,
        iters: placeholders,
    }))?;
    let mut map = RootGuard::new(Value::Ref(map_id), rt);

    for (index, source) in sources.iter().enumerate() {
        let rt = map.heap();
        let iterable = source.clone_with_heap(&rt.heap);
        let iterator = get_iter(rt, iterable)?;
        let HeapData::Map(map_iter) = rt.heap.get_mut(map_id) else {
            iterator.drop_with_heap(&mut rt.heap);
            return Err(RunError::internal("new_map: wrong heap type"));
        };
        let placeholder = mem::replace(&mut map_iter.iters[index], iterator);
        placeholder.drop_with_heap(&mut rt.heap);
    }

    let map = map.into_inner();
    rt.trace().on_construct(Type::Map, arity);
    Ok(map)
}

impl HeapItem for MapIter {
    fn py_type(&self) -> Type {
        Type::Map
    }

    fn estimate_size(&self) -> usize {
        size_of::<Self>() + self.iters.len() * size_of::<Value>()
    }

    fn collect_ref_ids(&self, out: &mut Vec<HeapId>) {
        out.extend(self.func.ref_id());
        collect_value_ids(self.iters.iter(), out);
    }

    fn dec_ref_ids(&mut self, out: &mut Vec<HeapId>) {
        self.func.dec_ref_ids(out);
        for iter in &mut self.iters {
            iter.dec_ref_ids(out);
        }
    }
}

impl IterNext for MapIter {
    fn next(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, id: HeapId) -> RunResult<Option<Value>> {
        let HeapData::Map(map) = rt.heap.get(id) else {
            return Err(RunError::internal("MapIter::next: wrong heap type"));
        };
        let arity = map.iters.len();

        let buffer_id = rt.allocate(HeapData::ArgBuffer(ArgBuffer::new(arity)))?;
        let buffer = Value::Ref(buffer_id);
        defer_root!(buffer, rt);

        for index in 0..arity {
            let HeapData::Map(map) = rt.heap.get(id) else {
                return Err(RunError::internal("MapIter::next: wrong heap type"));
            };
            let iterator = map.iters[index].clone_with_heap(&rt.heap);
            defer_drop!(iterator, rt);
            let Some(value) = iter_next(rt, iterator)? else {
                return Ok(None);
            };
            let HeapData::ArgBuffer(args) = rt.heap.get_mut(buffer_id) else {
                value.drop_with_heap(&mut rt.heap);
                return Err(RunError::internal("MapIter::next: wrong buffer type"));
            };
            let previous = mem::replace(&mut args.items[index], value);
            previous.drop_with_heap(&mut rt.heap);
        }

        let (HeapData::Map(map), HeapData::ArgBuffer(args)) = (rt.heap.get(id), rt.heap.get(buffer_id)) else {
            return Err(RunError::internal("MapIter::next: wrong heap type"));
        };
        let func = map.func.clone_with_heap(&rt.heap);
        let call_args = args.items.iter().map(|v| v.clone_with_heap(&rt.heap)).collect();

        rt.trace().on_invoke(arity);
        defer_drop!(func, rt);
        call_value(rt, func, ArgValues::from_vec(call_args)).map(Some)
    }
}

/// Scratch argument list for one `map` step.
///
/// Lives on the heap so its contents are traced like any other object's.
#[derive(Debug)]
pub(crate) struct ArgBuffer {
    items: Box<[Value]>,
}

impl ArgBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            items: (0..len).map(|_| Value::None).collect(),
        }
    }
}

impl HeapItem for ArgBuffer {
    fn py_type(&self) -> Type {
        Type::ArgBuffer
    }

    fn estimate_size(&self) -> usize {
        size_of::<Self>() + self.items.len() * size_of::<Value>()
    }

    fn collect_ref_ids(&self, out: &mut Vec<HeapId>) {
        collect_value_ids(self.items.iter(), out);
    }

    fn dec_ref_ids(&mut self, out: &mut Vec<HeapId>) {
        for item in &mut self.items {
            item.dec_ref_ids(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builtins::Builtins,
        object::Object,
        resource::NoLimitTracker,
        tracer::NoopTracer,
    };

    fn list(rt: &mut Runtime<NoLimitTracker, NoopTracer>, items: &[i64]) -> Value {
        Object::List(items.iter().copied().map(Object::Int).collect())
            .to_value(rt)
            .unwrap()
    }

    #[test]
    fn step_buffer_is_released_after_each_call() {
        let mut rt: Runtime<NoLimitTracker, NoopTracer> = Runtime::default();
        let a = list(&mut rt, &[1, 2]);
        let b = list(&mut rt, &[10, 20]);
        let map = new_map(&mut rt, Value::Builtin(Builtins::Add), vec![a, b]).unwrap();

        let first = iter_next(&mut rt, &map).unwrap().unwrap();
        assert!(matches!(first, Value::Int(11)));
        assert_eq!(rt.heap.stats().objects_by_type.get("ArgBuffer"), None);

        map.drop_with_heap(&mut rt.heap);
        assert_eq!(rt.heap.live_objects(), 0);
    }

    #[test]
    fn non_iterable_source_releases_acquired_iterators() {
        let mut rt: Runtime<NoLimitTracker, NoopTracer> = Runtime::default();
        let a = list(&mut rt, &[1]);
        let err = new_map(&mut rt, Value::Builtin(Builtins::Add), vec![a, Value::Int(3)]).unwrap_err();
        assert_eq!(err.exc_type(), crate::ExcType::TypeError);
        assert_eq!(rt.heap.root_depth(), 0);
        assert_eq!(rt.heap.live_objects(), 0);
    }
}
