//! Implementation of the list() builtin function.

use crate::{
    args::ArgValues,
    defer_root,
    exception_private::RunResult,
    heap::{HeapData, RootGuard},
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::{
        List,
        iter::{get_iter, iter_next},
    },
    value::Value,
};

/// Implementation of the list() builtin function.
///
/// Drains the iterable into a new list. Each item counts against the container
/// insert limit of the resource tracker, so draining an endless iterator under
/// limits ends in `MemoryError` rather than running forever.
pub fn builtin_list(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
    let iterable = args.get_one_arg("list", &mut rt.heap)?;
    let iterator = get_iter(rt, iterable)?;
    defer_root!(iterator, rt);

    let mut items = RootGuard::new(Vec::new(), rt);
    while let Some(item) = iter_next(items.heap(), iterator)? {
        items.push(item);
        items.heap().heap.tracker_mut().on_container_insert()?;
    }
    let items = items.into_inner();

    let id = rt.allocate(HeapData::List(List::new(items)))?;
    Ok(Value::Ref(id))
}
