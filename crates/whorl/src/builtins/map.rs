//! Implementation of the map() builtin function.

use crate::{
    args::ArgValues,
    exception_private::{ExcType, RunResult},
    heap::DropWithHeap,
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::map::new_map,
    value::Value,
};

/// Implementation of the map() builtin function.
///
/// Returns a lazy map iterator. Needs the function and at least one iterable;
/// keyword arguments are rejected.
pub fn builtin_map(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
    let mut positional = args.into_positional("map", &mut rt.heap)?;
    if positional.len() < 2 {
        let count = positional.len();
        positional.drop_with_heap(&mut rt.heap);
        return Err(ExcType::type_error_at_least("map", 2, count));
    }
    let func = positional.remove(0);
    new_map(rt, func, positional)
}
