//! Implementation of the next() builtin function.

use crate::{
    args::ArgValues,
    defer_drop,
    exception_private::{ExcType, RunResult},
    heap::DropWithHeap,
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::iter::iter_next,
    value::Value,
};

/// Implementation of the next() builtin function.
///
/// Returns the next item from the iterator. If the iterator is exhausted,
/// returns `default` when given, otherwise raises `StopIteration`.
pub fn builtin_next(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
    let (iterator, default) = args.get_one_two_args("next", &mut rt.heap)?;
    defer_drop!(iterator, rt);

    match iter_next(rt, iterator) {
        Ok(Some(item)) => {
            default.drop_with_heap(&mut rt.heap);
            Ok(item)
        }
        Ok(None) => default.ok_or_else(ExcType::stop_iteration),
        Err(err) => {
            default.drop_with_heap(&mut rt.heap);
            Err(err)
        }
    }
}
