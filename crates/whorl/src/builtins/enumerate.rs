//! Implementation of the enumerate() builtin function.

use crate::{
    args::ArgValues,
    defer_drop,
    exception_private::RunResult,
    heap::HeapGuard,
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::enumerate::new_enumerate,
    value::{Value, expect_index},
};

/// Implementation of the enumerate() builtin function.
///
/// `start` may be passed positionally or by keyword, as may `iterable`. `start` must
/// be an int (bools count); anything else raises `TypeError` before the iterable is
/// touched.
pub fn builtin_enumerate(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
    let (iterable, start) = args.get_one_two_args_with_keywords("enumerate", ["iterable", "start"], &mut rt.heap)?;
    let mut iterable = HeapGuard::new(iterable, rt);

    let start = match start {
        Some(start) => {
            let heap = iterable.heap();
            defer_drop!(start, heap);
            expect_index(start, &heap.heap)?
        }
        None => 0,
    };

    let iterable = iterable.into_inner();
    new_enumerate(rt, iterable, start)
}
