//! Implementation of the add() and mul() builtin functions.
//!
//! Small binary operators, mostly useful as `map` callbacks.

use crate::{
    args::ArgValues,
    defer_drop,
    exception_private::{ExcType, RunResult},
    heap::HeapData,
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::Str,
    value::Value,
};

/// Implementation of the add() builtin function.
///
/// Adds two ints (bools count as ints) or concatenates two strs.
pub fn builtin_add(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
    let (left, right) = args.get_two_args("add", &mut rt.heap)?;
    defer_drop!(left, rt);
    defer_drop!(right, rt);

    if let (Some(a), Some(b)) = (left.as_index(), right.as_index()) {
        return a
            .checked_add(b)
            .map(Value::Int)
            .ok_or_else(|| ExcType::overflow_error("integer addition overflowed"));
    }
    if let (Some(a), Some(b)) = (left.as_str(&rt.heap), right.as_str(&rt.heap)) {
        let joined = format!("{a}{b}");
        let id = rt.allocate(HeapData::Str(Str::from(joined)))?;
        return Ok(Value::Ref(id));
    }
    Err(ExcType::type_error_operands(
        "+",
        left.py_type(&rt.heap),
        right.py_type(&rt.heap),
    ))
}

/// Implementation of the mul() builtin function.
///
/// Multiplies two ints, or repeats a str by an int count (either operand order).
/// A count of zero or less gives the empty str.
pub fn builtin_mul(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
    let (left, right) = args.get_two_args("mul", &mut rt.heap)?;
    defer_drop!(left, rt);
    defer_drop!(right, rt);

    if let (Some(a), Some(b)) = (left.as_index(), right.as_index()) {
        return a
            .checked_mul(b)
            .map(Value::Int)
            .ok_or_else(|| ExcType::overflow_error("integer multiplication overflowed"));
    }

    let repeated = match (left.as_str(&rt.heap), right.as_index(), left.as_index(), right.as_str(&rt.heap)) {
        (Some(s), Some(n), _, _) | (_, _, Some(n), Some(s)) => repeat_str(s, n)?,
        _ => {
            return Err(ExcType::type_error_operands(
                "*",
                left.py_type(&rt.heap),
                right.py_type(&rt.heap),
            ));
        }
    };
    let id = rt.allocate(HeapData::Str(Str::from(repeated)))?;
    Ok(Value::Ref(id))
}

fn repeat_str(s: &str, count: i64) -> RunResult<String> {
    let count = usize::try_from(count).unwrap_or(0);
    if s.len().checked_mul(count).is_none() {
        return Err(ExcType::overflow_error("repeated string is too long"));
    }
    Ok(s.repeat(count))
}
