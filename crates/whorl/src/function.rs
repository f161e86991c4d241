//! Invocation of callables: builtins and host functions.

use std::{fmt, mem::size_of};

use crate::{
    args::ArgValues,
    exception_private::{ExcType, RunError, RunResult},
    exception_public::Exception,
    heap::{DropWithHeap, HeapData, HeapId},
    object::Object,
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::{HeapItem, Type},
    value::Value,
};

/// A function implemented by the host.
///
/// Receives positional arguments as owned [`Object`]s. An `Err` is raised inside the
/// runtime and comes back out of the outermost operation unchanged.
///
/// Implemented for every `FnMut(Vec<Object>) -> Result<Object, Exception>` closure.
pub trait HostFunction {
    fn call(&mut self, args: Vec<Object>) -> Result<Object, Exception>;
}

impl<F> HostFunction for F
where
    F: FnMut(Vec<Object>) -> Result<Object, Exception>,
{
    fn call(&mut self, args: Vec<Object>) -> Result<Object, Exception> {
        self(args)
    }
}

/// Heap payload for a registered host function.
pub(crate) struct HostCallable {
    name: String,
    func: Box<dyn HostFunction>,
}

impl HostCallable {
    pub fn new(name: &str, func: Box<dyn HostFunction>) -> Self {
        Self {
            name: name.to_owned(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for HostCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCallable").field("name", &self.name).finish_non_exhaustive()
    }
}

impl HeapItem for HostCallable {
    fn py_type(&self) -> Type {
        Type::Function
    }

    fn estimate_size(&self) -> usize {
        size_of::<Self>() + self.name.len()
    }

    fn collect_ref_ids(&self, _out: &mut Vec<HeapId>) {}

    fn dec_ref_ids(&mut self, _out: &mut Vec<HeapId>) {}
}

/// Calls `func` with `args`, one call level deeper.
///
/// Every error, including one raised by host code, is returned unchanged.
pub(crate) fn call_value(
    rt: &mut Runtime<impl ResourceTracker, impl IterTracer>,
    func: &Value,
    args: ArgValues,
) -> RunResult<Value> {
    rt.nested(|rt| match func {
        Value::Builtin(builtin) => builtin.call(rt, args),
        Value::Ref(id) if matches!(rt.heap.get(*id), HeapData::HostFunction(_)) => call_host(rt, *id, args),
        other => {
            let type_ = other.py_type(&rt.heap);
            args.drop_with_heap(&mut rt.heap);
            Err(ExcType::type_error_not_callable(type_))
        }
    })
}

fn call_host(
    rt: &mut Runtime<impl ResourceTracker, impl IterTracer>,
    id: HeapId,
    args: ArgValues,
) -> RunResult<Value> {
    let HeapData::HostFunction(callable) = rt.heap.get(id) else {
        args.drop_with_heap(&mut rt.heap);
        return Err(RunError::internal("call_host: not a host function"));
    };
    let name = callable.name().to_owned();
    let positional = args.into_positional(&name, &mut rt.heap)?;
    let objects = positional
        .iter()
        .map(|value| Object::from_borrowed_value(value, &rt.heap))
        .collect();
    positional.drop_with_heap(&mut rt.heap);

    let HeapData::HostFunction(callable) = rt.heap.get_mut(id) else {
        return Err(RunError::internal("call_host: not a host function"));
    };
    let result = callable.func.call(objects)?;
    result.to_value(rt)
}
