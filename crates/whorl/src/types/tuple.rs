use std::mem::size_of;

use crate::{
    exception_private::RunResult,
    heap::{HeapData, HeapId},
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::{HeapItem, Type, collect_value_ids},
    value::Value,
};

/// Heap-allocated immutable tuple.
#[derive(Debug, Default)]
pub(crate) struct Tuple {
    items: Box<[Value]>,
}

impl Tuple {
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: items.into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl HeapItem for Tuple {
    fn py_type(&self) -> Type {
        Type::Tuple
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

/// Allocates a tuple owning `items`.
///
/// The items are part of the allocation payload, so they stay protected if the
/// allocation triggers a collection, and are released if it fails.
pub(crate) fn allocate_tuple(
    rt: &mut Runtime<impl ResourceTracker, impl IterTracer>,
    items: Vec<Value>,
) -> RunResult<Value> {
    let id = rt.allocate(HeapData::Tuple(Tuple::new(items)))?;
    Ok(Value::Ref(id))
}
