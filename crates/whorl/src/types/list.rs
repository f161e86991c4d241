use std::mem::size_of;

use crate::{
    heap::HeapId,
    types::{HeapItem, Type, collect_value_ids},
    value::Value,
};

/// Heap-allocated list.
///
/// Lists are built whole (from host objects or by the `list` builtin) and never
/// mutated afterwards, so a list iterator can index it without a version check.
#[derive(Debug, Default)]
pub(crate) struct List {
    items: Vec<Value>,
}

impl List {
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }
}

impl HeapItem for List {
    fn py_type(&self) -> Type {
        Type::List
    }

    fn estimate_size(&self) -> usize {
        size_of::<Self>() + self.items.len() * size_of::<Value>()
    }

    fn collect_ref_ids(&self, out: &mut Vec<HeapId>) {
        collect_value_ids(&self.items, out);
    }

    fn dec_ref_ids(&mut self, out: &mut Vec<HeapId>) {
        for item in &mut self.items {
            item.dec_ref_ids(out);
        }
    }
}
