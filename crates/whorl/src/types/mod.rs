//! Heap-allocated object types.
//!
//! Every payload stored in [`crate::heap::HeapData`] implements [`HeapItem`], which
//! tells the heap how big the object is and which other heap objects it holds.
pub mod enumerate;
pub mod iter;
pub mod list;
pub mod map;
pub mod repeat;
pub mod str;
pub mod tuple;
pub mod r#type;

pub(crate) use enumerate::EnumerateIter;
pub(crate) use iter::{HostIter, SeqIter};
pub use iter::HostIterator;
pub(crate) use list::List;
pub(crate) use map::{ArgBuffer, MapIter};
pub(crate) use repeat::RepeatIter;
pub(crate) use str::Str;
pub(crate) use tuple::{Tuple, allocate_tuple};
pub use r#type::Type;

use crate::{heap::HeapId, value::Value};

/// Common interface of every heap payload.
pub(crate) trait HeapItem {
    /// User-visible type of the object.
    fn py_type(&self) -> Type;

    /// Approximate payload size in bytes, excluding the slot header.
    fn estimate_size(&self) -> usize;

    /// Pushes the ids of heap objects referenced by this payload (GC mark phase).
    fn collect_ref_ids(&self, out: &mut Vec<HeapId>);

    /// Moves out every owned heap id so the heap can `dec_ref` them after the payload is freed.
    fn dec_ref_ids(&mut self, out: &mut Vec<HeapId>);
}

/// Pushes the ref ids found in `values`.
pub(crate) fn collect_value_ids<'a>(values: impl IntoIterator<Item = &'a Value>, out: &mut Vec<HeapId>) {
    out.extend(values.into_iter().filter_map(Value::ref_id));
}
