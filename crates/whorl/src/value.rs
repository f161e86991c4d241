use std::fmt::Write;

use crate::{
    builtins::Builtins,
    exception_private::{ExcType, RunResult},
    heap::{Heap, HeapData, HeapId},
    resource::ResourceTracker,
    types::Type,
};

/// Primary value type representing runtime objects.
///
/// Small immediate values (none, bools, ints, builtins) are stored inline; strings,
/// containers, iterators and host callables live in the heap arena and are
/// referenced by `Ref(HeapId)`.
///
/// NOTE: `Clone` is intentionally NOT derived. Use `clone_with_heap()` for heap values
/// or `clone_immediate()` for immediate values only. Direct cloning would bypass
/// reference counting and cause memory leaks.
#[derive(Debug)]
pub(crate) enum Value {
    None,
    Bool(bool),
    Int(i64),
    /// A builtin callable such as `map` or `add`.
    Builtin(Builtins),
    /// Reference to a heap-allocated object.
    Ref(HeapId),

    /// Sentinel value indicating this Value was properly cleaned up via `drop_with_heap`.
    ///
    /// Only exists when the `ref-count-panic` feature is enabled. If a `Ref` variant is
    /// dropped without calling `drop_with_heap`, the Drop impl will panic.
    #[cfg(feature = "ref-count-panic")]
    Dereferenced,
}

/// Drop implementation that panics if a `Ref` variant is dropped without calling `drop_with_heap`.
///
/// Only enabled when the `ref-count-panic` feature is active.
#[cfg(feature = "ref-count-panic")]
impl Drop for Value {
    fn drop(&mut self) {
        if let Self::Ref(id) = self {
            panic!("Value::Ref({id:?}) dropped without calling drop_with_heap() - this is a reference counting bug");
        }
    }
}

impl Value {
    /// Returns the user-visible type of this value.
    pub fn py_type(&self, heap: &Heap<impl ResourceTracker>) -> Type {
        match self {
            Self::None => Type::NoneType,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Builtin(_) => Type::BuiltinFunction,
            Self::Ref(id) => heap.get(*id).py_type(),
            #[cfg(feature = "ref-count-panic")]
            Self::Dereferenced => panic!("Cannot access Dereferenced object"),
        }
    }

    /// Returns the heap id if this value is a `Ref`.
    #[inline]
    #[must_use]
    pub fn ref_id(&self) -> Option<HeapId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the integer value of ints and bools, `None` for everything else.
    #[must_use]
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Returns the string contents if this value is a heap `str`.
    pub fn as_str<'h>(&self, heap: &'h Heap<impl ResourceTracker>) -> Option<&'h str> {
        match self {
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => Some(s.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Clones the value, incrementing the refcount of heap references.
    pub fn clone_with_heap(&self, heap: &Heap<impl ResourceTracker>) -> Self {
        match self {
            Self::Ref(id) => {
                heap.inc_ref(*id);
                Self::Ref(*id)
            }
            other => other.clone_immediate(),
        }
    }

    /// Releases the value, decrementing the refcount of heap references.
    #[cfg(not(feature = "ref-count-panic"))]
    #[inline]
    pub fn drop_with_heap(self, heap: &mut Heap<impl ResourceTracker>) {
        if let Self::Ref(id) = self {
            heap.dec_ref(id);
        }
    }

    /// Releases the value, decrementing the refcount of heap references.
    ///
    /// With `ref-count-panic` enabled, `Ref` variants are replaced with `Dereferenced` and
    /// the original is forgotten to prevent the Drop impl from panicking.
    #[cfg(feature = "ref-count-panic")]
    pub fn drop_with_heap(mut self, heap: &mut Heap<impl ResourceTracker>) {
        let old = std::mem::replace(&mut self, Self::Dereferenced);
        if let Self::Ref(id) = &old {
            heap.dec_ref(*id);
            std::mem::forget(old);
        }
    }

    /// Copies an immediate value.
    ///
    /// # Panics
    /// Panics on `Ref`: heap references must go through `clone_with_heap`.
    #[must_use]
    pub fn clone_immediate(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Bool(b) => Self::Bool(*b),
            Self::Int(i) => Self::Int(*i),
            Self::Builtin(b) => Self::Builtin(*b),
            Self::Ref(_) => panic!("Ref clones must go through clone_with_heap to maintain refcounts"),
            #[cfg(feature = "ref-count-panic")]
            Self::Dereferenced => panic!("Cannot clone Dereferenced object"),
        }
    }

    /// Moves this value's heap id into `out` ahead of its owner being freed.
    ///
    /// With `ref-count-panic` the value is also marked `Dereferenced` so dropping the
    /// owner afterwards does not panic.
    #[inline]
    pub fn dec_ref_ids(&mut self, out: &mut Vec<HeapId>) {
        if let Self::Ref(id) = self {
            out.push(*id);
            #[cfg(feature = "ref-count-panic")]
            self.dec_ref_forget();
        }
    }

    /// Mark as Dereferenced to prevent Drop panic
    ///
    /// This should be called from `dec_ref_ids` methods only
    #[cfg(feature = "ref-count-panic")]
    pub fn dec_ref_forget(&mut self) {
        let old = std::mem::replace(self, Self::Dereferenced);
        std::mem::forget(old);
    }

    /// Writes a short `repr`-style rendering, used for objects with no host equivalent.
    pub fn py_repr(&self, heap: &Heap<impl ResourceTracker>) -> String {
        let mut out = String::new();
        self.write_repr(heap, &mut out);
        out
    }

    fn write_repr(&self, heap: &Heap<impl ResourceTracker>, out: &mut String) {
        match self {
            Self::None => out.push_str("None"),
            Self::Bool(true) => out.push_str("True"),
            Self::Bool(false) => out.push_str("False"),
            Self::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Builtin(b) => {
                let _ = write!(out, "<built-in function {b}>");
            }
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => {
                    let _ = write!(out, "{:?}", s.as_str());
                }
                HeapData::List(list) => write_seq(list.as_slice(), "[", "]", heap, out),
                HeapData::Tuple(tuple) => {
                    if tuple.len() == 1 {
                        out.push('(');
                        tuple.as_slice()[0].write_repr(heap, out);
                        out.push_str(",)");
                    } else {
                        write_seq(tuple.as_slice(), "(", ")", heap, out);
                    }
                }
                HeapData::HostFunction(f) => {
                    let _ = write!(out, "<function {}>", f.name());
                }
                other => {
                    let _ = write!(out, "<{} object>", other.py_type());
                }
            },
            #[cfg(feature = "ref-count-panic")]
            Self::Dereferenced => panic!("Cannot access Dereferenced object"),
        }
    }
}

fn write_seq(items: &[Value], open: &str, close: &str, heap: &Heap<impl ResourceTracker>, out: &mut String) {
    out.push_str(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_repr(heap, out);
    }
    out.push_str(close);
}

/// Reads an integer argument, accepting bools as 0/1.
pub(crate) fn expect_index(value: &Value, heap: &Heap<impl ResourceTracker>) -> RunResult<i64> {
    value
        .as_index()
        .ok_or_else(|| ExcType::type_error_not_integer(value.py_type(heap)))
}
