//! The iterator capability.
//!
//! [`get_iter`] turns any iterable into an iterator; [`iter_next`] advances an
//! iterator, returning `Ok(None)` once it is exhausted. Exhaustion is a sentinel,
//! never an error: only the `next` builtin turns it into `StopIteration`.
//!
//! Dispatch is static: `iter_next` matches the heap tag and forwards to the
//! [`IterNext`] implementation of that type.

use std::{fmt, mem::size_of};

use crate::{
    exception_private::{ExcType, RunError, RunResult},
    exception_public::Exception,
    heap::{HeapData, HeapId},
    object::Object,
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::{EnumerateIter, HeapItem, MapIter, RepeatIter, Str, Type},
    value::Value,
};

/// "next" behaviour of one heap iterator type.
///
/// Implementations receive the iterator's heap id rather than `&mut self`: producing a
/// value may allocate, advance other iterators, or call user code, and all of those
/// need the whole runtime.
pub(crate) trait IterNext {
    fn next(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, id: HeapId) -> RunResult<Option<Value>>;
}

/// Returns an iterator over `value`, consuming the reference.
///
/// Iterators return themselves. Lists, tuples and strings get a fresh sequence
/// iterator. Everything else raises `TypeError: '<type>' object is not iterable`.
pub(crate) fn get_iter(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, value: Value) -> RunResult<Value> {
    enum Source {
        Identity,
        Seq(Type),
        NotIterable(Type),
    }

    let source = match value.ref_id() {
        Some(id) => match rt.heap.get(id) {
            data if data.is_iterator() => Source::Identity,
            HeapData::List(_) => Source::Seq(Type::ListIterator),
            HeapData::Tuple(_) => Source::Seq(Type::TupleIterator),
            HeapData::Str(_) => Source::Seq(Type::StrIterator),
            other => Source::NotIterable(other.py_type()),
        },
        None => Source::NotIterable(value.py_type(&rt.heap)),
    };

    match source {
        Source::Identity => Ok(value),
        Source::Seq(kind) => {
            let id = rt.allocate(HeapData::SeqIter(SeqIter::new(value, kind)))?;
            Ok(Value::Ref(id))
        }
        Source::NotIterable(type_) => {
            value.drop_with_heap(&mut rt.heap);
            Err(ExcType::type_error_not_iterable(type_))
        }
    }
}

/// Advances `iterator` by one step, one call level deeper.
///
/// Returns `Ok(None)` when the iterator is exhausted. Errors raised while producing
/// the value propagate unchanged.
pub(crate) fn iter_next(
    rt: &mut Runtime<impl ResourceTracker, impl IterTracer>,
    iterator: &Value,
) -> RunResult<Option<Value>> {
    let kind = iterator.py_type(&rt.heap);
    let Some(id) = iterator.ref_id().filter(|_| kind.is_iterator()) else {
        return Err(ExcType::type_error_not_iterator(kind));
    };

    let next = rt.nested(|rt| match rt.heap.get(id) {
        HeapData::SeqIter(_) => SeqIter::next(rt, id),
        HeapData::Repeat(_) => RepeatIter::next(rt, id),
        HeapData::Enumerate(_) => EnumerateIter::next(rt, id),
        HeapData::Map(_) => MapIter::next(rt, id),
        HeapData::HostIter(_) => HostIter::next(rt, id),
        _ => Err(RunError::internal("iter_next: iterator type without a next implementation")),
    })?;
    if next.is_none() {
        rt.trace().on_exhausted(kind);
    }
    Ok(next)
}

/// Iterator over a list, tuple or str.
///
/// Holds a reference to the sequence and a position: an item index for lists and
/// tuples, a byte offset for strs.
#[derive(Debug)]
pub(crate) struct SeqIter {
    seq: Value,
    pos: usize,
    kind: Type,
}

impl SeqIter {
    fn new(seq: Value, kind: Type) -> Self {
        Self { seq, pos: 0, kind }
    }
}

impl HeapItem for SeqIter {
    fn py_type(&self) -> Type {
        self.kind
    }

    fn estimate_size(&self) -> usize {
        size_of::<Self>()
    }

    fn collect_ref_ids(&self, out: &mut Vec<HeapId>) {
        out.extend(self.seq.ref_id());
    }

    fn dec_ref_ids(&mut self, out: &mut Vec<HeapId>) {
        self.seq.dec_ref_ids(out);
    }
}

/// What a sequence iterator found at its position.
enum SeqStep {
    Item(Value, usize),
    Char(char, usize),
    End,
}

impl IterNext for SeqIter {
    fn next(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, id: HeapId) -> RunResult<Option<Value>> {
        let HeapData::SeqIter(it) = rt.heap.get(id) else {
            return Err(RunError::internal("SeqIter::next: wrong heap type"));
        };
        let Some(seq_id) = it.seq.ref_id() else {
            return Err(RunError::internal("SeqIter::next: sequence is not a heap value"));
        };
        let pos = it.pos;

        let step = match rt.heap.get(seq_id) {
            HeapData::List(list) => list
                .as_slice()
                .get(pos)
                .map_or(SeqStep::End, |item| SeqStep::Item(item.clone_with_heap(&rt.heap), pos + 1)),
            HeapData::Tuple(tuple) => tuple
                .as_slice()
                .get(pos)
                .map_or(SeqStep::End, |item| SeqStep::Item(item.clone_with_heap(&rt.heap), pos + 1)),
            HeapData::Str(s) => s.char_at(pos).map_or(SeqStep::End, |(c, next)| SeqStep::Char(c, next)),
            _ => return Err(RunError::internal("SeqIter::next: not a sequence")),
        };

        let (value, next_pos) = match step {
            SeqStep::End => return Ok(None),
            SeqStep::Item(value, next_pos) => (value, next_pos),
            SeqStep::Char(c, next_pos) => {
                let id = rt.allocate(HeapData::Str(Str::from(c.to_string())))?;
                (Value::Ref(id), next_pos)
            }
        };
        if let HeapData::SeqIter(it) = rt.heap.get_mut(id) {
            it.pos = next_pos;
        }
        Ok(Some(value))
    }
}

/// An iterator implemented by the host.
///
/// Return `Ok(None)` once exhausted. An `Err` is raised inside the runtime and comes
/// back out of the outermost `next` unchanged.
///
/// Implemented for every `Iterator<Item = Result<Object, Exception>>`.
pub trait HostIterator {
    fn next(&mut self) -> Result<Option<Object>, Exception>;
}

impl<I> HostIterator for I
where
    I: Iterator<Item = Result<Object, Exception>>,
{
    fn next(&mut self) -> Result<Option<Object>, Exception> {
        Iterator::next(self).transpose()
    }
}

/// Heap payload for a host iterator.
pub(crate) struct HostIter {
    name: String,
    iter: Box<dyn HostIterator>,
}

impl HostIter {
    pub fn new(name: &str, iter: Box<dyn HostIterator>) -> Self {
        Self {
            name: name.to_owned(),
            iter,
        }
    }
}

impl fmt::Debug for HostIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostIter").field("name", &self.name).finish_non_exhaustive()
    }
}

impl HeapItem for HostIter {
    fn py_type(&self) -> Type {
        Type::HostIterator
    }

    fn estimate_size(&self) -> usize {
        size_of::<Self>() + self.name.len()
    }

    fn collect_ref_ids(&self, _out: &mut Vec<HeapId>) {}

    fn dec_ref_ids(&mut self, _out: &mut Vec<HeapId>) {}
}

impl IterNext for HostIter {
    fn next(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, id: HeapId) -> RunResult<Option<Value>> {
        let HeapData::HostIter(host) = rt.heap.get_mut(id) else {
            return Err(RunError::internal("HostIter::next: wrong heap type"));
        };
        match host.iter.next()? {
            Some(object) => object.to_value(rt).map(Some),
            None => Ok(None),
        }
    }
}
