use std::{
    collections::BTreeMap,
    marker::PhantomData,
    mem::{ManuallyDrop, size_of},
    sync::atomic::{AtomicUsize, Ordering},
    vec,
};

use smallvec::SmallVec;
use strum::IntoStaticStr;

use crate::{
    function::HostCallable,
    resource::{ResourceError, ResourceTracker},
    types::{
        ArgBuffer, EnumerateIter, HeapItem, HostIter, List, MapIter, RepeatIter, SeqIter, Str, Tuple, Type,
    },
    value::Value,
};

/// Snapshot of heap state at a point in time.
///
/// The `objects_by_type` map uses `BTreeMap` for deterministic iteration order,
/// making snapshots suitable for display and comparison without sort overhead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapStats {
    /// Total number of live objects on the heap.
    pub live_objects: usize,
    /// Number of free (recycled) slots available for reuse.
    pub free_slots: usize,
    /// Total heap capacity (live + free).
    pub total_slots: usize,
    /// Breakdown of live objects by `HeapData` variant name.
    ///
    /// Keys are static variant names (e.g., "List", "Map", "ArgBuffer").
    pub objects_by_type: BTreeMap<&'static str, usize>,
    /// Number of values currently pinned by host handles.
    pub pinned: usize,
    /// Depth of the scoped root stack; zero whenever no operation is in progress.
    pub root_depth: usize,
    /// Resource tracker allocation count, if using `LimitedTracker`.
    pub tracker_allocations: Option<usize>,
    /// Resource tracker memory usage in bytes, if using `LimitedTracker`.
    pub tracker_memory_bytes: Option<usize>,
}

/// Unique identifier for values stored inside the heap arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct HeapId(usize);

impl HeapId {
    /// Returns the raw index value.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a heap slot.
///
/// The variant is the object's type tag: it selects the "get iterator" and
/// "next" behaviour in `types::iter`.
#[derive(Debug, IntoStaticStr)]
pub(crate) enum HeapData {
    Str(Str),
    List(List),
    Tuple(Tuple),
    SeqIter(SeqIter),
    Repeat(RepeatIter),
    Enumerate(EnumerateIter),
    Map(MapIter),
    HostIter(HostIter),
    HostFunction(HostCallable),
    /// Scratch argument buffer used by `MapIter::next`; never escapes a single call.
    ArgBuffer(ArgBuffer),
}

/// Forwards a `HeapItem` method to the variant's payload.
macro_rules! with_item {
    ($data:expr, $item:ident => $body:expr) => {
        match $data {
            HeapData::Str($item) => $body,
            HeapData::List($item) => $body,
            HeapData::Tuple($item) => $body,
            HeapData::SeqIter($item) => $body,
            HeapData::Repeat($item) => $body,
            HeapData::Enumerate($item) => $body,
            HeapData::Map($item) => $body,
            HeapData::HostIter($item) => $body,
            HeapData::HostFunction($item) => $body,
            HeapData::ArgBuffer($item) => $body,
        }
    };
}

impl HeapData {
    #[must_use]
    pub fn py_type(&self) -> Type {
        with_item!(self, item => item.py_type())
    }

    /// Approximate number of bytes the object occupies, including its slot.
    #[must_use]
    pub fn estimate_size(&self) -> usize {
        size_of::<HeapValue>() + with_item!(self, item => item.estimate_size())
    }

    /// Pushes the ids of every heap object this payload references.
    pub fn collect_ref_ids(&self, out: &mut Vec<HeapId>) {
        with_item!(self, item => item.collect_ref_ids(out));
    }

    /// Moves out the ids this payload owns a count on, ahead of the payload being freed.
    pub fn dec_ref_ids(&mut self, out: &mut Vec<HeapId>) {
        with_item!(self, item => item.dec_ref_ids(out));
    }

    /// True for every payload that implements "next" (and whose "get iterator" is identity).
    #[must_use]
    pub fn is_iterator(&self) -> bool {
        matches!(
            self,
            Self::SeqIter(_) | Self::Repeat(_) | Self::Enumerate(_) | Self::Map(_) | Self::HostIter(_)
        )
    }
}

/// A single arena slot: refcount plus payload.
#[derive(Debug)]
pub(crate) struct HeapValue {
    refcount: AtomicUsize,
    data: HeapData,
}

/// Reference-counted arena that backs every heap-only runtime value.
///
/// Uses a free list to reuse slots from freed values. When a value is freed via
/// `dec_ref` or swept by `collect_garbage`, its slot ID is added to the free list.
///
/// Besides refcounts the heap tracks the three kinds of GC roots:
/// - pins: values owned by host `Handle`s, permanent until released;
/// - the scoped root stack, driven by [`RootGuard`];
/// - the payload of an allocation in progress (supplied by the caller of
///   [`Heap::collect_garbage`]).
///
/// Generic over `T: ResourceTracker`. When `T = NoLimitTracker` all resource
/// checks compile away to no-ops.
#[derive(Debug)]
pub(crate) struct Heap<T: ResourceTracker> {
    entries: Vec<Option<HeapValue>>,
    /// IDs of freed slots available for reuse.
    free_list: Vec<HeapId>,
    tracker: T,
    /// Host-owned values; index is the `Handle` slot.
    pins: Vec<Option<Value>>,
    free_pins: Vec<usize>,
    /// Scoped roots, strictly LIFO.
    roots: Vec<HeapId>,
    /// Number of allocations since the last collection.
    allocations_since_gc: usize,
}

impl<T: ResourceTracker> Heap<T> {
    /// Creates a new heap with the given resource tracker.
    pub fn new(capacity: usize, tracker: T) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            tracker,
            pins: Vec::new(),
            free_pins: Vec::new(),
            roots: Vec::new(),
            allocations_since_gc: 0,
        }
    }

    #[inline]
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    #[inline]
    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    /// Asks the tracker whether `data` may be allocated.
    ///
    /// Split from [`Heap::insert`] so the caller can collect and retry between the two.
    pub fn reserve(&mut self, data: &HeapData) -> Result<(), ResourceError> {
        self.tracker.on_allocate(|| data.estimate_size())
    }

    /// Places `data` in a fresh slot with a refcount of one.
    ///
    /// The caller must have called [`Heap::reserve`] first.
    pub fn insert(&mut self, data: HeapData) -> HeapId {
        self.allocations_since_gc = self.allocations_since_gc.saturating_add(1);
        let new_entry = HeapValue {
            refcount: AtomicUsize::new(1),
            data,
        };

        if let Some(id) = self.free_list.pop() {
            self.entries[id.index()] = Some(new_entry);
            id
        } else {
            let id = self.entries.len();
            self.entries.push(Some(new_entry));
            HeapId(id)
        }
    }

    /// Drops a payload that never made it into the arena, releasing the references it held.
    pub fn release(&mut self, mut data: HeapData) {
        let mut child_ids = Vec::new();
        data.dec_ref_ids(&mut child_ids);
        drop(data);
        for child_id in child_ids {
            self.dec_ref(child_id);
        }
    }

    /// True once enough allocations have happened since the last collection.
    #[must_use]
    pub fn should_collect(&self) -> bool {
        self.allocations_since_gc >= self.tracker.gc_interval()
    }

    /// Increments the reference count for an existing heap entry.
    ///
    /// # Panics
    /// Panics if the value ID is invalid or the value has already been freed.
    pub fn inc_ref(&self, id: HeapId) {
        let value = self
            .entries
            .get(id.index())
            .expect("Heap::inc_ref: slot missing")
            .as_ref()
            .expect("Heap::inc_ref: object already freed");
        value.refcount.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrements the reference count and frees the value (plus children) once it hits zero.
    ///
    /// # Panics
    /// Panics if the value ID is invalid or the value has already been freed.
    pub fn dec_ref(&mut self, id: HeapId) {
        let value = {
            let slot = self.entries.get_mut(id.index()).expect("Heap::dec_ref: slot missing");
            let entry = slot.as_mut().expect("Heap::dec_ref: object already freed");
            let count = entry.refcount.load(Ordering::Relaxed);
            if count > 1 {
                entry.refcount.store(count - 1, Ordering::Relaxed);
                return;
            }
            slot.take().expect("Heap::dec_ref: object already freed")
        };

        self.free_list.push(id);
        let mut data = value.data;
        self.tracker.on_free(|| data.estimate_size());

        let mut child_ids = Vec::new();
        data.dec_ref_ids(&mut child_ids);
        drop(data);
        for child_id in child_ids {
            self.dec_ref(child_id);
        }
    }

    /// Returns an immutable reference to the heap data stored at the given ID.
    ///
    /// # Panics
    /// Panics if the value ID is invalid or the value has already been freed.
    #[must_use]
    pub fn get(&self, id: HeapId) -> &HeapData {
        &self
            .entries
            .get(id.index())
            .expect("Heap::get: slot missing")
            .as_ref()
            .expect("Heap::get: object already freed")
            .data
    }

    /// Returns a mutable reference to the heap data stored at the given ID.
    ///
    /// # Panics
    /// Panics if the value ID is invalid or the value has already been freed.
    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        &mut self
            .entries
            .get_mut(id.index())
            .expect("Heap::get_mut: slot missing")
            .as_mut()
            .expect("Heap::get_mut: object already freed")
            .data
    }

    /// Returns the refcount of a live entry, or `None` if the slot is free.
    #[cfg(test)]
    #[must_use]
    pub fn refcount(&self, id: HeapId) -> Option<usize> {
        self.entries
            .get(id.index())
            .and_then(Option::as_ref)
            .map(|entry| entry.refcount.load(Ordering::Relaxed))
    }

    /// Stores `value` as a permanent root and returns its pin slot.
    pub fn pin(&mut self, value: Value) -> usize {
        if let Some(slot) = self.free_pins.pop() {
            self.pins[slot] = Some(value);
            slot
        } else {
            self.pins.push(Some(value));
            self.pins.len() - 1
        }
    }

    /// Returns the pinned value for `slot`.
    ///
    /// # Panics
    /// Panics if the slot was never pinned or has been released.
    #[must_use]
    pub fn pinned(&self, slot: usize) -> &Value {
        self.pins
            .get(slot)
            .and_then(Option::as_ref)
            .expect("Heap::pinned: handle already released")
    }

    /// Removes a pin, handing ownership of the value back to the caller.
    pub fn unpin(&mut self, slot: usize) -> Option<Value> {
        let value = self.pins.get_mut(slot)?.take()?;
        self.free_pins.push(slot);
        Some(value)
    }

    /// Pushes a scoped root. Only [`RootGuard`] calls this.
    pub fn push_root(&mut self, id: HeapId) {
        self.roots.push(id);
    }

    /// Pops a scoped root.
    ///
    /// # Panics
    /// Panics if `id` is not the top of the root stack: roots are strictly LIFO.
    pub fn pop_root(&mut self, id: HeapId) {
        let top = self.roots.pop();
        assert_eq!(top, Some(id), "Heap::pop_root: root stack out of order");
    }

    #[must_use]
    pub fn root_depth(&self) -> usize {
        self.roots.len()
    }

    /// Every root the collector must treat as live: pins, the root stack, and `extra`.
    pub fn gc_roots(&self, extra: impl IntoIterator<Item = HeapId>) -> Vec<HeapId> {
        let mut roots: Vec<HeapId> = self.pins.iter().flatten().filter_map(Value::ref_id).collect();
        roots.extend_from_slice(&self.roots);
        roots.extend(extra);
        roots
    }

    /// Runs a mark-sweep pass and returns the number of objects freed.
    ///
    /// Marks everything reachable from `roots`, then frees every other entry
    /// regardless of its refcount. Counts that swept objects held on surviving
    /// objects are given back, so refcounting stays exact for the survivors.
    pub fn collect_garbage(&mut self, roots: Vec<HeapId>) -> usize {
        // Mark phase
        let mut reachable: Vec<bool> = vec![false; self.entries.len()];
        let mut work_list = roots;

        while let Some(id) = work_list.pop() {
            let idx = id.index();
            if idx >= reachable.len() || reachable[idx] {
                continue;
            }
            reachable[idx] = true;

            if let Some(Some(entry)) = self.entries.get(idx) {
                entry.data.collect_ref_ids(&mut work_list);
            }
        }

        // Sweep phase
        let mut freed = 0;
        let mut orphaned = Vec::new();
        for (idx, slot) in self.entries.iter_mut().enumerate() {
            if reachable[idx] {
                continue;
            }
            if let Some(value) = slot.take() {
                let mut data = value.data;
                self.tracker.on_free(|| data.estimate_size());
                data.dec_ref_ids(&mut orphaned);
                self.free_list.push(HeapId(idx));
                freed += 1;
            }
        }

        for id in orphaned {
            if reachable[id.index()]
                && let Some(Some(entry)) = self.entries.get(id.index())
            {
                let count = entry.refcount.load(Ordering::Relaxed);
                entry.refcount.store(count.saturating_sub(1).max(1), Ordering::Relaxed);
            }
        }

        self.allocations_since_gc = 0;
        freed
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.entries.iter().filter(|slot| slot.is_some()).count()
    }

    /// Takes a snapshot of the current heap state.
    #[must_use]
    pub fn stats(&self) -> HeapStats {
        let mut objects_by_type: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut live_objects = 0;
        for entry in self.entries.iter().flatten() {
            live_objects += 1;
            let name: &'static str = (&entry.data).into();
            *objects_by_type.entry(name).or_default() += 1;
        }
        HeapStats {
            live_objects,
            free_slots: self.free_list.len(),
            total_slots: self.entries.len(),
            objects_by_type,
            pinned: self.pins.iter().flatten().count(),
            root_depth: self.roots.len(),
            tracker_allocations: self.tracker.allocation_count(),
            tracker_memory_bytes: self.tracker.current_memory_bytes(),
        }
    }
}

/// Drop implementation for Heap that marks all contained values as Dereferenced
/// before dropping to prevent panics when the `ref-count-panic` feature is enabled.
#[cfg(feature = "ref-count-panic")]
impl<T: ResourceTracker> Drop for Heap<T> {
    fn drop(&mut self) {
        let mut dummy_stack = Vec::new();
        for value in self.entries.iter_mut().flatten() {
            value.data.dec_ref_ids(&mut dummy_stack);
        }
        for pin in self.pins.iter_mut().flatten() {
            pin.dec_ref_ids(&mut dummy_stack);
        }
    }
}

/// Anything that can hand out the heap: the heap itself or the runtime owning it.
pub(crate) trait ContainsHeap<T: ResourceTracker> {
    fn heap_mut(&mut self) -> &mut Heap<T>;
}

impl<T: ResourceTracker> ContainsHeap<T> for Heap<T> {
    #[inline]
    fn heap_mut(&mut self) -> &mut Self {
        self
    }
}

/// Trait for types that require heap access for proper cleanup.
///
/// Rust's standard `Drop` trait cannot decrement heap reference counts because it has no
/// access to the `Heap`. This trait provides an explicit drop-with-heap method so that
/// ref-counted values (and containers of them) can properly decrement their counts when
/// they are no longer needed.
///
/// **All types implementing this trait must be cleaned up on every code path.** A missed
/// call on any branch leaks reference counts. Prefer [`defer_drop!`] or [`HeapGuard`] to
/// guarantee cleanup automatically rather than inserting manual calls in every branch.
pub(crate) trait DropWithHeap<T: ResourceTracker> {
    /// Consume `self` and decrement reference counts for any heap-allocated values contained within.
    fn drop_with_heap(self, heap: &mut Heap<T>);
}

impl<T: ResourceTracker> DropWithHeap<T> for Value {
    #[inline]
    fn drop_with_heap(self, heap: &mut Heap<T>) {
        Self::drop_with_heap(self, heap);
    }
}

impl<T: ResourceTracker, U: DropWithHeap<T>> DropWithHeap<T> for Option<U> {
    #[inline]
    fn drop_with_heap(self, heap: &mut Heap<T>) {
        if let Some(value) = self {
            value.drop_with_heap(heap);
        }
    }
}

impl<T: ResourceTracker, U: DropWithHeap<T>> DropWithHeap<T> for Vec<U> {
    fn drop_with_heap(self, heap: &mut Heap<T>) {
        for value in self {
            value.drop_with_heap(heap);
        }
    }
}

impl<T: ResourceTracker, U: DropWithHeap<T>> DropWithHeap<T> for vec::IntoIter<U> {
    fn drop_with_heap(self, heap: &mut Heap<T>) {
        for value in self {
            value.drop_with_heap(heap);
        }
    }
}

/// RAII guard that ensures a [`DropWithHeap`] value is cleaned up on every code path.
///
/// The guard's `Drop` impl calls [`DropWithHeap::drop_with_heap`] automatically, so
/// cleanup happens whether the scope exits normally, via `?`, early return,
/// or any other branch.
///
/// Prefer the [`defer_drop!`] macro for the common case. Use `HeapGuard` directly when
/// the value must be conditionally reclaimed via [`into_inner`](Self::into_inner).
///
/// A `HeapGuard` does not make its value a GC root. Values that must survive an
/// allocation while held only by a Rust local belong in a [`RootGuard`].
pub(crate) struct HeapGuard<'a, T: ResourceTracker, H: ContainsHeap<T>, V: DropWithHeap<T>> {
    // manually dropped because it needs to be dropped by move.
    value: ManuallyDrop<V>,
    heap: &'a mut H,
    _tracker: PhantomData<T>,
}

impl<'a, T: ResourceTracker, H: ContainsHeap<T>, V: DropWithHeap<T>> HeapGuard<'a, T, H, V> {
    /// Creates a new `HeapGuard` for the given value and heap.
    #[inline]
    pub fn new(value: V, heap: &'a mut H) -> Self {
        Self {
            value: ManuallyDrop::new(value),
            heap,
            _tracker: PhantomData,
        }
    }

    /// Consumes the guard and returns the contained value without dropping it.
    #[inline]
    pub fn into_inner(self) -> V {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: [DH] - `ManuallyDrop::new(self)` prevents `Drop` on self, so we can take the value out
        unsafe { ManuallyDrop::take(&mut this.value) }
    }

    /// Borrows the value (immutably) and heap (mutably) out of the guard.
    ///
    /// This is what [`defer_drop!`] calls internally.
    #[inline]
    pub fn as_parts(&mut self) -> (&V, &mut H) {
        (&self.value, self.heap)
    }

    /// Borrows just the heap out of the guard
    #[inline]
    pub fn heap(&mut self) -> &mut H {
        self.heap
    }
}

impl<T: ResourceTracker, H: ContainsHeap<T>, V: DropWithHeap<T>> Drop for HeapGuard<'_, T, H, V> {
    fn drop(&mut self) {
        // SAFETY: [DH] - value is never manually dropped until this point
        unsafe { ManuallyDrop::take(&mut self.value) }.drop_with_heap(self.heap.heap_mut());
    }
}

/// Values whose heap references can be registered as scoped roots.
pub(crate) trait Rooted {
    /// Pushes the id of every heap object directly held by `self`.
    fn root_ids(&self, out: &mut SmallVec<[HeapId; 4]>);
}

impl Rooted for Value {
    #[inline]
    fn root_ids(&self, out: &mut SmallVec<[HeapId; 4]>) {
        if let Some(id) = self.ref_id() {
            out.push(id);
        }
    }
}

impl<U: Rooted> Rooted for Option<U> {
    #[inline]
    fn root_ids(&self, out: &mut SmallVec<[HeapId; 4]>) {
        if let Some(value) = self {
            value.root_ids(out);
        }
    }
}

impl<U: Rooted> Rooted for Vec<U> {
    fn root_ids(&self, out: &mut SmallVec<[HeapId; 4]>) {
        for value in self {
            value.root_ids(out);
        }
    }
}

/// Scope guard that keeps a value alive across collections and releases it on every exit path.
///
/// On creation the value's heap ids are pushed on the heap's root stack; on drop they
/// are popped in reverse order and the value is released with `drop_with_heap`. The
/// guard is the only code that drives the root stack, so pushes and pops always pair
/// up even when a `?` unwinds several nested guards at once.
///
/// [`into_inner`](Self::into_inner) pops the roots without dropping the value: use it
/// once the value is reachable from a permanent structure (a pin, another heap object,
/// or the caller's own guard).
pub(crate) struct RootGuard<'a, T: ResourceTracker, H: ContainsHeap<T>, V: DropWithHeap<T> + Rooted> {
    value: ManuallyDrop<V>,
    heap: &'a mut H,
    ids: SmallVec<[HeapId; 4]>,
    _tracker: PhantomData<T>,
}

impl<'a, T: ResourceTracker, H: ContainsHeap<T>, V: DropWithHeap<T> + Rooted> RootGuard<'a, T, H, V> {
    /// Roots `value` until the guard goes out of scope.
    pub fn new(value: V, heap: &'a mut H) -> Self {
        let mut ids = SmallVec::new();
        value.root_ids(&mut ids);
        let inner = heap.heap_mut();
        for &id in &ids {
            inner.push_root(id);
        }
        Self {
            value: ManuallyDrop::new(value),
            heap,
            ids,
            _tracker: PhantomData,
        }
    }

    /// Unroots the value and hands it back without dropping it.
    pub fn into_inner(self) -> V {
        let mut this = ManuallyDrop::new(self);
        this.pop_roots();
        // SAFETY: [DH] - `ManuallyDrop::new(self)` prevents `Drop` on self, so we can take the value out
        unsafe { ManuallyDrop::take(&mut this.value) }
    }

    /// Borrows the value (immutably) and heap (mutably) out of the guard.
    ///
    /// There is deliberately no mutable variant: changing the value in place could
    /// desynchronise it from the ids already on the root stack.
    #[inline]
    pub fn as_parts(&mut self) -> (&V, &mut H) {
        (&self.value, self.heap)
    }

    #[inline]
    pub fn heap(&mut self) -> &mut H {
        self.heap
    }

    fn pop_roots(&mut self) {
        let inner = self.heap.heap_mut();
        for &id in self.ids.iter().rev() {
            inner.pop_root(id);
        }
        self.ids.clear();
    }
}

impl<T: ResourceTracker, H: ContainsHeap<T>> RootGuard<'_, T, H, Vec<Value>> {
    /// Appends `item` to the guarded vector, rooting it first.
    pub fn push(&mut self, item: Value) {
        if let Some(id) = item.ref_id() {
            self.heap.heap_mut().push_root(id);
            self.ids.push(id);
        }
        self.value.push(item);
    }
}

impl<T: ResourceTracker, H: ContainsHeap<T>, V: DropWithHeap<T> + Rooted> Drop for RootGuard<'_, T, H, V> {
    fn drop(&mut self) {
        self.pop_roots();
        // SAFETY: [DH] - value is never manually dropped until this point
        unsafe { ManuallyDrop::take(&mut self.value) }.drop_with_heap(self.heap.heap_mut());
    }
}

/// The preferred way to ensure a [`DropWithHeap`] value is cleaned up on every code path.
///
/// Creates a [`HeapGuard`] and immediately rebinds `$value` as `&V` and `$heap` as
/// `&mut H` via [`HeapGuard::as_parts`].
///
/// # Limitation
///
/// The macro rebinds `$heap` as a new `let` binding, so it cannot be used when `$heap`
/// is `self`. In `&mut self` methods, first assign `let this = self;` and pass `this`.
#[macro_export]
macro_rules! defer_drop {
    ($value:ident, $heap:ident) => {
        let mut _guard = $crate::heap::HeapGuard::new($value, $heap);
        #[allow(
            clippy::allow_attributes,
            reason = "the reborrowed parts may not both be used in every case, so allow unused vars to avoid warnings"
        )]
        #[allow(unused_variables)]
        let ($value, $heap) = _guard.as_parts();
    };
}

/// Like [`defer_drop!`], but also registers `$value` as a scoped GC root via [`RootGuard`].
///
/// Use this for values held only by a Rust local across a call that may allocate.
#[macro_export]
macro_rules! defer_root {
    ($value:ident, $heap:ident) => {
        let mut _guard = $crate::heap::RootGuard::new($value, $heap);
        #[allow(
            clippy::allow_attributes,
            reason = "the reborrowed parts may not both be used in every case, so allow unused vars to avoid warnings"
        )]
        #[allow(unused_variables)]
        let ($value, $heap) = _guard.as_parts();
    };
}
