//! Host-facing runtime.
//!
//! [`Runtime`] owns the heap, the resource tracker and the tracer, and exposes the
//! iterator capability and the three adapters to the host through [`Handle`]s.

use crate::{
    args::{ArgValues, KwargsValues},
    builtins::Builtins,
    exception_private::{ExcType, RunError, RunResult},
    exception_public::Exception,
    function::{self, HostCallable, HostFunction},
    heap::{ContainsHeap, DropWithHeap, Heap, HeapData, HeapId, HeapStats},
    object::Object,
    resource::{LimitedTracker, NoLimitTracker, ResourceError, ResourceLimits, ResourceTracker},
    tracer::{IterTracer, NoopTracer},
    types::{
        HostIter, HostIterator, Type,
        enumerate::new_enumerate,
        iter::{get_iter, iter_next},
        map::new_map,
        repeat::new_repeat,
    },
    value::Value,
};

/// Initial number of heap slots reserved by a new runtime.
const INITIAL_HEAP_CAPACITY: usize = 64;

/// Host reference to a runtime value.
///
/// A handle pins its value: the value and everything reachable from it survive
/// every collection until the handle is passed to [`Runtime::release`]. Handles
/// are not `Clone`; use [`Runtime::duplicate`] for a second, independent pin.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "a handle keeps its value alive until passed to Runtime::release"]
pub struct Handle {
    slot: usize,
}

/// An embedded iterator runtime.
///
/// Generic over the resource tracker and the tracer, both chosen at construction
/// time. With the defaults (`NoLimitTracker`, `NoopTracer`) all resource checks and
/// trace hooks compile away apart from the recursion limit.
///
/// # Example
///
/// ```
/// use whorl::{Builtins, Object, Runtime};
///
/// let mut rt = Runtime::default();
/// let add = rt.builtin(Builtins::Add);
/// let left = rt.load(Object::from(vec![1_i64, 2])).unwrap();
/// let right = rt.load(Object::from(vec![10_i64, 20, 30])).unwrap();
/// let cycled = rt.repeat(&left).unwrap();
/// let sums = rt.map(&add, &[&cycled, &right]).unwrap();
/// let pairs = rt.enumerate(&sums, 0).unwrap();
///
/// assert_eq!(rt.next(&pairs).unwrap(), Some(Object::Tuple(vec![Object::Int(0), Object::Int(11)])));
/// assert_eq!(rt.next(&pairs).unwrap(), Some(Object::Tuple(vec![Object::Int(1), Object::Int(22)])));
/// assert_eq!(rt.next(&pairs).unwrap(), Some(Object::Tuple(vec![Object::Int(2), Object::Int(31)])));
/// assert_eq!(rt.next(&pairs).unwrap(), None);
/// ```
#[derive(Debug)]
pub struct Runtime<T: ResourceTracker = NoLimitTracker, Tr: IterTracer = NoopTracer> {
    pub(crate) heap: Heap<T>,
    tracer: Tr,
    /// Number of nested `next`/call levels currently in progress.
    depth: usize,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(NoLimitTracker, NoopTracer)
    }
}

impl Runtime<LimitedTracker, NoopTracer> {
    /// Creates a runtime enforcing `limits`.
    #[must_use]
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self::new(LimitedTracker::new(limits), NoopTracer)
    }
}

impl<T: ResourceTracker, Tr: IterTracer> ContainsHeap<T> for Runtime<T, Tr> {
    #[inline]
    fn heap_mut(&mut self) -> &mut Heap<T> {
        &mut self.heap
    }
}

impl<T: ResourceTracker, Tr: IterTracer> Runtime<T, Tr> {
    /// Creates a runtime with the given resource tracker and tracer.
    pub fn new(tracker: T, tracer: Tr) -> Self {
        Self {
            heap: Heap::new(INITIAL_HEAP_CAPACITY, tracker),
            tracer,
            depth: 0,
        }
    }

    /// Allocates `value` on the heap and pins it.
    ///
    /// # Errors
    /// `TypeError` for `Object::Repr`, `MemoryError` if a limit refuses the allocation.
    pub fn load(&mut self, value: Object) -> Result<Handle, Exception> {
        let result = value.to_value(self);
        self.finish(result).map(|value| self.pin(value))
    }

    /// Returns a handle to a builtin callable.
    pub fn builtin(&mut self, builtin: Builtins) -> Handle {
        self.pin(Value::Builtin(builtin))
    }

    /// Registers a host callable under `name`.
    ///
    /// # Errors
    /// `MemoryError` if a limit refuses the allocation.
    pub fn function(&mut self, name: &str, func: impl HostFunction + 'static) -> Result<Handle, Exception> {
        let data = HeapData::HostFunction(HostCallable::new(name, Box::new(func)));
        let result = self.allocate(data).map(Value::Ref);
        self.finish(result).map(|value| self.pin(value))
    }

    /// Registers a host iterator under `name`.
    ///
    /// # Errors
    /// `MemoryError` if a limit refuses the allocation.
    pub fn host_iter(&mut self, name: &str, iter: impl HostIterator + 'static) -> Result<Handle, Exception> {
        let data = HeapData::HostIter(HostIter::new(name, Box::new(iter)));
        let result = self.allocate(data).map(Value::Ref);
        self.finish(result).map(|value| self.pin(value))
    }

    /// The "get iterator" capability.
    ///
    /// For an iterator this returns a new handle to the same object.
    ///
    /// # Errors
    /// `TypeError` if the value is not iterable.
    pub fn get_iter(&mut self, iterable: &Handle) -> Result<Handle, Exception> {
        let value = self.value_of(iterable);
        let result = get_iter(self, value);
        self.finish(result).map(|value| self.pin(value))
    }

    /// The "next" capability: `Ok(None)` means the iterator is exhausted.
    ///
    /// # Errors
    /// `TypeError` if the value is not an iterator, otherwise whatever the iterator
    /// (or anything it wraps) raised, unchanged.
    pub fn next(&mut self, iterator: &Handle) -> Result<Option<Object>, Exception> {
        let result = self.next_value(iterator);
        self.finish(result)
            .map(|value| value.map(|value| Object::new(value, &mut self.heap)))
    }

    /// Like [`Runtime::next`], but pins the produced value instead of converting it.
    ///
    /// # Errors
    /// As for [`Runtime::next`].
    pub fn next_handle(&mut self, iterator: &Handle) -> Result<Option<Handle>, Exception> {
        let result = self.next_value(iterator);
        self.finish(result).map(|value| value.map(|value| self.pin(value)))
    }

    /// Wraps `iterable` in an iterator that starts over whenever it runs out.
    ///
    /// # Errors
    /// Whatever "get iterator" raises for `iterable`.
    pub fn repeat(&mut self, iterable: &Handle) -> Result<Handle, Exception> {
        let source = self.value_of(iterable);
        let result = new_repeat(self, source);
        self.finish(result).map(|value| self.pin(value))
    }

    /// Pairs every value of `iterable` with a running index starting at `start`.
    ///
    /// # Errors
    /// Whatever "get iterator" raises for `iterable`.
    pub fn enumerate(&mut self, iterable: &Handle, start: i64) -> Result<Handle, Exception> {
        let source = self.value_of(iterable);
        let result = new_enumerate(self, source, start);
        self.finish(result).map(|value| self.pin(value))
    }

    /// Calls `func` with one value from each of `iterables` until any of them runs out.
    ///
    /// # Errors
    /// `TypeError` when `iterables` is empty, otherwise whatever "get iterator" raises
    /// for the first iterable that is not iterable.
    pub fn map(&mut self, func: &Handle, iterables: &[&Handle]) -> Result<Handle, Exception> {
        if iterables.is_empty() {
            let result = Err(ExcType::type_error_at_least("map", 2, 1));
            return self.finish(result);
        }
        let func = self.value_of(func);
        let sources = iterables.iter().map(|h| self.value_of(h)).collect();
        let result = new_map(self, func, sources);
        self.finish(result).map(|value| self.pin(value))
    }

    /// Calls any callable, builtins included.
    ///
    /// # Errors
    /// `TypeError` if `func` is not callable or rejects the arguments, otherwise
    /// whatever the callable raised.
    pub fn call(&mut self, func: &Handle, args: &[&Handle], kwargs: &[(&str, &Handle)]) -> Result<Handle, Exception> {
        let result = self.call_values(func, args, kwargs);
        self.finish(result).map(|value| self.pin(value))
    }

    /// Snapshot of the value behind `handle`.
    #[must_use]
    pub fn get(&self, handle: &Handle) -> Object {
        Object::from_borrowed_value(self.heap.pinned(handle.slot), &self.heap)
    }

    /// User-visible type of the value behind `handle`.
    #[must_use]
    pub fn type_of(&self, handle: &Handle) -> Type {
        self.heap.pinned(handle.slot).py_type(&self.heap)
    }

    /// Pins the value behind `handle` a second time.
    pub fn duplicate(&mut self, handle: &Handle) -> Handle {
        let value = self.value_of(handle);
        self.pin(value)
    }

    /// Drops the pin held by `handle`.
    ///
    /// The value is freed as soon as nothing else references it.
    pub fn release(&mut self, handle: Handle) {
        if let Some(value) = self.heap.unpin(handle.slot) {
            value.drop_with_heap(&mut self.heap);
        }
    }

    /// Runs a full mark-sweep pass and returns the number of objects freed.
    pub fn collect_garbage(&mut self) -> usize {
        self.collect(Vec::new())
    }

    #[must_use]
    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }

    /// Depth of the scoped root stack; zero between public operations.
    #[must_use]
    pub fn root_depth(&self) -> usize {
        self.heap.root_depth()
    }

    #[must_use]
    pub fn tracker(&self) -> &T {
        self.heap.tracker()
    }

    #[must_use]
    pub fn tracer(&self) -> &Tr {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut Tr {
        &mut self.tracer
    }

    /// Consumes the runtime and returns the tracer, e.g. to inspect recorded events.
    pub fn into_tracer(self) -> Tr {
        self.tracer
    }

    /// Allocates `data`, collecting first when the GC interval has elapsed.
    ///
    /// The payload's own references are roots of any collection run here. When the
    /// tracker refuses the allocation for memory, one collection runs and the
    /// allocation is retried once. On failure the payload is released.
    pub(crate) fn allocate(&mut self, data: HeapData) -> RunResult<HeapId> {
        if self.heap.should_collect() {
            self.collect_protecting(&data);
        }
        match self.heap.reserve(&data) {
            Ok(()) => {}
            Err(ResourceError::Memory { .. }) => {
                self.collect_protecting(&data);
                if let Err(err) = self.heap.reserve(&data) {
                    self.heap.release(data);
                    return Err(err.into());
                }
            }
            Err(err) => {
                self.heap.release(data);
                return Err(err.into());
            }
        }
        Ok(self.heap.insert(data))
    }

    /// Runs `f` one call level deeper, raising `RecursionError` past the configured limit.
    pub(crate) fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> RunResult<R>) -> RunResult<R> {
        self.heap.tracker().check_recursion_depth(self.depth)?;
        self.heap.tracker_mut().check_time()?;
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    #[inline]
    pub(crate) fn trace(&mut self) -> &mut Tr {
        &mut self.tracer
    }

    fn collect_protecting(&mut self, data: &HeapData) -> usize {
        let mut protected = Vec::new();
        data.collect_ref_ids(&mut protected);
        self.collect(protected)
    }

    fn collect(&mut self, extra: Vec<HeapId>) -> usize {
        let roots = self.heap.gc_roots(extra);
        let freed = self.heap.collect_garbage(roots);
        let live = self.heap.live_objects();
        self.tracer.on_collect(freed, live);
        freed
    }

    fn pin(&mut self, value: Value) -> Handle {
        Handle {
            slot: self.heap.pin(value),
        }
    }

    /// Returns a new reference to the pinned value.
    fn value_of(&self, handle: &Handle) -> Value {
        self.heap.pinned(handle.slot).clone_with_heap(&self.heap)
    }

    fn next_value(&mut self, iterator: &Handle) -> RunResult<Option<Value>> {
        let iterator = self.value_of(iterator);
        let result = iter_next(self, &iterator);
        iterator.drop_with_heap(&mut self.heap);
        result
    }

    fn call_values(&mut self, func: &Handle, args: &[&Handle], kwargs: &[(&str, &Handle)]) -> RunResult<Value> {
        let args: Vec<Value> = args.iter().map(|h| self.value_of(h)).collect();
        let mut kwarg_values = KwargsValues::Empty;
        for (key, handle) in kwargs {
            let value = self.value_of(handle);
            if let Err(value) = kwarg_values.insert((*key).to_owned(), value) {
                value.drop_with_heap(&mut self.heap);
                args.drop_with_heap(&mut self.heap);
                kwarg_values.drop_with_heap(&mut self.heap);
                return Err(ExcType::type_error(format!("keyword argument repeated: {key}")));
            }
        }
        let func = self.value_of(func);
        let result = function::call_value(self, &func, ArgValues::with_kwargs(args, kwarg_values));
        func.drop_with_heap(&mut self.heap);
        result
    }

    /// Converts an internal result at the public boundary, reporting errors to the tracer.
    fn finish<R>(&mut self, result: RunResult<R>) -> Result<R, Exception> {
        debug_assert_eq!(self.heap.root_depth(), 0, "root stack not empty after a public operation");
        result.map_err(|err: RunError| {
            self.tracer.on_error(err.exc_type());
            err.into_exception()
        })
    }
}
