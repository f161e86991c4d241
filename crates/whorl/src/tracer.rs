//! Iterator tracing infrastructure.
//!
//! Provides a trait-based tracing system for the iterator runtime with zero-cost
//! abstraction. When using [`NoopTracer`], all trace methods compile away entirely via
//! monomorphization, the same way [`NoLimitTracker`](crate::NoLimitTracker) eliminates
//! resource checking overhead.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost no-op (default) |
//! | [`StderrTracer`] | Human-readable event log to stderr |
//! | [`RecordingTracer`] | Full event recording for assertions or post-mortem |
//!
//! # Usage
//!
//! The runtime is parameterized as `Runtime<T: ResourceTracker, Tr: IterTracer>`.
//! Callers choose the tracer at construction time:
//!
//! ```
//! use whorl::{NoLimitTracker, RecordingTracer, Runtime};
//!
//! let mut rt = Runtime::new(NoLimitTracker, RecordingTracer::new());
//! let items = rt.load(whorl::Object::List(vec![whorl::Object::Int(1)])).unwrap();
//! let it = rt.enumerate(&items, 0).unwrap();
//! assert!(rt.next(&it).unwrap().is_some());
//! assert!(!rt.tracer().events().is_empty());
//! ```

use crate::{ExcType, types::Type};

/// Trace event emitted by the iterator runtime.
///
/// Used by [`RecordingTracer`] to capture the sequence of adapter events.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TraceEvent {
    /// An adapter finished construction.
    Construct {
        /// Adapter type (`repeat`, `enumerate` or `map`).
        kind: Type,
        /// Number of wrapped iterators.
        arity: usize,
    },
    /// A repeat iterator re-acquired a fresh iterator from its source.
    Rederive {
        kind: Type,
    },
    /// An iterator reported exhaustion.
    Exhausted {
        kind: Type,
    },
    /// A map iterator invoked its function.
    Invoke {
        /// Number of positional arguments passed.
        arity: usize,
    },
    /// A mark-sweep pass ran.
    Collect {
        freed: usize,
        live: usize,
    },
    /// A public operation failed.
    Error {
        exc_type: ExcType,
    },
}

/// Trait for iterator runtime tracing.
///
/// All methods have default no-op implementations, so [`NoopTracer`] requires
/// zero lines of code and compiles to zero instructions. Implementations only
/// override the hooks they care about.
pub trait IterTracer: std::fmt::Debug {
    /// Called after an adapter object has been allocated and fully initialized.
    #[inline(always)]
    fn on_construct(&mut self, _kind: Type, _arity: usize) {}

    /// Called when a repeat iterator replaces its exhausted iterator with a fresh one.
    #[inline(always)]
    fn on_rederive(&mut self, _kind: Type) {}

    /// Called whenever `next` on an iterator of type `kind` returns exhaustion.
    #[inline(always)]
    fn on_exhausted(&mut self, _kind: Type) {}

    /// Called just before a map iterator calls its function.
    #[inline(always)]
    fn on_invoke(&mut self, _arity: usize) {}

    /// Called after each mark-sweep pass.
    #[inline(always)]
    fn on_collect(&mut self, _freed: usize, _live: usize) {}

    /// Called when a public runtime operation returns an error.
    #[inline(always)]
    fn on_error(&mut self, _exc_type: ExcType) {}
}

/// Zero-cost tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl IterTracer for NoopTracer {}

/// Tracer that prints one human-readable line per event to stderr.
///
/// Example output:
/// ```text
/// +++ CONSTRUCT map            arity=2
/// ~~~ REDERIVE  repeat
/// --- EXHAUSTED list_iterator
/// ### COLLECT   freed=3 live=12
/// ```
#[derive(Debug)]
pub struct StderrTracer {
    /// Maximum number of events to print before stopping. None = unlimited.
    limit: Option<usize>,
    count: usize,
    stopped: bool,
}

impl StderrTracer {
    /// Creates a new stderr tracer with no event limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limit: None,
            count: 0,
            stopped: false,
        }
    }

    /// Creates a new stderr tracer that stops after `limit` events.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            count: 0,
            stopped: false,
        }
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if self.stopped {
            return;
        }
        eprintln!("{line}");
        self.count += 1;
        if let Some(limit) = self.limit
            && self.count >= limit
        {
            eprintln!("--- trace limit reached ({limit} events) ---");
            self.stopped = true;
        }
    }
}

impl Default for StderrTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl IterTracer for StderrTracer {
    fn on_construct(&mut self, kind: Type, arity: usize) {
        self.emit(format_args!("+++ CONSTRUCT {:<16} arity={arity}", kind.to_string()));
    }

    fn on_rederive(&mut self, kind: Type) {
        self.emit(format_args!("~~~ REDERIVE  {kind}"));
    }

    fn on_exhausted(&mut self, kind: Type) {
        self.emit(format_args!("--- EXHAUSTED {kind}"));
    }

    fn on_invoke(&mut self, arity: usize) {
        self.emit(format_args!(">>> INVOKE    arity={arity}"));
    }

    fn on_collect(&mut self, freed: usize, live: usize) {
        self.emit(format_args!("### COLLECT   freed={freed} live={live}"));
    }

    fn on_error(&mut self, exc_type: ExcType) {
        self.emit(format_args!("!!! ERROR     {exc_type}"));
    }
}

/// Tracer that records all events.
///
/// Allocates per event, so use it for tests and short debugging sessions.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    /// All recorded events in chronological order.
    events: Vec<TraceEvent>,
    /// Optional limit on number of events recorded.
    limit: Option<usize>,
}

impl RecordingTracer {
    /// Creates a new recording tracer with no event limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            limit: None,
        }
    }

    /// Creates a new recording tracer that stops recording after `limit` events.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Vec::with_capacity(limit.min(1024)),
            limit: Some(limit),
        }
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Consumes the tracer and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    /// Discards all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn record(&mut self, event: TraceEvent) {
        if self.limit.is_some_and(|l| self.events.len() >= l) {
            return;
        }
        self.events.push(event);
    }
}

impl IterTracer for RecordingTracer {
    fn on_construct(&mut self, kind: Type, arity: usize) {
        self.record(TraceEvent::Construct { kind, arity });
    }

    fn on_rederive(&mut self, kind: Type) {
        self.record(TraceEvent::Rederive { kind });
    }

    fn on_exhausted(&mut self, kind: Type) {
        self.record(TraceEvent::Exhausted { kind });
    }

    fn on_invoke(&mut self, arity: usize) {
        self.record(TraceEvent::Invoke { arity });
    }

    fn on_collect(&mut self, freed: usize, live: usize) {
        self.record(TraceEvent::Collect { freed, live });
    }

    fn on_error(&mut self, exc_type: ExcType) {
        self.record(TraceEvent::Error { exc_type });
    }
}
