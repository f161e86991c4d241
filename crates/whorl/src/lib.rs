#![doc = include_str!("../../../README.md")]
// first to include defer_drop macro
mod heap;

mod args;
mod builtins;
mod exception_private;
mod exception_public;
mod function;
mod object;
mod resource;
mod runtime;
pub mod tracer;
mod types;
mod value;

pub use crate::{
    builtins::Builtins,
    exception_private::ExcType,
    exception_public::Exception,
    function::HostFunction,
    heap::HeapStats,
    object::Object,
    resource::{
        DEFAULT_GC_INTERVAL, DEFAULT_MAX_RECURSION_DEPTH, LimitedTracker, NoLimitTracker, ResourceError,
        ResourceLimits, ResourceTracker,
    },
    runtime::{Handle, Runtime},
    tracer::{IterTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
    types::{HostIterator, Type},
};
