//! Builtin functions.
//!
//! Each builtin with more than a few lines of logic has its own submodule. Builtins are
//! plain `Copy` values, so a handle to one never touches the heap.

mod arith;
mod enumerate;
mod list;
mod map;
mod next;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    args::ArgValues,
    exception_private::RunResult,
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::{
        allocate_tuple,
        iter::get_iter,
        repeat::new_repeat,
    },
    value::Value,
};

/// Enumerates every builtin function.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>`
/// implementations. All variants serialize to lowercase (e.g., `Enumerate` -> "enumerate").
#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    EnumString,
    IntoStaticStr,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum Builtins {
    /// `iter(iterable)`: the iterator over `iterable`.
    Iter,
    /// `next(iterator[, default])`: the next item, `default`, or `StopIteration`.
    Next,
    /// `repeat(iterable)`: cycle through `iterable` forever.
    Repeat,
    /// `enumerate(iterable, start=0)`: `(index, item)` pairs.
    Enumerate,
    /// `map(func, *iterables)`: `func` applied across the iterables in lockstep.
    Map,
    /// `list(iterable)`: drains `iterable` into a new list.
    List,
    /// `pack(*args)`: its arguments as a tuple.
    Pack,
    /// `add(a, b)`: integer sum or str concatenation.
    Add,
    /// `mul(a, b)`: integer product or str repetition.
    Mul,
}

impl Builtins {
    /// Calls this builtin with the given arguments.
    ///
    /// Arguments are consumed: every path, including errors, releases them.
    pub(crate) fn call(self, rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
        match self {
            Self::Iter => builtin_iter(rt, args),
            Self::Next => next::builtin_next(rt, args),
            Self::Repeat => builtin_repeat(rt, args),
            Self::Enumerate => enumerate::builtin_enumerate(rt, args),
            Self::Map => map::builtin_map(rt, args),
            Self::List => list::builtin_list(rt, args),
            Self::Pack => builtin_pack(rt, args),
            Self::Add => arith::builtin_add(rt, args),
            Self::Mul => arith::builtin_mul(rt, args),
        }
    }
}

fn builtin_iter(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
    let iterable = args.get_one_arg("iter", &mut rt.heap)?;
    get_iter(rt, iterable)
}

fn builtin_repeat(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
    let iterable = args.get_one_arg("repeat", &mut rt.heap)?;
    new_repeat(rt, iterable)
}

fn builtin_pack(rt: &mut Runtime<impl ResourceTracker, impl IterTracer>, args: ArgValues) -> RunResult<Value> {
    let items = args.into_positional("pack", &mut rt.heap)?;
    allocate_tuple(rt, items)
}
