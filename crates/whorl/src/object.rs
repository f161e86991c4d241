use std::fmt::{self, Write};

use crate::{
    exception_private::{ExcType, RunResult},
    heap::{Heap, HeapData, RootGuard},
    resource::ResourceTracker,
    runtime::Runtime,
    tracer::IterTracer,
    types::{List, Str, Tuple},
    value::Value,
};

/// A value that can be passed to or returned from the runtime.
///
/// This is the public-facing type for runtime values. It owns all its data and can be
/// freely cloned, serialized, or stored. Unlike the internal `Value` type, `Object`
/// does not require a heap for operations.
///
/// # Input vs Output Variants
///
/// All variants can be used as outputs. `Repr` is output-only: it stands for values
/// that have no direct `Object` mapping (iterators, callables) and carries their
/// `repr` text. Passing a `Repr` back into the runtime raises `TypeError`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Object {
    #[serde(alias = "none", alias = "NoneType")]
    None,
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<Object>),
    Tuple(Vec<Object>),
    /// Output-only rendering of a value with no host equivalent, e.g. `<map object>`.
    Repr(String),
}

impl Object {
    /// Converts a runtime value into an `Object`, releasing the value.
    pub(crate) fn new(value: Value, heap: &mut Heap<impl ResourceTracker>) -> Self {
        let object = Self::from_borrowed_value(&value, heap);
        value.drop_with_heap(heap);
        object
    }

    /// Converts a runtime value into an `Object` without taking ownership.
    pub(crate) fn from_borrowed_value(value: &Value, heap: &Heap<impl ResourceTracker>) -> Self {
        match value {
            Value::None => Self::None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Int(*i),
            Value::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => Self::String(s.as_str().to_owned()),
                HeapData::List(list) => Self::List(
                    list.as_slice()
                        .iter()
                        .map(|v| Self::from_borrowed_value(v, heap))
                        .collect(),
                ),
                HeapData::Tuple(tuple) => Self::Tuple(
                    tuple
                        .as_slice()
                        .iter()
                        .map(|v| Self::from_borrowed_value(v, heap))
                        .collect(),
                ),
                _ => Self::Repr(value.py_repr(heap)),
            },
            other => Self::Repr(other.py_repr(heap)),
        }
    }

    /// Allocates this object on the runtime heap.
    ///
    /// Container items converted so far are rooted while later items allocate, and
    /// released if a later conversion fails.
    pub(crate) fn to_value(self, rt: &mut Runtime<impl ResourceTracker, impl IterTracer>) -> RunResult<Value> {
        match self {
            Self::None => Ok(Value::None),
            Self::Bool(b) => Ok(Value::Bool(b)),
            Self::Int(i) => Ok(Value::Int(i)),
            Self::String(s) => Ok(Value::Ref(rt.allocate(HeapData::Str(Str::new(s)))?)),
            Self::List(items) => {
                let values = Self::items_to_values(items, rt)?;
                Ok(Value::Ref(rt.allocate(HeapData::List(List::new(values)))?))
            }
            Self::Tuple(items) => {
                let values = Self::items_to_values(items, rt)?;
                Ok(Value::Ref(rt.allocate(HeapData::Tuple(Tuple::new(values)))?))
            }
            Self::Repr(repr) => Err(ExcType::type_error(format!(
                "cannot convert output-only repr {repr} into a runtime value"
            ))),
        }
    }

    fn items_to_values(
        items: Vec<Self>,
        rt: &mut Runtime<impl ResourceTracker, impl IterTracer>,
    ) -> RunResult<Vec<Value>> {
        let mut values = RootGuard::new(Vec::with_capacity(items.len()), rt);
        for item in items {
            let value = item.to_value(values.heap())?;
            values.push(value);
        }
        Ok(values.into_inner())
    }

    /// Returns the `repr` string of the object.
    #[must_use]
    pub fn py_repr(&self) -> String {
        let mut out = String::new();
        self.repr_fmt(&mut out);
        out
    }

    fn repr_fmt(&self, out: &mut String) {
        match self {
            Self::None => out.push_str("None"),
            Self::Bool(true) => out.push_str("True"),
            Self::Bool(false) => out.push_str("False"),
            Self::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Self::String(s) => {
                let _ = write!(out, "{s:?}");
            }
            Self::List(items) => {
                out.push('[');
                Self::items_fmt(items, out);
                out.push(']');
            }
            Self::Tuple(items) => {
                out.push('(');
                Self::items_fmt(items, out);
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Self::Repr(repr) => out.push_str(repr),
        }
    }

    fn items_fmt(items: &[Self], out: &mut String) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            item.repr_fmt(out);
        }
    }

    /// Returns the type name of the object.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "str",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Repr(_) => "repr",
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => f.write_str(&other.py_repr()),
        }
    }
}

impl From<i64> for Object {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Object {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Object {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
