use strum::{Display, IntoStaticStr};

/// User-visible type of a runtime value.
///
/// The `Display` form is the name used in error messages, e.g.
/// `'int' object is not iterable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Type {
    #[strum(serialize = "NoneType")]
    NoneType,
    Bool,
    Int,
    Str,
    List,
    Tuple,
    #[strum(serialize = "list_iterator")]
    ListIterator,
    #[strum(serialize = "tuple_iterator")]
    TupleIterator,
    #[strum(serialize = "str_iterator")]
    StrIterator,
    Repeat,
    Enumerate,
    Map,
    /// An iterator supplied by the host through [`crate::HostIterator`].
    #[strum(serialize = "iterator")]
    HostIterator,
    #[strum(serialize = "builtin_function_or_method")]
    BuiltinFunction,
    /// A callable supplied by the host through [`crate::HostFunction`].
    Function,
    #[strum(serialize = "arg_buffer")]
    ArgBuffer,
}

impl Type {
    /// True for the types whose "get iterator" returns the object itself.
    #[must_use]
    pub fn is_iterator(self) -> bool {
        matches!(
            self,
            Self::ListIterator
                | Self::TupleIterator
                | Self::StrIterator
                | Self::Repeat
                | Self::Enumerate
                | Self::Map
                | Self::HostIterator
        )
    }
}
