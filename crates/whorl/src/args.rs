use indexmap::IndexMap;

use crate::{
    exception_private::{ExcType, RunResult},
    heap::{DropWithHeap, Heap},
    resource::ResourceTracker,
    value::Value,
};

/// Type for call arguments.
///
/// Uses specific variants for common cases (0-2 arguments).
/// Most calls made by the adapters have at most 2 arguments, so this
/// eliminates the Vec heap allocation overhead for the vast majority of calls.
#[derive(Debug)]
pub(crate) enum ArgValues {
    Empty,
    One(Value),
    Two(Value, Value),
    Kwargs(KwargsValues),
    ArgsKargs { args: Vec<Value>, kwargs: KwargsValues },
}

impl ArgValues {
    /// Builds an argument bundle from positional values, picking the compact variant.
    pub fn from_vec(mut args: Vec<Value>) -> Self {
        match args.len() {
            0 => Self::Empty,
            1 => Self::One(args.remove(0)),
            2 => {
                let second = args.remove(1);
                Self::Two(args.remove(0), second)
            }
            _ => Self::ArgsKargs {
                args,
                kwargs: KwargsValues::Empty,
            },
        }
    }

    /// Builds an argument bundle from positional and keyword values.
    pub fn with_kwargs(args: Vec<Value>, kwargs: KwargsValues) -> Self {
        if kwargs.is_empty() {
            Self::from_vec(args)
        } else if args.is_empty() {
            Self::Kwargs(kwargs)
        } else {
            Self::ArgsKargs { args, kwargs }
        }
    }

    /// Checks that exactly one positional argument was passed, returning it.
    ///
    /// On error, properly drops all contained values to maintain reference counts.
    pub fn get_one_arg(self, name: &str, heap: &mut Heap<impl ResourceTracker>) -> RunResult<Value> {
        match self {
            Self::One(a) => Ok(a),
            other => {
                let count = other.count();
                other.drop_with_heap(heap);
                Err(ExcType::type_error_arg_count(name, 1, count))
            }
        }
    }

    /// Checks that exactly two positional arguments were passed, returning them as a tuple.
    ///
    /// On error, properly drops all contained values to maintain reference counts.
    pub fn get_two_args(self, name: &str, heap: &mut Heap<impl ResourceTracker>) -> RunResult<(Value, Value)> {
        match self {
            Self::Two(a1, a2) => Ok((a1, a2)),
            other => {
                let count = other.count();
                other.drop_with_heap(heap);
                Err(ExcType::type_error_arg_count(name, 2, count))
            }
        }
    }

    /// Checks that one or two arguments were passed, returning them as a tuple.
    ///
    /// On error, properly drops all contained values to maintain reference counts.
    pub fn get_one_two_args(
        self,
        name: &str,
        heap: &mut Heap<impl ResourceTracker>,
    ) -> RunResult<(Value, Option<Value>)> {
        match self {
            Self::One(a) => Ok((a, None)),
            Self::Two(a1, a2) => Ok((a1, Some(a2))),
            other => {
                let count = other.count();
                let has_kwargs = other.has_kwargs();
                other.drop_with_heap(heap);
                if has_kwargs {
                    Err(ExcType::type_error_no_kwargs(name))
                } else if count == 0 {
                    Err(ExcType::type_error_at_least(name, 1, count))
                } else {
                    Err(ExcType::type_error_at_most(name, 2, count))
                }
            }
        }
    }

    /// Parses a `(first, second=default)` signature where both parameters may be
    /// passed positionally or by keyword.
    ///
    /// This supports `enumerate(iterable, start=0)`, including the all-keyword form
    /// `enumerate(iterable=x, start=1)`. The first parameter is required.
    ///
    /// On error, properly drops all contained values to maintain reference counts.
    pub fn get_one_two_args_with_keywords(
        self,
        name: &str,
        keywords: [&str; 2],
        heap: &mut Heap<impl ResourceTracker>,
    ) -> RunResult<(Value, Option<Value>)> {
        let (args, kwargs) = match self {
            Self::One(a) => return Ok((a, None)),
            Self::Two(a1, a2) => return Ok((a1, Some(a2))),
            Self::Empty => return Err(ExcType::type_error_at_least(name, 1, 0)),
            Self::Kwargs(kwargs) => (Vec::new(), kwargs),
            Self::ArgsKargs { args, kwargs } => (args, kwargs),
        };

        if args.len() > 2 {
            let count = args.len();
            args.drop_with_heap(heap);
            kwargs.drop_with_heap(heap);
            return Err(ExcType::type_error_at_most(name, 2, count));
        }

        let mut slots: [Option<Value>; 2] = [None, None];
        for (slot, value) in slots.iter_mut().zip(args) {
            *slot = Some(value);
        }

        let mut kwargs = kwargs.into_iter();
        while let Some((key, value)) = kwargs.next() {
            let Some(index) = keywords.iter().position(|k| *k == key) else {
                value.drop_with_heap(heap);
                kwargs.drop_with_heap(heap);
                slots.drop_with_heap(heap);
                return Err(ExcType::type_error_unexpected_keyword(name, &key));
            };
            if slots[index].is_some() {
                value.drop_with_heap(heap);
                kwargs.drop_with_heap(heap);
                slots.drop_with_heap(heap);
                return Err(ExcType::type_error_multiple_values(name, keywords[index]));
            }
            slots[index] = Some(value);
        }

        let [first, second] = slots;
        match first {
            Some(first) => Ok((first, second)),
            None => {
                second.drop_with_heap(heap);
                Err(ExcType::type_error(format!(
                    "{name}() missing required argument '{}' (pos 1)",
                    keywords[0]
                )))
            }
        }
    }

    /// Returns all positional arguments, rejecting keyword arguments.
    ///
    /// On error, properly drops all contained values to maintain reference counts.
    pub fn into_positional(self, name: &str, heap: &mut Heap<impl ResourceTracker>) -> RunResult<Vec<Value>> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::One(a) => Ok(vec![a]),
            Self::Two(a1, a2) => Ok(vec![a1, a2]),
            Self::ArgsKargs {
                args,
                kwargs: KwargsValues::Empty,
            } => Ok(args),
            other => {
                other.drop_with_heap(heap);
                Err(ExcType::type_error_no_kwargs(name))
            }
        }
    }

    /// Returns the number of positional arguments.
    ///
    /// For `Kwargs` returns 0, for `ArgsKargs` returns only the positional args count.
    pub fn count(&self) -> usize {
        match self {
            Self::Empty | Self::Kwargs(_) => 0,
            Self::One(_) => 1,
            Self::Two(_, _) => 2,
            Self::ArgsKargs { args, .. } => args.len(),
        }
    }

    fn has_kwargs(&self) -> bool {
        match self {
            Self::Kwargs(kwargs) | Self::ArgsKargs { kwargs, .. } => !kwargs.is_empty(),
            _ => false,
        }
    }
}

impl<T: ResourceTracker> DropWithHeap<T> for ArgValues {
    fn drop_with_heap(self, heap: &mut Heap<T>) {
        match self {
            Self::Empty => {}
            Self::One(v) => v.drop_with_heap(heap),
            Self::Two(v1, v2) => {
                v1.drop_with_heap(heap);
                v2.drop_with_heap(heap);
            }
            Self::Kwargs(kwargs) => {
                kwargs.drop_with_heap(heap);
            }
            Self::ArgsKargs { args, kwargs } => {
                args.drop_with_heap(heap);
                kwargs.drop_with_heap(heap);
            }
        }
    }
}

impl<T: ResourceTracker, const N: usize> DropWithHeap<T> for [Option<Value>; N] {
    fn drop_with_heap(self, heap: &mut Heap<T>) {
        for value in self {
            value.drop_with_heap(heap);
        }
    }
}

/// Keyword arguments in call order.
///
/// Keys are unique; a repeated keyword is rejected when the bundle is built.
#[derive(Debug, Default)]
pub(crate) enum KwargsValues {
    #[default]
    Empty,
    Inline(IndexMap<String, Value>),
}

impl KwargsValues {
    /// Returns the number of keyword arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Inline(kvs) => kvs.len(),
        }
    }

    /// Returns true if there are no keyword arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds a keyword argument.
    ///
    /// Returns the value back if `key` was already present.
    pub fn insert(&mut self, key: String, value: Value) -> Result<(), Value> {
        match self {
            Self::Empty => {
                *self = Self::Inline(IndexMap::from([(key, value)]));
                Ok(())
            }
            Self::Inline(map) => {
                if map.contains_key(&key) {
                    return Err(value);
                }
                map.insert(key, value);
                Ok(())
            }
        }
    }
}

impl<T: ResourceTracker> DropWithHeap<T> for KwargsValues {
    fn drop_with_heap(self, heap: &mut Heap<T>) {
        self.into_iter().drop_with_heap(heap);
    }
}

impl IntoIterator for KwargsValues {
    type Item = (String, Value);
    type IntoIter = KwargsValuesIter;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Self::Empty => KwargsValuesIter::Empty,
            Self::Inline(kvs) => KwargsValuesIter::Inline(kvs.into_iter()),
        }
    }
}

/// Iterator over keyword argument (key, value) pairs.
pub(crate) enum KwargsValuesIter {
    Empty,
    Inline(indexmap::map::IntoIter<String, Value>),
}

impl Iterator for KwargsValuesIter {
    type Item = (String, Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Empty => None,
            Self::Inline(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Empty => (0, Some(0)),
            Self::Inline(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for KwargsValuesIter {}

impl<T: ResourceTracker> DropWithHeap<T> for KwargsValuesIter {
    fn drop_with_heap(self, heap: &mut Heap<T>) {
        for (_, value) in self {
            value.drop_with_heap(heap);
        }
    }
}
