use std::mem::size_of;

use crate::{
    heap::HeapId,
    types::{HeapItem, Type},
};

/// Heap-allocated immutable string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Str(String);

impl Str {
    #[must_use]
    pub fn new(s: String) -> Self {
        Self(s)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the character starting at byte offset `pos` and the offset just past it.
    #[must_use]
    pub fn char_at(&self, pos: usize) -> Option<(char, usize)> {
        let c = self.0.get(pos..)?.chars().next()?;
        Some((c, pos + c.len_utf8()))
    }
}

impl From<&str> for Str {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Str {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl HeapItem for Str {
    fn py_type(&self) -> Type {
        Type::Str
    }

    fn estimate_size(&self) -> usize {
        size_of::<Self>() + self.0.len()
    }

    fn collect_ref_ids(&self, _out: &mut Vec<HeapId>) {}

    fn dec_ref_ids(&mut self, _out: &mut Vec<HeapId>) {}
}
