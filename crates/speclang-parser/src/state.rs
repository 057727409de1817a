//! Scope flags shared by the tokenizer and the parsers.

use std::ops::BitOr;

/// A set of scope flags.
///
/// The tokenizer uses the comment, table and tags flags to decide how
/// underlines, table lines and tag continuations are classified. The document and concept parsers use the
/// remaining flags to decide where each token attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct ParseState(u16);

impl ParseState {
    pub(crate) const INITIAL: Self = Self(1);
    pub(crate) const SPEC: Self = Self(1 << 1);
    pub(crate) const SCENARIO: Self = Self(1 << 2);
    pub(crate) const COMMENT: Self = Self(1 << 3);
    pub(crate) const TABLE: Self = Self(1 << 4);
    pub(crate) const TABLE_DATA: Self = Self(1 << 5);
    pub(crate) const STEP: Self = Self(1 << 6);
    pub(crate) const CONTEXT: Self = Self(1 << 7);
    pub(crate) const CONCEPT: Self = Self(1 << 8);
    pub(crate) const TEARDOWN: Self = Self(1 << 9);
    pub(crate) const TAGS: Self = Self(1 << 10);

    /// Returns `true` if every flag of `flags` is set.
    pub(crate) fn contains(self, flags: Self) -> bool {
        self.0 & flags.0 == flags.0
    }

    pub(crate) fn insert(&mut self, flags: Self) {
        self.0 |= flags.0;
    }

    /// Clears every flag not in `mask`.
    pub(crate) fn retain(&mut self, mask: Self) {
        self.0 &= mask.0;
    }

    pub(crate) fn clear(&mut self) {
        self.0 = 0;
    }
}

impl BitOr for ParseState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
