//! Source location model.
//!
//! A `Span` is a half-open byte range `[start_byte, end_byte)` into the unit's
//! original source text. Every AST node carries one; the generator uses them as
//! replace ranges.

use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start byte (0-based).
    pub start_byte: usize,
    /// Exclusive end byte (0-based).
    pub end_byte: usize,
}

impl Span {
    pub fn new(start_byte: usize, end_byte: usize) -> Self {
        Self {
            start_byte,
            end_byte,
        }
    }

    /// Bytes spanned.
    pub fn byte_len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    pub fn range(&self) -> Range<usize> {
        self.start_byte..self.end_byte
    }

    /// True if `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Merge two spans (assuming they belong to the same unit).
    pub fn merge(a: &Span, b: &Span) -> Span {
        Span {
            start_byte: a.start_byte.min(b.start_byte),
            end_byte: a.end_byte.max(b.end_byte),
        }
    }

    /// Extract the spanned text from `text` with *safe* bounds.
    pub fn slice_text<'a>(&self, text: &'a str) -> &'a str {
        let len = text.len();
        let start = self.start_byte.min(len);
        let end = self.end_byte.min(len).max(start);
        text.get(start..end).unwrap_or("")
    }

    /// Render as `[start, end]`, the format used by AST dumps.
    pub fn range_string(&self) -> String {
        format!("[{}, {}]", self.start_byte, self.end_byte)
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Span::new(r.start, r.end)
    }
}
