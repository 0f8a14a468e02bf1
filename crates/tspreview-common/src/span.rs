//! Byte-offset spans into source text.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into a source file.
///
/// Every AST node carries one. Previewables expose the span of their
/// declaration as their source position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteSpan {
    pub start: u32,
    pub end: u32,
}

impl ByteSpan {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-length span at `pos`.
    pub const fn at(pos: u32) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: ByteSpan) -> ByteSpan {
        ByteSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Shift the span by `offset` bytes.
    ///
    /// Used when a script block is parsed out of a larger file (`.vue`,
    /// `.svelte`) and its spans must point into the original text.
    pub fn shifted(self, offset: u32) -> ByteSpan {
        ByteSpan {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Slice `text` with this span, clamping to the text bounds.
    pub fn slice(self, text: &str) -> &str {
        let end = (self.end as usize).min(text.len());
        let start = (self.start as usize).min(end);
        text.get(start..end).unwrap_or("")
    }
}
