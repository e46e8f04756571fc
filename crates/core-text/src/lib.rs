//! Rope-backed flat text buffer used by plain text controls.
//!
//! All offsets are expressed in chars (Unicode scalar values), which is the
//! unit text controls report selection offsets in. Callers never deal with
//! byte indices; the rope translates internally.

use ropey::Rope;

pub mod breaks;

pub use breaks::{flatten_line_breaks, normalize_line_breaks};

/// A flat text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
}

impl Default for Buffer {
    fn default() -> Self {
        Self { rope: Rope::new() }
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Content is user text; only the size is reported.
        f.debug_struct("Buffer")
            .field("len_chars", &self.len_chars())
            .finish()
    }
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_text(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
        }
    }

    /// Total number of chars in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Return the chars in `[start, end)` (clamped to the buffer) as an owned `String`.
    pub fn slice_chars(&self, start: usize, end: usize) -> String {
        let total = self.rope.len_chars();
        let s = start.min(total);
        let e = end.min(total);
        if s >= e {
            return String::new();
        }
        self.rope.slice(s..e).to_string()
    }

    /// Replace the chars in `[start, end)` with `text`. Both ends are clamped to the
    /// buffer and swapped if reversed. Returns the char offset right after the
    /// inserted text.
    pub fn splice(&mut self, start: usize, end: usize, text: &str) -> usize {
        let total = self.rope.len_chars();
        let mut s = start.min(total);
        let mut e = end.min(total);
        if s > e {
            std::mem::swap(&mut s, &mut e);
        }
        if s < e {
            self.rope.remove(s..e);
        }
        self.rope.insert(s, text);
        s + text.chars().count()
    }

    /// Number of lines (a trailing line without newline counts as one).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Whole buffer contents.
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }
}

/// Byte index of the `char_idx`-th char in `s` (or `s.len()` when past the end).
pub fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
