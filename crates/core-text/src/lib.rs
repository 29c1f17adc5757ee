//! Rope-based text document abstraction.
//!
//! The engine only talks to text through the [`TextDocument`] trait so a host
//! can plug its own storage in. [`Buffer`] is the default implementation backed
//! by a `ropey::Rope`.
//!
//! Line model: every line owns its terminating `'\n'`, so a document always
//! ends with a newline and always contains at least one (possibly empty)
//! line. Columns are character indices within a line; column `line_len(n)`
//! addresses the newline itself, which is where an exclusive motion lands when
//! it stops at end of line.

use ropey::Rope;
use std::borrow::Cow;

pub mod chars;
pub mod motion;

/// A position inside a document expressed as (line index, char column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
    pub fn origin() -> Self {
        Self { line: 0, col: 0 }
    }
    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            self.line = 0;
            self.col = 0;
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.col > max_len {
            self.col = max_len;
        }
    }
}

/// Storage contract the modal engine edits through.
///
/// Offsets are absolute char indices. Implementations must keep the
/// "ends with newline, at least one line" invariant across every mutation and
/// must tolerate re-reads in the middle of a multi-step edit.
pub trait TextDocument {
    /// Number of lines (always >= 1).
    fn line_count(&self) -> usize;
    /// Line content without its newline.
    fn line(&self, idx: usize) -> Option<String>;
    /// Char length of a line excluding the newline (0 when out of range).
    fn line_len(&self, idx: usize) -> usize;
    /// Absolute char offset of the first char of `idx`.
    fn line_start(&self, idx: usize) -> usize;
    /// Total chars including every newline.
    fn len_chars(&self) -> usize;
    fn position_of(&self, offset: usize) -> Position;
    fn char_at(&self, offset: usize) -> Option<char>;
    fn slice(&self, start: usize, end: usize) -> String;
    fn insert(&mut self, offset: usize, text: &str);
    /// Remove `[start, end)` and return the removed text.
    fn remove(&mut self, start: usize, end: usize) -> String;
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);

    fn replace(&mut self, start: usize, end: usize, text: &str) -> String {
        let removed = self.remove(start, end);
        self.insert(start, text);
        removed
    }

    fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    fn offset_of(&self, pos: Position) -> usize {
        let line = pos.line.min(self.last_line());
        self.line_start(line) + pos.col.min(self.line_len(line))
    }

    /// Char under `pos`; the newline at end of line reads as `'\n'`.
    fn char_at_pos(&self, pos: Position) -> Option<char> {
        if pos.line >= self.line_count() || pos.col > self.line_len(pos.line) {
            return None;
        }
        self.char_at(self.offset_of(pos))
    }

    fn is_line_empty(&self, idx: usize) -> bool {
        self.line_len(idx) == 0
    }
}

fn normalize_line_ends(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice. `\r\n` line ends
    /// are read as `\n` and a missing final newline is supplied.
    pub fn from_str(name: impl Into<String>, content: &str) -> Self {
        let mut buffer = Self {
            rope: Rope::from_str(&normalize_line_ends(content)),
            name: name.into(),
        };
        buffer.restore_final_newline();
        buffer
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::from_str(name, "")
    }

    fn restore_final_newline(&mut self) {
        let len = self.rope.len_chars();
        if len == 0 || self.rope.char(len - 1) != '\n' {
            self.rope.insert(len, "\n");
        }
    }
}

impl TextDocument for Buffer {
    fn line_count(&self) -> usize {
        // ropey reports the empty line after the final newline as a line.
        self.rope.len_lines().saturating_sub(1).max(1)
    }

    fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.line_count() {
            return None;
        }
        let mut s = self.rope.line(idx).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    fn line_len(&self, idx: usize) -> usize {
        if idx >= self.line_count() {
            return 0;
        }
        let len = self.rope.line(idx).len_chars();
        len.saturating_sub(1)
    }

    fn line_start(&self, idx: usize) -> usize {
        self.rope.line_to_char(idx.min(self.line_count()))
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars().saturating_sub(1));
        let line = self.rope.char_to_line(offset).min(self.last_line());
        Position::new(line, offset - self.rope.line_to_char(line))
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let total = self.rope.len_chars();
        let (s, e) = (start.min(total), end.min(total));
        if s >= e {
            return String::new();
        }
        self.rope.slice(s..e).to_string()
    }

    fn insert(&mut self, offset: usize, text: &str) {
        let offset = offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
    }

    fn remove(&mut self, start: usize, end: usize) -> String {
        let total = self.rope.len_chars();
        let (s, e) = (start.min(total), end.min(total));
        if s >= e {
            return String::new();
        }
        let removed = self.rope.slice(s..e).to_string();
        self.rope.remove(s..e);
        self.restore_final_newline();
        removed
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(&normalize_line_ends(text));
        self.restore_final_newline();
    }
}
