//! Register storage with vi write semantics.
//!
//! Names: `"` unnamed, `0` last yank, `1`-`9` delete history, `a`-`z` named
//! (`A`-`Z` append), `-` small delete, `_` black hole, `*`/`+` clipboard and
//! the read-only `.` (last inserted text), `:` (last colon command) and `/`
//! (last search pattern).
//!
//! The unnamed register always mirrors whatever was written last, so `p`
//! without a register name puts the most recent yank or delete.

use std::fmt;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    Char,
    Line,
    /// Rectangular text; `width` is the block width in columns.
    Block { width: usize },
}

/// Text held by a register. Linewise content always ends with a newline;
/// blockwise content is the block rows joined by newlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterContent {
    pub kind: RegisterKind,
    pub text: String,
}

impl RegisterContent {
    pub fn charwise(text: impl Into<String>) -> Self {
        Self {
            kind: RegisterKind::Char,
            text: text.into(),
        }
    }

    pub fn linewise(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Self {
            kind: RegisterKind::Line,
            text,
        }
    }

    pub fn block(rows: &[String]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        Self {
            kind: RegisterKind::Block { width },
            text: rows.join("\n"),
        }
    }

    /// Rows of the content (the trailing newline of linewise text does not
    /// produce an extra empty row).
    pub fn rows(&self) -> Vec<&str> {
        match self.kind {
            RegisterKind::Line => self.text.strip_suffix('\n').unwrap_or(&self.text).split('\n').collect(),
            _ => self.text.split('\n').collect(),
        }
    }

    fn append(&mut self, other: &RegisterContent) {
        match (self.kind, other.kind) {
            (RegisterKind::Line, _) => {
                self.text.push_str(&other.text);
                if !self.text.ends_with('\n') {
                    self.text.push('\n');
                }
            }
            (_, RegisterKind::Line) => {
                self.text.push('\n');
                self.text.push_str(&other.text);
                self.kind = RegisterKind::Line;
            }
            (RegisterKind::Block { .. }, _) | (_, RegisterKind::Block { .. }) => {
                self.text.push('\n');
                self.text.push_str(&other.text);
                let width = self.rows().iter().map(|r| r.chars().count()).max().unwrap_or(0);
                self.kind = RegisterKind::Block { width };
            }
            (RegisterKind::Char, RegisterKind::Char) => self.text.push_str(&other.text),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    #[error("E354: Invalid register name: '{0}'")]
    Invalid(char),
    #[error("E353: Nothing in register {0}")]
    Empty(char),
}

/// Host clipboard used by the `*` and `+` registers.
pub trait Clipboard: fmt::Debug {
    fn get(&self) -> Option<RegisterContent>;
    fn set(&mut self, content: &RegisterContent);
}

/// In-process clipboard for hosts without a system clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: Option<RegisterContent>,
}

impl Clipboard for MemoryClipboard {
    fn get(&self) -> Option<RegisterContent> {
        self.content.clone()
    }
    fn set(&mut self, content: &RegisterContent) {
        self.content = Some(content.clone());
    }
}

/// Registers a yank, delete or put may name.
pub fn is_valid_yank_register(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '"' | '-' | '_' | '*' | '+')
}

/// Registers that can be read by put, `Ctrl-R` and `@`.
pub fn is_valid_read_register(c: char) -> bool {
    is_valid_yank_register(c) || matches!(c, '.' | ':' | '/')
}

/// Registers `q` can record into.
pub fn is_valid_record_register(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '"'
}

#[derive(Debug)]
pub struct Registers {
    unnamed: Option<RegisterContent>,
    numbered: [Option<RegisterContent>; 10],
    named: [Option<RegisterContent>; 26],
    small_delete: Option<RegisterContent>,
    last_inserted: Option<String>,
    last_command: Option<String>,
    last_search: Option<String>,
    clipboard: Box<dyn Clipboard>,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new(Box::new(MemoryClipboard::default()))
    }
}

impl Registers {
    pub fn new(clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            unnamed: None,
            numbered: Default::default(),
            named: Default::default(),
            small_delete: None,
            last_inserted: None,
            last_command: None,
            last_search: None,
            clipboard,
        }
    }

    fn named_index(c: char) -> Option<usize> {
        c.is_ascii_alphabetic()
            .then(|| (c.to_ascii_lowercase() as u8 - b'a') as usize)
    }

    /// Store into a named or clipboard register. Returns the full stored
    /// content (after an uppercase append).
    fn store_explicit(&mut self, name: char, content: RegisterContent) -> RegisterContent {
        if let Some(idx) = Self::named_index(name) {
            if name.is_ascii_uppercase()
                && let Some(existing) = self.named[idx].as_mut()
            {
                existing.append(&content);
            } else {
                self.named[idx] = Some(content.clone());
            }
            return self.named[idx].clone().unwrap_or(content);
        }
        if matches!(name, '*' | '+') {
            self.clipboard.set(&content);
        }
        content
    }

    fn shift_numbered(&mut self, content: RegisterContent) {
        self.numbered[1..].rotate_right(1);
        self.numbered[1] = Some(content);
    }

    /// Yank semantics: named/clipboard target, else `"0`. `_` discards.
    pub fn write_yank(&mut self, target: Option<char>, content: RegisterContent) -> Result<(), RegisterError> {
        let name = target.unwrap_or('"');
        if !is_valid_yank_register(name) {
            return Err(RegisterError::Invalid(name));
        }
        if name == '_' {
            return Ok(());
        }
        trace!(target: "state.registers", register = %name, len = content.text.len(), "write_yank");
        let stored = match name {
            '"' => {
                self.numbered[0] = Some(content.clone());
                content
            }
            '-' => {
                self.small_delete = Some(content.clone());
                content
            }
            '0'..='9' => {
                self.numbered[(name as u8 - b'0') as usize] = Some(content.clone());
                content
            }
            _ => self.store_explicit(name, content),
        };
        self.unnamed = Some(stored);
        Ok(())
    }

    /// Delete semantics. The text always enters the `"1`..`"9` history
    /// (older entries shift down one slot); a small delete without a register
    /// name also lands in `"-`. `_` discards.
    pub fn write_delete(
        &mut self,
        target: Option<char>,
        content: RegisterContent,
        small: bool,
    ) -> Result<(), RegisterError> {
        let name = target.unwrap_or('"');
        if !is_valid_yank_register(name) {
            return Err(RegisterError::Invalid(name));
        }
        if name == '_' {
            return Ok(());
        }
        trace!(target: "state.registers", register = %name, small, len = content.text.len(), "write_delete");
        let stored = if name.is_ascii_alphabetic() || matches!(name, '*' | '+') {
            self.store_explicit(name, content.clone())
        } else {
            content.clone()
        };
        self.shift_numbered(content.clone());
        if (small && target.is_none()) || name == '-' {
            self.small_delete = Some(content);
        }
        self.unnamed = Some(stored);
        Ok(())
    }

    /// Read a register for put / `Ctrl-R` / `@`.
    pub fn get(&self, name: char) -> Result<RegisterContent, RegisterError> {
        if !is_valid_read_register(name) {
            return Err(RegisterError::Invalid(name));
        }
        let found = match name {
            '"' => self.unnamed.clone(),
            '0'..='9' => self.numbered[(name as u8 - b'0') as usize].clone(),
            '-' => self.small_delete.clone(),
            '*' | '+' => self.clipboard.get(),
            '.' => self.last_inserted.clone().map(RegisterContent::charwise),
            ':' => self.last_command.clone().map(RegisterContent::charwise),
            '/' => self.last_search.clone().map(RegisterContent::charwise),
            '_' => None,
            c => Self::named_index(c).and_then(|i| self.named[i].clone()),
        };
        found.ok_or(RegisterError::Empty(name))
    }

    /// Store a finished macro recording (uppercase appends).
    pub fn store_recording(&mut self, name: char, text: &str) -> Result<(), RegisterError> {
        if !is_valid_record_register(name) {
            return Err(RegisterError::Invalid(name));
        }
        let content = RegisterContent::charwise(text);
        match name {
            '"' => self.unnamed = Some(content),
            '0'..='9' => self.numbered[(name as u8 - b'0') as usize] = Some(content),
            _ => {
                self.store_explicit(name, content);
            }
        }
        Ok(())
    }

    pub fn set_last_inserted(&mut self, text: impl Into<String>) {
        self.last_inserted = Some(text.into());
    }
    pub fn last_inserted(&self) -> Option<&str> {
        self.last_inserted.as_deref()
    }
    pub fn set_last_command(&mut self, text: impl Into<String>) {
        self.last_command = Some(text.into());
    }
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }
    pub fn set_last_search(&mut self, text: impl Into<String>) {
        self.last_search = Some(text.into());
    }
    pub fn last_search(&self) -> Option<&str> {
        self.last_search.as_deref()
    }

    /// Text of a register or an empty string (handy for tests and `:reg`).
    pub fn text_of(&self, name: char) -> String {
        self.get(name).map(|c| c.text).unwrap_or_default()
    }

    /// Non-empty registers in display order, for a `:registers` listing.
    pub fn snapshot(&self) -> Vec<(char, RegisterContent)> {
        let names = std::iter::once('"')
            .chain('0'..='9')
            .chain('a'..='z')
            .chain(['-', '.', ':', '/']);
        names.filter_map(|n| self.get(n).ok().map(|c| (n, c))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_shifts_numbered_history() {
        let mut regs = Registers::default();
        for word in ["one", "two", "three"] {
            regs.write_delete(None, RegisterContent::linewise(word), false).unwrap();
        }
        assert_eq!(regs.text_of('1'), "three\n");
        assert_eq!(regs.text_of('2'), "two\n");
        assert_eq!(regs.text_of('3'), "one\n");
        assert_eq!(regs.text_of('"'), "three\n");
    }

    #[test]
    fn history_drops_oldest_after_nine() {
        let mut regs = Registers::default();
        for i in 0..11 {
            regs.write_delete(None, RegisterContent::linewise(format!("l{i}")), false).unwrap();
        }
        assert_eq!(regs.text_of('1'), "l10\n");
        assert_eq!(regs.text_of('9'), "l2\n");
    }

    #[test]
    fn small_delete_also_fills_minus() {
        let mut regs = Registers::default();
        regs.write_delete(None, RegisterContent::charwise("hello "), true).unwrap();
        assert_eq!(regs.text_of('-'), "hello ");
        assert_eq!(regs.text_of('1'), "hello ");
        assert_eq!(regs.text_of('"'), "hello ");
    }

    #[test]
    fn yank_goes_to_zero_and_named_append() {
        let mut regs = Registers::default();
        regs.write_yank(None, RegisterContent::charwise("abc")).unwrap();
        assert_eq!(regs.text_of('0'), "abc");
        regs.write_yank(Some('a'), RegisterContent::charwise("x")).unwrap();
        regs.write_yank(Some('A'), RegisterContent::charwise("y")).unwrap();
        assert_eq!(regs.text_of('a'), "xy");
        assert_eq!(regs.text_of('"'), "xy");
        // "0 untouched by a named yank
        assert_eq!(regs.text_of('0'), "abc");
    }

    #[test]
    fn appending_lines_to_chars_becomes_linewise() {
        let mut regs = Registers::default();
        regs.write_yank(Some('q'), RegisterContent::charwise("ab")).unwrap();
        regs.write_yank(Some('Q'), RegisterContent::linewise("cd")).unwrap();
        let got = regs.get('q').unwrap();
        assert_eq!(got.kind, RegisterKind::Line);
        assert_eq!(got.text, "ab\ncd\n");
    }

    #[test]
    fn black_hole_and_invalid_names() {
        let mut regs = Registers::default();
        regs.write_delete(Some('_'), RegisterContent::charwise("gone"), true).unwrap();
        assert!(matches!(regs.get('"'), Err(RegisterError::Empty('"'))));
        assert_eq!(
            regs.write_yank(Some('%'), RegisterContent::charwise("x")),
            Err(RegisterError::Invalid('%'))
        );
    }

    #[test]
    fn clipboard_registers_publish() {
        let mut regs = Registers::default();
        regs.write_yank(Some('*'), RegisterContent::charwise("clip")).unwrap();
        assert_eq!(regs.text_of('+'), "clip");
    }

    #[test]
    fn block_rows_and_width() {
        let content = RegisterContent::block(&["ab".to_string(), "cde".to_string()]);
        assert_eq!(content.kind, RegisterKind::Block { width: 3 });
        assert_eq!(content.rows(), vec!["ab", "cde"]);
        assert_eq!(RegisterContent::linewise("x\ny").rows(), vec!["x", "y"]);
    }
}
