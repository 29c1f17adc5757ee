//! Regex search collaborator.
//!
//! The engine asks for "the next match of `pattern` from `from` in
//! `direction`"; [`RegexSearch`] answers using the `regex` crate after
//! translating the vi pattern dialect (magic mode: `\<`, `\>`, `\(`, `\|`,
//! `\+`, `\=`, ...) into regex syntax.

use bitflags::bitflags;
use core_text::{Position, TextDocument};
use regex::{Regex, RegexBuilder};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SearchFlags: u8 {
        /// Continue from the other end of the document.
        const WRAP = 0b0000_0001;
        const IGNORE_CASE = 0b0000_0010;
        /// With IGNORE_CASE: an uppercase char in the pattern makes it case sensitive.
        const SMART_CASE = 0b0000_0100;
        /// A match starting exactly at `from` is accepted.
        const ACCEPT_AT_CURSOR = 0b0000_1000;
    }
}

/// Match span; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    pub start: Position,
    pub end: Position,
    pub wrapped: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("E383: Invalid search string: {0}")]
    InvalidPattern(String),
}

pub trait SearchEngine {
    fn search(
        &mut self,
        doc: &dyn TextDocument,
        pattern: &str,
        direction: Direction,
        from: Position,
        flags: SearchFlags,
    ) -> Result<Option<MatchRange>, SearchError>;
}

/// Translate a vi (magic) pattern into `regex` syntax.
pub fn translate_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('<') | Some('>') => out.push_str(r"\b"),
                Some('(') => out.push('('),
                Some(')') => out.push(')'),
                Some('|') => out.push('|'),
                Some('{') => out.push('{'),
                Some('}') => out.push('}'),
                Some('+') => out.push('+'),
                Some('=') | Some('?') => out.push('?'),
                Some('t') => out.push_str(r"\t"),
                Some('n') => out.push_str(r"\n"),
                Some('/') => out.push('/'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push_str(r"\\"),
            },
            '(' | ')' | '|' | '{' | '}' | '+' | '?' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Default search engine backed by the `regex` crate.
#[derive(Debug, Default)]
pub struct RegexSearch {
    cache: Option<(String, bool, Regex)>,
}

impl RegexSearch {
    fn compile(&mut self, pattern: &str, ignore_case: bool) -> Result<&Regex, SearchError> {
        let hit = matches!(&self.cache, Some((p, ic, _)) if p == pattern && *ic == ignore_case);
        if !hit {
            let re = RegexBuilder::new(&translate_pattern(pattern))
                .case_insensitive(ignore_case)
                .multi_line(true)
                .build()
                .map_err(|_| SearchError::InvalidPattern(pattern.to_string()))?;
            self.cache = Some((pattern.to_string(), ignore_case, re));
        }
        match &self.cache {
            Some((_, _, re)) => Ok(re),
            None => Err(SearchError::InvalidPattern(pattern.to_string())),
        }
    }
}

fn char_to_byte(text: &str, char_off: usize) -> usize {
    text.char_indices()
        .nth(char_off)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

fn byte_to_char(text: &str, byte_off: usize) -> usize {
    text[..byte_off].chars().count()
}

impl SearchEngine for RegexSearch {
    fn search(
        &mut self,
        doc: &dyn TextDocument,
        pattern: &str,
        direction: Direction,
        from: Position,
        flags: SearchFlags,
    ) -> Result<Option<MatchRange>, SearchError> {
        let ignore_case = flags.contains(SearchFlags::IGNORE_CASE)
            && !(flags.contains(SearchFlags::SMART_CASE) && pattern.chars().any(char::is_uppercase));
        let text = doc.text();
        let re = self.compile(pattern, ignore_case)?;
        let from_byte = char_to_byte(&text, doc.offset_of(from));
        let accept_at = flags.contains(SearchFlags::ACCEPT_AT_CURSOR);
        let spans: Vec<(usize, usize)> = re.find_iter(&text).map(|m| (m.start(), m.end())).collect();
        let pick = match direction {
            Direction::Forward => spans
                .iter()
                .find(|(s, _)| if accept_at { *s >= from_byte } else { *s > from_byte })
                .map(|m| (*m, false))
                .or_else(|| {
                    flags
                        .contains(SearchFlags::WRAP)
                        .then(|| spans.first().map(|m| (*m, true)))
                        .flatten()
                }),
            Direction::Backward => spans
                .iter()
                .rev()
                .find(|(s, _)| *s < from_byte)
                .map(|m| (*m, false))
                .or_else(|| {
                    flags
                        .contains(SearchFlags::WRAP)
                        .then(|| spans.last().map(|m| (*m, true)))
                        .flatten()
                }),
        };
        trace!(target: "model.search", pattern, ?direction, found = pick.is_some(), "search");
        Ok(pick.map(|((s, e), wrapped)| MatchRange {
            start: doc.position_of(byte_to_char(&text, s)),
            end: doc.position_of(byte_to_char(&text, e)),
            wrapped,
        }))
    }
}
