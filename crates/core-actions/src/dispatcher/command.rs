//! Command-line collection for `:`, `/` and `?`.
//!
//! The engine edits the line itself (Backspace, `Ctrl-U`, `Ctrl-W`,
//! `Ctrl-V`); on Enter a `:` line becomes a [`ColonRequest`] for the host's
//! dispatcher and a `/` `?` line becomes a search motion. Escape, or
//! Backspace on an empty line, abandons it.

use crate::engine::{Engine, EngineState, VisualState};
use crate::error::{Effect, EngineError, EngineResult};
use core_events::keys;
use core_model::{ColonRequest, EditorModel, OpFlags};
use core_text::chars::{is_blank, is_word_char};
use tracing::debug;

pub(crate) struct LineEntry {
    /// `:` `/` or `?`.
    pub kind: char,
    pub text: String,
    /// Count for a search.
    pub count: usize,
    /// Opened by the `!` operator; the typed text after `prefill_len` is
    /// appended to the redo log.
    pub filter: bool,
    pub from_visual: bool,
    pub prefill_len: usize,
    /// Selection to return to after a search typed in Visual mode.
    pub visual: Option<VisualState>,
    literal: bool,
}

impl LineEntry {
    pub(crate) fn new(kind: char, prefill: &str) -> Self {
        Self {
            kind,
            text: prefill.to_string(),
            count: 0,
            filter: false,
            from_visual: false,
            prefill_len: prefill.chars().count(),
            visual: None,
            literal: false,
        }
    }

    pub(crate) fn display(&self) -> String {
        format!("{}{}", self.kind, self.text)
    }

    fn delete_word(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut end = chars.len();
        while end > 0 && is_blank(chars[end - 1]) {
            end -= 1;
        }
        if end > 0 {
            let word = is_word_char(chars[end - 1]);
            while end > 0 && !is_blank(chars[end - 1]) && is_word_char(chars[end - 1]) == word {
                end -= 1;
            }
        }
        self.text = chars[..end].iter().collect();
    }
}

impl Engine {
    /// `:`; a count pre-fills a line range, Visual mode the selection range.
    pub(crate) fn start_command_line(&mut self, count: usize, from_visual: bool) -> EngineResult {
        let prefill = if from_visual {
            "'<,'>".to_string()
        } else {
            match count {
                0 => String::new(),
                1 => ".".to_string(),
                n => format!(".,.+{}", n - 1),
            }
        };
        let mut entry = LineEntry::new(':', &prefill);
        entry.from_visual = from_visual;
        self.state = EngineState::LineEntry(entry);
        Ok(Effect::mode())
    }

    /// `/` or `?`, possibly completing a pending operator.
    pub(crate) fn start_search_entry(&mut self, kind: char, count: usize) -> EngineResult {
        let mut entry = LineEntry::new(kind, "");
        entry.count = count;
        if let EngineState::Visual(v) = self.state {
            entry.visual = Some(v);
        }
        self.state = EngineState::LineEntry(entry);
        Ok(Effect::mode())
    }

    /// Line for the `!` operator, pre-filled with the range and `!`.
    pub(crate) fn start_filter_entry(&mut self, range: &str, from_visual: bool) -> EngineResult {
        let mut entry = LineEntry::new(':', &format!("{range}!"));
        entry.filter = true;
        entry.from_visual = from_visual;
        self.state = EngineState::LineEntry(entry);
        Ok(Effect::mode())
    }

    pub(crate) fn line_entry_key(&mut self, model: &mut EditorModel, mut entry: LineEntry, c: char) -> EngineResult {
        if entry.literal {
            entry.literal = false;
            entry.text.push(c);
            self.state = EngineState::LineEntry(entry);
            return Ok(Effect::none());
        }
        match c {
            keys::ESC => {
                debug!(target: "actions.cmdline", kind = %entry.kind, "cancel");
                self.oap.clear();
                if let Some(v) = entry.visual {
                    self.state = EngineState::Visual(v);
                }
                Ok(Effect::mode())
            }
            keys::CR | keys::NL => self.execute_line(model, entry),
            keys::BS | keys::DEL_ASCII => {
                if entry.text.pop().is_none() {
                    self.oap.clear();
                    if let Some(v) = entry.visual {
                        self.state = EngineState::Visual(v);
                    }
                    return Ok(Effect::mode());
                }
                self.state = EngineState::LineEntry(entry);
                Ok(Effect::none())
            }
            '\x15' => {
                entry.text.clear();
                self.state = EngineState::LineEntry(entry);
                Ok(Effect::none())
            }
            '\x17' => {
                entry.delete_word();
                self.state = EngineState::LineEntry(entry);
                Ok(Effect::none())
            }
            '\x16' | '\x11' => {
                entry.literal = true;
                self.state = EngineState::LineEntry(entry);
                Ok(Effect::none())
            }
            _ => {
                entry.text.push(c);
                self.state = EngineState::LineEntry(entry);
                Ok(Effect::none())
            }
        }
    }

    fn execute_line(&mut self, model: &mut EditorModel, entry: LineEntry) -> EngineResult {
        debug!(target: "actions.cmdline", line = %entry.display(), "execute");
        if entry.kind != ':' {
            if let Some(v) = entry.visual {
                self.state = EngineState::Visual(v);
            }
            return self.finish_search(model, entry.kind, &entry.text, entry.count);
        }
        if entry.filter {
            let typed: String = entry.text.chars().skip(entry.prefill_len).collect();
            self.queue.append_redo_literal(&typed);
            self.queue.append_redo('\n');
        }
        let command = entry.text.trim().trim_start_matches(':').to_string();
        if command.is_empty() {
            return Ok(Effect::mode());
        }
        model.state.registers.set_last_command(command.clone());
        let mut flags = OpFlags::empty();
        flags.set(OpFlags::FILTER, entry.filter);
        flags.set(OpFlags::FROM_VISUAL, entry.from_visual);
        self.run_colon(model, ColonRequest::new(command, flags))
    }

    /// Hand a request to the colon dispatcher inside one undo group.
    pub(crate) fn run_colon(&mut self, model: &mut EditorModel, request: ColonRequest) -> EngineResult {
        debug!(target: "actions.cmdline", command = %request.command, flags = ?request.flags, "colon_request");
        self.with_undo_group(model, |_, model| {
            model
                .colon
                .execute(&request, model.doc.as_mut(), &mut model.view)
                .map_err(EngineError::from)
        })?;
        let cur = model.view.cursor;
        model.set_cursor(cur, false);
        Ok(Effect::structural().with(Effect::mode()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_word_removes_last_word_and_blanks() {
        let mut e = LineEntry::new(':', "s/foo bar  ");
        e.delete_word();
        assert_eq!(e.text, "s/foo ");
        e.delete_word();
        assert_eq!(e.text, "s/");
    }

    #[test]
    fn display_includes_kind() {
        let e = LineEntry::new('/', "abc");
        assert_eq!(e.display(), "/abc");
    }
}
