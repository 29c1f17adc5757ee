//! Input queues and the macro recorder.
//!
//! Four buffers feed the engine:
//! * **Stuff**: text the engine injects for itself (`@a`, `.`, `x` -> `dl`).
//!   Always drained before anything the host typed.
//! * **Type-ahead**: chars handed in by the host through `Engine::feed`.
//! * **Redo log**: the keys of the last repeatable change, replayed by `.`.
//! * **Record log**: Type-ahead chars captured while `q{reg}` is active.
//!
//! Only chars taken from Type-ahead are recorded, so a macro that runs other
//! macros records the `@x` keys rather than their expansion.

use core_state::{RegisterError, is_valid_record_register};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Chars the insert sub-engine treats as the command that started an insert.
const INSERT_CMDCHARS: &str = "AaIiRrOo";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("E223: Command too complex")]
    TooComplex { limit: usize },
    #[error("nothing to repeat")]
    NothingToRepeat,
    #[error(transparent)]
    Register(#[from] RegisterError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Stuff,
    Typeahead,
}

#[derive(Debug)]
pub struct InputQueue {
    stuff: VecDeque<char>,
    typeahead: VecDeque<char>,
    redo: String,
    /// While set the redo log is frozen; lifted once Stuff shrinks back to
    /// this many chars (the text queued beneath the replay).
    redo_guard: Option<usize>,
    recording: Option<char>,
    record: String,
    burst_start: usize,
    last_source: Source,
    max_len: usize,
    stuffed_in_run: usize,
}

impl InputQueue {
    pub fn new(max_len: usize) -> Self {
        Self {
            stuff: VecDeque::new(),
            typeahead: VecDeque::new(),
            redo: String::new(),
            redo_guard: None,
            recording: None,
            record: String::new(),
            burst_start: 0,
            last_source: Source::Typeahead,
            max_len: max_len.max(1),
            stuffed_in_run: 0,
        }
    }

    pub fn feed(&mut self, c: char) {
        self.typeahead.push_back(c);
    }

    pub fn feed_str(&mut self, text: &str) {
        self.typeahead.extend(text.chars());
    }

    /// Next char to dispatch: Stuff first, then Type-ahead.
    pub fn next_char(&mut self) -> Option<char> {
        if let Some(guard) = self.redo_guard
            && self.stuff.len() <= guard
        {
            trace!(target: "actions.queue", "redo_unblocked");
            self.redo_guard = None;
        }
        if let Some(c) = self.stuff.pop_front() {
            self.last_source = Source::Stuff;
            return Some(c);
        }
        let c = self.typeahead.pop_front()?;
        self.last_source = Source::Typeahead;
        if self.recording.is_some() {
            self.record.push(c);
        }
        Some(c)
    }

    pub fn last_source(&self) -> Source {
        self.last_source
    }

    pub fn has_pending(&self) -> bool {
        !self.stuff.is_empty() || !self.typeahead.is_empty()
    }

    pub fn stuff_len(&self) -> usize {
        self.stuff.len()
    }

    /// Start of a new budget window for stuffed text (one host `feed`).
    pub fn begin_run(&mut self) {
        self.stuffed_in_run = 0;
    }

    fn check_capacity(&mut self, extra: usize) -> Result<(), QueueError> {
        self.stuffed_in_run = self.stuffed_in_run.saturating_add(extra);
        // A macro that re-runs itself never grows Stuff, so the run total is
        // capped as well.
        let run_limit = self.max_len.saturating_mul(10);
        if self.stuff.len().saturating_add(extra) > self.max_len || self.stuffed_in_run > run_limit {
            warn!(target: "actions.queue", stuff = self.stuff.len(), extra, limit = self.max_len, "stuff_overflow");
            self.flush_all();
            return Err(QueueError::TooComplex { limit: self.max_len });
        }
        Ok(())
    }

    /// Queue `text` ahead of everything else; it is the next thing read.
    pub fn stuff_front(&mut self, text: &str) -> Result<(), QueueError> {
        self.stuff_front_repeated(text, 1)
    }

    /// Queue `count` copies of `text` ahead of everything else. The limit is
    /// checked before anything is queued.
    pub fn stuff_front_repeated(&mut self, text: &str, count: usize) -> Result<(), QueueError> {
        let n = text.chars().count();
        if n == 0 {
            return Ok(());
        }
        self.check_capacity(n.saturating_mul(count))?;
        for _ in 0..count {
            for c in text.chars().rev() {
                self.stuff.push_front(c);
            }
        }
        trace!(target: "actions.queue", len = n, count, "stuff_front");
        Ok(())
    }

    pub fn stuff_back(&mut self, text: &str) -> Result<(), QueueError> {
        let n = text.chars().count();
        self.check_capacity(n)?;
        self.stuff.extend(text.chars());
        trace!(target: "actions.queue", len = n, "stuff_back");
        Ok(())
    }

    /// Drop queued Stuff (a failing command aborts the macro that issued it).
    pub fn flush_stuff(&mut self) {
        if !self.stuff.is_empty() {
            debug!(target: "actions.queue", dropped = self.stuff.len(), "stuff_flushed");
        }
        self.stuff.clear();
        self.redo_guard = None;
    }

    /// Capacity error recovery: Stuff and the redo log are both discarded.
    pub fn flush_all(&mut self) {
        self.flush_stuff();
        self.redo.clear();
    }

    // ---- macro recording -------------------------------------------------

    /// Mark the start of a command chunk; `stop_recording` trims everything
    /// recorded after the last mark (the keys that stopped the recording).
    pub fn mark_command_start(&mut self) {
        self.burst_start = self.record.len();
    }

    pub fn start_recording(&mut self, register: char) -> Result<(), QueueError> {
        if !is_valid_record_register(register) {
            return Err(RegisterError::Invalid(register).into());
        }
        debug!(target: "actions.queue", %register, "recording_start");
        self.recording = Some(register);
        self.record.clear();
        self.burst_start = 0;
        Ok(())
    }

    /// Finish recording and return the recorded keys without the trailing
    /// stop command.
    pub fn stop_recording(&mut self) -> String {
        self.record.truncate(self.burst_start);
        let text = std::mem::take(&mut self.record);
        debug!(target: "actions.queue", register = ?self.recording, len = text.len(), "recording_stop");
        self.recording = None;
        self.burst_start = 0;
        text
    }

    pub fn recording(&self) -> Option<char> {
        self.recording
    }

    // ---- redo log --------------------------------------------------------

    pub fn redo_blocked(&self) -> bool {
        self.redo_guard.is_some()
    }

    pub fn redo_log(&self) -> &str {
        &self.redo
    }

    pub fn reset_redo_log(&mut self) {
        if self.redo_blocked() {
            return;
        }
        self.redo.clear();
    }

    pub fn append_redo(&mut self, c: char) {
        if !self.redo_blocked() {
            self.redo.push(c);
        }
    }

    pub fn append_redo_str(&mut self, text: &str) {
        if !self.redo_blocked() {
            self.redo.push_str(text);
        }
    }

    pub fn append_redo_number(&mut self, n: usize) {
        if !self.redo_blocked() && n > 0 {
            self.redo.push_str(&n.to_string());
        }
    }

    /// Append text that must replay as literal chars (control chars are
    /// quoted with Ctrl-V).
    pub fn append_redo_literal(&mut self, text: &str) {
        if self.redo_blocked() {
            return;
        }
        for c in text.chars() {
            if (c.is_control() && c != '\n' && c != '\t') || core_events::keys::is_special(c) {
                self.redo.push(core_events::keys::ctrl('v'));
            }
            self.redo.push(c);
        }
    }

    fn stuff_redo(&mut self, text: &str) -> Result<(), QueueError> {
        let beneath = self.stuff.len();
        self.stuff_front(text)?;
        self.redo_guard = Some(self.redo_guard.map_or(beneath, |g| g.min(beneath)));
        Ok(())
    }

    /// Replay the redo log (`.`). A non-zero `count` replaces the count
    /// stored in the log; a `"1`..`"8` register prefix advances one slot.
    /// The rewritten log becomes the new redo log.
    pub fn begin_redo(&mut self, count: usize) -> Result<(), QueueError> {
        if self.redo.is_empty() {
            return Err(QueueError::NothingToRepeat);
        }
        let mut chars = self.redo.chars().peekable();
        let mut out = String::with_capacity(self.redo.len() + 4);
        if chars.peek() == Some(&'"') {
            out.push('"');
            chars.next();
            if let Some(mut reg) = chars.next() {
                if ('1'..'9').contains(&reg) {
                    reg = (reg as u8 + 1) as char;
                }
                out.push(reg);
            }
        }
        if count > 0 {
            while chars.peek().is_some_and(char::is_ascii_digit) {
                chars.next();
            }
            out.push_str(&count.to_string());
        }
        out.extend(chars);
        debug!(target: "actions.queue", count, redo = %out.escape_debug(), "begin_redo");
        self.stuff_redo(&out)?;
        self.redo = out;
        Ok(())
    }

    /// Stuff the text typed in the current insert again (count > 1 on
    /// Escape). Copies the log after the insert command char; `o`/`O` get
    /// a leading newline so the repeat opens its own line.
    pub fn begin_insert_redo(&mut self) -> Result<(), QueueError> {
        let mut rest = self.redo.chars();
        let mut out = String::new();
        let mut found = false;
        while let Some(c) = rest.next() {
            if c == 'g' {
                // gI / gR: the next char is part of the command
                rest.next();
                found = true;
                break;
            }
            if INSERT_CMDCHARS.contains(c) {
                if c == 'o' || c == 'O' {
                    out.push('\n');
                }
                found = true;
                break;
            }
        }
        if !found {
            return Err(QueueError::NothingToRepeat);
        }
        out.extend(rest);
        trace!(target: "actions.queue", text = %out.escape_debug(), "begin_insert_redo");
        self.stuff_redo(&out)
    }
}
