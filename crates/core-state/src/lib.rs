//! Editor state the modal engine mutates besides the text itself: registers,
//! marks, the undo collaborator, the reported mode and the status line.
//!
//! Undo grouping:
//! - Every logical edit (one operator, one direct command, one Insert session)
//!   is bracketed by a single undo group so it undoes as one step.
//! - Groups nest; the engine tracks depth through [`UndoManager::depth`] and its
//!   error boundary calls [`UndoManager::close_all`] so a failed handler never
//!   leaves a group open.
//!
//! Status line:
//! - The engine writes mode text, the partial-command echo and messages into
//!   [`StatusLine`]; rendering is the host's business.
//! - Each failure produces exactly one message and one bell.

use tracing::debug;

pub mod marks;
pub mod registers;
pub mod undo;

pub use marks::{MarkError, Marks};
pub use registers::{
    Clipboard, MemoryClipboard, RegisterContent, RegisterError, RegisterKind, Registers,
    is_valid_read_register, is_valid_record_register, is_valid_yank_register,
};
pub use undo::{EditSnapshot, SnapshotUndo, UNDO_HISTORY_MAX, UndoManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualMode {
    Char,
    Line,
    Block,
}

/// Mode reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal command/navigation mode.
    Normal,
    /// An operator is waiting for its motion.
    OperatorPending,
    Insert,
    Replace,
    VirtualReplace,
    Visual(VisualMode),
    /// A `:`, `/` or `?` line is being collected.
    CommandLine,
}

impl Mode {
    /// Text for the mode indicator (empty for Normal).
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Normal | Mode::OperatorPending | Mode::CommandLine => "",
            Mode::Insert => "-- INSERT --",
            Mode::Replace => "-- REPLACE --",
            Mode::VirtualReplace => "-- VREPLACE --",
            Mode::Visual(VisualMode::Char) => "-- VISUAL --",
            Mode::Visual(VisualMode::Line) => "-- VISUAL LINE --",
            Mode::Visual(VisualMode::Block) => "-- VISUAL BLOCK --",
        }
    }

    pub fn is_insert_like(&self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace | Mode::VirtualReplace)
    }
}

/// Status/UI collaborator state: mode display, partial-command echo,
/// messages and bell.
#[derive(Debug, Default, Clone)]
pub struct StatusLine {
    pub mode_text: &'static str,
    /// Echo of the command typed so far (`"a2d`), cleared on completion.
    pub pending: String,
    /// Text of the command line while `:`/`/`/`?` collects input.
    pub command_line: Option<String>,
    messages: Vec<String>,
    bells: u32,
}

impl StatusLine {
    pub fn message(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        debug!(target: "state.status", %msg, "status_message");
        self.messages.push(msg);
    }

    pub fn bell(&mut self) {
        self.bells += 1;
    }

    pub fn bells(&self) -> u32 {
        self.bells
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    /// Messages produced since the last call, for hosts that display and
    /// forget.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

/// Registers, marks, undo and status owned by the host on behalf of the
/// engine.
pub struct EditorState {
    pub mode: Mode,
    pub registers: Registers,
    pub marks: Marks,
    pub undo: Box<dyn UndoManager>,
    pub status: StatusLine,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Box::new(SnapshotUndo::default()))
    }
}

impl EditorState {
    pub fn new(undo: Box<dyn UndoManager>) -> Self {
        Self {
            mode: Mode::Normal,
            registers: Registers::default(),
            marks: Marks::default(),
            undo,
            status: StatusLine::default(),
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(target: "state.mode", from = ?self.mode, to = ?mode, "mode_change");
        }
        self.mode = mode;
        self.status.mode_text = mode.label();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_labels() {
        assert_eq!(Mode::Insert.label(), "-- INSERT --");
        assert_eq!(Mode::Visual(VisualMode::Block).label(), "-- VISUAL BLOCK --");
        assert_eq!(Mode::OperatorPending.label(), "");
        assert!(Mode::Replace.is_insert_like());
        assert!(!Mode::Visual(VisualMode::Char).is_insert_like());
    }

    #[test]
    fn set_mode_updates_status_text() {
        let mut st = EditorState::default();
        st.set_mode(Mode::Replace);
        assert_eq!(st.status.mode_text, "-- REPLACE --");
        st.set_mode(Mode::Normal);
        assert_eq!(st.status.mode_text, "");
    }

    #[test]
    fn status_collects_messages_and_bells() {
        let mut status = StatusLine::default();
        status.message("E20: Mark not set");
        status.bell();
        assert_eq!(status.bells(), 1);
        assert_eq!(status.last_message(), Some("E20: Mark not set"));
        assert_eq!(status.take_messages().len(), 1);
        assert!(status.messages().is_empty());
    }
}
