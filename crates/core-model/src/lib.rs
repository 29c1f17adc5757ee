//! Host-side model the modal engine operates on.
//!
//! [`EditorModel`] bundles the document, the single [`View`] onto it, the
//! editor state (registers, marks, undo, status) and the search and colon
//! collaborators. Fields are public so the engine can borrow them disjointly
//! (e.g. `&mut model.doc` alongside `&mut model.state.registers`).
//!
//! Invariants (hold after every engine call):
//! * `view.cursor.line < doc.line_count()`.
//! * In Normal mode the cursor column is on a char of the line (or 0 on an
//!   empty line); Insert-like modes may also address the newline column.
//! * `view.top_line <= view.cursor.line < view.top_line + view.height` once
//!   [`View::auto_scroll`] has run.

use core_config::Options;
use core_state::EditorState;
use core_text::{Buffer, Position, TextDocument};

pub mod colon;
pub mod search;

pub use colon::{ColonDispatcher, ColonError, ColonLog, ColonRequest, OpFlags};
pub use core_state::StatusLine;
pub use search::{Direction, MatchRange, RegexSearch, SearchEngine, SearchError, SearchFlags};

/// Wanted column value meaning "end of line" (set by `$`).
pub const CURSWANT_EOL: usize = usize::MAX;

#[derive(Debug, Clone)]
pub struct View {
    pub cursor: Position,
    /// Column vertical motions try to return to.
    pub curswant: usize,
    /// When set, the next vertical motion recomputes `curswant` from the
    /// cursor first.
    pub set_curswant: bool,
    pub top_line: usize,
    /// Text rows visible in the host viewport.
    pub height: usize,
}

impl Default for View {
    fn default() -> Self {
        Self {
            cursor: Position::origin(),
            curswant: 0,
            set_curswant: true,
            top_line: 0,
            height: 24,
        }
    }
}

impl View {
    pub fn with_height(height: usize) -> Self {
        Self {
            height: height.max(1),
            ..Self::default()
        }
    }

    pub fn bottom_line(&self) -> usize {
        self.top_line + self.height.saturating_sub(1)
    }

    /// Scroll so the cursor line is inside the viewport. Returns true if the
    /// top line changed.
    pub fn auto_scroll(&mut self, margin: usize) -> bool {
        match compute_scroll_intent(self.top_line, self.cursor.line, self.height, margin) {
            Some(new_first) => {
                self.top_line = new_first;
                true
            }
            None => false,
        }
    }
}

/// Compute the first visible line that keeps `cursor_line` within the
/// viewport subject to a top/bottom margin (clamped to half the height).
/// Returns `None` when no scroll is needed.
pub fn compute_scroll_intent(
    first: usize,
    cursor_line: usize,
    text_height: usize,
    margin: usize,
) -> Option<usize> {
    if text_height == 0 {
        return None;
    }
    let m = margin.min(text_height / 2);
    let bottom = first + text_height;
    if cursor_line < first + m {
        let new_first = cursor_line.saturating_sub(m);
        if new_first != first {
            return Some(new_first);
        }
    } else if cursor_line + m >= bottom {
        let new_first = cursor_line + m + 1 - text_height;
        if new_first != first {
            return Some(new_first);
        }
    }
    None
}

pub struct EditorModel {
    pub doc: Box<dyn TextDocument>,
    pub view: View,
    pub state: EditorState,
    pub options: Options,
    pub search: Box<dyn SearchEngine>,
    pub colon: Box<dyn ColonDispatcher>,
}

impl EditorModel {
    pub fn new(doc: Box<dyn TextDocument>, options: Options) -> Self {
        let undo = core_state::SnapshotUndo::new(options.limits.undolevels);
        let view = View::with_height(options.limits.viewport_height);
        Self {
            doc,
            view,
            state: EditorState::new(Box::new(undo)),
            options,
            search: Box::new(RegexSearch::default()),
            colon: Box::new(ColonLog::default()),
        }
    }

    /// Model over an in-memory [`Buffer`] with default options.
    pub fn from_text(text: &str) -> Self {
        Self::new(Box::new(Buffer::from_str("[scratch]", text)), Options::default())
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.view.height = options.limits.viewport_height.max(1);
        self.options = options;
        self
    }

    pub fn with_search(mut self, search: Box<dyn SearchEngine>) -> Self {
        self.search = search;
        self
    }

    pub fn with_colon(mut self, colon: Box<dyn ColonDispatcher>) -> Self {
        self.colon = colon;
        self
    }

    pub fn cursor(&self) -> Position {
        self.view.cursor
    }

    /// Move the cursor, clamped to the document. `past_end` allows the
    /// newline column (Insert-like modes).
    pub fn set_cursor(&mut self, pos: Position, past_end: bool) {
        let line = pos.line.min(self.doc.last_line());
        let len = self.doc.line_len(line);
        let max_col = if past_end { len } else { len.saturating_sub(1) };
        self.view.cursor = Position::new(line, pos.col.min(max_col));
    }

    pub fn text(&self) -> String {
        self.doc.text()
    }

    pub fn line(&self, idx: usize) -> String {
        self.doc.line(idx).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_starts_at_origin() {
        let model = EditorModel::from_text("hello\nworld");
        assert_eq!(model.cursor(), Position::origin());
        assert_eq!(model.text(), "hello\nworld\n");
        assert_eq!(model.view.height, 24);
    }

    #[test]
    fn set_cursor_clamps_to_line_and_document() {
        let mut model = EditorModel::from_text("abc\nx");
        model.set_cursor(Position::new(0, 10), false);
        assert_eq!(model.cursor(), Position::new(0, 2));
        model.set_cursor(Position::new(0, 10), true);
        assert_eq!(model.cursor(), Position::new(0, 3));
        model.set_cursor(Position::new(9, 4), false);
        assert_eq!(model.cursor(), Position::new(1, 0));
    }

    #[test]
    fn auto_scroll_down_and_up() {
        let mut v = View::with_height(5);
        assert!(!v.auto_scroll(0));
        v.cursor.line = 4;
        assert!(!v.auto_scroll(0));
        v.cursor.line = 5;
        assert!(v.auto_scroll(0));
        assert_eq!(v.top_line, 1);
        v.cursor.line = 9;
        assert!(v.auto_scroll(0));
        assert_eq!(v.top_line, 5);
        v.cursor.line = 3;
        assert!(v.auto_scroll(0));
        assert_eq!(v.top_line, 3);
    }

    #[test]
    fn compute_scroll_intent_clamps_margin_to_half_height() {
        assert_eq!(compute_scroll_intent(0, 2, 4, 10), Some(1));
        assert_eq!(compute_scroll_intent(0, 5, 10, 2), None);
        assert_eq!(compute_scroll_intent(10, 11, 6, 2), Some(9));
    }
}
