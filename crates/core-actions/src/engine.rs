//! The modal engine.
//!
//! [`Engine`] owns everything that lives between keystrokes: the input
//! queues, the command parser, the pending operator and the Insert session.
//! The host owns the [`EditorModel`] (text, cursor, registers, marks, undo)
//! and lends it to every [`Engine::feed`] call.
//!
//! `feed` pushes one host char onto Type-ahead and then drains everything
//! that became readable, Stuff first. Each char goes through `process`,
//! the single error boundary: a failed handler produces one message (when
//! the error has one) and one bell, clears the pending operator and parser,
//! closes any open undo group, ends an Insert session and flushes Stuff so
//! a failing command also aborts the macro or `.` replay that issued it.

use crate::dispatcher::LineEntry;
use crate::error::{Effect, EngineError, EngineResult, ErrorKind};
use crate::input_queue::InputQueue;
use crate::insert::{InsertFlow, InsertSession};
use crate::op_resolver::{OpKind, OperatorDescriptor};
use crate::parser::{ParseContext, Parser, Step};
use core_config::Options;
use core_events::{KeyEvent, display_char};
use core_model::{Direction, EditorModel};
use core_state::{Mode, VisualMode};
use core_text::Position;
use tracing::{debug, error, trace, warn};

/// Active Visual selection: the cursor is the moving end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualState {
    pub mode: VisualMode,
    pub anchor: Position,
}

pub(crate) enum EngineState {
    Normal,
    Insert(InsertSession),
    Visual(VisualState),
    LineEntry(LineEntry),
}

/// Last `f t F T`, for `;` and `,`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FindState {
    pub target: char,
    pub forward: bool,
    pub till: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct SearchState {
    pub pattern: String,
    pub direction: Direction,
    /// Span of the match the cursor was last moved to.
    pub last_match: Option<(Position, Position)>,
}

/// Last Visual selection, for `gv`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VisualMemory {
    pub mode: VisualMode,
    pub anchor: Position,
    pub cursor: Position,
    pub to_eol: bool,
}

/// Size of the last operated-on selection, re-applied at the cursor when a
/// Visual operation is repeated with `.`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VisualExtent {
    pub mode: VisualMode,
    pub lines: usize,
    /// Width in chars (charwise single line and block) or the end column
    /// (charwise over several lines).
    pub cols: usize,
    pub to_eol: bool,
}

/// Text of the last changed line before its first change, for `U`.
#[derive(Debug, Clone)]
pub(crate) struct LineUndo {
    pub line: usize,
    pub text: String,
}

pub struct Engine {
    pub(crate) queue: InputQueue,
    pub(crate) parser: Parser,
    pub(crate) state: EngineState,
    pub(crate) oap: OperatorDescriptor,
    pub(crate) last_find: Option<FindState>,
    pub(crate) last_search: Option<SearchState>,
    pub(crate) last_visual: Option<VisualMemory>,
    pub(crate) visual_extent: Option<VisualExtent>,
    /// Register of the last `@x`, for `@@`.
    pub(crate) last_executed: Option<char>,
    /// Lines `Ctrl-D` / `Ctrl-U` scroll; 0 means half the viewport.
    pub(crate) scroll_amount: usize,
    pub(crate) line_undo: Option<LineUndo>,
    running: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&Options::default())
    }
}

impl Engine {
    pub fn new(options: &Options) -> Self {
        Self {
            queue: InputQueue::new(options.limits.max_stuff_len),
            parser: Parser::new(),
            state: EngineState::Normal,
            oap: OperatorDescriptor::default(),
            last_find: None,
            last_search: None,
            last_visual: None,
            visual_extent: None,
            last_executed: None,
            scroll_amount: 0,
            line_undo: None,
            running: false,
        }
    }

    /// Process one host char and everything it makes readable.
    pub fn feed(&mut self, model: &mut EditorModel, c: char) -> Effect {
        self.queue.feed(c);
        self.run(model)
    }

    /// Process a host key event. Chords with no engine encoding ring.
    pub fn feed_key(&mut self, model: &mut EditorModel, key: KeyEvent) -> Effect {
        match key.to_char() {
            Some(c) => self.feed(model, c),
            None => {
                debug!(target: "actions.engine", %key, "unmapped_key");
                model.state.status.bell();
                Effect::none()
            }
        }
    }

    /// Feed several chars as if typed one after another.
    pub fn feed_keys(&mut self, model: &mut EditorModel, keys: &[char]) -> Effect {
        let mut effect = Effect::none();
        for &c in keys {
            effect.merge(self.feed(model, c));
        }
        effect
    }

    pub fn pending_operator(&self) -> Option<OpKind> {
        self.oap.op
    }

    pub fn redo_log(&self) -> &str {
        self.queue.redo_log()
    }

    pub fn recording(&self) -> Option<char> {
        self.queue.recording()
    }

    pub fn visual(&self) -> Option<VisualState> {
        match &self.state {
            EngineState::Visual(v) => Some(*v),
            _ => None,
        }
    }

    /// True when no command, operator, Insert session or command line is in
    /// progress.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, EngineState::Normal) && self.parser.is_idle() && !self.oap.pending()
    }

    fn run(&mut self, model: &mut EditorModel) -> Effect {
        let mut effect = Effect::none();
        // Still set only when an earlier `feed` unwound out of a handler (a
        // host that catches panics). The half-finished command is dropped
        // and the new key is read from a clean Normal state.
        if self.running {
            effect.merge(self.fail(model, EngineError::Invariant("interrupted dispatch".into())));
        }
        self.running = true;
        self.queue.begin_run();
        loop {
            if self.at_command_boundary() {
                self.queue.mark_command_start();
            }
            let Some(c) = self.queue.next_char() else {
                break;
            };
            effect.merge(self.process(model, c));
        }
        self.running = false;
        effect
    }

    fn at_command_boundary(&self) -> bool {
        matches!(self.state, EngineState::Normal | EngineState::Visual(_))
            && self.parser.is_idle()
            && !self.oap.pending()
    }

    fn process(&mut self, model: &mut EditorModel, c: char) -> Effect {
        let before = model.state.mode;
        trace!(target: "actions.engine", key = %display_char(c), source = ?self.queue.last_source(), "key");
        let mut effect = match self.dispatch_char(model, c) {
            Ok(effect) => effect,
            Err(err) => self.fail(model, err),
        };
        self.sync(model);
        if model.state.mode != before {
            effect.mode_changed = true;
        }
        effect
    }

    fn dispatch_char(&mut self, model: &mut EditorModel, c: char) -> EngineResult {
        match std::mem::replace(&mut self.state, EngineState::Normal) {
            EngineState::Insert(mut session) => match self.insert_key(model, &mut session, c) {
                Ok(InsertFlow::Continue(effect)) => {
                    self.state = EngineState::Insert(session);
                    Ok(effect)
                }
                Ok(InsertFlow::Leave(effect)) => Ok(effect),
                Err(err) => {
                    self.state = EngineState::Insert(session);
                    Err(err)
                }
            },
            EngineState::LineEntry(entry) => self.line_entry_key(model, entry, c),
            other => {
                self.state = other;
                let ctx = ParseContext {
                    pending_op: self.oap.pending().then_some(self.oap.keys),
                    visual: matches!(self.state, EngineState::Visual(_)),
                    recording: self.queue.recording().is_some(),
                };
                match self.parser.step(c, ctx) {
                    Step::NeedMore => Ok(Effect::none()),
                    Step::Complete(cmd) => self.execute(model, cmd),
                }
            }
        }
    }

    /// The error boundary.
    pub(crate) fn fail(&mut self, model: &mut EditorModel, err: EngineError) -> Effect {
        let kind = err.kind();
        match kind {
            ErrorKind::Invariant => error!(target: "actions.engine", error = %err, "invariant_violation"),
            ErrorKind::Capacity => warn!(target: "actions.engine", error = %err, "capacity_exceeded"),
            ErrorKind::Unsupported => debug!(target: "actions.engine", error = %err, "unsupported_command"),
            ErrorKind::User => trace!(target: "actions.engine", error = %err, "command_failed"),
        }
        let msg = err.to_string();
        if !msg.is_empty() {
            model.state.status.message(msg);
        }
        model.state.status.bell();
        self.oap.clear();
        self.parser.reset();
        let keep_visual = !matches!(kind, ErrorKind::Invariant | ErrorKind::Capacity);
        match std::mem::replace(&mut self.state, EngineState::Normal) {
            EngineState::Insert(session) => self.abort_insert(model, session),
            EngineState::Visual(v) if keep_visual => self.state = EngineState::Visual(v),
            _ => {}
        }
        model.state.undo.close_all(model.doc.as_ref());
        if kind == ErrorKind::Capacity {
            self.queue.flush_all();
        } else {
            self.queue.flush_stuff();
        }
        self.clamp_cursor(model);
        Effect::moved()
    }

    /// Publish mode, partial-command echo and command-line text.
    fn sync(&mut self, model: &mut EditorModel) {
        let mode = match &self.state {
            EngineState::Normal if self.oap.pending() => Mode::OperatorPending,
            EngineState::Normal => Mode::Normal,
            EngineState::Insert(s) => s.kind.mode(),
            EngineState::Visual(v) => Mode::Visual(v.mode),
            EngineState::LineEntry(_) => Mode::CommandLine,
        };
        model.state.set_mode(mode);
        let status = &mut model.state.status;
        status.pending.clear();
        if self.oap.pending() {
            status.pending.push_str(self.oap.keys);
        }
        status.pending.extend(self.parser.typed().chars().map(display_char));
        status.command_line = match &self.state {
            EngineState::LineEntry(entry) => Some(entry.display()),
            _ => None,
        };
        model.view.auto_scroll(0);
    }

    /// Clamp the cursor for the current state (Insert may sit on the newline).
    pub(crate) fn clamp_cursor(&self, model: &mut EditorModel) {
        let past_end = matches!(self.state, EngineState::Insert(_));
        let cur = model.view.cursor;
        model.set_cursor(cur, past_end);
    }

    /// Remember `line` for `U` unless the remembered change is already on it.
    pub(crate) fn remember_line(&mut self, model: &EditorModel, line: usize) {
        if self.line_undo.as_ref().is_none_or(|u| u.line != line) {
            self.line_undo = Some(LineUndo {
                line,
                text: model.line(line),
            });
        }
    }

    /// Open an undo group for a change starting at the cursor.
    pub(crate) fn begin_change_group(&mut self, model: &mut EditorModel) {
        let cursor = model.view.cursor;
        self.remember_line(model, cursor.line);
        model.state.undo.begin_group(model.doc.as_ref(), cursor);
    }

    /// Run `f` inside one undo group; the group is closed on every exit path.
    pub(crate) fn with_undo_group<T>(
        &mut self,
        model: &mut EditorModel,
        f: impl FnOnce(&mut Self, &mut EditorModel) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let lines = model.doc.line_count();
        self.begin_change_group(model);
        let result = f(self, model);
        model.state.undo.end_group(model.doc.as_ref());
        // `U` only restores a line that is still where it was
        if model.doc.line_count() != lines {
            self.line_undo = None;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::parse_notation;

    fn run(text: &str, keys: &str) -> (Engine, EditorModel) {
        let mut model = EditorModel::from_text(text);
        let mut engine = Engine::default();
        engine.feed_keys(&mut model, &parse_notation(keys).unwrap());
        (engine, model)
    }

    #[test]
    fn boundary_reports_one_bell_and_clears_operator() {
        let (engine, model) = run("abc", "dQ");
        assert_eq!(model.state.status.bells(), 1);
        assert!(engine.pending_operator().is_none());
        assert_eq!(model.state.mode, Mode::Normal);
        assert_eq!(model.text(), "abc\n");
    }

    #[test]
    fn operator_pending_mode_and_echo() {
        let (engine, model) = run("abc", "2d");
        assert_eq!(engine.pending_operator(), Some(OpKind::Delete));
        assert_eq!(model.state.mode, Mode::OperatorPending);
        assert_eq!(model.state.status.pending, "d");
    }

    #[test]
    fn partial_command_echo_shows_register_and_count() {
        let (_, model) = run("abc", "\"a3");
        assert_eq!(model.state.status.pending, "\"a3");
    }

    #[test]
    fn failed_command_closes_undo_groups() {
        let (_, model) = run("abc", "ix<C-o>");
        assert_eq!(model.state.undo.depth(), 0);
        assert_eq!(model.state.mode, Mode::Normal);
        assert_eq!(model.state.status.last_message(), Some("Not supported: i_CTRL-O"));
    }

    #[test]
    fn host_key_events_feed_engine_chars() {
        use core_events::{KeyCode, KeyModifiers};
        let mut model = EditorModel::from_text("abc def");
        let mut engine = Engine::default();
        engine.feed_key(&mut model, KeyEvent::plain('d'));
        engine.feed_key(&mut model, KeyEvent::plain('w'));
        assert_eq!(model.text(), "def\n");
        engine.feed_key(&mut model, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::ALT));
        assert_eq!(model.state.status.bells(), 1);
        engine.feed_key(&mut model, KeyEvent::new(KeyCode::Insert, KeyModifiers::empty()));
        engine.feed_key(&mut model, KeyEvent::plain('x'));
        engine.feed_key(&mut model, KeyEvent::new(KeyCode::Esc, KeyModifiers::empty()));
        assert_eq!(model.text(), "xdef\n");
    }

    #[test]
    fn interrupted_feed_is_recovered_on_next_key() {
        let mut model = EditorModel::from_text("abc def");
        let mut engine = Engine::default();
        engine.feed(&mut model, 'd');
        assert_eq!(engine.pending_operator(), Some(OpKind::Delete));
        // as left behind by a handler that panicked mid-run
        engine.running = true;
        engine.feed(&mut model, 'w');
        assert_eq!(model.text(), "abc def\n");
        assert_eq!(model.cursor(), Position::new(0, 4));
        assert_eq!(model.state.status.last_message(), Some("Internal error: interrupted dispatch"));
        assert!(!engine.running);
        assert!(engine.is_idle());
    }

    #[test]
    fn idle_after_complete_command() {
        let (engine, _) = run("abc def", "w");
        assert!(engine.is_idle());
    }
}
