//! Commands typed while a selection is active.
//!
//! Motions move the free end; operators act on the selection at once and
//! end Visual mode. The selection is turned into an operator region
//! (charwise inclusive, linewise, or block with char columns) and run
//! through the same path as an operator after a motion. Redo records the
//! operator behind a reselect key that re-applies the size of the
//! selection at the cursor.

use super::mode::visual_mode_of;
use crate::command_table::HandlerKind;
use crate::engine::{Engine, EngineState, VisualExtent, VisualMemory, VisualState};
use crate::error::{Effect, EngineError, EngineResult};
use crate::op_resolver::{BlockCols, MotionKind, OpKind, Region, resolve};
use crate::parser::Command;
use crate::text_object;
use core_events::keys;
use core_model::{CURSWANT_EOL, EditorModel};
use core_state::VisualMode;
use core_text::Position;
use tracing::debug;

/// How a Visual command acts on the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisualOp {
    Op(OpKind),
    /// Uppercase form: whole lines, or to end of line in block mode.
    Lines(OpKind),
    Put { keep_unnamed: bool },
}

fn visual_op_of(cmd: &Command) -> Option<VisualOp> {
    use VisualOp::{Lines, Op};
    Some(match cmd.name() {
        "x" | "d" | "\u{E006}" => Op(OpKind::Delete),
        "X" | "D" => Lines(OpKind::Delete),
        "y" => Op(OpKind::Yank),
        "Y" => Lines(OpKind::Yank),
        "c" | "s" => Op(OpKind::Change),
        "C" | "S" | "R" => Lines(OpKind::Change),
        "r" => Op(OpKind::Replace),
        "J" => Op(OpKind::Join),
        "gJ" => Op(OpKind::JoinNoSpace),
        "~" => Op(OpKind::Tilde),
        "u" => Op(OpKind::Lower),
        "U" => Op(OpKind::Upper),
        ":" => Op(OpKind::Colon),
        "p" => VisualOp::Put { keep_unnamed: false },
        "P" => VisualOp::Put { keep_unnamed: true },
        _ => return cmd.entry.and_then(|e| e.operator()).map(Op),
    })
}

impl Engine {
    pub(crate) fn visual_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let EngineState::Visual(v) = self.state else {
            return Err(EngineError::Invariant("visual command outside Visual mode".into()));
        };
        let name = cmd.name();
        if let Some(mode) = visual_mode_of(name) {
            if mode == v.mode {
                self.end_visual(model);
            } else {
                self.state = EngineState::Visual(VisualState { mode, ..v });
            }
            return Ok(Effect::mode());
        }
        match name {
            "o" => return Ok(self.swap_ends(model, v, false)),
            "O" => return Ok(self.swap_ends(model, v, v.mode == VisualMode::Block)),
            "gv" => return self.exchange_with_last(model, v),
            "I" | "A" => return self.visual_insert(model, cmd, v),
            _ => {}
        }
        if let Some(op) = visual_op_of(cmd) {
            if op == VisualOp::Op(OpKind::Replace) && cmd.arg == Some(keys::ESC) {
                self.end_visual(model);
                return Ok(Effect::mode());
            }
            return self.visual_operator(model, cmd, op);
        }
        match cmd.kind() {
            Some(HandlerKind::Motion) => self.motion_command(model, cmd),
            Some(HandlerKind::Object) => self.visual_object(model, cmd, v),
            Some(HandlerKind::Unsupported) => Err(EngineError::unsupported(super::describe(&cmd.keys))),
            _ => match name {
                "\x05" | "\x19" | "\x04" | "\x15" | "\x06" | "\x02" | "zt" | "zz" | "zb" | "z\r" | "z." | "z-" => {
                    self.scroll_command(model, cmd)
                }
                "\x07" | "\x0c" => self.direct_command(model, cmd),
                _ => Err(EngineError::InvalidCommand),
            },
        }
    }

    /// Leave Visual mode, remembering the selection for `gv` and setting
    /// the `'<` `'>` marks.
    pub(crate) fn end_visual(&mut self, model: &mut EditorModel) {
        let EngineState::Visual(v) = self.state else {
            return;
        };
        let cursor = model.view.cursor;
        let (start, end) = ordered(v.anchor, cursor);
        // marks cannot fail for these names
        let _ = model.state.marks.set('<', start);
        let _ = model.state.marks.set('>', end);
        self.last_visual = Some(VisualMemory {
            mode: v.mode,
            anchor: v.anchor,
            cursor,
            to_eol: !model.view.set_curswant && model.view.curswant == CURSWANT_EOL,
        });
        self.state = EngineState::Normal;
        debug!(target: "actions.dispatch", mode = ?v.mode, ?start, ?end, "visual_end");
    }

    fn swap_ends(&mut self, model: &mut EditorModel, v: VisualState, same_line: bool) -> Effect {
        let cur = model.view.cursor;
        let (anchor, cursor) = if same_line {
            (Position::new(v.anchor.line, cur.col), Position::new(cur.line, v.anchor.col))
        } else {
            (cur, v.anchor)
        };
        self.state = EngineState::Visual(VisualState { anchor, ..v });
        model.set_cursor(cursor, false);
        model.view.set_curswant = true;
        Effect::moved()
    }

    /// `gv` inside Visual mode: swap the current and the previous selection.
    fn exchange_with_last(&mut self, model: &mut EditorModel, v: VisualState) -> EngineResult {
        let last = self.last_visual.ok_or(EngineError::InvalidCommand)?;
        self.last_visual = Some(VisualMemory {
            mode: v.mode,
            anchor: v.anchor,
            cursor: model.view.cursor,
            to_eol: false,
        });
        self.state = EngineState::Visual(VisualState {
            mode: last.mode,
            anchor: last.anchor,
        });
        model.set_cursor(last.cursor, false);
        model.view.set_curswant = true;
        Ok(Effect::moved())
    }

    /// `iw`, `a(` ... in Visual mode: select the object (extending a
    /// selection that is more than one char).
    fn visual_object(&mut self, model: &mut EditorModel, cmd: &Command, v: VisualState) -> EngineResult {
        let obj = cmd.arg.ok_or(EngineError::InvalidCommand)?;
        let around = cmd.cmdchar == 'a';
        let cur = model.view.cursor;
        let region = text_object::select(model.doc.as_ref(), cur, obj, around, cmd.count1())
            .ok_or(EngineError::InvalidCommand)?;
        let mut end = region.end;
        if region.kind == MotionKind::Char && !region.inclusive {
            if end.col > 0 {
                end.col -= 1;
            } else if end.line > region.start.line {
                end.line -= 1;
                end.col = model.doc.line_len(end.line).saturating_sub(1);
            }
        }
        let anchor = if v.anchor == cur { region.start } else { v.anchor.min(region.start) };
        let mode = if region.kind == MotionKind::Line && v.mode == VisualMode::Char {
            VisualMode::Line
        } else {
            v.mode
        };
        self.state = EngineState::Visual(VisualState { mode, anchor });
        model.set_cursor(end, false);
        model.view.set_curswant = true;
        Ok(Effect::moved())
    }

    /// Turn the selection into a resolved operator descriptor and leave
    /// Visual mode.
    fn take_selection(&mut self, model: &mut EditorModel, cmd: &Command, op: OpKind, lines: bool) -> Result<(), EngineError> {
        let EngineState::Visual(v) = self.state else {
            return Err(EngineError::Invariant("no selection".into()));
        };
        let cursor = model.view.cursor;
        let (start, end) = ordered(v.anchor, cursor);
        let eol_wanted = !model.view.set_curswant && model.view.curswant == CURSWANT_EOL;
        let mode = if lines && v.mode != VisualMode::Block {
            VisualMode::Line
        } else {
            v.mode
        };
        let to_eol = mode == VisualMode::Block && (eol_wanted || lines);
        let cols = BlockCols {
            start: v.anchor.col.min(cursor.col),
            end: v.anchor.col.max(cursor.col),
            to_eol,
        };
        let line_count = end.line - start.line + 1;
        self.visual_extent = Some(VisualExtent {
            mode,
            lines: line_count,
            cols: match mode {
                VisualMode::Char if line_count == 1 => end.col - start.col + 1,
                VisualMode::Char => end.col,
                VisualMode::Block => cols.width(),
                VisualMode::Line => 0,
            },
            to_eol: to_eol || eol_wanted,
        });
        self.end_visual(model);
        let region = match mode {
            VisualMode::Char => Region::charwise(start, end, true),
            VisualMode::Line => Region::linewise(start, end),
            VisualMode::Block => Region {
                start: Position::new(start.line, cols.start),
                end: Position::new(end.line, cols.end),
                kind: MotionKind::Block,
                inclusive: true,
            },
        };
        self.oap.begin(op, cmd.name(), cmd.count0, cmd.register);
        self.oap.is_visual = true;
        self.oap.arg = cmd.arg;
        if mode == VisualMode::Block {
            self.oap.block = Some(cols);
        }
        resolve(&mut self.oap, model.doc.as_ref(), region);
        if op.is_line_only() && self.oap.motion == MotionKind::Char {
            self.oap.motion = MotionKind::Line;
        }
        Ok(())
    }

    fn record_visual_redo(&mut self, cmd: &Command) {
        self.queue.reset_redo_log();
        self.queue.append_redo(keys::VISUAL_REPEAT);
        if let Some(reg) = cmd.register {
            self.queue.append_redo('"');
            self.queue.append_redo(reg);
        }
        self.queue.append_redo_number(cmd.count0);
        self.queue.append_redo_str(&cmd.keys);
    }

    fn visual_operator(&mut self, model: &mut EditorModel, cmd: &Command, op: VisualOp) -> EngineResult {
        let (kind, lines) = match op {
            VisualOp::Op(kind) => (kind, false),
            VisualOp::Lines(kind) => (kind, true),
            VisualOp::Put { .. } => (OpKind::Delete, false),
        };
        self.take_selection(model, cmd, kind, lines)?;
        if !kind.is_read_only() {
            self.record_visual_redo(cmd);
        }
        let effect = if let VisualOp::Put { keep_unnamed } = op {
            let oap = std::mem::take(&mut self.oap);
            self.visual_put(model, &oap, cmd.count1(), keep_unnamed)?
        } else {
            self.run_operator(model)?
        };
        Ok(effect.with(Effect::mode()))
    }

    /// `I` / `A`: block insert on a block selection; on other selections
    /// Insert before the start or after the end.
    fn visual_insert(&mut self, model: &mut EditorModel, cmd: &Command, v: VisualState) -> EngineResult {
        let append = cmd.name() == "A";
        if v.mode == VisualMode::Block {
            let op = if append { OpKind::AppendCol } else { OpKind::InsertCol };
            self.take_selection(model, cmd, op, false)?;
            self.record_visual_redo(cmd);
            return Ok(self.run_operator(model)?.with(Effect::mode()));
        }
        let (start, end) = ordered(v.anchor, model.view.cursor);
        self.end_visual(model);
        let (pos, keys) = match (v.mode, append) {
            (VisualMode::Line, false) => (Position::new(start.line, 0), "gI"),
            (VisualMode::Line, true) => (Position::new(end.line, 0), "A"),
            (_, false) => (start, "i"),
            (_, true) => (end, "a"),
        };
        model.set_cursor(pos, false);
        self.queue.stuff_front(keys)?;
        Ok(Effect::mode())
    }
}

fn ordered(a: Position, b: Position) -> (Position, Position) {
    if a <= b { (a, b) } else { (b, a) }
}
