//! Mode entry from Normal: Insert entry commands, Visual entry and `gv`,
//! the `:` command line, and Escape.

use crate::engine::{Engine, EngineState, VisualState};
use crate::error::{Effect, EngineError, EngineResult};
use crate::insert::{InsertKind, InsertStart};
use crate::parser::Command;
use core_model::{CURSWANT_EOL, EditorModel};
use core_state::VisualMode;
use core_text::Position;
use core_text::chars::{first_non_blank, is_blank};
use tracing::debug;

pub(crate) fn visual_mode_of(name: &str) -> Option<VisualMode> {
    match name {
        "v" => Some(VisualMode::Char),
        "V" => Some(VisualMode::Line),
        "\x16" => Some(VisualMode::Block),
        _ => None,
    }
}

impl Engine {
    /// Escape in Normal, Operator-pending and Visual mode. A bare Escape in
    /// Normal mode only rings the bell; after a count or register it is
    /// silent.
    pub(crate) fn escape(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        if matches!(self.state, EngineState::Visual(_)) {
            self.end_visual(model);
            return Ok(Effect::mode());
        }
        if self.oap.pending() {
            self.oap.clear();
            return Ok(Effect::mode());
        }
        if cmd.count0 == 0 && cmd.register.is_none() {
            model.state.status.bell();
        }
        Ok(Effect::none())
    }

    /// Direct commands that change mode.
    pub(crate) fn mode_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let name = cmd.name();
        if let Some(mode) = visual_mode_of(name) {
            return self.start_visual(model, mode, cmd.count0);
        }
        match name {
            "gv" => self.reselect_visual(model),
            ":" => self.start_command_line(cmd.count0, false),
            "\u{E00A}" => self.repeat_visual_extent(model),
            other => Err(EngineError::Invariant(format!("no handler for {}", other.escape_debug()))),
        }
    }

    /// `v` `V` `Ctrl-V` from Normal. A count extends the selection over
    /// that many chars (lines for `V`).
    fn start_visual(&mut self, model: &mut EditorModel, mode: VisualMode, count: usize) -> EngineResult {
        let anchor = model.view.cursor;
        self.state = EngineState::Visual(VisualState { mode, anchor });
        if count > 1 {
            let target = match mode {
                VisualMode::Line => Position::new(anchor.line + count - 1, anchor.col),
                _ => Position::new(anchor.line, anchor.col + count - 1),
            };
            model.set_cursor(target, false);
            model.view.set_curswant = true;
        }
        debug!(target: "actions.dispatch", ?mode, anchor = ?anchor, "visual_start");
        Ok(Effect::mode())
    }

    /// `gv` from Normal: select the last selection again.
    fn reselect_visual(&mut self, model: &mut EditorModel) -> EngineResult {
        let last = self.last_visual.ok_or(EngineError::InvalidCommand)?;
        let lines = model.doc.line_count();
        let mut anchor = last.anchor;
        anchor.clamp_to(lines, |l| model.doc.line_len(l).saturating_sub(1));
        self.state = EngineState::Visual(VisualState { mode: last.mode, anchor });
        model.set_cursor(last.cursor, false);
        if last.to_eol {
            model.view.curswant = CURSWANT_EOL;
            model.view.set_curswant = false;
        } else {
            model.view.set_curswant = true;
        }
        Ok(Effect::mode())
    }

    /// Redo of a Visual operation: select an area of the last operated size
    /// at the cursor; the operator keys follow in the replayed text.
    fn repeat_visual_extent(&mut self, model: &mut EditorModel) -> EngineResult {
        let extent = self.visual_extent.ok_or(EngineError::InvalidCommand)?;
        let anchor = model.view.cursor;
        let last_line = (anchor.line + extent.lines.max(1) - 1).min(model.doc.last_line());
        let end = match extent.mode {
            VisualMode::Char if extent.lines <= 1 => Position::new(anchor.line, anchor.col + extent.cols.max(1) - 1),
            VisualMode::Char => Position::new(last_line, extent.cols),
            VisualMode::Line => Position::new(last_line, anchor.col),
            VisualMode::Block => Position::new(last_line, anchor.col + extent.cols.max(1) - 1),
        };
        self.state = EngineState::Visual(VisualState {
            mode: extent.mode,
            anchor,
        });
        model.set_cursor(end, false);
        if extent.to_eol {
            model.view.curswant = CURSWANT_EOL;
            model.view.set_curswant = false;
        }
        Ok(Effect::mode())
    }

    /// `i a I A o O R gR gI <Insert>`.
    pub(crate) fn insert_entry(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let name = cmd.name();
        let cur = model.view.cursor;
        let len = model.doc.line_len(cur.line);
        let kind = match name {
            "R" => InsertKind::Replace,
            "gR" => InsertKind::VirtualReplace,
            _ => InsertKind::Insert,
        };
        match name {
            "a" if len > 0 => model.set_cursor(Position::new(cur.line, cur.col + 1), true),
            "A" => model.set_cursor(Position::new(cur.line, len), true),
            "I" => {
                let col = first_non_blank(&model.line(cur.line));
                model.set_cursor(Position::new(cur.line, col), true);
            }
            "gI" => model.set_cursor(Position::new(cur.line, 0), true),
            _ => {}
        }
        let cmdchar = if name == "\u{E007}" { 'i' } else { cmd.cmdchar };
        let mut effect = self.begin_insert(
            model,
            InsertStart {
                cmdchar,
                count: cmd.count1(),
                kind,
                block: None,
            },
        )?;
        self.queue.reset_redo_log();
        self.queue.append_redo_number(cmd.count0);
        self.queue.append_redo_str(if name == "\u{E007}" { "i" } else { &cmd.keys });
        if name == "o" || name == "O" {
            let pos = self.open_line(model, name == "o");
            self.reanchor_insert(pos, model.options.edit.autoindent);
            effect.merge(Effect::structural());
        }
        model.view.set_curswant = true;
        Ok(effect)
    }

    /// Open a new line below (or above) the cursor line, indented like it
    /// with `autoindent`. Returns the insert position on the new line.
    fn open_line(&mut self, model: &mut EditorModel, below: bool) -> Position {
        let line = model.view.cursor.line;
        let indent: String = if model.options.edit.autoindent {
            model.line(line).chars().take_while(|c| is_blank(*c)).collect()
        } else {
            String::new()
        };
        let width = indent.chars().count();
        let pos = if below {
            let at = model.doc.line_start(line) + model.doc.line_len(line);
            model.doc.insert(at, &format!("\n{indent}"));
            model.state.marks.adjust_lines(line + 1, 0, 1);
            Position::new(line + 1, width)
        } else {
            let at = model.doc.line_start(line);
            model.doc.insert(at, &format!("{indent}\n"));
            model.state.marks.adjust_lines(line, 0, 1);
            Position::new(line, width)
        };
        model.set_cursor(pos, true);
        pos
    }
}
