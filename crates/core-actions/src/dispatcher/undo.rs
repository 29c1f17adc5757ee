//! `u` and `Ctrl-R`: delegate to the host's undo manager. `U` restores the
//! last changed line as it was before its first change.
//!
//! Each step restores one whole group, so a change operator followed by its
//! Insert session undoes in one go. The restored cursor comes from the
//! snapshot and is clamped to the restored text.

use crate::engine::Engine;
use crate::error::{Effect, EngineError, EngineResult};
use crate::parser::Command;
use core_model::EditorModel;
use tracing::trace;

impl Engine {
    pub(crate) fn undo_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let redo = cmd.name() != "u";
        let before = model.doc.line_count();
        let mut steps = 0;
        for _ in 0..cmd.count1() {
            let restored = if redo {
                model.state.undo.redo(model.doc.as_mut())
            } else {
                model.state.undo.undo(model.doc.as_mut())
            };
            let Some(pos) = restored else {
                break;
            };
            model.set_cursor(pos, false);
            steps += 1;
        }
        trace!(target: "actions.dispatch", op = if redo { "redo" } else { "undo" }, steps, "undo");
        if steps == 0 {
            let msg = if redo { "Already at newest change" } else { "Already at oldest change" };
            model.state.status.message(msg);
            return Ok(Effect::none());
        }
        model.view.set_curswant = true;
        Ok(if before != model.doc.line_count() {
            Effect::structural()
        } else {
            Effect::dirty()
        })
    }

    /// `U`. The restore is itself a change, so a second `U` puts the line back.
    pub(crate) fn line_undo_command(&mut self, model: &mut EditorModel) -> EngineResult {
        let saved = self.line_undo.take().ok_or(EngineError::InvalidCommand)?;
        if saved.line >= model.doc.line_count() {
            return Err(EngineError::InvalidCommand);
        }
        let cursor = model.view.cursor;
        model.set_cursor(core_text::Position::new(saved.line, cursor.col), false);
        self.with_undo_group(model, |_, model| {
            let start = model.doc.line_start(saved.line);
            let len = model.doc.line_len(saved.line);
            model.doc.replace(start, start + len, &saved.text);
            Ok(())
        })?;
        trace!(target: "actions.dispatch", line = saved.line, "line_undo");
        self.clamp_cursor(model);
        model.view.set_curswant = true;
        Ok(Effect::dirty())
    }
}
