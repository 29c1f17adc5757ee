//! Operators: applying a resolved region.
//!
//! [`Engine::apply_operator`] is the single entry for every operator,
//! whether the region came from a motion, a text object, the doubled
//! linewise form or a Visual selection. It records the redo keys, clears the
//! pending state and runs the operator inside one undo group. Change and
//! the block Insert operators keep their group open into the Insert
//! session they start.

use crate::engine::Engine;
use crate::error::{Effect, EngineError, EngineResult};
use crate::op_resolver::{MotionKind, OpKind, OperatorDescriptor, Region, resolve};
use core_model::{ColonRequest, EditorModel, OpFlags};
use core_text::motion::first_non_blank_pos;
use tracing::{debug, trace};

mod block;
mod case;
mod delete;
mod lines;
mod put;

pub(crate) use lines::{join_lines, shifted_width};

/// Ex range text naming the operated lines, relative to the cursor once it
/// has moved to the first of them.
pub(crate) fn line_range(oap: &OperatorDescriptor) -> String {
    if oap.is_visual {
        return "'<,'>".to_string();
    }
    match oap.line_count {
        0 | 1 => ".".to_string(),
        n => format!(".,.+{}", n - 1),
    }
}

impl Engine {
    /// Complete the pending operator over `region`.
    pub(crate) fn apply_operator(
        &mut self,
        model: &mut EditorModel,
        region: Region,
        motion_keys: &str,
        count: usize,
    ) -> EngineResult {
        let op = self
            .oap
            .op
            .ok_or_else(|| EngineError::Invariant("operator applied with none pending".into()))?;
        resolve(&mut self.oap, model.doc.as_ref(), region);
        if op.is_line_only() && self.oap.motion == MotionKind::Char {
            self.oap.motion = MotionKind::Line;
        }
        if !self.oap.is_visual {
            self.record_operator_redo(model, op, motion_keys, count);
        }
        self.run_operator(model)
    }

    fn record_operator_redo(&mut self, model: &EditorModel, op: OpKind, motion_keys: &str, count: usize) {
        if op.is_read_only() && !(op == OpKind::Yank && model.options.compat.yank_redo) {
            return;
        }
        self.queue.reset_redo_log();
        if let Some(reg) = self.oap.register {
            self.queue.append_redo('"');
            self.queue.append_redo(reg);
        }
        self.queue.append_redo_number(count);
        self.queue.append_redo_str(self.oap.keys);
        self.queue.append_redo_str(motion_keys);
    }

    /// Run the operator described by `self.oap` (already resolved).
    pub(crate) fn run_operator(&mut self, model: &mut EditorModel) -> EngineResult {
        let oap = std::mem::take(&mut self.oap);
        let op = oap
            .op
            .ok_or_else(|| EngineError::Invariant("operator run with none pending".into()))?;
        if oap.empty && !op.allows_empty() {
            if model.options.compat.empty_region_error {
                return Err(EngineError::InvalidCommand);
            }
            trace!(target: "actions.operator", ?op, "empty_region");
            return Ok(Effect::mode());
        }
        debug!(target: "actions.operator", ?op, start = ?oap.start, end = ?oap.end, motion = ?oap.motion, visual = oap.is_visual, "apply");
        let effect = match op {
            OpKind::Delete => self.with_undo_group(model, |e, m| e.op_delete(m, &oap))?,
            OpKind::Yank => self.op_yank(model, &oap)?,
            OpKind::Change => self.op_change(model, &oap)?,
            OpKind::ShiftLeft | OpKind::ShiftRight => {
                self.with_undo_group(model, |e, m| e.op_shift(m, &oap, op == OpKind::ShiftLeft))?
            }
            OpKind::Tilde | OpKind::Upper | OpKind::Lower | OpKind::Rot13 => {
                self.with_undo_group(model, |e, m| e.op_case(m, &oap, op))?
            }
            OpKind::Join | OpKind::JoinNoSpace => {
                self.with_undo_group(model, |e, m| e.op_join(m, &oap, op == OpKind::Join))?
            }
            OpKind::Replace => self.with_undo_group(model, |e, m| e.op_replace(m, &oap))?,
            OpKind::Filter => {
                model.view.cursor = first_non_blank_pos(model.doc.as_ref(), oap.start.line);
                self.start_filter_entry(&line_range(&oap), oap.is_visual)?
            }
            OpKind::Indent | OpKind::Format => {
                let mut flags = if op == OpKind::Indent {
                    OpFlags::INDENT
                } else {
                    OpFlags::FORMAT
                };
                flags.set(OpFlags::FROM_VISUAL, oap.is_visual);
                model.view.cursor = first_non_blank_pos(model.doc.as_ref(), oap.start.line);
                let effect = self.run_colon(model, ColonRequest::new(line_range(&oap), flags))?;
                model.view.cursor = first_non_blank_pos(model.doc.as_ref(), oap.start.line);
                effect
            }
            OpKind::Colon => self.start_command_line(0, true)?,
            OpKind::InsertCol | OpKind::AppendCol => self.op_block_insert(model, &oap, op == OpKind::AppendCol)?,
        };
        Ok(effect.with(Effect::mode()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Position;

    #[test]
    fn ranges_for_line_counts() {
        let mut oap = OperatorDescriptor::default();
        oap.start = Position::new(4, 0);
        oap.end = Position::new(4, 0);
        oap.line_count = 1;
        assert_eq!(line_range(&oap), ".");
        oap.line_count = 3;
        assert_eq!(line_range(&oap), ".,.+2");
        oap.is_visual = true;
        assert_eq!(line_range(&oap), "'<,'>");
    }
}
