use crate::engine::Engine;
use crate::error::{Effect, EngineResult};
use crate::insert::{BlockInsert, InsertKind, InsertStart};
use crate::op_resolver::{MotionKind, OperatorDescriptor};
use core_model::EditorModel;
use core_state::RegisterContent;
use core_text::chars::{first_non_blank, is_blank};
use core_text::{Position, TextDocument};

/// Char offsets `[start, end)` of whole lines `first..=last`, newline included.
pub(super) fn lines_span(doc: &dyn TextDocument, first: usize, last: usize) -> (usize, usize) {
    let start = doc.line_start(first);
    let end = if last + 1 < doc.line_count() {
        doc.line_start(last + 1)
    } else {
        doc.len_chars()
    };
    (start, end)
}

/// A charwise delete over several lines that leaves only blanks after its
/// end and starts inside the indent works on whole lines.
fn promote_to_lines(model: &EditorModel, oap: &OperatorDescriptor) -> bool {
    if oap.motion != MotionKind::Char || oap.is_visual || oap.line_count < 2 {
        return false;
    }
    let end_line = model.line(oap.end.line);
    let len = end_line.chars().count();
    let after = if oap.end.col < len {
        oap.end.col + usize::from(oap.inclusive)
    } else {
        oap.end.col
    };
    let tail_blank = end_line.chars().skip(after).all(is_blank);
    tail_blank && oap.start.col <= first_non_blank(&model.line(oap.start.line))
}

impl Engine {
    pub(super) fn op_delete(&mut self, model: &mut EditorModel, oap: &OperatorDescriptor) -> EngineResult {
        let motion = if promote_to_lines(model, oap) {
            MotionKind::Line
        } else {
            oap.motion
        };
        match motion {
            MotionKind::Block => self.block_delete(model, oap),
            MotionKind::Line => {
                let first = oap.start.line;
                let (start, end) = lines_span(model.doc.as_ref(), first, oap.end.line);
                let text = model.doc.slice(start, end);
                model
                    .state
                    .registers
                    .write_delete(oap.register, RegisterContent::linewise(text), false)?;
                // the wanted column is taken from the cursor line before it goes
                Self::vertical_target(model, first);
                model.doc.remove(start, end);
                let removed = oap.end.line - first + 1;
                model.state.marks.adjust_lines(first, removed, 0);
                let line = first.min(model.doc.last_line());
                let pos = Self::line_jump_target(model, line);
                model.state.marks.set_changed(pos, pos);
                model.view.cursor = pos;
                if model.options.edit.startofline {
                    model.view.set_curswant = true;
                }
                if removed > 2 {
                    model.state.status.message(format!("{removed} fewer lines"));
                }
                Ok(Effect::structural())
            }
            MotionKind::Char => {
                let (start, end) = oap.char_range(model.doc.as_ref());
                let text = model.doc.slice(start, end);
                let newlines = text.matches('\n').count();
                let small = newlines == 0;
                model
                    .state
                    .registers
                    .write_delete(oap.register, RegisterContent::charwise(text), small)?;
                model.doc.remove(start, end);
                if newlines > 0 {
                    model.state.marks.adjust_lines(oap.start.line + 1, newlines, 0);
                }
                model.state.marks.set_changed(oap.start, oap.start);
                model.set_cursor(oap.start, false);
                model.view.set_curswant = true;
                Ok(if newlines > 0 {
                    Effect::structural()
                } else {
                    Effect::dirty()
                })
            }
        }
    }

    pub(super) fn op_yank(&mut self, model: &mut EditorModel, oap: &OperatorDescriptor) -> EngineResult {
        let doc = model.doc.as_ref();
        let (content, cursor) = match oap.motion {
            MotionKind::Line => {
                let (start, end) = lines_span(doc, oap.start.line, oap.end.line);
                (RegisterContent::linewise(doc.slice(start, end)), oap.start)
            }
            MotionKind::Char => {
                let (start, end) = oap.char_range(doc);
                (RegisterContent::charwise(doc.slice(start, end)), oap.start)
            }
            MotionKind::Block => {
                let rows = self.block_rows(model, oap);
                let col = oap.block.map_or(oap.start.col, |b| b.start);
                (RegisterContent::block(&rows), Position::new(oap.start.line, col))
            }
        };
        model.state.registers.write_yank(oap.register, content)?;
        model.state.marks.set('[', oap.start)?;
        model.state.marks.set(']', oap.end)?;
        let lines = oap.line_count;
        if lines > 2 {
            let msg = if oap.motion == MotionKind::Block {
                format!("block of {lines} lines yanked")
            } else {
                format!("{lines} lines yanked")
            };
            model.state.status.message(msg);
        }
        model.set_cursor(cursor, false);
        model.view.set_curswant = true;
        Ok(Effect::moved())
    }

    /// Delete the region and start Insert in its place. The undo group opened
    /// here stays open through the Insert session.
    pub(super) fn op_change(&mut self, model: &mut EditorModel, oap: &OperatorDescriptor) -> EngineResult {
        self.begin_change_group(model);
        let result = self.change_region(model, oap);
        model.state.undo.end_group(model.doc.as_ref());
        result
    }

    fn change_region(&mut self, model: &mut EditorModel, oap: &OperatorDescriptor) -> EngineResult {
        let mut block = None;
        let mut effect = match oap.motion {
            MotionKind::Line => {
                let first = oap.start.line;
                let first_text = model.line(first);
                let indent: String = if model.options.edit.autoindent {
                    first_text.chars().take_while(|c| is_blank(*c)).collect()
                } else {
                    String::new()
                };
                let (start, end) = lines_span(model.doc.as_ref(), first, oap.end.line);
                let text = model.doc.slice(start, end);
                model
                    .state
                    .registers
                    .write_delete(oap.register, RegisterContent::linewise(text), false)?;
                model.doc.replace(start, end, &format!("{indent}\n"));
                model.state.marks.adjust_lines(first, oap.line_count, 1);
                model.view.cursor = Position::new(first, indent.chars().count());
                Effect::structural()
            }
            MotionKind::Char => {
                let (start, end) = oap.char_range(model.doc.as_ref());
                let text = model.doc.slice(start, end);
                let newlines = text.matches('\n').count();
                model
                    .state
                    .registers
                    .write_delete(oap.register, RegisterContent::charwise(text), newlines == 0)?;
                model.doc.remove(start, end);
                if newlines > 0 {
                    model.state.marks.adjust_lines(oap.start.line + 1, newlines, 0);
                }
                model.set_cursor(oap.start, true);
                Effect::dirty()
            }
            MotionKind::Block => {
                let effect = self.block_delete(model, oap)?;
                if let Some(cols) = oap.block {
                    block = Some(BlockInsert {
                        first_line: oap.start.line,
                        last_line: oap.end.line,
                        col: cols.start,
                        append: false,
                        to_eol: false,
                    });
                    model.set_cursor(Position::new(oap.start.line, cols.start), true);
                }
                effect
            }
        };
        let pos = model.view.cursor;
        model.state.marks.set_changed(pos, pos);
        effect.merge(self.begin_insert(
            model,
            InsertStart {
                cmdchar: 'c',
                count: 1,
                kind: InsertKind::Insert,
                block,
            },
        )?);
        Ok(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;

    #[test]
    fn span_of_last_line_runs_to_end() {
        let doc = Buffer::from_str("t", "a\nb\nc");
        assert_eq!(lines_span(&doc, 0, 0), (0, 2));
        assert_eq!(lines_span(&doc, 1, 2), (2, 6));
    }
}
