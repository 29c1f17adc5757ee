//! `p` `P` `gp` `gP` and put over a Visual selection.

use crate::engine::Engine;
use crate::error::{Effect, EngineError, EngineResult};
use crate::op_resolver::{MotionKind, OperatorDescriptor};
use core_model::EditorModel;
use core_state::{RegisterContent, RegisterKind};
use core_text::Position;
use core_text::motion::first_non_blank_pos;
use tracing::debug;

/// Largest text one put may build, in bytes.
const MAX_PUT_BYTES: usize = 64 << 20;

fn check_put_size(content: &RegisterContent, count: usize) -> Result<(), EngineError> {
    let unit = match content.kind {
        RegisterKind::Block { width } => content.text.len().max(width.saturating_mul(content.rows().len())),
        _ => content.text.len(),
    };
    if unit.saturating_mul(count) > MAX_PUT_BYTES {
        return Err(EngineError::TextTooLong);
    }
    Ok(())
}

fn put_charwise(model: &mut EditorModel, text: &str, at: Position, cursor_after: bool) -> Effect {
    let len = text.chars().count();
    if len == 0 {
        return Effect::none();
    }
    let offset = model.doc.offset_of(at);
    model.doc.insert(offset, text);
    let newlines = text.matches('\n').count();
    if newlines > 0 {
        model.state.marks.adjust_lines(at.line + 1, 0, newlines);
    }
    let last = model.doc.position_of(offset + len - 1);
    model.state.marks.set_changed(at, last);
    if cursor_after {
        let after = model.doc.position_of(offset + len);
        model.set_cursor(after, false);
    } else if newlines > 0 {
        model.set_cursor(at, false);
    } else {
        model.set_cursor(last, false);
    }
    model.view.set_curswant = true;
    if newlines > 0 {
        Effect::structural()
    } else {
        Effect::dirty()
    }
}

/// Insert whole lines so the first of them becomes line `line`.
fn put_linewise(model: &mut EditorModel, text: &str, line: usize, cursor_after: bool) -> Effect {
    let mut text = text.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    let offset = if line >= model.doc.line_count() {
        model.doc.len_chars()
    } else {
        model.doc.line_start(line)
    };
    model.doc.insert(offset, &text);
    let added = text.matches('\n').count();
    model.state.marks.adjust_lines(line, 0, added);
    model
        .state
        .marks
        .set_changed(Position::new(line, 0), Position::new(line + added - 1, 0));
    if cursor_after {
        model.set_cursor(Position::new(line + added, 0), false);
    } else {
        model.view.cursor = first_non_blank_pos(model.doc.as_ref(), line);
    }
    model.view.set_curswant = true;
    Effect::structural()
}

/// Insert block rows at `at`, one per line, padding short lines and rows.
fn put_blockwise(model: &mut EditorModel, content: &RegisterContent, count: usize, at: Position, cursor_after: bool) -> Effect {
    let rows = content.rows();
    let width = match content.kind {
        RegisterKind::Block { width } => width,
        _ => rows.iter().map(|r| r.chars().count()).max().unwrap_or(0),
    };
    let mut structural = false;
    for (i, row) in rows.iter().enumerate() {
        let line = at.line + i;
        if line >= model.doc.line_count() {
            let end = model.doc.len_chars();
            model.doc.insert(end, "\n");
            structural = true;
        }
        let len = model.doc.line_len(line);
        let start = model.doc.line_start(line);
        if len < at.col {
            model.doc.insert(start + len, &" ".repeat(at.col - len));
        }
        let pad = width.saturating_sub(row.chars().count());
        let mut piece = String::new();
        for _ in 0..count {
            piece.push_str(row);
            piece.push_str(&" ".repeat(pad));
        }
        if at.col >= len {
            piece.truncate(piece.trim_end_matches(' ').len());
        }
        model.doc.insert(start + at.col, &piece);
    }
    let last_line = at.line + rows.len().saturating_sub(1);
    let right = at.col + width * count;
    model
        .state
        .marks
        .set_changed(at, Position::new(last_line, right.saturating_sub(1)));
    if cursor_after {
        model.set_cursor(Position::new(last_line, right), false);
    } else {
        model.set_cursor(at, false);
    }
    model.view.set_curswant = true;
    if structural {
        Effect::structural()
    } else {
        Effect::dirty()
    }
}

impl Engine {
    /// Put `count` copies of a register at the cursor.
    pub(crate) fn put(
        &mut self,
        model: &mut EditorModel,
        register: Option<char>,
        count: usize,
        before: bool,
        cursor_after: bool,
    ) -> EngineResult {
        let name = register.unwrap_or('"');
        let content = model.state.registers.get(name)?;
        let count = count.max(1);
        check_put_size(&content, count)?;
        let cur = model.view.cursor;
        debug!(target: "actions.operator", register = %name, kind = ?content.kind, count, before, "put");
        let effect = self.with_undo_group(model, |_, model| {
            Ok(match content.kind {
                RegisterKind::Char => {
                    let len = model.doc.line_len(cur.line);
                    let col = if before || len == 0 { cur.col } else { (cur.col + 1).min(len) };
                    put_charwise(model, &content.text.repeat(count), Position::new(cur.line, col), cursor_after)
                }
                RegisterKind::Line => {
                    let line = if before { cur.line } else { cur.line + 1 };
                    put_linewise(model, &content.text.repeat(count), line, cursor_after)
                }
                RegisterKind::Block { .. } => {
                    let len = model.doc.line_len(cur.line);
                    let col = if before || len == 0 { cur.col } else { cur.col + 1 };
                    put_blockwise(model, &content, count, Position::new(cur.line, col), cursor_after)
                }
            })
        })?;
        Ok(effect)
    }

    /// `p` or `P` over a selection: the selection is deleted (into the
    /// unnamed register for `p`, discarded for `P`) and the register put in
    /// its place.
    pub(crate) fn visual_put(
        &mut self,
        model: &mut EditorModel,
        oap: &OperatorDescriptor,
        count: usize,
        keep_unnamed: bool,
    ) -> EngineResult {
        let name = oap.register.unwrap_or('"');
        let content = model.state.registers.get(name)?;
        let count = count.max(1);
        check_put_size(&content, count)?;
        let mut selection = oap.clone();
        selection.register = keep_unnamed.then_some('_');
        self.with_undo_group(model, |engine, model| {
            let mut effect = engine.op_delete(model, &selection)?;
            let start = selection.start;
            effect.merge(match (selection.motion, content.kind) {
                (_, RegisterKind::Block { .. }) | (MotionKind::Block, _) => {
                    let col = selection.block.map_or(start.col, |b| b.start);
                    put_blockwise(model, &content, count, Position::new(start.line, col), false)
                }
                (MotionKind::Line, _) => {
                    let text = RegisterContent::linewise(content.text.clone()).text.repeat(count);
                    put_linewise(model, &text, start.line, false)
                }
                (MotionKind::Char, RegisterKind::Line) => {
                    let offset = model.doc.offset_of(start);
                    model.doc.insert(offset, "\n");
                    model.state.marks.adjust_lines(start.line + 1, 0, 1);
                    put_linewise(model, &content.text.repeat(count), start.line + 1, false)
                }
                (MotionKind::Char, RegisterKind::Char) => {
                    put_charwise(model, &content.text.repeat(count), start, false)
                }
            });
            Ok(effect)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charwise_put_leaves_cursor_on_last_char() {
        let mut model = EditorModel::from_text("ad");
        put_charwise(&mut model, "bc", Position::new(0, 1), false);
        assert_eq!(model.text(), "abcd\n");
        assert_eq!(model.cursor(), Position::new(0, 2));
    }

    #[test]
    fn linewise_put_after_last_line() {
        let mut model = EditorModel::from_text("one");
        put_linewise(&mut model, "  two\n", 1, false);
        assert_eq!(model.text(), "one\n  two\n");
        assert_eq!(model.cursor(), Position::new(1, 2));
    }

    #[test]
    fn block_put_pads_short_lines() {
        let mut model = EditorModel::from_text("abc\nd");
        let content = RegisterContent::block(&["x".to_string(), "y".to_string()]);
        put_blockwise(&mut model, &content, 1, Position::new(0, 2), false);
        assert_eq!(model.text(), "abxc\nd y\n");
    }
}
