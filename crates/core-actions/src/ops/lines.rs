//! Line-shaped operators: `>` `<` and `J` `gJ`.

use crate::engine::Engine;
use crate::error::{Effect, EngineError, EngineResult};
use crate::op_resolver::OperatorDescriptor;
use core_model::EditorModel;
use core_text::Position;
use core_text::chars::{build_indent, first_non_blank, indent_width, is_blank};
use tracing::trace;

/// Indent width after shifting `amount` times by `sw`. With `round` the
/// result snaps to a multiple of `sw`; a partial step counts as one.
pub(crate) fn shifted_width(width: usize, left: bool, amount: usize, sw: usize, round: bool) -> usize {
    let sw = sw.max(1);
    if !round {
        return if left {
            width.saturating_sub(sw * amount)
        } else {
            width + sw * amount
        };
    }
    let steps = width / sw;
    let extra = width % sw;
    let steps = if left {
        let amount = if extra > 0 { amount - 1 } else { amount };
        steps.saturating_sub(amount)
    } else {
        steps + amount
    };
    steps * sw
}

/// Join `count` lines starting at `first` into one. With `spaces` leading
/// white of each joined line is dropped and one separating space inserted
/// (two after `.` `!` `?` with `joinspaces`, none before `)` or after a
/// blank). Returns the position of the last join point.
pub(crate) fn join_lines(model: &mut EditorModel, first: usize, count: usize, spaces: bool) -> Position {
    let joinspaces = model.options.edit.joinspaces;
    let mut col = model.doc.line_len(first);
    let mut joined = 0;
    for _ in 1..count {
        if first + 1 >= model.doc.line_count() {
            break;
        }
        let cur = model.line(first);
        let next = model.line(first + 1);
        let cur_len = cur.chars().count();
        let (skip, sep) = if spaces {
            let lead = next.chars().take_while(|c| is_blank(*c)).count();
            let sep = match (next.chars().nth(lead), cur.chars().last()) {
                (None | Some(')'), _) | (_, None) => "",
                (_, Some(last)) if is_blank(last) => "",
                (_, Some('.' | '!' | '?')) if joinspaces => "  ",
                _ => " ",
            };
            (lead, sep)
        } else {
            (0, "")
        };
        let newline = model.doc.line_start(first) + cur_len;
        model.doc.replace(newline, newline + 1 + skip, sep);
        col = cur_len;
        joined += 1;
    }
    if joined > 0 {
        model.state.marks.adjust_lines(first + 1, joined, 0);
    }
    trace!(target: "actions.operator", first, joined, spaces, "join");
    Position::new(first, col)
}

impl Engine {
    pub(super) fn op_shift(&mut self, model: &mut EditorModel, oap: &OperatorDescriptor, left: bool) -> EngineResult {
        let amount = if oap.is_visual { oap.opcount.max(1) } else { 1 };
        let edit = model.options.edit.clone();
        if let Some(cols) = oap.block {
            let total = edit.shiftwidth.max(1) * amount;
            for line in oap.lines() {
                let len = model.doc.line_len(line);
                let (from, _) = cols.span_on(len);
                if from >= len {
                    continue;
                }
                let base = model.doc.line_start(line) + from;
                if left {
                    let blanks = model.line(line).chars().skip(from).take_while(|c| is_blank(*c)).count();
                    model.doc.remove(base, base + blanks.min(total));
                } else {
                    model.doc.insert(base, &" ".repeat(total));
                }
            }
        } else {
            for line in oap.lines() {
                let text = model.line(line);
                if text.is_empty() {
                    continue;
                }
                let width = indent_width(&text, edit.tabstop);
                let target = shifted_width(width, left, amount, edit.shiftwidth, edit.shiftround);
                let indent = build_indent(target, edit.tabstop, edit.expandtab);
                let lead: String = text.chars().take(first_non_blank(&text)).collect();
                if lead != indent {
                    let start = model.doc.line_start(line);
                    model.doc.replace(start, start + lead.chars().count(), &indent);
                }
            }
        }
        model
            .state
            .marks
            .set_changed(Position::new(oap.start.line, 0), Position::new(oap.end.line, 0));
        model.view.cursor = Self::line_jump_target(model, oap.start.line);
        if model.options.edit.startofline {
            model.view.set_curswant = true;
        }
        let lines = oap.line_count;
        if lines > 2 {
            let dir = if left { '<' } else { '>' };
            let times = if amount == 1 { "time" } else { "times" };
            model
                .state
                .status
                .message(format!("{lines} lines {dir}ed {amount} {times}"));
        }
        Ok(Effect::dirty())
    }

    pub(super) fn op_join(&mut self, model: &mut EditorModel, oap: &OperatorDescriptor, spaces: bool) -> EngineResult {
        let count = oap.line_count.max(2);
        if oap.start.line + 1 > model.doc.last_line() {
            return Err(EngineError::InvalidCommand);
        }
        let pos = join_lines(model, oap.start.line, count, spaces);
        model.state.marks.set_changed(Position::new(oap.start.line, 0), pos);
        model.set_cursor(pos, false);
        model.view.set_curswant = true;
        Ok(Effect::structural())
    }
}
