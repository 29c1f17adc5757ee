use super::block::block_spans;
use crate::engine::Engine;
use crate::error::{Effect, EngineError, EngineResult};
use crate::op_resolver::{MotionKind, OpKind, OperatorDescriptor};
use core_model::EditorModel;
use core_text::Position;
use core_text::chars::{rot13, swap_case};
use core_text::motion::first_non_blank_pos;

/// Char mapping of a case operator.
pub(crate) fn case_fn(op: OpKind) -> fn(char) -> char {
    match op {
        OpKind::Upper => |c: char| c.to_uppercase().next().unwrap_or(c),
        OpKind::Lower => |c: char| c.to_lowercase().next().unwrap_or(c),
        OpKind::Rot13 => rot13,
        _ => swap_case,
    }
}

/// Rewrite the text of `[start, end)` through `map`, leaving newlines alone.
fn map_span(model: &mut EditorModel, start: usize, end: usize, map: impl Fn(char) -> char) -> bool {
    if start >= end {
        return false;
    }
    let old = model.doc.slice(start, end);
    let new: String = old.chars().map(|c| if c == '\n' { c } else { map(c) }).collect();
    if new == old {
        return false;
    }
    model.doc.replace(start, end, &new);
    true
}

/// Offset spans covered by the region, one per row for a block.
fn region_spans(model: &EditorModel, oap: &OperatorDescriptor) -> Vec<(usize, usize)> {
    match oap.motion {
        MotionKind::Char => vec![oap.char_range(model.doc.as_ref())],
        MotionKind::Line => {
            let start = model.doc.line_start(oap.start.line);
            let end = model.doc.line_start(oap.end.line) + model.doc.line_len(oap.end.line);
            vec![(start, end)]
        }
        MotionKind::Block => block_spans(model, oap)
            .into_iter()
            .map(|(line, from, to)| {
                let base = model.doc.line_start(line);
                (base + from, base + to)
            })
            .collect(),
    }
}

impl Engine {
    pub(super) fn op_case(&mut self, model: &mut EditorModel, oap: &OperatorDescriptor, op: OpKind) -> EngineResult {
        let map = case_fn(op);
        let mut changed = false;
        for (start, end) in region_spans(model, oap) {
            changed |= map_span(model, start, end, map);
        }
        let cursor = match oap.motion {
            MotionKind::Line if !oap.is_visual => Position::new(oap.start.line, model.view.cursor.col),
            MotionKind::Block => Position::new(oap.start.line, oap.block.map_or(0, |b| b.start)),
            _ => oap.start,
        };
        if changed {
            model.state.marks.set_changed(oap.start, oap.end);
        }
        model.set_cursor(cursor, false);
        model.view.set_curswant = true;
        Ok(if changed { Effect::dirty() } else { Effect::moved() })
    }

    /// `r{char}` on a selection: every char except newlines becomes `arg`.
    pub(super) fn op_replace(&mut self, model: &mut EditorModel, oap: &OperatorDescriptor) -> EngineResult {
        let with = oap.arg.ok_or(EngineError::InvalidCommand)?;
        for (start, end) in region_spans(model, oap) {
            map_span(model, start, end, |_| with);
        }
        let cursor = match oap.motion {
            MotionKind::Block => Position::new(oap.start.line, oap.block.map_or(0, |b| b.start)),
            MotionKind::Line => first_non_blank_pos(model.doc.as_ref(), oap.start.line),
            MotionKind::Char => oap.start,
        };
        model.state.marks.set_changed(oap.start, oap.end);
        model.set_cursor(cursor, false);
        model.view.set_curswant = true;
        Ok(Effect::dirty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_functions() {
        assert_eq!(case_fn(OpKind::Upper)('a'), 'A');
        assert_eq!(case_fn(OpKind::Lower)('Q'), 'q');
        assert_eq!(case_fn(OpKind::Tilde)('q'), 'Q');
        assert_eq!(case_fn(OpKind::Rot13)('a'), 'n');
    }

    #[test]
    fn newlines_are_left_alone() {
        let mut model = EditorModel::from_text("ab\ncd");
        assert!(map_span(&mut model, 0, 5, |_| 'x'));
        assert_eq!(model.text(), "xx\nxx\n");
    }
}
