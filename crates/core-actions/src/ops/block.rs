//! Visual block rows: delete, yank rows and the block `I` / `A` entry.

use crate::engine::Engine;
use crate::error::{Effect, EngineError, EngineResult};
use crate::insert::{BlockInsert, InsertKind, InsertStart};
use crate::op_resolver::OperatorDescriptor;
use core_model::EditorModel;
use core_state::RegisterContent;
use core_text::Position;
use tracing::trace;

/// `(line, from, to)` char span of the block on each operated line.
pub(super) fn block_spans(model: &EditorModel, oap: &OperatorDescriptor) -> Vec<(usize, usize, usize)> {
    let Some(cols) = oap.block else {
        return Vec::new();
    };
    oap.lines()
        .map(|line| {
            let (from, to) = cols.span_on(model.doc.line_len(line));
            (line, from, to)
        })
        .collect()
}

impl Engine {
    pub(super) fn block_rows(&self, model: &EditorModel, oap: &OperatorDescriptor) -> Vec<String> {
        block_spans(model, oap)
            .into_iter()
            .map(|(line, from, to)| model.line(line).chars().skip(from).take(to - from).collect())
            .collect()
    }

    pub(super) fn block_delete(&mut self, model: &mut EditorModel, oap: &OperatorDescriptor) -> EngineResult {
        let rows = self.block_rows(model, oap);
        model
            .state
            .registers
            .write_delete(oap.register, RegisterContent::block(&rows), false)?;
        for (line, from, to) in block_spans(model, oap) {
            if from < to {
                let base = model.doc.line_start(line);
                model.doc.remove(base + from, base + to);
            }
        }
        let col = oap.block.map_or(oap.start.col, |b| b.start);
        let pos = Position::new(oap.start.line, col);
        model.state.marks.set_changed(pos, Position::new(oap.end.line, col));
        model.set_cursor(pos, false);
        model.view.set_curswant = true;
        Ok(Effect::dirty())
    }

    /// Visual block `I` or `A`: Insert on the first row, replicated to the
    /// others when the session ends.
    pub(super) fn op_block_insert(
        &mut self,
        model: &mut EditorModel,
        oap: &OperatorDescriptor,
        append: bool,
    ) -> EngineResult {
        let cols = oap
            .block
            .ok_or_else(|| EngineError::Invariant("block insert without block columns".into()))?;
        let first = oap.start.line;
        let to_eol = append && cols.to_eol;
        let col = if !append {
            cols.start
        } else if to_eol {
            model.doc.line_len(first)
        } else {
            cols.end + 1
        };
        self.begin_change_group(model);
        let len = model.doc.line_len(first);
        if append && !to_eol && len < col {
            let at = model.doc.line_start(first) + len;
            model.doc.insert(at, &" ".repeat(col - len));
        }
        trace!(target: "actions.operator", first, last = oap.end.line, col, append, "block_insert");
        model.set_cursor(Position::new(first, col), true);
        let result = self.begin_insert(
            model,
            InsertStart {
                cmdchar: if append { 'A' } else { 'I' },
                count: 1,
                kind: InsertKind::Insert,
                block: Some(BlockInsert {
                    first_line: first,
                    last_line: oap.end.line,
                    col,
                    append,
                    to_eol,
                }),
            },
        );
        model.state.undo.end_group(model.doc.as_ref());
        result
    }
}
