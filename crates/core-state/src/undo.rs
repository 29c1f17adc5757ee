use core_text::{Position, TextDocument};
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use tracing::{trace, warn};

/// Default maximum number of snapshots retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 1000;

/// Undo collaborator contract.
///
/// Groups nest: only the outermost `begin_group`/`end_group` pair produces an
/// undo step, inner pairs collapse into it. An Insert session brackets itself
/// with `begin_insert_group`/`end_insert_group`, which share the same depth
/// counter so a change operator (delete + Insert) undoes in one step.
pub trait UndoManager {
    fn begin_group(&mut self, doc: &dyn TextDocument, cursor: Position);
    fn end_group(&mut self, doc: &dyn TextDocument);
    fn depth(&self) -> usize;
    /// Restore the previous state; returns the cursor to use.
    fn undo(&mut self, doc: &mut dyn TextDocument) -> Option<Position>;
    fn redo(&mut self, doc: &mut dyn TextDocument) -> Option<Position>;

    fn begin_insert_group(&mut self, doc: &dyn TextDocument, cursor: Position) {
        self.begin_group(doc, cursor);
    }
    fn end_insert_group(&mut self, doc: &dyn TextDocument) {
        self.end_group(doc);
    }
    /// Close every open group (error recovery).
    fn close_all(&mut self, doc: &dyn TextDocument) {
        while self.depth() > 0 {
            self.end_group(doc);
        }
    }
}

/// A full-text snapshot for undo/redo.
#[derive(Clone)]
pub struct EditSnapshot {
    pub text: String,
    pub position: Position,
    /// Content hash of the text at snapshot capture.
    pub hash: u64,
}

impl EditSnapshot {
    fn capture(doc: &dyn TextDocument, position: Position) -> Self {
        let text = doc.text();
        let hash = text_hash(&text);
        Self {
            text,
            position,
            hash,
        }
    }
}

/// Snapshot-based undo manager: the outermost group captures the whole
/// document, and closing the group keeps the snapshot only when the text
/// actually changed.
pub struct SnapshotUndo {
    undo_stack: Vec<EditSnapshot>,
    redo_stack: Vec<EditSnapshot>,
    pending: Option<EditSnapshot>,
    depth: usize,
    history_max: usize,
    snapshots_skipped: u64,
}

impl Default for SnapshotUndo {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_MAX)
    }
}

impl SnapshotUndo {
    pub fn new(history_max: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            pending: None,
            depth: 0,
            history_max: history_max.max(1),
            snapshots_skipped: 0,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped
    }
}

impl UndoManager for SnapshotUndo {
    fn begin_group(&mut self, doc: &dyn TextDocument, cursor: Position) {
        if self.depth == 0 {
            self.pending = Some(EditSnapshot::capture(doc, cursor));
        }
        self.depth += 1;
        trace!(target: "state.undo", depth = self.depth, "begin_group");
    }

    fn end_group(&mut self, doc: &dyn TextDocument) {
        if self.depth == 0 {
            warn!(target: "state.undo", "end_group_without_begin");
            return;
        }
        self.depth -= 1;
        trace!(target: "state.undo", depth = self.depth, "end_group");
        if self.depth > 0 {
            return;
        }
        let Some(snap) = self.pending.take() else {
            return;
        };
        if text_hash(&doc.text()) == snap.hash {
            self.snapshots_skipped += 1;
            trace!(target: "state.undo", undo_depth = self.undo_stack.len(), hash = snap.hash, "snapshot_dedupe_skip");
            return;
        }
        self.undo_stack.push(snap);
        if self.undo_stack.len() > self.history_max {
            let _ = self.undo_stack.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        self.redo_stack.clear();
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), "push_snapshot");
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn undo(&mut self, doc: &mut dyn TextDocument) -> Option<Position> {
        let last = self.undo_stack.pop()?;
        let current = EditSnapshot::capture(&*doc, last.position);
        self.redo_stack.push(current);
        doc.set_text(&last.text);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        Some(last.position)
    }

    fn redo(&mut self, doc: &mut dyn TextDocument) -> Option<Position> {
        let next = self.redo_stack.pop()?;
        let current = EditSnapshot::capture(&*doc, next.position);
        self.undo_stack.push(current);
        doc.set_text(&next.text);
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        Some(next.position)
    }
}

fn text_hash(text: &str) -> u64 {
    let mut h = DefaultHasher::new();
    h.write(text.as_bytes());
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;

    #[test]
    fn nested_groups_collapse_into_one_step() {
        let mut doc = Buffer::from_str("t", "abc");
        let mut undo = SnapshotUndo::default();
        undo.begin_group(&doc, Position::origin());
        doc.insert(0, "x");
        undo.begin_group(&doc, Position::origin());
        doc.insert(0, "y");
        undo.end_group(&doc);
        assert_eq!(undo.depth(), 1);
        undo.end_group(&doc);
        assert_eq!(undo.undo_depth(), 1);
        assert_eq!(undo.undo(&mut doc), Some(Position::origin()));
        assert_eq!(doc.text(), "abc\n");
        undo.redo(&mut doc);
        assert_eq!(doc.text(), "yxabc\n");
    }

    #[test]
    fn unchanged_group_is_skipped() {
        let doc = Buffer::from_str("t", "abc");
        let mut undo = SnapshotUndo::default();
        undo.begin_group(&doc, Position::origin());
        undo.end_group(&doc);
        assert_eq!(undo.undo_depth(), 0);
        assert_eq!(undo.snapshots_skipped(), 1);
    }

    #[test]
    fn close_all_releases_every_level() {
        let mut doc = Buffer::from_str("t", "abc");
        let mut undo = SnapshotUndo::default();
        undo.begin_insert_group(&doc, Position::origin());
        undo.begin_group(&doc, Position::origin());
        doc.remove(0, 1);
        undo.close_all(&doc);
        assert_eq!(undo.depth(), 0);
        assert_eq!(undo.undo_depth(), 1);
    }

    #[test]
    fn history_is_capped() {
        let mut doc = Buffer::from_str("t", "");
        let mut undo = SnapshotUndo::new(2);
        for i in 0..4 {
            undo.begin_group(&doc, Position::origin());
            doc.insert(0, &i.to_string());
            undo.end_group(&doc);
        }
        assert_eq!(undo.undo_depth(), 2);
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut doc = Buffer::from_str("t", "a");
        let mut undo = SnapshotUndo::default();
        undo.begin_group(&doc, Position::origin());
        doc.insert(0, "b");
        undo.end_group(&doc);
        undo.undo(&mut doc);
        assert_eq!(undo.redo_depth(), 1);
        undo.begin_group(&doc, Position::origin());
        doc.insert(0, "c");
        undo.end_group(&doc);
        assert_eq!(undo.redo_depth(), 0);
    }
}
