//! Operator-pending state and region resolution.
//!
//! An operator (`d`, `gU`, `>` ...) waits in the [`OperatorDescriptor`]
//! until a motion or text object supplies the other end of the region.
//! [`resolve`] orders the two ends and applies vi's exclusive-motion
//! adjustment before the operator runs:
//!
//! * An exclusive charwise motion that ends in column 0 of a later line
//!   stops at the end of the previous line instead and becomes inclusive.
//!   When the start is inside the indent the operation becomes linewise
//!   (`d}` from the start of a paragraph deletes whole lines).
//! * An exclusive charwise region whose ends coincide is empty; operators
//!   never mutate on an empty region.

use core_text::chars::first_non_blank;
use core_text::{Position, TextDocument};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Delete,
    Yank,
    Change,
    ShiftLeft,
    ShiftRight,
    Filter,
    /// `g~` (and `~` with `tildeop`).
    Tilde,
    Indent,
    Format,
    /// `:` on a Visual selection.
    Colon,
    Upper,
    Lower,
    Join,
    JoinNoSpace,
    Rot13,
    /// `r{char}` on a Visual selection.
    Replace,
    /// `I` on a Visual block.
    InsertCol,
    /// `A` on a Visual block.
    AppendCol,
}

impl OpKind {
    /// Operators that never change the text.
    pub fn is_read_only(self) -> bool {
        matches!(self, OpKind::Yank | OpKind::Colon)
    }

    /// Operators that always act on whole lines.
    pub fn is_line_only(self) -> bool {
        matches!(
            self,
            OpKind::ShiftLeft
                | OpKind::ShiftRight
                | OpKind::Filter
                | OpKind::Indent
                | OpKind::Format
                | OpKind::Colon
                | OpKind::Join
                | OpKind::JoinNoSpace
        )
    }

    /// Operators whose region may be empty without complaint.
    pub fn allows_empty(self) -> bool {
        matches!(self, OpKind::Yank | OpKind::Change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionKind {
    #[default]
    Char,
    Line,
    Block,
}

/// A motion or text-object result, before ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: Position,
    pub end: Position,
    pub kind: MotionKind,
    pub inclusive: bool,
}

impl Region {
    pub fn charwise(start: Position, end: Position, inclusive: bool) -> Self {
        Self {
            start,
            end,
            kind: MotionKind::Char,
            inclusive,
        }
    }
    pub fn linewise(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            kind: MotionKind::Line,
            inclusive: true,
        }
    }
}

/// Block columns of a Visual block, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockCols {
    pub start: usize,
    /// Inclusive end column.
    pub end: usize,
    /// `$` was used: every row extends to its line end.
    pub to_eol: bool,
}

impl BlockCols {
    pub fn width(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Char range `[from, to)` of this block on a line of `len` chars.
    pub fn span_on(&self, len: usize) -> (usize, usize) {
        let from = self.start.min(len);
        let to = if self.to_eol { len } else { (self.end + 1).min(len) };
        (from, to.max(from))
    }
}

#[derive(Debug, Clone, Default)]
pub struct OperatorDescriptor {
    pub op: Option<OpKind>,
    /// Keys that started the operator (`"d"`, `"gU"`), for redo and the
    /// doubled linewise form.
    pub keys: &'static str,
    pub opcount: usize,
    pub register: Option<char>,
    pub motion: MotionKind,
    pub start: Position,
    pub end: Position,
    pub inclusive: bool,
    pub line_count: usize,
    pub block: Option<BlockCols>,
    pub is_visual: bool,
    pub empty: bool,
    /// The exclusive end-of-line adjustment moved the end.
    pub end_adjusted: bool,
    /// Replacement char of `r` on a selection.
    pub arg: Option<char>,
}

impl OperatorDescriptor {
    pub fn pending(&self) -> bool {
        self.op.is_some()
    }

    pub fn begin(&mut self, op: OpKind, keys: &'static str, count: usize, register: Option<char>) {
        *self = Self {
            op: Some(op),
            keys,
            opcount: count,
            register,
            ..Self::default()
        };
        trace!(target: "actions.operator", ?op, count, ?register, "operator_pending");
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Char offsets `[start, end)` of a charwise region. An inclusive end on
    /// a line's newline only takes the newline for a Visual selection.
    pub fn char_range(&self, doc: &dyn TextDocument) -> (usize, usize) {
        let start = doc.offset_of(self.start);
        let mut end = doc.offset_of(self.end);
        if self.inclusive && (self.is_visual || self.end.col < doc.line_len(self.end.line)) {
            end += 1;
        }
        (start, end.min(doc.len_chars()).max(start))
    }

    /// Lines covered, inclusive.
    pub fn lines(&self) -> std::ops::RangeInclusive<usize> {
        self.start.line..=self.end.line
    }
}

/// Order the region ends (either may come first) into the descriptor and
/// apply the exclusive end-of-line adjustment.
pub fn resolve(oap: &mut OperatorDescriptor, doc: &dyn TextDocument, region: Region) {
    let (start, end) = if region.start <= region.end {
        (region.start, region.end)
    } else {
        (region.end, region.start)
    };
    oap.start = start;
    oap.end = end;
    oap.motion = region.kind;
    oap.inclusive = region.inclusive;
    oap.line_count = end.line - start.line + 1;
    oap.end_adjusted = false;

    if oap.motion == MotionKind::Char
        && !oap.inclusive
        && !oap.is_visual
        && oap.end.col == 0
        && oap.line_count > 1
    {
        oap.end_adjusted = true;
        oap.line_count -= 1;
        oap.end.line -= 1;
        let start_line = doc.line(oap.start.line).unwrap_or_default();
        if oap.start.col <= first_non_blank(&start_line) {
            oap.motion = MotionKind::Line;
        } else {
            let len = doc.line_len(oap.end.line);
            oap.end.col = len;
            if len > 0 {
                oap.end.col = len - 1;
                oap.inclusive = true;
            }
        }
    }
    oap.empty = oap.motion == MotionKind::Char && !oap.inclusive && oap.start == oap.end;
    trace!(target: "actions.operator", start = ?oap.start, end = ?oap.end, motion = ?oap.motion, inclusive = oap.inclusive, empty = oap.empty, "region_resolved");
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;

    fn oap() -> OperatorDescriptor {
        let mut o = OperatorDescriptor::default();
        o.begin(OpKind::Delete, "d", 0, None);
        o
    }

    #[test]
    fn orders_ends() {
        let doc = Buffer::from_str("t", "hello world");
        let mut o = oap();
        resolve(&mut o, &doc, Region::charwise(Position::new(0, 6), Position::new(0, 0), false));
        assert_eq!(o.start, Position::new(0, 0));
        assert_eq!(o.end, Position::new(0, 6));
        assert_eq!(o.char_range(&doc), (0, 6));
        assert!(!o.empty);
    }

    #[test]
    fn exclusive_end_at_column_zero_moves_back_and_becomes_inclusive() {
        let doc = Buffer::from_str("t", "  foo bar\nnext");
        let mut o = oap();
        resolve(&mut o, &doc, Region::charwise(Position::new(0, 6), Position::new(1, 0), false));
        assert!(o.end_adjusted);
        assert_eq!(o.motion, MotionKind::Char);
        assert_eq!(o.end, Position::new(0, 8));
        assert!(o.inclusive);
        assert_eq!(o.line_count, 1);
    }

    #[test]
    fn adjustment_from_indent_becomes_linewise() {
        let doc = Buffer::from_str("t", "  foo\nbar\n\nnext");
        let mut o = oap();
        resolve(&mut o, &doc, Region::charwise(Position::new(0, 1), Position::new(2, 0), false));
        assert_eq!(o.motion, MotionKind::Line);
        assert_eq!(o.lines(), 0..=1);
    }

    #[test]
    fn empty_exclusive_region() {
        let doc = Buffer::from_str("t", "abc");
        let mut o = oap();
        let p = Position::new(0, 1);
        resolve(&mut o, &doc, Region::charwise(p, p, false));
        assert!(o.empty);
        resolve(&mut o, &doc, Region::charwise(p, p, true));
        assert!(!o.empty);
    }

    #[test]
    fn block_span_clamps_to_line() {
        let cols = BlockCols { start: 2, end: 4, to_eol: false };
        assert_eq!(cols.width(), 3);
        assert_eq!(cols.span_on(10), (2, 5));
        assert_eq!(cols.span_on(3), (2, 3));
        assert_eq!(cols.span_on(1), (1, 1));
        let eol = BlockCols { to_eol: true, ..cols };
        assert_eq!(eol.span_on(10), (2, 10));
    }
}
