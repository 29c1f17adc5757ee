//! Cursor motions.
//!
//! `eval_motion` computes where a motion lands without moving anything; the
//! caller either moves the cursor (Normal, Visual) or hands the span to the
//! pending operator. Failing motions return [`EngineError::InvalidCommand`],
//! except where vi lets an operator use a partial motion (`dw` on the last
//! word, `dl` at the end of a line).

use crate::engine::{Engine, FindState, SearchState};
use crate::error::{Effect, EngineError, EngineResult};
use crate::op_resolver::{MotionKind, OpKind, Region};
use crate::parser::{Command, combine_counts};
use core_events::keys;
use core_model::{CURSWANT_EOL, Direction, EditorModel, SearchFlags};
use core_text::chars::{col_for_vcol, first_non_blank, is_blank, is_word_char, vcol_of};
use core_text::motion::{
    bck_word, bckend_word, end_word, find_char_in_line, first_non_blank_pos, fwd_word, match_pair,
    paragraph, sentence, unmatched,
};
use core_text::Position;
use tracing::trace;

/// How `curswant` is updated after the cursor moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Want {
    /// Vertical motion: keep the remembered column.
    Keep,
    Recompute,
    /// `$`: stick to the end of every line.
    Eol,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MotionOutcome {
    pub target: Position,
    pub kind: MotionKind,
    pub inclusive: bool,
    /// Sets the previous-context mark.
    pub jump: bool,
    pub want: Want,
}

impl MotionOutcome {
    fn exclusive(target: Position) -> Self {
        Self {
            target,
            kind: MotionKind::Char,
            inclusive: false,
            jump: false,
            want: Want::Recompute,
        }
    }

    fn inclusive(target: Position) -> Self {
        Self {
            inclusive: true,
            ..Self::exclusive(target)
        }
    }

    fn linewise(target: Position, want: Want) -> Self {
        Self {
            target,
            kind: MotionKind::Line,
            inclusive: true,
            jump: false,
            want,
        }
    }

    pub(crate) fn jump(mut self) -> Self {
        self.jump = true;
        self
    }
}

fn not_found() -> EngineError {
    EngineError::InvalidCommand
}

impl Engine {
    pub(crate) fn motion_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let count = if self.oap.pending() {
            combine_counts(self.oap.opcount, cmd.count0)
        } else {
            cmd.count0
        };
        match cmd.name() {
            "/" | "?" => return self.start_search_entry(cmd.cmdchar, count),
            "*" | "#" | "g*" | "g#" => return self.star_search(model, cmd),
            _ => {}
        }
        let cursor = model.view.cursor;
        let outcome = self.eval_motion(model, cmd, count)?;
        if self.oap.pending() {
            let region = Region {
                start: cursor,
                end: outcome.target,
                kind: outcome.kind,
                inclusive: outcome.inclusive,
            };
            return self.apply_operator(model, region, &cmd.keys, count);
        }
        Ok(self.move_cursor(model, outcome))
    }

    /// Move the cursor to a motion target (Normal and Visual).
    pub(crate) fn move_cursor(&mut self, model: &mut EditorModel, outcome: MotionOutcome) -> Effect {
        let old = model.view.cursor;
        if outcome.jump {
            model.state.marks.set_pcmark(old);
        }
        model.set_cursor(outcome.target, false);
        match outcome.want {
            Want::Keep => {}
            Want::Recompute => model.view.set_curswant = true,
            Want::Eol => {
                model.view.curswant = CURSWANT_EOL;
                model.view.set_curswant = false;
            }
        }
        Effect::moved()
    }

    /// Column for a vertical move onto `line`, honouring `curswant`.
    pub(crate) fn vertical_target(model: &mut EditorModel, line: usize) -> Position {
        let ts = model.options.edit.tabstop;
        if model.view.set_curswant {
            let cur = model.view.cursor;
            model.view.curswant = vcol_of(&model.line(cur.line), cur.col, ts);
            model.view.set_curswant = false;
        }
        let text = model.line(line);
        let len = text.chars().count();
        let col = if model.view.curswant == CURSWANT_EOL {
            len.saturating_sub(1)
        } else {
            col_for_vcol(&text, model.view.curswant, ts)
        };
        Position::new(line, col)
    }

    /// Target of a line-jumping motion: first non-blank with `startofline`,
    /// else the remembered column.
    pub(crate) fn line_jump_target(model: &mut EditorModel, line: usize) -> Position {
        if model.options.edit.startofline {
            first_non_blank_pos(model.doc.as_ref(), line)
        } else {
            Self::vertical_target(model, line)
        }
    }

    pub(crate) fn eval_motion(
        &mut self,
        model: &mut EditorModel,
        cmd: &Command,
        count: usize,
    ) -> Result<MotionOutcome, EngineError> {
        let count1 = count.max(1);
        let op_pending = self.oap.pending();
        let cur = model.view.cursor;
        let last = model.doc.last_line();
        let len = model.doc.line_len(cur.line);
        let name = cmd.name();
        let outcome = match name {
            "h" | "\u{E000}" => {
                if cur.col == 0 {
                    return Err(not_found());
                }
                MotionOutcome::exclusive(Position::new(cur.line, cur.col.saturating_sub(count1)))
            }
            "\x08" => {
                let mut pos = cur;
                for _ in 0..count1 {
                    if pos.col > 0 {
                        pos.col -= 1;
                    } else if pos.line > 0 {
                        pos.line -= 1;
                        pos.col = model.doc.line_len(pos.line).saturating_sub(usize::from(!op_pending));
                    } else {
                        break;
                    }
                }
                if pos == cur {
                    return Err(not_found());
                }
                MotionOutcome::exclusive(pos)
            }
            "l" | "\u{E001}" => {
                if op_pending {
                    MotionOutcome::exclusive(Position::new(cur.line, (cur.col + count1).min(len)))
                } else {
                    let target = (cur.col + count1).min(len.saturating_sub(1));
                    if target == cur.col {
                        return Err(not_found());
                    }
                    MotionOutcome::exclusive(Position::new(cur.line, target))
                }
            }
            " " => {
                let mut pos = cur;
                for _ in 0..count1 {
                    let l = model.doc.line_len(pos.line);
                    let max = if op_pending { l } else { l.saturating_sub(1) };
                    if pos.col < max {
                        pos.col += 1;
                    } else if pos.line < last {
                        pos.line += 1;
                        pos.col = 0;
                    } else {
                        break;
                    }
                }
                if pos == cur {
                    return Err(not_found());
                }
                MotionOutcome::exclusive(pos)
            }
            "j" | "gj" | "\u{E003}" | "\x0e" | "\n" => {
                if cur.line >= last {
                    return Err(not_found());
                }
                let line = (cur.line + count1).min(last);
                MotionOutcome::linewise(Self::vertical_target(model, line), Want::Keep)
            }
            "k" | "gk" | "\u{E002}" | "\x10" => {
                if cur.line == 0 {
                    return Err(not_found());
                }
                let line = cur.line.saturating_sub(count1);
                MotionOutcome::linewise(Self::vertical_target(model, line), Want::Keep)
            }
            "+" | "\r" => {
                if cur.line >= last {
                    return Err(not_found());
                }
                let line = (cur.line + count1).min(last);
                MotionOutcome::linewise(first_non_blank_pos(model.doc.as_ref(), line), Want::Recompute)
            }
            "-" => {
                if cur.line == 0 {
                    return Err(not_found());
                }
                let line = cur.line.saturating_sub(count1);
                MotionOutcome::linewise(first_non_blank_pos(model.doc.as_ref(), line), Want::Recompute)
            }
            "_" => {
                let line = cur.line + count1 - 1;
                if line > last {
                    return Err(not_found());
                }
                MotionOutcome::linewise(first_non_blank_pos(model.doc.as_ref(), line), Want::Recompute)
            }
            "0" | "g0" | "\u{E004}" => MotionOutcome::exclusive(Position::new(cur.line, 0)),
            "^" | "g^" => {
                let col = first_non_blank(&model.line(cur.line));
                MotionOutcome::exclusive(Position::new(cur.line, col.min(len.saturating_sub(1))))
            }
            "$" | "g$" | "\u{E005}" => {
                let line = cur.line + count1 - 1;
                if line > last {
                    return Err(not_found());
                }
                let l = model.doc.line_len(line);
                MotionOutcome {
                    want: Want::Eol,
                    ..MotionOutcome::inclusive(Position::new(line, l.saturating_sub(1)))
                }
            }
            "|" => {
                let col = col_for_vcol(&model.line(cur.line), count1 - 1, model.options.edit.tabstop);
                MotionOutcome::exclusive(Position::new(cur.line, col.min(len.saturating_sub(1))))
            }
            "gm" => MotionOutcome::exclusive(Position::new(cur.line, len / 2)),
            "go" => {
                let total = model.doc.len_chars();
                let pos = model.doc.position_of((count1 - 1).min(total.saturating_sub(1)));
                MotionOutcome::exclusive(pos).jump()
            }
            "w" | "W" => self.word_motion(model, name == "W", count1)?,
            "b" | "B" => {
                let mut pos = cur;
                if !bck_word(model.doc.as_ref(), &mut pos, count1, name == "B", false) && pos == cur {
                    return Err(not_found());
                }
                MotionOutcome::exclusive(pos)
            }
            "e" | "E" => {
                let mut pos = cur;
                if !end_word(model.doc.as_ref(), &mut pos, count1, name == "E", false, false) {
                    return Err(not_found());
                }
                MotionOutcome::inclusive(pos)
            }
            "ge" | "gE" => {
                let mut pos = cur;
                if !bckend_word(model.doc.as_ref(), &mut pos, count1, name == "gE", false) {
                    return Err(not_found());
                }
                MotionOutcome::inclusive(pos)
            }
            "f" | "F" | "t" | "T" => {
                let target = cmd.arg.ok_or_else(not_found)?;
                let find = FindState {
                    target,
                    forward: matches!(name, "f" | "t"),
                    till: matches!(name, "t" | "T"),
                };
                self.last_find = Some(find);
                Self::find_motion(model, find, count1, false)?
            }
            ";" | "," => {
                let mut find = self.last_find.ok_or_else(not_found)?;
                if name == "," {
                    find.forward = !find.forward;
                }
                Self::find_motion(model, find, count1, true)?
            }
            "G" => {
                let line = if count == 0 { last } else { (count - 1).min(last) };
                MotionOutcome::linewise(Self::line_jump_target(model, line), Want::Recompute).jump()
            }
            "gg" => {
                let line = (count1 - 1).min(last);
                MotionOutcome::linewise(Self::line_jump_target(model, line), Want::Recompute).jump()
            }
            "H" | "L" | "M" => {
                let top = model.view.top_line.min(last);
                let bottom = model.view.bottom_line().min(last);
                let line = match name {
                    "H" => (top + count1 - 1).min(bottom),
                    "L" => bottom.saturating_sub(count1 - 1).max(top),
                    _ => top + (bottom - top) / 2,
                };
                MotionOutcome::linewise(Self::line_jump_target(model, line), Want::Recompute).jump()
            }
            "%" => {
                if count > 0 {
                    if count > 100 {
                        return Err(not_found());
                    }
                    let lines = model.doc.line_count();
                    let line = ((count * lines).div_ceil(100)).saturating_sub(1).min(last);
                    MotionOutcome::linewise(first_non_blank_pos(model.doc.as_ref(), line), Want::Recompute).jump()
                } else {
                    let target = match_pair(model.doc.as_ref(), cur).ok_or_else(not_found)?;
                    MotionOutcome::inclusive(target).jump()
                }
            }
            "{" | "}" => {
                let (target, inclusive) =
                    paragraph(model.doc.as_ref(), cur, name == "}", count1).ok_or_else(not_found)?;
                if target == cur && !op_pending {
                    return Err(not_found());
                }
                let mut out = MotionOutcome::exclusive(target).jump();
                out.inclusive = inclusive;
                out
            }
            "(" | ")" => {
                let target = sentence(model.doc.as_ref(), cur, name == ")", count1).ok_or_else(not_found)?;
                MotionOutcome::exclusive(target).jump()
            }
            "'" | "`" => {
                let mark = cmd.arg.ok_or_else(not_found)?;
                let mut pos = model.state.marks.get(mark)?;
                pos.line = pos.line.min(last);
                if name == "'" {
                    MotionOutcome::linewise(first_non_blank_pos(model.doc.as_ref(), pos.line), Want::Recompute)
                        .jump()
                } else {
                    pos.col = pos.col.min(model.doc.line_len(pos.line));
                    MotionOutcome::exclusive(pos).jump()
                }
            }
            "n" | "N" => {
                let state = self.last_search.clone().ok_or(EngineError::NoPreviousPattern)?;
                let direction = if name == "N" {
                    state.direction.reversed()
                } else {
                    state.direction
                };
                let target = self.search_motion(model, &state.pattern, direction, count1)?;
                MotionOutcome::exclusive(target).jump()
            }
            "[(" | "[{" | "])" | "]}" => {
                let (open, close) = if name.ends_with('(') || name.ends_with(')') {
                    ('(', ')')
                } else {
                    ('{', '}')
                };
                let forward = name.starts_with(']');
                let target =
                    unmatched(model.doc.as_ref(), cur, open, close, forward, count1).ok_or_else(not_found)?;
                if forward {
                    MotionOutcome::inclusive(target).jump()
                } else {
                    MotionOutcome::exclusive(target).jump()
                }
            }
            other => {
                trace!(target: "actions.motion", keys = %other.escape_debug(), "not_a_motion");
                return Err(not_found());
            }
        };
        Ok(outcome)
    }

    /// `w` / `W`, including `cw` acting like `ce` on a non-blank.
    fn word_motion(
        &mut self,
        model: &mut EditorModel,
        bigword: bool,
        count1: usize,
    ) -> Result<MotionOutcome, EngineError> {
        let doc = model.doc.as_ref();
        let cur = model.view.cursor;
        let op_pending = self.oap.pending();
        let mut pos = cur;
        if self.oap.op == Some(OpKind::Change)
            && let Some(c) = doc.char_at_pos(cur)
            && c != '\n'
            && !is_blank(c)
        {
            end_word(doc, &mut pos, count1, bigword, true, false);
            return Ok(MotionOutcome::inclusive(pos));
        }
        let moved = fwd_word(doc, &mut pos, count1, bigword, op_pending);
        let mut outcome = MotionOutcome::exclusive(pos);
        // Never leave the cursor on the newline past a line's last char.
        if cur < pos {
            let len = doc.line_len(pos.line);
            if pos.col >= len && len > 0 {
                outcome.target.col = len - 1;
                if op_pending {
                    outcome.inclusive = true;
                }
            }
        }
        if !moved && !op_pending && outcome.target == cur {
            return Err(not_found());
        }
        Ok(outcome)
    }

    fn find_motion(
        model: &EditorModel,
        find: FindState,
        count1: usize,
        repeat: bool,
    ) -> Result<MotionOutcome, EngineError> {
        let cur = model.view.cursor;
        let col = find_char_in_line(model.doc.as_ref(), cur, find.target, find.forward, find.till, count1, repeat)
            .ok_or_else(not_found)?;
        let target = Position::new(cur.line, col);
        Ok(if find.forward {
            MotionOutcome::inclusive(target)
        } else {
            MotionOutcome::exclusive(target)
        })
    }

    pub(crate) fn search_flags(model: &EditorModel) -> SearchFlags {
        let opts = &model.options.search;
        let mut flags = SearchFlags::empty();
        flags.set(SearchFlags::WRAP, opts.wrapscan);
        flags.set(SearchFlags::IGNORE_CASE, opts.ignorecase);
        flags.set(SearchFlags::SMART_CASE, opts.smartcase);
        flags
    }

    /// Find the `count`-th match of `pattern` from the cursor.
    pub(crate) fn search_motion(
        &mut self,
        model: &mut EditorModel,
        pattern: &str,
        direction: Direction,
        count1: usize,
    ) -> Result<Position, EngineError> {
        let flags = Self::search_flags(model);
        let mut from = model.view.cursor;
        if model.options.compat.search_continue
            && direction == Direction::Forward
            && let Some(SearchState {
                last_match: Some((start, end)),
                ..
            }) = &self.last_search
            && *start == from
        {
            let end_off = model.doc.offset_of(*end);
            from = model.doc.position_of(end_off.saturating_sub(1).max(model.doc.offset_of(from)));
        }
        let mut found = None;
        for _ in 0..count1 {
            let m = model
                .search
                .search(model.doc.as_ref(), pattern, direction, from, flags)?
                .ok_or_else(|| EngineError::PatternNotFound(pattern.to_string()))?;
            if m.wrapped {
                model.state.status.message(match direction {
                    Direction::Forward => "search hit BOTTOM, continuing at TOP",
                    Direction::Backward => "search hit TOP, continuing at BOTTOM",
                });
            }
            from = m.start;
            found = Some(m);
        }
        let m = found.ok_or_else(|| EngineError::PatternNotFound(pattern.to_string()))?;
        self.last_search = Some(SearchState {
            pattern: pattern.to_string(),
            direction: self.last_search.as_ref().map_or(direction, |s| s.direction),
            last_match: Some((m.start, m.end)),
        });
        trace!(target: "actions.motion", pattern, ?direction, at = ?m.start, "search_match");
        Ok(m.start)
    }

    /// `*` `#` `g*` `g#`: search for the word under the cursor by stuffing
    /// an ordinary `/` or `?` command.
    fn star_search(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let cur = model.view.cursor;
        let line: Vec<char> = model.line(cur.line).chars().collect();
        let (start, end) = word_under_cursor(&line, cur.col).ok_or(EngineError::NoStringUnderCursor)?;
        let keyword = is_word_char(line[start]);
        let whole = !cmd.name().starts_with('g') && keyword;
        let delim = if cmd.name().ends_with('*') { '/' } else { '?' };
        let mut pattern = String::new();
        if whole {
            pattern.push_str("\\<");
        }
        for &c in &line[start..end] {
            if matches!(c, '\\' | '.' | '*' | '$' | '^' | '~' | '[' | ']') || c == delim {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        if whole {
            pattern.push_str("\\>");
        }
        model.view.cursor.col = start;
        let mut stuffed = String::new();
        if cmd.count0 > 0 {
            stuffed.push_str(&cmd.count0.to_string());
        }
        stuffed.push(delim);
        stuffed.push_str(&pattern);
        stuffed.push(keys::CR);
        self.queue.stuff_front(&stuffed)?;
        Ok(Effect::moved())
    }

    /// Search typed on the command line finished (`/pat<CR>`).
    pub(crate) fn finish_search(
        &mut self,
        model: &mut EditorModel,
        kind: char,
        typed: &str,
        count: usize,
    ) -> EngineResult {
        let pattern = split_pattern(typed, kind);
        let pattern = if pattern.is_empty() {
            self.last_search
                .as_ref()
                .map(|s| s.pattern.clone())
                .or_else(|| model.state.registers.last_search().map(str::to_string))
                .ok_or(EngineError::NoPreviousPattern)?
        } else {
            pattern
        };
        let direction = if kind == '/' {
            Direction::Forward
        } else {
            Direction::Backward
        };
        model.state.registers.set_last_search(pattern.clone());
        self.last_search = Some(SearchState {
            pattern: pattern.clone(),
            direction,
            last_match: None,
        });
        let cursor = model.view.cursor;
        let target = self.search_motion(model, &pattern, direction, count.max(1))?;
        if self.oap.pending() {
            let motion_keys = format!("{kind}{typed}\n");
            return self.apply_operator(model, Region::charwise(cursor, target, false), &motion_keys, count);
        }
        Ok(self.move_cursor(model, MotionOutcome::exclusive(target).jump()))
    }
}

/// Pattern text before an unescaped `delim` (`/foo/e` -> `foo`).
fn split_pattern(typed: &str, delim: char) -> String {
    let mut out = String::new();
    let mut chars = typed.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(c);
            if let Some(n) = chars.next() {
                out.push(n);
            }
            continue;
        }
        if c == delim {
            break;
        }
        out.push(c);
    }
    out
}

/// Keyword under or after `col`; failing that, the non-blank run there.
fn word_under_cursor(line: &[char], col: usize) -> Option<(usize, usize)> {
    let span = |k: usize, pred: fn(char) -> bool| {
        let mut s = k;
        while s > 0 && pred(line[s - 1]) {
            s -= 1;
        }
        let mut e = k;
        while e < line.len() && pred(line[e]) {
            e += 1;
        }
        (s, e)
    };
    if let Some(k) = (col..line.len()).find(|&i| is_word_char(line[i])) {
        return Some(span(k, is_word_char));
    }
    let k = (col..line.len()).find(|&i| !is_blank(line[i]))?;
    Some(span(k, |c| !is_blank(c) && !is_word_char(c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn split_pattern_stops_at_delimiter() {
        assert_eq!(split_pattern("foo/e", '/'), "foo");
        assert_eq!(split_pattern(r"a\/b", '/'), r"a\/b");
        assert_eq!(split_pattern("x?y", '?'), "x");
    }

    #[test]
    fn word_under_cursor_finds_keyword() {
        let line = chars("  foo.bar baz");
        assert_eq!(word_under_cursor(&line, 0), Some((2, 5)));
        assert_eq!(word_under_cursor(&line, 4), Some((2, 5)));
        assert_eq!(word_under_cursor(&line, 5), Some((6, 9)));
        let punct = chars("a  ++");
        assert_eq!(word_under_cursor(&punct, 1), Some((3, 5)));
        assert_eq!(word_under_cursor(&chars("   "), 0), None);
    }
}
