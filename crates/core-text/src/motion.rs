//! Cursor motion helpers.
//!
//! These operate purely on a `TextDocument` + `Position` pair and are free of
//! editor state. The word motions step through the document one char at a
//! time the way vi does: a position may transiently sit on the newline of a
//! line (column == line length), which classifies as blank.

use crate::chars::{class_of, first_non_blank, is_blank};
use crate::{Position, TextDocument};

/// Outcome of a single cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Moved within the line.
    Same,
    /// Crossed onto the first column of another line.
    NewLine,
    /// Moved onto the newline at the end of the line.
    OntoEol,
    /// Could not move: start or end of document.
    Edge,
}

impl Step {
    fn crossed(self) -> bool {
        matches!(self, Step::NewLine | Step::OntoEol)
    }
}

pub fn inc(doc: &dyn TextDocument, pos: &mut Position) -> Step {
    let len = doc.line_len(pos.line);
    if pos.col < len {
        pos.col += 1;
        return if pos.col < len { Step::Same } else { Step::OntoEol };
    }
    if pos.line + 1 < doc.line_count() {
        pos.line += 1;
        pos.col = 0;
        return Step::NewLine;
    }
    Step::Edge
}

pub fn dec(doc: &dyn TextDocument, pos: &mut Position) -> Step {
    if pos.col > 0 {
        pos.col = (pos.col - 1).min(doc.line_len(pos.line));
        return Step::Same;
    }
    if pos.line > 0 {
        pos.line -= 1;
        pos.col = doc.line_len(pos.line);
        return Step::NewLine;
    }
    Step::Edge
}

fn cls(doc: &dyn TextDocument, pos: Position, bigword: bool) -> u8 {
    class_of(doc.char_at_pos(pos).unwrap_or('\n'), bigword)
}

fn on_empty_line(doc: &dyn TextDocument, pos: Position) -> bool {
    pos.col == 0 && doc.is_line_empty(pos.line)
}

/// Skip chars of class `class`. Returns true when the document edge was hit.
fn skip_class(
    doc: &dyn TextDocument,
    pos: &mut Position,
    class: u8,
    forward: bool,
    bigword: bool,
) -> bool {
    while cls(doc, *pos, bigword) == class {
        let step = if forward { inc(doc, pos) } else { dec(doc, pos) };
        if step == Step::Edge {
            return true;
        }
    }
    false
}

/// `w` / `W`. With `eol` set (operator pending) the last iteration stops at
/// the end of the current line instead of crossing to the next one.
/// Returns false when the cursor was already on the last char of the document.
pub fn fwd_word(
    doc: &dyn TextDocument,
    pos: &mut Position,
    count: usize,
    bigword: bool,
    eol: bool,
) -> bool {
    for remaining in (0..count.max(1)).rev() {
        let last = remaining == 0;
        let sclass = cls(doc, *pos, bigword);
        let last_line = pos.line + 1 == doc.line_count();
        let step = inc(doc, pos);
        if step == Step::Edge || (step.crossed() && last_line) {
            return false;
        }
        if step.crossed() && eol && last {
            return true;
        }
        if sclass != 0 {
            while cls(doc, *pos, bigword) == sclass {
                let step = inc(doc, pos);
                if step == Step::Edge || (step.crossed() && eol && last) {
                    return true;
                }
            }
        }
        while cls(doc, *pos, bigword) == 0 {
            if on_empty_line(doc, *pos) {
                break;
            }
            let step = inc(doc, pos);
            if step == Step::Edge || (step.crossed() && eol && last) {
                return true;
            }
        }
    }
    true
}

/// `b` / `B`. `stop` makes the first iteration stop at the start of the
/// current word when already inside one.
pub fn bck_word(
    doc: &dyn TextDocument,
    pos: &mut Position,
    count: usize,
    bigword: bool,
    mut stop: bool,
) -> bool {
    for _ in 0..count.max(1) {
        let sclass = cls(doc, *pos, bigword);
        if dec(doc, pos) == Step::Edge {
            return false;
        }
        let mut finished = false;
        if !stop || sclass == cls(doc, *pos, bigword) || sclass == 0 {
            while cls(doc, *pos, bigword) == 0 {
                if on_empty_line(doc, *pos) {
                    finished = true;
                    break;
                }
                if dec(doc, pos) == Step::Edge {
                    return true;
                }
            }
            if !finished {
                let class = cls(doc, *pos, bigword);
                if skip_class(doc, pos, class, false, bigword) {
                    return true;
                }
            }
        }
        if !finished {
            inc(doc, pos);
        }
        stop = false;
    }
    true
}

/// `e` / `E`. `empty` lets an empty line count as a word end.
pub fn end_word(
    doc: &dyn TextDocument,
    pos: &mut Position,
    count: usize,
    bigword: bool,
    mut stop: bool,
    empty: bool,
) -> bool {
    for _ in 0..count.max(1) {
        let sclass = cls(doc, *pos, bigword);
        if inc(doc, pos) == Step::Edge {
            return false;
        }
        let mut finished = false;
        if cls(doc, *pos, bigword) == sclass && sclass != 0 {
            if skip_class(doc, pos, sclass, true, bigword) {
                return false;
            }
        } else if !stop || sclass == 0 {
            while cls(doc, *pos, bigword) == 0 {
                if empty && on_empty_line(doc, *pos) {
                    finished = true;
                    break;
                }
                if inc(doc, pos) == Step::Edge {
                    return false;
                }
            }
            if !finished {
                let class = cls(doc, *pos, bigword);
                if skip_class(doc, pos, class, true, bigword) {
                    return false;
                }
            }
        }
        if !finished {
            dec(doc, pos);
        }
        stop = false;
    }
    true
}

/// `ge` / `gE`.
pub fn bckend_word(
    doc: &dyn TextDocument,
    pos: &mut Position,
    count: usize,
    bigword: bool,
    eol: bool,
) -> bool {
    for _ in 0..count.max(1) {
        let sclass = cls(doc, *pos, bigword);
        let step = dec(doc, pos);
        if step == Step::Edge {
            return false;
        }
        if eol && step == Step::NewLine {
            return true;
        }
        if sclass != 0 {
            while cls(doc, *pos, bigword) == sclass {
                let step = dec(doc, pos);
                if step == Step::Edge || (eol && step == Step::NewLine) {
                    return true;
                }
            }
        }
        while cls(doc, *pos, bigword) == 0 {
            if on_empty_line(doc, *pos) {
                break;
            }
            let step = dec(doc, pos);
            if step == Step::Edge || (eol && step == Step::NewLine) {
                return true;
            }
        }
    }
    true
}

pub fn first_non_blank_pos(doc: &dyn TextDocument, line: usize) -> Position {
    let line = line.min(doc.last_line());
    let text = doc.line(line).unwrap_or_default();
    let col = first_non_blank(&text);
    Position::new(line, col.min(text.chars().count().saturating_sub(1)))
}

/// `f t F T`: column of the `count`-th occurrence of `target` in the line.
/// For `till` the column stops one short. `repeat` skips an adjacent match
/// so `;` after `t` makes progress.
pub fn find_char_in_line(
    doc: &dyn TextDocument,
    pos: Position,
    target: char,
    forward: bool,
    till: bool,
    count: usize,
    repeat: bool,
) -> Option<usize> {
    let chars: Vec<char> = doc.line(pos.line)?.chars().collect();
    let mut col = pos.col as isize;
    let mut remaining = count.max(1);
    let step: isize = if forward { 1 } else { -1 };
    let mut first = true;
    while remaining > 0 {
        col += step;
        if col < 0 || col as usize >= chars.len() {
            return None;
        }
        if chars[col as usize] == target {
            // `;` after `t` would otherwise find the char it stopped before.
            if till && repeat && first && remaining == 1 && (col - pos.col as isize).abs() == 1 {
                first = false;
                continue;
            }
            remaining -= 1;
        }
        first = false;
    }
    let col = if till { col - step } else { col };
    Some(col as usize)
}

/// `{` / `}`. Returns the target and whether the motion became inclusive
/// (it ran into the last line).
pub fn paragraph(
    doc: &dyn TextDocument,
    pos: Position,
    forward: bool,
    count: usize,
) -> Option<(Position, bool)> {
    let last = doc.last_line();
    let mut curr = pos.line;
    for remaining in (0..count.max(1)).rev() {
        let mut did_skip = false;
        let mut first = true;
        loop {
            if !doc.is_line_empty(curr) {
                did_skip = true;
            }
            if !first && did_skip && doc.is_line_empty(curr) {
                break;
            }
            let next = if forward {
                (curr < last).then(|| curr + 1)
            } else {
                curr.checked_sub(1)
            };
            match next {
                Some(n) => curr = n,
                None => {
                    if remaining > 0 {
                        return None;
                    }
                    break;
                }
            }
            first = false;
        }
    }
    if curr == last && forward {
        let len = doc.line_len(curr);
        if len != 0 {
            return Some((Position::new(curr, len - 1), true));
        }
    }
    if curr == 0 && !forward {
        return Some((Position::new(0, 0), false));
    }
    Some((Position::new(curr, 0), false))
}

fn is_sentence_end_char(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closing_char(c: char) -> bool {
    matches!(c, ')' | ']' | '"' | '\'')
}

/// True when the char at `off` starts a sentence.
fn sentence_start_at(doc: &dyn TextDocument, off: usize) -> bool {
    let Some(c) = doc.char_at(off) else {
        return false;
    };
    let pos = doc.position_of(off);
    if c == '\n' {
        // An empty line is a boundary on its own.
        return pos.col == 0 && (pos.line == 0 || !doc.is_line_empty(pos.line - 1));
    }
    if is_blank(c) {
        return false;
    }
    if off == 0 {
        return true;
    }
    let mut p = off;
    let mut skipped = false;
    loop {
        if p == 0 {
            return true;
        }
        p -= 1;
        let ch = doc.char_at(p).unwrap_or('\n');
        if ch == '\n' {
            if doc.position_of(p).col == 0 {
                return true;
            }
            skipped = true;
            continue;
        }
        if is_blank(ch) {
            skipped = true;
            continue;
        }
        if !skipped {
            return false;
        }
        let mut end = ch;
        while is_closing_char(end) && p > 0 {
            p -= 1;
            end = doc.char_at(p).unwrap_or('\n');
        }
        return is_sentence_end_char(end);
    }
}

/// `(` / `)`.
pub fn sentence(
    doc: &dyn TextDocument,
    pos: Position,
    forward: bool,
    count: usize,
) -> Option<Position> {
    let total = doc.len_chars();
    let mut off = doc.offset_of(pos);
    for _ in 0..count.max(1) {
        let mut found = None;
        if forward {
            let mut p = off + 1;
            while p < total {
                if sentence_start_at(doc, p) {
                    found = Some(p);
                    break;
                }
                p += 1;
            }
            // Running off the end lands on the last char.
            let target = found.unwrap_or(total.saturating_sub(1));
            if target == off {
                return None;
            }
            off = target;
        } else {
            let mut p = off;
            while p > 0 {
                p -= 1;
                if sentence_start_at(doc, p) {
                    found = Some(p);
                    break;
                }
            }
            let target = found.unwrap_or(0);
            if target == off {
                return None;
            }
            off = target;
        }
    }
    let mut target = doc.position_of(off);
    let len = doc.line_len(target.line);
    if target.col >= len && len > 0 {
        target.col = len - 1;
    }
    Some(target)
}

fn pair_of(c: char) -> Option<(char, char, bool)> {
    match c {
        '(' => Some(('(', ')', true)),
        '[' => Some(('[', ']', true)),
        '{' => Some(('{', '}', true)),
        ')' => Some(('(', ')', false)),
        ']' => Some(('[', ']', false)),
        '}' => Some(('{', '}', false)),
        _ => None,
    }
}

/// `%`: find the bracket under or after the cursor in the line and jump to
/// its partner.
pub fn match_pair(doc: &dyn TextDocument, pos: Position) -> Option<Position> {
    let text = doc.line(pos.line)?;
    let (col, c) = text
        .chars()
        .enumerate()
        .skip(pos.col)
        .find(|(_, c)| pair_of(*c).is_some())?;
    let (open, close, forward) = pair_of(c)?;
    let start = doc.offset_of(Position::new(pos.line, col));
    scan_balanced(doc, start, open, close, forward, 1)
}

/// `[(` `[{` `])` `]}`: the `count`-th unmatched bracket around the cursor.
pub fn unmatched(
    doc: &dyn TextDocument,
    pos: Position,
    open: char,
    close: char,
    forward: bool,
    count: usize,
) -> Option<Position> {
    let start = doc.offset_of(pos);
    scan_balanced(doc, start, open, close, forward, count.max(1))
}

fn scan_balanced(
    doc: &dyn TextDocument,
    start: usize,
    open: char,
    close: char,
    forward: bool,
    count: usize,
) -> Option<Position> {
    let total = doc.len_chars();
    let (same, other) = if forward { (open, close) } else { (close, open) };
    let mut depth = 0usize;
    let mut found = 0usize;
    let mut off = start;
    loop {
        if forward {
            off += 1;
            if off >= total {
                return None;
            }
        } else {
            if off == 0 {
                return None;
            }
            off -= 1;
        }
        let c = doc.char_at(off)?;
        if c == same {
            depth += 1;
        } else if c == other {
            if depth == 0 {
                found += 1;
                if found == count {
                    return Some(doc.position_of(off));
                }
            } else {
                depth -= 1;
            }
        }
    }
}
