//! Text objects: `iw aw iW aW is as ip ap` and the bracket and quote
//! objects (`i( a) ib i{ aB i[ i< i" a' i\``).
//!
//! Each object resolves to a [`Region`] around the cursor. Word and quote
//! objects stay within the cursor line; sentence, paragraph and bracket
//! objects may span lines. `None` means there is no such object here.

use crate::op_resolver::Region;
use core_text::chars::{class_of, first_non_blank, is_blank};
use core_text::motion;
use core_text::{Position, TextDocument};

/// Resolve `i{obj}` (`around == false`) or `a{obj}`.
pub fn select(doc: &dyn TextDocument, pos: Position, obj: char, around: bool, count: usize) -> Option<Region> {
    let count = count.max(1);
    match obj {
        'w' => word(doc, pos, count, false, around),
        'W' => word(doc, pos, count, true, around),
        's' => sentence(doc, pos, count, around),
        'p' => paragraph(doc, pos, count, around),
        '(' | ')' | 'b' => block(doc, pos, '(', ')', count, around),
        '{' | '}' | 'B' => block(doc, pos, '{', '}', count, around),
        '[' | ']' => block(doc, pos, '[', ']', count, around),
        '<' | '>' => block(doc, pos, '<', '>', count, around),
        '"' | '\'' | '`' => quote(doc, pos, obj, around),
        _ => None,
    }
}

fn word(doc: &dyn TextDocument, pos: Position, count: usize, bigword: bool, around: bool) -> Option<Region> {
    let chars: Vec<char> = doc.line(pos.line)?.chars().collect();
    if chars.is_empty() {
        return None;
    }
    let len = chars.len();
    let class = |i: usize| class_of(chars[i], bigword);
    let run_start = |mut i: usize| {
        while i > 0 && class(i - 1) == class(i) {
            i -= 1;
        }
        i
    };
    let run_end = |mut i: usize| {
        while i + 1 < len && class(i + 1) == class(i) {
            i += 1;
        }
        i
    };
    let col = pos.col.min(len - 1);
    let mut start = run_start(col);
    let mut end = run_end(col);
    let on_blank = class(col) == 0;
    if around {
        if on_blank {
            if end + 1 < len {
                end = run_end(end + 1);
            }
        } else if end + 1 < len && class(end + 1) == 0 {
            end = run_end(end + 1);
        } else if start > 0 && class(start - 1) == 0 {
            start = run_start(start - 1);
        }
    }
    for _ in 1..count {
        if end + 1 >= len {
            return None;
        }
        end = run_end(end + 1);
        if around && end + 1 < len {
            end = run_end(end + 1);
        }
    }
    Some(Region::charwise(
        Position::new(pos.line, start),
        Position::new(pos.line, end),
        true,
    ))
}

fn sentence(doc: &dyn TextDocument, pos: Position, count: usize, around: bool) -> Option<Region> {
    let total = doc.len_chars();
    let off = doc.offset_of(pos);
    let probe = doc.position_of((off + 1).min(total.saturating_sub(1)));
    let start = if off == 0 {
        Position::origin()
    } else {
        motion::sentence(doc, probe, false, 1).unwrap_or(Position::origin())
    };
    let mut next = start;
    for _ in 0..count {
        next = motion::sentence(doc, next, true, 1)?;
    }
    let next_off = doc.offset_of(next);
    if around {
        return Some(Region::charwise(start, next, false));
    }
    let start_off = doc.offset_of(start);
    let mut end_off = next_off;
    while end_off > start_off + 1 {
        match doc.char_at(end_off - 1) {
            Some(c) if is_blank(c) || c == '\n' => end_off -= 1,
            _ => break,
        }
    }
    Some(Region::charwise(start, doc.position_of(end_off - 1), true))
}

fn line_is_white(doc: &dyn TextDocument, line: usize) -> bool {
    doc.line(line).is_none_or(|l| l.chars().all(is_blank))
}

fn paragraph(doc: &dyn TextDocument, pos: Position, count: usize, around: bool) -> Option<Region> {
    let last = doc.last_line();
    let white = |l: usize| line_is_white(doc, l);
    let run_start = |mut l: usize| {
        while l > 0 && white(l - 1) == white(l) {
            l -= 1;
        }
        l
    };
    let run_end = |mut l: usize| {
        while l < last && white(l + 1) == white(l) {
            l += 1;
        }
        l
    };
    let mut start = run_start(pos.line);
    let mut end = run_end(pos.line);
    if around {
        if end < last {
            end = run_end(end + 1);
        } else if start > 0 {
            start = run_start(start - 1);
        }
    }
    for _ in 1..count {
        if end >= last {
            return None;
        }
        end = run_end(end + 1);
        if around && end < last {
            end = run_end(end + 1);
        }
    }
    Some(Region::linewise(Position::new(start, 0), Position::new(end, 0)))
}

fn block(
    doc: &dyn TextDocument,
    pos: Position,
    open: char,
    close: char,
    count: usize,
    around: bool,
) -> Option<Region> {
    let under = doc.char_at_pos(pos);
    let open_pos = if under == Some(open) {
        if count == 1 {
            pos
        } else {
            motion::unmatched(doc, pos, open, close, false, count - 1)?
        }
    } else {
        motion::unmatched(doc, pos, open, close, false, count)?
    };
    let close_pos = motion::unmatched(doc, open_pos, open, close, true, 1)?;
    if around {
        return Some(Region::charwise(open_pos, close_pos, true));
    }
    let mut start_off = doc.offset_of(open_pos) + 1;
    let mut end_off = doc.offset_of(close_pos);
    if start_off >= end_off {
        let p = doc.position_of(start_off);
        return Some(Region::charwise(p, p, false));
    }
    let mut sol = false;
    if doc.char_at(start_off) == Some('\n') {
        start_off += 1;
        sol = true;
    }
    let close_line = doc.line(close_pos.line).unwrap_or_default();
    if close_pos.line > open_pos.line && close_pos.col <= first_non_blank(&close_line) {
        end_off = doc.line_start(close_pos.line);
        if sol && start_off < end_off {
            let first = doc.position_of(start_off).line;
            return Some(Region::linewise(
                Position::new(first, 0),
                Position::new(close_pos.line - 1, 0),
            ));
        }
    }
    if start_off >= end_off {
        let p = doc.position_of(start_off.min(end_off));
        return Some(Region::charwise(p, p, false));
    }
    Some(Region::charwise(
        doc.position_of(start_off),
        doc.position_of(end_off),
        false,
    ))
}

fn quote(doc: &dyn TextDocument, pos: Position, q: char, around: bool) -> Option<Region> {
    let chars: Vec<char> = doc.line(pos.line)?.chars().collect();
    let len = chars.len();
    if len == 0 {
        return None;
    }
    let col = pos.col.min(len - 1);
    let quotes: Vec<usize> = (0..len)
        .filter(|&i| chars[i] == q && (i == 0 || chars[i - 1] != '\\'))
        .collect();
    let (open, close) = if let Some(idx) = quotes.iter().position(|&i| i == col) {
        if idx % 2 == 0 {
            (col, *quotes.get(idx + 1)?)
        } else {
            (quotes[idx - 1], col)
        }
    } else {
        let before = quotes.iter().rev().find(|&&i| i < col).copied();
        let after = quotes.iter().find(|&&i| i > col).copied();
        match (before, after) {
            (Some(b), Some(a)) => (b, a),
            (None, Some(a)) => {
                let idx = quotes.iter().position(|&i| i == a)?;
                (a, *quotes.get(idx + 1)?)
            }
            _ => return None,
        }
    };
    let at = |c: usize| Position::new(pos.line, c);
    if around {
        let mut start = open;
        let mut end = close;
        if end + 1 < len && is_blank(chars[end + 1]) {
            while end + 1 < len && is_blank(chars[end + 1]) {
                end += 1;
            }
        } else {
            while start > 0 && is_blank(chars[start - 1]) {
                start -= 1;
            }
        }
        return Some(Region::charwise(at(start), at(end), true));
    }
    if close == open + 1 {
        return Some(Region::charwise(at(close), at(close), false));
    }
    Some(Region::charwise(at(open + 1), at(close - 1), true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op_resolver::MotionKind;
    use core_text::Buffer;

    fn text_of(doc: &Buffer, r: Region) -> String {
        match r.kind {
            MotionKind::Line => (r.start.line..=r.end.line)
                .map(|l| doc.line(l).unwrap() + "\n")
                .collect(),
            _ => {
                let s = doc.offset_of(r.start);
                let e = doc.offset_of(r.end) + usize::from(r.inclusive);
                doc.slice(s, e)
            }
        }
    }

    fn sel(text: &str, pos: (usize, usize), obj: char, around: bool) -> String {
        let doc = Buffer::from_str("t", text);
        let r = select(&doc, Position::new(pos.0, pos.1), obj, around, 1).expect("object");
        text_of(&doc, r)
    }

    #[test]
    fn inner_and_around_word() {
        assert_eq!(sel("foo bar baz", (0, 5), 'w', false), "bar");
        assert_eq!(sel("foo bar baz", (0, 5), 'w', true), "bar ");
        assert_eq!(sel("foo bar", (0, 5), 'w', true), " bar");
        assert_eq!(sel("foo   bar", (0, 4), 'w', false), "   ");
        assert_eq!(sel("foo   bar", (0, 4), 'w', true), "   bar");
        assert_eq!(sel("a.b c", (0, 0), 'W', false), "a.b");
    }

    #[test]
    fn word_count_extends() {
        let doc = Buffer::from_str("t", "one two three");
        let r = select(&doc, Position::origin(), 'w', false, 3).unwrap();
        assert_eq!(text_of(&doc, r), "one two");
        assert!(select(&doc, Position::new(0, 9), 'w', false, 5).is_none());
    }

    #[test]
    fn brackets() {
        assert_eq!(sel("f(a, (b))", (0, 3), '(', false), "a, (b)");
        assert_eq!(sel("f(a, (b))", (0, 3), 'b', true), "(a, (b))");
        assert_eq!(sel("f(a, (b))", (0, 6), ')', false), "b");
        assert_eq!(sel("x{y}", (0, 1), 'B', false), "y");
        assert_eq!(sel("<a>", (0, 1), '<', true), "<a>");
    }

    #[test]
    fn nested_bracket_count() {
        let doc = Buffer::from_str("t", "f(a, (b))");
        let r = select(&doc, Position::new(0, 6), '(', false, 2).unwrap();
        assert_eq!(text_of(&doc, r), "a, (b)");
    }

    #[test]
    fn multiline_inner_block_is_linewise() {
        let doc = Buffer::from_str("t", "if {\n  a\n  b\n}");
        let r = select(&doc, Position::new(1, 2), '{', false, 1).unwrap();
        assert_eq!(r.kind, MotionKind::Line);
        assert_eq!(text_of(&doc, r), "  a\n  b\n");
    }

    #[test]
    fn empty_inner_block() {
        let doc = Buffer::from_str("t", "f()");
        let r = select(&doc, Position::new(0, 1), '(', false, 1).unwrap();
        assert_eq!(r.start, r.end);
        assert!(!r.inclusive);
    }

    #[test]
    fn quotes() {
        assert_eq!(sel(r#"x = "hi there" + y"#, (0, 6), '"', false), "hi there");
        assert_eq!(sel(r#"x = "hi there" + y"#, (0, 6), '"', true), "\"hi there\" ");
        assert_eq!(sel(r#"x = 'a\'b'"#, (0, 5), '\'', false), r"a\'b");
        assert_eq!(sel(r#"say "x" now"#, (0, 0), '"', false), "x");
        assert!(select(&Buffer::from_str("t", "none"), Position::origin(), '"', false, 1).is_none());
    }

    #[test]
    fn paragraphs() {
        let text = "a\nb\n\n\nc\nd";
        assert_eq!(sel(text, (0, 0), 'p', false), "a\nb\n");
        assert_eq!(sel(text, (0, 0), 'p', true), "a\nb\n\n\n");
        assert_eq!(sel(text, (4, 0), 'p', true), "\n\nc\nd\n");
        assert_eq!(sel(text, (2, 0), 'p', false), "\n\n");
    }

    #[test]
    fn sentences() {
        let text = "One two.  Three four.  Five.";
        assert_eq!(sel(text, (0, 12), 's', false), "Three four.");
        assert_eq!(sel(text, (0, 12), 's', true), "Three four.  ");
        assert_eq!(sel(text, (0, 0), 's', false), "One two.");
    }

    #[test]
    fn unknown_object() {
        let doc = Buffer::from_str("t", "abc");
        assert!(select(&doc, Position::origin(), 'z', false, 1).is_none());
    }
}
