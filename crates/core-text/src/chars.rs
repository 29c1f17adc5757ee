//! Character classification and display-column helpers.
//!
//! Word motions work on three classes: blank (space, tab, newline), punctuation
//! and keyword characters. With `bigword` set every non-blank is one class.

use unicode_width::UnicodeWidthChar;

pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

pub fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Class of `c` for word motions: 0 blank, 1 punctuation, 2 keyword.
pub fn class_of(c: char, bigword: bool) -> u8 {
    if is_blank(c) || c == '\n' {
        0
    } else if bigword {
        1
    } else if is_word_char(c) {
        2
    } else {
        1
    }
}

/// Display cells `c` occupies when it starts at display column `vcol`.
pub fn cell_width(c: char, vcol: usize, tabstop: usize) -> usize {
    if c == '\t' {
        let ts = tabstop.max(1);
        ts - (vcol % ts)
    } else {
        UnicodeWidthChar::width(c).unwrap_or(0).max(1)
    }
}

/// Display column at which char column `col` starts.
pub fn vcol_of(line: &str, col: usize, tabstop: usize) -> usize {
    let mut vcol = 0;
    for c in line.chars().take(col) {
        vcol += cell_width(c, vcol, tabstop);
    }
    vcol
}

/// Char column covering display column `vcol` (clamped to the line length).
pub fn col_for_vcol(line: &str, vcol: usize, tabstop: usize) -> usize {
    let mut cur = 0;
    for (idx, c) in line.chars().enumerate() {
        let w = cell_width(c, cur, tabstop);
        if cur + w > vcol {
            return idx;
        }
        cur += w;
    }
    line.chars().count()
}

pub fn display_width(line: &str, tabstop: usize) -> usize {
    vcol_of(line, line.chars().count(), tabstop)
}

/// Column of the first non-blank char (line length when the line is all blank).
pub fn first_non_blank(line: &str) -> usize {
    line.chars().take_while(|c| is_blank(*c)).count()
}

/// Width of the leading whitespace measured in display cells.
pub fn indent_width(line: &str, tabstop: usize) -> usize {
    let lead: String = line.chars().take_while(|c| is_blank(*c)).collect();
    display_width(&lead, tabstop)
}

/// Leading whitespace that renders `width` cells.
pub fn build_indent(width: usize, tabstop: usize, expandtab: bool) -> String {
    let ts = tabstop.max(1);
    if expandtab {
        " ".repeat(width)
    } else {
        let mut s = "\t".repeat(width / ts);
        s.push_str(&" ".repeat(width % ts));
        s
    }
}

/// Swap the case of a single char (first mapping only for multi-char cases).
pub fn swap_case(c: char) -> char {
    if c.is_lowercase() {
        c.to_uppercase().next().unwrap_or(c)
    } else if c.is_uppercase() {
        c.to_lowercase().next().unwrap_or(c)
    } else {
        c
    }
}

pub fn rot13(c: char) -> char {
    match c {
        'a'..='z' => (((c as u8 - b'a') + 13) % 26 + b'a') as char,
        'A'..='Z' => (((c as u8 - b'A') + 13) % 26 + b'A') as char,
        _ => c,
    }
}
