mod common;

use common::*;
use pretty_assertions::assert_eq;

struct Case<'a> {
    name: &'a str,
    text: &'a str,
    keys: &'a str,
    expect: &'a str,
    cursor: Option<(usize, usize)>,
}

const CASES: &[Case] = &[
    Case {
        name: "dw",
        text: "hello world",
        keys: "dw",
        expect: "world\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "d2w",
        text: "one two three",
        keys: "d2w",
        expect: "three\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "2d3w multiplies counts",
        text: "a b c d e f g h",
        keys: "2d3w",
        expect: "g h\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "de is inclusive",
        text: "foo bar",
        keys: "de",
        expect: " bar\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "D to end of line",
        text: "abc def",
        keys: "wD",
        expect: "abc \n",
        cursor: Some((0, 3)),
    },
    Case {
        name: "dd",
        text: "a\nb\nc",
        keys: "dd",
        expect: "b\nc\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "dj is linewise",
        text: "a\nb\nc",
        keys: "dj",
        expect: "c\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "dG from the second line",
        text: "a\nb\nc",
        keys: "jdG",
        expect: "a\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "cw acts like ce",
        text: "foo bar",
        keys: "cwxy<Esc>",
        expect: "xy bar\n",
        cursor: Some((0, 1)),
    },
    Case {
        name: "cc replaces the line",
        text: "old\nkeep",
        keys: "ccnew<Esc>",
        expect: "new\nkeep\n",
        cursor: Some((0, 2)),
    },
    Case {
        name: "yyp",
        text: "a\nb",
        keys: "yyp",
        expect: "a\na\nb\n",
        cursor: Some((1, 0)),
    },
    Case {
        name: "3x clears a short line",
        text: "abc",
        keys: "3x",
        expect: "\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "X deletes before the cursor",
        text: "abc",
        keys: "$X",
        expect: "ac\n",
        cursor: Some((0, 1)),
    },
    Case {
        name: "dl on the last char",
        text: "abc",
        keys: "$dl",
        expect: "ab\n",
        cursor: Some((0, 1)),
    },
    Case {
        name: "d0",
        text: "abc",
        keys: "$d0",
        expect: "c\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "gUiw",
        text: "foo bar",
        keys: "gUiw",
        expect: "FOO bar\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "g~~ toggles the line",
        text: "aBc",
        keys: "g~~",
        expect: "AbC\n",
        cursor: None,
    },
    Case {
        name: "dt)",
        text: "f(abc)",
        keys: "f(ldt)",
        expect: "f()\n",
        cursor: Some((0, 2)),
    },
    Case {
        name: "di(",
        text: "f(abc)",
        keys: "f(di(",
        expect: "f()\n",
        cursor: None,
    },
    Case {
        name: "ci\" inside quotes",
        text: "say \"hi\"",
        keys: "f\"lci\"x<Esc>",
        expect: "say \"x\"\n",
        cursor: None,
    },
    Case {
        name: "3J joins three lines",
        text: "a\nb\nc\nd",
        keys: "3J",
        expect: "a b c\nd\n",
        cursor: None,
    },
    Case {
        name: "3rx",
        text: "abcd",
        keys: "3rx",
        expect: "xxxd\n",
        cursor: Some((0, 2)),
    },
    Case {
        name: "~ advances",
        text: "abc",
        keys: "~",
        expect: "Abc\n",
        cursor: Some((0, 1)),
    },
    Case {
        name: "yiwP",
        text: "foo bar",
        keys: "yiwP",
        expect: "foofoo bar\n",
        cursor: Some((0, 2)),
    },
    Case {
        name: "dap",
        text: "a\nb\n\nc",
        keys: "dap",
        expect: "c\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "d/ with a search pattern",
        text: "one two three",
        keys: "d/thr<CR>",
        expect: "three\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "dd over CRLF text",
        text: "one\r\ntwo\r\n",
        keys: "dd",
        expect: "two\n",
        cursor: Some((0, 0)),
    },
    Case {
        name: "literal CR is an ordinary char",
        text: "ab",
        keys: "i<C-v><CR><Esc>$x",
        expect: "\ra\n",
        cursor: Some((0, 1)),
    },
];

#[test]
fn operator_matrix() {
    for case in CASES {
        let s = run(case.text, case.keys);
        assert_eq!(s.text(), case.expect, "text after {:?} ({})", case.keys, case.name);
        if let Some((line, col)) = case.cursor {
            assert_eq!(s.cursor(), pos(line, col), "cursor after {:?} ({})", case.keys, case.name);
        }
        assert!(s.engine.is_idle(), "engine not idle after {:?} ({})", case.keys, case.name);
        assert_eq!(s.bells(), 0, "bell after {:?} ({})", case.keys, case.name);
    }
}

#[test]
fn delete_word_fills_registers() {
    let s = run("hello world", "dw");
    assert_eq!(s.reg('"'), "hello ");
    assert_eq!(s.reg('-'), "hello ");
    assert_eq!(s.reg('1'), "hello ");
    assert_eq!(s.engine.redo_log(), "dw");
}

#[test]
fn counted_dd_reports_fewer_lines() {
    let s = run("1\n2\n3\n4\n5", "3dd");
    assert_eq!(s.text(), "4\n5\n");
    assert_eq!(s.reg('"'), "1\n2\n3\n");
    assert_eq!(s.message(), Some("3 fewer lines"));
    assert_eq!(s.cursor(), pos(0, 0));
}

#[test]
fn named_register_yank_and_append() {
    let mut s = Session::new("foo bar");
    s.feed("\"ayiww\"Ayiw");
    assert_eq!(s.reg('a'), "foobar");
    assert_eq!(s.reg('0'), "");
    s.feed("$\"ap");
    assert_eq!(s.text(), "foo barfoobar\n");
}

#[test]
fn black_hole_register_keeps_unnamed() {
    let s = run("one two", "yiww\"_dw");
    assert_eq!(s.text(), "one \n");
    assert_eq!(s.reg('"'), "one");
}

#[test]
fn dd_on_last_line_with_count_fails() {
    let s = run("a\nb", "j2dd");
    assert_eq!(s.text(), "a\nb\n");
    assert_eq!(s.bells(), 1);
    assert!(s.engine.is_idle());
}

#[test]
fn mismatched_second_operator_is_rejected() {
    let s = run("abc def", "dyw");
    assert_eq!(s.text(), "abc def\n");
    assert_eq!(s.bells(), 1);
    assert_eq!(s.engine.pending_operator(), None);
}
