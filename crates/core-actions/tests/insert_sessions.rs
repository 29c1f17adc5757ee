mod common;

use common::*;
use core_state::Mode;
use pretty_assertions::assert_eq;

#[test]
fn counted_insert_repeats_text() {
    let s = run("", "3iab<Esc>");
    assert_eq!(s.text(), "ababab\n");
    assert_eq!(s.cursor(), pos(0, 5));
    assert_eq!(s.reg('.'), "ab");
    assert_eq!(s.engine.redo_log(), "3iab\x1b");
}

#[test]
fn counted_insert_undoes_in_one_step() {
    let s = run("abc", "3ix<Esc>u");
    assert_eq!(s.text(), "abc\n");
}

#[test]
fn replace_with_line_break() {
    let s = run("abcd", "lr<CR>");
    assert_eq!(s.text(), "a\ncd\n");
    assert_eq!(s.cursor(), pos(1, 0));
    assert_eq!(s.model.state.mode, Mode::Normal);

    let s = run("abcd", "l2r<CR>");
    assert_eq!(s.text(), "a\nd\n");
}

#[test]
fn replace_past_line_end_fails() {
    let s = run("abc", "l5rx");
    assert_eq!(s.text(), "abc\n");
    assert_eq!(s.bells(), 1);
}

#[test]
fn ctrl_r_inserts_register() {
    let s = run("foo", "yiwA <C-r>\"<Esc>");
    assert_eq!(s.text(), "foo foo\n");
}

#[test]
fn ctrl_a_inserts_last_inserted_text() {
    let s = run("", "ifoo<Esc>A-<C-a><Esc>");
    assert_eq!(s.text(), "foo-foo\n");
}

#[test]
fn ctrl_at_inserts_and_leaves_insert() {
    let s = run("", "ifoo<Esc>o<Nul>");
    assert_eq!(s.text(), "foo\nfoo\n");
    assert_eq!(s.model.state.mode, Mode::Normal);
    assert!(s.engine.is_idle());
}

#[test]
fn ctrl_a_without_previous_insert_rings() {
    let mut s = Session::new("");
    s.feed("i<C-a>");
    assert_eq!(s.message(), Some("E29: No inserted text yet"));
    assert_eq!(s.model.state.mode, Mode::Insert);
    s.feed("x<Esc>");
    assert_eq!(s.text(), "x\n");
}

#[test]
fn ctrl_v_inserts_escape_literally() {
    let s = run("", "i<C-v><Esc><Esc>");
    assert_eq!(s.text(), "\x1b\n");
    assert_eq!(s.engine.redo_log(), "i\x16\x1b\x1b");
}

#[test]
fn unsupported_insert_key_ends_session() {
    let s = run("abc", "i<C-o>");
    assert_eq!(s.message(), Some("Not supported: i_CTRL-O"));
    assert_eq!(s.model.state.mode, Mode::Normal);
    assert!(s.engine.is_idle());
}

#[test]
fn replace_mode_backspace_restores_in_reverse() {
    let mut s = Session::new("abcd");
    s.feed("Rxyz");
    assert_eq!(s.model.state.mode, Mode::Replace);
    assert_eq!(s.text(), "xyzd\n");
    s.feed("<BS><BS><BS><Esc>");
    assert_eq!(s.text(), "abcd\n");
}

#[test]
fn change_then_escape_leaves_cursor_on_last_inserted() {
    let s = run("one two", "wC2<Esc>");
    assert_eq!(s.text(), "one 2\n");
    assert_eq!(s.cursor(), pos(0, 4));
    assert_eq!(s.reg('"'), "two");
}

#[test]
fn substitute_char_with_count() {
    let s = run("abcdef", "3sX<Esc>");
    assert_eq!(s.text(), "Xdef\n");
    assert_eq!(s.reg('-'), "abc");
}

#[test]
fn insert_marks_are_set() {
    let s = run("abc", "AXY<Esc>");
    assert_eq!(s.model.state.marks.get('^'), Ok(pos(0, 5)));
    assert_eq!(s.model.state.marks.get('['), Ok(pos(0, 3)));
}
