mod common;

use common::*;
use pretty_assertions::assert_eq;

#[test]
fn dot_repeats_last_change() {
    let s = run("one two three", "dw.");
    assert_eq!(s.text(), "three\n");
    assert_eq!(s.engine.redo_log(), "dw");
}

#[test]
fn dot_count_replaces_original_count() {
    let mut s = Session::new("a b c d e f");
    s.feed("2dw");
    assert_eq!(s.text(), "c d e f\n");
    s.feed("3.");
    assert_eq!(s.text(), "f\n");
    assert_eq!(s.engine.redo_log(), "3dw");
}

#[test]
fn dot_repeats_counted_insert() {
    let mut s = Session::new("");
    s.feed("3iab<Esc>");
    assert_eq!(s.text(), "ababab\n");
    assert_eq!(s.cursor(), pos(0, 5));
    s.feed(".");
    assert_eq!(s.text(), "ababaabababb\n");
    assert_eq!(s.cursor(), pos(0, 10));
}

#[test]
fn dot_repeats_change_word() {
    let s = run("foo bar", "cwnew<Esc>w.");
    assert_eq!(s.text(), "new new\n");
}

#[test]
fn dot_after_numbered_put_walks_the_history() {
    let mut s = Session::new("a\nb\nc\nd");
    s.feed("dddddd");
    assert_eq!(s.text(), "d\n");
    assert_eq!(s.reg('1'), "c\n");
    assert_eq!(s.reg('2'), "b\n");
    assert_eq!(s.reg('3'), "a\n");
    s.feed("\"1p..");
    assert_eq!(s.text(), "d\nc\nb\na\n");
}

#[test]
fn dot_with_nothing_to_repeat_rings() {
    let s = run("abc", ".");
    assert_eq!(s.bells(), 1);
    assert_eq!(s.text(), "abc\n");
}

#[test]
fn yank_does_not_replace_the_redo_command() {
    let s = run("one two three", "dwyw.");
    assert_eq!(s.text(), "three\n");
}

#[test]
fn increment_and_repeat() {
    let mut s = Session::new("x 7 y");
    s.feed("5<C-a>");
    assert_eq!(s.text(), "x 12 y\n");
    assert_eq!(s.cursor(), pos(0, 3));
    s.feed(".");
    assert_eq!(s.text(), "x 17 y\n");
    s.feed("20<C-x>");
    assert_eq!(s.text(), "x -3 y\n");
}

#[test]
fn record_and_replay_macro() {
    let mut s = Session::new("abc\nabc\nabc");
    s.feed("qa");
    assert_eq!(s.engine.recording(), Some('a'));
    assert_eq!(s.message(), Some("recording @a"));
    s.feed("xjq");
    assert_eq!(s.engine.recording(), None);
    assert_eq!(s.reg('a'), "xj");
    s.feed("2@a");
    // the second `j` fails on the last line and aborts the rest
    assert_eq!(s.text(), "bc\nbc\nbc\n");
    assert_eq!(s.bells(), 1);
    assert!(s.engine.is_idle());
}

#[test]
fn at_at_repeats_last_register() {
    let mut s = Session::new("abc\nabc\nabc");
    s.feed("qa0xjq@a");
    assert_eq!(s.text(), "bc\nbc\nabc\n");
    s.feed("@@");
    assert_eq!(s.text(), "bc\nbc\nbc\n");
}

#[test]
fn at_at_without_history_fails() {
    let s = run("abc", "@@");
    assert_eq!(s.message(), Some("E748: No previously used register"));
    assert_eq!(s.bells(), 1);
}

#[test]
fn uppercase_register_appends_recording() {
    let s = run("abcd", "qaxqqAxq");
    assert_eq!(s.reg('a'), "xx");
    assert_eq!(s.text(), "cd\n");
}

#[test]
fn stuffed_keys_are_not_recorded() {
    let mut s = Session::new("abc\nabc");
    s.feed("qbxq");
    s.feed("j");
    s.feed("qc@bq");
    assert_eq!(s.reg('c'), "@b");
    assert_eq!(s.text(), "bc\nbc\n");
}

#[test]
fn macro_with_insert_session() {
    let mut s = Session::new("a\nb");
    s.feed("qqA!<Esc>jq@q");
    assert_eq!(s.reg('q'), "A!\x1bj");
    assert_eq!(s.text(), "a!\nb!\n");
}

#[test]
fn at_colon_replays_command_line() {
    let mut s = Session::new("abc");
    s.feed(":retab<CR>@:");
    let commands: Vec<String> = s.colon_requests().into_iter().map(|r| r.command).collect();
    assert_eq!(commands, vec!["retab".to_string(), "retab".to_string()]);
}

#[test]
fn executing_empty_register_fails() {
    let s = run("abc", "@z");
    assert_eq!(s.message(), Some("E353: Nothing in register z"));
    assert_eq!(s.bells(), 1);
}

#[test]
fn undo_restores_whole_change_and_redo_reapplies() {
    let mut s = Session::new("foo bar");
    s.feed("cwxyz<Esc>");
    assert_eq!(s.text(), "xyz bar\n");
    s.feed("u");
    assert_eq!(s.text(), "foo bar\n");
    s.feed("<C-r>");
    assert_eq!(s.text(), "xyz bar\n");
    s.feed("<C-r>");
    assert_eq!(s.message(), Some("Already at newest change"));
}
