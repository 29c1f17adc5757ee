mod common;

use common::*;
use core_actions::{Engine, EngineError, ErrorKind};
use core_model::{Direction, EditorModel, MatchRange, SearchEngine, SearchError, SearchFlags};
use core_text::{Position, TextDocument};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use tracing::dispatcher::{Dispatch, with_default};
use tracing::subscriber::Interest;
use tracing::{Metadata, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

#[derive(Clone, Default)]
struct TargetCapture {
    events: Arc<Mutex<Vec<String>>>,
}

impl TargetCapture {
    fn targets(&self) -> Arc<Mutex<Vec<String>>> {
        self.events.clone()
    }
}

impl<S> Layer<S> for TargetCapture
where
    S: Subscriber,
{
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::always()
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events
            .lock()
            .unwrap()
            .push(event.metadata().target().to_string());
    }
}

#[test]
fn unsupported_command_reports_and_rings() {
    let s = run("abc", "K");
    assert_eq!(s.message(), Some("Not supported: K"));
    assert_eq!(s.bells(), 1);
    assert!(s.engine.is_idle());

    let s = run("abc", "<C-]>");
    assert_eq!(s.message(), Some("Not supported: ^]"));
}

#[test]
fn unknown_command_rings_without_message() {
    let s = run("abc", "gZ");
    assert_eq!(s.bells(), 1);
    assert_eq!(s.message(), None);
}

#[test]
fn recursive_macro_is_too_complex() {
    let mut s = Session::new("abc");
    s.feed("qa@aq");
    assert_eq!(s.reg('a'), "@a");
    s.feed("@a");
    assert_eq!(s.message(), Some("E223: Command too complex"));
    assert!(s.engine.is_idle());
    assert_eq!(s.engine.redo_log(), "");
    s.feed("x");
    assert_eq!(s.text(), "bc\n");
}

#[test]
fn counted_macro_past_the_stuff_limit_is_too_complex() {
    let mut s = Session::new("llll");
    s.feed("\"ayiw99999999@a");
    assert_eq!(s.message(), Some("E223: Command too complex"));
    assert_eq!(s.bells(), 1);
    assert_eq!(s.cursor(), pos(0, 0));
    assert!(s.engine.is_idle());
    s.feed("2@a");
    assert_eq!(s.cursor(), pos(0, 3));
}

#[test]
fn counted_put_past_the_text_limit_fails() {
    let s = run("ab", "yl99999999p");
    assert_eq!(s.message(), Some("E1240: Resulting text too long"));
    assert_eq!(s.text(), "ab\n");
}

#[test]
fn window_commands_reach_the_colon_dispatcher() {
    let mut s = Session::new("abc");
    s.feed("2<C-w>s");
    s.feed("<C-w>3v");
    s.feed("<C-w>o");
    assert_eq!(s.bells(), 0);
    let commands: Vec<String> = s.colon_requests().into_iter().map(|r| r.command).collect();
    assert_eq!(commands, vec!["2wincmd s", "3wincmd v", "wincmd o"]);
}

#[test]
fn word_erase_on_crlf_buffer() {
    let s = run("ab cd\r\nef\r\n", "A<C-w><Esc>");
    assert_eq!(s.text(), "ab \nef\n");
    let s = run("ab cd\r\nef\r\n", "A/\"<C-w><Esc>");
    assert_eq!(s.text(), "ab cd\nef\n");
}

#[test]
fn word_erase_after_literal_carriage_return() {
    let s = run("ab cd", "AA<C-v><CR>B<C-w><Esc>");
    assert_eq!(s.text(), "ab cdA\r\n");
    assert_eq!(s.model.doc.line_count(), 1);
    assert_eq!(s.bells(), 0);

    let s = run("ab", "i<C-v><CR><Esc>");
    assert_eq!(s.text(), "\rab\n");
    assert_eq!(s.model.doc.line_count(), 1);
}

#[test]
fn missing_mark_is_reported() {
    let s = run("abc\ndef", "'z");
    assert_eq!(s.message(), Some("E20: Mark not set"));
    assert_eq!(s.cursor(), pos(0, 0));
}

#[test]
fn mark_jump_round_trip() {
    let s = run("abc\ndef\nghi", "jlmxgg`x");
    assert_eq!(s.cursor(), pos(1, 1));
    let s = run("abc\n  def\nghi", "jmxG'x");
    assert_eq!(s.cursor(), pos(1, 2));
}

#[test]
fn search_not_found_keeps_cursor() {
    let s = run("abc def", "w/zzz<CR>");
    assert_eq!(s.message(), Some("E486: Pattern not found: zzz"));
    assert_eq!(s.cursor(), pos(0, 4));
}

#[test]
fn n_without_pattern_fails() {
    let s = run("abc", "n");
    assert_eq!(s.message(), Some("E35: No previous regular expression"));
}

#[test]
fn star_and_n_walk_matches() {
    let mut s = Session::new("foo bar foo baz foo");
    s.feed("*");
    assert_eq!(s.cursor(), pos(0, 8));
    s.feed("n");
    assert_eq!(s.cursor(), pos(0, 16));
    s.feed("N");
    assert_eq!(s.cursor(), pos(0, 8));
    assert_eq!(s.reg('/'), "\\<foo\\>");
}

/// Host search collaborator that rejects every pattern.
struct RejectingSearch;

impl SearchEngine for RejectingSearch {
    fn search(
        &mut self,
        _doc: &dyn TextDocument,
        pattern: &str,
        _direction: Direction,
        _from: Position,
        _flags: SearchFlags,
    ) -> Result<Option<MatchRange>, SearchError> {
        Err(SearchError::InvalidPattern(pattern.to_string()))
    }
}

#[test]
fn host_search_errors_reach_the_status_line() {
    let mut model = EditorModel::from_text("abc abc").with_search(Box::new(RejectingSearch));
    let mut engine = Engine::default();
    let keys = core_events::parse_notation("w/x<CR>").unwrap();
    engine.feed_keys(&mut model, &keys);
    assert_eq!(model.state.status.last_message(), Some("E383: Invalid search string: x"));
    assert_eq!(model.cursor(), pos(0, 4));
    assert!(engine.is_idle());
}

#[test]
fn feeding_one_char_at_a_time_matches_bulk_feed() -> anyhow::Result<()> {
    let keys = core_events::parse_notation("qa2dwq\"bywu@a<C-r>")?;
    let bulk = run("a b c d e f g", "qa2dwq\"bywu@a<C-r>");
    let mut single = Session::new("a b c d e f g");
    for &c in &keys {
        single.engine.feed(&mut single.model, c);
    }
    assert_eq!(single.text(), bulk.text());
    assert_eq!(single.cursor(), bulk.cursor());
    assert_eq!(single.reg('b'), bulk.reg('b'));
    Ok(())
}

#[test]
fn error_kinds_drive_recovery() {
    assert_eq!(EngineError::CommandTooComplex.kind(), ErrorKind::Capacity);
    assert_eq!(EngineError::unsupported("K").kind(), ErrorKind::Unsupported);
    assert_eq!(EngineError::InvalidCommand.kind(), ErrorKind::User);
}

#[test]
fn failed_command_emits_engine_and_dispatch_targets() {
    let capture = TargetCapture::default();
    let targets = capture.targets();
    let subscriber = Registry::default().with(capture.with_filter(LevelFilter::TRACE));
    let dispatch = Dispatch::new(subscriber);

    with_default(&dispatch, || {
        let mut s = Session::new("abc def");
        s.feed("dwK");
    });

    let recorded = targets.lock().unwrap();
    for target in ["actions.engine", "actions.parser", "actions.dispatch", "actions.operator"] {
        assert!(recorded.iter().any(|t| t == target), "no event for {target}: {recorded:?}");
    }
}

const PARTIALS: &[&str] = &["d", "2d", "d3", "\"a", "\"ay", "c", "g", "gU", "f", "t", "m", "r", "3", "y2", "z", "<C-w>"];

proptest! {
    #[test]
    fn counts_multiply(a in 1usize..4, b in 1usize..4) {
        let text: String = (0..30).map(|i| format!("w{i} ")).collect();
        let split = run(&text, &format!("{a}d{b}w"));
        let joined = run(&text, &format!("d{}w", a * b));
        prop_assert_eq!(split.text(), joined.text());
        prop_assert_eq!(split.reg('"'), joined.reg('"'));
        prop_assert_eq!(split.engine.redo_log(), format!("{}dw", a * b));
    }

    #[test]
    fn escape_abandons_any_partial_command(idx in 0usize..PARTIALS.len(), twice in any::<bool>()) {
        let keys = format!("{}<Esc>{}", PARTIALS[idx], if twice { "<Esc>" } else { "" });
        let s = run("abc def\nghi", &keys);
        prop_assert_eq!(s.text(), "abc def\nghi\n");
        prop_assert_eq!(s.cursor(), pos(0, 0));
        prop_assert!(s.engine.is_idle());
        prop_assert_eq!(s.engine.pending_operator(), None);
    }

    #[test]
    fn word_motion_never_leaves_the_buffer(words in 1usize..8, count in 1usize..20) {
        let text: String = (0..words).map(|i| format!("x{i}")).collect::<Vec<_>>().join(" ");
        let s = run(&text, &format!("{count}w"));
        let cur = s.cursor();
        prop_assert_eq!(cur.line, 0);
        prop_assert!(cur.col < text.chars().count());
    }
}
