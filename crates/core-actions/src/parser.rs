//! Resumable Normal/Visual-mode command parser.
//!
//! One [`Parser::step`] call per char. The parser collects, in order:
//! an optional `"x` register prefix, a count (a leading `0` is the `0`
//! motion, not a digit), the command char, the second char of prefixed
//! commands (`g`, `z`, `Z`, `[`, `]`) and the argument char of commands that
//! take one (`f{char}`, `m{mark}`). `Ctrl-W` collects its own count before
//! the window command char.
//!
//! A count typed before the register prefix and one typed after it multiply
//! (`2"a3dd` deletes six lines).

use crate::command_table::{
    self, CommandEntry, HandlerKind, lookup, lookup_char, lookup_object, lookup_prefixed,
};
use core_events::keys;
use tracing::trace;

/// Largest count the parser accumulates.
pub const MAX_COUNT: usize = 99_999_999;

/// Multiply-accumulate one digit into a count, saturating at [`MAX_COUNT`].
pub fn push_digit(count: usize, digit: usize) -> usize {
    count.saturating_mul(10).saturating_add(digit).min(MAX_COUNT)
}

/// Combine two counts: multiply when both are given.
pub fn combine_counts(outer: usize, inner: usize) -> usize {
    match (outer, inner) {
        (0, n) | (n, 0) => n,
        (a, b) => a.saturating_mul(b).min(MAX_COUNT),
    }
}

/// What surrounds the chunk being parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseContext {
    /// Keys of the pending operator (`"d"`, `"gu"`), enabling text objects
    /// and the doubled linewise form (`dd`, `guu`, `gugu`).
    pub pending_op: Option<&'static str>,
    pub visual: bool,
    /// `q` stops recording instead of taking a register.
    pub recording: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub register: Option<char>,
    /// Count typed (0 when none); counts around `"x` already multiplied.
    pub count0: usize,
    /// Count typed after `Ctrl-W`.
    pub window_count: usize,
    pub cmdchar: char,
    /// Second char of a prefixed command (`u` in `gu`).
    pub nchar: Option<char>,
    /// Argument char (`x` in `fx`, `w` in `iw`).
    pub arg: Option<char>,
    /// `None` for an unknown command.
    pub entry: Option<&'static CommandEntry>,
    /// Doubled operator (`dd`, `gUU`): act on `count` lines.
    pub shorthand: bool,
    /// Command keys without register and count, for the redo log.
    pub keys: String,
}

impl Command {
    pub fn count1(&self) -> usize {
        self.count0.max(1)
    }

    /// Key sequence that selected the table entry (`"gu"`, `"f"`).
    pub fn name(&self) -> &'static str {
        self.entry.map_or("", |e| e.keys)
    }

    pub fn kind(&self) -> Option<HandlerKind> {
        self.entry.map(|e| e.kind)
    }

    pub fn is_escape(&self) -> bool {
        self.cmdchar == keys::ESC && self.entry.is_some_and(|e| e.keys == "\x1b")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Register,
    WindowCount,
    Second,
    Extra,
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    NeedMore,
    Complete(Command),
}

#[derive(Debug, Default)]
pub struct Parser {
    phase: Phase,
    register: Option<char>,
    outer_count: usize,
    count: usize,
    window_count: usize,
    cmdchar: char,
    nchar: Option<char>,
    entry: Option<&'static CommandEntry>,
    keys: String,
    typed: String,
}

fn is_shorthand(pending: &str, c: char) -> bool {
    let mut it = pending.chars();
    match (it.next(), it.next(), it.next()) {
        (Some(p), None, _) => p == c,
        (Some('g'), Some(s), None) => s == c,
        _ => false,
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while no char of a command has been consumed.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && self.typed.is_empty()
    }

    /// Everything typed for the current chunk (status-line echo).
    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Seed the register of the next chunk (`"a<C-E>p` keeps `"a`).
    pub fn keep_register(&mut self, register: Option<char>) {
        if self.register.is_none() {
            self.register = register;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn step(&mut self, c: char, ctx: ParseContext) -> Step {
        self.typed.push(c);
        let step = match self.phase {
            Phase::Idle => self.step_idle(c, ctx),
            Phase::Register => {
                if c == keys::ESC {
                    self.finish_escape()
                } else {
                    self.register = Some(c);
                    self.outer_count = combine_counts(self.outer_count, self.count);
                    self.count = 0;
                    self.phase = Phase::Idle;
                    Step::NeedMore
                }
            }
            Phase::WindowCount => {
                if c == keys::ESC {
                    self.finish_escape()
                } else if c.is_ascii_digit() && (c != '0' || self.window_count > 0) {
                    self.window_count = push_digit(self.window_count, c as usize - '0' as usize);
                    Step::NeedMore
                } else {
                    self.nchar = Some(c);
                    self.keys.push(c);
                    self.finish_with_arg(c)
                }
            }
            Phase::Second => {
                if c == keys::ESC {
                    return self.finish_escape();
                }
                self.keys.push(c);
                let first = self.cmdchar;
                self.nchar = Some(c);
                if let Some(pending) = ctx.pending_op
                    && self.keys == pending
                {
                    self.entry = lookup(pending);
                    return self.finish(true);
                }
                self.entry = lookup_prefixed(first, c);
                match self.entry {
                    Some(e) if e.takes_arg() => {
                        self.phase = Phase::Extra;
                        Step::NeedMore
                    }
                    _ => self.finish(false),
                }
            }
            Phase::Extra => {
                if c == keys::ESC {
                    self.finish_escape()
                } else if c == keys::ctrl('v') && matches!(self.cmdchar, 'r' | 'f' | 'F' | 't' | 'T') {
                    self.phase = Phase::Literal;
                    Step::NeedMore
                } else {
                    self.keys.push(c);
                    self.finish_with_arg(c)
                }
            }
            Phase::Literal => {
                self.keys.push(keys::ctrl('v'));
                self.keys.push(c);
                self.finish_with_arg(c)
            }
        };
        if let Step::Complete(cmd) = &step {
            trace!(target: "actions.parser", keys = %cmd.keys.escape_debug(), count = cmd.count0, register = ?cmd.register, known = cmd.entry.is_some(), "command_complete");
        }
        step
    }

    fn step_idle(&mut self, c: char, ctx: ParseContext) -> Step {
        if c.is_ascii_digit() && (c != '0' || self.count > 0) {
            self.count = push_digit(self.count, c as usize - '0' as usize);
            return Step::NeedMore;
        }
        self.cmdchar = c;
        if let Some(pending) = ctx.pending_op
            && is_shorthand(pending, c)
        {
            self.keys.push(c);
            self.entry = lookup(pending);
            return self.finish(true);
        }
        let object_ctx = ctx.pending_op.is_some() || ctx.visual;
        self.entry = if object_ctx && (c == 'i' || c == 'a') {
            lookup_object(c)
        } else {
            lookup_char(c)
        };
        let Some(entry) = self.entry else {
            self.keys.push(c);
            return self.finish(false);
        };
        match entry.keys {
            "\"" => {
                self.phase = Phase::Register;
                return Step::NeedMore;
            }
            "\x17" => {
                self.keys.push(c);
                self.phase = Phase::WindowCount;
                return Step::NeedMore;
            }
            _ => {}
        }
        self.keys.push(c);
        if entry.kind == HandlerKind::Prefix {
            self.phase = Phase::Second;
            return Step::NeedMore;
        }
        if entry.takes_arg() && !(c == 'q' && ctx.recording) {
            self.phase = Phase::Extra;
            return Step::NeedMore;
        }
        self.finish(false)
    }

    fn finish_with_arg(&mut self, arg: char) -> Step {
        let step = self.finish(false);
        match step {
            Step::Complete(mut cmd) => {
                cmd.arg = Some(arg);
                Step::Complete(cmd)
            }
            other => other,
        }
    }

    /// Escape in the middle of a command: abandon it.
    fn finish_escape(&mut self) -> Step {
        let cmd = Command {
            register: None,
            count0: 0,
            window_count: 0,
            cmdchar: keys::ESC,
            nchar: None,
            arg: None,
            entry: command_table::lookup("\x1b"),
            shorthand: false,
            keys: String::from(keys::ESC),
        };
        self.reset();
        Step::Complete(cmd)
    }

    fn finish(&mut self, shorthand: bool) -> Step {
        let cmd = Command {
            register: self.register,
            count0: combine_counts(self.outer_count, self.count),
            window_count: self.window_count,
            cmdchar: self.cmdchar,
            nchar: self.nchar,
            arg: None,
            entry: self.entry,
            shorthand,
            keys: std::mem::take(&mut self.keys),
        };
        self.reset();
        Step::Complete(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(keys: &str, ctx: ParseContext) -> Command {
        let mut p = Parser::new();
        let mut out = None;
        for c in keys.chars() {
            if let Step::Complete(cmd) = p.step(c, ctx) {
                out = Some(cmd);
            }
        }
        out.expect("complete command")
    }

    fn normal(keys: &str) -> Command {
        parse(keys, ParseContext::default())
    }

    #[test]
    fn simple_motion_with_count() {
        let cmd = normal("12w");
        assert_eq!(cmd.count0, 12);
        assert_eq!(cmd.name(), "w");
        assert_eq!(cmd.keys, "w");
    }

    #[test]
    fn leading_zero_is_a_motion() {
        let cmd = normal("0");
        assert_eq!(cmd.count0, 0);
        assert_eq!(cmd.name(), "0");
        assert_eq!(normal("10j").count0, 10);
    }

    #[test]
    fn count_saturates() {
        let cmd = normal("999999999999x");
        assert_eq!(cmd.count0, MAX_COUNT);
    }

    #[test]
    fn register_prefix_and_multiplied_counts() {
        let cmd = normal("2\"a3d");
        assert_eq!(cmd.register, Some('a'));
        assert_eq!(cmd.count0, 6);
        assert_eq!(cmd.name(), "d");
        assert_eq!(cmd.keys, "d");
    }

    #[test]
    fn prefixed_and_argument_commands() {
        let cmd = normal("gU");
        assert_eq!(cmd.name(), "gU");
        assert_eq!(cmd.nchar, Some('U'));
        let cmd = normal("3fx");
        assert_eq!(cmd.name(), "f");
        assert_eq!(cmd.arg, Some('x'));
        assert_eq!(cmd.keys, "fx");
        assert_eq!(cmd.count0, 3);
    }

    #[test]
    fn literal_argument_after_ctrl_v() {
        let cmd = normal("r\x16\x1b");
        assert_eq!(cmd.arg, Some('\x1b'));
        assert_eq!(cmd.keys, "r\x16\x1b");
    }

    #[test]
    fn escape_abandons_partial_command() {
        let cmd = normal("\"a3f\x1b");
        assert!(cmd.is_escape());
        assert_eq!(cmd.register, None);
        assert_eq!(cmd.count0, 0);
    }

    #[test]
    fn unknown_command_completes_without_entry() {
        let cmd = normal("\u{00e9}");
        assert!(cmd.entry.is_none());
        let cmd = normal("gX");
        assert!(cmd.entry.is_none());
    }

    #[test]
    fn doubled_operators_are_shorthand() {
        for (pending, keys) in [("d", "d"), ("gu", "u"), ("gu", "gu"), ("g?", "?"), ("gq", "q"), (">", ">")] {
            let cmd = parse(keys, ParseContext { pending_op: Some(pending), ..Default::default() });
            assert!(cmd.shorthand, "{pending} + {keys}");
            assert_eq!(cmd.name(), pending);
        }
        let cmd = parse("3d", ParseContext { pending_op: Some("d"), ..Default::default() });
        assert!(cmd.shorthand);
        assert_eq!(cmd.count0, 3);
    }

    #[test]
    fn text_objects_only_with_operator_or_visual() {
        let ctx = ParseContext { pending_op: Some("d"), ..Default::default() };
        let cmd = parse("iw", ctx);
        assert_eq!(cmd.kind(), Some(HandlerKind::Object));
        assert_eq!(cmd.arg, Some('w'));
        let visual = ParseContext { visual: true, ..Default::default() };
        assert_eq!(parse("a(", visual).kind(), Some(HandlerKind::Object));
        assert_eq!(normal("i").kind(), Some(HandlerKind::InsertEntry));
    }

    #[test]
    fn q_while_recording_takes_no_register() {
        let ctx = ParseContext { recording: true, ..Default::default() };
        let cmd = parse("q", ctx);
        assert_eq!(cmd.name(), "q");
        assert_eq!(cmd.arg, None);
    }

    #[test]
    fn window_command_collects_its_own_count() {
        let cmd = normal("2\x173s");
        assert_eq!(cmd.count0, 2);
        assert_eq!(cmd.window_count, 3);
        assert_eq!(cmd.nchar, Some('s'));
        assert_eq!(cmd.arg, Some('s'));
    }

    #[test]
    fn typed_echo_and_idle() {
        let mut p = Parser::new();
        assert!(p.is_idle());
        assert_eq!(p.step('"', ParseContext::default()), Step::NeedMore);
        p.step('a', ParseContext::default());
        p.step('2', ParseContext::default());
        assert_eq!(p.typed(), "\"a2");
        assert!(!p.is_idle());
        p.step('x', ParseContext::default());
        assert!(p.is_idle());
    }

    #[test]
    fn kept_register_carries_into_next_chunk() {
        let mut p = Parser::new();
        p.keep_register(Some('b'));
        let Step::Complete(cmd) = p.step('p', ParseContext::default()) else {
            panic!("p completes");
        };
        assert_eq!(cmd.register, Some('b'));
    }
}
