//! Direct commands: edits that run at once (`x`, `p`, `J`, `r`, `~`,
//! `Ctrl-A`), and the register, mark, macro and repeat commands.
//!
//! The single-key shorthands (`x` `X` `D` `C` `s` `S` `Y` `<Del>`) are
//! stuffed as their operator form so they share the operator's register,
//! redo and undo handling.

use super::describe;
use crate::engine::Engine;
use crate::error::{Effect, EngineError, EngineResult};
use crate::insert::{InsertKind, InsertStart};
use crate::ops::join_lines;
use crate::op_resolver::OpKind;
use crate::parser::Command;
use core_events::keys;
use core_model::{ColonRequest, EditorModel, OpFlags};
use core_text::Position;
use core_text::chars::swap_case;
use tracing::debug;

/// A number found by `Ctrl-A` / `Ctrl-X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberSpan {
    /// First char of the number including sign or `0x`.
    start: usize,
    /// First digit.
    digits: usize,
    end: usize,
    hex: bool,
    negative: bool,
}

/// The first number that ends after `col`.
fn find_number(line: &[char], col: usize) -> Option<NumberSpan> {
    let len = line.len();
    let mut i = 0;
    while i < len {
        if line[i] == '0'
            && matches!(line.get(i + 1), Some('x' | 'X'))
            && line.get(i + 2).is_some_and(char::is_ascii_hexdigit)
        {
            let mut end = i + 2;
            while end < len && line[end].is_ascii_hexdigit() {
                end += 1;
            }
            if end > col {
                return Some(NumberSpan {
                    start: i,
                    digits: i + 2,
                    end,
                    hex: true,
                    negative: false,
                });
            }
            i = end;
            continue;
        }
        if line[i].is_ascii_digit() {
            let mut end = i;
            while end < len && line[end].is_ascii_digit() {
                end += 1;
            }
            if end > col {
                let negative = i > 0 && line[i - 1] == '-';
                return Some(NumberSpan {
                    start: if negative { i - 1 } else { i },
                    digits: i,
                    end,
                    hex: false,
                    negative,
                });
            }
            i = end;
            continue;
        }
        i += 1;
    }
    None
}

/// Replacement text for `span` after adding `delta`.
fn add_to_number(line: &[char], span: NumberSpan, delta: i128) -> Option<String> {
    let digits: String = line[span.digits..span.end].iter().collect();
    if span.hex {
        let value = u64::from_str_radix(&digits, 16).ok()?;
        let next = (i128::from(value) + delta).rem_euclid(1 << 64) as u64;
        let mut text = if digits.chars().any(|c| c.is_ascii_uppercase()) {
            format!("{next:X}")
        } else {
            format!("{next:x}")
        };
        while text.len() < digits.len() {
            text.insert(0, '0');
        }
        let prefix: String = line[span.start..span.digits].iter().collect();
        return Some(prefix + &text);
    }
    let value: i128 = digits.parse().ok()?;
    let value = if span.negative { -value } else { value };
    Some(value.checked_add(delta)?.to_string())
}

impl Engine {
    pub(crate) fn direct_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let name = cmd.name();
        if name == "~" && model.options.edit.tildeop {
            return self.operator_command(model, cmd, OpKind::Tilde);
        }
        if self.oap.pending() {
            return Err(EngineError::InvalidCommand);
        }
        match name {
            "x" | "\u{E006}" => self.stuff_operator(cmd, "dl"),
            "X" => self.stuff_operator(cmd, "dh"),
            "D" => self.stuff_operator(cmd, "d$"),
            "C" => self.stuff_operator(cmd, "c$"),
            "s" => self.stuff_operator(cmd, "cl"),
            "S" => self.stuff_operator(cmd, "cc"),
            "Y" => self.stuff_operator(cmd, "yy"),
            "p" | "P" | "gp" | "gP" => {
                self.record_direct(cmd);
                let before = name.ends_with('P');
                self.put(model, cmd.register, cmd.count1(), before, name.starts_with('g'))
            }
            "J" | "gJ" => self.join_command(model, cmd, name == "J"),
            "r" => self.replace_command(model, cmd),
            "~" => self.tilde_command(model, cmd),
            "u" | "\x12" => self.undo_command(model, cmd),
            "U" => self.line_undo_command(model),
            "." => {
                self.queue.begin_redo(cmd.count0)?;
                Ok(Effect::none())
            }
            "q" => self.record_command(model, cmd),
            "@" => self.execute_register(model, cmd),
            "m" => {
                let mark = cmd.arg.ok_or(EngineError::InvalidCommand)?;
                let cur = model.view.cursor;
                match mark {
                    '\'' | '`' => {
                        model.state.marks.set_pcmark(cur);
                    }
                    _ => model.state.marks.set(mark, cur)?,
                }
                Ok(Effect::none())
            }
            "\x01" => self.increment(model, cmd, 1),
            "\x18" => self.increment(model, cmd, -1),
            "\x07" => {
                let lines = model.doc.line_count();
                let line = model.view.cursor.line + 1;
                model
                    .state
                    .status
                    .message(format!("line {line} of {lines} --{}%--", line * 100 / lines));
                Ok(Effect::none())
            }
            "\x0c" => Ok(Effect::none()),
            "\x17" => {
                let c = cmd.arg.ok_or(EngineError::InvalidCommand)?;
                let count = if cmd.window_count > 0 { cmd.window_count } else { cmd.count0 };
                let prefix = if count > 0 { count.to_string() } else { String::new() };
                let command = format!("{prefix}wincmd {}", describe(&c.to_string()));
                self.run_colon(model, ColonRequest::new(command, OpFlags::empty()))
            }
            "ZZ" => self.run_colon(model, ColonRequest::new("x", OpFlags::empty())),
            "ZQ" => self.run_colon(model, ColonRequest::new("q!", OpFlags::empty())),
            "\x05" | "\x19" | "\x04" | "\x15" | "\x06" | "\x02" | "zt" | "zz" | "zb" | "z\r" | "z." | "z-" => {
                self.scroll_command(model, cmd)
            }
            _ => self.mode_command(model, cmd),
        }
    }

    /// Stuff the operator form of a shorthand, keeping register and count.
    fn stuff_operator(&mut self, cmd: &Command, keys: &str) -> EngineResult {
        let mut text = String::new();
        if let Some(reg) = cmd.register {
            text.push('"');
            text.push(reg);
        }
        if cmd.count0 > 0 {
            text.push_str(&cmd.count0.to_string());
        }
        text.push_str(keys);
        self.queue.stuff_front(&text)?;
        Ok(Effect::none())
    }

    /// Start a fresh redo entry for a direct edit.
    fn record_direct(&mut self, cmd: &Command) {
        self.queue.reset_redo_log();
        if let Some(reg) = cmd.register {
            self.queue.append_redo('"');
            self.queue.append_redo(reg);
        }
        self.queue.append_redo_number(cmd.count0);
        self.queue.append_redo_str(&cmd.keys);
    }

    fn join_command(&mut self, model: &mut EditorModel, cmd: &Command, spaces: bool) -> EngineResult {
        let cur = model.view.cursor;
        let last = model.doc.last_line();
        let mut count = cmd.count1().max(2);
        if cur.line + count - 1 > last {
            if count <= 2 {
                return Err(EngineError::InvalidCommand);
            }
            count = last - cur.line + 1;
        }
        self.record_direct(cmd);
        let pos = self.with_undo_group(model, |_, model| Ok(join_lines(model, cur.line, count, spaces)))?;
        model.state.marks.set_changed(Position::new(cur.line, 0), pos);
        model.set_cursor(pos, false);
        model.view.set_curswant = true;
        Ok(Effect::structural())
    }

    /// `r{char}`: replace `count` chars; `r<CR>` replaces them with one line
    /// break through the Insert path.
    fn replace_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let c = cmd.arg.ok_or(EngineError::InvalidCommand)?;
        if c == keys::ESC {
            return Ok(Effect::none());
        }
        let count = cmd.count1();
        let cur = model.view.cursor;
        if cur.col + count > model.doc.line_len(cur.line) {
            return Err(EngineError::InvalidCommand);
        }
        let offset = model.doc.offset_of(cur);
        if c == keys::CR || c == keys::NL {
            self.queue.reset_redo_log();
            self.queue.append_redo_number(cmd.count0);
            self.queue.append_redo('r');
            let effect = self.begin_insert(
                model,
                InsertStart {
                    cmdchar: 'r',
                    count: 1,
                    kind: InsertKind::Insert,
                    block: None,
                },
            )?;
            model.doc.remove(offset, offset + count);
            self.queue.stuff_front("\r\x1b")?;
            return Ok(effect.with(Effect::dirty()));
        }
        self.record_direct(cmd);
        self.with_undo_group(model, |_, model| {
            model.doc.replace(offset, offset + count, &c.to_string().repeat(count));
            Ok(())
        })?;
        let end = Position::new(cur.line, cur.col + count - 1);
        model.state.marks.set_changed(cur, end);
        model.view.cursor = end;
        model.view.set_curswant = true;
        Ok(Effect::dirty())
    }

    /// `~` without `tildeop`: switch case of `count` chars and move right.
    fn tilde_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let cur = model.view.cursor;
        let len = model.doc.line_len(cur.line);
        if len == 0 {
            return Err(EngineError::InvalidCommand);
        }
        let n = cmd.count1().min(len - cur.col);
        self.record_direct(cmd);
        let offset = model.doc.offset_of(cur);
        self.with_undo_group(model, |_, model| {
            let text: String = model.doc.slice(offset, offset + n).chars().map(swap_case).collect();
            model.doc.replace(offset, offset + n, &text);
            Ok(())
        })?;
        model
            .state
            .marks
            .set_changed(cur, Position::new(cur.line, cur.col + n - 1));
        model.set_cursor(Position::new(cur.line, cur.col + n), false);
        model.view.set_curswant = true;
        Ok(Effect::dirty())
    }

    /// `q{reg}` starts recording, a bare `q` stops it.
    fn record_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        if let Some(reg) = self.queue.recording() {
            let keys = self.queue.stop_recording();
            model.state.registers.store_recording(reg, &keys)?;
            return Ok(Effect::mode());
        }
        let reg = cmd.arg.ok_or(EngineError::InvalidCommand)?;
        self.queue.start_recording(reg)?;
        model.state.status.message(format!("recording @{reg}"));
        Ok(Effect::mode())
    }

    /// `@{reg}`, `@@`, `@:`: stuff the register contents `count` times.
    fn execute_register(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let mut reg = cmd.arg.ok_or(EngineError::InvalidCommand)?;
        if reg == '@' {
            reg = self.last_executed.ok_or(EngineError::NoPreviousRegister)?;
        }
        let text = if reg == ':' {
            let last = model
                .state
                .registers
                .last_command()
                .ok_or(EngineError::NoPreviousCommand)?;
            format!(":{last}\r")
        } else {
            model.state.registers.get(reg)?.text
        };
        self.last_executed = Some(reg);
        debug!(target: "actions.dispatch", register = %reg, count = cmd.count1(), len = text.len(), "execute_register");
        self.queue.stuff_front_repeated(&text, cmd.count1())?;
        Ok(Effect::none())
    }

    fn increment(&mut self, model: &mut EditorModel, cmd: &Command, sign: i128) -> EngineResult {
        let cur = model.view.cursor;
        let line: Vec<char> = model.line(cur.line).chars().collect();
        let span = find_number(&line, cur.col).ok_or(EngineError::InvalidCommand)?;
        let delta = sign * i128::try_from(cmd.count1()).unwrap_or(i128::MAX);
        let text = add_to_number(&line, span, delta).ok_or(EngineError::InvalidCommand)?;
        self.record_direct(cmd);
        let base = model.doc.line_start(cur.line);
        self.with_undo_group(model, |_, model| {
            model.doc.replace(base + span.start, base + span.end, &text);
            Ok(())
        })?;
        let end = Position::new(cur.line, span.start + text.chars().count() - 1);
        model.state.marks.set_changed(Position::new(cur.line, span.start), end);
        model.view.cursor = end;
        model.view.set_curswant = true;
        Ok(Effect::dirty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn finds_number_under_or_after_cursor() {
        let line = chars("a 12 b -7");
        let span = find_number(&line, 0).unwrap();
        assert_eq!((span.start, span.end, span.negative), (2, 4, false));
        let span = find_number(&line, 5).unwrap();
        assert_eq!((span.start, span.digits, span.negative), (7, 8, true));
        assert!(find_number(&line, 9).is_none());
    }

    #[test]
    fn decimal_crosses_zero() {
        let line = chars("x -1");
        let span = find_number(&line, 0).unwrap();
        assert_eq!(add_to_number(&line, span, 3).as_deref(), Some("2"));
    }

    #[test]
    fn hex_keeps_case_and_width() {
        let line = chars("0x0F");
        let span = find_number(&line, 0).unwrap();
        assert!(span.hex);
        assert_eq!(add_to_number(&line, span, 1).as_deref(), Some("0x10"));
        let line = chars("0x00ff");
        let span = find_number(&line, 3).unwrap();
        assert_eq!(add_to_number(&line, span, 1).as_deref(), Some("0x0100"));
        assert_eq!(add_to_number(&chars("0x0"), find_number(&chars("0x0"), 0).unwrap(), -1).as_deref(), Some("0xffffffffffffffff"));
    }
}
