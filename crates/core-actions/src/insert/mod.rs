//! Insert, Replace and Virtual-Replace sessions.
//!
//! A session starts with [`Engine::begin_insert`] (from an Insert entry
//! command, the change operator or a block `I`/`A`) and owns every char
//! until Escape. It holds one insert undo group open for its whole life;
//! arrow keys close it and start a fresh one, the way they also restart the
//! redo log as `1i`. Typed keys go to the redo log verbatim so `.` replays
//! the session by feeding the same keys back.

use crate::engine::{Engine, EngineState};
use crate::error::{Effect, EngineError};
use crate::ops::shifted_width;
use core_config::Backspace;
use core_events::{display_char, keys};
use core_model::EditorModel;
use core_state::Mode;
use core_text::Position;
use core_text::chars::{build_indent, cell_width, class_of, col_for_vcol, first_non_blank, indent_width, is_blank, vcol_of};
use tracing::{debug, trace};

mod replace_stack;

use replace_stack::{ReplaceStack, Restore};

/// Outcome of one key in a session.
pub(crate) enum InsertFlow {
    Continue(Effect),
    /// The session ended; the engine is back in Normal mode.
    Leave(Effect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertKind {
    Insert,
    Replace,
    VirtualReplace,
}

impl InsertKind {
    pub(crate) fn mode(self) -> Mode {
        match self {
            InsertKind::Insert => Mode::Insert,
            InsertKind::Replace => Mode::Replace,
            InsertKind::VirtualReplace => Mode::VirtualReplace,
        }
    }

    fn redo_keys(self) -> &'static str {
        match self {
            InsertKind::Insert => "i",
            InsertKind::Replace => "R",
            InsertKind::VirtualReplace => "gR",
        }
    }
}

/// Visual block rows that receive a copy of the text typed on the first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockInsert {
    pub first_line: usize,
    pub last_line: usize,
    pub col: usize,
    /// Short rows are padded (`A`) instead of skipped (`I`, `c`).
    pub append: bool,
    /// `$A`: every row gets the text at its own end.
    pub to_eol: bool,
}

pub(crate) struct InsertStart {
    pub cmdchar: char,
    pub count: usize,
    pub kind: InsertKind,
    pub block: Option<BlockInsert>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Erase {
    Char,
    Word,
    Line,
}

pub(crate) struct InsertSession {
    pub cmdchar: char,
    pub count: usize,
    pub kind: InsertKind,
    /// Where this stretch of typing began.
    pub start: Position,
    /// Net text typed so far.
    pub typed: String,
    replace: ReplaceStack,
    literal_next: bool,
    register_next: bool,
    arrow_used: bool,
    /// Line whose autoindent nothing has been typed after yet.
    auto_indent: Option<usize>,
    /// Block to replicate into, with the first row's length at entry.
    block: Option<(BlockInsert, usize)>,
    /// Text of the first pass of a counted insert.
    repeat_text: Option<String>,
}

/// Copy what was typed on the first block row to the others. Returns the
/// cursor position to leave Insert at.
fn replicate_block(model: &mut EditorModel, block: BlockInsert, base_len: usize, cursor: Position) -> Option<Position> {
    if cursor.line != block.first_line {
        return None;
    }
    let now = model.doc.line_len(block.first_line);
    let col = if block.to_eol { base_len } else { block.col };
    if now > base_len {
        let text: String = model
            .line(block.first_line)
            .chars()
            .skip(col)
            .take(now - base_len)
            .collect();
        for line in block.first_line + 1..=block.last_line.min(model.doc.last_line()) {
            let len = model.doc.line_len(line);
            let at = if block.to_eol { len } else { block.col };
            let start = model.doc.line_start(line);
            if len < at {
                if !block.append {
                    continue;
                }
                model.doc.insert(start + len, &" ".repeat(at - len));
            }
            model.doc.insert(start + at, &text);
        }
        trace!(target: "actions.insert", rows = block.last_line - block.first_line, text = %text, "block_replicated");
    }
    Some(Position::new(block.first_line, col))
}

impl Engine {
    pub(crate) fn begin_insert(&mut self, model: &mut EditorModel, start: InsertStart) -> Result<Effect, EngineError> {
        let cursor = model.view.cursor;
        self.remember_line(model, cursor.line);
        model.state.undo.begin_insert_group(model.doc.as_ref(), cursor);
        debug!(target: "actions.insert", cmdchar = %start.cmdchar, count = start.count, kind = ?start.kind, "begin");
        let block = start.block.map(|b| (b, model.doc.line_len(b.first_line)));
        self.state = EngineState::Insert(InsertSession {
            cmdchar: start.cmdchar,
            count: start.count.max(1),
            kind: start.kind,
            start: cursor,
            typed: String::new(),
            replace: ReplaceStack::default(),
            literal_next: false,
            register_next: false,
            arrow_used: false,
            auto_indent: None,
            block,
            repeat_text: None,
        });
        model.state.set_mode(start.kind.mode());
        Ok(Effect::mode())
    }

    /// Move the anchor after the entry command edited the text itself
    /// (`o`, `O`); `auto_indent` marks the new line's indent as removable.
    pub(crate) fn reanchor_insert(&mut self, pos: Position, auto_indent: bool) {
        if let EngineState::Insert(s) = &mut self.state {
            s.start = pos;
            s.auto_indent = (auto_indent && pos.col > 0).then_some(pos.line);
        }
    }

    pub(crate) fn insert_key(
        &mut self,
        model: &mut EditorModel,
        s: &mut InsertSession,
        c: char,
    ) -> Result<InsertFlow, EngineError> {
        trace!(target: "actions.insert", key = %display_char(c), kind = ?s.kind, "key");
        if s.literal_next {
            s.literal_next = false;
            self.queue.append_redo(c);
            let effect = if c == keys::NL {
                self.break_line(model, s, false)
            } else {
                self.put_char(model, s, c)
            };
            return Ok(InsertFlow::Continue(effect));
        }
        if s.register_next {
            // `Ctrl-R Ctrl-R x` and friends insert the register the same way
            if matches!(c, '\x12' | '\x0f' | '\x10') {
                return Ok(InsertFlow::Continue(Effect::none()));
            }
            s.register_next = false;
            return Ok(InsertFlow::Continue(self.insert_register(model, s, c)));
        }
        match c {
            keys::ESC => return self.leave_insert(model, s),
            keys::K_LEFT | keys::K_RIGHT | keys::K_UP | keys::K_DOWN | keys::K_HOME | keys::K_END => {
                return Ok(InsertFlow::Continue(self.insert_arrow(model, s, c)));
            }
            keys::K_PAGEUP | keys::K_PAGEDOWN => {
                model.state.status.bell();
                return Ok(InsertFlow::Continue(Effect::none()));
            }
            '\x0f' => return Err(EngineError::unsupported("i_CTRL-O")),
            '\x07' | '\x0b' | '\x0e' | '\x10' | '\x18' | '\x1c' => {
                let name = (c as u8 + b'@') as char;
                return Err(EngineError::unsupported(format!("i_CTRL-{name}")));
            }
            _ => {}
        }
        self.stop_arrow(model, s);
        let effect = match c {
            // Ctrl-C: leave without repeating the count
            '\x03' => {
                s.count = 1;
                return self.leave_insert(model, s);
            }
            keys::NUL => {
                let Some(text) = model.state.registers.last_inserted().map(str::to_string) else {
                    self.soft_fail(model, EngineError::NoInsertedText);
                    return Ok(InsertFlow::Continue(Effect::none()));
                };
                self.queue.append_redo_literal(&text);
                self.insert_str(model, s, &text);
                return self.leave_insert(model, s);
            }
            '\x16' | '\x11' => {
                s.literal_next = true;
                self.queue.append_redo('\x16');
                Effect::none()
            }
            '\x12' => {
                s.register_next = true;
                Effect::none()
            }
            '\x01' => match model.state.registers.last_inserted().map(str::to_string) {
                Some(text) => {
                    self.queue.append_redo_literal(&text);
                    self.insert_str(model, s, &text)
                }
                None => {
                    self.soft_fail(model, EngineError::NoInsertedText);
                    Effect::none()
                }
            },
            keys::CR | keys::NL => {
                self.queue.append_redo(c);
                self.break_line(model, s, true)
            }
            _ => {
                self.queue.append_redo(c);
                match c {
                    keys::BS | keys::DEL_ASCII => self.erase(model, s, Erase::Char),
                    '\x17' => self.erase(model, s, Erase::Word),
                    '\x15' => self.erase(model, s, Erase::Line),
                    '\x14' => self.shift_indent(model, s, false),
                    '\x04' => self.shift_indent(model, s, true),
                    '\x05' => self.copy_adjacent(model, s, false),
                    '\x19' => self.copy_adjacent(model, s, true),
                    keys::K_INS => {
                        s.kind = match s.kind {
                            InsertKind::Insert => InsertKind::Replace,
                            _ => InsertKind::Insert,
                        };
                        model.state.set_mode(s.kind.mode());
                        Effect::mode()
                    }
                    keys::K_DEL => self.delete_under(model),
                    keys::TAB => self.insert_tab(model, s),
                    _ => self.put_char(model, s, c),
                }
            }
        };
        Ok(InsertFlow::Continue(effect))
    }

    /// A failure that rings the bell without ending the session.
    fn soft_fail(&mut self, model: &mut EditorModel, err: EngineError) {
        trace!(target: "actions.insert", error = %err, "insert_key_failed");
        model.state.status.message(err.to_string());
        model.state.status.bell();
    }

    /// Insert (or overwrite, in Replace) one char and step past it.
    fn put_char(&mut self, model: &mut EditorModel, s: &mut InsertSession, c: char) -> Effect {
        let cur = model.view.cursor;
        let line = model.line(cur.line);
        let len = line.chars().count();
        let offset = model.doc.offset_of(cur);
        let overwrite = match s.kind {
            InsertKind::Insert => false,
            _ if cur.col >= len => false,
            InsertKind::Replace => true,
            InsertKind::VirtualReplace => match line.chars().nth(cur.col) {
                // a tab is only replaced once the typed text covers all its cells
                Some('\t') => {
                    let ts = model.options.edit.tabstop;
                    let vcol = vcol_of(&line, cur.col, ts);
                    cell_width(c, vcol, ts) >= cell_width('\t', vcol, ts)
                }
                _ => true,
            },
        };
        if overwrite {
            let old = model.doc.replace(offset, offset + 1, &c.to_string());
            if let Some(old) = old.chars().next() {
                s.replace.push_overwrite(old);
            }
        } else {
            model.doc.insert(offset, &c.to_string());
            if s.kind != InsertKind::Insert {
                s.replace.push_insert();
            }
        }
        model.view.cursor = Position::new(cur.line, cur.col + 1);
        s.typed.push(c);
        s.auto_indent = None;
        Effect::dirty()
    }

    fn insert_str(&mut self, model: &mut EditorModel, s: &mut InsertSession, text: &str) -> Effect {
        let mut effect = Effect::none();
        for c in text.chars() {
            effect.merge(if c == '\n' {
                self.break_line(model, s, false)
            } else {
                self.put_char(model, s, c)
            });
        }
        effect
    }

    fn insert_register(&mut self, model: &mut EditorModel, s: &mut InsertSession, name: char) -> Effect {
        match model.state.registers.get(name) {
            Ok(content) => {
                self.queue.append_redo_literal(&content.text);
                self.insert_str(model, s, &content.text)
            }
            Err(err) => {
                self.soft_fail(model, err.into());
                Effect::none()
            }
        }
    }

    fn insert_tab(&mut self, model: &mut EditorModel, s: &mut InsertSession) -> Effect {
        if !model.options.edit.expandtab {
            return self.put_char(model, s, keys::TAB);
        }
        let ts = model.options.edit.tabstop.max(1);
        let cur = model.view.cursor;
        let vcol = vcol_of(&model.line(cur.line), cur.col, ts);
        let mut effect = Effect::none();
        for _ in 0..ts - vcol % ts {
            effect.merge(self.put_char(model, s, ' '));
        }
        effect
    }

    /// Split the line at the cursor; `autoindent` copies the current indent
    /// when the option is on.
    fn break_line(&mut self, model: &mut EditorModel, s: &mut InsertSession, autoindent: bool) -> Effect {
        self.clear_auto_indent(model, s);
        let cur = model.view.cursor;
        let line = model.line(cur.line);
        let indent: String = if autoindent && model.options.edit.autoindent {
            line.chars().take_while(|c| is_blank(*c)).collect()
        } else {
            String::new()
        };
        // blanks after the cursor give way to the copied indent
        let skip = if indent.is_empty() {
            0
        } else {
            line.chars().skip(cur.col).take_while(|c| is_blank(*c)).count()
        };
        let offset = model.doc.offset_of(cur);
        model.doc.replace(offset, offset + skip, &format!("\n{indent}"));
        model.state.marks.adjust_lines(cur.line + 1, 0, 1);
        if s.kind != InsertKind::Insert {
            s.replace.push_insert();
        }
        s.typed.push('\n');
        let col = indent.chars().count();
        model.view.cursor = Position::new(cur.line + 1, col);
        s.auto_indent = (col > 0).then_some(cur.line + 1);
        Effect::structural()
    }

    /// Drop an autoindent nothing was typed after.
    fn clear_auto_indent(&mut self, model: &mut EditorModel, s: &mut InsertSession) {
        let Some(line) = s.auto_indent.take() else {
            return;
        };
        let cur = model.view.cursor;
        let text = model.line(line);
        if cur.line != line || !text.chars().all(is_blank) {
            return;
        }
        let start = model.doc.line_start(line);
        model.doc.remove(start, start + text.chars().count());
        model.view.cursor = Position::new(line, 0);
    }

    fn erase(&mut self, model: &mut EditorModel, s: &mut InsertSession, how: Erase) -> Effect {
        let compatible = model.options.edit.backspace == Backspace::Compatible;
        let cur = model.view.cursor;
        if cur.line == 0 && cur.col == 0 {
            model.state.status.bell();
            return Effect::none();
        }
        if cur.col == 0 {
            return self.erase_line_break(model, s, compatible);
        }
        if compatible && cur <= s.start {
            model.state.status.bell();
            return Effect::none();
        }
        let chars: Vec<char> = model.line(cur.line).chars().collect();
        let end = cur.col.min(chars.len());
        let mut target = match how {
            Erase::Char => end.saturating_sub(1),
            Erase::Word => {
                let mut col = end;
                while col > 0 && is_blank(chars[col - 1]) {
                    col -= 1;
                }
                if col > 0 {
                    let class = class_of(chars[col - 1], false);
                    while col > 0 && !is_blank(chars[col - 1]) && class_of(chars[col - 1], false) == class {
                        col -= 1;
                    }
                }
                col
            }
            Erase::Line => {
                let line: String = chars.iter().collect();
                let indent = first_non_blank(&line);
                if cur.line == s.start.line && end > s.start.col {
                    s.start.col
                } else if end > indent {
                    indent
                } else {
                    0
                }
            }
        };
        // word and line erases stop once at the start of the insert
        if cur.line == s.start.line && cur.col > s.start.col && (compatible || how != Erase::Char) {
            target = target.max(s.start.col);
        }
        model.view.cursor.col = end;
        for _ in target..end {
            self.back_one(model, s);
        }
        if !compatible && model.view.cursor < s.start {
            s.start = model.view.cursor;
        }
        Effect::dirty()
    }

    /// Step back over one char on the cursor line, undoing it.
    fn back_one(&mut self, model: &mut EditorModel, s: &mut InsertSession) {
        let cur = model.view.cursor;
        let offset = model.doc.offset_of(cur);
        match s.kind {
            InsertKind::Insert => {
                model.doc.remove(offset - 1, offset);
            }
            _ => match s.replace.pop() {
                Some(Restore::Char(c)) => {
                    model.doc.replace(offset - 1, offset, &c.to_string());
                }
                Some(Restore::Remove) => {
                    model.doc.remove(offset - 1, offset);
                }
                // text from before the session is passed over untouched
                None => {}
            },
        }
        model.view.cursor = Position::new(cur.line, cur.col - 1);
        s.typed.pop();
    }

    /// Backspace in column 0.
    fn erase_line_break(&mut self, model: &mut EditorModel, s: &mut InsertSession, compatible: bool) -> Effect {
        let cur = model.view.cursor;
        let prev_len = model.doc.line_len(cur.line - 1);
        let join = match s.kind {
            InsertKind::Insert => !compatible,
            _ => match s.replace.pop() {
                Some(Restore::Remove) => true,
                Some(Restore::Char(_)) | None => false,
            },
        };
        if !join {
            if compatible || s.kind == InsertKind::Insert {
                model.state.status.bell();
                return Effect::none();
            }
            model.view.cursor = Position::new(cur.line - 1, prev_len);
            return Effect::moved();
        }
        let newline = model.doc.line_start(cur.line) - 1;
        model.doc.remove(newline, newline + 1);
        model.state.marks.adjust_lines(cur.line, 1, 0);
        model.view.cursor = Position::new(cur.line - 1, prev_len);
        if model.view.cursor < s.start {
            s.start = model.view.cursor;
        }
        s.typed.pop();
        Effect::structural()
    }

    /// `Ctrl-T` / `Ctrl-D`: shift the line's indent one `shiftwidth`, keeping
    /// the cursor on the same text. `0 Ctrl-D` and `^ Ctrl-D` remove it all.
    fn shift_indent(&mut self, model: &mut EditorModel, s: &mut InsertSession, left: bool) -> Effect {
        let edit = model.options.edit.clone();
        let mut cur = model.view.cursor;
        let mut line = model.line(cur.line);
        let last_typed = s.typed.chars().last();
        let remove_all = left
            && cur.col > 0
            && matches!(last_typed, Some('0' | '^'))
            && line.chars().nth(cur.col - 1) == last_typed;
        if remove_all {
            let offset = model.doc.offset_of(cur);
            model.doc.remove(offset - 1, offset);
            s.typed.pop();
            cur.col -= 1;
            line = model.line(cur.line);
        }
        let lead = first_non_blank(&line);
        let target = if remove_all {
            0
        } else {
            shifted_width(indent_width(&line, edit.tabstop), left, 1, edit.shiftwidth, true)
        };
        let indent = build_indent(target, edit.tabstop, edit.expandtab);
        let start = model.doc.line_start(cur.line);
        model.doc.replace(start, start + lead, &indent);
        let new_lead = indent.chars().count();
        let col = if cur.col >= lead { cur.col - lead + new_lead } else { new_lead };
        model.view.cursor = Position::new(cur.line, col);
        if new_lead == 0 {
            s.auto_indent = None;
        }
        Effect::dirty()
    }

    /// `Ctrl-E` / `Ctrl-Y`: the char in the same screen column below / above.
    fn copy_adjacent(&mut self, model: &mut EditorModel, s: &mut InsertSession, above: bool) -> Effect {
        let cur = model.view.cursor;
        let other = if above {
            cur.line.checked_sub(1)
        } else {
            (cur.line < model.doc.last_line()).then_some(cur.line + 1)
        };
        let ts = model.options.edit.tabstop;
        let found = other.and_then(|line| {
            let vcol = vcol_of(&model.line(cur.line), cur.col, ts);
            let text = model.line(line);
            text.chars().nth(col_for_vcol(&text, vcol, ts))
        });
        match found {
            Some(c) => self.put_char(model, s, c),
            None => {
                model.state.status.bell();
                Effect::none()
            }
        }
    }

    fn delete_under(&mut self, model: &mut EditorModel) -> Effect {
        let cur = model.view.cursor;
        let offset = model.doc.offset_of(cur);
        if cur.col < model.doc.line_len(cur.line) {
            model.doc.remove(offset, offset + 1);
            return Effect::dirty();
        }
        if cur.line < model.doc.last_line() && model.options.edit.backspace == Backspace::Permissive {
            model.doc.remove(offset, offset + 1);
            model.state.marks.adjust_lines(cur.line + 1, 1, 0);
            return Effect::structural();
        }
        model.state.status.bell();
        Effect::none()
    }

    fn insert_arrow(&mut self, model: &mut EditorModel, s: &mut InsertSession, c: char) -> Effect {
        let cur = model.view.cursor;
        let len = model.doc.line_len(cur.line);
        let target = match c {
            keys::K_LEFT => cur.col.checked_sub(1).map(|col| Position::new(cur.line, col)),
            keys::K_RIGHT => (cur.col < len).then(|| Position::new(cur.line, cur.col + 1)),
            keys::K_UP => cur.line.checked_sub(1).map(|line| Position::new(line, cur.col)),
            keys::K_DOWN => (cur.line < model.doc.last_line()).then(|| Position::new(cur.line + 1, cur.col)),
            keys::K_HOME => Some(Position::new(cur.line, 0)),
            _ => Some(Position::new(cur.line, len)),
        };
        let Some(target) = target else {
            model.state.status.bell();
            return Effect::none();
        };
        self.clear_auto_indent(model, s);
        if !s.arrow_used {
            // the insert so far is complete for redo; a later edit restarts it
            s.arrow_used = true;
            s.count = 1;
            s.block = None;
            self.queue.append_redo(keys::ESC);
        }
        model.set_cursor(target, true);
        Effect::moved()
    }

    /// First edit after arrow keys: a new undo step and a new `1i` redo.
    fn stop_arrow(&mut self, model: &mut EditorModel, s: &mut InsertSession) {
        if !s.arrow_used {
            return;
        }
        s.arrow_used = false;
        let cursor = model.view.cursor;
        s.start = cursor;
        s.typed.clear();
        s.replace.clear();
        model.state.undo.end_insert_group(model.doc.as_ref());
        model.state.undo.begin_insert_group(model.doc.as_ref(), cursor);
        self.queue.reset_redo_log();
        self.queue.append_redo('1');
        self.queue.append_redo_str(s.kind.redo_keys());
        trace!(target: "actions.insert", ?cursor, "insert_restarted");
    }

    fn leave_insert(&mut self, model: &mut EditorModel, s: &mut InsertSession) -> Result<InsertFlow, EngineError> {
        if !s.arrow_used && s.cmdchar != 'r' {
            self.queue.append_redo(keys::ESC);
        }
        if s.count > 1 {
            s.count -= 1;
            if s.repeat_text.is_none() {
                s.repeat_text = Some(s.typed.clone());
            }
            trace!(target: "actions.insert", remaining = s.count, "repeat_insert");
            self.queue.begin_insert_redo()?;
            return Ok(InsertFlow::Continue(Effect::none()));
        }
        self.clear_auto_indent(model, s);
        let mut cursor = model.view.cursor;
        let mut step_back = true;
        if let Some((block, base_len)) = s.block.take()
            && let Some(pos) = replicate_block(model, block, base_len, cursor)
        {
            cursor = pos;
            step_back = false;
        }
        model.state.marks.set('^', model.view.cursor)?;
        model.state.marks.set_changed(s.start.min(cursor), cursor);
        let inserted = s.repeat_text.take().unwrap_or_else(|| std::mem::take(&mut s.typed));
        debug!(target: "actions.insert", cmdchar = %s.cmdchar, inserted = %inserted.escape_debug(), "end");
        model.state.registers.set_last_inserted(inserted);
        model.state.undo.end_insert_group(model.doc.as_ref());
        if step_back {
            cursor.col = cursor.col.saturating_sub(1);
        }
        model.set_cursor(cursor, false);
        model.view.set_curswant = true;
        model.state.set_mode(Mode::Normal);
        Ok(InsertFlow::Leave(Effect::mode().with(Effect::moved())))
    }

    /// End a session that failed: the cursor steps back like Escape and the
    /// mode returns to Normal. The caller closes the undo group.
    pub(crate) fn abort_insert(&mut self, model: &mut EditorModel, s: InsertSession) {
        debug!(target: "actions.insert", cmdchar = %s.cmdchar, "abort");
        let cur = model.view.cursor;
        model.set_cursor(Position::new(cur.line, cur.col.saturating_sub(1)), false);
        model.state.set_mode(Mode::Normal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::parse_notation;

    fn run(text: &str, keys: &str) -> (Engine, EditorModel) {
        let mut model = EditorModel::from_text(text);
        let mut engine = Engine::default();
        engine.feed_keys(&mut model, &parse_notation(keys).unwrap());
        (engine, model)
    }

    #[test]
    fn replace_backspace_restores_original() {
        let (_, model) = run("abcd", "Rxyz<BS><BS><Esc>");
        assert_eq!(model.text(), "xbcd\n");
    }

    #[test]
    fn replace_past_end_of_line_appends() {
        let (_, model) = run("ab", "Rwxyz<BS><Esc>");
        assert_eq!(model.text(), "wxy\n");
    }

    #[test]
    fn compatible_backspace_stops_at_insert_start() {
        let mut model = EditorModel::from_text("abc");
        model.options.edit.backspace = Backspace::Compatible;
        let mut engine = Engine::default();
        engine.feed_keys(&mut model, &parse_notation("Ax<BS><BS>").unwrap());
        assert_eq!(model.line(0), "abc");
        assert_eq!(model.state.status.bells(), 1);
        assert_eq!(model.state.mode, Mode::Insert);
    }

    #[test]
    fn permissive_backspace_joins_lines() {
        let (_, model) = run("ab\ncd", "ji<BS><Esc>");
        assert_eq!(model.text(), "abcd\n");
    }

    #[test]
    fn ctrl_w_deletes_word_before_cursor() {
        let (_, model) = run("", "ifoo bar<C-w>baz<Esc>");
        assert_eq!(model.line(0), "foo baz");
    }

    #[test]
    fn ctrl_u_deletes_entered_text_only() {
        let (_, model) = run("keep", "Anew<C-u><Esc>");
        assert_eq!(model.line(0), "keep");
    }

    #[test]
    fn ctrl_t_and_ctrl_d_shift_indent() {
        let mut model = EditorModel::from_text("x");
        model.options.edit.shiftwidth = 4;
        model.options.edit.expandtab = true;
        let mut engine = Engine::default();
        engine.feed_keys(&mut model, &parse_notation("i<C-t><C-t><C-d><Esc>").unwrap());
        assert_eq!(model.line(0), "    x");
    }

    #[test]
    fn zero_ctrl_d_removes_all_indent() {
        let mut model = EditorModel::from_text("        x");
        let mut engine = Engine::default();
        engine.feed_keys(&mut model, &parse_notation("A0<C-d><Esc>").unwrap());
        assert_eq!(model.line(0), "x");
    }

    #[test]
    fn literal_and_register_insert() {
        let (_, model) = run("word", "yiwA <C-r>\"<C-v><Tab><Esc>");
        assert_eq!(model.line(0), "word word\t");
    }

    #[test]
    fn missing_register_rings_but_keeps_inserting() {
        let (_, model) = run("", "i<C-r>qx<Esc>");
        assert_eq!(model.line(0), "x");
        assert_eq!(model.state.status.bells(), 1);
        assert_eq!(model.state.status.last_message(), Some("E353: Nothing in register q"));
    }

    #[test]
    fn ctrl_y_copies_from_line_above() {
        let (_, model) = run("abc\n\n", "ji<C-y><C-y><Esc>");
        assert_eq!(model.line(1), "ab");
    }

    #[test]
    fn expandtab_inserts_spaces() {
        let mut model = EditorModel::from_text("ab");
        model.options.edit.expandtab = true;
        model.options.edit.tabstop = 4;
        let mut engine = Engine::default();
        engine.feed_keys(&mut model, &parse_notation("A<Tab>c<Esc>").unwrap());
        assert_eq!(model.line(0), "ab  c");
    }

    #[test]
    fn autoindent_copies_indent_and_drops_it_when_unused() {
        let mut model = EditorModel::from_text("  foo");
        model.options.edit.autoindent = true;
        let mut engine = Engine::default();
        engine.feed_keys(&mut model, &parse_notation("A<CR>bar<CR><Esc>").unwrap());
        assert_eq!(model.text(), "  foo\n  bar\n\n");
    }

    #[test]
    fn arrow_restarts_redo() {
        let (engine, model) = run("", "iab<Left>c<Esc>");
        assert_eq!(model.line(0), "acb");
        assert_eq!(engine.redo_log(), "1ic\x1b");
    }

    #[test]
    fn insert_key_toggles_replace() {
        let (_, model) = run("abc", "ix<Insert>y<Esc>");
        assert_eq!(model.line(0), "xybc");
    }
}
