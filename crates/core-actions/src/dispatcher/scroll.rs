//! Viewport commands: `Ctrl-E` `Ctrl-Y` `Ctrl-D` `Ctrl-U` `Ctrl-F` `Ctrl-B`
//! and the `z` family. They move `view.top_line`, then pull the cursor back
//! into the viewport when the scroll left it outside.

use crate::engine::Engine;
use crate::error::{Effect, EngineError, EngineResult};
use crate::parser::Command;
use core_model::EditorModel;
use core_text::motion::first_non_blank_pos;
use tracing::trace;

impl Engine {
    pub(crate) fn scroll_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        let last = model.doc.last_line();
        let height = model.view.height.max(1);
        let count = cmd.count1();
        let cur = model.view.cursor;
        match cmd.name() {
            "\x05" => {
                model.view.top_line = (model.view.top_line + count).min(last);
                self.keep_cursor_in_view(model, false);
            }
            "\x19" => {
                model.view.top_line = model.view.top_line.saturating_sub(count);
                self.keep_cursor_in_view(model, false);
            }
            "\x04" | "\x15" => {
                let down = cmd.name() == "\x04";
                if cmd.count0 > 0 {
                    self.scroll_amount = cmd.count0;
                }
                let amount = if self.scroll_amount > 0 { self.scroll_amount } else { (height / 2).max(1) };
                if down {
                    if cur.line == last {
                        return Err(EngineError::InvalidCommand);
                    }
                    let max_top = last.saturating_sub(height - 1);
                    model.view.top_line = (model.view.top_line + amount).min(max_top.max(model.view.top_line));
                    let line = (cur.line + amount).min(last);
                    model.view.cursor = Self::line_jump_target(model, line);
                } else {
                    if cur.line == 0 {
                        return Err(EngineError::InvalidCommand);
                    }
                    model.view.top_line = model.view.top_line.saturating_sub(amount);
                    let line = cur.line.saturating_sub(amount);
                    model.view.cursor = Self::line_jump_target(model, line);
                }
            }
            "\x06" => {
                if model.view.top_line >= last {
                    return Err(EngineError::InvalidCommand);
                }
                let page = height.saturating_sub(2).max(1);
                model.view.top_line = (model.view.top_line + page * count).min(last);
                self.keep_cursor_in_view(model, true);
            }
            "\x02" => {
                if model.view.top_line == 0 {
                    return Err(EngineError::InvalidCommand);
                }
                let page = height.saturating_sub(2).max(1);
                model.view.top_line = model.view.top_line.saturating_sub(page * count);
                self.keep_cursor_in_view(model, true);
            }
            name => {
                // z commands: a count names the line to put at the position
                let line = if cmd.count0 > 0 { (cmd.count0 - 1).min(last) } else { cur.line };
                let first_col = matches!(name, "z\r" | "z." | "z-");
                if line != cur.line || first_col {
                    model.view.cursor = if first_col {
                        first_non_blank_pos(model.doc.as_ref(), line)
                    } else {
                        Self::vertical_target(model, line)
                    };
                    if first_col {
                        model.view.set_curswant = true;
                    }
                }
                model.view.top_line = match name {
                    "zt" | "z\r" => line,
                    "zz" | "z." => line.saturating_sub(height / 2),
                    _ => (line + 1).saturating_sub(height),
                };
            }
        }
        trace!(target: "actions.dispatch", top = model.view.top_line, cursor = ?model.view.cursor, "scroll");
        Ok(Effect::moved())
    }

    /// After a scroll, move the cursor onto the nearest visible line.
    fn keep_cursor_in_view(&mut self, model: &mut EditorModel, page: bool) {
        let top = model.view.top_line;
        let bottom = model.view.bottom_line().min(model.doc.last_line());
        let line = model.view.cursor.line;
        let target = line.clamp(top, bottom.max(top));
        if target != line {
            model.view.cursor = if page {
                Self::line_jump_target(model, target)
            } else {
                Self::vertical_target(model, target)
            };
        }
    }
}
