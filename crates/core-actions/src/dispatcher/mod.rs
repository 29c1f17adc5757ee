//! Command dispatch.
//!
//! Parsed commands are routed by their table entry:
//! * `motion`  - cursor motions, and motions that complete an operator
//! * `edit`    - direct text commands (`x`, `r`, `J`, `p`, `.`, `@` ...)
//! * `mode`    - Insert entry, Visual entry, Escape
//! * `command` - the `:` `/` `?` command line
//! * `scroll`  - viewport commands (`Ctrl-E`, `zt` ...)
//! * `undo`    - `u` and `Ctrl-R`
//! * `visual`  - everything typed while a selection is active

use crate::command_table::HandlerKind;
use crate::engine::{Engine, EngineState};
use crate::error::{Effect, EngineError, EngineResult};
use crate::op_resolver::{OpKind, Region};
use crate::parser::{Command, combine_counts};
use crate::text_object;
use core_events::display_char;
use core_model::EditorModel;
use core_state::Mode;
use core_text::Position;
use tracing::{debug, trace};

mod command;
mod edit;
mod mode;
mod motion;
mod scroll;
mod undo;
mod visual;

pub(crate) use command::LineEntry;

/// Printable form of a command's keys (`^]`, `gr`).
pub(crate) fn describe(keys: &str) -> String {
    keys.chars().map(display_char).collect()
}

impl Engine {
    pub(crate) fn execute(&mut self, model: &mut EditorModel, cmd: Command) -> EngineResult {
        let Some(entry) = cmd.entry else {
            trace!(target: "actions.dispatch", keys = %cmd.keys.escape_debug(), "unknown_command");
            return Err(EngineError::InvalidCommand);
        };
        debug!(target: "actions.dispatch", keys = %cmd.keys.escape_debug(), count = cmd.count0, register = ?cmd.register, "dispatch");
        if cmd.is_escape() {
            return self.escape(model, &cmd);
        }
        if cmd.shorthand {
            return self.linewise_operator(model, &cmd);
        }
        if matches!(self.state, EngineState::Visual(_)) {
            return self.visual_command(model, &cmd);
        }
        let result = match entry.kind {
            HandlerKind::Motion => self.motion_command(model, &cmd),
            HandlerKind::Object => self.object_command(model, &cmd),
            HandlerKind::Operator(op) => self.operator_command(model, &cmd, op),
            HandlerKind::Direct => self.direct_command(model, &cmd),
            HandlerKind::InsertEntry if !self.oap.pending() => self.insert_entry(model, &cmd),
            HandlerKind::InsertEntry | HandlerKind::Prefix => Err(EngineError::InvalidCommand),
            HandlerKind::Unsupported => Err(EngineError::unsupported(describe(&cmd.keys))),
        };
        if entry.keeps_register() && result.is_ok() {
            self.parser.keep_register(cmd.register);
        }
        result
    }

    /// An operator key: start waiting for the motion.
    pub(crate) fn operator_command(
        &mut self,
        model: &mut EditorModel,
        cmd: &Command,
        op: OpKind,
    ) -> EngineResult {
        if self.oap.pending() {
            // `dy`, `cd`: a second, different operator
            return Err(EngineError::InvalidCommand);
        }
        self.oap.begin(op, cmd.name(), cmd.count0, cmd.register);
        model.state.set_mode(Mode::OperatorPending);
        Ok(Effect::mode())
    }

    /// `dd`, `3>>`, `gUU`: the operator on `count` lines from the cursor.
    fn linewise_operator(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        if !self.oap.pending() {
            return Err(EngineError::InvalidCommand);
        }
        let count = combine_counts(self.oap.opcount, cmd.count0).max(1);
        let cur = model.view.cursor;
        let last = model.doc.last_line();
        if count > 1 && cur.line == last {
            return Err(EngineError::InvalidCommand);
        }
        let end = Position::new((cur.line + count - 1).min(last), 0);
        self.apply_operator(model, Region::linewise(cur, end), &cmd.keys, count)
    }

    /// `iw`, `a(` ... after an operator.
    fn object_command(&mut self, model: &mut EditorModel, cmd: &Command) -> EngineResult {
        if !self.oap.pending() {
            return Err(EngineError::InvalidCommand);
        }
        let count = combine_counts(self.oap.opcount, cmd.count0);
        let obj = cmd.arg.ok_or(EngineError::InvalidCommand)?;
        let around = cmd.cmdchar == 'a';
        let region = text_object::select(model.doc.as_ref(), model.view.cursor, obj, around, count.max(1))
            .ok_or(EngineError::InvalidCommand)?;
        self.apply_operator(model, region, &cmd.keys, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_uses_caret_notation() {
        assert_eq!(describe("\x1d"), "^]");
        assert_eq!(describe("gr"), "gr");
    }
}
