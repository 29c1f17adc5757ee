//! Plain-text summary of a finished replay.

use core_actions::Engine;
use core_events::display_char;
use core_model::EditorModel;
use core_state::RegisterKind;
use std::fmt::Write;

fn kind_tag(kind: RegisterKind) -> &'static str {
    match kind {
        RegisterKind::Char => "c",
        RegisterKind::Line => "l",
        RegisterKind::Block { .. } => "b",
    }
}

fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' { "^J".to_string() } else { display_char(c) })
        .collect()
}

/// Buffer text, then cursor, mode and messages; registers on request.
pub(crate) fn render(engine: &Engine, model: &EditorModel, registers: bool) -> String {
    let mut out = model.text();
    let cur = model.cursor();
    let status = &model.state.status;
    let _ = writeln!(out, "-- cursor {}:{}", cur.line + 1, cur.col + 1);
    let mode = model.state.mode.label();
    if !mode.is_empty() {
        let _ = writeln!(out, "-- mode {mode}");
    }
    if !engine.is_idle() && !status.pending.is_empty() {
        let _ = writeln!(out, "-- pending {}", status.pending);
    }
    if let Some(reg) = engine.recording() {
        let _ = writeln!(out, "-- recording @{reg}");
    }
    for msg in status.messages() {
        let _ = writeln!(out, "-- message {msg}");
    }
    if status.bells() > 0 {
        let _ = writeln!(out, "-- bells {}", status.bells());
    }
    if registers {
        for (name, content) in model.state.registers.snapshot() {
            let _ = writeln!(out, "\"{name} {} {}", kind_tag(content.kind), printable(&content.text));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::parse_notation;
    use pretty_assertions::assert_eq;

    fn replay(text: &str, keys: &str) -> (Engine, EditorModel) {
        let mut model = EditorModel::from_text(text);
        let mut engine = Engine::default();
        engine.feed_keys(&mut model, &parse_notation(keys).unwrap());
        (engine, model)
    }

    #[test]
    fn reports_text_cursor_and_registers() {
        let (engine, model) = replay("one two\nthree", "dwj");
        assert_eq!(
            render(&engine, &model, true),
            "two\nthree\n-- cursor 2:1\n\"\" c one \n\"1 c one \n\"- c one \n"
        );
    }

    #[test]
    fn reports_mode_messages_and_bells() {
        let (engine, model) = replay("abc", "Kqai");
        let out = render(&engine, &model, false);
        assert!(out.contains("-- mode -- INSERT --\n"), "{out}");
        assert!(out.contains("-- recording @a\n"), "{out}");
        assert!(out.contains("-- message Not supported: K\n"), "{out}");
        assert!(out.contains("-- bells 1\n"), "{out}");
    }

    #[test]
    fn linewise_register_shows_newlines() {
        let (engine, model) = replay("a\nb", "yj");
        let out = render(&engine, &model, true);
        assert!(out.contains("\"0 l a^Jb^J\n"), "{out}");
    }
}
