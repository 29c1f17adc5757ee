//! Key vocabulary shared by the engine and its hosts.
//!
//! The modal engine consumes plain `char`s. Control keys are their ASCII
//! control codes; keys with no ASCII form (arrows, Home, Delete, ...) are
//! mapped onto a small block of private-use code points (see [`keys`]) so that
//! they can travel through the stuff, redo and record queues like any other
//! character.
//!
//! Hosts either translate their own events through [`KeyEvent::to_char`] or
//! write key strings in `<Esc>`/`<C-w>` notation and run them through
//! [`parse_notation`].

use std::fmt;
use thiserror::Error;

pub mod keys {
    pub const NUL: char = '\0';
    pub const ESC: char = '\x1b';
    pub const CR: char = '\r';
    pub const NL: char = '\n';
    pub const BS: char = '\x08';
    pub const TAB: char = '\t';
    pub const DEL_ASCII: char = '\x7f';

    pub const K_LEFT: char = '\u{E000}';
    pub const K_RIGHT: char = '\u{E001}';
    pub const K_UP: char = '\u{E002}';
    pub const K_DOWN: char = '\u{E003}';
    pub const K_HOME: char = '\u{E004}';
    pub const K_END: char = '\u{E005}';
    pub const K_DEL: char = '\u{E006}';
    pub const K_INS: char = '\u{E007}';
    pub const K_PAGEUP: char = '\u{E008}';
    pub const K_PAGEDOWN: char = '\u{E009}';
    /// Engine-internal: reselect the last Visual extent at the cursor. Only
    /// ever appears in the redo log.
    pub const VISUAL_REPEAT: char = '\u{E00A}';

    /// Control code for an ASCII letter or one of `@[\]^_?`.
    pub const fn ctrl(c: char) -> char {
        match c {
            '?' => DEL_ASCII,
            'a'..='z' => ((c as u8) - b'a' + 1) as char,
            '@'..='_' => ((c as u8) - b'@') as char,
            _ => c,
        }
    }

    pub fn is_special(c: char) -> bool {
        ('\u{E000}'..='\u{E00A}').contains(&c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// KeyCode enumerates normalized logical key representations delivered by a host.
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
    Insert,
    PageUp,
    PageDown,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    /// Engine character for this key, `None` for chords the engine has no
    /// encoding for (e.g. Alt combinations).
    pub fn to_char(&self) -> Option<char> {
        if self.mods.contains(KeyModifiers::ALT) {
            return None;
        }
        let c = match self.code {
            KeyCode::Char(c) if self.mods.contains(KeyModifiers::CTRL) => {
                let lower = c.to_ascii_lowercase();
                let mapped = keys::ctrl(lower);
                if mapped == lower {
                    return None;
                }
                mapped
            }
            KeyCode::Char(c) => c,
            KeyCode::Enter => keys::CR,
            KeyCode::Esc => keys::ESC,
            KeyCode::Backspace => keys::BS,
            KeyCode::Tab => keys::TAB,
            KeyCode::Up => keys::K_UP,
            KeyCode::Down => keys::K_DOWN,
            KeyCode::Left => keys::K_LEFT,
            KeyCode::Right => keys::K_RIGHT,
            KeyCode::Home => keys::K_HOME,
            KeyCode::End => keys::K_END,
            KeyCode::Delete => keys::K_DEL,
            KeyCode::Insert => keys::K_INS,
            KeyCode::PageUp => keys::K_PAGEUP,
            KeyCode::PageDown => keys::K_PAGEDOWN,
        };
        Some(c)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_char() {
            Some(c) => f.write_str(&display_char(c)),
            None => write!(f, "{:?}{:?}", self.code, self.mods),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("unterminated key name starting at byte {0}")]
    Unterminated(usize),
    #[error("unknown key name <{0}>")]
    UnknownKey(String),
}

fn named_key(name: &str) -> Option<char> {
    let lower = name.to_ascii_lowercase();
    let c = match lower.as_str() {
        "esc" => keys::ESC,
        "cr" | "enter" | "return" => keys::CR,
        "nl" => keys::NL,
        "bs" | "backspace" => keys::BS,
        "tab" => keys::TAB,
        "space" => ' ',
        "lt" => '<',
        "bar" => '|',
        "bslash" => '\\',
        "nul" => keys::NUL,
        "del" | "delete" => keys::K_DEL,
        "ins" | "insert" => keys::K_INS,
        "left" => keys::K_LEFT,
        "right" => keys::K_RIGHT,
        "up" => keys::K_UP,
        "down" => keys::K_DOWN,
        "home" => keys::K_HOME,
        "end" => keys::K_END,
        "pageup" => keys::K_PAGEUP,
        "pagedown" => keys::K_PAGEDOWN,
        _ => {
            let rest = lower.strip_prefix("c-")?;
            let mut it = name[2..].chars();
            let c = it.next()?;
            if it.next().is_some() || rest.is_empty() {
                return None;
            }
            let mapped = keys::ctrl(c.to_ascii_lowercase());
            if mapped == c.to_ascii_lowercase() {
                return None;
            }
            mapped
        }
    };
    Some(c)
}

/// Parse a key string such as `"3dw<Esc>"` or `"qa<C-a>q"`. A `<` that does
/// not start a known name is an error; write `<lt>` for a literal `<`.
pub fn parse_notation(input: &str) -> Result<Vec<char>, NotationError> {
    let mut out = Vec::with_capacity(input.len());
    let mut rest = input;
    let mut consumed = 0usize;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            let Some(end) = rest.find('>') else {
                return Err(NotationError::Unterminated(consumed));
            };
            let name = &rest[1..end];
            match named_key(name) {
                Some(k) => out.push(k),
                None => return Err(NotationError::UnknownKey(name.to_string())),
            }
            consumed += end + 1;
            rest = &rest[end + 1..];
        } else {
            out.push(c);
            consumed += c.len_utf8();
            rest = &rest[c.len_utf8()..];
        }
    }
    Ok(out)
}

/// Printable form of an engine character, used for partial-command echo.
pub fn display_char(c: char) -> String {
    match c {
        keys::ESC => "<Esc>".into(),
        keys::CR => "<CR>".into(),
        keys::NL => "<NL>".into(),
        keys::TAB => "<Tab>".into(),
        keys::BS => "<BS>".into(),
        keys::NUL => "<Nul>".into(),
        keys::DEL_ASCII => "^?".into(),
        keys::K_LEFT => "<Left>".into(),
        keys::K_RIGHT => "<Right>".into(),
        keys::K_UP => "<Up>".into(),
        keys::K_DOWN => "<Down>".into(),
        keys::K_HOME => "<Home>".into(),
        keys::K_END => "<End>".into(),
        keys::K_DEL => "<Del>".into(),
        keys::K_INS => "<Insert>".into(),
        keys::K_PAGEUP => "<PageUp>".into(),
        keys::K_PAGEDOWN => "<PageDown>".into(),
        c if (c as u32) < 0x20 => format!("^{}", ((c as u8) + b'@') as char),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_display() {
        let k = KeyEvent {
            code: KeyCode::Char('w'),
            mods: KeyModifiers::CTRL,
        };
        assert_eq!(format!("{}", k), "^W");
        assert_eq!(format!("{}", KeyEvent::plain('x')), "x");
    }

    #[test]
    fn ctrl_codes() {
        assert_eq!(keys::ctrl('a'), '\x01');
        assert_eq!(keys::ctrl('['), keys::ESC);
        assert_eq!(keys::ctrl('@'), keys::NUL);
        assert_eq!(keys::ctrl('v'), '\x16');
    }

    #[test]
    fn special_keys_map_to_private_use() {
        let k = KeyEvent::new(KeyCode::Left, KeyModifiers::empty());
        assert_eq!(k.to_char(), Some(keys::K_LEFT));
        assert!(keys::is_special(keys::K_LEFT));
        let alt = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(alt.to_char(), None);
    }

    #[test]
    fn notation_parses_named_and_ctrl_keys() {
        let keys = parse_notation("3dw<Esc>i<C-w><lt><CR>").unwrap();
        assert_eq!(keys, vec!['3', 'd', 'w', '\x1b', 'i', '\x17', '<', '\r']);
    }

    #[test]
    fn notation_errors() {
        match parse_notation("a<Esc") {
            Err(NotationError::Unterminated(1)) => {}
            other => panic!("expected unterminated error got {:?}", other),
        }
        match parse_notation("<Nope>") {
            Err(NotationError::UnknownKey(name)) => assert_eq!(name, "Nope"),
            other => panic!("expected unknown key got {:?}", other),
        }
    }
}
