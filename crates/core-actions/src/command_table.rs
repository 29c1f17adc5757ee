//! Normal-mode command lookup table.
//!
//! Each entry names the key sequence (one char, or a prefix char plus one),
//! the handler kind the dispatcher routes it to and flags the parser and
//! dispatcher consult: whether an extra argument char follows, whether a
//! count or register applies, and whether the register survives into the
//! next command chunk.

use crate::op_resolver::OpKind;
use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CmdFlags: u8 {
        /// One more char follows (`f{char}`, `m{char}`, `q{reg}`).
        const ARG = 0b0000_0001;
        const COUNT = 0b0000_0010;
        const REG = 0b0000_0100;
        /// The register name is kept for the next chunk.
        const KEEP_REG = 0b0000_1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Cursor motion; usable after an operator and in Visual mode.
    Motion,
    /// `i{obj}` / `a{obj}` text object (operator pending or Visual only).
    Object,
    Operator(OpKind),
    /// Executes immediately.
    Direct,
    /// Starts the Insert sub-engine.
    InsertEntry,
    /// First char of a two-char command (`g`, `z`, `Z`, `[`, `]`).
    Prefix,
    /// Recognised but not implemented by this engine.
    Unsupported,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CommandEntry {
    pub keys: &'static str,
    pub kind: HandlerKind,
    pub flags: CmdFlags,
}

const fn entry(keys: &'static str, kind: HandlerKind, flags: CmdFlags) -> CommandEntry {
    CommandEntry { keys, kind, flags }
}

const C: CmdFlags = CmdFlags::COUNT;
const N: CmdFlags = CmdFlags::empty();
const A: CmdFlags = CmdFlags::ARG;
const CA: CmdFlags = CmdFlags::COUNT.union(CmdFlags::ARG);
const CG: CmdFlags = CmdFlags::COUNT.union(CmdFlags::REG);
const K: CmdFlags = CmdFlags::COUNT.union(CmdFlags::KEEP_REG);
const NK: CmdFlags = CmdFlags::KEEP_REG;

use HandlerKind::{Direct, InsertEntry, Motion, Object, Operator, Prefix, Unsupported};

pub static NORMAL_COMMANDS: &[CommandEntry] = &[
    // motions
    entry("h", Motion, C),
    entry("l", Motion, C),
    entry("j", Motion, C),
    entry("k", Motion, C),
    entry("\x08", Motion, C),
    entry(" ", Motion, C),
    entry("\x0e", Motion, C),
    entry("\x10", Motion, C),
    entry("\n", Motion, C),
    entry("\r", Motion, C),
    entry("+", Motion, C),
    entry("-", Motion, C),
    entry("_", Motion, C),
    entry("0", Motion, N),
    entry("^", Motion, N),
    entry("$", Motion, C),
    entry("|", Motion, C),
    entry("w", Motion, C),
    entry("W", Motion, C),
    entry("b", Motion, C),
    entry("B", Motion, C),
    entry("e", Motion, C),
    entry("E", Motion, C),
    entry("ge", Motion, C),
    entry("gE", Motion, C),
    entry("f", Motion, CA),
    entry("F", Motion, CA),
    entry("t", Motion, CA),
    entry("T", Motion, CA),
    entry(";", Motion, C),
    entry(",", Motion, C),
    entry("G", Motion, C),
    entry("gg", Motion, C),
    entry("H", Motion, C),
    entry("M", Motion, N),
    entry("L", Motion, C),
    entry("%", Motion, C),
    entry("{", Motion, C),
    entry("}", Motion, C),
    entry("(", Motion, C),
    entry(")", Motion, C),
    entry("'", Motion, A),
    entry("`", Motion, A),
    entry("/", Motion, C),
    entry("?", Motion, C),
    entry("n", Motion, C),
    entry("N", Motion, C),
    entry("*", Motion, C),
    entry("#", Motion, C),
    entry("g*", Motion, C),
    entry("g#", Motion, C),
    entry("gj", Motion, C),
    entry("gk", Motion, C),
    entry("g0", Motion, N),
    entry("g^", Motion, N),
    entry("g$", Motion, C),
    entry("gm", Motion, N),
    entry("go", Motion, C),
    entry("[(", Motion, C),
    entry("[{", Motion, C),
    entry("])", Motion, C),
    entry("]}", Motion, C),
    entry("\u{E000}", Motion, C),
    entry("\u{E001}", Motion, C),
    entry("\u{E002}", Motion, C),
    entry("\u{E003}", Motion, C),
    entry("\u{E004}", Motion, N),
    entry("\u{E005}", Motion, C),
    // operators
    entry("d", Operator(OpKind::Delete), CG),
    entry("y", Operator(OpKind::Yank), CG),
    entry("c", Operator(OpKind::Change), CG),
    entry("<", Operator(OpKind::ShiftLeft), C),
    entry(">", Operator(OpKind::ShiftRight), C),
    entry("!", Operator(OpKind::Filter), C),
    entry("=", Operator(OpKind::Indent), C),
    entry("g~", Operator(OpKind::Tilde), C),
    entry("gu", Operator(OpKind::Lower), C),
    entry("gU", Operator(OpKind::Upper), C),
    entry("g?", Operator(OpKind::Rot13), C),
    entry("gq", Operator(OpKind::Format), C),
    // direct commands
    entry("x", Direct, CG),
    entry("X", Direct, CG),
    entry("D", Direct, CG),
    entry("C", Direct, CG),
    entry("s", Direct, CG),
    entry("S", Direct, CG),
    entry("Y", Direct, CG),
    entry("p", Direct, CG),
    entry("P", Direct, CG),
    entry("gp", Direct, CG),
    entry("gP", Direct, CG),
    entry("J", Direct, C),
    entry("gJ", Direct, C),
    entry("r", Direct, CA),
    entry("~", Direct, C),
    entry("u", Direct, C),
    entry("U", Direct, C),
    entry("\x12", Direct, C),
    entry(".", Direct, C),
    entry("q", Direct, A),
    entry("@", Direct, CA),
    entry("m", Direct, A),
    entry("\x01", Direct, C),
    entry("\x18", Direct, C),
    entry("\x05", Direct, K),
    entry("\x19", Direct, K),
    entry("\x04", Direct, K),
    entry("\x15", Direct, K),
    entry("\x06", Direct, K),
    entry("\x02", Direct, K),
    entry("zt", Direct, K),
    entry("zz", Direct, K),
    entry("zb", Direct, K),
    entry("z\r", Direct, K),
    entry("z.", Direct, K),
    entry("z-", Direct, K),
    entry("\x07", Direct, NK),
    entry("\x0c", Direct, NK),
    entry("\x17", Direct, CA),
    entry("ZZ", Direct, N),
    entry("ZQ", Direct, N),
    entry("v", Direct, C),
    entry("V", Direct, C),
    entry("\x16", Direct, C),
    entry("gv", Direct, N),
    entry(":", Direct, C),
    entry("\x1b", Direct, N),
    entry("\u{E006}", Direct, CG),
    entry("\u{E00A}", Direct, CG),
    entry("\"", Prefix, CmdFlags::ARG.union(CmdFlags::KEEP_REG)),
    // insert entry
    entry("i", InsertEntry, C),
    entry("a", InsertEntry, C),
    entry("I", InsertEntry, C),
    entry("A", InsertEntry, C),
    entry("o", InsertEntry, C),
    entry("O", InsertEntry, C),
    entry("R", InsertEntry, C),
    entry("gR", InsertEntry, C),
    entry("gI", InsertEntry, C),
    entry("\u{E007}", InsertEntry, C),
    // prefixes
    entry("g", Prefix, N),
    entry("z", Prefix, N),
    entry("Z", Prefix, N),
    entry("[", Prefix, N),
    entry("]", Prefix, N),
    // not implemented here
    entry("K", Unsupported, N),
    entry("gr", Unsupported, N),
    entry("\x1d", Unsupported, N),
    entry("\x14", Unsupported, N),
    entry("\x0f", Unsupported, N),
    entry("\t", Unsupported, N),
    entry("\x1a", Unsupported, N),
];

/// `i` and `a` as text-object prefixes.
pub static OBJECT_COMMANDS: &[CommandEntry] = &[entry("i", Object, CA), entry("a", Object, CA)];

/// Look up a complete key sequence (`"w"`, `"gu"`, `"z\r"`).
pub fn lookup(keys: &str) -> Option<&'static CommandEntry> {
    NORMAL_COMMANDS.iter().find(|e| e.keys == keys)
}

pub fn lookup_char(c: char) -> Option<&'static CommandEntry> {
    let mut buf = [0u8; 4];
    lookup(c.encode_utf8(&mut buf))
}

pub fn lookup_prefixed(prefix: char, c: char) -> Option<&'static CommandEntry> {
    let keys: String = [prefix, c].iter().collect();
    lookup(&keys)
}

pub fn lookup_object(c: char) -> Option<&'static CommandEntry> {
    OBJECT_COMMANDS.iter().find(|e| e.keys.starts_with(c))
}

impl CommandEntry {
    pub fn takes_arg(&self) -> bool {
        self.flags.contains(CmdFlags::ARG)
    }
    pub fn accepts_count(&self) -> bool {
        self.flags.contains(CmdFlags::COUNT)
    }
    pub fn accepts_register(&self) -> bool {
        self.flags.contains(CmdFlags::REG)
    }
    pub fn keeps_register(&self) -> bool {
        self.flags.contains(CmdFlags::KEEP_REG)
    }
    pub fn operator(&self) -> Option<OpKind> {
        match self.kind {
            HandlerKind::Operator(op) => Some(op),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let mut seen = HashSet::new();
        for e in NORMAL_COMMANDS {
            assert!(seen.insert(e.keys), "duplicate entry {:?}", e.keys);
        }
    }

    #[test]
    fn every_two_char_entry_has_a_prefix_entry() {
        for e in NORMAL_COMMANDS.iter().filter(|e| e.keys.chars().count() == 2) {
            let first = e.keys.chars().next().unwrap();
            let prefix = lookup_char(first).unwrap_or_else(|| panic!("no prefix for {:?}", e.keys));
            assert_eq!(prefix.kind, HandlerKind::Prefix, "{:?}", e.keys);
        }
    }

    #[test]
    fn argument_commands() {
        for keys in ["f", "F", "t", "T", "r", "m", "'", "`", "q", "@", "\"", "\x17"] {
            assert!(lookup(keys).unwrap().takes_arg(), "{keys:?} takes an argument");
        }
        for keys in ["w", "d", "x", "gu", "zt"] {
            assert!(!lookup(keys).unwrap().takes_arg(), "{keys:?} takes no argument");
        }
    }

    #[test]
    fn operators_map_to_kinds() {
        let expect = [
            ("d", OpKind::Delete),
            ("y", OpKind::Yank),
            ("c", OpKind::Change),
            ("<", OpKind::ShiftLeft),
            (">", OpKind::ShiftRight),
            ("!", OpKind::Filter),
            ("=", OpKind::Indent),
            ("g~", OpKind::Tilde),
            ("gu", OpKind::Lower),
            ("gU", OpKind::Upper),
            ("g?", OpKind::Rot13),
            ("gq", OpKind::Format),
        ];
        for (keys, op) in expect {
            assert_eq!(lookup(keys).unwrap().operator(), Some(op), "{keys}");
        }
    }

    #[test]
    fn register_and_count_acceptance() {
        assert!(lookup("d").unwrap().accepts_register());
        assert!(lookup("p").unwrap().accepts_register());
        assert!(!lookup("j").unwrap().accepts_register());
        assert!(!lookup("0").unwrap().accepts_count());
        assert!(lookup("G").unwrap().accepts_count());
    }

    #[test]
    fn scroll_commands_keep_register() {
        for keys in ["\x05", "\x19", "\x04", "\x15", "\x06", "\x02", "zt", "zz", "zb", "\""] {
            assert!(lookup(keys).unwrap().keeps_register(), "{keys:?}");
        }
        assert!(!lookup("x").unwrap().keeps_register());
    }

    #[test]
    fn unsupported_entries() {
        for keys in ["K", "gr", "\x1d", "\x14", "\x0f", "\t", "\x1a"] {
            assert_eq!(lookup(keys).unwrap().kind, HandlerKind::Unsupported, "{keys:?}");
        }
    }

    #[test]
    fn insert_entries_and_objects() {
        for keys in ["i", "a", "I", "A", "o", "O", "R", "gR", "gI"] {
            assert_eq!(lookup(keys).unwrap().kind, HandlerKind::InsertEntry);
        }
        assert_eq!(lookup_object('i').unwrap().kind, HandlerKind::Object);
        assert_eq!(lookup_object('a').unwrap().keys, "a");
        assert!(lookup_object('x').is_none());
        assert_eq!(lookup_prefixed('g', 'u').unwrap().keys, "gu");
        assert!(lookup_prefixed('g', 'X').is_none());
    }
}
