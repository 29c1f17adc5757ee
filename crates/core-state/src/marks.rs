//! Mark table: `a`-`z` (uppercase shares the slots), the previous-context
//! mark (`'` / `` ` ``), last change `.`, last insert `^`, Visual bounds
//! `<` `>` and changed-text bounds `[` `]`.

use core_text::Position;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarkError {
    #[error("E20: Mark not set")]
    NotSet,
    #[error("E78: Unknown mark")]
    Unknown(char),
}

#[derive(Debug, Default, Clone)]
pub struct Marks {
    named: [Option<Position>; 26],
    pcmark: Option<Position>,
    last_change: Option<Position>,
    last_insert: Option<Position>,
    visual_start: Option<Position>,
    visual_end: Option<Position>,
    change_start: Option<Position>,
    change_end: Option<Position>,
}

impl Marks {
    fn slot_mut(&mut self, name: char) -> Result<&mut Option<Position>, MarkError> {
        Ok(match name {
            'a'..='z' => &mut self.named[(name as u8 - b'a') as usize],
            'A'..='Z' => &mut self.named[(name as u8 - b'A') as usize],
            '\'' | '`' => &mut self.pcmark,
            '.' => &mut self.last_change,
            '^' => &mut self.last_insert,
            '<' => &mut self.visual_start,
            '>' => &mut self.visual_end,
            '[' => &mut self.change_start,
            ']' => &mut self.change_end,
            other => return Err(MarkError::Unknown(other)),
        })
    }

    pub fn set(&mut self, name: char, pos: Position) -> Result<(), MarkError> {
        *self.slot_mut(name)? = Some(pos);
        Ok(())
    }

    pub fn get(&self, name: char) -> Result<Position, MarkError> {
        let found = match name {
            'a'..='z' => self.named[(name as u8 - b'a') as usize],
            'A'..='Z' => self.named[(name as u8 - b'A') as usize],
            '\'' | '`' => self.pcmark,
            '.' => self.last_change,
            '^' => self.last_insert,
            '<' => self.visual_start,
            '>' => self.visual_end,
            '[' => self.change_start,
            ']' => self.change_end,
            other => return Err(MarkError::Unknown(other)),
        };
        found.ok_or(MarkError::NotSet)
    }

    /// Remember the jump origin; returns the previous one so `''` can swap.
    pub fn set_pcmark(&mut self, pos: Position) -> Option<Position> {
        self.pcmark.replace(pos)
    }

    pub fn set_changed(&mut self, start: Position, end: Position) {
        self.change_start = Some(start);
        self.change_end = Some(end);
        self.last_change = Some(start);
    }

    /// Shift marks after `removed` lines starting at `line` were replaced by
    /// `added` lines. Named marks inside a deleted range are dropped; the
    /// others collapse onto `line`.
    pub fn adjust_lines(&mut self, line: usize, removed: usize, added: usize) {
        let fix = |slot: &mut Option<Position>, drop_inside: bool| {
            let Some(pos) = slot.as_mut() else { return };
            if pos.line < line {
                return;
            }
            if pos.line < line + removed {
                if pos.line >= line + added {
                    if drop_inside {
                        *slot = None;
                    } else {
                        pos.line = line;
                        pos.col = 0;
                    }
                }
                return;
            }
            pos.line = pos.line + added - removed;
        };
        for slot in self.named.iter_mut() {
            fix(slot, true);
        }
        for slot in [
            &mut self.pcmark,
            &mut self.last_change,
            &mut self.last_insert,
            &mut self.visual_start,
            &mut self.visual_end,
            &mut self.change_start,
            &mut self.change_end,
        ] {
            fix(slot, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_named() {
        let mut m = Marks::default();
        m.set('a', Position::new(3, 2)).unwrap();
        assert_eq!(m.get('a'), Ok(Position::new(3, 2)));
        assert_eq!(m.get('A'), Ok(Position::new(3, 2)));
        assert_eq!(m.get('b'), Err(MarkError::NotSet));
        assert_eq!(m.set('!', Position::origin()), Err(MarkError::Unknown('!')));
    }

    #[test]
    fn adjust_after_line_delete() {
        let mut m = Marks::default();
        m.set('a', Position::new(1, 0)).unwrap();
        m.set('b', Position::new(5, 1)).unwrap();
        m.set('\'', Position::new(2, 4)).unwrap();
        m.adjust_lines(1, 2, 0);
        assert_eq!(m.get('a'), Err(MarkError::NotSet));
        assert_eq!(m.get('b'), Ok(Position::new(3, 1)));
        assert_eq!(m.get('\''), Ok(Position::new(1, 0)));
    }

    #[test]
    fn adjust_after_line_insert() {
        let mut m = Marks::default();
        m.set('a', Position::new(4, 0)).unwrap();
        m.adjust_lines(2, 0, 3);
        assert_eq!(m.get('a'), Ok(Position::new(7, 0)));
    }
}
