//! Replace-mode undo stack.
//!
//! Every char typed in Replace mode pushes a sentinel (`None`); when it
//! overwrote an existing char the replaced char is pushed on top. Backspace
//! pops one entry: a char means "put this back", a bare sentinel means the
//! typed char was inserted (end of line, line break) and is simply removed.

use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Restore {
    /// Put the original char back under the cursor.
    Char(char),
    /// The typed char had no original; delete it.
    Remove,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ReplaceStack {
    entries: SmallVec<[Option<char>; 32]>,
}

impl ReplaceStack {
    pub(crate) fn push_overwrite(&mut self, replaced: char) {
        self.entries.push(None);
        self.entries.push(Some(replaced));
    }

    pub(crate) fn push_insert(&mut self) {
        self.entries.push(None);
    }

    /// Undo the most recent typed char; `None` once everything typed in this
    /// session has been backed over.
    pub(crate) fn pop(&mut self) -> Option<Restore> {
        match self.entries.pop()? {
            Some(c) => {
                self.entries.pop();
                Some(Restore::Char(c))
            }
            None => Some(Restore::Remove),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_typing_order() {
        let mut s = ReplaceStack::default();
        s.push_overwrite('a');
        s.push_insert();
        s.push_overwrite('b');
        assert_eq!(s.pop(), Some(Restore::Char('b')));
        assert_eq!(s.pop(), Some(Restore::Remove));
        assert_eq!(s.pop(), Some(Restore::Char('a')));
        assert_eq!(s.pop(), None);
        s.push_overwrite('c');
        s.clear();
        assert_eq!(s.pop(), None);
    }
}
