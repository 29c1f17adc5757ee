#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_actions::Engine;
use core_config::Options;
use core_events::parse_notation;
use core_model::{ColonLog, ColonRequest, EditorModel};
use core_text::Position;
use std::cell::RefCell;
use std::rc::Rc;

/// An engine and the model it edits, driven by key notation strings.
pub struct Session {
    pub engine: Engine,
    pub model: EditorModel,
    colon: Rc<RefCell<Vec<ColonRequest>>>,
}

impl Session {
    pub fn new(text: &str) -> Self {
        Self::with_options(text, Options::default())
    }

    pub fn with_options(text: &str, options: Options) -> Self {
        let log = ColonLog::default();
        let colon = log.handle();
        let engine = Engine::new(&options);
        let model = EditorModel::from_text(text)
            .with_options(options)
            .with_colon(Box::new(log));
        Self { engine, model, colon }
    }

    /// Feed keys written in `<Esc>` / `<C-r>` notation.
    pub fn feed(&mut self, keys: &str) -> &mut Self {
        let chars = parse_notation(keys).unwrap_or_else(|e| panic!("bad key notation {keys:?}: {e}"));
        self.engine.feed_keys(&mut self.model, &chars);
        self
    }

    pub fn text(&self) -> String {
        self.model.text()
    }

    pub fn cursor(&self) -> Position {
        self.model.cursor()
    }

    pub fn reg(&self, name: char) -> String {
        self.model.state.registers.text_of(name)
    }

    pub fn bells(&self) -> u32 {
        self.model.state.status.bells()
    }

    pub fn message(&self) -> Option<&str> {
        self.model.state.status.last_message()
    }

    pub fn colon_requests(&self) -> Vec<ColonRequest> {
        self.colon.borrow().clone()
    }
}

/// Run `keys` over `text` in a fresh session.
pub fn run(text: &str, keys: &str) -> Session {
    let mut s = Session::new(text);
    s.feed(keys);
    s
}

pub fn pos(line: usize, col: usize) -> Position {
    Position::new(line, col)
}

/// `n` numbered lines: "l0\nl1\n...".
pub fn numbered_lines(n: usize) -> String {
    (0..n).map(|i| format!("l{i}\n")).collect()
}
