//! Colon-command collaborator.
//!
//! The engine never interprets ex commands. `:`-lines, and the `!`, `=` and
//! `gq` operators, are turned into a [`ColonRequest`] whose command text
//! already carries the line range (`.`, `.,.+2`, `'<,'>`) and handed to the
//! host's [`ColonDispatcher`].

use crate::View;
use bitflags::bitflags;
use core_text::TextDocument;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

bitflags! {
    /// Where a colon request came from.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpFlags: u8 {
        /// Built by the `!` operator: the text after the range is a filter.
        const FILTER = 0b0000_0001;
        /// Built by `=`: re-indent the range.
        const INDENT = 0b0000_0010;
        /// Built by `gq`: format the range.
        const FORMAT = 0b0000_0100;
        /// Range came from a Visual selection.
        const FROM_VISUAL = 0b0000_1000;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColonRequest {
    /// Full command text without the leading `:` (e.g. `.,.+2!sort`).
    pub command: String,
    pub flags: OpFlags,
}

impl ColonRequest {
    pub fn new(command: impl Into<String>, flags: OpFlags) -> Self {
        Self {
            command: command.into(),
            flags,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ColonError(pub String);

pub trait ColonDispatcher {
    fn execute(
        &mut self,
        request: &ColonRequest,
        doc: &mut dyn TextDocument,
        view: &mut View,
    ) -> Result<(), ColonError>;
}

/// Dispatcher that records every request and performs nothing. The shared
/// handle lets a host (or test) inspect what the engine produced.
#[derive(Debug, Default, Clone)]
pub struct ColonLog {
    requests: Rc<RefCell<Vec<ColonRequest>>>,
}

impl ColonLog {
    pub fn handle(&self) -> Rc<RefCell<Vec<ColonRequest>>> {
        Rc::clone(&self.requests)
    }
}

impl ColonDispatcher for ColonLog {
    fn execute(
        &mut self,
        request: &ColonRequest,
        _doc: &mut dyn TextDocument,
        _view: &mut View,
    ) -> Result<(), ColonError> {
        debug!(target: "model.colon", command = %request.command, flags = ?request.flags, "colon_request");
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}
