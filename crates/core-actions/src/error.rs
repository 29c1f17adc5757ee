//! Error and outcome types shared by every handler.

use crate::input_queue::QueueError;
use core_model::{ColonError, SearchError};
use core_state::{MarkError, RegisterError};
use thiserror::Error;

/// Broad class of a failure, used by the engine's error boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected failure caused by the input (unknown command, missing mark).
    User,
    /// A queue limit was hit; queued input is discarded.
    Capacity,
    /// A recognised command the engine does not implement.
    Unsupported,
    /// Internal inconsistency; logged at error level.
    Invariant,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Unknown or impossible command: bell only.
    #[error("")]
    InvalidCommand,
    #[error(transparent)]
    Mark(#[from] MarkError),
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("E486: Pattern not found: {0}")]
    PatternNotFound(String),
    #[error("E35: No previous regular expression")]
    NoPreviousPattern,
    #[error("E30: No previous command line")]
    NoPreviousCommand,
    #[error("E348: No string under cursor")]
    NoStringUnderCursor,
    #[error("E29: No inserted text yet")]
    NoInsertedText,
    #[error("E748: No previously used register")]
    NoPreviousRegister,
    #[error("E223: Command too complex")]
    CommandTooComplex,
    #[error("E1240: Resulting text too long")]
    TextTooLong,
    #[error(transparent)]
    Colon(#[from] ColonError),
    #[error("Not supported: {0}")]
    NotSupported(String),
    #[error("Internal error: {0}")]
    Invariant(String),
}

impl From<QueueError> for EngineError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::TooComplex { .. } => EngineError::CommandTooComplex,
            QueueError::NothingToRepeat => EngineError::InvalidCommand,
            QueueError::Register(e) => EngineError::Register(e),
        }
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::CommandTooComplex => ErrorKind::Capacity,
            EngineError::NotSupported(_) => ErrorKind::Unsupported,
            EngineError::Invariant(_) => ErrorKind::Invariant,
            _ => ErrorKind::User,
        }
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        EngineError::NotSupported(what.into())
    }
}

/// What a handler did, folded across every char of one `feed` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effect {
    /// Text changed.
    pub dirty: bool,
    /// Line structure changed (lines added or removed).
    pub structural: bool,
    pub cursor_moved: bool,
    pub mode_changed: bool,
}

impl Effect {
    pub fn none() -> Self {
        Self::default()
    }
    pub fn moved() -> Self {
        Self {
            cursor_moved: true,
            ..Self::default()
        }
    }
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            cursor_moved: true,
            ..Self::default()
        }
    }
    pub fn structural() -> Self {
        Self {
            dirty: true,
            structural: true,
            cursor_moved: true,
            ..Self::default()
        }
    }
    pub fn mode() -> Self {
        Self {
            mode_changed: true,
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: Effect) {
        self.dirty |= other.dirty;
        self.structural |= other.structural;
        self.cursor_moved |= other.cursor_moved;
        self.mode_changed |= other.mode_changed;
    }

    pub fn with(mut self, other: Effect) -> Self {
        self.merge(other);
        self
    }
}

pub type EngineResult = Result<Effect, EngineError>;
