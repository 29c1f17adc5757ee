//! Modal command engine: the vi Normal-mode parser and dispatcher, the
//! operator-pending resolver, the Insert/Replace sub-engine and the input
//! queues behind macros and `.`.
//!
//! The host owns an [`EditorModel`](core_model::EditorModel) and feeds keys
//! one char at a time through [`Engine::feed`]. Special keys (arrows, Home,
//! Delete) arrive as the private-use chars in [`core_events::keys`].
//!
//! Layout:
//! - `input_queue`: Stuff / Type-ahead / redo / record buffers.
//! - `parser` + `command_table`: resumable Normal-mode command parsing.
//! - `op_resolver` + `text_object`: operator regions.
//! - `dispatcher`: routes a complete command to its handler.
//! - `ops`: the operators themselves.
//! - `insert`: Insert, Replace and Virtual-Replace sessions.
//!
//! Logging uses `tracing` with `actions.*` targets: `actions.engine` for the
//! error boundary, `actions.dispatch`, `actions.parser`, `actions.operator`,
//! `actions.insert`, `actions.queue` and `actions.cmdline`.

pub mod command_table;
mod dispatcher;
pub mod engine;
pub mod error;
pub mod input_queue;
mod insert;
pub mod op_resolver;
mod ops;
pub mod parser;
pub mod text_object;

pub use command_table::{CmdFlags, CommandEntry, HandlerKind};
pub use engine::{Engine, VisualState};
pub use error::{Effect, EngineError, EngineResult, ErrorKind};
pub use input_queue::{InputQueue, QueueError, Source};
pub use op_resolver::{BlockCols, MotionKind, OpKind, OperatorDescriptor, Region};
pub use parser::{Command, ParseContext, Parser, Step};
