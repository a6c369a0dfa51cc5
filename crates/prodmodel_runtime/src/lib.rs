//! Rulebase files, terminal driver, REPL and run export for prodmodel.
//!
//! This crate provides:
//! - [`Rulebase`] - Line-oriented rulebase files turned into solvers
//! - [`Driver`] - Paced rendering of a run to a terminal
//! - [`Repl`] - Interactive stepping, rewinding and explanation
//! - [`RunRecord`] - Run export and import using `MessagePack`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod driver;
pub mod editor;
pub mod repl;
pub mod rulebase;
pub mod serialize;
pub mod style;

pub use driver::{Driver, DriverConfig, FailureCallback, Numbering, PauseHandle, SuccessCallback};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::Repl;
pub use rulebase::{EchoDecl, NameDecl, RuleDecl, Rulebase};
pub use serialize::{RunRecord, SnapshotRecord, from_bytes, load_from_file, save_to_file, to_bytes};
pub use style::Styles;
