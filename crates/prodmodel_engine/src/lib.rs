//! Working memory, rules, and the forward-chaining solver for prodmodel.
//!
//! This crate provides:
//! - [`WorkingMemory`] - Ordered record of asserted facts
//! - [`Rule`] - Implications from condition facts to conclusion facts
//! - [`Solver`] - Step-wise forward chaining with deadlock detection
//! - [`HistoryBuffer`] - Snapshots of solver state for rewinding

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod history;
pub mod memory;
pub mod rule;
pub mod solver;

pub use config::{SnapshotPolicy, SolverConfig};
pub use history::{HistoryBuffer, Snapshot};
pub use memory::WorkingMemory;
pub use rule::{Rule, RuleDisplay, RuleId, Wording};
pub use solver::{Deadlock, Solver, Status, Step, StepOutcome, Termination};
