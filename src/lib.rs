//! prodmodel - Step-wise forward-chaining production system
//!
//! This crate re-exports all layers of the prodmodel system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: prodmodel_runtime    Rulebase files, terminal driver, REPL, run export
//! Layer 2: prodmodel_debug      Tracing, deadlock and fact explanations
//! Layer 1: prodmodel_engine     Rules, working memory, solver, history
//! Layer 0: prodmodel_foundation Fact registry, facts, errors
//! ```

pub use prodmodel_debug as debug;
pub use prodmodel_engine as engine;
pub use prodmodel_foundation as foundation;
pub use prodmodel_runtime as runtime;
