//! Integration tests across layers
//!
//! Tests rulebase loading, tracing, explanation, REPL sessions, and run
//! export working together.

mod export;
mod observability;
mod session;
