//! Integration tests for Layer 1: Engine
//!
//! Tests for rules, working memory, the solver, and run history.

mod history;
mod properties;
mod solver;
