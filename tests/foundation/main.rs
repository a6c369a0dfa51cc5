//! Integration tests for Layer 0: Foundation
//!
//! Tests for the fact registry, fact effects, and error types.

mod errors;
mod registry;
