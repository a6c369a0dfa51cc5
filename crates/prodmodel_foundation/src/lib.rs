//! Fact registry, facts, and error types for prodmodel.
//!
//! This crate provides:
//! - [`FactRegistry`] - Vocabulary validation and fact interning
//! - [`FactId`] - Interned fact handles (equality is identity)
//! - [`Fact`] - A named fact with an optional side effect and repeat count
//! - [`Vocabulary`] - Read-only snapshot of the registered names
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod fact;
pub mod registry;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use fact::{Effect, Fact, FactId, RegistryId};
pub use registry::{FactRegistry, Vocabulary};
