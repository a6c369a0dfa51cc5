//! Error types for the prodmodel system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! A deadlocked run is not an error: it is an ordinary terminal outcome
//! reported by the solver.

use std::fmt;

use thiserror::Error;

use crate::fact::{FactId, RegistryId};

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for prodmodel operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an invalid fact name error.
    #[must_use]
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidName(name.into()))
    }

    /// Creates an unknown fact (lookup) error.
    #[must_use]
    pub fn unknown_fact(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownFact(name.into()))
    }

    /// Creates a foreign fact error for a handle issued by another registry.
    #[must_use]
    pub fn foreign_fact(fact: FactId, expected: RegistryId) -> Self {
        Self::new(ErrorKind::ForeignFact { fact, expected })
    }

    /// Creates an invalid repeat count error.
    #[must_use]
    pub fn invalid_repeat(fact: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRepeat { fact: fact.into() })
    }

    /// Creates an unknown rule error.
    #[must_use]
    pub fn unknown_rule(index: usize) -> Self {
        Self::new(ErrorKind::UnknownRule(index))
    }

    /// Creates a snapshot not found error.
    #[must_use]
    pub fn snapshot_not_found(step: u64) -> Self {
        Self::new(ErrorKind::SnapshotNotFound(step))
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>, line: u32, context: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError {
            message: message.into(),
            line,
            context: context.into(),
        })
    }

    /// Creates an error for an unrecognised or malformed interactive command.
    #[must_use]
    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCommand(message.into()))
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoError(message.into()))
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationError(message.into()))
    }

    /// Returns true for errors raised by contract validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidName(_) | ErrorKind::ForeignFact { .. } | ErrorKind::InvalidRepeat { .. }
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A name offered to the registry is empty or blank.
    #[error("invalid fact name: {0:?}")]
    InvalidName(String),

    /// A fact name is not part of the registry's vocabulary.
    #[error("unknown fact \"{0}\": register it in the vocabulary or correct the name")]
    UnknownFact(String),

    /// A fact handle was issued by a different registry.
    #[error("fact {fact:?} belongs to {}, expected {expected}", .fact.registry())]
    ForeignFact {
        /// The offending handle.
        fact: FactId,
        /// The registry the handle should have come from.
        expected: RegistryId,
    },

    /// A repeat count below one.
    #[error("repeat count for \"{fact}\" must be at least 1")]
    InvalidRepeat {
        /// Name of the fact being configured.
        fact: String,
    },

    /// A rule index outside the solver's rule list.
    #[error("unknown rule: #{0}")]
    UnknownRule(usize),

    /// No snapshot was recorded for the requested step.
    #[error("no snapshot recorded for step {0}")]
    SnapshotNotFound(u64),

    /// Parse error in a rulebase file.
    #[error("parse error at line {line}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// The source line where the error occurred.
        context: String,
    },

    /// An interactive command could not be understood.
    #[error("{0}")]
    InvalidCommand(String),

    /// I/O failure while reading or writing files.
    #[error("io error: {0}")]
    IoError(String),

    /// Encoding or decoding of a run record failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file or rule label.
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Chain of enclosing operations, innermost last.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
