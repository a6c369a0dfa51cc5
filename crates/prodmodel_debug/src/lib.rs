//! Tracing and explanation for prodmodel runs.
//!
//! This crate provides:
//! - [`Tracer`] - Step-by-step trace of solver activity
//! - [`WhyQuery`] - Why rules are blocked and where facts came from
//! - [`ObservabilityConfig`] - Presets tying tracing and snapshots together

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod explain;
pub mod trace;

pub use config::ObservabilityConfig;
pub use explain::{BlockedExplanation, Blocker, FactOrigin, WhyQuery};
pub use trace::{
    HumanFormatter, JsonFormatter, TraceBuffer, TraceEvent, TraceFormatter, TraceOutput,
    TraceRecord, Tracer, TracerConfig,
};
