//! Configuration for the observability system.

use prodmodel_engine::{SnapshotPolicy, SolverConfig};

use crate::trace::{TraceOutput, TracerConfig};

/// Configuration for the observability system.
///
/// Controls tracing and snapshot retention, and derives the solver and tracer
/// configurations from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Whether tracing is enabled (false = zero overhead).
    pub enabled: bool,

    /// When the solver records snapshots.
    pub snapshots: SnapshotPolicy,

    /// Snapshot ring buffer size (number of steps to retain).
    pub history_size: usize,

    /// Trace records kept in memory.
    pub trace_buffer_size: usize,

    /// Output trace to stderr.
    pub trace_to_stderr: bool,

    /// Output format: true for JSON, false for human-readable.
    pub json_output: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            snapshots: SnapshotPolicy::OnFire,
            history_size: 256,
            trace_buffer_size: 10_000,
            trace_to_stderr: true,
            json_output: false,
        }
    }
}

impl ObservabilityConfig {
    /// Creates a new configuration with tracing enabled.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Creates a configuration for development: tracing on, default history.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Creates a configuration for debugging: every step snapshotted.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            enabled: true,
            snapshots: SnapshotPolicy::EveryStep,
            history_size: 4096,
            trace_buffer_size: 100_000,
            trace_to_stderr: true,
            json_output: false,
        }
    }

    /// Builder method to set enabled state.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder method to set the snapshot policy.
    #[must_use]
    pub fn with_snapshots(mut self, policy: SnapshotPolicy) -> Self {
        self.snapshots = policy;
        self
    }

    /// Builder method to set history size.
    #[must_use]
    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    /// Builder method to enable/disable stderr tracing.
    #[must_use]
    pub fn with_trace_to_stderr(mut self, trace: bool) -> Self {
        self.trace_to_stderr = trace;
        self
    }

    /// Builder method to enable/disable JSON output.
    #[must_use]
    pub fn with_json_output(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }

    /// Derives the solver configuration.
    #[must_use]
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new()
            .with_history_capacity(self.history_size)
            .with_snapshots(self.snapshots)
    }

    /// Derives the tracer configuration.
    #[must_use]
    pub fn tracer_config(&self) -> TracerConfig {
        let mut config = TracerConfig::new().with_buffer_size(self.trace_buffer_size);
        if self.enabled {
            config = config.enabled();
        }
        if self.trace_to_stderr {
            config = config.with_output(TraceOutput::Stderr);
        }
        if self.json_output {
            config = config.json();
        }
        config
    }
}
