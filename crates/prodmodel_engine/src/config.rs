//! Configuration for the solver.

/// When the solver records a snapshot into its history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapshotPolicy {
    /// After every step that fired a rule.
    #[default]
    OnFire,
    /// After every step, fired or not.
    EveryStep,
    /// Never; history stays empty.
    Never,
}

/// Configuration for a [`Solver`](crate::Solver).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Maximum number of snapshots retained (oldest evicted first).
    pub history_capacity: usize,
    /// When snapshots are taken.
    pub snapshots: SnapshotPolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            history_capacity: 256,
            snapshots: SnapshotPolicy::OnFire,
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the history capacity.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Builder method to set the snapshot policy.
    #[must_use]
    pub fn with_snapshots(mut self, policy: SnapshotPolicy) -> Self {
        self.snapshots = policy;
        self
    }

    /// Returns true if a step with the given firing result is snapshotted.
    #[must_use]
    pub fn snapshots_step(&self, fired: bool) -> bool {
        match self.snapshots {
            SnapshotPolicy::OnFire => fired,
            SnapshotPolicy::EveryStep => true,
            SnapshotPolicy::Never => false,
        }
    }
}
