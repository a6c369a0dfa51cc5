//! Snapshots of solver state and the ring buffer that keeps them.
//!
//! A snapshot copies only index data: the working-memory sequence and the
//! pending/fired rule lists. Facts and rules are shared, immutable, and never
//! copied. The persistent vectors make each copy O(1).

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use prodmodel_foundation::FactId;

use crate::rule::RuleId;
use crate::solver::Status;

// =============================================================================
// Snapshot
// =============================================================================

/// Solver state captured after a step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub(crate) step: u64,
    pub(crate) iteration: u64,
    pub(crate) head: usize,
    pub(crate) fired_this_pass: usize,
    pub(crate) examined: RuleId,
    pub(crate) performing: bool,
    pub(crate) status: Status,
    pub(crate) memory: im::Vector<FactId>,
    pub(crate) pending: im::Vector<RuleId>,
    pub(crate) fired: im::Vector<RuleId>,
}

impl Snapshot {
    /// Returns the step number (1-based) this snapshot was taken after.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Returns the number of completed passes at the time of the snapshot.
    #[must_use]
    pub const fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Returns the cursor position.
    #[must_use]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Returns the rule examined by the step.
    #[must_use]
    pub const fn examined(&self) -> RuleId {
        self.examined
    }

    /// Returns true if the step fired its rule.
    #[must_use]
    pub const fn performing(&self) -> bool {
        self.performing
    }

    /// Returns the solver status after the step.
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Returns the working-memory sequence.
    #[must_use]
    pub fn memory(&self) -> &im::Vector<FactId> {
        &self.memory
    }

    /// Returns the pending rules, in queue order.
    #[must_use]
    pub fn pending(&self) -> &im::Vector<RuleId> {
        &self.pending
    }

    /// Returns the fired rules, in firing order.
    #[must_use]
    pub fn fired(&self) -> &im::Vector<RuleId> {
        &self.fired
    }
}

// =============================================================================
// History Buffer
// =============================================================================

/// Ring buffer of snapshots for replay and debugging.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    /// The snapshots in chronological order.
    snapshots: VecDeque<Snapshot>,
    /// Maximum number of snapshots to retain.
    capacity: usize,
}

impl HistoryBuffer {
    /// Creates a new history buffer with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Returns the capacity of the buffer.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of snapshots in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Pushes a new snapshot, evicting the oldest if at capacity.
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.capacity == 0 {
            return;
        }
        if self.snapshots.len() >= self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Gets the snapshot taken after a specific step.
    #[must_use]
    pub fn get(&self, step: u64) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.step == step)
    }

    /// Gets the most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    /// Gets the oldest snapshot.
    #[must_use]
    pub fn oldest(&self) -> Option<&Snapshot> {
        self.snapshots.front()
    }

    /// Returns an iterator over snapshots from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// Returns the range of steps available.
    #[must_use]
    pub fn step_range(&self) -> Option<(u64, u64)> {
        match (self.snapshots.front(), self.snapshots.back()) {
            (Some(first), Some(last)) => Some((first.step, last.step)),
            _ => None,
        }
    }

    /// Gets N most recent snapshots.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &Snapshot> {
        let skip = self.snapshots.len().saturating_sub(count);
        self.snapshots.iter().skip(skip)
    }

    /// Clears all snapshots.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Removes all snapshots after the given step (for rewinding).
    pub fn truncate_after(&mut self, step: u64) {
        while let Some(last) = self.snapshots.back() {
            if last.step > step {
                self.snapshots.pop_back();
            } else {
                break;
            }
        }
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(256)
    }
}

// =============================================================================
// Tests
// =============================================================================
