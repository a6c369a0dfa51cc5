//! Trace event and record types.
//!
//! This module defines the events that can be traced while a solver runs.

use prodmodel_engine::RuleId;
use prodmodel_foundation::FactId;

// =============================================================================
// Trace Event
// =============================================================================

/// Events that can be traced during a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// The run has started.
    RunStart {
        /// Number of rules handed to the solver.
        rules: usize,
        /// Number of facts in working memory before the first step.
        inputs: usize,
    },

    /// A pass over the pending rules has started.
    PassStart {
        /// The pass number (0-based).
        pass: u64,
    },

    /// A pass over the pending rules has ended.
    PassEnd {
        /// The pass number (0-based).
        pass: u64,
        /// Rules fired during the pass.
        fired: usize,
    },

    /// A rule was examined.
    RuleExamined {
        /// The examined rule.
        rule: RuleId,
        /// Whether its conditions held.
        performing: bool,
    },

    /// A rule fired.
    RuleFired {
        /// The rule that fired.
        rule: RuleId,
    },

    /// A fact's effect ran.
    EffectPerformed {
        /// The fact whose effect ran.
        fact: FactId,
        /// Number of invocations.
        invocations: u32,
    },

    /// A fact entered working memory.
    FactAsserted {
        /// The asserted fact.
        fact: FactId,
        /// The rule that concluded it.
        rule: RuleId,
    },

    /// Every rule fired.
    RunSucceeded {
        /// Rules examined over the whole run.
        steps: u64,
    },

    /// The run deadlocked.
    RunFailed {
        /// Rules that can never be satisfied.
        unsatisfied: Vec<RuleId>,
    },

    /// Custom user event.
    Custom {
        /// Event name.
        name: String,
        /// Event data.
        data: String,
    },
}

impl TraceEvent {
    /// Returns a short name for the event type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStart { .. } => "run-start",
            Self::PassStart { .. } => "pass-start",
            Self::PassEnd { .. } => "pass-end",
            Self::RuleExamined { .. } => "rule-examined",
            Self::RuleFired { .. } => "rule-fired",
            Self::EffectPerformed { .. } => "effect-performed",
            Self::FactAsserted { .. } => "fact-asserted",
            Self::RunSucceeded { .. } => "run-succeeded",
            Self::RunFailed { .. } => "run-failed",
            Self::Custom { .. } => "custom",
        }
    }

    /// Returns true if this event opens or closes a pass.
    #[must_use]
    pub fn is_pass_boundary(&self) -> bool {
        matches!(self, Self::PassStart { .. } | Self::PassEnd { .. })
    }

    /// Returns true if this is a rule-related event.
    #[must_use]
    pub fn is_rule_event(&self) -> bool {
        matches!(self, Self::RuleExamined { .. } | Self::RuleFired { .. })
    }

    /// Returns true if this event ends the run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RunSucceeded { .. } | Self::RunFailed { .. })
    }
}

// =============================================================================
// Trace Record
// =============================================================================

/// A timestamped trace record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Unique record ID within the session.
    pub id: u64,
    /// The pass during which this event occurred.
    pub pass: u64,
    /// Timestamp in nanoseconds since the tracer was created.
    pub timestamp_ns: u64,
    /// The trace event.
    pub event: TraceEvent,
}

impl TraceRecord {
    /// Creates a new trace record.
    #[must_use]
    pub fn new(id: u64, pass: u64, timestamp_ns: u64, event: TraceEvent) -> Self {
        Self {
            id,
            pass,
            timestamp_ns,
            event,
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}

// =============================================================================
// Tests
// =============================================================================
