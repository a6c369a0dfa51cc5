//! "Why" queries over solver state.
//!
//! A pending rule is blocked when some of its conditions are not in working
//! memory. Each missing condition is either still reachable, because another
//! pending rule concludes it, or unreachable. In a deadlock every blocked rule
//! traces back to at least one unreachable condition or to a cycle of rules
//! waiting on each other.

use std::fmt;

use prodmodel_engine::{RuleId, Solver};
use prodmodel_foundation::{FactId, Result};

// =============================================================================
// Blocked Rules
// =============================================================================

/// Why a missing condition has not been asserted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Blocker {
    /// No pending rule concludes the fact.
    Unreachable,
    /// These pending rules conclude the fact but have not fired.
    Awaiting(Vec<RuleId>),
}

/// A condition of a blocked rule that is not in working memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingCondition {
    /// The missing fact.
    pub fact: FactId,
    /// What stands in its way.
    pub blocker: Blocker,
}

/// A pending rule whose conditions do not all hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockedRule {
    /// The blocked rule.
    pub rule: RuleId,
    /// Its missing conditions, in declaration order.
    pub missing: Vec<MissingCondition>,
}

impl BlockedRule {
    /// Returns true if some missing condition can never be asserted.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        self.missing
            .iter()
            .any(|m| m.blocker == Blocker::Unreachable)
    }
}

/// Every blocked pending rule at one point of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockedExplanation {
    /// Blocked rules, in queue order.
    pub rules: Vec<BlockedRule>,
}

impl BlockedExplanation {
    /// Returns true if no pending rule is blocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the entry for `rule`, if it is blocked.
    #[must_use]
    pub fn get(&self, rule: RuleId) -> Option<&BlockedRule> {
        self.rules.iter().find(|b| b.rule == rule)
    }

    /// Renders the explanation with fact names and rule labels.
    #[must_use]
    pub fn display<'a>(&'a self, solver: &'a Solver) -> ExplanationDisplay<'a> {
        ExplanationDisplay {
            explanation: self,
            solver,
        }
    }
}

/// Renders a [`BlockedExplanation`] as indented text.
pub struct ExplanationDisplay<'a> {
    explanation: &'a BlockedExplanation,
    solver: &'a Solver,
}

impl fmt::Display for ExplanationDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.explanation.is_empty() {
            return f.write_str("no pending rule is blocked");
        }
        let registry = self.solver.registry();

        for (i, blocked) in self.explanation.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "rule {}", blocked.rule)?;
            if let Some(label) = self
                .solver
                .rule(blocked.rule)
                .ok()
                .and_then(|rule| rule.label())
            {
                write!(f, " ({label})")?;
            }
            f.write_str(" is waiting on:")?;

            for missing in &blocked.missing {
                write!(f, "\n  - {}: ", registry.display_name(missing.fact))?;
                match &missing.blocker {
                    Blocker::Unreachable => f.write_str("no pending rule concludes it")?,
                    Blocker::Awaiting(rules) => {
                        f.write_str("awaiting rule")?;
                        if rules.len() > 1 {
                            f.write_str("s")?;
                        }
                        for rule in rules {
                            write!(f, " {rule}")?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Fact Origin
// =============================================================================

/// How a fact came to be in working memory, or why it is absent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactOrigin {
    /// Seeded as an initial input.
    Input,
    /// Asserted when this rule fired.
    ConcludedBy(RuleId),
    /// Absent, but these pending rules would assert it.
    Pending(Vec<RuleId>),
    /// Absent, and no pending rule asserts it.
    Unreachable,
}

// =============================================================================
// Why Query
// =============================================================================

/// Entry points for explaining solver state.
pub struct WhyQuery;

impl WhyQuery {
    /// Explains every pending rule whose conditions do not all hold.
    #[must_use]
    pub fn blocked(solver: &Solver) -> BlockedExplanation {
        let memory = solver.memory();
        let mut rules = Vec::new();

        for id in solver.pending() {
            let Ok(rule) = solver.rule(id) else {
                continue;
            };
            let missing: Vec<MissingCondition> = rule
                .missing(memory)
                .map(|fact| MissingCondition {
                    fact,
                    blocker: Self::blocker(solver, fact, Some(id)),
                })
                .collect();
            if !missing.is_empty() {
                rules.push(BlockedRule { rule: id, missing });
            }
        }

        BlockedExplanation { rules }
    }

    /// Explains how `fact` got into working memory, or why it is absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `fact` was issued by another registry.
    pub fn fact(solver: &Solver, fact: FactId) -> Result<FactOrigin> {
        solver.registry().check(fact)?;
        let memory = solver.memory();

        let Some(position) = memory.iter().position(|f| f == fact) else {
            return Ok(match Self::blocker(solver, fact, None) {
                Blocker::Unreachable => FactOrigin::Unreachable,
                Blocker::Awaiting(rules) => FactOrigin::Pending(rules),
            });
        };

        // Memory holds the inputs followed by each firing's conclusions, in
        // firing order.
        let fired: Vec<RuleId> = solver.fired().collect();
        let concluded: usize = fired
            .iter()
            .filter_map(|&id| solver.rule(id).ok())
            .map(|rule| rule.conclusions().len())
            .sum();
        let mut offset = memory.len().saturating_sub(concluded);
        if position < offset {
            return Ok(FactOrigin::Input);
        }

        for id in fired {
            let width = solver.rule(id).map_or(0, |rule| rule.conclusions().len());
            if position < offset + width {
                return Ok(FactOrigin::ConcludedBy(id));
            }
            offset += width;
        }
        Ok(FactOrigin::Unreachable)
    }

    fn blocker(solver: &Solver, fact: FactId, except: Option<RuleId>) -> Blocker {
        let concluders: Vec<RuleId> = solver
            .pending()
            .filter(|&id| Some(id) != except)
            .filter(|&id| solver.rule(id).is_ok_and(|rule| rule.concludes(fact)))
            .collect();
        if concluders.is_empty() {
            Blocker::Unreachable
        } else {
            Blocker::Awaiting(concluders)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
