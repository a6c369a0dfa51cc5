//! Production rules.
//!
//! A [`Rule`] is an implication from a set of condition facts to a set of
//! conclusion facts. Rules are immutable once handed to a solver.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use prodmodel_foundation::{FactId, FactRegistry, Result};

use crate::memory::WorkingMemory;

// =============================================================================
// Rule Id
// =============================================================================

/// Position of a rule in the solver's declaration order (0-based).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuleId(usize);

impl RuleId {
    /// Creates a rule id from a declaration index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the declaration index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns the 1-based number used when rules are listed.
    #[must_use]
    pub const fn number(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Debug for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleId({})", self.0)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.number())
    }
}

// =============================================================================
// Rule
// =============================================================================

/// An implication: when every condition holds, the conclusions are asserted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rule {
    label: Option<String>,
    conditions: Vec<FactId>,
    conclusions: Vec<FactId>,
}

impl Rule {
    /// Creates a rule with no conditions and no conclusions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule from conditions and conclusions.
    pub fn implies<C, K>(conditions: C, conclusions: K) -> Self
    where
        C: IntoIterator<Item = FactId>,
        K: IntoIterator<Item = FactId>,
    {
        Self::new().when(conditions).then(conclusions)
    }

    /// Appends conditions (set semantics, insertion order kept).
    #[must_use]
    pub fn when<I>(mut self, facts: I) -> Self
    where
        I: IntoIterator<Item = FactId>,
    {
        self.add_conditions(facts);
        self
    }

    /// Appends conclusions (set semantics, insertion order kept).
    #[must_use]
    pub fn then<I>(mut self, facts: I) -> Self
    where
        I: IntoIterator<Item = FactId>,
    {
        self.add_conclusions(facts);
        self
    }

    /// Sets a display label.
    #[must_use]
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Appends conditions in place.
    pub fn add_conditions<I>(&mut self, facts: I)
    where
        I: IntoIterator<Item = FactId>,
    {
        push_unique(&mut self.conditions, facts);
    }

    /// Appends conclusions in place.
    pub fn add_conclusions<I>(&mut self, facts: I)
    where
        I: IntoIterator<Item = FactId>,
    {
        push_unique(&mut self.conclusions, facts);
    }

    /// Returns the label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the condition facts in declaration order.
    #[must_use]
    pub fn conditions(&self) -> &[FactId] {
        &self.conditions
    }

    /// Returns the conclusion facts in declaration order.
    #[must_use]
    pub fn conclusions(&self) -> &[FactId] {
        &self.conclusions
    }

    /// Returns true if every condition is present in `memory`.
    ///
    /// A rule without conditions is always satisfied.
    #[must_use]
    pub fn is_satisfied(&self, memory: &WorkingMemory) -> bool {
        self.conditions.iter().all(|&c| memory.contains(c))
    }

    /// Iterates over the conditions not yet present in `memory`.
    pub fn missing<'a>(&'a self, memory: &'a WorkingMemory) -> impl Iterator<Item = FactId> + 'a {
        self.conditions
            .iter()
            .copied()
            .filter(move |&c| !memory.contains(c))
    }

    /// Returns true if `fact` is one of this rule's conclusions.
    #[must_use]
    pub fn concludes(&self, fact: FactId) -> bool {
        self.conclusions.contains(&fact)
    }

    /// Performs every conclusion's effect in declared order and returns the
    /// conclusions for the caller to assert.
    ///
    /// Does not check satisfiability; that is the caller's job.
    pub fn fire(&self, registry: &mut FactRegistry) -> &[FactId] {
        for &conclusion in &self.conclusions {
            registry.perform(conclusion);
        }
        &self.conclusions
    }

    /// Checks that every referenced fact was issued by `registry`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first foreign fact.
    pub fn validate(&self, registry: &FactRegistry) -> Result<()> {
        self.conditions
            .iter()
            .chain(&self.conclusions)
            .try_for_each(|&f| registry.check(f))
    }

    /// Renders the rule with English connectives.
    #[must_use]
    pub fn display<'a>(&'a self, registry: &'a FactRegistry) -> RuleDisplay<'a> {
        RuleDisplay {
            rule: self,
            registry,
            wording: Wording::default(),
        }
    }

    /// Renders the rule with custom connectives.
    #[must_use]
    pub fn display_with<'a>(
        &'a self,
        registry: &'a FactRegistry,
        wording: Wording,
    ) -> RuleDisplay<'a> {
        RuleDisplay {
            rule: self,
            registry,
            wording,
        }
    }
}

fn push_unique<I>(target: &mut Vec<FactId>, facts: I)
where
    I: IntoIterator<Item = FactId>,
{
    for fact in facts {
        if !target.contains(&fact) {
            target.push(fact);
        }
    }
}

// =============================================================================
// Display
// =============================================================================

/// Connective words used when a rule is rendered as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wording {
    /// Opens the condition list.
    pub if_word: String,
    /// Joins facts within a list.
    pub and_word: String,
    /// Opens the conclusion list.
    pub then_word: String,
    /// Stands in for an empty condition list.
    pub always_word: String,
}

impl Default for Wording {
    fn default() -> Self {
        Self {
            if_word: "If".to_string(),
            and_word: "and".to_string(),
            then_word: "then".to_string(),
            always_word: "true".to_string(),
        }
    }
}

/// Renders a rule as `If A and B, then C.`
pub struct RuleDisplay<'a> {
    rule: &'a Rule,
    registry: &'a FactRegistry,
    wording: Wording,
}

impl RuleDisplay<'_> {
    fn write_list(&self, f: &mut fmt::Formatter<'_>, facts: &[FactId]) -> fmt::Result {
        for (i, &fact) in facts.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.wording.and_word)?;
            }
            f.write_str(self.registry.display_name(fact))?;
        }
        Ok(())
    }
}

impl fmt::Display for RuleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.wording.if_word)?;
        if self.rule.conditions.is_empty() {
            f.write_str(&self.wording.always_word)?;
        } else {
            self.write_list(f, &self.rule.conditions)?;
        }
        write!(f, ", {} ", self.wording.then_word)?;
        self.write_list(f, &self.rule.conclusions)?;
        f.write_str(".")
    }
}

// =============================================================================
// Tests
// =============================================================================
