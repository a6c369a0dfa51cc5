//! The step-wise forward-chaining solver.
//!
//! The solver keeps a queue of pending rules and a cursor into it. Each call
//! to [`Solver::step`] examines the rule under the cursor: a satisfied rule
//! fires and leaves the queue, an unsatisfied one is skipped. A pass ends
//! when the cursor runs off the end of the queue. The run succeeds when the
//! queue is empty and fails when a whole pass fires nothing.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use prodmodel_foundation::{Error, FactId, FactRegistry, Result};

use crate::config::SolverConfig;
use crate::history::{HistoryBuffer, Snapshot};
use crate::memory::WorkingMemory;
use crate::rule::{Rule, RuleId};

// =============================================================================
// Outcomes
// =============================================================================

/// Terminal failure: the remaining rules can never become satisfied.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Deadlock {
    /// Rules still pending, in queue order.
    pub unsatisfied: Vec<RuleId>,
    /// Pass count at the time the deadlock was detected.
    pub iteration: u64,
}

impl fmt::Display for Deadlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no progress possible; rules")?;
        for rule in &self.unsatisfied {
            write!(f, " {rule}")?;
        }
        f.write_str(" can never be satisfied")
    }
}

/// Lifecycle state of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// Rules are pending and progress is still possible.
    Running,
    /// Every rule has fired.
    Succeeded,
    /// A full pass fired nothing.
    Failed(Deadlock),
}

impl Status {
    /// Returns true for `Succeeded` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Descriptor of one examined rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// The rule that was examined.
    pub rule: RuleId,
    /// Whether it fired.
    pub performing: bool,
    /// Facts asserted by the firing, in declaration order.
    pub asserted: Vec<FactId>,
}

/// Result of a single [`Solver::step`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A rule was examined.
    Examined(Step),
    /// The run has succeeded.
    Succeeded,
    /// The run has deadlocked.
    Failed(Deadlock),
}

impl StepOutcome {
    /// Returns true if the run is over.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Examined(_))
    }

    /// Returns the terminal verdict: `Some(true)` on success, `Some(false)`
    /// on failure, `None` while running.
    #[must_use]
    pub fn verdict(&self) -> Option<bool> {
        match self {
            Self::Examined(_) => None,
            Self::Succeeded => Some(true),
            Self::Failed(_) => Some(false),
        }
    }

    /// Returns the step descriptor, if a rule was examined.
    #[must_use]
    pub fn as_step(&self) -> Option<&Step> {
        match self {
            Self::Examined(step) => Some(step),
            _ => None,
        }
    }
}

/// Final result of [`Solver::run_to_completion`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Every rule fired.
    Succeeded,
    /// The run deadlocked.
    Failed(Deadlock),
}

impl Termination {
    /// Returns true on success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns the deadlock, if the run failed.
    #[must_use]
    pub fn deadlock(&self) -> Option<&Deadlock> {
        match self {
            Self::Succeeded => None,
            Self::Failed(deadlock) => Some(deadlock),
        }
    }
}

// =============================================================================
// Solver
// =============================================================================

/// Forward-chaining solver over a fixed rule list.
pub struct Solver {
    registry: FactRegistry,
    rules: Vec<Rule>,
    memory: WorkingMemory,
    /// Rules not yet fired, in declaration order.
    pending: im::Vector<RuleId>,
    /// Rules fired so far, in firing order.
    fired: im::Vector<RuleId>,
    head: usize,
    iteration: u64,
    fired_this_pass: usize,
    steps: u64,
    status: Status,
    last_asserted: Vec<FactId>,
    history: HistoryBuffer,
    config: SolverConfig,
}

impl Solver {
    /// Creates a solver with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if an input or a rule refers to a fact
    /// that `registry` did not issue.
    pub fn new<I, R>(registry: FactRegistry, inputs: I, rules: R) -> Result<Self>
    where
        I: IntoIterator<Item = FactId>,
        R: IntoIterator<Item = Rule>,
    {
        Self::with_config(registry, inputs, rules, SolverConfig::default())
    }

    /// Creates a solver with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if an input or a rule refers to a fact
    /// that `registry` did not issue.
    pub fn with_config<I, R>(
        registry: FactRegistry,
        inputs: I,
        rules: R,
        config: SolverConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = FactId>,
        R: IntoIterator<Item = Rule>,
    {
        let inputs: Vec<FactId> = inputs.into_iter().collect();
        for &fact in &inputs {
            registry.check(fact)?;
        }

        let rules: Vec<Rule> = rules.into_iter().collect();
        for rule in &rules {
            rule.validate(&registry)?;
        }

        Ok(Self {
            registry,
            pending: (0..rules.len()).map(RuleId::new).collect(),
            rules,
            memory: WorkingMemory::with_facts(inputs),
            fired: im::Vector::new(),
            head: 0,
            iteration: 0,
            fired_this_pass: 0,
            steps: 0,
            status: Status::Running,
            last_asserted: Vec::new(),
            history: HistoryBuffer::new(config.history_capacity),
            config,
        })
    }

    // -------------------------------------------------------------------------
    // Driving
    // -------------------------------------------------------------------------

    /// Advances the run by examining one rule.
    ///
    /// Once the run is terminal every further call reports the same verdict.
    pub fn step(&mut self) -> StepOutcome {
        match &self.status {
            Status::Succeeded => return StepOutcome::Succeeded,
            Status::Failed(deadlock) => return StepOutcome::Failed(deadlock.clone()),
            Status::Running => {}
        }

        if self.pending.is_empty() {
            self.status = Status::Succeeded;
            return StepOutcome::Succeeded;
        }

        if self.head >= self.pending.len() {
            self.head = 0;
        }
        let id = self.pending[self.head];
        let rule = &self.rules[id.index()];
        self.steps += 1;

        let performing = rule.is_satisfied(&self.memory);
        let asserted = if performing {
            let conclusions = rule.fire(&mut self.registry).to_vec();
            self.memory.assert_all(conclusions.iter().copied());
            self.pending.remove(self.head);
            self.fired.push_back(id);
            self.fired_this_pass += 1;
            conclusions
        } else {
            self.head += 1;
            Vec::new()
        };
        self.last_asserted.clone_from(&asserted);

        if self.head >= self.pending.len() {
            self.finish_pass();
        }

        if self.config.snapshots_step(performing) {
            self.snapshot(id, performing);
        }

        StepOutcome::Examined(Step {
            rule: id,
            performing,
            asserted,
        })
    }

    /// Steps until one full pass has completed or the run is over.
    ///
    /// Returns the outcomes produced along the way.
    pub fn iterate(&mut self) -> Vec<StepOutcome> {
        let iteration = self.iteration;
        let mut outcomes = Vec::new();
        while self.iteration == iteration {
            let outcome = self.step();
            let terminal = outcome.is_terminal();
            outcomes.push(outcome);
            if terminal {
                break;
            }
        }
        outcomes
    }

    /// Steps until the run succeeds or deadlocks.
    pub fn run_to_completion(&mut self) -> Termination {
        self.run_observed(|_, _| {})
    }

    /// Steps until the run is over, handing every outcome to `observe`.
    pub fn run_observed<F>(&mut self, mut observe: F) -> Termination
    where
        F: FnMut(&Self, &StepOutcome),
    {
        loop {
            let outcome = self.step();
            observe(self, &outcome);
            match outcome {
                StepOutcome::Examined(_) => {}
                StepOutcome::Succeeded => return Termination::Succeeded,
                StepOutcome::Failed(deadlock) => return Termination::Failed(deadlock),
            }
        }
    }

    /// Restores the state recorded after `step`.
    ///
    /// Effects already performed are not undone, and snapshots newer than
    /// `step` are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshot for `step` is in the history.
    pub fn rewind(&mut self, step: u64) -> Result<()> {
        let snapshot = self
            .history
            .get(step)
            .cloned()
            .ok_or_else(|| Error::snapshot_not_found(step))?;

        self.memory = WorkingMemory::from_sequence(snapshot.memory);
        self.pending = snapshot.pending;
        self.fired = snapshot.fired;
        self.head = snapshot.head;
        self.iteration = snapshot.iteration;
        self.fired_this_pass = snapshot.fired_this_pass;
        self.steps = snapshot.step;
        self.status = snapshot.status;
        self.last_asserted.clear();
        self.history.truncate_after(step);
        Ok(())
    }

    fn finish_pass(&mut self) {
        self.iteration += 1;
        self.head = 0;
        if self.fired_this_pass == 0 && !self.pending.is_empty() {
            self.status = Status::Failed(Deadlock {
                unsatisfied: self.pending.iter().copied().collect(),
                iteration: self.iteration,
            });
        }
        self.fired_this_pass = 0;
    }

    fn snapshot(&mut self, examined: RuleId, performing: bool) {
        self.history.push(Snapshot {
            step: self.steps,
            iteration: self.iteration,
            head: self.head,
            fired_this_pass: self.fired_this_pass,
            examined,
            performing,
            status: self.status.clone(),
            memory: self.memory.snapshot_view(),
            pending: self.pending.clone(),
            fired: self.fired.clone(),
        });
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Returns the run status.
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Returns true once the run has succeeded or failed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the fact registry.
    #[must_use]
    pub fn registry(&self) -> &FactRegistry {
        &self.registry
    }

    /// Returns every rule, in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns a rule by id.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is out of range.
    pub fn rule(&self, id: RuleId) -> Result<&Rule> {
        self.rules
            .get(id.index())
            .ok_or_else(|| Error::unknown_rule(id.index()))
    }

    /// Returns the working memory.
    #[must_use]
    pub fn memory(&self) -> &WorkingMemory {
        &self.memory
    }

    /// Iterates over pending rules in queue order.
    pub fn pending(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.pending.iter().copied()
    }

    /// Iterates over fired rules in firing order.
    pub fn fired(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.fired.iter().copied()
    }

    /// Returns true if `id` has fired.
    #[must_use]
    pub fn has_fired(&self, id: RuleId) -> bool {
        self.fired.contains(&id)
    }

    /// Returns the rule the next step will examine, if any.
    #[must_use]
    pub fn current(&self) -> Option<RuleId> {
        if self.status.is_terminal() {
            return None;
        }
        self.pending
            .get(self.head)
            .or_else(|| self.pending.front())
            .copied()
    }

    /// Returns the cursor position within the pending queue.
    #[must_use]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Returns the number of completed passes.
    #[must_use]
    pub const fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Returns the number of rules examined so far.
    #[must_use]
    pub const fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Returns the facts asserted by the most recent step.
    #[must_use]
    pub fn last_asserted(&self) -> &[FactId] {
        &self.last_asserted
    }

    /// Returns the snapshot history.
    #[must_use]
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl fmt::Debug for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("rules", &self.rules.len())
            .field("memory", &self.memory.names(&self.registry))
            .field("pending", &self.pending)
            .field("head", &self.head)
            .field("iteration", &self.iteration)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
