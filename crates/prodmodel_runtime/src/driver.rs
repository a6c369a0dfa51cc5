//! Paced terminal rendering of a solver run.
//!
//! The driver prints the rule list and the initial working memory, then
//! steps the solver, showing each examined rule as it is visited and each
//! asserted fact as it lands in memory.

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use prodmodel_debug::Tracer;
use prodmodel_engine::{Deadlock, RuleId, Solver, StepOutcome, Termination, Wording};
use prodmodel_foundation::{Error, FactId, Result};

use crate::style::Styles;

// =============================================================================
// Configuration
// =============================================================================

/// Called once with the solver when a run succeeds.
pub type SuccessCallback = Box<dyn FnMut(&Solver)>;

/// Called once with the solver and the deadlock when a run fails.
pub type FailureCallback = Box<dyn FnMut(&Solver, &Deadlock)>;

/// Which listings carry numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Numbering {
    /// Number rules (`R1. ...`).
    pub rules: bool,
    /// Number facts in working memory (`F1. ...`).
    pub facts: bool,
}

impl Default for Numbering {
    fn default() -> Self {
        Self {
            rules: true,
            facts: false,
        }
    }
}

/// Configuration for a [`Driver`].
pub struct DriverConfig {
    /// Pause between steps.
    pub speed: Duration,
    /// Numbering toggles.
    pub numbering: Numbering,
    /// Colour scheme used when `color` is on.
    pub styles: Styles,
    /// Prefix before rule numbers.
    pub rule_prefix: String,
    /// Prefix before fact numbers.
    pub fact_prefix: String,
    /// Whether to emit escape sequences.
    pub color: bool,
    /// Connectives used to render rules.
    pub wording: Wording,
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            speed: Duration::from_secs(1),
            numbering: Numbering::default(),
            styles: Styles::ansi(),
            rule_prefix: "R".to_string(),
            fact_prefix: "F".to_string(),
            color: true,
            wording: Wording::default(),
            on_success: None,
            on_failure: None,
        }
    }
}

impl DriverConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the pause between steps.
    #[must_use]
    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.speed = speed;
        self
    }

    /// Builder method to set the numbering toggles.
    #[must_use]
    pub fn with_numbering(mut self, numbering: Numbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// Builder method to set the colour scheme.
    #[must_use]
    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    /// Builder method to set the rule and fact prefixes.
    #[must_use]
    pub fn with_prefixes(mut self, rule: impl Into<String>, fact: impl Into<String>) -> Self {
        self.rule_prefix = rule.into();
        self.fact_prefix = fact.into();
        self
    }

    /// Builder method to turn colour on or off.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Builder method to set the rule wording.
    #[must_use]
    pub fn with_wording(mut self, wording: Wording) -> Self {
        self.wording = wording;
        self
    }

    /// Builder method to set the success callback.
    #[must_use]
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Solver) + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Builder method to set the failure callback.
    #[must_use]
    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Solver, &Deadlock) + 'static,
    {
        self.on_failure = Some(Box::new(callback));
        self
    }

    /// Returns the styles in effect, honouring `color`.
    #[must_use]
    pub fn effective_styles(&self) -> Styles {
        if self.color {
            self.styles.clone()
        } else {
            Styles::plain()
        }
    }
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("speed", &self.speed)
            .field("numbering", &self.numbering)
            .field("rule_prefix", &self.rule_prefix)
            .field("fact_prefix", &self.fact_prefix)
            .field("color", &self.color)
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Pause Handle
// =============================================================================

/// Cooperative stop flag shared with a running [`Driver`].
#[derive(Clone, Debug, Default)]
pub struct PauseHandle(Arc<AtomicBool>);

impl PauseHandle {
    /// Asks the driver to stop before its next step.
    pub fn pause(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true if a pause was requested.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Steps a solver at a fixed pace and renders each step to `out`.
pub struct Driver<W: Write> {
    solver: Solver,
    config: DriverConfig,
    styles: Styles,
    out: W,
    tracer: Tracer,
    pause: PauseHandle,
    reported: bool,
    traced: bool,
}

impl<W: Write> Driver<W> {
    /// Creates a driver writing to `out`.
    pub fn new(solver: Solver, config: DriverConfig, out: W) -> Self {
        let styles = config.effective_styles();
        Self {
            solver,
            config,
            styles,
            out,
            tracer: Tracer::disabled(),
            pause: PauseHandle::default(),
            reported: false,
            traced: false,
        }
    }

    /// Attaches a tracer that observes every step.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Returns the solver.
    #[must_use]
    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Returns the tracer.
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Returns the output writer.
    #[must_use]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consumes the driver, returning the solver and the writer.
    pub fn into_parts(self) -> (Solver, W) {
        (self.solver, self.out)
    }

    /// Returns a handle that can pause the run from elsewhere.
    #[must_use]
    pub fn pause_handle(&self) -> PauseHandle {
        self.pause.clone()
    }

    /// Stops the run before its next step.
    pub fn pause(&self) {
        self.pause.pause();
    }

    /// Clears a pending pause so [`Driver::solve`] can continue.
    pub fn resume(&self) {
        self.pause.clear();
    }

    /// Prints the numbered rule list and the current working memory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn render_initial(&mut self) -> Result<()> {
        let heading = self.styles.paint(&self.styles.heading, "Rules:");
        writeln!(self.out, "{heading}").map_err(io_error)?;
        for index in 0..self.solver.rules().len() {
            let line = self.rule_line(RuleId::new(index));
            writeln!(self.out, "  {line}").map_err(io_error)?;
        }

        let heading = self.styles.paint(&self.styles.heading, "Memory:");
        writeln!(self.out, "{heading}").map_err(io_error)?;
        let facts: Vec<FactId> = self.solver.memory().iter().collect();
        for (position, fact) in facts.into_iter().enumerate() {
            let line = self.fact_line(position + 1, fact);
            writeln!(self.out, "  {line}").map_err(io_error)?;
        }
        self.out.flush().map_err(io_error)
    }

    /// Steps the solver until it succeeds, deadlocks or is paused.
    ///
    /// Returns `None` when paused. The matching callback runs exactly once,
    /// the first time a terminal outcome is reached.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn solve(&mut self) -> Result<Option<Termination>> {
        if !self.traced {
            self.traced = true;
            self.tracer.begin(&self.solver);
        }

        loop {
            if self.pause.is_paused() {
                return Ok(None);
            }

            let outcome = self.solver.step();
            self.tracer.observe(&self.solver, &outcome);

            match outcome {
                StepOutcome::Examined(step) => {
                    self.render_step(step.rule, step.performing, &step.asserted)?;
                    if !self.solver.is_terminal() && !self.config.speed.is_zero() {
                        thread::sleep(self.config.speed);
                    }
                }
                StepOutcome::Succeeded => {
                    let verdict = self.styles.paint(&self.styles.success, "Solved.");
                    writeln!(self.out, "{verdict}").map_err(io_error)?;
                    self.out.flush().map_err(io_error)?;
                    if !self.reported {
                        self.reported = true;
                        if let Some(callback) = self.config.on_success.as_mut() {
                            callback(&self.solver);
                        }
                    }
                    return Ok(Some(Termination::Succeeded));
                }
                StepOutcome::Failed(deadlock) => {
                    let verdict = self
                        .styles
                        .paint(&self.styles.failure, &format!("Failed: {deadlock}."));
                    writeln!(self.out, "{verdict}").map_err(io_error)?;
                    self.out.flush().map_err(io_error)?;
                    if !self.reported {
                        self.reported = true;
                        if let Some(callback) = self.config.on_failure.as_mut() {
                            callback(&self.solver, &deadlock);
                        }
                    }
                    return Ok(Some(Termination::Failed(deadlock)));
                }
            }
        }
    }

    fn render_step(&mut self, rule: RuleId, performing: bool, asserted: &[FactId]) -> Result<()> {
        let line = self.rule_line(rule);
        if performing {
            let line = self.styles.paint(&self.styles.performed, &line);
            writeln!(self.out, "* {line}").map_err(io_error)?;

            let first = self.solver.memory().len() - asserted.len() + 1;
            for (offset, &fact) in asserted.iter().enumerate() {
                let fact_line = self.fact_line(first + offset, fact);
                let fact_line = self.styles.paint(&self.styles.fact, &fact_line);
                writeln!(self.out, "    + {fact_line}").map_err(io_error)?;
            }
        } else {
            let line = self.styles.paint(&self.styles.current, &line);
            writeln!(self.out, "> {line}").map_err(io_error)?;
        }
        self.out.flush().map_err(io_error)
    }

    fn rule_line(&self, id: RuleId) -> String {
        let text = self.solver.rules().get(id.index()).map_or_else(String::new, |rule| {
            rule.display_with(self.solver.registry(), self.config.wording.clone())
                .to_string()
        });
        if self.config.numbering.rules {
            format!("{}{}. {text}", self.config.rule_prefix, id.number())
        } else {
            text
        }
    }

    fn fact_line(&self, number: usize, fact: FactId) -> String {
        let name = self.solver.registry().display_name(fact);
        if self.config.numbering.facts {
            format!("{}{number}. {name}", self.config.fact_prefix)
        } else {
            name.to_string()
        }
    }
}

fn io_error(e: std::io::Error) -> Error {
    Error::io(e.to_string())
}

// =============================================================================
// Tests
// =============================================================================
