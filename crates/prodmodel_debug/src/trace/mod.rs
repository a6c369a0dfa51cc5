//! Tracing system for prodmodel runs.
//!
//! Records what the solver does, step by step, with no work done when
//! disabled. Supports both human-readable and JSON output formats.
//!
//! # Example
//!
//! ```text
//! prodmodel> trace on
//! prodmodel> step
//! P000 --- pass 0 ---
//! P000   EXAMINE rule #1: fires
//! P000   FIRE rule #1
//! P000     ASSERT invite friend (rule #1)
//! ```

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::{TraceBuffer, TraceBufferStats};
pub use format::{HumanFormatter, JsonFormatter, TraceFormatter};
pub use record::{TraceEvent, TraceRecord};

use std::io::{self, Write};
use std::time::Instant;

use prodmodel_engine::{Solver, StepOutcome};
use prodmodel_foundation::FactRegistry;

// =============================================================================
// Trace Output
// =============================================================================

/// Where trace output should be sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// No output (traces still recorded in buffer).
    #[default]
    None,
    /// Write to stderr.
    Stderr,
    /// Write to stdout.
    Stdout,
}

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Configuration for the tracer.
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Maximum records to keep in buffer.
    pub buffer_size: usize,
    /// Where to output traces.
    pub output: TraceOutput,
    /// Whether to use JSON format.
    pub json_format: bool,
    /// Filter for specific event types (empty = all).
    pub event_filter: Vec<String>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: 10_000,
            output: TraceOutput::None,
            json_format: false,
            event_filter: Vec::new(),
        }
    }
}

impl TracerConfig {
    /// Creates a new tracer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable tracing.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Builder method to set buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Builder method to set the output destination.
    #[must_use]
    pub fn with_output(mut self, output: TraceOutput) -> Self {
        self.output = output;
        self
    }

    /// Builder method to output to stderr.
    #[must_use]
    pub fn to_stderr(self) -> Self {
        self.with_output(TraceOutput::Stderr)
    }

    /// Builder method to use JSON format.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Builder method to filter event types.
    #[must_use]
    pub fn filter_events(mut self, types: Vec<String>) -> Self {
        self.event_filter = types;
        self
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Records solver activity as trace events.
///
/// Feed it every step outcome through [`Tracer::observe`]. When disabled,
/// `observe` and `record` return immediately.
pub struct Tracer {
    config: TracerConfig,
    buffer: TraceBuffer,
    start_time: Instant,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
    /// Pass the next observed step belongs to.
    current_pass: u64,
    fired_in_pass: usize,
    started: bool,
    finished: bool,
}

impl Tracer {
    /// Creates a new tracer with the given configuration.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer_size = config.buffer_size;
        Self {
            config,
            buffer: TraceBuffer::new(buffer_size),
            start_time: Instant::now(),
            human_formatter: HumanFormatter::new(),
            json_formatter: JsonFormatter::new(),
            current_pass: 0,
            fired_in_pass: 0,
            started: false,
            finished: false,
        }
    }

    /// Creates a tracer with default configuration (disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TracerConfig::default())
    }

    /// Creates an enabled tracer that outputs to stderr.
    #[must_use]
    pub fn to_stderr() -> Self {
        Self::new(TracerConfig::new().enabled().to_stderr())
    }

    /// Returns whether tracing is enabled.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enables tracing.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Disables tracing.
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Returns the pass the next observed step belongs to.
    #[must_use]
    pub fn current_pass(&self) -> u64 {
        self.current_pass
    }

    /// Sets whether to use JSON output format.
    pub fn set_json_format(&mut self, json: bool) {
        self.config.json_format = json;
    }

    /// Sets the trace output destination.
    pub fn set_output(&mut self, output: TraceOutput) {
        self.config.output = output;
    }

    /// Records a trace event that does not come from a step.
    #[inline]
    pub fn record(&mut self, event: TraceEvent) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(event, None);
    }

    /// Records the start of a run. Call before the first step.
    pub fn begin(&mut self, solver: &Solver) {
        if !self.config.enabled {
            return;
        }
        self.start(solver, solver.memory().len());
    }

    /// Converts one step outcome into trace events.
    ///
    /// Starts the run implicitly if [`Tracer::begin`] was not called.
    pub fn observe(&mut self, solver: &Solver, outcome: &StepOutcome) {
        if !self.config.enabled {
            return;
        }
        let registry = solver.registry();

        if !self.started {
            let asserted = outcome.as_step().map_or(0, |s| s.asserted.len());
            self.start(solver, solver.memory().len().saturating_sub(asserted));
        }

        match outcome {
            StepOutcome::Examined(step) => {
                self.record_internal(
                    TraceEvent::RuleExamined {
                        rule: step.rule,
                        performing: step.performing,
                    },
                    Some(registry),
                );
                if step.performing {
                    self.fired_in_pass += 1;
                    self.record_internal(TraceEvent::RuleFired { rule: step.rule }, Some(registry));
                    for &fact in &step.asserted {
                        let effect = registry.fact(fact).filter(|f| f.has_effect());
                        if let Some(performed) = effect {
                            self.record_internal(
                                TraceEvent::EffectPerformed {
                                    fact,
                                    invocations: performed.repeat(),
                                },
                                Some(registry),
                            );
                        }
                        self.record_internal(
                            TraceEvent::FactAsserted {
                                fact,
                                rule: step.rule,
                            },
                            Some(registry),
                        );
                    }
                }

                if solver.iteration() != self.current_pass {
                    self.record_internal(
                        TraceEvent::PassEnd {
                            pass: self.current_pass,
                            fired: self.fired_in_pass,
                        },
                        Some(registry),
                    );
                    self.current_pass = solver.iteration();
                    self.fired_in_pass = 0;
                    if !solver.is_terminal() && solver.pending().next().is_some() {
                        self.record_internal(
                            TraceEvent::PassStart {
                                pass: self.current_pass,
                            },
                            Some(registry),
                        );
                    }
                }
            }
            StepOutcome::Succeeded => {
                if !self.finished {
                    self.finished = true;
                    self.record_internal(
                        TraceEvent::RunSucceeded {
                            steps: solver.steps_taken(),
                        },
                        Some(registry),
                    );
                }
            }
            StepOutcome::Failed(deadlock) => {
                if !self.finished {
                    self.finished = true;
                    self.record_internal(
                        TraceEvent::RunFailed {
                            unsatisfied: deadlock.unsatisfied.clone(),
                        },
                        Some(registry),
                    );
                }
            }
        }
    }

    /// Realigns pass tracking after the solver was rewound to `step`.
    pub fn rewound(&mut self, solver: &Solver, step: u64) {
        self.current_pass = solver.iteration();
        self.fired_in_pass = 0;
        self.finished = solver.is_terminal();
        self.record(TraceEvent::Custom {
            name: "rewind".to_string(),
            data: format!("step {step}"),
        });
    }

    fn start(&mut self, solver: &Solver, inputs: usize) {
        self.started = true;
        self.finished = false;
        self.current_pass = solver.iteration();
        self.fired_in_pass = 0;
        let registry = solver.registry();
        self.record_internal(
            TraceEvent::RunStart {
                rules: solver.rules().len(),
                inputs,
            },
            Some(registry),
        );
        self.record_internal(
            TraceEvent::PassStart {
                pass: self.current_pass,
            },
            Some(registry),
        );
    }

    /// Internal recording logic (called when tracing is enabled).
    fn record_internal(&mut self, event: TraceEvent, registry: Option<&FactRegistry>) {
        if !self.config.event_filter.is_empty()
            && !self
                .config
                .event_filter
                .iter()
                .any(|t| t == event.event_type())
        {
            return;
        }

        #[allow(clippy::cast_possible_truncation)]
        let timestamp_ns = self.start_time.elapsed().as_nanos() as u64;
        let id = self.buffer.push(self.current_pass, timestamp_ns, event);

        if self.config.output == TraceOutput::None {
            return;
        }
        let Some(record) = self.buffer.get(id) else {
            return;
        };
        let line = match registry {
            Some(registry) => self.format_record(record, registry),
            None => format!(
                "P{:03} [{:06}] {}",
                record.pass,
                record.id,
                record.event_type()
            ),
        };
        let _ = match self.config.output {
            TraceOutput::Stderr => writeln!(io::stderr(), "{line}"),
            TraceOutput::Stdout => writeln!(io::stdout(), "{line}"),
            TraceOutput::None => Ok(()),
        };
    }

    /// Formats a record using the current format settings.
    #[must_use]
    pub fn format_record(&self, record: &TraceRecord, registry: &FactRegistry) -> String {
        if self.config.json_format {
            self.json_formatter.format(record, registry)
        } else {
            self.human_formatter.format(record, registry)
        }
    }

    /// Formats multiple records.
    #[must_use]
    pub fn format_records(&self, records: &[&TraceRecord], registry: &FactRegistry) -> String {
        if self.config.json_format {
            self.json_formatter.format_many(records, registry)
        } else {
            self.human_formatter.format_many(records, registry)
        }
    }

    /// Returns the trace buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Clears the trace buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        self.buffer.stats()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

// =============================================================================
// Tests
// =============================================================================
