//! Trace output formatters.
//!
//! Provides human-readable and JSON formatters for trace records. Both resolve
//! fact handles to names through the registry that issued them.

use std::fmt::Write;

use prodmodel_engine::RuleId;
use prodmodel_foundation::{FactId, FactRegistry};

use super::record::{TraceEvent, TraceRecord};

// =============================================================================
// Trace Formatter Trait
// =============================================================================

/// Trait for formatting trace records.
pub trait TraceFormatter {
    /// Formats a single trace record to a string.
    fn format(&self, record: &TraceRecord, registry: &FactRegistry) -> String;

    /// Formats multiple records.
    fn format_many(&self, records: &[&TraceRecord], registry: &FactRegistry) -> String {
        records
            .iter()
            .map(|r| self.format(r, registry))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn rule_list(rules: &[RuleId]) -> String {
    rules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Human-Readable Formatter
// =============================================================================

/// Formats trace records in human-readable form.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    /// Whether to include timestamps.
    pub show_timestamps: bool,
    /// Whether to include record IDs.
    pub show_ids: bool,
}

impl HumanFormatter {
    /// Creates a new human formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to show timestamps.
    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.show_timestamps = true;
        self
    }

    /// Builder method to show record IDs.
    #[must_use]
    pub fn with_ids(mut self) -> Self {
        self.show_ids = true;
        self
    }

    /// Formats timestamp in microseconds.
    #[allow(clippy::cast_precision_loss)]
    fn format_timestamp(ns: u64) -> String {
        let us = ns / 1000;
        if us >= 1_000_000 {
            format!("{:.3}s", us as f64 / 1_000_000.0)
        } else if us >= 1000 {
            format!("{:.3}ms", us as f64 / 1000.0)
        } else {
            format!("{us}us")
        }
    }
}

impl TraceFormatter for HumanFormatter {
    fn format(&self, record: &TraceRecord, registry: &FactRegistry) -> String {
        let mut line = String::new();

        if self.show_ids {
            let _ = write!(line, "[{:06}] ", record.id);
        }

        let _ = write!(line, "P{:03} ", record.pass);

        if self.show_timestamps {
            let _ = write!(line, "{:>10} ", Self::format_timestamp(record.timestamp_ns));
        }

        let _ = match &record.event {
            TraceEvent::RunStart { rules, inputs } => {
                write!(line, "=== RUN START ({rules} rules, {inputs} inputs) ===")
            }
            TraceEvent::PassStart { pass } => write!(line, "--- pass {pass} ---"),
            TraceEvent::PassEnd { pass, fired } => {
                write!(line, "--- pass {pass} end ({fired} fired) ---")
            }
            TraceEvent::RuleExamined { rule, performing } => {
                let verdict = if *performing { "fires" } else { "skipped" };
                write!(line, "  EXAMINE rule {rule}: {verdict}")
            }
            TraceEvent::RuleFired { rule } => write!(line, "  FIRE rule {rule}"),
            TraceEvent::EffectPerformed { fact, invocations } => write!(
                line,
                "    EFFECT {} x{invocations}",
                registry.display_name(*fact)
            ),
            TraceEvent::FactAsserted { fact, rule } => write!(
                line,
                "    ASSERT {} (rule {rule})",
                registry.display_name(*fact)
            ),
            TraceEvent::RunSucceeded { steps } => {
                write!(line, "=== RUN SUCCEEDED after {steps} steps ===")
            }
            TraceEvent::RunFailed { unsatisfied } => write!(
                line,
                "=== RUN FAILED: rules {} unsatisfied ===",
                rule_list(unsatisfied)
            ),
            TraceEvent::Custom { name, data } => write!(line, "  CUSTOM {name}: {data}"),
        };

        line
    }
}

// =============================================================================
// JSON Formatter
// =============================================================================

/// Formats trace records as JSON.
#[derive(Clone, Debug, Default)]
pub struct JsonFormatter {
    /// Whether to put each record of a list on its own line.
    pub pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method for pretty printing.
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Escapes a string for JSON.
    fn escape_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    fn rule_array(rules: &[RuleId]) -> String {
        let numbers: Vec<_> = rules.iter().map(|r| r.number().to_string()).collect();
        format!("[{}]", numbers.join(","))
    }
}

impl TraceFormatter for JsonFormatter {
    fn format(&self, record: &TraceRecord, registry: &FactRegistry) -> String {
        let fact_name = |fact: FactId| Self::escape_string(registry.display_name(fact));

        let event_data = match &record.event {
            TraceEvent::RunStart { rules, inputs } => {
                format!("\"rules\":{rules},\"inputs\":{inputs}")
            }
            TraceEvent::PassStart { pass } => format!("\"pass\":{pass}"),
            TraceEvent::PassEnd { pass, fired } => format!("\"pass\":{pass},\"fired\":{fired}"),
            TraceEvent::RuleExamined { rule, performing } => {
                format!("\"rule\":{},\"performing\":{performing}", rule.number())
            }
            TraceEvent::RuleFired { rule } => format!("\"rule\":{}", rule.number()),
            TraceEvent::EffectPerformed { fact, invocations } => {
                format!("\"fact\":\"{}\",\"invocations\":{invocations}", fact_name(*fact))
            }
            TraceEvent::FactAsserted { fact, rule } => {
                format!("\"fact\":\"{}\",\"rule\":{}", fact_name(*fact), rule.number())
            }
            TraceEvent::RunSucceeded { steps } => format!("\"steps\":{steps}"),
            TraceEvent::RunFailed { unsatisfied } => {
                format!("\"unsatisfied\":{}", Self::rule_array(unsatisfied))
            }
            TraceEvent::Custom { name, data } => format!(
                "\"name\":\"{}\",\"data\":\"{}\"",
                Self::escape_string(name),
                Self::escape_string(data)
            ),
        };

        format!(
            "{{\"id\":{},\"pass\":{},\"timestamp_ns\":{},\"type\":\"{}\",{}}}",
            record.id,
            record.pass,
            record.timestamp_ns,
            record.event_type(),
            event_data
        )
    }

    fn format_many(&self, records: &[&TraceRecord], registry: &FactRegistry) -> String {
        let items: Vec<_> = records.iter().map(|r| self.format(r, registry)).collect();
        if self.pretty {
            format!("[\n  {}\n]", items.join(",\n  "))
        } else {
            format!("[{}]", items.join(","))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
