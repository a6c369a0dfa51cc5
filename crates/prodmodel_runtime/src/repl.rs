//! Interactive stepping of a loaded rulebase.

use std::fmt::Write as _;
use std::io::{self, Write};

use prodmodel_debug::{FactOrigin, Tracer, WhyQuery};
use prodmodel_engine::{RuleId, Solver, StepOutcome};
use prodmodel_foundation::{Error, Result};

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::serialize::{RunRecord, save_to_file};
use crate::style::Styles;

const HELP: &str = "\
Commands:
  step              examine the rule under the cursor
  iterate           step until the current pass ends
  run               step until the run succeeds or fails
  memory            list working memory with each fact's origin
  rules             list rules (* fired, > under the cursor)
  pending           list rules still waiting to fire
  history           list recorded snapshots
  rewind N          restore the state after step N
  why [FACT]        explain blocked rules, or where FACT came from
  trace [on|off|json|human|clear|show [N]]
                    control and inspect the trace buffer
  save PATH         write a run record to PATH
  help              show this text
  quit              leave the REPL";

/// How many trace records `trace show` prints by default.
const DEFAULT_SHOW: usize = 20;

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    editor: E,
    solver: Solver,
    tracer: Tracer,
    styles: Styles,
    show_banner: bool,
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(solver: Solver) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, solver))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(mut editor: E, solver: Solver) -> Self {
        editor.set_keywords(solver.registry().vocabulary().to_vec());
        Self {
            editor,
            solver,
            tracer: Tracer::disabled(),
            styles: Styles::ansi(),
            show_banner: true,
            prompt: "prodmodel> ".to_string(),
        }
    }

    /// Replaces the tracer.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Replaces the colour scheme.
    #[must_use]
    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.styles = styles;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
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

    /// Runs the REPL loop until EOF or `quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => self.print_error(&e),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let input = match self.editor.read_line(&self.prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                println!();
                return Ok(true);
            }
            ReadResult::Eof => return Ok(false),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(true);
        }
        self.editor.add_history(trimmed);

        if matches!(trimmed, "quit" | "exit") {
            return Ok(false);
        }

        match self.eval(trimmed) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}");
                }
            }
            Err(e) => self.print_error(&e),
        }
        Ok(true)
    }

    /// Evaluates one command line and returns the text to print.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands, bad arguments, or failed
    /// rewinds, lookups and saves.
    pub fn eval(&mut self, line: &str) -> Result<String> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "step" => Ok(self.step()),
            "iterate" => Ok(self.iterate()),
            "run" => Ok(self.run_to_end()),
            "memory" => self.memory(),
            "rules" => Ok(self.rules()),
            "pending" => Ok(self.pending()),
            "history" => Ok(self.history()),
            "rewind" => self.rewind(rest),
            "why" => self.why(rest),
            "trace" => self.trace(rest),
            "save" => self.save(rest),
            "help" => Ok(HELP.to_string()),
            other => Err(Error::invalid_command(format!(
                "unknown command '{other}', type 'help' for a list"
            ))),
        }
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    fn step(&mut self) -> String {
        let outcome = self.solver.step();
        self.tracer.observe(&self.solver, &outcome);
        describe(&self.solver, &outcome, &self.styles)
    }

    fn iterate(&mut self) -> String {
        let pass = self.solver.iteration();
        let mut out = Vec::new();
        loop {
            let outcome = self.solver.step();
            self.tracer.observe(&self.solver, &outcome);
            out.push(describe(&self.solver, &outcome, &self.styles));
            if outcome.is_terminal() || self.solver.iteration() != pass {
                break;
            }
        }
        out.join("\n")
    }

    fn run_to_end(&mut self) -> String {
        let tracer = &mut self.tracer;
        let styles = &self.styles;
        let mut out = Vec::new();
        self.solver.run_observed(|solver, outcome| {
            tracer.observe(solver, outcome);
            out.push(describe(solver, outcome, styles));
        });
        out.join("\n")
    }

    fn rewind(&mut self, arg: &str) -> Result<String> {
        let step: u64 = arg
            .parse()
            .map_err(|_| Error::invalid_command(format!("usage: rewind N (got '{arg}')")))?;
        self.solver.rewind(step)?;
        self.tracer.rewound(&self.solver, step);
        Ok(format!(
            "rewound to step {step}, pass {}",
            self.solver.iteration()
        ))
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    fn memory(&self) -> Result<String> {
        let registry = self.solver.registry();
        let mut out = String::new();
        for (index, fact) in self.solver.memory().iter().enumerate() {
            let origin = match WhyQuery::fact(&self.solver, fact)? {
                FactOrigin::Input => "input".to_string(),
                FactOrigin::ConcludedBy(rule) => format!("rule {rule}"),
                FactOrigin::Pending(_) | FactOrigin::Unreachable => String::new(),
            };
            let _ = writeln!(
                out,
                "{:>3}. {} {}",
                index + 1,
                self.styles.paint(&self.styles.fact, registry.display_name(fact)),
                self.styles.paint(&self.styles.dim, &format!("({origin})"))
            );
        }
        if out.is_empty() {
            out.push_str("working memory is empty");
        }
        Ok(out.trim_end().to_string())
    }

    fn rules(&self) -> String {
        let registry = self.solver.registry();
        let current = self.solver.current();
        let mut out = String::new();
        for (index, rule) in self.solver.rules().iter().enumerate() {
            let id = RuleId::new(index);
            let text = format!("{id} {}", rule.display(registry));
            let line = if self.solver.has_fired(id) {
                format!("* {}", self.styles.paint(&self.styles.performed, &text))
            } else if current == Some(id) {
                format!("> {}", self.styles.paint(&self.styles.current, &text))
            } else {
                format!("  {text}")
            };
            out.push_str(&line);
            out.push('\n');
        }
        if out.is_empty() {
            out.push_str("no rules");
        }
        out.trim_end().to_string()
    }

    fn pending(&self) -> String {
        let registry = self.solver.registry();
        let lines: Vec<String> = self
            .solver
            .pending()
            .filter_map(|id| {
                self.solver
                    .rule(id)
                    .ok()
                    .map(|rule| format!("  {id} {}", rule.display(registry)))
            })
            .collect();
        if lines.is_empty() {
            "no pending rules".to_string()
        } else {
            lines.join("\n")
        }
    }

    fn history(&self) -> String {
        let registry = self.solver.registry();
        let lines: Vec<String> = self
            .solver
            .history()
            .iter()
            .map(|snapshot| {
                let verb = if snapshot.performing() { "fired" } else { "skipped" };
                let memory: Vec<&str> = snapshot
                    .memory()
                    .iter()
                    .map(|&f| registry.display_name(f))
                    .collect();
                format!(
                    "  step {:>3}  pass {:>2}  rule {} {verb}, memory [{}]",
                    snapshot.step(),
                    snapshot.iteration(),
                    snapshot.examined(),
                    memory.join(", ")
                )
            })
            .collect();
        if lines.is_empty() {
            "no snapshots recorded".to_string()
        } else {
            lines.join("\n")
        }
    }

    fn why(&self, arg: &str) -> Result<String> {
        if arg.is_empty() {
            let explanation = WhyQuery::blocked(&self.solver);
            return Ok(explanation.display(&self.solver).to_string());
        }

        let registry = self.solver.registry();
        // Declared names that no rule or input mentions are never interned.
        let origin = match registry.lookup(arg) {
            Some(fact) => WhyQuery::fact(&self.solver, fact)?,
            None if registry.contains_name(arg) => FactOrigin::Unreachable,
            None => return Err(Error::unknown_fact(arg)),
        };
        let text = match origin {
            FactOrigin::Input => format!("{arg} was given as an input"),
            FactOrigin::ConcludedBy(rule) => format!("{arg} was asserted by rule {rule}"),
            FactOrigin::Pending(rules) => {
                let rules: Vec<String> = rules.iter().map(ToString::to_string).collect();
                format!(
                    "{arg} is not yet known; pending rule {} would assert it",
                    rules.join(", ")
                )
            }
            FactOrigin::Unreachable => {
                format!("{arg} is not known and no pending rule concludes it")
            }
        };
        Ok(text)
    }

    fn trace(&mut self, arg: &str) -> Result<String> {
        let (sub, rest) = match arg.split_once(char::is_whitespace) {
            Some((sub, rest)) => (sub, rest.trim()),
            None => (arg, ""),
        };

        match sub {
            "" => {
                let stats = self.tracer.stats();
                let state = if self.tracer.is_enabled() { "on" } else { "off" };
                let format = if self.tracer.config().json_format {
                    "json"
                } else {
                    "human"
                };
                Ok(format!(
                    "tracing {state} ({format}), {} records over {} passes",
                    stats.record_count, stats.pass_count
                ))
            }
            "on" => {
                self.tracer.enable();
                Ok("tracing on".to_string())
            }
            "off" => {
                self.tracer.disable();
                Ok("tracing off".to_string())
            }
            "json" => {
                self.tracer.set_json_format(true);
                Ok("trace format: json".to_string())
            }
            "human" => {
                self.tracer.set_json_format(false);
                Ok("trace format: human".to_string())
            }
            "clear" => {
                self.tracer.clear();
                Ok("trace buffer cleared".to_string())
            }
            "show" => {
                let count = if rest.is_empty() {
                    DEFAULT_SHOW
                } else {
                    rest.parse().map_err(|_| {
                        Error::invalid_command(format!("usage: trace show [N] (got '{rest}')"))
                    })?
                };
                let records = self.tracer.buffer().recent(count);
                if records.is_empty() {
                    return Ok("trace buffer is empty".to_string());
                }
                Ok(self
                    .tracer
                    .format_records(&records, self.solver.registry()))
            }
            other => Err(Error::invalid_command(format!(
                "unknown trace option '{other}'"
            ))),
        }
    }

    fn save(&self, arg: &str) -> Result<String> {
        if arg.is_empty() {
            return Err(Error::invalid_command("usage: save PATH"));
        }
        save_to_file(&RunRecord::capture(&self.solver), arg)?;
        Ok(format!("run saved to {arg}"))
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    fn print_error(&self, error: &Error) {
        eprintln!(
            "{}",
            self.styles
                .paint(&self.styles.failure, &format!("Error: {error}"))
        );
    }

    fn print_banner(&self) {
        println!(
            "{}",
            self.styles.paint(
                &self.styles.heading,
                &format!("prodmodel REPL v{}", env!("CARGO_PKG_VERSION"))
            )
        );
        println!(
            "{} rules over {} facts. Type 'help' for commands, Ctrl+D to exit.\n",
            self.solver.rules().len(),
            self.solver.registry().vocabulary().len()
        );
        let _ = io::stdout().flush();
    }
}

/// Renders one step outcome for the REPL.
fn describe(solver: &Solver, outcome: &StepOutcome, styles: &Styles) -> String {
    match outcome {
        StepOutcome::Examined(step) => {
            let registry = solver.registry();
            let text = solver
                .rule(step.rule)
                .map(|rule| rule.display(registry).to_string())
                .unwrap_or_default();
            if step.performing {
                let mut out = format!(
                    "{} {} {text}",
                    styles.paint(&styles.performed, "fired"),
                    step.rule
                );
                for &fact in &step.asserted {
                    let _ = write!(
                        out,
                        "\n  + {}",
                        styles.paint(&styles.fact, registry.display_name(fact))
                    );
                }
                out
            } else {
                format!(
                    "{} {} {text}",
                    styles.paint(&styles.current, "skipped"),
                    step.rule
                )
            }
        }
        StepOutcome::Succeeded => styles.paint(&styles.success, "Solved."),
        StepOutcome::Failed(deadlock) => {
            styles.paint(&styles.failure, &format!("Failed: {deadlock}."))
        }
    }
}
