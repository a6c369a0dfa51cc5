//! Scripted REPL sessions over a rulebase

use prodmodel_engine::SolverConfig;
use prodmodel_foundation::Result;
use prodmodel_runtime::{LineEditor, ReadResult, Repl, Rulebase, Styles};

/// Feeds a fixed script to the REPL.
struct Script {
    lines: std::vec::IntoIter<String>,
}

impl Script {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}

impl LineEditor for Script {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self.lines.next().map_or(ReadResult::Eof, ReadResult::Line))
    }

    fn add_history(&mut self, _line: &str) {}

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

const EVENING: &str = "\
facts: go to concert, invite friend, buy tickets, taxi
input: go to concert
rule invite: go to concert -> invite friend
rule: invite friend -> buy tickets
rule: taxi -> go to concert
";

fn repl(script: &[&str]) -> Repl<Script> {
    let solver = Rulebase::parse(EVENING)
        .unwrap()
        .build(SolverConfig::default())
        .unwrap();
    Repl::with_editor(Script::new(script), solver)
        .with_styles(Styles::plain())
        .without_banner()
}

#[test]
fn stepping_session() {
    let mut repl = repl(&[]);
    assert_eq!(
        repl.eval("step").unwrap(),
        "fired #1 If go to concert, then invite friend.\n  + invite friend"
    );
    assert_eq!(
        repl.eval("why buy tickets").unwrap(),
        "buy tickets is not yet known; pending rule #2 would assert it"
    );
    repl.eval("run").unwrap();
    assert_eq!(
        repl.eval("why buy tickets").unwrap(),
        "buy tickets was asserted by rule #2"
    );
    assert_eq!(repl.eval("pending").unwrap(), "  #3 If taxi, then go to concert.");
}

#[test]
fn rewind_and_continue() {
    let mut repl = repl(&[]);
    repl.eval("run").unwrap();
    assert!(repl.solver().is_terminal());

    repl.eval("rewind 1").unwrap();
    assert!(!repl.solver().is_terminal());
    assert_eq!(repl.solver().memory().len(), 2);

    let out = repl.eval("run").unwrap();
    assert!(out.starts_with("fired #2"));
    assert!(out.ends_with("can never be satisfied."));
}

#[test]
fn scripted_loop_runs_to_quit() {
    let mut repl = repl(&["trace on", "iterate", "nonsense", "memory", "quit", "run"]);
    repl.run().unwrap();

    assert_eq!(repl.solver().iteration(), 1);
    assert!(!repl.solver().is_terminal());
    assert!(repl.tracer().stats().count("rule-fired") >= 2);
}
