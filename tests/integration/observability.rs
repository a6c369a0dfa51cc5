//! Tracing and explanation over a loaded rulebase

use prodmodel_debug::{ObservabilityConfig, TraceEvent, Tracer, WhyQuery};
use prodmodel_engine::{RuleId, SnapshotPolicy};
use prodmodel_runtime::Rulebase;

const PLAN: &str = "\
facts: A, B, C, D, X
input: A
rule first: A -> B
rule second: B & X -> C
rule third: C -> D
";

#[test]
fn debug_preset_snapshots_every_step() {
    let config = ObservabilityConfig::debug();
    let mut solver = Rulebase::parse(PLAN)
        .unwrap()
        .build(config.solver_config())
        .unwrap();
    assert_eq!(solver.config().snapshots, SnapshotPolicy::EveryStep);

    solver.run_to_completion();
    assert_eq!(solver.history().len() as u64, solver.steps_taken());
}

#[test]
fn trace_records_the_deadlock() {
    let config = ObservabilityConfig::enabled().with_trace_to_stderr(false);
    let mut solver = Rulebase::parse(PLAN)
        .unwrap()
        .build(config.solver_config())
        .unwrap();
    let mut tracer = Tracer::new(config.tracer_config());
    tracer.begin(&solver);
    solver.run_observed(|solver, outcome| tracer.observe(solver, outcome));

    let failed = tracer.buffer().by_event_type("run-failed");
    assert_eq!(failed.len(), 1);
    assert_eq!(
        failed[0].event,
        TraceEvent::RunFailed {
            unsatisfied: vec![RuleId::new(1), RuleId::new(2)]
        }
    );

    let human = tracer.format_records(&failed, solver.registry());
    assert!(human.contains("RUN FAILED"));
}

#[test]
fn json_trace_lines_are_objects() {
    let config = ObservabilityConfig::enabled()
        .with_trace_to_stderr(false)
        .with_json_output(true);
    let mut solver = Rulebase::parse(PLAN)
        .unwrap()
        .build(config.solver_config())
        .unwrap();
    let mut tracer = Tracer::new(config.tracer_config());
    solver.run_observed(|solver, outcome| tracer.observe(solver, outcome));

    for record in tracer.buffer().iter() {
        let line = tracer.format_record(record, solver.registry());
        assert!(line.starts_with('{') && line.ends_with('}'), "{line}");
    }
}

#[test]
fn explanation_follows_the_chain() {
    let mut solver = Rulebase::parse(PLAN)
        .unwrap()
        .build(ObservabilityConfig::default().solver_config())
        .unwrap();
    solver.run_to_completion();

    let explanation = WhyQuery::blocked(&solver);
    let text = explanation.display(&solver).to_string();
    assert_eq!(
        text,
        "rule #2 (second) is waiting on:\n  - X: no pending rule concludes it\n\
         rule #3 (third) is waiting on:\n  - C: awaiting rule #2"
    );
}
