//! Breakfast rules listed in reverse: one firing per pass.

use prodmodel_debug::{Tracer, TracerConfig};
use prodmodel_engine::StepOutcome;

use crate::load;

#[test]
fn breakfast_takes_four_passes() {
    let (mut solver, _) = load("breakfast.rules");
    assert!(solver.run_to_completion().is_success());
    assert_eq!(solver.iteration(), 4);
    assert_eq!(solver.steps_taken(), 10);
    assert_eq!(
        solver.memory().names(solver.registry()),
        vec![
            "hungry",
            "kettle on",
            "toast made",
            "water boiled",
            "tea brewed",
            "breakfast served"
        ]
    );
}

#[test]
fn breakfast_iterate_fires_one_rule_per_pass() {
    let (mut solver, _) = load("breakfast.rules");
    let mut per_pass = Vec::new();
    while !solver.is_terminal() {
        let fired = solver
            .iterate()
            .iter()
            .filter_map(StepOutcome::as_step)
            .filter(|step| step.performing)
            .count();
        per_pass.push(fired);
    }
    assert_eq!(per_pass, vec![1, 1, 1, 1, 0]);
}

#[test]
fn breakfast_trace_has_a_pass_per_firing() {
    let (mut solver, _) = load("breakfast.rules");
    let mut tracer = Tracer::new(TracerConfig::new().enabled());
    tracer.begin(&solver);
    solver.run_observed(|solver, outcome| tracer.observe(solver, outcome));

    let stats = tracer.stats();
    assert_eq!(stats.count("rule-fired"), 4);
    assert_eq!(stats.count("rule-examined"), 10);
    assert_eq!(stats.count("pass-end"), 4);
    assert_eq!(stats.count("run-succeeded"), 1);
}
