//! Evening-out planner: every rule fires in the first pass.

use prodmodel_engine::Termination;

use crate::{drive, load};

#[test]
fn concert_succeeds_in_one_pass() {
    let (mut solver, echoes) = load("concert.rules");
    assert_eq!(solver.run_to_completion(), Termination::Succeeded);
    assert_eq!(solver.iteration(), 1);
    assert_eq!(
        solver.memory().names(solver.registry()),
        vec![
            "go to concert",
            "invite friend",
            "buy tickets",
            "book table",
            "dinner before show"
        ]
    );
    assert_eq!(
        *echoes.borrow(),
        vec!["tickets bought", "tickets bought", "table booked"]
    );
}

#[test]
fn concert_labels_survive_loading() {
    let (solver, _) = load("concert.rules");
    let labels: Vec<Option<&str>> = solver.rules().iter().map(|r| r.label()).collect();
    assert_eq!(labels, vec![Some("invite"), None, Some("dinner")]);
}

#[test]
fn concert_driver_output() {
    let (solver, _) = load("concert.rules");
    let (_, out) = drive(solver);
    let expected = "\
Rules:
  R1. If go to concert, then invite friend.
  R2. If go to concert and invite friend, then buy tickets.
  R3. If buy tickets and invite friend, then book table and dinner before show.
Memory:
  go to concert
* R1. If go to concert, then invite friend.
    + invite friend
* R2. If go to concert and invite friend, then buy tickets.
    + buy tickets
* R3. If buy tickets and invite friend, then book table and dinner before show.
    + book table
    + dinner before show
Solved.
";
    assert_eq!(out, expected);
}
