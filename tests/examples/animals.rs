//! Animal identification: the run identifies a cheetah, then deadlocks on
//! the rules for other animals.

use prodmodel_debug::{Blocker, FactOrigin, WhyQuery};
use prodmodel_engine::{RuleId, Termination};

use crate::{drive, load};

#[test]
fn animals_identifies_cheetah_then_deadlocks() {
    let (mut solver, echoes) = load("animals.rules");
    let Termination::Failed(deadlock) = solver.run_to_completion() else {
        panic!("expected a deadlock");
    };

    let unsatisfied: Vec<usize> = deadlock.unsatisfied.iter().map(|r| r.number()).collect();
    assert_eq!(unsatisfied, vec![2, 3, 4, 6, 8, 9, 10]);
    assert_eq!(deadlock.iteration, 2);

    let cheetah = solver.registry().lookup("cheetah").unwrap();
    assert!(solver.memory().contains(cheetah));
    assert_eq!(*echoes.borrow(), vec!["identified a cheetah"]);
}

#[test]
fn animals_origins() {
    let (mut solver, _) = load("animals.rules");
    solver.run_to_completion();
    let registry = solver.registry();

    let fact = |name: &str| registry.lookup(name).unwrap();
    assert_eq!(
        WhyQuery::fact(&solver, fact("eats meat")).unwrap(),
        FactOrigin::Input
    );
    assert_eq!(
        WhyQuery::fact(&solver, fact("carnivore")).unwrap(),
        FactOrigin::ConcludedBy(RuleId::new(4))
    );
    assert_eq!(
        WhyQuery::fact(&solver, fact("cheetah")).unwrap(),
        FactOrigin::ConcludedBy(RuleId::new(6))
    );
}

#[test]
fn animals_blocked_rules_are_unreachable() {
    let (mut solver, _) = load("animals.rules");
    solver.run_to_completion();

    let explanation = WhyQuery::blocked(&solver);
    let tiger = explanation.get(RuleId::new(7)).unwrap();
    assert!(tiger.is_unreachable());
    assert_eq!(tiger.missing.len(), 1);

    // Rule 9 waits on `bird`, which rules 3 and 4 could still conclude.
    let penguin = explanation.get(RuleId::new(8)).unwrap();
    assert_eq!(
        penguin.missing[0].blocker,
        Blocker::Awaiting(vec![RuleId::new(2), RuleId::new(3)])
    );
    assert_eq!(penguin.missing[1].blocker, Blocker::Unreachable);
}

#[test]
fn animals_driver_reports_failure() {
    let (solver, _) = load("animals.rules");
    let (_, out) = drive(solver);
    assert!(out.contains("* R7. If carnivore and tawny colour and dark spots, then cheetah.\n    + cheetah\n"));
    assert!(out.ends_with(
        "Failed: no progress possible; rules #2 #3 #4 #6 #8 #9 #10 can never be satisfied.\n"
    ));
}
