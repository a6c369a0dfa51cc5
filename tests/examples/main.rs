//! Rulebase example tests
//!
//! Loads the rulebases shipped in `rulebases/` and runs them through the
//! solver and the terminal driver.

mod animals;
mod breakfast;
mod concert;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use prodmodel_engine::{Solver, SolverConfig};
use prodmodel_runtime::{Driver, DriverConfig, Rulebase};

/// Path of a shipped rulebase.
fn rulebase_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("rulebases")
        .join(name)
}

/// Loads a shipped rulebase, capturing echo output instead of printing it.
fn load(name: &str) -> (Solver, Rc<RefCell<Vec<String>>>) {
    let echoes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&echoes);
    let solver = Rulebase::load(rulebase_path(name))
        .unwrap()
        .build_with(SolverConfig::default(), move |message: &str| {
            sink.borrow_mut().push(message.to_string());
        })
        .unwrap();
    (solver, echoes)
}

/// Runs a solver through an unpaced, uncoloured driver and returns its output.
fn drive(solver: Solver) -> (Solver, String) {
    let config = DriverConfig::new()
        .with_speed(Duration::ZERO)
        .with_color(false);
    let mut driver = Driver::new(solver, config, Vec::new());
    driver.render_initial().unwrap();
    driver.solve().unwrap();
    let (solver, out) = driver.into_parts();
    (solver, String::from_utf8(out).unwrap())
}
