//! prodmodel CLI entry point.

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use prodmodel_debug::{ObservabilityConfig, Tracer};
use prodmodel_runtime::{
    Driver, DriverConfig, Numbering, Repl, Rulebase, RunRecord, Styles, load_from_file,
    save_to_file,
};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    file: Option<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    speed: Option<Duration>,
    no_rule_numbers: bool,
    fact_numbers: bool,
    no_color: bool,
    // Debug flags
    trace: bool,
    json: bool,
    history: Option<usize>,
    save_run: Option<PathBuf>,
    show_run: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--no-rule-numbers" => config.no_rule_numbers = true,
            "--fact-numbers" => config.fact_numbers = true,
            "--no-color" => config.no_color = true,
            "--trace" => config.trace = true,
            "--json" => config.json = true,
            "--speed" => {
                i += 1;
                let raw = value(&args, i, "--speed")?;
                let secs: f64 = raw
                    .parse()
                    .map_err(|_| format!("invalid --speed value: {raw}"))?;
                config.speed = Some(
                    Duration::try_from_secs_f64(secs)
                        .map_err(|_| format!("invalid --speed value: {raw}"))?,
                );
            }
            "--history" => {
                i += 1;
                let raw = value(&args, i, "--history")?;
                config.history = Some(
                    raw.parse()
                        .map_err(|_| format!("invalid --history value: {raw}"))?,
                );
            }
            "--save-run" => {
                i += 1;
                config.save_run = Some(PathBuf::from(value(&args, i, "--save-run")?));
            }
            "--show-run" => {
                i += 1;
                config.show_run = Some(PathBuf::from(value(&args, i, "--show-run")?));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => {
                if config.file.is_some() {
                    return Err(format!("unexpected extra argument: {path}").into());
                }
                config.file = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if config.show_version {
        println!("prodmodel {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(path) = &config.show_run {
        print!("{}", load_from_file(path)?);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(file) = &config.file else {
        print_help();
        return Err("no rulebase file given".into());
    };

    let mut observability = ObservabilityConfig::default()
        .with_enabled(config.trace)
        .with_json_output(config.json);
    if let Some(size) = config.history {
        observability = observability.with_history_size(size);
    }

    let solver = Rulebase::load(file)?.build(observability.solver_config())?;
    let tracer = Tracer::new(observability.tracer_config());

    if config.batch_mode {
        let mut driver_config = DriverConfig::new()
            .with_numbering(Numbering {
                rules: !config.no_rule_numbers,
                facts: config.fact_numbers,
            })
            .with_color(!config.no_color);
        if let Some(speed) = config.speed {
            driver_config = driver_config.with_speed(speed);
        }

        let mut driver = Driver::new(solver, driver_config, io::stdout()).with_tracer(tracer);
        driver.render_initial()?;
        let termination = driver.solve()?;

        if let Some(path) = &config.save_run {
            save_to_file(&RunRecord::capture(driver.solver()), path)?;
        }

        return Ok(match termination {
            Some(t) if t.is_success() => ExitCode::SUCCESS,
            _ => ExitCode::from(2),
        });
    }

    let styles = if config.no_color {
        Styles::plain()
    } else {
        Styles::ansi()
    };
    let mut repl = Repl::new(solver)?.with_tracer(tracer).with_styles(styles);
    repl.run()?;

    if let Some(path) = &config.save_run {
        save_to_file(&RunRecord::capture(repl.solver()), path)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn print_help() {
    println!(
        "\x1b[1mprodmodel\x1b[0m - Forward-chaining production system

\x1b[1mUSAGE:\x1b[0m
    prodmodel [OPTIONS] FILE
    prodmodel --show-run PATH

\x1b[1mARGUMENTS:\x1b[0m
    FILE    Rulebase to load

\x1b[1mOPTIONS:\x1b[0m
    -h, --help           Print help information
    -V, --version        Print version information
    -b, --batch          Run to completion with paced output (no REPL)
    --speed SECS         Pause between steps in batch mode (default 1)
    --no-rule-numbers    List rules without R1., R2., ...
    --fact-numbers       Number facts in working memory
    --no-color           Disable ANSI colours

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --trace              Trace solver activity to stderr
    --json               Trace as JSON lines
    --history N          Snapshots kept for rewinding (default 256)
    --save-run PATH      Write a run record when done
    --show-run PATH      Print a saved run record and exit

\x1b[1mEXAMPLES:\x1b[0m
    prodmodel concert.rules                 Step through interactively
    prodmodel -b --speed 0 concert.rules    Solve at full speed
    prodmodel -b --trace --json plan.rules  Solve with a JSON trace

\x1b[1mREPL COMMANDS:\x1b[0m
    step, iterate, run      Advance by one rule, one pass, or to the end
    memory, rules, pending  Inspect the current state
    history, rewind N       List snapshots and go back to one
    why [FACT]              Explain blocked rules or a fact's origin
    trace [on|off|show N]   Control the trace buffer
    save PATH               Write a run record
    Ctrl+D                  Exit REPL"
    );
}
