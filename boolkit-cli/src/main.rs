use std::env;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Error};
use clap::{values_t, App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info, Level, LevelFilter, Record};

use boolkit::lit::{Lit, Var};
use boolkit::solver::{SolveBudget, SolveResult, Solver};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(env_var) = env::var("BOOLKIT_LOG") {
        builder.parse_filters(&env_var);
    }

    builder.init();
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("boolkit")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input DIMACS CNF file to use (stdin if omitted)'")
        .arg(
            Arg::from_usage("--assume=[LIT] 'Solve under this assumption literal (repeatable)'")
                .multiple(true)
                .number_of_values(1),
        )
        .arg_from_usage("--conflict-limit=[N] 'Give up and print UNKNOWN after N conflicts'")
        .get_matches();

    init_logging();
    info!("This is boolkit {}", env!("CARGO_PKG_VERSION"));

    let mut solver = Solver::new();

    let stdin = io::stdin();
    match matches.value_of("INPUT") {
        Some(path) => {
            info!("reading file '{}'", path);
            let file = fs::File::open(path).with_context(|| format!("failed to open '{}'", path))?;
            solver.add_dimacs_cnf(io::BufReader::new(file))?;
        }
        None => {
            info!("reading from stdin");
            solver.add_dimacs_cnf(stdin.lock())?;
        }
    }

    let assumptions: Vec<Lit> = values_t!(matches, "assume", isize)
        .unwrap_or_default()
        .into_iter()
        .map(Lit::from_dimacs)
        .collect();

    let mut budget = SolveBudget::unbounded();
    if let Some(limit) = matches.value_of("conflict-limit") {
        let limit: u64 = limit.parse().context("--conflict-limit must be a non-negative integer")?;
        budget = budget.with_conflict_limit(limit);
    }

    let start = Instant::now();
    let result = solver.solve_with_budget(&assumptions, &mut budget);
    info!("solve took {:?}", start.elapsed());

    match result {
        SolveResult::Sat => {
            println!("s SATISFIABLE");
            print!("v");
            let model = solver.get_model().expect("sat result without a model");
            for (index, value) in model.assignment().iter().copied().enumerate() {
                if let Some(value) = value {
                    print!(" {}", Lit::from_var(Var::from_index(index), !value));
                }
            }
            println!(" 0");
            Ok(10)
        }
        SolveResult::Unsat => {
            println!("s UNSATISFIABLE");
            if let Some(core) = solver.get_core() {
                print!("c core");
                for lit in core {
                    print!(" {}", lit);
                }
                println!();
            }
            Ok(20)
        }
        SolveResult::Undef => {
            println!("s UNKNOWN");
            Ok(0)
        }
    }
}
