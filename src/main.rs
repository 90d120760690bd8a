//! # freq-sat
//!
//! A command-line front end for the frequency-driven backtracking 3-SAT solver.
//!
//! ## Usage
//!
//! ```sh
//! freq-sat [GLOBAL_OPTIONS] [SUBCOMMAND]
//! ```
//!
//! - `freq-sat <path>`: solve a DIMACS `.cnf` file, or every `.cnf` file below
//!   a directory.
//! - `freq-sat file --path <file>`: solve a DIMACS file.
//! - `freq-sat text --input "1 -2 0\n2 3 0" [--variables 1,2,3]`: solve an
//!   inline formula, optionally against an explicit candidate variable set.
//! - `freq-sat random -m <clauses> -n <variables> [--seed S] [--export-dimacs F]`:
//!   generate and solve one random 3-SAT instance.
//! - `freq-sat sweep -m A:B[:S] -n A:B[:S] [--repeats R] [--output results.csv]`:
//!   record the step count of random instances over a grid of sizes.
//! - `freq-sat completions <shell>`: print a shell completion script.
//!
//! Common options: `--debug`, `--verify`, `--stats`, `--print-solution`,
//! `--reduction faithful|strike`, `--selection max-frequency|first-literal`,
//! `--step-limit N`, `--timeout-ms N`. Log verbosity grows with `-v`.

use crate::command_line::cli::{
    Cli, Commands, log_filter, run_sweep, solve_dir, solve_file, solve_random, solve_text,
};
use clap::{CommandFactory, Parser};
use freq_sat::experiment::sweep::Sweep;
use tracing_subscriber::EnvFilter;

mod command_line;

/// Global allocator using `tikv-jemallocator` for memory usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_filter(&cli)))
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = cli.path.as_deref() {
        if cli.command.is_none() {
            return if path.is_dir() {
                solve_dir(path, &cli.common)
            } else {
                solve_file(path, &cli.common)
            };
        }
    }

    match cli.command {
        Some(Commands::File { path, common }) => solve_file(&path, &common),
        Some(Commands::Text {
            input,
            variables,
            common,
        }) => solve_text(&input, variables, &common),
        Some(Commands::Random {
            clauses,
            variables,
            seed,
            export_dimacs,
            common,
        }) => solve_random(clauses, variables, seed, export_dimacs.as_deref(), &common),
        Some(Commands::Sweep {
            clauses,
            variables,
            repeats,
            seed,
            output,
            common,
        }) => {
            let sweep = Sweep {
                clauses,
                variables,
                repeats,
                seed,
                solver: common.solver_config(),
            };
            run_sweep(&sweep, output.as_deref(), &common)
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        None => {
            eprintln!("No command provided. Use --help for more information.");
            std::process::exit(2);
        }
    }
}
