#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use freq_sat::experiment::generator::Generator;
use freq_sat::experiment::report::{Summary, write_csv_header, write_csv_row};
use freq_sat::experiment::sweep::{StepRange, Sweep};
use freq_sat::sat::backtrack::Backtracker;
use freq_sat::sat::cnf::Cnf;
use freq_sat::sat::dimacs::{parse_file, parse_text, to_dimacs};
use freq_sat::sat::literal::Variable;
use freq_sat::sat::solver::{CallCounter, Reduction, Solution, SolverConfig};
use freq_sat::sat::variable_selection::SelectionType;
use itertools::Itertools;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tikv_jemalloc_ctl::{epoch, stats};
use tracing::{info, warn};

/// Defines the command-line interface for the solver application.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "freq-sat",
    version,
    about = "A frequency-driven backtracking 3-SAT solver"
)]
pub(crate) struct Cli {
    /// An optional global path argument. Without a subcommand it is solved as a
    /// DIMACS .cnf file, or walked for .cnf files if it is a directory.
    #[arg(global = true)]
    pub path: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Specifies the subcommand to execute.
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// Clauses as text (e.g. "1 -2 0\n2 3 0"): space-separated literals,
        /// each clause terminated by 0.
        #[arg(short, long)]
        input: String,

        /// Candidate variables. Defaults to every variable of the formula.
        #[arg(long, value_delimiter = ',')]
        variables: Option<Vec<Variable>>,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate one random 3-SAT instance and solve it.
    Random {
        /// Number of clauses (m).
        #[arg(short = 'm', long)]
        clauses: usize,

        /// Number of variables (n), at least 3.
        #[arg(short = 'n', long)]
        variables: usize,

        /// Seed of the instance generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Also write the generated instance to this DIMACS file.
        #[arg(long)]
        export_dimacs: Option<PathBuf>,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve random instances over a grid of clause and variable counts and
    /// record the step counts.
    Sweep {
        /// Clause counts, as start:end[:step].
        #[arg(short = 'm', long)]
        clauses: StepRange,

        /// Variable counts, as start:end[:step].
        #[arg(short = 'n', long)]
        variables: StepRange,

        /// Instances per (clauses, variables) point.
        #[arg(short, long, default_value_t = 1)]
        repeats: usize,

        /// Seed of the instance generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// CSV file to write the records to. Defaults to standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// The solver options given after the subcommand, if it takes any.
    pub(crate) const fn common(&self) -> Option<&CommonOptions> {
        match self {
            Self::File { common, .. }
            | Self::Text { common, .. }
            | Self::Random { common, .. }
            | Self::Sweep { common, .. } => Some(common),
            Self::Completions { .. } => None,
        }
    }
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug output: print the formula and the raw solution, and log at
    /// `debug` level (per-branch events need `-vvv`).
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check the decisions of a satisfiable result against the formula.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print performance and problem statistics after solving.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the decisions of the accepting path if the formula is satisfiable.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// How a branch simplifies the formula.
    #[arg(long, default_value_t = Reduction::Faithful)]
    pub(crate) reduction: Reduction,

    /// How the branching literal is chosen.
    #[arg(long, default_value_t = SelectionType::MaxFrequency)]
    pub(crate) selection: SelectionType,

    /// Abort a search after this many branching steps.
    #[arg(long)]
    pub(crate) step_limit: Option<u64>,

    /// Abort a search after this many milliseconds.
    #[arg(long)]
    pub(crate) timeout_ms: Option<u64>,
}

impl CommonOptions {
    pub(crate) fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            reduction: self.reduction,
            selection: self.selection,
            step_limit: self.step_limit,
            deadline: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Whether `--debug` was given before or after the subcommand.
pub(crate) fn debug_requested(cli: &Cli) -> bool {
    cli.common.debug || cli.command.as_ref().and_then(Commands::common).is_some_and(|c| c.debug)
}

/// The `tracing` filter for the verbosity count and `--debug`.
pub(crate) fn log_filter(cli: &Cli) -> &'static str {
    match cli.verbose {
        0 if debug_requested(cli) => "debug",
        0 => "warn",
        1 if debug_requested(cli) => "debug",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Solves every `.cnf` file below `path`.
///
/// # Errors
///
/// If the path is not a directory, or a file cannot be parsed or solved.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> anyhow::Result<()> {
    if !path.is_dir() {
        bail!("Provided path is not a directory: {}", path.display());
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            warn!("Skipping non-CNF file: {}", file_path.display());
            continue;
        }
        solve_file(file_path, common)?;
    }

    Ok(())
}

/// Parses and solves one DIMACS file.
///
/// # Errors
///
/// If the file cannot be parsed, or the search aborts.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> anyhow::Result<()> {
    let time = std::time::Instant::now();
    let cnf = parse_file(path).with_context(|| format!("Failed to parse file: {}", path.display()))?;
    let elapsed = time.elapsed();

    let variables = cnf.variables();
    solve_and_report(&cnf, &variables, common, Some(path), elapsed)
}

/// Parses and solves an inline formula.
///
/// # Errors
///
/// If the text cannot be parsed, or the search fails.
pub(crate) fn solve_text(
    input: &str,
    variables: Option<Vec<Variable>>,
    common: &CommonOptions,
) -> anyhow::Result<()> {
    let time = std::time::Instant::now();
    let cnf = parse_text(input).context("Failed to parse text input")?;
    let elapsed = time.elapsed();

    let variables = variables.unwrap_or_else(|| cnf.variables());
    solve_and_report(&cnf, &variables, common, None, elapsed)
}

/// Generates one random instance, optionally exports it, then solves it.
///
/// # Errors
///
/// If generation or export fails, or the search aborts.
pub(crate) fn solve_random(
    clauses: usize,
    variables: usize,
    seed: u64,
    export_dimacs: Option<&Path>,
    common: &CommonOptions,
) -> anyhow::Result<()> {
    let time = std::time::Instant::now();
    let cnf = Generator::new(seed).formula(clauses, variables)?;
    let elapsed = time.elapsed();

    if let Some(path) = export_dimacs {
        let comment = format!("random 3-SAT, m={clauses} n={variables} seed={seed}");
        std::fs::write(path, to_dimacs(&cnf, &[&comment]))
            .with_context(|| format!("Unable to write file {}", path.display()))?;
        println!("DIMACS written to: {}", path.display());
    }

    let candidates: Vec<Variable> = (1..=Variable::try_from(variables)?).collect();
    solve_and_report(&cnf, &candidates, common, None, elapsed)
}

/// Runs a sweep, streaming CSV rows and printing the summary table.
///
/// # Errors
///
/// If the output cannot be written.
pub(crate) fn run_sweep(sweep: &Sweep, output: Option<&Path>, common: &CommonOptions) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Unable to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    info!(
        clauses = %sweep.clauses,
        variables = %sweep.variables,
        repeats = sweep.repeats,
        seed = sweep.seed,
        "starting sweep"
    );

    let mut summary = Summary::default();
    write_csv_header(&mut writer)?;
    let recorded = sweep.run(|record| {
        summary.add(record);
        write_csv_row(&mut writer, record)
    })?;
    writer.flush()?;
    drop(writer);

    if let Some(path) = output {
        println!("{recorded} records written to: {}", path.display());
    }
    if common.stats {
        eprint!("{}", summary.table());
    }
    Ok(())
}

/// Solves `cnf` and prints the verdict, statistics and verification result.
///
/// # Errors
///
/// If the search aborts or the input is invalid.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    variables: &[Variable],
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> anyhow::Result<()> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }

    if common.debug {
        println!("CNF: {cnf}");
        println!("Variables: {}", cnf.num_vars);
        println!("Clauses: {}", cnf.len());
        println!("Literals: {}", cnf.num_literals());
    }

    let (solution, elapsed, counter) = solve(cnf, variables, common)?;

    if common.verify {
        verify_solution(cnf, &solution);
    }

    if common.stats {
        print_stats(parse_time, elapsed, cnf, variables, &solution, &counter);
    }

    if common.print_solution && solution.satisfiable {
        println!("Decisions: {}", solution.decisions.iter().join(" "));
    }

    if solution.satisfiable {
        println!("\nSATISFIABLE");
    } else {
        println!("\nUNSATISFIABLE");
    }
    Ok(())
}

/// Runs the search with the configured options.
///
/// # Errors
///
/// As `Backtracker::solve`.
pub(crate) fn solve(
    cnf: &Cnf,
    variables: &[Variable],
    common: &CommonOptions,
) -> anyhow::Result<(Solution, Duration, CallCounter)> {
    // Advance the jemalloc epoch so memory stats reflect the search only.
    let _ = epoch::advance();

    let time = std::time::Instant::now();
    let mut counter = CallCounter::default();
    let solution = Backtracker::new(common.solver_config()).solve_observed(cnf, variables, &mut counter)?;
    let elapsed = time.elapsed();

    if common.debug {
        println!("Solution: {solution:?}");
        println!("Time: {elapsed:?}");
    }

    Ok((solution, elapsed, counter))
}

/// Checks the decisions of a satisfiable result against the formula.
///
/// Under the faithful reduction a "satisfiable" verdict may rest on
/// contradicting decisions; that is reported, not treated as a crash.
pub(crate) fn verify_solution(cnf: &Cnf, solution: &Solution) {
    if !solution.satisfiable {
        println!("UNSAT");
        return;
    }
    match solution.assignment(cnf.num_vars) {
        Some(assignment) => {
            let ok = cnf.verify(&assignment);
            println!("Verified: {ok:?}");
            if !ok {
                warn!("decisions leave some clause unsatisfied");
            }
        }
        None => {
            println!("Verified: false");
            warn!("decisions assign both polarities of a variable");
        }
    }
}

/// Reads allocated and resident memory in MiB from jemalloc.
fn memory_usage() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = stats::allocated::mib().ok()?.read().ok()?;
    let resident = stats::resident::mib().ok()?.read().ok()?;
    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Helper function to print a single statistic line in a formatted table row.
fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
fn stat_line_with_rate(label: &str, value: u64, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &Cnf,
    variables: &[Variable],
    solution: &Solution,
    counter: &CallCounter,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Candidate variables", variables.len());
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.num_literals());

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Steps", solution.steps, elapsed_secs);
    stat_line("True-side descents", counter.true_descents);
    stat_line("False-side descents", counter.false_descents);
    stat_line("Max depth", counter.max_depth);
    stat_line("Decisions on path", solution.decisions.len());
    if let Some((allocated, resident)) = memory_usage() {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}
