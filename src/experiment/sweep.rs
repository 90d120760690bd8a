//! Sweeping the solver over clause and variable counts.

use crate::experiment::generator::{CLAUSE_WIDTH, Generator};
use crate::sat::backtrack::Backtracker;
use crate::sat::cnf::Cnf;
use crate::sat::error::{Error, Result};
use crate::sat::literal::Variable;
use crate::sat::solver::SolverConfig;
use itertools::iproduct;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// An inclusive range with a stride, written `start:end[:step]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange {
    /// First value.
    pub start: usize,
    /// Last value, included if the stride lands on it.
    pub end: usize,
    /// Stride, at least 1.
    pub step: usize,
}

impl StepRange {
    /// Checks and builds the range.
    ///
    /// # Errors
    ///
    /// `InvalidRange` when `start > end` or `step == 0`.
    pub fn new(start: usize, end: usize, step: usize) -> Result<Self> {
        if start > end || step == 0 {
            return Err(Error::InvalidRange(format!("{start}:{end}:{step}")));
        }
        Ok(Self { start, end, step })
    }

    /// The values of the range, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> + Clone {
        (self.start..=self.end).step_by(self.step)
    }
}

impl FromStr for StepRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRange(s.to_string());
        let parts = s
            .split(':')
            .map(|p| p.trim().parse::<usize>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        match parts.as_slice() {
            [single] => Self::new(*single, *single, 1),
            [start, end] => Self::new(*start, *end, 1),
            [start, end, step] => Self::new(*start, *end, *step),
            _ => Err(invalid()),
        }
    }
}

impl Display for StepRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.start, self.end, self.step)
    }
}

/// How the search on one instance ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The solver answered satisfiable.
    Satisfiable,
    /// The solver answered unsatisfiable.
    Unsatisfiable,
    /// The step limit or deadline stopped the search.
    Unknown,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "sat"),
            Self::Unsatisfiable => write!(f, "unsat"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One solved instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Clause count `m`.
    pub clauses: usize,
    /// Variable count `n`.
    pub variables: usize,
    /// `clauses + variables`, the problem size steps are plotted against.
    pub size: usize,
    /// Branching steps; the steps reached when a budget stopped the search.
    pub steps: u64,
    /// The verdict.
    pub outcome: Outcome,
    /// Wall-clock time of the solve.
    pub elapsed: Duration,
}

/// A grid of random-instance measurements.
#[derive(Debug, Clone)]
pub struct Sweep {
    /// Clause counts, the outer loop.
    pub clauses: StepRange,
    /// Variable counts, the inner loop.
    pub variables: StepRange,
    /// Instances generated per `(clauses, variables)` point.
    pub repeats: usize,
    /// Seed of the one generator shared by the whole sweep.
    pub seed: u64,
    /// Solver settings applied to every instance.
    pub solver: SolverConfig,
}

impl Sweep {
    /// Every `(clauses, variables)` point, clauses varying slowest.
    pub fn points(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(self.clauses.iter(), self.variables.iter())
    }

    /// Runs the sweep, handing each record to `sink` as soon as it is measured.
    ///
    /// Points with fewer than three variables are skipped. All instances come
    /// from one generator seeded with `seed`, so a sweep is reproducible.
    ///
    /// # Errors
    ///
    /// Whatever `sink` returns; budget errors from the solver are recorded as
    /// [`Outcome::Unknown`] instead.
    pub fn run<F>(&self, mut sink: F) -> Result<usize>
    where
        F: FnMut(&Record) -> Result<()>,
    {
        let solver = Backtracker::new(self.solver);
        let mut generator = Generator::new(self.seed);
        let mut recorded = 0;

        for (m, n) in self.points() {
            let Ok(top) = Variable::try_from(n) else {
                return Err(Error::InvalidRange(self.variables.to_string()));
            };
            if n < CLAUSE_WIDTH {
                warn!(clauses = m, variables = n, "skipping point with fewer than 3 variables");
                continue;
            }
            let variables: Vec<Variable> = (1..=top).collect();

            for _ in 0..self.repeats {
                let cnf = generator.formula(m, n)?;
                let record = Self::measure(&solver, &cnf, &variables)?;
                sink(&record)?;
                recorded += 1;
            }

            info!(clauses = m, variables = n, repeats = self.repeats, "point measured");
        }

        Ok(recorded)
    }

    /// Collects the whole sweep in memory.
    ///
    /// # Errors
    ///
    /// As [`Self::run`].
    pub fn collect(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        self.run(|record| {
            records.push(record.clone());
            Ok(())
        })?;
        Ok(records)
    }

    fn measure(solver: &Backtracker, cnf: &Cnf, variables: &[Variable]) -> Result<Record> {
        let started = Instant::now();
        let (steps, outcome) = match solver.solve(cnf, variables) {
            Ok(solution) if solution.satisfiable => (solution.steps, Outcome::Satisfiable),
            Ok(solution) => (solution.steps, Outcome::Unsatisfiable),
            Err(Error::StepLimitExceeded { limit }) => (limit, Outcome::Unknown),
            Err(Error::Timeout { steps }) => (steps, Outcome::Unknown),
            Err(e) => return Err(e),
        };
        Ok(Record {
            clauses: cnf.len(),
            variables: variables.len(),
            size: cnf.len() + variables.len(),
            steps,
            outcome,
            elapsed: started.elapsed(),
        })
    }
}
