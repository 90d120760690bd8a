//! Configuration, results and instrumentation for the backtracking search.

use crate::sat::assignment::Assignment;
use crate::sat::literal::Literal;
use crate::sat::variable_selection::SelectionType;
use clap::ValueEnum;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// How a branch simplifies the formula once it assumes a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, ValueEnum)]
pub enum Reduction {
    /// Drop satisfied clauses only. Surviving clauses keep the falsified
    /// literal, so a variable may be branched on again further down.
    #[default]
    Faithful,
    /// Drop satisfied clauses and strike the falsified literal from the rest.
    /// A formula holding an empty clause is then unsatisfiable.
    Strike,
}

impl Display for Reduction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Faithful => write!(f, "faithful"),
            Self::Strike => write!(f, "strike"),
        }
    }
}

/// Settings of a [`Backtracker`](crate::sat::backtrack::Backtracker).
///
/// The default is the faithful reduction with the max-frequency selector and
/// no budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverConfig {
    /// How a branch simplifies the formula.
    pub reduction: Reduction,
    /// How the branching literal is chosen.
    pub selection: SelectionType,
    /// Abort once this many branching steps have been taken.
    pub step_limit: Option<u64>,
    /// Abort once this much wall-clock time has passed.
    pub deadline: Option<Duration>,
}

/// Outcome of a completed search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solution {
    /// The verdict.
    pub satisfiable: bool,
    /// Branching steps taken; base cases are not counted.
    pub steps: u64,
    /// Literals assumed true along the accepting path, outermost first.
    /// Empty when the formula is unsatisfiable.
    pub decisions: Vec<Literal>,
}

impl Solution {
    /// The assignment described by `decisions`.
    ///
    /// `None` when the formula is unsatisfiable, or when the path assumed both
    /// polarities of a variable, which the faithful reduction allows.
    #[must_use]
    pub fn assignment(&self, num_vars: usize) -> Option<Assignment> {
        if !self.satisfiable {
            return None;
        }
        Assignment::from_decisions(num_vars, &self.decisions)
    }
}

/// Which reduction of a branch is being explored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The branch literal assumed true.
    True,
    /// The branch literal assumed false.
    False,
}

/// Hook into the search, for statistics and tests. All methods default to no-ops.
pub trait Observer {
    /// A branching step on `literal` at `depth` (the root is depth 0).
    fn on_branch(&mut self, _literal: Literal, _depth: usize) {}

    /// The search descends into the `side` reduction of the branch on `literal`.
    fn on_descend(&mut self, _side: Side, _literal: Literal, _depth: usize) {}
}

/// The observer used by [`Backtracker::solve`](crate::sat::backtrack::Backtracker::solve).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl Observer for NoObserver {}

/// Counts branches and descents per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounter {
    /// Branching steps; equal to `Solution::steps`.
    pub branches: u64,
    /// Descents into a true-side reduction.
    pub true_descents: u64,
    /// Descents into a false-side reduction.
    pub false_descents: u64,
    /// Deepest branching step seen.
    pub max_depth: usize,
}

impl Observer for CallCounter {
    fn on_branch(&mut self, _literal: Literal, depth: usize) {
        self.branches += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    fn on_descend(&mut self, side: Side, _literal: Literal, _depth: usize) {
        match side {
            Side::True => self.true_descents += 1,
            Side::False => self.false_descents += 1,
        }
    }
}
