#![deny(missing_docs)]
//! A frequency-driven backtracking solver for 3-SAT, and the experiment driver
//! that measures how many branching steps it takes on random instances.

/// The `sat` module implements the solver core: literals, clauses, formulas,
/// the frequency heuristic and the backtracking search.
pub mod sat;

/// The `experiment` module generates random 3-SAT instances, sweeps them over
/// clause and variable counts, and records the step counts.
pub mod experiment;
