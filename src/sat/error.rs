//! Error type shared by the solver core, the DIMACS reader and the experiment driver.

use crate::sat::literal::Variable;
use thiserror::Error;

/// Errors reported by `freq-sat`.
///
/// Input validation errors are raised once, at the entry point of a solve,
/// before any search starts. Nothing is raised from inside the search except
/// the optional budget errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A raw clause contains the literal `0`.
    #[error("clause {clause} contains the literal 0")]
    InvalidLiteral {
        /// Zero-based index of the offending clause.
        clause: usize,
    },

    /// The candidate variable set contains `0`, or a value no literal can name.
    #[error("{0} is not a valid variable, variables range over 1..=2147483647")]
    InvalidVariable(Variable),

    /// A variable of the formula is missing from the candidate variable set.
    #[error("variable {variable} occurs in the formula but is not a candidate")]
    InconsistentVariableSet {
        /// The first variable found missing.
        variable: Variable,
    },

    /// The configured step limit was reached before the search finished.
    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded {
        /// The configured limit.
        limit: u64,
    },

    /// The configured deadline passed before the search finished.
    #[error("deadline exceeded after {steps} steps")]
    Timeout {
        /// Steps taken when the deadline was noticed.
        steps: u64,
    },

    /// A random 3-SAT instance needs three distinct variables per clause.
    #[error("a 3-SAT instance needs at least 3 variables, got {0}")]
    TooFewVariables(usize),

    /// A sweep range could not be parsed or is empty.
    #[error("invalid range '{0}', expected start:end[:step] with start <= end and step > 0")]
    InvalidRange(String),

    /// A DIMACS token is not an integer.
    #[error("line {line}: failed to parse literal '{token}'")]
    Parse {
        /// One-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// I/O error while reading a formula or writing results.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
