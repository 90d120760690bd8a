#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A reader for the DIMACS CNF format.
//!
//! - Lines starting with `c` are comments.
//! - The `p cnf <vars> <clauses>` header is skipped; counts are derived from
//!   the clauses actually read.
//! - Every other line holds signed integers. A clause runs until the next
//!   `0` and may span lines; several clauses may share one line.
//! - A `%` line ends the data (as in the SATLIB benchmark files).

use crate::sat::cnf::Cnf;
use crate::sat::error::{Error, Result};
use itertools::Itertools;
use std::io::{self, BufRead};
use std::path::Path;

/// Parses DIMACS text from `reader`.
///
/// A `0` with no literals before it is skipped rather than read as an empty
/// clause. Literals left unterminated at the end of the input form a last
/// clause.
///
/// # Errors
///
/// `Io` when reading fails, `Parse` when a token is not an integer.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf> {
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut pending: Vec<i32> = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace().peekable();

        match parts.peek() {
            Some(&"%") => break,
            None | Some(&"c" | &"p") => {}
            Some(first) if first.starts_with('c') => {}
            Some(_) => {
                for token in parts {
                    let literal = token.parse::<i32>().map_err(|_| Error::Parse {
                        line: number + 1,
                        token: token.to_string(),
                    })?;
                    if literal != 0 {
                        pending.push(literal);
                    } else if !pending.is_empty() {
                        clauses.push(std::mem::take(&mut pending));
                    }
                }
            }
        }
    }

    if !pending.is_empty() {
        clauses.push(pending);
    }

    Cnf::from_i32s(&clauses)
}

/// Parses a DIMACS file.
///
/// # Errors
///
/// As [`parse_dimacs`], plus failing to open the file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}

/// Parses clauses written inline, one per line, e.g. `"1 -2 0\n2 3 0"`.
///
/// # Errors
///
/// As [`parse_dimacs`].
pub fn parse_text(input: &str) -> Result<Cnf> {
    parse_dimacs(io::Cursor::new(input.replace("\\n", "\n")))
}

/// Renders `cnf` with a comment header, ready to be written to a `.cnf` file.
#[must_use]
pub fn to_dimacs(cnf: &Cnf, comments: &[&str]) -> String {
    let header = comments.iter().map(|c| format!("c {c}\n")).join("");
    format!("{header}{cnf}")
}
