//! Conjunctive normal form formulas.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::error::Result;
use crate::sat::literal::Variable;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// A conjunction of clauses.
///
/// `num_vars` is the largest variable index occurring in any clause (0 for a
/// formula without literals). It only sizes assignments; the solver works on
/// whatever variables the clauses mention.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    /// The clauses, in input order.
    pub clauses: Vec<Clause>,
    /// The largest variable index.
    pub num_vars: usize,
}

impl Cnf {
    /// Collects `clauses` and derives `num_vars` from them.
    #[must_use]
    pub fn new(clauses: impl IntoIterator<Item = Clause>) -> Self {
        let clauses = clauses.into_iter().collect_vec();
        let num_vars = clauses
            .iter()
            .flat_map(Clause::iter)
            .map(|l| l.variable() as usize)
            .max()
            .unwrap_or(0);
        Self { clauses, num_vars }
    }

    /// Builds a formula from raw integers.
    ///
    /// # Errors
    ///
    /// `InvalidLiteral` naming the first clause that contains `0`.
    pub fn from_i32s<C: AsRef<[i32]>>(clauses: &[C]) -> Result<Self> {
        clauses
            .iter()
            .enumerate()
            .map(|(i, c)| Clause::from_i32s(c.as_ref(), i))
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// `true` for the formula without clauses, which is satisfied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The clauses in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Total number of literal occurrences.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.iter().map(Clause::len).sum()
    }

    /// Distinct variables mentioned by the clauses, ascending.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.iter()
            .flat_map(Clause::iter)
            .map(|l| l.variable())
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Checks that every clause has a literal made true by `assignment`.
    #[must_use]
    pub fn verify(&self, assignment: &Assignment) -> bool {
        self.iter().all(|clause| clause.is_satisfied_by(assignment))
    }
}

impl From<Vec<Clause>> for Cnf {
    fn from(clauses: Vec<Clause>) -> Self {
        Self::new(clauses)
    }
}

/// DIMACS rendering, header included.
impl Display for Cnf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.len())?;
        for clause in self.iter() {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}
