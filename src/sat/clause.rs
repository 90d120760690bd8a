//! Clauses: disjunctions of literals.

use crate::sat::assignment::Assignment;
use crate::sat::error::{Error, Result};
use crate::sat::literal::Literal;
use core::ops::Index;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

/// Inline storage sized for 3-SAT; longer clauses spill to the heap.
pub type LiteralStorage = SmallVec<[Literal; 3]>;

/// A disjunction of literals.
///
/// Literals keep their input order and duplicates are not removed: the
/// frequency selector counts every occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    /// The literals, in input order.
    pub literals: LiteralStorage,
}

impl Clause {
    /// Builds a clause from already validated literals.
    #[must_use]
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    /// Converts raw DIMACS-style integers, rejecting `0`.
    ///
    /// # Errors
    ///
    /// `InvalidLiteral` carrying `index` when any literal is zero.
    pub fn from_i32s(literals: &[i32], index: usize) -> Result<Self> {
        literals
            .iter()
            .map(|&l| Literal::try_from(l).map_err(|_| Error::InvalidLiteral { clause: index }))
            .collect::<Result<LiteralStorage>>()
            .map(|literals| Self { literals })
    }

    /// Number of literals, counting duplicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// An empty clause can never be satisfied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// `true` for a clause of exactly one literal.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    /// The literals in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    /// Whether `literal` occurs with this exact polarity.
    #[must_use]
    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.contains(&literal)
    }

    /// The clause with every occurrence of `literal` struck out.
    #[must_use]
    pub fn without(&self, literal: Literal) -> Self {
        Self {
            literals: self.iter().copied().filter(|&l| l != literal).collect(),
        }
    }

    /// A clause is satisfied once any of its literals is true.
    #[must_use]
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        self.iter()
            .any(|&lit| assignment.literal_value(lit) == Some(true))
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<&Clause> for Vec<i32> {
    fn from(clause: &Clause) -> Self {
        clause.iter().map(|l| l.to_i32()).collect()
    }
}

/// DIMACS clause line, including the terminating `0`.
impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "0");
        }
        write!(f, "{} 0", self.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i32) -> Literal {
        Literal::try_from(v).unwrap()
    }

    #[test]
    fn test_from_i32s_keeps_order_and_duplicates() {
        let clause = Clause::from_i32s(&[2, -1, 2], 0).unwrap();
        assert_eq!(clause.len(), 3);
        assert_eq!(clause[0], lit(2));
        assert_eq!(clause[1], lit(-1));
        assert_eq!(clause[2], lit(2));
    }

    #[test]
    fn test_from_i32s_rejects_zero() {
        let err = Clause::from_i32s(&[1, 0, 3], 5).unwrap_err();
        assert!(matches!(err, Error::InvalidLiteral { clause: 5 }));
    }

    #[test]
    fn test_without_strikes_every_occurrence() {
        let clause = Clause::from_i32s(&[-1, 2, -1], 0).unwrap();
        let struck = clause.without(lit(-1));
        assert_eq!(Vec::<i32>::from(&struck), vec![2]);
        assert!(struck.is_unit());
        assert!(struck.without(lit(2)).is_empty());
    }

    #[test]
    fn test_contains_distinguishes_polarity() {
        let clause = Clause::from_i32s(&[1, -2], 0).unwrap();
        assert!(clause.contains(lit(1)));
        assert!(!clause.contains(lit(-1)));
        assert!(clause.contains(lit(-2)));
    }

    #[test]
    fn test_display_is_dimacs() {
        assert_eq!(Clause::from_i32s(&[1, -2, 3], 0).unwrap().to_string(), "1 -2 3 0");
        assert_eq!(Clause::default().to_string(), "0");
    }

    #[test]
    fn test_satisfied_by() {
        let clause = Clause::from_i32s(&[1, -2], 0).unwrap();
        let mut assignment = Assignment::new(2);
        assert!(!clause.is_satisfied_by(&assignment));
        assignment.assign(lit(2));
        assert!(!clause.is_satisfied_by(&assignment));
        assignment.assign(lit(1));
        assert!(clause.is_satisfied_by(&assignment));
    }
}
