#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Branching literal selection.
//!
//! The default heuristic counts every literal occurrence in the current
//! formula and branches on the most frequent one. Counts are rebuilt from
//! scratch at every search node. Ties go to the literal that appears first,
//! scanning clauses in order and literals within a clause in order.

use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use clap::ValueEnum;
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};

/// Occurrence counts of literals, iterated in order of first appearance.
///
/// `3` and `-3` are counted separately.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrequencyMap {
    entries: Vec<(Literal, usize)>,
    index: FxHashMap<Literal, usize>,
}

impl FrequencyMap {
    /// Counts every literal occurrence in `clauses`.
    #[must_use]
    pub fn from_clauses(clauses: &[Clause]) -> Self {
        let mut map = Self::default();
        for &lit in clauses.iter().flat_map(Clause::iter) {
            map.bump(lit);
        }
        map
    }

    fn bump(&mut self, lit: Literal) {
        match self.index.get(&lit) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(lit, self.entries.len());
                self.entries.push((lit, 1));
            }
        }
    }

    /// Occurrences of `lit`; zero when it does not appear.
    #[must_use]
    pub fn get(&self, lit: Literal) -> usize {
        self.index.get(&lit).map_or(0, |&slot| self.entries[slot].1)
    }

    /// Number of distinct literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no literal was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(literal, count)` pairs in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (Literal, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// The most frequent literal; the earliest one wins a tie.
    #[must_use]
    pub fn max(&self) -> Option<(Literal, usize)> {
        self.iter().fold(None, |best, (lit, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((lit, count)),
        })
    }
}

/// Picks the literal with the highest occurrence count, along with the counts.
///
/// Returns `None` when the clauses hold no literal at all.
#[must_use]
pub fn select_max_frequency(clauses: &[Clause]) -> Option<(Literal, FrequencyMap)> {
    let freq = FrequencyMap::from_clauses(clauses);
    let (lit, _) = freq.max()?;
    Some((lit, freq))
}

/// Chooses the literal a search node branches on.
pub trait LiteralSelection {
    /// The literal to branch on next, or `None` if no clause has a literal.
    fn pick(&self, clauses: &[Clause]) -> Option<Literal>;
}

/// Most frequent literal first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxFrequency;

impl LiteralSelection for MaxFrequency {
    fn pick(&self, clauses: &[Clause]) -> Option<Literal> {
        select_max_frequency(clauses).map(|(lit, _)| lit)
    }
}

/// First literal of the first non-empty clause; a baseline for experiments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstLiteral;

impl LiteralSelection for FirstLiteral {
    fn pick(&self, clauses: &[Clause]) -> Option<Literal> {
        clauses.iter().flat_map(Clause::iter).next().copied()
    }
}

/// Static dispatch over the available selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionImpls {
    /// See [`MaxFrequency`].
    MaxFrequency(MaxFrequency),
    /// See [`FirstLiteral`].
    FirstLiteral(FirstLiteral),
}

impl LiteralSelection for SelectionImpls {
    fn pick(&self, clauses: &[Clause]) -> Option<Literal> {
        match self {
            Self::MaxFrequency(s) => s.pick(clauses),
            Self::FirstLiteral(s) => s.pick(clauses),
        }
    }
}

/// Selector names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, ValueEnum)]
pub enum SelectionType {
    /// Most frequent literal, earliest on a tie.
    #[default]
    MaxFrequency,
    /// First literal of the first non-empty clause.
    FirstLiteral,
}

impl SelectionType {
    /// The selector this name stands for.
    #[must_use]
    pub const fn to_impl(self) -> SelectionImpls {
        match self {
            Self::MaxFrequency => SelectionImpls::MaxFrequency(MaxFrequency),
            Self::FirstLiteral => SelectionImpls::FirstLiteral(FirstLiteral),
        }
    }
}

impl Display for SelectionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaxFrequency => write!(f, "max-frequency"),
            Self::FirstLiteral => write!(f, "first-literal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::cnf::Cnf;
    use itertools::Itertools;

    fn clauses(raw: &[Vec<i32>]) -> Vec<Clause> {
        Cnf::from_i32s(raw).unwrap().clauses
    }

    fn lit(v: i32) -> Literal {
        Literal::try_from(v).unwrap()
    }

    #[test]
    fn test_most_frequent_literal_wins() {
        let cs = clauses(&[vec![1, 2], vec![-1, 2]]);
        let (picked, freq) = select_max_frequency(&cs).unwrap();
        assert_eq!(picked, lit(2));
        assert_eq!(freq.get(lit(2)), 2);
        assert_eq!(freq.get(lit(1)), 1);
        assert_eq!(freq.get(lit(-1)), 1);
        assert_eq!(freq.len(), 3);
    }

    #[test]
    fn test_polarities_counted_separately() {
        let cs = clauses(&[vec![3, -3], vec![-3]]);
        let (picked, freq) = select_max_frequency(&cs).unwrap();
        assert_eq!(picked, lit(-3));
        assert_eq!(freq.get(lit(3)), 1);
        assert_eq!(freq.get(lit(-3)), 2);
    }

    #[test]
    fn test_tie_goes_to_first_appearance() {
        // 1 and 3 both occur three times; 1 is seen first.
        let cs = clauses(&[
            vec![1, 2, 3],
            vec![1, -2, 3],
            vec![1, 2, -3],
            vec![-1, -2, 3],
        ]);
        let (picked, freq) = select_max_frequency(&cs).unwrap();
        assert_eq!(picked, lit(1));
        assert_eq!(
            freq.iter().collect_vec(),
            vec![
                (lit(1), 3),
                (lit(2), 2),
                (lit(3), 3),
                (lit(-2), 2),
                (lit(-3), 1),
                (lit(-1), 1),
            ]
        );
    }

    #[test]
    fn test_tie_within_clause_order() {
        let cs = clauses(&[vec![5, 4], vec![4, 5]]);
        assert_eq!(MaxFrequency.pick(&cs), Some(lit(5)));
    }

    #[test]
    fn test_duplicates_counted_individually() {
        let cs = clauses(&[vec![1, 2], vec![2, 2], vec![1]]);
        let (picked, freq) = select_max_frequency(&cs).unwrap();
        assert_eq!(picked, lit(2));
        assert_eq!(freq.get(lit(2)), 3);
    }

    #[test]
    fn test_no_literals() {
        assert!(select_max_frequency(&[]).is_none());
        assert!(select_max_frequency(&[Clause::default()]).is_none());
        assert!(FirstLiteral.pick(&[Clause::default()]).is_none());
    }

    #[test]
    fn test_every_counted_literal_occurs() {
        let cs = clauses(&[vec![1, -2, 3], vec![-1, 4]]);
        let freq = FrequencyMap::from_clauses(&cs);
        for (l, count) in freq.iter() {
            assert!(count > 0);
            assert!(cs.iter().any(|c| c.contains(l)));
        }
    }

    #[test]
    fn test_first_literal_skips_empty_clauses() {
        let cs = vec![Clause::default(), Clause::new([lit(-7), lit(2)])];
        assert_eq!(FirstLiteral.pick(&cs), Some(lit(-7)));
        assert_eq!(SelectionType::FirstLiteral.to_impl().pick(&cs), Some(lit(-7)));
        assert_eq!(SelectionType::MaxFrequency.to_impl().pick(&cs), Some(lit(-7)));
    }
}
