//! The candidate variable set: variables the search has not branched on yet.

use crate::sat::error::{Error, Result};
use crate::sat::literal::Variable;
use bit_vec::BitVec;

/// A set of positive variables.
///
/// Variables up to a dense bound live in a bit vector; any above it are kept
/// in a short sorted list, so the footprint follows the input rather than the
/// largest variable named in it.
///
/// The search only asks two things of it: whether it is empty, and to drop
/// the variable it just branched on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateSet {
    bits: BitVec,
    sparse: Vec<Variable>,
    len: usize,
}

impl CandidateSet {
    /// Builds the set, collapsing duplicates.
    ///
    /// # Errors
    ///
    /// `InvalidVariable` if any entry is `0` or above `i32::MAX`, since no
    /// literal can refer to it.
    pub fn from_variables(vars: &[Variable]) -> Result<Self> {
        Self::with_dense_bound(vars, vars.len())
    }

    /// Builds the set with a bit vector covering `1..=dense_bound`, typically
    /// the largest variable of the formula being solved.
    ///
    /// # Errors
    ///
    /// As [`Self::from_variables`].
    pub fn with_dense_bound(vars: &[Variable], dense_bound: usize) -> Result<Self> {
        if let Some(&bad) = vars.iter().find(|&&v| v == 0 || i32::try_from(v).is_err()) {
            return Err(Error::InvalidVariable(bad));
        }
        let mut set = Self {
            bits: BitVec::from_elem(dense_bound + 1, false),
            sparse: Vec::new(),
            len: 0,
        };
        for &var in vars {
            set.insert(var);
        }
        Ok(set)
    }

    fn insert(&mut self, var: Variable) {
        let index = var as usize;
        if index < self.bits.len() {
            if !self.bits[index] {
                self.bits.set(index, true);
                self.len += 1;
            }
        } else if let Err(slot) = self.sparse.binary_search(&var) {
            self.sparse.insert(slot, var);
            self.len += 1;
        }
    }

    /// Whether `var` is still a candidate.
    #[must_use]
    pub fn contains(&self, var: Variable) -> bool {
        let index = var as usize;
        if index < self.bits.len() {
            self.bits[index]
        } else {
            self.sparse.binary_search(&var).is_ok()
        }
    }

    /// Removes `var`, returning whether it was present.
    pub fn remove(&mut self, var: Variable) -> bool {
        let index = var as usize;
        if index < self.bits.len() {
            if !self.bits[index] {
                return false;
            }
            self.bits.set(index, false);
        } else {
            let Ok(slot) = self.sparse.binary_search(&var) else {
                return false;
            };
            self.sparse.remove(slot);
        }
        self.len -= 1;
        true
    }

    /// Number of candidates left.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// `true` once every candidate has been branched on.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Variable> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, present)| present)
            .filter_map(|(i, _)| Variable::try_from(i).ok())
            .chain(self.sparse.iter().copied())
    }
}
