//! Truth assignments, used to check the decisions of a search.

use crate::sat::literal::{Literal, Variable};
use core::ops::Index;

/// The value held by one variable.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    /// No value yet.
    #[default]
    Unassigned,
    /// Assigned true or false.
    Assigned(bool),
}

impl VarState {
    /// `true` once the variable holds a value.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    /// The opposite of [`Self::is_assigned`].
    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        !self.is_assigned()
    }
}

/// A model as signed integers, one per assigned variable.
pub type Solutions = Vec<i32>;

/// A (partial) truth assignment indexed by variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<VarState>);

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.0[index as usize]
    }
}

impl Assignment {
    /// An empty assignment with room for variables `1..=num_vars`.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(vec![VarState::Unassigned; num_vars + 1])
    }

    /// Builds the assignment that makes every literal of `decisions` true.
    ///
    /// Returns `None` when two decisions disagree on a variable.
    #[must_use]
    pub fn from_decisions(num_vars: usize, decisions: &[Literal]) -> Option<Self> {
        let mut assignment = Self::new(num_vars);
        let consistent = decisions.iter().all(|&lit| assignment.assign(lit));
        consistent.then_some(assignment)
    }

    /// Makes `lit` true. Returns `false`, leaving the state untouched, if the
    /// variable already holds the opposite value.
    pub fn assign(&mut self, lit: Literal) -> bool {
        let index = lit.variable() as usize;
        if index >= self.0.len() {
            self.0.resize(index + 1, VarState::Unassigned);
        }
        match self.0[index] {
            VarState::Assigned(value) => value == lit.polarity(),
            VarState::Unassigned => {
                self.0[index] = VarState::Assigned(lit.polarity());
                true
            }
        }
    }

    /// The value of `var`, or `None` if it is unassigned.
    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        match self.0.get(var as usize) {
            Some(VarState::Assigned(b)) => Some(*b),
            _ => None,
        }
    }

    /// Whether `lit` is true, or `None` if its variable is unassigned.
    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| b == lit.polarity())
    }

    /// Assigned variables as signed integers, in variable order.
    #[must_use]
    pub fn get_solutions(&self) -> Solutions {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                let i = i32::try_from(i).ok()?;
                match s {
                    VarState::Assigned(true) => Some(i),
                    VarState::Assigned(false) => Some(-i),
                    VarState::Unassigned => None,
                }
            })
            .collect()
    }
}
