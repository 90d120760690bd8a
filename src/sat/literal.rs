#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Variables and literals.

use crate::sat::error::Error;
use core::num::NonZeroI32;
use core::ops::{Neg, Not};
use std::fmt::{Display, Formatter};

/// Variables are positive integers starting at 1.
pub type Variable = u32;

/// A signed variable reference. The sign is the polarity, the magnitude the variable.
///
/// Zero cannot be represented, so a `Literal` is always well formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(NonZeroI32);

impl Literal {
    /// Builds the literal of `var` with the given polarity.
    ///
    /// # Panics
    ///
    /// If `var` is zero or does not fit in an `i32`.
    #[must_use]
    pub fn new(var: Variable, polarity: bool) -> Self {
        let var = i32::try_from(var).expect("literal variable overflowed");
        let value = if polarity { var } else { -var };
        Self(NonZeroI32::new(value).expect("variable 0 has no literal"))
    }

    /// The variable this literal refers to.
    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0.get().unsigned_abs()
    }

    /// `true` for a positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0.get().is_positive()
    }

    /// `true` for a negative literal.
    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity()
    }

    /// The same variable with the opposite polarity.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0.wrapping_neg())
    }

    /// The DIMACS integer form.
    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self.0.get()
    }
}

impl TryFrom<i32> for Literal {
    type Error = Error;

    /// Fails with `InvalidLiteral` for `0`; the clause index is filled in by callers
    /// that know it.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        NonZeroI32::new(value)
            .map(Self)
            .ok_or(Error::InvalidLiteral { clause: 0 })
    }
}

impl From<Literal> for i32 {
    fn from(literal: Literal) -> Self {
        literal.to_i32()
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
