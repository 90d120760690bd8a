//! Random 3-SAT instances.

use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::error::{Error, Result};
use crate::sat::literal::{Literal, Variable};

/// Literals per generated clause.
pub const CLAUSE_WIDTH: usize = 3;

/// Seeded source of uniform random 3-SAT formulas.
///
/// Each clause draws three distinct variables from `1..=n` without
/// replacement and negates each one with probability 1/2.
#[derive(Debug, Clone)]
pub struct Generator {
    rng: fastrand::Rng,
}

impl Generator {
    /// A generator whose output depends on `seed` only.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// A formula with `clauses` clauses over `variables` variables.
    ///
    /// # Errors
    ///
    /// `TooFewVariables` if `variables < 3`, since no clause could then hold three
    /// distinct variables.
    pub fn formula(&mut self, clauses: usize, variables: usize) -> Result<Cnf> {
        if variables < CLAUSE_WIDTH {
            return Err(Error::TooFewVariables(variables));
        }
        let top = Variable::try_from(variables).map_err(|_| Error::TooFewVariables(variables))?;
        Ok(Cnf::new((0..clauses).map(|_| self.clause(top))))
    }

    fn clause(&mut self, top: Variable) -> Clause {
        let mut vars: [Variable; CLAUSE_WIDTH] = [0; CLAUSE_WIDTH];
        let mut drawn = 0;
        while drawn < CLAUSE_WIDTH {
            let var = self.rng.u32(1..=top);
            if !vars[..drawn].contains(&var) {
                vars[drawn] = var;
                drawn += 1;
            }
        }
        vars.into_iter()
            .map(|var| Literal::new(var, self.rng.bool()))
            .collect()
    }
}
