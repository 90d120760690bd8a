//! Frequency-driven backtracking search.
//!
//! Every search node is one of three states:
//! 1.  **Satisfied**: no clause is left.
//! 2.  **Unsatisfiable**: clauses remain but no candidate variable does (or,
//!     under [`Reduction::Strike`], some clause has been emptied).
//! 3.  **Branch**: a literal `L` is selected and one step is counted. The
//!     formula is reduced under `L` and searched; only if that fails is it
//!     reduced under `-L` and searched.
//!
//! A reduction drops the clauses the assumed literal satisfies and removes the
//! literal's variable from the candidate set. The search keeps its own stack
//! of frames instead of recursing, so depth is limited by memory only.

use crate::sat::candidates::CandidateSet;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::error::{Error, Result};
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::{NoObserver, Observer, Reduction, Side, Solution, SolverConfig};
use crate::sat::variable_selection::{LiteralSelection, SelectionImpls};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// The formula and candidate variables at one search node.
#[derive(Debug, Clone)]
struct State {
    clauses: Vec<Clause>,
    candidates: CandidateSet,
}

/// A branch whose true side is being explored, or whose false side is.
#[derive(Debug)]
struct Frame {
    state: State,
    literal: Literal,
    side: Side,
}

enum Node {
    Satisfied,
    Unsatisfiable,
    Branch(Literal),
}

/// The search engine. Holds a configuration and no per-solve state, so one
/// instance can serve any number of solves.
#[derive(Debug, Clone)]
pub struct Backtracker {
    config: SolverConfig,
    selector: SelectionImpls,
}

impl Default for Backtracker {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Backtracker {
    /// A solver for `config`.
    #[must_use]
    pub const fn new(config: SolverConfig) -> Self {
        Self {
            selector: config.selection.to_impl(),
            config,
        }
    }

    /// The configuration this solver was built with.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Decides `cnf`, branching only while `variables` has candidates left.
    ///
    /// # Preconditions
    ///
    /// `variables` should be exactly the variables of `cnf`. A candidate that
    /// occurs in no clause is accepted, and logged as a warning, but it keeps
    /// the candidate set from running empty and so changes the answer under
    /// [`Reduction::Faithful`]: `[[1], [-1]]` is unsatisfiable with
    /// candidates `[1]` and satisfiable, with decisions `[1, -1]`, with
    /// candidates `[1, 2]`.
    ///
    /// # Errors
    ///
    /// - `InvalidVariable` if `variables` contains `0` or a value above
    ///   `i32::MAX`.
    /// - `InconsistentVariableSet` if `variables` is non-empty and misses a
    ///   variable of `cnf`.
    /// - `StepLimitExceeded` / `Timeout` when a configured budget runs out.
    pub fn solve(&self, cnf: &Cnf, variables: &[Variable]) -> Result<Solution> {
        self.solve_observed(cnf, variables, &mut NoObserver)
    }

    /// [`Self::solve`] over raw integer clauses.
    ///
    /// # Errors
    ///
    /// `InvalidLiteral` if a clause contains `0`, otherwise as [`Self::solve`].
    pub fn solve_raw<C: AsRef<[i32]>>(
        &self,
        clauses: &[C],
        variables: &[Variable],
    ) -> Result<Solution> {
        let cnf = Cnf::from_i32s(clauses)?;
        self.solve(&cnf, variables)
    }

    /// [`Self::solve`], reporting every branch and descent to `observer`.
    ///
    /// # Preconditions
    ///
    /// As [`Self::solve`].
    ///
    /// # Errors
    ///
    /// As [`Self::solve`].
    pub fn solve_observed<O: Observer>(
        &self,
        cnf: &Cnf,
        variables: &[Variable],
        observer: &mut O,
    ) -> Result<Solution> {
        let candidates = CandidateSet::with_dense_bound(variables, cnf.num_vars)?;
        Self::validate(cnf, &candidates)?;
        if !cnf.is_empty() {
            Self::warn_unused(cnf, &candidates);
        }

        debug!(
            clauses = cnf.len(),
            candidates = candidates.len(),
            reduction = %self.config.reduction,
            selection = %self.config.selection,
            "starting search"
        );

        let root = State {
            clauses: cnf.clauses.clone(),
            candidates,
        };
        let solution = self.search(root, observer)?;

        debug!(
            satisfiable = solution.satisfiable,
            steps = solution.steps,
            "search finished"
        );
        Ok(solution)
    }

    /// An empty candidate set is a base case of the search, so only a
    /// non-empty one has to cover the formula.
    fn validate(cnf: &Cnf, candidates: &CandidateSet) -> Result<()> {
        if candidates.is_empty() {
            return Ok(());
        }
        match cnf
            .iter()
            .flat_map(Clause::iter)
            .map(|l| l.variable())
            .find(|&v| !candidates.contains(v))
        {
            Some(variable) => Err(Error::InconsistentVariableSet { variable }),
            None => Ok(()),
        }
    }

    fn warn_unused(cnf: &Cnf, candidates: &CandidateSet) {
        let used = cnf.variables();
        let mut unused = candidates.iter().filter(|v| used.binary_search(v).is_err());
        if let Some(first) = unused.next() {
            warn!(
                first,
                count = unused.count() + 1,
                "candidate variables occur in no clause, the faithful reduction may accept an unsatisfiable formula"
            );
        }
    }

    fn search<O: Observer>(&self, root: State, observer: &mut O) -> Result<Solution> {
        let started = Instant::now();
        let mut steps: u64 = 0;
        let mut stack: Vec<Frame> = Vec::new();
        let mut current = root;

        loop {
            let satisfiable = match self.evaluate(&current) {
                Node::Satisfied => true,
                Node::Unsatisfiable => false,
                Node::Branch(literal) => {
                    self.check_budget(steps, started)?;
                    steps += 1;

                    let depth = stack.len();
                    observer.on_branch(literal, depth);
                    trace!(%literal, depth, steps, "branch");

                    let child = self.reduce(&current, literal);
                    stack.push(Frame {
                        state: current,
                        literal,
                        side: Side::True,
                    });
                    if let Some(child) = child {
                        observer.on_descend(Side::True, literal, depth);
                        current = child;
                        continue;
                    }
                    false
                }
            };

            if satisfiable {
                return Ok(Solution {
                    satisfiable: true,
                    steps,
                    decisions: Self::decisions(&stack),
                });
            }

            // Backtrack to the nearest branch whose false side is unexplored.
            loop {
                let depth = stack.len().saturating_sub(1);
                let Some(frame) = stack.last_mut() else {
                    return Ok(Solution {
                        satisfiable: false,
                        steps,
                        decisions: Vec::new(),
                    });
                };

                if frame.side == Side::True {
                    frame.side = Side::False;
                    if let Some(child) = self.reduce(&frame.state, frame.literal.negated()) {
                        observer.on_descend(Side::False, frame.literal, depth);
                        current = child;
                        break;
                    }
                    trace!(literal = %frame.literal, depth, "false side repeats its parent");
                }
                stack.pop();
            }
        }
    }

    fn evaluate(&self, state: &State) -> Node {
        if state.clauses.is_empty() {
            return Node::Satisfied;
        }
        if state.candidates.is_empty() {
            return Node::Unsatisfiable;
        }
        if self.config.reduction == Reduction::Strike && state.clauses.iter().any(Clause::is_empty)
        {
            return Node::Unsatisfiable;
        }
        self.selector
            .pick(&state.clauses)
            .map_or(Node::Unsatisfiable, Node::Branch)
    }

    /// The node reached by assuming `assumed` true.
    ///
    /// `None` when neither the clauses nor the candidates change: the child
    /// would be its parent again and loop forever, so it counts as failed.
    fn reduce(&self, state: &State, assumed: Literal) -> Option<State> {
        let falsified = assumed.negated();
        let strike = self.config.reduction == Reduction::Strike;

        let mut changed = false;
        let mut clauses = Vec::with_capacity(state.clauses.len());
        for clause in &state.clauses {
            if clause.contains(assumed) {
                changed = true;
            } else if strike && clause.contains(falsified) {
                changed = true;
                clauses.push(clause.without(falsified));
            } else {
                clauses.push(clause.clone());
            }
        }

        let mut candidates = state.candidates.clone();
        changed |= candidates.remove(assumed.variable());

        changed.then_some(State {
            clauses,
            candidates,
        })
    }

    fn check_budget(&self, steps: u64, started: Instant) -> Result<()> {
        if let Some(limit) = self.config.step_limit {
            if steps >= limit {
                return Err(Error::StepLimitExceeded { limit });
            }
        }
        if let Some(deadline) = self.config.deadline {
            if started.elapsed() >= deadline {
                return Err(Error::Timeout { steps });
            }
        }
        Ok(())
    }

    fn decisions(stack: &[Frame]) -> Vec<Literal> {
        stack
            .iter()
            .map(|frame| match frame.side {
                Side::True => frame.literal,
                Side::False => frame.literal.negated(),
            })
            .collect()
    }
}

/// Decides `cnf` with the default configuration.
///
/// # Errors
///
/// As [`Backtracker::solve`].
pub fn solve(cnf: &Cnf, variables: &[Variable]) -> Result<Solution> {
    Backtracker::default().solve(cnf, variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::Assignment;
    use crate::sat::solver::CallCounter;
    use crate::sat::variable_selection::SelectionType;
    use std::time::Duration;

    fn lit(v: i32) -> Literal {
        Literal::try_from(v).unwrap()
    }

    fn with(reduction: Reduction) -> Backtracker {
        Backtracker::new(SolverConfig {
            reduction,
            ..SolverConfig::default()
        })
    }

    const SCENARIO: [[i32; 3]; 4] = [[1, 2, 3], [1, -2, 3], [1, 2, -3], [-1, -2, 3]];

    /// Two units on variable 1 plus a duplicated unit on 2: the faithful false
    /// side of the second branch on 2 would re-enter its parent.
    fn repeating() -> Vec<Vec<i32>> {
        vec![vec![1], vec![-1], vec![2], vec![2]]
    }

    #[test]
    fn test_empty_formula_is_satisfied() {
        let s = Backtracker::default()
            .solve_raw::<Vec<i32>>(&[], &[1, 2, 3])
            .unwrap();
        assert!(s.satisfiable);
        assert_eq!(s.steps, 0);
        assert!(s.decisions.is_empty());

        let s = Backtracker::default().solve_raw::<Vec<i32>>(&[], &[]).unwrap();
        assert!(s.satisfiable);
        assert_eq!(s.steps, 0);
    }

    #[test]
    fn test_no_variables_is_unsatisfiable() {
        for reduction in [Reduction::Faithful, Reduction::Strike] {
            let s = with(reduction).solve_raw(&[vec![1, 2, 3]], &[]).unwrap();
            assert!(!s.satisfiable);
            assert_eq!(s.steps, 0);
        }
    }

    #[test]
    fn test_satisfiable_scenario_faithful() {
        let s = with(Reduction::Faithful).solve_raw(&SCENARIO, &[1, 2, 3]).unwrap();
        assert!(s.satisfiable);
        assert_eq!(s.steps, 2);
        // -1 is picked after 1 because the faithful reduction keeps it around.
        assert_eq!(s.decisions, vec![lit(1), lit(-1)]);
        assert!(s.assignment(3).is_none());
    }

    #[test]
    fn test_satisfiable_scenario_strike() {
        let cnf = Cnf::from_i32s(&SCENARIO).unwrap();
        let s = with(Reduction::Strike).solve(&cnf, &[1, 2, 3]).unwrap();
        assert!(s.satisfiable);
        assert_eq!(s.steps, 2);
        assert_eq!(s.decisions, vec![lit(1), lit(-2)]);
        let model = s.assignment(cnf.num_vars).unwrap();
        assert!(cnf.verify(&model));
    }

    #[test]
    fn test_unit_conflict() {
        for reduction in [Reduction::Faithful, Reduction::Strike] {
            let mut counter = CallCounter::default();
            let cnf = Cnf::from_i32s(&[vec![1], vec![-1]]).unwrap();
            let s = with(reduction).solve_observed(&cnf, &[1], &mut counter).unwrap();
            assert!(!s.satisfiable);
            assert_eq!(s.steps, 1);
            assert!(s.decisions.is_empty());
            assert_eq!(counter.branches, 1);
            assert_eq!(counter.true_descents, 1);
            assert_eq!(counter.false_descents, 1);
        }
    }

    #[test]
    fn test_false_side_skipped_when_true_side_succeeds() {
        let cnf = Cnf::from_i32s(&SCENARIO).unwrap();
        let mut counter = CallCounter::default();
        let s = Backtracker::default()
            .solve_observed(&cnf, &[1, 2, 3], &mut counter)
            .unwrap();
        assert!(s.satisfiable);
        assert_eq!(counter.branches, s.steps);
        assert_eq!(counter.true_descents, 2);
        assert_eq!(counter.false_descents, 0);
    }

    #[test]
    fn test_repeated_parent_state_is_cut() {
        let mut counter = CallCounter::default();
        let cnf = Cnf::from_i32s(&repeating()).unwrap();
        let s = with(Reduction::Faithful)
            .solve_observed(&cnf, &[1, 2], &mut counter)
            .unwrap();
        assert!(!s.satisfiable);
        assert_eq!(s.steps, 4);
        assert_eq!(counter.true_descents, 4);
        assert_eq!(counter.false_descents, 3);
    }

    #[test]
    fn test_strike_fails_on_emptied_clause() {
        let s = with(Reduction::Strike).solve_raw(&repeating(), &[1, 2]).unwrap();
        assert!(!s.satisfiable);
        assert_eq!(s.steps, 2);
    }

    #[test]
    fn test_faithful_accepts_some_unsatisfiable_formulas() {
        let s = with(Reduction::Faithful)
            .solve_raw(&[vec![1], vec![-1], vec![2, 3]], &[1, 2, 3])
            .unwrap();
        assert!(s.satisfiable);
        assert_eq!(s.decisions, vec![lit(1), lit(-1), lit(2)]);
        assert!(s.assignment(3).is_none());

        let s = with(Reduction::Strike)
            .solve_raw(&[vec![1], vec![-1], vec![2, 3]], &[1, 2, 3])
            .unwrap();
        assert!(!s.satisfiable);
    }

    #[test]
    fn test_first_literal_selection() {
        let clauses = [vec![1, 2], vec![2, 3], vec![2]];
        let s = Backtracker::default().solve_raw(&clauses, &[1, 2, 3]).unwrap();
        assert_eq!(s.steps, 1);
        assert_eq!(s.decisions, vec![lit(2)]);

        let first = Backtracker::new(SolverConfig {
            selection: SelectionType::FirstLiteral,
            ..SolverConfig::default()
        });
        let s = first.solve_raw(&clauses, &[1, 2, 3]).unwrap();
        assert!(s.satisfiable);
        assert_eq!(s.steps, 2);
        assert_eq!(s.decisions, vec![lit(1), lit(2)]);
    }

    #[test]
    fn test_deterministic() {
        let cnf = Cnf::from_i32s(&[
            vec![1, -2, 3],
            vec![-1, 2, -4],
            vec![2, 3, 4],
            vec![-3, -4, 1],
            vec![-1, -2, -3],
        ])
        .unwrap();
        for reduction in [Reduction::Faithful, Reduction::Strike] {
            let solver = with(reduction);
            let first = solver.solve(&cnf, &[1, 2, 3, 4]).unwrap();
            for _ in 0..5 {
                assert_eq!(solver.solve(&cnf, &[1, 2, 3, 4]).unwrap(), first);
            }
        }
    }

    #[test]
    fn test_unused_candidate_flips_faithful_verdict() {
        let conflict = [vec![1], vec![-1]];

        let exact = with(Reduction::Faithful).solve_raw(&conflict, &[1]).unwrap();
        assert!(!exact.satisfiable);
        assert_eq!(exact.steps, 1);

        let extra = with(Reduction::Faithful).solve_raw(&conflict, &[1, 2]).unwrap();
        assert!(extra.satisfiable);
        assert_eq!(extra.steps, 2);
        assert_eq!(extra.decisions, vec![lit(1), lit(-1)]);
        assert!(extra.assignment(2).is_none());

        let strike = with(Reduction::Strike).solve_raw(&conflict, &[1, 2]).unwrap();
        assert!(!strike.satisfiable);
        assert_eq!(strike.steps, 1);
    }

    #[test]
    fn test_unused_candidates_on_satisfiable_formula() {
        let s = Backtracker::default().solve_raw(&[vec![1]], &[1, 2, 3]).unwrap();
        assert!(s.satisfiable);
        assert_eq!(s.steps, 1);
    }

    #[test]
    fn test_huge_candidate_is_cheap() {
        let huge = Variable::try_from(i32::MAX).unwrap();
        let started = Instant::now();
        let s = Backtracker::default().solve_raw(&[vec![1]], &[1, huge]).unwrap();
        assert!(s.satisfiable);
        assert_eq!(s.steps, 1);
        assert!(started.elapsed() < Duration::from_millis(250));

        assert!(matches!(
            Backtracker::default().solve_raw(&[vec![1]], &[1, u32::MAX]),
            Err(Error::InvalidVariable(u32::MAX))
        ));
    }

    #[test]
    fn test_input_validation() {
        let solver = Backtracker::default();
        assert!(matches!(
            solver.solve_raw(&[vec![1, 2], vec![0]], &[1, 2]),
            Err(Error::InvalidLiteral { clause: 1 })
        ));
        assert!(matches!(
            solver.solve_raw(&[vec![1, -2]], &[1]),
            Err(Error::InconsistentVariableSet { variable: 2 })
        ));
        assert!(matches!(
            solver.solve_raw(&[vec![1]], &[0, 1]),
            Err(Error::InvalidVariable(0))
        ));
    }

    #[test]
    fn test_step_limit() {
        let limited = |limit| {
            Backtracker::new(SolverConfig {
                step_limit: Some(limit),
                ..SolverConfig::default()
            })
        };
        assert!(matches!(
            limited(2).solve_raw(&repeating(), &[1, 2]),
            Err(Error::StepLimitExceeded { limit: 2 })
        ));
        let s = limited(4).solve_raw(&repeating(), &[1, 2]).unwrap();
        assert_eq!(s.steps, 4);
    }

    #[test]
    fn test_deadline() {
        let solver = Backtracker::new(SolverConfig {
            deadline: Some(Duration::ZERO),
            ..SolverConfig::default()
        });
        assert!(matches!(
            solver.solve_raw(&[vec![1]], &[1]),
            Err(Error::Timeout { steps: 0 })
        ));
        assert!(solver.solve_raw::<Vec<i32>>(&[], &[1]).unwrap().satisfiable);
    }

    #[test]
    fn test_deep_search_does_not_overflow() {
        let n: i32 = 1500;
        let clauses: Vec<Vec<i32>> = (1..=n).map(|v| vec![v]).collect();
        let variables: Vec<Variable> = (1..=n.unsigned_abs()).collect();
        let mut counter = CallCounter::default();
        let cnf = Cnf::from_i32s(&clauses).unwrap();
        let s = Backtracker::default()
            .solve_observed(&cnf, &variables, &mut counter)
            .unwrap();
        assert!(s.satisfiable);
        assert_eq!(s.steps, u64::from(n.unsigned_abs()));
        assert_eq!(counter.max_depth, 1499);
        assert_eq!(s.decisions.len(), 1500);
    }

    fn brute_force(cnf: &Cnf, num_vars: u32) -> bool {
        (0u32..1 << num_vars).any(|bits| {
            let mut assignment = Assignment::new(num_vars as usize);
            for v in 1..=num_vars {
                assignment.assign(Literal::new(v, bits & (1 << (v - 1)) != 0));
            }
            cnf.verify(&assignment)
        })
    }

    #[test]
    fn test_strike_agrees_with_brute_force() {
        let mut rng = fastrand::Rng::with_seed(7);
        let num_vars = 6;
        let variables: Vec<Variable> = (1..=num_vars).collect();
        for _ in 0..200 {
            let clauses: Vec<Vec<i32>> = (0..rng.usize(1..30))
                .map(|_| {
                    (0..3)
                        .map(|_| {
                            let v = i32::try_from(rng.u32(1..=num_vars)).unwrap();
                            if rng.bool() { v } else { -v }
                        })
                        .collect()
                })
                .collect();
            let cnf = Cnf::from_i32s(&clauses).unwrap();
            let s = with(Reduction::Strike).solve(&cnf, &variables).unwrap();
            assert_eq!(s.satisfiable, brute_force(&cnf, num_vars), "{cnf}");
            if s.satisfiable {
                let model = s.assignment(num_vars as usize).unwrap();
                assert!(cnf.verify(&model), "{cnf}");
            }
        }
    }

    #[test]
    fn test_step_count_only_grows() {
        let cnf = Cnf::from_i32s(&SCENARIO).unwrap();
        let mut seen = Vec::new();
        struct Steps<'a>(&'a mut Vec<usize>);
        impl Observer for Steps<'_> {
            fn on_branch(&mut self, _literal: Literal, depth: usize) {
                self.0.push(depth);
            }
        }
        let s = Backtracker::default()
            .solve_observed(&cnf, &[1, 2, 3], &mut Steps(&mut seen))
            .unwrap();
        assert_eq!(seen.len() as u64, s.steps);
        assert_eq!(seen, vec![0, 1]);
    }
}
