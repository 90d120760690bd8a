//! Measuring the solver on random 3-SAT instances.
//!
//! A [`sweep::Sweep`] walks a grid of `(clauses, variables)` points, draws
//! instances from a seeded [`generator::Generator`], solves each one with a
//! fresh step count and hands back [`sweep::Record`]s. [`report`] writes them
//! as CSV and summarises steps per problem size.

pub mod generator;
pub mod report;
pub mod sweep;
