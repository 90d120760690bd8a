#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod assignment;
pub mod backtrack;
pub mod candidates;
pub mod clause;
pub mod cnf;
pub mod dimacs;
pub mod error;
pub mod literal;
pub mod solver;
pub mod variable_selection;
