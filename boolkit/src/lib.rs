#[macro_use]
pub mod lit;
pub mod cnf;
pub mod dimacs;
pub mod error;
pub mod solver;
pub mod zdd;

mod analyze_conflict;
mod assumptions;
mod binary;
mod cdcl;
mod clause;
mod config;
mod decision;
mod glue;
mod load;
mod model;
mod prop;
mod schedule;
mod simplify;
mod state;
