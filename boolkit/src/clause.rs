//! Clause storage: the arena, the tiered database, and per-clause metadata.
pub mod activity;
pub mod alloc;
pub mod assess;
pub mod db;
pub mod gc;
pub mod header;
pub mod reduce;

pub use activity::{bump_clause, decay_clause_activities, ClauseActivity};
pub use alloc::{Clause, ClauseAlloc, ClauseRef};
pub use assess::assess_learned_clause;
pub use db::{ClauseDb, Tier};
pub use header::ClauseHeader;
