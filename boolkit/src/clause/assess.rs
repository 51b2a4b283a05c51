//! Clause assessment: turning a freshly learnt clause's LBD into tier placement.
use crate::glue::compute_glue;
use crate::lit::Lit;
use crate::prop::ImplGraph;

use super::db::Tier;
use super::header::ClauseHeader;

/// Assess a newly learned clause and build its header.
///
/// This is called while the clause is still in conflict, so the computed glue level is one
/// higher than it will be after backtracking, when the clause becomes asserting (spec §4.5).
pub fn assess_learned_clause(impl_graph: &ImplGraph, lits: &[Lit]) -> ClauseHeader {
    let glue = compute_glue(impl_graph, lits).saturating_sub(1).max(1);

    let mut header = ClauseHeader::new();
    header.set_glue(glue);
    header.set_tier(select_tier(glue));
    header
}

/// Compute the tier for a redundant clause with a given glue level (spec §4.6).
fn select_tier(glue: usize) -> Tier {
    if glue <= 2 {
        Tier::Core
    } else if glue <= 6 {
        Tier::Mid
    } else {
        Tier::Local
    }
}
