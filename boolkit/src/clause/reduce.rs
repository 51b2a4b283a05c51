//! Learnt-clause database reduction (spec §4.6).
use super::alloc::ClauseAlloc;
use super::db::{ClauseDb, Tier};
use crate::prop::{ImplGraph, Trail, Watchlists};

/// Mark every clause currently used as a propagation reason, so reduction never deletes one.
fn mark_reasons(alloc: &mut ClauseAlloc, trail: &Trail, impl_graph: &ImplGraph) {
    for &lit in trail.trail() {
        if let crate::prop::Reason::Long(cref) = impl_graph.reason(lit.var()) {
            alloc.header_mut(*cref).set_mark(true);
        }
    }
}

/// Reduce the learnt-clause database.
///
/// Gathers every redundant (non-`Irred`) clause, sorts by `(deletable, LBD desc, activity asc)`
/// and deletes the worse half whose LBD is above 2 and that isn't currently a reason. A clause
/// selected for deletion that hasn't been `protected` yet survives once (its `protected` flag is
/// set instead); a clause that is already `protected` is deleted and the flag is irrelevant from
/// then on, since the clause is gone.
pub fn reduce_learnts(
    db: &mut ClauseDb,
    alloc: &mut ClauseAlloc,
    watchlists: &mut Watchlists,
    trail: &Trail,
    impl_graph: &ImplGraph,
) {
    mark_reasons(alloc, trail, impl_graph);

    let mut candidates: Vec<_> = [Tier::Core, Tier::Mid, Tier::Local]
        .iter()
        .flat_map(|&tier| db.live_by_tier(alloc, tier).collect::<Vec<_>>())
        .filter(|&cref| !alloc.header(cref).is_glue() && !alloc.header(cref).mark())
        .collect();

    candidates.sort_unstable_by(|&a, &b| {
        let ha = alloc.header(a);
        let hb = alloc.header(b);
        hb.glue()
            .cmp(&ha.glue())
            .then(ha.activity().partial_cmp(&hb.activity()).unwrap())
    });

    let to_delete = candidates.len() / 2;

    for &cref in candidates.iter().take(to_delete) {
        let header = alloc.header_mut(cref);
        if header.protected() {
            header.set_protected(false);
            watchlists.detach(cref, alloc.clause(cref).lits());
            db.delete_clause(alloc, cref);
        } else {
            header.set_protected(true);
        }
    }

    // Clear the reason marks set above.
    for &lit in trail.trail() {
        if let crate::prop::Reason::Long(cref) = impl_graph.reason(lit.var()) {
            alloc.header_mut(*cref).set_mark(false);
        }
    }

    // Sweep dead refs out of the per-tier lists so future scans stay cheap.
    for &tier in &[Tier::Core, Tier::Mid, Tier::Local] {
        let live: Vec<_> = db.live_by_tier(alloc, tier).collect();
        db.set_by_tier(tier, live);
    }
}
