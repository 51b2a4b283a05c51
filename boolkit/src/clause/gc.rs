//! Garbage collection (compaction) of the long-clause arena.
use super::alloc::ClauseAlloc;
use super::db::{ClauseDb, Tier};
use crate::prop::{ImplGraph, Reason, Trail, Watchlists};

/// Compact the long-clause arena if enough of it is garbage to be worth reclaiming.
///
/// Amortizes the cost of compaction: it only runs once the wasted fraction of the arena passes
/// `garbage_ratio` (spec §4.1).
pub fn collect_garbage(
    db: &mut ClauseDb,
    alloc: &mut ClauseAlloc,
    watchlists: &mut Watchlists,
    trail: &Trail,
    impl_graph: &mut ImplGraph,
    garbage_ratio: f32,
) {
    if alloc.wasted() as f32 > alloc.buffer_size() as f32 * garbage_ratio {
        collect_garbage_now(db, alloc, watchlists, trail, impl_graph);
    }
}

/// Unconditionally compact the long-clause arena.
///
/// Every other structure that stores a [`super::alloc::ClauseRef`] — the watchlists and the
/// implication graph's reasons for currently-asserted literals — has to be rebuilt against the
/// new refs handed out by [`ClauseAlloc::compact`].
pub fn collect_garbage_now(
    db: &mut ClauseDb,
    alloc: &mut ClauseAlloc,
    watchlists: &mut Watchlists,
    trail: &Trail,
    impl_graph: &mut ImplGraph,
) {
    watchlists.disable();

    let (new_alloc, forward) = alloc.compact(|_| true);
    *alloc = new_alloc;

    let mut new_clauses = vec![];
    let mut new_by_tier: [Vec<_>; Tier::count()] = Default::default();

    for &old_cref in db.clauses.iter() {
        if let Some(new_cref) = forward[old_cref.index()] {
            new_clauses.push(new_cref);
            new_by_tier[alloc.header(new_cref).tier() as usize].push(new_cref);
        }
    }

    for &lit in trail.trail().iter() {
        if let &Reason::Long(old_cref) = impl_graph.reason(lit.var()) {
            let new_cref = forward[old_cref.index()].expect("asserting clause survives compaction");
            impl_graph.update_reason(lit.var(), Reason::Long(new_cref));
        }
    }

    db.clauses = new_clauses;
    for (index, tier) in [Tier::Irred, Tier::Core, Tier::Mid, Tier::Local].iter().enumerate() {
        db.set_by_tier(*tier, std::mem::take(&mut new_by_tier[index]));
    }

    watchlists.rebuild_long(alloc, db);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::header::ClauseHeader;
    use crate::lit::Lit;
    use crate::prop::{Assignment, Watchlists};

    fn clause(v: &[isize]) -> Vec<Lit> {
        v.iter().map(|&n| Lit::from_dimacs(n)).collect()
    }

    #[test]
    fn compaction_drops_deleted_and_preserves_live() {
        let mut alloc = ClauseAlloc::new();
        let mut db = ClauseDb::default();
        let mut watchlists = Watchlists::new();
        let assignment = Assignment::new(0);
        let trail = Trail::new();
        let mut impl_graph = ImplGraph::new(0);

        let a = db.add_clause(&mut alloc, ClauseHeader::new(), &clause(&[1, 2, 3]));
        let b = db.add_clause(&mut alloc, ClauseHeader::new(), &clause(&[4, 5, 6]));
        watchlists.rebuild_long(&alloc, &db);

        db.delete_clause(&mut alloc, a);

        collect_garbage_now(&mut db, &mut alloc, &mut watchlists, &trail, &mut impl_graph);

        assert_eq!(db.clauses.len(), 1);
        assert_eq!(alloc.clause(db.clauses[0]).lits(), clause(&[4, 5, 6]).as_slice());
        assert_eq!(alloc.wasted(), 0);
        let _ = (assignment, b);
    }
}
