//! Propagation of long clauses.
use crate::clause::ClauseAlloc;
use crate::lit::Lit;

use super::watch::Watch;
use super::{enqueue_assignment, Assignment, Conflict, ImplGraph, Reason, Trail, Watchlists};

/// Propagate all literals implied by long clauses watched by the given literal.
///
/// On conflict return the clause propagating the conflicting assignment.
///
/// Unlike the teacher implementation this scans watchlists with safe indexing instead of raw
/// pointers (see DESIGN.md); the invariants it maintains are otherwise the same ones described in
/// [`crate::prop::watch`].
pub fn propagate_long(
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
    watchlists: &mut Watchlists,
    alloc: &mut ClauseAlloc,
    lit: Lit,
) -> Result<(), Conflict> {
    let mut watches = std::mem::take(watchlists.watched_by_mut(lit));
    let false_lit = !lit;

    let mut index = 0;
    let mut conflict = None;

    while index < watches.len() {
        let watch = watches[index];

        // If the blocking literal is already true, the watched clause is satisfied and we don't
        // even have to look at it.
        if assignment.lit_is_true(watch.blocking) {
            index += 1;
            continue;
        }

        let cref = watch.cref;

        let first = {
            let mut clause = alloc.clause_mut(cref);
            let lits = clause.lits_mut();
            if lits[0] == false_lit {
                lits.swap(0, 1);
            }
            lits[0]
        };

        let new_watch = Watch {
            cref,
            blocking: first,
        };

        if first != watch.blocking && assignment.lit_is_true(first) {
            watches[index] = new_watch;
            index += 1;
            continue;
        }

        // Try to find a non-false unwatched literal to replace the watch on `lit`.
        let replacement = {
            let clause = alloc.clause(cref);
            let lits = clause.lits();
            (2..lits.len()).find(|&i| !assignment.lit_is_false(lits[i]))
        };

        if let Some(i) = replacement {
            let new_watched_lit = {
                let mut clause = alloc.clause_mut(cref);
                let lits = clause.lits_mut();
                lits.swap(1, i);
                lits[1]
            };
            watches.remove(index);
            watchlists.add_watch(!new_watched_lit, new_watch);
            continue;
        }

        // No replacement found: either we're propagating or we have a conflict.
        watches[index] = new_watch;
        index += 1;

        if assignment.lit_is_false(first) {
            conflict = Some(Conflict::Long(cref));
            break;
        }

        enqueue_assignment(assignment, trail, impl_graph, first, Reason::Long(cref));
    }

    *watchlists.watched_by_mut(lit) = watches;

    match conflict {
        Some(conflict) => Err(conflict),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::ClauseHeader;

    fn lit(n: isize) -> Lit {
        Lit::from_dimacs(n)
    }

    #[test]
    fn propagates_unit_from_long_clause() {
        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new();
        let mut impl_graph = ImplGraph::new(3);
        let mut watchlists = Watchlists::new();
        watchlists.set_var_count(3);
        let mut alloc = ClauseAlloc::new();

        let cref = alloc.add_clause(ClauseHeader::new(), &[lit(1), lit(2), lit(3)]);
        watchlists.watch_clause(cref, [lit(1), lit(2)]);

        trail.new_decision_level();
        enqueue_assignment(&mut assignment, &mut trail, &mut impl_graph, lit(-1), Reason::Unit);
        trail.new_decision_level();
        enqueue_assignment(&mut assignment, &mut trail, &mut impl_graph, lit(-2), Reason::Unit);

        propagate_long(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            &mut watchlists,
            &mut alloc,
            lit(-1),
        )
        .unwrap();
        propagate_long(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            &mut watchlists,
            &mut alloc,
            lit(-2),
        )
        .unwrap();

        assert!(assignment.lit_is_true(lit(3)));
    }

    #[test]
    fn detects_conflict_when_all_false() {
        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new();
        let mut impl_graph = ImplGraph::new(3);
        let mut watchlists = Watchlists::new();
        watchlists.set_var_count(3);
        let mut alloc = ClauseAlloc::new();

        let cref = alloc.add_clause(ClauseHeader::new(), &[lit(1), lit(2), lit(3)]);
        watchlists.watch_clause(cref, [lit(1), lit(2)]);

        trail.new_decision_level();
        enqueue_assignment(&mut assignment, &mut trail, &mut impl_graph, lit(-3), Reason::Unit);
        trail.new_decision_level();
        enqueue_assignment(&mut assignment, &mut trail, &mut impl_graph, lit(-2), Reason::Unit);
        trail.new_decision_level();
        enqueue_assignment(&mut assignment, &mut trail, &mut impl_graph, lit(-1), Reason::Unit);

        let result = propagate_long(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            &mut watchlists,
            &mut alloc,
            lit(-1),
        );
        assert!(result.is_err());
    }
}
