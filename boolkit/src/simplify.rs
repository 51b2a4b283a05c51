//! Root-level simplification: drop irredundant clauses satisfied by a top-level assignment, and
//! shrink the rest by their top-level-false literals (spec §4.8).
//!
//! Only [`Tier::Irred`] clauses are touched. Learnt clauses are left alone so shrinking them
//! doesn't require recomputing their LBD or activity bookkeeping.
//!
//! Simplification has to be skipped entirely while a checkpoint is outstanding (see
//! `assumptions::rollback`): shrinking or deleting a clause a checkpoint was taken against would
//! make rollback unable to restore it. The caller (the search loop) is responsible for that
//! deferral; this module only tracks whether the top-level assignment has grown since the last
//! call, to avoid redundant work.
use crate::binary::BinaryClauses;
use crate::clause::{ClauseAlloc, ClauseDb, Tier};
use crate::prop::{Assignment, Trail, Watchlists};

/// Tracks whether the set of root-level assignments has grown since the last simplification pass.
pub struct Simplifier {
    last_trail_len: usize,
}

impl Simplifier {
    pub fn new() -> Simplifier {
        Simplifier { last_trail_len: 0 }
    }

    /// Whether a simplification pass would find anything new to do.
    pub fn pending(&self, trail: &Trail) -> bool {
        trail.trail().len() > self.last_trail_len
    }
}

impl Default for Simplifier {
    fn default() -> Simplifier {
        Simplifier::new()
    }
}

/// Walk the irredundant clauses, dropping those satisfied at level 0 and shrinking the rest by
/// their falsified literals.
pub fn simplify(
    simplifier: &mut Simplifier,
    assignment: &Assignment,
    trail: &Trail,
    db: &mut ClauseDb,
    alloc: &mut ClauseAlloc,
    watchlists: &mut Watchlists,
    binary: &mut BinaryClauses,
) {
    debug_assert_eq!(trail.current_level(), 0, "simplify is only valid at level 0");

    if !simplifier.pending(trail) {
        return;
    }
    simplifier.last_trail_len = trail.trail().len();

    let crefs: Vec<_> = db.by_tier(Tier::Irred).to_vec();
    let mut kept = Vec::with_capacity(crefs.len());

    for cref in crefs {
        if alloc.header(cref).deleted() {
            continue;
        }

        let old_lits = alloc.clause(cref).lits().to_vec();
        let mut satisfied = false;
        let mut new_lits = Vec::with_capacity(old_lits.len());
        for &lit in &old_lits {
            match assignment.lit_value(lit) {
                Some(true) => {
                    satisfied = true;
                    break;
                }
                Some(false) => {}
                None => new_lits.push(lit),
            }
        }

        if satisfied {
            watchlists.detach(cref, &old_lits);
            db.delete_clause(alloc, cref);
            continue;
        }

        if new_lits.len() == old_lits.len() {
            kept.push(cref);
            continue;
        }

        // Cannot shrink to empty or unit after full propagation: an empty clause would already
        // be a conflict, and a unit clause would already have been propagated and dropped above.
        assert!(new_lits.len() >= 2, "fully propagated clause shrank below binary");

        if new_lits.len() == 2 {
            watchlists.detach(cref, &old_lits);
            db.delete_clause(alloc, cref);
            binary.add_binary_clause([new_lits[0], new_lits[1]]);
            continue;
        }

        watchlists.detach(cref, &old_lits);
        {
            let mut clause = alloc.clause_mut(cref);
            clause.lits_mut()[..new_lits.len()].copy_from_slice(&new_lits);
            clause.truncate(new_lits.len());
        }
        watchlists.watch_clause(cref, [new_lits[0], new_lits[1]]);
        kept.push(cref);
    }

    db.set_by_tier(Tier::Irred, kept);
}
