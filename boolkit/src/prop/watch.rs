//! Watchlists to detect clauses that became unit.
//!
//! Each (long) clause has always two watches pointing to it. The watches are kept in the
//! watchlists of two different literals of the clause. Whenever the watches are moved to
//! different literals the literals of the clause are permuted so the watched literals are in
//! position 0 and 1.
//!
//! When a clause is not unit under the current assignment, the watched literals point at two
//! non-false literals. When a clause is unit and thus propagating, the true literal is watched
//! and in position 0, the other watched literal is the one with the largest decision level and
//! kept in position 1. When a clause becomes satisfied before becoming unit the watches can be
//! kept as they were.
//!
//! When a literal is assigned false that invariant can be invalidated. This can be detected by
//! scanning the watches of the assigned literal. When the assignment is processed the watches are
//! moved to restore that invariant. Unless there is a conflict, i.e. a clause with no non-false
//! literals, this can always be done. This also finds all clauses that became unit.
//!
//! There is no need to update watchlists on backtracking, as unassigning variables cannot
//! invalidate the invariant.
//!
//! As a further optimization we use blocking literals: each watch stores a literal of the clause
//! different from the watched literal. When that literal is true, the clause is already
//! satisfied, so no watch needs to be updated, without touching the clause database.
use crate::clause::{ClauseAlloc, ClauseDb, ClauseRef, Tier};
use crate::lit::Lit;

/// A watch on a long clause.
#[derive(Copy, Clone)]
pub struct Watch {
    /// Clause which has the referring lit in position 0 or 1.
    pub cref: ClauseRef,
    /// A lit of the clause, different from the referring lit.
    pub blocking: Lit,
}

/// Watchlists to detect clauses that became unit.
#[derive(Default)]
pub struct Watchlists {
    /// Contains only valid data for indices of assigned variables.
    watches: Vec<Vec<Watch>>,
    enabled: bool,
}

impl Watchlists {
    pub fn new() -> Watchlists {
        Watchlists {
            watches: vec![],
            enabled: true,
        }
    }

    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Start watching a clause.
    ///
    /// `lits` have to be the first two literals of the given clause.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        for i in 0..2 {
            let watch = Watch {
                cref,
                blocking: lits[i ^ 1],
            };
            self.watches[(!lits[i]).code()].push(watch);
        }
    }

    /// Return watches for a given literal.
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Make a literal watch a clause.
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.watches[lit.code()].push(watch)
    }

    /// Whether the watchlists are in a consistent, usable state.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disable and clear the watchlists, e.g. while the clause arena is being compacted.
    pub fn disable(&mut self) {
        self.enabled = false;
        for watches in self.watches.iter_mut() {
            watches.clear();
        }
    }

    /// Drop the watches pointing at `cref`, without touching any other clause's.
    ///
    /// Used when a clause is deleted outside of a full reduction pass, so its dangling watches
    /// don't linger until the next rebuild.
    pub fn detach(&mut self, cref: ClauseRef, lits: &[Lit]) {
        if lits.len() < 2 {
            return;
        }
        for &lit in &lits[0..2] {
            let code = (!lit).code();
            self.watches[code].retain(|watch| watch.cref != cref);
        }
    }

    /// Rebuild watches for every live long clause and re-enable the watchlists.
    pub fn rebuild_long(&mut self, alloc: &ClauseAlloc, db: &ClauseDb) {
        for watches in self.watches.iter_mut() {
            watches.clear();
        }

        for &tier in &[Tier::Irred, Tier::Core, Tier::Mid, Tier::Local] {
            for cref in db.live_by_tier(alloc, tier) {
                let lits = alloc.clause(cref).lits();
                if lits.len() >= 2 {
                    self.watch_clause(cref, [lits[0], lits[1]]);
                }
            }
        }

        self.enabled = true;
    }
}
