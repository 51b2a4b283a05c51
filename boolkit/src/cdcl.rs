//! Conflict-driven clause learning: the top-level search loop (spec §4.8).
use crate::analyze_conflict::analyze_conflict;
use crate::assumptions::{enqueue_assumption, EnqueueAssumption};
use crate::clause::{assess_learned_clause, bump_clause, decay_clause_activities, gc, reduce, Tier};
use crate::decision::make_decision;
use crate::glue::compute_glue;
use crate::model::extract_model;
use crate::prop::{backtrack, enqueue_assignment, propagate_binary, propagate_long, restart, Conflict, Reason};
use crate::simplify::simplify;
use crate::solver::{SolveBudget, Solver};
use crate::state::SatState;

/// Whether the search loop stopped because it reached a conclusive answer or ran out of budget.
pub enum SearchOutcome {
    Complete,
    BudgetExhausted,
}

/// Run the CDCL search loop until the formula is decided or `budget` runs out.
pub fn search(solver: &mut Solver, budget: &mut SolveBudget) -> SearchOutcome {
    let mut conflicts_since_poll = 0u64;

    loop {
        if solver.sat_state != SatState::Unknown {
            return SearchOutcome::Complete;
        }

        match find_conflict(solver) {
            Ok(()) => {
                extract_model(&mut solver.model, &solver.assignment);
                solver.sat_state = SatState::Sat;
                return SearchOutcome::Complete;
            }
            Err(FoundConflict::Assumption) => {
                solver.sat_state = SatState::UnsatUnderAssumptions;
                return SearchOutcome::Complete;
            }
            Err(FoundConflict::Conflict(conflict)) => {
                learn_from_conflict(solver, conflict);
                conflicts_since_poll += 1;
            }
        }

        if solver.sat_state != SatState::Unknown {
            return SearchOutcome::Complete;
        }

        let check_deadline = conflicts_since_poll >= solver.config.cancel_poll_interval;
        if check_deadline {
            conflicts_since_poll = 0;
        }
        if budget.exhausted(solver.schedule.conflicts(), check_deadline) {
            return SearchOutcome::BudgetExhausted;
        }
    }
}

enum FoundConflict {
    Conflict(Conflict),
    Assumption,
}

impl From<Conflict> for FoundConflict {
    fn from(conflict: Conflict) -> FoundConflict {
        FoundConflict::Conflict(conflict)
    }
}

/// Propagate to a fixpoint, returning the first conflict encountered, if any.
fn propagate_to_fixpoint(solver: &mut Solver) -> Result<(), Conflict> {
    let Solver {
        assignment,
        trail,
        impl_graph,
        watchlists,
        alloc,
        binary,
        ..
    } = solver;

    while let Some(lit) = trail.pop_queue() {
        propagate_binary(assignment, trail, impl_graph, binary, lit)?;
        propagate_long(assignment, trail, impl_graph, watchlists, alloc, lit)?;
    }
    Ok(())
}

/// Propagate, enqueue assumptions and make decisions until either a conflict is found or every
/// variable is assigned.
fn find_conflict(solver: &mut Solver) -> Result<(), FoundConflict> {
    loop {
        propagate_to_fixpoint(solver)?;

        if solver.trail.current_level() == 0 && solver.checkpoints.is_empty() {
            let Solver {
                simplifier,
                assignment,
                trail,
                db,
                alloc,
                watchlists,
                binary,
                ..
            } = solver;
            simplify(simplifier, assignment, trail, db, alloc, watchlists, binary);
        }

        let Solver {
            assumptions,
            assignment,
            trail,
            impl_graph,
            ..
        } = solver;
        match enqueue_assumption(assumptions, assignment, trail, impl_graph) {
            EnqueueAssumption::Enqueued => continue,
            EnqueueAssumption::Conflict => return Err(FoundConflict::Assumption),
            EnqueueAssumption::Done => (),
        }

        let Solver {
            config,
            rng,
            vsids,
            assignment,
            trail,
            impl_graph,
            ..
        } = solver;
        if !make_decision(config, rng, vsids, assignment, trail, impl_graph) {
            return Ok(());
        }
    }
}

/// Learn a clause from `conflict`, backtrack, and update restart/reduce/compaction schedules.
fn learn_from_conflict(solver: &mut Solver, conflict: Conflict) {
    let trail_len_at_conflict = solver.trail.trail().len();

    let Solver {
        analyze,
        vsids,
        alloc,
        impl_graph,
        trail,
        binary,
        config,
        ..
    } = solver;
    let backtrack_to = analyze_conflict(analyze, vsids, alloc, impl_graph, trail, binary, config, conflict);
    let lbd = compute_glue(impl_graph, analyze.clause());

    let Solver {
        analyze,
        clause_activity,
        alloc,
        db,
        ..
    } = solver;
    for &cref in analyze.involved() {
        bump_clause(clause_activity, alloc, db, cref);
    }
    decay_clause_activities(clause_activity, alloc, db);

    let Solver {
        assignment,
        trail,
        vsids,
        ..
    } = solver;
    backtrack(assignment, trail, vsids, backtrack_to);

    let clause = solver.analyze.clause().to_vec();

    let reason = match clause.len() {
        0 => {
            solver.sat_state = SatState::Unsat;
            return;
        }
        1 => Reason::Unit,
        2 => {
            solver.binary.add_binary_clause([clause[0], clause[1]]);
            Reason::Binary([clause[1]])
        }
        _ => {
            let header = assess_learned_clause(&solver.impl_graph, &clause);
            let cref = solver.db.add_clause(&mut solver.alloc, header, &clause);
            solver.watchlists.watch_clause(cref, [clause[0], clause[1]]);
            Reason::Long(cref)
        }
    };

    let Solver {
        assignment,
        trail,
        impl_graph,
        ..
    } = solver;
    enqueue_assignment(assignment, trail, impl_graph, clause[0], reason);

    solver.vsids.decay();
    solver.schedule.record_conflict(lbd, trail_len_at_conflict);

    let config = solver.config.clone();

    let blocked = solver.schedule.block_restart(&config, solver.trail.trail().len());
    if !blocked && solver.schedule.should_restart(&config) {
        let Solver {
            assignment,
            trail,
            vsids,
            assumptions,
            ..
        } = solver;
        restart(assignment, trail, vsids, assumptions.assumption_levels());
        solver.schedule.record_restart();
    }

    let learnt_count = solver.db.count_by_tier(Tier::Core) + solver.db.count_by_tier(Tier::Mid) + solver.db.count_by_tier(Tier::Local);
    if solver.schedule.should_reduce(&config, learnt_count) {
        let Solver {
            db,
            alloc,
            watchlists,
            trail,
            impl_graph,
            ..
        } = solver;
        reduce::reduce_learnts(db, alloc, watchlists, trail, impl_graph);
        solver.schedule.record_reduce(&config);
    }

    if solver.checkpoints.is_empty() {
        let Solver {
            db,
            alloc,
            watchlists,
            trail,
            impl_graph,
            ..
        } = solver;
        gc::collect_garbage(db, alloc, watchlists, trail, impl_graph, config.garbage_ratio);
    }
}
