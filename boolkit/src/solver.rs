//! Public facade: the incremental CDCL SAT solver (spec §4, §6).
use std::io::{self, BufRead, Write};
use std::time::Instant;

use log::info;

use crate::assumptions::{self, set_assumptions, Assumptions, Checkpoint};
use crate::binary::BinaryClauses;
use crate::cdcl::{search, SearchOutcome};
use crate::clause::{ClauseActivity, ClauseAlloc, ClauseDb, Tier};
use crate::cnf::CnfFormula;
use crate::decision::{DecisionRng, Vsids};
use crate::dimacs::{parse_dimacs, write_dimacs};
use crate::error::DimacsError;
use crate::lit::{Lit, Var};
use crate::load::load_clause;
use crate::model::Model;
use crate::prop::{Assignment, ImplGraph, Trail, Watchlists};
use crate::schedule::Schedule;
use crate::simplify::Simplifier;
use crate::state::SatState;
use crate::analyze_conflict::AnalyzeConflict;

/// An incremental CDCL SAT solver.
///
/// Clauses and assumptions can be added and removed between calls to [`Solver::solve`]; see
/// spec §4 for the algorithms backing this.
pub struct Solver {
    pub(crate) config: SolverConfig,
    pub(crate) var_count: usize,
    pub(crate) sat_state: SatState,
    pub(crate) assignment: Assignment,
    pub(crate) trail: Trail,
    pub(crate) impl_graph: ImplGraph,
    pub(crate) vsids: Vsids,
    pub(crate) rng: DecisionRng,
    pub(crate) watchlists: Watchlists,
    pub(crate) binary: BinaryClauses,
    pub(crate) db: ClauseDb,
    pub(crate) alloc: ClauseAlloc,
    pub(crate) clause_activity: ClauseActivity,
    pub(crate) analyze: AnalyzeConflict,
    pub(crate) schedule: Schedule,
    pub(crate) simplifier: Simplifier,
    pub(crate) assumptions: Assumptions,
    pub(crate) model: Model,
    pub(crate) checkpoints: Vec<Checkpoint>,
}

pub use crate::config::SolverConfig;

impl Default for Solver {
    fn default() -> Solver {
        Solver::new()
    }
}

impl Solver {
    /// Create a solver using the default configuration.
    pub fn new() -> Solver {
        Solver::with_config(SolverConfig::default())
    }

    /// Create a solver using an explicit configuration.
    pub fn with_config(config: SolverConfig) -> Solver {
        let mut vsids = Vsids::default();
        vsids.set_decay(config.vsids_decay);

        let mut clause_activity = ClauseActivity::default();
        clause_activity.set_decay(config.clause_activity_decay);

        Solver {
            schedule: Schedule::new(&config),
            config,
            var_count: 0,
            sat_state: SatState::Unknown,
            assignment: Assignment::default(),
            trail: Trail::new(),
            impl_graph: ImplGraph::default(),
            vsids,
            rng: DecisionRng::new(0xd6e8_feb8),
            watchlists: Watchlists::new(),
            binary: BinaryClauses::new(),
            db: ClauseDb::default(),
            alloc: ClauseAlloc::new(),
            clause_activity,
            analyze: AnalyzeConflict::default(),
            simplifier: Simplifier::new(),
            assumptions: Assumptions::default(),
            model: Model::default(),
            checkpoints: vec![],
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Number of variables the solver knows about.
    pub fn num_variables(&self) -> usize {
        self.var_count
    }

    /// Number of irredundant clauses (the formula as given, minus unit clauses which aren't
    /// stored explicitly; see DESIGN.md).
    pub fn num_clauses(&self) -> usize {
        self.db.count_by_tier(Tier::Irred) + self.binary.count()
    }

    fn grow_to(&mut self, count: usize) {
        if count <= self.var_count {
            return;
        }
        self.var_count = count;
        self.assignment.set_var_count(count);
        self.impl_graph.set_var_count(count);
        self.vsids.set_var_count(count);
        self.watchlists.set_var_count(count);
        self.binary.set_var_count(count);
        self.analyze.set_var_count(count);
    }

    /// Add a single fresh variable, returning it.
    pub fn add_variable(&mut self) -> Var {
        let var = Var::from_index(self.var_count);
        self.grow_to(self.var_count + 1);
        var
    }

    /// Add `count` fresh variables.
    pub fn add_variables(&mut self, count: usize) {
        self.grow_to(self.var_count + count);
    }

    /// Add a clause to the formula.
    ///
    /// Grows the variable count to cover every literal in `lits` if needed. Returns `false` iff
    /// the solver is now trivially unsatisfiable (spec §6).
    pub fn add_clause(&mut self, lits: &[Lit]) -> bool {
        if let Some(max_index) = lits.iter().map(|lit| lit.index()).max() {
            self.grow_to(max_index + 1);
        }

        load_clause(
            &mut self.sat_state,
            &mut self.assignment,
            &mut self.trail,
            &mut self.impl_graph,
            &mut self.vsids,
            &mut self.binary,
            &mut self.db,
            &mut self.alloc,
            lits,
        );

        self.sat_state != SatState::Unsat
    }

    /// Add every clause of a formula.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        self.grow_to(formula.var_count());
        for clause in formula.iter() {
            self.add_clause(clause);
        }
    }

    /// Read and add a formula in DIMACS CNF format.
    pub fn add_dimacs_cnf(&mut self, input: impl BufRead) -> Result<(), DimacsError> {
        let formula = parse_dimacs(input)?;
        info!(
            "parsed dimacs formula with {} variables and {} clauses",
            formula.var_count(),
            formula.len()
        );
        self.add_formula(&formula);
        Ok(())
    }

    /// Write the current irredundant formula (long clauses, binary clauses, and level-0 units)
    /// in DIMACS CNF format.
    pub fn write_dimacs(&self, output: impl Write) -> io::Result<()> {
        let mut formula = CnfFormula::new();
        formula.set_var_count(self.var_count);

        for var_index in 0..self.var_count {
            let var = Var::from_index(var_index);
            if let Some(value) = self.assignment.var_value(var) {
                if self.impl_graph.level(var) == 0 {
                    formula.add_clause(Some(Lit::from_var(var, !value)));
                }
            }
        }

        for [lit_0, lit_1] in self.binary.iter() {
            formula.add_clause([lit_0, lit_1].iter().copied());
        }

        for cref in self.db.live_by_tier(&self.alloc, Tier::Irred) {
            formula.add_clause(self.alloc.clause(cref).lits().iter().copied());
        }

        write_dimacs(&formula, output)
    }

    /// Solve the formula under no assumptions, blocking until an answer is found.
    pub fn solve(&mut self) -> SolveResult {
        self.solve_with_budget(&[], &mut SolveBudget::unbounded())
    }

    /// Solve the formula under `assumptions`, blocking until an answer is found.
    pub fn solve_assuming(&mut self, assumptions: &[Lit]) -> SolveResult {
        self.solve_with_budget(assumptions, &mut SolveBudget::unbounded())
    }

    /// Solve the formula under `assumptions`, stopping early if `budget` is exhausted.
    ///
    /// Returns [`SolveResult::Undef`] if the budget ran out before an answer was found; the
    /// search can be resumed by calling this again (with the same or different assumptions).
    pub fn solve_with_budget(&mut self, assumptions: &[Lit], budget: &mut SolveBudget) -> SolveResult {
        if let Some(max_index) = assumptions.iter().map(|lit| lit.index()).max() {
            self.grow_to(max_index + 1);
        }

        set_assumptions(
            &mut self.assumptions,
            &mut self.sat_state,
            &mut self.assignment,
            &mut self.trail,
            &mut self.vsids,
            assumptions,
        );

        match search(self, budget) {
            SearchOutcome::Complete => (),
            SearchOutcome::BudgetExhausted => return SolveResult::Undef,
        }

        match self.sat_state {
            SatState::Sat => SolveResult::Sat,
            SatState::Unsat | SatState::UnsatUnderAssumptions => SolveResult::Unsat,
            SatState::Unknown => SolveResult::Undef,
        }
    }

    /// The satisfying assignment found by the last [`Solver::solve`] call. Only `Some` while the
    /// solver's state is `Sat`.
    pub fn get_model(&self) -> Option<&Model> {
        if self.sat_state == SatState::Sat {
            Some(&self.model)
        } else {
            None
        }
    }

    /// A subset of the assumptions passed to the last solve call that is itself unsatisfiable.
    /// Only `Some` while the solver's state is `UnsatUnderAssumptions`.
    pub fn get_core(&self) -> Option<&[Lit]> {
        if self.sat_state == SatState::UnsatUnderAssumptions {
            Some(self.assumptions.failed_core())
        } else {
            None
        }
    }

    /// Forget all learned clauses and assignments, keeping the original formula (spec §9).
    ///
    /// As a side effect this drops every outstanding checkpoint: `num_variables()` goes back to
    /// 0 as there is no way to replay just the original clauses without the caller re-adding
    /// them.
    pub fn restart(&mut self) {
        *self = Solver::with_config(self.config.clone());
    }

    /// Take a checkpoint of the current (level-0) solver state, to later [`Solver::rollback`] to.
    ///
    /// Returns the depth of the checkpoint stack after pushing, for informational purposes.
    pub fn checkpoint(&mut self) -> usize {
        crate::prop::full_restart(&mut self.assignment, &mut self.trail, &mut self.vsids);
        self.assumptions.full_restart();

        self.checkpoints
            .push(assumptions::checkpoint(self.var_count, &self.trail, &self.db, &self.binary));
        self.checkpoints.len()
    }

    /// Undo every clause, assignment, and variable added since the most recent
    /// [`Solver::checkpoint`].
    ///
    /// Panics if there is no outstanding checkpoint.
    pub fn rollback(&mut self) {
        let checkpoint = self.checkpoints.pop().expect("rollback without a matching checkpoint");
        let var_count = checkpoint.var_count();

        assumptions::rollback(
            &checkpoint,
            &mut self.assignment,
            &mut self.trail,
            &mut self.vsids,
            &mut self.db,
            &mut self.alloc,
            &mut self.binary,
        );

        self.vsids.shrink_to(var_count);
        self.assignment.set_var_count(var_count);
        self.impl_graph.set_var_count(var_count);
        self.binary.set_var_count(var_count);
        self.analyze.set_var_count(var_count);

        self.watchlists.set_var_count(var_count);
        self.watchlists.rebuild_long(&self.alloc, &self.db);

        self.var_count = var_count;
        self.sat_state = SatState::Unknown;
    }

    /// Enable uniform random sign of initial phase for unassigned variables, seeded for
    /// reproducibility (spec §4.3, §6, §9).
    ///
    /// Only affects decisions on variables still unassigned at the time of the next
    /// [`Solver::solve`] call; the same seed always produces the same sequence of coin flips.
    pub fn set_random_phase(&mut self, seed: u32) {
        self.config.use_random_phase = true;
        self.rng = DecisionRng::new(seed);
    }
}

/// The result of a [`Solver::solve`] call.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SolveResult {
    Sat,
    Unsat,
    /// The search was interrupted (by a [`SolveBudget`]) before reaching a conclusive answer.
    Undef,
}

impl SolveResult {
    pub fn is_sat(self) -> bool {
        self == SolveResult::Sat
    }

    pub fn is_unsat(self) -> bool {
        self == SolveResult::Unsat
    }

    pub fn is_undef(self) -> bool {
        self == SolveResult::Undef
    }
}

/// Limits on a single [`Solver::solve_with_budget`] call (spec §6).
///
/// The conflict limit and the cancel predicate are checked after every conflict; the deadline,
/// which needs a system call to evaluate, is only checked every
/// [`SolverConfig::cancel_poll_interval`] conflicts (spec §5).
pub struct SolveBudget {
    conflict_limit: Option<u64>,
    conflicts_at_start: Option<u64>,
    deadline: Option<Instant>,
    cancel: Option<Box<dyn FnMut() -> bool>>,
}

impl SolveBudget {
    /// A budget with no limits at all.
    pub fn unbounded() -> SolveBudget {
        SolveBudget {
            conflict_limit: None,
            conflicts_at_start: None,
            deadline: None,
            cancel: None,
        }
    }

    /// Stop after `limit` additional conflicts.
    pub fn with_conflict_limit(mut self, limit: u64) -> SolveBudget {
        self.conflict_limit = Some(limit);
        self
    }

    /// Stop once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> SolveBudget {
        self.deadline = Some(deadline);
        self
    }

    /// Stop as soon as `cancel` returns `true`.
    pub fn with_cancel_fn(mut self, cancel: impl FnMut() -> bool + 'static) -> SolveBudget {
        self.cancel = Some(Box::new(cancel));
        self
    }

    /// Whether the budget has run out, given the solver's current cumulative conflict count.
    ///
    /// `conflict_limit` is interpreted relative to the count observed on the first call, so it
    /// means "stop after `limit` more conflicts" regardless of how many the solver already had
    /// behind it from earlier incremental `solve` calls.
    ///
    /// Call this after every conflict; pass `check_deadline = true` only every
    /// [`SolverConfig::cancel_poll_interval`] conflicts, since the conflict limit and cancel
    /// predicate are cheap to check per-iteration but the deadline requires a system call.
    pub(crate) fn exhausted(&mut self, conflicts_now: u64, check_deadline: bool) -> bool {
        if let Some(limit) = self.conflict_limit {
            let start = *self.conflicts_at_start.get_or_insert(conflicts_now);
            if conflicts_now.saturating_sub(start) >= limit {
                return true;
            }
        }
        if let Some(cancel) = &mut self.cancel {
            if cancel() {
                return true;
            }
        }
        if check_deadline {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Lit {
        Lit::from_dimacs(n)
    }

    #[test]
    fn solves_small_sat_formula() {
        let mut solver = Solver::new();
        solver.add_clause(&[lit(1), lit(2)]);
        solver.add_clause(&[lit(-1), lit(2)]);
        solver.add_clause(&[lit(-2)]);

        assert_eq!(solver.solve(), SolveResult::Sat);
        let model = solver.get_model().unwrap();
        assert!(model.lit_is_true(lit(-1)));
        assert!(model.lit_is_true(lit(-2)));
    }

    #[test]
    fn detects_unsat() {
        let mut solver = Solver::new();
        solver.add_clause(&[lit(1)]);
        solver.add_clause(&[lit(-1)]);

        assert_eq!(solver.solve(), SolveResult::Unsat);
        assert!(solver.get_model().is_none());
    }

    #[test]
    fn assumptions_yield_core() {
        let mut solver = Solver::new();
        solver.add_clause(&[lit(1), lit(2)]);
        solver.add_clause(&[lit(-1), lit(-2)]);

        assert_eq!(solver.solve_assuming(&[lit(1), lit(2)]), SolveResult::Unsat);
        let core = solver.get_core().unwrap();
        assert!(core.contains(&lit(1)));
        assert!(core.contains(&lit(2)));

        assert_eq!(solver.solve_assuming(&[]), SolveResult::Sat);
    }

    #[test]
    fn checkpoint_rollback_forgets_added_clauses() {
        let mut solver = Solver::new();
        solver.add_clause(&[lit(1), lit(2), lit(3)]);

        solver.checkpoint();
        solver.add_clause(&[lit(-1), lit(-2), lit(4)]);
        assert_eq!(solver.num_clauses(), 2);

        solver.rollback();
        assert_eq!(solver.num_clauses(), 1);

        assert_eq!(solver.solve(), SolveResult::Sat);
    }

    #[test]
    fn checkpoint_rollback_forgets_new_variables() {
        let mut solver = Solver::new();
        solver.add_clause(&[lit(1), lit(2), lit(3)]);
        let var_count_before = solver.num_variables();

        solver.checkpoint();
        solver.add_clause(&[lit(5)]);
        assert!(solver.num_variables() > var_count_before);

        solver.rollback();
        assert_eq!(solver.num_variables(), var_count_before);

        assert_eq!(solver.solve(), SolveResult::Sat);
    }

    #[test]
    fn restart_drops_variables_and_learnt_state() {
        let mut solver = Solver::new();
        solver.add_clause(&[lit(1), lit(2)]);
        assert!(solver.num_variables() > 0);

        solver.restart();
        assert_eq!(solver.num_variables(), 0);
        assert_eq!(solver.num_clauses(), 0);
    }
}
