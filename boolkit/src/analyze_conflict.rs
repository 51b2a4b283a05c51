//! Learns a new clause by analyzing a conflict (spec §4.5).
use std::mem::swap;

use crate::binary::BinaryClauses;
use crate::clause::{ClauseAlloc, ClauseRef};
use crate::config::SolverConfig;
use crate::decision::Vsids;
use crate::glue::compute_glue;
use crate::lit::{Lit, LitIdx, Var};
use crate::prop::{Conflict, ImplGraph, Reason, Trail};

/// Temporaries for conflict analysis, reused across conflicts to avoid reallocating.
#[derive(Default)]
pub struct AnalyzeConflict {
    /// The learned clause after analysis finishes.
    clause: Vec<Lit>,
    /// Number of literals in the current clause at the current (conflict) level.
    current_level_count: usize,
    /// Variables currently present in the clause being built.
    var_flags: Vec<bool>,
    /// Entries to clean in `var_flags` once analysis finishes.
    to_clean: Vec<Var>,
    /// Long clauses involved in the conflict, for activity bumping.
    involved: Vec<ClauseRef>,
    /// Stack for recursive minimization.
    stack: Vec<Lit>,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_flags.resize(count, false);
    }

    /// The learned clause.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }

    /// Long clauses involved in the conflict.
    pub fn involved(&self) -> &[ClauseRef] {
        &self.involved
    }
}

/// Learns a new clause by analyzing a conflict using first-UIP resolution plus recursive
/// minimization, then decays VSIDS activity.
///
/// Returns the lowest decision level that makes the learned clause asserting.
pub fn analyze_conflict(
    analyze: &mut AnalyzeConflict,
    vsids: &mut Vsids,
    alloc: &ClauseAlloc,
    impl_graph: &ImplGraph,
    trail: &Trail,
    binary: &BinaryClauses,
    config: &SolverConfig,
    conflict: Conflict,
) -> usize {
    analyze.clause.clear();
    analyze.involved.clear();
    analyze.current_level_count = 0;

    if trail.current_level() == 0 {
        // Conflict with no decisions: the formula is unsatisfiable, generate the empty clause.
        return 0;
    }

    let conflict_lits = conflict.lits(alloc);

    for &lit in conflict_lits {
        add_literal(analyze, vsids, impl_graph, trail, lit);
    }

    if let Conflict::Long(cref) = conflict {
        analyze.involved.push(cref);
    }

    // To get rid of all but one literal of the current level, we resolve the clause with the
    // reason for those literals. The correct order for this is reverse chronological.
    for &lit in trail.trail().iter().rev() {
        let lit_present = &mut analyze.var_flags[lit.index()];
        if !*lit_present {
            continue;
        }
        *lit_present = false;
        analyze.current_level_count -= 1;

        if analyze.current_level_count == 0 {
            // `lit` is the last literal of the current level present in the clause, so the
            // resulting clause asserts `!lit`; keep it in position 0.
            analyze.clause.push(!lit);
            let end = analyze.clause.len() - 1;
            analyze.clause.swap(0, end);
            break;
        }

        let reason = *impl_graph.reason(lit.var());
        let lits: Vec<Lit> = reason.lits(alloc).to_vec();

        for reason_lit in lits {
            add_literal(analyze, vsids, impl_graph, trail, reason_lit);
        }

        if let Reason::Long(cref) = reason {
            analyze.involved.push(cref);
        }
    }

    minimize_clause(analyze, impl_graph, alloc);

    for var in analyze.to_clean.drain(..) {
        analyze.var_flags[var.index()] = false;
    }

    if analyze.clause.len() <= config.binary_minimization_max_size
        && compute_glue(impl_graph, &analyze.clause) <= config.binary_minimization_max_lbd
    {
        minimize_with_binary_clauses(analyze, binary);
    }

    // Find the highest-level literal besides the asserted one and move it into position 1, so
    // the watchlist invariant isn't violated after backtracking.
    let mut backtrack_to = 0;

    if analyze.clause.len() > 1 {
        let (prefix, rest) = analyze.clause.split_at_mut(2);
        let lit_1 = &mut prefix[1];
        backtrack_to = impl_graph.level(lit_1.var());
        for lit in rest.iter_mut() {
            let lit_level = impl_graph.level(lit.var());
            if lit_level > backtrack_to {
                backtrack_to = lit_level;
                swap(lit_1, lit);
            }
        }
    }

    vsids.decay();

    backtrack_to
}

/// Binary resolution step (spec §4.5), applied to small, low-LBD learnt clauses.
///
/// Drops any literal made redundant by a binary clause on `¬first` (the asserting literal):
/// if `(¬first ∨ x)` is a binary clause and `x` already appears in the clause, then whenever
/// `first` is false `x` is forced true regardless of the rest of the clause, so `x` adds nothing
/// and can be removed.
fn minimize_with_binary_clauses(analyze: &mut AnalyzeConflict, binary: &BinaryClauses) {
    if analyze.clause.len() < 2 {
        return;
    }
    let first = analyze.clause[0];
    let implied = binary.implied(first);
    analyze.clause.retain(|&lit| lit == first || !implied.contains(&lit));
}

/// Add a literal to the current clause being built.
fn add_literal(
    analyze: &mut AnalyzeConflict,
    vsids: &mut Vsids,
    impl_graph: &ImplGraph,
    trail: &Trail,
    lit: Lit,
) {
    let lit_level = impl_graph.level(lit.var());
    // No need to add literals set by unit clauses or already present.
    if lit_level > 0 && !analyze.var_flags[lit.index()] {
        vsids.bump(lit.var());

        analyze.var_flags[lit.index()] = true;
        if lit_level == trail.current_level() {
            analyze.current_level_count += 1;
        } else {
            analyze.clause.push(lit);
            analyze.to_clean.push(lit.var());
        }
    }
}

/// A Bloom filter of decision levels.
///
/// Uses a 32-bit word (vs. the teacher's 64-bit one) since that's the narrowest width that still
/// keeps false-positive rates low for the clause sizes this crate is tuned for; see DESIGN.md.
#[derive(Default)]
struct LevelAbstraction {
    bits: u32,
}

impl LevelAbstraction {
    pub fn add(&mut self, level: usize) {
        self.bits |= 1 << (level % 32)
    }

    pub fn test(&self, level: usize) -> bool {
        self.bits & (1 << (level % 32)) != 0
    }
}

/// Performs recursive clause minimization.
///
/// **Note:** requires `AnalyzeConflict`'s `var_flags` to be set for exactly the variables of the
/// unminimized clause. This also sets more `var_flags`, but lists them in `to_clean`.
///
/// This routine removes redundant literals of the learned clause: those already implied by other
/// literals of the clause. It does so by performing a DFS in the implication graph (following
/// edges in reverse) for each literal apart from the asserting one. The search doesn't expand
/// literals already known to be implied by literals of the clause. When a decision literal that
/// is not in the clause is found, the literal under test is not redundant.
///
/// Two optimizations: stopping the search as soon as a literal at a decision level not present in
/// the clause is found (checked approximately via [`LevelAbstraction`]), and not re-expanding
/// literals already found redundant by an earlier DFS.
fn minimize_clause(analyze: &mut AnalyzeConflict, impl_graph: &ImplGraph, alloc: &ClauseAlloc) {
    let mut involved_levels = LevelAbstraction::default();
    for &lit in analyze.clause.iter() {
        involved_levels.add(impl_graph.level(lit.var()));
    }

    // We always keep the first (asserted) literal; only scan from index 1.
    let mut keep = vec![true; analyze.clause.len()];

    'next_lit: for i in 1..analyze.clause.len() {
        let lit = analyze.clause[i];

        if impl_graph.reason(lit.var()) == &Reason::Unit {
            continue;
        }

        analyze.stack.clear();
        analyze.stack.push(!lit);

        let top = analyze.to_clean.len();

        while let Some(lit) = analyze.stack.pop() {
            let reason = *impl_graph.reason(lit.var());
            let lits = reason.lits(alloc);

            for &reason_lit in lits {
                let reason_level = impl_graph.level(reason_lit.var());

                if !analyze.var_flags[reason_lit.index()] && reason_level > 0 {
                    if impl_graph.reason(reason_lit.var()) == &Reason::Unit
                        || !involved_levels.test(reason_level)
                    {
                        for lit in analyze.to_clean.drain(top..) {
                            analyze.var_flags[lit.index()] = false;
                        }
                        continue 'next_lit;
                    } else {
                        analyze.var_flags[reason_lit.index()] = true;
                        analyze.to_clean.push(reason_lit.var());
                        analyze.stack.push(!reason_lit);
                    }
                }
            }
        }

        keep[i] = false;
    }

    let mut iter = keep.iter();
    analyze.clause.retain(|_| *iter.next().unwrap());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prop::{enqueue_assignment, Assignment};

    fn lit(n: isize) -> Lit {
        Lit::from_dimacs(n)
    }

    #[test]
    fn binary_resolution_drops_literal_implied_by_first() {
        let mut analyze = AnalyzeConflict::default();
        analyze.clause = vec![lit(1), lit(2), lit(3)];

        let mut binary = BinaryClauses::new();
        binary.set_var_count(4);
        // (¬1 ∨ 2): whenever lit(1) is false, lit(2) is forced true regardless of the rest of
        // the clause, so it's redundant here.
        binary.add_binary_clause([lit(-1), lit(2)]);

        minimize_with_binary_clauses(&mut analyze, &binary);
        assert_eq!(analyze.clause(), &[lit(1), lit(3)]);
    }

    #[test]
    fn binary_resolution_keeps_clause_with_no_matching_binary_clause() {
        let mut analyze = AnalyzeConflict::default();
        analyze.clause = vec![lit(1), lit(2), lit(3)];

        let mut binary = BinaryClauses::new();
        binary.set_var_count(4);

        minimize_with_binary_clauses(&mut analyze, &binary);
        assert_eq!(analyze.clause(), &[lit(1), lit(2), lit(3)]);
    }

    #[test]
    fn unit_level_conflict_yields_empty_clause() {
        let mut analyze = AnalyzeConflict::default();
        analyze.set_var_count(2);
        let mut vsids = Vsids::new(2);
        let alloc = ClauseAlloc::new();
        let impl_graph = ImplGraph::new(2);
        let trail = Trail::new();
        let mut binary = BinaryClauses::new();
        binary.set_var_count(2);
        let config = SolverConfig::default();

        let level = analyze_conflict(
            &mut analyze,
            &mut vsids,
            &alloc,
            &impl_graph,
            &trail,
            &binary,
            &config,
            Conflict::Binary([lit(1), lit(2)]),
        );
        assert_eq!(level, 0);
        assert!(analyze.clause().is_empty());
    }

    #[test]
    fn first_uip_with_one_decision() {
        let mut analyze = AnalyzeConflict::default();
        analyze.set_var_count(3);
        let mut vsids = Vsids::new(3);
        let alloc = ClauseAlloc::new();
        let mut impl_graph = ImplGraph::new(3);
        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new();
        let mut binary = BinaryClauses::new();
        binary.set_var_count(3);
        let config = SolverConfig::default();

        trail.new_decision_level();
        enqueue_assignment(&mut assignment, &mut trail, &mut impl_graph, lit(1), Reason::Unit);
        enqueue_assignment(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            lit(2),
            Reason::Binary([lit(-1)]),
        );

        let level = analyze_conflict(
            &mut analyze,
            &mut vsids,
            &alloc,
            &impl_graph,
            &trail,
            &binary,
            &config,
            Conflict::Binary([lit(-2), lit(3)]),
        );
        assert_eq!(level, 0);
        assert_eq!(analyze.clause(), &[lit(-2)]);
    }
}
