//! Partial assignment and backtracking.
use crate::decision::Vsids;
use crate::lit::{Lit, LitIdx, Var};

use super::{ImplGraph, Reason};

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
    last_value: Vec<bool>,
}

impl Assignment {
    pub fn new(var_count: usize) -> Assignment {
        let mut assignment = Assignment::default();
        assignment.set_var_count(var_count);
        assignment
    }

    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
        self.last_value.resize(count, false);
    }

    /// Current partial assignment as slice.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Value assigned to a variable.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.assignment[var.index()]
    }

    /// Value last assigned to a variable.
    ///
    /// If the variable is currently assigned this returns the previously assigned value. If the
    /// variable was never assigned this returns false.
    pub fn last_var_value(&self, var: Var) -> bool {
        self.last_value[var.index()]
    }

    /// Value assigned to a literal.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|b| b ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_negative())
    }

    pub fn lit_is_unk(&self, lit: Lit) -> bool {
        self.assignment[lit.index()].is_none()
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = Some(lit.is_positive())
    }
}

/// Decision and propagation history.
#[derive(Default)]
pub struct Trail {
    /// Stack of all propagated and all enqueued assignments.
    trail: Vec<Lit>,
    /// Next assignment in trail to propagate.
    queue_head_pos: usize,
    /// Decision levels as trail indices.
    decisions: Vec<LitIdx>,
    /// Number of unit clauses removed from the trail.
    units_removed: usize,
}

impl Trail {
    pub fn new() -> Trail {
        Trail::default()
    }

    /// Return the next assigned literal to propagate.
    pub fn queue_head(&self) -> Option<Lit> {
        self.trail.get(self.queue_head_pos).cloned()
    }

    /// Return the next assigned literal to propagate and remove it from the queue.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        let head = self.queue_head();
        if head.is_some() {
            self.queue_head_pos += 1;
        }
        head
    }

    /// Re-enqueue all assigned literals.
    pub fn reset_queue(&mut self) {
        self.queue_head_pos = 0;
    }

    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Clear the trail.
    ///
    /// This simply removes all entries without performing any backtracking. Can only be called
    /// with no active decisions.
    pub fn clear(&mut self) {
        assert!(self.decisions.is_empty());
        self.units_removed += self.trail.len();
        self.trail.clear();
        self.queue_head_pos = 0;
    }

    /// Start a new decision level.
    ///
    /// Does not enqueue the decision itself.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len() as LitIdx)
    }

    /// Current decision level.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }

    /// The number of assignments at level 0.
    pub fn top_level_assignment_count(&self) -> usize {
        self.decisions
            .get(0)
            .map(|&len| len as usize)
            .unwrap_or(self.trail.len())
            + self.units_removed
    }

    /// Whether all assignments are processed.
    pub fn fully_propagated(&self) -> bool {
        self.queue_head_pos == self.trail.len()
    }
}

/// Enqueues the assignment of true to a literal.
///
/// This updates the assignment, trail and implication graph, but does not perform any
/// propagation. The literal has to be unassigned when calling this.
pub fn enqueue_assignment(
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
    lit: Lit,
    reason: Reason,
) {
    debug_assert!(assignment.lit_value(lit).is_none());

    assignment.assign_lit(lit);
    trail.trail.push(lit);
    impl_graph.set_node(lit.var(), reason, trail.decisions.len());
}

/// Undo all assignments in decision levels deeper than the given level.
pub fn backtrack(assignment: &mut Assignment, trail: &mut Trail, vsids: &mut Vsids, level: usize) {
    if level == trail.decisions.len() {
        return;
    }

    let new_trail_len = trail.decisions[level] as usize;

    trail.queue_head_pos = new_trail_len;
    trail.decisions.truncate(level);

    let trail_end = &trail.trail[new_trail_len..];
    for &lit in trail_end {
        vsids.make_available(lit.var());
        let var_assignment = &mut assignment.assignment[lit.index()];
        assignment.last_value[lit.index()] = *var_assignment == Some(true);
        *var_assignment = None;
    }
    trail.trail.truncate(new_trail_len);
}

/// Undo all decisions down to (and including) those made past `assumption_levels`.
pub fn restart(assignment: &mut Assignment, trail: &mut Trail, vsids: &mut Vsids, assumption_levels: usize) {
    backtrack(assignment, trail, vsids, assumption_levels);
}

/// Undo all decisions and assumptions.
pub fn full_restart(assignment: &mut Assignment, trail: &mut Trail, vsids: &mut Vsids) {
    backtrack(assignment, trail, vsids, 0);
}

/// Undo level-0 (unit) assignments made after `len`.
///
/// Used by checkpoint rollback (spec §4.9) to forget propagations caused by clauses that are
/// themselves being rolled back. Requires no active decision levels (call `full_restart` first).
pub fn truncate_trail(assignment: &mut Assignment, trail: &mut Trail, vsids: &mut Vsids, len: usize) {
    assert!(trail.decisions.is_empty(), "truncate_trail requires decision level 0");

    let trail_end = &trail.trail[len..];
    for &lit in trail_end {
        vsids.make_available(lit.var());
        let var_assignment = &mut assignment.assignment[lit.index()];
        assignment.last_value[lit.index()] = *var_assignment == Some(true);
        *var_assignment = None;
    }
    trail.trail.truncate(len);
    trail.queue_head_pos = trail.queue_head_pos.min(len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::Var;

    #[test]
    fn enqueue_and_backtrack() {
        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new();
        let mut impl_graph = ImplGraph::new(3);
        let mut vsids = Vsids::new(3);

        trail.new_decision_level();
        enqueue_assignment(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            Var::from_index(0).positive(),
            Reason::Unit,
        );
        assert_eq!(trail.current_level(), 1);
        assert!(assignment.lit_is_true(Var::from_index(0).positive()));

        backtrack(&mut assignment, &mut trail, &mut vsids, 0);
        assert!(assignment.lit_is_unk(Var::from_index(0).positive()));
        assert_eq!(trail.current_level(), 0);
    }
}
