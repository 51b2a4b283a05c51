//! Propagation of binary clauses.
use crate::binary::BinaryClauses;
use crate::lit::Lit;

use super::{enqueue_assignment, Assignment, Conflict, ImplGraph, Reason, Trail};

/// Propagate all literals implied by the given literal via binary clauses.
///
/// On conflict return the binary clause propagating the conflicting assignment.
pub fn propagate_binary(
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
    binary_clauses: &BinaryClauses,
    lit: Lit,
) -> Result<(), Conflict> {
    for &implied in binary_clauses.implied(lit) {
        if assignment.lit_is_false(implied) {
            return Err(Conflict::Binary([implied, !lit]));
        } else if !assignment.lit_is_true(implied) {
            enqueue_assignment(assignment, trail, impl_graph, implied, Reason::Binary([!lit]));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::Var;

    #[test]
    fn propagates_implied_literal() {
        let mut assignment = Assignment::new(2);
        let mut trail = Trail::new();
        let mut impl_graph = ImplGraph::new(2);
        let mut binary_clauses = BinaryClauses::new();
        binary_clauses.set_var_count(2);
        binary_clauses.add_binary_clause([Lit::from_var(Var::from_index(0), true), Var::from_index(1).positive()]);

        trail.new_decision_level();
        enqueue_assignment(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            Var::from_index(0).positive(),
            Reason::Unit,
        );

        propagate_binary(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            &binary_clauses,
            Var::from_index(0).positive(),
        )
        .unwrap();

        assert!(assignment.lit_is_true(Var::from_index(1).positive()));
    }

    #[test]
    fn detects_conflict() {
        let mut assignment = Assignment::new(2);
        let mut trail = Trail::new();
        let mut impl_graph = ImplGraph::new(2);
        let mut binary_clauses = BinaryClauses::new();
        binary_clauses.set_var_count(2);
        binary_clauses.add_binary_clause([Lit::from_var(Var::from_index(0), true), Lit::from_var(Var::from_index(1), true)]);

        trail.new_decision_level();
        enqueue_assignment(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            Var::from_index(0).positive(),
            Reason::Unit,
        );
        enqueue_assignment(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            Var::from_index(1).positive(),
            Reason::Unit,
        );

        let result = propagate_binary(
            &mut assignment,
            &mut trail,
            &mut impl_graph,
            &binary_clauses,
            Var::from_index(0).positive(),
        );
        assert!(result.is_err());
    }
}
