//! Compute glue levels of clauses.
//!
//! The glue level of a propagating clause is the number of distinct decision levels of the
//! clause's variables. This is also called the literal block distance (LBD). For each clause the
//! smallest glue level observed is used as an indicator of how useful that clause is (spec §3,
//! §4.5).
use rustc_hash::FxHashSet;

use crate::lit::Lit;
use crate::prop::ImplGraph;

/// Compute the glue level (LBD) of a clause.
pub fn compute_glue(impl_graph: &ImplGraph, lits: &[Lit]) -> usize {
    let mut levels = FxHashSet::default();
    levels.reserve(lits.len());

    for &lit in lits {
        levels.insert(impl_graph.level(lit.var()));
    }

    levels.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::Var;

    #[test]
    fn counts_distinct_levels() {
        let mut impl_graph = ImplGraph::new(4);
        impl_graph.set_level_for_test(Var::from_index(0), 1);
        impl_graph.set_level_for_test(Var::from_index(1), 1);
        impl_graph.set_level_for_test(Var::from_index(2), 2);
        impl_graph.set_level_for_test(Var::from_index(3), 3);

        let lits = [
            Lit::from_var(Var::from_index(0), false),
            Lit::from_var(Var::from_index(1), true),
            Lit::from_var(Var::from_index(2), false),
            Lit::from_var(Var::from_index(3), false),
        ];

        assert_eq!(compute_glue(&impl_graph, &lits), 3);
    }
}
