//! Decision heuristics.
pub mod vsids;

pub use vsids::Vsids;

use crate::config::SolverConfig;
use crate::lit::Lit;
use crate::prop::{enqueue_assignment, Assignment, ImplGraph, Reason, Trail};

/// A tiny, fast, non-cryptographic PRNG (xorshift32) for the optional random-polarity decisions.
///
/// Keeping this local avoids a `rand` dependency in library code for a single coin flip per
/// decision; `rand` is still used by the test suite (see `Cargo.toml`).
pub struct DecisionRng {
    state: u32,
}

impl DecisionRng {
    pub fn new(seed: u32) -> DecisionRng {
        DecisionRng {
            state: seed.max(1),
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// A value uniformly distributed in `[0.0, 1.0)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() as f32) / (u32::max_value() as f32 + 1.0)
    }
}

/// Make a decision and enqueue it, branching on the highest-VSIDS-activity unassigned variable
/// with phase saving (spec §4.3).
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision(
    config: &SolverConfig,
    rng: &mut DecisionRng,
    vsids: &mut Vsids,
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
) -> bool {
    let decision_var = loop {
        match vsids.next() {
            None => return false,
            Some(var) => {
                if assignment.var_value(var).is_none() {
                    break var;
                }
                // Stale heap entry for an already-assigned variable: drop it. It is reinserted
                // by `Vsids::make_available` when backtracking unassigns it again.
            }
        }
    };

    let negative = if config.use_random_phase && rng.next_f32() < config.random_decision_probability
    {
        rng.next_u32() & 1 == 1
    } else {
        assignment.last_var_value(decision_var)
    };

    let decision = Lit::from_var(decision_var, negative);

    trail.new_decision_level();
    enqueue_assignment(assignment, trail, impl_graph, decision, Reason::Unit);

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decides_until_exhausted() {
        let config = SolverConfig::default();
        let mut rng = DecisionRng::new(1);
        let mut vsids = Vsids::new(3);
        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new();
        let mut impl_graph = ImplGraph::new(3);

        let mut decisions = 0;
        while make_decision(
            &config,
            &mut rng,
            &mut vsids,
            &mut assignment,
            &mut trail,
            &mut impl_graph,
        ) {
            decisions += 1;
            assert!(decisions <= 3);
        }
        assert_eq!(decisions, 3);
        assert_eq!(trail.current_level(), 3);
    }
}
