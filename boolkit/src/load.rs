//! Loading a formula into the solver.
use crate::binary::BinaryClauses;
use crate::clause::{ClauseAlloc, ClauseDb, ClauseHeader, Tier};
use crate::decision::Vsids;
use crate::lit::Lit;
use crate::prop::{enqueue_assignment, full_restart, Assignment, ImplGraph, Reason, Trail};
use crate::state::SatState;

/// Adds a clause to the current formula.
///
/// Removes duplicated literals, ignores tautological clauses (e.g. `x ∨ ¬x ∨ y`), handles empty
/// clauses and dispatches among unit, binary and long clauses (spec §4.8, §7).
///
/// Does not adjust the solver's variable count; that has to be done before calling this.
pub fn load_clause(
    sat_state: &mut SatState,
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
    vsids: &mut Vsids,
    binary: &mut BinaryClauses,
    db: &mut ClauseDb,
    alloc: &mut ClauseAlloc,
    lits: &[Lit],
) {
    match *sat_state {
        SatState::Unsat => return,
        SatState::Sat => *sat_state = SatState::Unknown,
        _ => {}
    }

    // Restart the search when the user adds new clauses.
    full_restart(assignment, trail, vsids);

    let mut lits = lits.to_vec();
    lits.sort_unstable();
    lits.dedup();

    // Detect tautological clauses.
    let mut last = None;
    for &lit in lits.iter() {
        if last == Some(!lit) {
            return;
        }
        last = Some(lit);
    }

    // Remove false literals and drop already-satisfied clauses.
    let mut simplified = Vec::with_capacity(lits.len());
    for &lit in lits.iter() {
        match assignment.lit_value(lit) {
            Some(true) => return,
            Some(false) => (),
            None => simplified.push(lit),
        }
    }

    match simplified[..] {
        [] => *sat_state = SatState::Unsat,
        [lit] => enqueue_assignment(assignment, trail, impl_graph, lit, Reason::Unit),
        [lit_0, lit_1] => binary.add_binary_clause([lit_0, lit_1]),
        _ => {
            let mut header = ClauseHeader::new();
            header.set_tier(Tier::Irred);
            db.add_clause(alloc, header, &simplified);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Lit {
        Lit::from_dimacs(n)
    }

    struct Fixture {
        sat_state: SatState,
        assignment: Assignment,
        trail: Trail,
        impl_graph: ImplGraph,
        vsids: Vsids,
        binary: BinaryClauses,
        db: ClauseDb,
        alloc: ClauseAlloc,
    }

    impl Fixture {
        fn new(var_count: usize) -> Fixture {
            let mut binary = BinaryClauses::new();
            binary.set_var_count(var_count);
            Fixture {
                sat_state: SatState::Unknown,
                assignment: Assignment::new(var_count),
                trail: Trail::new(),
                impl_graph: ImplGraph::new(var_count),
                vsids: Vsids::new(var_count),
                binary,
                db: ClauseDb::default(),
                alloc: ClauseAlloc::new(),
            }
        }

        fn load(&mut self, lits: &[Lit]) {
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
        }
    }

    #[test]
    fn unsat_on_empty_clause() {
        let mut fixture = Fixture::new(10);
        fixture.load(&[]);
        assert_eq!(fixture.sat_state, SatState::Unsat);
    }

    #[test]
    fn unit_clauses() {
        let mut fixture = Fixture::new(10);

        fixture.load(&[lit(1)]);
        assert_eq!(fixture.trail.trail().len(), 1);

        fixture.load(&[lit(3), lit(-3)]); // tautology, ignored
        assert_eq!(fixture.trail.trail().len(), 1);

        fixture.load(&[lit(-2)]);
        assert_eq!(fixture.trail.trail().len(), 2);

        fixture.load(&[lit(1), lit(1)]); // duplicate, already true
        assert_eq!(fixture.trail.trail().len(), 2);
        assert_eq!(fixture.sat_state, SatState::Unknown);

        fixture.load(&[lit(2)]); // conflicts with the unit -2 above
        assert_eq!(fixture.trail.trail().len(), 2);
        assert_eq!(fixture.sat_state, SatState::Unsat);
    }

    #[test]
    fn binary_clauses() {
        let mut fixture = Fixture::new(10);

        fixture.load(&[lit(1), lit(2)]);
        assert_eq!(fixture.binary.count(), 1);

        fixture.load(&[lit(-1), lit(3), lit(3)]);
        assert_eq!(fixture.binary.count(), 2);

        fixture.load(&[lit(4), lit(-4)]); // tautology
        assert_eq!(fixture.binary.count(), 2);
        assert_eq!(fixture.sat_state, SatState::Unknown);
    }

    #[test]
    fn long_clauses() {
        let mut fixture = Fixture::new(10);

        fixture.load(&[lit(1), lit(2), lit(3)]);
        assert_eq!(fixture.db.count_by_tier(Tier::Irred), 1);

        fixture.load(&[lit(-2), lit(3), lit(3), lit(4)]);
        assert_eq!(fixture.db.count_by_tier(Tier::Irred), 2);

        fixture.load(&[lit(4), lit(-5), lit(5), lit(2)]); // tautology on 5
        assert_eq!(fixture.db.count_by_tier(Tier::Irred), 2);
        assert_eq!(fixture.sat_state, SatState::Unknown);
    }
}
