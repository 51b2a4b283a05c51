//! Binary clauses.
use crate::lit::Lit;

/// Binary clauses.
///
/// Extends the teacher's structure (see DESIGN.md) with an append-only `log` of every added
/// clause in order, so checkpoint/rollback (spec §4.9) can truncate binary clauses learned after
/// a checkpoint without having to rebuild `by_lit` from scratch.
#[derive(Default)]
pub struct BinaryClauses {
    by_lit: Vec<Vec<Lit>>,
    log: Vec<[Lit; 2]>,
}

impl BinaryClauses {
    pub fn new() -> BinaryClauses {
        BinaryClauses::default()
    }

    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.by_lit.resize(count * 2, vec![]);
    }

    /// Add a binary clause.
    pub fn add_binary_clause(&mut self, lits: [Lit; 2]) {
        for i in 0..2 {
            self.by_lit[(!lits[i]).code()].push(lits[i ^ 1]);
        }
        self.log.push(lits);
    }

    /// Implications of a given literal.
    pub fn implied(&self, lit: Lit) -> &[Lit] {
        &self.by_lit[lit.code()]
    }

    /// Number of binary clauses.
    pub fn count(&self) -> usize {
        self.log.len()
    }

    /// Every binary clause, in the order it was added.
    pub fn iter(&self) -> impl Iterator<Item = [Lit; 2]> + '_ {
        self.log.iter().copied()
    }

    /// Snapshot position for checkpoint/rollback: the number of binary clauses added so far.
    pub fn checkpoint(&self) -> usize {
        self.log.len()
    }

    /// Undo every binary clause added after `checkpoint`.
    pub fn rollback_to(&mut self, checkpoint: usize) {
        for lits in self.log.drain(checkpoint..).collect::<Vec<_>>() {
            for i in 0..2 {
                let list = &mut self.by_lit[(!lits[i]).code()];
                if let Some(pos) = list.iter().rposition(|&l| l == lits[i ^ 1]) {
                    list.remove(pos);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::Lit;

    #[test]
    fn checkpoint_and_rollback() {
        let mut binary = BinaryClauses::new();
        binary.set_var_count(4);

        binary.add_binary_clause([Lit::from_dimacs(1), Lit::from_dimacs(2)]);
        let checkpoint = binary.checkpoint();
        binary.add_binary_clause([Lit::from_dimacs(-3), Lit::from_dimacs(4)]);

        assert_eq!(binary.count(), 2);
        binary.rollback_to(checkpoint);
        assert_eq!(binary.count(), 1);
        assert!(binary.implied(Lit::from_dimacs(3)).is_empty());
        assert_eq!(binary.implied(Lit::from_dimacs(-1)), &[Lit::from_dimacs(2)]);
    }
}
