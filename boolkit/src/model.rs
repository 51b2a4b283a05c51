//! Satisfying-assignment snapshot.
use crate::lit::{Lit, Var};
use crate::prop::Assignment;

/// Snapshot of a satisfying assignment.
///
/// Whenever the solver's state is `Sat` this is kept up to date with the current [`Assignment`].
#[derive(Default, Clone)]
pub struct Model {
    assignment: Vec<Option<bool>>,
}

impl Model {
    /// Full variable assignment of the model. Only valid while the solver state is `Sat`.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Value of a variable in the model. Only valid while the solver state is `Sat`.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.assignment[var.index()]
    }

    /// Whether a literal is true in the model. Only valid while the solver state is `Sat`.
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }
}

/// Snapshot the current (complete) assignment into `model`, called when the search finds the
/// formula satisfiable.
pub fn extract_model(model: &mut Model, assignment: &Assignment) {
    model.assignment.clear();
    model.assignment.extend_from_slice(assignment.assignment());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: isize) -> Lit {
        Lit::from_dimacs(n)
    }

    #[test]
    fn snapshot_mirrors_assignment() {
        let mut assignment = Assignment::new(3);
        assignment.assign_lit(lit(1));
        assignment.assign_lit(lit(-2));

        let mut model = Model::default();
        extract_model(&mut model, &assignment);

        assert!(model.lit_is_true(lit(1)));
        assert!(model.lit_is_true(lit(2)) == false);
        assert_eq!(model.var_value(lit(3).var()), None);
    }
}
