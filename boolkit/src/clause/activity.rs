//! Clause activity bumping, decay, and rescaling.
use super::alloc::{ClauseAlloc, ClauseRef};
use super::db::ClauseDb;
use crate::config::SolverConfig;

/// Global metadata used for bumping and decaying clause activities.
///
/// Individual clause activities live in the clause's header; this tracks the shared bump amount
/// and decay factor, mirroring how VSIDS variable activity is bumped/decayed (`decision::vsids`).
pub struct ClauseActivity {
    bump: f32,
    inv_decay: f32,
}

impl Default for ClauseActivity {
    fn default() -> ClauseActivity {
        ClauseActivity {
            bump: 1.0,
            inv_decay: 1.0 / SolverConfig::default().clause_activity_decay,
        }
    }
}

/// Rescale activities if any value exceeds this value.
fn rescale_limit() -> f32 {
    f32::MAX / 16.0
}

impl ClauseActivity {
    pub fn set_decay(&mut self, decay: f32) {
        assert!(decay < 1.0);
        assert!(decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay;
    }

    /// Increase a clause's activity, rescaling every activity in the database if it overflows.
    pub fn bump_clause(&mut self, alloc: &mut ClauseAlloc, db: &ClauseDb, cref: ClauseRef) {
        let header = alloc.header_mut(cref);
        let activity = header.activity() + self.bump;
        header.set_activity(activity);

        if activity > rescale_limit() {
            self.rescale(alloc, db);
        }
    }

    /// Decay the shared bump amount, rescaling if it grows too large.
    pub fn decay(&mut self, alloc: &mut ClauseAlloc, db: &ClauseDb) {
        self.bump *= self.inv_decay;
        if self.bump >= rescale_limit() {
            self.rescale(alloc, db);
        }
    }

    fn rescale(&mut self, alloc: &mut ClauseAlloc, db: &ClauseDb) {
        let rescale_factor = 1.0 / rescale_limit();
        for &cref in db.clauses.iter() {
            let header = alloc.header_mut(cref);
            if !header.deleted() {
                let activity = header.activity() * rescale_factor;
                header.set_activity(activity);
            }
        }
        self.bump *= rescale_factor;
    }
}

/// Bump a learnt clause's activity using the shared activity state.
pub fn bump_clause(activity: &mut ClauseActivity, alloc: &mut ClauseAlloc, db: &ClauseDb, cref: ClauseRef) {
    activity.bump_clause(alloc, db, cref);
}

/// Decay all clause activities after a conflict.
pub fn decay_clause_activities(activity: &mut ClauseActivity, alloc: &mut ClauseAlloc, db: &ClauseDb) {
    activity.decay(alloc, db);
}
