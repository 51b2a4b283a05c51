//! Solver configuration.

/// Configurable parameters used during solving (spec §4.6, §4.5).
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Multiplicative decay for the VSIDS decision heuristic.
    pub vsids_decay: f32,

    /// Multiplicative decay for clause activities.
    pub clause_activity_decay: f32,

    /// Ratio of wasted to total arena words that triggers clause-arena compaction.
    pub garbage_ratio: f32,

    /// Length of the moving-average window over recently learnt clauses' LBDs, used to decide
    /// whether to restart.
    pub restart_lbd_queue_len: usize,

    /// Length of the moving-average window over trail size at conflict time, used to decide
    /// whether to block a restart.
    pub restart_trail_queue_len: usize,

    /// `f_rst`: a restart fires when the short-term LBD average exceeds the long-term average
    /// scaled by this factor.
    pub restart_lbd_factor: f32,

    /// `b_rst`: a pending restart is blocked when the current trail is longer than the long-term
    /// trail average scaled by this factor.
    pub blocking_restart_trail_factor: f32,

    /// Minimum number of conflicts observed before blocking restarts is considered.
    pub blocking_restart_min_conflicts: u64,

    /// `RC1`: initial number of learnt conflicts before the first scheduled reduction.
    pub reduce_init_conflicts: u64,

    /// `RC2` increment added to the reduction threshold after each reduction.
    pub reduce_inc: u64,

    /// Minimum number of learnt clauses below which reduction is skipped entirely.
    pub reduce_min_learnts: usize,

    /// `K`: clauses no larger than this are eligible for on-the-fly binary resolution
    /// minimization during conflict analysis.
    pub binary_minimization_max_size: usize,

    /// `L`: clauses with LBD no larger than this are eligible for on-the-fly binary resolution
    /// minimization during conflict analysis.
    pub binary_minimization_max_lbd: usize,

    /// How many decisions elapse between polls of an external cancellation/budget check.
    pub cancel_poll_interval: u64,

    /// Whether the decision heuristic occasionally picks a random unassigned variable instead of
    /// the VSIDS maximum.
    pub use_random_phase: bool,

    /// Probability (0.0 to 1.0) of a random decision when `use_random_phase` is set.
    pub random_decision_probability: f32,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            vsids_decay: 0.95,
            clause_activity_decay: 0.999,
            garbage_ratio: 0.5,
            restart_lbd_queue_len: 50,
            restart_trail_queue_len: 5000,
            restart_lbd_factor: 0.8,
            blocking_restart_trail_factor: 1.4,
            blocking_restart_min_conflicts: 10000,
            reduce_init_conflicts: 2000,
            reduce_inc: 300,
            reduce_min_learnts: 1000,
            binary_minimization_max_size: 30,
            binary_minimization_max_lbd: 6,
            cancel_poll_interval: 1000,
            use_random_phase: false,
            random_decision_probability: 0.02,
        }
    }
}
