//! Scheduling of restarts and clause-database reduction (spec §4.6).
//!
//! Replaces the teacher's Luby-sequence restart scheduler with the Glucose-style scheme the spec
//! calls for: bounded moving-average queues over recent learnt-clause LBDs and trail lengths, plus
//! an `RC1`/`RC2` geometric reduction schedule (see DESIGN.md for the swap).
use std::collections::VecDeque;

use crate::config::SolverConfig;

/// A fixed-capacity FIFO that tracks the running sum of its contents, for O(1) moving averages.
struct BoundedQueue {
    values: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl BoundedQueue {
    fn new(capacity: usize) -> BoundedQueue {
        BoundedQueue {
            values: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
        }
    }

    fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        self.values.push_back(value);
        self.sum += value;
    }

    fn full(&self) -> bool {
        self.values.len() == self.capacity
    }

    fn average(&self) -> f64 {
        self.sum / self.values.len() as f64
    }

    fn clear(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Restart and reduction scheduling, driven by conflict statistics (spec §4.6).
pub struct Schedule {
    conflicts: u64,
    restarts: u64,
    global_lbd_sum: f64,
    global_lbd_count: u64,
    lbd_queue: BoundedQueue,
    trail_queue: BoundedQueue,
    /// `RC2`: number of conflicts that must elapse (scaled by `cur_restart`) before the next
    /// reduction.
    next_reduce_conflicts: u64,
    /// `RC1`: how many reductions' worth of `next_reduce_conflicts` have elapsed.
    cur_restart: u64,
}

impl Schedule {
    pub fn new(config: &SolverConfig) -> Schedule {
        Schedule {
            conflicts: 0,
            restarts: 0,
            global_lbd_sum: 0.0,
            global_lbd_count: 0,
            lbd_queue: BoundedQueue::new(config.restart_lbd_queue_len),
            trail_queue: BoundedQueue::new(config.restart_trail_queue_len),
            next_reduce_conflicts: config.reduce_init_conflicts,
            cur_restart: 1,
        }
    }

    pub fn conflicts(&self) -> u64 {
        self.conflicts
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Record a conflict's LBD and the trail length at the time of the conflict.
    pub fn record_conflict(&mut self, lbd: usize, trail_len: usize) {
        self.conflicts += 1;
        self.global_lbd_sum += lbd as f64;
        self.global_lbd_count += 1;
        self.lbd_queue.push(lbd as f64);
        self.trail_queue.push(trail_len as f64);
    }

    fn global_lbd_average(&self) -> f64 {
        self.global_lbd_sum / self.global_lbd_count.max(1) as f64
    }

    /// Whether a blocking restart should suppress the upcoming restart decision, given the
    /// current trail length. Clears the LBD queue as a side effect when it fires, matching
    /// Glucose's implementation.
    pub fn block_restart(&mut self, config: &SolverConfig, trail_len: usize) -> bool {
        if self.conflicts < config.blocking_restart_min_conflicts || !self.trail_queue.full() {
            return false;
        }
        if trail_len as f64 > config.blocking_restart_trail_factor as f64 * self.trail_queue.average() {
            self.lbd_queue.clear();
            true
        } else {
            false
        }
    }

    /// Whether the search should restart (cancel to level 0) right now.
    pub fn should_restart(&self, config: &SolverConfig) -> bool {
        self.lbd_queue.full()
            && self.lbd_queue.average() * config.restart_lbd_factor as f64 > self.global_lbd_average()
    }

    pub fn record_restart(&mut self) {
        self.restarts += 1;
        self.lbd_queue.clear();
    }

    /// Whether it's time to reduce the learnt-clause database.
    pub fn should_reduce(&self, config: &SolverConfig, learnt_count: usize) -> bool {
        learnt_count > config.reduce_min_learnts && self.conflicts >= self.cur_restart * self.next_reduce_conflicts
    }

    /// Advance the `RC1`/`RC2` schedule after a reduction pass.
    pub fn record_reduce(&mut self, config: &SolverConfig) {
        self.cur_restart = self.conflicts / self.next_reduce_conflicts + 1;
        self.next_reduce_conflicts += config.reduce_inc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restarts_when_recent_lbd_exceeds_global_average() {
        let mut config = SolverConfig::default();
        config.restart_lbd_queue_len = 3;
        let mut schedule = Schedule::new(&config);

        for _ in 0..20 {
            schedule.record_conflict(10, 5);
        }
        assert!(!schedule.should_restart(&config));

        for _ in 0..3 {
            schedule.record_conflict(2, 5);
        }
        assert!(schedule.should_restart(&config));
    }

    #[test]
    fn reduce_schedule_advances_geometrically() {
        let mut config = SolverConfig::default();
        config.reduce_init_conflicts = 10;
        config.reduce_inc = 5;
        config.reduce_min_learnts = 0;
        let mut schedule = Schedule::new(&config);

        for _ in 0..10 {
            schedule.record_conflict(3, 3);
        }
        assert!(schedule.should_reduce(&config, 1));
        schedule.record_reduce(&config);
        assert!(!schedule.should_reduce(&config, 1));

        for _ in 0..15 {
            schedule.record_conflict(3, 3);
        }
        assert!(schedule.should_reduce(&config, 1));
    }
}
