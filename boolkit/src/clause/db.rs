//! Database for long clauses: tiered storage plus the garbage-ratio compaction trigger.
use super::alloc::{ClauseAlloc, ClauseRef};
use super::header::ClauseHeader;
use crate::lit::Lit;

/// Partitions of the clause database.
///
/// Long clauses are partitioned into 4 [`Tier`]s, following the approach described by Chanseok
/// Oh in ["Between SAT and UNSAT: The Fundamental Difference in CDCL
/// SAT"](https://doi.org/10.1007/978-3-319-24318-4_23), section 4.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tier {
    Irred,
    Core,
    Mid,
    Local,
}

impl Tier {
    pub const fn count() -> usize {
        4
    }

    fn index(self) -> usize {
        match self {
            Tier::Irred => 0,
            Tier::Core => 1,
            Tier::Mid => 2,
            Tier::Local => 3,
        }
    }
}

/// Database for long (3+ literal) clauses.
///
/// Removal of clauses from `clauses` and `by_tier` can be delayed: deleted entries are skipped
/// lazily wherever they're iterated, and are swept out for good the next time that tier's list
/// is rebuilt (`clause::reduce`) or the arena is compacted (`clause::gc`).
#[derive(Default)]
pub struct ClauseDb {
    /// Every live-or-recently-deleted long clause, in creation order. Compaction
    /// (`clause::gc::collect_garbage_now`) is the only place entries are removed from this list,
    /// which is also why checkpoint/rollback (spec §4.9) defers compaction while a checkpoint is
    /// outstanding: `clauses.len()` at checkpoint time has to stay meaningful until rollback.
    pub clauses: Vec<ClauseRef>,
    by_tier: [Vec<ClauseRef>; 4],
    count_by_tier: [usize; 4],
}

impl ClauseDb {
    /// Add a long clause to the database.
    pub fn add_clause(&mut self, alloc: &mut ClauseAlloc, header: ClauseHeader, lits: &[Lit]) -> ClauseRef {
        let tier = header.tier();
        let cref = alloc.add_clause(header, lits);

        self.clauses.push(cref);
        self.by_tier[tier.index()].push(cref);
        self.count_by_tier[tier.index()] += 1;

        cref
    }

    /// Change the tier of a long clause. A no-op if already of that tier.
    pub fn set_tier(&mut self, alloc: &mut ClauseAlloc, cref: ClauseRef, tier: Tier) {
        let old_tier = alloc.header(cref).tier();
        if old_tier != tier {
            self.count_by_tier[old_tier.index()] -= 1;
            self.count_by_tier[tier.index()] += 1;
            alloc.header_mut(cref).set_tier(tier);
            self.by_tier[tier.index()].push(cref);
        }
    }

    /// Delete a long clause from the database.
    pub fn delete_clause(&mut self, alloc: &mut ClauseAlloc, cref: ClauseRef) {
        let header = alloc.header_mut(cref);
        debug_assert!(!header.deleted(), "delete_clause for already deleted clause");
        header.set_deleted(true);
        self.count_by_tier[header.tier().index()] -= 1;
        alloc.account_deleted(cref);
    }

    /// The number of live long clauses of a given tier.
    pub fn count_by_tier(&self, tier: Tier) -> usize {
        self.count_by_tier[tier.index()]
    }

    /// Total number of live long clauses (irredundant + learnt).
    pub fn count(&self) -> usize {
        self.count_by_tier.iter().sum()
    }

    /// Live clause refs of a given tier (may require the caller to skip deleted entries that
    /// haven't been swept yet -- use [`ClauseDb::live_by_tier`] for a pre-filtered view).
    pub fn by_tier(&self, tier: Tier) -> &[ClauseRef] {
        &self.by_tier[tier.index()]
    }

    pub(crate) fn by_tier_mut(&mut self, tier: Tier) -> &mut Vec<ClauseRef> {
        &mut self.by_tier[tier.index()]
    }

    pub(crate) fn set_by_tier(&mut self, tier: Tier, refs: Vec<ClauseRef>) {
        self.count_by_tier[tier.index()] = refs.len();
        self.by_tier[tier.index()] = refs;
    }

    /// Live (non-deleted) clause refs of a tier.
    pub fn live_by_tier<'a>(&'a self, alloc: &'a ClauseAlloc, tier: Tier) -> impl Iterator<Item = ClauseRef> + 'a {
        self.by_tier[tier.index()]
            .iter()
            .copied()
            .filter(move |&cref| !alloc.header(cref).deleted())
    }

    /// Snapshot position for checkpoint/rollback: the number of long clauses added so far.
    pub fn checkpoint(&self) -> usize {
        self.clauses.len()
    }

    /// Undo every long clause added after `checkpoint` (spec §4.9).
    ///
    /// The clause arena itself is append-only (see `clause::alloc`), so the underlying storage
    /// for rolled-back clauses isn't reclaimed here; it becomes ordinary garbage the next
    /// compaction pass sweeps up, same as any other deleted clause.
    pub fn rollback_to(&mut self, alloc: &mut ClauseAlloc, checkpoint: usize) {
        use rustc_hash::FxHashSet;

        if checkpoint >= self.clauses.len() {
            return;
        }

        for &cref in &self.clauses[checkpoint..] {
            if !alloc.header(cref).deleted() {
                self.delete_clause(alloc, cref);
            }
        }
        self.clauses.truncate(checkpoint);

        let kept: FxHashSet<ClauseRef> = self.clauses.iter().copied().collect();
        for tier_refs in self.by_tier.iter_mut() {
            tier_refs.retain(|cref| kept.contains(cref));
        }
    }
}
