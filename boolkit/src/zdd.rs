//! Zero-suppressed decision diagrams: a hash-consed representation of families of finite sets
//! of variables, with a memoized algebra over them (spec §4.10).
//!
//! Nodes are triples `(var, hi, lo)` interned in a unique table so that structurally equal
//! families always share the same node id (canonicity). The zero-suppression rule collapses a
//! `(var, hi, lo)` triple to plain `lo` whenever `hi` is the empty family, so a variable never
//! appears in the diagram unless some set in the family actually uses it.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

/// An interned ZDD node. Opaque outside this module; compare by equality for "same family".
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeId(u32);

/// The empty family (no sets at all), i.e. the ZDD "0" terminal.
pub const BOTTOM: NodeId = NodeId(0);
/// The family containing only the empty set, i.e. the ZDD "1" terminal.
pub const TOP: NodeId = NodeId(1);

struct Node {
    var: u32,
    hi: NodeId,
    lo: NodeId,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
enum BinOp {
    Union,
    Intersection,
    Difference,
    Join,
    Meet,
}

/// A ZDD manager over a fixed number of variables, numbered `0..n_vars`.
///
/// All nodes and memo tables live here; [`NodeId`]s from one `ZddBase` are meaningless in
/// another. There is no reclamation: nodes and memo entries accumulate for the manager's
/// lifetime, matching the unique-table discipline of the solver's clause arena (spec §4.10).
pub struct ZddBase {
    n_vars: u32,
    nodes: Vec<Node>,
    unique: FxHashMap<(u32, NodeId, NodeId), NodeId>,
    bin_cache: FxHashMap<(BinOp, NodeId, NodeId), NodeId>,
}

impl ZddBase {
    /// Create a manager for `n_vars` variables, numbered `0..n_vars`.
    pub fn new(n_vars: u32) -> ZddBase {
        ZddBase {
            n_vars,
            nodes: vec![],
            unique: FxHashMap::default(),
            bin_cache: FxHashMap::default(),
        }
    }

    /// Number of variables this manager was created for.
    pub fn var_count(&self) -> u32 {
        self.n_vars
    }

    /// The empty family.
    pub fn bottom(&self) -> NodeId {
        BOTTOM
    }

    /// The family containing only the empty set.
    pub fn top(&self) -> NodeId {
        TOP
    }

    /// The family `{ {v} }` containing a single singleton set.
    pub fn elementary(&mut self, v: u32) -> NodeId {
        assert!(v < self.n_vars, "variable {} out of range for {} variables", v, self.n_vars);
        self.make_node(v, TOP, BOTTOM)
    }

    /// The family of every subset of `0..n_vars`: the power set.
    pub fn tautology(&mut self) -> NodeId {
        let mut result = TOP;
        for v in (0..self.n_vars).rev() {
            result = self.make_node(v, result, result);
        }
        result
    }

    fn is_terminal(node: NodeId) -> bool {
        node == BOTTOM || node == TOP
    }

    fn top_var(&self, node: NodeId) -> u32 {
        if Self::is_terminal(node) {
            self.n_vars
        } else {
            self.nodes[node.0 as usize].var
        }
    }

    fn hi(&self, node: NodeId) -> NodeId {
        self.nodes[node.0 as usize].hi
    }

    fn lo(&self, node: NodeId) -> NodeId {
        self.nodes[node.0 as usize].lo
    }

    /// Split `node` by whether it branches on `v`, returning `(hi, lo)` as if it did.
    fn split(&self, node: NodeId, v: u32) -> (NodeId, NodeId) {
        if self.top_var(node) == v {
            (self.hi(node), self.lo(node))
        } else {
            (BOTTOM, node)
        }
    }

    /// Intern `(var, hi, lo)`, applying the zero-suppression rule.
    fn make_node(&mut self, var: u32, hi: NodeId, lo: NodeId) -> NodeId {
        if hi == BOTTOM {
            return lo;
        }
        if let Some(&id) = self.unique.get(&(var, hi, lo)) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32 + 2);
        self.nodes.push(Node { var, hi, lo });
        self.unique.insert((var, hi, lo), id);
        id
    }

    /// The sets present in either family.
    pub fn union(&mut self, a: NodeId, b: NodeId) -> NodeId {
        if a == b {
            return a;
        }
        if a == BOTTOM {
            return b;
        }
        if b == BOTTOM {
            return a;
        }
        self.bin_op(BinOp::Union, a, b)
    }

    /// The sets present in both families.
    pub fn intersection(&mut self, a: NodeId, b: NodeId) -> NodeId {
        if a == b {
            return a;
        }
        if a == BOTTOM || b == BOTTOM {
            return BOTTOM;
        }
        self.bin_op(BinOp::Intersection, a, b)
    }

    /// The sets present in `a` but not in `b`.
    pub fn difference(&mut self, a: NodeId, b: NodeId) -> NodeId {
        if a == BOTTOM || a == b {
            return BOTTOM;
        }
        if b == BOTTOM {
            return a;
        }
        self.bin_op(BinOp::Difference, a, b)
    }

    /// The family `{ x ∪ y | x ∈ a, y ∈ b }` (the Cartesian product of element-wise unions).
    pub fn join(&mut self, a: NodeId, b: NodeId) -> NodeId {
        if a == BOTTOM || b == BOTTOM {
            return BOTTOM;
        }
        if a == TOP {
            return b;
        }
        if b == TOP {
            return a;
        }
        self.bin_op(BinOp::Join, a, b)
    }

    /// The family `{ x ∩ y | x ∈ a, y ∈ b }` (the Cartesian product of element-wise
    /// intersections).
    pub fn meet(&mut self, a: NodeId, b: NodeId) -> NodeId {
        if a == BOTTOM || b == BOTTOM {
            return BOTTOM;
        }
        if a == TOP || b == TOP {
            return TOP;
        }
        self.bin_op(BinOp::Meet, a, b)
    }

    fn bin_op(&mut self, op: BinOp, a: NodeId, b: NodeId) -> NodeId {
        let key = if matches!(op, BinOp::Union | BinOp::Intersection | BinOp::Join | BinOp::Meet) && b.0 < a.0 {
            (op, b, a)
        } else {
            (op, a, b)
        };
        if let Some(&id) = self.bin_cache.get(&key) {
            return id;
        }

        let v = self.top_var(a).min(self.top_var(b));
        let (a1, a0) = self.split(a, v);
        let (b1, b0) = self.split(b, v);

        let result = match op {
            BinOp::Union => {
                let hi = self.union(a1, b1);
                let lo = self.union(a0, b0);
                self.make_node(v, hi, lo)
            }
            BinOp::Intersection => {
                let hi = self.intersection(a1, b1);
                let lo = self.intersection(a0, b0);
                self.make_node(v, hi, lo)
            }
            BinOp::Difference => {
                let hi = self.difference(a1, b1);
                let lo = self.difference(a0, b0);
                self.make_node(v, hi, lo)
            }
            BinOp::Join => {
                let a1b1 = self.join(a1, b1);
                let a1b0 = self.join(a1, b0);
                let a0b1 = self.join(a0, b1);
                let hi_partial = self.union(a1b1, a1b0);
                let hi = self.union(hi_partial, a0b1);
                let lo = self.join(a0, b0);
                self.make_node(v, hi, lo)
            }
            BinOp::Meet => {
                let hi = self.meet(a1, b1);
                let a0b0 = self.meet(a0, b0);
                let a0b1 = self.meet(a0, b1);
                let a1b0 = self.meet(a1, b0);
                let lo_partial = self.union(a0b0, a0b1);
                let lo = self.union(lo_partial, a1b0);
                self.make_node(v, hi, lo)
            }
        };

        self.bin_cache.insert(key, result);
        result
    }

    /// The family of every `k`-element subset of `a`'s variable support (the set of variables
    /// appearing anywhere in `a`), regardless of which combinations of them `a` itself contains.
    ///
    /// Given the three singletons `{0}`, `{1}`, `{2}`, `choose` picks 2-combinations of the
    /// *variables* `{0,1,2}`, producing `{0,1}`, `{0,2}`, `{1,2}` — not 2-element members of the
    /// input family, of which there are none here.
    pub fn choose(&mut self, a: NodeId, k: u32) -> NodeId {
        let support = self.support(a);
        let mut memo = FxHashMap::default();
        self.choose_vars(&support, 0, k, &mut memo)
    }

    fn support(&self, node: NodeId) -> Vec<u32> {
        let mut vars = rustc_hash::FxHashSet::default();
        let mut visited = rustc_hash::FxHashSet::default();
        self.support_rec(node, &mut vars, &mut visited);
        let mut vars: Vec<u32> = vars.into_iter().collect();
        vars.sort_unstable();
        vars
    }

    fn support_rec(
        &self,
        node: NodeId,
        vars: &mut rustc_hash::FxHashSet<u32>,
        visited: &mut rustc_hash::FxHashSet<NodeId>,
    ) {
        if Self::is_terminal(node) || !visited.insert(node) {
            return;
        }
        let n = &self.nodes[node.0 as usize];
        vars.insert(n.var);
        self.support_rec(n.hi, vars, visited);
        self.support_rec(n.lo, vars, visited);
    }

    fn choose_vars(
        &mut self,
        vars: &[u32],
        i: usize,
        k: u32,
        memo: &mut FxHashMap<(usize, u32), NodeId>,
    ) -> NodeId {
        if k == 0 {
            return TOP;
        }
        if i >= vars.len() {
            return BOTTOM;
        }
        if let Some(&id) = memo.get(&(i, k)) {
            return id;
        }
        let hi = self.choose_vars(vars, i + 1, k - 1, memo);
        let lo = self.choose_vars(vars, i + 1, k, memo);
        let result = self.make_node(vars[i], hi, lo);
        memo.insert((i, k), result);
        result
    }

    /// Number of sets encoded by the family rooted at `node`.
    pub fn count_sets(&self, node: NodeId) -> u64 {
        let mut memo = FxHashMap::default();
        self.count_sets_memo(node, &mut memo)
    }

    fn count_sets_memo(&self, node: NodeId, memo: &mut FxHashMap<NodeId, u64>) -> u64 {
        if node == BOTTOM {
            return 0;
        }
        if node == TOP {
            return 1;
        }
        if let Some(&count) = memo.get(&node) {
            return count;
        }
        let count = self.count_sets_memo(self.hi(node), memo) + self.count_sets_memo(self.lo(node), memo);
        memo.insert(node, count);
        count
    }

    /// Number of distinct (non-terminal) nodes reachable from `node`.
    pub fn count_nodes(&self, node: NodeId) -> usize {
        let mut seen = rustc_hash::FxHashSet::default();
        self.count_nodes_rec(node, &mut seen);
        seen.len()
    }

    fn count_nodes_rec(&self, node: NodeId, seen: &mut rustc_hash::FxHashSet<NodeId>) {
        if Self::is_terminal(node) || !seen.insert(node) {
            return;
        }
        self.count_nodes_rec(self.hi(node), seen);
        self.count_nodes_rec(self.lo(node), seen);
    }

    /// Every set in the family rooted at `node`, each sorted in ascending variable order.
    pub fn sets(&self, node: NodeId) -> Vec<Vec<u32>> {
        let mut out = vec![];
        let mut path = vec![];
        self.sets_rec(node, &mut path, &mut out);
        out
    }

    fn sets_rec(&self, node: NodeId, path: &mut Vec<u32>, out: &mut Vec<Vec<u32>>) {
        if node == BOTTOM {
            return;
        }
        if node == TOP {
            out.push(path.clone());
            return;
        }
        let var = self.nodes[node.0 as usize].var;
        self.sets_rec(self.lo(node), path, out);
        path.push(var);
        self.sets_rec(self.hi(node), path, out);
        path.pop();
    }

    /// Build a family from an explicit list of sets, deduplicating members within each set.
    pub fn from_sets(&mut self, sets: &[&[u32]]) -> NodeId {
        let mut result = BOTTOM;
        for set in sets {
            let mut sorted: Vec<u32> = set.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            let single = self.from_one_set(&sorted);
            result = self.union(result, single);
        }
        result
    }

    fn from_one_set(&mut self, sorted_vars: &[u32]) -> NodeId {
        let mut node = TOP;
        for &v in sorted_vars.iter().rev() {
            node = self.make_node(v, node, BOTTOM);
        }
        node
    }

    /// Render every set in the family as `{v1,v2,...}`, concatenated with no separators, in the
    /// order [`ZddBase::sets`] would enumerate them.
    pub fn print_sets(&self, node: NodeId) -> String {
        let mut out = String::new();
        for set in self.sets(node) {
            out.push('{');
            for (i, v) in set.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write!(out, "{}", v).expect("writing to a String never fails");
            }
            out.push('}');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_sets(base: &ZddBase, node: NodeId) -> Vec<Vec<u32>> {
        let mut sets = base.sets(node);
        sets.sort();
        sets
    }

    #[test]
    fn elementary_is_a_singleton_family() {
        let mut base = ZddBase::new(3);
        let e = base.elementary(1);
        assert_eq!(base.count_sets(e), 1);
        assert_eq!(sorted_sets(&base, e), vec![vec![1]]);
    }

    #[test]
    fn tautology_is_the_power_set() {
        let mut base = ZddBase::new(3);
        let all = base.tautology();
        assert_eq!(base.count_sets(all), 8);
        assert_eq!(
            sorted_sets(&base, all),
            vec![
                vec![],
                vec![0],
                vec![0, 1],
                vec![0, 1, 2],
                vec![0, 2],
                vec![1],
                vec![1, 2],
                vec![2],
            ]
        );
    }

    #[test]
    fn choose_two_of_three_elementaries() {
        let mut base = ZddBase::new(3);
        let e0 = base.elementary(0);
        let e1 = base.elementary(1);
        let e2 = base.elementary(2);
        let union = base.union(base.union(e0, e1), e2);
        let picked = base.choose(union, 2);
        assert_eq!(base.count_sets(picked), 3);
        assert_eq!(
            sorted_sets(&base, picked),
            vec![vec![0, 1], vec![0, 2], vec![1, 2]]
        );
    }

    #[test]
    fn canonicity_same_family_same_node() {
        let mut base = ZddBase::new(3);
        let e0 = base.elementary(0);
        let e1 = base.elementary(1);
        let built_one_way = base.union(e0, e1);
        let built_another_way = base.union(e1, e0);
        assert_eq!(built_one_way, built_another_way);
    }

    #[test]
    fn union_intersection_difference_on_worked_example() {
        // X = {{1,2,3},{3,4},{5}}, Y = {{0,2,3},{3,4},{6}} over 7 variables.
        let mut base = ZddBase::new(7);
        let x = base.from_sets(&[&[1, 2, 3], &[3, 4], &[5]]);
        let y = base.from_sets(&[&[0, 2, 3], &[3, 4], &[6]]);

        let intersection = base.intersection(x, y);
        assert_eq!(sorted_sets(&base, intersection), vec![vec![3, 4]]);

        let union = base.union(x, y);
        assert_eq!(base.count_sets(union), 5);

        let difference = base.difference(x, y);
        assert_eq!(sorted_sets(&base, difference), vec![vec![1, 2, 3], vec![5]]);
    }

    #[test]
    fn join_on_worked_example_has_nine_sets() {
        let mut base = ZddBase::new(7);
        let x = base.from_sets(&[&[1, 2, 3], &[3, 4], &[5]]);
        let y = base.from_sets(&[&[0, 2, 3], &[3, 4], &[6]]);
        let join = base.join(x, y);
        assert_eq!(base.count_sets(join), 9);
    }

    #[test]
    fn meet_on_worked_example_has_four_sets() {
        let mut base = ZddBase::new(7);
        let x = base.from_sets(&[&[1, 2, 3], &[3, 4], &[5]]);
        let y = base.from_sets(&[&[0, 2, 3], &[3, 4], &[6]]);
        let meet = base.meet(x, y);
        assert_eq!(
            sorted_sets(&base, meet),
            vec![vec![], vec![3], vec![2, 3], vec![3, 4]]
        );
    }

    #[test]
    fn join_with_top_is_identity() {
        let mut base = ZddBase::new(4);
        let x = base.from_sets(&[&[0, 1], &[2]]);
        let top = base.top();
        assert_eq!(base.join(x, top), x);
    }

    #[test]
    fn union_with_bottom_is_identity_and_annihilates_under_intersection() {
        let mut base = ZddBase::new(4);
        let x = base.from_sets(&[&[0, 1], &[2]]);
        let bottom = base.bottom();
        assert_eq!(base.union(x, bottom), x);
        assert_eq!(base.intersection(x, bottom), bottom);
    }

    #[test]
    fn print_sets_matches_choose_example() {
        let mut base = ZddBase::new(3);
        let e0 = base.elementary(0);
        let e1 = base.elementary(1);
        let e2 = base.elementary(2);
        let union = base.union(base.union(e0, e1), e2);
        let picked = base.choose(union, 2);
        assert_eq!(base.print_sets(picked), "{1,2}{0,2}{0,1}");
    }

    #[test]
    fn count_nodes_on_join_of_two_elementaries() {
        let mut base = ZddBase::new(2);
        let e0 = base.elementary(0);
        let e1 = base.elementary(1);
        let join = base.join(e0, e1);
        assert_eq!(base.count_nodes(join), 2);
        assert_eq!(sorted_sets(&base, join), vec![vec![0, 1]]);
    }
}
