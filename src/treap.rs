//! An indexed, randomized balanced BST (treap) keyed by `u64`, augmented
//! with subtree size so it supports O(log n) expected rank/select in
//! addition to ordinary insert/remove.
//!
//! This plays the role `include/treap.hpp` plays in the C++ original this
//! crate's behavior was distilled from, but trades `shared_ptr`/`weak_ptr`
//! node links for a `slab`-backed arena addressed by plain indices: every
//! link (parent, left, right) is a `Copy` `usize`, so there is no reference
//! cycle to reason about and no risk of a dangling `next()`/`prev()` walk
//! surviving a structural change it shouldn't.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slab::Slab;

pub(crate) type NodeId = usize;

struct Node<V> {
    key: u64,
    value: V,
    priority: u64,
    size: usize,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

/// A treap mapping `u64` keys (scaled prices) to values (`Level`s), ordered
/// ascending by key. Priorities are drawn from a PRNG seeded once per book so
/// that replays with the same seed produce an identical tree shape.
pub(crate) struct Treap<V> {
    arena: Slab<Node<V>>,
    root: Option<NodeId>,
    rng: StdRng,
}

impl<V> Treap<V> {
    pub fn new(seed: u64) -> Self {
        Self {
            arena: Slab::new(),
            root: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.root.map_or(0, |r| self.size_of(Some(r)))
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn size_of(&self, node: Option<NodeId>) -> usize {
        node.map_or(0, |n| self.arena[n].size)
    }

    fn update(&mut self, node: NodeId) {
        let (left, right) = (self.arena[node].left, self.arena[node].right);
        let size = 1 + self.size_of(left) + self.size_of(right);
        self.arena[node].size = size;
    }

    fn set_parent(&mut self, node: Option<NodeId>, parent: Option<NodeId>) {
        if let Some(n) = node {
            self.arena[n].parent = parent;
        }
    }

    /// Splits the subtree rooted at `node` into `(< key, == key, > key)`.
    fn split_by_key(
        &mut self,
        node: Option<NodeId>,
        key: u64,
    ) -> (Option<NodeId>, Option<NodeId>, Option<NodeId>) {
        let Some(n) = node else {
            return (None, None, None);
        };
        if self.arena[n].key < key {
            let right = self.arena[n].right;
            let (left, mid, right) = self.split_by_key(right, key);
            self.arena[n].right = left;
            self.set_parent(left, Some(n));
            self.update(n);
            (Some(n), mid, right)
        } else if self.arena[n].key > key {
            let left = self.arena[n].left;
            let (left, mid, right) = self.split_by_key(left, key);
            self.arena[n].left = right;
            self.set_parent(right, Some(n));
            self.update(n);
            (left, mid, Some(n))
        } else {
            let (left, right) = (self.arena[n].left, self.arena[n].right);
            self.arena[n].left = None;
            self.arena[n].right = None;
            self.set_parent(left, None);
            self.set_parent(right, None);
            self.update(n);
            (left, Some(n), right)
        }
    }

    fn merge(&mut self, left: Option<NodeId>, right: Option<NodeId>) -> Option<NodeId> {
        match (left, right) {
            (None, r) => {
                self.set_parent(r, None);
                r
            }
            (l, None) => {
                self.set_parent(l, None);
                l
            }
            (Some(l), Some(r)) => {
                if self.arena[l].priority > self.arena[r].priority {
                    let l_right = self.arena[l].right;
                    let merged = self.merge(l_right, Some(r));
                    self.arena[l].right = merged;
                    self.set_parent(merged, Some(l));
                    self.update(l);
                    Some(l)
                } else {
                    let r_left = self.arena[r].left;
                    let merged = self.merge(Some(l), r_left);
                    self.arena[r].left = merged;
                    self.set_parent(merged, Some(r));
                    self.update(r);
                    Some(r)
                }
            }
        }
    }

    /// Inserts `key -> value`. No-op, returning `None`, if `key` already exists.
    pub fn insert(&mut self, key: u64, value: V) -> Option<NodeId> {
        let (left, mid, right) = self.split_by_key(self.root, key);
        if mid.is_some() {
            // Key already present: put the tree back exactly as it was.
            let merged = self.merge(left, mid);
            self.root = self.merge(merged, right);
            return None;
        }
        let priority = self.rng.r#gen::<u64>();
        let node = self.arena.insert(Node {
            key,
            value,
            priority,
            size: 1,
            left,
            right,
            parent: None,
        });
        self.set_parent(left, Some(node));
        self.set_parent(right, Some(node));
        self.update(node);
        let merged = self.merge(left, Some(node));
        self.root = self.merge(merged, right);
        Some(self.find_handle(key).expect("just inserted"))
    }

    fn find_handle(&self, key: u64) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(n) = cur {
            let k = self.arena[n].key;
            if key < k {
                cur = self.arena[n].left;
            } else if key > k {
                cur = self.arena[n].right;
            } else {
                return Some(n);
            }
        }
        None
    }

    /// Removes the entry for `key`, if present, returning its value.
    pub fn remove(&mut self, key: u64) -> Option<V> {
        let (left, mid, right) = self.split_by_key(self.root, key);
        self.root = self.merge(left, right);
        mid.map(|n| self.arena.remove(n).value)
    }

    pub fn get(&self, handle: NodeId) -> &V {
        &self.arena[handle].value
    }

    pub fn get_mut(&mut self, handle: NodeId) -> &mut V {
        &mut self.arena[handle].value
    }

    pub fn key_of(&self, handle: NodeId) -> u64 {
        self.arena[handle].key
    }

    pub fn min(&self) -> Option<NodeId> {
        let mut cur = self.root?;
        while let Some(l) = self.arena[cur].left {
            cur = l;
        }
        Some(cur)
    }

    pub fn max(&self) -> Option<NodeId> {
        let mut cur = self.root?;
        while let Some(r) = self.arena[cur].right {
            cur = r;
        }
        Some(cur)
    }

    /// 1-indexed ascending rank selection: `kth_smallest(1)` is [`Treap::min`].
    pub fn kth_smallest(&self, k: usize) -> Option<NodeId> {
        if k == 0 || k > self.len() {
            return None;
        }
        let mut remaining = k;
        let mut cur = self.root;
        while let Some(n) = cur {
            let left_size = self.size_of(self.arena[n].left);
            if remaining <= left_size {
                cur = self.arena[n].left;
            } else if remaining == left_size + 1 {
                return Some(n);
            } else {
                remaining -= left_size + 1;
                cur = self.arena[n].right;
            }
        }
        None
    }

    /// 1-indexed descending rank selection: `kth_largest(1)` is [`Treap::max`].
    pub fn kth_largest(&self, k: usize) -> Option<NodeId> {
        let len = self.len();
        if k == 0 || k > len {
            return None;
        }
        self.kth_smallest(len - k + 1)
    }

    /// Ascending in-order traversal, at most `n` handles.
    pub fn nsmallest(&self, n: usize) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(n.min(self.len()));
        let mut cur = self.min();
        while out.len() < n {
            match cur {
                Some(h) => {
                    out.push(h);
                    cur = self.next(h);
                }
                None => break,
            }
        }
        out
    }

    /// Descending in-order traversal, at most `n` handles.
    pub fn nlargest(&self, n: usize) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(n.min(self.len()));
        let mut cur = self.max();
        while out.len() < n {
            match cur {
                Some(h) => {
                    out.push(h);
                    cur = self.prev(h);
                }
                None => break,
            }
        }
        out
    }

    /// In-order successor.
    pub fn next(&self, handle: NodeId) -> Option<NodeId> {
        if let Some(r) = self.arena[handle].right {
            let mut cur = r;
            while let Some(l) = self.arena[cur].left {
                cur = l;
            }
            return Some(cur);
        }
        let mut cur = handle;
        while let Some(p) = self.arena[cur].parent {
            if self.arena[p].left == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    /// In-order predecessor.
    pub fn prev(&self, handle: NodeId) -> Option<NodeId> {
        if let Some(l) = self.arena[handle].left {
            let mut cur = l;
            while let Some(r) = self.arena[cur].right {
                cur = r;
            }
            return Some(cur);
        }
        let mut cur = handle;
        while let Some(p) = self.arena[cur].parent {
            if self.arena[p].right == Some(cur) {
                return Some(p);
            }
            cur = p;
        }
        None
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    /// Debug-only check that every child's parent pointer points back to its
    /// actual parent — a missed update here is the most likely source of
    /// treap corruption after a rotation/split/merge.
    #[cfg(debug_assertions)]
    pub fn assert_parent_links_consistent(&self) {
        for (id, node) in self.arena.iter() {
            if let Some(l) = node.left {
                debug_assert_eq!(self.arena[l].parent, Some(id));
            }
            if let Some(r) = node.right {
                debug_assert_eq!(self.arena[r].parent, Some(id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(keys: &[u64]) -> Treap<u64> {
        let mut t = Treap::new(42);
        for &k in keys {
            t.insert(k, k);
        }
        t
    }

    #[test]
    fn min_max_and_len() {
        let t = build(&[5, 1, 9, 3, 7]);
        assert_eq!(t.len(), 5);
        assert_eq!(t.key_of(t.min().unwrap()), 1);
        assert_eq!(t.key_of(t.max().unwrap()), 9);
    }

    #[test]
    fn kth_smallest_and_largest_match_sorted_order() {
        let t = build(&[5, 1, 9, 3, 7]);
        let sorted = [1, 3, 5, 7, 9];
        for (i, &expect) in sorted.iter().enumerate() {
            let h = t.kth_smallest(i + 1).unwrap();
            assert_eq!(t.key_of(h), expect);
        }
        for (i, &expect) in sorted.iter().rev().enumerate() {
            let h = t.kth_largest(i + 1).unwrap();
            assert_eq!(t.key_of(h), expect);
        }
    }

    #[test]
    fn kth_out_of_range_is_none() {
        let t = build(&[1, 2, 3]);
        assert!(t.kth_smallest(0).is_none());
        assert!(t.kth_smallest(4).is_none());
        assert!(t.kth_largest(0).is_none());
        assert!(t.kth_largest(4).is_none());
    }

    #[test]
    fn next_prev_walk_matches_sorted_order() {
        let t = build(&[5, 1, 9, 3, 7]);
        let mut cur = t.min();
        let mut seen = Vec::new();
        while let Some(h) = cur {
            seen.push(t.key_of(h));
            cur = t.next(h);
        }
        assert_eq!(seen, vec![1, 3, 5, 7, 9]);

        let mut cur = t.max();
        let mut seen_rev = Vec::new();
        while let Some(h) = cur {
            seen_rev.push(t.key_of(h));
            cur = t.prev(h);
        }
        assert_eq!(seen_rev, vec![9, 7, 5, 3, 1]);
    }

    #[test]
    fn remove_keeps_remaining_order_and_parent_links() {
        let mut t = build(&[5, 1, 9, 3, 7]);
        assert_eq!(t.remove(5), Some(5));
        assert_eq!(t.len(), 4);
        t.assert_parent_links_consistent();

        let mut cur = t.min();
        let mut seen = Vec::new();
        while let Some(h) = cur {
            seen.push(t.key_of(h));
            cur = t.next(h);
        }
        assert_eq!(seen, vec![1, 3, 7, 9]);
    }

    #[test]
    fn insert_duplicate_key_is_noop() {
        let mut t = build(&[1, 2, 3]);
        assert!(t.insert(2, 999).is_none());
        assert_eq!(t.len(), 3);
        let h = t.find_handle(2).unwrap();
        assert_eq!(*t.get(h), 2);
    }

    #[test]
    fn nsmallest_nlargest_respect_n() {
        let t = build(&[5, 1, 9, 3, 7]);
        let smallest: Vec<u64> = t.nsmallest(2).into_iter().map(|h| t.key_of(h)).collect();
        assert_eq!(smallest, vec![1, 3]);
        let largest: Vec<u64> = t.nlargest(2).into_iter().map(|h| t.key_of(h)).collect();
        assert_eq!(largest, vec![9, 7]);
    }

    #[test]
    fn same_seed_produces_same_shape() {
        let a = build(&[5, 1, 9, 3, 7, 2, 8]);
        let b = build(&[5, 1, 9, 3, 7, 2, 8]);
        assert_eq!(a.key_of(a.root.unwrap()), b.key_of(b.root.unwrap()));
    }
}
