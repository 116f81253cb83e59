//! One side of the book: a treap of [`Level`]s keyed by price, plus a
//! price→level hash index kept in exact lockstep with the treap.

use std::collections::HashMap;

use crate::level::Level;
use crate::order::Side;
use crate::treap::{NodeId, Treap};

pub(crate) struct BookSide {
    side: Side,
    treap: Treap<Level>,
    price_index: HashMap<u64, NodeId>,
}

impl BookSide {
    pub fn new(side: Side, seed: u64) -> Self {
        Self {
            side,
            treap: Treap::new(seed),
            price_index: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.treap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.treap.len()
    }

    pub fn price_index_len(&self) -> usize {
        self.price_index.len()
    }

    /// Gets the level at `price`, creating an empty one if needed. Both the
    /// treap and the price map are updated together so ordered-index size
    /// always equals price-map size.
    pub fn get_or_create(&mut self, price: u64) -> NodeId {
        if let Some(&handle) = self.price_index.get(&price) {
            return handle;
        }
        let handle = self
            .treap
            .insert(price, Level::new(self.side, price))
            .expect("price just confirmed absent from price_index");
        self.price_index.insert(price, handle);
        handle
    }

    pub fn find(&self, price: u64) -> Option<NodeId> {
        self.price_index.get(&price).copied()
    }

    pub fn level(&self, handle: NodeId) -> &Level {
        self.treap.get(handle)
    }

    pub fn level_mut(&mut self, handle: NodeId) -> &mut Level {
        self.treap.get_mut(handle)
    }

    /// Removes the level at `price` from both indices if it has gone empty.
    pub fn drop_if_empty(&mut self, price: u64) {
        if let Some(&handle) = self.price_index.get(&price) {
            if self.treap.get(handle).is_empty() {
                self.treap.remove(price);
                self.price_index.remove(&price);
            }
        }
    }

    /// The side's best price: highest for bids, lowest for asks.
    pub fn best(&self) -> Option<NodeId> {
        match self.side {
            Side::Bid => self.treap.max(),
            Side::Ask => self.treap.min(),
        }
    }

    /// The next level further from the best price (used by the call-auction walk).
    pub fn inward(&self, handle: NodeId) -> Option<NodeId> {
        match self.side {
            Side::Bid => self.treap.prev(handle),
            Side::Ask => self.treap.next(handle),
        }
    }

    /// Best-to-worst ordered levels, at most `n`.
    pub fn best_n(&self, n: usize) -> Vec<NodeId> {
        match self.side {
            Side::Bid => self.treap.nlargest(n),
            Side::Ask => self.treap.nsmallest(n),
        }
    }

    /// 1-indexed rank from the best price.
    pub fn kth(&self, k: usize) -> Option<NodeId> {
        match self.side {
            Side::Bid => self.treap.kth_largest(k),
            Side::Ask => self.treap.kth_smallest(k),
        }
    }

    pub fn clear(&mut self) {
        self.treap.clear();
        self.price_index.clear();
    }
}
