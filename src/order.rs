//! Order and quote types.

use std::fmt;

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    /// Buy side (bids)
    Bid,
    /// Sell side (asks)
    Ask,
}

impl Side {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "BID"),
            Side::Ask => write!(f, "ASK"),
        }
    }
}

/// Unique, caller-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resting order in the book.
///
/// `level_key` is a non-owning back-reference to the `Level` that holds this
/// order: the Level is the owner (see [`crate::level::Level`]), so the order
/// only remembers the `(side, price)` it would look itself up under, never a
/// pointer into the level's storage.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub price: u64,
    pub remaining_quantity: u64,
    pub timestamp: u64,
    pub side: Side,
}

impl Order {
    pub(crate) fn new(id: OrderId, price: u64, quantity: u64, timestamp: u64, side: Side) -> Self {
        Self {
            id,
            price,
            remaining_quantity: quantity,
            timestamp,
            side,
        }
    }
}

/// A market quote as submitted by an external source.
///
/// `Quote::Fill` deliberately does not exist here: fills are an internal
/// settlement step the engine applies to itself (see `engine::LimitOrderBook::trade`)
/// and must never be constructible by a caller — excluding the variant from
/// this enum is how that's enforced at the API boundary.
#[derive(Debug, Clone)]
pub enum Quote {
    /// Rests at `price` if it does not cross immediately.
    LimitOrder {
        id: OrderId,
        price: u64,
        quantity: u64,
        timestamp: u64,
        side: Side,
    },
    /// Sweeps the opposite side's best levels; never rests.
    MarketOrder {
        id: OrderId,
        quantity: u64,
        timestamp: u64,
        side: Side,
    },
    /// Pegs to the same side's current best price.
    BestPriceOrder {
        id: OrderId,
        quantity: u64,
        timestamp: u64,
        side: Side,
    },
    /// Reduces a live order's remaining quantity by `quantity`.
    CancelOrder {
        id: OrderId,
        quantity: u64,
        timestamp: u64,
        side: Side,
    },
}

impl Quote {
    /// The timestamp used to place this quote in the replay/schedule ordering.
    pub fn timestamp(&self) -> u64 {
        match self {
            Quote::LimitOrder { timestamp, .. }
            | Quote::MarketOrder { timestamp, .. }
            | Quote::BestPriceOrder { timestamp, .. }
            | Quote::CancelOrder { timestamp, .. } => *timestamp,
        }
    }

    /// The side the quote is submitted on.
    pub fn side(&self) -> Side {
        match self {
            Quote::LimitOrder { side, .. }
            | Quote::MarketOrder { side, .. }
            | Quote::BestPriceOrder { side, .. }
            | Quote::CancelOrder { side, .. } => *side,
        }
    }
}

/// The internal settlement counterpart to a matched trade. Never exposed as
/// a `Quote` variant; only `engine::LimitOrderBook::trade` constructs one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fill {
    pub id: OrderId,
    pub quantity: u64,
    pub side: Side,
}
