//! OHLCV+amount accumulation and the `Tick` records emitted at snapshot
//! boundaries.

use crate::scale::unscale_price;
use crate::transaction::Transaction;

/// Per-interval OHLCV+amount accumulator. `open`/`high`/`low` are undefined
/// until the first trade of the interval; `close` carries over between
/// intervals with no trades (last-trade semantics).
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OhlcvAccumulator {
    open: Option<u64>,
    high: Option<u64>,
    low: Option<u64>,
    close: Option<u64>,
    volume: u64,
    amount: u64,
}

impl OhlcvAccumulator {
    pub fn record(&mut self, tx: &Transaction) {
        self.open.get_or_insert(tx.price);
        self.high = Some(self.high.map_or(tx.price, |h| h.max(tx.price)));
        self.low = Some(self.low.map_or(tx.price, |l| l.min(tx.price)));
        self.close = Some(tx.price);
        self.volume += tx.quantity;
        self.amount += tx.notional();
    }

    /// Resets the per-interval fields after a snapshot, keeping `close` for
    /// last-trade continuity into the next interval.
    pub fn reset_interval(&mut self) {
        self.open = None;
        self.high = None;
        self.low = None;
        self.volume = 0;
        self.amount = 0;
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }
}

/// A snapshot of OHLCV-amount plus top-k bid/ask depth, emitted at a
/// snapshot phase boundary.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Tick {
    pub timestamp: u64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: u64,
    pub amount: u64,
    pub bid_prices: Vec<Option<f64>>,
    pub ask_prices: Vec<Option<f64>>,
    pub bid_sizes: Vec<u64>,
    pub ask_sizes: Vec<u64>,
}

impl Tick {
    pub(crate) fn from_accumulator(
        timestamp: u64,
        acc: &OhlcvAccumulator,
        scale: u64,
        bid_prices: Vec<Option<u64>>,
        ask_prices: Vec<Option<u64>>,
        bid_sizes: Vec<u64>,
        ask_sizes: Vec<u64>,
    ) -> Self {
        let unscale = |p: Option<u64>| p.map(|p| unscale_price(p, scale));
        Self {
            timestamp,
            open: unscale(acc.open),
            high: unscale(acc.high),
            low: unscale(acc.low),
            close: unscale(acc.close),
            volume: acc.volume,
            amount: acc.amount,
            bid_prices: bid_prices.into_iter().map(unscale).collect(),
            ask_prices: ask_prices.into_iter().map(unscale).collect(),
            bid_sizes,
            ask_sizes,
        }
    }
}
