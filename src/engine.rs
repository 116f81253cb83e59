//! The matching engine: the quote-driven state machine that ties the book
//! sides, order arena, transaction stream, and tick producer together.

use std::collections::HashMap;

use crate::arena::{Handle, OrderArena};
use crate::book_side::BookSide;
use crate::config::BookConfig;
use crate::errors::BookError;
use crate::order::{Fill, Order, OrderId, Quote, Side};
use crate::scale::unscale_price;
use crate::scheduler::{splice_snapshot_gap, SchedulePeriod, TradingStatus};
use crate::snapshot::{OhlcvAccumulator, Tick};
use crate::transaction::Transaction;

const NS_PER_DAY: u64 = 86_400 * 1_000_000_000;

/// A single-instrument limit order book: price-time-priority continuous
/// matching, call-auction equilibrium pricing, and the phase scheduler that
/// drives both.
pub struct LimitOrderBook {
    config: BookConfig,
    bids: BookSide,
    asks: BookSide,
    orders: OrderArena,
    id_map: HashMap<OrderId, (Side, Handle)>,
    transactions: Vec<Transaction>,
    ticks: Vec<Tick>,
    status: TradingStatus,
    start_of_day: Option<u64>,
    ohlcv: OhlcvAccumulator,
    pending: Vec<Quote>,
}

impl LimitOrderBook {
    pub fn new(config: BookConfig) -> Self {
        let bid_seed = config.seed;
        let ask_seed = config.seed ^ 0x9e37_79b9_7f4a_7c15;
        Self {
            bids: BookSide::new(Side::Bid, bid_seed),
            asks: BookSide::new(Side::Ask, ask_seed),
            orders: OrderArena::new(),
            id_map: HashMap::new(),
            transactions: Vec::new(),
            ticks: Vec::new(),
            status: TradingStatus::Closed,
            start_of_day: None,
            ohlcv: OhlcvAccumulator::default(),
            pending: Vec::new(),
            config,
        }
    }

    /// Resets every piece of book state to how a freshly constructed book
    /// would look, keeping the configuration (schedule, decimal places,
    /// topk, seed) that was set up front.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.orders.clear();
        self.id_map.clear();
        self.transactions.clear();
        self.ticks.clear();
        self.ohlcv.reset_all();
        self.pending.clear();
        self.status = TradingStatus::Closed;
        self.start_of_day = None;
    }

    pub fn status(&self) -> TradingStatus {
        self.status
    }

    pub fn set_status(&mut self, status: TradingStatus) {
        self.status = status;
    }

    pub fn set_schedule(&mut self, schedule: Vec<SchedulePeriod>) {
        self.config.schedule = schedule;
    }

    /// Queues a quote for `run()`/`until()` to drain in timestamp order.
    pub fn enqueue(&mut self, quote: Quote) {
        self.note_timestamp(quote.timestamp());
        self.pending.push(quote);
    }

    fn note_timestamp(&mut self, ts: u64) {
        self.start_of_day.get_or_insert(ts - ts % NS_PER_DAY);
    }

    fn effective_window(&self, period: &SchedulePeriod) -> (u64, u64) {
        let base = self.start_of_day.unwrap_or(0);
        (base + period.start_ts, base + period.end_ts)
    }

    /// Submits a single quote. Dispatches on variant per the book's public
    /// contract; see `write_limit`/`write_market`/`write_best_price`/`write_cancel`.
    pub fn write(&mut self, quote: Quote) -> Result<(), BookError> {
        self.note_timestamp(quote.timestamp());
        let result = match quote {
            Quote::LimitOrder {
                id,
                price,
                quantity,
                timestamp,
                side,
            } => self.write_limit(id, price, quantity, timestamp, side),
            Quote::MarketOrder {
                id,
                quantity,
                timestamp,
                side,
            } => self.write_market(id, quantity, timestamp, side),
            Quote::BestPriceOrder {
                id,
                quantity,
                timestamp,
                side,
            } => self.write_best_price(id, quantity, timestamp, side),
            Quote::CancelOrder { id, quantity, .. } => self.write_cancel(id, quantity),
        };
        self.assert_consistent();
        result
    }

    fn write_limit(
        &mut self,
        id: OrderId,
        price: u64,
        quantity: u64,
        timestamp: u64,
        side: Side,
    ) -> Result<(), BookError> {
        if quantity == 0 {
            return Err(BookError::invalid_input(
                "limit order quantity must be greater than zero",
            ));
        }
        if price == 0 {
            return Err(BookError::invalid_input(
                "limit order price must be greater than zero",
            ));
        }
        if self.id_map.contains_key(&id) {
            return Err(BookError::invalid_input(format!("duplicate order id {id}")));
        }

        let order = Order::new(id, price, quantity, timestamp, side);
        let handle = {
            let (side_book, arena) = self.sides_mut(side);
            let node = side_book.get_or_create(price);
            side_book.level_mut(node).push_back(arena, order)
        };
        self.id_map.insert(id, (side, handle));
        tracing::debug!(%id, price, quantity, %side, "limit order resting");

        if self.status == TradingStatus::ContinuousTrading {
            self.match_continuous(None, None)?;
        }
        Ok(())
    }

    fn write_market(
        &mut self,
        id: OrderId,
        quantity: u64,
        timestamp: u64,
        side: Side,
    ) -> Result<(), BookError> {
        if self.status != TradingStatus::ContinuousTrading {
            return Err(BookError::invalid_status(
                "market orders are only accepted during continuous trading",
            ));
        }
        let opposite = side.opposite();
        let Some(best) = self.side_book(opposite).best() else {
            return Ok(());
        };
        let level = self.side_book(opposite).level(best);
        let take = quantity.min(level.aggregate_quantity);
        let best_price = level.price;

        self.write_limit(id, best_price, take, timestamp, side)?;
        if quantity > take {
            self.write_market(id, quantity - take, timestamp, side)?;
        }
        Ok(())
    }

    fn write_best_price(
        &mut self,
        id: OrderId,
        quantity: u64,
        timestamp: u64,
        side: Side,
    ) -> Result<(), BookError> {
        if self.status != TradingStatus::ContinuousTrading {
            return Err(BookError::invalid_status(
                "best-price orders are only accepted during continuous trading",
            ));
        }
        let Some(best) = self.side_book(side).best() else {
            return Ok(());
        };
        let price = self.side_book(side).level(best).price;
        self.write_limit(id, price, quantity, timestamp, side)
    }

    fn write_cancel(&mut self, id: OrderId, quantity: u64) -> Result<(), BookError> {
        let Some(&(side, handle)) = self.id_map.get(&id) else {
            return Err(BookError::invalid_input(format!("unknown order id {id}")));
        };
        let (price, remaining_before) = {
            let order = self.orders.get(handle);
            (order.price, order.remaining_quantity)
        };
        if quantity > remaining_before {
            return Err(BookError::invalid_input(format!(
                "cancel quantity {quantity} exceeds remaining {remaining_before}"
            )));
        }

        {
            let (side_book, arena) = self.sides_mut(side);
            let node = side_book
                .find(price)
                .expect("live order's level must be indexed");
            side_book.level_mut(node).reduce(arena, handle, quantity);
            side_book.drop_if_empty(price);
        }
        if quantity == remaining_before {
            self.id_map.remove(&id);
        }
        tracing::debug!(%id, quantity, "cancel applied");
        Ok(())
    }

    /// Applies the settlement half of a matched trade: structurally
    /// identical to a cancel, but driven internally by `trade()` rather than
    /// an external quote.
    fn apply_fill(&mut self, fill: Fill) {
        let &(_, handle) = self
            .id_map
            .get(&fill.id)
            .expect("fill targets a live order");
        let (price, remaining_before) = {
            let order = self.orders.get(handle);
            (order.price, order.remaining_quantity)
        };
        {
            let (side_book, arena) = self.sides_mut(fill.side);
            let node = side_book
                .find(price)
                .expect("live order's level must be indexed");
            side_book.level_mut(node).reduce(arena, handle, fill.quantity);
            side_book.drop_if_empty(price);
        }
        if fill.quantity == remaining_before {
            self.id_map.remove(&fill.id);
        }
    }

    /// Emits a transaction and applies the two internal fills it implies.
    /// The execution price defaults to the maker's price (earlier arrival,
    /// ties broken by the lower id); the timestamp defaults to the later of
    /// the two arrivals.
    fn trade(
        &mut self,
        ask_id: OrderId,
        bid_id: OrderId,
        qty: u64,
        price: Option<u64>,
        ts: Option<u64>,
    ) -> Result<(), BookError> {
        let &(_, ask_handle) = self.id_map.get(&ask_id).expect("trade() id must be live");
        let &(_, bid_handle) = self.id_map.get(&bid_id).expect("trade() id must be live");
        let ask_order = self.orders.get(ask_handle);
        let bid_order = self.orders.get(bid_handle);

        let exec_price = price.unwrap_or_else(|| {
            if (ask_order.timestamp, ask_id) <= (bid_order.timestamp, bid_id) {
                ask_order.price
            } else {
                bid_order.price
            }
        });
        let exec_ts = ts.unwrap_or_else(|| ask_order.timestamp.max(bid_order.timestamp));

        let tx = Transaction::new(bid_id, ask_id, exec_price, qty, exec_ts);
        self.ohlcv.record(&tx);
        self.transactions.push(tx);
        tracing::info!(%bid_id, %ask_id, exec_price, qty, exec_ts, "trade executed");

        self.apply_fill(Fill {
            id: ask_id,
            quantity: qty,
            side: Side::Ask,
        });
        self.apply_fill(Fill {
            id: bid_id,
            quantity: qty,
            side: Side::Bid,
        });
        Ok(())
    }

    /// The continuous cross-and-match loop: trades the best ask against the
    /// best bid, FIFO head against FIFO head, while the book is crossed.
    pub fn match_continuous(
        &mut self,
        ref_price: Option<u64>,
        ts: Option<u64>,
    ) -> Result<(), BookError> {
        loop {
            let (Some(ask_best), Some(bid_best)) = (self.asks.best(), self.bids.best()) else {
                break;
            };
            let ask_price = self.asks.level(ask_best).price;
            let bid_price = self.bids.level(bid_best).price;
            if ask_price > bid_price {
                break;
            }

            let ask_handle = self
                .asks
                .level(ask_best)
                .front()
                .expect("non-empty level has a front order");
            let bid_handle = self
                .bids
                .level(bid_best)
                .front()
                .expect("non-empty level has a front order");
            let ask_order = self.orders.get(ask_handle);
            let bid_order = self.orders.get(bid_handle);
            let qty = ask_order.remaining_quantity.min(bid_order.remaining_quantity);
            let ask_id = ask_order.id;
            let bid_id = bid_order.id;

            self.trade(ask_id, bid_id, qty, ref_price, ts)?;
        }
        Ok(())
    }

    /// Walks both books inward from their extremes to find the equilibrium
    /// price, then executes every resulting cross at that single price.
    pub fn match_call_auction(&mut self, ts: Option<u64>) -> Result<(), BookError> {
        let mut ref_price: u64 = 0;
        let mut ask_cum: u64 = 0;
        let mut bid_cum: u64 = 0;
        let mut a = self.asks.best();
        let mut b = self.bids.best();

        loop {
            let (Some(an), Some(bn)) = (a, b) else { break };
            let a_price = self.asks.level(an).price;
            let b_price = self.bids.level(bn).price;
            if !(a_price <= ref_price || ref_price <= b_price) {
                break;
            }
            if ask_cum < bid_cum {
                ask_cum += self.asks.level(an).aggregate_quantity;
                ref_price = a_price;
                a = self.asks.inward(an);
            } else {
                bid_cum += self.bids.level(bn).aggregate_quantity;
                ref_price = b_price;
                b = self.bids.inward(bn);
            }
        }

        if ref_price == 0 {
            return Ok(());
        }
        self.match_continuous(Some(ref_price), ts)
    }

    /// Drains the pending queue through the configured schedule: each
    /// period sets the book's status, admits quotes whose timestamp falls
    /// inside it, then fires the period-end hook. `snapshot_gap` is spliced
    /// into a local copy of the schedule so repeated `run()` calls never
    /// accumulate splices. A quote timestamped in a gap between two periods
    /// (e.g. the lunch break between morning and afternoon continuous
    /// trading) is left in the pending queue rather than matched or dropped.
    pub fn run(&mut self) -> Result<(), BookError> {
        self.pending.sort_by_key(Quote::timestamp);
        let schedule = splice_snapshot_gap(&self.config.schedule, self.config.snapshot_gap);

        let mut idx = 0;
        for period in &schedule {
            let (start, end) = self.effective_window(period);
            let status = period.status;
            tracing::debug!(?status, start, end, "entering trading period");
            self.status = status;

            while idx < self.pending.len() && self.pending[idx].timestamp() <= end {
                if self.pending[idx].timestamp() < start {
                    // Falls in a gap between this period and the previous one
                    // (e.g. a lunch break) — leave it queued rather than
                    // silently dropping it.
                    break;
                }
                let quote = self.pending[idx].clone();
                self.write(quote)?;
                idx += 1;
            }
            self.on_period_end(status, end)?;
        }
        self.pending.drain(0..idx);
        Ok(())
    }

    /// Drains the pending queue up to a wall-clock timestamp bound, ignoring
    /// the schedule. Used by callers that drive progress directly rather
    /// than through `run()`.
    pub fn until(&mut self, timestamp: u64) -> Result<(), BookError> {
        self.pending.sort_by_key(Quote::timestamp);
        let mut idx = 0;
        while idx < self.pending.len() && self.pending[idx].timestamp() <= timestamp {
            let quote = self.pending[idx].clone();
            self.write(quote)?;
            idx += 1;
        }
        self.pending.drain(0..idx);
        Ok(())
    }

    fn on_period_end(&mut self, status: TradingStatus, end_ts: u64) -> Result<(), BookError> {
        match status {
            TradingStatus::CallAuction => self.match_call_auction(Some(end_ts)),
            TradingStatus::Snapshot => {
                self.emit_tick(end_ts);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn emit_tick(&mut self, timestamp: u64) {
        let scale = self.config.scale();
        let topk = self.config.topk;
        let (bid_prices, bid_sizes) = self.depth(Side::Bid, topk);
        let (ask_prices, ask_sizes) = self.depth(Side::Ask, topk);
        let tick = Tick::from_accumulator(
            timestamp, &self.ohlcv, scale, bid_prices, ask_prices, bid_sizes, ask_sizes,
        );
        tracing::info!(timestamp, "tick emitted");
        self.ticks.push(tick);
        self.ohlcv.reset_interval();
    }

    fn depth(&self, side: Side, k: usize) -> (Vec<Option<u64>>, Vec<u64>) {
        let side_book = self.side_book(side);
        let mut prices = Vec::with_capacity(k);
        let mut sizes = Vec::with_capacity(k);
        for node in side_book.best_n(k) {
            let level = side_book.level(node);
            prices.push(Some(level.price));
            sizes.push(level.aggregate_quantity);
        }
        while prices.len() < k {
            prices.push(None);
            sizes.push(0);
        }
        (prices, sizes)
    }

    fn side_book(&self, side: Side) -> &BookSide {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn sides_mut(&mut self, side: Side) -> (&mut BookSide, &mut OrderArena) {
        match side {
            Side::Bid => (&mut self.bids, &mut self.orders),
            Side::Ask => (&mut self.asks, &mut self.orders),
        }
    }

    pub fn topk_bid_prices(&self, k: usize, pad: bool) -> Vec<Option<f64>> {
        self.prices_for(Side::Bid, k, pad)
    }

    pub fn topk_ask_prices(&self, k: usize, pad: bool) -> Vec<Option<f64>> {
        self.prices_for(Side::Ask, k, pad)
    }

    pub fn topk_bid_sizes(&self, k: usize, pad: bool) -> Vec<u64> {
        self.sizes_for(Side::Bid, k, pad)
    }

    pub fn topk_ask_sizes(&self, k: usize, pad: bool) -> Vec<u64> {
        self.sizes_for(Side::Ask, k, pad)
    }

    fn prices_for(&self, side: Side, k: usize, pad: bool) -> Vec<Option<f64>> {
        let scale = self.config.scale();
        let side_book = self.side_book(side);
        let mut out: Vec<Option<f64>> = side_book
            .best_n(k)
            .into_iter()
            .map(|node| Some(unscale_price(side_book.level(node).price, scale)))
            .collect();
        if pad {
            out.resize(k, None);
        }
        out
    }

    fn sizes_for(&self, side: Side, k: usize, pad: bool) -> Vec<u64> {
        let side_book = self.side_book(side);
        let mut out: Vec<u64> = side_book
            .best_n(k)
            .into_iter()
            .map(|node| side_book.level(node).aggregate_quantity)
            .collect();
        if pad {
            out.resize(k, 0);
        }
        out
    }

    pub fn kth_bid_price(&self, k: usize) -> Option<f64> {
        let scale = self.config.scale();
        self.bids
            .kth(k)
            .map(|n| unscale_price(self.bids.level(n).price, scale))
    }

    pub fn kth_ask_price(&self, k: usize) -> Option<f64> {
        let scale = self.config.scale();
        self.asks
            .kth(k)
            .map(|n| unscale_price(self.asks.level(n).price, scale))
    }

    pub fn kth_bid_volume(&self, k: usize) -> Option<u64> {
        self.bids.kth(k).map(|n| self.bids.level(n).aggregate_quantity)
    }

    pub fn kth_ask_volume(&self, k: usize) -> Option<u64> {
        self.asks.kth(k).map(|n| self.asks.level(n).aggregate_quantity)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// Number of quotes still waiting to be admitted to a trading period.
    /// Non-zero after `run()` means some quotes fell in a schedule gap.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(debug_assertions)]
    fn assert_consistent(&self) {
        for side_book in [&self.bids, &self.asks] {
            if side_book.len() != side_book.price_index_len() {
                panic!(
                    "{}",
                    BookError::invariant("ordered index size diverged from price-map size")
                );
            }
        }
    }

    #[cfg(not(debug_assertions))]
    fn assert_consistent(&self) {}
}
