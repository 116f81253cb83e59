use lob_core::{BookConfig, LimitOrderBook, OrderId, Quote, Side, TradingStatus};

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn continuous_book() -> LimitOrderBook {
        let mut book = LimitOrderBook::new(BookConfig {
            decimal_places: 0,
            ..BookConfig::default()
        });
        book.set_status(TradingStatus::ContinuousTrading);
        book
    }

    fn limit(id: u64, price: u64, qty: u64, ts: u64, side: Side) -> Quote {
        Quote::LimitOrder {
            id: OrderId(id),
            price,
            quantity: qty,
            timestamp: ts,
            side,
        }
    }

    #[test]
    fn simple_cross() {
        let mut book = continuous_book();
        book.write(limit(1, 100, 5, 1, Side::Bid)).unwrap();
        book.write(limit(2, 100, 3, 2, Side::Ask)).unwrap();

        let txs = book.transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].bid_order_id, OrderId(1));
        assert_eq!(txs[0].ask_order_id, OrderId(2));
        assert_eq!(txs[0].price, 100);
        assert_eq!(txs[0].quantity, 3);
        assert_eq!(book.kth_bid_volume(1), Some(2));
        assert_eq!(book.kth_ask_volume(1), None);
    }

    #[test]
    fn price_time_priority() {
        let mut book = continuous_book();
        book.write(limit(1, 100, 2, 1, Side::Bid)).unwrap();
        book.write(limit(2, 100, 2, 2, Side::Bid)).unwrap();
        book.write(limit(3, 100, 3, 3, Side::Ask)).unwrap();

        let txs = book.transactions();
        assert_eq!(txs.len(), 2);
        assert_eq!((txs[0].bid_order_id, txs[0].quantity), (OrderId(1), 2));
        assert_eq!((txs[1].bid_order_id, txs[1].quantity), (OrderId(2), 1));
        assert_eq!(book.kth_bid_volume(1), Some(1));
        assert_eq!(book.kth_ask_volume(1), None);
    }

    #[test]
    fn market_sweep() {
        let mut book = continuous_book();
        book.write(limit(1, 100, 5, 1, Side::Ask)).unwrap();
        book.write(limit(2, 101, 5, 2, Side::Ask)).unwrap();
        book.write(Quote::MarketOrder {
            id: OrderId(9),
            quantity: 7,
            timestamp: 3,
            side: Side::Bid,
        })
        .unwrap();

        let txs = book.transactions();
        assert_eq!(txs.len(), 2);
        assert_eq!((txs[0].price, txs[0].quantity), (100, 5));
        assert_eq!((txs[1].price, txs[1].quantity), (101, 2));
        assert_eq!(book.kth_ask_price(1), Some(101.0));
        assert_eq!(book.kth_ask_volume(1), Some(3));
    }

    #[test]
    fn cancel_partial() {
        let mut book = continuous_book();
        book.write(limit(1, 100, 5, 1, Side::Bid)).unwrap();
        book.write(Quote::CancelOrder {
            id: OrderId(1),
            quantity: 3,
            timestamp: 2,
            side: Side::Bid,
        })
        .unwrap();

        assert!(book.transactions().is_empty());
        assert_eq!(book.kth_bid_volume(1), Some(2));
    }

    #[test]
    fn call_auction_equilibrium() {
        let mut book = LimitOrderBook::new(BookConfig {
            decimal_places: 0,
            ..BookConfig::default()
        });
        book.set_status(TradingStatus::CallAuction);
        book.write(limit(1, 100, 10, 1, Side::Bid)).unwrap();
        book.write(limit(2, 99, 20, 2, Side::Bid)).unwrap();
        book.write(limit(3, 98, 15, 3, Side::Ask)).unwrap();
        book.write(limit(4, 99, 10, 4, Side::Ask)).unwrap();

        book.match_call_auction(Some(10)).unwrap();

        let txs = book.transactions();
        assert_eq!(txs.iter().map(|t| t.quantity).sum::<u64>(), 25);
        assert!(txs.iter().all(|t| t.price == 99));
    }

    #[test]
    fn snapshot_ohlcv() {
        let mut book = LimitOrderBook::new(BookConfig {
            decimal_places: 0,
            snapshot_gap: 10,
            topk: 2,
            ..BookConfig::default()
        });
        book.set_schedule(vec![lob_core::SchedulePeriod {
            status: TradingStatus::ContinuousTrading,
            start_ts: 0,
            end_ts: 30,
        }]);

        book.enqueue(limit(1, 100, 10, 1, Side::Ask));
        book.enqueue(limit(2, 100, 2, 2, Side::Bid));
        book.enqueue(limit(3, 105, 3, 15, Side::Ask));
        book.enqueue(limit(4, 105, 3, 16, Side::Bid));

        book.run().unwrap();

        assert!(!book.ticks().is_empty());
        let first_tick = &book.ticks()[0];
        assert_eq!(first_tick.open, Some(100.0));
        assert_eq!(first_tick.close, Some(100.0));
        assert_eq!(first_tick.volume, 2);

        let second_tick_idx = book
            .ticks()
            .iter()
            .position(|t| t.timestamp == 20)
            .expect("a second snapshot at t=20 is expected");
        let second_tick = &book.ticks()[second_tick_idx];
        assert_eq!(second_tick.open, Some(105.0));
        assert_eq!(second_tick.volume, 3);
    }

    #[test]
    fn duplicate_id_and_over_cancel_are_rejected() {
        let mut book = continuous_book();
        book.write(limit(1, 100, 5, 1, Side::Bid)).unwrap();
        assert!(book.write(limit(1, 101, 1, 2, Side::Bid)).is_err());
        assert!(book
            .write(Quote::CancelOrder {
                id: OrderId(1),
                quantity: 6,
                timestamp: 3,
                side: Side::Bid,
            })
            .is_err());
    }

    #[test]
    fn market_and_best_price_orders_gated_outside_continuous_trading() {
        let mut book = LimitOrderBook::new(BookConfig::default());
        book.set_status(TradingStatus::CallAuction);
        assert!(book
            .write(Quote::MarketOrder {
                id: OrderId(1),
                quantity: 1,
                timestamp: 1,
                side: Side::Bid,
            })
            .is_err());
        assert!(book
            .write(Quote::BestPriceOrder {
                id: OrderId(2),
                quantity: 1,
                timestamp: 1,
                side: Side::Bid,
            })
            .is_err());
    }

    #[test]
    fn kth_and_topk_boundaries() {
        let mut book = continuous_book();
        book.write(limit(1, 100, 5, 1, Side::Bid)).unwrap();

        assert!(book.kth_bid_price(0).is_none());
        assert!(book.kth_bid_price(2).is_none());
        assert_eq!(book.topk_bid_prices(0, true).len(), 0);
        assert_eq!(book.topk_bid_prices(3, true).len(), 3);
        assert_eq!(book.topk_bid_sizes(3, true), vec![5, 0, 0]);
    }

    #[test]
    fn clear_returns_to_a_fresh_book() {
        let mut book = continuous_book();
        book.write(limit(1, 100, 5, 1, Side::Bid)).unwrap();
        book.write(limit(2, 100, 3, 2, Side::Ask)).unwrap();
        book.clear();

        assert!(book.transactions().is_empty());
        assert!(book.ticks().is_empty());
        assert_eq!(book.status(), TradingStatus::Closed);
        assert!(book.kth_bid_price(1).is_none());
        assert!(book.kth_ask_price(1).is_none());
    }

    #[test]
    fn quotes_in_a_schedule_gap_are_left_pending_not_matched() {
        let mut book = LimitOrderBook::new(BookConfig {
            decimal_places: 0,
            ..BookConfig::default()
        });
        book.set_schedule(vec![
            lob_core::SchedulePeriod {
                status: TradingStatus::ContinuousTrading,
                start_ts: 0,
                end_ts: 10,
            },
            lob_core::SchedulePeriod {
                status: TradingStatus::ContinuousTrading,
                start_ts: 20,
                end_ts: 30,
            },
        ]);

        // Timestamped during the gap (10, 20), e.g. a lunch break.
        book.enqueue(limit(1, 100, 5, 15, Side::Ask));
        book.enqueue(limit(2, 100, 5, 25, Side::Bid));

        book.run().unwrap();

        assert!(book.transactions().is_empty());
        assert_eq!(book.pending_len(), 2);
    }
}
