//! # lob-core
//!
//! A single-threaded, price-time-priority limit order book matching engine.
//!
//! Consumes a stream of [`Quote`]s (limit, market, best-price, cancel) for a
//! single instrument and produces a stream of [`Transaction`]s and periodic
//! [`Tick`]s. A [`TradingStatus`] schedule drives the engine through an
//! opening call auction, continuous trading, and a closing call auction,
//! with optional periodic snapshots spliced into the continuous sessions.

mod arena;
mod book_side;
mod config;
mod engine;
mod errors;
mod level;
mod order;
mod replay;
mod scale;
mod scheduler;
mod snapshot;
mod transaction;
mod treap;
mod utils;

pub use config::BookConfig;
pub use engine::LimitOrderBook;
pub use errors::BookError;
pub use order::{OrderId, Quote, Side};
pub use replay::load_csv;
pub use scheduler::{ashare_schedule, SchedulePeriod, TradingStatus};
pub use snapshot::Tick;
pub use transaction::Transaction;
pub use utils::setup_logger;
