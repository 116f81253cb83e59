//! Book configuration: price scaling, snapshot cadence, quoted depth, and
//! the trading-phase schedule.

use crate::scale::scale_factor;
use crate::scheduler::{ashare_schedule, SchedulePeriod};

/// Configuration accepted when constructing a book.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BookConfig {
    /// Number of decimal places prices are quantized to; `scale = 10^decimal_places`.
    pub decimal_places: u32,
    /// If greater than zero, `run()` splices periodic snapshots into every
    /// continuous-trading window, `snapshot_gap` nanoseconds apart.
    pub snapshot_gap: u64,
    /// Depth of the bid/ask arrays carried by each `Tick`.
    pub topk: usize,
    /// The trading-phase schedule `run()` drives the book through.
    pub schedule: Vec<SchedulePeriod>,
    /// Seed for the per-book treap priority source; fixed for reproducible replays.
    pub seed: u64,
}

impl BookConfig {
    pub fn scale(&self) -> u64 {
        scale_factor(self.decimal_places)
    }

    /// The A-share trading day preset: opening call auction, two continuous
    /// sessions, closing call auction.
    pub fn ashare() -> Self {
        Self {
            schedule: ashare_schedule(),
            ..Self::default()
        }
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            snapshot_gap: 0,
            topk: 5,
            schedule: Vec::new(),
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_defaults() {
        let cfg = BookConfig::default();
        assert_eq!(cfg.decimal_places, 2);
        assert_eq!(cfg.snapshot_gap, 0);
        assert_eq!(cfg.topk, 5);
        assert_eq!(cfg.scale(), 100);
    }

    #[test]
    fn ashare_preset_carries_four_periods() {
        let cfg = BookConfig::ashare();
        assert_eq!(cfg.schedule.len(), 4);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = BookConfig::ashare();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: BookConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.schedule.len(), cfg.schedule.len());
        assert_eq!(back.decimal_places, cfg.decimal_places);
    }
}
