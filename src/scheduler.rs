//! The trading-phase state machine: `TradingStatus` and the schedule that
//! drives transitions between call auctions, continuous trading, and
//! periodic snapshots.

/// The phase the book is currently in. `write()` gates `MarketOrder` and
/// `BestPriceOrder` on `ContinuousTrading`; `Closed` accepts nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TradingStatus {
    CallAuction,
    ContinuousTrading,
    Snapshot,
    Closed,
}

/// One `(status, start_ts, end_ts)` window in a schedule, timestamps in
/// nanoseconds since the book's `start_of_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SchedulePeriod {
    pub status: TradingStatus,
    pub start_ts: u64,
    pub end_ts: u64,
}

impl SchedulePeriod {
    pub fn new(status: TradingStatus, start_ts: u64, end_ts: u64) -> Self {
        Self {
            status,
            start_ts,
            end_ts,
        }
    }
}

const NS_PER_SEC: u64 = 1_000_000_000;
const NS_PER_MIN: u64 = 60 * NS_PER_SEC;
const NS_PER_HOUR: u64 = 60 * NS_PER_MIN;

/// The A-share trading day convention, expressed as nanosecond offsets from
/// local midnight.
pub fn ashare_schedule() -> Vec<SchedulePeriod> {
    let t = |h: u64, m: u64, s: u64| h * NS_PER_HOUR + m * NS_PER_MIN + s * NS_PER_SEC;
    vec![
        SchedulePeriod::new(TradingStatus::CallAuction, t(9, 15, 0), t(9, 25, 0)),
        SchedulePeriod::new(TradingStatus::ContinuousTrading, t(9, 30, 0), t(11, 30, 0)),
        SchedulePeriod::new(TradingStatus::ContinuousTrading, t(13, 0, 0), t(14, 57, 0)),
        SchedulePeriod::new(TradingStatus::CallAuction, t(14, 57, 0), t(15, 0, 0)),
    ]
}

/// Splices `snapshot_gap`-ns snapshot windows into every continuous-trading
/// interval of `schedule`, and appends a terminal snapshot after every call
/// auction. Operates on (and returns) a fresh copy — never mutates the
/// schedule that was actually configured, so repeated calls don't accumulate
/// splices.
pub(crate) fn splice_snapshot_gap(
    schedule: &[SchedulePeriod],
    snapshot_gap: u64,
) -> Vec<SchedulePeriod> {
    if snapshot_gap == 0 {
        return schedule.to_vec();
    }
    let mut spliced = Vec::with_capacity(schedule.len() * 2);
    for period in schedule {
        match period.status {
            TradingStatus::ContinuousTrading => {
                let mut t = period.start_ts;
                while t < period.end_ts {
                    let next = (t + snapshot_gap).min(period.end_ts);
                    spliced.push(SchedulePeriod::new(TradingStatus::ContinuousTrading, t, next));
                    spliced.push(SchedulePeriod::new(TradingStatus::Snapshot, next, next));
                    t = next;
                }
            }
            TradingStatus::CallAuction => {
                spliced.push(*period);
                spliced.push(SchedulePeriod::new(
                    TradingStatus::Snapshot,
                    period.end_ts,
                    period.end_ts,
                ));
            }
            _ => spliced.push(*period),
        }
    }
    spliced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ashare_schedule_has_four_ordered_periods() {
        let sched = ashare_schedule();
        assert_eq!(sched.len(), 4);
        for w in sched.windows(2) {
            assert!(w[0].end_ts <= w[1].start_ts);
        }
    }

    #[test]
    fn splice_with_zero_gap_is_identity() {
        let sched = ashare_schedule();
        let spliced = splice_snapshot_gap(&sched, 0);
        assert_eq!(spliced, sched);
    }

    #[test]
    fn splice_inserts_snapshot_after_each_gap_and_after_call_auctions() {
        let sched = vec![SchedulePeriod::new(
            TradingStatus::ContinuousTrading,
            0,
            25,
        )];
        let spliced = splice_snapshot_gap(&sched, 10);
        assert_eq!(
            spliced,
            vec![
                SchedulePeriod::new(TradingStatus::ContinuousTrading, 0, 10),
                SchedulePeriod::new(TradingStatus::Snapshot, 10, 10),
                SchedulePeriod::new(TradingStatus::ContinuousTrading, 10, 20),
                SchedulePeriod::new(TradingStatus::Snapshot, 20, 20),
                SchedulePeriod::new(TradingStatus::ContinuousTrading, 20, 25),
                SchedulePeriod::new(TradingStatus::Snapshot, 25, 25),
            ]
        );
    }

    #[test]
    fn splice_does_not_mutate_caller_schedule() {
        let sched = ashare_schedule();
        let before = sched.clone();
        let _ = splice_snapshot_gap(&sched, 5 * NS_PER_MIN);
        assert_eq!(sched, before);
    }
}
