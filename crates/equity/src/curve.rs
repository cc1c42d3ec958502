use chrono::Duration;
use core_types::{Bucket, EquityPoint};
use rust_decimal::Decimal;
use tracing::debug;

/// Reconstructs a point-in-time equity series from daily PnL buckets and an
/// authoritative current balance.
///
/// The baseline is `current_balance` minus the sum of all daily deltas; the
/// series then walks forward from the baseline, applying one day's delta at
/// a time. The first point sits at the start of the first traded day and
/// each subsequent point at the close of its day.
///
/// This recovers the *shape* of the curve between two known snapshots from
/// incremental PnL; it is an approximation, not independently observed
/// equity. Deposits and withdrawals between the snapshots shift the whole
/// curve rather than appearing as steps.
///
/// The final point equals `current_balance` exactly; fixed-point decimal
/// accumulation makes this an identity rather than a tolerance check.
pub fn reconstruct(daily_pnl: &[Bucket], current_balance: Decimal) -> Vec<EquityPoint> {
    let Some(first) = daily_pnl.first() else {
        debug!("no daily PnL buckets, equity curve is empty");
        return Vec::new();
    };

    let total_delta: Decimal = daily_pnl.iter().map(|b| b.sum_btc).sum();
    let baseline = current_balance - total_delta;

    let mut points = Vec::with_capacity(daily_pnl.len() + 1);
    points.push(EquityPoint {
        timestamp: first.period_start,
        equity_btc: baseline,
    });

    let mut running = baseline;
    for bucket in daily_pnl {
        running += bucket.sum_btc;
        points.push(EquityPoint {
            timestamp: bucket.period_start + Duration::days(1),
            equity_btc: running,
        });
    }

    debug_assert_eq!(points.last().map(|p| p.equity_btc), Some(current_balance));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn day_bucket(start: &str, sum: Decimal, cumulative: Decimal) -> Bucket {
        let period_start: DateTime<Utc> = start.parse().unwrap();
        Bucket {
            period_key: period_start.format("%Y-%m-%d").to_string(),
            period_start,
            sum_btc: sum,
            cumulative_btc: cumulative,
        }
    }

    #[test]
    fn empty_input_yields_empty_curve() {
        assert!(reconstruct(&[], dec!(1)).is_empty());
    }

    #[test]
    fn walks_forward_from_the_baseline() {
        let daily = vec![
            day_bucket("2025-01-01T00:00:00Z", dec!(0.01), dec!(0.01)),
            day_bucket("2025-01-02T00:00:00Z", dec!(-0.02), dec!(-0.01)),
            day_bucket("2025-01-03T00:00:00Z", dec!(0.03), dec!(0.02)),
        ];
        let points = reconstruct(&daily, dec!(1.02));

        let equities: Vec<Decimal> = points.iter().map(|p| p.equity_btc).collect();
        assert_eq!(equities, vec![dec!(1.00), dec!(1.01), dec!(0.99), dec!(1.02)]);
    }

    #[test]
    fn final_point_equals_the_current_balance() {
        let daily = vec![
            day_bucket("2025-02-01T00:00:00Z", dec!(0.004), dec!(0.004)),
            day_bucket("2025-02-05T00:00:00Z", dec!(-0.009), dec!(-0.005)),
        ];
        let balance = dec!(0.731);
        let points = reconstruct(&daily, balance);
        assert_eq!(points.last().unwrap().equity_btc, balance);
    }

    #[test]
    fn tolerates_gaps_between_traded_days() {
        let daily = vec![
            day_bucket("2025-02-01T00:00:00Z", dec!(0.01), dec!(0.01)),
            day_bucket("2025-02-10T00:00:00Z", dec!(0.01), dec!(0.02)),
        ];
        let points = reconstruct(&daily, dec!(0.52));

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].equity_btc, dec!(0.50));
        assert_eq!(
            points[2].timestamp,
            "2025-02-11T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }
}
