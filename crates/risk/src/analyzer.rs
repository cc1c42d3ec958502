use core_types::{Bucket, DayStat, EquityPoint, RiskMetrics};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use tracing::warn;

/// Sentinel profit factor reported when the account has profit but not a
/// single losing day, where the true ratio would be infinite.
pub const PROFIT_FACTOR_NO_LOSSES: Decimal = dec!(9999);

/// Trading days per year used to annualize the Sharpe ratio; crypto markets
/// trade every day.
const DAYS_PER_YEAR: Decimal = dec!(365);

const HUNDRED: Decimal = dec!(100);

/// Computes the risk snapshot from the reconstructed equity curve and the
/// underlying daily PnL stream.
///
/// `equity` must be the curve produced from the same `daily_pnl` buckets, so
/// that point `i` is the start-of-day equity for day `i`. Computed once per
/// run. Never fails: with fewer than 2 equity points every metric degrades
/// to the documented neutral snapshot.
pub fn analyze(equity: &[EquityPoint], daily_pnl: &[Bucket]) -> RiskMetrics {
    if equity.len() < 2 {
        warn!(points = equity.len(), "not enough equity points, returning neutral risk metrics");
        return RiskMetrics::neutral();
    }

    let returns = daily_returns(equity, daily_pnl);
    let (max_drawdown_btc, max_drawdown_pct) = drawdown(equity);
    let (best_day, worst_day) = extreme_days(equity, daily_pnl);

    RiskMetrics {
        sharpe: sharpe(&returns),
        max_drawdown_btc,
        max_drawdown_pct,
        best_day,
        worst_day,
        win_rate: win_rate(daily_pnl),
        profit_factor: profit_factor(daily_pnl),
    }
}

/// Daily return of day `i` relative to its start-of-day equity; zero when
/// the account starts the day at or below zero.
fn daily_returns(equity: &[EquityPoint], daily_pnl: &[Bucket]) -> Vec<Decimal> {
    daily_pnl
        .iter()
        .zip(equity.iter())
        .map(|(bucket, start)| {
            if start.equity_btc <= Decimal::ZERO {
                Decimal::ZERO
            } else {
                bucket.sum_btc / start.equity_btc
            }
        })
        .collect()
}

/// Annualized Sharpe ratio (risk-free rate 0): mean/stddev of daily returns
/// scaled by √365. Zero when the deviation vanishes or fewer than 2 returns
/// exist.
fn sharpe(returns: &[Decimal]) -> Decimal {
    if returns.len() < 2 {
        return Decimal::ZERO;
    }

    let n = Decimal::from(returns.len());
    let mean = returns.iter().sum::<Decimal>() / n;
    let variance = returns
        .iter()
        .map(|r| (*r - mean) * (*r - mean))
        .sum::<Decimal>()
        / n;

    match variance.sqrt() {
        Some(std_dev) if std_dev > Decimal::ZERO => {
            let annualizer = DAYS_PER_YEAR.sqrt().unwrap_or(Decimal::ZERO);
            mean / std_dev * annualizer
        }
        _ => Decimal::ZERO,
    }
}

/// Running-peak drawdown over the equity curve.
///
/// Every per-point drawdown is `equity − peak ≤ 0`; the reported maximum is
/// the most negative of them, with its percentage taken against the peak in
/// force at that point (zero when that peak is not positive).
fn drawdown(equity: &[EquityPoint]) -> (Decimal, Decimal) {
    let mut peak = equity[0].equity_btc;
    let mut max_drawdown = Decimal::ZERO;
    let mut peak_at_max = peak;

    for point in equity {
        if point.equity_btc > peak {
            peak = point.equity_btc;
        }
        let dd = point.equity_btc - peak;
        if dd < max_drawdown {
            max_drawdown = dd;
            peak_at_max = peak;
        }
    }

    let pct = if peak_at_max > Decimal::ZERO {
        max_drawdown / peak_at_max * HUNDRED
    } else {
        Decimal::ZERO
    };
    (max_drawdown, pct)
}

/// The single best and worst days by signed PnL, with their matching
/// percentage returns.
fn extreme_days(equity: &[EquityPoint], daily_pnl: &[Bucket]) -> (Option<DayStat>, Option<DayStat>) {
    let mut best: Option<DayStat> = None;
    let mut worst: Option<DayStat> = None;

    for (bucket, start) in daily_pnl.iter().zip(equity.iter()) {
        let return_pct = if start.equity_btc > Decimal::ZERO {
            bucket.sum_btc / start.equity_btc * HUNDRED
        } else {
            Decimal::ZERO
        };
        let stat = DayStat {
            date: bucket.period_start.date_naive(),
            pnl_btc: bucket.sum_btc,
            return_pct,
        };

        if best.is_none_or(|b| stat.pnl_btc > b.pnl_btc) {
            best = Some(stat);
        }
        if worst.is_none_or(|w| stat.pnl_btc < w.pnl_btc) {
            worst = Some(stat);
        }
    }

    (best, worst)
}

/// Fraction of traded days that closed positive.
fn win_rate(daily_pnl: &[Bucket]) -> Decimal {
    if daily_pnl.is_empty() {
        return Decimal::ZERO;
    }
    let wins = daily_pnl
        .iter()
        .filter(|b| b.sum_btc > Decimal::ZERO)
        .count();
    Decimal::from(wins) / Decimal::from(daily_pnl.len())
}

/// Gross profit over gross loss. `PROFIT_FACTOR_NO_LOSSES` when profit
/// exists with no losing day; zero when neither profit nor loss exists.
fn profit_factor(daily_pnl: &[Bucket]) -> Decimal {
    let mut gross_profit = Decimal::ZERO;
    let mut gross_loss = Decimal::ZERO;

    for bucket in daily_pnl {
        if bucket.sum_btc > Decimal::ZERO {
            gross_profit += bucket.sum_btc;
        } else {
            gross_loss += bucket.sum_btc.abs();
        }
    }

    if gross_loss > Decimal::ZERO {
        gross_profit / gross_loss
    } else if gross_profit > Decimal::ZERO {
        PROFIT_FACTOR_NO_LOSSES
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn day_bucket(start: &str, sum: Decimal, cumulative: Decimal) -> Bucket {
        let period_start: DateTime<Utc> = start.parse().unwrap();
        Bucket {
            period_key: period_start.format("%Y-%m-%d").to_string(),
            period_start,
            sum_btc: sum,
            cumulative_btc: cumulative,
        }
    }

    /// The spec'd worked example: daily PnL [+0.01, -0.02, +0.03] from a
    /// 1.0 BTC baseline.
    fn example() -> (Vec<EquityPoint>, Vec<Bucket>) {
        let daily = vec![
            day_bucket("2025-01-01T00:00:00Z", dec!(0.01), dec!(0.01)),
            day_bucket("2025-01-02T00:00:00Z", dec!(-0.02), dec!(-0.01)),
            day_bucket("2025-01-03T00:00:00Z", dec!(0.03), dec!(0.02)),
        ];
        let equity = equity::reconstruct(&daily, dec!(1.02));
        (equity, daily)
    }

    #[test]
    fn neutral_below_two_points() {
        let metrics = analyze(&[], &[]);
        assert_eq!(metrics, RiskMetrics::neutral());
    }

    #[test]
    fn worked_example_drawdown_and_win_rate() {
        let (equity, daily) = example();
        let metrics = analyze(&equity, &daily);

        assert_eq!(metrics.max_drawdown_btc, dec!(-0.02));
        assert_eq!(metrics.win_rate, dec!(2) / dec!(3));
    }

    #[test]
    fn drawdown_is_never_positive() {
        let daily = vec![
            day_bucket("2025-01-01T00:00:00Z", dec!(0.05), dec!(0.05)),
            day_bucket("2025-01-02T00:00:00Z", dec!(0.01), dec!(0.06)),
        ];
        let equity = equity::reconstruct(&daily, dec!(1.06));
        let metrics = analyze(&equity, &daily);

        assert_eq!(metrics.max_drawdown_btc, Decimal::ZERO);
        assert_eq!(metrics.max_drawdown_pct, Decimal::ZERO);
    }

    #[test]
    fn drawdown_pct_uses_the_peak_in_force() {
        let (equity, daily) = example();
        let metrics = analyze(&equity, &daily);

        // Peak before the losing day is 1.01.
        assert_eq!(metrics.max_drawdown_pct, dec!(-0.02) / dec!(1.01) * dec!(100));
    }

    #[test]
    fn extreme_days_match_the_example() {
        let (equity, daily) = example();
        let metrics = analyze(&equity, &daily);

        let best = metrics.best_day.unwrap();
        assert_eq!(best.pnl_btc, dec!(0.03));
        assert_eq!(best.date.to_string(), "2025-01-03");
        assert_eq!(best.return_pct, dec!(0.03) / dec!(0.99) * dec!(100));

        let worst = metrics.worst_day.unwrap();
        assert_eq!(worst.pnl_btc, dec!(-0.02));
        assert_eq!(worst.date.to_string(), "2025-01-02");
    }

    #[test]
    fn profit_factor_ratio_and_sentinels() {
        let (equity, daily) = example();
        let metrics = analyze(&equity, &daily);
        assert_eq!(metrics.profit_factor, dec!(0.04) / dec!(0.02));

        // All-winning account hits the sentinel.
        let winners = vec![
            day_bucket("2025-01-01T00:00:00Z", dec!(0.01), dec!(0.01)),
            day_bucket("2025-01-02T00:00:00Z", dec!(0.02), dec!(0.03)),
        ];
        let equity = equity::reconstruct(&winners, dec!(1.03));
        assert_eq!(analyze(&equity, &winners).profit_factor, PROFIT_FACTOR_NO_LOSSES);

        // Flat account reports zero.
        let flat = vec![
            day_bucket("2025-01-01T00:00:00Z", Decimal::ZERO, Decimal::ZERO),
            day_bucket("2025-01-02T00:00:00Z", Decimal::ZERO, Decimal::ZERO),
        ];
        let equity = equity::reconstruct(&flat, dec!(1));
        assert_eq!(analyze(&equity, &flat).profit_factor, Decimal::ZERO);
    }

    #[test]
    fn sharpe_is_zero_for_constant_returns() {
        // Two identical relative moves leave no deviation to divide by.
        let daily = vec![
            day_bucket("2025-01-01T00:00:00Z", dec!(0.01), dec!(0.01)),
            day_bucket("2025-01-02T00:00:00Z", dec!(0.0101), dec!(0.0201)),
        ];
        let equity = equity::reconstruct(&daily, dec!(1.0201));
        let metrics = analyze(&equity, &daily);
        assert_eq!(metrics.sharpe, Decimal::ZERO);
    }

    #[test]
    fn sharpe_sign_follows_the_mean_return() {
        let (equity, daily) = example();
        let metrics = analyze(&equity, &daily);
        assert!(metrics.sharpe > Decimal::ZERO);
    }

    #[test]
    fn zero_equity_day_contributes_zero_return() {
        let daily = vec![
            day_bucket("2025-01-01T00:00:00Z", dec!(-1), dec!(-1)),
            day_bucket("2025-01-02T00:00:00Z", dec!(0.5), dec!(-0.5)),
            day_bucket("2025-01-03T00:00:00Z", dec!(0.25), dec!(-0.25)),
        ];
        // Baseline 1.0, so day 2 starts at exactly zero equity.
        let equity = equity::reconstruct(&daily, dec!(0.75));
        let metrics = analyze(&equity, &daily);

        // Day 2's return is forced to zero rather than dividing by zero.
        assert!(metrics.max_drawdown_btc <= Decimal::ZERO);
        assert_eq!(metrics.win_rate, dec!(2) / dec!(3));
    }
}
