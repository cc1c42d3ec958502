use core_types::{Bucket, ForecastModel, ScenarioKind, ScenarioProjection, TrendDirection};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use tracing::warn;

const HUNDRED: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Fits a linear trend to the monthly PnL series and projects three
/// scenarios over the given horizon.
///
/// Ordinary least squares of monthly PnL against the month index 0..n-1.
/// Scenario monthly PnL is the mean plus/minus one standard deviation;
/// each scenario carries both a linear and a compound projection, the
/// compound one being the primary. With fewer than 2 monthly buckets the
/// all-zero model is returned.
pub fn fit(monthly_pnl: &[Bucket], current_balance: Decimal, horizon_months: u32) -> ForecastModel {
    if monthly_pnl.len() < 2 {
        warn!(months = monthly_pnl.len(), "not enough monthly buckets, returning zero forecast");
        return ForecastModel::zero(horizon_months);
    }

    let y: Vec<Decimal> = monthly_pnl.iter().map(|b| b.sum_btc).collect();
    let n = Decimal::from(y.len());

    let (slope, intercept) = regress(&y);
    let r_squared = r_squared(&y, slope, intercept);

    let mean = y.iter().sum::<Decimal>() / n;
    let variance = y.iter().map(|v| (*v - mean) * (*v - mean)).sum::<Decimal>() / n;
    let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);

    let trend_direction = if slope > Decimal::ZERO {
        TrendDirection::Improving
    } else if slope < Decimal::ZERO {
        TrendDirection::Declining
    } else {
        TrendDirection::Flat
    };

    let scenarios = vec![
        project(ScenarioKind::Optimistic, mean + std_dev, current_balance, horizon_months),
        project(ScenarioKind::Average, mean, current_balance, horizon_months),
        project(ScenarioKind::Pessimistic, mean - std_dev, current_balance, horizon_months),
    ];

    ForecastModel {
        avg_monthly_pnl_btc: mean,
        std_dev_monthly_pnl_btc: std_dev,
        trend_slope: slope,
        trend_intercept: intercept,
        r_squared,
        trend_direction,
        horizon_months,
        scenarios,
    }
}

/// Least-squares slope and intercept of `y` against x = 0..n-1, with the
/// denominator guard the degenerate single-x case would need.
fn regress(y: &[Decimal]) -> (Decimal, Decimal) {
    let n = Decimal::from(y.len());
    let mut sum_x = Decimal::ZERO;
    let mut sum_y = Decimal::ZERO;
    let mut sum_xy = Decimal::ZERO;
    let mut sum_x2 = Decimal::ZERO;

    for (i, value) in y.iter().enumerate() {
        let x = Decimal::from(i);
        sum_x += x;
        sum_y += *value;
        sum_xy += x * *value;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.is_zero() {
        return (Decimal::ZERO, sum_y / n);
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

/// Coefficient of determination; zero when the series has no variance.
fn r_squared(y: &[Decimal], slope: Decimal, intercept: Decimal) -> Decimal {
    let n = Decimal::from(y.len());
    let mean = y.iter().sum::<Decimal>() / n;

    let ss_tot: Decimal = y.iter().map(|v| (*v - mean) * (*v - mean)).sum();
    if ss_tot.is_zero() {
        return Decimal::ZERO;
    }

    let ss_res: Decimal = y
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let fitted = slope * Decimal::from(i) + intercept;
            (*v - fitted) * (*v - fitted)
        })
        .sum();

    Decimal::ONE - ss_res / ss_tot
}

/// Projects one scenario forward, both linearly and compounded.
///
/// When the current balance is not positive the compound ROI is undefined;
/// the scenario then reports zero ROI and falls back to the linear balance
/// for its compound figure.
fn project(
    kind: ScenarioKind,
    monthly_pnl: Decimal,
    current_balance: Decimal,
    horizon_months: u32,
) -> ScenarioProjection {
    let months = Decimal::from(horizon_months);
    let linear_balance = current_balance + months * monthly_pnl;

    if current_balance <= Decimal::ZERO || horizon_months == 0 {
        if current_balance <= Decimal::ZERO {
            warn!(?kind, %current_balance, "non-positive balance, ROI projections degraded to zero");
        }
        return ScenarioProjection {
            kind,
            monthly_pnl_btc: monthly_pnl,
            linear_balance_btc: linear_balance,
            compound_balance_btc: linear_balance,
            total_roi_pct: Decimal::ZERO,
            annualized_roi_pct: Decimal::ZERO,
        };
    }

    let monthly_roi = monthly_pnl / current_balance;
    let growth = Decimal::ONE + monthly_roi;
    // A scenario losing more than the whole balance per month bottoms out
    // at zero instead of oscillating in sign.
    let compound_balance = if growth > Decimal::ZERO {
        current_balance * growth.powi(horizon_months as i64)
    } else {
        Decimal::ZERO
    };

    let total_roi = compound_balance / current_balance - Decimal::ONE;
    let annualized_roi = if Decimal::ONE + total_roi > Decimal::ZERO {
        (Decimal::ONE + total_roi).powd(MONTHS_PER_YEAR / months) - Decimal::ONE
    } else {
        -Decimal::ONE
    };

    ScenarioProjection {
        kind,
        monthly_pnl_btc: monthly_pnl,
        linear_balance_btc: linear_balance,
        compound_balance_btc: compound_balance,
        total_roi_pct: total_roi * HUNDRED,
        annualized_roi_pct: annualized_roi * HUNDRED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn month_bucket(start: &str, sum: Decimal) -> Bucket {
        let period_start: DateTime<Utc> = start.parse().unwrap();
        Bucket {
            period_key: period_start.format("%Y-%m").to_string(),
            period_start,
            sum_btc: sum,
            cumulative_btc: Decimal::ZERO,
        }
    }

    fn months(values: &[Decimal]) -> Vec<Bucket> {
        let starts = [
            "2025-01-01T00:00:00Z",
            "2025-02-01T00:00:00Z",
            "2025-03-01T00:00:00Z",
            "2025-04-01T00:00:00Z",
        ];
        values
            .iter()
            .zip(starts.iter())
            .map(|(v, s)| month_bucket(s, *v))
            .collect()
    }

    #[test]
    fn short_series_yields_zero_model() {
        let model = fit(&months(&[dec!(0.1)]), dec!(1), 6);
        assert_eq!(model, ForecastModel::zero(6));
    }

    #[test]
    fn worked_regression_example() {
        // Monthly PnL [0.1, 0.2, 0.3].
        let model = fit(&months(&[dec!(0.1), dec!(0.2), dec!(0.3)]), dec!(1), 6);

        assert_eq!(model.trend_slope, dec!(0.1));
        assert_eq!(model.trend_intercept, dec!(0.1));
        assert_eq!(model.trend_direction, TrendDirection::Improving);
        assert_eq!(model.avg_monthly_pnl_btc, dec!(0.2));

        // Population std dev = sqrt(0.02 / 3) ~= 0.0816.
        let err = (model.std_dev_monthly_pnl_btc - dec!(0.0816)).abs();
        assert!(err < dec!(0.0001), "std dev was {}", model.std_dev_monthly_pnl_btc);

        // A perfect line explains all the variance.
        assert!((model.r_squared - Decimal::ONE).abs() < dec!(0.0000001));
    }

    #[test]
    fn declining_and_flat_directions() {
        let declining = fit(&months(&[dec!(0.3), dec!(0.1)]), dec!(1), 3);
        assert_eq!(declining.trend_direction, TrendDirection::Declining);

        let flat = fit(&months(&[dec!(0.2), dec!(0.2)]), dec!(1), 3);
        assert_eq!(flat.trend_direction, TrendDirection::Flat);
        assert_eq!(flat.r_squared, Decimal::ZERO);
    }

    #[test]
    fn scenarios_are_symmetric_around_the_mean() {
        let model = fit(&months(&[dec!(0.1), dec!(0.2), dec!(0.3)]), dec!(1), 6);
        let [optimistic, average, pessimistic] = &model.scenarios[..] else {
            panic!("expected three scenarios");
        };

        assert_eq!(optimistic.kind, ScenarioKind::Optimistic);
        assert_eq!(
            optimistic.monthly_pnl_btc - average.monthly_pnl_btc,
            model.std_dev_monthly_pnl_btc
        );
        assert_eq!(
            average.monthly_pnl_btc - pessimistic.monthly_pnl_btc,
            model.std_dev_monthly_pnl_btc
        );
    }

    #[test]
    fn linear_and_compound_projections() {
        // Two equal months of +0.2 on a balance of 1: monthly ROI is 20%.
        let model = fit(&months(&[dec!(0.2), dec!(0.2)]), dec!(1), 2);
        let average = &model.scenarios[1];

        assert_eq!(average.linear_balance_btc, dec!(1.4));
        let err = (average.compound_balance_btc - dec!(1.44)).abs();
        assert!(err < dec!(0.0000001), "compound was {}", average.compound_balance_btc);
        let err = (average.total_roi_pct - dec!(44)).abs();
        assert!(err < dec!(0.0001));

        // Annualized over 2 months: 1.44^6 - 1 ~= 791.61%.
        let err = (average.annualized_roi_pct - dec!(791.6100448256)).abs();
        assert!(err < dec!(0.01), "annualized was {}", average.annualized_roi_pct);
    }

    #[test]
    fn non_positive_balance_degrades_roi_to_zero() {
        let model = fit(&months(&[dec!(0.1), dec!(0.2)]), Decimal::ZERO, 6);
        for scenario in &model.scenarios {
            assert_eq!(scenario.total_roi_pct, Decimal::ZERO);
            assert_eq!(scenario.annualized_roi_pct, Decimal::ZERO);
            assert_eq!(scenario.compound_balance_btc, scenario.linear_balance_btc);
        }
    }

    #[test]
    fn catastrophic_scenario_bottoms_out_at_zero() {
        // Losing 1.5x the balance per month cannot go below zero equity.
        let model = fit(&months(&[dec!(-1.5), dec!(-1.5)]), dec!(1), 3);
        let average = &model.scenarios[1];
        assert_eq!(average.compound_balance_btc, Decimal::ZERO);
        assert_eq!(average.total_roi_pct, dec!(-100));
    }
}
