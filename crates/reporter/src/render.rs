use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use core_types::{Bucket, EquityPoint, ForecastModel, RiskMetrics, ScenarioKind};
use rust_decimal::Decimal;

const BTC_DP: u32 = 8;
const PCT_DP: u32 = 2;

fn btc(value: Decimal) -> String {
    format!("{}", value.round_dp(BTC_DP))
}

fn pct(value: Decimal) -> String {
    format!("{}%", value.round_dp(PCT_DP))
}

/// Renders the account headline: current balance and the risk snapshot.
pub fn render_summary(current_balance: Decimal, metrics: &RiskMetrics) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Metric", "Value"]);

    table.add_row(vec![Cell::new("Current balance (BTC)"), Cell::new(btc(current_balance))]);
    table.add_row(vec![Cell::new("Sharpe (annualized)"), Cell::new(format!("{}", metrics.sharpe.round_dp(2)))]);
    table.add_row(vec![Cell::new("Max drawdown (BTC)"), Cell::new(btc(metrics.max_drawdown_btc))]);
    table.add_row(vec![Cell::new("Max drawdown"), Cell::new(pct(metrics.max_drawdown_pct))]);
    table.add_row(vec![Cell::new("Win rate"), Cell::new(pct(metrics.win_rate * Decimal::from(100)))]);
    table.add_row(vec![Cell::new("Profit factor"), Cell::new(format!("{}", metrics.profit_factor.round_dp(2)))]);

    if let Some(best) = metrics.best_day {
        table.add_row(vec![
            Cell::new("Best day"),
            Cell::new(format!("{} ({} BTC, {})", best.date, btc(best.pnl_btc), pct(best.return_pct))),
        ]);
    }
    if let Some(worst) = metrics.worst_day {
        table.add_row(vec![
            Cell::new("Worst day"),
            Cell::new(format!("{} ({} BTC, {})", worst.date, btc(worst.pnl_btc), pct(worst.return_pct))),
        ]);
    }

    table.to_string()
}

/// Renders one bucket sequence (daily, weekly or monthly PnL).
pub fn render_buckets(title: &str, buckets: &[Bucket]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![title, "PnL (BTC)", "Cumulative (BTC)"]);

    for bucket in buckets {
        table.add_row(vec![
            Cell::new(&bucket.period_key),
            Cell::new(btc(bucket.sum_btc)),
            Cell::new(btc(bucket.cumulative_btc)),
        ]);
    }

    table.to_string()
}

/// Renders the equity curve's endpoints; the full series is available to
/// machine consumers, a terminal table only needs the shape summary.
pub fn render_equity(points: &[EquityPoint]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Equity curve", "Value"]);

    match (points.first(), points.last()) {
        (Some(first), Some(last)) => {
            table.add_row(vec![Cell::new("Points"), Cell::new(points.len().to_string())]);
            table.add_row(vec![
                Cell::new("Baseline"),
                Cell::new(format!("{} ({} BTC)", first.timestamp.format("%Y-%m-%d"), btc(first.equity_btc))),
            ]);
            table.add_row(vec![
                Cell::new("Latest"),
                Cell::new(format!("{} ({} BTC)", last.timestamp.format("%Y-%m-%d"), btc(last.equity_btc))),
            ]);
        }
        _ => {
            table.add_row(vec![Cell::new("Points"), Cell::new("0")]);
        }
    }

    table.to_string()
}

/// Renders the trend fit and the three scenario projections.
pub fn render_forecast(model: &ForecastModel) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Trend", "Value"]);
    table.add_row(vec![Cell::new("Avg monthly PnL (BTC)"), Cell::new(btc(model.avg_monthly_pnl_btc))]);
    table.add_row(vec![Cell::new("Std dev (BTC)"), Cell::new(btc(model.std_dev_monthly_pnl_btc))]);
    table.add_row(vec![Cell::new("Slope (BTC/month)"), Cell::new(btc(model.trend_slope))]);
    table.add_row(vec![Cell::new("R²"), Cell::new(format!("{}", model.r_squared.round_dp(4)))]);
    table.add_row(vec![Cell::new("Direction"), Cell::new(format!("{:?}", model.trend_direction))]);

    let mut scenarios = Table::new();
    scenarios.load_preset(UTF8_FULL);
    scenarios.set_header(vec![
        format!("Scenario ({}m)", model.horizon_months),
        "Monthly PnL (BTC)".to_string(),
        "Linear (BTC)".to_string(),
        "Compound (BTC)".to_string(),
        "Total ROI".to_string(),
        "Annualized ROI".to_string(),
    ]);

    for scenario in &model.scenarios {
        let label = match scenario.kind {
            ScenarioKind::Optimistic => "Optimistic",
            ScenarioKind::Average => "Average",
            ScenarioKind::Pessimistic => "Pessimistic",
        };
        scenarios.add_row(vec![
            Cell::new(label),
            Cell::new(btc(scenario.monthly_pnl_btc)),
            Cell::new(btc(scenario.linear_balance_btc)),
            Cell::new(btc(scenario.compound_balance_btc)),
            Cell::new(pct(scenario.total_roi_pct)),
            Cell::new(pct(scenario.annualized_roi_pct)),
        ]);
    }

    format!("{table}\n{scenarios}")
}
