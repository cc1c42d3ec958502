//! End-to-end exercise of the analytics pipeline on fixture data:
//! raw ledger events in, rendered-ready records out.

use aggregation::{aggregate, default_week_anchor};
use chrono::{DateTime, Utc};
use core_types::{Granularity, IncomeCategory, LedgerEvent, NormalizedRecord, PriceSample};
use prices::PriceIndex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn fixture_index() -> PriceIndex {
    let samples = vec![
        PriceSample { timestamp: ts("2025-01-01T00:00:00Z"), open: dec!(50000), close: dec!(50000) },
        PriceSample { timestamp: ts("2025-01-02T00:00:00Z"), open: dec!(50000), close: dec!(40000) },
        PriceSample { timestamp: ts("2025-01-03T00:00:00Z"), open: dec!(40000), close: dec!(50000) },
    ];
    let spot = HashMap::from([
        ("BTCUSDT".to_string(), dec!(50000)),
        ("ETHUSDT".to_string(), dec!(2500)),
    ]);
    PriceIndex::new(samples, spot).unwrap()
}

fn fixture_events() -> Vec<LedgerEvent> {
    vec![
        LedgerEvent {
            timestamp: ts("2025-01-01T08:00:00Z"),
            category: IncomeCategory::RealizedPnl,
            asset: "USDT".to_string(),
            native_amount: dec!(500),
        },
        LedgerEvent {
            timestamp: ts("2025-01-02T08:00:00Z"),
            category: IncomeCategory::FundingFee,
            asset: "USDT".to_string(),
            native_amount: dec!(-800),
        },
        LedgerEvent {
            timestamp: ts("2025-01-03T08:00:00Z"),
            category: IncomeCategory::RealizedPnl,
            asset: "BTC".to_string(),
            native_amount: dec!(0.03),
        },
        LedgerEvent {
            timestamp: ts("2025-01-02T09:00:00Z"),
            category: IncomeCategory::Deposit,
            asset: "ETH".to_string(),
            native_amount: dec!(10),
        },
    ]
}

#[test]
fn pipeline_produces_consistent_outputs() {
    let index = fixture_index();
    let records = ledger::normalize(&fixture_events(), &index);
    assert_eq!(records.len(), 4);

    let (pnl, flows): (Vec<NormalizedRecord>, Vec<NormalizedRecord>) =
        records.into_iter().partition(|r| r.category.is_pnl());
    assert_eq!(pnl.len(), 3);
    assert_eq!(flows.len(), 1);

    // 500 USDT at 50k, -800 USDT at 40k, 0.03 BTC directly.
    let anchor = default_week_anchor(pnl[0].timestamp);
    let daily = aggregate(&pnl, Granularity::Daily, anchor);
    assert_eq!(daily.len(), 3);
    assert_eq!(daily[0].sum_btc, dec!(0.01));
    assert_eq!(daily[1].sum_btc, dec!(-0.02));
    assert_eq!(daily[2].sum_btc, dec!(0.03));
    assert_eq!(daily[2].cumulative_btc, dec!(0.02));

    // The deposit converts through ETHUSDT/BTCUSDT: 10 * 2500 / 50000.
    let monthly_flows = aggregate(&flows, Granularity::Monthly, anchor);
    assert_eq!(monthly_flows.len(), 1);
    assert_eq!(monthly_flows[0].sum_btc, dec!(0.5));

    // Equity anchored at a 1.02 BTC balance walks the spec'd example curve.
    let balance = dec!(1.02);
    let curve = equity::reconstruct(&daily, balance);
    let equities: Vec<Decimal> = curve.iter().map(|p| p.equity_btc).collect();
    assert_eq!(equities, vec![dec!(1.00), dec!(1.01), dec!(0.99), dec!(1.02)]);
    assert_eq!(curve.last().unwrap().equity_btc, balance);

    let metrics = risk::analyze(&curve, &daily);
    assert_eq!(metrics.max_drawdown_btc, dec!(-0.02));
    assert!(metrics.max_drawdown_btc <= Decimal::ZERO);
    assert_eq!(metrics.win_rate, dec!(2) / dec!(3));

    let monthly = aggregate(&pnl, Granularity::Monthly, anchor);
    let model = forecast::fit(&monthly, balance, 6);
    // A single month cannot support a regression.
    assert_eq!(model.trend_slope, Decimal::ZERO);

    // Rendering never fails on real output.
    let text = reporter::render_summary(balance, &metrics);
    assert!(text.contains("Max drawdown"));
}

#[test]
fn pipeline_degrades_gracefully_on_empty_input() {
    let index = PriceIndex::new(Vec::new(), HashMap::new()).unwrap();
    let records = ledger::normalize(&[], &index);
    assert!(records.is_empty());

    let anchor = default_week_anchor(ts("2025-01-01T00:00:00Z"));
    let daily = aggregate(&records, Granularity::Daily, anchor);
    assert!(daily.is_empty());

    let curve = equity::reconstruct(&daily, dec!(1));
    assert!(curve.is_empty());

    let metrics = risk::analyze(&curve, &daily);
    assert_eq!(metrics, core_types::RiskMetrics::neutral());

    let model = forecast::fit(&daily, dec!(1), 6);
    assert_eq!(model, core_types::ForecastModel::zero(6));

    // Rendering neutral output still succeeds.
    reporter::render_summary(dec!(1), &metrics);
    reporter::render_equity(&curve);
    reporter::render_forecast(&model);
}
