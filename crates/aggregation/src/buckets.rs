use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use core_types::{Bucket, Granularity, NormalizedRecord};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const DAY_MS: i64 = 86_400_000;
const WEEK_MS: i64 = 7 * DAY_MS;

/// Folds normalized records into sparse, time-sorted buckets.
///
/// A bucket materializes only when a record contributes to it; empty periods
/// are absent from the output, not zero-filled, and consumers must tolerate
/// the gaps. After the fold the buckets are sorted by `period_start` and a
/// second pass fills `cumulative_btc` left to right. The fold carries no
/// state between calls: identical records always produce identical buckets.
///
/// `week_anchor` fixes the start of the weekly grid and is ignored for the
/// other granularities; see [`default_week_anchor`].
pub fn aggregate(
    records: &[NormalizedRecord],
    granularity: Granularity,
    week_anchor: DateTime<Utc>,
) -> Vec<Bucket> {
    // Decimal accumulation is exact, so summation order cannot drift; the
    // BTreeMap only exists to keep periods sorted by start time.
    let mut sums: BTreeMap<DateTime<Utc>, Decimal> = BTreeMap::new();

    for record in records {
        let start = period_start(record.timestamp, granularity, week_anchor);
        *sums.entry(start).or_insert(Decimal::ZERO) += record.btc_amount;
    }

    let mut cumulative = Decimal::ZERO;
    sums.into_iter()
        .map(|(start, sum)| {
            cumulative += sum;
            Bucket {
                period_key: period_key(start, granularity),
                period_start: start,
                sum_btc: sum,
                cumulative_btc: cumulative,
            }
        })
        .collect()
}

/// Monday 00:00 UTC of the week containing `timestamp`; the conventional
/// anchor for the weekly grid.
pub fn default_week_anchor(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let date = timestamp.date_naive();
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    monday
        .and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(timestamp)
}

fn period_start(
    timestamp: DateTime<Utc>,
    granularity: Granularity,
    week_anchor: DateTime<Utc>,
) -> DateTime<Utc> {
    let ts_ms = timestamp.timestamp_millis();
    match granularity {
        Granularity::Daily => {
            let start_ms = ts_ms.div_euclid(DAY_MS) * DAY_MS;
            from_millis(start_ms, timestamp)
        }
        Granularity::Weekly => {
            let anchor_ms = week_anchor.timestamp_millis();
            let start_ms = anchor_ms + (ts_ms - anchor_ms).div_euclid(WEEK_MS) * WEEK_MS;
            from_millis(start_ms, timestamp)
        }
        Granularity::Monthly => {
            // Calendar month in report-local (UTC) time.
            let date = timestamp.date_naive();
            NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .and_then(|first| first.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
                .unwrap_or(timestamp)
        }
    }
}

fn period_key(start: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => start.format("%Y-%m-%d").to_string(),
        Granularity::Weekly => {
            let week = start.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        Granularity::Monthly => start.format("%Y-%m").to_string(),
    }
}

fn from_millis(ms: i64, fallback: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or(fallback)
}
