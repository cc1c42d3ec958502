use crate::auth::sign_request;
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use configuration::settings::ApiConfig;
use core_types::{LedgerEvent, PriceSample};
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

mod auth;
pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{ApiErrorResponse, BalanceResponse, DepositRow, IncomeRow, TickerPrice, WithdrawRow};

/// One page per income/kline request; the Binance maximum.
const PAGE_LIMIT: usize = 1000;

/// Bounded retry for rate-limited requests.
const MAX_ATTEMPTS: u32 = 5;
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// The generic, abstract interface for the account-data retrieval side of
/// the pipeline. The report builder depends on this trait, so the live
/// client can be swapped for a fixture-backed one in tests.
#[async_trait]
pub trait AccountDataSource: Send + Sync {
    /// Fetches the full futures income history (PnL, funding, commissions,
    /// wallet transfers) for the window. (Authenticated)
    async fn fetch_income(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<LedgerEvent>, ApiError>;

    /// Fetches credited spot-wallet deposits for the window. (Authenticated)
    async fn fetch_deposits(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<LedgerEvent>, ApiError>;

    /// Fetches completed spot-wallet withdrawals for the window. (Authenticated)
    async fn fetch_withdrawals(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<LedgerEvent>, ApiError>;

    /// Fetches the daily reference price series for a symbol.
    async fn fetch_daily_prices(
        &self,
        symbol: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<PriceSample>, ApiError>;

    /// Fetches the latest price for every traded symbol.
    async fn fetch_spot_prices(&self) -> Result<HashMap<String, Decimal>, ApiError>;

    /// Fetches the current futures wallet balances per asset. (Authenticated)
    async fn fetch_balances(&self) -> Result<Vec<BalanceResponse>, ApiError>;
}

/// A concrete implementation of `AccountDataSource` for Binance.
///
/// Futures data comes from the USDⓈ-M API, deposit/withdrawal history from
/// the spot API. All blocking retrieval concerns (pagination, request
/// signing, rate-limit backoff) live here; the analytics core receives
/// fully materialized collections.
#[derive(Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    futures_base: String,
    spot_base: String,
    api_secret: String,
}

impl BinanceClient {
    pub fn new(live_mode: bool, api_config: &ApiConfig) -> Self {
        let (futures_base, keys) = if live_mode {
            ("https://fapi.binance.com".to_string(), &api_config.production)
        } else {
            (
                "https://testnet.binancefuture.com".to_string(),
                &api_config.testnet,
            )
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            "X-MBX-APIKEY",
            HeaderValue::from_str(&keys.key).expect("Invalid API Key"),
        );

        Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .build()
                .expect("Failed to build reqwest client"),
            futures_base,
            spot_base: "https://api.binance.com".to_string(),
            api_secret: keys.secret.clone(),
        }
    }

    /// Signed GET with bounded exponential backoff on rate limits.
    async fn get_signed<T: DeserializeOwned>(
        &self,
        base: &str,
        path: &str,
        params: &BTreeMap<&str, String>,
    ) -> Result<T, ApiError> {
        let mut attempt = 0;
        loop {
            match self.get_signed_once(base, path, params).await {
                Err(ApiError::RateLimited(code)) if attempt + 1 < MAX_ATTEMPTS => {
                    let delay = BACKOFF_BASE * 2u32.pow(attempt);
                    warn!(code, attempt, ?delay, "rate limited, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn get_signed_once<T: DeserializeOwned>(
        &self,
        base: &str,
        path: &str,
        params: &BTreeMap<&str, String>,
    ) -> Result<T, ApiError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let mut params = params.clone();
        params.insert("timestamp", timestamp.to_string());

        let query_string = serde_qs::to_string(&params)
            .map_err(|e| ApiError::InvalidData(e.to_string()))?;
        let signature = sign_request(&self.api_secret, &query_string);

        let url = format!("{base}{path}?{query_string}&signature={signature}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited(-1003));
        }
        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let api_error: ApiErrorResponse = serde_json::from_str(&text).map_err(|e| {
                ApiError::Deserialization(format!(
                    "Failed to deserialize error response: {e}. Original text: {text}"
                ))
            })?;
            if api_error.code == -1003 {
                Err(ApiError::RateLimited(api_error.code))
            } else {
                Err(ApiError::BinanceError(api_error.code, api_error.msg))
            }
        }
    }

    /// Public (unsigned) GET with the same backoff policy.
    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut attempt = 0;
        loop {
            let response = self
                .client
                .get(format!("{}{}", self.futures_base, path))
                .query(query)
                .send()
                .await?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                if attempt + 1 >= MAX_ATTEMPTS {
                    return Err(ApiError::RateLimited(-1003));
                }
                let delay = BACKOFF_BASE * 2u32.pow(attempt);
                warn!(attempt, ?delay, "rate limited, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let text = response.text().await?;
            return serde_json::from_str::<T>(&text)
                .map_err(|e| ApiError::Deserialization(e.to_string()));
        }
    }
}

// Intermediate struct for deserializing klines from the Binance API.
#[derive(Deserialize)]
struct RawKline(
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    i64,
    String,
    String,
    String,
);

#[async_trait]
impl AccountDataSource for BinanceClient {
    async fn fetch_income(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<LedgerEvent>, ApiError> {
        let mut events = Vec::new();
        let mut cursor = start_time.timestamp_millis();
        let end_ms = end_time.timestamp_millis();

        // The income endpoint pages forward in time; advance the cursor one
        // millisecond past the last row of each full page.
        loop {
            let mut params = BTreeMap::new();
            params.insert("startTime", cursor.to_string());
            params.insert("endTime", end_ms.to_string());
            params.insert("limit", PAGE_LIMIT.to_string());

            let rows: Vec<IncomeRow> = self
                .get_signed(&self.futures_base, "/fapi/v1/income", &params)
                .await?;
            debug!(rows = rows.len(), cursor, "fetched income page");

            let page_len = rows.len();
            let last_time = rows.last().map(|r| r.time);
            events.extend(rows.iter().filter_map(IncomeRow::to_ledger_event));

            match last_time {
                Some(t) if page_len == PAGE_LIMIT => cursor = t + 1,
                _ => break,
            }
        }

        Ok(events)
    }

    async fn fetch_deposits(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<LedgerEvent>, ApiError> {
        let mut params = BTreeMap::new();
        params.insert("startTime", start_time.timestamp_millis().to_string());
        params.insert("endTime", end_time.timestamp_millis().to_string());
        params.insert("limit", PAGE_LIMIT.to_string());

        let rows: Vec<DepositRow> = self
            .get_signed(&self.spot_base, "/sapi/v1/capital/deposit/hisrec", &params)
            .await?;

        // Status 1 = credited.
        Ok(rows
            .iter()
            .filter(|r| r.status == 1)
            .filter_map(DepositRow::to_ledger_event)
            .collect())
    }

    async fn fetch_withdrawals(
        &self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<LedgerEvent>, ApiError> {
        let mut params = BTreeMap::new();
        params.insert("startTime", start_time.timestamp_millis().to_string());
        params.insert("endTime", end_time.timestamp_millis().to_string());
        params.insert("limit", PAGE_LIMIT.to_string());

        let rows: Vec<WithdrawRow> = self
            .get_signed(&self.spot_base, "/sapi/v1/capital/withdraw/history", &params)
            .await?;

        // Status 6 = completed.
        Ok(rows
            .iter()
            .filter(|r| r.status == 6)
            .filter_map(WithdrawRow::to_ledger_event)
            .collect())
    }

    async fn fetch_daily_prices(
        &self,
        symbol: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Vec<PriceSample>, ApiError> {
        let mut samples = Vec::new();
        let mut cursor = start_time.timestamp_millis();
        let end_ms = end_time.timestamp_millis();

        loop {
            let query = [
                ("symbol", symbol.to_string()),
                ("interval", "1d".to_string()),
                ("startTime", cursor.to_string()),
                ("endTime", end_ms.to_string()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            let rows: Vec<RawKline> = self.get_public("/fapi/v1/klines", &query).await?;
            debug!(rows = rows.len(), cursor, "fetched kline page");

            let page_len = rows.len();
            let last_open = rows.last().map(|r| r.0);
            for raw in rows {
                samples.push(PriceSample {
                    timestamp: Utc
                        .timestamp_millis_opt(raw.0)
                        .single()
                        .ok_or_else(|| ApiError::InvalidData(format!("Invalid open_time: {}", raw.0)))?,
                    open: Decimal::from_str(&raw.1)
                        .map_err(|e| ApiError::Deserialization(e.to_string()))?,
                    close: Decimal::from_str(&raw.4)
                        .map_err(|e| ApiError::Deserialization(e.to_string()))?,
                });
            }

            match last_open {
                Some(t) if page_len == PAGE_LIMIT => cursor = t + 1,
                _ => break,
            }
        }

        Ok(samples)
    }

    async fn fetch_spot_prices(&self) -> Result<HashMap<String, Decimal>, ApiError> {
        let tickers: Vec<TickerPrice> = self.get_public("/fapi/v1/ticker/price", &[]).await?;
        Ok(tickers.into_iter().map(|t| (t.symbol, t.price)).collect())
    }

    async fn fetch_balances(&self) -> Result<Vec<BalanceResponse>, ApiError> {
        let params = BTreeMap::new();
        self.get_signed(&self.futures_base, "/fapi/v2/balance", &params)
            .await
    }
}
