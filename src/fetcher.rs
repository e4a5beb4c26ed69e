//! Fetches the upstream rate table from the Bank of Israel public API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{ExchangeError, ExchangeResult};
use crate::rates::{RateQuote, RateTable};

/// Source of the current rate table. One fetch per call, no caching and no
/// retries; the transport layer above may impose either.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch(&self) -> ExchangeResult<RateTable>;
}

// Upstream wire shape. Field names are the feed's own; `currentChange` is
// also present in the payload but unused downstream, so it is not declared.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRatesResponse {
    exchange_rates: Vec<ExchangeRateItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRateItem {
    key: String,
    current_exchange_rate: f64,
    unit: u32,
    last_update: DateTime<Utc>,
}

impl From<ExchangeRateItem> for RateQuote {
    fn from(item: ExchangeRateItem) -> Self {
        RateQuote {
            code: item.key,
            rate: item.current_exchange_rate,
            unit: item.unit,
            last_update: item.last_update,
        }
    }
}

/// Fetcher backed by the Bank of Israel `GetExchangeRates` endpoint.
pub struct BankOfIsraelFetcher {
    base_url: String,
}

impl BankOfIsraelFetcher {
    pub const DEFAULT_BASE_URL: &'static str = "https://boi.org.il/PublicApi";

    pub fn new(base_url: &str) -> Self {
        BankOfIsraelFetcher {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl RateFetcher for BankOfIsraelFetcher {
    #[instrument(name = "BoiRateFetch", skip(self))]
    async fn fetch(&self) -> ExchangeResult<RateTable> {
        let url = format!("{}/GetExchangeRates?asJson=true", self.base_url);
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("boi-exchange/0.1")
            .build()
            .map_err(|e| ExchangeError::UpstreamUnavailable(e.to_string()))?;

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| ExchangeError::UpstreamUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExchangeError::UpstreamUnavailable(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ExchangeError::UpstreamUnavailable(e.to_string()))?;

        let data: ExchangeRatesResponse = serde_json::from_str(&text)
            .map_err(|e| ExchangeError::MalformedResponse(e.to_string()))?;

        debug!(quotes = data.exchange_rates.len(), "Parsed upstream quotes");

        let quotes = data.exchange_rates.into_iter().map(Into::into).collect();
        RateTable::from_upstream(quotes)
    }
}
