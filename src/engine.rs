//! Cross-rate computation over a freshly fetched rate table.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{ExchangeError, ExchangeResult};
use crate::fetcher::RateFetcher;
use crate::rates::{ConvertResult, CrossRate, RateQuote, RatesResult, round_to};

const RATE_DIGITS: i32 = 8;
const VALUE_DIGITS: i32 = 2;

/// The exchange rate between two quotes. The feed quotes "price in home
/// currency per `unit` units of foreign currency", so the `from` side's price
/// is normalized per unit while the `to` side's reciprocal is scaled by its
/// unit count. `updated_at` is the older of the two source timestamps; the
/// result is only as fresh as its stalest input.
pub fn cross_rate(from: &RateQuote, to: &RateQuote) -> CrossRate {
    let rate = (from.rate / from.unit as f64) / (to.rate * to.unit as f64);

    CrossRate {
        from: from.code.clone(),
        to: to.code.clone(),
        rate: round_to(rate, RATE_DIGITS),
        updated_at: from.last_update.min(to.last_update),
    }
}

/// Computes conversions and pairwise rate listings. Every call fetches a
/// fresh table; the engine holds no state beyond its fetcher, so concurrent
/// calls share nothing mutable.
pub struct RateEngine {
    fetcher: Arc<dyn RateFetcher>,
}

impl RateEngine {
    pub fn new(fetcher: Arc<dyn RateFetcher>) -> Self {
        RateEngine { fetcher }
    }

    /// Converts `amount` between two currencies at the current cross rate.
    #[instrument(skip(self))]
    pub async fn convert(&self, from: &str, to: &str, amount: f64) -> ExchangeResult<ConvertResult> {
        check_currency_code(from)?;
        check_currency_code(to)?;

        let table = self.fetcher.fetch().await?;

        let from_quote = table
            .get(from)
            .ok_or_else(|| ExchangeError::UnknownCurrency(from.to_string()))?;
        let to_quote = table
            .get(to)
            .ok_or_else(|| ExchangeError::UnknownCurrency(to.to_string()))?;

        let cross = cross_rate(from_quote, to_quote);
        let value = round_to(amount * cross.rate, VALUE_DIGITS);
        debug!(rate = cross.rate, value, "Computed conversion");

        Ok(ConvertResult {
            cross,
            amount,
            value,
        })
    }

    /// Computes the cross rate for every ordered pair of distinct currencies,
    /// grouped by destination currency in table order. The overall
    /// `updated_at` is the minimum `last_update` across the whole table, not
    /// of any particular pair.
    #[instrument(skip(self))]
    pub async fn list_rates(&self) -> ExchangeResult<RatesResult> {
        let table = self.fetcher.fetch().await?;

        let mut exchange_rates = Vec::with_capacity(table.quotes().len() * table.quotes().len());
        for to_quote in table.quotes() {
            for from_quote in table.quotes() {
                if from_quote.code != to_quote.code {
                    exchange_rates.push(cross_rate(from_quote, to_quote));
                }
            }
        }
        debug!(pairs = exchange_rates.len(), "Computed rate matrix");

        Ok(RatesResult {
            exchange_rates,
            updated_at: table.min_last_update(),
        })
    }
}

/// Well-formedness check for a requested currency code. This replaces the
/// shared code-set cache: a fresh table is fetched on every call anyway, so
/// membership is validated against it directly and only the code's shape is
/// checked up front.
fn check_currency_code(code: &str) -> ExchangeResult<()> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ExchangeError::InvalidCurrencyCode(code.to_string()));
    }
    Ok(())
}
