//! Rate table data model: upstream quotes, the home-currency anchor and the
//! derived cross-rate result types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ExchangeError, ExchangeResult};

/// The home currency. The upstream feed quotes every currency against it but
/// never quotes it against itself, so a synthetic anchor quote is appended to
/// every fetched table.
pub const HOME_CURRENCY: &str = "ILS";

/// One upstream-reported currency quote. `rate` is the price in home currency
/// for `unit` units of the quoted currency.
#[derive(Debug, Clone)]
pub struct RateQuote {
    pub code: String,
    pub rate: f64,
    pub unit: u32,
    pub last_update: DateTime<Utc>,
}

impl RateQuote {
    /// The synthetic home-currency quote. Timestamped at call time, so it is
    /// always the freshest quote in the table and never drives a result's
    /// `updated_at` to be staler than the foreign side.
    pub fn home_anchor() -> Self {
        RateQuote {
            code: HOME_CURRENCY.to_string(),
            rate: 1.0,
            unit: 1,
            last_update: Utc::now(),
        }
    }
}

/// Ordered collection of quotes for one fetch, anchor included. Codes are
/// unique; construction rejects tables that violate this.
#[derive(Debug, Clone)]
pub struct RateTable {
    quotes: Vec<RateQuote>,
}

impl RateTable {
    /// Builds a table from upstream quotes and appends the home anchor.
    /// Duplicate codes or quotes violating the invariants (`unit >= 1`,
    /// non-empty code, `rate > 0`) are a parse error, not a lookup hazard:
    /// pair generation downstream assumes uniqueness.
    pub fn from_upstream(quotes: Vec<RateQuote>) -> ExchangeResult<Self> {
        let mut all = quotes;
        all.push(RateQuote::home_anchor());

        for quote in &all {
            if quote.code.is_empty() {
                return Err(ExchangeError::MalformedResponse(
                    "quote with empty currency code".to_string(),
                ));
            }
            if quote.unit < 1 {
                return Err(ExchangeError::MalformedResponse(format!(
                    "quote for {} has unit 0",
                    quote.code
                )));
            }
            if quote.rate <= 0.0 {
                return Err(ExchangeError::MalformedResponse(format!(
                    "quote for {} has non-positive rate {}",
                    quote.code, quote.rate
                )));
            }
        }

        for (i, quote) in all.iter().enumerate() {
            if all[..i].iter().any(|q| q.code == quote.code) {
                return Err(ExchangeError::MalformedResponse(format!(
                    "duplicate currency code: {}",
                    quote.code
                )));
            }
        }

        Ok(RateTable { quotes: all })
    }

    pub fn get(&self, code: &str) -> Option<&RateQuote> {
        self.quotes.iter().find(|q| q.code == code)
    }

    pub fn quotes(&self) -> &[RateQuote] {
        &self.quotes
    }

    /// The stalest `last_update` in the table. Tables are never empty (the
    /// anchor is always present), so a minimum always exists.
    pub fn min_last_update(&self) -> DateTime<Utc> {
        self.quotes
            .iter()
            .map(|q| q.last_update)
            .min()
            .unwrap_or_else(Utc::now)
    }
}

/// Exchange rate between two specific currencies, derived from their quotes.
/// `updated_at` is the older of the two source timestamps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub updated_at: DateTime<Utc>,
}

/// A single conversion: the cross rate plus the requested amount and its
/// converted value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResult {
    #[serde(flatten)]
    pub cross: CrossRate,
    pub amount: f64,
    pub value: f64,
}

/// Every ordered pair of distinct currencies in the table, grouped by
/// destination currency. `updated_at` is the minimum across the whole table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesResult {
    pub exchange_rates: Vec<CrossRate>,
    pub updated_at: DateTime<Utc>,
}

/// Round half away from zero to `digits` decimal places.
pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn quote(code: &str, rate: f64, unit: u32, ts: i64) -> RateQuote {
        RateQuote {
            code: code.to_string(),
            rate,
            unit,
            last_update: Utc.timestamp_opt(ts, 0).unwrap(),
        }
    }

    #[test]
    fn test_anchor_always_appended() {
        let table = RateTable::from_upstream(vec![quote("USD", 3.5, 1, 1_700_000_000)]).unwrap();
        let anchor = table.get(HOME_CURRENCY).expect("anchor missing");
        assert_eq!(anchor.rate, 1.0);
        assert_eq!(anchor.unit, 1);
        assert_eq!(table.quotes().len(), 2);
    }

    #[test]
    fn test_anchor_present_for_empty_upstream() {
        let table = RateTable::from_upstream(vec![]).unwrap();
        assert_eq!(table.quotes().len(), 1);
        assert!(table.get(HOME_CURRENCY).is_some());
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let result = RateTable::from_upstream(vec![
            quote("USD", 3.5, 1, 1_700_000_000),
            quote("USD", 3.6, 1, 1_700_000_000),
        ]);
        assert!(matches!(result, Err(ExchangeError::MalformedResponse(_))));
    }

    #[test]
    fn test_upstream_home_quote_rejected_as_duplicate() {
        // The feed never quotes ILS against itself; if it did, the synthetic
        // anchor would collide with it.
        let result = RateTable::from_upstream(vec![quote("ILS", 1.0, 1, 1_700_000_000)]);
        assert!(matches!(result, Err(ExchangeError::MalformedResponse(_))));
    }

    #[test]
    fn test_invariant_violations_rejected() {
        for bad in [
            quote("", 3.5, 1, 0),
            quote("USD", 3.5, 0, 0),
            quote("USD", 0.0, 1, 0),
            quote("USD", -1.2, 1, 0),
        ] {
            let result = RateTable::from_upstream(vec![bad]);
            assert!(matches!(result, Err(ExchangeError::MalformedResponse(_))));
        }
    }

    #[test]
    fn test_min_last_update_is_table_minimum() {
        let table = RateTable::from_upstream(vec![
            quote("USD", 3.5, 1, 1_700_000_000),
            quote("EUR", 3.9, 1, 1_600_000_000),
            quote("JPY", 2.4, 100, 1_800_000_000),
        ])
        .unwrap();
        assert_eq!(
            table.min_last_update(),
            Utc.timestamp_opt(1_600_000_000, 0).unwrap()
        );
    }

    #[test]
    fn test_anchor_is_freshest_quote() {
        let table = RateTable::from_upstream(vec![quote("USD", 3.5, 1, 1_700_000_000)]).unwrap();
        let anchor = table.get(HOME_CURRENCY).unwrap();
        let usd = table.get("USD").unwrap();
        assert!(anchor.last_update > usd.last_update);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456789123, 8), 1.23456789);
        assert_eq!(round_to(35.004999, 2), 35.0);
        assert_eq!(round_to(35.005001, 2), 35.01);
    }
}
