//! Error types for the exchange core.

use thiserror::Error;

/// Errors surfaced by the fetcher and the rate engine.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The upstream feed could not be reached or returned a non-success status.
    #[error("Upstream feed unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream feed responded, but the body is not the expected shape.
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// The requested code is absent from the freshly fetched rate table.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The requested code is not a well-formed currency symbol.
    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
