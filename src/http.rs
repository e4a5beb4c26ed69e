//! HTTP surface: routing, error mapping and client cache headers. All rate
//! logic lives in [`crate::engine`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Days, NaiveTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::engine::RateEngine;
use crate::error::ExchangeError;

pub fn router(engine: Arc<RateEngine>) -> Router {
    Router::new()
        .route("/currency/exchange", get(exchange))
        .route("/currency/rates", get(rates))
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
struct ExchangeParams {
    from: String,
    to: String,
    #[serde(default = "default_amount")]
    amount: f64,
}

fn default_amount() -> f64 {
    1.0
}

async fn exchange(
    State(engine): State<Arc<RateEngine>>,
    Query(params): Query<ExchangeParams>,
) -> Response {
    match engine
        .convert(&params.from, &params.to, params.amount)
        .await
    {
        Ok(result) => cacheable(Json(result)),
        Err(e @ (ExchangeError::UnknownCurrency(_) | ExchangeError::InvalidCurrencyCode(_))) => {
            warn!(error = %e, "Rejecting conversion request");
            (
                StatusCode::NOT_FOUND,
                format!(
                    "No exchange information found for {} to {}.",
                    params.from, params.to
                ),
            )
                .into_response()
        }
        Err(e) => fetch_failure(e),
    }
}

async fn rates(State(engine): State<Arc<RateEngine>>) -> Response {
    match engine.list_rates().await {
        Ok(result) => cacheable(Json(result)),
        Err(e) => fetch_failure(e),
    }
}

fn fetch_failure(e: ExchangeError) -> Response {
    warn!(error = %e, "Upstream fetch failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Exchange rates are temporarily unavailable.".to_string(),
    )
        .into_response()
}

/// Attaches a `Cache-Control` header advising clients to reuse the response
/// until the upstream's next plausible refresh.
fn cacheable(body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    let max_age = seconds_until_refresh_horizon(Utc::now());
    if let Ok(value) = header::HeaderValue::from_str(&format!("public, max-age={max_age}")) {
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, value);
    }
    response
}

/// Seconds until the midnight after tomorrow (UTC). The feed refreshes at
/// most once daily, so a response stays valid through tomorrow's boundary.
fn seconds_until_refresh_horizon(now: DateTime<Utc>) -> i64 {
    let horizon = (now.date_naive() + Days::new(2))
        .and_time(NaiveTime::MIN)
        .and_utc();
    (horizon - now).num_seconds()
}
