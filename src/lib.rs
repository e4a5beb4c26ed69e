pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod log;
pub mod rates;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub async fn run(config_path: Option<&str>) -> Result<()> {
    info!("Currency exchange server starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let fetcher = Arc::new(fetcher::BankOfIsraelFetcher::new(&config.upstream.base_url));
    let engine = Arc::new(engine::RateEngine::new(fetcher));
    let app = http::router(engine);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(listen = %config.server.bind, "Listening for requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
