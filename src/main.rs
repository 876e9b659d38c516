//! News credibility service: binary entrypoint.
//! Boots the Axum HTTP server on Shuttle with the production wiring from the library.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - NEWS_DEV_LOG=1
fn enable_dev_tracing() {
    if !news_credibility_analyzer::debug::dev_logging_enabled() {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pipeline=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let router = news_credibility_analyzer::app()
        .await
        .map_err(shuttle_runtime::Error::Custom)?;

    if std::env::var("ORACLE_QUICK_PROBE").ok().as_deref() == Some("1") {
        if let Err(e) = news_credibility_analyzer::run_oracle_quick_probe().await {
            tracing::warn!(error = ?e, "oracle quick probe didn't run");
        }
    }

    Ok(router.into())
}
