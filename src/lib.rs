// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod ai_bootstrap;
pub mod analyze;
pub mod api;
pub mod config;
pub mod debug;
pub mod error;
pub mod geo;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod service;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::error::ServiceError;
pub use crate::service::NewsService;

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::config::{PipelineSettings, ScoringTables};
use crate::geo::{CachedGeoResolver, NominatimResolver};
use crate::ingest::providers::GoogleNewsSource;

fn env_flag(key: &str) -> bool {
    std::env::var(key).ok().as_deref() == Some("1")
}

/// Production wiring: settings, tables and oracle from the environment,
/// Google News search and a cached Nominatim resolver.
///
/// `METRICS_ENABLED=1` mounts `/metrics`; `DEBUG_ROUTES=1` mounts `/debug/stats`.
pub async fn app() -> anyhow::Result<Router> {
    let settings = PipelineSettings::from_env();
    let tables = Arc::new(ScoringTables::from_env());
    let oracle = ai_bootstrap::OracleRuntime::from_env().oracle;

    let source = Arc::new(GoogleNewsSource::http(settings.search_timeout)?);
    let geo = Arc::new(CachedGeoResolver::new(
        Arc::new(NominatimResolver::new()?),
        settings.geo_cache_ttl,
        settings.geo_cache_precision,
    ));

    let service = NewsService::new(source, geo, oracle, tables, settings.clone());
    let mut app = router(AppState::new(service));

    if env_flag("METRICS_ENABLED") {
        let m = metrics::Metrics::init(&settings)?;
        app = app.merge(m.router());
    }
    if env_flag("DEBUG_ROUTES") {
        app = app.merge(debug::router());
    }
    info!(
        threshold = settings.relevance_threshold,
        recency_days = settings.recency_days,
        "news service ready"
    );
    Ok(app)
}

/// One-off smoke test of the configured oracle. Logs the outcome, never panics.
///
/// ```ignore
/// if let Err(e) = news_credibility_analyzer::run_oracle_quick_probe().await {
///     tracing::warn!(error=?e, "oracle quick probe didn't run");
/// }
/// ```
pub async fn run_oracle_quick_probe() -> anyhow::Result<()> {
    let path = std::env::var(config::ai::ENV_ORACLE_CONFIG_PATH)
        .unwrap_or_else(|_| config::ai::DEFAULT_ORACLE_CONFIG_PATH.to_string());
    let rt = ai_bootstrap::OracleRuntime::from_path(&path)?;
    rt.quick_probe().await;
    info!("oracle quick probe finished");
    Ok(())
}
