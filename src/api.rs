use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::debug;
use crate::error::ServiceError;
use crate::pipeline::{LocationNews, LocationQuery, TextVerdict, VerificationResult};
use crate::service::{NewsService, SearchResults};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsService>,
}

impl AppState {
    pub fn new(service: NewsService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/search", post(search))
        .route("/api/deep-analyze", post(deep_analyze))
        .route("/api/location-news", post(location_news))
        .route("/api/verify-text", post(verify_text))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Unwrap a JSON body, turning axum's rejection into `InvalidInput`.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload.map(|Json(b)| b).map_err(ServiceError::from)
}

#[derive(Deserialize)]
struct SearchReq {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct DeepReq {
    headline: String,
}

#[derive(Deserialize)]
struct LocationReq {
    lat: f64,
    lng: f64,
    #[serde(default, alias = "radiusKm")]
    radius_km: Option<f64>,
    #[serde(default)]
    keyword: Option<String>,
}

#[derive(Deserialize)]
struct VerifyTextReq {
    text: String,
}

async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchReq>, JsonRejection>,
) -> Result<Json<SearchResults>, ServiceError> {
    let body = json_body(payload)?;
    let t0 = Instant::now();
    let out = state.service.search_articles(&body.query, body.limit).await;
    debug::record_request("search", t0.elapsed().as_millis());
    out.map(Json)
}

async fn deep_analyze(
    State(state): State<AppState>,
    payload: Result<Json<DeepReq>, JsonRejection>,
) -> Result<Json<VerificationResult>, ServiceError> {
    let body = json_body(payload)?;
    let t0 = Instant::now();
    let out = state.service.deep_analyze(&body.headline).await;
    debug::record_request("deep_analyze", t0.elapsed().as_millis());
    out.map(Json)
}

async fn location_news(
    State(state): State<AppState>,
    payload: Result<Json<LocationReq>, JsonRejection>,
) -> Result<Json<LocationNews>, ServiceError> {
    let body = json_body(payload)?;
    let t0 = Instant::now();
    let query = LocationQuery {
        lat: body.lat,
        lng: body.lng,
        radius_km: body.radius_km,
        keyword: body.keyword,
    };
    let out = state.service.location_news(&query).await;
    debug::record_request("location_news", t0.elapsed().as_millis());
    out.map(Json)
}

async fn verify_text(
    State(state): State<AppState>,
    payload: Result<Json<VerifyTextReq>, JsonRejection>,
) -> Result<Json<TextVerdict>, ServiceError> {
    let body = json_body(payload)?;
    let t0 = Instant::now();
    let out = state.service.verify_text(&body.text).await;
    debug::record_request("verify_text", t0.elapsed().as_millis());
    out.map(Json)
}
