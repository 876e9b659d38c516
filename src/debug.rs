// src/debug.rs
//! Dev-only diagnostics: the dev-log gate, anonymized ids, and a `/debug/stats`
//! router with per-operation counters and rolling latency.

use axum::{routing::get, Json, Router};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

const LAT_CAP: usize = 200;
const SLOW_REQ_MS: u128 = 5_000;

// Dev logging gate: NEWS_DEV_LOG=1 AND dev env (debug or SHUTTLE_ENV in {local,development,dev})
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var("NEWS_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// 12 hex chars of SHA-256. Logs carry this instead of raw headlines.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

#[derive(Default, Clone, Serialize)]
pub struct Stats {
    pub total_requests: u64,
    pub by_operation: BTreeMap<&'static str, u64>,
    pub slowest_recent_ms: Option<u128>,
    pub rolling_avg_ms: Option<f64>,
}

static STATS: Lazy<Mutex<Stats>> = Lazy::new(|| Mutex::new(Stats::default()));
static LAT_MS: Lazy<Mutex<VecDeque<u128>>> =
    Lazy::new(|| Mutex::new(VecDeque::with_capacity(LAT_CAP)));

pub fn router() -> Router {
    Router::new().route("/debug/stats", get(stats))
}

/// Count one served operation and fold its latency into the rolling average.
pub fn record_request(operation: &'static str, lat_ms: u128) {
    let avg = {
        let mut q = LAT_MS.lock().unwrap_or_else(|e| e.into_inner());
        if q.len() >= LAT_CAP {
            q.pop_front();
        }
        q.push_back(lat_ms);
        let sum: u128 = q.iter().copied().sum();
        sum as f64 / q.len() as f64
    };

    let mut s = STATS.lock().unwrap_or_else(|e| e.into_inner());
    s.total_requests += 1;
    *s.by_operation.entry(operation).or_insert(0) += 1;
    s.rolling_avg_ms = Some(avg);
    if lat_ms > SLOW_REQ_MS {
        s.slowest_recent_ms = Some(s.slowest_recent_ms.map_or(lat_ms, |m| m.max(lat_ms)));
        tracing::warn!(target: "api", operation, lat_ms = lat_ms as u64, "slow request");
    }
}

async fn stats() -> Json<Stats> {
    Json(STATS.lock().unwrap_or_else(|e| e.into_inner()).clone())
}
