// src/config/pipeline.rs
//! Tunables for the verification and location pipelines.
//! Defaults match production behavior; each can be overridden from the environment.

use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.30;

pub const ENV_RELEVANCE_THRESHOLD: &str = "RELEVANCE_THRESHOLD";
pub const ENV_MAX_SCORED_SOURCES: &str = "MAX_SCORED_SOURCES";
pub const ENV_SEARCH_LIMIT: &str = "SEARCH_LIMIT";
pub const ENV_SEARCH_TIMEOUT_MS: &str = "SEARCH_TIMEOUT_MS";
pub const ENV_RECENCY_DAYS: &str = "RECENCY_DAYS";
pub const ENV_LOCATION_SEARCH_LIMIT: &str = "LOCATION_SEARCH_LIMIT";
pub const ENV_GEO_CACHE_TTL_SECS: &str = "GEO_CACHE_TTL_SECS";
pub const ENV_GEO_CACHE_PRECISION: &str = "GEO_CACHE_PRECISION";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Minimum headline/article match for an article to count as a source.
    pub relevance_threshold: f32,
    /// Upper bound on sources fed into the credibility score.
    pub max_scored_sources: usize,
    /// Articles requested per deep-analysis search call.
    pub search_limit: usize,
    pub search_timeout: Duration,
    pub recency_days: i64,
    pub location_search_limit: usize,
    pub default_radius_km: f64,
    pub geo_cache_ttl: Duration,
    /// Decimal places kept when keying the reverse-geocode cache.
    pub geo_cache_precision: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            max_scored_sources: 15,
            search_limit: 10,
            search_timeout: Duration::from_millis(8_000),
            recency_days: 2,
            location_search_limit: 20,
            default_radius_km: 25.0,
            geo_cache_ttl: Duration::from_secs(300),
            geo_cache_precision: 3,
        }
    }
}

impl PipelineSettings {
    /// Defaults overlaid with any valid env overrides. Invalid values are ignored.
    pub fn from_env() -> Self {
        let mut s = Self::default();
        let var = |k: &str| std::env::var(k).ok();

        if let Some(t) = parse_threshold_env(var(ENV_RELEVANCE_THRESHOLD)) {
            s.relevance_threshold = t;
        }
        if let Some(n) = parse_positive::<usize>(var(ENV_MAX_SCORED_SOURCES)) {
            s.max_scored_sources = n;
        }
        if let Some(n) = parse_positive::<usize>(var(ENV_SEARCH_LIMIT)) {
            s.search_limit = n.min(50);
        }
        if let Some(ms) = parse_positive::<u64>(var(ENV_SEARCH_TIMEOUT_MS)) {
            s.search_timeout = Duration::from_millis(ms);
        }
        if let Some(d) = parse_positive::<i64>(var(ENV_RECENCY_DAYS)) {
            s.recency_days = d;
        }
        if let Some(n) = parse_positive::<usize>(var(ENV_LOCATION_SEARCH_LIMIT)) {
            s.location_search_limit = n.min(100);
        }
        if let Some(secs) = var(ENV_GEO_CACHE_TTL_SECS).and_then(|v| v.trim().parse::<u64>().ok())
        {
            s.geo_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(p) = var(ENV_GEO_CACHE_PRECISION).and_then(|v| v.trim().parse::<u32>().ok()) {
            s.geo_cache_precision = p.min(6);
        }
        s
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

fn parse_positive<T>(raw: Option<String>) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
{
    raw.and_then(|s| s.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn threshold_parsing_clamps_and_rejects_garbage() {
        assert_eq!(parse_threshold_env(Some("0.45".into())), Some(0.45));
        assert_eq!(parse_threshold_env(Some("7".into())), Some(1.0));
        assert_eq!(parse_threshold_env(Some("-1".into())), Some(0.0));
        assert_eq!(parse_threshold_env(Some("NaN".into())), None);
        assert_eq!(parse_threshold_env(Some("abc".into())), None);
        assert_eq!(parse_threshold_env(None), None);
    }

    #[test]
    fn positive_parsing_rejects_zero() {
        assert_eq!(parse_positive::<usize>(Some("0".into())), None);
        assert_eq!(parse_positive::<usize>(Some(" 12 ".into())), Some(12));
        assert_eq!(parse_positive::<i64>(Some("-3".into())), None);
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_apply_over_defaults() {
        env::set_var(ENV_RELEVANCE_THRESHOLD, "0.5");
        env::set_var(ENV_SEARCH_LIMIT, "500");
        env::set_var(ENV_RECENCY_DAYS, "0");
        env::set_var(ENV_GEO_CACHE_TTL_SECS, "0");

        let s = PipelineSettings::from_env();
        assert_eq!(s.relevance_threshold, 0.5);
        assert_eq!(s.search_limit, 50, "search limit is capped");
        assert_eq!(s.recency_days, 2, "zero days is ignored");
        assert_eq!(s.geo_cache_ttl, Duration::ZERO, "ttl 0 disables caching");

        for k in [
            ENV_RELEVANCE_THRESHOLD,
            ENV_SEARCH_LIMIT,
            ENV_RECENCY_DAYS,
            ENV_GEO_CACHE_TTL_SECS,
        ] {
            env::remove_var(k);
        }
        assert_eq!(PipelineSettings::from_env(), PipelineSettings::default());
    }
}
