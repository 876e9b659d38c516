// src/pipeline/location.rs
//! Location news: resolve a place name, search around it, drop ads and stale
//! items, then bucket what is left by topic.

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;

use crate::analyze::{AdFilter, CategorizedNews, Categorizer, DateFilter};
use crate::config::{PipelineSettings, ScoringTables};
use crate::error::ServiceError;
use crate::geo::{Coordinates, GeoResolver};
use crate::ingest::types::{Article, ArticleSource};
use crate::ingest::{dedup_by_url, search_many};

#[derive(Debug, Clone)]
pub struct LocationQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
    pub keyword: Option<String>,
}

impl LocationQuery {
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            radius_km: None,
            keyword: None,
        }
    }

    pub fn keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    pub fn radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = Some(radius_km);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationNews {
    pub articles: Vec<Article>,
    pub categorized: CategorizedNews,
    pub area: String,
    pub radius_km: f64,
    pub center: Coordinates,
    /// Recent articles, before categorization.
    pub nearby_events: usize,
    pub summary: String,
    /// Why the article list may be incomplete; `None` when the source answered.
    pub reason: Option<String>,
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "pipeline_location_total",
            "Location news requests served."
        );
        describe_counter!(
            "geo_fallback_total",
            "Reverse geocoding failures answered with a coordinate label."
        );
    });
}

/// The search string: keyword before place, or the place alone.
pub fn location_search_query(keyword: Option<&str>, area: &str) -> String {
    match keyword.map(str::trim).filter(|k| !k.is_empty()) {
        Some(k) => format!("{k} {area}"),
        None => area.to_string(),
    }
}

pub struct LocationNewsPipeline {
    source: Arc<dyn ArticleSource>,
    geo: Arc<dyn GeoResolver>,
    ads: AdFilter,
    categorizer: Categorizer,
    recency: DateFilter,
    settings: PipelineSettings,
}

impl LocationNewsPipeline {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        geo: Arc<dyn GeoResolver>,
        tables: Arc<ScoringTables>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            ads: AdFilter::new(tables.clone()),
            categorizer: Categorizer::new(tables),
            recency: DateFilter::days(settings.recency_days),
            source,
            geo,
            settings,
        }
    }

    pub async fn run(&self, query: &LocationQuery) -> Result<LocationNews, ServiceError> {
        self.run_at(query, Utc::now()).await
    }

    /// Same as `run` with an explicit clock for the recency window.
    pub async fn run_at(
        &self,
        query: &LocationQuery,
        now: DateTime<Utc>,
    ) -> Result<LocationNews, ServiceError> {
        ensure_metrics_described();
        let center = Coordinates::new(query.lat, query.lng)?;
        let radius_km = match query.radius_km {
            None => self.settings.default_radius_km,
            Some(r) if r.is_finite() && r > 0.0 => r,
            Some(r) => {
                return Err(ServiceError::invalid(format!(
                    "radius_km must be a positive number, got {r}"
                )))
            }
        };

        let area = match self.geo.reverse(center).await {
            Ok(name) if !name.trim().is_empty() => name,
            Ok(_) | Err(_) => {
                tracing::warn!(target: "pipeline", resolver = self.geo.name(), "reverse geocoding failed; using coordinate label");
                counter!("geo_fallback_total").increment(1);
                center.fallback_label()
            }
        };

        let search = location_search_query(query.keyword.as_deref(), &area);
        let searched = search_many(
            self.source.as_ref(),
            std::slice::from_ref(&search),
            self.settings.location_search_limit,
            self.settings.search_timeout,
        )
        .await;
        let reason = searched.degraded_reason(self.source.name());
        if let Some(r) = &reason {
            tracing::warn!(target: "pipeline", source = self.source.name(), reason = %r, "location search degraded");
        }

        let (unique, _) = dedup_by_url(searched.articles);
        let (editorial, ads) = self.ads.retain_editorial(unique);
        let recent = self.recency.apply(editorial, now);
        let categorized = self.categorizer.categorize(&recent);

        counter!("pipeline_location_total").increment(1);
        tracing::info!(
            target: "pipeline",
            area = %area,
            ads_filtered = ads,
            recent = recent.len(),
            categories = categorized.iter().count(),
            "location news served"
        );

        Ok(LocationNews {
            summary: format!(
                "Found {} news items within {}km of {}",
                recent.len(),
                radius_km,
                area
            ),
            nearby_events: recent.len(),
            articles: recent,
            categorized,
            area,
            radius_km,
            center,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_precedes_place() {
        assert_eq!(
            location_search_query(Some("flood"), "Chennai, India"),
            "flood Chennai, India"
        );
        assert_eq!(location_search_query(Some("  "), "Chennai, India"), "Chennai, India");
        assert_eq!(location_search_query(None, "Pune"), "Pune");
    }

    #[test]
    fn builder_sets_optional_fields() {
        let q = LocationQuery::at(1.0, 2.0).keyword("rain").radius_km(10.0);
        assert_eq!(q.keyword.as_deref(), Some("rain"));
        assert_eq!(q.radius_km, Some(10.0));
    }
}
