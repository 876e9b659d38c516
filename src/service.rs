// src/service.rs
//! `NewsService`: the four public operations behind one handle, shared by the
//! HTTP layer and the integration tests.

use serde::Serialize;
use std::sync::Arc;

use crate::analyze::oracle::DisabledOracle;
use crate::analyze::DynOracle;
use crate::config::{PipelineSettings, ScoringTables};
use crate::error::ServiceError;
use crate::geo::GeoResolver;
use crate::ingest::search_many;
use crate::ingest::types::{Article, ArticleSource};
use crate::pipeline::{
    DeepAnalysisPipeline, LocationNews, LocationNewsPipeline, LocationQuery, TextVerdict,
    TextVerifier, VerificationResult,
};

pub const DEFAULT_SEARCH_ARTICLES: usize = 10;
pub const MAX_SEARCH_ARTICLES: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub articles: Vec<Article>,
    pub total: usize,
    pub query: String,
    /// Set when the article source failed or timed out.
    pub reason: Option<String>,
}

pub struct NewsService {
    settings: PipelineSettings,
    source: Arc<dyn ArticleSource>,
    deep: DeepAnalysisPipeline,
    location: LocationNewsPipeline,
    text: TextVerifier,
}

impl NewsService {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        geo: Arc<dyn GeoResolver>,
        oracle: DynOracle,
        tables: Arc<ScoringTables>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            deep: DeepAnalysisPipeline::new(
                source.clone(),
                oracle.clone(),
                tables.clone(),
                settings.clone(),
            ),
            location: LocationNewsPipeline::new(
                source.clone(),
                geo,
                tables.clone(),
                settings.clone(),
            ),
            text: TextVerifier::new(oracle, tables),
            source,
            settings,
        }
    }

    pub fn builder(source: Arc<dyn ArticleSource>, geo: Arc<dyn GeoResolver>) -> NewsServiceBuilder {
        NewsServiceBuilder {
            source,
            geo,
            oracle: None,
            tables: None,
            settings: PipelineSettings::default(),
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Raw search passthrough. No ad filtering; `limit` is clamped to 1..=50.
    pub async fn search_articles(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<SearchResults, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::invalid("query must not be empty"));
        }
        let limit = limit
            .unwrap_or(DEFAULT_SEARCH_ARTICLES)
            .clamp(1, MAX_SEARCH_ARTICLES);

        let outcome = search_many(
            self.source.as_ref(),
            &[query.to_string()],
            limit,
            self.settings.search_timeout,
        )
        .await;
        let reason = outcome.degraded_reason(self.source.name());
        if let Some(r) = &reason {
            tracing::warn!(target: "pipeline", reason = %r, "article search degraded");
        }
        let mut articles = outcome.articles;
        articles.truncate(limit);
        Ok(SearchResults {
            total: articles.len(),
            articles,
            query: query.to_string(),
            reason,
        })
    }

    pub async fn deep_analyze(&self, headline: &str) -> Result<VerificationResult, ServiceError> {
        self.deep.run(headline).await
    }

    pub async fn location_news(&self, query: &LocationQuery) -> Result<LocationNews, ServiceError> {
        self.location.run(query).await
    }

    pub fn location_pipeline(&self) -> &LocationNewsPipeline {
        &self.location
    }

    pub async fn verify_text(&self, text: &str) -> Result<TextVerdict, ServiceError> {
        self.text.run(text).await
    }
}

/// Defaults: disabled oracle, embedded tables, default settings.
pub struct NewsServiceBuilder {
    source: Arc<dyn ArticleSource>,
    geo: Arc<dyn GeoResolver>,
    oracle: Option<DynOracle>,
    tables: Option<Arc<ScoringTables>>,
    settings: PipelineSettings,
}

impl NewsServiceBuilder {
    pub fn oracle(mut self, oracle: DynOracle) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn tables(mut self, tables: Arc<ScoringTables>) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> NewsService {
        NewsService::new(
            self.source,
            self.geo,
            self.oracle.unwrap_or_else(|| Arc::new(DisabledOracle)),
            self.tables
                .unwrap_or_else(|| Arc::new(ScoringTables::embedded())),
            self.settings,
        )
    }
}
