// tests/common/mod.rs
//
// In-process fakes for the article source and geocoder, shared by the
// integration suites.
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use news_credibility_analyzer::analyze::DynOracle;
use news_credibility_analyzer::config::PipelineSettings;
use news_credibility_analyzer::geo::{Coordinates, GeoResolver};
use news_credibility_analyzer::ingest::types::{Article, ArticleSource};
use news_credibility_analyzer::NewsService;

pub fn article(
    title: &str,
    description: &str,
    url: &str,
    published_at: Option<DateTime<Utc>>,
    source: &str,
) -> Article {
    Article::new(title, description, url, published_at, source).expect("valid test article")
}

/// Answers every query with the same articles and records what was asked.
/// Queries listed in `fail_on` error out instead; queries in `stall_on`
/// hang for an hour.
pub struct CountingSource {
    articles: Vec<Article>,
    fail_on: Vec<String>,
    stall_on: Vec<String>,
    queries: Mutex<Vec<String>>,
}

impl CountingSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles,
            fail_on: Vec::new(),
            stall_on: Vec::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.fail_on.push(query.to_string());
        self
    }

    pub fn stalling_on(mut self, query: &str) -> Self {
        self.stall_on.push(query.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().len()
    }

    pub fn queries(&self) -> Vec<String> {
        let mut q = self.queries.lock().clone();
        q.sort();
        q
    }
}

#[async_trait]
impl ArticleSource for CountingSource {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>> {
        self.queries.lock().push(query.to_string());
        if self.fail_on.iter().any(|q| q == query) {
            return Err(anyhow!("scripted failure for '{query}'"));
        }
        if self.stall_on.iter().any(|q| q == query) {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        }
        Ok(self.articles.iter().take(limit).cloned().collect())
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Every search fails, like an outage.
pub struct FailingSource;

#[async_trait]
impl ArticleSource for FailingSource {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Article>> {
        Err(anyhow!("connection refused"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Reverse lookups return a fixed place, or fail when none is set.
pub struct FixedGeo {
    place: Option<String>,
}

impl FixedGeo {
    pub fn named(place: &str) -> Self {
        Self {
            place: Some(place.to_string()),
        }
    }

    pub fn down() -> Self {
        Self { place: None }
    }
}

#[async_trait]
impl GeoResolver for FixedGeo {
    async fn reverse(&self, _at: Coordinates) -> Result<String> {
        self.place.clone().ok_or_else(|| anyhow!("geocoder down"))
    }

    async fn forward(&self, _place: &str) -> Result<Coordinates> {
        Err(anyhow!("not used in tests"))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

pub fn service(source: Arc<dyn ArticleSource>, oracle: Option<DynOracle>) -> NewsService {
    service_with(source, Arc::new(FixedGeo::named("Chennai, India")), oracle)
}

pub fn service_with(
    source: Arc<dyn ArticleSource>,
    geo: Arc<dyn GeoResolver>,
    oracle: Option<DynOracle>,
) -> NewsService {
    let mut b = NewsService::builder(source, geo).settings(PipelineSettings::default());
    if let Some(o) = oracle {
        b = b.oracle(o);
    }
    b.build()
}
