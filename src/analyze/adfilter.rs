// src/analyze/adfilter.rs
use metrics::counter;
use std::sync::Arc;

use crate::config::ScoringTables;
use crate::ingest::types::Article;

/// Binary promotional-content classifier over title, description and URL.
#[derive(Clone)]
pub struct AdFilter {
    tables: Arc<ScoringTables>,
}

impl AdFilter {
    pub fn new(tables: Arc<ScoringTables>) -> Self {
        Self { tables }
    }

    pub fn is_advertisement(&self, article: &Article) -> bool {
        let text = article.search_text();
        let url = article.url().to_lowercase();
        self.tables
            .ad_patterns
            .iter()
            .any(|p| text.contains(p.as_str()) || url.contains(p.as_str()))
    }

    /// Drop ads, preserving order. Returns (kept, dropped count).
    pub fn retain_editorial(&self, articles: Vec<Article>) -> (Vec<Article>, usize) {
        let before = articles.len();
        let kept: Vec<Article> = articles
            .into_iter()
            .filter(|a| !self.is_advertisement(a))
            .collect();
        let dropped = before - kept.len();
        if dropped > 0 {
            counter!("ingest_ads_filtered_total").increment(dropped as u64);
        }
        (kept, dropped)
    }
}
