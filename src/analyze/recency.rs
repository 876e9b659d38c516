// src/analyze/recency.rs
use chrono::{DateTime, Duration, Utc};

use crate::ingest::types::Article;

/// Trailing recency window. Articles at or after `now - window` are kept;
/// articles without a timestamp are dropped.
#[derive(Debug, Clone, Copy)]
pub struct DateFilter {
    window: Duration,
}

impl DateFilter {
    pub fn days(days: i64) -> Self {
        Self {
            window: Duration::days(days.max(0)),
        }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    pub fn is_recent(&self, article: &Article, now: DateTime<Utc>) -> bool {
        article
            .published_at()
            .is_some_and(|ts| ts >= self.cutoff(now))
    }

    pub fn apply(&self, articles: Vec<Article>, now: DateTime<Utc>) -> Vec<Article> {
        articles
            .into_iter()
            .filter(|a| self.is_recent(a, now))
            .collect()
    }
}
