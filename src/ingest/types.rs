// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::normalize_text;

/// Snippets longer than this are cut at a char boundary.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// A candidate news article. Title and URL are always non-empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    title: String,
    description: String,
    url: String,
    published_at: Option<DateTime<Utc>>,
    source_name: String,
}

impl Article {
    /// Normalizes raw feed fields; `None` when title or URL end up empty.
    pub fn new(
        title: &str,
        description: &str,
        url: &str,
        published_at: Option<DateTime<Utc>>,
        source_name: &str,
    ) -> Option<Self> {
        let title = normalize_text(title, None);
        let url = url.trim().to_string();
        if title.is_empty() || url.is_empty() {
            return None;
        }
        let source_name = normalize_text(source_name, None);
        Some(Self {
            title,
            description: normalize_text(description, Some(DESCRIPTION_MAX_CHARS)),
            url,
            published_at,
            source_name: if source_name.is_empty() {
                "Unknown".to_string()
            } else {
                source_name
            },
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Lowercased `title + " " + description`, the text every matcher runs on.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

/// Parse a feed timestamp into UTC.
///
/// Accepts RFC 3339, RFC 2822 (RSS `pubDate`) and naive ISO-8601, which is
/// read as UTC. Anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc2822) {
        return DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), dt.nanosecond());
    }
    // obsolete zone names ("EDT", "Z") that the strict parser refuses
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// One search call. Results are per call; nothing is retained between calls.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn construction_requires_title_and_url() {
        assert!(Article::new("  <b></b> ", "d", "https://x", None, "S").is_none());
        assert!(Article::new("Title", "d", "   ", None, "S").is_none());
        let a = Article::new("Title &amp; more", "", "https://x/1", None, "").unwrap();
        assert_eq!(a.title(), "Title & more");
        assert_eq!(a.source_name(), "Unknown");
    }

    #[test]
    fn description_is_capped() {
        let long = "word ".repeat(100);
        let a = Article::new("T", &long, "https://x", None, "S").unwrap();
        assert!(a.description().chars().count() <= DESCRIPTION_MAX_CHARS);
    }

    #[test]
    fn timestamps_in_all_supported_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-14T09:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14T11:30:00+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("Fri, 14 Mar 2025 09:30:00 GMT"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("2025-03-14T09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn serializes_camel_case() {
        let a = Article::new("T", "D", "https://x", None, "Reuters").unwrap();
        let v = serde_json::to_value(&a).unwrap();
        assert!(v.get("sourceName").is_some());
        assert!(v.get("publishedAt").is_some());
    }
}
