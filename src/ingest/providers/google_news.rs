// src/ingest/providers/google_news.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{parse_timestamp, Article, ArticleSource};

pub const GOOGLE_NEWS_RSS: &str = "https://news.google.com/rss/search";
pub const FALLBACK_SOURCE: &str = "Google News";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<SourceTag>,
}

#[derive(Debug, Deserialize)]
struct SourceTag {
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

/// Split `"Headline - Outlet"` on the last separator.
pub fn split_title_source(raw: &str) -> (&str, Option<&str>) {
    match raw.rsplit_once(" - ") {
        Some((title, source)) if !title.trim().is_empty() && !source.trim().is_empty() => {
            (title.trim(), Some(source.trim()))
        }
        _ => (raw.trim(), None),
    }
}

/// Parse a Google News RSS document into articles, keeping at most `limit`.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<Article>> {
    let t0 = std::time::Instant::now();
    let rss: Rss = from_str(xml).context("parsing google news rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len().min(limit));
    for it in rss.channel.item {
        if out.len() >= limit {
            break;
        }
        let raw_title = it.title.as_deref().unwrap_or_default();
        let (title, from_title) = split_title_source(raw_title);
        let source = from_title
            .map(str::to_string)
            .or_else(|| it.source.and_then(|s| s.name))
            .unwrap_or_else(|| FALLBACK_SOURCE.to_string());
        let published = it.pub_date.as_deref().and_then(parse_timestamp);

        if let Some(a) = Article::new(
            title,
            it.description.as_deref().unwrap_or_default(),
            it.link.as_deref().unwrap_or_default(),
            published,
            &source,
        ) {
            out.push(a);
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    Ok(out)
}

enum Mode {
    Fixture(String),
    Http {
        base_url: String,
        client: reqwest::Client,
    },
}

/// Google News search over RSS. Fixture mode answers every query from one document.
pub struct GoogleNewsSource {
    mode: Mode,
}

impl GoogleNewsSource {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn http(timeout: Duration) -> Result<Self> {
        Self::with_base_url(GOOGLE_NEWS_RSS, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("news-credibility-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building google news http client")?;
        Ok(Self {
            mode: Mode::Http {
                base_url: base_url.to_string(),
                client,
            },
        })
    }
}

#[async_trait]
impl ArticleSource for GoogleNewsSource {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>> {
        match &self.mode {
            Mode::Fixture(s) => parse_feed(s, limit),
            Mode::Http { base_url, client } => {
                let body = client
                    .get(base_url)
                    .query(&[
                        ("q", query),
                        ("hl", "en-US"),
                        ("gl", "US"),
                        ("ceid", "US:en"),
                    ])
                    .send()
                    .await
                    .context("google news http get()")?
                    .error_for_status()
                    .context("google news http status")?
                    .text()
                    .await
                    .context("google news http .text()")?;
                parse_feed(&body, limit)
            }
        }
    }

    fn name(&self) -> &'static str {
        "google-news"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_split_uses_last_separator() {
        assert_eq!(
            split_title_source("Rain - and more rain - BBC"),
            ("Rain - and more rain", Some("BBC"))
        );
        assert_eq!(split_title_source("No outlet here"), ("No outlet here", None));
        assert_eq!(split_title_source(" - BBC"), ("- BBC", None));
    }

    #[test]
    fn empty_channel_yields_no_articles() {
        let xml = r#"<rss version="2.0"><channel><title>x</title></channel></rss>"#;
        assert!(parse_feed(xml, 10).unwrap().is_empty());
    }

    #[test]
    fn source_element_used_when_title_has_no_outlet() {
        let xml = r#"<rss version="2.0"><channel>
<item><title>Plain headline</title><link>https://n/1</link>
<source url="https://npr.org">NPR</source></item>
<item><title>Bare</title><link>https://n/2</link></item>
</channel></rss>"#;
        let v = parse_feed(xml, 10).unwrap();
        assert_eq!(v[0].source_name(), "NPR");
        assert_eq!(v[1].source_name(), FALLBACK_SOURCE);
    }
}
