// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{Article, ArticleSource};
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::time::Duration;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_articles_total",
            "Articles returned by article sources."
        );
        describe_counter!(
            "ingest_ads_filtered_total",
            "Articles dropped as advertisements."
        );
        describe_counter!(
            "ingest_search_errors_total",
            "Search calls that failed or timed out."
        );
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Normalize feed text: decode entities, strip tags, ASCII quotes, collapse whitespace.
/// `max_chars` caps the result at a char boundary.
pub fn normalize_text(s: &str, max_chars: Option<usize>) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    match max_chars {
        Some(max) => truncate_chars(&out, max).to_string(),
        None => out,
    }
}

/// Longest prefix of `s` with at most `max` chars.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end(),
        None => s,
    }
}

/// Keep the first article per URL (trailing slash ignored). Returns (kept, removed).
pub fn dedup_by_url(articles: Vec<Article>) -> (Vec<Article>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let before = articles.len();
    let kept: Vec<Article> = articles
        .into_iter()
        .filter(|a| seen.insert(a.url().trim_end_matches('/').to_string()))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Merged result of a fan-out search.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Results in query order, not yet de-duplicated.
    pub articles: Vec<Article>,
    pub attempted: usize,
    pub failed: usize,
}

impl SearchOutcome {
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failed == self.attempted
    }

    /// Set when no query answered, naming the source that was down.
    pub fn unavailable_reason(&self, source: &str) -> Option<String> {
        self.all_failed().then(|| {
            format!(
                "article source '{source}' unavailable: all {} searches failed",
                self.attempted
            )
        })
    }

    /// Set when some, but not all, queries failed.
    pub fn partial_note(&self) -> Option<String> {
        (self.failed > 0 && !self.all_failed()).then(|| {
            format!(
                "partial results: {} of {} searches failed",
                self.failed, self.attempted
            )
        })
    }

    /// Whichever of the two above applies.
    pub fn degraded_reason(&self, source: &str) -> Option<String> {
        self.unavailable_reason(source).or_else(|| self.partial_note())
    }
}

/// Run every query concurrently, each bounded by `timeout`.
/// A failing or slow query is logged and counted, never fatal.
pub async fn search_many(
    source: &dyn ArticleSource,
    queries: &[String],
    limit: usize,
    timeout: Duration,
) -> SearchOutcome {
    ensure_metrics_described();

    let calls = queries.iter().map(|q| async move {
        let res = tokio::time::timeout(timeout, source.search(q, limit)).await;
        (q, res)
    });

    let mut out = SearchOutcome {
        attempted: queries.len(),
        ..SearchOutcome::default()
    };
    for (query, res) in join_all(calls).await {
        match res {
            Ok(Ok(mut v)) => out.articles.append(&mut v),
            Ok(Err(e)) => {
                tracing::warn!(target: "ingest", error = ?e, source = source.name(), query_len = query.len(), "search failed");
                counter!("ingest_search_errors_total").increment(1);
                out.failed += 1;
            }
            Err(_) => {
                tracing::warn!(target: "ingest", source = source.name(), timeout_ms = timeout.as_millis() as u64, "search timed out");
                counter!("ingest_search_errors_total").increment(1);
                out.failed += 1;
            }
        }
    }
    counter!("ingest_articles_total").increment(out.articles.len() as u64);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(url: &str) -> Article {
        Article::new("t", "", url, None, "s").unwrap()
    }

    #[test]
    fn normalize_text_decodes_strips_and_collapses() {
        let s = "  <p>Hello,&nbsp;&nbsp; <b>world</b></p>  “quoted” ";
        assert_eq!(normalize_text(s, None), "Hello, world \"quoted\"");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("žluťoučký", 4), "žluť");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let (kept, removed) = dedup_by_url(vec![
            art("https://a/1"),
            art("https://a/2"),
            art("https://a/1/"),
        ]);
        assert_eq!(removed, 1);
        let urls: Vec<&str> = kept.iter().map(|a| a.url()).collect();
        assert_eq!(urls, vec!["https://a/1", "https://a/2"]);
    }

    /// Sleeps for a minute on one query, answers the rest at once.
    struct Sluggish {
        slow_query: &'static str,
    }

    #[async_trait::async_trait]
    impl ArticleSource for Sluggish {
        async fn search(&self, query: &str, _limit: usize) -> anyhow::Result<Vec<Article>> {
            if query == self.slow_query {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(vec![art(&format!("https://a/{}", query.replace(' ', "-")))])
        }

        fn name(&self) -> &'static str {
            "sluggish"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_query_times_out_without_sinking_the_rest() {
        let src = Sluggish { slow_query: "b" };
        let queries = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let out = search_many(&src, &queries, 10, Duration::from_secs(2)).await;

        assert_eq!(out.attempted, 3);
        assert_eq!(out.failed, 1);
        assert_eq!(out.articles.len(), 2);
        assert_eq!(
            out.degraded_reason("sluggish").as_deref(),
            Some("partial results: 1 of 3 searches failed")
        );
    }

    #[test]
    fn degraded_reason_prefers_the_outage() {
        let down = SearchOutcome {
            attempted: 2,
            failed: 2,
            ..SearchOutcome::default()
        };
        assert_eq!(
            down.degraded_reason("rss").as_deref(),
            Some("article source 'rss' unavailable: all 2 searches failed")
        );
        assert_eq!(down.partial_note(), None);

        let fine = SearchOutcome {
            attempted: 2,
            ..SearchOutcome::default()
        };
        assert_eq!(fine.degraded_reason("rss"), None);
    }
}
