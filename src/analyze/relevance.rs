// src/analyze/relevance.rs
//! Headline-to-article relevance: share of the headline's content words found in the article.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::ScoringTables;
use crate::ingest::types::Article;

pub const MIN_CONTENT_WORD_CHARS: usize = 3;

/// Whitespace tokens with edge punctuation trimmed, minus stop words and
/// tokens under three chars. Original casing and order are kept.
pub fn content_tokens<'a>(
    text: &'a str,
    tables: &'a ScoringTables,
) -> impl Iterator<Item = &'a str> + 'a {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| t.chars().count() >= MIN_CONTENT_WORD_CHARS)
        .filter(move |t| !tables.is_stop_word(&t.to_lowercase()))
}

/// Unique lowercased content words, first occurrence order.
pub fn content_words(text: &str, tables: &ScoringTables) -> Vec<String> {
    let mut seen = HashSet::new();
    content_tokens(text, tables)
        .map(str::to_lowercase)
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceJudgment {
    #[serde(flatten)]
    pub article: Article,
    pub relevance: f32,
}

#[derive(Clone)]
pub struct RelevanceScorer {
    tables: Arc<ScoringTables>,
}

impl RelevanceScorer {
    pub fn new(tables: Arc<ScoringTables>) -> Self {
        Self { tables }
    }

    /// Score in [0, 1]. A headline with no content words scores 1.0.
    pub fn score(&self, headline: &str, article: &Article) -> f32 {
        let words = content_words(headline, &self.tables);
        score_words(&words, &article.search_text())
    }

    /// Judge every article against one headline, keeping those at or above `threshold`.
    /// Input order is preserved.
    pub fn filter_relevant(
        &self,
        headline: &str,
        articles: Vec<Article>,
        threshold: f32,
    ) -> Vec<RelevanceJudgment> {
        let words = content_words(headline, &self.tables);
        articles
            .into_iter()
            .map(|article| {
                let relevance = score_words(&words, &article.search_text());
                RelevanceJudgment { article, relevance }
            })
            .filter(|j| j.relevance >= threshold)
            .collect()
    }
}

fn score_words(words: &[String], haystack_lower: &str) -> f32 {
    if words.is_empty() {
        return 1.0;
    }
    let hits = words
        .iter()
        .filter(|w| haystack_lower.contains(w.as_str()))
        .count();
    hits as f32 / words.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(Arc::new(ScoringTables::embedded()))
    }

    fn art(title: &str, desc: &str) -> Article {
        Article::new(title, desc, "https://x", None, "S").unwrap()
    }

    #[test]
    fn content_words_drop_stop_words_short_tokens_and_duplicates() {
        let t = ScoringTables::embedded();
        assert_eq!(
            content_words("The Fed is raising rates, rates again! (UK)", &t),
            vec!["fed", "raising", "rates", "again"]
        );
    }

    #[test]
    fn score_is_share_of_matched_words() {
        let s = scorer();
        let a = art("Fed holds rates steady", "Officials signal patience");
        assert_eq!(s.score("Fed raises rates sharply", &a), 0.5);
        assert_eq!(s.score("fed rates", &a), 1.0);
        assert_eq!(s.score("unrelated gardening tips", &a), 0.0);
    }

    #[test]
    fn headline_without_content_words_scores_one() {
        let s = scorer();
        let a = art("Anything", "");
        assert_eq!(s.score("Is it so?", &a), 1.0);
        assert_eq!(s.score("the and those", &a), 1.0);
        assert_eq!(s.score("", &a), 1.0);
    }

    #[test]
    fn filter_keeps_threshold_boundary() {
        let s = scorer();
        let arts = vec![
            art("alpha beta gamma", ""),
            art("alpha", ""),
            art("nothing here", ""),
        ];
        // headline has 3 content words; "alpha" alone is 1/3 >= 0.30
        let kept = s.filter_relevant("alpha beta gamma", arts, 0.30);
        let scores: Vec<f32> = kept.iter().map(|j| j.relevance).collect();
        assert_eq!(kept.len(), 2);
        assert_eq!(scores[0], 1.0);
        assert!((scores[1] - 1.0 / 3.0).abs() < 1e-6);
    }
}
