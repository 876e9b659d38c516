// src/analyze/categorize.rs
//! Topical bucketing by ordered keyword tables with an "Other" catch-all.
//!
//! A keyword matches as a whole word, optionally followed by a plural `s`/`es`.
//! Multi-word keywords match as phrases. The first category in table order
//! that matches wins, so an article lands in exactly one bucket.

use anyhow::anyhow;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::ScoringTables;
use crate::ingest::types::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Sports,
    Politics,
    Business,
    Technology,
    Entertainment,
    Health,
    Science,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::Sports,
        Self::Politics,
        Self::Business,
        Self::Technology,
        Self::Entertainment,
        Self::Health,
        Self::Science,
        Self::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sports => "Sports",
            Self::Politics => "Politics",
            Self::Business => "Business",
            Self::Technology => "Technology",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Science => "Science",
            Self::Other => "Other",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("unknown category '{s}'"))
    }
}

/// True when `term` occurs in `text` as a whole word or phrase, optionally
/// followed by "s" or "es". Both inputs are expected lowercase.
pub fn contains_term(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let is_word = |c: char| c.is_alphanumeric();
    text.match_indices(term).any(|(start, _)| {
        let before_ok = text[..start].chars().next_back().map_or(true, |c| !is_word(c));
        if !before_ok {
            return false;
        }
        let rest = &text[start + term.len()..];
        let rest = rest
            .strip_prefix("es")
            .filter(|r| r.chars().next().map_or(true, |c| !is_word(c)))
            .or_else(|| rest.strip_prefix('s'))
            .unwrap_or(rest);
        rest.chars().next().map_or(true, |c| !is_word(c))
    })
}

/// Articles per category in fixed label order. Serializes as a JSON object
/// with empty categories omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedNews {
    buckets: [Vec<Article>; 8],
}

impl CategorizedNews {
    pub fn get(&self, category: Category) -> &[Article] {
        &self.buckets[category.index()]
    }

    /// Lookup by label; unknown or empty labels give an empty slice.
    pub fn by_label(&self, label: &str) -> &[Article] {
        Category::from_str(label)
            .map(|c| self.get(c))
            .unwrap_or(&[])
    }

    /// Non-empty categories in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Article])> {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.get(c)))
            .filter(|(_, v)| !v.is_empty())
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

impl Serialize for CategorizedNews {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (cat, articles) in self.iter() {
            map.serialize_entry(cat.label(), articles)?;
        }
        map.end()
    }
}

#[derive(Clone)]
pub struct Categorizer {
    tables: Arc<ScoringTables>,
}

impl Categorizer {
    pub fn new(tables: Arc<ScoringTables>) -> Self {
        Self { tables }
    }

    pub fn classify(&self, article: &Article) -> Category {
        let text = article.search_text();
        self.tables
            .categories
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| contains_term(&text, k)))
            .map(|(cat, _)| *cat)
            .unwrap_or(Category::Other)
    }

    pub fn categorize(&self, articles: &[Article]) -> CategorizedNews {
        let mut out = CategorizedNews::default();
        for a in articles {
            out.buckets[self.classify(a).index()].push(a.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(title: &str, desc: &str) -> Article {
        Article::new(title, desc, "https://x", None, "s").unwrap()
    }

    fn embedded() -> Categorizer {
        Categorizer::new(Arc::new(ScoringTables::embedded()))
    }

    #[test]
    fn term_matching_respects_word_edges_and_plurals() {
        assert!(contains_term("india wins the match", "match"));
        assert!(contains_term("two matches today", "match"));
        assert!(contains_term("new ai rules", "ai"));
        assert!(!contains_term("officials said", "ai"));
        assert!(!contains_term("a billion dollars", "bill"));
        assert!(contains_term("senate passes bills", "bill"));
        assert!(contains_term("the prime minister spoke", "prime minister"));
        assert!(contains_term("covid-19 cases", "covid-19"));
        assert!(!contains_term("general strike", "gene"));
        assert!(!contains_term("", "x"));
        assert!(!contains_term("anything", ""));
    }

    #[test]
    fn first_matching_category_wins() {
        let c = embedded();
        // both Sports ("cricket") and Politics ("minister")
        assert_eq!(
            c.classify(&art("Minister attends cricket final", "")),
            Category::Sports
        );
        // Politics beats Business
        assert_eq!(
            c.classify(&art("Parliament debates the budget", "")),
            Category::Politics
        );
        assert_eq!(c.classify(&art("Quarterly earnings beat forecasts", "")), Category::Business);
        assert_eq!(c.classify(&art("Nasa telescope images", "")), Category::Science);
        assert_eq!(c.classify(&art("Quiet night downtown", "")), Category::Other);
    }

    #[test]
    fn priority_follows_table_order() {
        let t = ScoringTables::from_toml_str(
            r#"
stop_words = []
ad_patterns = []
[tiers]
[[categories]]
label = "Health"
keywords = ["clinic"]
[[categories]]
label = "Sports"
keywords = ["clinic"]
"#,
        )
        .unwrap();
        let c = Categorizer::new(Arc::new(t));
        assert_eq!(c.classify(&art("Free clinic opens", "")), Category::Health);
    }

    #[test]
    fn empty_categories_are_omitted_from_json() {
        let c = embedded();
        let out = c.categorize(&[
            art("Cricket league final tonight", ""),
            art("Quiet night downtown", ""),
        ]);
        assert_eq!(out.get(Category::Sports).len(), 1);
        assert_eq!(out.by_label("other").len(), 1);
        assert!(out.by_label("Politics").is_empty());
        assert!(out.by_label("Weather").is_empty());
        assert_eq!(out.total(), 2);

        let v = serde_json::to_value(&out).unwrap();
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(v.get("Politics").is_none());
    }
}
