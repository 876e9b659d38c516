// src/config/tables.rs
//! Immutable scoring tables: stop words, ad patterns, source quality tiers,
//! the ordered category keyword lists and the text signal phrases.
//!
//! The default tables ship inside the binary (`config/tables.toml`). Set
//! `NEWS_TABLES_PATH` to load a different file at startup; a broken override
//! falls back to the embedded tables with a warning.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::analyze::categorize::Category;

pub const ENV_TABLES_PATH: &str = "NEWS_TABLES_PATH";

const EMBEDDED_TABLES: &str = include_str!("../../config/tables.toml");

static DEFAULT_TABLES: Lazy<ScoringTables> = Lazy::new(|| {
    ScoringTables::from_toml_str(EMBEDDED_TABLES).expect("embedded config/tables.toml is valid")
});

#[derive(Debug, Clone, Deserialize)]
pub struct TierTable {
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
}

/// Phrase lists behind the text verification signals.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextSignalTable {
    #[serde(default)]
    pub citations: Vec<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub sensational: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryRow {
    label: String,
    keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TablesFile {
    stop_words: Vec<String>,
    ad_patterns: Vec<String>,
    tiers: TierTable,
    #[serde(default)]
    categories: Vec<CategoryRow>,
    #[serde(default)]
    text_signals: TextSignalTable,
}

/// Lowercased, trimmed tables ready for matching.
#[derive(Debug, Clone)]
pub struct ScoringTables {
    pub stop_words: HashSet<String>,
    pub ad_patterns: Vec<String>,
    pub tiers: TierTable,
    /// Priority order; `Category::Other` never appears here.
    pub categories: Vec<(Category, Vec<String>)>,
    pub text_signals: TextSignalTable,
}

impl ScoringTables {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: TablesFile = toml::from_str(s).context("parsing scoring tables toml")?;

        let mut categories = Vec::with_capacity(raw.categories.len());
        let mut seen = HashSet::new();
        for row in raw.categories {
            let cat = Category::from_str(&row.label)?;
            if cat == Category::Other {
                bail!("category 'Other' is the catch-all and takes no keywords");
            }
            if !seen.insert(cat) {
                bail!("category '{}' listed twice", row.label);
            }
            categories.push((cat, clean_list(row.keywords)));
        }

        Ok(Self {
            stop_words: clean_list(raw.stop_words).into_iter().collect(),
            ad_patterns: clean_list(raw.ad_patterns),
            tiers: TierTable {
                high: clean_list(raw.tiers.high),
                medium: clean_list(raw.tiers.medium),
            },
            categories,
            text_signals: TextSignalTable {
                citations: clean_list(raw.text_signals.citations),
                dates: clean_list(raw.text_signals.dates),
                sensational: clean_list(raw.text_signals.sensational),
            },
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scoring tables from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// The tables compiled into the binary.
    pub fn embedded() -> Self {
        DEFAULT_TABLES.clone()
    }

    /// `$NEWS_TABLES_PATH` if set and valid, otherwise the embedded tables.
    pub fn from_env() -> Self {
        match std::env::var(ENV_TABLES_PATH) {
            Ok(p) if !p.trim().is_empty() => match Self::load_from_file(p.trim()) {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(error = ?e, path = %p, "scoring tables override rejected; using embedded tables");
                    Self::embedded()
                }
            },
            _ => Self::embedded(),
        }
    }

    pub fn is_stop_word(&self, word_lower: &str) -> bool {
        self.stop_words.contains(word_lower)
    }
}

// Lowercase + trim, drop empties, keep first occurrence order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_tables_parse_and_keep_category_order() {
        let t = ScoringTables::embedded();
        let order: Vec<Category> = t.categories.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            order,
            vec![
                Category::Sports,
                Category::Politics,
                Category::Business,
                Category::Technology,
                Category::Entertainment,
                Category::Health,
                Category::Science,
            ]
        );
        assert!(t.is_stop_word("the"));
        assert!(t.ad_patterns.iter().any(|p| p == "doubleclick"));
        assert!(t.tiers.high.iter().any(|s| s == "reuters"));
        assert!(t.tiers.medium.iter().any(|s| s == "bloomberg"));
        assert!(t.text_signals.sensational.iter().any(|s| s == "miracle"));
    }

    #[test]
    fn lists_are_lowercased_trimmed_and_deduped() {
        let t = ScoringTables::from_toml_str(
            r#"
stop_words = [" The ", "the", ""]
ad_patterns = ["Sponsored"]
[tiers]
high = ["Reuters "]
[[categories]]
label = "sports"
keywords = ["Cricket", "cricket"]
"#,
        )
        .unwrap();
        assert_eq!(t.stop_words.len(), 1);
        assert_eq!(t.ad_patterns, vec!["sponsored".to_string()]);
        assert_eq!(t.tiers.high, vec!["reuters".to_string()]);
        assert!(t.tiers.medium.is_empty());
        assert_eq!(t.categories[0].1, vec!["cricket".to_string()]);
    }

    #[test]
    fn unknown_or_catch_all_labels_are_rejected() {
        let base = "stop_words = []\nad_patterns = []\n[tiers]\n";
        let unknown = format!("{base}[[categories]]\nlabel = \"Weather\"\nkeywords = [\"rain\"]\n");
        assert!(ScoringTables::from_toml_str(&unknown).is_err());

        let other = format!("{base}[[categories]]\nlabel = \"Other\"\nkeywords = [\"x\"]\n");
        assert!(ScoringTables::from_toml_str(&other).is_err());
    }

    #[serial_test::serial]
    #[test]
    fn env_override_falls_back_to_embedded_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("tables.toml");
        fs::write(&bad, "not = [valid").unwrap();

        std::env::set_var(ENV_TABLES_PATH, bad.display().to_string());
        let t = ScoringTables::from_env();
        assert_eq!(t.categories.len(), 7, "broken override should yield embedded tables");

        let good = dir.path().join("small.toml");
        fs::write(
            &good,
            "stop_words = [\"the\"]\nad_patterns = [\"promo\"]\n[tiers]\nhigh = [\"npr\"]\n",
        )
        .unwrap();
        std::env::set_var(ENV_TABLES_PATH, good.display().to_string());
        let t = ScoringTables::from_env();
        assert!(t.categories.is_empty());
        assert!(t.text_signals.citations.is_empty());
        assert_eq!(t.ad_patterns, vec!["promo".to_string()]);

        std::env::remove_var(ENV_TABLES_PATH);
    }
}
