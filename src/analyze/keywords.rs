// src/analyze/keywords.rs
//! Search-term extraction as an ordered chain: oracle, stop-word rules, raw headline.

use metrics::counter;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::analyze::oracle::DynOracle;
use crate::analyze::parse::{parse_keywords, MAX_KEYWORDS};
use crate::analyze::prompts;
use crate::analyze::relevance::content_tokens;
use crate::config::ScoringTables;
use crate::debug::{anon_hash, dev_logging_enabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordStrategy {
    Oracle,
    Rules,
    RawHeadline,
}

impl KeywordStrategy {
    pub const CHAIN: [KeywordStrategy; 3] = [Self::Oracle, Self::Rules, Self::RawHeadline];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Oracle => "oracle",
            Self::Rules => "rules",
            Self::RawHeadline => "raw_headline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordSet {
    /// Most salient first; never empty.
    pub terms: Vec<String>,
    pub strategy: KeywordStrategy,
}

/// Rule path: content tokens in headline order, case-insensitively unique, at most 5.
pub fn rule_keywords(headline: &str, tables: &ScoringTables) -> Vec<String> {
    let mut seen = HashSet::new();
    content_tokens(headline, tables)
        .filter(|t| seen.insert(t.to_lowercase()))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct KeywordExtractor {
    oracle: DynOracle,
    tables: Arc<ScoringTables>,
}

impl KeywordExtractor {
    pub fn new(oracle: DynOracle, tables: Arc<ScoringTables>) -> Self {
        Self { oracle, tables }
    }

    pub async fn extract(&self, headline: &str) -> KeywordSet {
        for strategy in KeywordStrategy::CHAIN {
            if let Some(terms) = self.attempt(strategy, headline).await {
                if dev_logging_enabled() {
                    tracing::info!(
                        target: "pipeline",
                        id = %anon_hash(headline),
                        strategy = strategy.as_str(),
                        count = terms.len(),
                        "keywords extracted"
                    );
                }
                return KeywordSet { terms, strategy };
            }
            counter!("oracle_fallback_total", "capability" => "keywords", "from" => strategy.as_str())
                .increment(1);
        }
        // RawHeadline only fails on blank input
        KeywordSet {
            terms: vec![headline.trim().to_string()],
            strategy: KeywordStrategy::RawHeadline,
        }
    }

    async fn attempt(&self, strategy: KeywordStrategy, headline: &str) -> Option<Vec<String>> {
        match strategy {
            KeywordStrategy::Oracle => {
                let prompt = prompts::keywords(headline);
                match self.oracle.complete(&prompt).await {
                    Ok(raw) => parse_keywords(&raw),
                    Err(e) => {
                        tracing::debug!(target: "oracle", error = %e, "keyword oracle unavailable");
                        None
                    }
                }
            }
            KeywordStrategy::Rules => {
                let terms = rule_keywords(headline, &self.tables);
                (!terms.is_empty()).then_some(terms)
            }
            KeywordStrategy::RawHeadline => {
                let h = headline.trim();
                (!h.is_empty()).then(|| vec![h.to_string()])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::oracle::{DisabledOracle, ScriptedOracle};

    fn tables() -> Arc<ScoringTables> {
        Arc::new(ScoringTables::embedded())
    }

    #[test]
    fn rules_keep_order_and_casing() {
        let t = ScoringTables::embedded();
        assert_eq!(
            rule_keywords("NASA and ESA launch the Joint Mars Mission to Mars", &t),
            vec!["NASA", "ESA", "launch", "Joint", "Mars"]
        );
    }

    #[tokio::test]
    async fn oracle_terms_win_when_usable() {
        let oracle = Arc::new(ScriptedOracle::new().on(prompts::KEYWORDS_TAG, "Chennai, floods, rescue"));
        let k = KeywordExtractor::new(oracle, tables());
        let set = k.extract("Floods hit Chennai as rescue teams deploy").await;
        assert_eq!(set.strategy, KeywordStrategy::Oracle);
        assert_eq!(set.terms, vec!["Chennai", "floods", "rescue"]);
    }

    #[tokio::test]
    async fn unusable_oracle_output_falls_back_to_rules() {
        let oracle = Arc::new(ScriptedOracle::new().on(prompts::KEYWORDS_TAG, " ,, "));
        let k = KeywordExtractor::new(oracle, tables());
        let set = k.extract("Floods hit Chennai").await;
        assert_eq!(set.strategy, KeywordStrategy::Rules);
        assert_eq!(set.terms, vec!["Floods", "hit", "Chennai"]);
    }

    #[tokio::test]
    async fn raw_headline_is_last_resort() {
        let k = KeywordExtractor::new(Arc::new(DisabledOracle), tables());
        let set = k.extract("  Is it so?  ").await;
        assert_eq!(set.strategy, KeywordStrategy::RawHeadline);
        assert_eq!(set.terms, vec!["Is it so?"]);
    }
}
