// src/pipeline/verify_text.rs
//! Pasted-text verification: the one-document case of the credibility bands.
//! Outlets named inside the text earn the same tier bonuses as sources.
//! Style signals ride along for the reader and leave the score alone.

use metrics::counter;
use serde::Serialize;
use std::sync::Arc;

use crate::analyze::categorize::contains_term;
use crate::analyze::claims::extract_claims;
use crate::analyze::credibility::{
    credibility_score, normalize_source, verdict_for, FLOOR_SCORE, VERDICT_FAKE,
};
use crate::analyze::signals::text_signals;
use crate::analyze::{
    AbsurdityDetector, AbsurdityJudgment, DynOracle, SourceQualityTier, TextIndicator,
};
use crate::config::ScoringTables;
use crate::debug::anon_hash;
use crate::error::ServiceError;
use crate::ingest::truncate_chars;

/// Claims are taken from at most this much text.
pub const MAX_TEXT_CHARS: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitedSource {
    pub name: String,
    pub tier: SourceQualityTier,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextVerdict {
    pub score: u8,
    pub verdict: String,
    pub analysis: String,
    pub claims: Vec<String>,
    pub cited_sources: Vec<CitedSource>,
    pub absurdity: AbsurdityJudgment,
    /// Style signals; they do not affect `score`.
    pub indicators: Vec<TextIndicator>,
    pub sensational_markers: Vec<String>,
}

/// Allow-listed outlets named in `text`, each once, high tier first.
pub fn cited_outlets(text: &str, tables: &ScoringTables) -> Vec<CitedSource> {
    let haystack = normalize_source(text);
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    let tiers = [
        (SourceQualityTier::High, &tables.tiers.high),
        (SourceQualityTier::Medium, &tables.tiers.medium),
    ];
    for (tier, names) in tiers {
        for name in names.iter() {
            let key = normalize_source(name);
            let key = key.strip_prefix("the ").unwrap_or(&key).to_string();
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            if contains_term(&haystack, &key) {
                out.push(CitedSource {
                    name: name.clone(),
                    tier,
                });
                seen.push(key);
            }
        }
    }
    out
}

pub struct TextVerifier {
    tables: Arc<ScoringTables>,
    absurdity: AbsurdityDetector,
}

impl TextVerifier {
    pub fn new(oracle: DynOracle, tables: Arc<ScoringTables>) -> Self {
        Self {
            absurdity: AbsurdityDetector::new(oracle),
            tables,
        }
    }

    pub async fn run(&self, text: &str) -> Result<TextVerdict, ServiceError> {
        // line breaks separate claims, so only trim and cap here
        let text = truncate_chars(text.trim(), MAX_TEXT_CHARS);
        if text.is_empty() {
            return Err(ServiceError::invalid("text must not be empty"));
        }

        let claims = extract_claims(text, &self.tables);
        let lead = claims.first().map(String::as_str).unwrap_or(text);
        let absurdity = self.absurdity.judge(lead).await;
        let signals = text_signals(text, &self.tables);

        let out = if absurdity.is_absurd {
            TextVerdict {
                score: FLOOR_SCORE,
                verdict: VERDICT_FAKE.to_string(),
                analysis: format!("text judged implausible: {}", absurdity.reason),
                claims,
                cited_sources: Vec::new(),
                absurdity,
                indicators: signals.indicators,
                sensational_markers: signals.sensational_markers,
            }
        } else {
            let cited = cited_outlets(text, &self.tables);
            let high = cited
                .iter()
                .filter(|c| c.tier == SourceQualityTier::High)
                .count();
            let medium = cited.len() - high;
            let score = credibility_score(1, high, medium);
            TextVerdict {
                score,
                verdict: verdict_for(score).to_string(),
                analysis: format!(
                    "Extracted {} checkable claim(s); text cites {high} high-reliability and {medium} medium-reliability outlet(s)",
                    claims.len()
                ),
                claims,
                cited_sources: cited,
                absurdity,
                indicators: signals.indicators,
                sensational_markers: signals.sensational_markers,
            }
        };

        counter!("pipeline_verify_text_total").increment(1);
        tracing::info!(
            target: "pipeline",
            id = %anon_hash(text),
            score = out.score,
            claims = out.claims.len(),
            sensational = out.sensational_markers.len(),
            "text verified"
        );
        Ok(out)
    }
}
