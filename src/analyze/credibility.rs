// src/analyze/credibility.rs
//! # Credibility aggregation
//!
//! Turns the relevant, ad-free articles for a headline into a 0–100 score:
//!
//! - base score from how many independent articles cover the story;
//! - a bonus per article from a high- or medium-reliability outlet;
//! - the sum saturates at 100 and maps onto five verdict bands.
//!
//! Outlet tiers come from the scoring tables. Source names are normalized
//! (lowercase, punctuation to spaces) and matched exactly or as a substring,
//! HIGH before MEDIUM.

use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::analyze::relevance::RelevanceJudgment;
use crate::config::ScoringTables;

pub const HIGH_BONUS: u32 = 15;
pub const MEDIUM_BONUS: u32 = 8;
pub const MAX_SCORE: u8 = 100;
/// Score reported by every early exit.
pub const FLOOR_SCORE: u8 = 5;

pub const VERDICT_HIGHLY_CREDIBLE: &str = "Highly Credible – Multiple Reliable Sources";
pub const VERDICT_CREDIBLE: &str = "Credible – Multiple Sources Found";
pub const VERDICT_MODERATE: &str = "Moderately Credible – Limited Sources";
pub const VERDICT_LOW: &str = "Low Credibility – Few Sources";
pub const VERDICT_INSUFFICIENT: &str = "Unverifiable – Insufficient Sources";
pub const VERDICT_FAKE: &str = "Likely Fake/Satirical";
pub const VERDICT_NO_SOURCES: &str = "Unverifiable – No Sources Found";
pub const VERDICT_NO_RELEVANT: &str = "Unverifiable – No Relevant Sources";
pub const VERDICT_UNAVAILABLE: &str = "Unverifiable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceQualityTier {
    High,
    Medium,
    Unranked,
}

/// Lowercase, map dashes and punctuation to spaces, collapse whitespace.
pub fn normalize_source(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = true;
    for ch in s.chars() {
        let c = if ch.is_alphanumeric() {
            Some(ch)
        } else if ch == '&' {
            Some('&')
        } else {
            None
        };
        match c {
            Some(c) => {
                out.extend(c.to_lowercase());
                prev_space = false;
            }
            None if !prev_space => {
                out.push(' ');
                prev_space = true;
            }
            None => {}
        }
    }
    out.trim_end().to_string()
}

pub fn tier_for(tables: &ScoringTables, source_name: &str) -> SourceQualityTier {
    let s = normalize_source(source_name);
    if s.is_empty() {
        return SourceQualityTier::Unranked;
    }
    let listed = |list: &[String]| {
        list.iter().any(|name| {
            let n = normalize_source(name);
            !n.is_empty() && (s == n || s.contains(&n))
        })
    };
    if listed(&tables.tiers.high) {
        SourceQualityTier::High
    } else if listed(&tables.tiers.medium) {
        SourceQualityTier::Medium
    } else {
        SourceQualityTier::Unranked
    }
}

/// Base points by number of sources: 5 per source up to 6, then 33, 36, 38, and 40 from ten on.
pub fn base_score(source_count: usize) -> u32 {
    match source_count {
        0 | 1 => 5,
        2 => 10,
        3 => 15,
        4 => 20,
        5 => 25,
        6 => 30,
        7 => 33,
        8 => 36,
        9 => 38,
        _ => 40,
    }
}

/// `min(100, base + 15·high + 8·medium)` with saturating arithmetic.
pub fn credibility_score(source_count: usize, high: usize, medium: usize) -> u8 {
    let high = u32::try_from(high).unwrap_or(u32::MAX);
    let medium = u32::try_from(medium).unwrap_or(u32::MAX);
    let total = base_score(source_count)
        .saturating_add(high.saturating_mul(HIGH_BONUS))
        .saturating_add(medium.saturating_mul(MEDIUM_BONUS));
    total.min(MAX_SCORE as u32) as u8
}

pub fn verdict_for(score: u8) -> &'static str {
    match score {
        80.. => VERDICT_HIGHLY_CREDIBLE,
        60..=79 => VERDICT_CREDIBLE,
        40..=59 => VERDICT_MODERATE,
        20..=39 => VERDICT_LOW,
        _ => VERDICT_INSUFFICIENT,
    }
}

pub fn source_reason(source_count: usize, high: usize, medium: usize) -> String {
    let mut reason = format!("Found {source_count} source(s)");
    if high > 0 {
        reason.push_str(&format!(", including {high} high-reliability source(s)"));
    }
    if medium > 0 {
        reason.push_str(&format!(" and {medium} medium-reliability source(s)"));
    }
    reason
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAnalysis {
    pub score: u8,
    pub source_count: usize,
    pub high_quality_count: usize,
    pub medium_quality_count: usize,
    pub reason: String,
}

impl SourceAnalysis {
    /// Early-exit analysis: floor score, no sources.
    pub fn floor(reason: impl Into<String>) -> Self {
        Self {
            score: FLOOR_SCORE,
            source_count: 0,
            high_quality_count: 0,
            medium_quality_count: 0,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scored {
    pub analysis: SourceAnalysis,
    pub verdict: &'static str,
    /// The counted articles, highest relevance first.
    pub articles: Vec<RelevanceJudgment>,
}

#[derive(Clone)]
pub struct CredibilityAggregator {
    tables: Arc<ScoringTables>,
    max_sources: usize,
}

impl CredibilityAggregator {
    pub fn new(tables: Arc<ScoringTables>, max_sources: usize) -> Self {
        Self {
            tables,
            max_sources: max_sources.max(1),
        }
    }

    pub fn tier(&self, source_name: &str) -> SourceQualityTier {
        tier_for(&self.tables, source_name)
    }

    /// Score relevant articles. Only the `max_sources` most relevant count;
    /// equal relevance keeps input order.
    pub fn aggregate(&self, mut relevant: Vec<RelevanceJudgment>) -> Scored {
        relevant.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        });
        relevant.truncate(self.max_sources);

        let (mut high, mut medium) = (0usize, 0usize);
        for j in &relevant {
            match self.tier(j.article.source_name()) {
                SourceQualityTier::High => high += 1,
                SourceQualityTier::Medium => medium += 1,
                SourceQualityTier::Unranked => {}
            }
        }
        let count = relevant.len();
        let score = credibility_score(count, high, medium);

        Scored {
            analysis: SourceAnalysis {
                score,
                source_count: count,
                high_quality_count: high,
                medium_quality_count: medium,
                reason: source_reason(count, high, medium),
            },
            verdict: verdict_for(score),
            articles: relevant,
        }
    }
}
