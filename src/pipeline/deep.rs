// src/pipeline/deep.rs
//! Headline verification:
//! absurdity gate → keywords → concurrent search → URL dedup → ad filter
//! → relevance filter → credibility score → best-effort summary.
//!
//! Every branch ends in a `VerificationResult`; only a blank headline is an error.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;

use crate::analyze::credibility::{
    SourceAnalysis, FLOOR_SCORE, VERDICT_FAKE, VERDICT_NO_RELEVANT, VERDICT_NO_SOURCES,
    VERDICT_UNAVAILABLE,
};
use crate::analyze::parse::parse_summary;
use crate::analyze::{
    prompts, AbsurdityDetector, AbsurdityJudgment, AdFilter, CredibilityAggregator, DynOracle,
    KeywordExtractor, KeywordStrategy, RelevanceJudgment, RelevanceScorer,
};
use crate::config::{PipelineSettings, ScoringTables};
use crate::debug::{anon_hash, dev_logging_enabled, truncate_vec};
use crate::error::ServiceError;
use crate::ingest::types::ArticleSource;
use crate::ingest::{dedup_by_url, search_many};

/// Keywords used to build search queries.
pub const SEARCH_KEYWORDS: usize = 3;
/// Articles handed to the summary prompt.
pub const SUMMARY_ARTICLES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Absurd,
    NoSources,
    NoRelevant,
    Scored,
    UpstreamUnavailable,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absurd => "absurd",
            Self::NoSources => "no_sources",
            Self::NoRelevant => "no_relevant",
            Self::Scored => "scored",
            Self::UpstreamUnavailable => "upstream_unavailable",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub headline: String,
    pub outcome: Outcome,
    pub verification_score: u8,
    pub verdict: String,
    pub source_analysis: SourceAnalysis,
    pub keywords_used: Vec<String>,
    pub keyword_strategy: Option<KeywordStrategy>,
    pub related_articles: Vec<RelevanceJudgment>,
    pub summary: String,
    pub key_points: Vec<String>,
    pub absurdity: AbsurdityJudgment,
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "pipeline_deep_total",
            "Deep analyses completed, labelled by terminal outcome."
        );
        describe_counter!(
            "oracle_fallback_total",
            "Oracle-backed steps that fell back to a deterministic path."
        );
    });
}

/// Combined top-3 query first, then each of those keywords alone.
pub fn search_queries(terms: &[String]) -> Vec<String> {
    let top: Vec<&str> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .take(SEARCH_KEYWORDS)
        .collect();
    if top.is_empty() {
        return Vec::new();
    }
    let mut queries = vec![top.join(" ")];
    for t in top {
        if !queries.iter().any(|q| q.eq_ignore_ascii_case(t)) {
            queries.push(t.to_string());
        }
    }
    queries
}

pub fn fallback_summary(count: usize) -> (String, Vec<String>) {
    (
        format!("Found {count} news articles covering this topic."),
        vec![format!("Found {count} related articles")],
    )
}

pub struct DeepAnalysisPipeline {
    source: Arc<dyn ArticleSource>,
    oracle: DynOracle,
    keywords: KeywordExtractor,
    absurdity: AbsurdityDetector,
    ads: AdFilter,
    relevance: RelevanceScorer,
    credibility: CredibilityAggregator,
    settings: PipelineSettings,
}

impl DeepAnalysisPipeline {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        oracle: DynOracle,
        tables: Arc<ScoringTables>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            keywords: KeywordExtractor::new(oracle.clone(), tables.clone()),
            absurdity: AbsurdityDetector::new(oracle.clone()),
            ads: AdFilter::new(tables.clone()),
            relevance: RelevanceScorer::new(tables.clone()),
            credibility: CredibilityAggregator::new(tables, settings.max_scored_sources),
            source,
            oracle,
            settings,
        }
    }

    pub async fn run(&self, headline: &str) -> Result<VerificationResult, ServiceError> {
        ensure_metrics_described();
        let headline = headline.trim();
        if headline.is_empty() {
            return Err(ServiceError::invalid("headline must not be empty"));
        }
        let id = anon_hash(headline);

        // ABSURDITY_CHECK
        let absurdity = self.absurdity.judge(headline).await;
        if absurdity.is_absurd {
            let reason = format!("headline judged implausible: {}", absurdity.reason);
            let result = VerificationResult {
                headline: headline.to_string(),
                outcome: Outcome::Absurd,
                verification_score: FLOOR_SCORE,
                verdict: VERDICT_FAKE.to_string(),
                source_analysis: SourceAnalysis::floor(reason.clone()),
                keywords_used: Vec::new(),
                keyword_strategy: None,
                related_articles: Vec::new(),
                summary: reason,
                key_points: vec![absurdity.reason.clone()],
                absurdity,
            };
            return Ok(self.finish(&id, result));
        }

        // SEARCHING
        let keywords = self.keywords.extract(headline).await;
        let queries = search_queries(&keywords.terms);
        let searched = search_many(
            self.source.as_ref(),
            &queries,
            self.settings.search_limit,
            self.settings.search_timeout,
        )
        .await;

        let early = |outcome: Outcome, verdict: &str, reason: String, absurdity| {
            let (summary, key_points) = fallback_summary(0);
            VerificationResult {
                headline: headline.to_string(),
                outcome,
                verification_score: FLOOR_SCORE,
                verdict: verdict.to_string(),
                source_analysis: SourceAnalysis::floor(reason),
                keywords_used: keywords.terms.clone(),
                keyword_strategy: Some(keywords.strategy),
                related_articles: Vec::new(),
                summary,
                key_points,
                absurdity,
            }
        };

        if let Some(reason) = searched.unavailable_reason(self.source.name()) {
            let result = early(
                Outcome::UpstreamUnavailable,
                VERDICT_UNAVAILABLE,
                reason,
                absurdity,
            );
            return Ok(self.finish(&id, result));
        }
        let partial = searched.partial_note().map(|n| format!("; {n}"));

        let (unique, _dupes) = dedup_by_url(searched.articles);
        let (candidates, ads) = self.ads.retain_editorial(unique);
        if candidates.is_empty() {
            let reason = format!("no sources found{}", partial.clone().unwrap_or_default());
            let result = early(Outcome::NoSources, VERDICT_NO_SOURCES, reason, absurdity);
            return Ok(self.finish(&id, result));
        }

        // RELEVANCE_FILTER
        let candidate_count = candidates.len();
        let relevant =
            self.relevance
                .filter_relevant(headline, candidates, self.settings.relevance_threshold);
        if relevant.is_empty() {
            let reason = format!(
                "found {candidate_count} articles, 0 relevant{}",
                partial.clone().unwrap_or_default()
            );
            let result = early(Outcome::NoRelevant, VERDICT_NO_RELEVANT, reason, absurdity);
            return Ok(self.finish(&id, result));
        }

        // SCORING
        let mut scored = self.credibility.aggregate(relevant);
        if let Some(p) = &partial {
            scored.analysis.reason.push_str(p);
        }
        let (summary, key_points) = self.summarize(headline, &scored.articles).await;

        if dev_logging_enabled() {
            tracing::info!(
                target: "pipeline",
                %id,
                keywords = ?truncate_vec(&keywords.terms, 5),
                candidates = candidate_count,
                ads_filtered = ads,
                relevant = scored.articles.len(),
                "deep analysis scored"
            );
        }

        let result = VerificationResult {
            headline: headline.to_string(),
            outcome: Outcome::Scored,
            verification_score: scored.analysis.score,
            verdict: scored.verdict.to_string(),
            source_analysis: scored.analysis,
            keywords_used: keywords.terms,
            keyword_strategy: Some(keywords.strategy),
            related_articles: scored.articles,
            summary,
            key_points,
            absurdity,
        };
        Ok(self.finish(&id, result))
    }

    async fn summarize(
        &self,
        headline: &str,
        related: &[RelevanceJudgment],
    ) -> (String, Vec<String>) {
        let top: Vec<_> = related
            .iter()
            .take(SUMMARY_ARTICLES)
            .map(|j| &j.article)
            .collect();
        let prompt = prompts::summary(headline, &top);
        let parsed = match self.oracle.complete(&prompt).await {
            Ok(raw) => parse_summary(&raw),
            Err(e) => {
                tracing::debug!(target: "oracle", error = %e, "summary oracle unavailable");
                None
            }
        };
        let (fallback_text, fallback_points) = fallback_summary(related.len());
        match parsed {
            Some(p) => (
                if p.summary.is_empty() { fallback_text } else { p.summary },
                if p.key_points.is_empty() { fallback_points } else { p.key_points },
            ),
            None => {
                counter!("oracle_fallback_total", "capability" => "summary", "from" => "oracle")
                    .increment(1);
                (fallback_text, fallback_points)
            }
        }
    }

    fn finish(&self, id: &str, result: VerificationResult) -> VerificationResult {
        counter!("pipeline_deep_total", "outcome" => result.outcome.as_str()).increment(1);
        tracing::info!(
            target: "pipeline",
            %id,
            outcome = result.outcome.as_str(),
            score = result.verification_score,
            sources = result.source_analysis.source_count,
            "deep analysis finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn queries_combine_top_three_then_singles() {
        assert_eq!(
            search_queries(&terms(&["Fed", "rates", "Powell", "inflation"])),
            terms(&["Fed rates Powell", "Fed", "rates", "Powell"])
        );
        assert_eq!(search_queries(&terms(&["Chennai"])), terms(&["Chennai"]));
        assert!(search_queries(&terms(&[" "])).is_empty());
    }

    #[test]
    fn fallback_summary_mentions_count() {
        let (s, k) = fallback_summary(4);
        assert_eq!(s, "Found 4 news articles covering this topic.");
        assert_eq!(k, vec!["Found 4 related articles"]);
    }
}
