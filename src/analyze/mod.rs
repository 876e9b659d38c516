// src/analyze/mod.rs
//! Scoring building blocks shared by the pipelines. Everything here except the
//! oracle-backed extractors is pure.

pub mod absurdity;
pub mod adfilter;
pub mod categorize;
pub mod claims;
pub mod credibility;
pub mod keywords;
pub mod oracle;
pub mod parse;
pub mod prompts;
pub mod recency;
pub mod relevance;
pub mod signals;

pub use absurdity::{AbsurdityDetector, AbsurdityJudgment};
pub use adfilter::AdFilter;
pub use categorize::{CategorizedNews, Categorizer, Category};
pub use credibility::{CredibilityAggregator, SourceAnalysis, SourceQualityTier};
pub use keywords::{KeywordExtractor, KeywordSet, KeywordStrategy};
pub use oracle::{DynOracle, TextOracle};
pub use recency::DateFilter;
pub use relevance::{RelevanceJudgment, RelevanceScorer};
pub use signals::{TextIndicator, TextSignals};
