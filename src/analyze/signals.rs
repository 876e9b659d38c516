// src/analyze/signals.rs
//! Writing-style signals in pasted text: citations, quotes, dates and
//! sensational phrasing. Reported alongside the verdict; never scored.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::analyze::categorize::contains_term;
use crate::config::ScoringTables;
use crate::ingest::normalize_text;

static RE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextIndicator {
    Citations,
    Quotes,
    Dates,
    /// No sensational phrase found.
    ProfessionalTone,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSignals {
    pub indicators: Vec<TextIndicator>,
    /// Sensational phrases found, in table order.
    pub sensational_markers: Vec<String>,
}

pub fn text_signals(text: &str, tables: &ScoringTables) -> TextSignals {
    let flat = normalize_text(text, None);
    let lower = flat.to_lowercase();
    let table = &tables.text_signals;
    let any_term = |terms: &[String]| terms.iter().any(|t| contains_term(&lower, t));

    let sensational_markers: Vec<String> = table
        .sensational
        .iter()
        .filter(|t| contains_term(&lower, t))
        .cloned()
        .collect();

    let mut indicators = Vec::new();
    if any_term(&table.citations) {
        indicators.push(TextIndicator::Citations);
    }
    if flat.contains('"') {
        indicators.push(TextIndicator::Quotes);
    }
    if any_term(&table.dates) || RE_YEAR.is_match(&lower) {
        indicators.push(TextIndicator::Dates);
    }
    if sensational_markers.is_empty() {
        indicators.push(TextIndicator::ProfessionalTone);
    }

    TextSignals {
        indicators,
        sensational_markers,
    }
}
