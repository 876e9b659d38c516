// src/analyze/claims.rs
use crate::analyze::relevance::content_tokens;
use crate::config::ScoringTables;
use crate::ingest::normalize_text;

pub const MAX_CLAIMS: usize = 10;
pub const MIN_CLAIM_CONTENT_WORDS: usize = 3;
/// Normalized Levenshtein similarity at which two sentences count as the same claim.
pub const NEAR_DUPLICATE: f64 = 0.90;

/// Sentences of pasted text that carry a checkable statement.
///
/// Splits on `.`, `!`, `?` and line breaks, keeps sentences with at least three
/// content words, and collapses near-duplicates onto their first occurrence.
pub fn extract_claims(text: &str, tables: &ScoringTables) -> Vec<String> {
    let mut claims: Vec<String> = Vec::new();
    let mut keys: Vec<String> = Vec::new();

    for raw in text.split(['.', '!', '?', '\n']) {
        let sentence = normalize_text(raw, Some(400));
        if content_tokens(&sentence, tables).count() < MIN_CLAIM_CONTENT_WORDS {
            continue;
        }
        let key = sentence.to_lowercase();
        if keys
            .iter()
            .any(|k| strsim::normalized_levenshtein(k, &key) >= NEAR_DUPLICATE)
        {
            continue;
        }
        keys.push(key);
        claims.push(sentence);
        if claims.len() >= MAX_CLAIMS {
            break;
        }
    }
    claims
}
