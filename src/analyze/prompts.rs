// src/analyze/prompts.rs
//! Prompt templates. Each opens with a fixed tag so scripted oracles can route on it.

use crate::ingest::types::Article;

pub const SYSTEM: &str =
    "You are a careful news analyst. Follow the requested output format exactly and add nothing else.";

pub const KEYWORDS_TAG: &str = "Extract 3-5 key search terms from this headline";
pub const ABSURDITY_TAG: &str = "Judge whether this news headline could describe a real event";
pub const SUMMARY_TAG: &str = "Analyze these news articles about:";

pub fn keywords(headline: &str) -> String {
    format!(
        "{KEYWORDS_TAG} for finding related news articles.\n\
Focus on:\n\
- Main entities (people, organizations, places)\n\
- Key events or actions\n\
- Important topics\n\n\
Headline: {headline}\n\n\
Return ONLY the keywords separated by commas, nothing else."
    )
}

pub fn absurdity(headline: &str) -> String {
    format!(
        "{ABSURDITY_TAG}.\n\
Flag it as absurd if it is physically impossible, internally contradictory, \
written as satire, or makes an extraordinary claim no newsroom would report.\n\n\
Headline: {headline}\n\n\
Answer in exactly two lines:\n\
ABSURD: YES or NO\n\
REASON: one short sentence"
    )
}

pub fn summary(headline: &str, articles: &[&Article]) -> String {
    let combined = articles
        .iter()
        .map(|a| format!("{}\n{}", a.title(), a.description()))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "{SUMMARY_TAG} {headline}\n\n\
Articles:\n{combined}\n\n\
Provide:\n\
1. A comprehensive 3-4 sentence summary\n\
2. 4-6 key points (bullet format)\n\
3. Overall assessment of the situation\n\n\
Format:\n\
SUMMARY: [summary]\n\
KEY_POINTS:\n\
- [point 1]\n\
- [point 2]\n\
ASSESSMENT: [assessment]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_start_with_their_tags() {
        assert!(keywords("x").starts_with(KEYWORDS_TAG));
        assert!(absurdity("x").starts_with(ABSURDITY_TAG));
        let a = Article::new("Title A", "Desc A", "https://a", None, "S").unwrap();
        let p = summary("Topic", &[&a]);
        assert!(p.starts_with(SUMMARY_TAG));
        assert!(p.contains("Title A\nDesc A"));
    }
}
