// src/analyze/parse.rs
//! Parsers for free-text oracle output. Each returns `None` when the text is unusable.

use std::collections::HashSet;

pub const MAX_KEYWORDS: usize = 5;

/// Strip surrounding Markdown code fences.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```text")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn strip_list_marker(s: &str) -> &str {
    let s = s.trim_start();
    let s = s.trim_start_matches(['-', '*', '\u{2022}']);
    // "1." / "2)" numbering
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &s[digits..];
        if let Some(r) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return r.trim();
        }
    }
    s.trim()
}

/// Comma, semicolon or line separated terms, de-duplicated case-insensitively, at most 5.
pub fn parse_keywords(raw: &str) -> Option<Vec<String>> {
    let body = strip_code_blocks(raw);
    let body = match body.split_once(':') {
        Some((head, rest)) if head.trim().eq_ignore_ascii_case("keywords") => rest,
        _ => body,
    };

    let mut seen = HashSet::new();
    let terms: Vec<String> = body
        .split([',', ';', '\n'])
        .map(strip_list_marker)
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).trim())
        .filter(|t| !t.is_empty() && t.chars().count() <= 60)
        .filter(|t| seen.insert(t.to_lowercase()))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect();

    (!terms.is_empty()).then_some(terms)
}

fn yes_no(token: &str) -> Option<bool> {
    let t = token
        .trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_ascii_lowercase();
    match t.as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

/// `ABSURD: YES|NO` + `REASON: ...`, or a bare leading yes/no/true/false.
pub fn parse_absurdity(raw: &str) -> Option<(bool, String)> {
    let body = strip_code_blocks(raw);
    let mut verdict = None;
    let mut reason = String::new();

    for line in body.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim().to_ascii_uppercase().as_str() {
            "ABSURD" | "IS_ABSURD" => verdict = yes_no(value),
            "REASON" => reason = value.trim().to_string(),
            _ => {}
        }
    }

    if verdict.is_none() {
        let first = body.split_whitespace().next()?;
        verdict = yes_no(first);
        if verdict.is_some() {
            reason = body[first.len()..]
                .trim_start_matches(|c: char| !c.is_alphanumeric())
                .trim()
                .to_string();
        }
    }

    verdict.map(|v| (v, reason))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryParts {
    pub summary: String,
    pub key_points: Vec<String>,
    pub assessment: Option<String>,
}

/// `SUMMARY:` / `KEY_POINTS:` with `- ` bullets / `ASSESSMENT:`.
pub fn parse_summary(raw: &str) -> Option<SummaryParts> {
    let mut out = SummaryParts::default();
    let mut in_points = false;

    for line in strip_code_blocks(raw).lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("SUMMARY:") {
            out.summary = rest.trim().to_string();
            in_points = false;
        } else if line.starts_with("KEY_POINTS:") {
            in_points = true;
        } else if let Some(rest) = line.strip_prefix("ASSESSMENT:") {
            let a = rest.trim();
            out.assessment = (!a.is_empty()).then(|| a.to_string());
            in_points = false;
        } else if in_points && (line.starts_with('-') || line.starts_with('*')) {
            let p = line[1..].trim();
            if !p.is_empty() {
                out.key_points.push(p.to_string());
            }
        }
    }

    (!out.summary.is_empty() || !out.key_points.is_empty()).then_some(out)
}
