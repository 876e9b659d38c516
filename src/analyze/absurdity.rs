// src/analyze/absurdity.rs
use metrics::counter;
use serde::Serialize;

use crate::analyze::oracle::DynOracle;
use crate::analyze::parse::parse_absurdity;
use crate::analyze::prompts;

pub const FALLBACK_REASON: &str = "plausibility check unavailable; assumed plausible";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsurdityJudgment {
    pub is_absurd: bool,
    pub reason: String,
    /// False when the fallback produced this judgment.
    pub from_oracle: bool,
}

impl AbsurdityJudgment {
    pub fn fallback() -> Self {
        Self {
            is_absurd: false,
            reason: FALLBACK_REASON.to_string(),
            from_oracle: false,
        }
    }
}

/// Flags impossible or satirical headlines. Without a usable oracle answer
/// every headline is treated as plausible, so outages never block verification.
#[derive(Clone)]
pub struct AbsurdityDetector {
    oracle: DynOracle,
}

impl AbsurdityDetector {
    pub fn new(oracle: DynOracle) -> Self {
        Self { oracle }
    }

    pub async fn judge(&self, headline: &str) -> AbsurdityJudgment {
        let prompt = prompts::absurdity(headline);
        let parsed = match self.oracle.complete(&prompt).await {
            Ok(raw) => parse_absurdity(&raw),
            Err(e) => {
                tracing::debug!(target: "oracle", error = %e, "absurdity oracle unavailable");
                None
            }
        };
        match parsed {
            Some((is_absurd, reason)) => AbsurdityJudgment {
                is_absurd,
                reason: if reason.is_empty() {
                    if is_absurd { "judged implausible" } else { "judged plausible" }.to_string()
                } else {
                    reason
                },
                from_oracle: true,
            },
            None => {
                counter!("oracle_fallback_total", "capability" => "absurdity", "from" => "oracle")
                    .increment(1);
                AbsurdityJudgment::fallback()
            }
        }
    }
}
