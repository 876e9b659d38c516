//! Text oracle adapter: provider abstraction + timeout + daily call budget.
//!
//! Every call site treats the oracle as optional. Errors are typed so callers
//! can log why they fell back, but no caller propagates them.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analyze::prompts;
use crate::config::ai::OracleConfig;

pub const ENV_ORACLE_TEST_MODE: &str = "ORACLE_TEST_MODE";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("oracle disabled")]
    Disabled,
    #[error("oracle call timed out after {0} ms")]
    Timeout(u64),
    #[error("daily oracle budget of {0} calls exhausted")]
    BudgetExhausted(u32),
    #[error("oracle transport error: {0}")]
    Http(String),
    #[error("oracle returned an empty response")]
    EmptyResponse,
}

pub type OracleFuture<'a> = Pin<Box<dyn Future<Output = Result<String, OracleError>> + Send + 'a>>;

/// Prompt in, free text out.
pub trait TextOracle: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> OracleFuture<'a>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynOracle = Arc<dyn TextOracle>;

/// Build an oracle according to config and environment.
///
/// * `ORACLE_TEST_MODE=mock` gives the deterministic scripted mock.
/// * A disabled config, unknown provider or missing key gives `DisabledOracle`.
/// * Otherwise the provider is wrapped in `GuardedOracle`.
pub fn build_oracle_from_config(cfg: &OracleConfig) -> DynOracle {
    if std::env::var(ENV_ORACLE_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(ScriptedOracle::mock());
    }
    if !cfg.enabled {
        return Arc::new(DisabledOracle);
    }
    if cfg.api_key.trim().is_empty() {
        tracing::warn!(target: "oracle", provider = %cfg.provider, "oracle enabled without api key; disabled");
        return Arc::new(DisabledOracle);
    }

    let timeout = Duration::from_millis(cfg.timeout_ms);
    let built: anyhow::Result<DynOracle> = match cfg.provider.as_str() {
        "gemini" => GeminiProvider::new(&cfg.api_key, cfg.model.as_deref(), timeout)
            .map(|p| Arc::new(GuardedOracle::new(p, timeout, cfg.daily_limit)) as DynOracle),
        "openai" => OpenAiProvider::new(&cfg.api_key, cfg.model.as_deref(), timeout)
            .map(|p| Arc::new(GuardedOracle::new(p, timeout, cfg.daily_limit)) as DynOracle),
        other => Err(anyhow::anyhow!("unsupported oracle provider: {other}")),
    };
    built.unwrap_or_else(|e| {
        tracing::warn!(target: "oracle", error = %e, "oracle unavailable; disabled");
        Arc::new(DisabledOracle)
    })
}

// ------------------------------------------------------------
// Providers
// ------------------------------------------------------------

/// Low-level provider doing the remote call. Guarding is layered on top.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(&'a self, prompt: &'a str) -> OracleFuture<'a>;
    fn name(&self) -> &'static str;
}

fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent("news-credibility-analyzer/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(timeout)
        .build()?)
}

fn transport(e: reqwest::Error) -> OracleError {
    // without_url: the gemini key travels in the query string
    OracleError::Http(e.without_url().to_string())
}

/// Google Gemini `generateContent`.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            api_key: api_key.to_string(),
            model: model.unwrap_or("gemini-1.5-flash").to_string(),
        })
    }
}

impl Provider for GeminiProvider {
    fn fetch<'a>(&'a self, prompt: &'a str) -> OracleFuture<'a> {
        Box::pin(async move {
            #[derive(Serialize)]
            struct Part<'a> {
                text: &'a str,
            }
            #[derive(Serialize)]
            struct Content<'a> {
                parts: Vec<Part<'a>>,
            }
            #[derive(Serialize)]
            #[serde(rename_all = "camelCase")]
            struct GenerationConfig {
                temperature: f32,
                max_output_tokens: u32,
            }
            #[derive(Serialize)]
            #[serde(rename_all = "camelCase")]
            struct Req<'a> {
                contents: Vec<Content<'a>>,
                generation_config: GenerationConfig,
            }
            #[derive(Deserialize)]
            struct Resp {
                #[serde(default)]
                candidates: Vec<Candidate>,
            }
            #[derive(Deserialize)]
            struct Candidate {
                content: Option<RespContent>,
            }
            #[derive(Deserialize)]
            struct RespContent {
                #[serde(default)]
                parts: Vec<RespPart>,
            }
            #[derive(Deserialize)]
            struct RespPart {
                text: Option<String>,
            }

            let req = Req {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
                generation_config: GenerationConfig {
                    temperature: 0.2,
                    max_output_tokens: 512,
                },
            };
            let url = format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.model
            );
            let resp = self
                .http
                .post(url)
                .query(&[("key", self.api_key.as_str())])
                .json(&req)
                .send()
                .await
                .map_err(transport)?
                .error_for_status()
                .map_err(transport)?;
            let body: Resp = resp.json().await.map_err(transport)?;

            body.candidates
                .into_iter()
                .filter_map(|c| c.content)
                .flat_map(|c| c.parts)
                .filter_map(|p| p.text)
                .find(|t| !t.trim().is_empty())
                .ok_or(OracleError::EmptyResponse)
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// OpenAI Chat Completions.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            api_key: api_key.to_string(),
            model: model.unwrap_or("gpt-4o-mini").to_string(),
        })
    }
}

impl Provider for OpenAiProvider {
    fn fetch<'a>(&'a self, prompt: &'a str) -> OracleFuture<'a> {
        Box::pin(async move {
            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: Option<String>,
            }

            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: prompts::SYSTEM,
                    },
                    Msg {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: 0.2,
                max_tokens: 512,
            };

            let resp = self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .map_err(transport)?
                .error_for_status()
                .map_err(transport)?;
            let body: Resp = resp.json().await.map_err(transport)?;
            body.choices
                .into_iter()
                .filter_map(|c| c.message.content)
                .find(|t| !t.trim().is_empty())
                .ok_or(OracleError::EmptyResponse)
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ------------------------------------------------------------
// Guard: timeout + in-memory daily budget
// ------------------------------------------------------------

#[derive(Debug)]
struct DailyCounter {
    day: NaiveDate,
    count: u32,
}

/// Bounds every provider call by a timeout and a per-UTC-day call budget.
/// A call consumes budget when it is issued, whatever its outcome.
pub struct GuardedOracle<P: Provider> {
    inner: P,
    timeout: Duration,
    daily_limit: u32,
    counter: Mutex<DailyCounter>,
}

impl<P: Provider> GuardedOracle<P> {
    pub fn new(inner: P, timeout: Duration, daily_limit: u32) -> Self {
        Self {
            inner,
            timeout,
            daily_limit,
            counter: Mutex::new(DailyCounter {
                day: Utc::now().date_naive(),
                count: 0,
            }),
        }
    }

    fn reserve(&self) -> Result<(), OracleError> {
        let today = Utc::now().date_naive();
        let mut g = self.counter.lock().unwrap_or_else(|e| e.into_inner());
        if g.day != today {
            g.day = today;
            g.count = 0;
        }
        if g.count >= self.daily_limit {
            return Err(OracleError::BudgetExhausted(self.daily_limit));
        }
        g.count = g.count.saturating_add(1);
        Ok(())
    }

    /// Calls issued today.
    pub fn used_today(&self) -> u32 {
        self.counter.lock().map(|g| g.count).unwrap_or(0)
    }

    async fn complete_impl(&self, prompt: &str) -> Result<String, OracleError> {
        self.reserve()?;
        let out = tokio::time::timeout(self.timeout, self.inner.fetch(prompt))
            .await
            .map_err(|_| OracleError::Timeout(self.timeout.as_millis() as u64))??;
        let out = out.trim();
        if out.is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(out.to_string())
    }
}

impl<P: Provider> TextOracle for GuardedOracle<P> {
    fn complete<'a>(&'a self, prompt: &'a str) -> OracleFuture<'a> {
        Box::pin(self.complete_impl(prompt))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// Disabled + scripted oracles
// ------------------------------------------------------------

/// Always unavailable; used when the oracle is switched off.
pub struct DisabledOracle;

impl TextOracle for DisabledOracle {
    fn complete<'a>(&'a self, _prompt: &'a str) -> OracleFuture<'a> {
        Box::pin(async { Err(OracleError::Disabled) })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Answers by the first needle contained in the prompt; unmatched prompts
/// get `EmptyResponse`. Counts every call.
#[derive(Default)]
pub struct ScriptedOracle {
    script: Vec<(String, String)>,
    fail_all: bool,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oracle whose every call fails like an outage.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn on(mut self, needle: &str, response: &str) -> Self {
        self.script.push((needle.to_string(), response.to_string()));
        self
    }

    /// Canned answers for local runs: plausible headlines and a fixed summary.
    /// Keyword prompts stay unscripted so extraction uses the rule path.
    pub fn mock() -> Self {
        Self::new()
            .on(
                prompts::ABSURDITY_TAG,
                "ABSURD: NO\nREASON: mock oracle treats every headline as plausible",
            )
            .on(
                prompts::SUMMARY_TAG,
                "SUMMARY: Mock summary of the related coverage.\nKEY_POINTS:\n- Mock key point\nASSESSMENT: mock",
            )
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextOracle for ScriptedOracle {
    fn complete<'a>(&'a self, prompt: &'a str) -> OracleFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = if self.fail_all {
            Err(OracleError::Http("scripted outage".to_string()))
        } else {
            self.script
                .iter()
                .find(|(needle, _)| prompt.contains(needle.as_str()))
                .map(|(_, resp)| resp.clone())
                .ok_or(OracleError::EmptyResponse)
        };
        Box::pin(async move { out })
    }
    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
