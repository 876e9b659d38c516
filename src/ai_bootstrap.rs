// src/ai_bootstrap.rs
use crate::analyze::oracle::build_oracle_from_config;
use crate::analyze::{prompts, DynOracle};
use crate::config::OracleConfig;
use tracing::{info, warn};

pub struct OracleRuntime {
    pub cfg: OracleConfig,
    pub oracle: DynOracle,
}

impl OracleRuntime {
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let cfg = OracleConfig::load_from_file(path)?;
        Ok(Self::from_config(cfg))
    }

    /// `$ORACLE_CONFIG_PATH` or `config/ai.json`; a broken file means disabled.
    pub fn from_env() -> Self {
        Self::from_config(OracleConfig::from_env())
    }

    fn from_config(cfg: OracleConfig) -> Self {
        // Safe diagnostics: only provider + enabled + key length
        info!(
            target: "oracle",
            provider = %cfg.provider,
            enabled = cfg.enabled,
            key_len = cfg.api_key.len(),
            "oracle config loaded"
        );
        let oracle = build_oracle_from_config(&cfg);
        Self { cfg, oracle }
    }

    pub async fn quick_probe(&self) {
        if !self.cfg.enabled {
            warn!(target: "oracle", "oracle quick_probe skipped: disabled in config");
            return;
        }
        let sample = "City council approves new budget for public transit expansion";
        match self.oracle.complete(&prompts::absurdity(sample)).await {
            Ok(out) => info!(
                target: "oracle",
                provider = self.oracle.provider_name(),
                chars = out.len(),
                "oracle quick_probe ok"
            ),
            Err(e) => warn!(target: "oracle", error = %e, "oracle quick_probe failed"),
        }
    }
}
