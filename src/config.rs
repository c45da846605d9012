//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;

use crate::data::vlr::{DEFAULT_BASE_URL, DEFAULT_MAX_PLAYERS, EXPECTED_ROUNDS_PER_MAP};
use crate::data::StatsQuery;
use crate::llm::openai::DEFAULT_MODEL;
use crate::types::{RiskPosture, ValcoachError};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub slate: SlateConfig,
    pub stats: StatsConfig,
    pub llm: LlmConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SlateConfig {
    pub region: String,
    pub timespan: String,
    pub risk_posture: RiskPosture,
    /// Picks printed to the console after a build.
    pub top_n: usize,
    /// Picks explained up front by the configured explainer.
    pub explain_top: usize,
}

impl Default for SlateConfig {
    fn default() -> Self {
        Self {
            region: "na".to_string(),
            timespan: "30".to_string(),
            risk_posture: RiskPosture::Standard,
            top_n: 15,
            explain_top: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StatsConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_players: usize,
    pub rounds_per_map: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            max_players: DEFAULT_MAX_PLAYERS,
            rounds_per_map: EXPECTED_ROUNDS_PER_MAP,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Explanation requests in flight at once.
    pub concurrency: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 700,
            temperature: 0.3,
            concurrency: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Invalid config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(contents).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde can't express.
    pub fn validate(&self) -> Result<(), ValcoachError> {
        self.query()?;

        if self.stats.max_players == 0 {
            return Err(ValcoachError::Config("stats.max_players must be at least 1".into()));
        }
        if !(self.stats.rounds_per_map > 0.0) {
            return Err(ValcoachError::Config(format!(
                "stats.rounds_per_map must be positive, got {}",
                self.stats.rounds_per_map
            )));
        }
        if self.stats.timeout_secs == 0 {
            return Err(ValcoachError::Config("stats.timeout_secs must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ValcoachError::Config(format!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            )));
        }
        if self.llm.concurrency == 0 {
            return Err(ValcoachError::Config("llm.concurrency must be at least 1".into()));
        }
        Ok(())
    }

    /// The stats query described by the `[slate]` table.
    pub fn query(&self) -> Result<StatsQuery, ValcoachError> {
        StatsQuery::new(&self.slate.region, &self.slate.timespan)
            .map_err(|e| ValcoachError::Config(e.to_string()))
    }

    /// The LLM API key, if the LLM is enabled and its env var is set.
    pub fn llm_api_key(&self) -> Option<SecretString> {
        if !self.llm.enabled {
            return None;
        }
        Self::resolve_env(&self.llm.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::new)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
