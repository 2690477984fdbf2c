use crate::constants::{
    DEFAULT_REVIEWER_TIMEOUT_SECS, DEFAULT_SCORE_THRESHOLD, DEFAULT_SESSION_TTL_SECS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A runtime-registered pattern, supplied through `configure` or the
/// optional TOML config file. Coexists with built-ins and participates in
/// overlap resolution on equal footing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPatternSpec {
    pub name: String,
    pub regex: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Score floor applied to candidates before overlap resolution.
    pub score_threshold: f32,
    /// Entity types excluded from detection.
    pub disabled_entities: HashSet<String>,
    /// Session lifetime in seconds.
    pub session_ttl_secs: i64,
    /// Whether the neural layer runs at all. Callers with strict latency
    /// bounds turn this off.
    pub neural_enabled: bool,
    /// Wall-clock budget for the generative reviewer.
    pub reviewer_timeout_secs: u64,
    /// Patterns registered at construction time.
    #[serde(default)]
    pub custom_patterns: Vec<CustomPatternSpec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            disabled_entities: HashSet::new(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            neural_enabled: true,
            reviewer_timeout_secs: DEFAULT_REVIEWER_TIMEOUT_SECS,
            custom_patterns: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load overrides from a TOML file. Missing keys fall back to defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading config file {}", path.as_ref().display()))?;
        let config: Self = toml::from_str(&raw).context("parsing engine config")?;
        Ok(config)
    }
}
