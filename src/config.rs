use crate::constants::{DEFAULT_CRITICAL_LABELS, DEFAULT_QUALITY_FLAG_LABELS, ENV_CSV_URL};
use crate::error::{ErrlogError, Result};
use crate::types::SeverityConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub severity: SeverityLabels,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourceConfig {
    /// Published spreadsheet link; any of the accepted sharing shapes.
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SeverityLabels {
    #[serde(default = "default_critical")]
    pub critical: Vec<String>,
    #[serde(default = "default_quality_flags")]
    pub quality_flags: Vec<String>,
}

fn default_critical() -> Vec<String> {
    DEFAULT_CRITICAL_LABELS.iter().map(|s| s.to_string()).collect()
}

fn default_quality_flags() -> Vec<String> {
    DEFAULT_QUALITY_FLAG_LABELS.iter().map(|s| s.to_string()).collect()
}

impl Default for SeverityLabels {
    fn default() -> Self {
        Self {
            critical: default_critical(),
            quality_flags: default_quality_flags(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ErrlogError::Config(format!("Failed to read config file '{}': {}", config_path, e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Like `load`, but a missing config file falls back to defaults so the
    /// CLI can run from `--url` or the environment alone.
    pub fn load_or_default() -> Result<Self> {
        if Path::new("config.toml").exists() {
            Self::load()
        } else {
            Ok(Config::default())
        }
    }

    /// Resolve the source URL: CLI override, then environment, then config.
    /// No non-empty URL anywhere is a configuration error.
    pub fn resolve_url(&self, override_url: Option<&str>) -> Result<String> {
        let env_url = std::env::var(ENV_CSV_URL).ok();
        self.resolve_url_from(override_url, env_url)
    }

    fn resolve_url_from(&self, override_url: Option<&str>, env_url: Option<String>) -> Result<String> {
        let candidates = [
            override_url.map(|s| s.to_string()),
            env_url,
            Some(self.source.url.clone()),
        ];
        for candidate in candidates.into_iter().flatten() {
            let trimmed = candidate.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
        Err(ErrlogError::Config(format!(
            "no source URL configured; set source.url in config.toml, {} in the environment, or pass --url",
            ENV_CSV_URL
        )))
    }

    pub fn severity_config(&self) -> SeverityConfig {
        SeverityConfig::new(self.severity.critical.clone(), self.severity.quality_flags.clone())
    }
}
