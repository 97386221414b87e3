// src/core/config_manager.rs
//! Configuration: optional `config.yaml`, then environment overrides.

use crate::validator::parse_keywords;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_FOUNDER_KEYWORDS: &[&str] = &[
    "founder",
    "co-founder",
    "cofounder",
    "ceo",
    "chief executive",
    "owner",
    "entrepreneur",
    "creator",
];

pub const DEFAULT_STEALTH_KEYWORDS: &[&str] = &["stealth", "building", "launching", "starting"];

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub provider: ProviderConfig,
    pub generator: GeneratorConfig,
    pub tracking: TrackingConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub log_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    Live,
    Offline,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub mode: ProviderMode,
    pub api_key: Option<String>,
    pub base_url: String,
    pub calls_per_minute: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct TrackingConfig {
    pub founder_keywords: Vec<String>,
    pub stealth_keywords: Vec<String>,
    /// Parallel fetches in a batch; 1 unless the provider budget is known
    pub concurrency: usize,
}

/// Web search used to discover candidate profiles; offline without a key
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mode: ProviderMode::Offline,
            api_key: None,
            base_url: crate::provider::proxycurl::DEFAULT_BASE_URL.to_string(),
            calls_per_minute: 2,
            timeout_seconds: 30,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 100,
            temperature: 0.7,
            timeout_seconds: 30,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            founder_keywords: DEFAULT_FOUNDER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            stealth_keywords: DEFAULT_STEALTH_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            concurrency: 1,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: crate::discovery::serpapi::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

// Shape of config.yaml; every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    log_path: Option<PathBuf>,
    provider: ProviderSection,
    generator: GeneratorSection,
    tracking: TrackingSection,
    discovery: DiscoverySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProviderSection {
    mode: Option<ProviderMode>,
    api_key: Option<String>,
    base_url: Option<String>,
    calls_per_minute: Option<u32>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneratorSection {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrackingSection {
    founder_keywords: Option<Vec<String>>,
    stealth_keywords: Option<Vec<String>>,
    concurrency: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DiscoverySection {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

impl ConfigManager {
    /// Load from `$FOUNDER_TRACKER_CONFIG` or `./config.yaml` (if present) and the process environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("FOUNDER_TRACKER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.yaml"));
        let file = if path.exists() { Some(path) } else { None };

        Self::load_from(file.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn load_from<F>(config_path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match config_path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_yaml::from_str::<ConfigFile>(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => ConfigFile::default(),
        };

        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let environment = EnvironmentConfig {
            database_path: env("DATABASE_PATH")
                .map(PathBuf::from)
                .or(file.database_path)
                .unwrap_or_else(|| PathBuf::from("data/founder_tracker.db")),
            log_path: env("LOG_PATH")
                .map(PathBuf::from)
                .or(file.log_path)
                .unwrap_or_else(|| PathBuf::from("/tmp/founder-tracker.log")),
        };

        let provider = Self::load_provider(file.provider, &env)?;
        let generator = Self::load_generator(file.generator, &env)?;
        let tracking = Self::load_tracking(file.tracking, &env)?;

        let discovery_defaults = DiscoveryConfig::default();
        let discovery = DiscoveryConfig {
            api_key: env("SERPAPI_API_KEY").or(file.discovery.api_key),
            base_url: file
                .discovery
                .base_url
                .unwrap_or(discovery_defaults.base_url),
            timeout_seconds: file
                .discovery
                .timeout_seconds
                .unwrap_or(discovery_defaults.timeout_seconds),
        };

        Ok(Self {
            environment,
            provider,
            generator,
            tracking,
            discovery,
        })
    }

    fn load_provider<F>(section: ProviderSection, env: &F) -> Result<ProviderConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ProviderConfig::default();
        let api_key = env("PROXYCURL_API_KEY").or(section.api_key);

        let mode = match env("PROVIDER_MODE") {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "live" => ProviderMode::Live,
                "offline" => ProviderMode::Offline,
                other => anyhow::bail!("PROVIDER_MODE must be 'live' or 'offline', got '{}'", other),
            },
            None => section.mode.unwrap_or(if api_key.is_some() {
                ProviderMode::Live
            } else {
                ProviderMode::Offline
            }),
        };

        if mode == ProviderMode::Live && api_key.is_none() {
            anyhow::bail!("Provider mode is 'live' but PROXYCURL_API_KEY is not set");
        }

        let calls_per_minute = match env("PROVIDER_CALLS_PER_MINUTE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .context("PROVIDER_CALLS_PER_MINUTE must be a positive integer")?,
            None => section.calls_per_minute.unwrap_or(defaults.calls_per_minute),
        };

        Ok(ProviderConfig {
            mode,
            api_key,
            base_url: env("PROXYCURL_BASE_URL")
                .or(section.base_url)
                .unwrap_or(defaults.base_url),
            calls_per_minute: calls_per_minute.max(1),
            timeout_seconds: section.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        })
    }

    fn load_generator<F>(section: GeneratorSection, env: &F) -> Result<GeneratorConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GeneratorConfig::default();
        Ok(GeneratorConfig {
            api_key: env("OPENAI_API_KEY").or(section.api_key),
            base_url: env("OPENAI_BASE_URL")
                .or(section.base_url)
                .unwrap_or(defaults.base_url),
            model: env("OPENAI_MODEL")
                .or(section.model)
                .unwrap_or(defaults.model),
            max_tokens: section.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: section.temperature.unwrap_or(defaults.temperature),
            timeout_seconds: section.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        })
    }

    fn load_tracking<F>(section: TrackingSection, env: &F) -> Result<TrackingConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TrackingConfig::default();

        let founder_keywords = env("FOUNDER_KEYWORDS")
            .map(|raw| parse_keywords(&raw))
            .or(section.founder_keywords)
            .filter(|k| !k.is_empty())
            .unwrap_or(defaults.founder_keywords);

        let stealth_keywords = section
            .stealth_keywords
            .filter(|k| !k.is_empty())
            .unwrap_or(defaults.stealth_keywords);

        let concurrency = match env("TRACKER_CONCURRENCY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .context("TRACKER_CONCURRENCY must be a positive integer")?,
            None => section.concurrency.unwrap_or(defaults.concurrency),
        };

        Ok(TrackingConfig {
            founder_keywords,
            stealth_keywords,
            concurrency: concurrency.max(1),
        })
    }

    /// Ensure parent directories of the database and log file exist
    pub async fn ensure_directories(&self) -> Result<()> {
        for path in [&self.environment.database_path, &self.environment.log_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        info!("Database: {}", self.environment.database_path.display());
        info!(
            "Provider: {:?} ({} calls/min, concurrency {})",
            self.provider.mode, self.provider.calls_per_minute, self.tracking.concurrency
        );
        if self.provider.mode == ProviderMode::Offline {
            warn!("Running with the offline provider; profile data is simulated");
        }
        if self.generator.api_key.is_none() {
            warn!("OPENAI_API_KEY not set; insights will use templated fallbacks");
        }
        if self.discovery.api_key.is_none() {
            warn!("SERPAPI_API_KEY not set; discovery returns sample profiles");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = ConfigManager::load_from(None, env_of(&[])).unwrap();
        assert_eq!(config.provider.mode, ProviderMode::Offline);
        assert_eq!(config.provider.calls_per_minute, 2);
        assert_eq!(config.tracking.concurrency, 1);
        assert_eq!(config.tracking.founder_keywords.len(), 8);
        assert_eq!(config.tracking.stealth_keywords.len(), 4);
        assert_eq!(config.generator.model, "gpt-4o-mini");
        assert!(config.generator.api_key.is_none());
        assert!(config.discovery.api_key.is_none());
    }

    #[test]
    fn test_discovery_key_from_env() {
        let config =
            ConfigManager::load_from(None, env_of(&[("SERPAPI_API_KEY", "serp")])).unwrap();
        assert_eq!(config.discovery.api_key.as_deref(), Some("serp"));
        assert_eq!(config.discovery.base_url, "https://serpapi.com/search");
    }

    #[test]
    fn test_api_key_selects_live_mode() {
        let config =
            ConfigManager::load_from(None, env_of(&[("PROXYCURL_API_KEY", "secret")])).unwrap();
        assert_eq!(config.provider.mode, ProviderMode::Live);

        let forced = ConfigManager::load_from(
            None,
            env_of(&[("PROXYCURL_API_KEY", "secret"), ("PROVIDER_MODE", "offline")]),
        )
        .unwrap();
        assert_eq!(forced.provider.mode, ProviderMode::Offline);
    }

    #[test]
    fn test_live_mode_without_key_is_rejected() {
        let err = ConfigManager::load_from(None, env_of(&[("PROVIDER_MODE", "live")])).unwrap_err();
        assert!(err.to_string().contains("PROXYCURL_API_KEY"));
    }

    #[test]
    fn test_keyword_override_and_blank_fallback() {
        let config = ConfigManager::load_from(
            None,
            env_of(&[("FOUNDER_KEYWORDS", "Founder, Partner")]),
        )
        .unwrap();
        assert_eq!(config.tracking.founder_keywords, vec!["Founder", "Partner"]);

        let blank = ConfigManager::load_from(None, env_of(&[("FOUNDER_KEYWORDS", " , ")])).unwrap();
        assert_eq!(blank.tracking.founder_keywords.len(), 8);
    }

    #[test]
    fn test_yaml_file_with_env_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_path: /var/lib/tracker.db\nprovider:\n  calls_per_minute: 10\ntracking:\n  concurrency: 3\n  stealth_keywords: [\"stealth\"]\ngenerator:\n  model: gpt-4o"
        )
        .unwrap();

        let config = ConfigManager::load_from(
            Some(file.path()),
            env_of(&[("TRACKER_CONCURRENCY", "2")]),
        )
        .unwrap();

        assert_eq!(
            config.environment.database_path,
            PathBuf::from("/var/lib/tracker.db")
        );
        assert_eq!(config.provider.calls_per_minute, 10);
        assert_eq!(config.tracking.concurrency, 2);
        assert_eq!(config.tracking.stealth_keywords, vec!["stealth"]);
        assert_eq!(config.generator.model, "gpt-4o");
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(ConfigManager::load_from(None, env_of(&[("TRACKER_CONCURRENCY", "many")])).is_err());
        assert!(
            ConfigManager::load_from(None, env_of(&[("PROVIDER_CALLS_PER_MINUTE", "-1")])).is_err()
        );
    }
}
