//! Generator configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, the
//! `[generator]` and `[learning]` sections of a TOML file, and environment
//! variables:
//!
//! - `FLOWSMITH_PROVIDER` — provider name recorded with each generation
//! - `FLOWSMITH_MODEL` — model identifier sent to the completion service
//! - `FLOWSMITH_PLATFORM` — default target platform (`n8n`, `zapier`, ...)

use std::path::Path;

use flowsmith_learning::LearningConfig;
use flowsmith_patterns::Platform;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GenerateError, Result};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/flowsmith.toml";

/// Tunables for the workflow generator and its learning engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Provider name, recorded with every generation.
    pub provider: String,
    /// Model identifier sent to the completion service.
    pub model: String,
    pub temperature: f32,
    /// Platform used when a request names none.
    pub platform: Platform,
    /// Number of matched patterns described in the prompt.
    pub pattern_hints: usize,
    /// Horizontal distance between auto-laid-out nodes.
    pub node_spacing: f64,
    pub learning: LearningConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.2,
            platform: Platform::N8n,
            pattern_hints: 1,
            node_spacing: 250.0,
            learning: LearningConfig::default(),
        }
    }
}

/// On-disk layout.  Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    generator: GeneratorToml,
    #[serde(default)]
    learning: Option<LearningConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct GeneratorToml {
    provider: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    platform: Option<String>,
    pattern_hints: Option<usize>,
    node_spacing: Option<f64>,
}

impl GeneratorConfig {
    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| GenerateError::Config {
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        let generator = file.generator;
        if let Some(provider) = generator.provider {
            config.provider = provider;
        }
        if let Some(model) = generator.model {
            config.model = model;
        }
        if let Some(temperature) = generator.temperature {
            config.temperature = temperature;
        }
        if let Some(platform) = generator.platform {
            config.platform = platform.parse::<Platform>().map_err(|e| GenerateError::Config {
                reason: format!("{e}"),
            })?;
        }
        if let Some(hints) = generator.pattern_hints {
            config.pattern_hints = hints;
        }
        if let Some(spacing) = generator.node_spacing {
            config.node_spacing = spacing;
        }
        if let Some(learning) = file.learning {
            config.learning = learning;
        }
        Ok(config)
    }

    /// Read `path`, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GenerateError::Config {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        debug!(path = %path.display(), "generator configuration loaded");
        Ok(config)
    }

    /// Defaults, [`DEFAULT_CONFIG_PATH`] when present, then the
    /// environment.  An unreadable file is logged and skipped.
    pub fn from_env() -> Self {
        let mut config = match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
            Ok(content) => Self::from_toml_str(&content).unwrap_or_else(|e| {
                warn!(path = DEFAULT_CONFIG_PATH, error = %e, "ignoring invalid config file");
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.apply_env_overrides();
        config
    }

    /// Apply `FLOWSMITH_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = value("FLOWSMITH_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = value("FLOWSMITH_MODEL") {
            self.model = model;
        }
        if let Some(raw) = value("FLOWSMITH_PLATFORM") {
            match raw.parse::<Platform>() {
                Ok(platform) => self.platform = platform,
                Err(e) => warn!(value = %raw, error = %e, "ignoring FLOWSMITH_PLATFORM"),
            }
        }
    }
}
