//! Analysis configuration loaded from YAML.
//!
//! Layers are applied in order, later layers overriding earlier ones key by key:
//!
//! 1. **Built-in**: [`AnalysisConfig::default`]
//! 2. **User**: `~/.parksense/config.yaml`
//! 3. **Project**: `config/parksense.yaml` under the working directory
//! 4. **Explicit**: a path given by the caller (must exist)
//!
//! Command-line overrides are applied by the caller on the loaded value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parksense_images::ImageConfig;
use parksense_providers::{CredentialSource, ImageDetail, DEFAULT_API_KEY_ENV};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::mock::{MockOracle, MockStrategy};
use crate::request::{RequestSettings, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Provider connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub model: String,
    /// Override for OpenAI-compatible endpoints
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_seconds: u64,
    /// Environment variable holding the credential
    pub api_key_env: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_seconds: 30,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

/// Offline mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockSettings {
    pub strategy: MockStrategy,
    pub delay_ms: u64,
    /// Use mock results even when a credential is present
    pub force: bool,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            strategy: MockStrategy::TimeOfDay,
            delay_ms: 3000,
            force: false,
        }
    }
}

/// Top-level configuration of the analysis pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub provider: ProviderSettings,
    pub image: ImageConfig,
    pub mock: MockSettings,
}

impl AnalysisConfig {
    /// Parse and validate a single YAML document.
    pub fn from_yaml_str(content: &str) -> AnalysisResult<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the full hierarchy, ending with `explicit` if given.
    pub fn load_with_hierarchy(explicit: Option<&Path>) -> AnalysisResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(AnalysisError::Configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }

        let mut layers = Vec::new();
        if let Some(home) = dirs::home_dir() {
            layers.push(home.join(".parksense").join("config.yaml"));
        }
        layers.push(PathBuf::from("config").join("parksense.yaml"));
        if let Some(path) = explicit {
            layers.push(path.to_path_buf());
        }

        Self::load_layers(&layers)
    }

    /// Merge `paths` in order over the defaults. Missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> AnalysisResult<Self> {
        let mut merged = serde_yaml::to_value(AnalysisConfig::default())?;

        for path in paths {
            if !path.exists() {
                continue;
            }
            debug!(path = %path.display(), "Loading config layer");
            let content = std::fs::read_to_string(path)?;
            let layer: Value = serde_yaml::from_str(&content).map_err(|e| {
                AnalysisError::Configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            merge_values(&mut merged, layer);
        }

        let config: AnalysisConfig = serde_yaml::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        let provider = &self.provider;
        if provider.model.trim().is_empty() {
            return Err(AnalysisError::Configuration("provider.model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&provider.temperature) {
            return Err(AnalysisError::Configuration(format!(
                "provider.temperature must be in [0, 2], got {}",
                provider.temperature
            )));
        }
        if provider.max_tokens == 0 {
            return Err(AnalysisError::Configuration(
                "provider.max_tokens must be greater than zero".to_string(),
            ));
        }
        if provider.timeout_seconds == 0 {
            return Err(AnalysisError::Configuration(
                "provider.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if provider.api_key_env.trim().is_empty() {
            return Err(AnalysisError::Configuration(
                "provider.api_key_env must not be empty".to_string(),
            ));
        }

        self.image
            .validate()
            .map_err(|e| AnalysisError::Configuration(e.to_string()))
    }

    /// Credential lookup described by this configuration.
    pub fn credential_source(&self) -> CredentialSource {
        CredentialSource::Env(self.provider.api_key_env.clone())
    }

    pub fn request_settings(&self) -> RequestSettings {
        RequestSettings {
            model: self.provider.model.clone(),
            temperature: self.provider.temperature,
            max_tokens: self.provider.max_tokens,
            detail: ImageDetail::High,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_seconds)
    }

    pub fn mock_oracle(&self) -> MockOracle {
        MockOracle::new(self.mock.strategy, Duration::from_millis(self.mock.delay_ms))
    }
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();

        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.image.max_width, 1024);
        assert_eq!(config.mock.delay_ms, 3000);
        assert_eq!(config.mock.strategy, MockStrategy::TimeOfDay);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AnalysisConfig::from_yaml_str(
            "provider:\n  model: gpt-4o-mini\nmock:\n  strategy: random_catalog\n",
        )
        .unwrap();

        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.max_tokens, 500);
        assert_eq!(config.mock.strategy, MockStrategy::RandomCatalog);
        assert_eq!(config.mock.delay_ms, 3000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AnalysisConfig::from_yaml_str("provider:\n  max_tokens: 0\n").unwrap_err();
        assert!(err.is_configuration());

        let err = AnalysisConfig::from_yaml_str("image:\n  quality: 1.5\n").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_layers_merge_in_order() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.yaml");
        let project = dir.path().join("project.yaml");
        fs::write(&user, "provider:\n  model: gpt-4o-mini\n  timeout_seconds: 10\n").unwrap();
        fs::write(&project, "provider:\n  timeout_seconds: 5\nimage:\n  max_width: 800\n").unwrap();

        let config = AnalysisConfig::load_layers(&[
            user,
            dir.path().join("missing.yaml"),
            project,
        ])
        .unwrap();

        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.timeout_seconds, 5);
        assert_eq!(config.image.max_width, 800);
        assert_eq!(config.image.quality, 0.8);
    }

    #[test]
    fn test_empty_layer_is_ignored() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.yaml");
        fs::write(&empty, "").unwrap();

        let config = AnalysisConfig::load_layers(&[empty]).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");

        let err = AnalysisConfig::load_with_hierarchy(Some(&missing)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_derived_settings() {
        let mut config = AnalysisConfig::default();
        config.provider.api_key_env = "PARKSENSE_KEY".to_string();
        config.mock.delay_ms = 0;

        assert_eq!(
            config.credential_source(),
            CredentialSource::Env("PARKSENSE_KEY".to_string())
        );
        assert_eq!(config.request_settings().max_tokens, 500);
        assert_eq!(config.mock_oracle().delay(), Duration::ZERO);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }
}
