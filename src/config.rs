//! Build and query configuration
//!
//! Every section is optional in the YAML file; omitted values fall back to
//! their defaults.
//!
//! ```yaml
//! build:
//!   strictness: skip
//!   derive_roast_age: false
//! similarity:
//!   k: 3
//!   weights:
//!     overall: 2.0
//!     brewed_with:water_temp_c: 0.5
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::query::FeatureWeights;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// What to do with a record that fails validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Abort the whole build on the first failing record
    #[default]
    Abort,
    /// Skip failing records and report them as warnings
    Skip,
}

/// Graph construction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub strictness: Strictness,
    /// Derive `days_off_roast` on sessions when both dates parse
    pub derive_roast_age: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::Abort,
            derive_roast_age: true,
        }
    }
}

impl BuildConfig {
    pub fn skipping() -> Self {
        Self {
            strictness: Strictness::Skip,
            ..Self::default()
        }
    }
}

/// Defaults for similar-brew search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub k: usize,
    pub weights: FeatureWeights,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            k: 5,
            weights: FeatureWeights::default(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    pub similarity: SimilarityConfig,
}

impl Config {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.similarity
            .weights
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Feature;
    use crate::record::Rating;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.build.strictness, Strictness::Abort);
        assert!(config.build.derive_roast_age);
        assert_eq!(config.similarity.k, 5);
        assert_eq!(config.similarity.weights.len(), Rating::ALL.len());
        assert_eq!(Config::from_yaml_str("").unwrap(), config);
    }

    #[test]
    fn test_partial_yaml() {
        let config = Config::from_yaml_str("build:\n  strictness: skip\n").unwrap();
        assert_eq!(config.build.strictness, Strictness::Skip);
        assert!(config.build.derive_roast_age);
        assert_eq!(config.similarity, SimilarityConfig::default());
    }

    #[test]
    fn test_weights_yaml() {
        let yaml = "similarity:\n  k: 3\n  weights:\n    overall: 2.0\n    brewed_with:water_temp_c: 0.5\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.similarity.k, 3);
        let weights: Vec<(&Feature, f64)> = config.similarity.weights.iter().collect();
        assert_eq!(
            weights,
            vec![
                (&Feature::Rating(Rating::Overall), 2.0),
                (&Feature::BrewedWith("water_temp_c".to_string()), 0.5),
            ]
        );
    }

    #[test]
    fn test_rejects_negative_weight() {
        let yaml = "similarity:\n  weights:\n    body: -1\n";
        assert!(matches!(Config::from_yaml_str(yaml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unknown_feature() {
        let yaml = "similarity:\n  weights:\n    aroma: 1\n";
        assert!(matches!(Config::from_yaml_str(yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brewgraph.yaml");
        std::fs::write(&path, "build:\n  derive_roast_age: false\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.build.derive_roast_age);

        let missing = Config::load(dir.path().join("absent.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
