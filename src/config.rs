//! Configuration loading for wordtrain.

use crate::forest::ForestConfig;
use crate::store::MODEL_FILE_NAME;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default HTTP timeout for fetching source text
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub model: Option<ModelConfig>,
    pub forest: Option<ForestSection>,
    pub fetch: Option<FetchConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ForestSection {
    pub n_trees: Option<usize>,
    pub max_depth: Option<usize>,
    pub max_features: Option<usize>,
    pub bootstrap: Option<bool>,
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Model slot path: configured value or `<data dir>/wordtrain/<file>`.
    pub fn model_path(&self) -> PathBuf {
        self.model
            .as_ref()
            .and_then(|m| m.path.clone())
            .unwrap_or_else(default_model_path)
    }

    /// Forest settings with unset keys taken from `ForestConfig::default()`.
    pub fn forest_config(&self) -> ForestConfig {
        let defaults = ForestConfig::default();
        let Some(section) = self.forest.as_ref() else {
            return defaults;
        };
        ForestConfig {
            n_trees: section.n_trees.unwrap_or(defaults.n_trees).max(1),
            max_depth: section.max_depth.or(defaults.max_depth),
            max_features: section.max_features.or(defaults.max_features),
            bootstrap: section.bootstrap.unwrap_or(defaults.bootstrap),
            seed: section.seed.unwrap_or(defaults.seed),
            ..defaults
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        let secs = self
            .fetch
            .as_ref()
            .and_then(|f| f.timeout_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }
}

/// Base data directory (XDG data directory)
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordtrain")
}

pub fn default_model_path() -> PathBuf {
    data_dir().join(MODEL_FILE_NAME)
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordtrain")
        .join("config.toml")
}

/// Load the config at `path`; a missing file gives the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.forest_config(), ForestConfig::default());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert!(config.model_path().ends_with(MODEL_FILE_NAME));
    }

    #[test]
    fn test_partial_forest_section() {
        let config: Config = toml::from_str(
            r#"
            [forest]
            n_trees = 25
            seed = 7

            [model]
            path = "/tmp/wordtrain/model.json"
            "#,
        )
        .unwrap();

        let forest = config.forest_config();
        assert_eq!(forest.n_trees, 25);
        assert_eq!(forest.seed, 7);
        assert!(!forest.bootstrap);
        assert_eq!(config.model_path(), PathBuf::from("/tmp/wordtrain/model.json"));
    }

    #[test]
    fn test_zero_trees_is_clamped() {
        let config = Config {
            forest: Some(ForestSection {
                n_trees: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.forest_config().n_trees, 1);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.toml")).unwrap();
        assert!(config.forest.is_none());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[forest]\ntrees = 3\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }
}
