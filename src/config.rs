use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classifier::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_MODEL, DEFAULT_NEIGHBORS};

/// Task instruction prepended to every query-mode embedding. Passages use a
/// plain "passage: " marker instead; the pair keeps the embedding space
/// calibrated.
const DEFAULT_TASK_INSTRUCTION: &str = "Classify this email as phishing or legitimate based on its content, sender patterns, and suspicious indicators";
/// Maximum characters embedded per example text
const DEFAULT_MAX_EMBED_CHARS: usize = 4000;
/// Default model download timeout in seconds
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Configuration for the embedding classifier
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Model name for embeddings (e.g., "multilingual-e5-large")
    #[serde(default = "default_model")]
    pub model: String,

    /// Task instruction used for query-mode embedding
    #[serde(default = "default_task_instruction")]
    pub task_instruction: String,

    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunk overlap in characters (must be smaller than chunk_size)
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of nearest neighbors used for voting
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,

    /// Maximum characters embedded per labeled example
    #[serde(default = "default_max_embed_chars")]
    pub max_embed_chars: usize,

    /// Timeout for model download in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            task_instruction: DEFAULT_TASK_INSTRUCTION.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            neighbors: DEFAULT_NEIGHBORS,
            max_embed_chars: DEFAULT_MAX_EMBED_CHARS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_task_instruction() -> String {
    DEFAULT_TASK_INSTRUCTION.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

fn default_neighbors() -> usize {
    DEFAULT_NEIGHBORS
}

fn default_max_embed_chars() -> usize {
    DEFAULT_MAX_EMBED_CHARS
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    fn validate(&self) {
        let c = &self.classifier;
        if c.chunk_size == 0 {
            panic!("classifier.chunk_size must be greater than 0");
        }
        if c.chunk_overlap >= c.chunk_size {
            panic!(
                "classifier.chunk_overlap must be smaller than classifier.chunk_size, got {} >= {}",
                c.chunk_overlap, c.chunk_size
            );
        }
        if c.neighbors == 0 {
            panic!("classifier.neighbors must be greater than 0");
        }
        if c.max_embed_chars == 0 {
            panic!("classifier.max_embed_chars must be greater than 0");
        }
        if c.download_timeout_secs == 0 {
            panic!("classifier.download_timeout_secs must be greater than 0");
        }
    }

    pub fn load_with(base_path: &Path) -> Self {
        let config_path = base_path.join("config.yaml");

        // create new if does not exist
        if !config_path.exists() {
            std::fs::create_dir_all(base_path).expect("could not create config directory");
            std::fs::write(
                &config_path,
                serde_yml::to_string(&Self::default()).unwrap().as_bytes(),
            )
            .expect("could not write default config");
        }

        let config_str =
            std::fs::read_to_string(&config_path).expect("config file is not readable");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        config.base_path = base_path.to_path_buf();

        config.validate();

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).unwrap() {
            config.save();
        }

        config
    }

    pub fn save(&self) {
        let config_str = serde_yml::to_string(&self).unwrap();
        std::fs::write(self.base_path.join("config.yaml"), config_str.as_bytes())
            .expect("could not write config");
    }
}

/// Data directory for config and cached model files (~/.phishscan).
pub fn base_path() -> anyhow::Result<PathBuf> {
    let home = homedir::my_home()?
        .ok_or_else(|| anyhow::anyhow!("could not resolve home directory"))?;
    Ok(home.join(".phishscan"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate();
        assert_eq!(config.classifier.chunk_size, 1000);
        assert_eq!(config.classifier.chunk_overlap, 200);
        assert_eq!(config.classifier.neighbors, 3);
        assert_eq!(config.classifier.max_embed_chars, 4000);
    }

    #[test]
    #[should_panic(expected = "chunk_overlap")]
    fn test_overlap_must_be_smaller_than_size() {
        let mut config = Config::default();
        config.classifier.chunk_overlap = config.classifier.chunk_size;
        config.validate();
    }

    #[test]
    fn test_load_with_creates_and_reloads() {
        let dir = tempfile::tempdir().unwrap();

        let config = Config::load_with(dir.path());
        assert!(dir.path().join("config.yaml").exists());

        // Reload picks up the written defaults
        let reloaded = Config::load_with(dir.path());
        assert_eq!(reloaded.classifier.model, config.classifier.model);
        assert_eq!(reloaded.classifier.chunk_size, config.classifier.chunk_size);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "classifier:\n  neighbors: 5\n").unwrap();

        let config = Config::load_with(dir.path());
        assert_eq!(config.classifier.neighbors, 5);
        assert_eq!(config.classifier.chunk_size, 1000);
    }
}
