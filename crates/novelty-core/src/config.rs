use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::types::IdentityMode;

/// Top-level configuration for the novelty service.
///
/// Loaded from `~/.novelty/config.toml` by default. Each section corresponds
/// to one component or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoveltyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
}

impl NoveltyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NoveltyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite corpus database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP API port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.novelty/data".to_string(),
            log_level: "info".to_string(),
            port: 8000,
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding backend: "onnx" or "mock".
    pub backend: String,
    /// Directory containing `model.onnx` and `tokenizer.json` for the
    /// onnx backend.
    pub model_dir: String,
    /// Vector dimension used by the mock backend. The onnx backend
    /// detects its own output dimension from the model.
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: "mock".to_string(),
            model_dir: "~/.novelty/models/all-mpnet-base-v2".to_string(),
            dimensions: 768,
        }
    }
}

/// Corpus comparison settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Identity policy for ingested keys: upsert replaces a key in place,
    /// append stores every submission as a new row.
    pub identity_mode: IdentityMode,
    /// Number of nearest neighbors fed into the score.
    pub neighbor_limit: usize,
    /// Minimum accepted text length in characters.
    pub min_text_chars: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            identity_mode: IdentityMode::Upsert,
            neighbor_limit: 5,
            min_text_chars: 10,
        }
    }
}
