//! Configuration for the Policy Navigator pipeline.
//!
//! Uses `figment` for layered configuration: built-in defaults -> an
//! optional TOML file -> environment variables prefixed with
//! `POLICYNAV_` (sections split on `__`, e.g.
//! `POLICYNAV_RETRIEVAL__TOP_K=15`).

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigatorConfig {
    pub generation: GenerationConfig,
    pub compression: CompressionConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
}

/// Configuration for the generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Environment variable holding the API key. The key must be
    /// present at pipeline construction; absence is a configuration
    /// error, not a deferred ask failure.
    pub api_key_env: String,
    pub model: String,
    /// Override the API base URL (tests, proxies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub max_output_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".into(),
            model: "gemini-2.5-flash".into(),
            base_url: None,
            max_output_tokens: 2048,
            temperature: 0.2,
        }
    }
}

/// Configuration for the remote compression service and its local
/// fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Environment variable holding the API key. When unset the
    /// pipeline runs permanently in local-fallback mode.
    pub api_key_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Target output/input length ratio. The same ratio governs the
    /// remote call and the local truncation fallback.
    pub ratio: f64,
    /// Per-request timeout for the remote call, in seconds.
    pub timeout_secs: u64,
    /// Worker-pool bound for batch compression.
    pub max_concurrent: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            api_key_env: "SCALEDOWN_API_KEY".into(),
            base_url: None,
            ratio: 0.5,
            timeout_secs: 10,
            max_concurrent: 4,
        }
    }
}

/// Configuration for page-to-chunk decomposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target window size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent windows, in characters.
    pub chunk_overlap: usize,
    /// Length of the original-text snippet carried by each chunk.
    pub snippet_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            snippet_chars: 200,
        }
    }
}

/// Configuration for query-time retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest chunks to retrieve; clamped to the chunk
    /// count of the loaded document.
    pub top_k: usize,
    /// Character budget for citation previews.
    pub preview_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            preview_chars: 160,
        }
    }
}

/// Configuration for the embedding capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Output dimensionality, fixed for the lifetime of an index.
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self { dimensions: 384 }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `POLICYNAV_`)
/// 2. An explicit TOML file, if given
/// 3. Built-in defaults
pub fn load_config(config_file: Option<&Path>) -> Result<NavigatorConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(NavigatorConfig::default()));

    if let Some(path) = config_file {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("POLICYNAV_").split("__"));

    figment.extract().map_err(Box::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let config = NavigatorConfig::default();
        assert_eq!(config.generation.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.compression.ratio, 0.5);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 50);
        assert_eq!(config.retrieval.top_k, 10);
        assert_eq!(config.embedding.dimensions, 384);
    }

    #[test]
    fn env_overrides_round_trip_into_the_config() {
        std::env::set_var("POLICYNAV_RETRIEVAL__TOP_K", "15");
        std::env::set_var("POLICYNAV_COMPRESSION__RATIO", "0.25");

        let config = load_config(None).unwrap();

        std::env::remove_var("POLICYNAV_RETRIEVAL__TOP_K");
        std::env::remove_var("POLICYNAV_COMPRESSION__RATIO");

        assert_eq!(config.retrieval.top_k, 15);
        assert_eq!(config.compression.ratio, 0.25);
        assert_eq!(config.chunking.chunk_size, 500);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policynav.toml");
        std::fs::write(
            &path,
            "[retrieval]\ntop_k = 15\n\n[compression]\nratio = 0.25\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.retrieval.top_k, 15);
        assert_eq!(config.compression.ratio, 0.25);
        // Untouched sections keep their defaults.
        assert_eq!(config.chunking.chunk_size, 500);
    }
}
