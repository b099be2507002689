//! Lossy text pre-compression with a deterministic local fallback.
//!
//! The remote ScaleDown service is treated as an optimization: any
//! failure (timeout, transport, non-2xx, malformed body) is recovered
//! by truncating the input to the configured ratio locally. The same
//! ratio governs both paths, so output size is predictable regardless
//! of service availability. Fallbacks are logged, never surfaced.

use crate::config::CompressionConfig;
use crate::error::CompressError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The default ScaleDown compression endpoint.
const DEFAULT_BASE_URL: &str = "https://api.scaledown.xyz/compress/raw/";

/// A remote text-compression capability.
#[async_trait]
pub trait CompressionBackend: Send + Sync {
    /// Compress `text` toward `ratio * len(text)`. May fail; the
    /// caller is responsible for recovery.
    async fn compress(&self, text: &str, ratio: f64) -> Result<String, CompressError>;
}

/// HTTP client for the ScaleDown compression service.
pub struct ScaleDownClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl ScaleDownClient {
    pub fn new(api_key: String, base_url: Option<String>, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            timeout_secs,
        }
    }
}

#[async_trait]
impl CompressionBackend for ScaleDownClient {
    async fn compress(&self, text: &str, ratio: f64) -> Result<String, CompressError> {
        let body = serde_json::json!({
            "text": text,
            "compression_ratio": ratio,
        });

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompressError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    CompressError::Transport {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompressError::Status {
                status: status.as_u16(),
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| CompressError::Protocol {
                message: format!("Invalid JSON in response: {}", e),
            })?;

        data["compressed_text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CompressError::Protocol {
                message: "Response missing 'compressed_text' field".to_string(),
            })
    }
}

/// Compressor with guaranteed-success semantics: remote when a backend
/// is configured, deterministic truncation otherwise or on any remote
/// failure.
pub struct Compressor {
    backend: Option<Arc<dyn CompressionBackend>>,
    ratio: f64,
    max_concurrent: usize,
}

impl Compressor {
    /// Build from configuration. The backend is only created when the
    /// credential env var is set; otherwise the compressor runs
    /// permanently in local-fallback mode.
    pub fn from_config(config: &CompressionConfig) -> Self {
        let backend: Option<Arc<dyn CompressionBackend>> =
            match std::env::var(&config.api_key_env) {
                Ok(key) if !key.is_empty() => Some(Arc::new(ScaleDownClient::new(
                    key,
                    config.base_url.clone(),
                    config.timeout_secs,
                ))),
                _ => {
                    debug!(
                        var = config.api_key_env.as_str(),
                        "Compression credential not set; using local fallback only"
                    );
                    None
                }
            };

        Self {
            backend,
            ratio: config.ratio,
            max_concurrent: config.max_concurrent.max(1),
        }
    }

    /// Build with an explicit backend (or none for pure local mode).
    pub fn with_backend(
        backend: Option<Arc<dyn CompressionBackend>>,
        ratio: f64,
        max_concurrent: usize,
    ) -> Self {
        Self {
            backend,
            ratio,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Compress a single text. Never fails; output length never
    /// exceeds input length.
    pub async fn compress(&self, text: &str) -> String {
        compress_one(self.backend.clone(), text.to_string(), self.ratio).await
    }

    /// Compress independent texts concurrently, bounded by the
    /// configured worker-pool size. Output order is input order
    /// regardless of completion order; a per-item failure substitutes
    /// that item's local fallback.
    pub async fn compress_batch(&self, texts: Vec<String>) -> Vec<String> {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(texts.len());

        for text in &texts {
            let backend = self.backend.clone();
            let text = text.clone();
            let ratio = self.ratio;
            let sem = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire().await.unwrap();
                compress_one(backend, text, ratio).await
            }));
        }

        // Awaiting the handles in spawn order keeps output aligned
        // with input even when later tasks finish first.
        let mut results = Vec::with_capacity(texts.len());
        for (i, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(compressed) => results.push(compressed),
                Err(e) => {
                    warn!(item = i, error = %e, "Compression task failed; using local fallback");
                    results.push(truncate_to_ratio(&texts[i], self.ratio));
                }
            }
        }
        results
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

async fn compress_one(
    backend: Option<Arc<dyn CompressionBackend>>,
    text: String,
    ratio: f64,
) -> String {
    let Some(backend) = backend else {
        return truncate_to_ratio(&text, ratio);
    };

    match backend.compress(&text, ratio).await {
        Ok(compressed) if compressed.len() <= text.len() => compressed,
        Ok(_) => {
            warn!("Compression service returned more text than it was given; using local fallback");
            truncate_to_ratio(&text, ratio)
        }
        Err(e) => {
            warn!(error = %e, "Compression service failed; using local fallback");
            truncate_to_ratio(&text, ratio)
        }
    }
}

/// Deterministic local reduction: keep the first `ratio` fraction of
/// the text's characters, respecting char boundaries.
fn truncate_to_ratio(text: &str, ratio: f64) -> String {
    let total = text.chars().count();
    let keep = (total as f64 * ratio.clamp(0.0, 1.0)).floor() as usize;
    text.chars().take(keep).collect()
}
