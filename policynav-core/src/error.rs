//! Error types for the Policy Navigator pipeline.
//!
//! Uses `thiserror` for public API error types, one enum per failure
//! domain. Compression failures are deliberately fine-grained (timeout
//! vs. transport vs. protocol) so each fallback cause can be exercised
//! independently; they are recovered internally and never cross the
//! public API.

use std::path::PathBuf;

/// Top-level error type for the pipeline public surface.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Generation error: {0}")]
    Generate(#[from] GenerateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("No document loaded; call load_document before ask")]
    NoDocument,
}

/// Errors from loading and decomposing a document.
///
/// A failed load leaves the pipeline in its previous state; no partial
/// chunk sequence or index is installed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot read document {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document contains no extractable text")]
    Empty,

    #[error("Document produced no chunks")]
    NoChunks,

    #[error("Index build failed: {0}")]
    Index(#[from] IndexError),
}

/// Errors from the remote compression service.
///
/// All variants are recovered by local truncation inside the
/// compressor; they exist so callers of the backend trait (and tests)
/// can distinguish the cause.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    #[error("Compression request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Compression transport failure: {message}")]
    Transport { message: String },

    #[error("Compression service returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed compression response: {message}")]
    Protocol { message: String },
}

/// Errors from the generation service. Not masked: a failed generation
/// is a failed ask.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {var}")]
    MissingEnv { var: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Errors from vector index construction and search.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Cannot build an index over zero vectors")]
    EmptyInput,

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
