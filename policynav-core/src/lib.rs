//! # policynav-core — Policy Navigator retrieval pipeline
//!
//! Answers natural-language questions against a single loaded policy
//! document: pages are lossily compressed, split into overlapping
//! page-tagged chunks, embedded, and indexed for exact
//! nearest-neighbor search; questions retrieve the most relevant
//! chunks and a constrained prompt asks the model to answer from that
//! context only. Every answer carries page-level citations.
//!
//! The embedding, index, and generation capabilities sit behind
//! traits ([`embed::Embedder`], [`generate::Generator`],
//! [`compress::CompressionBackend`]) so vendors can be swapped and
//! tests can run without a network.

pub mod answer;
pub mod chunk;
pub mod compress;
pub mod config;
pub mod document;
pub mod embed;
pub mod error;
pub mod generate;
pub mod index;
pub mod pipeline;
pub mod retrieve;

pub use answer::AnswerResult;
pub use chunk::Chunk;
pub use config::{load_config, NavigatorConfig};
pub use document::{Document, Page};
pub use error::{LoadError, PipelineError};
pub use pipeline::{DocumentStats, PolicyNavigator};
pub use retrieve::Citation;
