//! The end-to-end pipeline: document in, cited answers out.
//!
//! One `PolicyNavigator` owns the chunk sequence and vector index for
//! the lifetime of one loaded document. Loads rebuild both wholesale
//! and swap them in only after every stage has succeeded, so a failed
//! load leaves the previous document queryable. `ask` is read-only
//! (`&self`) and may run concurrently with other asks; a load takes
//! `&mut self`, so a load racing an in-flight ask is rejected at
//! compile time.

use crate::answer::{self, AnswerResult};
use crate::chunk::{chunk_page, Chunk};
use crate::compress::{CompressionBackend, Compressor};
use crate::config::NavigatorConfig;
use crate::document::Document;
use crate::embed::{Embedder, HashedTfEmbedder};
use crate::error::{LoadError, PipelineError};
use crate::generate::{GeminiClient, Generator};
use crate::index::VectorIndex;
use crate::retrieve;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Summary of the currently loaded document.
#[derive(Debug, Clone)]
pub struct DocumentStats {
    pub path: PathBuf,
    pub pages: usize,
    pub chunks: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Chunks and their index, built together so positions stay aligned.
struct LoadedDocument {
    chunks: Vec<Chunk>,
    index: VectorIndex,
    stats: DocumentStats,
}

/// Question answering over a single loaded policy document.
pub struct PolicyNavigator {
    config: NavigatorConfig,
    compressor: Compressor,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    loaded: Option<LoadedDocument>,
}

impl PolicyNavigator {
    /// Build a pipeline from configuration.
    ///
    /// The generation credential is resolved here; a missing key is a
    /// construction failure, not a deferred ask failure. The
    /// compression credential is optional — without it the pipeline
    /// runs permanently on the local compression fallback.
    pub fn new(config: NavigatorConfig) -> Result<Self, PipelineError> {
        let generator = Arc::new(GeminiClient::new(&config.generation)?);
        let compressor = Compressor::from_config(&config.compression);
        let embedder = Arc::new(HashedTfEmbedder::new(config.embedding.dimensions));

        Ok(Self {
            config,
            compressor,
            embedder,
            generator,
            loaded: None,
        })
    }

    /// Build a pipeline with explicit backends. Used by tests and by
    /// callers wiring alternate vendors behind the same traits.
    pub fn with_backends(
        config: NavigatorConfig,
        generator: Arc<dyn Generator>,
        compression: Option<Arc<dyn CompressionBackend>>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let compressor = Compressor::with_backend(
            compression,
            config.compression.ratio,
            config.compression.max_concurrent,
        );
        Self {
            config,
            compressor,
            embedder,
            generator,
            loaded: None,
        }
    }

    /// Whether a document has been successfully loaded.
    pub fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }

    /// Stats for the loaded document, if any.
    pub fn stats(&self) -> Option<&DocumentStats> {
        self.loaded.as_ref().map(|d| &d.stats)
    }

    /// Load a document from a file, replacing any previous document.
    pub async fn load_document(&mut self, path: &Path) -> Result<DocumentStats, PipelineError> {
        let document = Document::from_file(path).await?;
        self.load(document).await
    }

    /// Load a pre-extracted document, replacing any previous one.
    ///
    /// Pipeline order: batch-compress all page texts (the only
    /// internally parallel stage), chunk each page against its
    /// original text, embed every chunk, build the exact index, then
    /// swap the new state in.
    pub async fn load(&mut self, document: Document) -> Result<DocumentStats, PipelineError> {
        let page_count = document.page_count();
        let page_texts: Vec<String> = document.pages.iter().map(|p| p.text.clone()).collect();
        let compressed = self.compressor.compress_batch(page_texts).await;

        let mut chunks: Vec<Chunk> = Vec::new();
        for (page, compressed_text) in document.pages.iter().zip(&compressed) {
            chunks.extend(chunk_page(
                compressed_text,
                page.number,
                &page.text,
                &self.config.chunking,
            ));
        }

        if chunks.is_empty() {
            return Err(LoadError::NoChunks.into());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts);
        let index = VectorIndex::build(vectors).map_err(LoadError::from)?;

        debug!(
            chunks = chunks.len(),
            dimensions = index.dimensions(),
            "Built exact nearest-neighbor index"
        );

        let stats = DocumentStats {
            path: document.path.clone(),
            pages: page_count,
            chunks: chunks.len(),
            loaded_at: chrono::Utc::now(),
        };

        info!(
            path = %stats.path.display(),
            pages = stats.pages,
            chunks = stats.chunks,
            "Document loaded"
        );

        self.loaded = Some(LoadedDocument {
            chunks,
            index,
            stats: stats.clone(),
        });
        Ok(stats)
    }

    /// Answer a question against the loaded document.
    ///
    /// Usage error before the first successful load. Retrieval is
    /// exact and local; only the single generation call leaves the
    /// process here.
    pub async fn ask(&self, question: &str) -> Result<AnswerResult, PipelineError> {
        let loaded = self.loaded.as_ref().ok_or(PipelineError::NoDocument)?;

        let retrieved = retrieve::retrieve(
            question,
            &loaded.chunks,
            &loaded.index,
            self.embedder.as_ref(),
            self.config.retrieval.top_k,
            self.config.retrieval.preview_chars,
        )?;

        debug!(
            citations = retrieved.citations.len(),
            pages = ?retrieved.relevant_pages,
            "Retrieved context for question"
        );

        let result = answer::answer(self.generator.as_ref(), question, retrieved).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerateError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl Generator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            Ok(self.0.to_string())
        }
    }

    fn navigator(config: NavigatorConfig) -> PolicyNavigator {
        let embedder = Arc::new(HashedTfEmbedder::new(config.embedding.dimensions));
        PolicyNavigator::with_backends(config, Arc::new(CannedGenerator("ok")), None, embedder)
    }

    fn identity_compression_config() -> NavigatorConfig {
        let mut config = NavigatorConfig::default();
        config.compression.ratio = 1.0;
        config
    }

    #[tokio::test]
    async fn ask_before_load_is_a_usage_error() {
        let nav = navigator(NavigatorConfig::default());
        let err = nav.ask("anything").await.unwrap_err();
        assert!(matches!(err, PipelineError::NoDocument));
    }

    #[tokio::test]
    async fn index_length_equals_chunk_count_after_load() {
        let mut nav = navigator(identity_compression_config());
        let doc = Document::from_pages(
            "policy.txt",
            vec!["Leave policy text.".into(), "Travel policy text.".into()],
        )
        .unwrap();

        let stats = nav.load(doc).await.unwrap();
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.chunks, 2);
        let loaded = nav.loaded.as_ref().unwrap();
        assert_eq!(loaded.index.len(), loaded.chunks.len());
    }

    #[tokio::test]
    async fn blank_pages_contribute_no_chunks() {
        let mut nav = navigator(identity_compression_config());
        let doc = Document::from_pages(
            "policy.txt",
            vec!["Page one text.".into(), "   ".into(), "Page three text.".into()],
        )
        .unwrap();

        nav.load(doc).await.unwrap();
        let pages: std::collections::BTreeSet<usize> = nav
            .loaded
            .as_ref()
            .unwrap()
            .chunks
            .iter()
            .map(|c| c.page)
            .collect();
        assert_eq!(pages.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn reload_fully_replaces_chunks_and_index() {
        let mut nav = navigator(identity_compression_config());
        let first = Document::from_pages(
            "first.txt",
            vec!["alpha alpha alpha".into(), "beta beta beta".into()],
        )
        .unwrap();
        nav.load(first).await.unwrap();

        let second = Document::from_pages("second.txt", vec!["gamma gamma gamma".into()]).unwrap();
        let stats = nav.load(second).await.unwrap();

        assert_eq!(stats.chunks, 1);
        let loaded = nav.loaded.as_ref().unwrap();
        assert_eq!(loaded.index.len(), 1);
        assert!(loaded.chunks.iter().all(|c| c.text.contains("gamma")));
    }

    #[tokio::test]
    async fn failed_load_keeps_the_previous_document() {
        let mut nav = navigator(identity_compression_config());
        let good = Document::from_pages("good.txt", vec!["useful text".into()]).unwrap();
        nav.load(good).await.unwrap();

        // A document whose only page text disappears under chunking.
        let bad = Document {
            path: "bad.txt".into(),
            pages: vec![crate::document::Page {
                number: 1,
                text: "   ".into(),
            }],
        };
        let err = nav.load(bad).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Load(LoadError::NoChunks)
        ));

        assert!(nav.is_ready());
        assert_eq!(nav.stats().unwrap().path, PathBuf::from("good.txt"));
        assert!(nav.ask("still answerable?").await.is_ok());
    }
}
