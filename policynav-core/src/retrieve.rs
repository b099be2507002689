//! Query-time retrieval and citation assembly.
//!
//! Embeds the question with the same embedder used at index build
//! time, walks the nearest chunks in ascending-distance order, and
//! assembles a page-annotated context block plus per-chunk citation
//! previews. Context keeps nearest-first order because relevance, not
//! document order, drives what the model sees; the distinct page list
//! is rendered ascending regardless of retrieval order.

use crate::chunk::Chunk;
use crate::embed::Embedder;
use crate::error::IndexError;
use crate::index::VectorIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const ELLIPSIS: char = '\u{2026}';

/// A page-attributed preview of retrieved text, shown to justify an
/// answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub page: usize,
    pub preview: String,
}

/// The assembled result of one retrieval.
#[derive(Debug, Clone)]
pub struct Retrieved {
    /// Newline-joined `[Page P]` blocks, nearest-first.
    pub context: String,
    /// One citation per retrieved chunk, nearest-first.
    pub citations: Vec<Citation>,
    /// Distinct cited pages, ascending.
    pub relevant_pages: Vec<usize>,
}

/// Retrieve the `k` nearest chunks for a question. `k` is clamped to
/// the chunk count.
pub fn retrieve(
    question: &str,
    chunks: &[Chunk],
    index: &VectorIndex,
    embedder: &dyn Embedder,
    k: usize,
    preview_chars: usize,
) -> Result<Retrieved, IndexError> {
    let query = embedder.embed(question);
    let effective_k = k.min(chunks.len());
    let hits = index.search(&query, effective_k)?;

    let mut blocks = Vec::with_capacity(hits.len());
    let mut citations = Vec::with_capacity(hits.len());
    let mut pages = BTreeSet::new();

    for hit in &hits {
        let chunk = &chunks[hit.id];
        blocks.push(format!("[Page {}]\n{}", chunk.page, chunk.text));
        pages.insert(chunk.page);
        citations.push(Citation {
            page: chunk.page,
            preview: make_preview(&chunk.text, preview_chars),
        });
    }

    Ok(Retrieved {
        context: blocks.join("\n\n"),
        citations,
        relevant_pages: pages.into_iter().collect(),
    })
}

/// Truncate to the preview budget, marking truncation with an
/// ellipsis. Shorter text passes through verbatim.
fn make_preview(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(budget).collect();
    preview.push(ELLIPSIS);
    preview
}
