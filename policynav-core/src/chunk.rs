//! Page-to-chunk decomposition with provenance tracking.
//!
//! Splits compressed page text into overlapping windows, preferring
//! paragraph, line, sentence, and word boundaries over hard character
//! cuts. Every chunk carries the 1-based number of its owning page and
//! a bounded prefix of the page's original (uncompressed) text for
//! citation display.

use crate::config::ChunkingConfig;
use serde::{Deserialize, Serialize};

/// A bounded-size slice of a page's compressed text, tagged with page
/// provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// 1-based number of the owning page.
    pub page: usize,
    /// Prefix of the owning page's uncompressed text.
    pub source_snippet: String,
}

/// Boundary separators, tried most-structural first. A hard
/// character cut is the last resort.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Split one page's compressed text into overlapping chunks.
///
/// Empty or whitespace-only text yields no chunks; text shorter than
/// the window yields exactly one chunk covering the whole page.
pub fn chunk_page(
    page_text: &str,
    page_number: usize,
    original_text: &str,
    config: &ChunkingConfig,
) -> Vec<Chunk> {
    if page_text.trim().is_empty() {
        return Vec::new();
    }

    let snippet = prefix_chars(original_text, config.snippet_chars);

    if page_text.chars().count() <= config.chunk_size {
        return vec![Chunk {
            text: page_text.trim().to_string(),
            page: page_number,
            source_snippet: snippet,
        }];
    }

    let pieces = split_recursive(page_text, config.chunk_size, config.chunk_overlap);
    pieces
        .into_iter()
        .map(|text| Chunk {
            text,
            page: page_number,
            source_snippet: snippet.clone(),
        })
        .collect()
}

/// Split by the first separator that divides the text, packing parts
/// into windows of at most `chunk_size` chars with `overlap` chars
/// carried between adjacent windows. Falls back to fixed-size cuts
/// when no separator applies.
fn split_recursive(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    for sep in SEPARATORS {
        let parts: Vec<&str> = text.split(sep).collect();
        if parts.len() > 1 {
            let mut chunks = Vec::new();
            let mut current = String::new();

            for part in parts {
                let joined_len =
                    current.chars().count() + part.chars().count() + sep.chars().count();
                if joined_len > chunk_size && !current.is_empty() {
                    let trimmed = current.trim().to_string();
                    let tail = suffix_chars(&current, overlap);
                    if !trimmed.is_empty() {
                        chunks.push(trimmed);
                    }
                    current = tail;
                }
                if !current.is_empty() {
                    current.push_str(sep);
                }
                current.push_str(part);
            }
            if !current.trim().is_empty() {
                chunks.push(current.trim().to_string());
            }

            // A single oversized part (no internal separators) still
            // needs hard cuts.
            if chunks.iter().any(|c| c.chars().count() > chunk_size * 2) {
                return chunks
                    .iter()
                    .flat_map(|c| {
                        if c.chars().count() > chunk_size * 2 {
                            split_fixed(c, chunk_size, overlap)
                        } else {
                            vec![c.clone()]
                        }
                    })
                    .collect();
            }
            return chunks;
        }
    }

    split_fixed(text, chunk_size, overlap)
}

/// Hard character cuts of `size` chars with `overlap` chars of carry.
fn split_fixed(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end >= chars.len() {
            break;
        }
        start = end.saturating_sub(overlap);
    }
    chunks
}

fn prefix_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

fn suffix_chars(text: &str, n: usize) -> String {
    let total = text.chars().count();
    text.chars().skip(total.saturating_sub(n)).collect()
}
