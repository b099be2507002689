//! Embedding capability.
//!
//! A trait seam over embedding models, with a deterministic local
//! implementation: lowercased alphanumeric tokens hashed into a
//! fixed-width term-frequency vector, L2-normalized. Deterministic for
//! identical input, fixed dimensionality for the lifetime of an index.

/// Trait for embedding providers.
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Generate embeddings for a batch of texts, in input order.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Output dimensionality.
    fn dimensions(&self) -> usize;

    /// Provider name, for diagnostics.
    fn name(&self) -> &str;
}

/// Local hashed term-frequency embedder. Always available, no model
/// download, no network.
#[derive(Debug, Clone)]
pub struct HashedTfEmbedder {
    dimensions: usize,
}

impl HashedTfEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

/// djb2 string hash.
fn term_hash(s: &str) -> usize {
    let mut hash: usize = 5381;
    for b in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as usize);
    }
    hash
}

impl Embedder for HashedTfEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let lowered = text.to_lowercase();
        let words = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty());

        for word in words {
            let idx = term_hash(word) % self.dimensions;
            vector[idx] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashed-tf"
    }
}
