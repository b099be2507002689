//! Exact nearest-neighbor index.
//!
//! Brute-force squared-Euclidean search over all vectors. No
//! approximation: the corpus is a single document's chunks, and
//! correctness matters more than speed at that size. Positions
//! correspond 1:1 and in order to the chunk sequence; the index is
//! rebuilt, never mutated, on each document load.

use crate::error::IndexError;

/// One search hit: squared-L2 distance and the position of the vector
/// in insertion order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub distance: f32,
    pub id: usize,
}

/// Exact brute-force vector index with fixed dimensionality.
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index over a non-empty set of uniform-dimensionality
    /// vectors. Ids are assigned in input order.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        let Some(first) = vectors.first() else {
            return Err(IndexError::EmptyInput);
        };
        let dimensions = first.len();

        for v in &vectors {
            if v.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    actual: v.len(),
                });
            }
        }

        Ok(Self {
            dimensions,
            vectors,
        })
    }

    /// Return up to `k` nearest vectors by squared-L2 distance,
    /// ascending; ties break toward the lower insertion id.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>, IndexError> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut hits: Vec<Hit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| Hit {
                distance: squared_l2(query, v),
                id,
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(k.min(hits.len()));
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            VectorIndex::build(Vec::new()),
            Err(IndexError::EmptyInput)
        ));
    }

    #[test]
    fn mixed_dimensionality_is_an_error() {
        let err = VectorIndex::build(vec![vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn query_dimensionality_must_match() {
        let index = VectorIndex::build(vec![vec![1.0, 0.0]]).unwrap();
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn returns_nearest_first() {
        let index = VectorIndex::build(vec![
            vec![10.0, 0.0],
            vec![1.0, 0.0],
            vec![5.0, 0.0],
        ])
        .unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let ids: Vec<usize> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[test]
    fn ties_break_toward_lower_id() {
        let index = VectorIndex::build(vec![
            vec![1.0, 0.0],
            vec![-1.0, 0.0],
            vec![0.0, 1.0],
        ])
        .unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let ids: Vec<usize> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let index = VectorIndex::build(vec![vec![1.0], vec![2.0]]).unwrap();
        let hits = index.search(&[0.0], 10).unwrap();
        assert_eq!(hits.len(), 2);
    }
}
