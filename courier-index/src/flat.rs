//! Flat inner-product similarity index.
//!
//! Brute-force scan over L2-normalized vectors; inner product over
//! normalized vectors is cosine similarity. The index is positionally
//! aligned 1:1 with the document list it was built from.

use serde::{Deserialize, Serialize};

use courier_core::errors::{CourierResult, IndexError};

/// In-memory flat index over fixed-dimension vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIpIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIpIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append one vector; rejects geometry mismatches.
    pub fn add(&mut self, vector: Vec<f32>) -> CourierResult<()> {
        if vector.len() != self.dimension {
            return Err(IndexError::VectorDimension {
                expected: self.dimension,
                actual: vector.len(),
            }
            .into());
        }
        self.vectors.push(vector);
        Ok(())
    }

    /// Append a batch of vectors.
    pub fn add_all(&mut self, vectors: Vec<Vec<f32>>) -> CourierResult<()> {
        for vector in vectors {
            self.add(vector)?;
        }
        Ok(())
    }

    /// Return the `k` best inner products as `(scores, indices)`.
    ///
    /// The query must already be normalized. When `k` exceeds the corpus the
    /// tail is padded with index `-1` and score `0.0`; out-of-range indices
    /// are the caller's to filter.
    pub fn search(&self, query: &[f32], k: usize) -> CourierResult<(Vec<f32>, Vec<i64>)> {
        if query.len() != self.dimension {
            return Err(IndexError::QueryDimension {
                expected: self.dimension,
                actual: query.len(),
            }
            .into());
        }

        let mut scored: Vec<(f32, i64)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (dot(query, v), i as i64))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        while scored.len() < k {
            scored.push((0.0, -1));
        }

        Ok(scored.into_iter().unzip())
    }
}

/// Inner product of two equal-length vectors.
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// L2-normalize a vector in place; zero vectors are left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
