use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Face embedding produced by the extraction model. The dimensionality is
/// fixed by the upstream model and never mixed across models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }

    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.vector
    }

    pub fn magnitude(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// A zero-magnitude embedding can never produce a defined similarity.
    pub fn is_degenerate(&self) -> bool {
        self.magnitude() == 0.0
    }
}

/// Cosine similarity between two embeddings: dot product over the product of
/// magnitudes, clamped to [-1, 1] against float rounding.
///
/// Zero-magnitude input is rejected as [`Error::DegenerateEmbedding`] rather
/// than letting a division produce NaN.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    // Simple loops that LLVM can auto-vectorize
    let dot: f32 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| x * y)
        .sum();
    let norm_a = a.magnitude();
    let norm_b = b.magnitude();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(Error::DegenerateEmbedding);
    }

    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}
