//! Cosine similarity between embedding vectors

use crate::error::{DocdexError, Result};

/// An embedding vector as returned by the provider
pub type Embedding = Vec<f32>;

/// Compute the cosine similarity between two equal-length vectors.
///
/// Accumulates the dot product and both squared magnitudes in a single pass
/// using double precision. Similarity against a zero vector is defined as
/// exactly `0.0` rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(DocdexError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}
