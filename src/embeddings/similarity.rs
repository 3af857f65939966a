// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Cosine distance between two sentence embeddings

use super::Embedding;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    #[error("Similarity requires exactly 2 embeddings, got {0}.")]
    WrongCount(usize),

    #[error("Embedding dimensions differ: {left} vs {right}.")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Cannot compare empty embeddings.")]
    Empty,

    #[error("Cannot compute cosine distance for a zero-magnitude embedding.")]
    ZeroMagnitude,
}

/// Splits the encoder output for a similarity request into its two halves.
pub fn split_pair(embeddings: Vec<Embedding>) -> Result<(Embedding, Embedding), SimilarityError> {
    let count = embeddings.len();
    let mut iter = embeddings.into_iter();
    match (iter.next(), iter.next(), iter.next()) {
        (Some(first), Some(second), None) => Ok((first, second)),
        _ => Err(SimilarityError::WrongCount(count)),
    }
}

/// Cosine distance, `1 - cos(a, b)`, accumulated in f64.
///
/// The result lies in [0, 2]: 0 for vectors pointing the same way, 2 for
/// opposite vectors.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(SimilarityError::Empty);
    }

    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::ZeroMagnitude);
    }

    let distance = 1.0 - dot_product / (norm_a * norm_b);
    Ok(distance.clamp(0.0, 2.0))
}
