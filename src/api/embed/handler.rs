// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding endpoint handlers
//!
//! Each handler extracts its fields, validates, invokes the model and
//! formats the result. Any failure becomes a 400 with the error envelope.

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::debug;

use super::request::{BulkEmbeddingRequest, SimilarityRequest, SingleEmbeddingRequest};
use super::response::{BulkEmbeddingResponse, EmbeddingResponse, SimilarityResponse};
use crate::api::http_server::AppState;
use crate::api::validation::check_input;
use crate::api::{ApiError, RequestArgs};
use crate::embeddings::{cosine_distance, split_pair, Embedding, SentenceEncoder};

/// Validates `input` and runs it through the shared encoder.
async fn embed_sentences(state: &AppState, input: &Value) -> Result<Vec<Embedding>, ApiError> {
    let sentences = check_input(input)?;
    debug!("Encoding {} sentence(s)", sentences.len());

    let embeddings = state
        .encoder
        .encode(&sentences)
        .await
        .map_err(|e| ApiError::Model(format!("{:#}", e)))?;

    if embeddings.len() != sentences.len() {
        return Err(ApiError::Model(format!(
            "model returned {} embeddings for {} sentences",
            embeddings.len(),
            sentences.len()
        )));
    }

    Ok(embeddings)
}

/// GET /embeddings
pub async fn single_embedding_handler(
    State(state): State<AppState>,
    args: RequestArgs,
) -> Result<Json<EmbeddingResponse>, ApiError> {
    let request = SingleEmbeddingRequest::try_from(args)?;
    let embedding = embed_sentences(&state, &request.into_input())
        .await?
        .pop()
        .ok_or_else(|| ApiError::Model("model returned no embedding".to_string()))?;

    Ok(Json(EmbeddingResponse { embedding }))
}

/// POST /embeddings/bulk
pub async fn bulk_embedding_handler(
    State(state): State<AppState>,
    args: RequestArgs,
) -> Result<Json<BulkEmbeddingResponse>, ApiError> {
    let request = BulkEmbeddingRequest::try_from(args)?;
    let embeddings = embed_sentences(&state, &request.into_input()).await?;

    Ok(Json(BulkEmbeddingResponse { embeddings }))
}

/// POST /embeddings/similarity
pub async fn similarity_handler(
    State(state): State<AppState>,
    args: RequestArgs,
) -> Result<Json<SimilarityResponse>, ApiError> {
    let request = SimilarityRequest::try_from(args)?;
    let embeddings = embed_sentences(&state, &request.into_input()).await?;
    let (first, second) = split_pair(embeddings)?;
    let similarity = cosine_distance(&first, &second)?;

    Ok(Json(SimilarityResponse { similarity }))
}
