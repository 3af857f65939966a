// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod args;
pub mod embed;
pub mod errors;
pub mod http_server;
pub mod validation;

pub use args::RequestArgs;
pub use embed::{
    bulk_embedding_handler, similarity_handler, single_embedding_handler, BulkEmbeddingRequest,
    BulkEmbeddingResponse, EmbeddingResponse, SimilarityRequest, SimilarityResponse,
    SingleEmbeddingRequest,
};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, HealthResponse};
pub use validation::{check_input, validate_sentences, ValidationError};
