// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX model tests for sentence embedding
//!
//! These tests need the all-MiniLM-L6-v2 ONNX export on disk and are
//! ignored by default:
//!
//! ```text
//! cargo test --test embeddings_tests -- --ignored
//! ```

use sentence_embedding_node::embeddings::{
    cosine_distance, onnx_model::OnnxModelOptions, OnnxEmbeddingModel, SentenceEncoder,
};

const MODEL_PATH: &str = "/workspace/models/all-MiniLM-L6-v2-onnx/model.onnx";
const TOKENIZER_PATH: &str = "/workspace/models/all-MiniLM-L6-v2-onnx/tokenizer.json";

async fn load_model() -> OnnxEmbeddingModel {
    OnnxEmbeddingModel::new(
        "all-MiniLM-L6-v2",
        MODEL_PATH,
        TOKENIZER_PATH,
        OnnxModelOptions::default(),
    )
    .await
    .expect("Failed to load ONNX model")
}

#[tokio::test]
async fn test_missing_files_fail_fast() {
    let result = OnnxEmbeddingModel::new(
        "missing",
        "/nonexistent/model.onnx",
        "/nonexistent/tokenizer.json",
        OnnxModelOptions::default(),
    )
    .await;

    let err = result.unwrap_err().to_string();
    assert!(err.contains("ONNX model file not found"), "{}", err);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_model_detects_dimension() {
    let model = load_model().await;
    assert_eq!(model.dimension(), 384);
    assert_eq!(SentenceEncoder::model_name(&model), "all-MiniLM-L6-v2");
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_batch_matches_single() {
    let model = load_model().await;
    let sentences = vec![
        "This is my first string.".to_string(),
        "A much longer sentence that forces padding in the batch.".to_string(),
    ];

    let batch = model.encode(&sentences).await.unwrap();
    let single = model.encode(&sentences[..1]).await.unwrap();

    assert_eq!(batch.len(), 2);
    let drift = cosine_distance(&batch[0], &single[0]).unwrap();
    assert!(drift < 1e-4, "padding changed the embedding: {}", drift);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_embeddings_are_deterministic_and_normalized() {
    let model = load_model().await;
    let input = vec!["The fox jumped higher this time.".to_string()];

    let a = model.encode(&input).await.unwrap();
    let b = model.encode(&input).await.unwrap();
    assert_eq!(a, b);

    let norm = a[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-3);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_related_sentences_are_closer() {
    let model = load_model().await;
    let sentences = vec![
        "The cat sat on the mat.".to_string(),
        "A cat was sitting on a rug.".to_string(),
        "Quarterly revenue exceeded forecasts.".to_string(),
    ];

    let e = model.encode(&sentences).await.unwrap();
    let related = cosine_distance(&e[0], &e[1]).unwrap();
    let unrelated = cosine_distance(&e[0], &e[2]).unwrap();
    assert!(related < unrelated);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore] // Only run if model files are downloaded
async fn test_concurrent_encodes_share_one_session() {
    let model = std::sync::Arc::new(load_model().await);
    let first = vec!["The dog went over the moon".to_string()];
    let second = vec!["How are you doing this fine morning".to_string()];

    let (a, b) = tokio::join!(model.encode(&first), model.encode(&second));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a, model.encode(&first).await.unwrap());
    assert_eq!(b, model.encode(&second).await.unwrap());
}
