// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for /embeddings, /embeddings/bulk and /embeddings/similarity
//!
//! These tests drive the full router with the deterministic hash encoder and
//! verify:
//! - Success bodies carry exactly one key with the right shape
//! - Missing or misnamed fields return 400 with the `Message` envelope
//! - Validation failures return 400
//! - Unknown routes return 404
//! - Embeddings are deterministic and similarity is symmetric

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use sentence_embedding_node::{
    api::http_server::{create_app, AppState},
    embeddings::HashEncoder,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

const DIMENSION: usize = 32;

/// Helper: Router backed by the hash encoder
fn setup_app() -> Router {
    let encoder = HashEncoder::new(DIMENSION, true).expect("hash encoder");
    create_app(AppState::new(Arc::new(encoder)))
}

/// Helper: Send a request and decode the JSON body
async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn assert_float_list(value: &Value, len: usize) {
    let items = value.as_array().expect("expected a list");
    assert_eq!(items.len(), len);
    for item in items {
        assert!(item.is_f64(), "expected float, got {}", item);
    }
}

fn assert_error_envelope(body: &Value) {
    let object = body.as_object().expect("error body must be an object");
    assert_eq!(object.len(), 1, "error body: {}", body);
    let messages = object["Message"].as_array().expect("Message must be a list");
    assert!(!messages.is_empty());
    assert!(messages[0].is_string());
}

#[cfg(test)]
mod single_embedding_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_with_query_string() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/embeddings?sentence=The%20fox%20jumped%20higher%20this%20time.")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_object().unwrap().len(), 1);
        assert_float_list(&body["embedding"], DIMENSION);
    }

    #[tokio::test]
    async fn test_get_with_json_body() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/embeddings")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"sentence": "The fox jumped higher this time."}).to_string(),
            ))
            .unwrap();

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_float_list(&body["embedding"], DIMENSION);
    }

    #[tokio::test]
    async fn test_get_missing_sentence() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/embeddings?sentences=The%20fox%20jumped")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body);
    }

    #[tokio::test]
    async fn test_get_single_word_rejected() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/embeddings?sentence=hello_world")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body);
        assert!(body["Message"][0].as_str().unwrap().contains("at least 2 words"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/embedding")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"sentences": "The fox jumped higher this time."}).to_string(),
            ))
            .unwrap();

        let (status, _) = send(setup_app(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_same_sentence_same_embedding() {
        let uri = "/embeddings?sentence=A%20repeatable%20sentence";
        let first = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let second = Request::builder().uri(uri).body(Body::empty()).unwrap();

        let (_, a) = send(setup_app(), first).await;
        let (_, b) = send(setup_app(), second).await;

        assert_eq!(a["embedding"], b["embedding"]);
    }
}

#[cfg(test)]
mod bulk_embedding_tests {
    use super::*;

    #[tokio::test]
    async fn test_bulk_success() {
        let request = post_json(
            "/embeddings/bulk",
            json!({"sentences": ["This is my first string.", "This is my second string."]}),
        );

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_object().unwrap().len(), 1);
        let embeddings = body["embeddings"].as_array().unwrap();
        assert_eq!(embeddings.len(), 2);
        for inner in embeddings {
            assert_float_list(inner, DIMENSION);
        }
        assert_ne!(embeddings[0], embeddings[1]);
    }

    #[tokio::test]
    async fn test_bulk_preserves_order() {
        let single = Request::builder()
            .uri("/embeddings?sentence=This%20is%20my%20second%20string.")
            .body(Body::empty())
            .unwrap();
        let bulk = post_json(
            "/embeddings/bulk",
            json!({"sentences": ["This is my first string.", "This is my second string."]}),
        );

        let (_, single_body) = send(setup_app(), single).await;
        let (_, bulk_body) = send(setup_app(), bulk).await;

        assert_eq!(bulk_body["embeddings"][1], single_body["embedding"]);
    }

    #[tokio::test]
    async fn test_bulk_single_sentence_in_query_string() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/embeddings/bulk?sentences=This+is+my+first+string.")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::OK, "body: {}", body);
        let embeddings = body["embeddings"].as_array().unwrap();
        assert_eq!(embeddings.len(), 1);
        assert_float_list(&embeddings[0], DIMENSION);
    }

    #[tokio::test]
    async fn test_bulk_repeated_query_keys() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/embeddings/bulk?sentences=This+is+my+first+string.&sentences=This+is+my+second+string.")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["embeddings"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_misnamed_field() {
        let request = post_json(
            "/embeddings/bulk",
            json!({"sentence": ["This is my first string.", "This is my second string."]}),
        );

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body);
        assert!(body["Message"][0].as_str().unwrap().contains("sentences"));
    }

    #[tokio::test]
    async fn test_bulk_bare_string_is_type_error() {
        let request = post_json(
            "/embeddings/bulk",
            json!({"sentences": "hello how are you doing"}),
        );

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["Message"][0]
            .as_str()
            .unwrap()
            .contains("A list needs to be passed"));
    }

    #[tokio::test]
    async fn test_bulk_one_bad_element_fails_request() {
        let request = post_json(
            "/embeddings/bulk",
            json!({"sentences": ["hello how are you", "", "how are you"]}),
        );

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body);
    }

    #[tokio::test]
    async fn test_bulk_empty_list_rejected() {
        let request = post_json("/embeddings/bulk", json!({"sentences": []}));

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body);
    }

    #[tokio::test]
    async fn test_bulk_malformed_json() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/embeddings/bulk")
            .header("content-type", "application/json")
            .body(Body::from("{\"sentences\": [\"unterminated"))
            .unwrap();

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body);
    }

    #[tokio::test]
    async fn test_bulk_wrong_method() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/embeddings/bulk")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(setup_app(), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

#[cfg(test)]
mod similarity_tests {
    use super::*;

    #[tokio::test]
    async fn test_similarity_success() {
        let request = post_json(
            "/embeddings/similarity",
            json!({
                "sentence_1": " The dog went over the moon",
                "sentence_2": "How are you doing this fine morning"
            }),
        );

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_object().unwrap().len(), 1);
        let similarity = body["similarity"].as_f64().expect("similarity is a float");
        assert!((0.0..=2.0).contains(&similarity));
    }

    #[tokio::test]
    async fn test_similarity_is_symmetric() {
        let forward = post_json(
            "/embeddings/similarity",
            json!({"sentence_1": "The dog went over the moon", "sentence_2": "A cat sat down"}),
        );
        let backward = post_json(
            "/embeddings/similarity",
            json!({"sentence_1": "A cat sat down", "sentence_2": "The dog went over the moon"}),
        );

        let (_, a) = send(setup_app(), forward).await;
        let (_, b) = send(setup_app(), backward).await;

        assert_eq!(a["similarity"].as_f64(), b["similarity"].as_f64());
    }

    #[tokio::test]
    async fn test_similarity_misnamed_field() {
        let request = post_json(
            "/embeddings/similarity",
            json!({
                "sentence1": "The dog went over the moon",
                "sentence_2": "How are you doing this fine morning"
            }),
        );

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error_envelope(&body);
    }

    #[tokio::test]
    async fn test_similarity_non_string_field() {
        let request = post_json(
            "/embeddings/similarity",
            json!({"sentence_1": ["a list", "of sentences"], "sentence_2": "a valid sentence"}),
        );

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["Message"][0]
            .as_str()
            .unwrap()
            .contains("Please pass in a string"));
    }
}

#[cfg(test)]
mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_model() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(setup_app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["dimension"], DIMENSION);
        assert_eq!(body["model"], format!("hash-{}", DIMENSION));
    }
}
