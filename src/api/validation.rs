// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Input validation for sentence payloads
//!
//! Runs before anything reaches the model. Checks stop at the first
//! violation; elements are visited in order.

use serde_json::Value;
use thiserror::Error;

/// Minimum number of whitespace-delimited words per sentence
pub const MIN_WORDS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Wrong shape: not a list, or an element that is not a string
    #[error("{0}")]
    Type(String),

    /// Right shape, unusable content
    #[error("{0}")]
    Value(String),
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::Type(_) => "TypeError",
            ValidationError::Value(_) => "ValueError",
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks one sentence: non-empty and at least [`MIN_WORDS`] words.
///
/// Words are whitespace-delimited runs, so leading, trailing and repeated
/// whitespace never adds a word: `"hello "` counts as one word and fails.
/// Splitting on every single whitespace character would count it as two.
pub fn check_sentence(sentence: &str) -> Result<(), ValidationError> {
    if sentence.is_empty() {
        return Err(ValidationError::Value(
            "Sentence input must be of length greater than 0.".to_string(),
        ));
    }

    let words = sentence.split_whitespace().count();
    if words < MIN_WORDS {
        return Err(ValidationError::Value(format!(
            "Sentence input must contain at least {} words, got {}.",
            MIN_WORDS, words
        )));
    }

    Ok(())
}

/// Validates a raw JSON payload and returns the sentences it carries.
///
/// The payload must be a non-empty array of strings, each passing
/// [`check_sentence`].
pub fn check_input(value: &Value) -> Result<Vec<String>, ValidationError> {
    let items = value.as_array().ok_or_else(|| {
        ValidationError::Type(format!(
            "The input parameter of type {} is incorrect. A list needs to be passed.",
            json_type_name(value)
        ))
    })?;

    if items.is_empty() {
        return Err(ValidationError::Value(
            "At least one sentence must be provided.".to_string(),
        ));
    }

    let mut sentences = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let sentence = item.as_str().ok_or_else(|| {
            ValidationError::Type(format!(
                "The input at index {} of type {} is incorrect. Please pass in a string.",
                index,
                json_type_name(item)
            ))
        })?;
        check_sentence(sentence)?;
        sentences.push(sentence.to_string());
    }

    Ok(sentences)
}

/// Same content checks as [`check_input`] for already-typed input.
pub fn validate_sentences(sentences: &[String]) -> Result<(), ValidationError> {
    if sentences.is_empty() {
        return Err(ValidationError::Value(
            "At least one sentence must be provided.".to_string(),
        ));
    }
    sentences.iter().try_for_each(|s| check_sentence(s))
}
