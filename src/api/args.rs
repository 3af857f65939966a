// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request argument parsing
//!
//! Handlers read their fields from the JSON body object and the query
//! string alike. Query values win over body values; a key repeated in the
//! query string collects into an array.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};
use std::collections::HashSet;

use super::ApiError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestArgs {
    values: Map<String, Value>,
    /// Keys whose value came from the query string
    from_query: HashSet<String>,
}

impl RequestArgs {
    /// Builds the argument map from a raw body and an optional query string.
    pub fn parse(body: &[u8], query: Option<&str>) -> Result<Self, ApiError> {
        let mut values = parse_body(body)?;
        let mut from_query = HashSet::new();
        if let Some(query) = query {
            let query = parse_query(query);
            from_query.extend(query.keys().cloned());
            values.extend(query);
        }
        Ok(Self { values, from_query })
    }

    /// Takes a required argument; absent or null counts as missing.
    pub fn required(&mut self, name: &str) -> Result<Value, ApiError> {
        self.values
            .remove(name)
            .filter(|value| !value.is_null())
            .ok_or_else(|| ApiError::MissingArgument(name.to_string()))
    }

    /// Takes a required list argument. A query-string key given once is a
    /// one-element list; body values are returned as sent.
    pub fn required_list(&mut self, name: &str) -> Result<Value, ApiError> {
        let value = self.required(name)?;
        if value.is_string() && self.from_query.contains(name) {
            return Ok(Value::Array(vec![value]));
        }
        Ok(value)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_body(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::InvalidRequest(
            "request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(ApiError::InvalidRequest(format!(
            "failed to decode JSON object: {}",
            e
        ))),
    }
}

fn parse_query(query: &str) -> Map<String, Value> {
    let mut args = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());
        match args.get_mut(&*key) {
            None => {
                args.insert(key.into_owned(), value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    args
}

#[async_trait]
impl<S> FromRequest<S> for RequestArgs
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().map(str::to_owned);
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

        Self::parse(&body, query.as_deref())
    }
}
