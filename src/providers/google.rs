/*!
 * Google web translation endpoint.
 *
 * The `translate_a/t` endpoint accepts any number of repeated `q` form
 * fields and answers with one translation per field, which makes it the
 * batch-capable backend.
 */

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::translation::rate_limiter::RateLimiter;
use crate::translation::retry::RetryPolicy;
use super::{Provider, read_response};

/// Default endpoint of the Google web translation API
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/t";

/// Google translation client
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Endpoint URL
    endpoint: String,
    /// Retry policy for recoverable failures
    retry: RetryPolicy,
    /// Shared outbound call gate
    limiter: Arc<RateLimiter>,
}

impl GoogleTranslate {
    /// Create a new client
    pub fn new(client: Client, endpoint: impl Into<String>, retry: RetryPolicy, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            retry,
            limiter,
        }
    }

    async fn send(&self, texts: &[String], from: &str, to: &str) -> Result<Vec<String>, ProviderError> {
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(texts.len());
        for text in texts {
            form.push(("q", text.as_str()));
        }

        let request = self
            .client
            .post(&self.endpoint)
            .query(&[("client", "gtx"), ("sl", from), ("tl", to), ("format", "text")])
            .form(&form);

        let body = read_response(request).await?;
        let translations = parse_response(&body, texts.len())?;

        if translations.len() != texts.len() {
            return Err(ProviderError::LengthMismatch {
                expected: texts.len(),
                actual: translations.len(),
            });
        }

        Ok(translations)
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    fn name(&self) -> &str {
        "google"
    }

    fn supports_batch(&self) -> bool {
        true
    }

    async fn translate_one(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        let texts = [text.to_string()];
        let mut translations = self
            .retry
            .execute(&self.limiter, "Google translate", || self.send(&texts, from, to))
            .await?;

        translations
            .pop()
            .ok_or_else(|| ProviderError::ParseError("empty translation list".to_string()))
    }

    async fn translate_many(&self, texts: &[String], from: &str, to: &str) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Google batch request with {} texts ({} -> {})", texts.len(), from, to);
        self.retry
            .execute(&self.limiter, "Google batch translate", || self.send(texts, from, to))
            .await
    }
}

/// Parse the endpoint's response body
///
/// The shape depends on the request: a bare string or `[text, lang]` for a
/// single `q`, and an array of either form for several. `expected` is the
/// number of texts sent, which tells a pair apart from two translations.
pub fn parse_response(body: &str, expected: usize) -> Result<Vec<String>, ProviderError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("invalid JSON: {}", e)))?;

    match &value {
        Value::String(text) => Ok(vec![text.clone()]),
        Value::Array(items) if expected == 1 && is_pair(items) => Ok(vec![string_at(items, 0)?]),
        Value::Array(items) => items.iter().map(entry_text).collect(),
        other => Err(ProviderError::ParseError(format!("unexpected response: {}", other))),
    }
}

// `["translated", "ko"]`: a single translation with its detected language
fn is_pair(items: &[Value]) -> bool {
    items.len() == 2 && items.iter().all(Value::is_string)
}

fn entry_text(entry: &Value) -> Result<String, ProviderError> {
    match entry {
        Value::String(text) => Ok(text.clone()),
        Value::Array(items) => string_at(items, 0),
        other => Err(ProviderError::ParseError(format!("unexpected entry: {}", other))),
    }
}

fn string_at(items: &[Value], index: usize) -> Result<String, ProviderError> {
    items
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::ParseError("missing translated text".to_string()))
}
