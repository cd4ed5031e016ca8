use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::translation::rate_limiter::RateLimiter;
use crate::translation::retry::RetryPolicy;
use super::{Provider, read_response};

/// Environment variable holding the optional API key
pub const API_KEY_VAR: &str = "LIBRETRANSLATE_API_KEY";

/// Client for a self-hosted LibreTranslate server
pub struct LibreTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Server base URL
    base_url: String,
    /// API key, when the server requires one
    api_key: Option<String>,
    /// Retry policy for recoverable failures
    retry: RetryPolicy,
    /// Shared outbound call gate
    limiter: Arc<RateLimiter>,
}

/// `/translate` request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// `/translate` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

impl LibreTranslate {
    /// Create a new client for the server at `base_url`
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        retry: RetryPolicy,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            retry,
            limiter,
        }
    }

    /// Translation endpoint of the server
    pub fn translate_url(&self) -> String {
        format!("{}/translate", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        let body = TranslateRequest {
            q: text,
            source: from,
            target: to,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let request = self.client.post(self.translate_url()).json(&body);
        let response = read_response(request).await?;

        let parsed: TranslateResponse = serde_json::from_str(&response)
            .map_err(|e| ProviderError::ParseError(format!("LibreTranslate response: {}", e)))?;
        Ok(parsed.translated_text)
    }
}

impl std::fmt::Debug for LibreTranslate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibreTranslate")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for LibreTranslate {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate_one(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        self.retry
            .execute(&self.limiter, "LibreTranslate translate", || self.send(text, from, to))
            .await
    }
}
