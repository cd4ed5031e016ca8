use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::translation::rate_limiter::RateLimiter;
use crate::translation::retry::RetryPolicy;
use super::{Provider, read_response};

/// Default endpoint of the Papago NMT API
pub const DEFAULT_ENDPOINT: &str = "https://papago.apigw.ntruss.com/nmt/v1/translation";

/// Environment variable holding the client id
pub const CLIENT_ID_VAR: &str = "PAPAGO_CLIENT_ID";

/// Environment variable holding the client secret
pub const CLIENT_SECRET_VAR: &str = "PAPAGO_CLIENT_SECRET";

/// Papago client for interacting with the Naver Papago API
pub struct Papago {
    /// HTTP client for API requests
    client: Client,
    /// API endpoint URL
    endpoint: String,
    /// Client id header value
    client_id: String,
    /// Client secret header value
    client_secret: String,
    /// Retry policy for recoverable failures
    retry: RetryPolicy,
    /// Shared outbound call gate
    limiter: Arc<RateLimiter>,
}

/// Papago response envelope
#[derive(Debug, Deserialize)]
struct PapagoResponse {
    message: PapagoMessage,
}

#[derive(Debug, Deserialize)]
struct PapagoMessage {
    result: PapagoResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PapagoResult {
    translated_text: String,
}

impl Papago {
    /// Create a new Papago client
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        retry: RetryPolicy,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            retry,
            limiter,
        }
    }

    async fn send(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        let request = self
            .client
            .post(&self.endpoint)
            .header("X-NCP-APIGW-API-KEY-ID", &self.client_id)
            .header("X-NCP-APIGW-API-KEY", &self.client_secret)
            .form(&[("source", from), ("target", to), ("text", text)]);

        let body = read_response(request).await?;
        parse_response(&body)
    }
}

// Manual impl so the secret never reaches log output
impl std::fmt::Debug for Papago {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Papago")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for Papago {
    fn name(&self) -> &str {
        "papago"
    }

    async fn translate_one(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        self.retry
            .execute(&self.limiter, "Papago translate", || self.send(text, from, to))
            .await
    }
}

/// Extract `message.result.translatedText`
fn parse_response(body: &str) -> Result<String, ProviderError> {
    let response: PapagoResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("Papago response: {}", e)))?;
    Ok(response.message.result.translated_text)
}
