/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - Google: web translation endpoint, the only batch-capable backend
 * - Papago: Naver Papago API, credentialed
 * - LibreTranslate: self-hosted LibreTranslate server
 * - Shell: the translate-shell command line tool
 * - Mock: scriptable provider used by tests and benchmarks
 *
 * Every remote call goes through the shared `RetryPolicy` and the run-wide
 * `RateLimiter`.
 */

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{ProviderSettings, TranslationProvider};
use crate::errors::{ConfigError, ProviderError};
use crate::translation::normalize::truncate_text;
use crate::translation::rate_limiter::RateLimiter;
use crate::translation::retry::RetryPolicy;

pub mod google;
pub mod libretranslate;
pub mod mock;
pub mod papago;
pub mod shell;

pub use google::GoogleTranslate;
pub use libretranslate::LibreTranslate;
pub use mock::MockProvider;
pub use papago::Papago;
pub use shell::ShellTranslator;

/// Source and target codes in the spelling a vendor expects
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    /// Source language code
    pub from: String,
    /// Target language code
    pub to: String,
}

impl LanguagePair {
    /// Create a new language pair
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Common trait for all translation providers
///
/// `translate_one` is mandatory. Batch-capable providers advertise it with
/// `supports_batch` and override `translate_many`, whose result must hold
/// exactly one translation per input, in input order.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider name for log lines
    fn name(&self) -> &str;

    /// Whether `translate_many` is implemented
    fn supports_batch(&self) -> bool {
        false
    }

    /// Translate a single text
    async fn translate_one(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError>;

    /// Translate several texts in one call
    async fn translate_many(
        &self,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let _ = (texts, from, to);
        Err(ProviderError::BatchUnsupported(self.name().to_string()))
    }
}

/// Build the configured provider
///
/// Fails with a configuration error when credentials or a required endpoint
/// are missing, or an endpoint is not a valid URL.
pub fn create_provider(
    settings: &ProviderSettings,
    limiter: Arc<RateLimiter>,
) -> Result<Arc<dyn Provider>, ConfigError> {
    let retry = RetryPolicy::new(
        settings.retry_count,
        Duration::from_millis(settings.retry_backoff_ms),
    );

    debug!("Creating {} provider", settings.kind.display_name());

    let provider: Arc<dyn Provider> = match settings.kind {
        TranslationProvider::Google => {
            let endpoint = checked_endpoint(settings.endpoint.as_deref(), google::DEFAULT_ENDPOINT)?;
            Arc::new(GoogleTranslate::new(http_client(settings)?, endpoint, retry, limiter))
        },
        TranslationProvider::Papago => {
            let client_id = required_credential(settings.client_id.as_deref(), settings.kind, papago::CLIENT_ID_VAR)?;
            let client_secret = required_credential(settings.client_secret.as_deref(), settings.kind, papago::CLIENT_SECRET_VAR)?;
            let endpoint = checked_endpoint(settings.endpoint.as_deref(), papago::DEFAULT_ENDPOINT)?;
            Arc::new(Papago::new(
                http_client(settings)?,
                endpoint,
                client_id,
                client_secret,
                retry,
                limiter,
            ))
        },
        TranslationProvider::LibreTranslate => {
            let Some(endpoint) = settings.endpoint.as_deref().filter(|e| !e.trim().is_empty()) else {
                return Err(ConfigError::MissingEndpoint {
                    provider: settings.kind.to_lowercase_string(),
                });
            };
            let endpoint = checked_endpoint(Some(endpoint), endpoint)?;
            Arc::new(LibreTranslate::new(
                http_client(settings)?,
                endpoint,
                settings.api_key.clone().filter(|k| !k.is_empty()),
                retry,
                limiter,
            ))
        },
        TranslationProvider::Shell => {
            let command = settings.command.as_deref().unwrap_or(shell::DEFAULT_COMMAND);
            Arc::new(ShellTranslator::new(
                command,
                Duration::from_secs(settings.timeout_secs),
                retry,
                limiter,
            )?)
        },
    };

    Ok(provider)
}

fn http_client(settings: &ProviderSettings) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {}", e)))
}

fn checked_endpoint(endpoint: Option<&str>, default: &str) -> Result<String, ConfigError> {
    let endpoint = endpoint.filter(|e| !e.trim().is_empty()).unwrap_or(default).trim();

    let parsed = url::Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(endpoint.trim_end_matches('/').to_string())
}

fn required_credential(
    value: Option<&str>,
    provider: TranslationProvider,
    variable: &str,
) -> Result<String, ConfigError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingCredential {
            provider: provider.to_lowercase_string(),
            variable: variable.to_string(),
        })
}

/// Send a request and return the body of a successful response
///
/// Non-success statuses are classified with `ProviderError::from_status`.
pub(crate) async fn read_response(request: RequestBuilder) -> Result<String, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::from_status(status.as_u16(), truncate_text(&body, 200)));
    }

    Ok(body)
}
