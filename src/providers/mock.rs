/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::intermittent(n)` - Fails every n-th single call
 * - `MockProvider::failing()` - Always fails with an error
 *
 * Batch support is configured separately with `BatchMode`, and every call
 * is recorded so tests can assert on what reached the provider.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for single-text calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Simulates slow response
    Slow { delay_ms: u64 },
}

/// Batch capability of the mock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatchMode {
    /// No batch capability
    Unsupported,
    /// Batch calls translate every text
    Supported,
    /// Advertises batch support but every batch call fails
    Failing,
    /// Batch calls return one translation too few
    Short,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior of single calls
    behavior: MockBehavior,
    /// Batch capability
    batch_mode: BatchMode,
    /// Texts whose single call always fails
    failing_texts: Vec<String>,
    /// Custom response generator: (text, target code) to translation
    custom_response: Option<fn(&str, &str) -> String>,
    /// Number of `translate_one` calls
    single_calls: Arc<AtomicUsize>,
    /// Number of `translate_many` calls
    batch_calls: Arc<AtomicUsize>,
    /// Every text that reached the provider, in call order
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior, without batch support
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            batch_mode: BatchMode::Unsupported,
            failing_texts: Vec::new(),
            custom_response: None,
            single_calls: Arc::new(AtomicUsize::new(0)),
            batch_calls: Arc::new(AtomicUsize::new(0)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set the batch capability
    pub fn with_batch(mut self, mode: BatchMode) -> Self {
        self.batch_mode = mode;
        self
    }

    /// Make single calls for `text` fail
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failing_texts.push(text.into());
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of single calls made
    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    /// Number of batch calls made
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Total number of calls made
    pub fn total_calls(&self) -> usize {
        self.single_calls() + self.batch_calls()
    }

    /// Texts sent to the provider so far
    pub fn requested_texts(&self) -> Vec<String> {
        self.requested.lock().clone()
    }

    /// Translation the mock produces for a text
    pub fn render(&self, text: &str, to: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(text, to),
            None => format!("[TRANSLATED to {}] {}", to, text),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            batch_mode: self.batch_mode,
            failing_texts: self.failing_texts.clone(),
            custom_response: self.custom_response,
            single_calls: Arc::clone(&self.single_calls),
            batch_calls: Arc::clone(&self.batch_calls),
            requested: Arc::clone(&self.requested),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn supports_batch(&self) -> bool {
        self.batch_mode != BatchMode::Unsupported
    }

    async fn translate_one(&self, text: &str, _from: &str, to: &str) -> Result<String, ProviderError> {
        let count = self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(text.to_string());

        if self.failing_texts.iter().any(|t| t == text) {
            return Err(ProviderError::ApiError {
                message: format!("Simulated failure for '{}'", text),
                status_code: 400,
            });
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.render(text, to)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.render(text, to))
                }
            },

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.render(text, to))
            },
        }
    }

    async fn translate_many(&self, texts: &[String], _from: &str, to: &str) -> Result<Vec<String>, ProviderError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().extend(texts.iter().cloned());

        match self.batch_mode {
            BatchMode::Unsupported => Err(ProviderError::BatchUnsupported(self.name().to_string())),
            BatchMode::Failing => Err(ProviderError::ApiError {
                message: "Simulated batch failure".to_string(),
                status_code: 500,
            }),
            BatchMode::Supported => Ok(texts.iter().map(|t| self.render(t, to)).collect()),
            BatchMode::Short => Ok(texts
                .iter()
                .skip(1)
                .map(|t| self.render(t, to))
                .collect()),
        }
    }
}
