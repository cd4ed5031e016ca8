use async_trait::async_trait;
use log::error;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

use crate::errors::{ConfigError, ProviderError};
use crate::translation::normalize::truncate_text;
use crate::translation::rate_limiter::RateLimiter;
use crate::translation::retry::RetryPolicy;
use super::Provider;

/// Default translate-shell invocation
pub const DEFAULT_COMMAND: &str = "trans";

/// Provider that shells out to translate-shell, one process per text
#[derive(Debug)]
pub struct ShellTranslator {
    /// Program to run
    program: String,
    /// Extra arguments placed before the generated ones
    base_args: Vec<String>,
    /// Per-invocation timeout
    timeout: Duration,
    /// Retry policy for timeouts
    retry: RetryPolicy,
    /// Shared outbound call gate
    limiter: Arc<RateLimiter>,
}

impl ShellTranslator {
    /// Create a translator from a command line such as `trans` or `/opt/bin/trans -e bing`
    pub fn new(
        command: &str,
        timeout: Duration,
        retry: RetryPolicy,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, ConfigError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| ConfigError::Invalid("translation command must not be empty".into()))?;

        Ok(Self {
            program,
            base_args: parts.collect(),
            timeout,
            retry,
            limiter,
        })
    }

    /// Full argument list for one translation
    pub fn arguments(&self, text: &str, from: &str, to: &str) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push("-b".to_string());
        args.push("-no-autocorrect".to_string());
        args.push(format!("{}:{}", from, to));
        args.push("--".to_string());
        args.push(text.to_string());
        args
    }

    async fn run(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        let command_future = Command::new(&self.program)
            .args(self.arguments(text, from, to))
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = command_future => {
                result.map_err(|e| ProviderError::CommandFailed(format!("failed to run {}: {}", self.program, e)))?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ProviderError::ConnectionError(format!(
                    "{} timed out after {:?}", self.program, self.timeout
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("{} exited with {}: {}", self.program, output.status, truncate_text(stderr.trim(), 200));
            return Err(ProviderError::CommandFailed(format!(
                "{} exited with {}", self.program, output.status
            )));
        }

        let translated = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if translated.is_empty() {
            return Err(ProviderError::CommandFailed(format!("{} produced no output", self.program)));
        }

        Ok(translated)
    }
}

#[async_trait]
impl Provider for ShellTranslator {
    fn name(&self) -> &str {
        "shell"
    }

    async fn translate_one(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        self.retry
            .execute(&self.limiter, "translate-shell", || self.run(text, from, to))
            .await
    }
}
