/*!
 * Error types for locsync.
 *
 * This module contains the error taxonomy of the synchronization pipeline,
 * using the thiserror crate for ergonomic error definitions:
 * - `ConfigError`: fatal, raised before any document is processed
 * - `ProviderError`: raised by translation backends, some kinds are retryable
 * - `DocumentError`: fatal to a single document, the run continues
 * - `AppError`: top-level wrapper used by the orchestrator and the binary
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making a request fails before a response is received
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a provider response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The translation subprocess could not be run or exited unsuccessfully
    #[error("Translation command failed: {0}")]
    CommandFailed(String),

    /// The provider has no batch capability
    #[error("Provider '{0}' does not support batch translation")]
    BatchUnsupported(String),

    /// A batch response did not contain one translation per input
    #[error("Batch response size mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Number of texts sent
        expected: usize,
        /// Number of translations received
        actual: usize,
    },
}

impl ProviderError {
    /// Whether the failure is a rate-limit or transient signal worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded(_) | Self::ConnectionError(_) => true,
            Self::ApiError { status_code, .. } => *status_code == 429 || *status_code >= 500,
            Self::RequestFailed(_)
            | Self::ParseError(_)
            | Self::AuthenticationError(_)
            | Self::CommandFailed(_)
            | Self::BatchUnsupported(_)
            | Self::LengthMismatch { .. } => false,
        }
    }

    /// Classify a non-success HTTP status into a provider error
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            429 => Self::RateLimitExceeded(message),
            401 | 403 => Self::AuthenticationError(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() || error.is_request() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else if let Some(status) = error.status() {
            Self::from_status(status.as_u16(), error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Configuration errors; always fatal for the run
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested provider name is unknown
    #[error("Unknown translation provider: {0}")]
    UnknownProvider(String),

    /// A credentialed provider was selected without its credentials
    #[error("Provider '{provider}' requires the {variable} environment variable")]
    MissingCredential {
        /// Provider name
        provider: String,
        /// Name of the missing variable
        variable: String,
    },

    /// A provider that needs an explicit URL was selected without one
    #[error("Provider '{provider}' requires an endpoint URL")]
    MissingEndpoint {
        /// Provider name
        provider: String,
    },

    /// An endpoint URL could not be parsed
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint {
        /// The offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// An ignore selector could not be parsed
    #[error("Invalid ignore selector '{selector}': {reason}")]
    InvalidSelector {
        /// The offending selector
        selector: String,
        /// What was wrong with it
        reason: String,
    },

    /// A blacklist phrase is unusable
    #[error("Invalid blacklist phrase '{phrase}': {reason}")]
    InvalidBlacklist {
        /// The offending phrase
        phrase: String,
        /// What was wrong with it
        reason: String,
    },

    /// The configuration file could not be read or parsed
    #[error("Failed to load configuration from {path:?}: {reason}")]
    Load {
        /// Config file path
        path: PathBuf,
        /// Underlying message
        reason: String,
    },

    /// Any other invalid setting
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors fatal to the processing of a single document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document has no element with the content region identifier
    #[error("Document {path:?} has no content region '#{region_id}'")]
    MissingContentRegion {
        /// Document path
        path: PathBuf,
        /// Expected region id
        region_id: String,
    },

    /// Reading, writing or copying a document failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The source document is not inside the source locale tree
    #[error("Document {path:?} is outside the source locale directory {root:?}")]
    OutsideSourceTree {
        /// Document path
        path: PathBuf,
        /// Expected source locale root
        root: PathBuf,
    },

    /// Translations do not line up with the collected units
    #[error("Expected {expected} translations, got {actual}")]
    UnitCountMismatch {
        /// Units collected
        expected: usize,
        /// Translations supplied
        actual: usize,
    },
}

impl DocumentError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Fatal configuration problem
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No input documents matched
    #[error("No source documents matched {0}")]
    NoDocuments(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
