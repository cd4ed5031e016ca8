/*!
 * # locsync - locale content synchronization
 *
 * A Rust library that keeps locale-parallel HTML document trees in sync by
 * machine-translating the content region of source-locale pages into every
 * target locale.
 *
 * ## Features
 *
 * - Collect translatable text leaves from a page's content region in a
 *   stable order, skipping scripts, styles and configurable ignore selectors
 * - Translate through interchangeable providers:
 *   - Google web endpoint (batch capable)
 *   - Naver Papago (credentialed)
 *   - LibreTranslate (self-hosted)
 *   - translate-shell subprocess
 * - Per-locale persistent cache keyed by a fingerprint of the normalized text
 * - Per-locale glossary substitutions and a global phrase blacklist
 * - Global rate limiting with retry, exponential backoff and jitter
 * - Merge translations into existing target pages, rewriting internal links
 *   and locale markers, bootstrapping missing pages from a sibling
 *
 * ## Architecture
 *
 * - `app_config`: Configuration file and resolved run options
 * - `app_controller`: Orchestration of a synchronization run
 * - `document`: HTML document model:
 *   - `document::collector`: Text-unit collection
 *   - `document::merger`: Writing translations into target documents
 *   - `document::selector`: Ignore selectors
 * - `translation`: Translation pipeline:
 *   - `translation::batch`: Batch translation with cache and fallback
 *   - `translation::cache`: Per-locale persistent cache
 *   - `translation::filters`: Glossary and blacklist
 *   - `translation::rate_limiter` and `translation::retry`: Call pacing
 * - `providers`: Translation backends
 * - `file_utils`: Document discovery and target paths
 * - `language_utils`: Locale tags, vendor codes and html `lang` values
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, SyncOptions, TranslationProvider};
pub use app_controller::{Controller, DocumentReport, DocumentStatus, RunReport, RunSummary};
pub use document::{Document, TextUnit};
pub use errors::{AppError, ConfigError, DocumentError, ProviderError};
pub use language_utils::LocaleTable;
pub use providers::{LanguagePair, Provider};
