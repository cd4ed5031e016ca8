/*!
 * Translation engine for collected document text.
 *
 * This module contains everything between collected text and translated
 * text. It is split into several submodules:
 *
 * - `normalize`: Whitespace normalization and cache fingerprints
 * - `cache`: Persistent per-locale translation cache
 * - `filters`: Glossary substitution and phrase blacklist
 * - `rate_limiter`: Process-wide minimum interval between provider calls
 * - `retry`: Exponential backoff policy shared by all providers
 * - `batch`: Deduplicating batch translator with per-text fallback
 */

// Re-export main types for easier usage
pub use self::batch::{BatchOutcome, BatchTranslator, TranslationContext};
pub use self::cache::TranslationCache;
pub use self::filters::{Blacklist, Glossary, GlossaryTerm, apply_filters};
pub use self::normalize::{fingerprint, normalize};
pub use self::rate_limiter::RateLimiter;
pub use self::retry::RetryPolicy;

// Submodules
pub mod batch;
pub mod cache;
pub mod filters;
pub mod normalize;
pub mod rate_limiter;
pub mod retry;
