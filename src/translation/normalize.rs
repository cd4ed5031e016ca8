/*!
 * Text normalization and fingerprinting.
 *
 * Normalized text is the identity of a text unit: it keys the translation
 * cache, drives deduplication and is what glossary matching sees.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs (newlines included) to one space and trim
pub fn normalize(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Cache and deduplication key for a normalized text in a target locale
///
/// Hex-encoded SHA-256 of `normalized + "::" + locale`.
pub fn fingerprint(normalized: &str, locale: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.update(b"::");
    hasher.update(locale.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Truncate text to a maximum number of characters with ellipsis, for log lines
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
