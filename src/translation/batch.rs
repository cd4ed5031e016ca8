/*!
 * Batch translation processing.
 *
 * Turns an ordered list of texts into an index-aligned list of translations:
 * cache hits are answered locally, duplicates are translated once, misses go
 * to the provider as one batch call when supported, and per-text calls are
 * the fallback. A text that cannot be translated keeps its original string.
 */

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

use crate::document::collector::TextUnit;
use crate::providers::{LanguagePair, Provider};

use super::cache::TranslationCache;
use super::filters::{Blacklist, Glossary, apply_filters};
use super::normalize::{fingerprint, normalize, truncate_text};

/// Everything a translation pass needs besides the texts and the cache
#[derive(Debug, Clone, Copy)]
pub struct TranslationContext<'a> {
    /// Vendor codes of the source and target locale
    pub languages: &'a LanguagePair,
    /// Target locale tag; part of every fingerprint
    pub target_locale: &'a str,
    /// Locale glossary
    pub glossary: &'a Glossary,
    /// Run-wide blacklist
    pub blacklist: &'a Blacklist,
}

/// Result of translating one list of texts
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One entry per input text, in input order
    pub translations: Vec<String>,
    /// Texts answered from the cache
    pub cache_hits: usize,
    /// Calls made to the provider, retries excluded
    pub provider_calls: usize,
    /// Texts left untranslated because the provider failed on them
    pub failures: usize,
}

/// A distinct cache miss and every input position that shares it
#[derive(Debug)]
struct PendingText {
    fingerprint: String,
    /// First original sharing the fingerprint, trimmed; sent to the provider
    text: String,
    indices: Vec<usize>,
}

/// Batch translator for processing collected texts
pub struct BatchTranslator {
    /// The provider to use
    provider: Arc<dyn Provider>,

    /// Maximum number of concurrent per-text requests
    max_concurrent_requests: usize,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(provider: Arc<dyn Provider>, max_concurrent_requests: usize) -> Self {
        Self {
            provider,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Translate the texts of collected units, keeping unit order
    pub async fn translate_all(
        &self,
        units: &[TextUnit],
        ctx: TranslationContext<'_>,
        cache: &mut TranslationCache,
    ) -> BatchOutcome {
        let texts: Vec<&str> = units.iter().map(|unit| unit.original.as_str()).collect();
        self.translate_texts(&texts, ctx, cache).await
    }

    /// Translate raw texts, keeping input order
    ///
    /// Successful translations are filtered through the glossary and the
    /// blacklist and stored in `cache`. Failed texts are returned unchanged
    /// and are not cached.
    pub async fn translate_texts(
        &self,
        texts: &[&str],
        ctx: TranslationContext<'_>,
        cache: &mut TranslationCache,
    ) -> BatchOutcome {
        let mut output: Vec<Option<String>> = vec![None; texts.len()];
        let mut pending: Vec<PendingText> = Vec::new();
        let mut pending_by_fingerprint: HashMap<String, usize> = HashMap::new();
        let mut cache_hits = 0;

        for (index, original) in texts.iter().enumerate() {
            let normalized = normalize(original);
            if normalized.is_empty() {
                output[index] = Some(original.to_string());
                continue;
            }

            let key = fingerprint(&normalized, ctx.target_locale);
            if let Some(cached) = cache.get(&key) {
                output[index] = Some(cached.to_string());
                cache_hits += 1;
                continue;
            }

            match pending_by_fingerprint.get(&key) {
                Some(&slot) => pending[slot].indices.push(index),
                None => {
                    pending_by_fingerprint.insert(key.clone(), pending.len());
                    pending.push(PendingText {
                        fingerprint: key,
                        text: original.trim().to_string(),
                        indices: vec![index],
                    });
                },
            }
        }

        debug!(
            "{} texts for {}: {} cached, {} distinct to translate",
            texts.len(), ctx.target_locale, cache_hits, pending.len()
        );

        let (results, provider_calls) = self.translate_pending(&pending, ctx.languages).await;

        let mut failures = 0;
        for (item, result) in pending.into_iter().zip(results) {
            match result {
                Some(raw) => {
                    let filtered = apply_filters(&raw, ctx.glossary, ctx.blacklist);
                    for &index in &item.indices {
                        output[index] = Some(filtered.clone());
                    }
                    cache.put(item.fingerprint, filtered);
                },
                None => {
                    failures += item.indices.len();
                    for &index in &item.indices {
                        output[index] = Some(texts[index].to_string());
                    }
                },
            }
        }

        let translations = output
            .into_iter()
            .zip(texts)
            .map(|(translated, original)| translated.unwrap_or_else(|| original.to_string()))
            .collect();

        BatchOutcome {
            translations,
            cache_hits,
            provider_calls,
            failures,
        }
    }

    /// Obtain raw translations for the distinct misses
    ///
    /// Returns one entry per pending text, `None` where translation failed,
    /// and the number of provider calls made.
    async fn translate_pending(
        &self,
        pending: &[PendingText],
        languages: &LanguagePair,
    ) -> (Vec<Option<String>>, usize) {
        if pending.is_empty() {
            return (Vec::new(), 0);
        }

        let mut calls = 0;

        if self.provider.supports_batch() {
            let texts: Vec<String> = pending.iter().map(|p| p.text.clone()).collect();
            calls += 1;

            match self.provider.translate_many(&texts, &languages.from, &languages.to).await {
                Ok(translations) if translations.len() == texts.len() => {
                    let results = translations.into_iter().map(non_empty).collect();
                    return (results, calls);
                },
                Ok(translations) => {
                    warn!(
                        "{} batch returned {} translations for {} texts, falling back to single requests",
                        self.provider.name(), translations.len(), texts.len()
                    );
                },
                Err(e) => {
                    warn!("{} batch translation failed ({}), falling back to single requests", self.provider.name(), e);
                },
            }
        }

        let provider = &self.provider;
        let results: Vec<Option<String>> = stream::iter(pending.iter())
            .map(|item| async move {
                match provider.translate_one(&item.text, &languages.from, &languages.to).await {
                    Ok(translation) => non_empty(translation),
                    Err(e) => {
                        warn!("Translation of '{}' failed, keeping original: {}", truncate_text(&item.text, 40), e);
                        None
                    },
                }
            })
            .buffered(self.max_concurrent_requests)
            .collect()
            .await;

        calls += pending.len();
        (results, calls)
    }
}

// An empty provider answer is treated as a failure
fn non_empty(translation: String) -> Option<String> {
    if translation.trim().is_empty() {
        None
    } else {
        Some(translation)
    }
}
