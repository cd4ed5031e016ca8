/*!
 * Post-translation filters.
 *
 * Every provider result passes through the locale glossary first and the
 * run-wide blacklist second, before it is cached:
 * - `Glossary`: ordered, whole-word, case-sensitive forced substitutions
 * - `Blacklist`: case-insensitive phrase removal followed by a trim
 *
 * Patterns are compiled when the filters are built, so applying them cannot fail.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use regex::{NoExpand, Regex};
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;

/// A single glossary entry
#[derive(Debug, Clone)]
pub struct GlossaryTerm {
    /// Term as it appears in provider output
    pub source: String,

    /// Replacement term
    pub target: String,

    // @field: Whole-word matcher for the escaped source term
    pattern: Regex,
}

impl GlossaryTerm {
    /// Build a term; returns `None` for an empty source term
    pub fn new(source: &str, target: &str) -> Option<Self> {
        if source.is_empty() {
            return None;
        }

        // \b only makes sense next to a word character
        let escaped = regex::escape(source);
        let leading = if source.chars().next().is_some_and(is_word_char) { r"\b" } else { "" };
        let trailing = if source.chars().last().is_some_and(is_word_char) { r"\b" } else { "" };

        let pattern = Regex::new(&format!("{}{}{}", leading, escaped, trailing)).ok()?;

        Some(Self {
            source: source.to_string(),
            target: target.to_string(),
            pattern,
        })
    }

    /// Replace all whole-word occurrences of this term
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, NoExpand(&self.target))
            .into_owned()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Ordered list of forced substitutions for one target locale
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    terms: Vec<GlossaryTerm>,
}

impl Glossary {
    /// Create an empty glossary
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a glossary from (source, target) pairs, keeping their order
    pub fn from_pairs<S: AsRef<str>, T: AsRef<str>>(pairs: impl IntoIterator<Item = (S, T)>) -> Self {
        let mut glossary = Self::new();
        for (source, target) in pairs {
            glossary.add_term(source.as_ref(), target.as_ref());
        }
        glossary
    }

    /// Append a term; empty source terms are ignored
    pub fn add_term(&mut self, source: &str, target: &str) {
        match GlossaryTerm::new(source, target) {
            Some(term) => self.terms.push(term),
            None => debug!("Ignoring glossary entry with empty source term"),
        }
    }

    /// Load a locale glossary file
    ///
    /// One `source,target` pair per line. Blank lines and lines starting with
    /// `#` are skipped, surrounding double quotes are stripped. A missing file
    /// yields an empty glossary.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No glossary at {:?}", path);
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read glossary file: {:?}", path))?;

        Ok(Self::parse(&content, path))
    }

    /// Parse glossary text; `origin` is only used in warnings
    pub fn parse(content: &str, origin: &Path) -> Self {
        let mut glossary = Self::new();

        for (line_number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((source, target)) = line.split_once(',') else {
                warn!("{:?}:{}: glossary line has no ',' separator, skipped", origin, line_number + 1);
                continue;
            };

            glossary.add_term(unquote(source), unquote(target));
        }

        debug!("Loaded {} glossary terms from {:?}", glossary.len(), origin);
        glossary
    }

    /// Apply every term in order; later terms see earlier substitutions
    pub fn apply(&self, text: &str) -> String {
        self.terms
            .iter()
            .fold(text.to_string(), |acc, term| term.apply(&acc))
    }

    /// Terms in application order
    pub fn terms(&self) -> &[GlossaryTerm] {
        &self.terms
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the glossary has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

/// Phrases stripped from every translation, independent of locale
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    phrases: Vec<Regex>,
}

impl Blacklist {
    /// Compile blacklist phrases; an empty phrase is a configuration error
    pub fn new(phrases: &[String]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(phrases.len());

        for phrase in phrases {
            if phrase.trim().is_empty() {
                return Err(ConfigError::InvalidBlacklist {
                    phrase: phrase.clone(),
                    reason: "phrase is empty".to_string(),
                });
            }

            let pattern = Regex::new(&format!("(?i){}", regex::escape(phrase)))
                .map_err(|e| ConfigError::InvalidBlacklist {
                    phrase: phrase.clone(),
                    reason: e.to_string(),
                })?;
            compiled.push(pattern);
        }

        Ok(Self { phrases: compiled })
    }

    /// Remove every occurrence of each phrase in order, then trim
    pub fn apply(&self, text: &str) -> String {
        let stripped = self
            .phrases
            .iter()
            .fold(text.to_string(), |acc, phrase| phrase.replace_all(&acc, "").into_owned());
        stripped.trim().to_string()
    }

    /// Number of phrases
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Check if there are no phrases
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Glossary substitution followed by blacklist removal
pub fn apply_filters(text: &str, glossary: &Glossary, blacklist: &Blacklist) -> String {
    blacklist.apply(&glossary.apply(text))
}
