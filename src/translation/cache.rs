/*!
 * Persistent per-locale translation cache.
 *
 * One JSON object per target locale, mapping fingerprint to translation,
 * stored at `<cache_dir>/<locale>.json`. The cache is loaded at the start of
 * a locale pass and flushed once at its end.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Fingerprint-keyed translation cache for a single target locale
#[derive(Debug, Clone)]
pub struct TranslationCache {
    /// Target locale tag this cache belongs to
    locale: String,

    /// Backing file; `None` for in-memory caches
    path: Option<PathBuf>,

    /// Fingerprint to translation
    entries: BTreeMap<String, String>,

    /// Whether entries changed since load
    dirty: bool,
}

impl TranslationCache {
    /// Load the cache file of a locale
    ///
    /// A missing file yields an empty cache. A file that exists but does not
    /// parse is discarded with a warning, and the next save overwrites it.
    pub fn load(cache_dir: &Path, locale: &str) -> Self {
        let path = Self::file_path(cache_dir, locale);

        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => {
                    debug!("Loaded {} cached translations for {} from {:?}", entries.len(), locale, path);
                    entries
                },
                Err(e) => {
                    warn!("Cache file {:?} is corrupt ({}), starting with an empty cache", path, e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Could not read cache file {:?} ({}), starting with an empty cache", path, e);
                BTreeMap::new()
            }
        };

        Self {
            locale: locale.to_string(),
            path: Some(path),
            entries,
            dirty: false,
        }
    }

    /// Cache that is never written to disk
    pub fn in_memory(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            path: None,
            entries: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Location of a locale's cache file
    pub fn file_path(cache_dir: &Path, locale: &str) -> PathBuf {
        cache_dir.join(format!("{}.json", locale))
    }

    /// Locale tag of this cache
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up a translation by fingerprint
    pub fn get(&self, fingerprint: &str) -> Option<&str> {
        self.entries.get(fingerprint).map(String::as_str)
    }

    /// Check whether a fingerprint is cached
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.contains_key(fingerprint)
    }

    /// Store a translation; an identical existing entry leaves the cache clean
    pub fn put(&mut self, fingerprint: impl Into<String>, translation: impl Into<String>) {
        let translation = translation.into();
        let fingerprint = fingerprint.into();

        if self.entries.get(&fingerprint) == Some(&translation) {
            return;
        }

        self.entries.insert(fingerprint, translation);
        self.dirty = true;
    }

    /// Number of cached translations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the cache to its file
    ///
    /// The file is replaced atomically: entries go to a temporary file in the
    /// same directory which is then renamed over the old one. In-memory caches
    /// and caches without changes are not written.
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if !self.dirty {
            debug!("Cache for {} unchanged, not saving", self.locale);
            return Ok(());
        }

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {:?}", dir))?;

        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize translation cache")?;

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary cache file in {:?}", dir))?;
        temp.write_all(json.as_bytes())
            .context("Failed to write temporary cache file")?;
        temp.persist(path)
            .with_context(|| format!("Failed to replace cache file: {:?}", path))?;

        debug!("Saved {} cached translations for {} to {:?}", self.entries.len(), self.locale, path);
        self.dirty = false;
        Ok(())
    }
}
