use isolang::Language;
use std::collections::{BTreeSet, HashMap};

use crate::app_config::{Config, TranslationProvider};
use crate::providers::LanguagePair;

/// Locale utilities for the internal locale tags used as directory names
///
/// Site trees are laid out by internal tags (`kor`, `chn`, `vtn`, ...). Each
/// vendor accepts its own spelling of a language, so the mapping from tag to
/// vendor code is table-driven: a default code per tag, per-vendor overrides
/// on top, and configuration-file overrides on top of those.
/// Built-in locales: (tag, default vendor code, html lang)
const BUILTIN_LOCALES: &[(&str, &str, &str)] = &[
    ("kor", "ko", "ko"),
    ("eng", "en", "en"),
    ("chn", "zh-CN", "zh"),
    ("twn", "zh-TW", "zh-TW"),
    ("jpn", "ja", "ja"),
    ("vtn", "vi", "vi"),
    ("tha", "th", "th"),
    ("idn", "id", "id"),
    ("rus", "ru", "ru"),
    ("spa", "es", "es"),
    ("fra", "fr", "fr"),
    ("deu", "de", "de"),
];

/// Vendor-specific deviations from the default codes
const VENDOR_OVERRIDES: &[(TranslationProvider, &str, &str)] = &[
    // LibreTranslate only knows bare language codes
    (TranslationProvider::LibreTranslate, "chn", "zh"),
    (TranslationProvider::LibreTranslate, "twn", "zt"),
];

/// Locale tables for one run
#[derive(Debug, Clone)]
pub struct LocaleTable {
    default_codes: HashMap<String, String>,
    vendor_codes: HashMap<(TranslationProvider, String), String>,
    html_langs: HashMap<String, String>,
    link_prefixes: HashMap<String, String>,
}

impl LocaleTable {
    /// Tables with only the built-in entries
    pub fn builtin() -> Self {
        let mut table = Self {
            default_codes: HashMap::new(),
            vendor_codes: HashMap::new(),
            html_langs: HashMap::new(),
            link_prefixes: HashMap::new(),
        };

        for (tag, code, lang) in BUILTIN_LOCALES {
            table.default_codes.insert(tag.to_string(), code.to_string());
            table.html_langs.insert(tag.to_string(), lang.to_string());
        }

        for (provider, tag, code) in VENDOR_OVERRIDES {
            table.vendor_codes.insert((*provider, tag.to_string()), code.to_string());
        }

        table
    }

    /// Apply configuration-file overrides; unknown provider keys were rejected by validation
    pub fn apply_config(&mut self, config: &Config) {
        for (provider, codes) in &config.locale_codes {
            let Ok(provider) = provider.parse::<TranslationProvider>() else {
                continue;
            };
            for (tag, code) in codes {
                self.vendor_codes.insert((provider, tag.clone()), code.clone());
            }
        }

        for (tag, lang) in &config.html_lang {
            self.html_langs.insert(tag.clone(), lang.clone());
        }

        for (tag, prefix) in &config.link_prefixes {
            self.link_prefixes.insert(tag.clone(), prefix.clone());
        }
    }

    /// Override the code a vendor receives for a tag
    pub fn set_vendor_code(&mut self, provider: TranslationProvider, tag: &str, code: &str) {
        self.vendor_codes.insert((provider, tag.to_string()), code.to_string());
    }

    /// Vendor code for a tag; unknown tags are passed through unchanged
    pub fn vendor_code(&self, provider: TranslationProvider, tag: &str) -> String {
        if let Some(code) = self.vendor_codes.get(&(provider, tag.to_string())) {
            return code.clone();
        }

        self.default_codes
            .get(tag)
            .cloned()
            .unwrap_or_else(|| tag.to_string())
    }

    /// Vendor codes for a source/target tag pair
    pub fn language_pair(&self, provider: TranslationProvider, from: &str, to: &str) -> LanguagePair {
        LanguagePair::new(self.vendor_code(provider, from), self.vendor_code(provider, to))
    }

    /// Value for the html `lang` attribute of a locale
    pub fn html_lang(&self, tag: &str) -> String {
        if let Some(lang) = self.html_langs.get(tag) {
            return lang.clone();
        }

        self.default_codes
            .get(tag)
            .cloned()
            .unwrap_or_else(|| tag.to_string())
    }

    /// Path prefix of the locale's internal links
    pub fn link_prefix(&self, tag: &str) -> String {
        self.link_prefixes
            .get(tag)
            .cloned()
            .unwrap_or_else(|| format!("/{}/", tag))
    }

    /// Every tag that may appear as a locale marker class
    pub fn known_markers<'a>(&self, extra: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
        let mut markers: BTreeSet<String> = self.default_codes.keys().cloned().collect();
        markers.extend(self.html_langs.keys().cloned());
        markers.extend(self.link_prefixes.keys().cloned());
        markers.extend(extra.into_iter().cloned());
        markers
    }
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Check that the primary subtag of a language code is a known ISO 639 code
pub fn is_valid_language_code(code: &str) -> bool {
    let primary = code
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    match primary.len() {
        2 => Language::from_639_1(&primary).is_some(),
        3 => Language::from_639_3(&primary).is_some(),
        _ => false,
    }
}
