use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::document::selector::IgnoreSelectors;
use crate::errors::ConfigError;
use crate::language_utils::LocaleTable;
use crate::translation::filters::Blacklist;

/// Application configuration module
/// This module handles the optional run configuration file (ignore selectors,
/// phrase blacklist, locale table overrides) and the fully resolved options a
/// synchronization run is executed with.
/// Represents the optional JSON configuration file
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Selectors for elements whose text must never be collected
    pub ignore_selectors: Vec<String>,

    /// Phrases stripped from every translation, in order
    pub blacklist: Vec<String>,

    /// Identifier of the content region element
    pub region_id: Option<String>,

    /// Per-provider locale tag to vendor code overrides
    /// e.g. `{"libretranslate": {"chn": "zh"}}`
    pub locale_codes: BTreeMap<String, BTreeMap<String, String>>,

    /// Locale tag to html `lang` attribute overrides
    pub html_lang: BTreeMap<String, String>,

    /// Locale tag to link path prefix overrides (default `/<tag>/`)
    pub link_prefixes: BTreeMap<String, String>,

    /// Log level
    pub log_level: Option<LogLevel>,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google web translation endpoint (batch capable)
    #[default]
    Google,
    // @provider: Naver Papago (credentialed)
    Papago,
    // @provider: LibreTranslate (self-hosted)
    LibreTranslate,
    // @provider: translate-shell subprocess
    Shell,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::Papago => "Papago",
            Self::LibreTranslate => "LibreTranslate",
            Self::Shell => "translate-shell",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Papago => "papago".to_string(),
            Self::LibreTranslate => "libretranslate".to_string(),
            Self::Shell => "shell".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "papago" => Ok(Self::Papago),
            "libretranslate" | "libre" => Ok(Self::LibreTranslate),
            "shell" | "trans" => Ok(Self::Shell),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Provider selection and connection settings
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Which backend to use
    pub kind: TranslationProvider,

    /// Endpoint override (HTTP providers)
    pub endpoint: Option<String>,

    /// Command override (subprocess provider)
    pub command: Option<String>,

    /// Client id for credentialed providers
    pub client_id: Option<String>,

    /// Client secret for credentialed providers
    pub client_secret: Option<String>,

    /// Optional API key (self-hosted providers)
    pub api_key: Option<String>,

    /// Retry count for recoverable failures
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    pub retry_backoff_ms: u64,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// Settings for a provider with default retry behaviour
    pub fn new(kind: TranslationProvider) -> Self {
        Self {
            kind,
            endpoint: None,
            command: None,
            client_id: None,
            client_secret: None,
            api_key: None,
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self::new(TranslationProvider::default())
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Equivalent `log` crate filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Fully resolved options for one synchronization run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Root of the locale trees (`<root>/<locale>/...`)
    pub root: PathBuf,

    /// Source locale tag
    pub source_locale: String,

    /// Target locale tags, processed in order
    pub target_locales: Vec<String>,

    /// Scope directory below the source locale; `None` means the whole tree
    pub scope: Option<String>,

    /// Explicit input paths or glob patterns; overrides the scope convention
    pub inputs: Vec<String>,

    /// Identifier of the content region element
    pub region_id: String,

    /// Directory holding one cache file per target locale
    pub cache_dir: PathBuf,

    /// Directory holding one `<locale>.csv` glossary per target locale
    pub glossary_dir: PathBuf,

    /// Provider selection
    pub provider: ProviderSettings,

    /// Concurrency bound for per-unit fallback calls
    pub concurrency: usize,

    /// Minimum interval between outbound provider calls
    pub call_interval_ms: u64,

    /// Pause between documents
    pub document_delay_ms: u64,

    /// Collect and report without translating or writing
    pub dry_run: bool,

    /// Ignore selectors from the configuration file
    pub ignore_selectors: Vec<String>,

    /// Blacklist phrases from the configuration file
    pub blacklist: Vec<String>,

    /// Locale tables with configuration overrides applied
    pub locales: LocaleTable,
}

impl SyncOptions {
    /// Options with defaults for everything but the locale layout
    pub fn new(root: impl Into<PathBuf>, source_locale: &str, target_locales: Vec<String>) -> Self {
        let root = root.into();
        Self {
            cache_dir: root.join(default_cache_dir_name()),
            glossary_dir: root.join(default_glossary_dir_name()),
            root,
            source_locale: source_locale.to_string(),
            target_locales,
            scope: None,
            inputs: Vec::new(),
            region_id: default_region_id(),
            provider: ProviderSettings::default(),
            concurrency: default_concurrency(),
            call_interval_ms: default_call_interval_ms(),
            document_delay_ms: 0,
            dry_run: false,
            ignore_selectors: Vec::new(),
            blacklist: Vec::new(),
            locales: LocaleTable::builtin(),
        }
    }

    /// Merge the configuration file into these options
    pub fn apply_config(&mut self, config: &Config) {
        self.ignore_selectors = config.ignore_selectors.clone();
        self.blacklist = config.blacklist.clone();
        if let Some(region_id) = &config.region_id {
            self.region_id = region_id.clone();
        }
        self.locales.apply_config(config);
    }

    /// Validate the options for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_locale.trim().is_empty() {
            return Err(ConfigError::Invalid("source locale must not be empty".into()));
        }
        if self.target_locales.is_empty() {
            return Err(ConfigError::Invalid("at least one target locale is required".into()));
        }
        if self.region_id.trim().is_empty() {
            return Err(ConfigError::Invalid("content region id must not be empty".into()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }

        IgnoreSelectors::parse(&self.ignore_selectors)?;
        Blacklist::new(&self.blacklist)?;

        Ok(())
    }
}

impl Config {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration: selectors and blacklist phrases must compile
    pub fn validate(&self) -> Result<(), ConfigError> {
        IgnoreSelectors::parse(&self.ignore_selectors)?;
        Blacklist::new(&self.blacklist)?;

        for (tag, lang) in &self.html_lang {
            if !crate::language_utils::is_valid_language_code(lang) {
                log::warn!("html lang '{}' for locale '{}' is not a known ISO 639 code", lang, tag);
            }
        }

        for provider in self.locale_codes.keys() {
            provider.parse::<TranslationProvider>()?;
        }

        Ok(())
    }
}

/// Split a comma-separated CLI list, dropping blanks and duplicates
pub fn parse_list(value: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

pub fn default_concurrency() -> usize {
    1 // most providers rate-limit aggressively
}

pub fn default_call_interval_ms() -> u64 {
    500 // 500ms default delay between requests
}

pub fn default_retry_count() -> u32 {
    3
}

pub fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_region_id() -> String {
    "content".to_string()
}

pub fn default_cache_dir_name() -> &'static str {
    ".translation-cache"
}

pub fn default_glossary_dir_name() -> &'static str {
    "glossary"
}
