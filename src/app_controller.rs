use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::SyncOptions;
use crate::document::{Collector, Document, IgnoreSelectors, Merger};
use crate::errors::{AppError, ConfigError};
use crate::file_utils::{FileManager, TemplateSource};
use crate::providers::{LanguagePair, Provider, create_provider};
use crate::translation::{
    BatchTranslator, Blacklist, Glossary, RateLimiter, TranslationCache, TranslationContext, fingerprint,
};

// @module: Application controller for locale synchronization runs

/// Counters of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Source documents discovered
    pub documents: usize,
    /// Document and locale pairs written (or reported, in dry-run)
    pub processed: usize,
    /// Document and locale pairs skipped
    pub skipped: usize,
    /// Document and locale pairs that failed
    pub failed: usize,
    /// Text units collected
    pub units: usize,
    /// Units answered from the cache
    pub cache_hits: usize,
    /// Provider calls made
    pub provider_calls: usize,
    /// Units left untranslated after provider failures
    pub unit_failures: usize,
}

/// Outcome of one document for one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Target document written
    Synced,
    /// Dry-run: collected and reported only
    Reported,
    /// Not attempted
    Skipped(String),
    /// Processing failed; nothing was written for this document
    Failed(String),
}

/// Per-document line of a run report
#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// Source document
    pub source: PathBuf,
    /// Target locale tag
    pub locale: String,
    /// Target document, when it could be resolved
    pub target: Option<PathBuf>,
    /// Units collected from the source
    pub units: usize,
    /// Units already in the cache
    pub cached: usize,
    /// Where the target skeleton came from, or would come from in dry-run
    pub template: Option<TemplateSource>,
    /// Outcome
    pub status: DocumentStatus,
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Totals
    pub summary: RunSummary,
    /// One entry per document and locale, in processing order
    pub documents: Vec<DocumentReport>,
}

/// Per-locale state shared by the documents of that locale
struct LocalePass<'a> {
    locale: &'a str,
    languages: LanguagePair,
    glossary: Glossary,
    merger: Merger,
    translator: Option<&'a BatchTranslator>,
}

/// Main application controller for locale synchronization
pub struct Controller {
    // @field: Resolved run options
    options: SyncOptions,

    // @field: Compiled ignore selectors
    ignore: IgnoreSelectors,

    // @field: Compiled blacklist
    blacklist: Blacklist,

    // @field: Process-wide outbound call gate
    limiter: Arc<RateLimiter>,

    // @field: Draw progress bars on stderr
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller, compiling selectors and blacklist
    pub fn with_options(options: SyncOptions) -> Result<Self, AppError> {
        options.validate()?;

        let ignore = IgnoreSelectors::parse(&options.ignore_selectors)?;
        let blacklist = Blacklist::new(&options.blacklist)?;
        let limiter = Arc::new(RateLimiter::from_millis(options.call_interval_ms));
        debug!("Provider calls spaced at least {:?} apart", limiter.min_interval());

        Ok(Self {
            options,
            ignore,
            blacklist,
            limiter,
            show_progress: false,
        })
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Options of this run
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// The rate limiter every provider of this run shares
    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// Resolve the source documents of the run
    ///
    /// Explicit inputs win over the scope convention. Finding nothing is an
    /// error.
    pub fn discover_documents(&self) -> Result<Vec<PathBuf>, AppError> {
        let documents = if self.options.inputs.is_empty() {
            FileManager::find_source_documents(
                &self.options.root,
                &self.options.source_locale,
                self.options.scope.as_deref(),
            )?
        } else {
            FileManager::expand_inputs(&self.options.inputs)?
        };

        if documents.is_empty() {
            let described = if self.options.inputs.is_empty() {
                let mut dir = self.options.root.join(&self.options.source_locale);
                if let Some(scope) = &self.options.scope {
                    dir = dir.join(scope);
                }
                format!("{}", dir.display())
            } else {
                self.options.inputs.join(", ")
            };
            return Err(AppError::NoDocuments(described));
        }

        Ok(documents)
    }

    /// Run the synchronization with the configured provider
    pub async fn run(&self) -> Result<RunReport, AppError> {
        let provider = if self.options.dry_run {
            None
        } else {
            Some(create_provider(&self.options.provider, self.rate_limiter())?)
        };

        self.run_with_provider(provider).await
    }

    /// Run the synchronization with an explicit provider
    ///
    /// The provider may be `None` only in dry-run mode.
    pub async fn run_with_provider(&self, provider: Option<Arc<dyn Provider>>) -> Result<RunReport, AppError> {
        let start_time = Instant::now();
        let documents = self.discover_documents()?;

        let translator = match (&provider, self.options.dry_run) {
            (_, true) => None,
            (Some(provider), false) => Some(BatchTranslator::new(Arc::clone(provider), self.options.concurrency)),
            (None, false) => {
                return Err(ConfigError::Invalid("a provider is required unless running dry".to_string()).into());
            },
        };

        info!(
            "Synchronizing {} document(s) from {} to {}{}",
            documents.len(),
            self.options.source_locale,
            self.options.target_locales.join(", "),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        let mut report = RunReport {
            summary: RunSummary {
                documents: documents.len(),
                ..Default::default()
            },
            documents: Vec::new(),
        };

        for locale in &self.options.target_locales {
            if *locale == self.options.source_locale {
                warn!("Skipping target locale {}: it is the source locale", locale);
                for source in &documents {
                    report.summary.skipped += 1;
                    report.documents.push(DocumentReport {
                        source: source.clone(),
                        locale: locale.clone(),
                        target: None,
                        units: 0,
                        cached: 0,
                        template: None,
                        status: DocumentStatus::Skipped("target locale equals source locale".to_string()),
                    });
                }
                continue;
            }

            self.run_locale(locale, &documents, translator.as_ref(), &mut report).await;
        }

        let summary = &report.summary;
        info!(
            "Run completed in {}: {} processed, {} skipped, {} failed; {} units, {} cache hits, {} provider calls, {} untranslated",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.failed,
            summary.units,
            summary.cache_hits,
            summary.provider_calls,
            summary.unit_failures
        );

        Ok(report)
    }

    /// Process every document for one target locale
    async fn run_locale(
        &self,
        locale: &str,
        documents: &[PathBuf],
        translator: Option<&BatchTranslator>,
        report: &mut RunReport,
    ) {
        let options = &self.options;
        let glossary_path = options.glossary_dir.join(format!("{}.csv", locale));
        let glossary = Glossary::load(&glossary_path).unwrap_or_else(|e| {
            warn!("Ignoring glossary {:?}: {}", glossary_path, e);
            Glossary::new()
        });

        let mut cache = TranslationCache::load(&options.cache_dir, locale);
        info!(
            "Locale {}: {} cached translations, {} glossary terms",
            locale,
            cache.len(),
            glossary.len()
        );

        let pass = LocalePass {
            locale,
            languages: options
                .locales
                .language_pair(options.provider.kind, &options.source_locale, locale),
            glossary,
            merger: Merger {
                region_id: options.region_id.clone(),
                source_prefix: options.locales.link_prefix(&options.source_locale),
                target_prefix: options.locales.link_prefix(locale),
                target_marker: locale.to_string(),
                target_lang: options.locales.html_lang(locale),
                known_markers: options
                    .locales
                    .known_markers(options.target_locales.iter().chain(std::iter::once(&options.source_locale))),
            },
            translator,
        };

        let progress = self.progress_bar(documents.len() as u64, locale);

        for (index, source) in documents.iter().enumerate() {
            if index > 0 && options.document_delay_ms > 0 && !options.dry_run {
                tokio::time::sleep(Duration::from_millis(options.document_delay_ms)).await;
            }

            let file_name = source
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress.set_message(file_name);

            let document_report = self.process_document(source, &pass, &mut cache, &mut report.summary).await;
            match &document_report.status {
                DocumentStatus::Failed(reason) => {
                    warn!("Failed to sync {:?} to {}: {}", source, locale, reason);
                    report.summary.failed += 1;
                },
                DocumentStatus::Skipped(_) => report.summary.skipped += 1,
                DocumentStatus::Synced | DocumentStatus::Reported => report.summary.processed += 1,
            }
            report.documents.push(document_report);

            progress.inc(1);
        }

        progress.finish_with_message(format!("{} done", locale));

        if !options.dry_run {
            if let Err(e) = cache.save() {
                error!("Failed to save translation cache for {}: {:#}", locale, e);
            }
        }
    }

    /// Sync one document; failures are reported in the result, not returned
    async fn process_document(
        &self,
        source: &Path,
        pass: &LocalePass<'_>,
        cache: &mut TranslationCache,
        summary: &mut RunSummary,
    ) -> DocumentReport {
        let mut report = DocumentReport {
            source: source.to_path_buf(),
            locale: pass.locale.to_string(),
            target: None,
            units: 0,
            cached: 0,
            template: None,
            status: DocumentStatus::Synced,
        };

        if let Err(e) = self.sync_document(source, pass, cache, summary, &mut report).await {
            report.status = DocumentStatus::Failed(e.to_string());
        }

        report
    }

    async fn sync_document(
        &self,
        source: &Path,
        pass: &LocalePass<'_>,
        cache: &mut TranslationCache,
        summary: &mut RunSummary,
        report: &mut DocumentReport,
    ) -> Result<(), AppError> {
        let options = &self.options;

        let target_path = FileManager::target_path(source, &options.root, &options.source_locale, pass.locale)?;
        report.target = Some(target_path.clone());

        let source_document = Document::load(source)?;
        let region = source_document.content_region(&options.region_id)?;
        let units = Collector::new(&self.ignore).collect(&region);

        report.units = units.len();
        report.cached = units
            .iter()
            .filter(|unit| cache.contains(&fingerprint(&unit.normalized, pass.locale)))
            .count();
        summary.units += units.len();

        let Some(translator) = pass.translator else {
            report.template = Some(FileManager::template_for(&target_path));
            report.status = DocumentStatus::Reported;
            info!(
                "[dry run] {:?} -> {:?}: {} units ({} cached)",
                source, target_path, report.units, report.cached
            );
            return Ok(());
        };

        let ctx = TranslationContext {
            languages: &pass.languages,
            target_locale: pass.locale,
            glossary: &pass.glossary,
            blacklist: &self.blacklist,
        };
        let outcome = translator.translate_all(&units, ctx, cache).await;

        summary.cache_hits += outcome.cache_hits;
        summary.provider_calls += outcome.provider_calls;
        summary.unit_failures += outcome.failures;
        if outcome.failures > 0 {
            warn!("{} unit(s) of {:?} left untranslated for {}", outcome.failures, source, pass.locale);
        }

        let template = FileManager::ensure_target_document(&target_path, source)?;
        if template != TemplateSource::Existing {
            info!("Created {:?} from {:?}", target_path, template);
        }
        report.template = Some(template);

        let target_document = Document::load(&target_path)?;
        let merge = pass
            .merger
            .merge(source_document, &units, &outcome.translations, &target_document)?;
        target_document.save(&target_path)?;

        debug!(
            "Synced {:?} -> {:?}: {} units, {} links",
            source, target_path, merge.units_written, merge.links_rewritten
        );
        report.status = DocumentStatus::Synced;
        Ok(())
    }

    fn progress_bar(&self, len: u64, locale: &str) -> ProgressBar {
        let progress = ProgressBar::new(len);
        if !self.show_progress {
            progress.set_draw_target(ProgressDrawTarget::hidden());
            return progress;
        }

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{prefix} [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("█▓▒░"));
        progress.set_prefix(locale.to_string());
        progress
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
