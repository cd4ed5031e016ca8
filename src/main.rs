// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::PathBuf;

use locsync::app_config::{self, Config, ProviderSettings, SyncOptions, TranslationProvider, parse_list};
use locsync::{Controller, DocumentStatus};
use locsync::providers::{libretranslate, papago};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTranslationProvider {
    Google,
    Papago,
    #[value(alias = "libre")]
    Libretranslate,
    #[value(alias = "trans")]
    Shell,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::Papago => TranslationProvider::Papago,
            CliTranslationProvider::Libretranslate => TranslationProvider::LibreTranslate,
            CliTranslationProvider::Shell => TranslationProvider::Shell,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synchronize target locales from the source locale (default command)
    Sync(SyncArgs),

    /// Generate shell completions for locsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct SyncArgs {
    /// Root directory holding one subdirectory per locale
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Source locale tag
    #[arg(short, long, default_value = "kor")]
    source: String,

    /// Comma-separated target locale tags
    #[arg(short, long, default_value = "eng")]
    targets: String,

    /// Directory below the source locale to synchronize (default: everything)
    #[arg(long)]
    scope: Option<String>,

    /// Comma-separated explicit documents, directories or glob patterns
    #[arg(short, long)]
    inputs: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum, default_value = "google")]
    provider: CliTranslationProvider,

    /// Google endpoint override
    #[arg(long, env = "GOOGLE_TRANSLATE_URL")]
    google_url: Option<String>,

    /// Papago endpoint override
    #[arg(long, env = "PAPAGO_URL")]
    papago_url: Option<String>,

    /// Papago client id
    #[arg(long, env = papago::CLIENT_ID_VAR, hide_env_values = true)]
    papago_client_id: Option<String>,

    /// Papago client secret
    #[arg(long, env = papago::CLIENT_SECRET_VAR, hide_env_values = true)]
    papago_client_secret: Option<String>,

    /// LibreTranslate base URL (required for the libretranslate provider)
    #[arg(long, env = "LIBRETRANSLATE_URL")]
    libretranslate_url: Option<String>,

    /// LibreTranslate API key
    #[arg(long, env = libretranslate::API_KEY_VAR, hide_env_values = true)]
    libretranslate_api_key: Option<String>,

    /// Command line of the shell translator
    #[arg(long, env = "TRANSLATE_SHELL_COMMAND")]
    shell_command: Option<String>,

    /// Maximum concurrent per-text provider calls
    #[arg(long, default_value_t = app_config::default_concurrency())]
    concurrency: usize,

    /// Minimum interval between provider calls in milliseconds
    #[arg(long, default_value_t = app_config::default_call_interval_ms())]
    interval_ms: u64,

    /// Retries for rate-limited or transient failures
    #[arg(long, default_value_t = app_config::default_retry_count())]
    retries: u32,

    /// Base retry delay in milliseconds, doubled on each retry
    #[arg(long, default_value_t = app_config::default_retry_backoff_ms())]
    retry_base_ms: u64,

    /// Provider request timeout in seconds
    #[arg(long, default_value_t = app_config::default_timeout_secs())]
    timeout_secs: u64,

    /// Pause between documents in milliseconds
    #[arg(long, default_value_t = 0)]
    doc_delay_ms: u64,

    /// Collect and report without translating or writing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Identifier of the content region element
    #[arg(long)]
    region_id: Option<String>,

    /// Cache directory (default: <root>/.translation-cache)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Glossary directory (default: <root>/glossary)
    #[arg(long)]
    glossary_dir: Option<PathBuf>,

    /// Hide the progress bars
    #[arg(long)]
    no_progress: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// locsync - locale content synchronization
///
/// Translates the content region of source-locale HTML pages into every target
/// locale and merges it into the target pages.
#[derive(Parser, Debug)]
#[command(name = "locsync")]
#[command(version)]
#[command(about = "Synchronize translated content across locale-parallel HTML trees")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "locsync reads the content region of every source-locale page, translates its text
through a translation provider and writes it into the matching page of each target locale.

EXAMPLES:
    locsync -r site -s kor -t eng,chn                    # Whole source tree into two locales
    locsync -r site -t vtn --scope esg                   # Only <root>/kor/esg/**
    locsync -r site -t eng -i 'site/kor/esg/**/*.html'   # Explicit glob
    locsync -r site -t eng -p papago                     # Papago (PAPAGO_CLIENT_ID/SECRET)
    locsync -r site -t eng --dry-run                     # Report only, write nothing
    locsync completions bash > locsync.bash              # Generate bash completions

SUPPORTED PROVIDERS:
    google         - Google web endpoint, batch capable (default)
    papago         - Naver Papago (requires PAPAGO_CLIENT_ID and PAPAGO_CLIENT_SECRET)
    libretranslate - LibreTranslate server (requires --libretranslate-url)
    shell          - translate-shell command line tool ('trans')")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    sync: SyncArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Label and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let (label, color) = Self::style_for_level(record.level());
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "\x1B[{}m{} {}\x1B[0m {}", color, now, label, record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Everything is let through; the effective level is set once options are known
    if CustomLogger::init(LevelFilter::Trace).is_err() {
        eprintln!("Failed to install logger");
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "locsync", &mut std::io::stdout());
            Ok(())
        },
        Some(Commands::Sync(args)) => run_sync(args).await,
        None => run_sync(cli.sync).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run_sync(args: SyncArgs) -> Result<()> {
    if let Some(level) = args.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let config = match &args.config {
        Some(path) => Config::load(path).context("Configuration validation failed")?,
        None => Config::default(),
    };

    if args.log_level.is_none() {
        if let Some(level) = config.log_level {
            log::set_max_level(level.to_level_filter());
        }
    }

    let options = build_options(&args, &config);
    let controller = Controller::with_options(options)?.with_progress(!args.no_progress);
    let report = controller.run().await?;

    for document in &report.documents {
        if let DocumentStatus::Failed(reason) = &document.status {
            error!("{:?} [{}]: {}", document.source, document.locale, reason);
        }
    }

    let summary = &report.summary;
    info!(
        "{} document(s): {} processed, {} skipped, {} failed",
        summary.documents, summary.processed, summary.skipped, summary.failed
    );

    Ok(())
}

/// Complete the configuration file with command line flags
fn build_options(args: &SyncArgs, config: &Config) -> SyncOptions {
    let mut options = SyncOptions::new(&args.root, args.source.trim(), parse_list(&args.targets));
    options.apply_config(config);

    options.scope = args.scope.clone().filter(|s| !s.trim().is_empty());
    options.inputs = args.inputs.as_deref().map(parse_list).unwrap_or_default();
    if let Some(region_id) = &args.region_id {
        options.region_id = region_id.clone();
    }
    if let Some(cache_dir) = &args.cache_dir {
        options.cache_dir = cache_dir.clone();
    }
    if let Some(glossary_dir) = &args.glossary_dir {
        options.glossary_dir = glossary_dir.clone();
    }

    options.concurrency = args.concurrency;
    options.call_interval_ms = args.interval_ms;
    options.document_delay_ms = args.doc_delay_ms;
    options.dry_run = args.dry_run;

    let kind: TranslationProvider = args.provider.into();
    let mut provider = ProviderSettings::new(kind);
    provider.endpoint = match kind {
        TranslationProvider::Google => args.google_url.clone(),
        TranslationProvider::Papago => args.papago_url.clone(),
        TranslationProvider::LibreTranslate => args.libretranslate_url.clone(),
        TranslationProvider::Shell => None,
    };
    provider.command = args.shell_command.clone();
    provider.client_id = args.papago_client_id.clone();
    provider.client_secret = args.papago_client_secret.clone();
    provider.api_key = args.libretranslate_api_key.clone();
    provider.retry_count = args.retries;
    provider.retry_backoff_ms = args.retry_base_ms;
    provider.timeout_secs = args.timeout_secs;
    options.provider = provider;

    options
}
