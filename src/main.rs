// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use transpage::app_config::{self, Config};
use transpage::database::Repository;
use transpage::page::{parse, ParseCache, Severity, Unit, UnitKind};
use transpage::workflow::{MarkPreview, MarkingService, PageSummary};
use transpage::sync::ClassifiedPages;

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
    /// Parse a page file and print its template and units
    Parse {
        /// Page text file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the parse result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save a file as the next revision of a page
    Import {
        /// Page name
        page: String,

        /// Page text file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Mark the latest revision of a page for translation
    Mark {
        /// Page name
        page: String,

        /// Show what would change without saving anything
        #[arg(long)]
        dry_run: bool,

        /// Changed units whose translations stay valid
        #[arg(long, value_name = "ID", num_args = 1..)]
        no_fuzzy: Vec<u64>,
    },

    /// Withdraw a page from translation
    Unmark {
        /// Page name
        page: String,
    },

    /// List pages grouped by translation state
    List,

    /// Generate shell completions for transpage
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// transpage - translatable page segmentation and unit tracking
///
/// Splits the <translate> regions of a page into translation units, keeps
/// their ids stable across edits and tracks which pages are ready for
/// translation.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(after_help = "\
CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    configuration file using the --config-path option. A default file is created
    when none exists.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    /// ANSI color and label of a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());

            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, label, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "transpage", &mut std::io::stdout());
            Ok(())
        }
        Commands::Parse { file, json } => run_parse(&file, json),
        command => {
            let config = load_config(&cli.config_path, cli.log_level)?;
            let service = open_service(&config)?;
            run_command(&service, command).await
        }
    }
}

/// Load the configuration file, creating it with defaults when missing
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.save(config_path)?;
        config
    };

    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    config.validate().context("Configuration validation failed")?;

    if log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

fn open_service(config: &Config) -> Result<MarkingService<Repository>> {
    let repo = Repository::open(config.resolved_database_path()?)?;
    let cache = ParseCache::new(config.cache.enabled, config.cache.max_entries);
    Ok(MarkingService::new(Arc::new(repo), cache, config.marking.clone()))
}

fn run_parse(file: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {:?}", file))?;
    let result = parse(&text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", result.template_pretty());
    println!();
    for unit in &result.units {
        print_unit(unit);
    }
    Ok(())
}

async fn run_command(service: &MarkingService<Repository>, command: Commands) -> Result<()> {
    match command {
        Commands::Import { page, file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read file: {:?}", file))?;
            let outcome = service.import(&page, &text).await?;
            println!(
                "Saved '{}' as revision {}{}",
                page,
                outcome.revision,
                if outcome.ready { ", ready for translation" } else { "" }
            );
        }
        Commands::Mark { page, dry_run, no_fuzzy } => {
            let preview = service.preview(&page).await?;
            print_preview(&preview);

            if dry_run {
                return Ok(());
            }

            let outcome = service.commit(&preview, &no_fuzzy).await?;
            println!(
                "Marked '{}' at revision {}: {} unit(s)",
                outcome.document, outcome.revision, outcome.unit_count
            );
            if !outcome.fuzzy.is_empty() {
                println!("Translations to review: {:?}", outcome.fuzzy);
            }
        }
        Commands::Unmark { page } => {
            service.unmark(&page).await?;
            println!("'{}' is no longer translatable", page);
        }
        Commands::List => {
            print_pages(&service.list_pages().await?);
        }
        Commands::Parse { .. } | Commands::Completions { .. } => {}
    }
    Ok(())
}

fn print_unit(unit: &Unit) {
    println!("== Unit {} ({}) ==", unit.id, unit.kind);
    if let Some(previous) = &unit.previous_text {
        println!("--- old");
        println!("{}", previous);
        println!("+++ new");
    }
    println!("{}", unit.text);
    for issue in &unit.issues {
        let label = match issue.severity {
            Severity::Warning => "warning",
            Severity::Error => "ERROR",
        };
        println!("  [{}] {}", label, issue.code);
    }
    println!();
}

fn print_preview(preview: &MarkPreview) {
    println!("Page '{}' at revision {}", preview.document, preview.revision);
    println!();

    for unit in preview.units.iter().filter(|u| u.kind != UnitKind::Unchanged) {
        print_unit(unit);
    }
    for unit in &preview.deleted {
        print_unit(unit);
    }

    let unchanged = preview.units.iter().filter(|u| u.kind == UnitKind::Unchanged).count();
    println!(
        "{} unit(s), {} unchanged, {} deleted, {} error(s)",
        preview.units.len(),
        unchanged,
        preview.deleted.len(),
        preview.error_count()
    );
}

fn print_pages(pages: &ClassifiedPages<PageSummary>) {
    let groups = [
        ("Proposed", &pages.proposed),
        ("Active", &pages.active),
        ("Outdated", &pages.outdated),
        ("Broken", &pages.broken),
    ];

    for (title, group) in groups {
        println!("{} ({})", title, group.len());
        for page in group.iter() {
            println!("  {} (revision {}, {} unit(s))", page.name, page.head_revision, page.unit_count);
        }
    }
}
