//! Timeline CLI.
//!
//! # Responsibility
//! - Import journal text files through `timeline_core` and print the
//!   resulting events as JSON.
//! - Keep stdout machine-readable; warnings go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use timeline_core::{
    init_from_config, load_config, EventFilter, InMemoryEventRepository, Period, TimelineConfig,
    TimelineService,
};

#[derive(Parser, Debug)]
#[command(name = "timeline", about = "Journal import and timeline queries")]
struct Cli {
    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Absolute directory for rolling log files (overrides config).
    #[arg(long, global = true)]
    log_dir: Option<String>,
    /// trace|debug|info|warn|error (overrides config).
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a journal text file and print matching events.
    Import {
        file: PathBuf,
        #[arg(long)]
        year: Option<i32>,
        /// Canonical period name (e.g. `late-night`) or locale token.
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        text: Option<String>,
        /// Also write a full JSON snapshot of the imported store.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Print the distinct years present in a journal file.
    Years { file: PathBuf },
    /// Print the core version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_from_config(&config).context("failed to initialize logging")?;

    match cli.command {
        Command::Import {
            file,
            year,
            period,
            location,
            text,
            export,
        } => {
            let period = period.as_deref().map(parse_period).transpose()?;
            let service = import_file(&file, &config)?;
            let filter = EventFilter {
                year,
                period,
                location_contains: location,
                text,
                ..EventFilter::default()
            };
            let events = service.list(&filter);
            println!("{}", serde_json::to_string_pretty(&events)?);

            if let Some(path) = export {
                let snapshot = service.export_json()?;
                std::fs::write(&path, snapshot)
                    .with_context(|| format!("failed to write snapshot `{}`", path.display()))?;
            }
        }
        Command::Years { file } => {
            let service = import_file(&file, &config)?;
            println!("{}", serde_json::to_string(&service.available_years())?);
        }
        Command::Version => {
            println!("timeline_core version={}", timeline_core::core_version());
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<TimelineConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config `{}`", path.display()))?,
        None => TimelineConfig::default(),
    };
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir.clone();
    }
    if cli.log_level.is_some() {
        config.log_level = cli.log_level.clone();
    }
    Ok(config)
}

fn import_file(
    path: &Path,
    config: &TimelineConfig,
) -> Result<TimelineService<InMemoryEventRepository>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?;
    let mut service =
        TimelineService::with_config(InMemoryEventRepository::new(), config.import.clone());
    let report = service
        .import_bytes(&bytes)
        .with_context(|| format!("cannot import `{}`", path.display()))?;

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    for (draft, err) in &report.rejected {
        eprintln!("rejected event at {}: {err}", timeline_core::format_canonical_time(&draft.time));
    }
    log::info!(
        "event=cli_import module=cli status=ok inserted={}",
        report.inserted.len()
    );
    Ok(service)
}

fn parse_period(value: &str) -> Result<Period> {
    match Period::from_token(value) {
        Some(period) => Ok(period),
        None => bail!("unknown period `{value}`"),
    }
}
