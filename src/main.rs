use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::PathBuf;

use trainload::export::{self, ExportFormat};
use trainload::logging::{self, LogFormat};
use trainload::{AppConfig, CsvActivitySource, Pipeline, RecordSource};

/// trainload - Monthly Training Load Summaries
///
/// Turns an exercise activity export into per-month distance, duration and
/// base/fast run pace and heart-rate averages.
#[derive(Parser)]
#[command(name = "trainload")]
#[command(version)]
#[command(about = "Monthly training load summaries", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize an activity export by calendar month
    Summarize {
        /// Activity export (CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (csv, json, text, chart); inferred from the output extension
        #[arg(short = 'f', long)]
        format: Option<ExportFormat>,

        /// Only report months from the month of this date onward (YYYY-MM-DD)
        #[arg(short, long)]
        since: Option<NaiveDate>,

        /// Base zone heart rate ceiling in bpm
        #[arg(short, long)]
        threshold: Option<u16>,

        /// Aggregate months in parallel
        #[arg(short, long)]
        parallel: bool,
    },

    /// Show or create the configuration file
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_file(path),
        None => Ok(AppConfig::load_or_default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    let mut log_config = config.logging.clone().with_verbosity(cli.verbose);
    if let Some(format) = cli.log_format {
        log_config.format = format;
    }
    logging::init_logging(&log_config)?;

    match cli.command {
        Commands::Summarize {
            input,
            output,
            format,
            since,
            threshold,
            parallel,
        } => {
            if let Some(threshold) = threshold {
                config.zones.base_zone_max_hr = threshold;
            }
            if since.is_some() {
                config.export.since = since;
            }
            config.aggregation.parallel |= parallel;
            config.validate()?;

            let source = CsvActivitySource::new(&input)
                .with_activity_types(config.import.activity_filter());
            let pipeline = Pipeline::from_config(&config);

            eprintln!(
                "{}",
                format!("Summarizing {}...", source.source_name()).green().bold()
            );

            let aggregates = pipeline.run_source(&source).map_err(|e| {
                eprintln!("{}", e.user_message().red());
                e
            })?;

            let format = format
                .or_else(|| output.as_deref().and_then(ExportFormat::from_path))
                .unwrap_or(ExportFormat::Text);
            let sink = export::sink_for(format, config.export.decimal_places)?;

            match output {
                Some(path) => {
                    export::export_to_path(sink.as_ref(), &aggregates, &path)
                        .with_context(|| format!("Failed to export to {}", path.display()))?;
                    eprintln!(
                        "{}",
                        format!("✓ {} months written to {}", aggregates.len(), path.display())
                            .green()
                    );
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    sink.write_to(&aggregates, &mut handle)?;
                    handle.flush()?;
                }
            }
        }

        Commands::Config { show, init } => {
            let path = cli.config.unwrap_or_else(AppConfig::default_config_path);

            if init {
                if path.exists() {
                    anyhow::bail!("Config file already exists: {}", path.display());
                }
                AppConfig::default().save_to_file(&path)?;
                println!("{}", format!("✓ Wrote {}", path.display()).green());
            }

            if show || !init {
                let toml = toml::to_string_pretty(&config)
                    .context("Failed to serialize configuration")?;
                println!("{}", format!("# {}", path.display()).dimmed());
                println!("{}", toml);
            }
        }
    }

    Ok(())
}
