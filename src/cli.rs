//! CLI argument parsing and command dispatch

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands;
use ingest_modularize::phases::Target;
use ingest_modularize::suggestions;

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Ingest Modularize - Extract a Monarch ingest into its own repository
#[derive(Parser, Debug)]
#[command(name = "ingest-modularize")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Settings file (defaults to .modularize.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the pipeline creates its artifacts in
    #[arg(long, global = true, value_name = "DIR")]
    work_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that git filter-repo is installed
    CheckFilterRepo,

    /// List every file an ingest ever had in the upstream repository
    FindFiles(commands::find_files::FindFilesArgs),

    /// Create a clone of upstream filtered to the ingest's history
    CreateHistory(commands::pipeline::PipelineArgs),

    /// Scaffold the new ingest project from the template
    SetupTemplate(commands::pipeline::PipelineArgs),

    /// Merge the ingest's history into the new project
    ImportCommits(commands::pipeline::PipelineArgs),

    /// Remove the artifacts created for an ingest
    Clean(commands::clean::CleanArgs),

    /// Rewrite Koza transforms to the transform_record API
    MigrateKoza(commands::migrate_koza::MigrateKozaArgs),

    /// Document the Biolink classes a transform creates
    Document(commands::document::DocumentArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Parse a `--log-level` value, suggesting the closest level on a typo.
fn parse_log_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level).map_err(|_| {
        let hint = suggestions::did_you_mean(&level.to_lowercase(), LOG_LEVELS)
            .unwrap_or_else(|| format!("Valid levels: {}", LOG_LEVELS.join(", ")));
        anyhow!("Invalid log level '{}'\n\nhint: {}", level, hint)
    })
}

fn init_logging(level: LevelFilter) {
    // RUST_LOG directives refine the flag; a second init (in tests) is harmless.
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(parse_log_level(&self.log_level)?);

        let context = commands::Context {
            color: self.color,
            config: self.config,
            work_dir: self.work_dir,
        };

        match self.command {
            Commands::CheckFilterRepo => commands::check_filter_repo::execute(&context),
            Commands::FindFiles(args) => commands::find_files::execute(args, &context),
            Commands::CreateHistory(args) => {
                commands::pipeline::execute(Target::CreateHistory, args, &context)
            }
            Commands::SetupTemplate(args) => {
                commands::pipeline::execute(Target::SetupTemplate, args, &context)
            }
            Commands::ImportCommits(args) => {
                commands::pipeline::execute(Target::ImportCommits, args, &context)
            }
            Commands::Clean(args) => commands::clean::execute(args, &context),
            Commands::MigrateKoza(args) => commands::migrate_koza::execute(args),
            Commands::Document(args) => commands::document::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
