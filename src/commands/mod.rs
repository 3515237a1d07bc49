//! # CLI Command Implementations
//!
//! Each subcommand of `ingest-modularize` lives in its own file with an
//! `Args` struct derived with `clap` and an `execute` function that calls
//! into the `ingest_modularize` library.
//!
//! The pipeline commands (`find-files`, `create-history`, `setup-template`,
//! `import-commits`, `clean`) share settings loading and progress output,
//! which live here and in [`pipeline`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use ingest_modularize::config::{self, Overrides, Settings};
use ingest_modularize::output::{emoji, OutputConfig};
use ingest_modularize::phases::orchestrator::Report;
use ingest_modularize::phases::Outcome;
use ingest_modularize::suggestions;

pub mod check_filter_repo;
pub mod clean;
pub mod completions;
pub mod document;
pub mod find_files;
pub mod migrate_koza;
pub mod pipeline;

/// Global flags every command can see.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub color: String,
    pub config: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
}

impl Context {
    pub fn output(&self) -> OutputConfig {
        OutputConfig::from_env_and_flag(&self.color)
    }
}

/// Resolve settings: file (explicit or discovered), then `overrides`, then
/// `--work-dir`.
pub fn load_settings(context: &Context, mut overrides: Overrides) -> Result<Settings> {
    let base = match &context.config {
        Some(path) if !path.exists() => return Err(suggestions::config_not_found(path)),
        Some(path) => config::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => match config::discover() {
            Some(path) => {
                debug!("Using settings from {}", path.display());
                config::from_file(&path)
                    .with_context(|| format!("Failed to load settings from {}", path.display()))?
            }
            None => Settings::default(),
        },
    };

    if overrides.work_dir.is_none() {
        overrides.work_dir = context.work_dir.clone();
    }
    Ok(base.apply_overrides(overrides))
}

/// A spinner on stderr, hidden when stderr is not a terminal.
pub fn spinner() -> ProgressBar {
    if !console::Term::stderr().is_term() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Print one line per step of a pipeline run.
pub fn print_report(out: &OutputConfig, report: &Report) {
    for (target, outcome) in &report.steps {
        match outcome {
            Outcome::Built => println!("{} {}", emoji(out, "✅", "[OK]"), target),
            Outcome::UpToDate => {
                println!("{} {} (up to date)", emoji(out, "⏭️", "[SKIP]"), target)
            }
        }
    }
}
