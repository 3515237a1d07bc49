//! # Find Files Command Implementation
//!
//! Clones upstream if needed, then writes `<tag>-files.txt`: every path the
//! ingest's sources, tests and documentation ever had, oldest last change
//! first. The list is printed unless `--quiet` is given.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use ingest_modularize::error::Error;
use ingest_modularize::phases::filelist;
use ingest_modularize::phases::{PipelineOptions, Target};
use ingest_modularize::suggestions;

use super::pipeline::{run_target, UpstreamArgs};
use super::{load_settings, Context};

/// List every file an ingest ever had
#[derive(Args, Debug)]
pub struct FindFilesArgs {
    /// Ingest tag, e.g. `hpoa`
    #[arg(value_name = "TAG")]
    pub tag: String,

    /// Only list names seen in the ingest's current locations
    #[arg(long)]
    pub no_follow_renames: bool,

    /// Do not print the list
    #[arg(short, long)]
    pub quiet: bool,

    /// Also copy the list to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Rebuild the list even if it is up to date
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub upstream: UpstreamArgs,
}

/// Execute the `find-files` command.
pub fn execute(args: FindFilesArgs, context: &Context) -> Result<()> {
    let settings = load_settings(context, args.upstream.overrides())?;
    let options = PipelineOptions {
        force: args.force,
        follow_renames: !args.no_follow_renames,
        ..PipelineOptions::default()
    };

    match run_target(Target::FindFiles, &args.tag, &settings, &options) {
        Ok(_) => {}
        Err(e) if matches!(e.downcast_ref::<Error>(), Some(Error::MissingArtifact { .. })) => {
            return Err(suggestions::nothing_to_extract(&args.tag));
        }
        Err(e) => return Err(e),
    }

    let list = settings.workspace(&args.tag)?.file_list();
    let files = filelist::read_list(&list)?;

    if let Some(output) = &args.output {
        fs::copy(&list, output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }
    if !args.quiet {
        for file in &files {
            println!("{}", file);
        }
    }
    Ok(())
}
