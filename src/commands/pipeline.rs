//! Shared arguments and execution for the pipeline commands
//!
//! `create-history`, `setup-template` and `import-commits` all run a
//! target of the extraction pipeline, and every prerequisite it needs, for
//! one ingest tag.

use anyhow::Result;
use clap::Args;

use ingest_modularize::config::{Overrides, Settings};
use ingest_modularize::phases::orchestrator::{self, Report};
use ingest_modularize::phases::{PipelineOptions, Target};

use super::{load_settings, print_report, spinner, Context};

/// Where the upstream repository and the template come from
#[derive(Args, Debug, Clone, Default)]
pub struct UpstreamArgs {
    /// Cookiecutter template used for the new project
    #[arg(long, value_name = "TEMPLATE", env = "MONARCH_INGEST_COOKIECUTTER")]
    pub cookiecutter: Option<String>,

    /// Directory name of the local upstream clone
    #[arg(long, value_name = "DIR", env = "MONARCH_INGEST_REPO")]
    pub upstream_repo: Option<String>,

    /// URL of the upstream repository
    #[arg(long, value_name = "URL", env = "MONARCH_INGEST_GIT")]
    pub upstream_git: Option<String>,
}

impl UpstreamArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            cookiecutter: self.cookiecutter.clone(),
            upstream_repo: self.upstream_repo.clone(),
            upstream_git: self.upstream_git.clone(),
            work_dir: None,
        }
    }
}

/// Arguments shared by the pipeline commands
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Ingest tag, e.g. `hpoa`
    #[arg(value_name = "TAG")]
    pub tag: String,

    /// Rebuild artifacts even if they are up to date
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub upstream: UpstreamArgs,
}

/// Run `target` for `tag` with a spinner naming the current step.
pub fn run_target(
    target: Target,
    tag: &str,
    settings: &Settings,
    options: &PipelineOptions,
) -> Result<Report> {
    let bar = spinner();
    let result = orchestrator::run(target, tag, settings, options, |step| {
        bar.set_message(format!("{} {}", step, tag));
    });
    bar.finish_and_clear();
    Ok(result?)
}

/// Execute a pipeline command.
pub fn execute(target: Target, args: PipelineArgs, context: &Context) -> Result<()> {
    let out = context.output();
    let settings = load_settings(context, args.upstream.overrides())?;
    let options = PipelineOptions {
        force: args.force,
        ..PipelineOptions::default()
    };

    let report = run_target(target, &args.tag, &settings, &options)?;
    print_report(&out, &report);
    Ok(())
}
