//! Orchestrator for pipeline runs
//!
//! Resolves a target's prerequisites into an ordered plan and runs it one
//! step at a time, stopping at the first failure.

use log::info;

use super::{clean, filelist, history, import, template, upstream};
use super::{Outcome, PipelineOptions, Target};
use crate::config::{Settings, Workspace};
use crate::error::Result;
use crate::tools;

/// What a run did, step by step.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub steps: Vec<(Target, Outcome)>,
}

impl Report {
    /// Targets that were actually rebuilt.
    pub fn built(&self) -> Vec<Target> {
        self.steps
            .iter()
            .filter(|(_, outcome)| *outcome == Outcome::Built)
            .map(|(target, _)| *target)
            .collect()
    }
}

/// The targets to run for `target`, prerequisites first, each once.
pub fn plan(target: Target) -> Vec<Target> {
    fn visit(target: Target, order: &mut Vec<Target>) {
        for prerequisite in target.prerequisites() {
            visit(*prerequisite, order);
        }
        if !order.contains(&target) {
            order.push(target);
        }
    }

    let mut order = Vec::new();
    visit(target, &mut order);
    order
}

/// Run a single target, assuming its prerequisites are in place.
pub fn run_step(
    target: Target,
    settings: &Settings,
    workspace: &Workspace,
    options: &PipelineOptions,
) -> Result<Outcome> {
    match target {
        Target::CheckFilterRepo => {
            let version = tools::check_filter_repo()?;
            info!("git filter-repo {}", version);
            Ok(Outcome::UpToDate)
        }
        Target::CloneUpstream => upstream::ensure_clone(settings),
        Target::FindFiles => filelist::write_file_list(workspace, options),
        Target::CreateHistory => history::create_history(workspace, options),
        Target::SetupTemplate => template::setup_template(settings, workspace, options),
        Target::ImportCommits => import::import_commits(settings, workspace, options),
        Target::Clean => {
            clean::clean(workspace, options.clean_all)?;
            Ok(Outcome::Built)
        }
    }
}

/// Build `target` and everything it depends on for the ingest `tag`.
///
/// `on_step` is called before each step starts, so callers can show
/// progress.
pub fn run<F>(
    target: Target,
    tag: &str,
    settings: &Settings,
    options: &PipelineOptions,
    mut on_step: F,
) -> Result<Report>
where
    F: FnMut(Target),
{
    let workspace = settings.workspace(tag)?;
    let mut report = Report::default();

    for step in plan(target) {
        on_step(step);
        info!("Running target {} for '{}'", step, tag);
        let outcome = run_step(step, settings, &workspace, options)?;
        report.steps.push((step, outcome));
    }

    Ok(report)
}
