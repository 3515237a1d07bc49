//! `import-commits`: splice the filtered history into the new project.

use std::fs;

use log::{info, warn};

use super::template::find_project;
use super::{Outcome, PipelineOptions};
use crate::config::{Settings, Workspace};
use crate::error::{Error, Result};
use crate::git;

/// Name of the temporary remote pointing at the history clone.
pub const HISTORY_REMOTE: &str = "history";

/// Merge the history clone's branch into the project.
///
/// The history shares no commits with the scaffold, so the merge allows
/// unrelated histories. Skipped when the history's head is already part of
/// the project. The temporary remote is removed even if the merge fails.
pub fn import_commits(
    settings: &Settings,
    workspace: &Workspace,
    options: &PipelineOptions,
) -> Result<Outcome> {
    let history = workspace.history_dir();
    if !git::is_repository(&history) {
        return Err(Error::MissingArtifact {
            artifact: history.display().to_string(),
            hint: Some("Run the create-history target first".to_string()),
        });
    }
    let project = find_project(&workspace.template_dir())?.ok_or_else(|| {
        Error::MissingArtifact {
            artifact: workspace.template_dir().display().to_string(),
            hint: Some("Run the setup-template target first".to_string()),
        }
    })?;

    let history_head = git::rev_parse(&history, "HEAD")?;
    if !options.force && git::is_ancestor(&project, &history_head, "HEAD")? {
        info!("History of '{}' already imported", workspace.tag);
        return Ok(Outcome::UpToDate);
    }

    let branch = git::current_branch(&history)?;
    if git::remotes(&project)?.iter().any(|r| r == HISTORY_REMOTE) {
        warn!("Replacing leftover '{}' remote", HISTORY_REMOTE);
        git::remote_remove(&project, HISTORY_REMOTE)?;
    }
    git::remote_add(&project, HISTORY_REMOTE, &fs::canonicalize(&history)?)?;

    let message = format!(
        "Import history of {} from {}",
        workspace.tag, settings.upstream_repo
    );
    let merged = git::fetch(&project, HISTORY_REMOTE).and_then(|()| {
        git::merge_unrelated(
            &project,
            &format!("{}/{}", HISTORY_REMOTE, branch),
            &message,
        )
    });
    let removed = git::remote_remove(&project, HISTORY_REMOTE);

    merged?;
    removed?;
    info!("Imported history of '{}' into {}", workspace.tag, project.display());
    Ok(Outcome::Built)
}
