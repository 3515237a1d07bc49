//! `create-history`: a clone of upstream filtered down to one ingest.

use std::fs;

use log::info;

use super::{is_up_to_date, Outcome, PipelineOptions};
use crate::config::Workspace;
use crate::error::{Error, Result};
use crate::{git, tools};

/// Clone the upstream checkout into `<tag>-history` and run
/// `git filter-repo` on it with the file list.
///
/// An existing history clone newer than the file list is kept.
pub fn create_history(workspace: &Workspace, options: &PipelineOptions) -> Result<Outcome> {
    let list = workspace.file_list();
    let history = workspace.history_dir();

    if !list.is_file() {
        return Err(Error::MissingArtifact {
            artifact: list.display().to_string(),
            hint: Some("Run the find-files target first".to_string()),
        });
    }
    if !git::is_repository(&workspace.upstream_dir) {
        return Err(Error::MissingArtifact {
            artifact: workspace.upstream_dir.display().to_string(),
            hint: Some("Run the clone-upstream target first".to_string()),
        });
    }

    if !options.force && git::is_repository(&history) && is_up_to_date(&history, &[&list]) {
        return Ok(Outcome::UpToDate);
    }

    if history.exists() {
        info!("Removing stale {}", history.display());
        fs::remove_dir_all(&history)?;
    }

    info!(
        "Cloning {} into {}",
        workspace.upstream_dir.display(),
        history.display()
    );
    git::clone_no_local(&workspace.upstream_dir, &history)?;

    // filter-repo runs inside the clone, so the list needs an absolute path
    let list = fs::canonicalize(&list)?;
    info!("Filtering {} to the paths in {}", history.display(), list.display());
    tools::filter_repo(&history, &list)?;

    Ok(Outcome::Built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tempfile::TempDir;

    fn workspace(temp: &TempDir) -> Workspace {
        Settings {
            work_dir: temp.path().to_path_buf(),
            ..Settings::default()
        }
        .workspace("hpoa")
        .unwrap()
    }

    #[test]
    fn test_requires_file_list() {
        let temp = TempDir::new().unwrap();
        let err = create_history(&workspace(&temp), &PipelineOptions::default()).unwrap_err();
        match err {
            Error::MissingArtifact { artifact, .. } => assert!(artifact.ends_with("hpoa-files.txt")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_requires_upstream_clone() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        fs::write(ws.file_list(), "a.py\n").unwrap();
        let err = create_history(&ws, &PipelineOptions::default()).unwrap_err();
        assert!(err.to_string().contains("clone-upstream"));
    }

    #[test]
    fn test_current_history_is_kept() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        fs::create_dir_all(ws.upstream_dir.join(".git")).unwrap();
        fs::write(ws.file_list(), "a.py\n").unwrap();
        fs::create_dir_all(ws.history_dir().join(".git")).unwrap();
        // touch the history directory after the list
        fs::write(ws.history_dir().join("marker"), "").unwrap();

        let outcome = create_history(&ws, &PipelineOptions::default()).unwrap();
        assert_eq!(outcome, Outcome::UpToDate);
    }
}
