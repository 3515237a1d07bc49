//! `find-files`: write `<tag>-files.txt`.

use std::fs;
use std::path::Path;

use log::info;

use super::{is_up_to_date, Outcome, PipelineOptions};
use crate::config::Workspace;
use crate::discovery;
use crate::error::{Error, Result};
use crate::repository::UpstreamRepository;

/// Discover the ingest's files in the upstream clone and write the list.
///
/// Skipped when the list is newer than the upstream clone. An ingest with
/// no history at all is an error: there would be nothing to extract.
pub fn write_file_list(workspace: &Workspace, options: &PipelineOptions) -> Result<Outcome> {
    let list = workspace.file_list();
    let upstream_git_dir = workspace.upstream_dir.join(".git");
    if !options.force && is_up_to_date(&list, &[&upstream_git_dir]) {
        return Ok(Outcome::UpToDate);
    }

    let repo = UpstreamRepository::new(&workspace.upstream_dir);
    let files = discovery::most_recent_files(&repo, &workspace.tag, options.follow_renames)?;
    if files.is_empty() {
        return Err(Error::MissingArtifact {
            artifact: format!("history for ingest '{}'", workspace.tag),
            hint: Some(format!(
                "No commit in {} touches src/monarch_ingest/ingests/{}",
                workspace.upstream_dir.display(),
                workspace.tag
            )),
        });
    }

    write_list(&list, &files)?;
    info!("Wrote {} paths to {}", files.len(), list.display());
    Ok(Outcome::Built)
}

/// Write one path per line.
pub fn write_list(path: &Path, files: &[String]) -> Result<()> {
    let mut content = files.join("\n");
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}

/// Read a file list back, ignoring blank lines.
pub fn read_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::MissingArtifact {
            artifact: path.display().to_string(),
            hint: Some("Run the find-files target first".to_string()),
        },
        _ => Error::Io(e),
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}
