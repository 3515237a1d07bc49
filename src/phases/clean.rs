//! `clean`: remove the artifacts of one tag.

use std::fs;
use std::path::PathBuf;

use log::info;

use crate::config::Workspace;
use crate::error::Result;

/// Remove the file list, history clone and scaffold of `workspace.tag`.
///
/// With `all`, the shared upstream clone goes too. Artifacts that do not
/// exist are skipped. Returns the paths that were removed.
pub fn clean(workspace: &Workspace, all: bool) -> Result<Vec<PathBuf>> {
    let mut candidates = vec![
        workspace.file_list(),
        workspace.history_dir(),
        workspace.template_dir(),
    ];
    if all {
        candidates.push(workspace.upstream_dir.clone());
    }

    let mut removed = Vec::new();
    for path in candidates {
        // symlink_metadata so a dangling link is removed rather than followed
        let Ok(metadata) = fs::symlink_metadata(&path) else {
            continue;
        };
        if metadata.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        info!("Removed {}", path.display());
        removed.push(path);
    }
    Ok(removed)
}
