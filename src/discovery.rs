//! # Ingest File Discovery
//!
//! Works out every path an ingest has ever occupied in the upstream
//! repository, so that `git filter-repo` can keep all of its history.
//!
//! An ingest lives in three places:
//!
//! - `src/monarch_ingest/ingests/<tag>/` (the transform code),
//! - `tests/unit/<tag>/` (its tests),
//! - `docs/Sources/<tag>.md` (its documentation page).
//!
//! Discovery first collects every file name that shows up in commits
//! touching those places, then (optionally) follows each of those files
//! back through renames. The result is ordered by the date each name was
//! last modified, oldest first.

use std::collections::BTreeSet;

use log::{debug, info};
use rayon::prelude::*;

use crate::error::Result;
use crate::repository::UpstreamRepository;

/// The three locations of an ingest, relative to the upstream root.
pub fn ingest_paths(tag: &str) -> [String; 3] {
    [
        format!("src/monarch_ingest/ingests/{}", tag),
        format!("tests/unit/{}", tag),
        format!("docs/Sources/{}.md", tag),
    ]
}

/// Every file name that appears in a commit touching `path`.
pub fn find_git_files(repo: &UpstreamRepository, path: &str) -> Result<BTreeSet<String>> {
    let names = repo.names_touching(path)?;
    debug!("{} names in commits touching {}", names.len(), path);
    Ok(names)
}

/// All past names of `files`, following renames, oldest modification first.
///
/// Each file's rename history is queried in parallel. Names that share a
/// last-modified date are ordered alphabetically.
pub fn filename_history(repo: &UpstreamRepository, files: &[String]) -> Result<Vec<String>> {
    let histories = files
        .par_iter()
        .map(|file| repo.names_following(file))
        .collect::<Result<Vec<_>>>()?;

    let past_names: BTreeSet<String> = histories.into_iter().flatten().collect();

    let mut dated = past_names
        .into_par_iter()
        .map(|name| Ok((repo.last_modified(&name)?, name)))
        .collect::<Result<Vec<(String, String)>>>()?;
    dated.sort();

    Ok(dated.into_iter().map(|(_, name)| name).collect())
}

/// Find every historical file name of the ingest `tag`.
///
/// With `follow_renames`, names are traced back through renames and ordered
/// by last modification; without it, the names seen in the ingest's
/// locations are returned sorted alphabetically. An ingest that never
/// existed yields an empty list.
pub fn most_recent_files(
    repo: &UpstreamRepository,
    tag: &str,
    follow_renames: bool,
) -> Result<Vec<String>> {
    let mut last_known: BTreeSet<String> = BTreeSet::new();
    for path in ingest_paths(tag) {
        last_known.extend(find_git_files(repo, &path)?);
    }
    info!(
        "Found {} file names in the history of ingest '{}'",
        last_known.len(),
        tag
    );

    if follow_renames {
        let files: Vec<String> = last_known.into_iter().collect();
        filename_history(repo, &files)
    } else {
        Ok(last_known.into_iter().collect())
    }
}
