//! `clone-upstream`: the local clone of the upstream monorepo.
//!
//! The clone is shared by every tag and is only ever made once; `clean
//! --all` removes it.

use log::info;

use super::Outcome;
use crate::config::Settings;
use crate::error::Result;
use crate::git;

/// Clone `settings.upstream_git` into the upstream directory unless a
/// checkout is already there.
pub fn ensure_clone(settings: &Settings) -> Result<Outcome> {
    let dir = settings.upstream_dir();
    if git::is_repository(&dir) {
        info!("Upstream clone {} already present", dir.display());
        return Ok(Outcome::UpToDate);
    }

    info!("Cloning {} into {}", settings.upstream_git, dir.display());
    git::clone(&settings.upstream_git, &dir)?;
    Ok(Outcome::Built)
}
