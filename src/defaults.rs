//! Default values for ingest-modularize configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Clone URL of the upstream monorepo the ingests are extracted from.
pub const UPSTREAM_GIT: &str = "https://github.com/monarch-initiative/monarch-ingest.git";

/// Directory name of the local upstream clone inside the work directory.
pub const UPSTREAM_REPO: &str = "monarch-ingest";

/// Cruft/cookiecutter template used to scaffold the extracted project.
pub const COOKIECUTTER: &str = "https://github.com/monarch-initiative/monarch-ingest-template";

/// Cookiecutter context variable that receives the ingest tag.
pub const TEMPLATE_CONTEXT_KEY: &str = "project_name";

/// Branch created in the scaffolded project.
pub const DEFAULT_BRANCH: &str = "main";

/// Name of the optional configuration file.
pub const CONFIG_FILE: &str = ".modularize.yaml";

/// Returns the default work directory: the current directory.
///
/// Every artifact (the upstream clone, file lists, filtered clones and
/// scaffolds) is created below this directory, mirroring a Makefile run
/// from the directory it lives in.
pub fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Returns the directory where user-wide configuration may live.
///
/// - Linux: `~/.config/ingest-modularize`
/// - macOS: `~/Library/Application Support/ingest-modularize`
///
/// Falls back to `.ingest-modularize` in the current directory if the
/// platform directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".ingest-modularize"))
        .join("ingest-modularize")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_config_dir_ends_with_crate_name() {
        let dir = user_config_dir();
        assert!(dir.ends_with("ingest-modularize"));
    }

    #[test]
    fn test_default_work_dir_is_current_dir() {
        assert_eq!(default_work_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_upstream_defaults_agree() {
        assert!(UPSTREAM_GIT.ends_with(&format!("{}.git", UPSTREAM_REPO)));
    }
}
