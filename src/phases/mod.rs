//! The extraction pipeline, one module per target.
//!
//! ## Overview
//!
//! Extracting an ingest runs these targets, each producing an artifact the
//! next one consumes:
//!
//! 1. `check-filter-repo` - make sure `git filter-repo` is installed
//! 2. `clone-upstream` - clone the upstream monorepo (once)
//! 3. `find-files` - write `<tag>-files.txt`, every path the ingest ever had
//! 4. `create-history` - clone upstream again and filter it to those paths
//! 5. `setup-template` - scaffold the new project with cruft and commit it
//! 6. `import-commits` - merge the filtered history into the new project
//!
//! `clean` removes the per-tag artifacts again.
//!
//! Like `make`, a target whose artifact exists and is newer than its inputs
//! is skipped, and the first failure stops the run. The
//! [`orchestrator`] resolves prerequisites and runs targets in order.

use std::fmt;
use std::fs;
use std::path::Path;

pub mod clean;
pub mod filelist;
pub mod history;
pub mod import;
pub mod orchestrator;
pub mod template;
pub mod upstream;

/// A buildable step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    CheckFilterRepo,
    CloneUpstream,
    FindFiles,
    CreateHistory,
    SetupTemplate,
    ImportCommits,
    Clean,
}

impl Target {
    /// Name as used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Target::CheckFilterRepo => "check-filter-repo",
            Target::CloneUpstream => "clone-upstream",
            Target::FindFiles => "find-files",
            Target::CreateHistory => "create-history",
            Target::SetupTemplate => "setup-template",
            Target::ImportCommits => "import-commits",
            Target::Clean => "clean",
        }
    }

    /// Targets that must be built before this one.
    pub fn prerequisites(self) -> &'static [Target] {
        match self {
            Target::CheckFilterRepo | Target::CloneUpstream | Target::SetupTemplate => &[],
            Target::FindFiles => &[Target::CloneUpstream],
            Target::CreateHistory => &[Target::CheckFilterRepo, Target::FindFiles],
            Target::ImportCommits => &[Target::CreateHistory, Target::SetupTemplate],
            Target::Clean => &[],
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What running a target did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The artifact was (re)built.
    Built,
    /// The artifact already existed and was current.
    UpToDate,
}

/// Knobs shared by every target of a run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Rebuild artifacts even when they look current.
    pub force: bool,
    /// Trace ingest files back through renames when listing them.
    pub follow_renames: bool,
    /// Let `clean` remove the upstream clone as well.
    pub clean_all: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            force: false,
            follow_renames: true,
            clean_all: false,
        }
    }
}

/// Whether `output` exists and is at least as new as every existing input.
///
/// Inputs that do not exist are ignored; they are produced by prerequisites.
pub fn is_up_to_date(output: &Path, inputs: &[&Path]) -> bool {
    let Ok(built) = fs::metadata(output).and_then(|m| m.modified()) else {
        return false;
    };
    inputs
        .iter()
        .all(|input| match fs::metadata(input).and_then(|m| m.modified()) {
            Ok(changed) => changed <= built,
            Err(_) => true,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(path: &Path, when: SystemTime) {
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .unwrap();
        file.set_modified(when).unwrap();
    }

    #[test]
    fn test_missing_output_is_stale() {
        let temp = TempDir::new().unwrap();
        assert!(!is_up_to_date(&temp.path().join("out.txt"), &[]));
    }

    #[test]
    fn test_newer_output_is_current() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.txt");
        let output = temp.path().join("out.txt");
        let now = SystemTime::now();
        touch(&input, now - Duration::from_secs(60));
        touch(&output, now);
        assert!(is_up_to_date(&output, &[&input]));
    }

    #[test]
    fn test_older_output_is_stale() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.txt");
        let output = temp.path().join("out.txt");
        let now = SystemTime::now();
        touch(&output, now - Duration::from_secs(60));
        touch(&input, now);
        assert!(!is_up_to_date(&output, &[&input]));
    }

    #[test]
    fn test_missing_input_is_ignored() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.txt");
        touch(&output, SystemTime::now());
        assert!(is_up_to_date(&output, &[&temp.path().join("gone.txt")]));
    }

    const TARGETS: [Target; 7] = [
        Target::CheckFilterRepo,
        Target::CloneUpstream,
        Target::FindFiles,
        Target::CreateHistory,
        Target::SetupTemplate,
        Target::ImportCommits,
        Target::Clean,
    ];

    #[test]
    fn test_display_uses_command_name() {
        assert_eq!(Target::ImportCommits.to_string(), "import-commits");
        assert_eq!(Target::CheckFilterRepo.to_string(), "check-filter-repo");
    }

    #[test]
    fn test_prerequisites_never_include_clean() {
        for target in TARGETS {
            assert!(!target.prerequisites().contains(&Target::Clean));
        }
    }
}
