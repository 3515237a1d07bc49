//! Shared test utilities for the E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(scripts::SETTINGS);
//!     fixture.command().arg("clean").arg("hpoa").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::scripts;
    pub use super::TestFixture;
}

/// Python sources and settings used across tests.
#[allow(dead_code)]
pub mod scripts {
    /// Settings file pointing the upstream clone at `mi`.
    pub const SETTINGS: &str = "upstream_repo: mi\ndefault_branch: main\n";

    /// An old-style Koza transform.
    pub const KOZA_TRANSFORM: &str = r#"from koza.cli_utils import get_koza_app

koza_app = get_koza_app("hpoa")
genes = koza_app.get_map("genes")

while (row := koza_app.get_row()) is not None:
    gene_id = genes.get(row["id"])
    koza_app.write(Gene(id=gene_id, name=row["name"]))
"#;

    /// `KOZA_TRANSFORM` after migration.
    pub const KOZA_MIGRATED: &str = r#"
def transform_record(koza: Koza, record: dict[str, Any]):
    gene_id = koza.lookup(record["id"], "genes")
    koza.write(Gene(id=gene_id, name=record["name"]))
"#;

    /// A transform with one documented Biolink class.
    pub const DOCUMENTED_TRANSFORM: &str = r#"from biolink_model.datamodel.pydanticmodel_v2 import Gene

while (row := koza_app.get_row()) is not None:
    # !DocumentClass
    gene = Gene(
        id=row["GeneID"],
        # note: uppercased symbol
        name=row["Symbol"].upper(),
        category=["biolink:Gene"],
    )
"#;
}

/// A temporary working directory for one test.
///
/// Commands created with [`TestFixture::command`] run inside it, so a
/// `.modularize.yaml` written with [`TestFixture::with_config`] is picked up
/// by discovery and all artifacts land in it.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.modularize.yaml` settings file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".modularize.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add an empty directory.
    #[allow(dead_code)]
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// Upstream settings from the caller's environment are removed so
    /// they cannot leak into the test.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ingest-modularize");
        cmd.current_dir(self.path())
            .env_remove("MONARCH_INGEST_COOKIECUTTER")
            .env_remove("MONARCH_INGEST_REPO")
            .env_remove("MONARCH_INGEST_GIT")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Create a git repository under `dir` with one commit per entry of
    /// `commits`, each writing the given files. Returns its path.
    #[allow(dead_code)]
    pub fn with_upstream(&self, dir: &str, commits: &[&[(&str, &str)]]) -> PathBuf {
        let root = self.path().join(dir);
        std::fs::create_dir_all(&root).expect("Failed to create upstream directory");
        git(&root, &["init", "--quiet", "--initial-branch", "main"]);
        for (i, files) in commits.iter().enumerate() {
            for (path, content) in *files {
                let file = root.join(path);
                if let Some(parent) = file.parent() {
                    std::fs::create_dir_all(parent).expect("Failed to create parent directory");
                }
                std::fs::write(&file, content).expect("Failed to write upstream file");
            }
            git(&root, &["add", "--all"]);
            // distinct, increasing commit dates keep the order deterministic
            let date = format!("2024-01-0{}T12:00:00+00:00", i + 1);
            let status = Command::new("git")
                .current_dir(&root)
                .args(["commit", "--quiet", "-m", &format!("commit {}", i + 1)])
                .env("GIT_AUTHOR_DATE", &date)
                .env("GIT_COMMITTER_DATE", &date)
                .envs(identity())
                .status()
                .expect("Failed to run git commit");
            assert!(status.success(), "git commit failed");
        }
        root
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn identity() -> [(&'static str, &'static str); 4] {
    [
        ("GIT_AUTHOR_NAME", "Test"),
        ("GIT_AUTHOR_EMAIL", "test@example.com"),
        ("GIT_COMMITTER_NAME", "Test"),
        ("GIT_COMMITTER_EMAIL", "test@example.com"),
    ]
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .current_dir(dir)
        .args(args)
        .envs(identity())
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config(scripts::SETTINGS);
        assert!(fixture.path().join(".modularize.yaml").exists());
    }

    #[test]
    fn test_settings_are_valid_yaml() {
        serde_yaml::from_str::<serde_yaml::Value>(scripts::SETTINGS)
            .expect("Settings should be valid YAML");
    }
}
