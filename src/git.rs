//! Wrappers around the system `git` command.
//!
//! Every function here spawns `git`, waits for it, and maps a failure to
//! [`Error::GitCommand`] (or [`Error::GitClone`] for clones) carrying the
//! command line and git's stderr. Using the system binary means SSH keys,
//! credential helpers and `~/.gitconfig` all behave as they do in a shell.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::{Error, Result};

fn describe(args: &[&OsStr]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn spawn(repo: &Path, args: &[&OsStr]) -> Result<Output> {
    debug!("git {} (in {})", describe(args), repo.display());
    Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .map_err(|e| Error::GitCommand {
            command: describe(args),
            repo: repo.display().to_string(),
            stderr: e.to_string(),
        })
}

/// Run `git <args>` inside `repo` and return its stdout.
pub fn run<S: AsRef<OsStr>>(repo: &Path, args: &[S]) -> Result<String> {
    let args: Vec<&OsStr> = args.iter().map(AsRef::as_ref).collect();
    let output = spawn(repo, &args)?;
    if !output.status.success() {
        return Err(Error::GitCommand {
            command: describe(&args),
            repo: repo.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run `git <args>` inside `repo` and report whether it exited with 0.
///
/// Used for predicates such as `merge-base --is-ancestor`, where a
/// non-zero exit is an answer rather than a failure.
pub fn succeeds<S: AsRef<OsStr>>(repo: &Path, args: &[S]) -> Result<bool> {
    let args: Vec<&OsStr> = args.iter().map(AsRef::as_ref).collect();
    Ok(spawn(repo, &args)?.status.success())
}

fn clone_with(url: &str, target_dir: &Path, extra: &[&str]) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    debug!("git clone {} {} {}", extra.join(" "), url, target_dir.display());
    let output = Command::new("git")
        .arg("clone")
        .args(extra)
        .arg(url)
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
            hint: None,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Provide helpful error message for common auth failures
        let hint = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            Some(
                "Make sure you have access to the repository \
                 (SSH key in ssh-agent, credential helper, or access token)"
                    .to_string(),
            )
        } else {
            None
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            message: stderr.trim().to_string(),
            hint,
        });
    }

    Ok(())
}

/// Clone `url` into `target_dir` with full history.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    clone_with(url, target_dir, &[])
}

/// Clone a local repository without hardlinking its objects.
///
/// `git filter-repo` only rewrites what it considers a fresh clone, and a
/// `--no-local` clone never shares objects with the original.
pub fn clone_no_local(source: &Path, target_dir: &Path) -> Result<()> {
    clone_with(&source.to_string_lossy(), target_dir, &["--no-local"])
}

/// Whether `dir` is the top of a git work tree.
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// `git init -b <branch>`
pub fn init(dir: &Path, branch: &str) -> Result<()> {
    run(dir, &["init", "-b", branch]).map(drop)
}

/// Stage every file in the work tree.
pub fn add_all(dir: &Path) -> Result<()> {
    run(dir, &["add", "--all"]).map(drop)
}

/// Whether the work tree has anything to commit.
pub fn has_changes(dir: &Path) -> Result<bool> {
    Ok(!run(dir, &["status", "--porcelain"])?.trim().is_empty())
}

/// Commit the index with `message`.
pub fn commit(dir: &Path, message: &str) -> Result<()> {
    run(dir, &["commit", "--quiet", "-m", message]).map(drop)
}

/// Name of the checked-out branch.
pub fn current_branch(dir: &Path) -> Result<String> {
    Ok(run(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?.trim().to_string())
}

/// Resolve `rev` to a commit id.
pub fn rev_parse(dir: &Path, rev: &str) -> Result<String> {
    Ok(run(dir, &["rev-parse", "--verify", rev])?.trim().to_string())
}

/// Whether `ancestor` is reachable from `descendant`.
pub fn is_ancestor(dir: &Path, ancestor: &str, descendant: &str) -> Result<bool> {
    succeeds(dir, &["merge-base", "--is-ancestor", ancestor, descendant])
}

/// `git remote add <name> <url>`
pub fn remote_add(dir: &Path, name: &str, url: &Path) -> Result<()> {
    run(
        dir,
        &[
            OsStr::new("remote"),
            OsStr::new("add"),
            OsStr::new(name),
            url.as_os_str(),
        ],
    )
    .map(drop)
}

/// `git remote remove <name>`
pub fn remote_remove(dir: &Path, name: &str) -> Result<()> {
    run(dir, &["remote", "remove", name]).map(drop)
}

/// Names of the configured remotes.
pub fn remotes(dir: &Path) -> Result<Vec<String>> {
    Ok(run(dir, &["remote"])?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// `git fetch <remote>`
pub fn fetch(dir: &Path, remote: &str) -> Result<()> {
    run(dir, &["fetch", "--quiet", remote]).map(drop)
}

/// Merge `rev` even though it shares no history with `HEAD`.
pub fn merge_unrelated(dir: &Path, rev: &str, message: &str) -> Result<()> {
    run(
        dir,
        &[
            "merge",
            "--allow-unrelated-histories",
            "--no-edit",
            "-m",
            message,
            rev,
        ],
    )
    .map(drop)
}

// Resolved against the checkout, which is the working directory of the
// query. Keeps git from searching parent directories for a repository.
const GIT_DIR: &str = "--git-dir=.git";

fn name_set(stdout: &str) -> BTreeSet<String> {
    stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every file name that appears in a commit touching `path`.
pub fn log_names(repo: &Path, path: &str) -> Result<BTreeSet<String>> {
    let stdout = run(
        repo,
        &[
            GIT_DIR,
            "log",
            "--name-only",
            "--pretty=format:",
            "--",
            path,
        ],
    )?;
    Ok(name_set(&stdout))
}

/// Every name `path` had over its history, following renames.
pub fn log_follow_names(repo: &Path, path: &str) -> Result<BTreeSet<String>> {
    let stdout = run(
        repo,
        &[
            "--no-pager",
            GIT_DIR,
            "log",
            // 80% similarity counts as a rename
            "-M80",
            "--pretty=format:",
            "--name-only",
            "--follow",
            "--",
            path,
        ],
    )?;
    Ok(name_set(&stdout))
}

/// Committer date (ISO-like `%ci`) of the last commit touching `path`.
///
/// Empty when the path was never committed.
pub fn last_modified(repo: &Path, path: &str) -> Result<String> {
    let stdout = run(
        repo,
        &[
            GIT_DIR,
            "log",
            "-1",
            "--pretty=format:%ci",
            "--",
            path,
        ],
    )?;
    Ok(stdout.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn commit_transform(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        init(dir, "main").unwrap();
        run(dir, &["config", "user.email", "test@example.com"]).unwrap();
        run(dir, &["config", "user.name", "Test User"]).unwrap();
        run(dir, &["config", "commit.gpgsign", "false"]).unwrap();

        fs::create_dir_all(dir.join("ingests/hpoa")).unwrap();
        fs::write(dir.join("ingests/hpoa/transform.py"), "x = 1\n").unwrap();
        add_all(dir).unwrap();
        commit(dir, "Add hpoa").unwrap();
    }

    /// Restores the working directory on drop.
    struct CwdGuard(PathBuf);

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.0);
        }
    }

    #[test]
    fn test_name_set_skips_blank_lines() {
        let names = name_set("a.py\n\nb.py\na.py\n\n");
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["a.py".to_string(), "b.py".to_string()]
        );
    }

    #[test]
    fn test_describe_joins_args() {
        let args = [OsStr::new("log"), OsStr::new("-1")];
        assert_eq!(describe(&args), "log -1");
    }

    #[test]
    fn test_is_repository() {
        let temp = TempDir::new().unwrap();
        assert!(!is_repository(temp.path()));
        fs::create_dir(temp.path().join(".git")).unwrap();
        assert!(is_repository(temp.path()));
    }

    #[test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    fn test_log_names_in_real_repository() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        commit_transform(dir);

        let names = log_names(dir, "ingests/hpoa").unwrap();
        assert!(names.contains("ingests/hpoa/transform.py"));
        assert!(!last_modified(dir, "ingests/hpoa/transform.py")
            .unwrap()
            .is_empty());
        assert_eq!(last_modified(dir, "never/committed.py").unwrap(), "");
        assert_eq!(current_branch(dir).unwrap(), "main");
    }

    #[test]
    #[serial]
    fn test_history_queries_with_relative_checkout() {
        if !git_available() {
            eprintln!("git not found, skipping");
            return;
        }
        let temp = TempDir::new().unwrap();
        commit_transform(&temp.path().join("monarch-ingest"));

        let _restore = CwdGuard(env::current_dir().unwrap());
        env::set_current_dir(temp.path()).unwrap();
        let repo = Path::new("./monarch-ingest");

        let touching = log_names(repo, "ingests/hpoa").unwrap();
        let following = log_follow_names(repo, "ingests/hpoa/transform.py").unwrap();
        let date = last_modified(repo, "ingests/hpoa/transform.py").unwrap();

        assert!(touching.contains("ingests/hpoa/transform.py"));
        assert!(following.contains("ingests/hpoa/transform.py"));
        assert!(!date.is_empty());
    }

    #[test]
    fn test_run_reports_failure() {
        let temp = TempDir::new().unwrap();
        // Not a repository, so any log fails (or git is absent); both are errors.
        let err = log_names(temp.path(), "anything").unwrap_err();
        assert!(matches!(err, Error::GitCommand { .. }));
    }
}
