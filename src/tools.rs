//! External tools other than plain `git`: `git filter-repo` and `cruft`.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

const FILTER_REPO: &str = "git filter-repo";
const FILTER_REPO_HINT: &str =
    "Install it with 'pip install git-filter-repo' or your package manager";
const CRUFT: &str = "cruft";
const CRUFT_HINT: &str = "Install it with 'pip install cruft'";

fn command_line(program: &str, args: &[&OsStr]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

/// Run `program args...` in `dir`; a missing binary becomes `ToolValidation`,
/// a non-zero exit becomes `ToolFailed`.
fn run_tool(
    tool: &str,
    hint: &str,
    program: &str,
    args: &[&OsStr],
    dir: Option<&Path>,
) -> Result<Output> {
    let line = command_line(program, args);
    debug!("{}", line);

    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    let output = command.output().map_err(|e| Error::ToolValidation {
        tool: tool.to_string(),
        message: if e.kind() == ErrorKind::NotFound {
            format!("'{}' was not found on PATH", program)
        } else {
            e.to_string()
        },
        hint: Some(hint.to_string()),
    })?;

    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: tool.to_string(),
            command: line,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// Verify that `git filter-repo` is installed, returning its version.
pub fn check_filter_repo() -> Result<String> {
    let output = run_tool(
        FILTER_REPO,
        FILTER_REPO_HINT,
        "git",
        &[OsStr::new("filter-repo"), OsStr::new("--version")],
        None,
    )
    .map_err(|e| match e {
        // git itself ran but has no filter-repo subcommand
        Error::ToolFailed { stderr, .. } => Error::ToolValidation {
            tool: FILTER_REPO.to_string(),
            message: stderr,
            hint: Some(FILTER_REPO_HINT.to_string()),
        },
        other => other,
    })?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Rewrite the repository in `dir` so it only contains the paths listed in
/// `paths_file`, across all of history.
pub fn filter_repo(dir: &Path, paths_file: &Path) -> Result<()> {
    run_tool(
        FILTER_REPO,
        FILTER_REPO_HINT,
        "git",
        &[
            OsStr::new("filter-repo"),
            OsStr::new("--paths-from-file"),
            paths_file.as_os_str(),
            OsStr::new("--force"),
        ],
        Some(dir),
    )
    .map(drop)
}

/// Extra context handed to cookiecutter, as the JSON object cruft expects.
pub fn extra_context(key: &str, value: &str) -> String {
    let mut context = Map::new();
    context.insert(key.to_string(), Value::String(value.to_string()));
    Value::Object(context).to_string()
}

/// Scaffold a project from `template` into `output_dir` without prompting.
pub fn cruft_create(template: &str, output_dir: &Path, context_key: &str, tag: &str) -> Result<()> {
    let context = extra_context(context_key, tag);
    run_tool(
        CRUFT,
        CRUFT_HINT,
        CRUFT,
        &[
            OsStr::new("create"),
            OsStr::new(template),
            OsStr::new("--no-input"),
            OsStr::new("--output-dir"),
            output_dir.as_os_str(),
            OsStr::new("--extra-context"),
            OsStr::new(&context),
        ],
        None,
    )
    .map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_context_is_json_object() {
        let context = extra_context("project_name", "hpoa");
        let value: serde_json::Value = serde_json::from_str(&context).unwrap();
        assert_eq!(value["project_name"], "hpoa");
    }

    #[test]
    fn test_extra_context_escapes() {
        let context = extra_context("name", "a\"b");
        let value: serde_json::Value = serde_json::from_str(&context).unwrap();
        assert_eq!(value["name"], "a\"b");
    }

    #[test]
    fn test_command_line() {
        let args = [OsStr::new("create"), OsStr::new("--no-input")];
        assert_eq!(command_line("cruft", &args), "cruft create --no-input");
    }

    #[test]
    fn test_missing_program_is_tool_validation() {
        let err = run_tool(
            "nope",
            "install nope",
            "ingest-modularize-definitely-missing-binary",
            &[],
            None,
        )
        .unwrap_err();
        match err {
            Error::ToolValidation { tool, message, hint } => {
                assert_eq!(tool, "nope");
                assert!(message.contains("not found on PATH"));
                assert_eq!(hint.as_deref(), Some("install nope"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
