//! # Error Handling
//!
//! This module defines the centralized error type for the `ingest-modularize`
//! library. It uses the `thiserror` library to build a single `Error` enum
//! covering every failure the pipeline and the source tools can run into,
//! each variant carrying enough context to tell the user what went wrong.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants that wrap an external command keep
//!   the command line and its stderr; variants the user can usually fix
//!   themselves carry an optional `hint`.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The pipeline is fail-fast: the first `Err` returned by a target aborts
//! the run, just as `make` stops at the first failing recipe.

use thiserror::Error;

fn render_hint(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|h| format!("\n  hint: {}", h))
        .unwrap_or_default()
}

/// Main error type for ingest-modularize operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the `.modularize.yaml` configuration file.
    #[error("Configuration parsing error: {message}{}", render_hint(hint))]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The ingest tag cannot be used to name artifacts.
    #[error("Invalid ingest tag '{tag}': {message}")]
    InvalidTag { tag: String, message: String },

    /// An error occurred while cloning a Git repository.
    #[error("Git clone error for {url}: {message}{}", render_hint(hint))]
    GitClone {
        url: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// A Git command exited unsuccessfully or could not be spawned.
    #[error("Git command failed in {repo}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        repo: String,
        stderr: String,
    },

    /// A required external tool is missing or unusable.
    #[error("Tool validation error: {tool} - {message}{}", render_hint(hint))]
    ToolValidation {
        tool: String,
        message: String,
        hint: Option<String>,
    },

    /// An external tool ran but reported failure.
    #[error("{tool} failed: {command} - {stderr}")]
    ToolFailed {
        tool: String,
        command: String,
        stderr: String,
    },

    /// The project scaffold did not come out the way the pipeline expects.
    #[error("Template error: {message}")]
    Template { message: String },

    /// A target needs an artifact that is missing or empty.
    #[error("Missing artifact {artifact}{}", render_hint(hint))]
    MissingArtifact {
        artifact: String,
        hint: Option<String>,
    },

    /// Python source could not be tokenized.
    #[error("Python syntax error on line {line}: {message}")]
    PythonSyntax { line: usize, message: String },

    /// A mutex guarding shared state has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "unknown field `upstream`".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("unknown field"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "unknown field `upstream`".to_string(),
            hint: Some("Did you mean 'upstream_git'?".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("hint:"));
        assert!(display.contains("upstream_git"));
    }

    #[test]
    fn test_error_display_git_clone() {
        let error = Error::GitClone {
            url: "https://github.com/monarch-initiative/monarch-ingest.git".to_string(),
            message: "Authentication failed".to_string(),
            hint: Some("Check SSH keys".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git clone error"));
        assert!(display.contains("monarch-ingest.git"));
        assert!(display.contains("Authentication failed"));
        assert!(display.contains("Check SSH keys"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "log --follow".to_string(),
            repo: "monarch-ingest".to_string(),
            stderr: "fatal: bad revision".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git command failed in monarch-ingest"));
        assert!(display.contains("git log --follow"));
        assert!(display.contains("fatal: bad revision"));
    }

    #[test]
    fn test_error_display_tool_validation() {
        let error = Error::ToolValidation {
            tool: "git filter-repo".to_string(),
            message: "not installed".to_string(),
            hint: Some("pip install git-filter-repo".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Tool validation error"));
        assert!(display.contains("git filter-repo"));
        assert!(display.contains("pip install git-filter-repo"));
    }

    #[test]
    fn test_error_display_invalid_tag() {
        let error = Error::InvalidTag {
            tag: "../etc".to_string(),
            message: "must not contain path separators".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid ingest tag '../etc'"));
    }

    #[test]
    fn test_error_display_python_syntax() {
        let error = Error::PythonSyntax {
            line: 3,
            message: "unterminated string".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Python syntax error on line 3: unterminated string"
        );
    }

    #[test]
    fn test_error_display_missing_artifact() {
        let error = Error::MissingArtifact {
            artifact: "hpoa-files.txt".to_string(),
            hint: None,
        };
        assert_eq!(format!("{}", error), "Missing artifact hpoa-files.txt");
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML parsing error"));
    }

    #[test]
    fn test_error_from_regex_error() {
        let regex_error = regex::Error::Syntax("Invalid regex".to_string());
        let error: Error = regex_error.into();
        assert!(format!("{}", error).contains("Regex error"));
    }
}
