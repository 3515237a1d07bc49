//! # Configuration
//!
//! Settings for the extraction pipeline come from four layers, each
//! overriding the previous one:
//!
//! 1. Built-in defaults (see [`crate::defaults`]).
//! 2. An optional `.modularize.yaml` file.
//! 3. Environment variables (`MONARCH_INGEST_COOKIECUTTER`,
//!    `MONARCH_INGEST_REPO`, `MONARCH_INGEST_GIT`), read by clap.
//! 4. Explicit command-line flags.
//!
//! Layers 3 and 4 arrive together as an [`Overrides`] value because clap
//! already resolves a flag against its environment variable.
//!
//! ## Example
//!
//! ```yaml
//! upstream_git: git@github.com:monarch-initiative/monarch-ingest.git
//! work_dir: build
//! default_branch: main
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::suggestions;

/// Every key a configuration file may contain.
pub const KNOWN_KEYS: &[&str] = &[
    "cookiecutter",
    "upstream_repo",
    "upstream_git",
    "work_dir",
    "template_context_key",
    "default_branch",
];

/// Resolved settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Template passed to `cruft create`.
    pub cookiecutter: String,
    /// Directory name of the local upstream clone, relative to `work_dir`.
    pub upstream_repo: String,
    /// URL the upstream clone is made from.
    pub upstream_git: String,
    /// Directory all artifacts are created in.
    pub work_dir: PathBuf,
    /// Cookiecutter context variable that receives the ingest tag.
    pub template_context_key: String,
    /// Branch created in the scaffolded project and merged from history.
    pub default_branch: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cookiecutter: defaults::COOKIECUTTER.to_string(),
            upstream_repo: defaults::UPSTREAM_REPO.to_string(),
            upstream_git: defaults::UPSTREAM_GIT.to_string(),
            work_dir: defaults::default_work_dir(),
            template_context_key: defaults::TEMPLATE_CONTEXT_KEY.to_string(),
            default_branch: defaults::DEFAULT_BRANCH.to_string(),
        }
    }
}

/// Values from the environment or the command line that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cookiecutter: Option<String>,
    pub upstream_repo: Option<String>,
    pub upstream_git: Option<String>,
    pub work_dir: Option<PathBuf>,
}

impl Settings {
    /// Apply environment and command-line overrides on top of these settings.
    pub fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(cookiecutter) = overrides.cookiecutter {
            self.cookiecutter = cookiecutter;
        }
        if let Some(upstream_repo) = overrides.upstream_repo {
            self.upstream_repo = upstream_repo;
        }
        if let Some(upstream_git) = overrides.upstream_git {
            self.upstream_git = upstream_git;
        }
        if let Some(work_dir) = overrides.work_dir {
            self.work_dir = work_dir;
        }
        self
    }

    /// Path of the local upstream clone.
    pub fn upstream_dir(&self) -> PathBuf {
        self.work_dir.join(&self.upstream_repo)
    }

    /// Artifact layout for `tag`, after validating the tag.
    pub fn workspace(&self, tag: &str) -> Result<Workspace> {
        validate_tag(tag)?;
        Ok(Workspace {
            tag: tag.to_string(),
            work_dir: self.work_dir.clone(),
            upstream_dir: self.upstream_dir(),
        })
    }
}

/// Paths of every artifact the pipeline produces for one ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub tag: String,
    pub work_dir: PathBuf,
    pub upstream_dir: PathBuf,
}

impl Workspace {
    /// Newline-separated list of every path the ingest ever used.
    pub fn file_list(&self) -> PathBuf {
        self.work_dir.join(format!("{}-files.txt", self.tag))
    }

    /// Clone of upstream filtered down to the file list.
    pub fn history_dir(&self) -> PathBuf {
        self.work_dir.join(format!("{}-history", self.tag))
    }

    /// Output directory handed to `cruft create`.
    pub fn template_dir(&self) -> PathBuf {
        self.work_dir.join(format!("{}-template", self.tag))
    }
}

static TAG_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$"));

/// Check that `tag` can safely name files and directories.
///
/// Path separators get their own message, since a tag like `ingests/hpoa`
/// is the likeliest mistake.
pub fn validate_tag(tag: &str) -> Result<()> {
    let pattern = TAG_PATTERN.as_ref().map_err(Clone::clone)?;
    if tag.is_empty() {
        return Err(Error::InvalidTag {
            tag: tag.to_string(),
            message: "tag must not be empty".to_string(),
        });
    }
    if tag.contains('/') || tag.contains('\\') {
        return Err(Error::InvalidTag {
            tag: tag.to_string(),
            message: "tag must not contain path separators".to_string(),
        });
    }
    if !pattern.is_match(tag) {
        return Err(Error::InvalidTag {
            tag: tag.to_string(),
            message: "tag may only contain letters, digits, '_', '.' and '-', \
                      and must start with a letter or digit"
                .to_string(),
        });
    }
    Ok(())
}

/// Parse settings from YAML. Missing keys keep their defaults.
pub fn parse(yaml_content: &str) -> Result<Settings> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml_content)?;

    let mapping = match value {
        // An empty (or comment-only) file is a valid, empty configuration.
        serde_yaml::Value::Null => return Ok(Settings::default()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => {
            return Err(Error::ConfigParse {
                message: "expected a mapping of settings".to_string(),
                hint: Some(format!("Valid keys are: {}", KNOWN_KEYS.join(", "))),
            })
        }
    };

    for key in mapping.keys() {
        let key = key.as_str().ok_or_else(|| Error::ConfigParse {
            message: "setting names must be strings".to_string(),
            hint: None,
        })?;
        if !KNOWN_KEYS.contains(&key) {
            return Err(Error::ConfigParse {
                message: format!("unknown setting '{}'", key),
                hint: suggestions::did_you_mean(key, KNOWN_KEYS)
                    .or_else(|| Some(format!("Valid keys are: {}", KNOWN_KEYS.join(", ")))),
            });
        }
    }

    serde_yaml::from_value(serde_yaml::Value::Mapping(mapping)).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: None,
    })
}

/// Parse settings from a YAML file path
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

/// Locate the configuration file to use when none was given explicitly.
///
/// Looks for `.modularize.yaml` in the current directory first, then for
/// `config.yaml` in the user configuration directory.
pub fn discover() -> Option<PathBuf> {
    let local = PathBuf::from(defaults::CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    let user = defaults::user_config_dir().join("config.yaml");
    user.is_file().then_some(user)
}
