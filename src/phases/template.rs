//! `setup-template`: scaffold the new project with cruft.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::{Outcome, PipelineOptions};
use crate::config::{Settings, Workspace};
use crate::error::{Error, Result};
use crate::{git, tools};

/// Message of the commit holding the untouched scaffold.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from template";

/// The project directory cruft created inside `template_dir`.
///
/// `None` when nothing has been generated yet. More than one directory
/// means the template directory was tampered with and is an error.
pub fn find_project(template_dir: &Path) -> Result<Option<PathBuf>> {
    if !template_dir.is_dir() {
        return Ok(None);
    }

    let mut projects = Vec::new();
    for entry in fs::read_dir(template_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            projects.push(path);
        }
    }

    match projects.len() {
        0 => Ok(None),
        1 => Ok(projects.pop()),
        n => Err(Error::Template {
            message: format!(
                "expected one generated project in {}, found {}",
                template_dir.display(),
                n
            ),
        }),
    }
}

/// Generate the project from `settings.cookiecutter` and commit it on
/// `settings.default_branch`.
///
/// Kept as is when a generated project that is already a git repository
/// exists.
pub fn setup_template(
    settings: &Settings,
    workspace: &Workspace,
    options: &PipelineOptions,
) -> Result<Outcome> {
    let template_dir = workspace.template_dir();

    if !options.force {
        if let Some(project) = find_project(&template_dir)? {
            if git::is_repository(&project) {
                return Ok(Outcome::UpToDate);
            }
        }
    }

    if template_dir.exists() {
        fs::remove_dir_all(&template_dir)?;
    }
    fs::create_dir_all(&template_dir)?;

    info!(
        "Scaffolding {} from {}",
        template_dir.display(),
        settings.cookiecutter
    );
    tools::cruft_create(
        &settings.cookiecutter,
        &template_dir,
        &settings.template_context_key,
        &workspace.tag,
    )?;

    let project = find_project(&template_dir)?.ok_or_else(|| Error::Template {
        message: format!(
            "cruft did not create a project directory in {}",
            template_dir.display()
        ),
    })?;

    if !git::is_repository(&project) {
        git::init(&project, &settings.default_branch)?;
    }
    git::add_all(&project)?;
    if git::has_changes(&project)? {
        git::commit(&project, INITIAL_COMMIT_MESSAGE)?;
    }

    Ok(Outcome::Built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_project_missing_dir() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_project(&temp.path().join("nope")).unwrap(), None);
    }

    #[test]
    fn test_find_project_ignores_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".cruft.json"), "{}").unwrap();
        assert_eq!(find_project(temp.path()).unwrap(), None);

        fs::create_dir(temp.path().join("hpoa")).unwrap();
        assert_eq!(
            find_project(temp.path()).unwrap(),
            Some(temp.path().join("hpoa"))
        );
    }

    #[test]
    fn test_find_project_rejects_several() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::create_dir(temp.path().join("b")).unwrap();
        let err = find_project(temp.path()).unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_existing_project_is_kept() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            work_dir: temp.path().to_path_buf(),
            cookiecutter: "/nonexistent/template".to_string(),
            ..Settings::default()
        };
        let workspace = settings.workspace("hpoa").unwrap();
        fs::create_dir_all(workspace.template_dir().join("hpoa/.git")).unwrap();

        let outcome = setup_template(&settings, &workspace, &PipelineOptions::default()).unwrap();
        assert_eq!(outcome, Outcome::UpToDate);
    }
}
