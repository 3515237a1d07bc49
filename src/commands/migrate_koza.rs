//! # Migrate Koza Command Implementation
//!
//! Rewrites Koza transforms from the `koza_app` row loop to a
//! `transform_record` function. Directories are searched for `*.py` files.
//! Without `--in-place` the rewritten source is printed; with it, files are
//! rewritten on disk when something changed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::Args;
use log::info;
use walkdir::WalkDir;

use ingest_modularize::koza;
use ingest_modularize::suggestions;

/// Rewrite Koza transforms to the transform_record API
#[derive(Args, Debug)]
pub struct MigrateKozaArgs {
    /// Transform files or directories containing them
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Rewrite the files instead of printing the result
    #[arg(short, long)]
    pub in_place: bool,
}

/// Every `.py` file named by `paths`, directories searched recursively in
/// name order.
pub fn python_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let before = files.len();
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && is_python(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            if files.len() == before {
                return Err(suggestions::no_python_files(path));
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }
    Ok(files)
}

fn is_python(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

/// Execute the `migrate-koza` command.
pub fn execute(args: MigrateKozaArgs) -> Result<()> {
    let files = python_files(&args.paths)?;
    let show_names = files.len() > 1;

    for file in &files {
        let original = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let migrated = koza::transform_koza_code(&original)
            .with_context(|| format!("Failed to migrate {}", file.display()))?;

        if args.in_place {
            if migrated != original {
                fs::write(file, &migrated)
                    .with_context(|| format!("Failed to write {}", file.display()))?;
                info!("Migrated {}", file.display());
            } else {
                info!("Unchanged {}", file.display());
            }
        } else {
            if show_names {
                println!("# ==> {} <==", file.display());
            }
            print!("{}", migrated);
        }
    }
    Ok(())
}
