//! # Clean Command Implementation
//!
//! Removes `<tag>-files.txt`, `<tag>-history` and `<tag>-template` from the
//! work directory. `--all` also removes the shared upstream clone.

use anyhow::Result;
use clap::Args;

use ingest_modularize::output::emoji;
use ingest_modularize::phases::clean;

use super::pipeline::UpstreamArgs;
use super::{load_settings, Context};

/// Remove the artifacts created for an ingest
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Ingest tag, e.g. `hpoa`
    #[arg(value_name = "TAG")]
    pub tag: String,

    /// Also remove the upstream clone
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub upstream: UpstreamArgs,
}

/// Execute the `clean` command.
pub fn execute(args: CleanArgs, context: &Context) -> Result<()> {
    let out = context.output();
    let settings = load_settings(context, args.upstream.overrides())?;
    let workspace = settings.workspace(&args.tag)?;

    let removed = clean::clean(&workspace, args.all)?;
    if removed.is_empty() {
        println!("{} Nothing to clean for '{}'", emoji(&out, "✨", "[OK]"), args.tag);
    }
    for path in removed {
        println!("{} Removed {}", emoji(&out, "🗑️", "[DEL]"), path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> Context {
        Context {
            color: "never".to_string(),
            config: None,
            work_dir: Some(temp.path().to_path_buf()),
        }
    }

    #[test]
    fn test_clean_removes_tag_artifacts_only() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("hpoa-files.txt"), "a\n").unwrap();
        fs::create_dir_all(temp.path().join("hpoa-history/.git")).unwrap();
        fs::create_dir_all(temp.path().join("monarch-ingest/.git")).unwrap();

        let args = CleanArgs {
            tag: "hpoa".to_string(),
            all: false,
            upstream: UpstreamArgs::default(),
        };
        execute(args, &context(&temp)).unwrap();

        assert!(!temp.path().join("hpoa-files.txt").exists());
        assert!(!temp.path().join("hpoa-history").exists());
        assert!(temp.path().join("monarch-ingest").exists());
    }

    #[test]
    fn test_clean_all_uses_upstream_override() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("mi/.git")).unwrap();

        let args = CleanArgs {
            tag: "hpoa".to_string(),
            all: true,
            upstream: UpstreamArgs {
                upstream_repo: Some("mi".to_string()),
                ..UpstreamArgs::default()
            },
        };
        execute(args, &context(&temp)).unwrap();
        assert!(!temp.path().join("mi").exists());
    }
}
