//! # Document Command Implementation
//!
//! Prints the Biolink classes that `# !DocumentClass`-marked statements in
//! transform scripts construct, as Markdown (the default) or JSON.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};

use ingest_modularize::biolink::{self, DocumentedClass};

/// Output formats for documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One section per class with a field table
    Markdown,
    /// A JSON array of classes
    Json,
}

/// Document the Biolink classes a transform creates
#[derive(Args, Debug)]
pub struct DocumentArgs {
    /// Transform scripts to document
    #[arg(value_name = "SCRIPT", required = true)]
    pub scripts: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "markdown")]
    pub format: Format,
}

/// Extract documentation from every script, in argument order.
pub fn collect(scripts: &[PathBuf]) -> Result<Vec<(PathBuf, Vec<DocumentedClass>)>> {
    scripts
        .iter()
        .map(|script| {
            let classes = biolink::extract_biolink_documentation(script)
                .with_context(|| format!("Failed to document {}", script.display()))?;
            Ok((script.clone(), classes))
        })
        .collect()
}

/// Render collected documentation in `format`.
pub fn render(documented: &[(PathBuf, Vec<DocumentedClass>)], format: Format) -> Result<String> {
    match format {
        Format::Json => {
            let classes: Vec<DocumentedClass> = documented
                .iter()
                .flat_map(|(_, classes)| classes.iter().cloned())
                .collect();
            Ok(biolink::render_json(&classes)?)
        }
        Format::Markdown => {
            let mut out = String::new();
            for (script, classes) in documented {
                if documented.len() > 1 {
                    out.push_str(&format!("# {}\n\n", script.display()));
                }
                out.push_str(&biolink::render_markdown(classes));
            }
            Ok(out)
        }
    }
}

/// Execute the `document` command.
pub fn execute(args: DocumentArgs) -> Result<()> {
    let documented = collect(&args.scripts)?;
    let rendered = render(&documented, args.format)?;
    print!("{}", rendered);
    if args.format == Format::Json {
        println!();
    }
    Ok(())
}
