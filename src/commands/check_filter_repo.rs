//! Check filter-repo command implementation

use anyhow::Result;

use ingest_modularize::output::emoji;
use ingest_modularize::tools;

use super::Context;

/// Execute the `check-filter-repo` command.
pub fn execute(context: &Context) -> Result<()> {
    let out = context.output();
    let version = tools::check_filter_repo()?;
    println!("{} git filter-repo {}", emoji(&out, "✅", "[OK]"), version);
    Ok(())
}
