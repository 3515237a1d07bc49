//! # ingest-modularize CLI
//!
//! Binary entry point for the `ingest-modularize` command-line tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Dispatching to the command implementations in `commands`.
//! - Returning errors to the runtime, which prints them and exits with 1.
//!
//! Usage errors are reported by `clap` itself with exit code 2. Everything
//! else lives in the `ingest_modularize` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
