//! # ingest-modularize
//!
//! Tools for moving one ingest out of the `monarch-ingest` monorepo into its
//! own repository, keeping the history of every file it ever touched, and
//! for migrating the moved code to newer APIs.
//!
//! ## Quick Example
//!
//! ```
//! use ingest_modularize::koza;
//!
//! let old = "label = row['Name']\n";
//! assert_eq!(koza::transform_koza_code(old).unwrap(), "label = record['Name']\n");
//! ```
//!
//! ## Core Concepts
//!
//! - **Settings (`config`, `defaults`)**: Where the upstream clone, the
//!   template and the work directory are, from defaults, an optional
//!   `.modularize.yaml`, the environment and flags.
//! - **Phases (`phases`)**: The extraction pipeline. Each target produces one
//!   artifact in the work directory and is skipped when that artifact is
//!   already up to date.
//! - **Git (`git`, `repository`, `cache`, `tools`)**: Thin wrappers around the
//!   `git`, `git filter-repo` and `cruft` executables.
//! - **Source tools (`python`, `koza`, `biolink`)**: A lossless Python
//!   tokenizer and the two source transformations built on it.
//!
//! ## Execution Flow
//!
//! [`phases::orchestrator::run`] resolves a target into the steps it needs:
//!
//! 1.  **Upstream**: Clone or update the monorepo.
//! 2.  **File list**: Walk the history for every path under the ingest.
//! 3.  **History**: Clone upstream again and filter it down to the file list.
//! 4.  **Template**: Scaffold the new project with `cruft create`.
//! 5.  **Import**: Merge the filtered history into the scaffold.

pub mod biolink;
pub mod cache;
pub mod config;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod git;
pub mod koza;
pub mod output;
pub mod phases;
pub mod python;
pub mod repository;
pub mod suggestions;
pub mod tools;
