//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

use crate::collect::DEFAULT_CONTENT;
use crate::export::{ExportOptions, DEFAULT_INDEX};

/// Top-level CLI parser for `export-project`.
#[derive(Debug, Parser)]
#[command(
    name = "export-project",
    version,
    about = "Export a project, its dependency graph and type environment as one JSON bundle"
)]
pub struct Cli {
    /// Comma-delimited file extensions collected for each include pattern.
    #[arg(long, default_value = DEFAULT_CONTENT)]
    pub content: String,

    /// Entry file of the project, as named in the bundle.
    #[arg(long, default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Directory the bundle is written to.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Directory containing package.json and tsconfig.json.
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Log every dependency and file as it is discovered.
    #[arg(long)]
    pub verbose: bool,
}

impl From<Cli> for ExportOptions {
    fn from(cli: Cli) -> Self {
        Self {
            content: cli.content,
            index: cli.index,
            out: cli.out,
            project: cli.project,
            verbose: cli.verbose,
        }
    }
}
