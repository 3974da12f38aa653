//! Error types for the export pipeline.

use std::error::Error as _;
use std::path::PathBuf;

use thiserror::Error;

use crate::ports::PortError;

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Fatal conditions that abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// `package.json` or `tsconfig.json` is missing from the project directory.
    #[error("Required package.json and tsconfig.json not found in {}", dir.display())]
    MissingRequiredFiles {
        /// Directory that was checked.
        dir: PathBuf,
    },

    /// A file could not be read.
    #[error("Failed to read {path}")]
    Read {
        /// Path as requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: PortError,
    },

    /// A JSON file could not be parsed.
    #[error("Failed to parse {path}")]
    Parse {
        /// Path of the file.
        path: String,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A glob pattern could not be expanded.
    #[error("Failed to expand pattern {pattern}")]
    Glob {
        /// Pattern as requested.
        pattern: String,
        /// Underlying failure.
        #[source]
        source: PortError,
    },

    /// A module request did not resolve to any `node_modules` entry.
    #[error("Cannot find module '{request}'")]
    Unresolved {
        /// The module request, e.g. `@types/node/package.json`.
        request: String,
    },

    /// An existence check failed.
    #[error("Failed to check {path}")]
    Exists {
        /// Path as requested.
        path: String,
        /// Underlying failure.
        #[source]
        source: PortError,
    },

    /// The bundle could not be written.
    #[error("Failed to write {}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: PortError,
    },

    /// The bundle could not be serialized.
    #[error("Failed to serialize project bundle")]
    Serialize(#[source] serde_json::Error),

    /// The process working directory is unavailable.
    #[error("Cannot determine the current directory")]
    CurrentDir(#[source] std::io::Error),
}

impl ExportError {
    /// Everything below the headline: the chain of underlying causes, or a
    /// hint about what was looked for when there is no cause.
    #[must_use]
    pub fn detail(&self) -> String {
        let mut causes = Vec::new();
        let mut source = self.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        if !causes.is_empty() {
            return format!("Caused by: {}", causes.join(": "));
        }
        match self {
            Self::MissingRequiredFiles { dir } => format!(
                "Expected {} and {} in the project directory; pass --project to export another directory",
                dir.join("package.json").display(),
                dir.join("tsconfig.json").display(),
            ),
            Self::Unresolved { request } => format!(
                "Looked for node_modules/{request} in the project directory and each parent directory"
            ),
            _ => "No further detail available".to_string(),
        }
    }
}
