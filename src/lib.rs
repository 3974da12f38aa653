//! Core library entry for the `export-project` CLI.
//!
//! An export reads a project's `package.json`, `tsconfig.json` and optional
//! `.dojorc`, flattens its dependency graphs, gathers its sources and type
//! environment, and writes everything to one `<name>.project.json` bundle.

pub mod adapters;
pub mod bundle;
pub mod cassette;
pub mod cli;
pub mod collect;
pub mod context;
pub mod dependencies;
pub mod environment;
pub mod error;
pub mod export;
pub mod logger;
pub mod pattern;
pub mod ports;
pub mod resolve;

#[cfg(test)]
mod test_support;

use clap::error::ErrorKind;
use clap::Parser;

use crate::export::ExportOptions;
use crate::logger::Logger;

/// Run the CLI with the provided arguments.
///
/// Export failures are logged rather than returned; the process still exits
/// successfully after them.
///
/// # Errors
///
/// Returns an error string when argument parsing fails, the runtime cannot
/// start, or a filesystem cassette cannot be loaded or written.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return err.print().map_err(|err| err.to_string());
        }
        Err(err) => return Err(err.to_string()),
    };
    let options = ExportOptions::from(cli);
    let log = Logger::new(options.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to start runtime: {err}"))?;
    runtime.block_on(export::export_project(&options, log))?;
    Ok(())
}
