//! Records interactions into a cassette file.

use std::io;
use std::path::PathBuf;

use serde_json::Value;

use super::format::{Cassette, Interaction};

/// Accumulates interactions and writes them out when the run ends.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    cassette: Cassette,
}

impl CassetteRecorder {
    /// Starts a recording that [`CassetteRecorder::finish`] writes to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self { path: path.into(), cassette: Cassette::start(name, project) }
    }

    /// Appends an interaction, numbering it after the ones before.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: Value,
        output: Value,
    ) {
        let seq = self.cassette.interactions.len() as u64;
        self.cassette.interactions.push(Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        });
    }

    /// Writes the cassette and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> io::Result<PathBuf> {
        self.cassette.save(&self.path)?;
        Ok(self.path)
    }
}
