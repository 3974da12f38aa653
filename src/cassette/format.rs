//! Cassette data structures for recording and replaying filesystem interactions.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One call made through a port and what it returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position in the recording.
    pub seq: u64,
    /// Port name (`fs`).
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Call arguments, e.g. `{"path": ...}` or `{"pattern": ...}`.
    pub input: Value,
    /// `{"ok": value}` or `{"err": message}`.
    pub output: Value,
}

impl Interaction {
    /// Whether this recording answers a call of `method` on `port` with `input`.
    #[must_use]
    pub fn answers(&self, port: &str, method: &str, input: &Value) -> bool {
        self.port == port && self.method == method && self.input == *input
    }
}

/// Every filesystem interaction of one export run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name, usually the cassette file stem.
    pub name: String,
    /// When recording started.
    pub recorded_at: DateTime<Utc>,
    /// Project directory the interactions were recorded against.
    pub project: String,
    /// Interactions in the order they completed.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Starts an empty cassette stamped with the current time.
    #[must_use]
    pub fn start(name: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recorded_at: Utc::now(),
            project: project.into(),
            interactions: Vec::new(),
        }
    }

    /// Reads a YAML cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a cassette.
    pub fn load(path: &Path) -> io::Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&yaml).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Writes the cassette as YAML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let yaml = serde_yaml::to_string(self).map_err(io::Error::other)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, yaml)
    }
}
