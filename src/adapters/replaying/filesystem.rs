//! Replaying adapter for the `FileSystem` port.

use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::adapters::recording::filesystem::{PathInput, PatternInput, WriteInput};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::filesystem::{FileSystem, FsFuture, PortError};

/// Replays recorded filesystem operations from a cassette.
pub struct ReplayingFileSystem {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingFileSystem {
    /// Creates a new replaying filesystem from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn replay_result<T, I>(&self, method: &str, input: &I) -> Result<T, PortError>
    where
        T: serde::de::DeserializeOwned,
        I: Serialize,
    {
        let input = serde_json::to_value(input)?;
        let interaction = self
            .replayer
            .lock()
            .map_err(|_| "replayer lock poisoned")?
            .take("fs", method, &input)
            .ok_or_else(|| format!("no recorded fs::{method} interaction for {input}"))?;
        extract_result(&interaction.output, method)
    }
}

/// Extracts a Result from a cassette output JSON value.
///
/// Expects `{"ok": <value>}` or `{"err": "message"}`.
fn extract_result<T: serde::de::DeserializeOwned>(
    output: &serde_json::Value,
    method: &str,
) -> Result<T, PortError> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("fs::{method}: failed to deserialize: {e}").into())
}

impl FileSystem for ReplayingFileSystem {
    fn exists<'a>(&'a self, path: &'a Path) -> FsFuture<'a, bool> {
        Box::pin(async move {
            self.replay_result("exists", &PathInput { path: &path.display().to_string() })
        })
    }

    fn read_to_string<'a>(&'a self, path: &'a Path) -> FsFuture<'a, String> {
        Box::pin(async move {
            self.replay_result("read_to_string", &PathInput { path: &path.display().to_string() })
        })
    }

    fn write<'a>(&'a self, path: &'a Path, contents: &'a str) -> FsFuture<'a, ()> {
        Box::pin(async move {
            self.replay_result(
                "write",
                &WriteInput { path: &path.display().to_string(), contents },
            )
        })
    }

    fn glob<'a>(&'a self, pattern: &'a str) -> FsFuture<'a, Vec<String>> {
        Box::pin(async move { self.replay_result("glob", &PatternInput { pattern }) })
    }
}
