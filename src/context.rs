//! Service context bundling the filesystem port and the invocation's logger.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::LiveFileSystem;
use crate::adapters::recording::RecordingFileSystem;
use crate::adapters::replaying::ReplayingFileSystem;
use crate::cassette::format::Cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::logger::Logger;
use crate::ports::filesystem::FileSystem;

/// Environment variable naming a cassette file to record filesystem interactions into.
pub const RECORD_ENV: &str = "EXPORT_PROJECT_RECORD";

/// Environment variable naming a cassette file to serve filesystem interactions from.
pub const REPLAY_ENV: &str = "EXPORT_PROJECT_REPLAY";

/// Everything one export invocation talks to.
///
/// Constructors wire up different filesystem adapters (live, recording,
/// replaying); the logger carries the invocation's verbosity.
pub struct ServiceContext {
    /// Filesystem rooted at the project directory.
    pub fs: Box<dyn FileSystem>,
    /// Console logger.
    pub log: Logger,
    /// Optional cassette recorder; written by [`ServiceContext::finish`].
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a context around an arbitrary filesystem implementation.
    #[must_use]
    pub fn with_fs(fs: Box<dyn FileSystem>, log: Logger) -> Self {
        Self { fs, log, recorder: None }
    }

    /// Creates a live context reading the project at `project_dir` from disk.
    #[must_use]
    pub fn live(project_dir: &Path, log: Logger) -> Self {
        Self::with_fs(Box::new(LiveFileSystem::rooted(project_dir)), log)
    }

    /// Creates a live context that also records every filesystem interaction.
    ///
    /// The cassette is written to `cassette` by [`ServiceContext::finish`].
    #[must_use]
    pub fn recording(project_dir: &Path, cassette: &Path, log: Logger) -> Self {
        let name = cassette
            .file_stem()
            .map_or_else(|| "export".to_string(), |stem| stem.to_string_lossy().into_owned());
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            cassette,
            name,
            project_dir.display().to_string(),
        )));
        let fs = RecordingFileSystem::new(
            Box::new(LiveFileSystem::rooted(project_dir)),
            Arc::clone(&recorder),
        );
        Self { fs: Box::new(fs), log, recorder: Some(recorder) }
    }

    /// Creates a context whose filesystem is served from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(cassette: &Path, log: Logger) -> Result<Self, String> {
        let loaded = Cassette::load(cassette)
            .map_err(|e| format!("Failed to load cassette file {}: {e}", cassette.display()))?;
        let fs = ReplayingFileSystem::new(CassetteReplayer::new(&loaded));
        Ok(Self::with_fs(Box::new(fs), log))
    }

    /// Picks live, recording or replaying mode from the environment.
    ///
    /// `EXPORT_PROJECT_REPLAY` takes precedence over `EXPORT_PROJECT_RECORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if a replay cassette cannot be loaded.
    pub fn from_env(project_dir: &Path, log: Logger) -> Result<Self, String> {
        if let Some(cassette) = env::var_os(REPLAY_ENV) {
            return Self::replaying(Path::new(&cassette), log);
        }
        if let Some(cassette) = env::var_os(RECORD_ENV) {
            return Ok(Self::recording(project_dir, Path::new(&cassette), log));
        }
        Ok(Self::live(project_dir, log))
    }

    /// Ends the invocation, writing the cassette when recording.
    ///
    /// Returns the cassette path if one was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be written.
    pub fn finish(self) -> Result<Option<PathBuf>, String> {
        let Self { fs, recorder, .. } = self;
        // Release the adapter's handle on the recorder first.
        drop(fs);
        let Some(recorder) = recorder else {
            return Ok(None);
        };
        let recorder = Arc::try_unwrap(recorder)
            .map_err(|_| "cassette recorder is still in use".to_string())?
            .into_inner()
            .map_err(|_| "cassette recorder lock poisoned".to_string())?;
        recorder
            .finish()
            .map(Some)
            .map_err(|e| format!("Failed to write cassette: {e}"))
    }
}
