//! Recording adapter for the `FileSystem` port.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::filesystem::{FileSystem, FsFuture};

/// Records filesystem interactions while delegating to an inner implementation.
pub struct RecordingFileSystem {
    inner: Box<dyn FileSystem>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingFileSystem {
    /// Creates a new recording filesystem wrapping the given implementation.
    pub fn new(inner: Box<dyn FileSystem>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
pub(crate) struct PathInput<'a> {
    pub(crate) path: &'a str,
}

#[derive(Serialize)]
pub(crate) struct WriteInput<'a> {
    pub(crate) path: &'a str,
    pub(crate) contents: &'a str,
}

#[derive(Serialize)]
pub(crate) struct PatternInput<'a> {
    pub(crate) pattern: &'a str,
}

impl FileSystem for RecordingFileSystem {
    fn exists<'a>(&'a self, path: &'a Path) -> FsFuture<'a, bool> {
        Box::pin(async move {
            let result = self.inner.exists(path).await;
            let input = PathInput { path: &path.display().to_string() };
            record_result(&self.recorder, "fs", "exists", &input, &result);
            result
        })
    }

    fn read_to_string<'a>(&'a self, path: &'a Path) -> FsFuture<'a, String> {
        Box::pin(async move {
            let result = self.inner.read_to_string(path).await;
            let input = PathInput { path: &path.display().to_string() };
            record_result(&self.recorder, "fs", "read_to_string", &input, &result);
            result
        })
    }

    fn write<'a>(&'a self, path: &'a Path, contents: &'a str) -> FsFuture<'a, ()> {
        Box::pin(async move {
            let result = self.inner.write(path, contents).await;
            let input = WriteInput { path: &path.display().to_string(), contents };
            record_result(&self.recorder, "fs", "write", &input, &result);
            result
        })
    }

    fn glob<'a>(&'a self, pattern: &'a str) -> FsFuture<'a, Vec<String>> {
        Box::pin(async move {
            let result = self.inner.glob(pattern).await;
            record_result(&self.recorder, "fs", "glob", &PatternInput { pattern }, &result);
            result
        })
    }
}
