//! In-memory filesystem for exercising the pipeline without touching disk.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use crate::pattern::GlobPattern;
use crate::ports::filesystem::{FileSystem, FsFuture};
use crate::resolve::slash_path as normalize;

/// In-memory filesystem keyed by normalized, `/`-separated paths.
pub struct MemFs {
    files: Mutex<BTreeMap<String, String>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self { files: Mutex::new(BTreeMap::new()) }
    }

    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.files.lock().unwrap().insert(normalize(Path::new(path)), contents.to_string());
        self
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(&normalize(Path::new(path))).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

impl FileSystem for MemFs {
    fn exists<'a>(&'a self, path: &'a Path) -> FsFuture<'a, bool> {
        Box::pin(async move {
            let key = normalize(path);
            let prefix = format!("{key}/");
            let files = self.files.lock().unwrap();
            // Check exact path or if any file is "under" this directory.
            Ok(files.contains_key(&key) || files.keys().any(|k| k.starts_with(&prefix)))
        })
    }

    fn read_to_string<'a>(&'a self, path: &'a Path) -> FsFuture<'a, String> {
        Box::pin(async move {
            let files = self.files.lock().unwrap();
            files
                .get(&normalize(path))
                .cloned()
                .ok_or_else(|| format!("File not found: {}", path.display()).into())
        })
    }

    fn write<'a>(&'a self, path: &'a Path, contents: &'a str) -> FsFuture<'a, ()> {
        Box::pin(async move {
            self.files.lock().unwrap().insert(normalize(path), contents.to_string());
            Ok(())
        })
    }

    fn glob<'a>(&'a self, pattern: &'a str) -> FsFuture<'a, Vec<String>> {
        Box::pin(async move {
            let pattern = GlobPattern::new(pattern)?;
            let files = self.files.lock().unwrap();
            Ok(pattern.select(files.keys().filter(|k| !k.starts_with('/')).map(String::as_str)))
        })
    }
}
