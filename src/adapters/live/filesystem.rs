//! Live filesystem adapter using `tokio::fs`.

use std::path::{Path, PathBuf};

use crate::pattern::GlobPattern;
use crate::ports::filesystem::{FileSystem, FsFuture};

/// Live filesystem adapter backed by real disk I/O, rooted at a project directory.
pub struct LiveFileSystem {
    root: PathBuf,
}

impl LiveFileSystem {
    /// Creates an adapter that resolves relative paths against `root`.
    #[must_use]
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl FileSystem for LiveFileSystem {
    fn exists<'a>(&'a self, path: &'a Path) -> FsFuture<'a, bool> {
        Box::pin(async move { Ok(tokio::fs::try_exists(self.resolve(path)).await?) })
    }

    fn read_to_string<'a>(&'a self, path: &'a Path) -> FsFuture<'a, String> {
        Box::pin(async move { Ok(tokio::fs::read_to_string(self.resolve(path)).await?) })
    }

    fn write<'a>(&'a self, path: &'a Path, contents: &'a str) -> FsFuture<'a, ()> {
        Box::pin(async move {
            let target = self.resolve(path);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            Ok(tokio::fs::write(target, contents).await?)
        })
    }

    fn glob<'a>(&'a self, pattern: &'a str) -> FsFuture<'a, Vec<String>> {
        Box::pin(async move {
            let pattern = GlobPattern::new(pattern)?;
            let root = self.root.clone();
            // Directory walking is blocking; keep it off the runtime thread.
            tokio::task::spawn_blocking(move || pattern.walk(&root))
                .await
                .map_err(|e| format!("glob task failed: {e}"))?
        })
    }
}
