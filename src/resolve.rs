//! Node-style module resolution through the filesystem port.
//!
//! A request such as `@types/node/package.json` is looked up in
//! `node_modules` of the project directory and then of each of its
//! ancestors. Resolved paths stay relative to the project directory
//! (`node_modules/...`, `../node_modules/...`).

use std::path::{Component, Path, PathBuf};

use crate::error::{ExportError, Result};
use crate::ports::FileSystem;

/// Resolves module requests for one project.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    search_dirs: Vec<PathBuf>,
}

impl ModuleResolver {
    /// Builds the lookup chain for the project at `project_dir`.
    #[must_use]
    pub fn for_project(project_dir: &Path) -> Self {
        let mut search_dirs = Vec::new();
        let mut up = PathBuf::new();
        for _ in project_dir.ancestors() {
            search_dirs.push(up.join("node_modules"));
            up.push("..");
        }
        Self { search_dirs }
    }

    /// Returns the first existing `node_modules/<request>` along the chain.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Unresolved`] if no candidate exists, or
    /// [`ExportError::Exists`] if a candidate cannot be checked.
    pub async fn resolve(&self, fs: &dyn FileSystem, request: &str) -> Result<PathBuf> {
        for dir in &self.search_dirs {
            let candidate = dir.join(request);
            let found = fs
                .exists(&candidate)
                .await
                .map_err(|source| ExportError::Exists { path: slash_path(&candidate), source })?;
            if found {
                return Ok(candidate);
            }
        }
        Err(ExportError::Unresolved { request: request.to_string() })
    }
}

/// Lexically normalized, `/`-separated form of a path.
///
/// `.` segments are dropped and `..` folds into a preceding normal segment.
#[must_use]
pub fn slash_path(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut absolute = false;
    for component in path.components() {
        match component {
            Component::RootDir => absolute = true,
            Component::Prefix(prefix) => parts.push(prefix.as_os_str().to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|last| last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..".to_string());
                }
            }
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}
