//! Flattened dependency graph resolution.
//!
//! Starting from the project's declared dependencies, each package's own
//! `package.json` is located through module resolution and its
//! `peerDependencies` and `dependencies` become the next frontier. The walk
//! is level by level: every manifest of one frontier is loaded concurrently,
//! then merged in frontier order before descending.
//!
//! The first version seen for a name wins for the whole walk. Within one
//! manifest, `dependencies` override `peerDependencies`. Packages whose
//! manifest cannot be found or parsed still appear in the result; they just
//! contribute nothing further.

use std::collections::HashSet;

use futures::future::{join_all, BoxFuture};
use serde_json::Value;

use crate::bundle::{Dependencies, DependencyMap};
use crate::logger::Logger;
use crate::ports::FileSystem;
use crate::resolve::{slash_path, ModuleResolver};

const PRODUCTION_FIELDS: &[&str] = &["peerDependencies", "dependencies"];
const DEVELOPMENT_FIELDS: &[&str] = &["devDependencies"];

/// Collects the named dependency maps of a manifest; later fields override earlier ones.
#[must_use]
pub fn declared_dependencies(manifest: &Value, fields: &[&str]) -> DependencyMap {
    let mut merged = DependencyMap::new();
    for field in fields {
        let Some(entries) = manifest.get(*field).and_then(Value::as_object) else {
            continue;
        };
        for (name, version) in entries {
            if let Some(version) = version.as_str() {
                merged.insert(name.clone(), version.to_string());
            }
        }
    }
    merged
}

/// Walks package manifests to flatten dependency graphs.
pub struct DependencyResolver<'a> {
    fs: &'a dyn FileSystem,
    modules: &'a ModuleResolver,
    log: &'a Logger,
}

impl<'a> DependencyResolver<'a> {
    /// Creates a resolver reading manifests through `fs`.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, modules: &'a ModuleResolver, log: &'a Logger) -> Self {
        Self { fs, modules, log }
    }

    /// Resolves the production and development graphs of a project manifest.
    ///
    /// The two graphs are walked independently, each with its own visited set.
    pub async fn resolve_project(&self, package: &Value) -> Dependencies {
        let production = declared_dependencies(package, PRODUCTION_FIELDS);
        let development = declared_dependencies(package, DEVELOPMENT_FIELDS);
        let (production, development) =
            tokio::join!(self.flatten(production), self.flatten(development));
        Dependencies { production, development }
    }

    /// Flattens everything reachable from `frontier`.
    pub async fn flatten(&self, frontier: DependencyMap) -> DependencyMap {
        let mut visited = HashSet::new();
        self.resolve_level(frontier, &mut visited, 0).await
    }

    fn resolve_level<'s>(
        &'s self,
        frontier: DependencyMap,
        visited: &'s mut HashSet<String>,
        depth: usize,
    ) -> BoxFuture<'s, DependencyMap> {
        Box::pin(async move {
            let fresh: Vec<(String, String)> =
                frontier.into_iter().filter(|(name, _)| visited.insert(name.clone())).collect();

            let manifests = join_all(
                fresh.iter().map(|(name, version)| self.load_manifest(name, version, depth)),
            )
            .await;

            let mut resolved = DependencyMap::new();
            let mut next = DependencyMap::new();
            for ((name, version), manifest) in fresh.into_iter().zip(manifests) {
                resolved.entry(name).or_insert(version);
                let Some(manifest) = manifest else { continue };
                for (dependency, version) in declared_dependencies(&manifest, PRODUCTION_FIELDS) {
                    next.entry(dependency).or_insert(version);
                }
            }

            if !next.is_empty() {
                for (name, version) in self.resolve_level(next, visited, depth + 1).await {
                    resolved.entry(name).or_insert(version);
                }
            }
            resolved
        })
    }

    /// Loads `<name>/package.json`; any failure means "no information".
    async fn load_manifest(&self, name: &str, version: &str, depth: usize) -> Option<Value> {
        let indent = Logger::indent(depth + 1);
        let request = format!("{name}/package.json");
        let path = match self.modules.resolve(self.fs, &request).await {
            Ok(path) => path,
            Err(err) => {
                self.log.verbose(format!("{indent}{name}@{version} skipped: {err}"));
                return None;
            }
        };
        let display = slash_path(&path);
        let text = match self.fs.read_to_string(&path).await {
            Ok(text) => text,
            Err(err) => {
                self.log.verbose(format!("{indent}{name}@{version} skipped: cannot read {display}: {err}"));
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(manifest) => {
                self.log.verbose(format!("{indent}{name}@{version} ({display})"));
                Some(manifest)
            }
            Err(err) => {
                self.log.verbose(format!("{indent}{name}@{version} skipped: cannot parse {display}: {err}"));
                None
            }
        }
    }
}
