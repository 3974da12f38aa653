//! Export orchestration: preconditions, concurrent gathering, index
//! validation and the final write.

use std::env;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::bundle::ProjectBundle;
use crate::collect::{self, DEFAULT_CONTENT};
use crate::context::ServiceContext;
use crate::dependencies::DependencyResolver;
use crate::environment;
use crate::error::{ExportError, Result};
use crate::logger::Logger;
use crate::ports::FileSystem;
use crate::resolve::{slash_path, ModuleResolver};

/// Project manifest file name.
pub const PACKAGE_JSON: &str = "package.json";
/// Compiler configuration file name.
pub const TSCONFIG_JSON: &str = "tsconfig.json";
/// Optional tooling configuration file name.
pub const DOJORC: &str = ".dojorc";

/// Default entry file looked up among the collected files.
pub const DEFAULT_INDEX: &str = "./src/index.html";

/// Options for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Comma-delimited extensions collected for each include pattern.
    pub content: String,
    /// Name of the entry file.
    pub index: String,
    /// Output directory, relative to the invocation directory.
    pub out: PathBuf,
    /// Project directory, relative to the invocation directory.
    pub project: PathBuf,
    /// Log every discovered item.
    pub verbose: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            content: DEFAULT_CONTENT.to_string(),
            index: DEFAULT_INDEX.to_string(),
            out: PathBuf::from("."),
            project: PathBuf::from("."),
            verbose: false,
        }
    }
}

/// The invocation directory and the project directory resolved against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    /// Where the export was invoked from; `out` resolves against it.
    pub original: PathBuf,
    /// Root of the exported project.
    pub project: PathBuf,
}

impl Directories {
    /// Resolves `project` against `original`.
    #[must_use]
    pub fn new(original: PathBuf, project: &Path) -> Self {
        let project = if project == Path::new(".") {
            original.clone()
        } else {
            original.join(project)
        };
        Self { original, project }
    }

    /// Location of the bundle file `file_name` inside the output directory `out`.
    #[must_use]
    pub fn output_path(&self, out: &Path, file_name: &str) -> PathBuf {
        let dir = if out == Path::new(".") {
            self.original.clone()
        } else {
            self.original.join(out)
        };
        dir.join(file_name)
    }

    /// `path` relative to the invocation directory, when it lies below it.
    #[must_use]
    pub fn display(&self, path: &Path) -> String {
        path.strip_prefix(&self.original).map_or_else(|_| slash_path(path), slash_path)
    }
}

/// Runs an export from the current working directory, choosing the
/// filesystem adapter from the environment.
///
/// Export failures are logged and yield `Ok(None)`.
///
/// # Errors
///
/// Returns an error only when a cassette cannot be loaded or written.
pub async fn export_project(
    options: &ExportOptions,
    log: Logger,
) -> std::result::Result<Option<PathBuf>, String> {
    let original = match env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            report(&log, &ExportError::CurrentDir(err));
            return Ok(None);
        }
    };
    let dirs = Directories::new(original, &options.project);
    let ctx = ServiceContext::from_env(&dirs.project, log.clone())?;
    let written = run(&ctx, &dirs, options).await;
    if let Some(cassette) = ctx.finish()? {
        log.verbose(format!("Recorded filesystem cassette {}", dirs.display(&cassette)));
    }
    Ok(written)
}

/// Runs one export, logging the outcome.
///
/// Returns the written bundle path, or `None` after logging the failure.
pub async fn run(
    ctx: &ServiceContext,
    dirs: &Directories,
    options: &ExportOptions,
) -> Option<PathBuf> {
    ctx.log.info(format!("Exporting project {}", slash_path(&dirs.project)));
    match export(ctx, dirs, options).await {
        Ok(path) => {
            ctx.log.info(format!("Project exported to {}", dirs.display(&path)));
            Some(path)
        }
        Err(err) => {
            report(&ctx.log, &err);
            None
        }
    }
}

fn report(log: &Logger, err: &ExportError) {
    log.error(err.to_string());
    log.error(err.detail());
}

/// Builds and writes the bundle, returning its path.
///
/// # Errors
///
/// Returns the first failure of any phase; nothing is written in that case.
pub async fn export(
    ctx: &ServiceContext,
    dirs: &Directories,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let fs = ctx.fs.as_ref();
    let log = &ctx.log;

    if !(exists(fs, PACKAGE_JSON).await? && exists(fs, TSCONFIG_JSON).await?) {
        return Err(ExportError::MissingRequiredFiles { dir: dirs.project.clone() });
    }

    let mut bundle = ProjectBundle::new(
        load_json(fs, PACKAGE_JSON).await?,
        load_json(fs, TSCONFIG_JSON).await?,
    );
    if exists(fs, DOJORC).await? {
        bundle.dojorc = Some(load_json(fs, DOJORC).await?);
    }

    let modules = ModuleResolver::for_project(&dirs.project);
    let resolver = DependencyResolver::new(fs, &modules, log);
    let (libs, types, definitions, files, dependencies) = tokio::try_join!(
        environment::lib_files(fs, &bundle.tsconfig, log),
        environment::type_files(fs, &modules, &bundle.tsconfig, log),
        environment::definition_files(fs, log),
        collect::collect_project_files(fs, &bundle.tsconfig, &options.content, log),
        async { Ok::<_, ExportError>(resolver.resolve_project(&bundle.package).await) },
    )?;

    bundle.environment_files = libs.into_iter().chain(types).chain(definitions).collect();
    bundle.files = files;
    bundle.dependencies = dependencies;
    log.verbose(format!(
        "Collected {} project file(s), {} environment file(s), {} production and {} development dependencies",
        bundle.files.len(),
        bundle.environment_files.len(),
        bundle.dependencies.production.len(),
        bundle.dependencies.development.len(),
    ));

    if bundle.has_file(&options.index) {
        bundle.index.clone_from(&options.index);
    } else {
        log.error(format!("Index file {} not found in project files", options.index));
    }

    let path = dirs.output_path(&options.out, &bundle.file_name());
    let json = serde_json::to_string(&bundle).map_err(ExportError::Serialize)?;
    fs.write(&path, &json)
        .await
        .map_err(|source| ExportError::Write { path: path.clone(), source })?;
    Ok(path)
}

async fn exists(fs: &dyn FileSystem, name: &str) -> Result<bool> {
    fs.exists(Path::new(name))
        .await
        .map_err(|source| ExportError::Exists { path: name.to_string(), source })
}

async fn load_json(fs: &dyn FileSystem, name: &str) -> Result<Value> {
    let text = fs
        .read_to_string(Path::new(name))
        .await
        .map_err(|source| ExportError::Read { path: name.to_string(), source })?;
    serde_json::from_str(&text).map_err(|source| ExportError::Parse { path: name.to_string(), source })
}
