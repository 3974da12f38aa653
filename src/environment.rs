//! Type environment gathering: compiler libs, declared `types` packages and
//! auto-discovered declaration files.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use serde_json::Value;

use crate::bundle::{FileKind, ProjectFile};
use crate::error::{ExportError, Result};
use crate::logger::Logger;
use crate::ports::FileSystem;
use crate::resolve::{slash_path, ModuleResolver};

/// Namespaces scanned for declaration files.
pub const DEFINITIONS_PATTERN: &str = "node_modules/{@dojo,@types}/**/*.d.ts";

/// Declaration file shipped twice by the loader package; never bundled.
pub const EXCLUDED_DEFINITION: &str = "@dojo/loader/interfaces.d.ts";

const TYPESCRIPT_LIB_DIR: &str = "node_modules/typescript/lib";

/// String array under `compilerOptions.<option>`.
fn compiler_option_list(tsconfig: &Value, option: &str) -> Vec<String> {
    tsconfig
        .get("compilerOptions")
        .and_then(|options| options.get(option))
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default()
}

async fn read(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    fs.read_to_string(path)
        .await
        .map_err(|source| ExportError::Read { path: slash_path(path), source })
}

/// Reads `lib.<name>.d.ts` from the project's TypeScript install for every
/// `compilerOptions.lib` entry.
///
/// # Errors
///
/// Returns an error if any lib file cannot be read.
pub async fn lib_files(
    fs: &dyn FileSystem,
    tsconfig: &Value,
    log: &Logger,
) -> Result<Vec<ProjectFile>> {
    try_join_all(compiler_option_list(tsconfig, "lib").into_iter().map(|lib| async move {
        let name = format!("lib.{lib}.d.ts");
        let text = read(fs, &Path::new(TYPESCRIPT_LIB_DIR).join(&name)).await?;
        log.verbose(format!("{}{name}", Logger::indent(1)));
        Ok::<_, ExportError>(ProjectFile::with_kind(name, text, FileKind::Lib))
    }))
    .await
}

/// Bundles the manifest and typings of every `compilerOptions.types` package.
///
/// # Errors
///
/// Returns an error if a package manifest cannot be resolved, read or
/// parsed, or if a declared typings file cannot be read.
pub async fn type_files(
    fs: &dyn FileSystem,
    modules: &ModuleResolver,
    tsconfig: &Value,
    log: &Logger,
) -> Result<Vec<ProjectFile>> {
    let packages = compiler_option_list(tsconfig, "types");
    let per_package =
        try_join_all(packages.iter().map(|package| package_type_files(fs, modules, package, log)))
            .await?;
    Ok(per_package.into_iter().flatten().collect())
}

async fn package_type_files(
    fs: &dyn FileSystem,
    modules: &ModuleResolver,
    package: &str,
    log: &Logger,
) -> Result<Vec<ProjectFile>> {
    let manifest_path = modules.resolve(fs, &format!("{package}/package.json")).await?;
    let manifest_name = slash_path(&manifest_path);
    let text = read(fs, &manifest_path).await?;
    let manifest: Value = serde_json::from_str(&text)
        .map_err(|source| ExportError::Parse { path: manifest_name.clone(), source })?;
    log.verbose(format!("{}{manifest_name}", Logger::indent(1)));

    let mut files = vec![ProjectFile::with_kind(manifest_name.clone(), text, FileKind::Json)];

    let typings = ["typings", "types"]
        .iter()
        .find_map(|field| manifest.get(*field).and_then(Value::as_str));
    if let Some(typings) = typings {
        let package_root = manifest_path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
        let typings_path = package_root.join(typings);
        let text = read(fs, &typings_path).await?;
        let name = slash_path(&typings_path);
        log.verbose(format!("{}{name}", Logger::indent(1)));
        files.push(ProjectFile::with_kind(name, text, FileKind::Definition));
        return Ok(files);
    }

    log.warn(format!("Could not find typings in {manifest_name}, falling back to index.d.ts"));
    if let Some(fallback) = fallback_index(fs, modules, package).await {
        log.verbose(format!("{}{}", Logger::indent(1), fallback.name));
        files.push(fallback);
    }
    Ok(files)
}

/// `<package>/index.d.ts`, if it resolves and reads.
async fn fallback_index(
    fs: &dyn FileSystem,
    modules: &ModuleResolver,
    package: &str,
) -> Option<ProjectFile> {
    let path = modules.resolve(fs, &format!("{package}/index.d.ts")).await.ok()?;
    let text = fs.read_to_string(&path).await.ok()?;
    Some(ProjectFile::with_kind(slash_path(&path), text, FileKind::Definition))
}

/// Reads every declaration file under the `@dojo` and `@types` namespaces.
///
/// # Errors
///
/// Returns an error if the namespaces cannot be scanned or a match cannot be read.
pub async fn definition_files(fs: &dyn FileSystem, log: &Logger) -> Result<Vec<ProjectFile>> {
    let matches = fs.glob(DEFINITIONS_PATTERN).await.map_err(|source| ExportError::Glob {
        pattern: DEFINITIONS_PATTERN.to_string(),
        source,
    })?;

    try_join_all(matches.into_iter().filter(|name| !name.ends_with(EXCLUDED_DEFINITION)).map(
        |name| async move {
            let text = read(fs, Path::new(&name)).await?;
            log.verbose(format!("{}{name}", Logger::indent(1)));
            Ok::<_, ExportError>(ProjectFile::with_kind(name, text, FileKind::Definition))
        },
    ))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemFs;
    use serde_json::json;

    fn resolver() -> ModuleResolver {
        ModuleResolver::for_project(Path::new("/work/app"))
    }

    #[tokio::test]
    async fn lib_files_are_read_from_typescript() {
        let fs = MemFs::new()
            .with_file("node_modules/typescript/lib/lib.dom.d.ts", "interface Node {}")
            .with_file("node_modules/typescript/lib/lib.es2015.d.ts", "interface Map<K, V> {}");
        let tsconfig = json!({"compilerOptions": {"lib": ["dom", "es2015"]}});

        let files = lib_files(&fs, &tsconfig, &Logger::new(false)).await.unwrap();
        assert_eq!(
            files,
            vec![
                ProjectFile::with_kind("lib.dom.d.ts", "interface Node {}", FileKind::Lib),
                ProjectFile::with_kind("lib.es2015.d.ts", "interface Map<K, V> {}", FileKind::Lib),
            ]
        );
    }

    #[tokio::test]
    async fn missing_lib_file_aborts() {
        let fs = MemFs::new();
        let tsconfig = json!({"compilerOptions": {"lib": ["es2017"]}});
        let err = lib_files(&fs, &tsconfig, &Logger::new(false)).await.unwrap_err();
        assert!(err.to_string().contains("lib.es2017.d.ts"));
    }

    #[tokio::test]
    async fn no_lib_option_means_no_files() {
        let fs = MemFs::new();
        let files = lib_files(&fs, &json!({"compilerOptions": {}}), &Logger::new(false))
            .await
            .unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn types_packages_contribute_manifest_and_typings() {
        let fs = MemFs::new()
            .with_file("node_modules/foo/package.json", r#"{"typings":"./foo.d.ts"}"#)
            .with_file("node_modules/foo/foo.d.ts", "declare module 'foo';")
            .with_file("node_modules/bar/package.json", r#"{"types":"dist/bar.d.ts"}"#)
            .with_file("node_modules/bar/dist/bar.d.ts", "declare module 'bar';");
        let tsconfig = json!({"compilerOptions": {"types": ["foo", "bar"]}});

        let files = type_files(&fs, &resolver(), &tsconfig, &Logger::new(false)).await.unwrap();
        let summary: Vec<(&str, FileKind)> =
            files.iter().map(|f| (f.name.as_str(), f.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("node_modules/foo/package.json", FileKind::Json),
                ("node_modules/foo/foo.d.ts", FileKind::Definition),
                ("node_modules/bar/package.json", FileKind::Json),
                ("node_modules/bar/dist/bar.d.ts", FileKind::Definition),
            ]
        );
        assert_eq!(files[0].text, r#"{"typings":"./foo.d.ts"}"#);
    }

    #[tokio::test]
    async fn missing_typings_warns_and_gives_up_quietly() {
        let fs = MemFs::new()
            .with_file("node_modules/foo/package.json", r#"{"typings":"index.d.ts"}"#)
            .with_file("node_modules/foo/index.d.ts", "")
            .with_file("node_modules/bar/package.json", r#"{"types":"index.d.ts"}"#)
            .with_file("node_modules/bar/index.d.ts", "")
            .with_file("node_modules/baz/package.json", r#"{"name":"baz"}"#);
        let tsconfig = json!({"compilerOptions": {"types": ["foo", "bar", "baz"]}});
        let log = Logger::capturing(false);

        let files = type_files(&fs, &resolver(), &tsconfig, &log).await.unwrap();

        let baz: Vec<&ProjectFile> =
            files.iter().filter(|f| f.name.starts_with("node_modules/baz/")).collect();
        assert_eq!(baz.len(), 1);
        assert_eq!(baz[0].kind, FileKind::Json);
        assert_eq!(files.len(), 5);
        assert_eq!(
            log.lines(),
            vec![
                "Could not find typings in node_modules/baz/package.json, falling back to index.d.ts"
            ]
        );
    }

    #[tokio::test]
    async fn missing_typings_falls_back_to_index() {
        let fs = MemFs::new()
            .with_file("node_modules/baz/package.json", "{}")
            .with_file("node_modules/baz/index.d.ts", "declare const baz: 1;");
        let tsconfig = json!({"compilerOptions": {"types": ["baz"]}});

        let files = type_files(&fs, &resolver(), &tsconfig, &Logger::new(false)).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].name, "node_modules/baz/index.d.ts");
        assert_eq!(files[1].kind, FileKind::Definition);
    }

    #[tokio::test]
    async fn unresolvable_types_package_aborts() {
        let fs = MemFs::new();
        let tsconfig = json!({"compilerOptions": {"types": ["ghost"]}});
        let err = type_files(&fs, &resolver(), &tsconfig, &Logger::new(false)).await.unwrap_err();
        assert!(matches!(err, ExportError::Unresolved { .. }));
    }

    #[tokio::test]
    async fn unparsable_types_manifest_aborts() {
        let fs = MemFs::new().with_file("node_modules/foo/package.json", "nope");
        let tsconfig = json!({"compilerOptions": {"types": ["foo"]}});
        let err = type_files(&fs, &resolver(), &tsconfig, &Logger::new(false)).await.unwrap_err();
        assert!(matches!(err, ExportError::Parse { .. }));
    }

    #[tokio::test]
    async fn definitions_skip_the_loader_duplicate() {
        let fs = MemFs::new()
            .with_file("node_modules/@dojo/core/main.d.ts", "core")
            .with_file("node_modules/@dojo/loader/interfaces.d.ts", "dupe")
            .with_file("node_modules/@dojo/loader/loader.d.ts", "loader")
            .with_file("node_modules/@types/node/index.d.ts", "node")
            .with_file("node_modules/@other/pkg/index.d.ts", "other")
            .with_file("node_modules/@types/node/package.json", "{}");

        let files = definition_files(&fs, &Logger::new(false)).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "node_modules/@dojo/core/main.d.ts",
                "node_modules/@dojo/loader/loader.d.ts",
                "node_modules/@types/node/index.d.ts",
            ]
        );
        assert!(files.iter().all(|f| f.kind == FileKind::Definition));
    }
}
