//! The exported project bundle and its file records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered map of dependency name to requested version.
pub type DependencyMap = IndexMap<String, String>;

/// Semantic classification of a bundled file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    /// TypeScript source.
    TypeScript,
    /// HTML document.
    #[serde(rename = "HTML")]
    Html,
    /// Stylesheet.
    #[serde(rename = "CSS")]
    Css,
    /// JSON document.
    #[serde(rename = "JSON")]
    Json,
    /// XML document.
    #[serde(rename = "XML")]
    Xml,
    /// Markdown document.
    Markdown,
    /// Type declaration file (`.d.ts`).
    Definition,
    /// Declaration file shipped with the TypeScript compiler.
    Lib,
    /// Anything else.
    PlainText,
}

impl FileKind {
    /// Classifies a path by its extension.
    ///
    /// `.d.ts` files are [`FileKind::Definition`]; [`FileKind::Lib`] is never
    /// inferred, only assigned by where a file came from.
    #[must_use]
    pub fn classify(path: &str) -> Self {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let Some((_, extension)) = file_name.rsplit_once('.') else {
            return Self::PlainText;
        };
        match extension {
            "ts" if file_name.ends_with(".d.ts") => Self::Definition,
            "ts" => Self::TypeScript,
            "html" => Self::Html,
            "css" => Self::Css,
            "json" => Self::Json,
            "xml" => Self::Xml,
            "md" => Self::Markdown,
            _ => Self::PlainText,
        }
    }
}

/// A file captured in the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Path as discovered, relative to the project directory.
    pub name: String,
    /// File contents.
    pub text: String,
    /// Classification.
    #[serde(rename = "type")]
    pub kind: FileKind,
}

impl ProjectFile {
    /// Creates a file record, classifying it from its name.
    #[must_use]
    pub fn classified(name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        let kind = FileKind::classify(&name);
        Self { name, text: text.into(), kind }
    }

    /// Creates a file record with an explicit kind.
    #[must_use]
    pub fn with_kind(name: impl Into<String>, text: impl Into<String>, kind: FileKind) -> Self {
        Self { name: name.into(), text: text.into(), kind }
    }
}

/// Flattened production and development dependency graphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    /// Everything reachable from `peerDependencies` and `dependencies`.
    pub production: DependencyMap,
    /// Everything reachable from `devDependencies`.
    pub development: DependencyMap,
}

/// The single JSON document written by an export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBundle {
    /// Verbatim `package.json`.
    pub package: Value,
    /// Verbatim `tsconfig.json`.
    pub tsconfig: Value,
    /// Verbatim `.dojorc`, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dojorc: Option<Value>,
    /// Resolved dependency graphs.
    pub dependencies: Dependencies,
    /// Project source and content files.
    pub files: Vec<ProjectFile>,
    /// Compiler libs and type declarations.
    pub environment_files: Vec<ProjectFile>,
    /// Name of the entry file in `files`, or empty.
    pub index: String,
}

impl ProjectBundle {
    /// Creates a bundle around the loaded manifest and compiler configuration.
    #[must_use]
    pub fn new(package: Value, tsconfig: Value) -> Self {
        Self { package, tsconfig, ..Self::default() }
    }

    /// Output file name derived from the manifest's `name`.
    ///
    /// Only the first path separator is replaced with `-`.
    #[must_use]
    pub fn file_name(&self) -> String {
        let name = self.package.get("name").and_then(Value::as_str).unwrap_or("bundle");
        let sanitized = match name.find(['/', '\\']) {
            Some(at) => format!("{}-{}", &name[..at], &name[at + 1..]),
            None => name.to_string(),
        };
        format!("{sanitized}.project.json")
    }

    /// Whether `files` contains an entry with exactly this name.
    #[must_use]
    pub fn has_file(&self, name: &str) -> bool {
        self.files.iter().any(|file| file.name == name)
    }
}
