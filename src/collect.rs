//! Project source collection from the compiler configuration's `include` list.

use std::path::Path;

use futures::future::try_join_all;
use serde_json::Value;

use crate::bundle::ProjectFile;
use crate::error::{ExportError, Result};
use crate::logger::Logger;
use crate::ports::FileSystem;

/// Default content extensions collected for each include pattern.
pub const DEFAULT_CONTENT: &str = "ts,html,css,json,xml,md";

/// Rewrites an include pattern's trailing `.d.ts`/`.ts` into an extension alternation.
///
/// `src/**/*.ts` with `ts,html` becomes `src/**/*.{ts,html}`. Patterns with
/// another ending are returned unchanged.
#[must_use]
pub fn widen_pattern(pattern: &str, extensions: &[&str]) -> String {
    let Some(stem) = pattern.strip_suffix(".d.ts").or_else(|| pattern.strip_suffix(".ts")) else {
        return pattern.to_string();
    };
    match extensions {
        [] => pattern.to_string(),
        [single] => format!("{stem}.{single}"),
        many => format!("{stem}.{{{}}}", many.join(",")),
    }
}

/// Splits a comma-delimited extension list, dropping blanks and leading dots.
#[must_use]
pub fn parse_extensions(content: &str) -> Vec<&str> {
    content
        .split(',')
        .map(|extension| extension.trim().trim_start_matches('.'))
        .filter(|extension| !extension.is_empty())
        .collect()
}

/// The `include` patterns of a compiler configuration, if any.
#[must_use]
pub fn include_patterns(tsconfig: &Value) -> Vec<String> {
    tsconfig
        .get("include")
        .and_then(Value::as_array)
        .map(|patterns| patterns.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default()
}

/// Reads every file matched by the widened include patterns.
///
/// Matches are kept in pattern order; a file matched by two patterns is
/// collected twice.
///
/// # Errors
///
/// Returns an error if any pattern cannot be expanded or any match cannot be read.
pub async fn collect_project_files(
    fs: &dyn FileSystem,
    tsconfig: &Value,
    content: &str,
    log: &Logger,
) -> Result<Vec<ProjectFile>> {
    let extensions = parse_extensions(content);
    let mut matches = Vec::new();
    for include in include_patterns(tsconfig) {
        let pattern = widen_pattern(&include, &extensions);
        let found = fs
            .glob(&pattern)
            .await
            .map_err(|source| ExportError::Glob { pattern: pattern.clone(), source })?;
        log.verbose(format!("{pattern}: {} file(s)", found.len()));
        matches.extend(found);
    }

    try_join_all(matches.into_iter().map(|name| async move {
        let text = fs
            .read_to_string(Path::new(&name))
            .await
            .map_err(|source| ExportError::Read { path: name.clone(), source })?;
        log.verbose(format!("{}{name}", Logger::indent(1)));
        Ok::<_, ExportError>(ProjectFile::classified(name, text))
    }))
    .await
}
