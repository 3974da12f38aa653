//! Glob pattern compilation shared by the filesystem adapters.
//!
//! Patterns use `/` separators, `*`/`?` within one segment, `**` across
//! segments and `{a,b}` alternation. A leading `./` is kept on every match
//! so callers see names the way they wrote the pattern.

use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};
use walkdir::{DirEntry, WalkDir};

use crate::ports::PortError;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// A compiled glob pattern rooted at a project directory.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    dot_prefix: bool,
    bases: Vec<String>,
    matcher: GlobMatcher,
}

impl GlobPattern {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid glob.
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        let normalized = pattern.replace('\\', "/");
        let (dot_prefix, body) = match normalized.strip_prefix("./") {
            Some(rest) => (true, rest.to_string()),
            None => (false, normalized),
        };
        let matcher = GlobBuilder::new(&body).literal_separator(true).build()?.compile_matcher();

        // Directories free of glob syntax where walking starts; a plain
        // `{a,b}` segment fans out into one base per alternative.
        let segments: Vec<&str> = body.split('/').collect();
        let mut bases = vec![String::new()];
        for segment in &segments[..segments.len().saturating_sub(1)] {
            let alternatives = match alternation(segment) {
                Some(alternatives) => alternatives,
                None if segment.contains(GLOB_META) => break,
                None => vec![*segment],
            };
            bases = bases
                .iter()
                .flat_map(|base| alternatives.iter().map(move |alt| join_segment(base, alt)))
                .collect();
        }

        Ok(Self { dot_prefix, bases, matcher })
    }

    /// Returns `true` if a root-relative, `/`-separated path matches.
    #[must_use]
    pub fn is_match(&self, relative: &str) -> bool {
        self.matcher.is_match(relative)
    }

    /// Formats a matched root-relative path the way the pattern was written.
    #[must_use]
    pub fn display(&self, relative: &str) -> String {
        if self.dot_prefix {
            format!("./{relative}")
        } else {
            relative.to_string()
        }
    }

    /// Picks the matching entries out of a list of root-relative paths.
    #[must_use]
    pub fn select<'a>(&self, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut matches: Vec<String> = candidates
            .into_iter()
            .filter(|candidate| self.is_match(candidate))
            .map(|candidate| self.display(candidate))
            .collect();
        matches.sort();
        matches
    }

    /// Walks `root` from the pattern's base directories and returns every
    /// matching file. Symlinks are followed; hidden entries below a base are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read.
    pub fn walk(&self, root: &Path) -> Result<Vec<String>, PortError> {
        let mut matches = Vec::new();
        for base in &self.bases {
            let start = if base.is_empty() { root.to_path_buf() } else { root.join(base) };
            if !start.is_dir() {
                continue;
            }
            let walker = WalkDir::new(&start)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    // A link back to an ancestor has already been walked.
                    Err(err) if err.loop_ancestor().is_some() => continue,
                    Err(err) => return Err(err.into()),
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = slash_relative(root, entry.path())?;
                if self.is_match(&relative) {
                    matches.push(self.display(&relative));
                }
            }
        }
        matches.sort();
        matches.dedup();
        Ok(matches)
    }
}

/// Alternatives of a segment written exactly as `{a,b,...}` with literal parts.
fn alternation(segment: &str) -> Option<Vec<&str>> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    let alternatives: Vec<&str> = inner.split(',').collect();
    alternatives
        .iter()
        .all(|alt| !alt.is_empty() && !alt.contains(GLOB_META) && !alt.contains('}'))
        .then_some(alternatives)
}

fn join_segment(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{base}/{segment}")
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn slash_relative(root: &Path, path: &Path) -> Result<String, PortError> {
    let relative = path.strip_prefix(root)?;
    Ok(relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
