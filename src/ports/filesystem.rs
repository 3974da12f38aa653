//! Filesystem port for project I/O.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

/// Error type returned by port implementations.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future type alias used by [`FileSystem`] to keep the trait dyn-compatible.
pub type FsFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;

/// Provides filesystem access for the export pipeline.
///
/// Relative paths are interpreted against the project directory the
/// implementation was rooted at; absolute paths are used as given.
/// Abstracting the filesystem allows deterministic replay and testing
/// without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Resolves to `true` if the path exists.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined (permissions, etc.).
    fn exists<'a>(&'a self, path: &'a Path) -> FsFuture<'a, bool>;

    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string<'a>(&'a self, path: &'a Path) -> FsFuture<'a, String>;

    /// Writes the given contents to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write<'a>(&'a self, path: &'a Path, contents: &'a str) -> FsFuture<'a, ()>;

    /// Expands a glob pattern against the project directory.
    ///
    /// Matches are files only, sorted, with `/` separators. A pattern
    /// written with a leading `./` yields `./`-prefixed matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid or a directory cannot be walked.
    fn glob<'a>(&'a self, pattern: &'a str) -> FsFuture<'a, Vec<String>>;
}
