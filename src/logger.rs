//! Invocation-scoped console logging.
//!
//! Messages go through the `log` facade (the binary installs `env_logger`).
//! `info`, `warn` and `error` always emit; `verbose` emits only when the
//! logger was created in verbose mode. A capturing logger additionally keeps
//! a transcript of every emitted line.

use std::sync::{Arc, Mutex};

const LOG_TARGET: &str = "export_project";

/// Two-channel logger carried by one export invocation.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    verbose: bool,
    transcript: Option<Arc<Mutex<Vec<String>>>>,
}

impl Logger {
    /// Creates a logger; `verbose` enables the verbose channel.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose, transcript: None }
    }

    /// Creates a logger that also records every emitted line.
    #[must_use]
    pub fn capturing(verbose: bool) -> Self {
        Self { verbose, transcript: Some(Arc::new(Mutex::new(Vec::new()))) }
    }

    /// Always-on informational line.
    pub fn info(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::info!(target: LOG_TARGET, "{message}");
        self.capture(message);
    }

    /// Always-on warning line.
    pub fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::warn!(target: LOG_TARGET, "{message}");
        self.capture(message);
    }

    /// Always-on error line.
    pub fn error(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::error!(target: LOG_TARGET, "{message}");
        self.capture(message);
    }

    /// Line emitted only in verbose mode.
    pub fn verbose(&self, message: impl AsRef<str>) {
        if self.verbose {
            self.info(message);
        }
    }

    /// Indentation prefix for the given tree depth.
    #[must_use]
    pub fn indent(depth: usize) -> String {
        "  ".repeat(depth)
    }

    /// Lines emitted so far (empty unless created with [`Logger::capturing`]).
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.transcript
            .as_ref()
            .and_then(|transcript| transcript.lock().ok().map(|lines| lines.clone()))
            .unwrap_or_default()
    }

    fn capture(&self, message: &str) {
        if let Some(transcript) = &self.transcript {
            if let Ok(mut lines) = transcript.lock() {
                lines.push(message.to_string());
            }
        }
    }
}

/// Installs `env_logger` with plain message output and an `info` default.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    use std::io::Write;

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .try_init();
}
