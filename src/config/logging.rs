//! Log sink setup.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::errors::{AppError, ErrorCode, StructuredError};

/// Logging context built once in `main` and kept for the life of the process.
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to the
/// log file when one is configured (the TUI owns the terminal), otherwise to
/// stderr.
#[derive(Debug, Clone)]
pub struct LogContext {
    level: String,
    path: Option<PathBuf>,
    pretty: bool,
}

impl LogContext {
    /// Installs the global subscriber.
    ///
    /// `level` is a filter directive such as `info` or `epub_downloader=debug`.
    /// Installing twice keeps the first subscriber.
    ///
    /// # Errors
    ///
    /// Returns `STOR_002` when the log file cannot be opened.
    pub fn init(level: &str, path: Option<&Path>, pretty: bool) -> Result<Self, AppError> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let writer = match path {
            Some(path) => BoxMakeWriter::new(Mutex::new(open_log_file(path)?)),
            None => BoxMakeWriter::new(std::io::stderr),
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false);
        let installed = if pretty {
            builder.try_init()
        } else {
            builder.json().try_init()
        };
        if installed.is_err() {
            debug!("tracing subscriber already installed");
        }

        Ok(Self {
            level: level.to_string(),
            path: path.map(Path::to_path_buf),
            pretty,
        })
    }

    /// Returns the configured filter directive.
    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Returns the log file, or `None` when logging to stderr.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns `true` for human-readable output, `false` for JSON lines.
    #[must_use]
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

fn open_log_file(path: &Path) -> Result<fs::File, AppError> {
    let open = || {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };

    open().map_err(|e| {
        StructuredError::new(
            ErrorCode::File,
            format!("failed to open log file {}", path.display()),
            "The log file could not be opened.",
            false,
        )
        .with_cause(e)
        .into()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_init_creates_log_file_and_parent_dirs() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("logs").join("app.log");

        let context = LogContext::init("info", Some(&path), true).unwrap();
        assert!(path.exists());
        assert_eq!(context.path(), Some(path.as_path()));
        assert_eq!(context.level(), "info");
        assert!(context.is_pretty());
    }

    #[test]
    fn test_init_unwritable_path_is_file_error() {
        let tempdir = TempDir::new().unwrap();
        let blocker = tempdir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = LogContext::init("info", Some(&blocker.join("app.log")), false).unwrap_err();
        assert_eq!(err.code(), "STOR_002");
    }
}
