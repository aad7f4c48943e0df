//! On-disk cookie persistence.
//!
//! Cookies are written as a pretty-printed JSON array in the same format the
//! importer accepts, so a saved file can be re-imported by hand. On Unix the
//! file is restricted to the owner (`0600`).

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::cookies::{Cookie, CookieRecord, parse_cookies_json};
use crate::errors::{AppError, ErrorCode, StructuredError};

/// Persists session cookies to a single JSON file.
#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    /// Creates a store backed by `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `cookies` to disk, replacing any previous file.
    ///
    /// # Errors
    ///
    /// Returns `VAL_002` when `cookies` is empty and `STOR_002` when the file
    /// cannot be written.
    #[instrument(skip(self, cookies), fields(path = %self.path.display(), count = cookies.len()))]
    pub fn save(&self, cookies: &[Cookie]) -> Result<(), AppError> {
        if cookies.is_empty() {
            return Err(StructuredError::new(
                ErrorCode::InvalidInput,
                "no cookies to save",
                "There are no cookies to save.",
                false,
            )
            .into());
        }

        let records = cookies
            .iter()
            .map(CookieRecord::from_cookie)
            .collect::<Vec<_>>();
        let json = serde_json::to_string_pretty(&records).map_err(|e| {
            file_error(format!("failed to serialize cookies: {e}")).with_cause(e)
        })?;

        write_owner_only(&self.path, json.as_bytes()).map_err(|e| {
            file_error(format!(
                "failed to write cookies file {}",
                self.path.display()
            ))
            .with_cause(e)
        })?;

        info!("saved session cookies");
        Ok(())
    }

    /// Reads and parses the saved cookies.
    ///
    /// # Errors
    ///
    /// Returns `STOR_002` when the file is missing or unreadable; parse
    /// failures are returned unchanged (`AUTH_004`).
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Vec<Cookie>, AppError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(file_error(format!(
                    "cookies file not found: {}",
                    self.path.display()
                ))
                .into());
            }
            Err(e) => {
                return Err(file_error(format!(
                    "failed to read cookies file {}",
                    self.path.display()
                ))
                .with_cause(e)
                .into());
            }
        };

        let cookies = parse_cookies_json(&text)?;
        debug!(count = cookies.len(), "loaded saved cookies");
        Ok(cookies)
    }

    /// Returns `true` when a saved cookie file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Deletes the saved cookie file. Deleting a missing file succeeds.
    ///
    /// # Errors
    ///
    /// Returns `STOR_002` when an existing file cannot be removed.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn delete(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("deleted saved cookies");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(file_error(format!(
                "failed to delete cookies file {}",
                self.path.display()
            ))
            .with_cause(e)
            .into()),
        }
    }
}

fn file_error(message: String) -> StructuredError {
    StructuredError::new(
        ErrorCode::File,
        message,
        "Could not access the saved session file.",
        false,
    )
}

fn write_owner_only(path: &Path, payload: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = open_owner_only(path)?;
    // A pre-existing file keeps its old mode on open.
    set_owner_only_permissions(path)?;
    file.write_all(payload)?;
    file.sync_all()
}

/// Opens `path` for writing, creating it as `0600` on Unix so the cookies are
/// never readable by others, not even before the first byte is written.
fn open_owner_only(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
