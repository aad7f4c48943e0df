//! Application directory layout.
//!
//! Directories follow the XDG base directory rules, falling back to `$HOME`:
//!
//! | Kind      | Location                                                    |
//! |-----------|-------------------------------------------------------------|
//! | config    | `$XDG_CONFIG_HOME/epub-downloader` or `~/.config/epub-downloader` |
//! | data      | `$XDG_DATA_HOME/epub-downloader` or `~/.local/share/epub-downloader` |
//! | cache     | `$XDG_CACHE_HOME/epub-downloader` or `~/.cache/epub-downloader` |
//! | downloads | `~/Books/OReilly`                                           |
//!
//! Resolution never touches the file system; directories are created when a
//! file is first written into them.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, ErrorCode, StructuredError};

/// Directory name used under every base directory.
pub const APP_NAME: &str = "epub-downloader";

const CONFIG_FILE_NAME: &str = "config.yaml";
const COOKIES_FILE_NAME: &str = "cookies.json";
const DATABASE_FILE_NAME: &str = "app.db";
const LOG_FILE_NAME: &str = "app.log";

/// Base directories read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseDirs {
    pub xdg_config_home: Option<PathBuf>,
    pub xdg_data_home: Option<PathBuf>,
    pub xdg_cache_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl BaseDirs {
    /// Reads base directories from the process environment. Empty values are
    /// treated as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            xdg_config_home: env_path("XDG_CONFIG_HOME"),
            xdg_data_home: env_path("XDG_DATA_HOME"),
            xdg_cache_home: env_path("XDG_CACHE_HOME"),
            home: env_path("HOME"),
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    sanitize_env_path(env::var_os(name))
}

fn sanitize_env_path(value: Option<OsString>) -> Option<PathBuf> {
    let value = value?;
    if value.to_string_lossy().trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(value))
}

/// Resolved application directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub download_dir: PathBuf,
}

impl AppPaths {
    /// Resolves directories from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `CFG_001` when a directory has no resolvable base.
    pub fn from_env() -> Result<Self, AppError> {
        Self::resolve(&BaseDirs::from_env())
    }

    /// Resolves directories from explicit base directories.
    ///
    /// # Errors
    ///
    /// Returns `CFG_001` when a directory has no resolvable base.
    pub fn resolve(base: &BaseDirs) -> Result<Self, AppError> {
        let home = base.home.as_deref();
        Ok(Self {
            config_dir: xdg_or_home(base.xdg_config_home.as_deref(), home, &[".config"], "config")?,
            data_dir: xdg_or_home(
                base.xdg_data_home.as_deref(),
                home,
                &[".local", "share"],
                "data",
            )?,
            cache_dir: xdg_or_home(base.xdg_cache_home.as_deref(), home, &[".cache"], "cache")?,
            download_dir: home
                .map(|home| home.join("Books").join("OReilly"))
                .ok_or_else(|| unresolvable("download"))?,
        })
    }

    /// Default configuration file path.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Default saved-cookies path.
    #[must_use]
    pub fn cookies_file(&self) -> PathBuf {
        self.config_dir.join(COOKIES_FILE_NAME)
    }

    /// Default database path.
    #[must_use]
    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    /// Default log file path.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

fn xdg_or_home(
    xdg: Option<&Path>,
    home: Option<&Path>,
    home_relative: &[&str],
    kind: &str,
) -> Result<PathBuf, AppError> {
    if let Some(xdg) = xdg {
        return Ok(xdg.join(APP_NAME));
    }
    let home = home.ok_or_else(|| unresolvable(kind))?;
    let base = home_relative
        .iter()
        .fold(home.to_path_buf(), |path, part| path.join(part));
    Ok(base.join(APP_NAME))
}

fn unresolvable(kind: &str) -> AppError {
    StructuredError::new(
        ErrorCode::Config,
        format!("unable to determine {kind} directory (set XDG_*_HOME or HOME)"),
        "Could not determine where to store application files. Set the HOME environment variable.",
        false,
    )
    .into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn home_only() -> BaseDirs {
        BaseDirs {
            home: Some(PathBuf::from("/home/reader")),
            ..BaseDirs::default()
        }
    }

    #[test]
    fn test_resolve_falls_back_to_home() {
        let paths = AppPaths::resolve(&home_only()).unwrap();
        assert_eq!(
            paths.config_dir,
            PathBuf::from("/home/reader/.config/epub-downloader")
        );
        assert_eq!(
            paths.data_dir,
            PathBuf::from("/home/reader/.local/share/epub-downloader")
        );
        assert_eq!(
            paths.cache_dir,
            PathBuf::from("/home/reader/.cache/epub-downloader")
        );
        assert_eq!(paths.download_dir, PathBuf::from("/home/reader/Books/OReilly"));
    }

    #[test]
    fn test_resolve_prefers_xdg() {
        let base = BaseDirs {
            xdg_config_home: Some(PathBuf::from("/xdg/config")),
            xdg_data_home: Some(PathBuf::from("/xdg/data")),
            xdg_cache_home: Some(PathBuf::from("/xdg/cache")),
            home: Some(PathBuf::from("/home/reader")),
        };
        let paths = AppPaths::resolve(&base).unwrap();
        assert_eq!(paths.config_dir, PathBuf::from("/xdg/config/epub-downloader"));
        assert_eq!(paths.data_dir, PathBuf::from("/xdg/data/epub-downloader"));
        assert_eq!(paths.cache_dir, PathBuf::from("/xdg/cache/epub-downloader"));
    }

    #[test]
    fn test_resolve_without_home_fails_with_config_error() {
        let base = BaseDirs {
            xdg_config_home: Some(PathBuf::from("/xdg/config")),
            ..BaseDirs::default()
        };
        let err = AppPaths::resolve(&base).unwrap_err();
        assert_eq!(err.code(), "CFG_001");
    }

    #[test]
    fn test_file_paths() {
        let paths = AppPaths::resolve(&home_only()).unwrap();
        assert!(paths.config_file().ends_with("epub-downloader/config.yaml"));
        assert!(paths.cookies_file().ends_with("epub-downloader/cookies.json"));
        assert!(paths.database_file().ends_with("epub-downloader/app.db"));
        assert!(paths.log_file().ends_with("epub-downloader/app.log"));
    }

    #[test]
    fn test_sanitize_env_path_treats_blank_as_unset() {
        assert_eq!(sanitize_env_path(Some(OsString::from("   "))), None);
        assert_eq!(sanitize_env_path(None), None);
        assert_eq!(
            sanitize_env_path(Some(OsString::from("/tmp"))),
            Some(PathBuf::from("/tmp"))
        );
    }
}
