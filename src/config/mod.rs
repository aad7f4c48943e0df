//! Application configuration.
//!
//! Configuration lives in a flat YAML file (`config.yaml` in the config
//! directory): one `key: value` pair per line, `#` comments, and scalars that
//! are either bare or quoted.
//!
//! ```yaml
//! download_path: "/home/reader/Books/OReilly"
//! concurrent_downloads: 5
//! rate_limit_rps: 10
//! theme: dark
//! ```
//!
//! Keys missing from the file keep their defaults. A missing file is not an
//! error: defaults are written out and used.

mod logging;
mod paths;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, instrument, warn};

use crate::api::DEFAULT_REQUESTS_PER_SECOND;
use crate::errors::{AppError, ErrorCode, StructuredError};

pub use logging::LogContext;
pub use paths::{APP_NAME, AppPaths, BaseDirs};

/// Default number of simultaneous downloads.
pub const DEFAULT_CONCURRENT_DOWNLOADS: u32 = 5;

/// Interface color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Returns the config file label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(invalid_value("theme", other, "dark or light")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum severity written to the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the config file label, which is also a valid filter directive.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(invalid_value(
                "log_level",
                other,
                "debug, info, warn, or error",
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory where downloaded EPUBs are saved.
    pub download_path: PathBuf,
    /// Simultaneous downloads (1..=20).
    pub concurrent_downloads: u32,
    /// Requests per second sent to the API (1..=100).
    pub rate_limit_rps: u32,
    pub theme: Theme,
    /// Open the EPUB after it has been downloaded.
    pub auto_open_after_download: bool,
    pub log_level: LogLevel,
    /// Log file; `None` logs to stderr.
    pub log_path: Option<PathBuf>,
    /// Human-readable log lines instead of JSON.
    pub pretty_log: bool,
    pub database_path: PathBuf,
    pub cookies_path: PathBuf,
}

impl Config {
    /// Returns the default configuration for `paths`.
    #[must_use]
    pub fn defaults(paths: &AppPaths) -> Self {
        Self {
            download_path: paths.download_dir.clone(),
            concurrent_downloads: DEFAULT_CONCURRENT_DOWNLOADS,
            rate_limit_rps: DEFAULT_REQUESTS_PER_SECOND,
            theme: Theme::default(),
            auto_open_after_download: false,
            log_level: LogLevel::default(),
            log_path: Some(paths.log_file()),
            pretty_log: true,
            database_path: paths.database_file(),
            cookies_path: paths.cookies_file(),
        }
    }

    /// Loads the configuration at `path`, or writes and returns defaults when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// - `CFG_003` when the file cannot be read or parsed
    /// - `VAL_001` when a value is out of range
    #[instrument(skip(paths), fields(path = %path.display()))]
    pub fn load_or_create(path: &Path, paths: &AppPaths) -> Result<Self, AppError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let notice = StructuredError::config_not_found();
                info!(
                    code = %notice.code(),
                    path = %path.display(),
                    "{}, writing defaults",
                    notice.message()
                );
                let config = Self::defaults(paths);
                if let Err(e) = config.save(path) {
                    warn!(error = %e, "failed to write default configuration");
                }
                return Ok(config);
            }
            Err(e) => {
                return Err(StructuredError::new(
                    ErrorCode::ConfigInvalidYaml,
                    format!("failed to read config file {}", path.display()),
                    "The configuration file could not be read.",
                    false,
                )
                .with_cause(e)
                .into());
            }
        };

        let config = Self::parse(&raw, paths)?;
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Parses configuration text on top of the defaults for `paths`.
    ///
    /// Unknown keys are ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns `CFG_003` for syntax or type errors and `VAL_001` for
    /// unrecognized enumeration values.
    pub fn parse(raw: &str, paths: &AppPaths) -> Result<Self, AppError> {
        let mut config = Self::defaults(paths);

        for (line_index, raw_line) in raw.lines().enumerate() {
            let line_number = line_index + 1;
            let line = strip_comment(raw_line).trim_end();
            if line.trim().is_empty() || line.trim() == "---" {
                continue;
            }

            let Some((raw_key, raw_value)) = line.split_once(':') else {
                return Err(syntax_error(line_number, "expected `key: value`"));
            };
            let key = raw_key.trim();
            let value = parse_scalar(raw_value.trim())
                .map_err(|reason| syntax_error(line_number, reason))?;

            match key {
                "download_path" => config.download_path = PathBuf::from(value),
                "concurrent_downloads" => {
                    config.concurrent_downloads = parse_count(key, &value, line_number)?;
                }
                "rate_limit_rps" => {
                    config.rate_limit_rps = parse_count(key, &value, line_number)?;
                }
                "theme" => config.theme = value.parse()?,
                "auto_open_after_download" => {
                    config.auto_open_after_download = parse_bool(key, &value, line_number)?;
                }
                "log_level" => config.log_level = value.parse()?,
                "log_path" => {
                    config.log_path = (!value.is_empty()).then(|| PathBuf::from(value));
                }
                "pretty_log" => config.pretty_log = parse_bool(key, &value, line_number)?,
                "database_path" => config.database_path = PathBuf::from(value),
                "cookies_path" => config.cookies_path = PathBuf::from(value),
                unknown => warn!(key = unknown, line = line_number, "ignoring unknown config key"),
            }
        }

        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `VAL_001` naming the first field out of range.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=20).contains(&self.concurrent_downloads) {
            return Err(out_of_range(
                "concurrent_downloads",
                self.concurrent_downloads,
                "1..=20",
            ));
        }
        if !(1..=100).contains(&self.rate_limit_rps) {
            return Err(out_of_range("rate_limit_rps", self.rate_limit_rps, "1..=100"));
        }
        Ok(())
    }

    /// Writes the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `STOR_002` when the file cannot be written.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let write = || -> io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, self.to_yaml())
        };

        write().map_err(|e| {
            StructuredError::new(
                ErrorCode::File,
                format!("failed to write config file {}", path.display()),
                "The configuration file could not be saved.",
                false,
            )
            .with_cause(e)
        })?;
        debug!("configuration saved");
        Ok(())
    }

    /// Serializes the configuration as flat YAML.
    #[must_use]
    pub fn to_yaml(&self) -> String {
        let log_path = self
            .log_path
            .as_deref()
            .map(Path::to_string_lossy)
            .unwrap_or_default();

        let lines = [
            format!("download_path: {}", quote(&self.download_path.to_string_lossy())),
            format!("concurrent_downloads: {}", self.concurrent_downloads),
            format!("rate_limit_rps: {}", self.rate_limit_rps),
            format!("theme: {}", self.theme),
            format!("auto_open_after_download: {}", self.auto_open_after_download),
            format!("log_level: {}", self.log_level),
            format!("log_path: {}", quote(&log_path)),
            format!("pretty_log: {}", self.pretty_log),
            format!("database_path: {}", quote(&self.database_path.to_string_lossy())),
            format!("cookies_path: {}", quote(&self.cookies_path.to_string_lossy())),
        ];

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Removes a `#` comment that starts the line or follows whitespace.
///
/// A quote only opens a quoted scalar when it is the first character of the
/// value, so apostrophes inside bare values are literal.
fn strip_comment(line: &str) -> &str {
    let value_start = line.find(':').map_or(0, |colon| colon + 1);
    let mut quote: Option<char> = None;
    let mut previous = ' ';
    let mut chars = line.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        match (quote, ch) {
            (Some('"'), '\\') => {
                chars.next();
            }
            (Some('\''), '\'') if chars.peek().is_some_and(|&(_, next)| next == '\'') => {
                chars.next();
            }
            (Some(open), _) if ch == open => quote = None,
            (None, '"' | '\'')
                if index >= value_start && line[value_start..index].trim().is_empty() =>
            {
                quote = Some(ch);
            }
            (None, '#') if previous.is_whitespace() => return &line[..index],
            _ => {}
        }
        previous = ch;
    }
    line
}

/// Unquotes a scalar value.
fn parse_scalar(raw: &str) -> Result<String, &'static str> {
    if let Some(inner) = raw.strip_prefix('"') {
        let Some(inner) = inner.strip_suffix('"') else {
            return Err("unterminated double-quoted string");
        };
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                _ => return Err("unsupported escape sequence"),
            }
        }
        return Ok(out);
    }

    if let Some(inner) = raw.strip_prefix('\'') {
        let Some(inner) = inner.strip_suffix('\'') else {
            return Err("unterminated single-quoted string");
        };
        return Ok(inner.replace("''", "'"));
    }

    if raw.starts_with(['[', '{', '|', '>', '&', '*']) {
        return Err("only plain scalars are supported");
    }
    Ok(raw.to_string())
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn parse_count(key: &str, value: &str, line_number: usize) -> Result<u32, AppError> {
    let parsed = value
        .parse::<i64>()
        .map_err(|_| syntax_error(line_number, &format!("`{key}` must be an integer")))?;
    u32::try_from(parsed).map_err(|_| out_of_range(key, parsed, "a positive integer"))
}

fn parse_bool(key: &str, value: &str, line_number: usize) -> Result<bool, AppError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(syntax_error(
            line_number,
            &format!("`{key}` must be true or false"),
        )),
    }
}

fn syntax_error(line_number: usize, reason: &str) -> AppError {
    StructuredError::new(
        ErrorCode::ConfigInvalidYaml,
        format!("invalid config syntax on line {line_number}: {reason}"),
        "The configuration file is not valid. Fix it or delete it to restore defaults.",
        false,
    )
    .into()
}

fn out_of_range(field: &str, value: impl fmt::Display, expected: &str) -> AppError {
    StructuredError::new(
        ErrorCode::Validation,
        format!("invalid config value for `{field}`: {value}. Expected range: {expected}"),
        format!("The `{field}` setting is out of range ({expected})."),
        false,
    )
    .into()
}

fn invalid_value(field: &str, value: &str, expected: &str) -> AppError {
    StructuredError::new(
        ErrorCode::Validation,
        format!("invalid config value for `{field}`: {value}. Expected {expected}"),
        format!("The `{field}` setting must be {expected}."),
        false,
    )
    .into()
}
