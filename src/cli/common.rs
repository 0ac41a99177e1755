//! Shared types and helpers for CLI commands.

use std::fmt;
use std::path::Path;

use crate::config::Config;
use crate::error::KeymapError;
use crate::kernel::Promises;
use crate::services::KeymapLoader;

/// Process exit codes used by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Input was rejected (bad definition, bad argument, name too long)
    ValidationError = 1,
    /// A file could not be found, read or written
    IoError = 2,
    /// The simulated caller lacked a required capability or identity
    PermissionDenied = 3,
}

impl ExitCode {
    /// Numeric value handed to `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by command handlers.
#[derive(Debug)]
pub struct CliError {
    /// Message printed to stderr
    pub message: String,
    /// Exit code of the process
    pub exit_code: ExitCode,
}

impl CliError {
    /// Creates an error for rejected input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::ValidationError,
        }
    }

    /// Creates an error for a failed file operation.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::IoError,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<KeymapError> for CliError {
    fn from(err: KeymapError) -> Self {
        let exit_code = match &err {
            KeymapError::PermissionDenied { .. } => ExitCode::PermissionDenied,
            KeymapError::ResourceNotFound { .. } | KeymapError::Io { .. } => ExitCode::IoError,
            _ => ExitCode::ValidationError,
        };
        Self {
            message: format!("{err} (errno {})", err.errno()),
            exit_code,
        }
    }
}

/// Result type for command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the configuration, falling back to defaults if it is unreadable.
pub fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable configuration: {e:#}");
        Config::default()
    })
}

/// Builds a loader for `dir`, or for the configured keymap directory.
pub fn keymap_loader(dir: Option<&Path>, config: &Config) -> KeymapLoader {
    KeymapLoader::new(dir.unwrap_or(&config.paths.keymap_dir))
}

/// Returns `name`, or the configured default keymap name.
pub fn keymap_name(name: Option<&str>, config: &Config) -> String {
    name.map_or_else(|| config.keyboard.default_keymap.clone(), str::to_string)
}

/// Parses a comma separated promise list such as `stdio,getkeymap`.
///
/// # Errors
///
/// Returns a validation error naming the first unknown promise.
pub fn parse_promises(list: &str) -> CliResult<Promises> {
    let mut promises = Promises::empty();
    for word in list.split(',').map(str::trim).filter(|w| !w.is_empty()) {
        let promise = Promises::from_name(&word.to_ascii_uppercase())
            .ok_or_else(|| CliError::validation(format!("Unknown promise: {word}")))?;
        promises |= promise;
    }
    Ok(promises)
}

/// Prints `value` as pretty JSON.
///
/// # Errors
///
/// Returns an I/O error if serialization fails.
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}
