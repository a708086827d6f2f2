// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated checkpoint options.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SupportError, ValidationError};

/// Least verbose CRIU log level (errors only).
pub const MIN_LOG_LEVEL: i32 = 1;
/// Most verbose CRIU log level (debug).
pub const MAX_LOG_LEVEL: i32 = 4;
/// Default log level: errors and warnings.
pub const DEFAULT_LOG_LEVEL: i32 = 2;
/// Default CRIU log file name.
pub const DEFAULT_LOG_FILE: &str = "criu.log";

/// Validated checkpoint directory.
/// Must be non-empty, exist as a directory, and is stored as an absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "PathBuf")]
pub struct CheckpointDir(PathBuf);

impl CheckpointDir {
    /// Create a new CheckpointDir with existence validation.
    ///
    /// `field` names the option being set and appears in errors.
    pub fn new(field: &'static str, path: impl AsRef<Path>) -> Result<Self, SupportError> {
        let path = path.as_ref();

        if path.as_os_str().is_empty() {
            return Err(ValidationError::MissingArgument { field }.into());
        }

        if !path.is_dir() {
            return Err(ValidationError::NotADirectory {
                field,
                path: path.to_path_buf(),
            }
            .into());
        }

        let absolute = std::path::absolute(path).map_err(|e| SupportError::Io {
            context: "resolving absolute directory path",
            source: e,
        })?;

        Ok(Self(absolute))
    }

    /// Get the inner path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CheckpointDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<CheckpointDir> for PathBuf {
    fn from(dir: CheckpointDir) -> Self {
        dir.0
    }
}

/// Validated CRIU log verbosity.
/// Must be in range 1-4 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct LogLevel(i32);

impl LogLevel {
    /// Create a new LogLevel with bounds validation.
    pub fn new(level: i32) -> Result<Self, ValidationError> {
        if !(MIN_LOG_LEVEL..=MAX_LOG_LEVEL).contains(&level) {
            return Err(ValidationError::LogLevelOutOfRange {
                level,
                min: MIN_LOG_LEVEL,
                max: MAX_LOG_LEVEL,
            });
        }
        Ok(Self(level))
    }

    /// Get the inner level.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self(DEFAULT_LOG_LEVEL)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for LogLevel {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogLevel> for i32 {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

/// Validated log file name.
/// A bare file name; the directory it lands in is the work directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogFileName(String);

impl LogFileName {
    /// Create a new LogFileName, rejecting anything containing a path separator.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();

        if name.chars().any(std::path::is_separator) {
            return Err(ValidationError::InvalidLogFile {
                value: name,
                reason: "must be a file name, not a path",
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LogFileName {
    fn default() -> Self {
        Self(DEFAULT_LOG_FILE.to_string())
    }
}

impl fmt::Display for LogFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for LogFileName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogFileName> for String {
    fn from(name: LogFileName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_valid() {
        for level in MIN_LOG_LEVEL..=MAX_LOG_LEVEL {
            assert_eq!(LogLevel::new(level).unwrap().value(), level);
        }
    }

    #[test]
    fn test_log_level_invalid() {
        assert!(LogLevel::new(0).is_err());
        assert!(LogLevel::new(5).is_err());
        assert!(LogLevel::new(-1).is_err());
        assert!(LogLevel::new(i32::MAX).is_err());
    }

    #[test]
    fn test_log_file_valid() {
        assert!(LogFileName::new("criu.log").is_ok());
        assert!(LogFileName::new("dump-1.log").is_ok());
        assert!(LogFileName::new("..").is_ok());
    }

    #[test]
    fn test_log_file_rejects_paths() {
        assert!(LogFileName::new("logs/criu.log").is_err());
        assert!(LogFileName::new("/tmp/criu.log").is_err());
        assert!(LogFileName::new("criu/").is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(LogLevel::default().value(), 2);
        assert_eq!(LogFileName::default().as_str(), "criu.log");
    }

    #[test]
    fn test_checkpoint_dir_missing() {
        let err = CheckpointDir::new("images_dir", "").unwrap_err();
        assert!(matches!(
            err,
            SupportError::Validation(ValidationError::MissingArgument {
                field: "images_dir"
            })
        ));
    }

    #[test]
    fn test_checkpoint_dir_not_a_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();

        assert!(CheckpointDir::new("images_dir", &file).is_err());
        assert!(CheckpointDir::new("images_dir", dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_checkpoint_dir_is_absolute() {
        let dir = tempfile::TempDir::new().unwrap();
        let checkpoint_dir = CheckpointDir::new("images_dir", dir.path()).unwrap();
        assert!(checkpoint_dir.as_path().is_absolute());

        let relative = CheckpointDir::new("images_dir", ".").unwrap();
        assert!(relative.as_path().is_absolute());
    }
}
