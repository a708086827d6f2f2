// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML option file parser with strict schema validation.
//!
//! The file is only a source of values: every field is applied through the
//! request's validating setters, so a file can never produce a request the
//! builder itself would reject.
//!
//! ```yaml
//! images_dir: /var/lib/app/checkpoint
//! work_dir: /var/lib/app/checkpoint-work
//! leave_running: false
//! log_level: 4
//! log_file: dump.log
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::access::Authorizer;
use crate::error::{SupportError, SupportResult};
use crate::request::CheckpointRequest;
use crate::types::{DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL};

/// Raw options as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    images_dir: PathBuf,
    #[serde(default)]
    work_dir: Option<PathBuf>,
    #[serde(default)]
    leave_running: bool,
    #[serde(default = "default_true")]
    shell_job: bool,
    #[serde(default = "default_true")]
    ext_unix_support: bool,
    #[serde(default = "default_log_level")]
    log_level: i32,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default)]
    file_locks: bool,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> i32 {
    DEFAULT_LOG_LEVEL
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

/// Option file loader.
pub struct OptionsLoader;

impl OptionsLoader {
    /// Load a checkpoint request from a YAML file.
    pub fn load_file(
        path: impl AsRef<Path>,
        authorizer: Arc<dyn Authorizer>,
    ) -> SupportResult<CheckpointRequest> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SupportError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SupportError::Io {
            context: "reading options file",
            source: e,
        })?;

        Self::load_string(&content, authorizer)
    }

    /// Load a checkpoint request from a YAML string.
    pub fn load_string(
        content: &str,
        authorizer: Arc<dyn Authorizer>,
    ) -> SupportResult<CheckpointRequest> {
        let raw: RawOptions =
            serde_yaml::from_str(content).map_err(|e| SupportError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        let mut request = CheckpointRequest::with_authorizer(&raw.images_dir, authorizer)?;
        request
            .set_leave_running(raw.leave_running)
            .set_shell_job(raw.shell_job)
            .set_ext_unix_support(raw.ext_unix_support)
            .set_file_locks(raw.file_locks)
            .set_log_level(raw.log_level)?
            .set_log_file(raw.log_file)?;

        if let Some(work_dir) = &raw.work_dir {
            request.set_work_dir(work_dir)?;
        }

        Ok(request)
    }
}
