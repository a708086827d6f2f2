// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Checkpoint request builder.
//!
//! Holds the option set for one checkpoint. Every setter validates its input
//! before touching state, so a rejected call leaves the request unchanged.
//!
//! Defaults:
//! - `leave_running` = false
//! - `shell_job` = true
//! - `ext_unix_support` = true
//! - `log_level` = 2
//! - `log_file` = criu.log
//! - `file_locks` = false
//! - `work_dir` = unset (the images directory is used at trigger time)

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::access::{Authorizer, PermitAll};
use crate::engine::{CheckpointOptions, CriuEngine};
use crate::error::SupportResult;
use crate::gate::CheckpointGate;
use crate::outcome::CheckpointOutcome;
use crate::types::{CheckpointDir, LogFileName, LogLevel};

/// Validated option set for one checkpoint request.
///
/// Not safe to mutate while a checkpoint using it is in flight; the borrow
/// checker enforces this for a single owner.
#[derive(Clone)]
pub struct CheckpointRequest {
    images_dir: CheckpointDir,
    leave_running: bool,
    shell_job: bool,
    ext_unix_support: bool,
    log_level: LogLevel,
    log_file: LogFileName,
    file_locks: bool,
    work_dir: Option<CheckpointDir>,
    authorizer: Arc<dyn Authorizer>,
}

impl CheckpointRequest {
    /// Create a request that dumps into `images_dir`, with no access policy.
    ///
    /// # Errors
    /// - `ValidationError::MissingArgument` if the path is empty.
    /// - `ValidationError::NotADirectory` if it is not an existing directory.
    pub fn new(images_dir: impl AsRef<Path>) -> SupportResult<Self> {
        Self::with_authorizer(images_dir, Arc::new(PermitAll))
    }

    /// Create a request gated by `authorizer`.
    ///
    /// The dump permission and write access to `images_dir` are checked
    /// before any field is set.
    ///
    /// # Errors
    /// `AccessError` if either check fails, plus the errors of [`Self::new`].
    pub fn with_authorizer(
        images_dir: impl AsRef<Path>,
        authorizer: Arc<dyn Authorizer>,
    ) -> SupportResult<Self> {
        authorizer.check_dump_permission()?;
        let images_dir = Self::authorized_dir(authorizer.as_ref(), "images_dir", images_dir)?;

        tracing::debug!(images_dir = %images_dir, "Checkpoint request created");

        Ok(Self {
            images_dir,
            leave_running: false,
            shell_job: true,
            ext_unix_support: true,
            log_level: LogLevel::default(),
            log_file: LogFileName::default(),
            file_locks: false,
            work_dir: None,
            authorizer,
        })
    }

    fn authorized_dir(
        authorizer: &dyn Authorizer,
        field: &'static str,
        path: impl AsRef<Path>,
    ) -> SupportResult<CheckpointDir> {
        let dir = CheckpointDir::new(field, path)?;
        authorizer.check_write(dir.as_path())?;
        Ok(dir)
    }

    /// Set the directory that receives the image files.
    pub fn set_images_dir(&mut self, images_dir: impl AsRef<Path>) -> SupportResult<&mut Self> {
        let dir = Self::authorized_dir(self.authorizer.as_ref(), "images_dir", images_dir)?;
        tracing::debug!(images_dir = %dir, "images_dir set");
        self.images_dir = dir;
        Ok(self)
    }

    /// Leave the process running after the dump instead of stopping it.
    pub fn set_leave_running(&mut self, leave_running: bool) -> &mut Self {
        self.leave_running = leave_running;
        self
    }

    /// Allow dumping a process that is a shell job.
    pub fn set_shell_job(&mut self, shell_job: bool) -> &mut Self {
        self.shell_job = shell_job;
        self
    }

    /// Dump only one end of unix socket pairs that cross the process boundary.
    pub fn set_ext_unix_support(&mut self, ext_unix_support: bool) -> &mut Self {
        self.ext_unix_support = ext_unix_support;
        self
    }

    /// Set CRIU log verbosity, 1 to 4 inclusive.
    pub fn set_log_level(&mut self, log_level: i32) -> SupportResult<&mut Self> {
        self.log_level = LogLevel::new(log_level)?;
        tracing::debug!(log_level = log_level, "log_level set");
        Ok(self)
    }

    /// Set the CRIU log file name.
    ///
    /// The file is written to the work directory; the name itself may not
    /// contain a path separator.
    pub fn set_log_file(&mut self, log_file: impl Into<String>) -> SupportResult<&mut Self> {
        self.log_file = LogFileName::new(log_file)?;
        tracing::debug!(log_file = %self.log_file, "log_file set");
        Ok(self)
    }

    /// Dump file locks held by the process.
    pub fn set_file_locks(&mut self, file_locks: bool) -> &mut Self {
        self.file_locks = file_locks;
        self
    }

    /// Set the directory for non-image files such as the log.
    pub fn set_work_dir(&mut self, work_dir: impl AsRef<Path>) -> SupportResult<&mut Self> {
        let dir = Self::authorized_dir(self.authorizer.as_ref(), "work_dir", work_dir)?;
        tracing::debug!(work_dir = %dir, "work_dir set");
        self.work_dir = Some(dir);
        Ok(self)
    }

    pub fn images_dir(&self) -> &Path {
        self.images_dir.as_path()
    }

    pub fn leave_running(&self) -> bool {
        self.leave_running
    }

    pub fn shell_job(&self) -> bool {
        self.shell_job
    }

    pub fn ext_unix_support(&self) -> bool {
        self.ext_unix_support
    }

    pub fn log_level(&self) -> i32 {
        self.log_level.value()
    }

    pub fn log_file(&self) -> &str {
        self.log_file.as_str()
    }

    pub fn file_locks(&self) -> bool {
        self.file_locks
    }

    /// The explicitly set work directory, if any.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_ref().map(CheckpointDir::as_path)
    }

    /// The work directory a checkpoint would use right now.
    pub fn effective_work_dir(&self) -> &Path {
        self.work_dir().unwrap_or_else(|| self.images_dir())
    }

    pub(crate) fn authorizer(&self) -> &dyn Authorizer {
        self.authorizer.as_ref()
    }

    /// Resolve the option tuple handed to the engine.
    pub fn resolve(&self) -> CheckpointOptions {
        CheckpointOptions {
            images_dir: self.images_dir().to_path_buf(),
            leave_running: self.leave_running,
            shell_job: self.shell_job,
            ext_unix_support: self.ext_unix_support,
            log_level: self.log_level.value(),
            log_file: self.log_file.as_str().to_string(),
            file_locks: self.file_locks,
            work_dir: self.effective_work_dir().to_path_buf(),
        }
    }

    /// Checkpoint the current process through the process-wide CRIU gate.
    ///
    /// On success with `leave_running` false, the process is frozen to disk
    /// and this call returns only after the image is restored.
    pub fn checkpoint(&self) -> SupportResult<CheckpointOutcome> {
        CheckpointGate::<CriuEngine>::global().trigger(self)
    }
}

impl fmt::Debug for CheckpointRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointRequest")
            .field("images_dir", &self.images_dir)
            .field("leave_running", &self.leave_running)
            .field("shell_job", &self.shell_job)
            .field("ext_unix_support", &self.ext_unix_support)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("file_locks", &self.file_locks)
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}
