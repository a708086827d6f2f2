// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CRIU self-dump engine.
//!
//! Dumps the calling process through CRIU's RPC service (`criu swrk`). The
//! reply travels on the RPC socket, so a restored process learns the result
//! from the restoring CRIU instance and not from anything left on disk.

use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use nix::unistd::getpid;
use rust_criu::Criu;

use super::{CheckpointEngine, CheckpointHook, CheckpointOptions, EngineReport, HookRegistry};
use crate::error::EngineError;
use crate::outcome::OutcomeKind;

/// Capability bits that allow CRIU to dump (see capabilities(7)).
const CAP_SYS_ADMIN: u32 = 21;
const CAP_CHECKPOINT_RESTORE: u32 = 40;

/// CRIU engine driving the `criu` binary in RPC mode.
pub struct CriuEngine {
    /// Path to CRIU binary, if one was found.
    criu_path: Option<PathBuf>,
    hooks: HookRegistry,
    /// Held for the whole dump so only one checkpoint runs at a time.
    dump_lock: Mutex<()>,
}

impl CriuEngine {
    /// Create an engine using the first CRIU binary found on this host.
    pub fn new() -> Self {
        let criu_path = Self::find_criu();
        match &criu_path {
            Some(path) => tracing::info!(criu_path = %path.display(), "CRIU binary located"),
            None => tracing::warn!("CRIU binary not found; checkpointing unavailable"),
        }
        Self::build(criu_path)
    }

    /// Create an engine using an explicit CRIU binary.
    pub fn with_binary(criu_path: impl Into<PathBuf>) -> Self {
        Self::build(Some(criu_path.into()))
    }

    fn build(criu_path: Option<PathBuf>) -> Self {
        Self {
            criu_path,
            hooks: HookRegistry::new(),
            dump_lock: Mutex::new(()),
        }
    }

    /// Register a hook run around every dump.
    pub fn with_hook(mut self, hook: Arc<dyn CheckpointHook>) -> Self {
        self.hooks.register(hook);
        self
    }

    /// Get the CRIU binary path.
    pub fn criu_path(&self) -> Option<&Path> {
        self.criu_path.as_deref()
    }

    /// Find the CRIU binary.
    fn find_criu() -> Option<PathBuf> {
        let candidates = [
            "/usr/sbin/criu",
            "/usr/bin/criu",
            "/sbin/criu",
            "/bin/criu",
            "/usr/local/sbin/criu",
            "/usr/local/bin/criu",
        ];

        for path in candidates {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }

        // Try which
        if let Ok(output) = Command::new("which").arg("criu").output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }

    /// Run the dump. Caller holds the engine lock.
    fn dump(&self, options: &CheckpointOptions) -> Result<(), (OutcomeKind, EngineError)> {
        let criu_path = self
            .criu_path
            .as_deref()
            .ok_or((OutcomeKind::SystemCheckpointFailure, EngineError::BinaryNotFound))?;

        // The directories must still open as directories; they may have
        // changed since the request validated them. CRIU reaches them
        // through these descriptors.
        let images_dir = open_dir(&options.images_dir).map_err(|e| (OutcomeKind::InvalidArguments, e))?;
        let work_dir = open_dir(&options.work_dir).map_err(|e| (OutcomeKind::InvalidArguments, e))?;
        check_log_file(&options.log_file).map_err(|e| (OutcomeKind::InvalidArguments, e))?;

        self.hooks
            .run_pre_checkpoint()
            .map_err(|e| (OutcomeKind::RuntimeCheckpointFailure, e))?;

        let pid = getpid();
        tracing::debug!(
            pid = pid.as_raw(),
            images_dir = %options.images_dir.display(),
            work_dir = %options.work_dir.display(),
            "Starting CRIU dump"
        );

        let start = Instant::now();

        let mut criu = Criu::new_with_criu_path(criu_path.to_string_lossy().into_owned())
            .map_err(|e| {
                (
                    OutcomeKind::SystemCheckpointFailure,
                    EngineError::DumpFailed {
                        reason: e.to_string(),
                    },
                )
            })?;

        criu.set_pid(pid.as_raw());
        criu.set_images_dir_fd(images_dir.as_raw_fd());
        criu.set_work_dir_fd(work_dir.as_raw_fd());
        criu.set_log_level(options.log_level);
        criu.set_log_file(options.log_file.clone());
        criu.set_leave_running(options.leave_running);
        criu.set_shell_job(options.shell_job);
        criu.set_ext_unix_sk(options.ext_unix_support);
        criu.set_file_locks(options.file_locks);

        if let Err(e) = criu.dump() {
            let reason = e.to_string();
            tracing::error!(
                error = %reason,
                log_file = %options.work_dir.join(&options.log_file).display(),
                "CRIU dump failed"
            );
            return Err((
                OutcomeKind::SystemCheckpointFailure,
                EngineError::DumpFailed { reason },
            ));
        }

        tracing::info!(
            pid = pid.as_raw(),
            elapsed_ms = start.elapsed().as_millis(),
            leave_running = options.leave_running,
            "CRIU dump completed"
        );

        // Only reached after a restore when the process was stopped.
        self.hooks
            .run_post_restore()
            .map_err(|e| (OutcomeKind::RuntimeRestoreFailure, e))
    }
}

impl Default for CriuEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointEngine for CriuEngine {
    fn is_supported(&self) -> bool {
        let Some(criu_path) = self.criu_path.as_deref() else {
            return false;
        };

        match Command::new(criu_path).arg("check").output() {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                tracing::warn!(
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "criu check failed"
                );
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to execute criu check");
                false
            }
        }
    }

    fn is_checkpoint_allowed(&self) -> bool {
        match std::fs::read_to_string("/proc/self/status") {
            Ok(status) => has_dump_capability(&status),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read /proc/self/status");
                false
            }
        }
    }

    fn checkpoint(&self, options: &CheckpointOptions) -> EngineReport {
        let _guard = self.dump_lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self.dump(options) {
            Ok(()) => EngineReport::success(),
            Err((kind, cause)) => EngineReport::failure(kind, cause),
        }
    }
}

impl std::fmt::Debug for CriuEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriuEngine")
            .field("criu_path", &self.criu_path)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Check `CapEff` in a `/proc/<pid>/status` listing for a capability CRIU
/// accepts for dumping.
fn has_dump_capability(status: &str) -> bool {
    let mask = (1u64 << CAP_SYS_ADMIN) | (1u64 << CAP_CHECKPOINT_RESTORE);

    status
        .lines()
        .find_map(|line| line.strip_prefix("CapEff:"))
        .and_then(|value| u64::from_str_radix(value.trim(), 16).ok())
        .is_some_and(|caps| caps & mask != 0)
}

fn open_dir(path: &Path) -> Result<File, EngineError> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_DIRECTORY)
        .open(path)
        .map_err(|e| EngineError::OpenDirFailed {
            path: path.to_path_buf(),
            errno: e.raw_os_error().unwrap_or(0),
        })
}

/// CRIU receives the log file name as a C string.
fn check_log_file(log_file: &str) -> Result<(), EngineError> {
    if log_file.contains('\0') {
        return Err(EngineError::InvalidOption {
            option: "log_file",
            reason: "contains a NUL byte",
        });
    }
    Ok(())
}
