// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! External checkpoint engine seam.
//!
//! The gate talks to the engine through [`CheckpointEngine`]: a capability
//! probe, an access probe, and the dump entry point. [`CriuEngine`] drives
//! CRIU over its RPC service; tests and embedders supply their own.

mod criu;
mod hooks;

use std::path::PathBuf;

use serde::Serialize;

use crate::error::EngineError;
use crate::outcome::OutcomeKind;

pub use criu::CriuEngine;
pub use hooks::{CheckpointHook, HookError, HookRegistry};

/// Fully resolved option tuple passed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointOptions {
    pub images_dir: PathBuf,
    pub leave_running: bool,
    pub shell_job: bool,
    pub ext_unix_support: bool,
    pub log_level: i32,
    pub log_file: String,
    pub file_locks: bool,
    /// Explicit work directory, or the images directory when none was set.
    pub work_dir: PathBuf,
}

/// What the engine reports for one dump attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReport {
    pub kind: OutcomeKind,
    pub cause: Option<EngineError>,
}

impl EngineReport {
    pub fn success() -> Self {
        Self {
            kind: OutcomeKind::Success,
            cause: None,
        }
    }

    pub fn failure(kind: OutcomeKind, cause: EngineError) -> Self {
        Self {
            kind,
            cause: Some(cause),
        }
    }
}

/// Native checkpoint facility.
///
/// Implementations must be usable from any thread; the gate may be shared.
pub trait CheckpointEngine: Send + Sync {
    /// Whether checkpointing is available on this platform at all.
    ///
    /// Called once per gate; the answer is cached.
    fn is_supported(&self) -> bool;

    /// Whether checkpointing is permitted in the running environment now.
    fn is_checkpoint_allowed(&self) -> bool;

    /// Checkpoint the calling process.
    ///
    /// Blocks until the dump completes. When the process is stopped by the
    /// dump, returns only after a restore resumes it.
    fn checkpoint(&self, options: &CheckpointOptions) -> EngineReport;
}
