// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Checkpoint and restore hooks.
//!
//! Hooks let the process quiesce its own state before a dump and repair it
//! after a restore (reopen sockets, reseed clocks, ...).

use std::sync::Arc;

use thiserror::Error;

use crate::error::EngineError;

/// Failure reported by a hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct HookError(pub String);

/// Process-level checkpoint hook.
pub trait CheckpointHook: Send + Sync {
    /// Name used in logs and failure causes.
    fn name(&self) -> &str;

    /// Called before the dump starts. An error aborts the checkpoint.
    fn pre_checkpoint(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Called after the dump returns, in the restored process when it was stopped.
    fn post_restore(&self) -> Result<(), HookError> {
        Ok(())
    }
}

/// Ordered set of hooks run around a dump.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn CheckpointHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook. Hooks run in registration order.
    pub fn register(&mut self, hook: Arc<dyn CheckpointHook>) {
        tracing::debug!(hook = hook.name(), "Checkpoint hook registered");
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every pre-checkpoint hook, stopping at the first failure.
    pub fn run_pre_checkpoint(&self) -> Result<(), EngineError> {
        for hook in &self.hooks {
            hook.pre_checkpoint()
                .map_err(|e| EngineError::CheckpointHookFailed {
                    hook: hook.name().to_string(),
                    reason: e.0,
                })?;
        }
        Ok(())
    }

    /// Run every post-restore hook, stopping at the first failure.
    pub fn run_post_restore(&self) -> Result<(), EngineError> {
        for hook in &self.hooks {
            hook.post_restore()
                .map_err(|e| EngineError::RestoreHookFailed {
                    hook: hook.name().to_string(),
                    reason: e.0,
                })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|hook| hook.name()))
            .finish()
    }
}
