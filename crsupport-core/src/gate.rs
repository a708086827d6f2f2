// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Invocation gate.
//!
//! Probes the engine's capability once, caches it for the gate's lifetime,
//! and routes every checkpoint request through the capability flag, the
//! dump permission and the engine's access probe before dumping.

use std::sync::OnceLock;

use crate::engine::{CheckpointEngine, CriuEngine};
use crate::error::{SupportError, SupportResult};
use crate::outcome::CheckpointOutcome;
use crate::request::CheckpointRequest;

/// Process-wide gate over the CRIU engine.
static GLOBAL_GATE: OnceLock<CheckpointGate<CriuEngine>> = OnceLock::new();

/// Gate in front of a checkpoint engine.
#[derive(Debug)]
pub struct CheckpointGate<E: CheckpointEngine = CriuEngine> {
    engine: E,
    /// Written once in `new`, never re-probed.
    supported: bool,
}

impl<E: CheckpointEngine> CheckpointGate<E> {
    /// Create a gate, probing engine capability exactly once.
    pub fn new(engine: E) -> Self {
        let supported = engine.is_supported();
        tracing::info!(supported = supported, "Checkpoint capability probed");
        Self { engine, supported }
    }

    /// Whether checkpointing is available. Same answer for the gate's lifetime.
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Get the engine behind this gate.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Checkpoint the process with the options in `request`.
    ///
    /// Returns `UnsupportedOperation` without touching the engine when the
    /// capability is absent, and without dumping when the engine reports
    /// that checkpointing is not currently allowed. Every other outcome is
    /// the engine's own classification.
    ///
    /// On `Success` with `leave_running` false the whole process has been
    /// frozen to disk; this call returns only after an out-of-band restore.
    ///
    /// # Errors
    /// `AccessError` if the request's authorizer denies the dump permission.
    pub fn trigger(&self, request: &CheckpointRequest) -> SupportResult<CheckpointOutcome> {
        if !self.supported {
            tracing::info!("Checkpoint requested but not supported");
            return Ok(CheckpointOutcome::unsupported());
        }

        // Directory write access was checked when each directory was set
        // and is not re-verified here.
        request.authorizer().check_dump_permission()?;

        let options = request.resolve();

        if !self.engine.is_checkpoint_allowed() {
            tracing::warn!("Checkpoint not allowed in the current environment");
            return Ok(CheckpointOutcome::unsupported());
        }

        tracing::info!(
            images_dir = %options.images_dir.display(),
            work_dir = %options.work_dir.display(),
            leave_running = options.leave_running,
            log_level = options.log_level,
            "Triggering checkpoint"
        );

        let report = self.engine.checkpoint(&options);
        let outcome = CheckpointOutcome::from_report(report.kind, report.cause);

        match outcome.cause() {
            Some(cause) => tracing::warn!(kind = %outcome.kind(), cause = %cause, "Checkpoint failed"),
            None => tracing::info!(kind = %outcome.kind(), "Checkpoint finished"),
        }

        Ok(outcome)
    }
}

impl CheckpointGate<CriuEngine> {
    /// The process-wide gate, built over a default [`CriuEngine`] on first use.
    pub fn global() -> &'static Self {
        GLOBAL_GATE.get_or_init(|| Self::new(CriuEngine::new()))
    }

    /// Build the process-wide gate over `engine` (e.g. one with hooks).
    ///
    /// # Errors
    /// `SupportError::GateAlreadyInitialized` if the global gate exists.
    pub fn install_global(engine: CriuEngine) -> SupportResult<&'static Self> {
        let mut installed = false;
        let gate = GLOBAL_GATE.get_or_init(|| {
            installed = true;
            Self::new(engine)
        });

        if !installed {
            return Err(SupportError::GateAlreadyInitialized);
        }
        Ok(gate)
    }
}

/// Whether CRIU checkpointing is available to this process.
pub fn is_checkpoint_support_enabled() -> bool {
    CheckpointGate::<CriuEngine>::global().is_supported()
}
