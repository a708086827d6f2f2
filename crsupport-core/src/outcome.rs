// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Typed result of a checkpoint request.
//!
//! A [`CheckpointOutcome`] is built once by the gate and never mutated.
//! `Success` and `UnsupportedOperation` never carry a cause; every other
//! kind always does.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Closed classification of how a checkpoint attempt concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// The engine completed the checkpoint as requested.
    Success,

    /// Checkpointing is not available on this platform or build.
    UnsupportedOperation,

    /// The engine rejected the supplied option set.
    InvalidArguments,

    /// An OS-level failure occurred while checkpointing.
    SystemCheckpointFailure,

    /// The process's own checkpoint preparation failed. Fatal to the request.
    RuntimeCheckpointFailure,

    /// A non-fatal failure was detected while restoring from this image.
    RuntimeRestoreFailure,
}

impl OutcomeKind {
    /// Get the kind name for logs and error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::UnsupportedOperation => "UnsupportedOperation",
            Self::InvalidArguments => "InvalidArguments",
            Self::SystemCheckpointFailure => "SystemCheckpointFailure",
            Self::RuntimeCheckpointFailure => "RuntimeCheckpointFailure",
            Self::RuntimeRestoreFailure => "RuntimeRestoreFailure",
        }
    }

    /// Whether an outcome of this kind must carry a cause.
    pub const fn requires_cause(&self) -> bool {
        !matches!(self, Self::Success | Self::UnsupportedOperation)
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result of one checkpoint request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointOutcome {
    kind: OutcomeKind,
    cause: Option<EngineError>,
}

impl CheckpointOutcome {
    /// Outcome for a request that never reached the engine's dump.
    pub(crate) fn unsupported() -> Self {
        Self {
            kind: OutcomeKind::UnsupportedOperation,
            cause: None,
        }
    }

    /// Normalize an engine report into an outcome.
    ///
    /// The kind is taken as reported. A cause attached to a kind that must
    /// not carry one is dropped; a failure kind reported without a cause
    /// gets [`EngineError::Unreported`].
    pub(crate) fn from_report(kind: OutcomeKind, cause: Option<EngineError>) -> Self {
        let cause = match (kind.requires_cause(), cause) {
            (true, Some(cause)) => Some(cause),
            (true, None) => {
                tracing::warn!(kind = %kind, "Engine reported failure without a cause");
                Some(EngineError::Unreported { kind })
            }
            (false, Some(cause)) => {
                tracing::warn!(kind = %kind, cause = %cause, "Dropping cause reported with non-failure kind");
                None
            }
            (false, None) => None,
        };
        Self { kind, cause }
    }

    /// Get the outcome kind.
    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    /// Get the failure cause. Never set for `Success`.
    pub fn cause(&self) -> Option<&EngineError> {
        self.cause.as_ref()
    }

    /// Check whether the checkpoint succeeded.
    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}
