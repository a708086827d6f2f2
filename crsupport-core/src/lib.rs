// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! crsupport Core Library
//!
//! Validated configuration and typed results for checkpointing the current
//! process with CRIU. Provides the request builder, the invocation gate with
//! its cached capability flag, the outcome taxonomy, access policies, hooks,
//! and the CRIU engine adapter.

pub mod access;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod outcome;
pub mod request;
pub mod types;

// Re-export commonly used types
pub use access::{Authorizer, FilesystemAuthorizer, PermitAll};
pub use config::OptionsLoader;
pub use engine::{CheckpointEngine, CheckpointHook, CheckpointOptions, CriuEngine, EngineReport};
pub use error::{AccessError, EngineError, SupportError, SupportResult, ValidationError};
pub use gate::{is_checkpoint_support_enabled, CheckpointGate};
pub use outcome::{CheckpointOutcome, OutcomeKind};
pub use request::CheckpointRequest;
