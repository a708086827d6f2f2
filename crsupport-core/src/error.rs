// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for crsupport.
//!
//! Contract violations (bad arguments, denied access) are returned as `Err`
//! at the offending call. Engine failures are never returned as `Err`; they
//! travel inside a [`CheckpointOutcome`](crate::outcome::CheckpointOutcome)
//! as an [`EngineError`] cause.

use std::path::PathBuf;

use thiserror::Error;

use crate::outcome::OutcomeKind;

/// Top-level error type for the crsupport library.
#[derive(Debug, Error)]
pub enum SupportError {
    // =========================================================================
    // Contract Violations - Fail-Fast at the Offending Call
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Access denied: {0}")]
    Access(#[from] AccessError),

    #[error("Process-wide checkpoint gate is already initialized")]
    GateAlreadyInitialized,

    // =========================================================================
    // Option File Errors
    // =========================================================================
    #[error("Options file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Options file parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid-argument signals raised by the request builder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required argument: {field}")]
    MissingArgument { field: &'static str },

    #[error("{field} is not a valid directory: {path}")]
    NotADirectory { field: &'static str, path: PathBuf },

    #[error("Log level {level} out of range (min: {min}, max: {max})")]
    LogLevelOutOfRange { level: i32, min: i32, max: i32 },

    #[error("Invalid log file '{value}': {reason}")]
    InvalidLogFile { value: String, reason: &'static str },
}

/// Access-denied signals raised by an [`Authorizer`](crate::access::Authorizer).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Permission '{permission}' not granted")]
    PermissionDenied { permission: &'static str },

    #[error("Write access denied for {path}: {reason}")]
    WriteDenied { path: PathBuf, reason: String },
}

/// Opaque failure detail attached to a non-success checkpoint outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("CRIU binary not found at expected path")]
    BinaryNotFound,

    #[error("Option '{option}' cannot be passed to CRIU: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: &'static str,
    },

    #[error("Failed to open directory {path}: errno {errno}")]
    OpenDirFailed { path: PathBuf, errno: i32 },

    #[error("CRIU dump failed: {reason}")]
    DumpFailed { reason: String },

    #[error("Checkpoint hook '{hook}' failed: {reason}")]
    CheckpointHookFailed { hook: String, reason: String },

    #[error("Restore hook '{hook}' failed: {reason}")]
    RestoreHookFailed { hook: String, reason: String },

    #[error("Engine reported {kind} without a cause")]
    Unreported { kind: OutcomeKind },
}

/// Result type alias using SupportError.
pub type SupportResult<T> = Result<T, SupportError>;
