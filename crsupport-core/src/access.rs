// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Pluggable access-control gate.
//!
//! An [`Authorizer`] is consulted when a request is constructed, whenever a
//! directory option changes, and again when the checkpoint is triggered.

use std::path::Path;

use nix::unistd::{access, AccessFlags};

use crate::error::AccessError;

/// Permission name checked before any checkpoint request is built or triggered.
pub const DUMP_PERMISSION: &str = "checkpoint.dump";

/// Authorization policy for checkpoint requests.
pub trait Authorizer: Send + Sync {
    /// Check that the caller may checkpoint the process at all.
    fn check_dump_permission(&self) -> Result<(), AccessError>;

    /// Check that the caller may write into `path`.
    fn check_write(&self, path: &Path) -> Result<(), AccessError>;
}

/// Allows everything. Used when no policy is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermitAll;

impl Authorizer for PermitAll {
    fn check_dump_permission(&self) -> Result<(), AccessError> {
        Ok(())
    }

    fn check_write(&self, _path: &Path) -> Result<(), AccessError> {
        Ok(())
    }
}

/// Denies write access to paths the effective user cannot write.
///
/// Dump permission is always granted; whether CRIU may actually dump is the
/// engine's access probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemAuthorizer;

impl Authorizer for FilesystemAuthorizer {
    fn check_dump_permission(&self) -> Result<(), AccessError> {
        Ok(())
    }

    fn check_write(&self, path: &Path) -> Result<(), AccessError> {
        access(path, AccessFlags::W_OK).map_err(|errno| AccessError::WriteDenied {
            path: path.to_path_buf(),
            reason: errno.desc().to_string(),
        })
    }
}
