// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end tests for the request builder and the invocation gate.
//!
//! A recording engine stands in for CRIU so dumps never stop the test process.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crsupport_core::{
    AccessError, Authorizer, CheckpointEngine, CheckpointGate, CheckpointOptions,
    CheckpointRequest, CriuEngine, EngineError, EngineReport, OutcomeKind, SupportError,
    ValidationError,
};
use tempfile::TempDir;

/// Engine stub that records every call.
struct RecordingEngine {
    supported: bool,
    allowed: bool,
    report: EngineReport,
    probes: AtomicUsize,
    dumps: Mutex<Vec<CheckpointOptions>>,
}

impl RecordingEngine {
    fn reporting(report: EngineReport) -> Self {
        Self {
            supported: true,
            allowed: true,
            report,
            probes: AtomicUsize::new(0),
            dumps: Mutex::new(Vec::new()),
        }
    }

    fn succeeding() -> Self {
        Self::reporting(EngineReport::success())
    }

    fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::succeeding()
        }
    }

    fn dumps(&self) -> Vec<CheckpointOptions> {
        self.dumps.lock().unwrap().clone()
    }
}

impl CheckpointEngine for RecordingEngine {
    fn is_supported(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.supported
    }

    fn is_checkpoint_allowed(&self) -> bool {
        self.allowed
    }

    fn checkpoint(&self, options: &CheckpointOptions) -> EngineReport {
        self.dumps.lock().unwrap().push(options.clone());
        self.report.clone()
    }
}

/// Authorizer whose grants can be revoked after construction.
#[derive(Default)]
struct Revocable {
    dump_revoked: AtomicBool,
    write_revoked: AtomicBool,
}

impl Authorizer for Revocable {
    fn check_dump_permission(&self) -> Result<(), AccessError> {
        if self.dump_revoked.load(Ordering::SeqCst) {
            return Err(AccessError::PermissionDenied {
                permission: crsupport_core::access::DUMP_PERMISSION,
            });
        }
        Ok(())
    }

    fn check_write(&self, path: &Path) -> Result<(), AccessError> {
        if self.write_revoked.load(Ordering::SeqCst) {
            return Err(AccessError::WriteDenied {
                path: path.to_path_buf(),
                reason: "revoked".to_string(),
            });
        }
        Ok(())
    }
}

#[test]
fn test_default_request_resolves_work_dir_to_images_dir() {
    let images = TempDir::new().unwrap();
    let request = CheckpointRequest::new(images.path()).unwrap();
    let gate = CheckpointGate::new(RecordingEngine::succeeding());

    let outcome = gate.trigger(&request).unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Success);
    assert!(outcome.cause().is_none());

    let dumps = gate.engine().dumps();
    assert_eq!(dumps.len(), 1);
    let options = &dumps[0];
    assert_eq!(options.images_dir, images.path());
    assert_eq!(options.work_dir, images.path());
    assert!(!options.leave_running);
    assert!(options.shell_job);
    assert!(options.ext_unix_support);
    assert_eq!(options.log_level, 2);
    assert_eq!(options.log_file, "criu.log");
    assert!(!options.file_locks);
}

#[test]
fn test_null_images_dir_rejected() {
    let err = CheckpointRequest::new("").unwrap_err();
    assert!(matches!(
        err,
        SupportError::Validation(ValidationError::MissingArgument {
            field: "images_dir"
        })
    ));
}

#[test]
fn test_rejected_log_level_keeps_default_at_trigger() {
    let images = TempDir::new().unwrap();
    let mut request = CheckpointRequest::new(images.path()).unwrap();

    let err = request.set_log_level(5).unwrap_err();
    assert!(matches!(
        err,
        SupportError::Validation(ValidationError::LogLevelOutOfRange { level: 5, .. })
    ));

    let gate = CheckpointGate::new(RecordingEngine::succeeding());
    gate.trigger(&request).unwrap();
    assert_eq!(gate.engine().dumps()[0].log_level, 2);
}

#[test]
fn test_unsupported_never_reaches_engine() {
    let images = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let mut request = CheckpointRequest::new(images.path()).unwrap();
    request
        .set_leave_running(true)
        .set_work_dir(work.path())
        .unwrap();

    let gate = CheckpointGate::new(RecordingEngine::unsupported());
    for _ in 0..3 {
        let outcome = gate.trigger(&request).unwrap();
        assert_eq!(outcome.kind(), OutcomeKind::UnsupportedOperation);
        assert!(outcome.cause().is_none());
    }

    assert!(gate.engine().dumps().is_empty());
    assert_eq!(gate.engine().probes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_explicit_work_dir_passed_to_engine() {
    let images = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let mut request = CheckpointRequest::new(images.path()).unwrap();
    request.set_work_dir(work.path()).unwrap();

    let gate = CheckpointGate::new(RecordingEngine::succeeding());
    gate.trigger(&request).unwrap();

    let options = &gate.engine().dumps()[0];
    assert_eq!(options.work_dir, work.path());
    assert_eq!(options.images_dir, images.path());
}

#[test]
fn test_engine_not_allowed_is_unsupported() {
    let images = TempDir::new().unwrap();
    let request = CheckpointRequest::new(images.path()).unwrap();
    let gate = CheckpointGate::new(RecordingEngine {
        allowed: false,
        ..RecordingEngine::succeeding()
    });

    let outcome = gate.trigger(&request).unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::UnsupportedOperation);
    assert!(outcome.cause().is_none());
    assert!(gate.engine().dumps().is_empty());
}

#[test]
fn test_engine_failure_kinds_pass_through_with_cause() {
    let images = TempDir::new().unwrap();
    let request = CheckpointRequest::new(images.path()).unwrap();

    let failures = [
        (
            OutcomeKind::InvalidArguments,
            EngineError::OpenDirFailed {
                path: images.path().to_path_buf(),
                errno: 2,
            },
        ),
        (
            OutcomeKind::SystemCheckpointFailure,
            EngineError::DumpFailed {
                reason: "criu exited".to_string(),
            },
        ),
        (
            OutcomeKind::RuntimeCheckpointFailure,
            EngineError::CheckpointHookFailed {
                hook: "db".to_string(),
                reason: "open transaction".to_string(),
            },
        ),
        (
            OutcomeKind::RuntimeRestoreFailure,
            EngineError::RestoreHookFailed {
                hook: "net".to_string(),
                reason: "port in use".to_string(),
            },
        ),
    ];

    for (kind, cause) in failures {
        let gate = CheckpointGate::new(RecordingEngine::reporting(EngineReport::failure(
            kind,
            cause.clone(),
        )));
        let outcome = gate.trigger(&request).unwrap();
        assert_eq!(outcome.kind(), kind);
        assert_eq!(outcome.cause(), Some(&cause));
    }
}

#[test]
fn test_failure_without_cause_is_filled_in() {
    let images = TempDir::new().unwrap();
    let request = CheckpointRequest::new(images.path()).unwrap();
    let gate = CheckpointGate::new(RecordingEngine::reporting(EngineReport {
        kind: OutcomeKind::SystemCheckpointFailure,
        cause: None,
    }));

    let outcome = gate.trigger(&request).unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::SystemCheckpointFailure);
    assert!(outcome.cause().is_some());
}

#[test]
fn test_write_revoked_after_configuration() {
    // Write access is checked when a directory is set, not when triggered.
    let images = TempDir::new().unwrap();
    let authorizer = Arc::new(Revocable::default());
    let request = CheckpointRequest::with_authorizer(images.path(), authorizer.clone()).unwrap();

    authorizer.write_revoked.store(true, Ordering::SeqCst);

    let gate = CheckpointGate::new(RecordingEngine::succeeding());
    let outcome = gate.trigger(&request).unwrap();
    assert!(outcome.is_success());
    assert_eq!(gate.engine().dumps().len(), 1);
}

#[test]
fn test_dump_permission_revoked_after_configuration() {
    let images = TempDir::new().unwrap();
    let authorizer = Arc::new(Revocable::default());
    let request = CheckpointRequest::with_authorizer(images.path(), authorizer.clone()).unwrap();

    authorizer.dump_revoked.store(true, Ordering::SeqCst);

    let gate = CheckpointGate::new(RecordingEngine::succeeding());
    let err = gate.trigger(&request).unwrap_err();
    assert!(matches!(
        err,
        SupportError::Access(AccessError::PermissionDenied { .. })
    ));
    assert!(gate.engine().dumps().is_empty());
}

#[test]
fn test_directory_removed_after_configuration() {
    // Directories are validated when set, not when triggered. The engine
    // is the one to notice a directory that vanished in between.
    let root = TempDir::new().unwrap();
    let images = root.path().join("images");
    std::fs::create_dir(&images).unwrap();
    let request = CheckpointRequest::new(&images).unwrap();

    std::fs::remove_dir(&images).unwrap();

    let recording = CheckpointGate::new(RecordingEngine::succeeding());
    assert!(recording.trigger(&request).unwrap().is_success());
    assert_eq!(recording.engine().dumps()[0].images_dir, images);

    let criu = CheckpointGate::new(AlwaysAllowed(CriuEngine::with_binary("/bin/true")));
    let outcome = criu.trigger(&request).unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::InvalidArguments);
    assert!(matches!(
        outcome.cause(),
        Some(EngineError::OpenDirFailed { .. })
    ));
}

#[test]
fn test_request_can_be_triggered_again() {
    let images = TempDir::new().unwrap();
    let mut request = CheckpointRequest::new(images.path()).unwrap();
    let gate = CheckpointGate::new(RecordingEngine::succeeding());

    gate.trigger(&request).unwrap();
    request.set_leave_running(true);
    gate.trigger(&request).unwrap();

    let dumps = gate.engine().dumps();
    assert_eq!(dumps.len(), 2);
    assert!(!dumps[0].leave_running);
    assert!(dumps[1].leave_running);
}

/// Runs the real CRIU engine adapter regardless of host capabilities.
struct AlwaysAllowed(CriuEngine);

impl CheckpointEngine for AlwaysAllowed {
    fn is_supported(&self) -> bool {
        true
    }

    fn is_checkpoint_allowed(&self) -> bool {
        true
    }

    fn checkpoint(&self, options: &CheckpointOptions) -> EngineReport {
        self.0.checkpoint(options)
    }
}
