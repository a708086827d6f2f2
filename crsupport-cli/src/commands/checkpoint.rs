// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `crsupport checkpoint` command - Checkpoint this process.
//!
//! Unless `--leave-running` is given, a successful dump stops the process
//! and the outcome is printed by the restored process.

use std::sync::Arc;

use serde::Serialize;

use crsupport_core::{
    CheckpointOptions, CheckpointOutcome, CheckpointRequest, FilesystemAuthorizer, OptionsLoader,
    OutcomeKind, SupportResult, ValidationError,
};

use crate::CheckpointArgs;

/// JSON form of a checkpoint outcome.
#[derive(Serialize)]
struct OutcomeReport {
    kind: OutcomeKind,
    cause: Option<String>,
    options: CheckpointOptions,
}

pub fn execute(args: &CheckpointArgs) -> Result<(), Box<dyn std::error::Error>> {
    let request = build_request(args)?;
    let options = request.resolve();

    let outcome = request.checkpoint()?;

    if args.json {
        let report = OutcomeReport {
            kind: outcome.kind(),
            cause: outcome.cause().map(|c| c.to_string()),
            options,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_outcome(&outcome);
    }

    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn build_request(args: &CheckpointArgs) -> SupportResult<CheckpointRequest> {
    let authorizer = Arc::new(FilesystemAuthorizer);

    let mut request = match &args.config {
        Some(config) => {
            let mut request = OptionsLoader::load_file(config, authorizer)?;
            if let Some(images_dir) = &args.images_dir {
                request.set_images_dir(images_dir)?;
            }
            request
        }
        None => {
            let images_dir = args
                .images_dir
                .as_ref()
                .ok_or(ValidationError::MissingArgument {
                    field: "images_dir",
                })?;
            CheckpointRequest::with_authorizer(images_dir, authorizer)?
        }
    };

    if let Some(work_dir) = &args.work_dir {
        request.set_work_dir(work_dir)?;
    }
    if let Some(log_level) = args.log_level {
        request.set_log_level(log_level)?;
    }
    if let Some(log_file) = &args.log_file {
        request.set_log_file(log_file.as_str())?;
    }
    if args.leave_running {
        request.set_leave_running(true);
    }
    if args.file_locks {
        request.set_file_locks(true);
    }
    if args.no_shell_job {
        request.set_shell_job(false);
    }
    if args.no_ext_unix_sk {
        request.set_ext_unix_support(false);
    }

    Ok(request)
}

fn print_outcome(outcome: &CheckpointOutcome) {
    match outcome.kind() {
        OutcomeKind::Success => println!("✓ Checkpoint succeeded"),
        OutcomeKind::UnsupportedOperation => {
            println!("✗ Checkpointing is not supported or not allowed here")
        }
        kind => println!("✗ Checkpoint failed: {}", kind),
    }

    if let Some(cause) = outcome.cause() {
        println!("  {}", cause);
    }
}
