// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `crsupport validate` command - Validate an options file.

use std::path::Path;
use std::sync::Arc;

use crsupport_core::{FilesystemAuthorizer, OptionsLoader};

pub fn execute(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file.display(), "Validating options file");

    match OptionsLoader::load_file(file, Arc::new(FilesystemAuthorizer)) {
        Ok(request) => {
            let options = request.resolve();
            println!("✓ Options are valid");
            println!();
            println!("  Images Directory: {}", options.images_dir.display());
            println!(
                "  Work Directory:   {}{}",
                options.work_dir.display(),
                if request.work_dir().is_none() {
                    " (images directory)"
                } else {
                    ""
                }
            );
            println!("  Leave Running:    {}", options.leave_running);
            println!("  Shell Job:        {}", options.shell_job);
            println!("  Ext Unix Sockets: {}", options.ext_unix_support);
            println!("  File Locks:       {}", options.file_locks);
            println!("  Log Level:        {}", options.log_level);
            println!("  Log File:         {}", options.log_file);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Options validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
