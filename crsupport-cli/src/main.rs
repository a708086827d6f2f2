// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! crsupport CLI
//!
//! Command-line interface for probing CRIU support and checkpointing the
//! current process.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

/// crsupport - Checkpoint this process with CRIU
#[derive(Parser)]
#[command(name = "crsupport")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report whether checkpointing is available and allowed
    Probe,

    /// Validate a checkpoint options file
    Validate {
        /// Path to the options file
        file: PathBuf,
    },

    /// Checkpoint this process
    Checkpoint(CheckpointArgs),
}

/// Options for `crsupport checkpoint`. Flags override the options file.
#[derive(Args)]
pub struct CheckpointArgs {
    /// Options file to start from
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory that receives the image files
    #[arg(short = 'D', long, required_unless_present = "config")]
    pub images_dir: Option<PathBuf>,

    /// Directory for the log and other non-image files
    #[arg(short = 'W', long)]
    pub work_dir: Option<PathBuf>,

    /// Keep running after the dump
    #[arg(long)]
    pub leave_running: bool,

    /// CRIU log verbosity (1-4)
    #[arg(long)]
    pub log_level: Option<i32>,

    /// CRIU log file name, written to the work directory
    #[arg(long)]
    pub log_file: Option<String>,

    /// Dump file locks
    #[arg(long)]
    pub file_locks: bool,

    /// Refuse to dump if this process is a shell job
    #[arg(long)]
    pub no_shell_job: bool,

    /// Do not dump external unix socket endpoints
    #[arg(long)]
    pub no_ext_unix_sk: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Probe => commands::probe::execute(),
        Commands::Validate { file } => commands::validate::execute(&file),
        Commands::Checkpoint(args) => commands::checkpoint::execute(&args),
    }
}
