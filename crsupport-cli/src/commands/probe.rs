// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `crsupport probe` command - Report checkpoint availability.

use crsupport_core::{CheckpointEngine, CheckpointGate, CriuEngine};

pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let gate = CheckpointGate::<CriuEngine>::global();

    let criu_path = gate
        .engine()
        .criu_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "not found".to_string());

    println!("CRIU binary:        {}", criu_path);
    println!("Checkpoint support: {}", yes_no(gate.is_supported()));
    println!(
        "Checkpoint allowed: {}",
        yes_no(gate.engine().is_checkpoint_allowed())
    );

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
