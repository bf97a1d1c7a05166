// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! midir output backend.
//!
//! This module provides a midir implementation of the `MidiOutput` trait,
//! used to send keep-alive messages back to the controller.

use anyhow::{anyhow, Result};
use midir::MidiOutputConnection;
use tracing::info;

use super::MidiOutput;
use crate::error::DriverError;

/// midir output connected to one destination port.
pub struct MidirOutput {
    connection: MidiOutputConnection,
    port_name: String,
}

impl MidirOutput {
    /// Connect to the first destination whose name contains any of `patterns`.
    pub fn open_matching(client_name: &str, patterns: &[String]) -> crate::error::Result<Self> {
        let midi_out = new_midir_output(client_name)?;
        let port = midi_out
            .ports()
            .into_iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .map(|name| patterns.iter().any(|pat| name.contains(pat.as_str())))
                    .unwrap_or(false)
            })
            .ok_or_else(|| DriverError::PortNotFound {
                direction: "output",
                patterns: patterns.to_vec(),
            })?;
        Self::connect(midi_out, &port)
    }

    fn connect(
        midi_out: midir::MidiOutput,
        port: &midir::MidiOutputPort,
    ) -> crate::error::Result<Self> {
        let port_name = midi_out
            .port_name(port)
            .map_err(|e| DriverError::Midi(e.to_string()))?;
        let connection = midi_out
            .connect(port, "mpk-driver-out")
            .map_err(|e| DriverError::Midi(format!("Failed to connect to destination: {}", e)))?;

        info!(port = %port_name, "MIDI output connected");

        Ok(Self {
            connection,
            port_name,
        })
    }

    /// Name of the connected port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiOutput for MidirOutput {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        self.connection
            .send(message)
            .map_err(|e| anyhow!("Failed to send MIDI to {}: {}", self.port_name, e))
    }
}

fn new_midir_output(client_name: &str) -> crate::error::Result<midir::MidiOutput> {
    midir::MidiOutput::new(client_name)
        .map_err(|e| DriverError::Midi(format!("Failed to create MIDI client: {}", e)))
}

/// List all available MIDI destinations
pub fn list_destinations() -> Vec<(usize, String)> {
    let Ok(midi_out) = midir::MidiOutput::new("mpk-driver probe") else {
        return Vec::new();
    };

    midi_out
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            let name = midi_out
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown {}", i));
            (i, name)
        })
        .collect()
}

/// Print all available MIDI destinations to stdout
pub fn print_destinations() {
    let destinations = list_destinations();
    if destinations.is_empty() {
        println!("No MIDI destinations found.");
    } else {
        println!("Available MIDI destinations (outputs):");
        for (i, name) in destinations {
            println!("  {}: {}", i, name);
        }
    }
}
