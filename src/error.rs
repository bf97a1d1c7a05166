// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the driver library.

use thiserror::Error;

/// Errors raised by the driver library
#[derive(Debug, Error)]
pub enum DriverError {
    /// A configuration value is out of range or inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two controls are bound to the same MIDI message
    #[error("duplicate binding {binding} for {first} and {second}")]
    DuplicateBinding {
        binding: String,
        first: String,
        second: String,
    },

    /// No MIDI port matched the configured names
    #[error("no MIDI {direction} port matching {patterns:?}")]
    PortNotFound {
        direction: &'static str,
        patterns: Vec<String>,
    },

    /// The MIDI backend failed
    #[error("MIDI error: {0}")]
    Midi(String),

    /// The controller's input port went away
    #[error("MIDI input disconnected")]
    Disconnected,
}

/// Result alias for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;
