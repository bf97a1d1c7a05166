// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the driver.
//!
//! This module holds the driver settings and the control layout, i.e. which
//! CC and note numbers the controller has been programmed to send. The
//! controller is never configured by the driver, so the layout here has to
//! match what the user stored in the hardware preset.

pub mod watcher;

pub use watcher::{validate_config, ConfigEvent, ConfigWatcher};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::control::{ControlMap, EncoderMode};
use crate::driver::Mode;
use crate::error::DriverError;

/// Number of knobs per knob bank
pub const KNOBS_PER_BANK: usize = 8;
/// Number of pads
pub const PAD_COUNT: usize = 16;
/// Number of assignable switches
pub const SWITCH_COUNT: usize = 4;
/// Longest keep-alive period, one day
pub const MAX_KEEP_ALIVE_SECS: u64 = 86_400;

/// Root driver configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    /// MIDI port selection
    pub device: DeviceConfig,
    /// Keep-alive period in seconds
    pub keep_alive_secs: u64,
    /// Number of chains addressed by one knob/pad bank in mixer mode
    pub chains_per_bank: usize,
    /// Switch mode when the host changes screen
    pub follow_screen: bool,
    /// Mode active after start
    pub initial_mode: Mode,
    /// Control layout programmed into the controller
    pub layout: Layout,
    /// Mixer mode settings
    pub mixer: MixerConfig,
    /// Settings for the standalone host
    pub standalone: StandaloneConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            keep_alive_secs: 60,
            chains_per_bank: 8,
            follow_screen: true,
            initial_mode: Mode::Device,
            layout: Layout::default(),
            mixer: MixerConfig::default(),
            standalone: StandaloneConfig::default(),
        }
    }
}

impl DriverConfig {
    /// Load a configuration file, TOML or YAML by extension, and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        Ok(config)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Check ranges and build the control map once to catch duplicate bindings
    pub fn validate(&self) -> std::result::Result<(), DriverError> {
        if self.keep_alive_secs == 0 || self.keep_alive_secs > MAX_KEEP_ALIVE_SECS {
            return Err(DriverError::InvalidConfig(format!(
                "keep_alive_secs must be 1-{}, got {}",
                MAX_KEEP_ALIVE_SECS, self.keep_alive_secs
            )));
        }
        if self.chains_per_bank == 0 {
            return Err(DriverError::InvalidConfig(
                "chains_per_bank must be greater than 0".to_string(),
            ));
        }
        if self.device.port_match.is_empty() {
            return Err(DriverError::InvalidConfig(
                "device.port_match must name at least one port".to_string(),
            ));
        }
        self.mixer.validate()?;
        self.layout.validate()?;
        ControlMap::from_layout(&self.layout)?;
        Ok(())
    }
}

/// MIDI port selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    /// Substrings matched against port names
    pub port_match: Vec<String>,
    /// MIDI client name used by the standalone binary
    pub client_name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port_match: vec!["MPK225".to_string()],
            client_name: "mpk-driver".to_string(),
        }
    }
}

/// CC/note layout of the controller.
///
/// Channels are written 1-16 as on the hardware display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Layout {
    /// Channel of knobs, switches and transport
    pub control_channel: u8,
    /// Channel of the pads
    pub pad_channel: u8,
    /// Knob bank A CC numbers
    pub knobs_a: Vec<u8>,
    /// Knob bank B CC numbers
    pub knobs_b: Vec<u8>,
    /// Pad note numbers
    pub pads: Vec<u8>,
    /// Switch S1-S4 CC numbers
    pub switches: Vec<u8>,
    /// Transport button CC numbers
    pub transport: TransportLayout,
    /// How knobs encode their value
    pub encoder_mode: EncoderMode,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            control_channel: 1,
            pad_channel: 10,
            knobs_a: (70..78).collect(),
            knobs_b: (20..28).collect(),
            pads: (36..52).collect(),
            switches: vec![110, 111, 112, 113],
            transport: TransportLayout::default(),
            encoder_mode: EncoderMode::Absolute,
        }
    }
}

impl Layout {
    /// Control channel as a 0-based wire channel
    pub fn control_channel_index(&self) -> u8 {
        self.control_channel.saturating_sub(1)
    }

    /// Pad channel as a 0-based wire channel
    pub fn pad_channel_index(&self) -> u8 {
        self.pad_channel.saturating_sub(1)
    }

    fn validate(&self) -> std::result::Result<(), DriverError> {
        for (name, channel) in [
            ("control_channel", self.control_channel),
            ("pad_channel", self.pad_channel),
        ] {
            if !(1..=16).contains(&channel) {
                return Err(DriverError::InvalidConfig(format!(
                    "layout.{} must be 1-16, got {}",
                    name, channel
                )));
            }
        }

        for (name, numbers, expected) in [
            ("knobs_a", &self.knobs_a, KNOBS_PER_BANK),
            ("knobs_b", &self.knobs_b, KNOBS_PER_BANK),
            ("pads", &self.pads, PAD_COUNT),
            ("switches", &self.switches, SWITCH_COUNT),
        ] {
            if numbers.len() != expected {
                return Err(DriverError::InvalidConfig(format!(
                    "layout.{} needs {} entries, got {}",
                    name,
                    expected,
                    numbers.len()
                )));
            }
            check_data_bytes(name, numbers)?;
        }

        check_data_bytes("transport", &self.transport.numbers())
    }
}

fn check_data_bytes(name: &str, numbers: &[u8]) -> std::result::Result<(), DriverError> {
    match numbers.iter().find(|n| **n > 127) {
        Some(n) => Err(DriverError::InvalidConfig(format!(
            "layout.{} contains {}, MIDI data bytes are 0-127",
            name, n
        ))),
        None => Ok(()),
    }
}

/// Transport button CC numbers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportLayout {
    pub rewind: u8,
    pub fast_forward: u8,
    pub stop: u8,
    pub play: u8,
    pub record: u8,
}

impl TransportLayout {
    /// All numbers in button order (rewind, fast forward, stop, play, record)
    pub fn numbers(&self) -> [u8; 5] {
        [
            self.rewind,
            self.fast_forward,
            self.stop,
            self.play,
            self.record,
        ]
    }
}

impl Default for TransportLayout {
    fn default() -> Self {
        Self {
            rewind: 115,
            fast_forward: 116,
            stop: 117,
            play: 118,
            record: 119,
        }
    }
}

/// Mixer mode settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MixerConfig {
    /// Volume change per relative encoder step
    pub volume_step: f32,
    /// Balance change per relative encoder step
    pub balance_step: f32,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            volume_step: 0.01,
            balance_step: 0.02,
        }
    }
}

impl MixerConfig {
    fn validate(&self) -> std::result::Result<(), DriverError> {
        for (name, step) in [
            ("volume_step", self.volume_step),
            ("balance_step", self.balance_step),
        ] {
            if !step.is_finite() || step <= 0.0 {
                return Err(DriverError::InvalidConfig(format!(
                    "mixer.{} must be a positive number, got {}",
                    name, step
                )));
            }
        }
        Ok(())
    }
}

/// Settings for the standalone host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StandaloneConfig {
    /// Number of simulated chains
    pub chains: usize,
}

impl Default for StandaloneConfig {
    fn default() -> Self {
        Self { chains: 8 }
    }
}
