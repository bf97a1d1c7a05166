// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Boundary to the workstation that loads the driver.
//!
//! The host owns MIDI routing, the mixer, the chains, the sequencer and the
//! UI. The driver reaches all of them through the [`Host`] trait and never
//! keeps references to host objects between calls.

pub mod standalone;

pub use standalone::{HostEvent, StandaloneHost};

use std::fmt;
use std::time::Duration;

/// Highest sequencer bank
pub const MAX_SEQUENCER_BANK: u8 = 64;

/// A mixer strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strip {
    /// Strip of the chain at this zero-based position
    Chain(usize),
    /// Main output strip
    Main,
}

impl fmt::Display for Strip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strip::Chain(position) => write!(f, "chain {}", position + 1),
            Strip::Main => write!(f, "main"),
        }
    }
}

/// Commands for the host's UI command bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cuia {
    TogglePlay,
    Stop,
    ToggleRecord,
    Back,
    Select,
    Menu,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Turn UI encoder `index` by `steps`
    Zynpot { index: u8, steps: i32 },
    ChainPrevious,
    ChainNext,
    ScreenMixer,
    ScreenControl,
    ScreenPreset,
    ScreenZynpad,
    ScreenPatternEditor,
    ScreenAdmin,
    ScreenSnapshot,
    TempoUp,
    TempoDown,
}

impl Cuia {
    /// Command name on the bus
    pub fn as_str(&self) -> &'static str {
        match self {
            Cuia::TogglePlay => "TOGGLE_PLAY",
            Cuia::Stop => "STOP",
            Cuia::ToggleRecord => "TOGGLE_RECORD",
            Cuia::Back => "BACK",
            Cuia::Select => "SELECT",
            Cuia::Menu => "MENU",
            Cuia::ArrowUp => "ARROW_UP",
            Cuia::ArrowDown => "ARROW_DOWN",
            Cuia::ArrowLeft => "ARROW_LEFT",
            Cuia::ArrowRight => "ARROW_RIGHT",
            Cuia::Zynpot { .. } => "ZYNPOT",
            Cuia::ChainPrevious => "CHAIN_PREVIOUS",
            Cuia::ChainNext => "CHAIN_NEXT",
            Cuia::ScreenMixer => "SCREEN_AUDIO_MIXER",
            Cuia::ScreenControl => "SCREEN_CONTROL",
            Cuia::ScreenPreset => "SCREEN_PRESET",
            Cuia::ScreenZynpad => "SCREEN_ZYNPAD",
            Cuia::ScreenPatternEditor => "SCREEN_PATTERN_EDITOR",
            Cuia::ScreenAdmin => "SCREEN_ADMIN",
            Cuia::ScreenSnapshot => "SCREEN_SNAPSHOT",
            Cuia::TempoUp => "TEMPO_UP",
            Cuia::TempoDown => "TEMPO_DOWN",
        }
    }
}

impl fmt::Display for Cuia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cuia::Zynpot { index, steps } => write!(f, "{} {},{}", self.as_str(), index, steps),
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Host screens the driver reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Mixer,
    Zynpad,
    PatternEditor,
    Control,
    Preset,
    Admin,
    Other(String),
}

impl Screen {
    /// Parse the host's screen name
    pub fn from_name(name: &str) -> Self {
        match name {
            "audio_mixer" => Screen::Mixer,
            "zynpad" => Screen::Zynpad,
            "pattern_editor" => Screen::PatternEditor,
            "control" => Screen::Control,
            "preset" | "bank" => Screen::Preset,
            "admin" => Screen::Admin,
            other => Screen::Other(other.to_string()),
        }
    }
}

/// UI signals a driver can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    ScreenChanged,
}

/// Periodic driver tasks run by the host's slow-update timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodicTask {
    KeepAlive,
}

/// Everything the driver may ask of the host.
///
/// Volume is `0.0..=1.0`, balance `-1.0..=1.0`. Sequencer banks start at 1.
pub trait Host {
    /// Number of chains with a mixer strip
    fn chain_count(&self) -> usize;

    fn volume(&self, strip: Strip) -> f32;
    fn set_volume(&mut self, strip: Strip, value: f32);
    fn balance(&self, strip: Strip) -> f32;
    fn set_balance(&mut self, strip: Strip, value: f32);
    fn is_muted(&self, strip: Strip) -> bool;
    fn set_mute(&mut self, strip: Strip, mute: bool);
    fn is_soloed(&self, strip: Strip) -> bool;
    fn set_solo(&mut self, strip: Strip, solo: bool);

    /// Send a command to the UI command bus
    fn cuia(&mut self, command: Cuia);

    fn sequencer_bank(&self) -> u8;
    fn set_sequencer_bank(&mut self, bank: u8);
    /// Start or stop the sequence on `pad` of `bank`
    fn toggle_sequence(&mut self, bank: u8, pad: u8);

    /// Write raw MIDI to the controller
    fn send_to_device(&mut self, message: &[u8]);

    /// Register a periodic task
    fn add_slow_update(&mut self, task: PeriodicTask, period: Duration);
    fn remove_slow_update(&mut self, task: PeriodicTask);

    fn subscribe(&mut self, signal: Signal);
    fn unsubscribe(&mut self, signal: Signal);
}
