// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Physical controls of the controller.
//!
//! This module provides:
//! - The controls of the hardware surface (knobs, pads, switches, transport)
//! - The mapping from programmed CC/note numbers to those controls
//! - Encoder decoding for absolute and relative knobs

pub mod encoder;
pub mod midi_map;

pub use encoder::EncoderTracker;
pub use midi_map::{format_binding, ControlMap, EncoderMode, MidiBinding, MidiBindingType};

use std::fmt;

use crate::config::{KNOBS_PER_BANK, PAD_COUNT, SWITCH_COUNT};

/// Knob bank selected on the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnobBank {
    A,
    B,
}

/// Transport buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportButton {
    Rewind,
    FastForward,
    Stop,
    Play,
    Record,
}

impl TransportButton {
    /// All buttons in layout order
    pub const ALL: [TransportButton; 5] = [
        TransportButton::Rewind,
        TransportButton::FastForward,
        TransportButton::Stop,
        TransportButton::Play,
        TransportButton::Record,
    ];
}

/// A physical control on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Q-Link knob, index 0-7 within its bank
    Knob { bank: KnobBank, index: u8 },
    /// Pad 0-15
    Pad(u8),
    /// Assignable switch S1-S4 as 0-3
    Switch(u8),
    /// Transport button
    Transport(TransportButton),
}

impl Control {
    /// Every control on the surface, knobs first
    pub fn all() -> Vec<Control> {
        let knobs = [KnobBank::A, KnobBank::B].into_iter().flat_map(|bank| {
            (0..KNOBS_PER_BANK as u8).map(move |index| Control::Knob { bank, index })
        });
        knobs
            .chain((0..PAD_COUNT as u8).map(Control::Pad))
            .chain((0..SWITCH_COUNT as u8).map(Control::Switch))
            .chain(TransportButton::ALL.into_iter().map(Control::Transport))
            .collect()
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Knob { bank, index } => write!(f, "knob {:?}{}", bank, index + 1),
            Control::Pad(index) => write!(f, "pad {}", index + 1),
            Control::Switch(index) => write!(f, "switch S{}", index + 1),
            Control::Transport(button) => write!(f, "{:?}", button),
        }
    }
}

/// A control moved or pressed, with its raw 7-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEvent {
    pub control: Control,
    pub value: u8,
}

impl ControlEvent {
    pub fn new(control: Control, value: u8) -> Self {
        Self { control, value }
    }

    /// Buttons and pads send a non-zero value on press, zero on release
    pub fn is_press(&self) -> bool {
        self.value > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_display() {
        let knob = Control::Knob {
            bank: KnobBank::B,
            index: 2,
        };
        assert_eq!(knob.to_string(), "knob B3");
        assert_eq!(Control::Pad(0).to_string(), "pad 1");
        assert_eq!(Control::Switch(3).to_string(), "switch S4");
        assert_eq!(
            Control::Transport(TransportButton::Play).to_string(),
            "Play"
        );
    }

    #[test]
    fn test_press_release() {
        assert!(ControlEvent::new(Control::Pad(1), 90).is_press());
        assert!(!ControlEvent::new(Control::Pad(1), 0).is_press());
    }

    #[test]
    fn test_all_controls() {
        let all = Control::all();
        assert_eq!(all.len(), 8 + 8 + 16 + 4 + 5);
        assert_eq!(
            all[0],
            Control::Knob {
                bank: KnobBank::A,
                index: 0
            }
        );
        assert_eq!(all[all.len() - 1], Control::Transport(TransportButton::Record));
    }
}
