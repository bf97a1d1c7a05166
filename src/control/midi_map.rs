// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI mapping from programmed CC/note numbers to physical controls.
//!
//! The table is built once from the configured [`Layout`] and looked up per
//! incoming message. Anything not in the table is left for the host.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Control, ControlEvent, KnobBank, TransportButton};
use crate::config::Layout;
use crate::error::DriverError;
use crate::midi::MidiMessage;

/// Type of MIDI binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidiBindingType {
    /// Note on/off
    Note,
    /// Control Change (CC)
    ControlChange,
}

/// A MIDI binding identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MidiBinding {
    /// Binding type
    pub binding_type: MidiBindingType,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Data byte 1 (note number or CC number)
    pub data1: u8,
}

impl MidiBinding {
    /// Create a note binding
    pub fn note(channel: u8, note: u8) -> Self {
        Self {
            binding_type: MidiBindingType::Note,
            channel,
            data1: note,
        }
    }

    /// Create a CC binding
    pub fn cc(channel: u8, cc: u8) -> Self {
        Self {
            binding_type: MidiBindingType::ControlChange,
            channel,
            data1: cc,
        }
    }
}

/// Encoder mode for knob CCs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderMode {
    /// Absolute (0-127)
    #[default]
    Absolute,
    /// Relative (64 = no change, <64 = decrement, >64 = increment)
    Relative64,
    /// Relative (0 = no change, 1-63 = increment, 64-127 = decrement by value - 64)
    RelativeBinary,
    /// Relative (two's complement, 1-64 = increment, 65-127 = decrement)
    RelativeSigned,
}

impl EncoderMode {
    /// Signed step count encoded in a relative value. Always 0 for `Absolute`.
    pub fn steps(&self, value: u8) -> i32 {
        let value = (value & 0x7F) as i32;
        match self {
            EncoderMode::Absolute => 0,
            EncoderMode::Relative64 => value - 64,
            EncoderMode::RelativeBinary => {
                if value < 64 {
                    value
                } else {
                    -(value - 64)
                }
            }
            EncoderMode::RelativeSigned => {
                if value <= 64 {
                    value
                } else {
                    -(128 - value)
                }
            }
        }
    }

    /// Check if values are deltas rather than positions
    pub fn is_relative(&self) -> bool {
        *self != EncoderMode::Absolute
    }
}

/// Lookup table from bindings to controls
#[derive(Debug, Clone)]
pub struct ControlMap {
    bindings: HashMap<MidiBinding, Control>,
}

impl ControlMap {
    /// Build the table for a layout.
    ///
    /// Fails when two controls share a binding.
    pub fn from_layout(layout: &Layout) -> Result<Self, DriverError> {
        let control_ch = layout.control_channel_index();
        let pad_ch = layout.pad_channel_index();

        let mut entries: Vec<(MidiBinding, Control)> = Vec::new();

        for (bank, ccs) in [(KnobBank::A, &layout.knobs_a), (KnobBank::B, &layout.knobs_b)] {
            for (index, cc) in ccs.iter().enumerate() {
                entries.push((
                    MidiBinding::cc(control_ch, *cc),
                    Control::Knob {
                        bank,
                        index: index as u8,
                    },
                ));
            }
        }
        for (index, note) in layout.pads.iter().enumerate() {
            entries.push((MidiBinding::note(pad_ch, *note), Control::Pad(index as u8)));
        }
        for (index, cc) in layout.switches.iter().enumerate() {
            entries.push((MidiBinding::cc(control_ch, *cc), Control::Switch(index as u8)));
        }
        for (button, cc) in TransportButton::ALL
            .iter()
            .zip(layout.transport.numbers().iter())
        {
            entries.push((MidiBinding::cc(control_ch, *cc), Control::Transport(*button)));
        }

        let mut bindings = HashMap::with_capacity(entries.len());
        for (binding, control) in entries {
            if let Some(existing) = bindings.insert(binding, control) {
                return Err(DriverError::DuplicateBinding {
                    binding: format_binding(&binding),
                    first: existing.to_string(),
                    second: control.to_string(),
                });
            }
        }

        Ok(Self { bindings })
    }

    /// Resolve a message to the control that sent it
    pub fn resolve(&self, message: &MidiMessage) -> Option<ControlEvent> {
        let (binding, value) = match *message {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => (MidiBinding::note(channel, note), velocity),
            MidiMessage::NoteOff { channel, note, .. } => (MidiBinding::note(channel, note), 0),
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => (MidiBinding::cc(channel, controller), value),
            _ => return None,
        };

        self.bindings
            .get(&binding)
            .map(|control| ControlEvent::new(*control, value))
    }

    /// Number of bound controls
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Binding of a control, for display
    pub fn binding_of(&self, control: Control) -> Option<MidiBinding> {
        self.bindings
            .iter()
            .find(|(_, c)| **c == control)
            .map(|(b, _)| *b)
    }
}

/// Format a MIDI binding for display
pub fn format_binding(binding: &MidiBinding) -> String {
    let channel = format!("Ch{} ", binding.channel + 1);

    match binding.binding_type {
        MidiBindingType::Note => {
            let note_names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
            let octave = (binding.data1 / 12) as i8 - 1;
            let name = note_names[(binding.data1 % 12) as usize];
            format!("{}Note {}{}", channel, name, octave)
        }
        MidiBindingType::ControlChange => {
            format!("{}CC {}", channel, binding.data1)
        }
    }
}
