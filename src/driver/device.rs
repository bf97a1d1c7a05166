// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Device mode: UI navigation.

use super::{repeat_cuia, KnobInput, ModeHandler};
use crate::control::KnobBank;
use crate::host::{Cuia, Host};

/// Number of UI encoders on the host
const ZYNPOT_COUNT: u8 = 4;
const VERTICAL_KNOB: u8 = 4;
const HORIZONTAL_KNOB: u8 = 5;

/// Pad layout, top row first:
///
/// ```text
/// Back        Up          Select        Menu
/// Left        Down        Right         Control
/// Mixer       Zynpad      Pattern       Preset
/// Snapshot    Admin       Chain prev    Chain next
/// ```
const PAD_COMMANDS: [Cuia; 16] = [
    Cuia::Back,
    Cuia::ArrowUp,
    Cuia::Select,
    Cuia::Menu,
    Cuia::ArrowLeft,
    Cuia::ArrowDown,
    Cuia::ArrowRight,
    Cuia::ScreenControl,
    Cuia::ScreenMixer,
    Cuia::ScreenZynpad,
    Cuia::ScreenPatternEditor,
    Cuia::ScreenPreset,
    Cuia::ScreenSnapshot,
    Cuia::ScreenAdmin,
    Cuia::ChainPrevious,
    Cuia::ChainNext,
];

/// Device mode handler
#[derive(Debug, Clone, Default)]
pub struct DeviceHandler;

impl DeviceHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ModeHandler for DeviceHandler {
    fn knob(&mut self, knob: KnobInput, host: &mut dyn Host) {
        if knob.bank != KnobBank::A || knob.steps == 0 {
            return;
        }

        match knob.index {
            index if index < ZYNPOT_COUNT => host.cuia(Cuia::Zynpot {
                index,
                steps: knob.steps,
            }),
            VERTICAL_KNOB => repeat_cuia(host, knob.steps, Cuia::ArrowDown, Cuia::ArrowUp),
            HORIZONTAL_KNOB => {
                repeat_cuia(host, knob.steps, Cuia::ArrowRight, Cuia::ArrowLeft)
            }
            _ => {}
        }
    }

    fn pad(&mut self, pad: u8, host: &mut dyn Host) {
        if let Some(command) = PAD_COMMANDS.get(pad as usize) {
            host.cuia(*command);
        }
    }

    fn switch(&mut self, switch: u8, host: &mut dyn Host) {
        match switch {
            0 => host.cuia(Cuia::ChainPrevious),
            1 => host.cuia(Cuia::ChainNext),
            _ => {}
        }
    }
}
