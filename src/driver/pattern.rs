// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pattern mode: pads launch sequences of the current sequencer bank.

use tracing::debug;

use super::{repeat_cuia, KnobInput, ModeHandler};
use crate::control::KnobBank;
use crate::host::{Cuia, Host, MAX_SEQUENCER_BANK};

const TEMPO_KNOB: u8 = 0;
const VERTICAL_KNOB: u8 = 1;
const HORIZONTAL_KNOB: u8 = 2;

/// Pattern mode handler
#[derive(Debug, Clone, Default)]
pub struct PatternHandler;

impl PatternHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ModeHandler for PatternHandler {
    fn knob(&mut self, knob: KnobInput, host: &mut dyn Host) {
        if knob.bank != KnobBank::A || knob.steps == 0 {
            return;
        }

        match knob.index {
            TEMPO_KNOB => repeat_cuia(host, knob.steps, Cuia::TempoUp, Cuia::TempoDown),
            VERTICAL_KNOB => repeat_cuia(host, knob.steps, Cuia::ArrowDown, Cuia::ArrowUp),
            HORIZONTAL_KNOB => {
                repeat_cuia(host, knob.steps, Cuia::ArrowRight, Cuia::ArrowLeft)
            }
            _ => {}
        }
    }

    fn pad(&mut self, pad: u8, host: &mut dyn Host) {
        let bank = host.sequencer_bank();
        debug!(bank, pad, "toggle sequence");
        host.toggle_sequence(bank, pad);
    }

    fn switch(&mut self, switch: u8, host: &mut dyn Host) {
        let bank = host.sequencer_bank();
        match switch {
            0 if bank > 1 => host.set_sequencer_bank(bank - 1),
            1 if bank < MAX_SEQUENCER_BANK => host.set_sequencer_bank(bank + 1),
            _ => {}
        }
    }
}
