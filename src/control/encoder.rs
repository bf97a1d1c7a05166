// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Knob decoding into signed steps.

use std::collections::HashMap;

use super::{Control, EncoderMode};

/// Turns knob values into signed step counts.
///
/// Relative knobs carry the delta in the value. Absolute knobs only report a
/// position, so the previous position of each knob is remembered and the
/// first value seen for a knob yields no movement.
#[derive(Debug, Clone, Default)]
pub struct EncoderTracker {
    mode: EncoderMode,
    last: HashMap<Control, u8>,
}

impl EncoderTracker {
    pub fn new(mode: EncoderMode) -> Self {
        Self {
            mode,
            last: HashMap::new(),
        }
    }

    pub fn mode(&self) -> EncoderMode {
        self.mode
    }

    /// Change the encoder mode, forgetting all known positions
    pub fn set_mode(&mut self, mode: EncoderMode) {
        self.mode = mode;
        self.last.clear();
    }

    /// Signed steps for a knob value
    pub fn steps(&mut self, control: Control, value: u8) -> i32 {
        if self.mode.is_relative() {
            return self.mode.steps(value);
        }

        match self.last.insert(control, value) {
            Some(previous) => value as i32 - previous as i32,
            None => 0,
        }
    }
}
