// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Mixer mode.
//!
//! Knob bank A sets chain volume, knob bank B chain balance. Pads 1-8 toggle
//! mute and pads 9-16 toggle solo. S1/S2 page through the chains.

use tracing::debug;

use super::{KnobInput, ModeHandler};
use crate::config::DriverConfig;
use crate::control::KnobBank;
use crate::host::{Host, Strip};

/// Pads per row; the first row mutes, the second solos
const PADS_PER_ROW: u8 = 8;

/// Knob position to balance, centre at 64, full left at 0, full right at 127
fn absolute_balance(value: u8) -> f32 {
    let offset = value as f32 - 64.0;
    if offset < 0.0 {
        offset / 64.0
    } else {
        offset / 63.0
    }
}

/// Mixer mode handler
#[derive(Debug, Clone)]
pub struct MixerHandler {
    /// Position of the first chain under the knobs
    offset: usize,
    chains_per_bank: usize,
    volume_step: f32,
    balance_step: f32,
}

impl MixerHandler {
    pub fn new(config: &DriverConfig) -> Self {
        let mut handler = Self {
            offset: 0,
            chains_per_bank: 1,
            volume_step: 0.0,
            balance_step: 0.0,
        };
        handler.configure(config);
        handler
    }

    /// Take new settings, keeping the current page
    pub fn configure(&mut self, config: &DriverConfig) {
        self.chains_per_bank = config.chains_per_bank.max(1);
        self.volume_step = config.mixer.volume_step;
        self.balance_step = config.mixer.balance_step;
        self.offset -= self.offset % self.chains_per_bank;
    }

    /// Position of the first chain under the knobs
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Chain under a knob or pad, if it exists
    fn chain_at(&mut self, index: u8, host: &dyn Host) -> Option<Strip> {
        let count = host.chain_count();
        // Chains may have been removed since the last page change
        if self.offset >= count && count > 0 {
            self.offset = (count - 1) / self.chains_per_bank * self.chains_per_bank;
        }
        let position = self.offset + index as usize;
        (position < count).then_some(Strip::Chain(position))
    }
}

impl ModeHandler for MixerHandler {
    fn knob(&mut self, knob: KnobInput, host: &mut dyn Host) {
        let Some(strip) = self.chain_at(knob.index, host) else {
            return;
        };
        if knob.relative && knob.steps == 0 {
            return;
        }

        match knob.bank {
            KnobBank::A => {
                let volume = if knob.relative {
                    host.volume(strip) + knob.steps as f32 * self.volume_step
                } else {
                    knob.value as f32 / 127.0
                };
                host.set_volume(strip, volume.clamp(0.0, 1.0));
            }
            KnobBank::B => {
                let balance = if knob.relative {
                    host.balance(strip) + knob.steps as f32 * self.balance_step
                } else {
                    absolute_balance(knob.value)
                };
                host.set_balance(strip, balance.clamp(-1.0, 1.0));
            }
        }
    }

    fn pad(&mut self, pad: u8, host: &mut dyn Host) {
        let (row, column) = (pad / PADS_PER_ROW, pad % PADS_PER_ROW);
        let Some(strip) = self.chain_at(column, host) else {
            return;
        };

        if row == 0 {
            let mute = !host.is_muted(strip);
            host.set_mute(strip, mute);
        } else {
            let solo = !host.is_soloed(strip);
            host.set_solo(strip, solo);
        }
    }

    fn switch(&mut self, switch: u8, host: &mut dyn Host) {
        let count = host.chain_count();
        match switch {
            0 => {
                self.offset = self.offset.saturating_sub(self.chains_per_bank);
            }
            1 => {
                if self.offset + self.chains_per_bank < count {
                    self.offset += self.chains_per_bank;
                }
            }
            _ => return,
        }
        debug!(offset = self.offset, "mixer page");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostEvent, StandaloneHost};

    fn knob(bank: KnobBank, index: u8, value: u8, steps: i32, relative: bool) -> KnobInput {
        KnobInput {
            bank,
            index,
            value,
            steps,
            relative,
        }
    }

    #[test]
    fn test_absolute_volume_and_balance() {
        let mut host = StandaloneHost::new(8);
        let mut mixer = MixerHandler::new(&DriverConfig::default());

        mixer.knob(knob(KnobBank::A, 2, 127, 0, false), &mut host);
        assert_eq!(host.volume(Strip::Chain(2)), 1.0);

        mixer.knob(knob(KnobBank::B, 0, 0, 0, false), &mut host);
        assert_eq!(host.balance(Strip::Chain(0)), -1.0);

        mixer.knob(knob(KnobBank::B, 0, 127, 0, false), &mut host);
        assert_eq!(host.balance(Strip::Chain(0)), 1.0);

        mixer.knob(knob(KnobBank::B, 0, 64, 0, false), &mut host);
        assert_eq!(host.balance(Strip::Chain(0)), 0.0);
    }

    #[test]
    fn test_relative_volume() {
        let mut host = StandaloneHost::new(8);
        let mut mixer = MixerHandler::new(&DriverConfig::default());
        host.set_volume(Strip::Chain(1), 0.5);
        host.drain_events();

        mixer.knob(knob(KnobBank::A, 1, 0, 10, true), &mut host);
        assert!((host.volume(Strip::Chain(1)) - 0.6).abs() < 1e-4);

        mixer.knob(knob(KnobBank::A, 1, 0, -100, true), &mut host);
        assert_eq!(host.volume(Strip::Chain(1)), 0.0);

        // No movement, no event
        host.drain_events();
        mixer.knob(knob(KnobBank::A, 1, 64, 0, true), &mut host);
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_pads_toggle_mute_and_solo() {
        let mut host = StandaloneHost::new(8);
        let mut mixer = MixerHandler::new(&DriverConfig::default());

        mixer.pad(3, &mut host);
        assert!(host.is_muted(Strip::Chain(3)));
        mixer.pad(3, &mut host);
        assert!(!host.is_muted(Strip::Chain(3)));

        mixer.pad(8, &mut host);
        assert!(host.is_soloed(Strip::Chain(0)));
        assert!(!host.is_muted(Strip::Chain(0)));
    }

    #[test]
    fn test_missing_chains_are_ignored() {
        let mut host = StandaloneHost::new(3);
        let mut mixer = MixerHandler::new(&DriverConfig::default());

        mixer.pad(5, &mut host);
        mixer.knob(knob(KnobBank::A, 7, 100, 0, false), &mut host);
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_paging() {
        let mut host = StandaloneHost::new(20);
        let mut mixer = MixerHandler::new(&DriverConfig::default());

        mixer.switch(1, &mut host);
        assert_eq!(mixer.offset(), 8);
        mixer.switch(1, &mut host);
        assert_eq!(mixer.offset(), 16);
        // No chains beyond 20
        mixer.switch(1, &mut host);
        assert_eq!(mixer.offset(), 16);

        mixer.pad(0, &mut host);
        assert_eq!(
            host.drain_events(),
            vec![HostEvent::Mute {
                strip: Strip::Chain(16),
                mute: true
            }]
        );

        mixer.switch(0, &mut host);
        mixer.switch(0, &mut host);
        mixer.switch(0, &mut host);
        assert_eq!(mixer.offset(), 0);
    }

    #[test]
    fn test_offset_follows_removed_chains() {
        let mut mixer = MixerHandler::new(&DriverConfig::default());
        let mut big = StandaloneHost::new(20);
        mixer.switch(1, &mut big);
        mixer.switch(1, &mut big);
        assert_eq!(mixer.offset(), 16);

        let mut small = StandaloneHost::new(10);
        mixer.pad(0, &mut small);
        assert_eq!(mixer.offset(), 8);
        assert!(small.is_muted(Strip::Chain(8)));
    }

    #[test]
    fn test_configure_realigns_page() {
        let mut host = StandaloneHost::new(20);
        let mut mixer = MixerHandler::new(&DriverConfig::default());
        mixer.switch(1, &mut host);
        assert_eq!(mixer.offset(), 8);

        let config = DriverConfig {
            chains_per_bank: 6,
            ..Default::default()
        };
        mixer.configure(&config);
        assert_eq!(mixer.offset(), 6);
    }
}
