// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI plumbing between the controller and the driver.
//!
//! The driver only sees parsed [`MidiMessage`]s and writes back through the
//! [`MidiOutput`] trait. The midir ports are used by the standalone binary.

pub mod input;
pub mod output;

use anyhow::Result;

pub use input::{list_sources, print_sources, MidiInput, MidiMessage};
pub use output::{list_destinations, print_destinations, MidirOutput};

/// Writer for raw messages to the controller
pub trait MidiOutput: Send {
    /// Send one message immediately, e.g. `[0x90, 0, 0]`
    fn send(&mut self, message: &[u8]) -> Result<()>;
}

/// Status bytes
pub mod messages {
    // Channel voice, lower nibble is the channel
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_AFTERTOUCH: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_AFTERTOUCH: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;

    // System real-time
    pub const TIMING_CLOCK: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;
    pub const ACTIVE_SENSING: u8 = 0xFE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Host, HostEvent, StandaloneHost};
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};

    /// Output that records or rejects everything
    struct MockMidiOutput {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        fail: bool,
    }

    impl MidiOutput for MockMidiOutput {
        fn send(&mut self, message: &[u8]) -> Result<()> {
            if self.fail {
                return Err(anyhow!("port closed"));
            }
            self.sent.lock().unwrap().push(message.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_host_forwards_to_output() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut host = StandaloneHost::new(0).with_output(Box::new(MockMidiOutput {
            sent: sent.clone(),
            fail: false,
        }));

        host.send_to_device(&[messages::NOTE_ON, 0, 0]);
        assert_eq!(*sent.lock().unwrap(), vec![vec![0x90, 0, 0]]);
    }

    #[test]
    fn test_output_failure_is_not_fatal() {
        let mut host = StandaloneHost::new(0).with_output(Box::new(MockMidiOutput {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }));

        host.send_to_device(&[messages::NOTE_ON, 0, 0]);
        assert_eq!(
            host.drain_events(),
            vec![HostEvent::DeviceOutput(vec![0x90, 0, 0])]
        );
    }
}
