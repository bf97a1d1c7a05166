// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI Input handling for receiving messages from the controller.
//!
//! This module parses raw MIDI bytes and wraps a midir input connection
//! that forwards parsed messages over a channel.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use midir::{Ignore, MidiInputConnection, MidiInputPort};
use tracing::{debug, info};

use super::messages;
use crate::error::{DriverError, Result};

/// Parsed MIDI message types
#[derive(Debug, Clone, PartialEq)]
pub enum MidiMessage {
    /// Note On: channel (0-15), note (0-127), velocity (1-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Control Change: channel (0-15), controller (0-127), value (0-127)
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },
    /// Pitch Bend: channel (0-15), value (-8192 to 8191)
    PitchBend { channel: u8, value: i16 },
    /// Channel Aftertouch: channel (0-15), pressure (0-127)
    ChannelAftertouch { channel: u8, pressure: u8 },
    /// Poly Aftertouch: channel (0-15), note (0-127), pressure (0-127)
    PolyAftertouch { channel: u8, note: u8, pressure: u8 },
    /// MIDI Clock tick
    TimingClock,
    /// Start playback
    Start,
    /// Continue playback
    Continue,
    /// Stop playback
    Stop,
    /// Active sensing heartbeat
    ActiveSensing,
    /// Unknown/unparsed message
    Unknown(Vec<u8>),
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a MidiMessage
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        let status = data[0];

        // System Real-Time messages (single byte)
        match status {
            messages::TIMING_CLOCK => return Some(MidiMessage::TimingClock),
            messages::START => return Some(MidiMessage::Start),
            messages::CONTINUE => return Some(MidiMessage::Continue),
            messages::STOP => return Some(MidiMessage::Stop),
            messages::ACTIVE_SENSING => return Some(MidiMessage::ActiveSensing),
            _ => {}
        }

        // Channel messages
        let msg_type = status & 0xF0;
        let channel = status & 0x0F;

        match msg_type {
            messages::NOTE_OFF if data.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: data[1] & 0x7F,
                velocity: data[2] & 0x7F,
            }),
            messages::NOTE_ON if data.len() >= 3 => {
                let velocity = data[2] & 0x7F;
                // Note On with velocity 0 is equivalent to Note Off
                if velocity == 0 {
                    Some(MidiMessage::NoteOff {
                        channel,
                        note: data[1] & 0x7F,
                        velocity: 0,
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note: data[1] & 0x7F,
                        velocity,
                    })
                }
            }
            messages::CONTROL_CHANGE if data.len() >= 3 => Some(MidiMessage::ControlChange {
                channel,
                controller: data[1] & 0x7F,
                value: data[2] & 0x7F,
            }),
            messages::PROGRAM_CHANGE if data.len() >= 2 => Some(MidiMessage::ProgramChange {
                channel,
                program: data[1] & 0x7F,
            }),
            messages::PITCH_BEND if data.len() >= 3 => {
                let lsb = (data[1] & 0x7F) as i16;
                let msb = (data[2] & 0x7F) as i16;
                let value = ((msb << 7) | lsb) - 8192;
                Some(MidiMessage::PitchBend { channel, value })
            }
            messages::CHANNEL_AFTERTOUCH if data.len() >= 2 => {
                Some(MidiMessage::ChannelAftertouch {
                    channel,
                    pressure: data[1] & 0x7F,
                })
            }
            messages::POLY_AFTERTOUCH if data.len() >= 3 => Some(MidiMessage::PolyAftertouch {
                channel,
                note: data[1] & 0x7F,
                pressure: data[2] & 0x7F,
            }),
            _ => Some(MidiMessage::Unknown(data.to_vec())),
        }
    }

    /// Channel (0-15) of a channel voice message
    pub fn channel(&self) -> Option<u8> {
        match self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::ProgramChange { channel, .. }
            | MidiMessage::PitchBend { channel, .. }
            | MidiMessage::ChannelAftertouch { channel, .. }
            | MidiMessage::PolyAftertouch { channel, .. } => Some(*channel),
            _ => None,
        }
    }

    /// Check if this is a system real-time message
    pub fn is_realtime(&self) -> bool {
        matches!(
            self,
            MidiMessage::TimingClock
                | MidiMessage::Start
                | MidiMessage::Continue
                | MidiMessage::Stop
                | MidiMessage::ActiveSensing
        )
    }
}

/// MIDI Input handler using midir
pub struct MidiInput {
    _connection: MidiInputConnection<()>,
    receiver: Receiver<MidiMessage>,
    port_name: String,
}

impl MidiInput {
    /// Connect to the input port at `source_index`
    pub fn new(client_name: &str, source_index: usize) -> Result<Self> {
        let midi_in = new_midir_input(client_name)?;
        let port = midi_in
            .ports()
            .into_iter()
            .nth(source_index)
            .ok_or_else(|| DriverError::Midi(format!("MIDI source {} not found", source_index)))?;
        Self::connect(midi_in, port)
    }

    /// Connect to the first input port whose name contains any of `patterns`
    pub fn open_matching(client_name: &str, patterns: &[String]) -> Result<Self> {
        let midi_in = new_midir_input(client_name)?;
        let port = midi_in
            .ports()
            .into_iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .map(|name| patterns.iter().any(|pat| name.contains(pat.as_str())))
                    .unwrap_or(false)
            })
            .ok_or_else(|| DriverError::PortNotFound {
                direction: "input",
                patterns: patterns.to_vec(),
            })?;
        Self::connect(midi_in, port)
    }

    fn connect(midi_in: midir::MidiInput, port: MidiInputPort) -> Result<Self> {
        let port_name = midi_in
            .port_name(&port)
            .map_err(|e| DriverError::Midi(e.to_string()))?;

        let (tx, rx): (Sender<MidiMessage>, Receiver<MidiMessage>) = mpsc::channel();

        let connection = midi_in
            .connect(
                &port,
                "mpk-driver-in",
                move |_timestamp, data, _| {
                    if let Some(msg) = MidiMessage::parse(data) {
                        let _ = tx.send(msg);
                    }
                },
                (),
            )
            .map_err(|e| DriverError::Midi(format!("Failed to connect to source: {}", e)))?;

        info!(port = %port_name, "MIDI input connected");

        Ok(Self {
            _connection: connection,
            receiver: rx,
            port_name,
        })
    }

    /// Name of the connected port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Wait up to `timeout` for the next message.
    ///
    /// `Ok(None)` on timeout, [`DriverError::Disconnected`] once the
    /// connection has gone away.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<MidiMessage>> {
        recv_message(&self.receiver, timeout)
    }
}

fn recv_message(
    receiver: &Receiver<MidiMessage>,
    timeout: Duration,
) -> Result<Option<MidiMessage>> {
    match receiver.recv_timeout(timeout) {
        Ok(msg) => Ok(Some(msg)),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(DriverError::Disconnected),
    }
}

fn new_midir_input(client_name: &str) -> Result<midir::MidiInput> {
    let mut midi_in = midir::MidiInput::new(client_name)
        .map_err(|e| DriverError::Midi(format!("Failed to create MIDI client: {}", e)))?;
    // Only sysex, clock and active sensing are filtered.
    midi_in.ignore(Ignore::All);
    debug!(client = client_name, "MIDI input client created");
    Ok(midi_in)
}

/// List all available MIDI sources
pub fn list_sources() -> Vec<(usize, String)> {
    let Ok(midi_in) = midir::MidiInput::new("mpk-driver probe") else {
        return Vec::new();
    };

    midi_in
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            let name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown {}", i));
            (i, name)
        })
        .collect()
}

/// Print all available MIDI sources to stdout
pub fn print_sources() {
    let sources = list_sources();
    if sources.is_empty() {
        println!("No MIDI sources found.");
    } else {
        println!("Available MIDI sources (inputs):");
        for (i, name) in sources {
            println!("  {}: {}", i, name);
        }
    }
}
