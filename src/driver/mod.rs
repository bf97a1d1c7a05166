// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Controller driver for the Akai MPK 225.
//!
//! The driver resolves incoming MIDI to physical controls and hands them to
//! the handler of the active mode:
//! - Mixer: knobs drive chain volume and balance, pads mute and solo
//! - Device: knobs turn the UI encoders, pads navigate the UI
//! - Pattern: pads launch sequences, knobs adjust tempo and move the cursor
//!
//! Transport buttons, the mode switch (S3) and the menu switch (S4) behave
//! the same in every mode.

pub mod device;
pub mod mixer;
pub mod pattern;

pub use device::DeviceHandler;
pub use mixer::MixerHandler;
pub use pattern::PatternHandler;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::config::DriverConfig;
use crate::control::{Control, ControlMap, EncoderTracker, KnobBank, TransportButton};
use crate::error::DriverError;
use crate::host::{Cuia, Host, PeriodicTask, Screen, Signal};
use crate::midi::MidiMessage;

/// Switch that cycles the mode
pub const MODE_SWITCH: u8 = 2;
/// Switch that opens the host menu
pub const MENU_SWITCH: u8 = 3;

/// Message sent to keep the controller's output port awake
pub const KEEP_ALIVE_MESSAGE: [u8; 3] = [0x90, 0, 0];

/// Upper bound of UI commands emitted for one knob movement
const MAX_REPEAT: u32 = 8;

/// Identity of the supported hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Port names the device shows up as
    pub dev_ids: &'static [&'static str],
    pub driver_name: &'static str,
    pub driver_description: &'static str,
    /// Whether the host should stop routing the device to chains
    pub unroute_from_chains: bool,
}

impl DeviceInfo {
    /// Check if a port belongs to this device
    pub fn matches_port(&self, port_name: &str) -> bool {
        self.dev_ids.iter().any(|id| port_name.contains(id))
    }
}

/// The Akai MPK 225. Keys keep playing the chains while the driver is loaded.
pub const DEVICE_INFO: DeviceInfo = DeviceInfo {
    dev_ids: &["MPK225 IN 1"],
    driver_name: "Akai MPK 225",
    driver_description: "Interface for Akai MPK 225",
    unroute_from_chains: false,
};

/// Input-handling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Mixer,
    #[default]
    Device,
    Pattern,
}

impl Mode {
    /// Next mode in Mixer, Device, Pattern order
    pub fn next(self) -> Self {
        match self {
            Mode::Mixer => Mode::Device,
            Mode::Device => Mode::Pattern,
            Mode::Pattern => Mode::Mixer,
        }
    }

    /// Mode matching a host screen
    pub fn for_screen(screen: &Screen) -> Self {
        match screen {
            Screen::Mixer => Mode::Mixer,
            Screen::Zynpad | Screen::PatternEditor => Mode::Pattern,
            _ => Mode::Device,
        }
    }

    /// Screen shown when the mode is selected on the controller
    fn screen_command(self) -> Cuia {
        match self {
            Mode::Mixer => Cuia::ScreenMixer,
            Mode::Device => Cuia::ScreenControl,
            Mode::Pattern => Cuia::ScreenZynpad,
        }
    }
}

/// A knob movement as seen by a mode handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobInput {
    pub bank: KnobBank,
    pub index: u8,
    /// Raw 7-bit value
    pub value: u8,
    /// Signed movement since the last value
    pub steps: i32,
    /// Whether `value` is a delta rather than a position
    pub relative: bool,
}

/// Behaviour of one mode.
///
/// Pads and switches are only passed on press.
pub trait ModeHandler: Send {
    fn knob(&mut self, knob: KnobInput, host: &mut dyn Host);
    fn pad(&mut self, pad: u8, host: &mut dyn Host);
    fn switch(&mut self, switch: u8, host: &mut dyn Host);
}

/// Emit `positive` or `negative` once per step
pub(crate) fn repeat_cuia(host: &mut dyn Host, steps: i32, positive: Cuia, negative: Cuia) {
    let command = if steps > 0 { positive } else { negative };
    for _ in 0..steps.unsigned_abs().min(MAX_REPEAT) {
        host.cuia(command);
    }
}

fn transport_command(button: TransportButton) -> Cuia {
    match button {
        TransportButton::Play => Cuia::TogglePlay,
        TransportButton::Stop => Cuia::Stop,
        TransportButton::Record => Cuia::ToggleRecord,
        TransportButton::Rewind => Cuia::Back,
        TransportButton::FastForward => Cuia::Select,
    }
}

/// Mode dispatcher for one controller
pub struct Driver {
    config: DriverConfig,
    map: ControlMap,
    encoders: EncoderTracker,
    mode: Mode,
    mixer: MixerHandler,
    device: DeviceHandler,
    pattern: PatternHandler,
    initialized: bool,
}

impl Driver {
    /// Create a driver from a validated configuration
    pub fn new(config: DriverConfig) -> Result<Self, DriverError> {
        config.validate()?;
        let map = ControlMap::from_layout(&config.layout)?;

        Ok(Self {
            map,
            encoders: EncoderTracker::new(config.layout.encoder_mode),
            mode: config.initial_mode,
            mixer: MixerHandler::new(&config),
            device: DeviceHandler::new(),
            pattern: PatternHandler::new(),
            initialized: false,
            config,
        })
    }

    /// Identity of the supported hardware
    pub fn info() -> &'static DeviceInfo {
        &DEVICE_INFO
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Register the keep-alive task and the screen signal
    pub fn init(&mut self, host: &mut dyn Host) {
        if self.initialized {
            return;
        }
        host.add_slow_update(PeriodicTask::KeepAlive, self.keep_alive_period());
        host.subscribe(Signal::ScreenChanged);
        self.initialized = true;
        info!(driver = DEVICE_INFO.driver_name, mode = ?self.mode, "driver started");
    }

    /// Undo everything `init` registered
    pub fn end(&mut self, host: &mut dyn Host) {
        if !self.initialized {
            return;
        }
        host.remove_slow_update(PeriodicTask::KeepAlive);
        host.unsubscribe(Signal::ScreenChanged);
        self.initialized = false;
        info!(driver = DEVICE_INFO.driver_name, "driver stopped");
    }

    /// Select a mode
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            info!(from = ?self.mode, to = ?mode, "mode changed");
            self.mode = mode;
        }
    }

    /// Follow the host's screen when enabled
    pub fn on_screen_changed(&mut self, screen: &Screen) {
        if self.config.follow_screen {
            self.set_mode(Mode::for_screen(screen));
        }
    }

    /// Run a periodic task registered in `init`
    pub fn run_periodic(&mut self, task: PeriodicTask, host: &mut dyn Host) {
        match task {
            PeriodicTask::KeepAlive => {
                trace!("keep-alive");
                host.send_to_device(&KEEP_ALIVE_MESSAGE);
            }
        }
    }

    /// Replace the configuration, e.g. after a reload.
    ///
    /// Keeps the current mode. Known knob positions are forgotten.
    pub fn apply_config(
        &mut self,
        config: DriverConfig,
        host: &mut dyn Host,
    ) -> Result<(), DriverError> {
        config.validate()?;
        let map = ControlMap::from_layout(&config.layout)?;

        let period_changed = config.keep_alive_secs != self.config.keep_alive_secs;
        if config.device != self.config.device {
            warn!("device settings changed, restart to reconnect");
        }
        if config.standalone != self.config.standalone {
            warn!("standalone settings changed, restart to apply");
        }

        self.map = map;
        self.encoders.set_mode(config.layout.encoder_mode);
        self.mixer.configure(&config);
        self.config = config;

        if self.initialized && period_changed {
            host.remove_slow_update(PeriodicTask::KeepAlive);
            host.add_slow_update(PeriodicTask::KeepAlive, self.keep_alive_period());
        }
        info!("configuration applied");
        Ok(())
    }

    /// Handle raw MIDI bytes
    pub fn midi_bytes(&mut self, bytes: &[u8], host: &mut dyn Host) -> bool {
        match MidiMessage::parse(bytes) {
            Some(message) => self.midi_event(&message, host),
            None => false,
        }
    }

    /// Handle one message. Returns true when the message was consumed;
    /// anything else is left to the host's normal routing.
    pub fn midi_event(&mut self, message: &MidiMessage, host: &mut dyn Host) -> bool {
        let Some(event) = self.map.resolve(message) else {
            trace!(?message, "not mapped");
            return false;
        };
        debug!(control = %event.control, value = event.value, mode = ?self.mode, "control");

        match event.control {
            Control::Transport(button) => {
                if event.is_press() {
                    host.cuia(transport_command(button));
                }
            }
            Control::Switch(MODE_SWITCH) => {
                if event.is_press() {
                    let mode = self.mode.next();
                    self.set_mode(mode);
                    if self.config.follow_screen {
                        host.cuia(mode.screen_command());
                    }
                }
            }
            Control::Switch(MENU_SWITCH) => {
                if event.is_press() {
                    host.cuia(Cuia::Menu);
                }
            }
            Control::Switch(switch) => {
                if event.is_press() {
                    self.active_handler().switch(switch, host);
                }
            }
            Control::Pad(pad) => {
                if event.is_press() {
                    self.active_handler().pad(pad, host);
                }
            }
            Control::Knob { bank, index } => {
                let knob = KnobInput {
                    bank,
                    index,
                    value: event.value,
                    steps: self.encoders.steps(event.control, event.value),
                    relative: self.encoders.mode().is_relative(),
                };
                self.active_handler().knob(knob, host);
            }
        }
        true
    }

    fn active_handler(&mut self) -> &mut dyn ModeHandler {
        match self.mode {
            Mode::Mixer => &mut self.mixer,
            Mode::Device => &mut self.device,
            Mode::Pattern => &mut self.pattern,
        }
    }

    fn keep_alive_period(&self) -> Duration {
        Duration::from_secs(self.config.keep_alive_secs)
    }
}
