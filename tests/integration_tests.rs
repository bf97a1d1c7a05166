// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for the MPK driver
//!
//! These tests drive the public API end to end: raw MIDI in, host actions out.

use std::fs;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use mpk_driver::config::DriverConfig;
use mpk_driver::control::{format_binding, Control, ControlMap, EncoderMode, KnobBank};
use mpk_driver::host::{Cuia, Host, HostEvent, PeriodicTask, Screen, Signal, Strip};
use mpk_driver::midi::{MidiMessage, MidiOutput};
use mpk_driver::{Driver, Mode, StandaloneHost};

/// Output that records what was written to the controller
struct SharedOutput(Arc<Mutex<Vec<Vec<u8>>>>);

impl MidiOutput for SharedOutput {
    fn send(&mut self, message: &[u8]) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(message.to_vec());
        Ok(())
    }
}

fn started(config: DriverConfig, chains: usize) -> (Driver, StandaloneHost) {
    let mut host = StandaloneHost::new(chains);
    let mut driver = Driver::new(config).unwrap();
    driver.init(&mut host);
    host.drain_events();
    (driver, host)
}

fn cuias(events: Vec<HostEvent>) -> Vec<Cuia> {
    events
        .into_iter()
        .filter_map(|e| match e {
            HostEvent::Cuia(c) => Some(c),
            _ => None,
        })
        .collect()
}

/// A session touching every mode through the controller alone
#[test]
fn test_session_across_modes() {
    let (mut driver, mut host) = started(DriverConfig::default(), 8);
    assert_eq!(driver.mode(), Mode::Device);

    // Device mode: pad 3 is Select
    driver.midi_bytes(&[0x99, 38, 90], &mut host);
    driver.midi_bytes(&[0x89, 38, 0], &mut host);
    assert_eq!(cuias(host.drain_events()), vec![Cuia::Select]);

    // S3 twice: Device -> Pattern -> Mixer
    driver.midi_bytes(&[0xB0, 112, 127], &mut host);
    driver.midi_bytes(&[0xB0, 112, 127], &mut host);
    assert_eq!(driver.mode(), Mode::Mixer);
    assert_eq!(
        cuias(host.drain_events()),
        vec![Cuia::ScreenZynpad, Cuia::ScreenMixer]
    );

    // Mixer mode: knob A2 sets the volume of chain 3
    driver.midi_bytes(&[0xB0, 72, 127], &mut host);
    assert_eq!(host.volume(Strip::Chain(2)), 1.0);

    // Pad 9 solos chain 1
    driver.midi_bytes(&[0x99, 44, 100], &mut host);
    assert!(host.is_soloed(Strip::Chain(0)));

    // Host shows the zynpad: pads launch sequences
    driver.on_screen_changed(&Screen::from_name("zynpad"));
    assert_eq!(driver.mode(), Mode::Pattern);
    driver.midi_bytes(&[0x99, 36, 100], &mut host);
    assert!(host.is_playing(1, 0));
}

#[test]
fn test_note_on_zero_velocity_is_release() {
    let (mut driver, mut host) = started(DriverConfig::default(), 8);
    driver.set_mode(Mode::Mixer);

    assert!(driver.midi_bytes(&[0x99, 36, 0], &mut host));
    assert!(host.events().is_empty());
    assert!(!host.is_muted(Strip::Chain(0)));
}

#[test]
fn test_keyboard_keys_pass_through() {
    let (mut driver, mut host) = started(DriverConfig::default(), 8);

    for note in [48u8, 60, 72] {
        assert!(!driver.midi_bytes(&[0x90, note, 100], &mut host));
        assert!(!driver.midi_bytes(&[0x80, note, 0], &mut host));
    }
    assert!(!driver.midi_event(&MidiMessage::PitchBend { channel: 0, value: 0 }, &mut host));
    assert!(host.events().is_empty());
}

#[test]
fn test_absolute_knob_navigates_by_delta() {
    let (mut driver, mut host) = started(DriverConfig::default(), 8);

    // First value only sets the reference position
    driver.midi_bytes(&[0xB0, 74, 60], &mut host);
    assert!(host.events().is_empty());

    driver.midi_bytes(&[0xB0, 74, 62], &mut host);
    driver.midi_bytes(&[0xB0, 74, 61], &mut host);
    assert_eq!(
        cuias(host.drain_events()),
        vec![Cuia::ArrowDown, Cuia::ArrowDown, Cuia::ArrowUp]
    );
}

#[test]
fn test_relative_encoders() {
    let mut config = DriverConfig::default();
    config.layout.encoder_mode = EncoderMode::Relative64;
    config.initial_mode = Mode::Mixer;
    let (mut driver, mut host) = started(config, 8);

    host.set_volume(Strip::Chain(0), 0.5);
    host.drain_events();

    // Two clicks clockwise
    driver.midi_bytes(&[0xB0, 70, 66], &mut host);
    assert!((host.volume(Strip::Chain(0)) - 0.52).abs() < 1e-4);

    // One click counter-clockwise on the balance knob
    driver.midi_bytes(&[0xB0, 20, 63], &mut host);
    assert!((host.balance(Strip::Chain(0)) + 0.02).abs() < 1e-4);
}

#[test]
fn test_keep_alive_reaches_device() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let config = DriverConfig {
        keep_alive_secs: 1,
        ..Default::default()
    };
    let mut host = StandaloneHost::new(0).with_output(Box::new(SharedOutput(sent.clone())));
    let mut driver = Driver::new(config).unwrap();
    driver.init(&mut host);

    let start = Instant::now();
    assert!(host.due_tasks(start).is_empty());

    let later = start + Duration::from_secs(2);
    let due = host.due_tasks(later);
    assert_eq!(due, vec![PeriodicTask::KeepAlive]);
    for task in due {
        driver.run_periodic(task, &mut host);
    }
    // Re-armed
    assert!(host.due_tasks(later).is_empty());

    assert_eq!(*sent.lock().unwrap(), vec![vec![0x90, 0, 0]]);
}

#[test]
fn test_lifecycle() {
    let mut host = StandaloneHost::new(4);
    let mut driver = Driver::new(DriverConfig::default()).unwrap();

    driver.init(&mut host);
    assert!(host.is_subscribed(Signal::ScreenChanged));
    driver.end(&mut host);
    driver.end(&mut host);
    assert!(!host.is_subscribed(Signal::ScreenChanged));
    assert_eq!(host.task_period(PeriodicTask::KeepAlive), None);
}

#[test]
fn test_config_file_drives_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mpk.yaml");
    fs::write(
        &path,
        r#"
initial_mode: pattern
layout:
  pad_channel: 1
  pads: [60, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, 71, 72, 73, 74, 75]
  knobs_a: [1, 2, 3, 4, 5, 6, 7, 8]
"#,
    )
    .unwrap();

    let config = DriverConfig::load(&path).unwrap();
    assert_eq!(config.keep_alive_secs, 60);
    let (mut driver, mut host) = started(config, 8);

    assert_eq!(driver.mode(), Mode::Pattern);
    driver.midi_bytes(&[0x90, 63, 100], &mut host);
    assert!(host.is_playing(1, 3));
}

#[test]
fn test_toml_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mpk.toml");
    fs::write(
        &path,
        r#"
follow_screen = false
chains_per_bank = 4

[layout.transport]
play = 90
"#,
    )
    .unwrap();

    let config = DriverConfig::load(&path).unwrap();
    assert!(!config.follow_screen);
    assert_eq!(config.chains_per_bank, 4);
    assert_eq!(config.layout.transport.play, 90);
}

#[test]
fn test_conflicting_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mpk.yaml");
    // Switch S1 on the same CC as knob A1
    fs::write(&path, "layout:\n  switches: [70, 111, 112, 113]\n").unwrap();

    let err = DriverConfig::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("duplicate binding"));
}

/// Monitoring and checking a file use the file's layout, not the default
#[test]
fn test_custom_layout_names_controls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mpk.yaml");
    fs::write(&path, "layout:\n  knobs_a: [1, 2, 3, 4, 5, 6, 7, 8]\n").unwrap();

    let config = mpk_driver::config::validate_config(&path).unwrap();
    let map = ControlMap::from_layout(&config.layout).unwrap();

    let event = map
        .resolve(&MidiMessage::ControlChange {
            channel: 0,
            controller: 1,
            value: 40,
        })
        .unwrap();
    let knob = Control::Knob {
        bank: KnobBank::A,
        index: 0,
    };
    assert_eq!(event.control, knob);
    assert_eq!(event.control.to_string(), "knob A1");

    let binding = map.binding_of(knob).unwrap();
    assert_eq!(format_binding(&binding), "Ch1 CC 1");
    assert!(Control::all()
        .into_iter()
        .all(|control| map.binding_of(control).is_some()));
}
