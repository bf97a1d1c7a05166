// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! In-process host used by the standalone binary and the tests.
//!
//! Keeps a simulated mixer and sequencer, runs the slow-update timer, and
//! records every action as a [`HostEvent`] so the caller can print or
//! inspect what the driver did.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{Cuia, Host, PeriodicTask, Signal, Strip, MAX_SEQUENCER_BANK};
use crate::midi::MidiOutput;

/// Something the driver asked the host to do
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Cuia(Cuia),
    Volume { strip: Strip, value: f32 },
    Balance { strip: Strip, value: f32 },
    Mute { strip: Strip, mute: bool },
    Solo { strip: Strip, solo: bool },
    SequencerBank(u8),
    Sequence { bank: u8, pad: u8, playing: bool },
    DeviceOutput(Vec<u8>),
    TaskAdded(PeriodicTask, Duration),
    TaskRemoved(PeriodicTask),
    Subscribed(Signal),
    Unsubscribed(Signal),
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::Cuia(command) => write!(f, "cuia {}", command),
            HostEvent::Volume { strip, value } => write!(f, "volume {} {:.2}", strip, value),
            HostEvent::Balance { strip, value } => write!(f, "balance {} {:+.2}", strip, value),
            HostEvent::Mute { strip, mute } => write!(f, "mute {} {}", strip, on_off(*mute)),
            HostEvent::Solo { strip, solo } => write!(f, "solo {} {}", strip, on_off(*solo)),
            HostEvent::SequencerBank(bank) => write!(f, "sequencer bank {}", bank),
            HostEvent::Sequence { bank, pad, playing } => write!(
                f,
                "sequence {}:{} {}",
                bank,
                pad + 1,
                if *playing { "playing" } else { "stopped" }
            ),
            HostEvent::DeviceOutput(bytes) => write!(f, "device out {:02X?}", bytes),
            HostEvent::TaskAdded(task, period) => {
                write!(f, "task {:?} every {}s", task, period.as_secs())
            }
            HostEvent::TaskRemoved(task) => write!(f, "task {:?} removed", task),
            HostEvent::Subscribed(signal) => write!(f, "subscribed {:?}", signal),
            HostEvent::Unsubscribed(signal) => write!(f, "unsubscribed {:?}", signal),
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[derive(Debug, Clone, Copy)]
struct StripState {
    volume: f32,
    balance: f32,
    mute: bool,
    solo: bool,
}

impl Default for StripState {
    fn default() -> Self {
        Self {
            volume: 0.8,
            balance: 0.0,
            mute: false,
            solo: false,
        }
    }
}

struct ScheduledTask {
    period: Duration,
    /// `None` when the period reaches past what `Instant` can represent
    next_due: Option<Instant>,
}

/// Host implementation with a simulated mixer
pub struct StandaloneHost {
    chains: Vec<StripState>,
    main: StripState,
    sequencer_bank: u8,
    playing: HashSet<(u8, u8)>,
    tasks: HashMap<PeriodicTask, ScheduledTask>,
    subscriptions: HashSet<Signal>,
    output: Option<Box<dyn MidiOutput>>,
    events: Vec<HostEvent>,
}

impl StandaloneHost {
    /// Create a host with `chains` chains
    pub fn new(chains: usize) -> Self {
        Self {
            chains: vec![StripState::default(); chains],
            main: StripState::default(),
            sequencer_bank: 1,
            playing: HashSet::new(),
            tasks: HashMap::new(),
            subscriptions: HashSet::new(),
            output: None,
            events: Vec::new(),
        }
    }

    /// Forward device output to a MIDI port
    pub fn with_output(mut self, output: Box<dyn MidiOutput>) -> Self {
        self.output = Some(output);
        self
    }

    /// Take all recorded events
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events not yet drained
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Check if a signal is subscribed
    pub fn is_subscribed(&self, signal: Signal) -> bool {
        self.subscriptions.contains(&signal)
    }

    /// Period of a registered task
    pub fn task_period(&self, task: PeriodicTask) -> Option<Duration> {
        self.tasks.get(&task).map(|t| t.period)
    }

    /// Check if the sequence on `pad` of `bank` is playing
    pub fn is_playing(&self, bank: u8, pad: u8) -> bool {
        self.playing.contains(&(bank, pad))
    }

    /// Tasks due at `now`, re-armed for their next period
    pub fn due_tasks(&mut self, now: Instant) -> Vec<PeriodicTask> {
        let mut due = Vec::new();
        for (task, scheduled) in self.tasks.iter_mut() {
            if scheduled.next_due.is_some_and(|next| now >= next) {
                scheduled.next_due = now.checked_add(scheduled.period);
                due.push(*task);
            }
        }
        due
    }

    /// Time until the next task is due
    pub fn next_due_in(&self, now: Instant) -> Option<Duration> {
        self.tasks
            .values()
            .filter_map(|t| t.next_due)
            .map(|next| next.saturating_duration_since(now))
            .min()
    }

    fn strip(&self, strip: Strip) -> Option<&StripState> {
        match strip {
            Strip::Chain(position) => self.chains.get(position),
            Strip::Main => Some(&self.main),
        }
    }

    fn strip_mut(&mut self, strip: Strip) -> Option<&mut StripState> {
        match strip {
            Strip::Chain(position) => self.chains.get_mut(position),
            Strip::Main => Some(&mut self.main),
        }
    }
}

impl Host for StandaloneHost {
    fn chain_count(&self) -> usize {
        self.chains.len()
    }

    fn volume(&self, strip: Strip) -> f32 {
        self.strip(strip).map(|s| s.volume).unwrap_or(0.0)
    }

    fn set_volume(&mut self, strip: Strip, value: f32) {
        let value = value.clamp(0.0, 1.0);
        if let Some(state) = self.strip_mut(strip) {
            state.volume = value;
            self.events.push(HostEvent::Volume { strip, value });
        }
    }

    fn balance(&self, strip: Strip) -> f32 {
        self.strip(strip).map(|s| s.balance).unwrap_or(0.0)
    }

    fn set_balance(&mut self, strip: Strip, value: f32) {
        let value = value.clamp(-1.0, 1.0);
        if let Some(state) = self.strip_mut(strip) {
            state.balance = value;
            self.events.push(HostEvent::Balance { strip, value });
        }
    }

    fn is_muted(&self, strip: Strip) -> bool {
        self.strip(strip).map(|s| s.mute).unwrap_or(false)
    }

    fn set_mute(&mut self, strip: Strip, mute: bool) {
        if let Some(state) = self.strip_mut(strip) {
            state.mute = mute;
            self.events.push(HostEvent::Mute { strip, mute });
        }
    }

    fn is_soloed(&self, strip: Strip) -> bool {
        self.strip(strip).map(|s| s.solo).unwrap_or(false)
    }

    fn set_solo(&mut self, strip: Strip, solo: bool) {
        if let Some(state) = self.strip_mut(strip) {
            state.solo = solo;
            self.events.push(HostEvent::Solo { strip, solo });
        }
    }

    fn cuia(&mut self, command: Cuia) {
        self.events.push(HostEvent::Cuia(command));
    }

    fn sequencer_bank(&self) -> u8 {
        self.sequencer_bank
    }

    fn set_sequencer_bank(&mut self, bank: u8) {
        let bank = bank.clamp(1, MAX_SEQUENCER_BANK);
        if bank != self.sequencer_bank {
            self.sequencer_bank = bank;
            self.events.push(HostEvent::SequencerBank(bank));
        }
    }

    fn toggle_sequence(&mut self, bank: u8, pad: u8) {
        let playing = if self.playing.remove(&(bank, pad)) {
            false
        } else {
            self.playing.insert((bank, pad));
            true
        };
        self.events.push(HostEvent::Sequence { bank, pad, playing });
    }

    fn send_to_device(&mut self, message: &[u8]) {
        if let Some(output) = self.output.as_mut() {
            if let Err(e) = output.send(message) {
                warn!("device output failed: {:#}", e);
            }
        }
        self.events.push(HostEvent::DeviceOutput(message.to_vec()));
    }

    fn add_slow_update(&mut self, task: PeriodicTask, period: Duration) {
        debug!(?task, ?period, "slow update registered");
        let next_due = Instant::now().checked_add(period);
        if next_due.is_none() {
            warn!(?task, ?period, "period out of range, task will never run");
        }
        self.tasks.insert(task, ScheduledTask { period, next_due });
        self.events.push(HostEvent::TaskAdded(task, period));
    }

    fn remove_slow_update(&mut self, task: PeriodicTask) {
        if self.tasks.remove(&task).is_some() {
            self.events.push(HostEvent::TaskRemoved(task));
        }
    }

    fn subscribe(&mut self, signal: Signal) {
        if self.subscriptions.insert(signal) {
            self.events.push(HostEvent::Subscribed(signal));
        }
    }

    fn unsubscribe(&mut self, signal: Signal) {
        if self.subscriptions.remove(&signal) {
            self.events.push(HostEvent::Unsubscribed(signal));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct SharedOutput(Arc<Mutex<Vec<Vec<u8>>>>);

    impl MidiOutput for SharedOutput {
        fn send(&mut self, message: &[u8]) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(message.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_mixer_values_are_clamped() {
        let mut host = StandaloneHost::new(2);
        host.set_volume(Strip::Chain(0), 1.5);
        host.set_balance(Strip::Chain(1), -3.0);
        assert_eq!(host.volume(Strip::Chain(0)), 1.0);
        assert_eq!(host.balance(Strip::Chain(1)), -1.0);
    }

    #[test]
    fn test_unknown_chain_is_ignored() {
        let mut host = StandaloneHost::new(2);
        host.set_mute(Strip::Chain(5), true);
        assert!(!host.is_muted(Strip::Chain(5)));
        assert!(host.events().is_empty());
    }

    #[test]
    fn test_toggle_sequence() {
        let mut host = StandaloneHost::new(0);
        host.toggle_sequence(1, 4);
        assert!(host.is_playing(1, 4));
        host.toggle_sequence(1, 4);
        assert!(!host.is_playing(1, 4));
        assert_eq!(
            host.drain_events(),
            vec![
                HostEvent::Sequence {
                    bank: 1,
                    pad: 4,
                    playing: true
                },
                HostEvent::Sequence {
                    bank: 1,
                    pad: 4,
                    playing: false
                },
            ]
        );
    }

    #[test]
    fn test_sequencer_bank_range() {
        let mut host = StandaloneHost::new(0);
        host.set_sequencer_bank(0);
        assert_eq!(host.sequencer_bank(), 1);
        host.set_sequencer_bank(200);
        assert_eq!(host.sequencer_bank(), MAX_SEQUENCER_BANK);
    }

    #[test]
    fn test_due_tasks_rearm() {
        let mut host = StandaloneHost::new(0);
        host.add_slow_update(PeriodicTask::KeepAlive, Duration::from_secs(60));

        let now = Instant::now();
        assert!(host.due_tasks(now).is_empty());

        let later = now + Duration::from_secs(61);
        assert_eq!(host.due_tasks(later), vec![PeriodicTask::KeepAlive]);
        assert!(host.due_tasks(later).is_empty());
        assert!(host.next_due_in(later).unwrap() <= Duration::from_secs(60));

        host.remove_slow_update(PeriodicTask::KeepAlive);
        assert!(host.due_tasks(later + Duration::from_secs(120)).is_empty());
        assert_eq!(host.next_due_in(later), None);
    }

    #[test]
    fn test_huge_period_never_fires() {
        let mut host = StandaloneHost::new(0);
        host.add_slow_update(PeriodicTask::KeepAlive, Duration::from_secs(u64::MAX));

        assert_eq!(
            host.task_period(PeriodicTask::KeepAlive),
            Some(Duration::from_secs(u64::MAX))
        );
        let now = Instant::now();
        assert!(host.due_tasks(now + Duration::from_secs(3600)).is_empty());
        assert_eq!(host.next_due_in(now), None);
    }

    #[test]
    fn test_device_output_is_forwarded() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mut host = StandaloneHost::new(0).with_output(Box::new(SharedOutput(sent.clone())));
        host.send_to_device(&[0x90, 0, 0]);
        assert_eq!(sent.lock().unwrap().as_slice(), &[vec![0x90, 0, 0]]);
    }

    #[test]
    fn test_event_display() {
        let event = HostEvent::Volume {
            strip: Strip::Chain(2),
            value: 0.5,
        };
        assert_eq!(event.to_string(), "volume chain 3 0.50");
        assert_eq!(
            HostEvent::Mute {
                strip: Strip::Main,
                mute: true
            }
            .to_string(),
            "mute main on"
        );
        assert_eq!(
            HostEvent::DeviceOutput(vec![0x90, 0, 0]).to_string(),
            "device out [90, 00, 00]"
        );
    }
}
