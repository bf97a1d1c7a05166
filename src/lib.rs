// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Control-surface driver for the Akai MPK 225.
//!
//! Incoming MIDI is resolved to physical controls through a configurable
//! [`control::ControlMap`] and dispatched by [`driver::Driver`] to the
//! handler of the active mode, which acts on a [`host::Host`].

pub mod config;
pub mod control;
pub mod driver;
pub mod error;
pub mod host;
pub mod midi;

pub use config::DriverConfig;
pub use driver::{Driver, Mode};
pub use error::DriverError;
pub use host::{Host, StandaloneHost};
