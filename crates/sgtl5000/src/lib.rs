//! SGTL5000 audio codec control
//!
//! Brings the codec from power-on to a running configuration and adjusts it
//! live without clicks: every gain-like field is ramped one code at a time,
//! and every composite change that could be heard is bracketed by a DAC mute.
//!
//! # Layers
//!
//! ```text
//! Sgtl5000 (init, routing, dap, volume, diag)
//!         ↓
//! ramp        - stepwise ramps of one field
//!         ↓
//! access      - read / write / write_verify / modify / modify_verify
//!         ↓
//! platform::RegisterBus (I2C adapter or simulated register file)
//! ```
//!
//! Hardware is the only source of truth. No register value is cached.
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls, simulated bus from `platform::mocks`
//! - `defmt`: logging and `defmt::Format` derives for target builds
//! - `tracing`: logging through `tracing` for host builds
//!
//! # Example
//!
//! ```no_run
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use platform::{I2cAddr, I2cRegisterBus};
//! use sgtl5000::{registers::I2C_ADDR_CS_LOW, CodecConfig, EqProfile, Sgtl5000};
//!
//! fn bring_up<I: I2c, D: DelayNs>(i2c: I, delay: D) {
//!     let addr = I2cAddr::try_new(I2C_ADDR_CS_LOW).expect("valid 7-bit address");
//!     let mut codec = Sgtl5000::new(I2cRegisterBus::new(i2c, addr), delay);
//!     if codec.initialize(&CodecConfig::default()).is_ok() {
//!         let _ = codec.set_eq_profile(EqProfile::Rock);
//!     }
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
mod fmt;

pub mod access;
pub mod audio_types;
pub mod config;
pub mod dap;
pub mod diag;
mod driver;
pub mod error;
pub mod init;
pub mod ramp;
pub mod registers;
pub mod routing;
mod volume;

pub use access::RegisterAccess;
pub use audio_types::{
    geq_code_from_db, BassLevel, DacVolume, EqGainDb, HeadphoneVolume, LineOutVolume, LrLevel,
    SurroundWidth,
};
pub use config::{
    ClockConfig, CodecConfig, DataLength, I2sConfig, I2sMode, MclkRatio, MclkSource, PllDividers,
    SampleRate, SclkRate, Timing,
};
pub use dap::{AvcConfig, AvcMaxGain, AvcResponse, EqProfile, SurroundMode, UnknownProfile};
pub use diag::{ChipId, RegisterDump, RegisterValue};
pub use driver::Sgtl5000;
pub use error::{ConfigError, Error, InitError};
pub use init::{DeviceSession, Stage};
pub use ramp::{RampField, RampSequence};
pub use routing::{AudioOutput, AudioSource, RoutePlan};
