//! Hardware abstraction layer for 16-bit register codecs
//!
//! This crate provides the bus capability codec drivers are written against,
//! enabling development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Codec driver (sgtl5000 crate)
//!         ↓
//! Platform HAL (this crate - RegisterBus trait)
//!         ↓
//! embedded-hal I2c implementation (HAL of the target MCU)
//! ```
//!
//! # Features
//!
//! - `std`: Enable standard library support and the [`mocks`] module
//! - `defmt`: Enable defmt::Format derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{I2cAddr, I2cRegisterBus, RegisterBus};
//!
//! fn chip_id<I: embedded_hal::i2c::I2c>(i2c: I) -> Result<u16, I::Error> {
//!     let addr = I2cAddr::try_new(0x0A).expect("valid 7-bit address");
//!     let mut bus = I2cRegisterBus::new(i2c, addr);
//!     bus.read_register(0x0000)
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
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod bus;
pub mod mocks;

pub use bus::{I2cAddr, I2cRegisterBus, OutOfRangeError, RegisterBus};
