//! Register bus abstraction
//!
//! Codecs with a 16-bit register file are controlled through two primitive
//! transactions: read one register, write one register. [`RegisterBus`] is
//! that capability. Drivers are generic over it so the same code runs against
//! the real I²C peripheral ([`I2cRegisterBus`]) and the simulated register
//! file in [`crate::mocks`].
//!
//! # Wire format
//!
//! Address and value are both big-endian (most significant byte first):
//!
//! ```text
//! read:  S addr+W  A15..A8 A7..A0  Sr addr+R  D15..D8 D7..D0  P
//! write: S addr+W  A15..A8 A7..A0  D15..D8 D7..D0             P
//! ```
//!
//! One register per transaction. Auto-increment bursts are never used.

use embedded_hal::i2c::I2c;

/// Raw 16-bit register transport.
///
/// Implementations perform exactly one bus transaction per call and never
/// retry. A returned error means the device did not acknowledge or the
/// transfer timed out.
pub trait RegisterBus {
    /// Transport error type
    type Error: core::fmt::Debug;

    /// Read the 16-bit register at `addr`.
    fn read_register(&mut self, addr: u16) -> Result<u16, Self::Error>;

    /// Write `value` to the 16-bit register at `addr`.
    fn write_register(&mut self, addr: u16, value: u16) -> Result<(), Self::Error>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    type Error = T::Error;

    fn read_register(&mut self, addr: u16) -> Result<u16, Self::Error> {
        (**self).read_register(addr)
    }

    fn write_register(&mut self, addr: u16, value: u16) -> Result<(), Self::Error> {
        (**self).write_register(addr, value)
    }
}

// ── I2C address ──────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

impl core::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "value {:#x} outside {:#x}..={:#x}",
            self.value, self.min, self.max
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRangeError {}

/// 7-bit I2C device address.
///
/// ## Reserved I2C addresses (I2C specification):
/// - 0x00–0x07: reserved (general call, CBUS, etc.)
/// - 0x78–0x7F: reserved (10-bit address prefix, device ID, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cAddr(u8);

impl I2cAddr {
    /// Create an I2C address, rejecting I2C-reserved ranges.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `addr <= 0x07` or `addr >= 0x78`.
    pub const fn try_new(addr: u8) -> Result<Self, OutOfRangeError> {
        if addr <= 0x07 || addr >= 0x78 {
            Err(OutOfRangeError {
                value: addr as u32,
                min: 0x08,
                max: 0x77,
            })
        } else {
            Ok(Self(addr))
        }
    }

    /// Return the 7-bit I2C address.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

// ── I2C adapter ──────────────────────────────────────────────────────────────

/// [`RegisterBus`] over a blocking `embedded-hal` 1.0 I²C peripheral.
///
/// Owns the peripheral (or a `&mut` / shared-bus device handle to it) and the
/// 7-bit device address.
pub struct I2cRegisterBus<I> {
    i2c: I,
    addr: I2cAddr,
}

impl<I: I2c> I2cRegisterBus<I> {
    /// Create a register bus for the device at `addr`.
    pub fn new(i2c: I, addr: I2cAddr) -> Self {
        Self { i2c, addr }
    }

    /// Device address this bus talks to.
    pub fn address(&self) -> I2cAddr {
        self.addr
    }

    /// Release the underlying I²C peripheral.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cRegisterBus<I> {
    type Error = I::Error;

    fn read_register(&mut self, addr: u16) -> Result<u16, Self::Error> {
        let mut value = [0u8; 2];
        self.i2c
            .write_read(self.addr.get(), &addr.to_be_bytes(), &mut value)?;
        Ok(u16::from_be_bytes(value))
    }

    fn write_register(&mut self, addr: u16, value: u16) -> Result<(), Self::Error> {
        let [a_hi, a_lo] = addr.to_be_bytes();
        let [v_hi, v_lo] = value.to_be_bytes();
        self.i2c.write(self.addr.get(), &[a_hi, a_lo, v_hi, v_lo])
    }
}
