//! Raw and verified register access.
//!
//! Hardware is the only source of truth: nothing here caches a register.
//! Every read-modify-write issues a fresh read, and a verified write reads
//! the register back and compares. No retries at this layer.

use platform::RegisterBus;

use crate::error::Error;
use crate::registers::{merge, Field};

/// Register-level operations over an injected [`RegisterBus`].
pub struct RegisterAccess<B> {
    bus: B,
}

impl<B: RegisterBus> RegisterAccess<B> {
    /// Wrap a bus.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Give the bus back.
    pub fn release(self) -> B {
        self.bus
    }

    /// Borrow the bus (test inspection, shared-bus handoff).
    pub fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Read one register.
    pub fn read(&mut self, addr: u16) -> Result<u16, Error<B::Error>> {
        self.bus.read_register(addr).map_err(Error::Transport)
    }

    /// Write one register.
    pub fn write(&mut self, addr: u16, value: u16) -> Result<(), Error<B::Error>> {
        trace!("write {:#x} <- {:#x}", addr, value);
        self.bus.write_register(addr, value).map_err(Error::Transport)
    }

    /// Write one register and read it back.
    ///
    /// Fails with [`Error::VerifyMismatch`] when the device reports a value
    /// other than the one written.
    pub fn write_verify(&mut self, addr: u16, value: u16) -> Result<(), Error<B::Error>> {
        self.write(addr, value)?;
        self.verify(addr, value)
    }

    /// Replace the bits in `mask` with `field_value << shift`.
    ///
    /// Returns the value written. A failed read aborts before any write.
    pub fn modify(
        &mut self,
        addr: u16,
        mask: u16,
        shift: u8,
        field_value: u16,
    ) -> Result<u16, Error<B::Error>> {
        let current = self.read(addr)?;
        let next = merge(current, mask, shift, field_value);
        self.write(addr, next)?;
        Ok(next)
    }

    /// [`modify`](Self::modify) followed by a read-back check.
    pub fn modify_verify(
        &mut self,
        addr: u16,
        mask: u16,
        shift: u8,
        field_value: u16,
    ) -> Result<u16, Error<B::Error>> {
        let next = self.modify(addr, mask, shift, field_value)?;
        self.verify(addr, next)?;
        Ok(next)
    }

    /// Read one register and extract `field`.
    pub fn read_field(&mut self, field: Field) -> Result<u16, Error<B::Error>> {
        Ok(field.extract(self.read(field.reg)?))
    }

    /// Verified read-modify-write of one field.
    pub fn set_field(&mut self, field: Field, code: u16) -> Result<(), Error<B::Error>> {
        self.modify_verify(field.reg, field.mask, field.shift, code)
            .map(|_| ())
    }

    fn verify(&mut self, addr: u16, expected: u16) -> Result<(), Error<B::Error>> {
        let observed = self.read(addr)?;
        if observed == expected {
            Ok(())
        } else {
            warn!(
                "verify {:#x}: wrote {:#x}, read {:#x}",
                addr, expected, observed
            );
            Err(Error::VerifyMismatch {
                register: addr,
                expected,
                observed,
            })
        }
    }
}
