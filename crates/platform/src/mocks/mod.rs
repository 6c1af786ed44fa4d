//! Mock implementations for testing
//!
//! [`SimulatedBus`] is an in-memory 16-bit register file implementing
//! [`RegisterBus`]. It records every transaction and supports the fault
//! models driver tests need:
//!
//! - a dead bus from the N-th transaction onwards ([`SimulatedBus::fail_from`])
//! - a NACK on the first write to a given register, optionally only for a
//!   given value ([`SimulatedBus::fail_write`])
//! - bits that do not latch the written value ([`SimulatedBus::force_bits`]),
//!   which is what a verified write must catch
//!
//! [`RecordingDelay`] implements `DelayNs` and accumulates the requested time
//! instead of sleeping.

#![cfg(any(test, feature = "std"))]

use std::collections::BTreeMap;
use std::vec::Vec;

use crate::bus::RegisterBus;

/// One transaction observed by [`SimulatedBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    /// Register read (value is what the device returned, 0 if it failed)
    Read {
        /// Register address
        addr: u16,
        /// Value returned
        value: u16,
    },
    /// Register write (value is what the host sent)
    Write {
        /// Register address
        addr: u16,
        /// Value sent
        value: u16,
    },
}

impl BusOp {
    /// Register address of this transaction.
    pub fn addr(&self) -> u16 {
        match *self {
            Self::Read { addr, .. } | Self::Write { addr, .. } => addr,
        }
    }

    /// `true` for writes.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

/// Error returned by [`SimulatedBus`] when a fault is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedBusError {
    /// The device did not acknowledge the transaction.
    Nack,
}

impl core::fmt::Display for SimulatedBusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Nack => f.write_str("simulated bus NACK"),
        }
    }
}

impl std::error::Error for SimulatedBusError {}

#[derive(Debug, Clone, Copy)]
struct WriteFault {
    addr: u16,
    value: Option<u16>,
}

/// In-memory register file with fault injection.
///
/// Unwritten registers read as `0x0000`. Every attempted transaction is
/// appended to [`ops`](Self::ops), including the one that failed.
#[derive(Debug, Default)]
pub struct SimulatedBus {
    regs: BTreeMap<u16, u16>,
    ops: Vec<BusOp>,
    fail_from: Option<usize>,
    write_fault: Option<WriteFault>,
    forced: BTreeMap<u16, (u16, u16)>,
}

impl SimulatedBus {
    /// Empty register file, no faults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register file seeded from `(addr, value)` pairs.
    pub fn with_registers(init: impl IntoIterator<Item = (u16, u16)>) -> Self {
        Self {
            regs: init.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Current register value without recording a transaction.
    pub fn peek(&self, addr: u16) -> u16 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    /// Set a register value without recording a transaction.
    pub fn poke(&mut self, addr: u16, value: u16) {
        self.regs.insert(addr, value);
    }

    /// Every transaction attempted so far, in order.
    pub fn ops(&self) -> &[BusOp] {
        &self.ops
    }

    /// Values written to `addr`, in order.
    pub fn writes_to(&self, addr: u16) -> Vec<u16> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                BusOp::Write { addr: a, value } if a == addr => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Number of writes to `addr`.
    pub fn write_count(&self, addr: u16) -> usize {
        self.ops
            .iter()
            .filter(|op| op.is_write() && op.addr() == addr)
            .count()
    }

    /// `true` if any transaction (read or write) touched `addr`.
    pub fn touched(&self, addr: u16) -> bool {
        self.ops.iter().any(|op| op.addr() == addr)
    }

    /// Forget the transaction log (register contents are kept).
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Fail every transaction whose index (0-based, counted from now on the
    /// existing log) is `>= n`.
    pub fn fail_from(&mut self, n: usize) {
        self.fail_from = Some(self.ops.len().saturating_add(n));
    }

    /// NACK the first write to `addr`. With `Some(value)` only a write of that
    /// exact value fails. The fault is one-shot.
    pub fn fail_write(&mut self, addr: u16, value: Option<u16>) {
        self.write_fault = Some(WriteFault { addr, value });
    }

    /// Bits in `mask` of register `addr` always hold `value & mask`,
    /// whatever is written.
    pub fn force_bits(&mut self, addr: u16, mask: u16, value: u16) {
        self.forced.insert(addr, (mask, value & mask));
        let current = self.peek(addr);
        self.poke(addr, (current & !mask) | (value & mask));
    }

    fn dead(&self) -> bool {
        self.fail_from.is_some_and(|n| self.ops.len() >= n)
    }
}

impl RegisterBus for SimulatedBus {
    type Error = SimulatedBusError;

    fn read_register(&mut self, addr: u16) -> Result<u16, Self::Error> {
        let dead = self.dead();
        let value = if dead { 0 } else { self.peek(addr) };
        self.ops.push(BusOp::Read { addr, value });
        if dead {
            return Err(SimulatedBusError::Nack);
        }
        Ok(value)
    }

    fn write_register(&mut self, addr: u16, value: u16) -> Result<(), Self::Error> {
        let faulted = self
            .write_fault
            .is_some_and(|f| f.addr == addr && f.value.map_or(true, |v| v == value));
        let dead = self.dead();
        self.ops.push(BusOp::Write { addr, value });
        if faulted {
            self.write_fault = None;
            return Err(SimulatedBusError::Nack);
        }
        if dead {
            return Err(SimulatedBusError::Nack);
        }
        let latched = match self.forced.get(&addr) {
            Some(&(mask, forced)) => (value & !mask) | forced,
            None => value,
        };
        self.regs.insert(addr, latched);
        Ok(())
    }
}

/// `DelayNs` implementation that records instead of sleeping.
#[derive(Debug, Default, Clone)]
pub struct RecordingDelay {
    total_ns: u64,
    calls: usize,
}

impl RecordingDelay {
    /// New delay with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all requested delays in nanoseconds.
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }

    /// Number of delay calls.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl embedded_hal::delay::DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns = self.total_ns.saturating_add(u64::from(ns));
        self.calls = self.calls.saturating_add(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn unwritten_registers_read_zero() {
        let mut bus = SimulatedBus::new();
        assert_eq!(bus.read_register(0x0024).unwrap(), 0);
        assert_eq!(bus.ops(), &[BusOp::Read { addr: 0x0024, value: 0 }]);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut bus = SimulatedBus::with_registers([(0x0030, 0x7060)]);
        assert_eq!(bus.read_register(0x0030).unwrap(), 0x7060);
        bus.write_register(0x0030, 0x6AFF).unwrap();
        assert_eq!(bus.peek(0x0030), 0x6AFF);
        assert_eq!(bus.writes_to(0x0030), vec![0x6AFF]);
    }

    #[test]
    fn fail_from_kills_every_later_transaction() {
        let mut bus = SimulatedBus::new();
        bus.fail_from(1);
        bus.write_register(0x0002, 1).unwrap();
        assert_eq!(bus.write_register(0x0002, 2), Err(SimulatedBusError::Nack));
        assert_eq!(bus.read_register(0x0002), Err(SimulatedBusError::Nack));
        assert_eq!(bus.peek(0x0002), 1);
        assert_eq!(bus.ops().len(), 3);
    }

    #[test]
    fn write_fault_is_one_shot_and_value_specific() {
        let mut bus = SimulatedBus::new();
        bus.fail_write(0x0104, Some(0x0001));
        bus.write_register(0x0104, 0x0000).unwrap();
        assert!(bus.write_register(0x0104, 0x0001).is_err());
        bus.write_register(0x0104, 0x0001).unwrap();
        assert_eq!(bus.peek(0x0104), 0x0001);
    }

    #[test]
    fn forced_bits_ignore_writes() {
        let mut bus = SimulatedBus::new();
        bus.force_bits(0x000E, 0x0300, 0x0200);
        bus.write_register(0x000E, 0x000C).unwrap();
        assert_eq!(bus.peek(0x000E), 0x020C);
    }

    #[test]
    fn recording_delay_accumulates() {
        let mut delay = RecordingDelay::new();
        delay.delay_us(100);
        delay.delay_ms(2);
        assert_eq!(delay.total_ns(), 2_100_000);
        assert_eq!(delay.calls(), 2);
    }
}
