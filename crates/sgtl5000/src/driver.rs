//! Driver handle.

use embedded_hal::delay::DelayNs;
use platform::RegisterBus;

use crate::access::RegisterAccess;
use crate::config::Timing;
use crate::error::Error;
use crate::init::DeviceSession;
use crate::ramp::{self, RampField};

/// Whether a multi-write sequence waits the settle delay after each write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pacing {
    /// Back to back
    Immediate,
    /// Settle delay after every write
    Settled,
}

/// SGTL5000 codec driver.
///
/// Owns the register bus (or a `&mut` borrow of it) and a delay provider.
/// Operations are blocking and must not be called concurrently; callers
/// sharing the bus serialize access themselves.
pub struct Sgtl5000<B, D> {
    pub(crate) regs: RegisterAccess<B>,
    pub(crate) delay: D,
    pub(crate) timing: Timing,
    pub(crate) session: DeviceSession,
}

impl<B: RegisterBus, D: DelayNs> Sgtl5000<B, D> {
    /// Create a driver with default [`Timing`].
    pub fn new(bus: B, delay: D) -> Self {
        Self::with_timing(bus, delay, Timing::default())
    }

    /// Create a driver with explicit delays.
    pub fn with_timing(bus: B, delay: D, timing: Timing) -> Self {
        Self {
            regs: RegisterAccess::new(bus),
            delay,
            timing,
            session: DeviceSession::new(),
        }
    }

    /// Give back the bus and delay.
    pub fn release(self) -> (B, D) {
        (self.regs.release(), self.delay)
    }

    /// Raw register access, for operations this driver does not wrap.
    pub fn registers(&mut self) -> &mut RegisterAccess<B> {
        &mut self.regs
    }

    /// Delay provider.
    pub fn delay(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Current delays.
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Replace the delays. [`initialize`](Self::initialize) also sets them
    /// from its configuration.
    pub fn set_timing(&mut self, timing: Timing) {
        self.timing = timing;
    }

    /// Bring-up progress.
    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    /// Wait the settle delay.
    pub(crate) fn settle(&mut self) {
        self.delay.delay_ms(self.timing.settle_ms);
    }

    pub(crate) fn pace(&mut self, pacing: Pacing) {
        if pacing == Pacing::Settled {
            self.settle();
        }
    }

    /// Ramp any level field to `target` using the configured step delay.
    ///
    /// Returns the number of steps written.
    pub fn ramp_field<F: RampField>(&mut self, field: F, target: u16) -> Result<u16, Error<B::Error>> {
        ramp::ramp_field(
            &mut self.regs,
            &mut self.delay,
            field,
            target,
            self.timing.ramp_step_us,
        )
    }
}
