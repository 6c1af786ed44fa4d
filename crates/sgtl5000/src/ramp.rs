//! Stepwise parameter ramps.
//!
//! Changing a gain in one jump clicks. Every level-like field is moved one
//! code at a time with a delay between steps, each step a verified
//! read-modify-write. A ramp that fails leaves the field at the last code
//! that was written.

use embedded_hal::delay::DelayNs;
use platform::RegisterBus;

use crate::access::RegisterAccess;
use crate::error::Error;
use crate::registers::{Field, StereoField};

/// A register field a ramp can drive.
pub trait RampField: Copy {
    /// Name for logs.
    fn name(&self) -> &'static str;
    /// Register address.
    fn register(&self) -> u16;
    /// Bits the ramp may touch.
    fn mask(&self) -> u16;
    /// Shift passed to the read-modify-write.
    fn shift(&self) -> u8;
    /// Largest code.
    fn max_code(&self) -> u16;
    /// Current code in a raw register value.
    fn decode(&self, raw: u16) -> u16;
    /// Unshifted value that places `code` in the field.
    fn field_value(&self, code: u16) -> u16;
    /// `false` when the lanes of a multi-lane field hold different codes.
    fn lanes_match(&self, raw: u16) -> bool {
        let _ = raw;
        true
    }
}

impl RampField for Field {
    fn name(&self) -> &'static str {
        self.name
    }

    fn register(&self) -> u16 {
        self.reg
    }

    fn mask(&self) -> u16 {
        self.mask
    }

    fn shift(&self) -> u8 {
        self.shift
    }

    fn max_code(&self) -> u16 {
        self.max()
    }

    fn decode(&self, raw: u16) -> u16 {
        self.extract(raw)
    }

    fn field_value(&self, code: u16) -> u16 {
        code
    }
}

/// Ramps a stereo level as one unit: both lanes step together. The left lane
/// is the starting point, so unequal lanes meet on the first write.
impl RampField for StereoField {
    fn name(&self) -> &'static str {
        self.name
    }

    fn register(&self) -> u16 {
        self.reg()
    }

    fn mask(&self) -> u16 {
        StereoField::mask(*self)
    }

    fn shift(&self) -> u8 {
        0
    }

    fn max_code(&self) -> u16 {
        self.max()
    }

    fn decode(&self, raw: u16) -> u16 {
        self.left.extract(raw)
    }

    fn field_value(&self, code: u16) -> u16 {
        self.insert(0, code)
    }

    fn lanes_match(&self, raw: u16) -> bool {
        let (left, right) = self.extract(raw);
        left == right
    }
}

/// Direction of a ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Code increases.
    Up,
    /// Code decreases.
    Down,
}

/// One ramp in flight: yields each intermediate code after `current`, ending
/// at `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampSequence {
    /// Register address
    pub register: u16,
    /// Field mask
    pub mask: u16,
    /// Field shift
    pub shift: u8,
    /// Last code reached
    pub current: u16,
    /// Final code
    pub target: u16,
    /// Step direction
    pub direction: Direction,
    /// Steps left
    pub remaining: u16,
}

impl RampSequence {
    /// Plan a ramp of `field` from `current` to `target`. The target is
    /// clamped to the field's largest code.
    pub fn new<F: RampField>(field: F, current: u16, target: u16) -> Self {
        let target = target.min(field.max_code());
        let direction = if target >= current {
            Direction::Up
        } else {
            Direction::Down
        };
        Self {
            register: field.register(),
            mask: field.mask(),
            shift: field.shift(),
            current,
            target,
            direction,
            remaining: current.abs_diff(target),
        }
    }

    /// `true` when there is nothing to do.
    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }
}

impl Iterator for RampSequence {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.remaining == 0 {
            return None;
        }
        self.current = match self.direction {
            Direction::Up => self.current.saturating_add(1),
            Direction::Down => self.current.saturating_sub(1),
        };
        self.remaining = self.remaining.saturating_sub(1);
        Some(self.current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::from(self.remaining);
        (n, Some(n))
    }
}

impl ExactSizeIterator for RampSequence {}

/// Step `field` from its current code to `target`, waiting `step_delay_us`
/// after every write.
///
/// Returns the number of steps written. When the field already holds the
/// target only the initial read is issued. A stereo field whose left lane is
/// on target while the right lane is not gets one write of both lanes.
pub fn ramp_field<B, D, F>(
    regs: &mut RegisterAccess<B>,
    delay: &mut D,
    field: F,
    target: u16,
    step_delay_us: u32,
) -> Result<u16, Error<B::Error>>
where
    B: RegisterBus,
    D: DelayNs,
    F: RampField,
{
    let raw = regs.read(field.register())?;
    let current = field.decode(raw);
    let ramp = RampSequence::new(field, current, target);
    if ramp.is_done() {
        if field.lanes_match(raw) {
            return Ok(0);
        }
        // left lane on target, right lane elsewhere: align both in one write
        debug!("ramp {} lanes differ, aligning at {}", field.name(), ramp.target);
        regs.modify_verify(
            ramp.register,
            ramp.mask,
            ramp.shift,
            field.field_value(ramp.target),
        )?;
        delay.delay_us(step_delay_us);
        return Ok(1);
    }
    debug!(
        "ramp {} {} -> {} ({} steps)",
        field.name(),
        current,
        ramp.target,
        ramp.remaining
    );
    let (register, mask, shift) = (ramp.register, ramp.mask, ramp.shift);
    let mut steps: u16 = 0;
    for code in ramp {
        trace!("ramp {} step {}", field.name(), code);
        if let Err(e) = regs.modify_verify(register, mask, shift, field.field_value(code)) {
            warn!("ramp {} aborted at step {}", field.name(), code);
            return Err(e);
        }
        delay.delay_us(step_delay_us);
        steps = steps.saturating_add(1);
    }
    Ok(steps)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registers::{BASS_LEVEL, DAP_BASS_ENHANCE_CTRL, HP_VOLUME};

    #[test]
    fn sequence_counts_up() {
        let ramp = RampSequence::new(BASS_LEVEL, 3, 6);
        assert_eq!(ramp.direction, Direction::Up);
        assert_eq!(ramp.len(), 3);
        assert_eq!(ramp.collect::<Vec<_>>(), vec![4, 5, 6]);
    }

    #[test]
    fn sequence_counts_down() {
        let ramp = RampSequence::new(BASS_LEVEL, 0x7F, 0x7C);
        assert_eq!(ramp.direction, Direction::Down);
        assert_eq!(ramp.collect::<Vec<_>>(), vec![0x7E, 0x7D, 0x7C]);
    }

    #[test]
    fn sequence_clamps_target() {
        let ramp = RampSequence::new(BASS_LEVEL, 0x7D, 0x200);
        assert_eq!(ramp.target, 0x7F);
        assert_eq!(ramp.remaining, 2);
    }

    #[test]
    fn empty_sequence() {
        let mut ramp = RampSequence::new(BASS_LEVEL, 5, 5);
        assert!(ramp.is_done());
        assert_eq!(ramp.next(), None);
    }

    #[test]
    fn stereo_field_value_covers_both_lanes() {
        assert_eq!(HP_VOLUME.field_value(0x18), 0x1818);
        assert_eq!(RampField::mask(&HP_VOLUME), 0x7F7F);
        assert_eq!(RampField::shift(&HP_VOLUME), 0);
    }

    #[test]
    fn ramp_keeps_neighbouring_field() {
        use platform::mocks::{RecordingDelay, SimulatedBus};
        let mut regs = RegisterAccess::new(SimulatedBus::with_registers([(DAP_BASS_ENHANCE_CTRL, 0x051F)]));
        let mut delay = RecordingDelay::new();
        let steps = ramp_field(&mut regs, &mut delay, BASS_LEVEL, 0x22, 50).unwrap();
        assert_eq!(steps, 3);
        assert_eq!(regs.bus().peek(DAP_BASS_ENHANCE_CTRL), 0x0522);
        assert_eq!(delay.calls(), 3);
        assert_eq!(delay.total_ns(), 150_000);
    }
}
