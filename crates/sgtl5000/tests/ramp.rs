//! Ramp engine against the simulated register file.

#![allow(clippy::arithmetic_side_effects)]

use embedded_hal_mock::eh1::delay::NoopDelay;
use platform::mocks::{RecordingDelay, SimulatedBus};
use sgtl5000::registers::{
    BASS_LEVEL, CHIP_ANA_HP_CTRL, DAP_AUDIO_EQ_BAND2, DAP_BASS_ENHANCE_CTRL, GEQ_BANDS, HP_VOLUME,
};
use sgtl5000::{Error, RampSequence, Sgtl5000, Timing};

fn codec(bus: &mut SimulatedBus) -> Sgtl5000<&mut SimulatedBus, NoopDelay> {
    Sgtl5000::with_timing(bus, NoopDelay::new(), Timing::immediate())
}

proptest::proptest! {
    /// A to B is |B - A| writes, each one code further, ending at B.
    #[test]
    fn ramp_visits_every_code_once(start in 0u16..=0x7F, target in 0u16..=0x7F) {
        let band = GEQ_BANDS[2];
        let mut bus = SimulatedBus::with_registers([(DAP_AUDIO_EQ_BAND2, start)]);
        let steps = codec(&mut bus).ramp_field(band, target).unwrap();

        let writes = bus.writes_to(DAP_AUDIO_EQ_BAND2);
        assert_eq!(usize::from(steps), writes.len());
        assert_eq!(writes.len(), usize::from(start.abs_diff(target)));
        let mut previous = start;
        for code in writes {
            assert_eq!(code.abs_diff(previous), 1, "step from {previous} to {code}");
            previous = code;
        }
        assert_eq!(previous, target);
        assert_eq!(bus.peek(DAP_AUDIO_EQ_BAND2), target);
    }

    /// Equal start and target: a single read, nothing written.
    #[test]
    fn ramp_to_current_value_is_one_read(code in 0u16..=0x7F) {
        let mut bus = SimulatedBus::with_registers([(DAP_AUDIO_EQ_BAND2, code)]);
        assert_eq!(codec(&mut bus).ramp_field(GEQ_BANDS[2], code).unwrap(), 0);
        assert_eq!(bus.ops().len(), 1);
    }

    /// The sequence alone agrees with the bus-level ramp.
    #[test]
    fn sequence_length_is_distance(start in 0u16..=0x7F, target: u16) {
        let seq = RampSequence::new(BASS_LEVEL, start, target);
        let clamped = target.min(0x7F);
        assert_eq!(seq.len(), usize::from(start.abs_diff(clamped)));
        assert_eq!(seq.last().unwrap_or(start), clamped);
    }
}

#[test]
fn stereo_ramp_moves_both_lanes_together() {
    let mut bus = SimulatedBus::with_registers([(CHIP_ANA_HP_CTRL, 0x1818)]);
    codec(&mut bus).ramp_field(HP_VOLUME, 0x15).unwrap();
    assert_eq!(
        bus.writes_to(CHIP_ANA_HP_CTRL),
        vec![0x1717, 0x1616, 0x1515]
    );
}

#[test]
fn target_above_field_maximum_is_clamped() {
    let mut bus = SimulatedBus::with_registers([(DAP_BASS_ENHANCE_CTRL, 0x057D)]);
    assert_eq!(codec(&mut bus).ramp_field(BASS_LEVEL, 0xFFFF).unwrap(), 2);
    assert_eq!(bus.peek(DAP_BASS_ENHANCE_CTRL), 0x057F);
}

#[test]
fn failed_step_leaves_last_written_code() {
    let mut bus = SimulatedBus::with_registers([(DAP_BASS_ENHANCE_CTRL, 0x0510)]);
    // third step would write 0x0513
    bus.fail_write(DAP_BASS_ENHANCE_CTRL, Some(0x0513));
    let err = codec(&mut bus).ramp_field(BASS_LEVEL, 0x20).unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(bus.peek(DAP_BASS_ENHANCE_CTRL), 0x0512);
    // nothing after the failed write
    assert!(bus.ops().last().unwrap().is_write());
}

#[test]
fn each_step_waits_the_step_delay() {
    let mut bus = SimulatedBus::with_registers([(DAP_AUDIO_EQ_BAND2, 0x2F)]);
    let timing = Timing {
        ramp_step_us: 250,
        settle_ms: 0,
    };
    let mut codec = Sgtl5000::with_timing(&mut bus, RecordingDelay::new(), timing);
    codec.ramp_field(GEQ_BANDS[2], 0x33).unwrap();
    let (_, delay) = codec.release();
    assert_eq!(delay.calls(), 4);
    assert_eq!(u64::from(timing.ramp_step_us) * 4 * 1000, delay.total_ns());
    assert_eq!(timing.worst_case_ramp_us(4) * 1000, delay.total_ns());
}

#[test]
fn stereo_lanes_are_aligned_when_left_is_already_on_target() {
    let mut bus = SimulatedBus::with_registers([(CHIP_ANA_HP_CTRL, 0x3018)]);
    let steps = codec(&mut bus).set_headphone_volume(0x18u8).unwrap();
    assert_eq!(steps, 1);
    assert_eq!(bus.writes_to(CHIP_ANA_HP_CTRL), vec![0x1818]);
    assert_eq!(bus.peek(CHIP_ANA_HP_CTRL), 0x1818);
}

#[test]
fn unequal_stereo_lanes_meet_on_the_first_step() {
    let mut bus = SimulatedBus::with_registers([(CHIP_ANA_HP_CTRL, 0x3018)]);
    assert_eq!(codec(&mut bus).ramp_field(HP_VOLUME, 0x16).unwrap(), 2);
    assert_eq!(bus.writes_to(CHIP_ANA_HP_CTRL), vec![0x1717, 0x1616]);
}

#[test]
fn equal_stereo_lanes_on_target_cost_one_read() {
    let mut bus = SimulatedBus::with_registers([(CHIP_ANA_HP_CTRL, 0x1818)]);
    assert_eq!(codec(&mut bus).ramp_field(HP_VOLUME, 0x18).unwrap(), 0);
    assert_eq!(bus.ops().len(), 1);
}
