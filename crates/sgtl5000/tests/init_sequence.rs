//! Bring-up state machine against the simulated device.

#![allow(clippy::arithmetic_side_effects)]

use embedded_hal_mock::eh1::delay::NoopDelay;
use platform::mocks::{RecordingDelay, SimulatedBus};
use sgtl5000::registers::*;
use sgtl5000::{
    AudioOutput, AudioSource, CodecConfig, ConfigError, DataLength, Error, HeadphoneVolume,
    MclkSource, SampleRate, SclkRate, Sgtl5000, Stage, Timing,
};

fn device() -> SimulatedBus {
    SimulatedBus::with_registers(reset_values())
}

fn config() -> CodecConfig {
    CodecConfig {
        timing: Timing::immediate(),
        ..CodecConfig::default()
    }
}

fn snapshot(bus: &SimulatedBus) -> Vec<(u16, u16)> {
    REGISTER_MAP.iter().map(|r| (r.addr, bus.peek(r.addr))).collect()
}

#[test]
fn default_bring_up_reaches_ready() {
    let mut bus = device();
    let mut codec = Sgtl5000::new(&mut bus, NoopDelay::new());
    assert_eq!(codec.initialize(&config()), Ok(Stage::Ready));
    assert!(codec.session().is_ready());
    assert_eq!(codec.stage(), Stage::Ready);

    assert_eq!(bus.peek(CHIP_ANA_POWER), 0x6AFF);
    assert_eq!(bus.peek(CHIP_REF_CTRL), 0x004F);
    assert_eq!(bus.peek(CHIP_LINE_OUT_CTRL), 0x0322);
    assert_eq!(bus.peek(CHIP_SHORT_CTRL), 0x1106);
    assert_eq!(bus.peek(CHIP_DIG_POWER), 0x0073);
    assert_eq!(bus.peek(CHIP_CLK_CTRL), 0x0008, "48 kHz, 256*Fs");
    assert_eq!(bus.peek(CHIP_I2S_CTRL), 0x0030);
    assert_eq!(bus.peek(CHIP_SSS_CTRL), 0x0070, "I2S -> DAP -> DAC");
    assert_eq!(bus.peek(DAP_CTRL), 0x0001);
    assert_eq!(bus.peek(DAP_AUDIO_EQ), 0x0003);
    assert_eq!(bus.peek(CHIP_LINE_OUT_VOL), 0x0505);
    assert_eq!(bus.peek(CHIP_ANA_CTRL), 0x0001, "HP and line out unmuted");
    assert_eq!(bus.peek(CHIP_ANA_HP_CTRL), 0x1818, "headphone at 0 dB");
    assert_eq!(bus.peek(CHIP_DAC_VOL), 0x3C3C);
    assert_eq!(bus.peek(CHIP_ADCDAC_CTRL), 0x0200, "DAC unmuted");
}

#[test]
fn power_sequence_order() {
    let mut bus = device();
    Sgtl5000::new(&mut bus, NoopDelay::new())
        .initialize(&config())
        .unwrap();
    let writes: Vec<(u16, u16)> = bus
        .ops()
        .iter()
        .filter_map(|op| match *op {
            platform::mocks::BusOp::Write { addr, value } => Some((addr, value)),
            platform::mocks::BusOp::Read { .. } => None,
        })
        .take(7)
        .collect();
    assert_eq!(
        writes,
        vec![
            (CHIP_ANA_POWER, 0x4260),
            (CHIP_REF_CTRL, 0x004E),
            (CHIP_LINE_OUT_CTRL, 0x0322),
            (CHIP_REF_CTRL, 0x004F),
            (CHIP_SHORT_CTRL, 0x1106),
            (CHIP_ANA_POWER, 0x6AFF),
            (CHIP_DIG_POWER, 0x0073),
        ]
    );
}

#[test]
fn failure_halts_with_no_later_transactions() {
    let mut clean = device();
    Sgtl5000::new(&mut clean, NoopDelay::new())
        .initialize(&config())
        .unwrap();
    let total = clean.ops().len();

    let mut last_stage = Stage::Unpowered;
    for n in 0..total {
        let mut bus = device();
        bus.fail_from(n);
        let mut codec = Sgtl5000::new(&mut bus, NoopDelay::new());
        let err = codec.initialize(&config()).unwrap_err();
        let reached = codec.stage();

        assert!(matches!(err.error, Error::Transport(_)));
        assert_eq!(reached.next(true), Some(err.stage));
        assert!(err.stage >= last_stage, "stages must not go backwards");
        last_stage = err.stage;
        assert_eq!(bus.ops().len(), n + 1, "transactions after failure #{n}");
    }
    assert_eq!(last_stage, Stage::LevelsSet);
}

#[test]
fn verify_mismatch_reports_the_stage() {
    let mut bus = device();
    // DIG_POWER ADC bit stuck low
    bus.force_bits(CHIP_DIG_POWER, 0x0040, 0);
    let mut codec = Sgtl5000::new(&mut bus, NoopDelay::new());
    let err = codec.initialize(&config()).unwrap_err();
    assert_eq!(err.stage, Stage::DigitalPowered);
    assert_eq!(
        err.error,
        Error::VerifyMismatch {
            register: CHIP_DIG_POWER,
            expected: 0x0073,
            observed: 0x0033,
        }
    );
    assert_eq!(codec.stage(), Stage::AnalogPowered);
}

#[test]
fn invalid_config_is_rejected_before_bus_traffic() {
    let mut bus = device();
    let cfg = CodecConfig {
        i2s: sgtl5000::I2sConfig {
            sclk: SclkRate::Fs32,
            data_length: DataLength::Bits24,
            ..Default::default()
        },
        ..config()
    };
    let err = Sgtl5000::new(&mut bus, NoopDelay::new())
        .initialize(&cfg)
        .unwrap_err();
    assert_eq!(err.stage, Stage::Unpowered);
    assert_eq!(
        err.error,
        Error::InvalidConfig(ConfigError::SampleLengthNeeds64Fs { bits: 24 })
    );
    assert!(bus.ops().is_empty());
}

#[test]
fn line_in_bypass_without_dsp() {
    let mut bus = device();
    let cfg = CodecConfig {
        source: AudioSource::LineIn,
        output: AudioOutput::Headphone,
        dsp_enabled: false,
        headphone_volume: HeadphoneVolume::new(0x30),
        ..config()
    };
    let mut codec = Sgtl5000::new(&mut bus, NoopDelay::new());
    assert_eq!(codec.initialize(&cfg), Ok(Stage::Ready));

    assert!(!bus.touched(DAP_CTRL));
    assert!(!bus.touched(CHIP_SSS_CTRL));
    assert_eq!(SELECT_HP.extract(bus.peek(CHIP_ANA_CTRL)), 1);
    assert_eq!(bus.peek(CHIP_ANA_HP_CTRL), 0x3030);
    assert_eq!(bus.peek(CHIP_ADCDAC_CTRL), 0x020C, "DAC stays muted in bypass");
    assert_eq!(MUTE_LO.extract(bus.peek(CHIP_ANA_CTRL)), 1, "line out stays muted");
}

#[test]
fn pll_clocking() {
    let mut bus = device();
    let mut cfg = config();
    cfg.clock.mclk = MclkSource::Pll { mclk_hz: 12_000_000 };
    Sgtl5000::new(&mut bus, NoopDelay::new())
        .initialize(&cfg)
        .unwrap();
    assert_eq!(bus.peek(CHIP_PLL_CTRL), (16 << 11) | 786);
    assert_eq!(bus.peek(CHIP_CLK_TOP_CTRL), 0x0000);
    assert_eq!(bus.peek(CHIP_ANA_POWER), 0x6FFF, "PLL and VCO amp powered");
    assert_eq!(bus.peek(CHIP_CLK_CTRL), 0x000B, "48 kHz from PLL");

    // MCLK_FREQ switched to the PLL only after the dividers are in
    let pll_write = bus
        .ops()
        .iter()
        .position(|op| op.is_write() && op.addr() == CHIP_PLL_CTRL)
        .unwrap();
    let clk_write = bus
        .ops()
        .iter()
        .rposition(|op| op.is_write() && op.addr() == CHIP_CLK_CTRL)
        .unwrap();
    assert!(pll_write < clk_write);
}

#[test]
fn pll_halves_fast_mclk() {
    let mut bus = device();
    let mut cfg = config();
    cfg.clock.sample_rate = SampleRate::Hz44100;
    cfg.clock.mclk = MclkSource::Pll { mclk_hz: 24_000_000 };
    Sgtl5000::new(&mut bus, NoopDelay::new())
        .initialize(&cfg)
        .unwrap();
    assert_eq!(bus.peek(CHIP_CLK_TOP_CTRL), 0x0008);
    assert_eq!(bus.peek(CHIP_PLL_CTRL), (15 << 11) | 108);
    assert_eq!(bus.peek(CHIP_CLK_CTRL), 0x0007);
}

#[test]
fn rerunning_bring_up_is_register_idempotent() {
    let mut bus = device();
    let mut codec = Sgtl5000::new(&mut bus, NoopDelay::new());
    codec.initialize(&config()).unwrap();
    let (bus, _) = codec.release();
    let first = snapshot(bus);

    let mut codec = Sgtl5000::new(&mut *bus, NoopDelay::new());
    assert_eq!(codec.initialize(&config()), Ok(Stage::Ready));
    assert_eq!(snapshot(bus), first);
}

/// Settle delays counted in whole milliseconds with a 1 ms settle and a zero
/// ramp step, against every write outside the headphone ramp.
fn settles_and_paced_writes(cfg: CodecConfig) -> (u64, usize) {
    let mut bus = device();
    let timing = Timing {
        ramp_step_us: 0,
        settle_ms: 1,
    };
    let cfg = CodecConfig { timing, ..cfg };
    let mut codec = Sgtl5000::new(&mut bus, RecordingDelay::new());
    codec.initialize(&cfg).unwrap();
    let (_, delay) = codec.release();

    let writes = bus.ops().iter().filter(|op| op.is_write()).count();
    // the first headphone write sets the ramp start, the rest are ramp steps
    let ramp_steps = bus.write_count(CHIP_ANA_HP_CTRL).saturating_sub(1);
    (delay.total_ns() / 1_000_000, writes - ramp_steps)
}

#[test]
fn every_bring_up_write_is_followed_by_a_settle_delay() {
    let (settles, writes) = settles_and_paced_writes(config());
    assert_eq!(settles, writes as u64);
}

#[test]
fn pll_bring_up_settles_after_every_write() {
    let mut cfg = config();
    cfg.clock.mclk = MclkSource::Pll { mclk_hz: 12_000_000 };
    let (settles, writes) = settles_and_paced_writes(cfg);
    assert_eq!(settles, writes as u64);
}

#[test]
fn bypass_bring_up_settles_after_every_write() {
    let cfg = CodecConfig {
        source: AudioSource::LineIn,
        output: AudioOutput::Headphone,
        dsp_enabled: false,
        ..config()
    };
    let (settles, writes) = settles_and_paced_writes(cfg);
    assert_eq!(settles, writes as u64);
}
