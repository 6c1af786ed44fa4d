//! Bring-up state machine.
//!
//! ```text
//! Unpowered → AnalogPowered → DigitalPowered → ClockConfigured →
//! I2sConfigured → Routed → [DspConfigured] → LevelsSet → Ready
//! ```
//!
//! Each transition is a fixed list of register writes, each followed by the
//! settle delay. Headphone ramp steps wait the ramp step delay instead. The first failure halts bring-up and reports the stage that
//! was being entered. Nothing is retried or rolled back. Running bring-up
//! again always starts from the first stage; every write in it is
//! idempotent.

use embedded_hal::delay::DelayNs;
use platform::RegisterBus;

use crate::audio_types::LineOutVolume;
use crate::config::{CodecConfig, I2sConfig, MclkSource, PllDividers};
use crate::error::{Error, InitError};
use crate::registers::{
    CHIP_ANA_POWER, CHIP_CLK_CTRL, CHIP_DIG_POWER, CHIP_LINE_OUT_CTRL, CHIP_LINE_OUT_VOL,
    CHIP_PLL_CTRL, CHIP_REF_CTRL, CHIP_SHORT_CTRL, INPUT_FREQ_DIV2, LINE_OUT_VOLUME, PLL_POWERUP,
    VCOAMP_POWERUP,
};
use crate::driver::Pacing;
use crate::routing::RoutePlan;
use crate::Sgtl5000;

/// Bring-up stage, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Nothing configured
    Unpowered,
    /// Reference, bias and analog blocks powered
    AnalogPowered,
    /// I2S, DAP, DAC and ADC blocks powered
    DigitalPowered,
    /// Sample rate and MCLK source set
    ClockConfigured,
    /// I2S port format set
    I2sConfigured,
    /// Signal path switched
    Routed,
    /// DAP and graphic EQ enabled
    DspConfigured,
    /// Outputs unmuted at level
    LevelsSet,
    /// Bring-up complete
    Ready,
}

impl Stage {
    /// Stage that follows this one. `DspConfigured` is skipped without DSP.
    pub fn next(self, dsp_enabled: bool) -> Option<Self> {
        match self {
            Self::Unpowered => Some(Self::AnalogPowered),
            Self::AnalogPowered => Some(Self::DigitalPowered),
            Self::DigitalPowered => Some(Self::ClockConfigured),
            Self::ClockConfigured => Some(Self::I2sConfigured),
            Self::I2sConfigured => Some(Self::Routed),
            Self::Routed if dsp_enabled => Some(Self::DspConfigured),
            Self::Routed | Self::DspConfigured => Some(Self::LevelsSet),
            Self::LevelsSet => Some(Self::Ready),
            Self::Ready => None,
        }
    }
}

/// Bring-up progress of one codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceSession {
    stage: Stage,
}

impl DeviceSession {
    /// Fresh session.
    pub const fn new() -> Self {
        Self {
            stage: Stage::Unpowered,
        }
    }

    /// Last stage completed.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// `true` once bring-up completed.
    pub fn is_ready(&self) -> bool {
        self.stage == Stage::Ready
    }

    fn reached(&mut self, stage: Stage) {
        self.stage = stage;
    }
}

impl Default for DeviceSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Analog power-up: VAG and reference, line-out bias, short detect, then
/// every analog block.
pub const ANALOG_POWER_SEQUENCE: [(u16, u16); 6] = [
    (CHIP_ANA_POWER, 0x4260),
    (CHIP_REF_CTRL, 0x004E),
    (CHIP_LINE_OUT_CTRL, 0x0322),
    (CHIP_REF_CTRL, 0x004F),
    (CHIP_SHORT_CTRL, 0x1106),
    (CHIP_ANA_POWER, 0x6AFF),
];

/// Digital power-up: I2S in/out, DAP, DAC, ADC.
pub const DIGITAL_POWER_SEQUENCE: [(u16, u16); 1] = [(CHIP_DIG_POWER, 0x0073)];

impl<B: RegisterBus, D: DelayNs> Sgtl5000<B, D> {
    /// Bring-up stage last completed.
    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    /// Run the whole bring-up sequence for `config`.
    ///
    /// The configuration is validated before any bus traffic; a rejected
    /// configuration is reported against [`Stage::Unpowered`]. Returns the
    /// final stage.
    pub fn initialize(&mut self, config: &CodecConfig) -> Result<Stage, InitError<B::Error>> {
        config.validate().map_err(|e| InitError {
            stage: Stage::Unpowered,
            error: Error::InvalidConfig(e),
        })?;
        self.timing = config.timing;
        self.session = DeviceSession::new();
        info!(
            "sgtl5000 bring-up: {:?} -> {:?}, dsp={}",
            config.source, config.output, config.dsp_enabled
        );

        let mut stage = Stage::Unpowered;
        while let Some(next) = stage.next(config.dsp_enabled) {
            if let Err(error) = self.enter(next, config) {
                warn!("bring-up halted entering {:?}", next);
                return Err(InitError { stage: next, error });
            }
            info!("stage {:?}", next);
            self.session.reached(next);
            stage = next;
        }
        Ok(stage)
    }

    fn enter(&mut self, stage: Stage, config: &CodecConfig) -> Result<(), Error<B::Error>> {
        match stage {
            Stage::Unpowered | Stage::Ready => Ok(()),
            Stage::AnalogPowered => self.settled_writes(&ANALOG_POWER_SEQUENCE),
            Stage::DigitalPowered => self.settled_writes(&DIGITAL_POWER_SEQUENCE),
            Stage::ClockConfigured => self.configure_clock(config),
            Stage::I2sConfigured => {
                self.regs
                    .write_verify(I2sConfig::REGISTER, config.i2s.register_value())?;
                self.settle();
                Ok(())
            }
            Stage::Routed => {
                let plan = RoutePlan::new(config.source, config.output, config.dsp_enabled);
                debug!("route plan: {} actions", plan.len());
                for action in plan.actions() {
                    self.apply_route_action(action)?;
                    self.settle();
                }
                Ok(())
            }
            Stage::DspConfigured => {
                self.set_dap_enabled(true)?;
                self.settle();
                self.enable_geq()?;
                self.settle();
                Ok(())
            }
            Stage::LevelsSet => {
                self.regs.write_verify(
                    CHIP_LINE_OUT_VOL,
                    LINE_OUT_VOLUME.insert(0, LineOutVolume::BRING_UP.code()),
                )?;
                self.settle();
                self.output_levels(config.output, config.headphone_volume, Pacing::Settled)
            }
        }
    }

    fn settled_writes(&mut self, sequence: &[(u16, u16)]) -> Result<(), Error<B::Error>> {
        for &(addr, value) in sequence {
            self.regs.write_verify(addr, value)?;
            self.settle();
        }
        Ok(())
    }

    fn configure_clock(&mut self, config: &CodecConfig) -> Result<(), Error<B::Error>> {
        let clock = config.clock;
        if let MclkSource::Pll { mclk_hz } = clock.mclk {
            let dividers = PllDividers::compute(mclk_hz, clock.sample_rate);
            debug!(
                "pll: mclk {} Hz, int {} frac {} div2 {}",
                mclk_hz, dividers.int_divisor, dividers.frac_divisor, dividers.input_div2
            );
            self.regs.set_field(PLL_POWERUP, 1)?;
            self.settle();
            self.regs.set_field(VCOAMP_POWERUP, 1)?;
            self.settle();
            self.regs
                .set_field(INPUT_FREQ_DIV2, u16::from(dividers.input_div2))?;
            self.settle();
            self.regs
                .write_verify(CHIP_PLL_CTRL, dividers.pll_ctrl_value())?;
            self.settle();
        }
        // MCLK_FREQ selects the PLL only after it has been programmed.
        let current = self.regs.read(CHIP_CLK_CTRL)?;
        self.regs
            .write_verify(CHIP_CLK_CTRL, clock.clk_ctrl_value(current))?;
        self.settle();
        Ok(())
    }
}
