//! Bring-up configuration.
//!
//! [`CodecConfig::default`] is the canonical configuration of the reference
//! board: I2S in through the DAP to both outputs at 48 kHz, MCLK = 256·Fs,
//! codec as I2S slave with a 64·Fs bit clock and 16-bit samples, headphone
//! at 0 dB.

use crate::audio_types::HeadphoneVolume;
use crate::error::ConfigError;
use crate::registers::{CHIP_I2S_CTRL, MCLK_FREQ, SYS_FS};
use crate::routing::{AudioOutput, AudioSource};

// ── Clocking ─────────────────────────────────────────────────────────────────

/// System sample rate (CHIP_CLK_CTRL SYS_FS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleRate {
    /// 32 kHz
    Hz32000,
    /// 44.1 kHz
    Hz44100,
    /// 48 kHz
    #[default]
    Hz48000,
    /// 96 kHz
    Hz96000,
}

impl SampleRate {
    /// SYS_FS code.
    pub fn code(self) -> u16 {
        match self {
            Self::Hz32000 => 0,
            Self::Hz44100 => 1,
            Self::Hz48000 => 2,
            Self::Hz96000 => 3,
        }
    }

    /// Rate in Hz.
    pub fn hz(self) -> u32 {
        match self {
            Self::Hz32000 => 32_000,
            Self::Hz44100 => 44_100,
            Self::Hz48000 => 48_000,
            Self::Hz96000 => 96_000,
        }
    }

    /// PLL output frequency needed for this rate.
    pub fn pll_output_hz(self) -> u32 {
        match self {
            Self::Hz44100 => 180_633_600,
            _ => 196_608_000,
        }
    }
}

/// MCLK as a multiple of the sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MclkRatio {
    /// 256·Fs
    #[default]
    Fs256,
    /// 384·Fs
    Fs384,
    /// 512·Fs
    Fs512,
}

impl MclkRatio {
    /// MCLK_FREQ code.
    pub fn code(self) -> u16 {
        match self {
            Self::Fs256 => 0,
            Self::Fs384 => 1,
            Self::Fs512 => 2,
        }
    }
}

/// MCLK_FREQ code selecting the PLL.
pub const MCLK_FREQ_PLL: u16 = 3;

/// Where SYS_MCLK comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MclkSource {
    /// MCLK pin at a fixed multiple of Fs.
    Ratio(MclkRatio),
    /// Internal PLL fed from an MCLK of arbitrary frequency.
    Pll {
        /// MCLK pin frequency
        mclk_hz: u32,
    },
}

impl Default for MclkSource {
    fn default() -> Self {
        Self::Ratio(MclkRatio::default())
    }
}

/// Clock stage settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// System sample rate
    pub sample_rate: SampleRate,
    /// MCLK source
    pub mclk: MclkSource,
}

impl ClockConfig {
    /// Lowest PLL reference the codec accepts.
    pub const PLL_INPUT_MIN_HZ: u32 = 8_000_000;
    /// Highest PLL reference the codec accepts.
    pub const PLL_INPUT_MAX_HZ: u32 = 27_000_000;

    /// CHIP_CLK_CTRL fields `(SYS_FS, MCLK_FREQ)` for this configuration.
    pub fn clk_ctrl_codes(&self) -> (u16, u16) {
        let mclk = match self.mclk {
            MclkSource::Ratio(r) => r.code(),
            MclkSource::Pll { .. } => MCLK_FREQ_PLL,
        };
        (self.sample_rate.code(), mclk)
    }

    /// CHIP_CLK_CTRL value with every other bit taken from `current`.
    pub fn clk_ctrl_value(&self, current: u16) -> u16 {
        let (fs, mclk) = self.clk_ctrl_codes();
        MCLK_FREQ.insert(SYS_FS.insert(current, fs), mclk)
    }
}

/// PLL divisors for one (MCLK, sample rate) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllDividers {
    /// MCLK is halved before the PLL (INPUT_FREQ_DIV2).
    pub input_div2: bool,
    /// INT_DIVISOR, 5 bits
    pub int_divisor: u16,
    /// FRAC_DIVISOR, 11 bits
    pub frac_divisor: u16,
}

impl PllDividers {
    /// Above this MCLK the PLL input must be halved.
    pub const DIV2_THRESHOLD_HZ: u32 = 17_000_000;

    /// `INT = f_pll / f_in`, `FRAC = (f_pll / f_in - INT) * 2048`, in
    /// integer arithmetic.
    pub fn compute(mclk_hz: u32, rate: SampleRate) -> Self {
        let input_div2 = mclk_hz > Self::DIV2_THRESHOLD_HZ;
        let input = if input_div2 { mclk_hz.wrapping_shr(1) } else { mclk_hz }.max(1);
        let pll = u64::from(rate.pll_output_hz());
        let input = u64::from(input);
        let int_divisor = pll.checked_div(input).unwrap_or(0);
        let frac_divisor = pll
            .checked_rem(input)
            .unwrap_or(0)
            .saturating_mul(2048)
            .checked_div(input)
            .unwrap_or(0);
        Self {
            input_div2,
            int_divisor: u16::try_from(int_divisor).unwrap_or(u16::MAX),
            frac_divisor: u16::try_from(frac_divisor).unwrap_or(u16::MAX),
        }
    }

    /// CHIP_PLL_CTRL value.
    pub fn pll_ctrl_value(&self) -> u16 {
        use crate::registers::{PLL_FRAC_DIVISOR, PLL_INT_DIVISOR};
        PLL_FRAC_DIVISOR.insert(PLL_INT_DIVISOR.insert(0, self.int_divisor), self.frac_divisor)
    }
}

// ── I2S format ───────────────────────────────────────────────────────────────

/// Bit clock rate (I2S_CTRL SCLKFREQ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SclkRate {
    /// 64·Fs
    #[default]
    Fs64,
    /// 32·Fs, 16-bit samples only
    Fs32,
}

/// Sample length (I2S_CTRL DLEN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataLength {
    /// 16 bits
    #[default]
    Bits16,
    /// 20 bits
    Bits20,
    /// 24 bits
    Bits24,
    /// 32 bits
    Bits32,
}

impl DataLength {
    /// DLEN code.
    pub fn code(self) -> u16 {
        match self {
            Self::Bits32 => 0,
            Self::Bits24 => 1,
            Self::Bits20 => 2,
            Self::Bits16 => 3,
        }
    }

    /// Length in bits.
    pub fn bits(self) -> u8 {
        match self {
            Self::Bits16 => 16,
            Self::Bits20 => 20,
            Self::Bits24 => 24,
            Self::Bits32 => 32,
        }
    }
}

/// Frame format (I2S_CTRL I2S_MODE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2sMode {
    /// I2S or left justified, selected by `lr_align`
    #[default]
    I2sLeftJustified,
    /// Right justified
    RightJustified,
    /// PCM format A/B
    Pcm,
}

impl I2sMode {
    /// I2S_MODE code.
    pub fn code(self) -> u16 {
        match self {
            Self::I2sLeftJustified => 0,
            Self::RightJustified => 1,
            Self::Pcm => 2,
        }
    }
}

/// I2S port format, written as one CHIP_I2S_CTRL value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct I2sConfig {
    /// Bit clock rate
    pub sclk: SclkRate,
    /// Codec drives SCLK and LRCLK
    pub master: bool,
    /// Data valid on the falling SCLK edge
    pub sclk_inverted: bool,
    /// Sample length
    pub data_length: DataLength,
    /// Frame format
    pub mode: I2sMode,
    /// Data starts on the LRCLK edge (left justified) instead of one SCLK later
    pub lr_align: bool,
    /// Left channel while LRCLK is high
    pub lr_polarity: bool,
}

impl I2sConfig {
    /// CHIP_I2S_CTRL register value: SCLKFREQ\[8\], MS\[7\], SCLK_INV\[6\],
    /// DLEN\[5:4\], I2S_MODE\[3:2\], LRALIGN\[1\], LRPOL\[0\].
    pub fn register_value(&self) -> u16 {
        let mut v = self.data_length.code().wrapping_shl(4) | self.mode.code().wrapping_shl(2);
        if self.sclk == SclkRate::Fs32 {
            v |= 0x0100;
        }
        if self.master {
            v |= 0x0080;
        }
        if self.sclk_inverted {
            v |= 0x0040;
        }
        if self.lr_align {
            v |= 0x0002;
        }
        if self.lr_polarity {
            v |= 0x0001;
        }
        v
    }

    /// Register the value is written to.
    pub const REGISTER: u16 = CHIP_I2S_CTRL;
}

// ── Timing ───────────────────────────────────────────────────────────────────

/// Ramp and settle delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Delay after each ramp step
    pub ramp_step_us: u32,
    /// Delay after each bring-up write
    pub settle_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            ramp_step_us: 100,
            settle_ms: 5,
        }
    }
}

impl Timing {
    /// Upper bound on the delay spent in ramps of `steps` total steps.
    pub fn worst_case_ramp_us(&self, steps: u32) -> u64 {
        u64::from(steps).saturating_mul(u64::from(self.ramp_step_us))
    }

    /// No delays, for simulated devices.
    pub const fn immediate() -> Self {
        Self {
            ramp_step_us: 0,
            settle_ms: 0,
        }
    }
}

// ── CodecConfig ──────────────────────────────────────────────────────────────

/// Everything the bring-up sequence needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodecConfig {
    /// Audio source
    pub source: AudioSource,
    /// Output selection
    pub output: AudioOutput,
    /// Route through the DAP and enable the graphic EQ
    pub dsp_enabled: bool,
    /// Clocking
    pub clock: ClockConfig,
    /// I2S format
    pub i2s: I2sConfig,
    /// Headphone level reached at the end of bring-up
    pub headphone_volume: HeadphoneVolume,
    /// Delays
    pub timing: Timing,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            source: AudioSource::DigitalIn,
            output: AudioOutput::Both,
            dsp_enabled: true,
            clock: ClockConfig::default(),
            i2s: I2sConfig::default(),
            headphone_volume: HeadphoneVolume::ZERO_DB,
            timing: Timing::default(),
        }
    }
}

impl CodecConfig {
    /// Reject configurations the codec cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bits = self.i2s.data_length.bits();
        if self.i2s.sclk == SclkRate::Fs32 && bits > 16 {
            return Err(ConfigError::SampleLengthNeeds64Fs { bits });
        }
        if let MclkSource::Pll { mclk_hz } = self.clock.mclk {
            if !(ClockConfig::PLL_INPUT_MIN_HZ..=ClockConfig::PLL_INPUT_MAX_HZ).contains(&mclk_hz) {
                return Err(ConfigError::PllInputOutOfRange { mclk_hz });
            }
        }
        Ok(())
    }
}
