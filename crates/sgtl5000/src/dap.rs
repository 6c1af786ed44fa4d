//! Digital audio processor: graphic EQ, bass enhancement, surround, AVC.
//!
//! Every audible change goes through the ramp engine. Multi-step changes
//! are bracketed by a DAC mute. If one of them aborts part way through the
//! DAC stays muted and the error is returned; [`Sgtl5000::unmute_dac`]
//! recovers.

use core::fmt;
use core::str::FromStr;

use embedded_hal::delay::DelayNs;
use platform::RegisterBus;

use crate::audio_types::{geq_code_from_db, BassLevel, LrLevel, SurroundWidth};
use crate::error::Error;
use crate::registers::{
    AVC_ATTACK_RATE, AVC_DECAY_RATE, AVC_EN, AVC_HARD_LIMIT_EN, AVC_LBI_RESPONSE, AVC_MAX_GAIN,
    BASS_EN, BASS_LEVEL, BASS_LR_LEVEL, DAP_AUDIO_EQ, DAP_AVC_ATTACK, DAP_AVC_CTRL, DAP_AVC_DECAY,
    DAP_AVC_THRESHOLD, DAP_EN, DAP_SGTL_SURROUND, EQ_MODE, GEQ_BANDS, SURROUND_SELECT,
    SURROUND_WIDTH,
};
use crate::Sgtl5000;

/// EQ_MODE code selecting the 5-band graphic EQ.
const EQ_MODE_GEQ: u16 = 3;

// ── EQ profiles ──────────────────────────────────────────────────────────────

/// Named graphic EQ presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EqProfile {
    /// All bands at 0 dB
    Flat,
    /// Rock
    Rock,
    /// Pop
    Pop,
    /// Classical
    Classical,
    /// Rap
    Rap,
    /// Jazz
    Jazz,
    /// EDM
    Edm,
    /// Vocal presence
    Vocal,
    /// Bright
    Bright,
    /// Warm
    Warm,
    /// Bass boost
    BassBoost,
    /// Treble boost
    TrebleBoost,
    /// Extreme V-shape
    MaxSmile,
    /// Extreme mid boost
    MidSpike,
}

impl EqProfile {
    /// Every profile.
    pub const ALL: [Self; 14] = [
        Self::Flat,
        Self::Rock,
        Self::Pop,
        Self::Classical,
        Self::Rap,
        Self::Jazz,
        Self::Edm,
        Self::Vocal,
        Self::Bright,
        Self::Warm,
        Self::BassBoost,
        Self::TrebleBoost,
        Self::MaxSmile,
        Self::MidSpike,
    ];

    /// Band gains in dB, lowest band first.
    pub fn bands(self) -> [i8; 5] {
        match self {
            Self::Flat => [0, 0, 0, 0, 0],
            Self::Rock => [4, 2, 0, 3, 5],
            Self::Pop => [3, 1, 0, 2, 4],
            Self::Classical => [-1, 2, 3, 2, -1],
            Self::Rap => [6, 3, 0, 1, 2],
            Self::Jazz => [2, 2, 1, 2, 2],
            Self::Edm => [6, 2, 0, 2, 6],
            Self::Vocal => [-2, 3, 4, 3, -2],
            Self::Bright => [-3, -1, 0, 3, 6],
            Self::Warm => [6, 2, 0, -2, -3],
            Self::BassBoost => [9, 3, 0, 0, 0],
            Self::TrebleBoost => [0, 0, 0, 6, 9],
            Self::MaxSmile => [12, 8, -12, 8, 12],
            Self::MidSpike => [-12, 12, 12, 12, -12],
        }
    }

    /// Upper-case command name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Flat => "FLAT",
            Self::Rock => "ROCK",
            Self::Pop => "POP",
            Self::Classical => "CLASSICAL",
            Self::Rap => "RAP",
            Self::Jazz => "JAZZ",
            Self::Edm => "EDM",
            Self::Vocal => "VOCAL",
            Self::Bright => "BRIGHT",
            Self::Warm => "WARM",
            Self::BassBoost => "BASSBOOST",
            Self::TrebleBoost => "TREBLEBOOST",
            Self::MaxSmile => "MAXSMILE",
            Self::MidSpike => "MIDSPIKE",
        }
    }
}

impl fmt::Display for EqProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name that matches no [`EqProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownProfile;

impl fmt::Display for UnknownProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown EQ profile")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownProfile {}

impl FromStr for EqProfile {
    type Err = UnknownProfile;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownProfile)
    }
}

// ── Surround ─────────────────────────────────────────────────────────────────

/// Surround processing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SurroundMode {
    /// Disabled
    Off,
    /// Mono input
    Mono,
    /// Stereo input
    Stereo,
}

impl SurroundMode {
    /// SELECT code.
    pub fn code(self) -> u16 {
        match self {
            Self::Off => 0,
            Self::Mono => 2,
            Self::Stereo => 3,
        }
    }
}

// ── AVC ──────────────────────────────────────────────────────────────────────

/// Largest gain the AVC may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AvcMaxGain {
    /// 0 dB
    Db0,
    /// +6 dB
    #[default]
    Db6,
    /// +12 dB
    Db12,
}

/// Integrator response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AvcResponse {
    /// 0 ms
    Ms0,
    /// 25 ms
    #[default]
    Ms25,
    /// 50 ms
    Ms50,
    /// 100 ms
    Ms100,
}

/// Automatic volume control settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AvcConfig {
    /// Largest gain applied
    pub max_gain: AvcMaxGain,
    /// Integrator response
    pub response: AvcResponse,
    /// Hard limiter instead of compressor above threshold
    pub hard_limit: bool,
    /// Threshold, DAP_AVC_THRESHOLD encoding
    pub threshold: u16,
    /// Attack rate, 12 bits
    pub attack: u16,
    /// Decay rate, 12 bits
    pub decay: u16,
    /// AVC running after configuration
    pub enabled: bool,
}

impl Default for AvcConfig {
    /// Power-on settings (-12 dB threshold), enabled.
    fn default() -> Self {
        Self {
            max_gain: AvcMaxGain::default(),
            response: AvcResponse::default(),
            hard_limit: false,
            threshold: 0x1473,
            attack: 0x0028,
            decay: 0x0050,
            enabled: true,
        }
    }
}

impl AvcConfig {
    /// DAP_AVC_CTRL with every field of this configuration merged into `current`.
    pub fn ctrl_value(&self, current: u16) -> u16 {
        let max_gain = match self.max_gain {
            AvcMaxGain::Db0 => 0,
            AvcMaxGain::Db6 => 1,
            AvcMaxGain::Db12 => 2,
        };
        let response = match self.response {
            AvcResponse::Ms0 => 0,
            AvcResponse::Ms25 => 1,
            AvcResponse::Ms50 => 2,
            AvcResponse::Ms100 => 3,
        };
        let v = AVC_MAX_GAIN.insert(current, max_gain);
        let v = AVC_LBI_RESPONSE.insert(v, response);
        let v = AVC_HARD_LIMIT_EN.insert(v, u16::from(self.hard_limit));
        AVC_EN.insert(v, u16::from(self.enabled))
    }
}

// ── Operations ───────────────────────────────────────────────────────────────

impl<B: RegisterBus, D: DelayNs> Sgtl5000<B, D> {
    /// Power the DAP block in or out of the signal path.
    pub fn set_dap_enabled(&mut self, enabled: bool) -> Result<(), Error<B::Error>> {
        self.regs.set_field(DAP_EN, u16::from(enabled))
    }

    /// Disable all EQ processing.
    pub fn bypass_eq(&mut self) -> Result<(), Error<B::Error>> {
        debug!("eq bypass");
        self.regs.write_verify(DAP_AUDIO_EQ, 0)
    }

    /// Select the 5-band graphic EQ. Idempotent.
    pub fn enable_geq(&mut self) -> Result<(), Error<B::Error>> {
        self.regs.set_field(EQ_MODE, EQ_MODE_GEQ)
    }

    /// Ramp the five GEQ bands to `db` (each clamped to -12..=+12 dB).
    ///
    /// The DAC is muted for the whole change and unmuted only after all five
    /// bands reached their targets.
    pub fn set_geq_bands(&mut self, db: [i8; 5]) -> Result<(), Error<B::Error>> {
        let codes = db.map(geq_code_from_db);
        debug!("geq bands {:?} -> codes {:?}", db, codes);
        self.mute_dac()?;
        self.enable_geq()?;
        for (band, code) in GEQ_BANDS.into_iter().zip(codes) {
            if let Err(e) = self.ramp_field(band, code) {
                warn!("geq aborted at {}, DAC left muted", band.name);
                return Err(e);
            }
        }
        self.unmute_dac()
    }

    /// Apply a named preset.
    pub fn set_eq_profile(&mut self, profile: EqProfile) -> Result<(), Error<B::Error>> {
        debug!("eq profile {}", profile.name());
        self.set_geq_bands(profile.bands())
    }

    /// Switch bass enhancement.
    ///
    /// Enabling sets the main-channel level, ramps the boost to its weakest
    /// setting, sets the enable bit there, then ramps down to `bass_level`,
    /// all with the DAC muted. Disabling clears the enable bit only.
    pub fn set_bass_enhance(
        &mut self,
        enable: bool,
        lr_level: impl Into<LrLevel>,
        bass_level: impl Into<BassLevel>,
    ) -> Result<(), Error<B::Error>> {
        if !enable {
            debug!("bass enhance off");
            return self.regs.set_field(BASS_EN, 0);
        }
        let lr_level = lr_level.into();
        let bass_level = bass_level.into();
        debug!(
            "bass enhance on, lr {} bass {}",
            lr_level.get(),
            bass_level.get()
        );
        self.mute_dac()?;
        let result = self.bass_enhance_sequence(lr_level, bass_level);
        if result.is_err() {
            warn!("bass enhance aborted, DAC left muted");
        }
        result?;
        self.unmute_dac()
    }

    fn bass_enhance_sequence(
        &mut self,
        lr_level: LrLevel,
        bass_level: BassLevel,
    ) -> Result<(), Error<B::Error>> {
        self.regs.set_field(BASS_LR_LEVEL, lr_level.code())?;
        self.ramp_field(BASS_LEVEL, BassLevel::LEAST.code())?;
        self.regs.set_field(BASS_EN, 1)?;
        self.ramp_field(BASS_LEVEL, bass_level.code())?;
        Ok(())
    }

    /// Set surround mode and width (clamped to 0..=7) in one verified write,
    /// with the DAC muted around it.
    pub fn set_surround(
        &mut self,
        mode: SurroundMode,
        width: impl Into<SurroundWidth>,
    ) -> Result<(), Error<B::Error>> {
        let width = width.into();
        debug!("surround {:?} width {}", mode, width.get());
        let value = SURROUND_SELECT.insert(SURROUND_WIDTH.insert(0, width.code()), mode.code());
        self.mute_dac()?;
        if let Err(e) = self.regs.write_verify(DAP_SGTL_SURROUND, value) {
            warn!("surround aborted, DAC left muted");
            return Err(e);
        }
        self.unmute_dac()
    }

    /// Program the automatic volume control.
    ///
    /// Threshold, attack and decay are written first, then the control
    /// register.
    pub fn configure_avc(&mut self, config: &AvcConfig) -> Result<(), Error<B::Error>> {
        debug!("avc {:?}", config);
        self.regs.write_verify(DAP_AVC_THRESHOLD, config.threshold)?;
        self.regs
            .write_verify(DAP_AVC_ATTACK, config.attack & AVC_ATTACK_RATE.mask)?;
        self.regs
            .write_verify(DAP_AVC_DECAY, config.decay & AVC_DECAY_RATE.mask)?;
        let current = self.regs.read(DAP_AVC_CTRL)?;
        self.regs.write_verify(DAP_AVC_CTRL, config.ctrl_value(current))
    }

    /// Toggle the AVC enable bit only.
    pub fn set_avc_enabled(&mut self, enabled: bool) -> Result<(), Error<B::Error>> {
        self.regs.set_field(AVC_EN, u16::from(enabled))
    }
}
