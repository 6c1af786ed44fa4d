//! Output levels and mutes.
//!
//! Level changes always ramp. Mutes are single verified writes.

use embedded_hal::delay::DelayNs;
use platform::RegisterBus;

use crate::audio_types::{DacVolume, HeadphoneVolume, LineOutVolume};
use crate::error::Error;
use crate::registers::{
    CHIP_ANA_HP_CTRL, CHIP_DAC_VOL, DAC_MUTE, DAC_VOLUME, HP_VOLUME, LINE_OUT_VOLUME, MUTE_HP,
    MUTE_LO, SELECT_HP,
};
use crate::routing::AudioOutput;
use crate::driver::Pacing;
use crate::Sgtl5000;

/// DAC_MUTE code with both channels muted.
const DAC_MUTED: u16 = 0b11;

impl<B: RegisterBus, D: DelayNs> Sgtl5000<B, D> {
    /// Mute both DAC channels.
    pub fn mute_dac(&mut self) -> Result<(), Error<B::Error>> {
        self.regs.set_field(DAC_MUTE, DAC_MUTED)
    }

    /// Unmute both DAC channels.
    ///
    /// Composite DAP operations leave the DAC muted when they abort; this is
    /// the way back.
    pub fn unmute_dac(&mut self) -> Result<(), Error<B::Error>> {
        self.regs.set_field(DAC_MUTE, 0)
    }

    /// Mute or unmute the headphone amplifier.
    pub fn set_headphone_mute(&mut self, muted: bool) -> Result<(), Error<B::Error>> {
        self.regs.set_field(MUTE_HP, u16::from(muted))
    }

    /// Mute or unmute the line output.
    pub fn set_line_out_mute(&mut self, muted: bool) -> Result<(), Error<B::Error>> {
        self.regs.set_field(MUTE_LO, u16::from(muted))
    }

    /// Ramp the headphone amplifier, both channels, to `volume`.
    ///
    /// Returns the number of steps taken.
    pub fn set_headphone_volume(
        &mut self,
        volume: impl Into<HeadphoneVolume>,
    ) -> Result<u16, Error<B::Error>> {
        let volume = volume.into();
        self.ramp_field(HP_VOLUME, volume.code())
    }

    /// Ramp the DAC digital volume, both channels, to `volume`.
    ///
    /// Raw codes are clamped to 0x3C (0 dB) ..= 0xF0 (-90 dB).
    pub fn set_dac_volume(&mut self, volume: impl Into<DacVolume>) -> Result<u16, Error<B::Error>> {
        let volume = volume.into();
        self.ramp_field(DAC_VOLUME, volume.code())
    }

    /// Ramp the line output level, both channels, to `volume`.
    pub fn set_line_out_volume(
        &mut self,
        volume: impl Into<LineOutVolume>,
    ) -> Result<u16, Error<B::Error>> {
        let volume = volume.into();
        self.ramp_field(LINE_OUT_VOLUME, volume.code())
    }

    /// Bring the selected outputs up to level.
    ///
    /// Headphone: start at the quietest setting, unmute, unmute the DAC at
    /// 0 dB if it feeds the headphone, then ramp to `headphone`. Line output:
    /// unmute, then unmute the DAC at 0 dB.
    pub fn apply_output_levels(
        &mut self,
        output: AudioOutput,
        headphone: HeadphoneVolume,
    ) -> Result<(), Error<B::Error>> {
        self.output_levels(output, headphone, Pacing::Immediate)
    }

    /// [`apply_output_levels`](Self::apply_output_levels) body. With
    /// [`Pacing::Settled`] every write outside the headphone ramp is followed
    /// by the settle delay.
    pub(crate) fn output_levels(
        &mut self,
        output: AudioOutput,
        headphone: HeadphoneVolume,
        pacing: Pacing,
    ) -> Result<(), Error<B::Error>> {
        let hp_from_dac = self.regs.read_field(SELECT_HP)? == 0;
        if output.includes_headphone() {
            self.regs.write_verify(
                CHIP_ANA_HP_CTRL,
                HP_VOLUME.insert(0, HeadphoneVolume::MIN_GAIN.code()),
            )?;
            self.pace(pacing);
            self.set_headphone_mute(false)?;
            self.pace(pacing);
            if hp_from_dac {
                self.unmute_dac_at_unity(pacing)?;
            }
            self.set_headphone_volume(headphone)?;
        }
        if output.includes_line_out() {
            self.set_line_out_mute(false)?;
            self.pace(pacing);
            self.unmute_dac_at_unity(pacing)?;
        }
        debug!("output levels applied, headphone code {}", headphone.get());
        Ok(())
    }

    fn unmute_dac_at_unity(&mut self, pacing: Pacing) -> Result<(), Error<B::Error>> {
        self.regs
            .write_verify(CHIP_DAC_VOL, DAC_VOLUME.insert(0, DacVolume::ZERO_DB.code()))?;
        self.pace(pacing);
        self.unmute_dac()?;
        self.pace(pacing);
        Ok(())
    }
}
