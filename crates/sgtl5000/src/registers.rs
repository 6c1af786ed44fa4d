//! SGTL5000 register map.
//!
//! Reference: NXP SGTL5000 datasheet Rev. 6, Section 6 (Register Descriptions).
//!
//! Addresses and bitfields are declared once here. Every other module talks
//! about registers through these constants, never through bare numbers.

/// 7-bit I2C address with CTRL_ADR0_CS tied low.
pub const I2C_ADDR_CS_LOW: u8 = 0x0A;
/// 7-bit I2C address with CTRL_ADR0_CS tied high.
pub const I2C_ADDR_CS_HIGH: u8 = 0x2A;

/// Part id reported in the upper byte of CHIP_ID.
pub const PART_ID_SGTL5000: u16 = 0xA0;

// ── Register addresses ───────────────────────────────────────────────────────

/// Part and revision id (read-only).
pub const CHIP_ID: u16 = 0x0000;
/// Digital block power-up enables.
pub const CHIP_DIG_POWER: u16 = 0x0002;
/// Sample rate and MCLK ratio.
pub const CHIP_CLK_CTRL: u16 = 0x0004;
/// I2S port format.
pub const CHIP_I2S_CTRL: u16 = 0x0006;
/// Digital source select switch.
pub const CHIP_SSS_CTRL: u16 = 0x000A;
/// ADC/DAC control, including the DAC mute bits.
pub const CHIP_ADCDAC_CTRL: u16 = 0x000E;
/// DAC digital volume, one byte per channel.
pub const CHIP_DAC_VOL: u16 = 0x0010;
/// I2S/I2C pad drive strength.
pub const CHIP_PAD_STRENGTH: u16 = 0x0014;
/// Analog ADC gain.
pub const CHIP_ANA_ADC_CTRL: u16 = 0x0020;
/// Headphone amplifier volume.
pub const CHIP_ANA_HP_CTRL: u16 = 0x0022;
/// Analog mutes and input selects.
pub const CHIP_ANA_CTRL: u16 = 0x0024;
/// Internal linear regulator control.
pub const CHIP_LINREG_CTRL: u16 = 0x0026;
/// Reference voltage and bias.
pub const CHIP_REF_CTRL: u16 = 0x0028;
/// Microphone bias and gain.
pub const CHIP_MIC_CTRL: u16 = 0x002A;
/// Line output bias and VAG.
pub const CHIP_LINE_OUT_CTRL: u16 = 0x002C;
/// Line output volume.
pub const CHIP_LINE_OUT_VOL: u16 = 0x002E;
/// Analog block power-up enables.
pub const CHIP_ANA_POWER: u16 = 0x0030;
/// PLL divisors.
pub const CHIP_PLL_CTRL: u16 = 0x0032;
/// Top-level clock control.
pub const CHIP_CLK_TOP_CTRL: u16 = 0x0034;
/// Analog status (read-only).
pub const CHIP_ANA_STATUS: u16 = 0x0036;
/// Analog test register 2.
pub const CHIP_ANA_TEST2: u16 = 0x003A;
/// Headphone short detection.
pub const CHIP_SHORT_CTRL: u16 = 0x003C;

/// Digital audio processor enable and mixer enable.
pub const DAP_CTRL: u16 = 0x0100;
/// Parametric EQ filter count.
pub const DAP_PEQ: u16 = 0x0102;
/// Bass enhancement enable and cutoff.
pub const DAP_BASS_ENHANCE: u16 = 0x0104;
/// Bass enhancement levels.
pub const DAP_BASS_ENHANCE_CTRL: u16 = 0x0106;
/// EQ mode select (off, PEQ, tone, GEQ).
pub const DAP_AUDIO_EQ: u16 = 0x0108;
/// Freescale surround.
pub const DAP_SGTL_SURROUND: u16 = 0x010A;
/// GEQ band 0 (115 Hz).
pub const DAP_AUDIO_EQ_BASS_BAND0: u16 = 0x0116;
/// GEQ band 1 (330 Hz).
pub const DAP_AUDIO_EQ_BAND1: u16 = 0x0118;
/// GEQ band 2 (990 Hz).
pub const DAP_AUDIO_EQ_BAND2: u16 = 0x011A;
/// GEQ band 3 (3 kHz).
pub const DAP_AUDIO_EQ_BAND3: u16 = 0x011C;
/// GEQ band 4 (9.9 kHz).
pub const DAP_AUDIO_EQ_TREBLE_BAND4: u16 = 0x011E;
/// Main channel volume into the DAP mixer.
pub const DAP_MAIN_CHAN: u16 = 0x0120;
/// Mix channel volume into the DAP mixer.
pub const DAP_MIX_CHAN: u16 = 0x0122;
/// Automatic volume control settings.
pub const DAP_AVC_CTRL: u16 = 0x0124;
/// AVC threshold.
pub const DAP_AVC_THRESHOLD: u16 = 0x0126;
/// AVC attack rate.
pub const DAP_AVC_ATTACK: u16 = 0x0128;
/// AVC decay rate.
pub const DAP_AVC_DECAY: u16 = 0x012A;

// ── Bitfields ────────────────────────────────────────────────────────────────

/// Merge `value` into `current` at `shift`, keeping every bit outside `mask`.
#[must_use]
pub fn merge(current: u16, mask: u16, shift: u8, value: u16) -> u16 {
    (current & !mask) | (value.wrapping_shl(u32::from(shift)) & mask)
}

/// One named bitfield inside a 16-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// Datasheet name
    pub name: &'static str,
    /// Register address
    pub reg: u16,
    /// Bits owned by the field, in register position
    pub mask: u16,
    /// Position of the least significant bit
    pub shift: u8,
}

impl Field {
    /// Declare a field.
    pub const fn new(name: &'static str, reg: u16, mask: u16, shift: u8) -> Self {
        Self {
            name,
            reg,
            mask,
            shift,
        }
    }

    /// Largest code the field can hold.
    pub fn max(self) -> u16 {
        self.mask.wrapping_shr(u32::from(self.shift))
    }

    /// Field code contained in a raw register value.
    pub fn extract(self, raw: u16) -> u16 {
        (raw & self.mask).wrapping_shr(u32::from(self.shift))
    }

    /// `raw` with the field replaced by `code`.
    pub fn insert(self, raw: u16, code: u16) -> u16 {
        merge(raw, self.mask, self.shift, code)
    }
}

/// Left and right lanes of one level held in a single register.
///
/// Both lanes have the same width. The driver always writes the same code to
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StereoField {
    /// Datasheet name of the level
    pub name: &'static str,
    /// Left lane
    pub left: Field,
    /// Right lane
    pub right: Field,
}

impl StereoField {
    /// Register both lanes live in.
    pub fn reg(self) -> u16 {
        self.left.reg
    }

    /// Bits owned by both lanes.
    pub fn mask(self) -> u16 {
        self.left.mask | self.right.mask
    }

    /// Largest code one lane can hold.
    pub fn max(self) -> u16 {
        self.left.max()
    }

    /// `(left, right)` codes in a raw register value.
    pub fn extract(self, raw: u16) -> (u16, u16) {
        (self.left.extract(raw), self.right.extract(raw))
    }

    /// `raw` with both lanes set to `code`.
    pub fn insert(self, raw: u16, code: u16) -> u16 {
        self.right.insert(self.left.insert(raw, code), code)
    }
}

/// CHIP_ID\[15:8\]
pub const PART_ID: Field = Field::new("PARTID", CHIP_ID, 0xFF00, 8);
/// CHIP_ID\[7:0\]
pub const REVISION_ID: Field = Field::new("REVID", CHIP_ID, 0x00FF, 0);

/// CHIP_DIG_POWER\[4\]
pub const DAP_POWERUP: Field = Field::new("DAP_POWERUP", CHIP_DIG_POWER, 0x0010, 4);

/// CHIP_CLK_CTRL\[3:2\]: 0 = 32 kHz, 1 = 44.1 kHz, 2 = 48 kHz, 3 = 96 kHz
pub const SYS_FS: Field = Field::new("SYS_FS", CHIP_CLK_CTRL, 0x000C, 2);
/// CHIP_CLK_CTRL\[1:0\]: 0 = 256·Fs, 1 = 384·Fs, 2 = 512·Fs, 3 = PLL
pub const MCLK_FREQ: Field = Field::new("MCLK_FREQ", CHIP_CLK_CTRL, 0x0003, 0);

/// CHIP_SSS_CTRL\[7:6\]: 0 = ADC, 1 = I2S_IN
pub const DAP_SELECT: Field = Field::new("DAP_SELECT", CHIP_SSS_CTRL, 0x00C0, 6);
/// CHIP_SSS_CTRL\[5:4\]: 0 = ADC, 1 = I2S_IN, 3 = DAP
pub const DAC_SELECT: Field = Field::new("DAC_SELECT", CHIP_SSS_CTRL, 0x0030, 4);

/// CHIP_ADCDAC_CTRL\[3:2\]: both DAC channels, 3 = muted
pub const DAC_MUTE: Field = Field::new("DAC_MUTE", CHIP_ADCDAC_CTRL, 0x000C, 2);

/// CHIP_ANA_CTRL\[8\]
pub const MUTE_LO: Field = Field::new("MUTE_LO", CHIP_ANA_CTRL, 0x0100, 8);
/// CHIP_ANA_CTRL\[6\]: 0 = DAC, 1 = LINEIN
pub const SELECT_HP: Field = Field::new("SELECT_HP", CHIP_ANA_CTRL, 0x0040, 6);
/// CHIP_ANA_CTRL\[4\]
pub const MUTE_HP: Field = Field::new("MUTE_HP", CHIP_ANA_CTRL, 0x0010, 4);
/// CHIP_ANA_CTRL\[2\]: 0 = microphone, 1 = LINEIN
pub const SELECT_ADC: Field = Field::new("SELECT_ADC", CHIP_ANA_CTRL, 0x0004, 2);
/// CHIP_ANA_CTRL\[0\]
pub const MUTE_ADC: Field = Field::new("MUTE_ADC", CHIP_ANA_CTRL, 0x0001, 0);

/// CHIP_ANA_POWER\[10\]
pub const PLL_POWERUP: Field = Field::new("PLL_POWERUP", CHIP_ANA_POWER, 0x0400, 10);
/// CHIP_ANA_POWER\[8\]
pub const VCOAMP_POWERUP: Field = Field::new("VCOAMP_POWERUP", CHIP_ANA_POWER, 0x0100, 8);

/// CHIP_PLL_CTRL\[15:11\]
pub const PLL_INT_DIVISOR: Field = Field::new("INT_DIVISOR", CHIP_PLL_CTRL, 0xF800, 11);
/// CHIP_PLL_CTRL\[10:0\]
pub const PLL_FRAC_DIVISOR: Field = Field::new("FRAC_DIVISOR", CHIP_PLL_CTRL, 0x07FF, 0);
/// CHIP_CLK_TOP_CTRL\[3\]
pub const INPUT_FREQ_DIV2: Field = Field::new("INPUT_FREQ_DIV2", CHIP_CLK_TOP_CTRL, 0x0008, 3);

/// CHIP_DAC_VOL: 0x3C = 0 dB, 0.5 dB steps down to 0xF0 = -90 dB
pub const DAC_VOLUME: StereoField = StereoField {
    name: "DAC_VOL",
    left: Field::new("DAC_VOL_LEFT", CHIP_DAC_VOL, 0x00FF, 0),
    right: Field::new("DAC_VOL_RIGHT", CHIP_DAC_VOL, 0xFF00, 8),
};

/// CHIP_ANA_HP_CTRL: 0x00 = +12 dB, 0.5 dB steps down to 0x7F = -51.5 dB
pub const HP_VOLUME: StereoField = StereoField {
    name: "HP_VOL",
    left: Field::new("HP_VOL_LEFT", CHIP_ANA_HP_CTRL, 0x007F, 0),
    right: Field::new("HP_VOL_RIGHT", CHIP_ANA_HP_CTRL, 0x7F00, 8),
};

/// CHIP_LINE_OUT_VOL, 0.5 dB steps
pub const LINE_OUT_VOLUME: StereoField = StereoField {
    name: "LO_VOL",
    left: Field::new("LO_VOL_LEFT", CHIP_LINE_OUT_VOL, 0x001F, 0),
    right: Field::new("LO_VOL_RIGHT", CHIP_LINE_OUT_VOL, 0x1F00, 8),
};

/// DAP_CTRL\[0\]
pub const DAP_EN: Field = Field::new("DAP_EN", DAP_CTRL, 0x0001, 0);
/// DAP_CTRL\[4\]
pub const DAP_MIX_EN: Field = Field::new("MIX_EN", DAP_CTRL, 0x0010, 4);

/// DAP_BASS_ENHANCE\[0\]
pub const BASS_EN: Field = Field::new("BASS_EN", DAP_BASS_ENHANCE, 0x0001, 0);
/// DAP_BASS_ENHANCE_CTRL\[13:8\]: 0x00 = +6 dB main channel, 0x3F = -88.5 dB
pub const BASS_LR_LEVEL: Field = Field::new("LR_LEVEL", DAP_BASS_ENHANCE_CTRL, 0x3F00, 8);
/// DAP_BASS_ENHANCE_CTRL\[6:0\]: 0x00 = most boost, 0x7F = least
pub const BASS_LEVEL: Field = Field::new("BASS_LEVEL", DAP_BASS_ENHANCE_CTRL, 0x007F, 0);

/// DAP_AUDIO_EQ\[1:0\]: 0 = off, 1 = PEQ, 2 = tone control, 3 = GEQ
pub const EQ_MODE: Field = Field::new("EN", DAP_AUDIO_EQ, 0x0003, 0);

/// DAP_SGTL_SURROUND\[6:4\]
pub const SURROUND_WIDTH: Field = Field::new("WIDTH_CONTROL", DAP_SGTL_SURROUND, 0x0070, 4);
/// DAP_SGTL_SURROUND\[1:0\]: 0/1 = off, 2 = mono, 3 = stereo
pub const SURROUND_SELECT: Field = Field::new("SELECT", DAP_SGTL_SURROUND, 0x0003, 0);

/// Five GEQ band volumes, lowest frequency first. 0x2F = 0 dB, 0.25 dB steps.
pub const GEQ_BANDS: [Field; 5] = [
    Field::new("BAND0", DAP_AUDIO_EQ_BASS_BAND0, 0x007F, 0),
    Field::new("BAND1", DAP_AUDIO_EQ_BAND1, 0x007F, 0),
    Field::new("BAND2", DAP_AUDIO_EQ_BAND2, 0x007F, 0),
    Field::new("BAND3", DAP_AUDIO_EQ_BAND3, 0x007F, 0),
    Field::new("BAND4", DAP_AUDIO_EQ_TREBLE_BAND4, 0x007F, 0),
];

/// DAP_AVC_CTRL\[0\]
pub const AVC_EN: Field = Field::new("AVC_EN", DAP_AVC_CTRL, 0x0001, 0);
/// DAP_AVC_CTRL\[5\]
pub const AVC_HARD_LIMIT_EN: Field = Field::new("HARD_LIMIT_EN", DAP_AVC_CTRL, 0x0020, 5);
/// DAP_AVC_CTRL\[9:8\]
pub const AVC_LBI_RESPONSE: Field = Field::new("LBI_RESPONSE", DAP_AVC_CTRL, 0x0300, 8);
/// DAP_AVC_CTRL\[13:12\]
pub const AVC_MAX_GAIN: Field = Field::new("MAX_GAIN", DAP_AVC_CTRL, 0x3000, 12);
/// DAP_AVC_ATTACK\[11:0\]
pub const AVC_ATTACK_RATE: Field = Field::new("ATTACK_RATE", DAP_AVC_ATTACK, 0x0FFF, 0);
/// DAP_AVC_DECAY\[11:0\]
pub const AVC_DECAY_RATE: Field = Field::new("DECAY_RATE", DAP_AVC_DECAY, 0x0FFF, 0);

// ── Register table ───────────────────────────────────────────────────────────

/// One row of the register table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterInfo {
    /// Datasheet name
    pub name: &'static str,
    /// Register address
    pub addr: u16,
    /// Power-on reset value
    pub reset: u16,
}

const fn row(name: &'static str, addr: u16, reset: u16) -> RegisterInfo {
    RegisterInfo { name, addr, reset }
}

/// Number of rows in [`REGISTER_MAP`].
pub const REGISTER_COUNT: usize = 39;

/// Every readable register in address order, with its power-on reset value.
///
/// The CHIP_ID reset value is the revision of the parts on the reference board.
pub const REGISTER_MAP: [RegisterInfo; REGISTER_COUNT] = [
    row("CHIP_ID", CHIP_ID, 0xA011),
    row("CHIP_DIG_POWER", CHIP_DIG_POWER, 0x0000),
    row("CHIP_CLK_CTRL", CHIP_CLK_CTRL, 0x0008),
    row("CHIP_I2S_CTRL", CHIP_I2S_CTRL, 0x0010),
    row("CHIP_SSS_CTRL", CHIP_SSS_CTRL, 0x0010),
    row("CHIP_ADCDAC_CTRL", CHIP_ADCDAC_CTRL, 0x020C),
    row("CHIP_DAC_VOL", CHIP_DAC_VOL, 0x3C3C),
    row("CHIP_PAD_STRENGTH", CHIP_PAD_STRENGTH, 0x015F),
    row("CHIP_ANA_ADC_CTRL", CHIP_ANA_ADC_CTRL, 0x0000),
    row("CHIP_ANA_HP_CTRL", CHIP_ANA_HP_CTRL, 0x1818),
    row("CHIP_ANA_CTRL", CHIP_ANA_CTRL, 0x0111),
    row("CHIP_LINREG_CTRL", CHIP_LINREG_CTRL, 0x0000),
    row("CHIP_REF_CTRL", CHIP_REF_CTRL, 0x0000),
    row("CHIP_MIC_CTRL", CHIP_MIC_CTRL, 0x0000),
    row("CHIP_LINE_OUT_CTRL", CHIP_LINE_OUT_CTRL, 0x0000),
    row("CHIP_LINE_OUT_VOL", CHIP_LINE_OUT_VOL, 0x0404),
    row("CHIP_ANA_POWER", CHIP_ANA_POWER, 0x7060),
    row("CHIP_PLL_CTRL", CHIP_PLL_CTRL, 0x5000),
    row("CHIP_CLK_TOP_CTRL", CHIP_CLK_TOP_CTRL, 0x0000),
    row("CHIP_ANA_STATUS", CHIP_ANA_STATUS, 0x0000),
    row("CHIP_ANA_TEST2", CHIP_ANA_TEST2, 0x0000),
    row("CHIP_SHORT_CTRL", CHIP_SHORT_CTRL, 0x0000),
    row("DAP_CTRL", DAP_CTRL, 0x0000),
    row("DAP_PEQ", DAP_PEQ, 0x0000),
    row("DAP_BASS_ENHANCE", DAP_BASS_ENHANCE, 0x0040),
    row("DAP_BASS_ENHANCE_CTRL", DAP_BASS_ENHANCE_CTRL, 0x051F),
    row("DAP_AUDIO_EQ", DAP_AUDIO_EQ, 0x0000),
    row("DAP_SGTL_SURROUND", DAP_SGTL_SURROUND, 0x0040),
    row("DAP_AUDIO_EQ_BASS_BAND0", DAP_AUDIO_EQ_BASS_BAND0, 0x002F),
    row("DAP_AUDIO_EQ_BAND1", DAP_AUDIO_EQ_BAND1, 0x002F),
    row("DAP_AUDIO_EQ_BAND2", DAP_AUDIO_EQ_BAND2, 0x002F),
    row("DAP_AUDIO_EQ_BAND3", DAP_AUDIO_EQ_BAND3, 0x002F),
    row("DAP_AUDIO_EQ_TREBLE_BAND4", DAP_AUDIO_EQ_TREBLE_BAND4, 0x002F),
    row("DAP_MAIN_CHAN", DAP_MAIN_CHAN, 0x8000),
    row("DAP_MIX_CHAN", DAP_MIX_CHAN, 0x0000),
    row("DAP_AVC_CTRL", DAP_AVC_CTRL, 0x5100),
    row("DAP_AVC_THRESHOLD", DAP_AVC_THRESHOLD, 0x1473),
    row("DAP_AVC_ATTACK", DAP_AVC_ATTACK, 0x0028),
    row("DAP_AVC_DECAY", DAP_AVC_DECAY, 0x0050),
];

/// Look up a register by address.
pub fn register_info(addr: u16) -> Option<&'static RegisterInfo> {
    REGISTER_MAP.iter().find(|r| r.addr == addr)
}

/// `(addr, reset)` pairs for seeding a simulated device.
pub fn reset_values() -> impl Iterator<Item = (u16, u16)> {
    REGISTER_MAP.iter().map(|r| (r.addr, r.reset))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_bits_outside_mask() {
        assert_eq!(merge(0xFFFF, 0x000C, 2, 0), 0xFFF3);
        assert_eq!(merge(0x0000, 0x000C, 2, 3), 0x000C);
        // value wider than the field is truncated by the mask
        assert_eq!(merge(0x0000, 0x000C, 2, 0xFF), 0x000C);
    }

    #[test]
    fn field_extract_insert() {
        assert_eq!(SYS_FS.extract(0x0008), 2);
        assert_eq!(SYS_FS.insert(0x0008, 1), 0x0004);
        assert_eq!(BASS_LR_LEVEL.max(), 0x3F);
        assert_eq!(BASS_LEVEL.max(), 0x7F);
        assert_eq!(PLL_INT_DIVISOR.max(), 0x1F);
    }

    #[test]
    fn stereo_field_writes_both_lanes() {
        assert_eq!(HP_VOLUME.insert(0x8080, 0x18), 0x9898);
        assert_eq!(HP_VOLUME.extract(0x1818), (0x18, 0x18));
        assert_eq!(DAC_VOLUME.mask(), 0xFFFF);
        assert_eq!(LINE_OUT_VOLUME.max(), 0x1F);
        assert_eq!(LINE_OUT_VOLUME.insert(0, 5), 0x0505);
    }

    #[test]
    fn register_map_addresses_are_unique_and_sorted() {
        for pair in REGISTER_MAP.windows(2) {
            assert!(pair[0].addr < pair[1].addr, "{} / {}", pair[0].name, pair[1].name);
        }
    }

    #[test]
    fn register_lookup() {
        assert_eq!(register_info(CHIP_ANA_CTRL).unwrap().reset, 0x0111);
        assert!(register_info(0x0FFE).is_none());
    }

    #[test]
    fn geq_bands_are_seven_bit() {
        for band in GEQ_BANDS {
            assert_eq!(band.max(), 0x7F);
            assert_eq!(register_info(band.reg).unwrap().reset, 0x002F);
        }
    }
}
