//! Register-code newtypes.
//!
//! Every gain-like input is clamped into its field's legal range on
//! construction, so an out-of-range request never reaches a register:
//! - `EqGainDb`: GEQ band gain, -12..=+12 dB
//! - `HeadphoneVolume`, `DacVolume`, `LineOutVolume`: output level codes
//! - `BassLevel`, `LrLevel`: bass enhancement levels
//! - `SurroundWidth`: surround width 0..=7
//!
//! Each type converts from its raw integer with `From`, which clamps.
//! `try_new` is the strict variant.

use platform::OutOfRangeError;

// ── EqGainDb ─────────────────────────────────────────────────────────────────

/// GEQ band gain in whole dB, clamped to -12..=+12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct EqGainDb(i8);

impl EqGainDb {
    /// Lowest band gain.
    pub const MIN_DB: i8 = -12;
    /// Highest band gain.
    pub const MAX_DB: i8 = 12;
    /// Band code for 0 dB.
    pub const FLAT_CODE: u16 = 0x2F;

    /// Create a gain, clamping to -12..=+12 dB.
    #[must_use]
    pub fn new(db: i8) -> Self {
        Self(db.clamp(Self::MIN_DB, Self::MAX_DB))
    }

    /// Create a gain, returning an error outside -12..=+12 dB.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] (bounds shown as two's complement `u32`)
    /// when `db` is out of range.
    #[allow(clippy::cast_sign_loss)]
    pub fn try_new(db: i8) -> Result<Self, OutOfRangeError> {
        if (Self::MIN_DB..=Self::MAX_DB).contains(&db) {
            Ok(Self(db))
        } else {
            Err(OutOfRangeError {
                value: i32::from(db) as u32,
                min: i32::from(Self::MIN_DB) as u32,
                max: i32::from(Self::MAX_DB) as u32,
            })
        }
    }

    /// Gain in dB.
    #[must_use]
    pub fn get(self) -> i8 {
        self.0
    }

    /// 7-bit band code: `0x2F + db * 4`, 0x00 at -12 dB, 0x5F at +12 dB.
    #[must_use]
    pub fn code(self) -> u16 {
        let code = i16::from(self.0)
            .saturating_mul(4)
            .saturating_add(0x2F);
        u16::try_from(code).unwrap_or(0)
    }
}

impl From<i8> for EqGainDb {
    fn from(db: i8) -> Self {
        Self::new(db)
    }
}

/// Band code for a gain in dB, clamped to -12..=+12 first.
#[must_use]
pub fn geq_code_from_db(db: i8) -> u16 {
    EqGainDb::new(db).code()
}

// ── Unsigned level codes ─────────────────────────────────────────────────────

macro_rules! level_code {
    ($(#[$doc:meta])* $name:ident, $min:expr, $max:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(transparent)]
        pub struct $name(u8);

        impl $name {
            /// Smallest legal code.
            pub const MIN_CODE: u8 = $min;
            /// Largest legal code.
            pub const MAX_CODE: u8 = $max;

            /// Create a code, clamping into the legal range.
            #[must_use]
            pub fn new(code: u8) -> Self {
                Self(code.clamp(Self::MIN_CODE, Self::MAX_CODE))
            }

            /// Create a code, returning an error outside the legal range.
            ///
            /// # Errors
            ///
            /// Returns [`OutOfRangeError`] when `code` is out of range.
            pub fn try_new(code: u8) -> Result<Self, OutOfRangeError> {
                if (Self::MIN_CODE..=Self::MAX_CODE).contains(&code) {
                    Ok(Self(code))
                } else {
                    Err(OutOfRangeError {
                        value: u32::from(code),
                        min: u32::from(Self::MIN_CODE),
                        max: u32::from(Self::MAX_CODE),
                    })
                }
            }

            /// Raw code.
            #[must_use]
            pub fn get(self) -> u8 {
                self.0
            }

            /// Raw code widened for register arithmetic.
            #[must_use]
            pub fn code(self) -> u16 {
                u16::from(self.0)
            }
        }

        impl From<u8> for $name {
            fn from(code: u8) -> Self {
                Self::new(code)
            }
        }
    };
}

level_code!(
    /// Headphone amplifier volume code: 0x00 = +12 dB, 0x7F = -51.5 dB.
    HeadphoneVolume, 0x00, 0x7F
);
level_code!(
    /// DAC digital volume code: 0x3C = 0 dB, 0xF0 = -90 dB.
    DacVolume, 0x3C, 0xF0
);
level_code!(
    /// Line output volume code, 5 bits.
    LineOutVolume, 0x00, 0x1F
);
level_code!(
    /// Bass enhancement boost level: 0x00 = most boost, 0x7F = least.
    BassLevel, 0x00, 0x7F
);
level_code!(
    /// Bass enhancement main-channel level, 6 bits.
    LrLevel, 0x00, 0x3F
);
level_code!(
    /// Surround width, 0 (narrow) to 7 (widest).
    SurroundWidth, 0, 7
);

impl HeadphoneVolume {
    /// Loudest setting, +12 dB.
    pub const MAX_GAIN: Self = Self(0x00);
    /// 0 dB.
    pub const ZERO_DB: Self = Self(0x18);
    /// Quietest setting, -51.5 dB.
    pub const MIN_GAIN: Self = Self(0x7F);
}

impl Default for HeadphoneVolume {
    fn default() -> Self {
        Self::ZERO_DB
    }
}

impl DacVolume {
    /// 0 dB.
    pub const ZERO_DB: Self = Self(0x3C);
    /// -90 dB.
    pub const MIN_GAIN: Self = Self(0xF0);
}

impl LineOutVolume {
    /// Level the bring-up sequence writes to both lanes.
    pub const BRING_UP: Self = Self(0x05);
}

impl BassLevel {
    /// Least boost; bass enhancement is switched at this level.
    pub const LEAST: Self = Self(0x7F);
    /// Default boost used by the command layer.
    pub const DEFAULT: Self = Self(0x1F);
}

impl LrLevel {
    /// Default main-channel level used by the command layer.
    pub const DEFAULT: Self = Self(0x05);
}

impl SurroundWidth {
    /// Default width used by the command layer.
    pub const DEFAULT: Self = Self(4);
}
