//! Driver error types.

use core::fmt;

use crate::init::Stage;

/// A bring-up configuration the codec cannot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// 24- and 32-bit samples need a 64·Fs bit clock.
    SampleLengthNeeds64Fs {
        /// Requested sample length in bits
        bits: u8,
    },
    /// PLL reference clock outside the 8–27 MHz the PLL accepts.
    PllInputOutOfRange {
        /// Requested MCLK frequency
        mclk_hz: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SampleLengthNeeds64Fs { bits } => {
                write!(f, "{bits}-bit samples need a 64*Fs bit clock")
            }
            Self::PllInputOutOfRange { mclk_hz } => {
                write!(f, "PLL input clock {mclk_hz} Hz outside 8-27 MHz")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Error returned by every driver operation. `E` is the bus error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The bus reported a failed transaction.
    Transport(E),
    /// A verified write read back a different value.
    VerifyMismatch {
        /// Register address
        register: u16,
        /// Value written
        expected: u16,
        /// Value read back
        observed: u16,
    },
    /// The configuration was rejected before any bus traffic.
    InvalidConfig(ConfigError),
}

impl<E> From<ConfigError> for Error<E> {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "bus transaction failed: {e:?}"),
            Self::VerifyMismatch {
                register,
                expected,
                observed,
            } => write!(
                f,
                "register {register:#06x}: wrote {expected:#06x}, read back {observed:#06x}"
            ),
            Self::InvalidConfig(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

/// Bring-up failure: the stage being entered and what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitError<E> {
    /// Stage whose transition failed
    pub stage: Stage,
    /// Underlying error
    pub error: Error<E>,
}

impl<E: fmt::Debug> fmt::Display for InitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bring-up halted entering {:?}: {}", self.stage, self.error)
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for InitError<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_registers_as_hex() {
        let e: Error<()> = Error::VerifyMismatch {
            register: 0x0024,
            expected: 0x0111,
            observed: 0x0101,
        };
        assert_eq!(
            e.to_string(),
            "register 0x0024: wrote 0x0111, read back 0x0101"
        );
    }

    #[test]
    fn init_error_names_the_stage() {
        let e: InitError<()> = InitError {
            stage: Stage::ClockConfigured,
            error: Error::Transport(()),
        };
        assert_eq!(
            e.to_string(),
            "bring-up halted entering ClockConfigured: bus transaction failed: ()"
        );
    }

    #[test]
    fn config_error_converts() {
        let e: Error<()> = ConfigError::SampleLengthNeeds64Fs { bits: 24 }.into();
        assert_eq!(e, Error::InvalidConfig(ConfigError::SampleLengthNeeds64Fs { bits: 24 }));
    }
}
