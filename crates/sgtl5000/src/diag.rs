//! Chip identification and register dumps.

use embedded_hal::delay::DelayNs;
use platform::RegisterBus;

use crate::error::Error;
use crate::registers::{RegisterInfo, CHIP_ID, PART_ID_SGTL5000, REGISTER_COUNT, REGISTER_MAP};
use crate::Sgtl5000;

/// Contents of CHIP_ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipId {
    /// Part id, 0xA0 for the SGTL5000
    pub part: u8,
    /// Silicon revision
    pub revision: u8,
}

impl ChipId {
    /// Decode a raw CHIP_ID value: PARTID\[15:8\], REVID\[7:0\].
    pub fn from_raw(raw: u16) -> Self {
        let [part, revision] = raw.to_be_bytes();
        Self { part, revision }
    }

    /// `true` for an SGTL5000.
    pub fn is_sgtl5000(self) -> bool {
        u16::from(self.part) == PART_ID_SGTL5000
    }
}

/// One register and the value read from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterValue {
    /// Table row
    pub info: RegisterInfo,
    /// Value read
    pub value: u16,
}

impl RegisterValue {
    /// Value differs from the power-on reset value.
    pub fn is_modified(&self) -> bool {
        self.value != self.info.reset
    }
}

/// Every register in the table with its current value.
pub type RegisterDump = heapless::Vec<RegisterValue, REGISTER_COUNT>;

impl<B: RegisterBus, D: DelayNs> Sgtl5000<B, D> {
    /// Read CHIP_ID.
    pub fn read_chip_id(&mut self) -> Result<ChipId, Error<B::Error>> {
        let id = ChipId::from_raw(self.regs.read(CHIP_ID)?);
        info!("chip id {:#x} rev {:#x}", id.part, id.revision);
        Ok(id)
    }

    /// Read every register in the table, stopping at the first failure.
    pub fn dump_registers(&mut self) -> Result<RegisterDump, Error<B::Error>> {
        let mut dump = RegisterDump::new();
        for info in REGISTER_MAP {
            let value = self.regs.read(info.addr)?;
            debug!("{} {:#x} = {:#x}", info.name, info.addr, value);
            // capacity equals the table length
            let _ = dump.push(RegisterValue { info, value });
        }
        Ok(dump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chip_id_decodes_part_and_revision() {
        let id = ChipId::from_raw(0xA011);
        assert_eq!(id, ChipId { part: 0xA0, revision: 0x11 });
        assert!(id.is_sgtl5000());
        assert!(!ChipId::from_raw(0x1234).is_sgtl5000());
    }
}
