//! Device identification.
//!
//! All BGT60TRxx parts share one register protocol and differ in where their
//! FIFO lives and how deep it is. The variant is resolved once from
//! `CHIP_ID` during initialization.

use crate::params::DeviceVariant;
use crate::registers::{
    ChipId, REG_FIFO_TR13C, REG_FIFO_UTR11, REG_FIFO_UTR13D, REG_FSTAT_TR13C, REG_FSTAT_UTR11,
    REG_FSTAT_UTR13D,
};

/// Device-specific constants of a resolved variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceType {
    /// Variant tag.
    pub variant: DeviceVariant,
    /// Address of the `FIFO` data register.
    pub fifo_address: u8,
    /// Address of the `FSTAT` FIFO status register.
    pub fstat_address: u8,
    /// FIFO capacity in 24-bit words.
    pub fifo_capacity: u16,
}

impl DeviceType {
    /// Returns the constants of `variant`.
    pub const fn of(variant: DeviceVariant) -> Self {
        match variant {
            DeviceVariant::Bgt60Tr13c => Self {
                variant,
                fifo_address: REG_FIFO_TR13C,
                fstat_address: REG_FSTAT_TR13C,
                fifo_capacity: 8192,
            },
            DeviceVariant::Bgt60Utr13d => Self {
                variant,
                fifo_address: REG_FIFO_UTR13D,
                fstat_address: REG_FSTAT_UTR13D,
                fifo_capacity: 8192,
            },
            DeviceVariant::Bgt60Utr11 => Self {
                variant,
                fifo_address: REG_FIFO_UTR11,
                fstat_address: REG_FSTAT_UTR11,
                fifo_capacity: 2048,
            },
        }
    }

    /// Largest number of samples the FIFO can hold (two per word).
    pub const fn max_samples(&self) -> usize {
        self.fifo_capacity as usize * 2
    }
}

/// Recognised `(digital ID, RF IDs)` combinations.
const CHIP_ID_TABLE: [(u16, &[u8], DeviceVariant); 4] = [
    (3, &[3], DeviceVariant::Bgt60Tr13c),
    (6, &[6, 11], DeviceVariant::Bgt60Utr13d),
    (7, &[7, 9, 12], DeviceVariant::Bgt60Utr11),
    (8, &[12], DeviceVariant::Bgt60Utr11),
];

/// Maps a raw `CHIP_ID` register value to a supported variant.
///
/// Returns `None` for unknown parts.
pub fn resolve(chip_id: u32) -> Option<DeviceVariant> {
    let id = ChipId::from(chip_id);
    let digital_id = id.digital_id();
    let rf_id = id.rf_id();

    CHIP_ID_TABLE
        .iter()
        .find(|(digital, rf_ids, _)| *digital == digital_id && rf_ids.contains(&rf_id))
        .map(|&(_, _, variant)| variant)
}
