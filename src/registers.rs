//! Register map definitions for the BGT60TRxx radar sensors.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::ResetKind;

/// Register address of `MAIN`.
pub const REG_MAIN: u8 = 0x00;
/// Register address of `CHIP_ID`.
pub const REG_CHIP_ID: u8 = 0x02;
/// Register address of `SFCTL`.
pub const REG_SFCTL: u8 = 0x06;
/// Register address of `FSTAT` on the BGT60TR13C.
pub const REG_FSTAT_TR13C: u8 = 0x5F;
/// Register address of `FIFO` on the BGT60TR13C.
pub const REG_FIFO_TR13C: u8 = 0x60;
/// Register address of `FSTAT` on the BGT60UTR13D.
pub const REG_FSTAT_UTR13D: u8 = 0x5F;
/// Register address of `FIFO` on the BGT60UTR13D.
pub const REG_FIFO_UTR13D: u8 = 0x60;
/// Register address of `FSTAT` on the BGT60UTR11.
pub const REG_FSTAT_UTR11: u8 = 0x63;
/// Register address of `FIFO` on the BGT60UTR11.
pub const REG_FIFO_UTR11: u8 = 0x64;

/// Bit position of the `MAIN.FRAME_START` flag.
pub const MAIN_FRAME_START_POS: u32 = 0;
/// Mask of the `MAIN.FRAME_START` flag.
pub const MAIN_FRAME_START_MSK: u32 = 0b1 << MAIN_FRAME_START_POS;
/// Bit position of the `MAIN.RESET` field.
pub const MAIN_RESET_POS: u32 = 1;
/// Mask of the `MAIN.RESET` field.
pub const MAIN_RESET_MSK: u32 = 0b111 << MAIN_RESET_POS;

/// Bit position of the `SFCTL.FIFO_CREF` threshold field.
pub const SFCTL_FIFO_CREF_POS: u32 = 0;
/// Mask of the `SFCTL.FIFO_CREF` threshold field.
pub const SFCTL_FIFO_CREF_MSK: u32 = 0x1FFF << SFCTL_FIFO_CREF_POS;
/// Mask of the `SFCTL.FIFO_LP_MODE` flag.
pub const SFCTL_FIFO_LP_MODE_MSK: u32 = 0x00_2000;
/// Mask of the `SFCTL.MISO_HS_READ` flag.
pub const SFCTL_MISO_HS_READ_MSK: u32 = 0x01_0000;
/// Mask of the `SFCTL.LFSR_EN` flag.
pub const SFCTL_LFSR_EN_MSK: u32 = 0x02_0000;
/// Mask of the `SFCTL.PREFIX_EN` flag.
pub const SFCTL_PREFIX_EN_MSK: u32 = 0x04_0000;

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Read/write register.
    ReadWrite,
}

/// Minimal metadata exposed by every fixed-address register value type.
pub trait Register: Copy + From<u32> + Into<u32> {
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
}

// All 24-bit registers share the same little-endian byte packing.
macro_rules! impl_word_conversions {
    ($($name:ident),* $(,)?) => {
        $(
            impl From<u32> for $name {
                fn from(value: u32) -> Self {
                    let [b0, b1, b2, _] = value.to_le_bytes();
                    Self::from_bytes([b0, b1, b2])
                }
            }

            impl From<$name> for u32 {
                fn from(value: $name) -> Self {
                    let [b0, b1, b2] = value.into_bytes();
                    u32::from_le_bytes([b0, b1, b2, 0])
                }
            }
        )*
    };
}

/// Bitfield representation of the `MAIN` register (address `0x00`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Main {
    // Starts frame generation (bit 0).
    pub frame_start: bool,
    // Software reset request, self-clearing (bit 1).
    pub sw_reset: bool,
    // FSM reset request, self-clearing (bit 2).
    pub fsm_reset: bool,
    // FIFO reset request, self-clearing (bit 3).
    pub fifo_reset: bool,
    #[skip]
    __: B20,
}

/// Bitfield representation of the `CHIP_ID` register (address `0x02`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipId {
    // RF front-end identifier (bits 7:0).
    pub rf_id: B8,
    // Digital block identifier (bits 23:8).
    pub digital_id: B16,
}

/// Bitfield representation of the `SFCTL` register (address `0x06`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sfctl {
    // FIFO fill threshold in words minus one (bits 12:0).
    pub fifo_cref: B13,
    // FIFO low-power mode (bit 13).
    pub fifo_lp_mode: bool,
    #[skip]
    __: B2,
    // High-speed MISO read timing (bit 16).
    pub miso_hs_read: bool,
    // LFSR test pattern replaces ADC data (bit 17).
    pub lfsr_en: bool,
    // Prefix word inserted in front of each burst (bit 18).
    pub prefix_en: bool,
    #[skip]
    __: B5,
}

/// Bitfield representation of the `FSTAT` register (variant-specific address).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fstat {
    // Number of 24-bit words stored in the FIFO (bits 13:0).
    pub fill_status: B14,
    #[skip]
    __: B3,
    // SPI clock count was not a multiple of the word size (bit 17).
    pub clk_num_err: bool,
    // SPI burst protocol error (bit 18).
    pub spi_burst_err: bool,
    // FIFO underflow (bit 19).
    pub fuf_err: bool,
    // FIFO empty (bit 20).
    pub empty: bool,
    // Fill level reached the `SFCTL.FIFO_CREF` threshold (bit 21).
    pub cref: bool,
    // FIFO full (bit 22).
    pub full: bool,
    // FIFO overflow (bit 23).
    pub fof_err: bool,
}

impl_word_conversions!(Main, ChipId, Sfctl, Fstat);

impl Main {
    /// Sets the `RESET` bit that triggers `kind`.
    pub fn request_reset(&mut self, kind: ResetKind) {
        match kind {
            ResetKind::Software => self.set_sw_reset(true),
            ResetKind::Fsm => self.set_fsm_reset(true),
            ResetKind::Fifo => self.set_fifo_reset(true),
        }
    }

    /// Returns `true` while the reset selected by `kind` is still in progress.
    pub fn is_reset_pending(&self, kind: ResetKind) -> bool {
        match kind {
            ResetKind::Software => self.sw_reset(),
            ResetKind::Fsm => self.fsm_reset(),
            ResetKind::Fifo => self.fifo_reset(),
        }
    }
}

/// Bitfield representation of the `GSR0` global status nibble.
///
/// The sensor shifts `GSR0` out in the first byte of every SPI transfer.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gsr0 {
    // FIFO overflow or underflow (bit 0).
    pub fou_err: bool,
    // High-speed MISO timing is active (bit 1).
    pub miso_hs_read: bool,
    // SPI burst protocol error (bit 2).
    pub spi_burst_err: bool,
    // SPI clock count error (bit 3).
    pub clk_num_err: bool,
    #[skip]
    __: B4,
}

impl Gsr0 {
    /// Returns `true` when any flag that invalidates burst payload data is set.
    pub fn has_error(self) -> bool {
        self.fou_err() || self.spi_burst_err() || self.clk_num_err()
    }
}

impl From<u8> for Gsr0 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Gsr0> for u8 {
    fn from(value: Gsr0) -> Self {
        value.into_bytes()[0]
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Gsr0 {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Gsr0 {{ FOU_ERR: {}, MISO_HS_READ: {}, SPI_BURST_ERR: {}, CLK_NUM_ERR: {} }}",
            self.fou_err(),
            self.miso_hs_read(),
            self.spi_burst_err(),
            self.clk_num_err()
        );
    }
}

impl Register for Main {
    const ADDRESS: u8 = REG_MAIN;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
}

impl Register for ChipId {
    const ADDRESS: u8 = REG_CHIP_ID;
    const ACCESS: RegisterAccess = RegisterAccess::ReadOnly;
}

impl Register for Sfctl {
    const ADDRESS: u8 = REG_SFCTL;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
}
