//! Strongly typed parameter enumerations for the BGT60TRxx driver.
//!
//! These enums map directly to register field encodings and are used across
//! [`Config`](crate::config::Config) and the high-level driver APIs. Prefer these
//! types over raw integers to keep values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use bgt60trxx::params::{ResetKind, SpeedMode};
//!
//! let speed = SpeedMode::HighSpeed;
//! assert!(speed.is_high_speed());
//! assert_eq!(ResetKind::Fifo.mask(), 0x08);
//! ```

use crate::registers::MAIN_RESET_POS;

/// SPI MISO timing selected through `SFCTL.MISO_HS_READ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpeedMode {
    /// MISO is driven on the falling clock edge (bus clock up to 25 MHz).
    #[default]
    Normal,
    /// MISO is driven on the rising clock edge (bus clock above 25 MHz).
    HighSpeed,
}

impl SpeedMode {
    /// Returns `true` when the high-speed read timing is selected.
    pub const fn is_high_speed(self) -> bool {
        matches!(self, Self::HighSpeed)
    }
}

impl From<bool> for SpeedMode {
    fn from(high_speed: bool) -> Self {
        if high_speed {
            Self::HighSpeed
        } else {
            Self::Normal
        }
    }
}

/// Reset scopes of the `MAIN.RESET` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetKind {
    /// Software reset (`MAIN` bit 1).
    ///
    /// Resets all registers to their default state and all internal counters
    /// (shape, frame), then performs a FIFO reset and an FSM reset.
    Software,
    /// FSM reset (`MAIN` bit 2).
    ///
    /// Returns the frame state machine to deep sleep and clears its channel
    /// set, shape set and timer counters.
    Fsm,
    /// FIFO reset (`MAIN` bit 3).
    ///
    /// Clears the FIFO read and write pointers and implies an FSM reset.
    Fifo,
}

impl ResetKind {
    /// Returns the `MAIN` register bit that triggers this reset.
    pub const fn mask(self) -> u32 {
        let field = match self {
            Self::Software => 0b001,
            Self::Fsm => 0b010,
            Self::Fifo => 0b100,
        };
        field << MAIN_RESET_POS
    }
}

/// Supported BGT60TRxx device variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceVariant {
    /// BGT60TR13C.
    Bgt60Tr13c,
    /// BGT60UTR13D.
    Bgt60Utr13d,
    /// BGT60UTR11.
    Bgt60Utr11,
}

impl DeviceVariant {
    /// All supported variants, in table order.
    pub const ALL: [Self; 3] = [Self::Bgt60Tr13c, Self::Bgt60Utr13d, Self::Bgt60Utr11];

    /// Returns the marketing name of the variant.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bgt60Tr13c => "BGT60TR13C",
            Self::Bgt60Utr13d => "BGT60UTR13D",
            Self::Bgt60Utr11 => "BGT60UTR11",
        }
    }
}
