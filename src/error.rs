//! Error handling primitives for the BGT60TRxx driver.

use crate::params::ResetKind;
use crate::registers::Gsr0;

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// The `CHIP_ID` register did not match any supported device variant.
    UnknownDevice {
        /// Raw 24-bit `CHIP_ID` value read from the sensor.
        chip_id: u32,
    },
    /// The reset bit was still set after the configured number of polls.
    ResetTimeout(ResetKind),
    /// The status word of a FIFO burst read reported an error; no payload was read.
    FifoStatus(Gsr0),
    /// The provided configuration parameters are invalid.
    InvalidConfig,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}
