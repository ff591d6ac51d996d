//! SPI interface implementation built on top of `embedded-hal` `SpiBus` and `OutputPin`.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use super::Bgt60Interface;

/// Errors produced by [`SpiInterface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiInterfaceError<SpiE, CsE, RstE> {
    /// The SPI bus reported an error.
    Spi(SpiE),
    /// The chip select pin could not be driven.
    ChipSelect(CsE),
    /// The reset pin could not be driven.
    Reset(RstE),
}

/// SPI-based interface implementation for the BGT60TRxx driver.
///
/// Owns the bus exclusively together with the chip select and reset pins. The
/// reset line of these sensors is shared with a quad-SPI data line, so it must
/// only be driven low while chip select is released.
pub struct SpiInterface<SPI, CS, RST> {
    spi: SPI,
    cs: CS,
    rst: RST,
}

impl<SPI, CS, RST> SpiInterface<SPI, CS, RST> {
    /// Creates a new interface from the provided bus and control pins.
    pub const fn new(spi: SPI, cs: CS, rst: RST) -> Self {
        Self { spi, cs, rst }
    }

    /// Provides mutable access to the wrapped SPI bus.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned bus and pins.
    pub fn release(self) -> (SPI, CS, RST) {
        (self.spi, self.cs, self.rst)
    }
}

impl<SPI, CS, RST> Bgt60Interface for SpiInterface<SPI, CS, RST>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    RST: OutputPin,
{
    type Error = SpiInterfaceError<SPI::Error, CS::Error, RST::Error>;

    fn set_chip_select(&mut self, selected: bool) -> core::result::Result<(), Self::Error> {
        if selected {
            self.cs.set_low().map_err(SpiInterfaceError::ChipSelect)
        } else {
            // Release the line even if the bus failed to drain.
            let flushed = self.spi.flush().map_err(SpiInterfaceError::Spi);
            self.cs.set_high().map_err(SpiInterfaceError::ChipSelect)?;
            flushed
        }
    }

    fn set_reset(&mut self, high: bool) -> core::result::Result<(), Self::Error> {
        if high {
            self.rst.set_high().map_err(SpiInterfaceError::Reset)
        } else {
            self.rst.set_low().map_err(SpiInterfaceError::Reset)
        }
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> core::result::Result<(), Self::Error> {
        self.spi.transfer(read, write).map_err(SpiInterfaceError::Spi)
    }

    fn write(&mut self, data: &[u8]) -> core::result::Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }

        self.spi.write(data).map_err(SpiInterfaceError::Spi)
    }

    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        self.spi.read(buf).map_err(SpiInterfaceError::Spi)
    }
}
