//! Bus interface abstraction for the BGT60TRxx driver.

pub mod spi;

#[cfg(test)]
pub(crate) mod sim;

use crate::codec;
use crate::error::{Error, Result};

/// Abstraction over the platform bus and control lines required by the driver.
///
/// Chip select is driven explicitly and stays asserted across consecutive
/// `transfer`/`write`/`read` calls, so that a burst can be inspected and
/// aborted halfway through.
pub trait Bgt60Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Drives the chip select line; `true` selects the device (line low).
    fn set_chip_select(&mut self, selected: bool) -> core::result::Result<(), Self::Error>;

    /// Drives the reset line level; `true` is the idle (high) level.
    fn set_reset(&mut self, high: bool) -> core::result::Result<(), Self::Error>;

    /// Full-duplex transfer; `read` and `write` have the same length.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Clocks out `data`, discarding whatever the device returns.
    fn write(&mut self, data: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Clocks in `buf.len()` bytes.
    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;
}

impl<T> Bgt60Interface for &mut T
where
    T: Bgt60Interface + ?Sized,
{
    type Error = T::Error;

    fn set_chip_select(&mut self, selected: bool) -> core::result::Result<(), Self::Error> {
        T::set_chip_select(self, selected)
    }

    fn set_reset(&mut self, high: bool) -> core::result::Result<(), Self::Error> {
        T::set_reset(self, high)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> core::result::Result<(), Self::Error> {
        T::transfer(self, read, write)
    }

    fn write(&mut self, data: &[u8]) -> core::result::Result<(), Self::Error> {
        T::write(self, data)
    }

    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        T::read(self, buf)
    }
}

/// Runs `op` with chip select asserted and always releases the line afterwards.
///
/// An error from `op` takes precedence over an error while deselecting.
pub(crate) fn with_selected<IFACE, R, F>(interface: &mut IFACE, op: F) -> Result<R, IFACE::Error>
where
    IFACE: Bgt60Interface,
    F: FnOnce(&mut IFACE) -> Result<R, IFACE::Error>,
{
    if let Err(err) = interface.set_chip_select(true) {
        let _ = interface.set_chip_select(false);
        return Err(Error::Interface(err));
    }

    let result = op(interface);
    let released = interface.set_chip_select(false);
    let value = result?;
    released?;
    Ok(value)
}

/// Reads the 24-bit contents of register `address`.
pub(crate) fn read_register<IFACE>(interface: &mut IFACE, address: u8) -> Result<u32, IFACE::Error>
where
    IFACE: Bgt60Interface,
{
    let request = codec::to_wire(codec::encode_read_addr(address));
    let mut reply = [0u8; codec::FRAME_LEN];
    with_selected(interface, |iface| {
        iface.transfer(&mut reply, &request)?;
        Ok(())
    })?;
    Ok(codec::decode_read_result(codec::from_wire(reply)))
}

/// Writes `data` to register `address`; the reply is not inspected.
pub(crate) fn write_register<IFACE>(
    interface: &mut IFACE,
    address: u8,
    data: u32,
) -> Result<(), IFACE::Error>
where
    IFACE: Bgt60Interface,
{
    let frame = codec::to_wire(codec::encode_write(address, data));
    with_selected(interface, |iface| {
        iface.write(&frame)?;
        Ok(())
    })
}
