//! SPI frame codec.
//!
//! Every register access is a single 32-bit frame shifted out MSB first:
//!
//! | bits  | 31..25  | 24 | 23..0 |
//! |-------|---------|----|-------|
//! | field | address | WR | data  |
//!
//! The device answers in the same transfer with `GSR0` in the top byte and, for
//! reads, the register contents in the low 24 bits. FIFO bursts use a separate
//! command frame introduced by an all-ones marker byte.
//!
//! Frames are plain `u32` values in host order. [`to_wire`] and [`from_wire`]
//! are the only places where the host word meets the big-endian bus order.

/// Register-access frame: write operation flag.
pub const WR_OP_MSK: u32 = 1 << WR_OP_POS;
/// Register-access frame: write operation flag position.
pub const WR_OP_POS: u32 = 24;
/// Register-access frame: register address mask.
pub const REGADR_MSK: u32 = 0xFE00_0000;
/// Register-access frame: register address position.
pub const REGADR_POS: u32 = 25;
/// Register-access frame: 24-bit data payload mask.
pub const DATA_MSK: u32 = 0x00FF_FFFF;
/// Reply frame: `GSR0` status nibble mask.
pub const GSR0_MSK: u32 = 0x0F00_0000;
/// Reply frame: `GSR0` status nibble position.
pub const GSR0_POS: u32 = 24;

/// Burst frame: command marker occupying the top byte.
pub const BURST_MODE_CMD: u32 = 0xFF00_0000;
/// Burst frame: start address mask.
pub const BURST_SADR_MSK: u32 = 0x00FE_0000;
/// Burst frame: start address position.
pub const BURST_SADR_POS: u32 = 17;
/// Burst frame: read/write selector mask (set for writes).
pub const BURST_RWB_MSK: u32 = 0x0001_0000;
/// Burst frame: burst length mask.
pub const BURST_LEN_MSK: u32 = 0x7F << BURST_LEN_POS;
/// Burst frame: burst length position.
pub const BURST_LEN_POS: u32 = 9;

/// Largest register address representable in a frame.
pub const MAX_ADDRESS: u8 = 0x7F;

/// Number of bytes in one register-access frame.
pub const FRAME_LEN: usize = 4;

/// Builds the frame writing `data` to register `address`.
///
/// The address is truncated to 7 bits and the data to 24 bits.
pub const fn encode_write(address: u8, data: u32) -> u32 {
    encode_read_addr(address) | WR_OP_MSK | (data & DATA_MSK)
}

/// Builds the frame requesting the contents of register `address`.
pub const fn encode_read_addr(address: u8) -> u32 {
    ((address as u32) << REGADR_POS) & REGADR_MSK
}

/// Extracts the 24-bit register contents from a reply frame.
pub const fn decode_read_result(raw: u32) -> u32 {
    raw & DATA_MSK
}

/// Extracts the register address from a frame.
pub const fn decode_address(raw: u32) -> u8 {
    ((raw & REGADR_MSK) >> REGADR_POS) as u8
}

/// Returns `true` when the frame carries the write operation flag.
pub const fn is_write(raw: u32) -> bool {
    raw & WR_OP_MSK != 0
}

/// Extracts the `GSR0` status nibble from a reply frame.
pub const fn decode_gsr0(raw: u32) -> u8 {
    ((raw & GSR0_MSK) >> GSR0_POS) as u8
}

/// Builds the burst command reading from `start_address` onwards.
///
/// The length field is left at zero (unbounded burst). The number of words
/// transferred is set by how long chip select stays asserted.
pub const fn encode_burst_read(start_address: u8) -> u32 {
    BURST_MODE_CMD | (((start_address as u32) << BURST_SADR_POS) & BURST_SADR_MSK)
}

/// Converts a host-order frame into bus byte order.
#[inline]
pub const fn to_wire(frame: u32) -> [u8; FRAME_LEN] {
    frame.to_be_bytes()
}

/// Converts bytes received from the bus into a host-order frame.
#[inline]
pub const fn from_wire(bytes: [u8; FRAME_LEN]) -> u32 {
    u32::from_be_bytes(bytes)
}
