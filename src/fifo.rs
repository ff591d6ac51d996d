//! FIFO streaming.
//!
//! The FIFO is drained with a single burst transaction: a 4-byte burst command
//! whose reply carries `GSR0`, followed by the payload. Each 24-bit FIFO word
//! packs two 12-bit ADC samples, most significant sample first.

use crate::codec;
use crate::error::{Error, Result};
use crate::identity::DeviceType;
use crate::interface::{self, Bgt60Interface};
use crate::registers::{Fstat, Gsr0};

/// Bytes per FIFO word.
pub const FIFO_WORD_BYTES: usize = 3;
/// Samples per FIFO word.
pub const SAMPLES_PER_WORD: usize = 2;
/// Length of the burst header (command on MOSI, `GSR0` on MISO).
pub const BURST_HEADER_BYTES: usize = codec::FRAME_LEN;

// Payload is staged on the stack in chunks of this many FIFO words.
const CHUNK_WORDS: usize = 64;

/// Decoded view of the `FSTAT` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoStatus {
    /// Number of words currently stored.
    pub fill_level: u16,
    /// FIFO is empty.
    pub empty: bool,
    /// FIFO is full.
    pub full: bool,
    /// Fill level reached the configured limit.
    pub limit_reached: bool,
    /// Data was lost because the FIFO was full.
    pub overflow: bool,
    /// A burst read past the end of the FIFO.
    pub underflow: bool,
    /// SPI burst protocol error.
    pub spi_burst_error: bool,
    /// SPI clock count was not a multiple of the FIFO word size.
    pub clock_count_error: bool,
}

impl FifoStatus {
    /// Builds a snapshot from the raw `FSTAT` bitfield.
    pub fn from_register(fstat: Fstat) -> Self {
        Self {
            fill_level: fstat.fill_status(),
            empty: fstat.empty(),
            full: fstat.full(),
            limit_reached: fstat.cref(),
            overflow: fstat.fof_err(),
            underflow: fstat.fuf_err(),
            spi_burst_error: fstat.spi_burst_err(),
            clock_count_error: fstat.clk_num_err(),
        }
    }

    /// Number of samples currently stored.
    pub fn available_samples(&self) -> usize {
        self.fill_level as usize * SAMPLES_PER_WORD
    }

    /// Returns `true` when any error flag is set.
    pub fn has_error(&self) -> bool {
        self.overflow || self.underflow || self.spi_burst_error || self.clock_count_error
    }
}

/// Splits one FIFO word into its two right-aligned 12-bit samples.
pub const fn unpack_word(word: [u8; FIFO_WORD_BYTES]) -> [u16; SAMPLES_PER_WORD] {
    let [b0, b1, b2] = word;
    [
        ((b0 as u16) << 4) | ((b1 as u16) >> 4),
        (((b1 as u16) & 0x0F) << 8) | b2 as u16,
    ]
}

/// Unpacks raw FIFO bytes into `samples`.
///
/// Stops at whichever runs out first and returns the number of samples
/// written. Trailing bytes that do not form a full word are ignored.
pub fn unpack_samples(raw: &[u8], samples: &mut [u16]) -> usize {
    let mut written = 0;
    for (word, pair) in raw
        .chunks_exact(FIFO_WORD_BYTES)
        .zip(samples.chunks_exact_mut(SAMPLES_PER_WORD))
    {
        pair.copy_from_slice(&unpack_word([word[0], word[1], word[2]]));
        written += SAMPLES_PER_WORD;
    }
    written
}

/// Reads `samples.len()` samples from the FIFO of `device`.
///
/// The payload is only clocked in when `GSR0` reports no FIFO, burst or
/// clock-count error; otherwise [`Error::FifoStatus`] is returned and
/// `samples` is left untouched.
///
/// # Panics
///
/// Panics if the sample count is odd or exceeds the FIFO capacity.
pub fn read_fifo<IFACE>(
    interface: &mut IFACE,
    device: &DeviceType,
    samples: &mut [u16],
) -> Result<(), IFACE::Error>
where
    IFACE: Bgt60Interface,
{
    assert!(
        samples.len().is_multiple_of(SAMPLES_PER_WORD),
        "FIFO reads must cover whole words"
    );
    assert!(
        samples.len() <= device.max_samples(),
        "FIFO read exceeds device capacity"
    );

    let command = codec::to_wire(codec::encode_burst_read(device.fifo_address));
    interface::with_selected(interface, |iface| {
        let mut header = [0u8; BURST_HEADER_BYTES];
        iface.transfer(&mut header, &command)?;

        let gsr0 = Gsr0::from(codec::decode_gsr0(codec::from_wire(header)));
        if gsr0.has_error() {
            warn!("FIFO burst rejected, GSR0 = {}", gsr0);
            return Err(Error::FifoStatus(gsr0));
        }

        stream_samples(iface, samples)
    })
}

fn stream_samples<IFACE>(iface: &mut IFACE, samples: &mut [u16]) -> Result<(), IFACE::Error>
where
    IFACE: Bgt60Interface,
{
    let mut raw = [0u8; CHUNK_WORDS * FIFO_WORD_BYTES];
    for chunk in samples.chunks_mut(CHUNK_WORDS * SAMPLES_PER_WORD) {
        let len = chunk.len() / SAMPLES_PER_WORD * FIFO_WORD_BYTES;
        iface.read(&mut raw[..len])?;
        unpack_samples(&raw[..len], chunk);
    }
    Ok(())
}

/// Reads a burst verbatim into `buf`.
///
/// The first [`BURST_HEADER_BYTES`] bytes hold the reply to the burst command
/// (`GSR0` in the low nibble of byte 0) and the rest is raw FIFO payload.
/// Nothing is validated. Returns the number of bytes written.
///
/// # Panics
///
/// Panics if `buf` cannot hold the header, if the payload is not a whole number
/// of words, or if the payload exceeds the FIFO capacity.
pub fn read_fifo_raw<IFACE>(
    interface: &mut IFACE,
    device: &DeviceType,
    buf: &mut [u8],
) -> Result<usize, IFACE::Error>
where
    IFACE: Bgt60Interface,
{
    assert!(buf.len() >= BURST_HEADER_BYTES, "buffer too small for burst header");
    let payload_len = buf.len() - BURST_HEADER_BYTES;
    assert!(
        payload_len.is_multiple_of(FIFO_WORD_BYTES),
        "FIFO reads must cover whole words"
    );
    assert!(
        payload_len / FIFO_WORD_BYTES <= device.fifo_capacity as usize,
        "FIFO read exceeds device capacity"
    );

    let command = codec::to_wire(codec::encode_burst_read(device.fifo_address));
    interface::with_selected(interface, |iface| {
        let (header, payload) = buf.split_at_mut(BURST_HEADER_BYTES);
        iface.transfer(header, &command)?;
        iface.read(payload)?;
        Ok(())
    })?;
    Ok(buf.len())
}

/// Reads and decodes the `FSTAT` register of `device`.
pub fn read_fifo_status<IFACE>(
    interface: &mut IFACE,
    device: &DeviceType,
) -> Result<FifoStatus, IFACE::Error>
where
    IFACE: Bgt60Interface,
{
    let raw = interface::read_register(interface, device.fstat_address)?;
    Ok(FifoStatus::from_register(Fstat::from(raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::sim::{Event, SimRadar};
    use crate::params::DeviceVariant;
    use crate::registers::{REG_FIFO_TR13C, REG_FIFO_UTR11, REG_FSTAT_UTR11};

    const TR13C: DeviceType = DeviceType::of(DeviceVariant::Bgt60Tr13c);
    const UTR11: DeviceType = DeviceType::of(DeviceVariant::Bgt60Utr11);

    #[test]
    fn word_splits_into_two_twelve_bit_samples() {
        assert_eq!(unpack_word([0xAB, 0xCD, 0xEF]), [0xABC, 0xDEF]);
        assert_eq!(unpack_word([0xFF, 0xFF, 0xFF]), [0xFFF, 0xFFF]);
        assert_eq!(unpack_word([0x00, 0x10, 0x01]), [0x001, 0x001]);
    }

    #[test]
    fn unpack_stops_at_shorter_input() {
        let mut samples = [0u16; 6];
        let written = unpack_samples(&[0x12, 0x34, 0x56, 0x78], &mut samples);
        assert_eq!(written, 2);
        assert_eq!(samples, [0x123, 0x456, 0, 0, 0, 0]);
    }

    #[test]
    fn burst_read_streams_payload() {
        let mut sim = SimRadar::tr13c();
        sim.burst_payload = vec![0x12, 0x34, 0x56, 0xAB, 0xCD, 0xEF];

        let mut samples = [0u16; 4];
        read_fifo(&mut sim, &TR13C, &mut samples).unwrap();

        assert_eq!(samples, [0x123, 0x456, 0xABC, 0xDEF]);
        assert_eq!(
            sim.events,
            [
                Event::Select,
                Event::Burst(REG_FIFO_TR13C),
                Event::Payload(6),
                Event::Deselect,
            ]
        );
    }

    #[test]
    fn large_reads_are_chunked() {
        let mut sim = SimRadar::tr13c();
        let words = CHUNK_WORDS + 3;
        sim.burst_payload = (0..words).flat_map(|_| [0x80, 0x08, 0x01]).collect();

        let mut samples = vec![0u16; words * SAMPLES_PER_WORD];
        read_fifo(&mut sim, &TR13C, &mut samples).unwrap();

        assert!(samples.chunks(2).all(|pair| pair == [0x800, 0x801]));
        let payloads: Vec<_> = sim
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Payload(len) => Some(*len),
                _ => None,
            })
            .collect();
        assert_eq!(payloads, [CHUNK_WORDS * FIFO_WORD_BYTES, 3 * FIFO_WORD_BYTES]);
    }

    #[test]
    fn clock_count_error_blocks_payload() {
        let mut sim = SimRadar::tr13c();
        sim.gsr0 = 0x08;
        sim.burst_payload = vec![0xFF; 12];

        let mut samples = [0x5A5Au16; 8];
        let result = read_fifo(&mut sim, &TR13C, &mut samples);

        match result {
            Err(Error::FifoStatus(gsr0)) => assert!(gsr0.clk_num_err()),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(samples, [0x5A5A; 8]);
        assert!(!sim.events.iter().any(|e| matches!(e, Event::Payload(_))));
        assert_eq!(sim.events.last(), Some(&Event::Deselect));
    }

    #[test]
    fn underflow_and_burst_errors_block_payload() {
        for gsr0 in [0x01, 0x04] {
            let mut sim = SimRadar::tr13c();
            sim.gsr0 = gsr0;
            let mut samples = [0u16; 2];
            assert!(matches!(
                read_fifo(&mut sim, &TR13C, &mut samples),
                Err(Error::FifoStatus(_))
            ));
        }
    }

    #[test]
    fn high_speed_flag_alone_is_not_an_error() {
        let mut sim = SimRadar::tr13c();
        sim.gsr0 = 0x02;
        sim.burst_payload = vec![0x00, 0x10, 0x02];

        let mut samples = [0u16; 2];
        read_fifo(&mut sim, &TR13C, &mut samples).unwrap();
        assert_eq!(samples, [0x001, 0x002]);
    }

    #[test]
    fn chip_select_released_when_payload_fails() {
        let mut sim = SimRadar::tr13c();
        sim.fail_transfer = Some(1);

        let mut samples = [0u16; 2];
        assert!(matches!(
            read_fifo(&mut sim, &TR13C, &mut samples),
            Err(Error::Interface(_))
        ));
        assert!(!sim.is_selected());
    }

    #[test]
    fn burst_targets_variant_fifo_address() {
        let mut sim = SimRadar::utr11();
        let mut samples = [0u16; 2];
        read_fifo(&mut sim, &UTR11, &mut samples).unwrap();
        assert!(sim.events.contains(&Event::Burst(REG_FIFO_UTR11)));
    }

    #[test]
    #[should_panic(expected = "whole words")]
    fn odd_sample_count_panics() {
        let mut sim = SimRadar::tr13c();
        let mut samples = [0u16; 3];
        let _ = read_fifo(&mut sim, &TR13C, &mut samples);
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn oversized_read_panics() {
        let mut sim = SimRadar::utr11();
        let mut samples = vec![0u16; UTR11.max_samples() + 2];
        let _ = read_fifo(&mut sim, &UTR11, &mut samples);
    }

    #[test]
    fn raw_read_keeps_header_in_buffer() {
        let mut sim = SimRadar::tr13c();
        sim.gsr0 = 0x08;
        sim.burst_payload = vec![0xAB, 0xCD, 0xEF];

        let mut buf = [0u8; BURST_HEADER_BYTES + 3];
        let len = read_fifo_raw(&mut sim, &TR13C, &mut buf).unwrap();

        assert_eq!(len, 7);
        assert_eq!(buf, [0x08, 0x00, 0x00, 0x00, 0xAB, 0xCD, 0xEF]);
        assert_eq!(sim.events.last(), Some(&Event::Deselect));
    }

    #[test]
    #[should_panic(expected = "burst header")]
    fn raw_read_needs_room_for_header() {
        let mut sim = SimRadar::tr13c();
        let mut buf = [0u8; 3];
        let _ = read_fifo_raw(&mut sim, &TR13C, &mut buf);
    }

    #[test]
    fn status_is_read_from_variant_fstat() {
        let mut sim = SimRadar::utr11();
        sim.set_reg(REG_FSTAT_UTR11, 0x22_0040);

        let status = read_fifo_status(&mut sim, &UTR11).unwrap();
        assert_eq!(status.fill_level, 0x40);
        assert_eq!(status.available_samples(), 0x80);
        assert!(status.limit_reached);
        assert!(status.clock_count_error);
        assert!(status.has_error());
        assert!(!status.empty);
        assert_eq!(sim.reads_of(REG_FSTAT_UTR11), 1);
    }
}
