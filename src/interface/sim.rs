//! Register-level simulation of a BGT60TRxx used by the unit tests.

use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use super::Bgt60Interface;
use crate::codec;
use crate::registers::{MAIN_FRAME_START_MSK, MAIN_RESET_MSK, REG_CHIP_ID, REG_MAIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Select,
    Deselect,
    Read(u8),
    Write(u8, u32),
    Burst(u8),
    Payload(usize),
    ResetPin(bool),
}

#[derive(Debug)]
pub struct SimRadar {
    regs: [u32; 128],
    pending_reset: u32,
    reset_polls: u32,
    /// Number of `MAIN` reads that still report the reset bit; `None` never clears.
    pub reset_clear_after: Option<u32>,
    pub gsr0: u8,
    pub burst_payload: Vec<u8>,
    burst_cursor: usize,
    in_burst: bool,
    selected: bool,
    transfers: usize,
    /// Index of the transfer that fails, counting from zero.
    pub fail_transfer: Option<usize>,
    pub events: Vec<Event>,
}

impl SimRadar {
    pub fn new(chip_id: u32) -> Self {
        let mut regs = [0u32; 128];
        regs[REG_CHIP_ID as usize] = chip_id & codec::DATA_MSK;
        Self {
            regs,
            pending_reset: 0,
            reset_polls: 0,
            reset_clear_after: Some(0),
            gsr0: 0,
            burst_payload: Vec::new(),
            burst_cursor: 0,
            in_burst: false,
            selected: false,
            transfers: 0,
            fail_transfer: None,
            events: Vec::new(),
        }
    }

    pub fn tr13c() -> Self {
        Self::new(0x00_0303)
    }

    pub fn utr11() -> Self {
        Self::new(0x00_0707)
    }

    pub fn reg(&self, address: u8) -> u32 {
        self.regs[address as usize]
    }

    pub fn set_reg(&mut self, address: u8, value: u32) {
        self.regs[address as usize] = value & codec::DATA_MSK;
    }

    pub fn writes_to(&self, address: u8) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                Event::Write(a, data) if a == address => Some(data),
                _ => None,
            })
            .collect()
    }

    pub fn reads_of(&self, address: u8) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::Read(a) if *a == address))
            .count()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    fn read_main(&mut self) -> u32 {
        if self.pending_reset != 0 {
            match self.reset_clear_after {
                Some(limit) if self.reset_polls >= limit => self.complete_reset(),
                _ => self.reset_polls += 1,
            }
        }
        self.regs[REG_MAIN as usize] | self.pending_reset
    }

    fn complete_reset(&mut self) {
        let chip_id = self.regs[REG_CHIP_ID as usize];
        if self.pending_reset & 0x02 != 0 {
            self.regs = [0; 128];
            self.regs[REG_CHIP_ID as usize] = chip_id;
        }
        self.regs[REG_MAIN as usize] &= !MAIN_FRAME_START_MSK;
        self.pending_reset = 0;
        self.reset_polls = 0;
    }

    fn register_access(&mut self, frame: u32) -> u32 {
        let address = codec::decode_address(frame);
        let reply_data = if codec::is_write(frame) {
            let data = codec::decode_read_result(frame);
            self.events.push(Event::Write(address, data));
            if address == REG_MAIN {
                self.pending_reset |= data & MAIN_RESET_MSK;
                self.reset_polls = 0;
                self.regs[REG_MAIN as usize] = data & !MAIN_RESET_MSK;
                if self.pending_reset != 0 && self.reset_clear_after == Some(0) {
                    self.complete_reset();
                }
            } else if address != REG_CHIP_ID {
                self.regs[address as usize] = data;
            }
            0
        } else {
            self.events.push(Event::Read(address));
            if address == REG_MAIN {
                self.read_main()
            } else {
                self.regs[address as usize]
            }
        };
        ((self.gsr0 as u32) << codec::GSR0_POS) | reply_data
    }

    fn check_failure(&mut self) -> Result<(), SimError> {
        let index = self.transfers;
        self.transfers += 1;
        if self.fail_transfer == Some(index) {
            Err(SimError)
        } else {
            Ok(())
        }
    }
}

impl Bgt60Interface for SimRadar {
    type Error = SimError;

    fn set_chip_select(&mut self, selected: bool) -> Result<(), SimError> {
        self.selected = selected;
        if selected {
            self.events.push(Event::Select);
        } else {
            self.in_burst = false;
            self.events.push(Event::Deselect);
        }
        Ok(())
    }

    fn set_reset(&mut self, high: bool) -> Result<(), SimError> {
        self.events.push(Event::ResetPin(high));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), SimError> {
        assert!(self.selected, "transfer while deselected");
        assert_eq!(read.len(), write.len());
        assert_eq!(write.len(), codec::FRAME_LEN, "register frames are four bytes");
        self.check_failure()?;

        let frame = codec::from_wire([write[0], write[1], write[2], write[3]]);
        let reply = if frame & codec::BURST_MODE_CMD == codec::BURST_MODE_CMD {
            let address = ((frame & codec::BURST_SADR_MSK) >> codec::BURST_SADR_POS) as u8;
            self.events.push(Event::Burst(address));
            self.in_burst = true;
            self.burst_cursor = 0;
            (self.gsr0 as u32) << codec::GSR0_POS
        } else {
            self.register_access(frame)
        };

        read.copy_from_slice(&codec::to_wire(reply));
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), SimError> {
        let mut scratch = [0u8; codec::FRAME_LEN];
        self.transfer(&mut scratch[..data.len()], data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), SimError> {
        assert!(self.selected, "read while deselected");
        assert!(self.in_burst, "payload read outside a burst");
        self.check_failure()?;

        for byte in buf.iter_mut() {
            *byte = self.burst_payload.get(self.burst_cursor).copied().unwrap_or(0);
            self.burst_cursor += 1;
        }
        self.events.push(Event::Payload(buf.len()));
        Ok(())
    }
}

/// Delay provider that records every requested wait.
#[derive(Default)]
pub struct RecordingDelay {
    pub delays_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}
