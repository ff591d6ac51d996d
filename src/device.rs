//! High-level BGT60TRxx device driver implementation.

use embedded_hal::delay::DelayNs;

use crate::config::{Config, RegisterValue};
use crate::error::{Error, Result};
use crate::fifo::{self, FifoStatus};
use crate::identity::{self, DeviceType};
use crate::interface::spi::SpiInterface;
use crate::interface::{self as bus, Bgt60Interface};
use crate::params::{DeviceVariant, ResetKind, SpeedMode};
use crate::registers::{
    ChipId, Main, Register, RegisterAccess, Sfctl, REG_CHIP_ID, REG_SFCTL, SFCTL_MISO_HS_READ_MSK,
};
use crate::self_test::{self, SelfTestReport};

// Settling time after a reset bit has cleared (milliseconds).
const SOFT_RESET_SETTLE_MS: u32 = 10;
// Length of each phase of the hardware reset pulse (milliseconds).
const HARD_RESET_PHASE_MS: u32 = 1;

/// State of a driver that has not identified its device yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uninitialized;

/// State of a driver bound to an identified device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    device: DeviceType,
    frame_active: bool,
}

/// High-level synchronous driver for the BGT60TRxx radar sensors.
///
/// The driver starts out [`Uninitialized`] and becomes [`Ready`] once
/// [`init`](Bgt60::init) has identified the sensor.
#[derive(Debug)]
pub struct Bgt60<IFACE, STATE> {
    interface: IFACE,
    config: Config,
    state: STATE,
}

impl<IFACE, STATE> Bgt60<IFACE, STATE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, Config) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns the configuration fixed at construction.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// SPI MISO timing selected at construction.
    pub fn speed_mode(&self) -> SpeedMode {
        self.config.speed_mode
    }
}

impl<IFACE> Bgt60<IFACE, Uninitialized> {
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE, config: Config) -> Self {
        Self {
            interface,
            config,
            state: Uninitialized,
        }
    }
}

impl<SPI, CS, RST> Bgt60<SpiInterface<SPI, CS, RST>, Uninitialized> {
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI, cs: CS, rst: RST, config: Config) -> Self {
        Self::new(SpiInterface::new(spi, cs, rst), config)
    }
}

impl<SPI, CS, RST, STATE> Bgt60<SpiInterface<SPI, CS, RST>, STATE> {
    /// Releases the driver, returning the SPI bus, pins and configuration.
    pub fn release_spi(self) -> (SPI, CS, RST, Config) {
        let (iface, config) = self.release();
        let (spi, cs, rst) = iface.release();
        (spi, cs, rst, config)
    }
}

/// Error returned by [`Bgt60::init`], handing back the uninitialized driver.
pub struct InitError<IFACE, E> {
    /// The driver, unchanged and ready for another attempt.
    pub driver: Bgt60<IFACE, Uninitialized>,
    /// Cause of the failure.
    pub error: Error<E>,
}

impl<IFACE, E> InitError<IFACE, E> {
    /// Splits the error into the driver and the cause.
    pub fn into_parts(self) -> (Bgt60<IFACE, Uninitialized>, Error<E>) {
        (self.driver, self.error)
    }
}

impl<IFACE, E: core::fmt::Debug> core::fmt::Debug for InitError<IFACE, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InitError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<IFACE, E: defmt::Format> defmt::Format for InitError<IFACE, E> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "InitError({})", self.error);
    }
}

impl<IFACE, CommE, STATE> Bgt60<IFACE, STATE>
where
    IFACE: Bgt60Interface<Error = CommE>,
{
    // Chip select is held high throughout because the reset pin doubles as a
    // data line of the quad-SPI interface.
    fn pulse_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.interface.set_reset(true)?;
        self.interface.set_chip_select(false)?;
        delay.delay_ms(HARD_RESET_PHASE_MS);

        self.interface.set_reset(false)?;
        delay.delay_ms(HARD_RESET_PHASE_MS);

        self.interface.set_reset(true)?;
        delay.delay_ms(HARD_RESET_PHASE_MS);
        Ok(())
    }
}

impl<IFACE, CommE> Bgt60<IFACE, Uninitialized>
where
    IFACE: Bgt60Interface<Error = CommE>,
{
    // ==================================================================
    // == Initialization ================================================
    // ==================================================================
    /// Pulses the reset line, returning every register to its default.
    pub fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.pulse_reset(delay)
    }

    /// Programs the MISO timing, then reads and resolves `CHIP_ID`.
    ///
    /// On failure the driver comes back in [`InitError::driver`], still
    /// uninitialized, so the caller can reset the sensor and try again.
    pub fn init(mut self) -> core::result::Result<Bgt60<IFACE, Ready>, InitError<IFACE, CommE>> {
        match self.identify() {
            Ok(device) => Ok(Bgt60 {
                interface: self.interface,
                config: self.config,
                state: Ready {
                    device,
                    frame_active: false,
                },
            }),
            Err(error) => Err(InitError {
                driver: self,
                error,
            }),
        }
    }

    fn identify(&mut self) -> Result<DeviceType, CommE> {
        self.config.validate().map_err(|_| Error::InvalidConfig)?;

        let sfctl = if self.config.speed_mode.is_high_speed() {
            SFCTL_MISO_HS_READ_MSK
        } else {
            0
        };
        bus::write_register(&mut self.interface, REG_SFCTL, sfctl)?;

        let chip_id = bus::read_register(&mut self.interface, REG_CHIP_ID)?;
        let id = ChipId::from(chip_id);
        debug!(
            "CHIP_ID = {=u32:#x} (digital {}, rf {})",
            chip_id,
            id.digital_id(),
            id.rf_id()
        );

        let variant = identity::resolve(chip_id).ok_or_else(|| {
            warn!("unsupported CHIP_ID {=u32:#x}", chip_id);
            Error::UnknownDevice { chip_id }
        })?;
        debug!("detected {}", variant.name());

        Ok(DeviceType::of(variant))
    }
}

impl<IFACE> Bgt60<IFACE, Ready> {
    /// Constants of the identified device.
    pub fn device_type(&self) -> &DeviceType {
        &self.state.device
    }

    /// Identified device variant.
    pub fn variant(&self) -> DeviceVariant {
        self.state.device.variant
    }

    /// FIFO capacity in 24-bit words.
    pub fn fifo_capacity(&self) -> u16 {
        self.state.device.fifo_capacity
    }

    /// Returns `true` between [`start_frame(true)`](Bgt60::start_frame) and
    /// the next soft or hard reset.
    pub fn is_frame_active(&self) -> bool {
        self.state.frame_active
    }
}

impl<IFACE, CommE> Bgt60<IFACE, Ready>
where
    IFACE: Bgt60Interface<Error = CommE>,
{
    // ==================================================================
    // == Register Access ===============================================
    // ==================================================================
    /// Reads the 24-bit contents of register `address`.
    pub fn read_register(&mut self, address: u8) -> Result<u32, CommE> {
        bus::read_register(&mut self.interface, address)
    }

    /// Writes `data` to register `address`.
    pub fn write_register(&mut self, address: u8, data: u32) -> Result<(), CommE> {
        bus::write_register(&mut self.interface, address, data)
    }

    /// Reads a fixed-address register as its typed representation.
    pub fn read<R: Register>(&mut self) -> Result<R, CommE> {
        self.read_register(R::ADDRESS).map(R::from)
    }

    /// Read-modify-write of a fixed-address register; returns the written value.
    pub fn modify<R, F>(&mut self, mutate: F) -> Result<R, CommE>
    where
        R: Register,
        F: FnOnce(&mut R),
    {
        debug_assert_eq!(R::ACCESS, RegisterAccess::ReadWrite);
        let mut value = self.read::<R>()?;
        mutate(&mut value);
        self.write_register(R::ADDRESS, value.into())?;
        Ok(value)
    }

    // ==================================================================
    // == Configuration =================================================
    // ==================================================================
    /// Soft-resets the device and writes `registers` in order.
    ///
    /// The `SFCTL` entry is merged before it is written: the FIFO limit is
    /// cleared and the MISO timing is forced to the mode chosen at
    /// construction. Stops at the first failed write without rolling back.
    pub fn apply_configuration(
        &mut self,
        registers: &[RegisterValue],
        delay: &mut impl DelayNs,
    ) -> Result<(), CommE> {
        self.soft_reset(ResetKind::Software, delay)?;

        for &entry in registers {
            self.write_config_entry(entry)?;
        }

        debug!("applied {} configuration registers", registers.len());
        Ok(())
    }

    /// Same as [`apply_configuration`](Self::apply_configuration) for a list
    /// of raw SPI write frames as exported by the radar configurator.
    pub fn apply_register_dump(
        &mut self,
        words: &[u32],
        delay: &mut impl DelayNs,
    ) -> Result<(), CommE> {
        self.soft_reset(ResetKind::Software, delay)?;

        for &word in words {
            self.write_config_entry(RegisterValue::from_frame(word))?;
        }

        debug!("applied {} configuration words", words.len());
        Ok(())
    }

    fn write_config_entry(&mut self, entry: RegisterValue) -> Result<(), CommE> {
        let data = if entry.address == REG_SFCTL {
            Sfctl::from(entry.data)
                .with_fifo_cref(0)
                .with_miso_hs_read(self.config.speed_mode.is_high_speed())
                .into()
        } else {
            entry.data
        };
        trace!("config {=u8:#x} <- {=u32:#x}", entry.address, data);
        self.write_register(entry.address, data)
    }

    /// Sets the FIFO fill level, in samples, at which the interrupt fires.
    ///
    /// # Panics
    ///
    /// Panics if `num_samples` is zero, odd or exceeds the FIFO capacity.
    pub fn set_fifo_limit(&mut self, num_samples: usize) -> Result<(), CommE> {
        assert!(
            num_samples >= fifo::SAMPLES_PER_WORD
                && num_samples.is_multiple_of(fifo::SAMPLES_PER_WORD),
            "FIFO limit must be a non-zero even sample count"
        );
        assert!(
            num_samples <= self.state.device.max_samples(),
            "FIFO limit exceeds device capacity"
        );

        let threshold = (num_samples / fifo::SAMPLES_PER_WORD - 1) as u16;
        self.modify::<Sfctl, _>(|sfctl| sfctl.set_fifo_cref(threshold))?;
        Ok(())
    }

    /// Replaces ADC data in the FIFO by the LFSR test pattern.
    pub fn enable_test_mode(&mut self, enable: bool) -> Result<(), CommE> {
        self.modify::<Sfctl, _>(|sfctl| sfctl.set_lfsr_en(enable))?;
        Ok(())
    }

    // ==================================================================
    // == Frame Control & Reset =========================================
    // ==================================================================
    /// Pulses the reset line, returning every register to its default.
    ///
    /// The device type stays bound, but the configuration has to be applied
    /// again before the next frame.
    pub fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.pulse_reset(delay)?;
        self.state.frame_active = false;
        Ok(())
    }

    /// Starts frame generation, or stops it with an FSM reset.
    pub fn start_frame(&mut self, start: bool, delay: &mut impl DelayNs) -> Result<(), CommE> {
        if start {
            self.modify::<Main, _>(|main| main.set_frame_start(true))?;
            self.state.frame_active = true;
            Ok(())
        } else {
            self.soft_reset(ResetKind::Fsm, delay)
        }
    }

    /// Triggers a reset of the given scope and waits until it has completed.
    ///
    /// `MAIN` is polled at most `reset_poll_budget` times. On success the
    /// driver waits for the device to settle; on timeout it returns at once.
    pub fn soft_reset(&mut self, kind: ResetKind, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.modify::<Main, _>(|main| main.request_reset(kind))?;

        for poll in 1..=self.config.reset_poll_budget {
            let main = self.read::<Main>()?;
            if !main.is_reset_pending(kind) {
                trace!("{} reset done after {} polls", kind, poll);
                self.state.frame_active = false;
                delay.delay_ms(SOFT_RESET_SETTLE_MS);
                return Ok(());
            }
        }

        warn!("{} reset timed out", kind);
        Err(Error::ResetTimeout(kind))
    }

    // ==================================================================
    // == FIFO Access ===================================================
    // ==================================================================
    /// Reads `samples.len()` samples from the FIFO; see [`fifo::read_fifo`].
    pub fn read_fifo(&mut self, samples: &mut [u16]) -> Result<(), CommE> {
        fifo::read_fifo(&mut self.interface, &self.state.device, samples)
    }

    /// Reads a burst verbatim, status header included; see [`fifo::read_fifo_raw`].
    pub fn read_fifo_raw(&mut self, buf: &mut [u8]) -> Result<usize, CommE> {
        fifo::read_fifo_raw(&mut self.interface, &self.state.device, buf)
    }

    /// Returns a snapshot of the `FSTAT` register.
    pub fn read_fifo_status(&mut self) -> Result<FifoStatus, CommE> {
        fifo::read_fifo_status(&mut self.interface, &self.state.device)
    }

    /// Reads `samples.len()` samples and checks them against the test pattern.
    ///
    /// Test mode must have been enabled before the frame that produced them.
    pub fn run_self_test(&mut self, samples: &mut [u16]) -> Result<SelfTestReport, CommE> {
        self_test::run_self_test(self, samples)
    }
}
