//! Configuration primitives for the BGT60TRxx driver.

use crate::codec;
use crate::params::SpeedMode;

/// Default number of `MAIN` polls before a soft reset is reported as timed out.
pub const DEFAULT_RESET_POLL_BUDGET: u32 = u32::MAX;

/// User-facing driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// SPI MISO timing, fixed at initialization.
    pub speed_mode: SpeedMode,
    /// Maximum number of `MAIN` reads while waiting for a reset bit to clear.
    ///
    /// The wait is bounded by a poll count rather than a clock, so its duration
    /// scales with the bus speed.
    pub reset_poll_budget: u32,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration is usable.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.reset_poll_budget == 0 {
            return Err(ConfigError::ZeroResetPollBudget);
        }

        Ok(())
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the SPI MISO timing.
    pub fn speed_mode(mut self, speed_mode: SpeedMode) -> Self {
        self.config.speed_mode = speed_mode;
        self
    }

    /// Overrides the reset poll budget.
    pub fn reset_poll_budget(mut self, polls: u32) -> Self {
        self.config.reset_poll_budget = polls;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed_mode: SpeedMode::Normal,
            reset_poll_budget: DEFAULT_RESET_POLL_BUDGET,
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A reset could never complete with a budget of zero polls.
    ZeroResetPollBudget,
}

/// One register write of a radar configuration.
///
/// Register values are produced by an external configurator and applied
/// verbatim, except for `SFCTL` (see
/// [`Bgt60::apply_configuration`](crate::device::Bgt60::apply_configuration)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterValue {
    /// 7-bit register address.
    pub address: u8,
    /// 24-bit register contents.
    pub data: u32,
}

impl RegisterValue {
    /// Creates a new entry, truncating address and data to their field widths.
    pub const fn new(address: u8, data: u32) -> Self {
        Self {
            address: address & codec::MAX_ADDRESS,
            data: data & codec::DATA_MSK,
        }
    }

    /// Decodes a configurator register word (a complete SPI write frame).
    pub const fn from_frame(word: u32) -> Self {
        Self {
            address: codec::decode_address(word),
            data: codec::decode_read_result(word),
        }
    }

    /// Encodes the entry as an SPI write frame.
    pub const fn to_frame(self) -> u32 {
        codec::encode_write(self.address, self.data)
    }
}
