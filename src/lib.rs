#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

mod error;

pub mod codec;
pub mod config;
pub mod device;
pub mod fifo;
pub mod identity;
pub mod interface;
pub mod params;
pub mod registers;

pub use crate::config::{Config, RegisterValue};
pub use crate::device::{Bgt60, InitError, Ready, Uninitialized};
pub use crate::error::{Error, Result};
pub use crate::interface::Bgt60Interface;
pub use crate::interface::spi::{SpiInterface, SpiInterfaceError};
