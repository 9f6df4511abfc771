//! RP2040-specific HAL for the display prober
//!
//! This crate provides RP2040-specific implementations of the shared
//! `pinprobe-hal` traits over embassy-rp:
//!
//! - Push-pull candidate lines and pulled-up inputs
//! - Blocking I2C master for the current sensor

#![no_std]

pub mod gpio;
pub mod i2c;

pub use gpio::{Line, PulledUpInput};
pub use i2c::{I2cBusError, RpI2c};
