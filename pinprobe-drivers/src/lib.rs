//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in pinprobe-core:
//!
//! - Current sensors (INA219 over I2C)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod sensor;
