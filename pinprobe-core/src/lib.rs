//! Board-agnostic core logic for the display protocol prober
//!
//! This crate contains all search logic that does not depend on
//! specific hardware implementations:
//!
//! - Candidate enumeration over line roles and strap states
//! - Stimulus generation (bit-banged clock/data patterns)
//! - The single-slot handshake between controller and worker
//! - Worker and controller loops
//! - Hardware abstraction traits (current sensor, abort input)
//! - Configuration types and the embedded config parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod handshake;
pub mod search;
pub mod stimulus;
pub mod traits;
pub mod worker;
