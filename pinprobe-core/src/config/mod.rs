//! Configuration types
//!
//! Board-agnostic configuration structures and the parser for the
//! `probe.toml` embedded in the firmware.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
