//! Cross-core communication
//!
//! The only state shared between core 0 and core 1.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use pinprobe_core::handshake::Handshake;

/// Go/Done handshake between the controller (core 0) and worker (core 1)
pub static HANDSHAKE: Handshake<CriticalSectionRawMutex> = Handshake::new();
