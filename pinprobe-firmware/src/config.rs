//! Embedded probe configuration

use defmt::*;
use pinprobe_core::config::{parse_config, ProbeConfig};

/// Compiled-in configuration; edit probe.toml and rebuild to change it
const EMBEDDED_CONFIG: &str = include_str!("../probe.toml");

/// Parse and validate the embedded configuration
///
/// build.rs runs the same parser and validation over this file, so a
/// failure here is not expected; the built-in defaults are used if one
/// occurs.
pub fn load_config() -> ProbeConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            error!("Using built-in defaults");
            return ProbeConfig::default();
        }
    };

    if let Err(e) = config.validate() {
        error!("Embedded config rejected: {}", e);
        error!("Using built-in defaults");
        return ProbeConfig::default();
    }

    info!("Parsed embedded configuration successfully");
    config
}
