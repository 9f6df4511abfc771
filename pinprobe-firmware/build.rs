//! Build script for pinprobe-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates probe.toml at compile time, both against the TOML grammar
//!   and with the parser the firmware runs at boot

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pinprobe_core::config::parse_config;
use serde::Deserialize;

/// Size of the candidate search space (6 x 5 x 16)
const CANDIDATE_COUNT: u16 = 480;

/// Capacity of the firmware's pattern list
const MAX_PATTERNS: usize = 16;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProbeToml {
    search: Option<SearchToml>,
    stimulus: Option<StimulusToml>,
    oracle: Option<OracleToml>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchToml {
    start_at: Option<u16>,
    end_at: Option<u16>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StimulusToml {
    patterns: Option<Vec<u8>>,
    repeats_per_pattern: Option<u16>,
    clock_high_us: Option<u32>,
    clock_low_us: Option<u32>,
    frame_gap_ms: Option<u32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OracleToml {
    expected_max_amps: Option<f64>,
    shunt_ohms: Option<f64>,
    sample_period_ms: Option<u32>,
    baseline_samples: Option<u8>,
    response_threshold_amps: Option<f64>,
}

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate probe.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=probe.toml");

    let config_path = Path::new("probe.toml");

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read probe.toml", &[e.to_string()]),
    };

    let config: ProbeToml = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "Invalid probe.toml",
            &e.to_string().lines().map(String::from).collect::<Vec<_>>(),
        ),
    };

    let errors = check_ranges(&config);
    if !errors.is_empty() {
        fail("Invalid probe.toml values", &errors);
    }

    check_firmware_parser(&content);
}

/// Run the boot-time parser over the file so the firmware never falls
/// back to defaults for a file that built
fn check_firmware_parser(content: &str) {
    let config = match parse_config(content) {
        Ok(config) => config,
        Err(e) => fail(
            "probe.toml uses syntax the firmware parser rejects",
            &[format!("{:?}", e)],
        ),
    };

    if let Err(e) = config.validate() {
        fail(
            "probe.toml rejected by firmware validation",
            &[format!("{:?}", e)],
        );
    }
}

fn check_ranges(config: &ProbeToml) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(search) = &config.search {
        let start = search.start_at.unwrap_or(0);
        let end = search.end_at.unwrap_or(CANDIDATE_COUNT);
        if end > CANDIDATE_COUNT {
            errors.push(format!("[search] end_at must be <= {}", CANDIDATE_COUNT));
        }
        if start >= end.min(CANDIDATE_COUNT) {
            errors.push(String::from("[search] start_at must be below end_at"));
        }
    }

    if let Some(stimulus) = &config.stimulus {
        if let Some(patterns) = &stimulus.patterns {
            if patterns.is_empty() {
                errors.push(String::from("[stimulus] patterns cannot be empty"));
            }
            if patterns.len() > MAX_PATTERNS {
                errors.push(format!(
                    "[stimulus] at most {} patterns are supported",
                    MAX_PATTERNS
                ));
            }
        }
        if stimulus.repeats_per_pattern == Some(0) {
            errors.push(String::from("[stimulus] repeats_per_pattern must be > 0"));
        }
        if stimulus.clock_high_us == Some(0) {
            errors.push(String::from("[stimulus] clock_high_us must be > 0"));
        }
    }

    if let Some(oracle) = &config.oracle {
        for (key, value) in [
            ("expected_max_amps", oracle.expected_max_amps),
            ("shunt_ohms", oracle.shunt_ohms),
        ] {
            if value.is_some_and(|v| v.is_nan() || v <= 0.0) {
                errors.push(format!("[oracle] {} must be > 0", key));
            }
        }
        if oracle.sample_period_ms == Some(0) {
            errors.push(String::from("[oracle] sample_period_ms must be > 0"));
        }
        if oracle.response_threshold_amps.is_some_and(|v| v < 0.0) {
            errors.push(String::from("[oracle] response_threshold_amps must be >= 0"));
        }

        let max_amps = oracle.expected_max_amps.unwrap_or(0.5);
        let shunt = oracle.shunt_ohms.unwrap_or(0.1);
        let calibration = 0.04096 / (max_amps / 32768.0 * shunt);
        if calibration >= 65536.0 {
            errors.push(String::from(
                "[oracle] expected_max_amps x shunt_ohms too small for INA219 calibration",
            ));
        }
    }

    errors
}

fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
