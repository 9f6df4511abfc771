//! Minimal TOML parser for the probe configuration
//!
//! Handles only the subset `probe.toml` needs. It does NOT support full
//! TOML and never allocates. build.rs runs this parser over `probe.toml`
//! as well, so a file the firmware cannot read fails the build.
//!
//! Supported features:
//! - [section] headers (`search`, `stimulus`, `oracle`)
//! - key = value pairs
//! - Integers in decimal (optional `+`), `0x` hex, `0o` octal or `0b`
//!   binary, with `_` separators
//! - Floats (`0.5`, `5e-3`, `+1.0`)
//! - Integer arrays on one line or spread over several:
//!   patterns = [0x01, 0x03]
//! - Comments (# ...)
//!
//! NOT supported:
//! - Strings, booleans, datetimes
//! - Dotted keys or nested tables
//!
//! Keys that are not present keep their default value.

use super::types::ProbeConfig;
use crate::stimulus::{StimulusPattern, MAX_PATTERNS};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key appears before any section header
    KeyOutsideSection,
    /// Key is not known in its section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or does not fit its field
    InvalidValue,
    /// Array has more entries than the field can hold
    TooManyItems,
    /// Input ended inside a multi-line array
    UnterminatedArray,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Search,
    Stimulus,
    Oracle,
}

type Patterns = heapless::Vec<StimulusPattern, MAX_PATTERNS>;

/// Parse TOML text into a [`ProbeConfig`]
///
/// The result is not validated; call [`ProbeConfig::validate`] before use.
pub fn parse_config(input: &str) -> Result<ProbeConfig, ParseError> {
    let mut config = ProbeConfig::default();
    let mut section = Section::Root;
    let mut in_array = false;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if in_array {
            let (items, closed) = match line.strip_suffix(']') {
                Some(items) => (items, true),
                None => (line, false),
            };
            push_patterns(&mut config.stimulus.patterns, items)?;
            in_array = !closed;
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;

        // `key = [` with the closing bracket on a later line
        if let Some(items) = value.strip_prefix('[').filter(|v| !v.ends_with(']')) {
            let patterns = array_field(section, key, &mut config)?;
            patterns.clear();
            push_patterns(patterns, items)?;
            in_array = true;
            continue;
        }

        apply_value(section, key, value, &mut config)?;
    }

    if in_array {
        return Err(ParseError::UnterminatedArray);
    }

    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "search" => Ok(Section::Search),
        "stimulus" => Ok(Section::Stimulus),
        "oracle" => Ok(Section::Oracle),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Resolve the array-valued field named by `key`
fn array_field<'c>(
    section: Section,
    key: &str,
    config: &'c mut ProbeConfig,
) -> Result<&'c mut Patterns, ParseError> {
    if section == Section::Stimulus && key == "patterns" {
        return Ok(&mut config.stimulus.patterns);
    }

    // Reports the section, key or type error a scalar field would give
    apply_value(section, key, "[", config)?;
    Err(ParseError::InvalidValue)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut ProbeConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::KeyOutsideSection),
        Section::Search => match key {
            "start_at" => config.search.start_at = parse_int(value)?,
            "end_at" => config.search.end_at = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Stimulus => {
            let timing = &mut config.stimulus.timing;
            match key {
                "patterns" => {
                    let items = value
                        .strip_prefix('[')
                        .and_then(|v| v.strip_suffix(']'))
                        .ok_or(ParseError::InvalidValue)?;
                    config.stimulus.patterns.clear();
                    push_patterns(&mut config.stimulus.patterns, items)?;
                }
                "repeats_per_pattern" => timing.repeats_per_pattern = parse_int(value)?,
                "clock_high_us" => timing.clock_high_us = parse_int(value)?,
                "clock_low_us" => timing.clock_low_us = parse_int(value)?,
                "frame_gap_ms" => timing.frame_gap_ms = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Oracle => {
            let oracle = &mut config.oracle;
            match key {
                "expected_max_amps" => oracle.expected_max_amps = parse_float(value)?,
                "shunt_ohms" => oracle.shunt_ohms = parse_float(value)?,
                "sample_period_ms" => oracle.sample_period_ms = parse_int(value)?,
                "baseline_samples" => oracle.baseline_samples = parse_int(value)?,
                "response_threshold_amps" => {
                    oracle.response_threshold_amps = parse_float(value)?
                }
                _ => return Err(ParseError::UnknownKey),
            }
        }
    }

    Ok(())
}

/// Parse an unsigned integer literal into any integer type it fits
fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ParseError> {
    let (digits, radix) = if let Some(hex) = value.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(oct) = value.strip_prefix("0o") {
        (oct, 8)
    } else if let Some(bin) = value.strip_prefix("0b") {
        (bin, 2)
    } else {
        (value.strip_prefix('+').unwrap_or(value), 10)
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return Err(ParseError::InvalidValue);
    }

    let mut result: u64 = 0;
    for c in digits.chars().filter(|&c| c != '_') {
        let digit = c.to_digit(radix).ok_or(ParseError::InvalidValue)?;
        result = result
            .checked_mul(u64::from(radix))
            .and_then(|r| r.checked_add(u64::from(digit)))
            .ok_or(ParseError::InvalidValue)?;
    }

    T::try_from(result).map_err(|_| ParseError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    let parsed: f32 = value.parse().map_err(|_| ParseError::InvalidValue)?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(ParseError::InvalidValue)
    }
}

/// Append the comma-separated bytes in `items` to `patterns`
///
/// `items` is the text between the brackets, or one line of it. A single
/// trailing comma is allowed; empty items in between are not.
fn push_patterns(patterns: &mut Patterns, items: &str) -> Result<(), ParseError> {
    let items = items.trim();
    let items = items.strip_suffix(',').unwrap_or(items);
    if items.is_empty() {
        return Ok(());
    }

    for item in items.split(',').map(str::trim) {
        if item.is_empty() {
            return Err(ParseError::InvalidValue);
        }
        let byte: u8 = parse_int(item)?;
        patterns
            .push(StimulusPattern(byte))
            .map_err(|_| ParseError::TooManyItems)?;
    }

    Ok(())
}
