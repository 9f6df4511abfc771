//! Configuration type definitions
//!
//! Defaults reproduce the reference bench setup: the full 480-candidate
//! space, ten patterns x 1000 repeats, an INA219 on a 0.1 ohm shunt sampled
//! every 200 ms.

use heapless::Vec;

use crate::search::CANDIDATE_COUNT;
use crate::stimulus::{StimulusPattern, TrialTiming, DEFAULT_PATTERNS, MAX_PATTERNS};

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `start_at..end_at` is empty or outside the search space
    EmptyWindow,
    /// No stimulus patterns configured
    NoPatterns,
    /// `repeats_per_pattern` is zero
    NoRepeats,
    /// `clock_high_us` is zero
    ZeroClockHigh,
    /// Expected maximum current or shunt resistance is not positive
    InvalidOracleRange,
    /// Sampling period is zero
    ZeroSamplePeriod,
    /// Response threshold is negative or not a number
    InvalidThreshold,
}

/// Which slice of the enumeration to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SearchConfig {
    /// First sequence number to try
    pub start_at: u16,
    /// One past the last sequence number to try
    pub end_at: u16,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            start_at: 0,
            end_at: CANDIDATE_COUNT,
        }
    }
}

impl SearchConfig {
    /// Number of trials in the window
    pub fn len(&self) -> u16 {
        self.end_at.min(CANDIDATE_COUNT).saturating_sub(self.start_at)
    }

    /// True if the window holds no candidates
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stimulus parameters
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StimulusConfig {
    /// Patterns clocked out in order
    pub patterns: Vec<StimulusPattern, MAX_PATTERNS>,
    /// Pulse and repeat timing
    pub timing: TrialTiming,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        let mut patterns = Vec::new();
        for &pattern in DEFAULT_PATTERNS.iter().take(MAX_PATTERNS) {
            let _ = patterns.push(pattern);
        }

        Self {
            patterns,
            timing: TrialTiming::default(),
        }
    }
}

impl StimulusConfig {
    /// Nominal duration of a single trial
    pub fn trial_duration_us(&self) -> u64 {
        self.timing.nominal_duration_us(self.patterns.len())
    }
}

/// Current sensor oracle parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OracleConfig {
    /// Largest current the sensor should resolve (amps)
    pub expected_max_amps: f32,
    /// Shunt resistance (ohms)
    pub shunt_ohms: f32,
    /// Interval between readings while a trial runs (ms)
    pub sample_period_ms: u32,
    /// Readings taken with all lines low before the first trial
    pub baseline_samples: u8,
    /// Peak rise over baseline that marks a trial as a response (amps)
    pub response_threshold_amps: f32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            expected_max_amps: 0.5,
            shunt_ohms: 0.1,
            sample_period_ms: 200,
            baseline_samples: 10,
            response_threshold_amps: 0.005,
        }
    }
}

/// Complete probe configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeConfig {
    pub search: SearchConfig,
    pub stimulus: StimulusConfig,
    pub oracle: OracleConfig,
}

impl ProbeConfig {
    /// Check every section for values the search cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.is_empty() {
            return Err(ConfigError::EmptyWindow);
        }

        if self.stimulus.patterns.is_empty() {
            return Err(ConfigError::NoPatterns);
        }
        if self.stimulus.timing.repeats_per_pattern == 0 {
            return Err(ConfigError::NoRepeats);
        }
        if self.stimulus.timing.clock_high_us == 0 {
            return Err(ConfigError::ZeroClockHigh);
        }

        let oracle = &self.oracle;
        if !positive(oracle.expected_max_amps) || !positive(oracle.shunt_ohms) {
            return Err(ConfigError::InvalidOracleRange);
        }
        if oracle.sample_period_ms == 0 {
            return Err(ConfigError::ZeroSamplePeriod);
        }
        if oracle.response_threshold_amps.is_nan() || oracle.response_threshold_amps < 0.0 {
            return Err(ConfigError::InvalidThreshold);
        }

        Ok(())
    }

    /// Nominal duration of the whole configured window
    pub fn run_duration_us(&self) -> u64 {
        u64::from(self.search.len()) * self.stimulus.trial_duration_us()
    }
}

fn positive(value: f32) -> bool {
    !value.is_nan() && value > 0.0
}
