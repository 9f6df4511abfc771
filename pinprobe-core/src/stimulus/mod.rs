//! Stimulus generation
//!
//! A trial straps the fixed lines once, then bit-bangs every stimulus
//! pattern onto the candidate's data line, pulsing the clock line once per
//! bit, least significant bit first.

pub mod executor;
pub mod pattern;

pub use executor::{LineBank, TrialCounters, TrialExecutor, TrialTiming};
pub use pattern::{StimulusPattern, DEFAULT_PATTERNS, MAX_PATTERNS};
