//! Trial executor
//!
//! Drives one candidate through the stimulus sequence:
//!
//! ```text
//! straps:  fixed[i] = (fixed_state >> i) & 1        (held for the trial)
//! for pattern in patterns:
//!     repeat repeats_per_pattern times:
//!         for bit in pattern (LSB first):
//!             data  = bit
//!             clock = 1, wait clock_high_us
//!             clock = 0, wait clock_low_us
//!         wait frame_gap_ms
//! ```
//!
//! Timing is best-effort: it is only as precise as the delay provider and
//! nothing is retried if a pulse runs long.

use embedded_hal::delay::DelayNs;
use pinprobe_hal::OutputPin;

use super::pattern::StimulusPattern;
use crate::search::{Candidate, LineId, LINE_COUNT};

/// Stimulus timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrialTiming {
    /// How many times each pattern is clocked out before moving on
    pub repeats_per_pattern: u16,
    /// Clock high time per bit in microseconds
    pub clock_high_us: u32,
    /// Extra low time after each falling clock edge in microseconds
    pub clock_low_us: u32,
    /// Hold time after each 8-bit frame in milliseconds
    pub frame_gap_ms: u32,
}

impl Default for TrialTiming {
    fn default() -> Self {
        Self {
            repeats_per_pattern: 1000,
            clock_high_us: 1,
            clock_low_us: 0,
            frame_gap_ms: 1,
        }
    }
}

impl TrialTiming {
    /// Duration of one 8-bit frame including the trailing gap
    pub fn frame_duration_us(&self) -> u64 {
        let per_bit = u64::from(self.clock_high_us) + u64::from(self.clock_low_us);
        per_bit * u64::from(StimulusPattern::BITS) + u64::from(self.frame_gap_ms) * 1000
    }

    /// Delay-only duration of a trial with `pattern_count` patterns
    ///
    /// GPIO writes are not counted, so real trials run slightly longer.
    pub fn nominal_duration_us(&self, pattern_count: usize) -> u64 {
        pattern_count as u64 * u64::from(self.repeats_per_pattern) * self.frame_duration_us()
    }
}

/// Counters for one executed trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrialCounters {
    /// 8-bit frames clocked out
    pub frames: u32,
    /// Rising clock edges generated
    pub clock_pulses: u32,
}

/// The six candidate lines, indexed by canonical line order
pub struct LineBank<P> {
    lines: [P; LINE_COUNT],
}

impl<P: OutputPin> LineBank<P> {
    /// Take ownership of the six lines, in canonical order
    pub fn new(lines: [P; LINE_COUNT]) -> Self {
        Self { lines }
    }

    /// Drive every line low
    pub fn quiesce(&mut self) {
        for line in self.lines.iter_mut() {
            line.set_low();
        }
    }

    /// Check that every line is low
    pub fn is_quiescent(&self) -> bool {
        self.lines.iter().all(|line| line.is_set_low())
    }

    /// Access one line
    pub fn line_mut(&mut self, id: LineId) -> &mut P {
        &mut self.lines[id.index()]
    }
}

/// Executes trials against the line bank
pub struct TrialExecutor<'p, P, D> {
    lines: LineBank<P>,
    delay: D,
    timing: TrialTiming,
    patterns: &'p [StimulusPattern],
}

impl<'p, P, D> TrialExecutor<'p, P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Create an executor; the lines are driven low immediately
    pub fn new(
        lines: LineBank<P>,
        delay: D,
        timing: TrialTiming,
        patterns: &'p [StimulusPattern],
    ) -> Self {
        let mut executor = Self {
            lines,
            delay,
            timing,
            patterns,
        };
        executor.quiesce();
        executor
    }

    /// Drive all six lines low
    pub fn quiesce(&mut self) {
        self.lines.quiesce();
    }

    /// Check that all six lines are low
    pub fn is_quiescent(&self) -> bool {
        self.lines.is_quiescent()
    }

    /// Run the full stimulus sequence for one candidate
    ///
    /// Blocks for the whole trial. The strap lines keep their levels when
    /// this returns; call [`quiesce`](Self::quiesce) before the next trial.
    pub fn run(&mut self, candidate: &Candidate) -> TrialCounters {
        for (line, high) in candidate.fixed_levels() {
            self.lines.line_mut(line).set_state(high);
        }

        let mut counters = TrialCounters::default();
        let patterns = self.patterns;

        for &pattern in patterns {
            for _ in 0..self.timing.repeats_per_pattern {
                self.clock_out(candidate.clock(), candidate.data(), pattern);
                self.delay.delay_ms(self.timing.frame_gap_ms);

                counters.frames = counters.frames.saturating_add(1);
                counters.clock_pulses = counters
                    .clock_pulses
                    .saturating_add(u32::from(StimulusPattern::BITS));
            }
        }

        counters
    }

    /// Shift one pattern out, least significant bit first
    fn clock_out(&mut self, clock: LineId, data: LineId, pattern: StimulusPattern) {
        for bit in pattern.bits() {
            self.lines.line_mut(data).set_state(bit);

            self.lines.line_mut(clock).set_high();
            self.delay.delay_us(self.timing.clock_high_us);
            self.lines.line_mut(clock).set_low();

            if self.timing.clock_low_us > 0 {
                self.delay.delay_us(self.timing.clock_low_us);
            }
        }
    }
}
