//! Stimulus bit patterns

/// Maximum number of patterns a trial can carry
pub const MAX_PATTERNS: usize = 16;

/// An 8-bit pattern clocked out to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StimulusPattern(pub u8);

impl StimulusPattern {
    /// Bits per pattern
    pub const BITS: u8 = 8;

    /// Pattern bits in transmission order (least significant bit first)
    pub fn bits(self) -> impl Iterator<Item = bool> {
        (0..Self::BITS).map(move |i| (self.0 >> i) & 1 == 1)
    }
}

/// Default pattern sequence: growing runs of ones, then the two alternating
/// patterns
pub const DEFAULT_PATTERNS: [StimulusPattern; 10] = [
    StimulusPattern(0b0000_0001),
    StimulusPattern(0b0000_0011),
    StimulusPattern(0b0000_0111),
    StimulusPattern(0b0000_1111),
    StimulusPattern(0b0001_1111),
    StimulusPattern(0b0011_1111),
    StimulusPattern(0b0111_1111),
    StimulusPattern(0b1111_1111),
    StimulusPattern(0b0101_0101),
    StimulusPattern(0b1010_1010),
];
