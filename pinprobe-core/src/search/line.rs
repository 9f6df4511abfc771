//! Candidate line identifiers

/// Number of candidate lines wired between the MCU and the display
pub const LINE_COUNT: usize = 6;

/// One of the six candidate lines
///
/// Identified by its position in the canonical line order. The mapping to
/// physical GPIOs and connector pins is board-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineId(u8);

impl LineId {
    /// All lines in canonical order
    pub const ALL: [LineId; LINE_COUNT] = [
        LineId(0),
        LineId(1),
        LineId(2),
        LineId(3),
        LineId(4),
        LineId(5),
    ];

    /// Create a line identifier from its canonical index
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < LINE_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Position in the canonical line order (0-5)
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
