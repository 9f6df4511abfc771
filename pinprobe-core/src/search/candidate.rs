//! One point in the search space

use super::line::{LineId, LINE_COUNT};

/// Lines held at a static level during a trial (all but clock and data)
pub const FIXED_LINE_COUNT: usize = LINE_COUNT - 2;

/// Number of strap states for the fixed lines (4 bits)
pub const STRAP_STATE_COUNT: u16 = 1 << FIXED_LINE_COUNT;

/// Number of ordered (clock, data) pairs with clock != data
pub const PAIR_COUNT: u16 = (LINE_COUNT * (LINE_COUNT - 1)) as u16;

/// Total number of candidates in the search space
pub const CANDIDATE_COUNT: u16 = PAIR_COUNT * STRAP_STATE_COUNT;

/// A candidate role assignment for the six lines
///
/// Invariants (enforced by the constructors):
/// - `clock != data`
/// - `fixed` holds the other four lines in canonical order
/// - `fixed_state < 16`; bit *i* is the level driven onto `fixed[i]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Candidate {
    clock: LineId,
    data: LineId,
    fixed: [LineId; FIXED_LINE_COUNT],
    fixed_state: u8,
}

impl Candidate {
    /// Create a candidate from its clock/data roles and strap state
    ///
    /// Returns `None` if clock and data are the same line or the strap
    /// state does not fit in four bits.
    pub fn new(clock: LineId, data: LineId, fixed_state: u8) -> Option<Self> {
        if clock == data || u16::from(fixed_state) >= STRAP_STATE_COUNT {
            return None;
        }

        Some(Self {
            clock,
            data,
            fixed: fixed_lines(clock, data),
            fixed_state,
        })
    }

    /// Resolve a sequence number back to its candidate
    ///
    /// Returns `None` for sequence numbers outside `0..480`.
    pub fn from_sequence(sequence: u16) -> Option<Self> {
        if sequence >= CANDIDATE_COUNT {
            return None;
        }

        let (clock, data) = pair_at(sequence / STRAP_STATE_COUNT)?;
        Self::new(clock, data, (sequence % STRAP_STATE_COUNT) as u8)
    }

    /// Line pulsed as the serial clock
    pub fn clock(&self) -> LineId {
        self.clock
    }

    /// Line carrying the serial data bits
    pub fn data(&self) -> LineId {
        self.data
    }

    /// Strapped lines in canonical order
    pub fn fixed_lines(&self) -> &[LineId; FIXED_LINE_COUNT] {
        &self.fixed
    }

    /// 4-bit strap state; bit *i* drives `fixed_lines()[i]`
    pub fn fixed_state(&self) -> u8 {
        self.fixed_state
    }

    /// Each strapped line paired with the level it is held at
    pub fn fixed_levels(&self) -> impl Iterator<Item = (LineId, bool)> + '_ {
        self.fixed
            .iter()
            .enumerate()
            .map(move |(bit, &line)| (line, (self.fixed_state >> bit) & 1 == 1))
    }

    /// Index of the (clock, data) pair in enumeration order
    pub fn pair_index(&self) -> u16 {
        pair_index(self.clock, self.data)
    }

    /// Position of this candidate in enumeration order
    pub fn sequence_number(&self) -> u16 {
        self.pair_index() * STRAP_STATE_COUNT + u16::from(self.fixed_state)
    }
}

/// The four lines left over once clock and data are chosen, in canonical order
///
/// `clock` and `data` must differ; if they are equal the first four
/// remaining lines are returned.
pub fn fixed_lines(clock: LineId, data: LineId) -> [LineId; FIXED_LINE_COUNT] {
    let mut fixed = [LineId::ALL[0]; FIXED_LINE_COUNT];
    let mut slots = fixed.iter_mut();

    for line in LineId::ALL {
        if line == clock || line == data {
            continue;
        }
        match slots.next() {
            Some(slot) => *slot = line,
            None => break,
        }
    }

    fixed
}

/// Enumeration index of an ordered (clock, data) pair
///
/// Clock-major: clock line 0 owns pairs 0-4, clock line 1 pairs 5-9, and so
/// on. Within a clock line, data lines are counted in canonical order with
/// the clock line skipped.
pub fn pair_index(clock: LineId, data: LineId) -> u16 {
    let c = clock.index();
    let d = data.index();
    let data_rank = if d > c { d - 1 } else { d };

    (c * (LINE_COUNT - 1) + data_rank) as u16
}

/// Inverse of [`pair_index`]
pub fn pair_at(index: u16) -> Option<(LineId, LineId)> {
    if index >= PAIR_COUNT {
        return None;
    }

    let c = index as usize / (LINE_COUNT - 1);
    let rank = index as usize % (LINE_COUNT - 1);
    let d = if rank >= c { rank + 1 } else { rank };

    Some((LineId::ALL[c], LineId::ALL[d]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(i: u8) -> LineId {
        LineId::new(i).unwrap()
    }

    #[test]
    fn test_search_space_size() {
        assert_eq!(STRAP_STATE_COUNT, 16);
        assert_eq!(PAIR_COUNT, 30);
        assert_eq!(CANDIDATE_COUNT, 480);
    }

    #[test]
    fn test_rejects_same_clock_and_data() {
        assert!(Candidate::new(line(2), line(2), 0).is_none());
    }

    #[test]
    fn test_rejects_wide_strap_state() {
        assert!(Candidate::new(line(0), line(1), 15).is_some());
        assert!(Candidate::new(line(0), line(1), 16).is_none());
    }

    #[test]
    fn test_fixed_lines_canonical_order() {
        assert_eq!(fixed_lines(line(0), line(1)), [line(2), line(3), line(4), line(5)]);
        assert_eq!(fixed_lines(line(4), line(1)), [line(0), line(2), line(3), line(5)]);
        assert_eq!(fixed_lines(line(5), line(3)), [line(0), line(1), line(2), line(4)]);
    }

    #[test]
    fn test_sequence_17_resolves_to_second_pair() {
        // 17 = 16 * 1 + 1
        let c = Candidate::from_sequence(17).unwrap();
        assert_eq!(c.pair_index(), 1);
        assert_eq!(c.fixed_state(), 0b0001);
        assert_eq!(c.clock(), line(0));
        assert_eq!(c.data(), line(2));
        assert_eq!(c.fixed_lines(), &[line(1), line(3), line(4), line(5)]);
    }

    #[test]
    fn test_sequence_out_of_range() {
        assert!(Candidate::from_sequence(479).is_some());
        assert!(Candidate::from_sequence(480).is_none());
        assert!(Candidate::from_sequence(u16::MAX).is_none());
    }

    #[test]
    fn test_pair_index_walks_clock_major() {
        let mut expected = 0;
        for clock in LineId::ALL {
            for data in LineId::ALL {
                if clock == data {
                    continue;
                }
                assert_eq!(pair_index(clock, data), expected);
                assert_eq!(pair_at(expected), Some((clock, data)));
                expected += 1;
            }
        }
        assert_eq!(expected, PAIR_COUNT);
        assert_eq!(pair_at(PAIR_COUNT), None);
    }

    #[test]
    fn test_fixed_levels_map_bits_lsb_first() {
        let c = Candidate::new(line(0), line(1), 0b0101).unwrap();
        let mut levels = c.fixed_levels();

        assert_eq!(levels.next(), Some((line(2), true)));
        assert_eq!(levels.next(), Some((line(3), false)));
        assert_eq!(levels.next(), Some((line(4), true)));
        assert_eq!(levels.next(), Some((line(5), false)));
        assert_eq!(levels.next(), None);
    }

    proptest! {
        #[test]
        fn prop_candidate_roles_are_disjoint(seq in 0u16..CANDIDATE_COUNT) {
            let c = Candidate::from_sequence(seq).unwrap();

            prop_assert_ne!(c.clock(), c.data());
            prop_assert_eq!(c.sequence_number(), seq);

            let fixed = c.fixed_lines();
            prop_assert!(!fixed.contains(&c.clock()));
            prop_assert!(!fixed.contains(&c.data()));
            prop_assert!(fixed.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn prop_new_agrees_with_sequence(
            clock in 0u8..6,
            data in 0u8..6,
            state in 0u8..16,
        ) {
            prop_assume!(clock != data);
            let c = Candidate::new(line(clock), line(data), state).unwrap();
            prop_assert_eq!(Candidate::from_sequence(c.sequence_number()), Some(c));
        }
    }
}
