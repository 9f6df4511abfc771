//! Deterministic enumeration of the search space

use super::candidate::{Candidate, CANDIDATE_COUNT, STRAP_STATE_COUNT};
use super::line::{LineId, LINE_COUNT};

/// Iterator over candidates in enumeration order
///
/// Walks clock lines in canonical order, then data lines (skipping the
/// clock line), then strap states 0-15. The walk can be restricted to a
/// window of sequence numbers so an interrupted search can be resumed.
#[derive(Debug, Clone)]
pub struct Candidates {
    clock: u8,
    data: u8,
    state: u8,
    remaining: u16,
}

impl Candidates {
    /// Enumerate the full search space
    pub fn new() -> Self {
        Self::window(0, CANDIDATE_COUNT)
    }

    /// Enumerate sequence numbers `start..end`
    ///
    /// `end` is clamped to the search space size; an empty or inverted
    /// window yields nothing.
    pub fn window(start: u16, end: u16) -> Self {
        let end = end.min(CANDIDATE_COUNT);
        let start = start.min(end);

        match Candidate::from_sequence(start) {
            Some(first) => Self {
                clock: first.clock().index() as u8,
                data: first.data().index() as u8,
                state: first.fixed_state(),
                remaining: end - start,
            },
            None => Self {
                clock: LINE_COUNT as u8,
                data: 0,
                state: 0,
                remaining: 0,
            },
        }
    }

    /// Move the cursor to the next (clock, data, state) triple
    fn advance(&mut self) {
        self.state += 1;
        if u16::from(self.state) < STRAP_STATE_COUNT {
            return;
        }
        self.state = 0;

        loop {
            self.data += 1;
            if self.data as usize >= LINE_COUNT {
                self.data = 0;
                self.clock += 1;
                if self.clock as usize >= LINE_COUNT {
                    return;
                }
            }
            if self.data != self.clock {
                return;
            }
        }
    }
}

impl Default for Candidates {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Candidates {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.remaining == 0 {
            return None;
        }

        let candidate = Candidate::new(
            LineId::new(self.clock)?,
            LineId::new(self.data)?,
            self.state,
        )?;

        self.remaining -= 1;
        self.advance();
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Candidates {}
