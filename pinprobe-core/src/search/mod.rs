//! Search space over line roles and strap states
//!
//! Six candidate lines run between the MCU and the display. Every trial
//! picks an ordered (clock, data) pair and drives the four remaining lines
//! to a fixed 4-bit strap state, giving 6 x 5 x 16 = 480 candidates.
//!
//! Candidates are numbered in enumeration order:
//!
//! ```text
//! sequence = 16 * pair_index + fixed_state
//! ```
//!
//! where `pair_index` counts ordered (clock, data) pairs, clock-major,
//! both in canonical line order.

pub mod candidate;
pub mod enumerate;
pub mod line;

pub use candidate::{
    fixed_lines, pair_at, pair_index, Candidate, CANDIDATE_COUNT, FIXED_LINE_COUNT, PAIR_COUNT,
    STRAP_STATE_COUNT,
};
pub use enumerate::Candidates;
pub use line::{LineId, LINE_COUNT};
