//! Hardware abstraction traits
//!
//! These traits define the interface between the search logic and the
//! hardware-specific implementations.

pub mod abort;
pub mod sensor;

pub use abort::{AbortButton, AbortInput, NeverAbort};
pub use sensor::{CurrentSensor, SensorError};
