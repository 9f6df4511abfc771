//! Operator abort input

use pinprobe_hal::InputPin;

/// Source of an operator abort request
///
/// Polled by the controller between trials; a trial in progress is never
/// interrupted.
pub trait AbortInput {
    /// Check whether the operator asked to stop the search
    fn abort_requested(&mut self) -> bool;
}

/// Abort input that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl AbortInput for NeverAbort {
    fn abort_requested(&mut self) -> bool {
        false
    }
}

/// Active-low push button (pulled up, pressed = low)
pub struct AbortButton<P> {
    pin: P,
}

impl<P: InputPin> AbortButton<P> {
    /// Wrap a pulled-up input pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> AbortInput for AbortButton<P> {
    fn abort_requested(&mut self) -> bool {
        self.pin.is_low()
    }
}
