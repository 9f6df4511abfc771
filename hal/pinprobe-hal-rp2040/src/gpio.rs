//! GPIO wrappers implementing the `pinprobe-hal` pin traits

use embassy_rp::gpio::{Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;
use pinprobe_hal::{InputPin, OutputPin};

/// A push-pull candidate line, driven low on creation
pub struct Line<'d> {
    output: Output<'d>,
}

impl<'d> Line<'d> {
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            output: Output::new(pin, Level::Low),
        }
    }
}

impl OutputPin for Line<'_> {
    fn set_high(&mut self) {
        self.output.set_high();
    }

    fn set_low(&mut self) {
        self.output.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.output.is_set_high()
    }
}

/// An input with the internal pull-up enabled
pub struct PulledUpInput<'d> {
    input: Input<'d>,
}

impl<'d> PulledUpInput<'d> {
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            input: Input::new(pin, Pull::Up),
        }
    }
}

impl InputPin for PulledUpInput<'_> {
    fn is_high(&self) -> bool {
        self.input.is_high()
    }
}
