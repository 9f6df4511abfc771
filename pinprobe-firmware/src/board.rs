//! Bench wiring for a Raspberry Pi Pico
//!
//! | Signal      | GPIO | Notes                               |
//! |-------------|------|-------------------------------------|
//! | Line 0      | 10   | display connector pin 1             |
//! | Line 1      | 11   | display connector pin 2             |
//! | Line 2      | 12   | display connector pin 3             |
//! | Line 3      | 13   | display connector pin 4             |
//! | Line 4      | 14   | display connector pin 7             |
//! | Line 5      | 15   | display connector pin 8             |
//! | I2C0 SDA    | 16   | INA219, internal pull-ups, 400 kHz  |
//! | I2C0 SCL    | 17   |                                     |
//! | Abort       | 22   | push button to GND, internal pull-up|

use defmt::*;
use embassy_rp::peripherals::{CORE1, I2C0};
use embassy_rp::{Peri, Peripherals};
use pinprobe_core::search::{LineId, LINE_COUNT};
use pinprobe_core::stimulus::LineBank;
use pinprobe_hal::I2cConfig;
use pinprobe_hal_rp2040::{Line, PulledUpInput, RpI2c};

/// Sensor bus settings
const SENSOR_I2C: I2cConfig = I2cConfig::FAST;

/// GPIO number behind each candidate line
pub const LINE_GPIOS: [u8; LINE_COUNT] = [10, 11, 12, 13, 14, 15];

/// GPIO number for a line, for log output
pub fn gpio_of(line: LineId) -> u8 {
    LINE_GPIOS[line.index()]
}

/// Peripherals handed to the two cores
pub struct Board {
    pub core1: Peri<'static, CORE1>,
    /// Candidate lines, owned by the worker
    pub lines: LineBank<Line<'static>>,
    /// Sensor bus, owned by the controller
    pub i2c: RpI2c<'static, I2C0>,
    pub abort: PulledUpInput<'static>,
}

impl Board {
    pub fn new(p: Peripherals) -> Self {
        let lines = LineBank::new([
            Line::new(p.PIN_10),
            Line::new(p.PIN_11),
            Line::new(p.PIN_12),
            Line::new(p.PIN_13),
            Line::new(p.PIN_14),
            Line::new(p.PIN_15),
        ]);

        debug!("Sensor bus on I2C0: {}", SENSOR_I2C);

        Self {
            core1: p.CORE1,
            lines,
            i2c: RpI2c::new(p.I2C0, p.PIN_17, p.PIN_16, SENSOR_I2C),
            abort: PulledUpInput::new(p.PIN_22),
        }
    }
}
