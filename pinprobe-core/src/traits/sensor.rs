//! Current sensor trait

/// Errors that can occur while reading the current sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transfer failed (NACK, arbitration loss, wiring fault)
    Bus,
    /// Calibration parameters do not fit the sensor's registers
    InvalidCalibration,
}

/// Trait for current sensors used as the trial oracle
///
/// Implementations should handle the specific sensor type and its
/// calibration; callers only see amperes.
pub trait CurrentSensor {
    /// Configure and calibrate the sensor
    ///
    /// Must be called once before the first [`measure_amps`](Self::measure_amps).
    fn init(&mut self) -> Result<(), SensorError>;

    /// Read the current through the shunt in amperes
    ///
    /// Takes `&mut self` because bus reads require mutable access.
    fn measure_amps(&mut self) -> Result<f32, SensorError>;
}
