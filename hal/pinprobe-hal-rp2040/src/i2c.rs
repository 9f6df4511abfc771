//! Blocking I2C master implementing `pinprobe_hal::I2cBus`

use embassy_rp::i2c::{self, AbortReason, Blocking, Error as I2cError, Instance, SclPin, SdaPin};
use embassy_rp::Peri;
use pinprobe_hal::{I2cBus, I2cConfig};

/// I2C error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Bus error
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received (device absent or register refused)
    Nack,
    /// Transfer length rejected by the controller
    InvalidLength,
    /// Address outside the 7-bit range or reserved
    InvalidAddress,
    /// Other error
    Other,
}

impl From<I2cError> for I2cBusError {
    fn from(e: I2cError) -> Self {
        match e {
            I2cError::Abort(AbortReason::NoAcknowledge) => I2cBusError::Nack,
            I2cError::Abort(AbortReason::ArbitrationLoss) => I2cBusError::ArbitrationLost,
            I2cError::Abort(_) => I2cBusError::Bus,
            I2cError::InvalidReadBufferLength | I2cError::InvalidWriteBufferLength => {
                I2cBusError::InvalidLength
            }
            I2cError::AddressOutOfRange(_) | I2cError::AddressReserved(_) => {
                I2cBusError::InvalidAddress
            }
            #[allow(unreachable_patterns)]
            _ => I2cBusError::Other,
        }
    }
}

/// RP2040 I2C controller in blocking mode
pub struct RpI2c<'d, T: Instance> {
    bus: i2c::I2c<'d, T, Blocking>,
}

impl<'d, T: Instance> RpI2c<'d, T> {
    /// Set up the controller with the internal pull-ups enabled
    pub fn new(
        peri: Peri<'d, T>,
        scl: Peri<'d, impl SclPin<T>>,
        sda: Peri<'d, impl SdaPin<T>>,
        config: I2cConfig,
    ) -> Self {
        let mut rp_config = i2c::Config::default();
        rp_config.frequency = config.frequency;
        rp_config.sda_pullup = true;
        rp_config.scl_pullup = true;

        Self {
            bus: i2c::I2c::new_blocking(peri, scl, sda, rp_config),
        }
    }
}

impl<T: Instance> I2cBus for RpI2c<'_, T> {
    type Error = I2cBusError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.blocking_write(address, data).map_err(I2cBusError::from)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.blocking_read(address, buf).map_err(I2cBusError::from)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus
            .blocking_write_read(address, write_data, read_buf)
            .map_err(I2cBusError::from)
    }
}
