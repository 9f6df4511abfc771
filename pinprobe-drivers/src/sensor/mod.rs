//! Current sensor drivers

pub mod ina219;

pub use ina219::{
    AdcMode, BusRange, Ina219, Ina219Config, OperatingMode, PgaGain, Register, INA219_ADDRESS,
};
