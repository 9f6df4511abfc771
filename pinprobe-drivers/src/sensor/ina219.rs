//! INA219 high-side current monitor (I2C)
//!
//! # Register map
//!
//! All registers are 16 bits, transferred MSB first:
//!
//! | Addr | Register      | Access |
//! |------|---------------|--------|
//! | 0x00 | Configuration | R/W    |
//! | 0x01 | Shunt voltage | R      |
//! | 0x02 | Bus voltage   | R      |
//! | 0x03 | Power         | R      |
//! | 0x04 | Current       | R      |
//! | 0x05 | Calibration   | R/W    |
//!
//! # Calibration
//!
//! ```text
//! current_lsb = expected_max_amps / 2^15
//! calibration = trunc(0.04096 / (current_lsb * shunt_ohms))
//! amps        = (i16)current_register * current_lsb
//! ```

use pinprobe_core::traits::{CurrentSensor, SensorError};
use pinprobe_hal::I2cBus;

/// Default 7-bit address (A0 and A1 tied to GND)
pub const INA219_ADDRESS: u8 = 0x40;

/// Fixed scaling constant from the datasheet calibration equation
const CALIBRATION_SCALE: f32 = 0.04096;

/// Full-scale count of the signed current register
const CURRENT_FULL_SCALE: f32 = 32768.0;

/// INA219 registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Configuration = 0x00,
    ShuntVoltage = 0x01,
    BusVoltage = 0x02,
    Power = 0x03,
    Current = 0x04,
    Calibration = 0x05,
}

impl Register {
    /// Every register in address order
    pub const ALL: [Register; 6] = [
        Register::Configuration,
        Register::ShuntVoltage,
        Register::BusVoltage,
        Register::Power,
        Register::Current,
        Register::Calibration,
    ];

    /// Register pointer value
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Short name for register dumps
    pub const fn name(self) -> &'static str {
        match self {
            Register::Configuration => "config",
            Register::ShuntVoltage => "shunt",
            Register::BusVoltage => "bus",
            Register::Power => "power",
            Register::Current => "current",
            Register::Calibration => "calib",
        }
    }
}

/// Bus voltage range (config bit 13)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusRange {
    V16 = 0,
    #[default]
    V32 = 1,
}

/// Shunt PGA gain and range (config bits 12:11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PgaGain {
    /// +/-40 mV
    Div1 = 0b00,
    /// +/-80 mV
    #[default]
    Div2 = 0b01,
    /// +/-160 mV
    Div4 = 0b10,
    /// +/-320 mV
    Div8 = 0b11,
}

/// ADC resolution or averaging (config bits 10:7 for bus, 6:3 for shunt)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcMode {
    Bits9 = 0b0000,
    Bits10 = 0b0001,
    Bits11 = 0b0010,
    Bits12 = 0b0011,
    Samples2 = 0b1001,
    Samples4 = 0b1010,
    Samples8 = 0b1011,
    Samples16 = 0b1100,
    Samples32 = 0b1101,
    Samples64 = 0b1110,
    /// 12-bit, 128-sample average (68.1 ms per conversion)
    #[default]
    Samples128 = 0b1111,
}

/// Operating mode (config bits 2:0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    PowerDown = 0b000,
    ShuntTriggered = 0b001,
    BusTriggered = 0b010,
    ShuntBusTriggered = 0b011,
    AdcOff = 0b100,
    ShuntContinuous = 0b101,
    BusContinuous = 0b110,
    #[default]
    ShuntBusContinuous = 0b111,
}

/// INA219 configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ina219Config {
    /// 7-bit I2C address
    pub address: u8,
    pub bus_range: BusRange,
    pub gain: PgaGain,
    pub bus_adc: AdcMode,
    pub shunt_adc: AdcMode,
    pub mode: OperatingMode,
    /// Largest current to resolve (amps)
    pub expected_max_amps: f32,
    /// Shunt resistance (ohms)
    pub shunt_ohms: f32,
}

impl Default for Ina219Config {
    fn default() -> Self {
        Self {
            address: INA219_ADDRESS,
            bus_range: BusRange::default(),
            gain: PgaGain::default(),
            bus_adc: AdcMode::default(),
            shunt_adc: AdcMode::default(),
            mode: OperatingMode::default(),
            expected_max_amps: 0.5,
            shunt_ohms: 0.1,
        }
    }
}

impl Ina219Config {
    /// Configuration register value
    pub fn config_word(&self) -> u16 {
        (self.bus_range as u16) << 13
            | (self.gain as u16) << 11
            | (self.bus_adc as u16) << 7
            | (self.shunt_adc as u16) << 3
            | self.mode as u16
    }

    /// Amps per count of the current register
    pub fn current_lsb(&self) -> f32 {
        self.expected_max_amps / CURRENT_FULL_SCALE
    }

    fn raw_calibration(&self) -> f32 {
        CALIBRATION_SCALE / (self.current_lsb() * self.shunt_ohms)
    }

    /// Calibration register value
    ///
    /// Truncated and wrapped to 16 bits; [`validate`](Self::validate)
    /// rejects parameters that would wrap.
    pub fn calibration_value(&self) -> u16 {
        (self.raw_calibration() as u32) as u16
    }

    /// Check that the calibration fits the 16-bit register
    pub fn validate(&self) -> Result<(), SensorError> {
        let raw = self.raw_calibration();
        if !raw.is_finite() || !(1.0..65536.0).contains(&raw) {
            return Err(SensorError::InvalidCalibration);
        }
        Ok(())
    }
}

/// INA219 driver
pub struct Ina219<I2C> {
    i2c: I2C,
    config: Ina219Config,
}

impl<I2C: I2cBus> Ina219<I2C> {
    /// Create a driver; nothing is written until [`CurrentSensor::init`]
    pub fn new(i2c: I2C, config: Ina219Config) -> Self {
        Self { i2c, config }
    }

    pub fn config(&self) -> &Ina219Config {
        &self.config
    }

    /// Write a 16-bit register
    pub fn write_register(&mut self, reg: Register, value: u16) -> Result<(), SensorError> {
        let [msb, lsb] = value.to_be_bytes();
        self.i2c
            .write(self.config.address, &[reg.addr(), msb, lsb])
            .map_err(|_| SensorError::Bus)
    }

    /// Read a 16-bit register
    pub fn read_register(&mut self, reg: Register) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.config.address, &[reg.addr()], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read every register, for diagnostics
    pub fn dump_registers(&mut self) -> [(Register, Result<u16, SensorError>); 6] {
        Register::ALL.map(|reg| (reg, self.read_register(reg)))
    }

    /// Validate the calibration and write the configuration register
    ///
    /// Nothing is written if the calibration would not fit the register.
    pub fn configure(&mut self) -> Result<(), SensorError> {
        self.config.validate()?;
        self.write_register(Register::Configuration, self.config.config_word())
    }

    /// Write the calibration register; current reads are zero until this runs
    pub fn calibrate(&mut self) -> Result<(), SensorError> {
        self.config.validate()?;
        self.write_register(Register::Calibration, self.config.calibration_value())
    }

    /// Signed raw current register
    pub fn raw_current(&mut self) -> Result<i16, SensorError> {
        self.read_register(Register::Current).map(|raw| raw as i16)
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2cBus> CurrentSensor for Ina219<I2C> {
    fn init(&mut self) -> Result<(), SensorError> {
        self.configure()?;
        self.calibrate()
    }

    fn measure_amps(&mut self) -> Result<f32, SensorError> {
        let raw = self.raw_current()?;
        Ok(f32::from(raw) * self.config.current_lsb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Error returned by the fake bus
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct BusFault;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Transfer {
        Write(u8, Vec<u8>),
        WriteRead(u8, Vec<u8>),
    }

    /// Register file behind a fake bus
    #[derive(Default)]
    struct MockBus {
        regs: [u16; 6],
        transfers: Vec<Transfer>,
        fail: bool,
    }

    impl I2cBus for MockBus {
        type Error = BusFault;

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusFault> {
            if self.fail {
                return Err(BusFault);
            }
            self.transfers.push(Transfer::Write(address, data.to_vec()));
            if let [reg, msb, lsb] = *data {
                self.regs[reg as usize] = u16::from_be_bytes([msb, lsb]);
            }
            Ok(())
        }

        fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<(), BusFault> {
            Err(BusFault)
        }

        fn write_read(
            &mut self,
            address: u8,
            write_data: &[u8],
            read_buf: &mut [u8],
        ) -> Result<(), BusFault> {
            if self.fail {
                return Err(BusFault);
            }
            self.transfers
                .push(Transfer::WriteRead(address, write_data.to_vec()));
            let value = self.regs[write_data[0] as usize];
            read_buf.copy_from_slice(&value.to_be_bytes());
            Ok(())
        }
    }

    #[test]
    fn test_default_config_word() {
        assert_eq!(Ina219Config::default().config_word(), 0x2FFF);
    }

    #[test]
    fn test_config_word_fields() {
        let config = Ina219Config {
            bus_range: BusRange::V16,
            gain: PgaGain::Div8,
            bus_adc: AdcMode::Bits12,
            shunt_adc: AdcMode::Samples2,
            mode: OperatingMode::ShuntContinuous,
            ..Ina219Config::default()
        };
        // 0 | 11 | 0011 | 1001 | 101
        assert_eq!(config.config_word(), 0b0_0_11_0011_1001_101);
    }

    #[test]
    fn test_calibration_for_half_amp_on_100_milliohm() {
        let config = Ina219Config::default();
        assert!((config.current_lsb() - 1.526e-5).abs() < 1e-8);
        assert_eq!(config.calibration_value(), 26843);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_calibration_overflow_rejected() {
        let config = Ina219Config {
            expected_max_amps: 0.01,
            shunt_ohms: 0.01,
            ..Ina219Config::default()
        };
        assert_eq!(config.validate(), Err(SensorError::InvalidCalibration));

        let config = Ina219Config {
            shunt_ohms: 0.0,
            ..Ina219Config::default()
        };
        assert_eq!(config.validate(), Err(SensorError::InvalidCalibration));
    }

    #[test]
    fn test_init_writes_config_then_calibration() {
        let mut sensor = Ina219::new(MockBus::default(), Ina219Config::default());
        sensor.init().unwrap();

        let bus = sensor.release();
        assert_eq!(
            bus.transfers,
            vec![
                Transfer::Write(0x40, vec![0x00, 0x2F, 0xFF]),
                Transfer::Write(0x40, vec![0x05, 0x68, 0xDB]),
            ]
        );
    }

    #[test]
    fn test_configure_then_calibrate_in_steps() {
        let mut sensor = Ina219::new(MockBus::default(), Ina219Config::default());

        sensor.configure().unwrap();
        let before = sensor.dump_registers();
        assert_eq!(before[0], (Register::Configuration, Ok(0x2FFF)));
        assert_eq!(before[5], (Register::Calibration, Ok(0)));

        sensor.calibrate().unwrap();
        assert_eq!(sensor.read_register(Register::Calibration), Ok(0x68DB));
    }

    #[test]
    fn test_configure_rejects_bad_calibration_without_writing() {
        let config = Ina219Config {
            shunt_ohms: 0.0,
            ..Ina219Config::default()
        };
        let mut sensor = Ina219::new(MockBus::default(), config);
        assert_eq!(sensor.configure(), Err(SensorError::InvalidCalibration));
        assert_eq!(sensor.calibrate(), Err(SensorError::InvalidCalibration));
        assert!(sensor.release().transfers.is_empty());
    }

    #[test]
    fn test_init_rejects_bad_calibration_without_writing() {
        let config = Ina219Config {
            expected_max_amps: 0.0,
            ..Ina219Config::default()
        };
        let mut sensor = Ina219::new(MockBus::default(), config);
        assert_eq!(sensor.init(), Err(SensorError::InvalidCalibration));
        assert!(sensor.release().transfers.is_empty());
    }

    #[test]
    fn test_measure_scales_current_register() {
        let mut bus = MockBus::default();
        bus.regs[Register::Current as usize] = 0x0100;
        let mut sensor = Ina219::new(bus, Ina219Config::default());

        let amps = sensor.measure_amps().unwrap();
        assert!((amps - 0.00391).abs() < 1e-5);
    }

    #[test]
    fn test_measure_negative_current() {
        let mut bus = MockBus::default();
        bus.regs[Register::Current as usize] = 0xFF00;
        let mut sensor = Ina219::new(bus, Ina219Config::default());

        assert_eq!(sensor.raw_current(), Ok(-256));
        assert!(sensor.measure_amps().unwrap() < 0.0);
    }

    #[test]
    fn test_read_register_framing() {
        let mut bus = MockBus::default();
        bus.regs[Register::BusVoltage as usize] = 0x1234;
        let mut sensor = Ina219::new(bus, Ina219Config::default());

        assert_eq!(sensor.read_register(Register::BusVoltage), Ok(0x1234));
        assert_eq!(
            sensor.release().transfers,
            vec![Transfer::WriteRead(0x40, vec![0x02])]
        );
    }

    #[test]
    fn test_dump_registers() {
        let mut sensor = Ina219::new(MockBus::default(), Ina219Config::default());
        sensor.init().unwrap();

        let dump = sensor.dump_registers();
        assert_eq!(dump[0], (Register::Configuration, Ok(0x2FFF)));
        assert_eq!(dump[5], (Register::Calibration, Ok(26843)));
        assert_eq!(dump[2].0.name(), "bus");
    }

    #[test]
    fn test_bus_errors_map_to_sensor_error() {
        let bus = MockBus {
            fail: true,
            ..MockBus::default()
        };
        let mut sensor = Ina219::new(bus, Ina219Config::default());
        assert_eq!(sensor.init(), Err(SensorError::Bus));
        assert_eq!(sensor.measure_amps(), Err(SensorError::Bus));
        assert!(sensor
            .dump_registers()
            .iter()
            .all(|(_, r)| *r == Err(SensorError::Bus)));
    }
}
