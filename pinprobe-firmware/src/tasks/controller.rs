//! Trial controller task (core 0)

use defmt::*;
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Timer};
use pinprobe_core::config::ProbeConfig;
use pinprobe_core::controller::Controller;
use pinprobe_core::traits::AbortButton;
use pinprobe_drivers::sensor::{Ina219, Ina219Config};
use pinprobe_hal::I2cBus;
use pinprobe_hal_rp2040::{PulledUpInput, RpI2c};

use crate::channels::HANDSHAKE;
use crate::report::DefmtReporter;

/// Time for the sensor to come out of power-on reset
const SENSOR_POWER_UP_MS: u64 = 100;

/// Time for the first averaged conversion after calibration
const CALIBRATION_SETTLE_MS: u64 = 1000;

/// Controller task - calibrates the sensor, then drives the search
#[embassy_executor::task]
pub async fn controller_task(
    i2c: RpI2c<'static, I2C0>,
    abort: PulledUpInput<'static>,
    config: &'static ProbeConfig,
) {
    info!("Controller task started on core 0");

    Timer::after_millis(SENSOR_POWER_UP_MS).await;

    let mut sensor = Ina219::new(
        i2c,
        Ina219Config {
            expected_max_amps: config.oracle.expected_max_amps,
            shunt_ohms: config.oracle.shunt_ohms,
            ..Ina219Config::default()
        },
    );

    if let Err(e) = sensor.configure() {
        error!("INA219 configuration failed: {}", e);
        error!("Search not started; worker stays parked with lines low");
        return;
    }
    dump_registers(&mut sensor, "before calibration");

    if let Err(e) = sensor.calibrate() {
        error!("INA219 calibration failed: {}", e);
        error!("Search not started; worker stays parked with lines low");
        return;
    }
    info!(
        "INA219 configured: config={=u16:#06x} calibration={} lsb={} A",
        sensor.config().config_word(),
        sensor.config().calibration_value(),
        sensor.config().current_lsb()
    );

    Timer::after_millis(CALIBRATION_SETTLE_MS).await;
    dump_registers(&mut sensor, "after calibration");

    let mut controller = Controller::new(
        HANDSHAKE.controller(),
        sensor,
        Delay,
        AbortButton::new(abort),
        DefmtReporter::new(config.search.len()),
        &config.oracle,
        config.search.start_at,
    );

    let summary = controller.run().await;
    info!(
        "Controller idle after {} trials; reset to search again",
        summary.trials
    );
}

fn dump_registers<I2C: I2cBus>(sensor: &mut Ina219<I2C>, when: &str) {
    info!("INA219 registers {}:", when);
    for (reg, value) in sensor.dump_registers() {
        match value {
            Ok(value) => info!("  {=u8:#04x} {}: {=u16:#06x}", reg.addr(), reg.name(), value),
            Err(e) => warn!("  {=u8:#04x} {}: read failed ({})", reg.addr(), reg.name(), e),
        }
    }
}
