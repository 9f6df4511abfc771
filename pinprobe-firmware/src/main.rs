//! pinprobe - Serial Display Protocol Discovery Firmware
//!
//! Brute-forces the line roles of an unknown multiplexed display module.
//! Core 1 clocks test patterns into every (clock, data, strap) assignment
//! of six candidate lines; core 0 watches the module's supply current
//! through an INA219 and labels every trial.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Executor;
use embassy_rp::multicore::{spawn_core1, Stack};
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use pinprobe_core::config::ProbeConfig;

use crate::board::Board;

mod board;
mod channels;
mod config;
mod report;
mod tasks;

/// Core 1 stack; the worker task is small and never recurses
static CORE1_STACK: ConstStaticCell<Stack<8192>> = ConstStaticCell::new(Stack::new());

static EXECUTOR0: StaticCell<Executor> = StaticCell::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

// Shared read-only by both cores for the life of the firmware
static CONFIG: StaticCell<ProbeConfig> = StaticCell::new();

#[cortex_m_rt::entry]
fn main() -> ! {
    info!("pinprobe firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static ProbeConfig = CONFIG.init(config::load_config());
    info!(
        "Search window {}..{}, {} patterns x {} repeats",
        config.search.start_at,
        config.search.end_at,
        config.stimulus.patterns.len(),
        config.stimulus.timing.repeats_per_pattern
    );
    info!(
        "Nominal trial {} ms, whole window {} s",
        config.stimulus.trial_duration_us() / 1000,
        config.run_duration_us() / 1_000_000
    );

    let Board {
        core1,
        lines,
        i2c,
        abort,
    } = Board::new(p);

    spawn_core1(core1, CORE1_STACK.take(), move || {
        let executor1 = EXECUTOR1.init(Executor::new());
        executor1.run(|spawner| spawner.spawn(tasks::worker_task(lines, config)).unwrap());
    });
    info!("Core 1 started");

    let executor0 = EXECUTOR0.init(Executor::new());
    executor0.run(|spawner| {
        spawner
            .spawn(tasks::controller_task(i2c, abort, config))
            .unwrap();
    });
}
