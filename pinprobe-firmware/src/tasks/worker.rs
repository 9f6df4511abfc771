//! Stimulus worker task (core 1)

use defmt::*;
use embassy_time::Delay;
use pinprobe_core::config::ProbeConfig;
use pinprobe_core::search::Candidates;
use pinprobe_core::stimulus::{LineBank, TrialExecutor};
use pinprobe_core::worker::Worker;
use pinprobe_hal_rp2040::Line;

use crate::channels::HANDSHAKE;

/// Worker task - serves Go tokens until the window is exhausted
///
/// Never returns: once the search is over it parks with all lines low.
#[embassy_executor::task]
pub async fn worker_task(lines: LineBank<Line<'static>>, config: &'static ProbeConfig) {
    let executor = TrialExecutor::new(
        lines,
        Delay,
        config.stimulus.timing,
        &config.stimulus.patterns,
    );
    let candidates = Candidates::window(config.search.start_at, config.search.end_at);
    let mut worker = Worker::new(HANDSHAKE.worker(), executor, candidates);

    info!(
        "Worker started on core 1, {} candidates from {}",
        worker.remaining(),
        config.search.start_at
    );

    let summary = worker.run().await;

    info!(
        "Worker done: {} trials, {} clock pulses",
        summary.trials, summary.clock_pulses
    );
    if !worker.is_quiescent() {
        error!("Lines not low after search");
    }

    // Keep the lines owned (and low) forever
    core::future::pending::<()>().await;
}
