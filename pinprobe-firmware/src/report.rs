//! Console output for controller events

use defmt::*;
use pinprobe_core::controller::{SearchOutcome, SearchSummary, TrialReport, TrialReporter, TrialStats};
use pinprobe_core::search::Candidate;
use pinprobe_core::traits::SensorError;

use crate::board::gpio_of;

/// Prints every reading and trial result over RTT
pub struct DefmtReporter {
    window: u16,
}

impl DefmtReporter {
    /// `window` is the number of trials the search will run
    pub fn new(window: u16) -> Self {
        Self { window }
    }
}

impl TrialReporter for DefmtReporter {
    fn baseline_measured(&mut self, baseline: &TrialStats) {
        match baseline.mean() {
            Some(mean) => info!(
                "Baseline {} A over {} samples ({} faults)",
                mean,
                baseline.samples(),
                baseline.faults()
            ),
            None => warn!(
                "No baseline reading succeeded ({} faults), trials will not be labelled",
                baseline.faults()
            ),
        }
    }

    fn trial_started(&mut self, sequence: u16) {
        debug!("Trial {} started ({} in window)", sequence, self.window);
    }

    fn sample(&mut self, sequence: u16, amps: f32) {
        info!("[{=u16:03}] {} A", sequence, amps);
    }

    fn sample_failed(&mut self, sequence: u16, error: SensorError) {
        warn!("[{=u16:03}] sensor read failed: {}", sequence, error);
    }

    fn trial_finished(&mut self, report: &TrialReport) {
        let c = &report.candidate;
        let straps = c.fixed_lines();
        info!(
            "[{=u16:03}] clock=GP{} data=GP{} straps GP{}/GP{}/GP{}/GP{}={=u8:04b} peak={} rise={} samples={} faults={}",
            report.sequence,
            gpio_of(c.clock()),
            gpio_of(c.data()),
            gpio_of(straps[0]),
            gpio_of(straps[1]),
            gpio_of(straps[2]),
            gpio_of(straps[3]),
            c.fixed_state(),
            report.stats.peak(),
            report.response_amps,
            report.stats.samples(),
            report.stats.faults(),
        );
        if report.responded {
            info!("[{=u16:03}] RESPONSE", report.sequence);
        }
    }

    fn out_of_step(&mut self, expected: u16, reported: &Candidate) {
        warn!(
            "Worker ran trial {} while {} was expected, renumbering",
            reported.sequence_number(),
            expected
        );
    }

    fn search_finished(&mut self, summary: &SearchSummary) {
        info!("==================== Search complete ====================");
        match summary.outcome {
            SearchOutcome::Exhausted => info!("All candidates tried"),
            SearchOutcome::Aborted => warn!("Aborted by operator"),
        }
        info!(
            "{} trials, {} responders, {} sensor faults",
            summary.trials, summary.responders, summary.faults
        );
        match summary.baseline_amps {
            Some(baseline) => info!("Baseline {} A", baseline),
            None => warn!("No baseline; responses were not labelled"),
        }
        for (rank, detection) in summary.detections().iter().enumerate() {
            let c = &detection.candidate;
            info!(
                "#{}: trial {} clock=GP{} data=GP{} straps={=u8:04b} rise={} A",
                rank + 1,
                c.sequence_number(),
                gpio_of(c.clock()),
                gpio_of(c.data()),
                c.fixed_state(),
                detection.response_amps
            );
        }
        info!("=========================================================");
    }
}
