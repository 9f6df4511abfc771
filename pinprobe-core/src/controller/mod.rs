//! Trial controller
//!
//! Runs on core 0. Drives the worker one trial at a time and labels each
//! trial from the current it drew:
//!
//! ```text
//! baseline: N readings with all lines low
//! loop:
//!     abort pressed?                 -> Aborted
//!     Go
//!     loop:
//!         read sensor
//!         wait Done or sample period
//!     Done(Exhausted)                -> Exhausted
//!     Done(Completed) -> label, report
//! ```
//!
//! The abort input is only checked between trials; a trial that has been
//! handed to the worker always runs to completion. If no baseline reading
//! succeeds the search still runs but no trial is labelled as a response.

mod report;
mod stats;

pub use report::{
    Detection, SearchOutcome, SearchSummary, TrialReport, TrialReporter, MAX_DETECTIONS,
};
pub use stats::TrialStats;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::config::OracleConfig;
use crate::handshake::{ControllerPort, TrialDone};
use crate::traits::{AbortInput, CurrentSensor};

/// Controller state
pub struct Controller<'h, M: RawMutex, S, D, A, R> {
    port: ControllerPort<'h, M>,
    sensor: S,
    delay: D,
    abort: A,
    reporter: R,
    config: OracleConfig,
    next_sequence: u16,
    baseline_amps: Option<f32>,
}

impl<'h, M, S, D, A, R> Controller<'h, M, S, D, A, R>
where
    M: RawMutex,
    S: CurrentSensor,
    D: DelayNs,
    A: AbortInput,
    R: TrialReporter,
{
    /// Create a controller
    ///
    /// `first_sequence` must match the worker's first candidate so trial
    /// numbers line up in the reports. The sensor must already be
    /// initialized.
    pub fn new(
        port: ControllerPort<'h, M>,
        sensor: S,
        delay: D,
        abort: A,
        reporter: R,
        config: &OracleConfig,
        first_sequence: u16,
    ) -> Self {
        Self {
            port,
            sensor,
            delay,
            abort,
            reporter,
            config: *config,
            next_sequence: first_sequence,
            baseline_amps: None,
        }
    }

    /// Sequence number expected from the next trial
    pub fn next_sequence(&self) -> u16 {
        self.next_sequence
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Run the search until the worker runs out of candidates or the
    /// operator aborts
    pub async fn run(&mut self) -> SearchSummary {
        let baseline = self.measure_baseline().await;
        self.reporter.baseline_measured(&baseline);
        self.baseline_amps = baseline.mean();

        let mut summary = SearchSummary::new(self.baseline_amps);

        summary.outcome = loop {
            if self.abort.abort_requested() {
                break SearchOutcome::Aborted;
            }

            match self.run_trial().await {
                Some(report) => summary.record(&report),
                None => break SearchOutcome::Exhausted,
            }
        };

        self.reporter.search_finished(&summary);
        summary
    }

    /// Take the configured number of readings with the worker idle
    pub async fn measure_baseline(&mut self) -> TrialStats {
        let mut stats = TrialStats::new();

        for _ in 0..self.config.baseline_samples {
            match self.sensor.measure_amps() {
                Ok(amps) => stats.record(amps),
                Err(_) => stats.record_fault(),
            }
            self.delay.delay_ms(self.config.sample_period_ms).await;
        }

        stats
    }

    /// Hand out one Go token and sample until the worker answers
    ///
    /// Returns `None` once the worker reports the enumeration exhausted.
    pub async fn run_trial(&mut self) -> Option<TrialReport> {
        let sequence = self.next_sequence;

        self.port.request_trial().await;
        self.reporter.trial_started(sequence);

        let mut stats = TrialStats::new();
        let done = loop {
            self.sample(sequence, &mut stats);

            let waited = select(
                self.port.wait_done(),
                self.delay.delay_ms(self.config.sample_period_ms),
            )
            .await;

            if let Either::First(done) = waited {
                break done;
            }
        };

        let candidate = match done {
            TrialDone::Completed(candidate) => candidate,
            TrialDone::Exhausted => return None,
        };

        let reported = candidate.sequence_number();
        if reported != sequence {
            self.reporter.out_of_step(sequence, &candidate);
        }
        self.next_sequence = reported.saturating_add(1);

        let response_amps = stats
            .peak()
            .zip(self.baseline_amps)
            .map(|(peak, baseline)| peak - baseline);
        let responded =
            response_amps.is_some_and(|rise| rise >= self.config.response_threshold_amps);

        let report = TrialReport {
            sequence: reported,
            candidate,
            stats,
            response_amps,
            responded,
        };
        self.reporter.trial_finished(&report);

        Some(report)
    }

    fn sample(&mut self, sequence: u16, stats: &mut TrialStats) {
        match self.sensor.measure_amps() {
            Ok(amps) => {
                stats.record(amps);
                self.reporter.sample(sequence, amps);
            }
            Err(e) => {
                stats.record_fault();
                self.reporter.sample_failed(sequence, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handshake::{Handshake, WorkerPort};
    use core::task::Poll;
    use crate::search::{Candidate, Candidates};
    use crate::traits::{NeverAbort, SensorError};
    use core::cell::Cell;
    use embassy_futures::{block_on, join::join, poll_once, yield_now};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    /// Delay that only yields, so joined futures take turns
    struct YieldDelay;

    impl DelayNs for YieldDelay {
        async fn delay_ns(&mut self, _ns: u32) {
            yield_now().await;
        }
    }

    /// Reads 10 mA while the fake display is lit, 1 mA otherwise
    struct BenchSensor<'a> {
        lit: &'a Cell<bool>,
        fail_every: Option<u32>,
        fail_first: u32,
        reads: u32,
    }

    impl<'a> BenchSensor<'a> {
        fn new(lit: &'a Cell<bool>) -> Self {
            Self {
                lit,
                fail_every: None,
                fail_first: 0,
                reads: 0,
            }
        }
    }

    impl CurrentSensor for BenchSensor<'_> {
        fn init(&mut self) -> Result<(), SensorError> {
            Ok(())
        }

        fn measure_amps(&mut self) -> Result<f32, SensorError> {
            self.reads += 1;
            let failed = self.reads <= self.fail_first
                || self.fail_every.is_some_and(|n| self.reads % n == 0);
            if failed {
                return Err(SensorError::Bus);
            }
            Ok(if self.lit.get() { 0.010 } else { 0.001 })
        }
    }

    /// Presses the button after a number of checks
    struct AbortAfter(u32);

    impl AbortInput for AbortAfter {
        fn abort_requested(&mut self) -> bool {
            if self.0 == 0 {
                return true;
            }
            self.0 -= 1;
            false
        }
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<u16>,
        finished: Vec<TrialReport>,
        failed: u32,
        out_of_step: Vec<(u16, u16)>,
        baseline_samples: u16,
        finished_search: Option<SearchOutcome>,
    }

    impl TrialReporter for Recorder {
        fn baseline_measured(&mut self, baseline: &TrialStats) {
            self.baseline_samples = baseline.samples();
        }

        fn trial_started(&mut self, sequence: u16) {
            self.started.push(sequence);
        }

        fn sample_failed(&mut self, _sequence: u16, _error: SensorError) {
            self.failed += 1;
        }

        fn trial_finished(&mut self, report: &TrialReport) {
            self.finished.push(*report);
        }

        fn out_of_step(&mut self, expected: u16, reported: &Candidate) {
            self.out_of_step.push((expected, reported.sequence_number()));
        }

        fn search_finished(&mut self, summary: &SearchSummary) {
            self.finished_search = Some(summary.outcome);
        }
    }

    fn oracle() -> OracleConfig {
        OracleConfig {
            baseline_samples: 3,
            response_threshold_amps: 0.005,
            ..OracleConfig::default()
        }
    }

    /// Stand-in for the worker: lights the display for `responders` and
    /// serves at most `limit` requests
    async fn fake_worker(
        port: WorkerPort<'_, NoopRawMutex>,
        mut candidates: Candidates,
        responders: &[u16],
        lit: &Cell<bool>,
        limit: usize,
    ) {
        for _ in 0..limit {
            port.wait_request().await;
            let Some(candidate) = candidates.next() else {
                port.report(TrialDone::Exhausted).await;
                return;
            };

            lit.set(responders.contains(&candidate.sequence_number()));
            for _ in 0..3 {
                yield_now().await;
            }
            lit.set(false);

            port.report(TrialDone::Completed(candidate)).await;
        }
    }

    #[test]
    fn test_search_labels_responders() {
        let handshake = Handshake::<NoopRawMutex>::new();
        let lit = Cell::new(false);
        let mut controller = Controller::new(
            handshake.controller(),
            BenchSensor::new(&lit),
            YieldDelay,
            NeverAbort,
            Recorder::default(),
            &oracle(),
            40,
        );

        let worker = fake_worker(
            handshake.worker(),
            Candidates::window(40, 48),
            &[42, 45],
            &lit,
            usize::MAX,
        );
        let (summary, ()) = block_on(join(controller.run(), worker));

        assert_eq!(summary.outcome, SearchOutcome::Exhausted);
        assert_eq!(summary.trials, 8);
        assert_eq!(summary.responders, 2);
        assert!((summary.baseline_amps.unwrap() - 0.001).abs() < 1e-6);

        let detected: Vec<u16> = summary
            .detections()
            .iter()
            .map(|d| d.candidate.sequence_number())
            .collect();
        assert_eq!(detected, [42, 45]);

        let recorder = controller.reporter();
        assert_eq!(recorder.baseline_samples, 3);
        // The exhausted request is started but never finished
        assert_eq!(recorder.started, (40..49).collect::<Vec<_>>());
        assert_eq!(recorder.finished.len(), 8);
        for report in &recorder.finished {
            assert!(report.stats.samples() >= 1);
            let lit_trial = report.sequence == 42 || report.sequence == 45;
            assert_eq!(report.responded, lit_trial);
        }
        assert!(recorder.out_of_step.is_empty());
        assert_eq!(recorder.finished_search, Some(SearchOutcome::Exhausted));
        assert_eq!(controller.next_sequence(), 48);
    }

    #[test]
    fn test_abort_between_trials() {
        let handshake = Handshake::<NoopRawMutex>::new();
        let lit = Cell::new(false);
        let mut controller = Controller::new(
            handshake.controller(),
            BenchSensor::new(&lit),
            YieldDelay,
            AbortAfter(2),
            Recorder::default(),
            &oracle(),
            0,
        );

        let worker = fake_worker(handshake.worker(), Candidates::new(), &[], &lit, 2);
        let (summary, ()) = block_on(join(controller.run(), worker));

        assert_eq!(summary.outcome, SearchOutcome::Aborted);
        assert_eq!(summary.trials, 2);
        assert_eq!(controller.reporter().started, [0, 1]);
        assert_eq!(poll_once(handshake.worker().wait_request()), Poll::Pending);
    }

    #[test]
    fn test_sensor_faults_are_counted_not_fatal() {
        let handshake = Handshake::<NoopRawMutex>::new();
        let lit = Cell::new(false);
        let mut sensor = BenchSensor::new(&lit);
        sensor.fail_every = Some(2);

        let mut controller = Controller::new(
            handshake.controller(),
            sensor,
            YieldDelay,
            NeverAbort,
            Recorder::default(),
            &oracle(),
            0,
        );

        let worker = fake_worker(handshake.worker(), Candidates::window(0, 4), &[], &lit, 10);
        let (summary, ()) = block_on(join(controller.run(), worker));

        assert_eq!(summary.outcome, SearchOutcome::Exhausted);
        assert_eq!(summary.trials, 4);
        assert!(summary.faults > 0);
        assert!(controller.reporter().failed >= summary.faults);
    }

    #[test]
    fn test_out_of_step_worker_resyncs_counter() {
        let handshake = Handshake::<NoopRawMutex>::new();
        let lit = Cell::new(false);
        let mut controller = Controller::new(
            handshake.controller(),
            BenchSensor::new(&lit),
            YieldDelay,
            NeverAbort,
            Recorder::default(),
            &oracle(),
            0,
        );

        let worker = fake_worker(handshake.worker(), Candidates::window(5, 7), &[], &lit, 10);
        let (summary, ()) = block_on(join(controller.run(), worker));

        assert_eq!(summary.trials, 2);
        let recorder = controller.reporter();
        assert_eq!(recorder.out_of_step, [(0, 5)]);
        assert_eq!(recorder.started, [0, 6, 7]);
        assert_eq!(recorder.finished[0].sequence, 5);
        assert_eq!(recorder.finished[1].sequence, 6);
    }

    #[test]
    fn test_no_baseline_skips_labelling() {
        let handshake = Handshake::<NoopRawMutex>::new();
        let lit = Cell::new(false);
        let mut sensor = BenchSensor::new(&lit);
        // Every baseline read fails; trial reads succeed
        sensor.fail_first = 3;

        let mut controller = Controller::new(
            handshake.controller(),
            sensor,
            YieldDelay,
            NeverAbort,
            Recorder::default(),
            &oracle(),
            0,
        );

        let worker = fake_worker(handshake.worker(), Candidates::window(0, 3), &[1], &lit, 10);
        let (summary, ()) = block_on(join(controller.run(), worker));

        assert_eq!(summary.baseline_amps, None);
        assert_eq!(summary.trials, 3);
        assert_eq!(summary.responders, 0);
        assert!(summary.detections().is_empty());

        let recorder = controller.reporter();
        assert_eq!(recorder.baseline_samples, 0);
        assert_eq!(recorder.finished.len(), 3);
        for report in &recorder.finished {
            assert!(report.stats.samples() >= 1);
            assert_eq!(report.response_amps, None);
            assert!(!report.responded);
        }
    }
}
