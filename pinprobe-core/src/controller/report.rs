//! Trial reports and the search summary

use heapless::Vec;

use super::stats::TrialStats;
use crate::search::Candidate;
use crate::traits::SensorError;

/// Strongest responders kept in the summary
pub const MAX_DETECTIONS: usize = 8;

/// Outcome of one trial as seen by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrialReport {
    /// Controller's trial counter
    pub sequence: u16,
    /// Candidate the worker says it ran
    pub candidate: Candidate,
    /// Readings taken while the trial ran
    pub stats: TrialStats,
    /// Peak rise over the baseline; `None` without a trial reading or a
    /// baseline to compare against
    pub response_amps: Option<f32>,
    /// Rise reached the response threshold
    pub responded: bool,
}

/// A candidate that drew noticeably more current than the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Detection {
    pub candidate: Candidate,
    pub response_amps: f32,
}

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SearchOutcome {
    /// Every candidate in the window was tried
    Exhausted,
    /// The operator stopped the search between trials
    Aborted,
}

/// Totals for a finished search
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SearchSummary {
    /// Mean quiescent current (amps); `None` if every baseline read failed
    pub baseline_amps: Option<f32>,
    /// Trials completed
    pub trials: u16,
    /// Trials labelled as responses
    pub responders: u16,
    /// Failed sensor readings across all trials
    pub faults: u32,
    pub outcome: SearchOutcome,
    detections: Vec<Detection, MAX_DETECTIONS>,
}

impl SearchSummary {
    /// Empty summary against a measured baseline
    pub fn new(baseline_amps: Option<f32>) -> Self {
        Self {
            baseline_amps,
            trials: 0,
            responders: 0,
            faults: 0,
            outcome: SearchOutcome::Exhausted,
            detections: Vec::new(),
        }
    }

    /// Fold one trial into the totals
    pub fn record(&mut self, report: &TrialReport) {
        self.trials = self.trials.saturating_add(1);
        self.faults = self.faults.saturating_add(u32::from(report.stats.faults()));

        if !report.responded {
            return;
        }
        self.responders = self.responders.saturating_add(1);

        if let Some(response_amps) = report.response_amps {
            self.insert(Detection {
                candidate: report.candidate,
                response_amps,
            });
        }
    }

    /// Keep detections ordered strongest first; ties keep trial order
    fn insert(&mut self, detection: Detection) {
        let pos = self
            .detections
            .iter()
            .position(|d| d.response_amps < detection.response_amps)
            .unwrap_or(self.detections.len());

        if pos >= MAX_DETECTIONS {
            return;
        }
        if self.detections.is_full() {
            self.detections.pop();
        }
        let _ = self.detections.insert(pos, detection);
    }

    /// Strongest responders, strongest first
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }
}

/// Sink for controller events
///
/// The core never logs; the firmware implements this to print readings.
/// Every hook defaults to doing nothing.
pub trait TrialReporter {
    /// Quiescent readings were taken before the first trial
    fn baseline_measured(&mut self, _baseline: &TrialStats) {}

    /// A Go token was handed to the worker
    fn trial_started(&mut self, _sequence: u16) {}

    /// A reading was taken during a trial
    fn sample(&mut self, _sequence: u16, _amps: f32) {}

    /// A reading failed during a trial
    fn sample_failed(&mut self, _sequence: u16, _error: SensorError) {}

    fn trial_finished(&mut self, _report: &TrialReport) {}

    /// The worker ran a different candidate than the controller expected
    fn out_of_step(&mut self, _expected: u16, _reported: &Candidate) {}

    fn search_finished(&mut self, _summary: &SearchSummary) {}
}
