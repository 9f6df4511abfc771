//! Stimulus worker
//!
//! Runs on core 1. Owns the enumeration cursor and the six lines, and only
//! touches the lines once the controller has handed it a Go token:
//!
//! ```text
//! loop:
//!     quiesce
//!     wait Go
//!     next candidate?  yes -> run trial, quiesce, Done(Completed)
//!                      no  -> Done(Exhausted), stop
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;
use pinprobe_hal::OutputPin;

use crate::handshake::{TrialDone, WorkerPort};
use crate::search::Candidates;
use crate::stimulus::TrialExecutor;

/// Totals for the trials a worker executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WorkerSummary {
    /// Trials run to completion
    pub trials: u16,
    /// Rising clock edges across all trials
    pub clock_pulses: u64,
}

/// Worker state
pub struct Worker<'h, 'p, M: RawMutex, P, D> {
    port: WorkerPort<'h, M>,
    executor: TrialExecutor<'p, P, D>,
    candidates: Candidates,
}

impl<'h, 'p, M, P, D> Worker<'h, 'p, M, P, D>
where
    M: RawMutex,
    P: OutputPin,
    D: DelayNs,
{
    /// Create a worker over an enumeration window
    pub fn new(
        port: WorkerPort<'h, M>,
        executor: TrialExecutor<'p, P, D>,
        candidates: Candidates,
    ) -> Self {
        Self {
            port,
            executor,
            candidates,
        }
    }

    /// Candidates not yet handed out
    pub fn remaining(&self) -> usize {
        self.candidates.len()
    }

    /// Serve Go tokens until the enumeration is exhausted
    ///
    /// Returns after answering the first request that finds no candidate
    /// left. The lines are low whenever this is waiting and when it returns.
    pub async fn run(&mut self) -> WorkerSummary {
        let mut summary = WorkerSummary::default();

        loop {
            self.executor.quiesce();
            self.port.wait_request().await;

            let Some(candidate) = self.candidates.next() else {
                self.port.report(TrialDone::Exhausted).await;
                return summary;
            };

            let counters = self.executor.run(&candidate);
            self.executor.quiesce();

            summary.trials = summary.trials.saturating_add(1);
            summary.clock_pulses += u64::from(counters.clock_pulses);

            self.port.report(TrialDone::Completed(candidate)).await;
        }
    }

    /// Check that all six lines are low
    pub fn is_quiescent(&self) -> bool {
        self.executor.is_quiescent()
    }
}
