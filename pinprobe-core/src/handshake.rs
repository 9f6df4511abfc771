//! Cross-core trial handshake
//!
//! Two depth-1 queues connect the controller (core 0) and the worker
//! (core 1):
//!
//! ```text
//! controller --TrialRequest--> worker      (Go)
//! controller <--TrialDone----- worker      (Done)
//! ```
//!
//! Every request is answered by exactly one completion, so at most one trial
//! is in flight. Both queues hold a single token; a second push before the
//! first is consumed waits, or is refused by the non-waiting variant.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use crate::search::Candidate;

/// Permission for the worker to run its next trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrialRequest;

/// Worker's answer to a [`TrialRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrialDone {
    /// The trial for this candidate finished and the lines are quiet again
    Completed(Candidate),
    /// No candidates are left; the worker will not answer again
    Exhausted,
}

/// Handshake errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeError {
    /// The queue already holds an unconsumed token
    Busy,
}

/// The pair of single-slot queues shared by both cores
pub struct Handshake<M: RawMutex> {
    requests: Channel<M, TrialRequest, 1>,
    completions: Channel<M, TrialDone, 1>,
}

impl<M: RawMutex> Handshake<M> {
    /// Create an empty handshake (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            completions: Channel::new(),
        }
    }

    /// Controller end
    pub fn controller(&self) -> ControllerPort<'_, M> {
        ControllerPort { handshake: self }
    }

    /// Worker end
    pub fn worker(&self) -> WorkerPort<'_, M> {
        WorkerPort { handshake: self }
    }
}

impl<M: RawMutex> Default for Handshake<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Controller side: sends requests, receives completions
pub struct ControllerPort<'h, M: RawMutex> {
    handshake: &'h Handshake<M>,
}

impl<M: RawMutex> Clone for ControllerPort<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex> Copy for ControllerPort<'_, M> {}

impl<'h, M: RawMutex> ControllerPort<'h, M> {
    /// Hand the worker a Go token, waiting for the slot to free up
    pub async fn request_trial(&self) {
        self.handshake.requests.send(TrialRequest).await;
    }

    /// Hand the worker a Go token without waiting
    pub fn try_request_trial(&self) -> Result<(), HandshakeError> {
        self.handshake
            .requests
            .try_send(TrialRequest)
            .map_err(|_| HandshakeError::Busy)
    }

    /// Wait for the worker's answer
    pub async fn wait_done(&self) -> TrialDone {
        self.handshake.completions.receive().await
    }

    /// Take the worker's answer if one is waiting
    pub fn try_done(&self) -> Option<TrialDone> {
        self.handshake.completions.try_receive().ok()
    }
}

/// Worker side: receives requests, sends completions
pub struct WorkerPort<'h, M: RawMutex> {
    handshake: &'h Handshake<M>,
}

impl<'h, M: RawMutex> WorkerPort<'h, M> {
    /// Wait for a Go token
    pub async fn wait_request(&self) -> TrialRequest {
        self.handshake.requests.receive().await
    }

    /// Answer the controller, waiting for the slot to free up
    pub async fn report(&self, done: TrialDone) {
        self.handshake.completions.send(done).await;
    }
}
