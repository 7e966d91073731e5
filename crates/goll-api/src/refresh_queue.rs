//! Bounded FIFO of requests suspended on a credential refresh.
//!
//! When a request hits a 401 while another request is already refreshing
//! the credential, it parks here as a continuation instead of starting a
//! second refresh. The leader drains the queue in arrival order once its
//! refresh resolves. Outside an active refresh the queue is always empty.

use std::collections::VecDeque;
use tokio::sync::oneshot;

/// Maximum number of requests that may wait on one refresh.
pub(crate) const MAX_PENDING: usize = 64;

/// Result of a refresh, delivered to every parked continuation.
#[derive(Debug, Clone)]
pub(crate) enum RefreshOutcome {
    /// A new credential was obtained.
    Refreshed(String),
    /// The refresh failed; the session is over.
    Failed(String),
}

/// A parked request waiting for the in-flight refresh.
pub(crate) struct RefreshContinuation {
    /// Arrival order, for FIFO verification.
    pub(crate) seq: u64,
    pub(crate) tx: oneshot::Sender<RefreshOutcome>,
}

/// How a 401-handling request participates in the refresh.
pub(crate) enum RefreshRole {
    /// First to arrive: perform the refresh and drain the queue.
    Leader,
    /// A refresh is already running: suspend on this continuation.
    Waiter(oneshot::Receiver<RefreshOutcome>),
    /// The queue is full; the caller keeps its original error.
    Overflow,
}

pub(crate) struct RefreshQueue {
    in_flight: bool,
    next_seq: u64,
    waiters: VecDeque<RefreshContinuation>,
}

impl RefreshQueue {
    pub(crate) fn new() -> Self {
        Self {
            in_flight: false,
            next_seq: 0,
            waiters: VecDeque::new(),
        }
    }

    /// Join the single-flight refresh.
    pub(crate) fn join(&mut self) -> RefreshRole {
        if !self.in_flight {
            self.in_flight = true;
            return RefreshRole::Leader;
        }
        if self.waiters.len() >= MAX_PENDING {
            return RefreshRole::Overflow;
        }
        let (tx, rx) = oneshot::channel();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.waiters.push_back(RefreshContinuation { seq, tx });
        RefreshRole::Waiter(rx)
    }

    /// Whether a refresh is currently running.
    pub(crate) fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Number of parked continuations.
    pub(crate) fn pending(&self) -> usize {
        self.waiters.len()
    }

    /// Remove all continuations in FIFO arrival order.
    pub(crate) fn drain(&mut self) -> Vec<RefreshContinuation> {
        self.waiters.drain(..).collect()
    }

    /// End the flight: deliver `outcome` to every continuation, oldest
    /// first, and leave the queue empty.
    pub(crate) fn complete(&mut self, outcome: RefreshOutcome) {
        debug_assert!(self.in_flight, "complete without an active refresh");
        self.in_flight = false;
        for continuation in self.drain() {
            // The waiter may have been dropped; delivery is best-effort.
            let _ = continuation.tx.send(outcome.clone());
        }
    }
}
