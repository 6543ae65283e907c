//! Refresh coordinator state machine
//!
//! Ensures at most one in-flight refresh call per expiry episode. The first
//! request to observe an expired token becomes the leader and performs the
//! refresh; every request failing while it is in flight is parked on a
//! oneshot channel and released as a batch when the refresh settles.
//!
//! State transitions:
//! - Idle → Refreshing: `begin` returns `Ticket::Leader`
//! - while Refreshing: `begin` queues a waiter, returns `Ticket::Waiter`
//! - Refreshing → Idle: the leader's `settle` drains the queue and resets
//!   the flag, unconditionally, success or failure. A stuck Refreshing
//!   state would hang every subsequent request, so the leader role is a
//!   guard: if the leader's future is dropped before settling (task abort),
//!   the guard settles the episode with an error on drop.
//!
//! The flag and queue live behind one `std::sync::Mutex`; check-and-set is a
//! single synchronous step with no await point, so two near-simultaneous
//! failures cannot both become leader. The lock is never held across an
//! await.

use std::sync::Mutex;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Outcome delivered to parked requests: the new access token, or the error
/// the refresh failed with.
pub(crate) type RefreshOutcome = Result<String, ApiError>;

/// Role handed to a request entering recovery.
pub(crate) enum Ticket<'a> {
    /// This request dispatches the refresh call and must settle the episode.
    Leader(LeaderGuard<'a>),
    /// A refresh is already in flight; await the shared outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Exclusive hold on the refresh episode.
///
/// `settle` ends the episode with the leader's outcome. Dropping the guard
/// without settling (the leader task was aborted mid-refresh) ends it with
/// an error instead, so waiters never hang and the next failure starts a
/// fresh episode.
pub(crate) struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl LeaderGuard<'_> {
    /// End the episode: reset the flag and release every queued waiter with
    /// the shared outcome.
    pub(crate) fn settle(mut self, outcome: &RefreshOutcome) {
        self.settled = true;
        self.coordinator.do_settle(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("refresh leader dropped before settling");
            self.coordinator
                .do_settle(&Err(ApiError::Session("refresh episode abandoned".into())));
        }
    }
}

#[derive(Default)]
struct State {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Single-flight coordinator for token refresh.
///
/// One instance per client, created at construction; independent clients
/// coordinate independently.
#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<State>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Enter recovery: become the leader, or park behind the current one.
    pub(crate) fn begin(&self) -> Ticket<'_> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            debug!(queued = state.waiters.len(), "refresh in flight, request queued");
            Ticket::Waiter(rx)
        } else {
            state.refreshing = true;
            debug!("starting refresh episode");
            Ticket::Leader(LeaderGuard {
                coordinator: self,
                settled: false,
            })
        }
    }

    fn do_settle(&self, outcome: &RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        debug!(released = waiters.len(), ok = outcome.is_ok(), "refresh episode settled");
        for waiter in waiters {
            // A waiter whose request future was dropped is gone; nothing to do
            if waiter.send(outcome.clone()).is_err() {
                warn!("queued request dropped before refresh settled");
            }
        }
    }

    #[cfg(test)]
    fn is_refreshing(&self) -> bool {
        self.state.lock().unwrap().refreshing
    }

    #[cfg(test)]
    fn queue_len(&self) -> usize {
        self.state.lock().unwrap().waiters.len()
    }
}
