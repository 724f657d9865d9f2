//! Single-flight token refresh coordination
//!
//! The first request to hit a 401 becomes the leader and performs the refresh.
//! Requests failing while that refresh is outstanding queue up as waiters and
//! are released, in the order they joined, with the leader's outcome.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

/// Result handed to every party of one refresh attempt
pub type RefreshOutcome = Result<String, RefreshFailure>;

/// Why a refresh attempt produced no token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshFailure {
    /// The backend refused or the call failed; the session is over
    Rejected(String),
    /// The leader went away before finishing; the session is untouched
    Abandoned,
}

#[derive(Debug, Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Refresh flag plus waiter queue, shared by all clones of one client
#[derive(Debug, Clone, Default)]
pub struct RefreshCoordinator {
    state: Arc<Mutex<RefreshState>>,
}

/// Role assigned to a request that needs a refreshed token
#[derive(Debug)]
pub enum Ticket {
    /// No refresh was running; the holder must perform it and resolve
    Leader(LeaderGuard),
    /// A refresh is running; await its outcome
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the current refresh attempt, or start one
    pub fn join(&self) -> Ticket {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            Ticket::Waiter(rx)
        } else {
            state.in_flight = true;
            Ticket::Leader(LeaderGuard {
                coordinator: self.clone(),
                resolved: false,
            })
        }
    }

    /// Whether a refresh call is outstanding
    pub fn is_refreshing(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight
    }

    /// Number of requests queued behind the outstanding refresh
    pub fn waiting(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .waiters
            .len()
    }

    fn conclude(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose request was dropped no longer listens
            let _ = waiter.send(outcome.clone());
        }
        released
    }
}

/// Held by the refresh leader.
///
/// Dropping it unresolved, e.g. when the leader's future is cancelled,
/// fails the attempt so queued requests are never stranded.
#[derive(Debug)]
pub struct LeaderGuard {
    coordinator: RefreshCoordinator,
    resolved: bool,
}

impl LeaderGuard {
    /// Clear the in-flight flag and release all waiters with `outcome`.
    /// Returns the number of waiters released.
    pub fn resolve(mut self, outcome: &RefreshOutcome) -> usize {
        self.resolved = true;
        self.coordinator.conclude(outcome)
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        if !self.resolved {
            self.coordinator.conclude(&Err(RefreshFailure::Abandoned));
        }
    }
}
