//! Active run registry: maps a run id to a handle that can cancel it.
//!
//! Built on `tokio_util::sync::CancellationToken` rather than a bespoke flag, since a
//! `CancellationToken` already gives a disconnect and an explicit stop request the same
//! lever to pull.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct CancellationHandle {
    token: CancellationToken,
}

impl CancellationHandle {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }
}

#[derive(Clone, Default)]
pub struct ActiveRunRegistry {
    inner: Arc<Mutex<HashMap<String, CancellationHandle>>>,
}

impl ActiveRunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `run_id` as active and returns the handle the scheduler should watch.
    /// Idempotent: a second call with the same `run_id` before it's unregistered returns
    /// the existing handle rather than replacing it, so a caller that races with itself
    /// (e.g. a retried request) can't orphan the first handle's cancellation token.
    pub fn register(&self, run_id: impl Into<String>) -> CancellationHandle {
        self.inner
            .lock()
            .expect("active run registry poisoned")
            .entry(run_id.into())
            .or_insert_with(CancellationHandle::new)
            .clone()
    }

    /// Signals cancellation for `run_id`. Returns `true` if a run was found and signalled.
    pub fn stop(&self, run_id: &str) -> bool {
        match self
            .inner
            .lock()
            .expect("active run registry poisoned")
            .get(run_id)
        {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Removes `run_id` from the registry once the run has reached a terminal state.
    pub fn unregister(&self, run_id: &str) {
        self.inner
            .lock()
            .expect("active run registry poisoned")
            .remove(run_id);
    }

    pub fn is_active(&self, run_id: &str) -> bool {
        self.inner
            .lock()
            .expect("active run registry poisoned")
            .contains_key(run_id)
    }
}
