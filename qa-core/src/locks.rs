//! Global mutual-exclusion registry over account ids.
//!
//! One account can back at most one in-flight test at a time, across every run and
//! every project. Acquire is non-blocking; callers that fail to acquire retry later
//! via the scheduler's poll loop rather than queuing here.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct AccountLockRegistry {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl AccountLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to lock `account_id`. Returns a guard on success; the guard releases
    /// the lock on drop, including on panic or cancellation (property A2).
    pub fn try_acquire(&self, account_id: &str) -> Option<AccountLockGuard> {
        let mut locked = self.inner.lock().expect("account lock registry poisoned");
        if locked.insert(account_id.to_string()) {
            Some(AccountLockGuard {
                registry: self.inner.clone(),
                account_id: account_id.to_string(),
            })
        } else {
            None
        }
    }

    pub fn is_in_use(&self, account_id: &str) -> bool {
        self.inner
            .lock()
            .expect("account lock registry poisoned")
            .contains(account_id)
    }

    /// Accounts from `candidates` that are currently free, order preserved.
    pub fn free_accounts<'a>(&self, candidates: &'a [String]) -> Vec<&'a String> {
        let locked = self.inner.lock().expect("account lock registry poisoned");
        candidates.iter().filter(|id| !locked.contains(*id)).collect()
    }
}

/// RAII handle on one account lock. Releasing never fails and never blocks other accounts.
pub struct AccountLockGuard {
    registry: Arc<Mutex<HashSet<String>>>,
    account_id: String,
}

impl AccountLockGuard {
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl Drop for AccountLockGuard {
    fn drop(&mut self) {
        if let Ok(mut locked) = self.registry.lock() {
            locked.remove(&self.account_id);
        }
    }
}
