//! Per-caller sliding-window rate limiter: a small per-key timestamp window under a
//! mutex, counting recent occurrences cheaply without a background sweep.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct RateLimiter {
    window: Duration,
    limit: u32,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            window: Duration::from_secs(60),
            limit: limit_per_minute,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Records one call for `caller` and reports whether it is still within the limit.
    /// Returns `false` (and does not count against the window) once the caller is over.
    pub fn check(&self, caller: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        let entry = hits.entry(caller.to_string()).or_default();
        entry.retain(|t| now.duration_since(*t) < self.window);

        if entry.len() as u32 >= self.limit {
            return false;
        }
        entry.push(now);
        true
    }
}
