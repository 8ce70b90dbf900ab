//! The statistics registry shared by every session and the signal reporter.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A coherent copy of all server counters, taken under the lock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Sessions currently live (gauge).
    pub connected: u32,
    /// Sessions ended.
    pub completed: u32,
    /// Crack requests accepted for processing.
    pub cracks: u32,
    /// Crack requests that matched no dictionary word.
    pub failed_cracks: u32,
    /// Crack requests that produced a plaintext.
    pub success_cracks: u32,
    /// Crypt requests accepted for processing.
    pub crypts: u32,
    /// Total invocations of the crypt primitive.
    pub crypt_calls: u32,
}

/// Mutually-exclusive counter registry. Every mutation and the snapshot
/// read take the single lock; critical sections are O(1) and never held
/// across an await point.
#[derive(Debug, Default)]
pub struct Stats {
    inner: Mutex<StatsSnapshot>,
}

impl Stats {
    pub fn new() -> Stats {
        Stats::default()
    }

    // The payload is plain integers, so a poisoned lock is still coherent.
    fn locked(&self) -> MutexGuard<'_, StatsSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn on_connect(&self) {
        self.locked().connected += 1;
    }

    pub fn on_disconnect(&self) {
        let mut stats = self.locked();
        stats.connected -= 1;
        stats.completed += 1;
    }

    pub fn on_crack_request(&self) {
        self.locked().cracks += 1;
    }

    pub fn on_crack_success(&self) {
        self.locked().success_cracks += 1;
    }

    pub fn on_crack_fail(&self) {
        self.locked().failed_cracks += 1;
    }

    pub fn on_crypt_request(&self) {
        self.locked().crypts += 1;
    }

    /// Adds one worker's (or one crypt request's) primitive invocation
    /// count in a single locked addition.
    pub fn add_crypt_calls(&self, calls: u32) {
        self.locked().crypt_calls += calls;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        *self.locked()
    }
}
