//! Per-session concurrency control.
//!
//! Only one run owns a session at a time. A second run is turned away
//! immediately; objective and transcript edits wait a bounded time for
//! the current run to finish before they give up.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sl_domain::error::{Error, Result};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Manages per-session locks.
///
/// Each session id maps to a `Semaphore(1)`. Holding the permit gives
/// exclusive access to the session; it releases on drop.
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for SessionLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn semaphore(&self, session_id: &str) -> Arc<Semaphore> {
        let mut locks = self.locks.lock();
        locks
            .entry(session_id.to_owned())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone()
    }

    /// Take the lock only if nobody holds it.
    pub fn try_acquire(&self, session_id: &str) -> Result<OwnedSemaphorePermit> {
        self.semaphore(session_id)
            .try_acquire_owned()
            .map_err(|_| Error::Busy(session_id.to_owned()))
    }

    /// Wait up to `wait` for the lock.
    pub async fn acquire_within(
        &self,
        session_id: &str,
        wait: Duration,
    ) -> Result<OwnedSemaphorePermit> {
        let sem = self.semaphore(session_id);
        match tokio::time::timeout(wait, sem.acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) | Err(_) => Err(Error::Busy(session_id.to_owned())),
        }
    }
}
