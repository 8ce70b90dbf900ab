use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::ServerError;

/// Counting semaphore bounding concurrent client sessions.
///
/// The accept loop takes a permit before calling `accept`, so once the
/// bound is reached new clients queue in the kernel rather than being
/// accepted and turned away. The permit travels into the session task and
/// is released when the task drops it, whatever the exit path.
#[derive(Debug)]
pub struct ConnectionGate {
    permits: Arc<Semaphore>,
}

impl ConnectionGate {
    /// Creates a gate admitting at most `maxconn` simultaneous sessions;
    /// 0 means unbounded.
    pub fn new(maxconn: u32) -> ConnectionGate {
        let permits = if maxconn == 0 {
            Semaphore::MAX_PERMITS
        } else {
            maxconn as usize
        };
        ConnectionGate {
            permits: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Waits for a session slot.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::GateClosed`] if the semaphore was closed,
    /// which never happens while the server runs.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, ServerError> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ServerError::GateClosed)
    }

    /// Slots currently free; used by tests.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
