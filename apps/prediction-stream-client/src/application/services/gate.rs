//! Single-Flight Request Gate
//!
//! At most one request per gate is live. A new submission cancels the
//! previous one first, and both steps happen under the same lock, so the
//! superseded request has published its last transition before the new
//! request publishes `Pending`.

use parking_lot::Mutex;

use crate::domain::request::RequestKey;

use super::client::StreamingRequestClient;
use super::handle::RequestHandle;

/// Serializes submissions onto one [`StreamingRequestClient`].
#[derive(Debug)]
pub struct RequestGate {
    client: StreamingRequestClient,
    active: Mutex<Option<RequestHandle>>,
}

impl RequestGate {
    /// Create a gate over `client`.
    #[must_use]
    pub const fn new(client: StreamingRequestClient) -> Self {
        Self {
            client,
            active: Mutex::new(None),
        }
    }

    /// Submit `key`, superseding any request still in flight.
    #[must_use = "dropping the handle loses the only way to wait for the request"]
    pub fn request(&self, key: RequestKey) -> RequestHandle {
        let mut active = self.active.lock();
        if let Some(previous) = active.take()
            && !previous.is_terminal()
        {
            tracing::info!(
                superseded = %previous.key(),
                next = %key,
                "Superseding in-flight prediction request"
            );
            previous.cancel();
        }

        let handle = self.client.submit(key);
        *active = Some(handle.clone());
        handle
    }

    /// Cancel the current request, if any. Returns whether one was live.
    pub fn cancel_active(&self) -> bool {
        let active = self.active.lock();
        match active.as_ref() {
            Some(handle) if !handle.is_terminal() => {
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    /// Handle of the most recent submission.
    #[must_use]
    pub fn active(&self) -> Option<RequestHandle> {
        self.active.lock().clone()
    }
}
