//! Per-session sync driver state.

use blockpoll_core::Hash;

use crate::peer::SessionId;

/// Key of a get-blocks request, used to suppress back-to-back duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorRequest {
    /// Most recent hash of the locator that was sent.
    pub locator_head: Hash,
    /// Stop hash that was sent.
    pub stop_hash: Hash,
    /// Session the request went to.
    pub session: SessionId,
}

/// Counters kept by the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Inventory announcements handled.
    pub inventories_received: u64,
    /// Inventory deliveries that failed or were malformed.
    pub bad_inventories: u64,
    /// Get-data requests sent.
    pub get_data_sent: u64,
    /// Get-blocks requests sent.
    pub get_blocks_sent: u64,
    /// Get-blocks requests skipped as duplicates.
    pub duplicate_requests_skipped: u64,
    /// Blocks received and submitted for storage.
    pub blocks_received: u64,
    /// Block deliveries that failed.
    pub bad_blocks: u64,
    /// Blocks the chain confirmed.
    pub blocks_confirmed: u64,
    /// Orphan outcomes observed.
    pub orphans: u64,
    /// Blocks the chain rejected.
    pub blocks_rejected: u64,
    /// Store calls that failed.
    pub store_failures: u64,
    /// Locator fetches that failed.
    pub locator_failures: u64,
    /// Sends the session reported as failed.
    pub send_failures: u64,
}

/// Mutable state of one driver. Only the driver's event loop touches it.
#[derive(Debug, Default)]
pub struct DriverState {
    last_announced_block: Option<Hash>,
    last_locator_request: Option<LocatorRequest>,
    /// Counters.
    pub stats: DriverStats,
}

impl DriverState {
    /// Create empty state for a new session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last block hash requested through get-data.
    pub fn last_announced_block(&self) -> Option<Hash> {
        self.last_announced_block
    }

    /// Record the last block hash requested through get-data.
    pub fn set_last_announced_block(&mut self, hash: Hash) {
        self.last_announced_block = Some(hash);
    }

    /// Most recent get-blocks request actually sent.
    pub fn last_locator_request(&self) -> Option<LocatorRequest> {
        self.last_locator_request
    }

    /// Check whether `request` repeats the most recent one.
    pub fn is_duplicate_request(&self, request: &LocatorRequest) -> bool {
        self.last_locator_request.as_ref() == Some(request)
    }

    /// Record a get-blocks request that was sent.
    pub fn record_request(&mut self, request: LocatorRequest) {
        self.last_locator_request = Some(request);
    }

    /// Capture the state for reporting.
    pub fn snapshot(&self, session: SessionId) -> DriverSnapshot {
        DriverSnapshot {
            session,
            last_announced_block: self.last_announced_block,
            last_locator_request: self.last_locator_request,
            stats: self.stats.clone(),
        }
    }
}

/// Point-in-time view of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSnapshot {
    /// Session the driver serves.
    pub session: SessionId,
    /// Last block hash requested through get-data.
    pub last_announced_block: Option<Hash>,
    /// Most recent get-blocks request sent.
    pub last_locator_request: Option<LocatorRequest>,
    /// Counters.
    pub stats: DriverStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(head: u8, stop: u8, session: u64) -> LocatorRequest {
        LocatorRequest {
            locator_head: [head; 32],
            stop_hash: [stop; 32],
            session: SessionId::new(session),
        }
    }

    #[test]
    fn test_duplicate_detection() {
        let mut state = DriverState::new();
        let first = request(1, 0, 1);

        // Nothing sent yet
        assert!(!state.is_duplicate_request(&first));

        state.record_request(first);
        assert!(state.is_duplicate_request(&first));

        // Any differing component makes it a new request
        assert!(!state.is_duplicate_request(&request(2, 0, 1)));
        assert!(!state.is_duplicate_request(&request(1, 9, 1)));
        assert!(!state.is_duplicate_request(&request(1, 0, 2)));
    }

    #[test]
    fn test_only_latest_request_is_remembered() {
        let mut state = DriverState::new();
        state.record_request(request(1, 0, 1));
        state.record_request(request(2, 0, 1));

        assert!(!state.is_duplicate_request(&request(1, 0, 1)));
        assert_eq!(state.last_locator_request(), Some(request(2, 0, 1)));
    }

    #[test]
    fn test_snapshot() {
        let mut state = DriverState::new();
        state.set_last_announced_block([7u8; 32]);
        state.stats.get_data_sent = 3;

        let snapshot = state.snapshot(SessionId::new(5));
        assert_eq!(snapshot.session, SessionId::new(5));
        assert_eq!(snapshot.last_announced_block, Some([7u8; 32]));
        assert_eq!(snapshot.last_locator_request, None);
        assert_eq!(snapshot.stats.get_data_sent, 3);
    }
}
