//! In-memory peers.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use fabric_sdk::{Peer, Result};

use crate::errors::connection_failed_error;

#[derive(Debug, Default)]
struct MockPeerState {
    unreachable: AtomicBool,
    requests: AtomicUsize,
}

/// A peer whose reachability is controlled by the test.
///
/// Clones share reachability and request counters, so a clone handed to a
/// discovery service reflects changes made through the original.
#[derive(Debug, Clone)]
pub struct MockPeer {
    url: String,
    msp_id: Option<String>,
    state: Arc<MockPeerState>,
}

impl MockPeer {
    /// Creates a reachable peer.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), msp_id: None, state: Arc::default() }
    }

    /// Creates a peer whose every request fails with a connection error.
    pub fn unreachable(url: impl Into<String>) -> Self {
        let peer = Self::new(url);
        peer.set_reachable(false);
        peer
    }

    /// Sets the MSP id.
    pub fn with_msp_id(mut self, msp_id: impl Into<String>) -> Self {
        self.msp_id = Some(msp_id.into());
        self
    }

    /// Makes subsequent requests succeed or fail.
    pub fn set_reachable(&self, reachable: bool) {
        self.state.unreachable.store(!reachable, Ordering::SeqCst);
    }

    /// Simulates a request, echoing `payload` when reachable.
    ///
    /// # Errors
    ///
    /// Returns an `EndorserClient`/`ConnectionFailed` error naming this
    /// peer's URL while unreachable.
    pub fn request(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.state.requests.fetch_add(1, Ordering::SeqCst);
        if self.state.unreachable.load(Ordering::SeqCst) {
            return Err(connection_failed_error(&self.url));
        }
        Ok(payload.to_vec())
    }

    /// Returns how many requests this peer received.
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Peer for MockPeer {
    fn url(&self) -> &str {
        &self.url
    }

    fn msp_id(&self) -> Option<&str> {
        self.msp_id.as_deref()
    }
}

/// Peers `peer0..peerN` of `org1.example.com`, all reachable.
pub fn test_peers(count: usize) -> Vec<MockPeer> {
    (0..count)
        .map(|i| MockPeer::new(format!("grpcs://peer{i}.org1.example.com:7051")).with_msp_id("Org1MSP"))
        .collect()
}
