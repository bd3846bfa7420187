//! Temporary exclusion of peers that failed to connect.
//!
//! Entries expire lazily: an expired entry is removed by the first
//! [`Greylist::accept`] call that observes it. There is no background sweep.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use fabric_sdk_types::{ClientCode, Group};

use super::{Peer, PeerFilter};
use crate::{config::GreylistConfig, endpoint::to_address, error::SdkError, status::Status};

/// Set of peer addresses excluded from selection until their entry expires.
///
/// Cloning is cheap and clones share the same entries.
///
/// # Thread Safety
///
/// All operations are safe to call concurrently. A peer greylisted again
/// before its entry expires has its timestamp overwritten.
///
/// # Example
///
/// ```
/// # use std::time::Duration;
/// use fabric_sdk::{Greylist, PeerFilter, PeerInfo, SdkError, Status};
///
/// let greylist = Greylist::new(Duration::from_secs(10));
/// let peer = PeerInfo::new("grpcs://peer0.org1.example.com:7051");
///
/// let err = SdkError::from(Status::connection_failed(
///     "peer0.org1.example.com:7051",
///     "connection refused",
/// ));
/// greylist.greylist(&err);
///
/// assert!(!greylist.accept(&peer));
/// ```
#[derive(Debug, Clone)]
pub struct Greylist {
    entries: Arc<DashMap<String, Instant>>,
    expiry: Duration,
}

impl Greylist {
    /// Creates an empty greylist whose entries last `expiry`.
    #[must_use]
    pub fn new(expiry: Duration) -> Self {
        Self { entries: Arc::new(DashMap::new()), expiry }
    }

    /// Creates an empty greylist from configuration.
    #[must_use]
    pub fn from_config(config: &GreylistConfig) -> Self {
        Self::new(config.expiry)
    }

    /// Returns how long an entry lasts.
    #[must_use]
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Returns whether `peer` may be selected.
    ///
    /// A peer is rejected while its entry is younger than the expiry. An
    /// expired entry is removed and the peer accepted.
    #[must_use]
    pub fn accept(&self, peer: &dyn Peer) -> bool {
        let address = to_address(peer.url());

        // Copy the timestamp so the shard guard is released before removal.
        let Some(added) = self.entries.get(address).map(|entry| *entry.value()) else {
            return true;
        };

        if added.elapsed() < self.expiry {
            return false;
        }

        let expiry = self.expiry;
        if self.entries.remove_if(address, |_, added| added.elapsed() >= expiry).is_some() {
            tracing::debug!(address = address, "greylist entry expired");
        }
        true
    }

    /// Greylists the peer a connection failure was reported for.
    ///
    /// Only `(EndorserClient, ConnectionFailed)` statuses whose first detail
    /// is the peer URL are recorded; every other error is ignored.
    pub fn greylist(&self, err: &SdkError) {
        let Some(status) = Status::from_error(Some(err)) else {
            return;
        };
        if !status.is(Group::EndorserClient, ClientCode::ConnectionFailed.as_code()) {
            return;
        }
        let Some(url) = status.details().first().and_then(|detail| detail.as_str()) else {
            return;
        };

        let address = to_address(url);
        if address.is_empty() {
            return;
        }

        tracing::warn!(
            address = address,
            expiry_ms = self.expiry.as_millis() as u64,
            error = %err,
            "greylisting peer after connection failure"
        );
        self.entries.insert(address.to_owned(), Instant::now());
    }

    /// Returns whether `url` currently has an unexpired entry.
    ///
    /// Unlike [`accept`](Self::accept), this never removes entries.
    #[must_use]
    pub fn is_greylisted(&self, url: &str) -> bool {
        self.entries
            .get(to_address(url))
            .is_some_and(|entry| entry.value().elapsed() < self.expiry)
    }

    /// Returns the number of entries, including expired ones not yet removed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for Greylist {
    fn default() -> Self {
        Self::from_config(&GreylistConfig::default())
    }
}

impl PeerFilter for Greylist {
    fn accept(&self, peer: &dyn Peer) -> bool {
        Greylist::accept(self, peer)
    }
}
