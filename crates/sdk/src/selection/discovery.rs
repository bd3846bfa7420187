//! Sources of candidate peers.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Peer, PeerFilter, filter_peers};
use crate::error::Result;

/// Provides the peers currently available for selection.
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    /// The peer type returned.
    type Peer: Peer;

    /// Returns the candidate peers.
    ///
    /// # Errors
    ///
    /// Returns an error if the peers could not be discovered.
    async fn peers(&self) -> Result<Vec<Self::Peer>>;
}

/// Discovery over a fixed list of peers.
#[derive(Debug, Clone)]
pub struct StaticDiscovery<P> {
    peers: Vec<P>,
}

impl<P> StaticDiscovery<P> {
    /// Creates a discovery service always returning `peers`.
    #[must_use]
    pub fn new(peers: Vec<P>) -> Self {
        Self { peers }
    }
}

#[async_trait]
impl<P: Peer + Clone> DiscoveryService for StaticDiscovery<P> {
    type Peer = P;

    async fn peers(&self) -> Result<Vec<P>> {
        Ok(self.peers.clone())
    }
}

/// Applies a [`PeerFilter`] to the peers of an inner discovery service.
///
/// The filter is consulted on every call, so a shared
/// [`Greylist`](super::Greylist) takes effect immediately.
pub struct FilterDiscoveryService<S> {
    inner: S,
    filter: Arc<dyn PeerFilter>,
}

impl<S: DiscoveryService> FilterDiscoveryService<S> {
    /// Wraps `inner`, keeping only the peers accepted by `filter`.
    #[must_use]
    pub fn new(inner: S, filter: impl PeerFilter + 'static) -> Self {
        Self { inner, filter: Arc::new(filter) }
    }

    /// Returns the wrapped service.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: DiscoveryService> DiscoveryService for FilterDiscoveryService<S> {
    type Peer = S::Peer;

    async fn peers(&self) -> Result<Vec<S::Peer>> {
        let peers = self.inner.peers().await?;
        let total = peers.len();
        let accepted = filter_peers(peers, self.filter.as_ref());

        if accepted.len() < total {
            tracing::debug!(
                total = total,
                excluded = total - accepted.len(),
                "peer filter excluded peers"
            );
        }
        Ok(accepted)
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for FilterDiscoveryService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterDiscoveryService").field("inner", &self.inner).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        error::SdkError,
        selection::{Greylist, MspFilter, PeerInfo},
        status::Status,
    };

    fn org_peers() -> Vec<PeerInfo> {
        vec![
            PeerInfo::new("grpcs://peer0.org1:7051").with_msp_id("Org1MSP"),
            PeerInfo::new("grpcs://peer1.org1:7051").with_msp_id("Org1MSP"),
            PeerInfo::new("grpcs://peer0.org2:7051").with_msp_id("Org2MSP"),
        ]
    }

    struct FailingDiscovery;

    #[async_trait]
    impl DiscoveryService for FailingDiscovery {
        type Peer = PeerInfo;

        async fn peers(&self) -> Result<Vec<PeerInfo>> {
            Err(SdkError::Unclassified { message: "discovery unavailable".to_owned() })
        }
    }

    #[tokio::test]
    async fn test_static_discovery_returns_all() {
        let discovery = StaticDiscovery::new(org_peers());
        assert_eq!(discovery.peers().await.unwrap(), org_peers());
    }

    #[tokio::test]
    async fn test_filter_service_excludes_greylisted_peers() {
        let greylist = Greylist::new(Duration::from_secs(10));
        let service = FilterDiscoveryService::new(StaticDiscovery::new(org_peers()), greylist.clone());

        assert_eq!(service.peers().await.unwrap().len(), 3);

        greylist.greylist(&SdkError::from(Status::connection_failed("peer1.org1:7051", "refused")));

        let urls: Vec<String> =
            service.peers().await.unwrap().iter().map(|p| p.url().to_owned()).collect();
        assert_eq!(urls, ["grpcs://peer0.org1:7051", "grpcs://peer0.org2:7051"]);
    }

    #[tokio::test]
    async fn test_filter_services_compose() {
        let greylist = Greylist::new(Duration::from_secs(10));
        greylist.greylist(&SdkError::from(Status::connection_failed("peer0.org1:7051", "refused")));

        let service = FilterDiscoveryService::new(
            FilterDiscoveryService::new(StaticDiscovery::new(org_peers()), MspFilter::new(["Org1MSP"])),
            greylist,
        );

        let peers = service.peers().await.unwrap();
        assert_eq!(peers, vec![PeerInfo::new("grpcs://peer1.org1:7051").with_msp_id("Org1MSP")]);
    }

    #[tokio::test]
    async fn test_filter_service_propagates_errors() {
        let service = FilterDiscoveryService::new(FailingDiscovery, |_: &dyn Peer| true);
        let err = service.peers().await.unwrap_err();
        assert!(err.to_string().contains("discovery unavailable"));
    }
}
