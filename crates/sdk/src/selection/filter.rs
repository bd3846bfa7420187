//! Peer filters.

use std::collections::HashSet;

use super::Peer;

/// Decides whether a peer may be selected.
pub trait PeerFilter: Send + Sync {
    /// Returns `true` if `peer` may be selected.
    fn accept(&self, peer: &dyn Peer) -> bool;
}

impl<F> PeerFilter for F
where
    F: Fn(&dyn Peer) -> bool + Send + Sync,
{
    fn accept(&self, peer: &dyn Peer) -> bool {
        self(peer)
    }
}

/// Accepts only peers whose MSP id is in a fixed set.
///
/// Peers with no known MSP id are rejected.
#[derive(Debug, Clone, Default)]
pub struct MspFilter {
    msp_ids: HashSet<String>,
}

impl MspFilter {
    /// Creates a filter accepting the given MSP ids.
    #[must_use]
    pub fn new<I, S>(msp_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { msp_ids: msp_ids.into_iter().map(Into::into).collect() }
    }
}

impl PeerFilter for MspFilter {
    fn accept(&self, peer: &dyn Peer) -> bool {
        peer.msp_id().is_some_and(|msp_id| self.msp_ids.contains(msp_id))
    }
}

/// Keeps the peers accepted by `filter`, preserving order.
#[must_use]
pub fn filter_peers<P: Peer>(peers: Vec<P>, filter: &dyn PeerFilter) -> Vec<P> {
    peers.into_iter().filter(|peer| filter.accept(peer)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::PeerInfo;

    fn peers() -> Vec<PeerInfo> {
        vec![
            PeerInfo::new("peer0.org1:7051").with_msp_id("Org1MSP"),
            PeerInfo::new("peer0.org2:7051").with_msp_id("Org2MSP"),
            PeerInfo::new("peer1.org1:7051").with_msp_id("Org1MSP"),
            PeerInfo::new("peer0.org3:7051"),
        ]
    }

    #[test]
    fn test_msp_filter_preserves_order() {
        let filter = MspFilter::new(["Org1MSP"]);
        let selected = filter_peers(peers(), &filter);
        let urls: Vec<&str> = selected.iter().map(|p| p.url()).collect();
        assert_eq!(urls, ["peer0.org1:7051", "peer1.org1:7051"]);
    }

    #[test]
    fn test_msp_filter_rejects_unknown_msp() {
        let filter = MspFilter::new(["Org1MSP", "Org2MSP"]);
        assert!(!filter.accept(&PeerInfo::new("peer0.org3:7051")));
    }

    #[test]
    fn test_closure_filter() {
        let filter = |peer: &dyn Peer| !peer.url().starts_with("peer0");
        let selected = filter_peers(peers(), &filter);
        assert_eq!(selected, vec![PeerInfo::new("peer1.org1:7051").with_msp_id("Org1MSP")]);
    }

    #[test]
    fn test_empty_filter_input() {
        let filter = MspFilter::default();
        assert!(filter_peers(Vec::<PeerInfo>::new(), &filter).is_empty());
        assert!(filter_peers(peers(), &filter).is_empty());
    }
}
