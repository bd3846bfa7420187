//! Peer abstraction.

use std::fmt;

/// A remote peer that can be selected for endorsement or queries.
pub trait Peer: Send + Sync {
    /// The peer's URL, with or without a `grpc://`/`grpcs://` scheme.
    fn url(&self) -> &str;

    /// The MSP id of the organization the peer belongs to, if known.
    fn msp_id(&self) -> Option<&str> {
        None
    }
}

/// Plain peer descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerInfo {
    url: String,
    msp_id: Option<String>,
}

impl PeerInfo {
    /// Creates a peer with no known MSP id.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), msp_id: None }
    }

    /// Sets the MSP id of the peer's organization.
    #[must_use]
    pub fn with_msp_id(mut self, msp_id: impl Into<String>) -> Self {
        self.msp_id = Some(msp_id.into());
        self
    }
}

impl Peer for PeerInfo {
    fn url(&self) -> &str {
        &self.url
    }

    fn msp_id(&self) -> Option<&str> {
        self.msp_id.as_deref()
    }
}

impl fmt::Display for PeerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.msp_id {
            Some(msp_id) => write!(f, "{} ({msp_id})", self.url),
            None => f.write_str(&self.url),
        }
    }
}
