//! Peer filtering and selection.
//!
//! # Architecture
//!
//! ```text
//! DiscoveryService (candidate peers)
//!       │
//!       ▼
//! FilterDiscoveryService ◄── PeerFilter (Greylist, MspFilter, closures)
//!       │
//!       ▼
//! endorsement / query
//!       │ connection failure
//!       ▼
//! Greylist::greylist(err)
//! ```
//!
//! A peer that fails to connect is greylisted for a fixed expiry; the next
//! selection round skips it and retries land on a different peer.

mod discovery;
mod filter;
mod greylist;
mod peer;

pub use discovery::{DiscoveryService, FilterDiscoveryService, StaticDiscovery};
pub use filter::{MspFilter, PeerFilter, filter_peers};
pub use greylist::Greylist;
pub use peer::{Peer, PeerInfo};
