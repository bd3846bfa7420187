//! Resilience core of a Hyperledger Fabric client SDK.
//!
//! Every failure the SDK encounters is classified into a [`Status`] tagged
//! with the [`Group`](fabric_sdk_types::Group) that produced it. A
//! [`RetryPolicy`] decides from that classification whether an operation is
//! worth retrying and how long to back off, and a [`Greylist`] keeps peers
//! that just failed to connect out of the next selection round.
//!
//! # Features
//!
//! - **Classified errors**: `(group, code, message, details)` statuses,
//!   recoverable through any number of context wrappers
//! - **Exponential backoff**: clamped, per-group retryable code tables
//! - **Retry invoker**: async and blocking, with a before-retry hook and
//!   cancellation
//! - **Peer greylisting**: time-bounded exclusion with lazy expiry
//!
//! # Quick Start
//!
//! ```no_run
//! use fabric_sdk::{
//!     DiscoveryService, FilterDiscoveryService, Greylist, Peer, PeerInfo, RetryInvoker,
//!     RetryOpts, RetryPolicy, SdkError, StaticDiscovery, Status,
//! };
//!
//! # async fn endorse(peer: &PeerInfo) -> fabric_sdk::Result<Vec<u8>> {
//! #     Err(Status::connection_failed(peer.url(), "connection refused").into())
//! # }
//! # async fn example() -> fabric_sdk::Result<()> {
//! let greylist = Greylist::default();
//! let discovery = FilterDiscoveryService::new(
//!     StaticDiscovery::new(vec![PeerInfo::new("grpcs://peer0.org1.example.com:7051")]),
//!     greylist.clone(),
//! );
//!
//! let policy = RetryPolicy::new(RetryOpts::channel_client());
//! let on_retry = greylist.clone();
//! let mut invoker = RetryInvoker::from_policy(&policy)
//!     .with_before_retry(move |err: &SdkError| on_retry.greylist(err));
//!
//! let discovery = &discovery;
//! let _response = invoker
//!     .invoke(move || async move {
//!         let peers = discovery.peers().await?;
//!         let peer = peers.first().ok_or_else(|| SdkError::Unclassified {
//!             message: "no peers available".to_owned(),
//!         })?;
//!         endorse(peer).await
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 RetryInvoker (async / blocking)             │
//! │   attempt │ backoff │ before-retry hook │ cancellation      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 RetryPolicy / RetryState                    │
//! │   retryable codes │ exponential backoff │ attempt counter   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 Status / SdkError                           │
//! │   group │ code │ message │ details │ cause chain            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 Peer selection                              │
//! │   DiscoveryService │ PeerFilter │ Greylist                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod endpoint;
mod error;
mod invoker;
mod retry;
mod selection;
mod status;

// Public API exports
pub use config::{
    DEFAULT_ATTEMPTS, DEFAULT_BACKOFF_FACTOR, DEFAULT_GREYLIST_EXPIRY, DEFAULT_INITIAL_BACKOFF,
    DEFAULT_MAX_BACKOFF, GreylistConfig, RetryOpts,
};
pub use endpoint::to_address;
pub use error::{
    CancelledSnafu, ConfigSnafu, ContextSnafu, MultipleSnafu, Result, SdkError, StatusSnafu,
    UnclassifiedSnafu,
};
pub use invoker::{BeforeRetryHook, RetryInvoker};
pub use retry::{RetryHandler, RetryPolicy, RetryState};
pub use selection::{
    DiscoveryService, FilterDiscoveryService, Greylist, MspFilter, Peer, PeerFilter, PeerInfo,
    StaticDiscovery, filter_peers,
};
pub use status::{Detail, Status};

// Re-export the classification vocabulary from fabric-sdk-types
pub use fabric_sdk_types::{Code, Group, RetryableCodes};
