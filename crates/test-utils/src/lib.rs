//! Shared test utilities for the Fabric client SDK crates.
//!
//! - [`MockPeer`] - Peer with test-controlled reachability
//! - [`ScriptedOperation`] - Operation returning queued results in order
//! - [`assert_eventually`] - Poll a condition until it's true or timeout
//! - [`connection_failed_error`] and friends - Canned classified errors
//! - [`strategies`] - Proptest generators for config and status values

#![deny(unsafe_code)]

mod assertions;
pub use assertions::{assert_eventually, has_status};

mod errors;
pub use errors::{connection_failed_error, non_retryable_error, transient_error, unclassified_error};

mod operation;
pub use operation::ScriptedOperation;

mod peers;
pub use peers::{MockPeer, test_peers};

pub mod strategies;
