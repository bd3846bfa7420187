//! Retry and peer-selection tests across crate boundaries.
//!
//! These drive the invoker, the greylist and a filtered discovery service
//! together the way a channel client does: a peer that fails to connect is
//! greylisted before the retry, so the retry selects a different peer.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use fabric_sdk::{
    DiscoveryService, FilterDiscoveryService, Greylist, Peer, RetryInvoker, RetryOpts,
    RetryPolicy, RetryableCodes, SdkError, StaticDiscovery, Status,
};
use fabric_sdk_test_utils::{
    MockPeer, ScriptedOperation, assert_eventually, has_status, non_retryable_error, test_peers,
    transient_error,
};
use fabric_sdk_types::{ClientCode, Group};
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn fast_channel_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(RetryOpts {
        attempts,
        initial_backoff: Duration::from_millis(2),
        max_backoff: Duration::from_millis(10),
        backoff_factor: 2.0,
        retryable_codes: RetryableCodes::channel_client(),
    })
}

fn no_peers_found() -> SdkError {
    Status::new(
        Group::EndorserClient,
        ClientCode::NoPeersFound.as_code(),
        "no peers available for selection",
        Vec::new(),
    )
    .into()
}

/// Sends `payload` to the first peer the discovery service offers.
async fn send_to_first_peer<S>(discovery: &S, payload: &[u8]) -> fabric_sdk::Result<Vec<u8>>
where
    S: DiscoveryService<Peer = MockPeer>,
{
    let peers = discovery.peers().await?;
    let peer = peers.first().ok_or_else(no_peers_found)?;
    peer.request(payload).map_err(|err| err.wrap(format!("endorse on {}", peer.url())))
}

// ============================================================================
// Channel client flow
// ============================================================================

#[tokio::test]
async fn test_retry_moves_to_next_peer_after_greylisting() {
    let peers = test_peers(2);
    peers[0].set_reachable(false);

    let greylist = Greylist::new(Duration::from_secs(10));
    let discovery =
        FilterDiscoveryService::new(StaticDiscovery::new(peers.clone()), greylist.clone());

    let on_retry = greylist.clone();
    let mut invoker = RetryInvoker::from_policy(&fast_channel_policy(3))
        .with_before_retry(move |err| on_retry.greylist(err));

    let discovery = &discovery;
    let response = invoker
        .invoke(move || async move { send_to_first_peer(discovery, b"proposal").await })
        .await
        .expect("retry should reach the healthy peer");

    assert_eq!(response, b"proposal");
    assert_eq!(peers[0].requests(), 1);
    assert_eq!(peers[1].requests(), 1);
    assert!(greylist.is_greylisted(peers[0].url()));
    assert!(!greylist.is_greylisted(peers[1].url()));
    assert_eq!(invoker.handler().retries(), 1);
}

#[tokio::test]
async fn test_all_peers_unreachable_ends_with_no_peers_found() {
    let peers = test_peers(2);
    for peer in &peers {
        peer.set_reachable(false);
    }

    let greylist = Greylist::new(Duration::from_secs(10));
    let discovery =
        FilterDiscoveryService::new(StaticDiscovery::new(peers.clone()), greylist.clone());

    let on_retry = greylist.clone();
    let mut invoker = RetryInvoker::from_policy(&fast_channel_policy(5))
        .with_before_retry(move |err| on_retry.greylist(err));

    let discovery = &discovery;
    let err = invoker
        .invoke(move || async move { send_to_first_peer(discovery, b"proposal").await })
        .await
        .unwrap_err();

    // Both peers failed once and were greylisted; the third attempt found
    // nobody to ask and NoPeersFound is not retryable.
    assert!(has_status(&err, Group::EndorserClient, ClientCode::NoPeersFound.as_code()));
    assert_eq!(greylist.len(), 2);
    assert_eq!(peers[0].requests(), 1);
    assert_eq!(peers[1].requests(), 1);
    assert_eq!(invoker.handler().retries(), 2);
}

#[tokio::test]
async fn test_greylisted_peer_returns_after_expiry() {
    let peers = test_peers(1);
    let greylist = Greylist::new(Duration::from_millis(50));
    let discovery =
        FilterDiscoveryService::new(StaticDiscovery::new(peers.clone()), greylist.clone());

    peers[0].set_reachable(false);
    let err = send_to_first_peer(&discovery, b"tx").await.unwrap_err();
    greylist.greylist(&err);
    assert!(discovery.peers().await.unwrap().is_empty());

    peers[0].set_reachable(true);
    let peer = peers[0].clone();
    let expired = assert_eventually(Duration::from_secs(2), || greylist.accept(&peer)).await;
    assert!(expired, "greylist entry should expire");

    assert_eq!(send_to_first_peer(&discovery, b"tx").await.unwrap(), b"tx");
}

// ============================================================================
// Invoker outcomes
// ============================================================================

#[test]
fn test_blocking_invoker_with_scripted_operation() {
    let policy = RetryPolicy::new(RetryOpts {
        attempts: 3,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
        backoff_factor: 2.0,
        retryable_codes: RetryableCodes::test(),
    });

    let op = ScriptedOperation::failing_then(2, || transient_error("busy"), 42);
    let result = RetryInvoker::from_policy(&policy).invoke_blocking(|| op.call());
    assert_eq!(result.unwrap(), 42);
    assert_eq!(op.calls(), 3);

    let op = ScriptedOperation::<u32>::new([Err(non_retryable_error("bad request"))]);
    let err = RetryInvoker::from_policy(&policy).invoke_blocking(|| op.call()).unwrap_err();
    assert_eq!(op.calls(), 1);
    assert!(err.to_string().contains("bad request"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// An operation failing `failures` times runs `min(failures, attempts) + 1` times.
    #[test]
    fn prop_call_count_bounded_by_attempts(failures in 0usize..6, attempts in 0u32..5) {
        let policy = RetryPolicy::new(RetryOpts {
            attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
            backoff_factor: 1.0,
            retryable_codes: RetryableCodes::test(),
        });

        let op = ScriptedOperation::failing_then(failures, || transient_error("busy"), ());
        let result = RetryInvoker::from_policy(&policy).invoke_blocking(|| op.call());

        let expected_calls = failures.min(attempts as usize) + 1;
        prop_assert_eq!(op.calls(), expected_calls);
        prop_assert_eq!(result.is_ok(), failures <= attempts as usize);
    }
}
