//! Proptest strategies for SDK configuration and status values.
//!
//! # Usage
//!
//! ```no_run
//! use fabric_sdk_test_utils::strategies;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn backoff_is_clamped(opts in strategies::arb_retry_opts(), retries in 0u32..32) {
//!         let policy = fabric_sdk::RetryPolicy::new(opts.clone());
//!         prop_assert!(policy.backoff(retries) <= opts.max_backoff);
//!     }
//! }
//! ```

use std::time::Duration;

use fabric_sdk::{RetryOpts, Status};
use fabric_sdk_types::{Code, Group, RetryableCodes};
use proptest::prelude::*;

/// Generates any status group.
pub fn arb_group() -> impl Strategy<Value = Group> {
    prop::sample::select(Group::ALL.to_vec())
}

/// Generates a code in the range used by the protocol tables.
pub fn arb_code() -> impl Strategy<Value = Code> {
    prop_oneof![0i32..32, Just(200), Just(400), Just(403), Just(404), Just(500), Just(503)]
}

/// Generates a status with no details.
pub fn arb_status() -> impl Strategy<Value = Status> {
    (arb_group(), arb_code(), "[a-z ]{0,24}")
        .prop_map(|(group, code, message)| Status::new(group, code, message, Vec::new()))
}

/// Generates a retryable code table of up to eight entries.
pub fn arb_retryable_codes() -> impl Strategy<Value = RetryableCodes> {
    proptest::collection::vec((arb_group(), arb_code()), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect())
}

/// Generates retry options that pass validation.
///
/// Backoffs stay in the low milliseconds so generated options are usable
/// in tests that actually sleep.
pub fn arb_retry_opts() -> impl Strategy<Value = RetryOpts> {
    (0u32..6, 1u64..5, 0u64..20, 1.0f64..4.0, arb_retryable_codes()).prop_map(
        |(attempts, initial_ms, extra_ms, backoff_factor, retryable_codes)| RetryOpts {
            attempts,
            initial_backoff: Duration::from_millis(initial_ms),
            max_backoff: Duration::from_millis(initial_ms + extra_ms),
            backoff_factor,
            retryable_codes,
        },
    )
}
