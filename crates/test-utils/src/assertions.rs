//! Test assertion helpers.

use std::time::Duration;

use fabric_sdk::{SdkError, Status};
use fabric_sdk_types::{Code, Group};
use tokio::time::{Instant, sleep};

/// Default polling interval for [`assert_eventually`].
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polls a condition until it returns true or the timeout expires.
///
/// Useful for state that changes on a timer, such as greylist entries
/// expiring.
///
/// # Returns
///
/// `true` if the condition became true before timeout, `false` otherwise.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use fabric_sdk::{Greylist, PeerInfo};
/// use fabric_sdk_test_utils::{assert_eventually, connection_failed_error};
///
/// # async fn example() {
/// let greylist = Greylist::new(Duration::from_millis(50));
/// greylist.greylist(&connection_failed_error("peer0:7051"));
///
/// let peer = PeerInfo::new("peer0:7051");
/// let result = assert_eventually(Duration::from_millis(500), || greylist.accept(&peer)).await;
/// assert!(result, "greylist entry should expire");
/// # }
/// ```
pub async fn assert_eventually<F>(timeout: Duration, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let start = Instant::now();

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        sleep(DEFAULT_POLL_INTERVAL).await;
    }

    // Final check after timeout
    condition()
}

/// Returns whether `err` carries a status with `group` and `code`, looking
/// through context wrappers.
pub fn has_status(err: &SdkError, group: Group, code: Code) -> bool {
    Status::from_error(Some(err)).is_some_and(|status| status.is(group, code))
}
