//! Canned SDK errors.

use fabric_sdk::{SdkError, Status};
use fabric_sdk_types::{ClientCode, CommonStatus, Group};

/// An endorser connection failure for `url`, the error the greylist records.
pub fn connection_failed_error(url: &str) -> SdkError {
    Status::connection_failed(url, "connection refused").into()
}

/// A `Test`/`GenericTransient` error, retryable under
/// [`RetryableCodes::test`](fabric_sdk_types::RetryableCodes::test).
pub fn transient_error(message: &str) -> SdkError {
    Status::new(Group::Test, ClientCode::GenericTransient.as_code(), message, Vec::new()).into()
}

/// An endorser `BAD_REQUEST`, absent from every default retryable table.
pub fn non_retryable_error(message: &str) -> SdkError {
    Status::new(Group::EndorserServer, CommonStatus::BadRequest.as_code(), message, Vec::new())
        .into()
}

/// An error carrying no status.
pub fn unclassified_error(message: &str) -> SdkError {
    SdkError::Unclassified { message: message.to_owned() }
}
