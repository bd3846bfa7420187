//! Tables of `(Group, Code)` pairs considered transient.
//!
//! The tables are plain values built on demand. Callers pick one (or build
//! their own) and hand it to the retry policy at construction time.
//!
//! The literal codes mirror the Fabric protocol definitions the SDK talks to
//! and are not guaranteed to be stable across protocol revisions.

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    codes::{ClientCode, Code, CommonStatus, TxValidationCode},
    group::Group,
};

/// Mapping from a group to the set of its codes that are retryable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RetryableCodes(BTreeMap<Group, BTreeSet<Code>>);

impl RetryableCodes {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `codes` to the set for `group`, returning the updated table.
    #[must_use]
    pub fn with<I>(mut self, group: Group, codes: I) -> Self
    where
        I: IntoIterator<Item = Code>,
    {
        self.insert(group, codes);
        self
    }

    /// Adds `codes` to the set for `group`.
    pub fn insert<I>(&mut self, group: Group, codes: I)
    where
        I: IntoIterator<Item = Code>,
    {
        self.0.entry(group).or_default().extend(codes);
    }

    /// Merges every entry of `other` into this table.
    pub fn merge(&mut self, other: &RetryableCodes) {
        for (group, codes) in &other.0 {
            self.insert(*group, codes.iter().copied());
        }
    }

    /// Returns whether `code` is retryable within `group`.
    #[must_use]
    pub fn contains(&self, group: Group, code: Code) -> bool {
        self.0.get(&group).is_some_and(|codes| codes.contains(&code))
    }

    /// Returns the retryable codes registered for `group`.
    #[must_use]
    pub fn codes(&self, group: Group) -> Option<&BTreeSet<Code>> {
        self.0.get(&group)
    }

    /// Returns whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    /// Iterates over `(group, codes)` entries in group order.
    pub fn iter(&self) -> impl Iterator<Item = (Group, &BTreeSet<Code>)> {
        self.0.iter().map(|(group, codes)| (*group, codes))
    }

    /// Table used by SDK clients unless configured otherwise.
    ///
    /// Covers endorsement mismatches, premature chaincode execution,
    /// unavailable or failing servers, transient validation conflicts and an
    /// unavailable gRPC transport.
    #[must_use]
    pub fn sdk_default() -> Self {
        Self::new()
            .with(
                Group::EndorserClient,
                [
                    ClientCode::EndorsementMismatch.as_code(),
                    ClientCode::PrematureChaincodeExecution.as_code(),
                ],
            )
            .with(
                Group::EndorserServer,
                [
                    CommonStatus::ServiceUnavailable.as_code(),
                    CommonStatus::InternalServerError.as_code(),
                ],
            )
            .with(
                Group::OrdererServer,
                [
                    CommonStatus::ServiceUnavailable.as_code(),
                    CommonStatus::InternalServerError.as_code(),
                    CommonStatus::BadRequest.as_code(),
                ],
            )
            .with(
                Group::EventServer,
                [
                    TxValidationCode::DuplicateTxid.as_code(),
                    TxValidationCode::EndorsementPolicyFailure.as_code(),
                    TxValidationCode::MvccReadConflict.as_code(),
                    TxValidationCode::PhantomReadConflict.as_code(),
                ],
            )
            .with(Group::GrpcTransport, [tonic::Code::Unavailable as Code])
    }

    /// Stricter table for channel clients.
    ///
    /// Extends [`sdk_default`](Self::sdk_default) with client-side connection
    /// failures towards endorsers and orderers, and with chaincode that the
    /// peer has not registered yet.
    #[must_use]
    pub fn channel_client() -> Self {
        Self::sdk_default()
            .with(
                Group::EndorserClient,
                [
                    ClientCode::ConnectionFailed.as_code(),
                    ClientCode::ChaincodeNameNotFound.as_code(),
                ],
            )
            .with(Group::OrdererClient, [ClientCode::ConnectionFailed.as_code()])
    }

    /// Table for resource management clients (channel creation, chaincode
    /// installation and instantiation).
    #[must_use]
    pub fn resource_management() -> Self {
        Self::sdk_default()
            .with(Group::EndorserClient, [ClientCode::ConnectionFailed.as_code()])
            .with(Group::OrdererClient, [ClientCode::ConnectionFailed.as_code()])
            .with(
                Group::Chaincode,
                [
                    ClientCode::ChaincodeAlreadyLaunching.as_code(),
                    ClientCode::ChaincodeNameNotFound.as_code(),
                ],
            )
    }

    /// Table used while fetching channel configuration.
    #[must_use]
    pub fn channel_config() -> Self {
        Self::new().with(Group::EndorserClient, [ClientCode::EndorsementMismatch.as_code()])
    }

    /// Table for tests that exercise retries with synthetic statuses.
    #[must_use]
    pub fn test() -> Self {
        Self::new().with(Group::Test, [ClientCode::GenericTransient.as_code()])
    }
}

impl FromIterator<(Group, Code)> for RetryableCodes {
    fn from_iter<T: IntoIterator<Item = (Group, Code)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (group, code) in iter {
            table.insert(group, [code]);
        }
        table
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_default_contents() {
        let table = RetryableCodes::sdk_default();

        assert!(table.contains(Group::EndorserClient, ClientCode::EndorsementMismatch.as_code()));
        assert!(table.contains(Group::EndorserServer, 503));
        assert!(table.contains(Group::EndorserServer, 500));
        assert!(table.contains(Group::OrdererServer, 400));
        assert!(table.contains(Group::EventServer, TxValidationCode::DuplicateTxid.as_code()));
        assert!(table.contains(Group::EventServer, TxValidationCode::PhantomReadConflict.as_code()));
        assert!(table.contains(Group::GrpcTransport, 14));

        // Connection failures are only retried by the stricter channel table
        assert!(!table.contains(Group::EndorserClient, ClientCode::ConnectionFailed.as_code()));
        assert!(!table.contains(Group::EndorserServer, 400));
    }

    #[test]
    fn test_channel_client_extends_default() {
        let default = RetryableCodes::sdk_default();
        let channel = RetryableCodes::channel_client();

        for (group, codes) in default.iter() {
            for code in codes {
                assert!(channel.contains(group, *code), "{group} {code} missing");
            }
        }
        assert!(channel.contains(Group::EndorserClient, ClientCode::ConnectionFailed.as_code()));
        assert!(channel.contains(Group::OrdererClient, ClientCode::ConnectionFailed.as_code()));
    }

    #[test]
    fn test_empty_table() {
        assert!(RetryableCodes::new().is_empty());
        assert!(RetryableCodes::new().with(Group::Test, Vec::<Code>::new()).is_empty());
        assert!(!RetryableCodes::test().is_empty());
    }

    #[test]
    fn test_merge_and_from_iter() {
        let mut table: RetryableCodes =
            [(Group::Test, 1), (Group::Test, 2), (Group::Chaincode, 500)].into_iter().collect();
        table.merge(&RetryableCodes::channel_config());

        assert!(table.contains(Group::Test, 2));
        assert!(table.contains(Group::Chaincode, 500));
        assert!(table.contains(Group::EndorserClient, ClientCode::EndorsementMismatch.as_code()));
        assert_eq!(table.codes(Group::Test).map(BTreeSet::len), Some(2));
    }

    #[test]
    fn test_deserialize_from_json() {
        let table: RetryableCodes =
            serde_json::from_str(r#"{"grpc_transport": [14], "endorser_client": [2, 3]}"#)
                .expect("valid table");

        assert!(table.contains(Group::GrpcTransport, 14));
        assert!(table.contains(Group::EndorserClient, 2));
        assert!(!table.contains(Group::EndorserClient, 4));
    }
}
