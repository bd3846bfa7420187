//! Origin categories for SDK statuses.

use core::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Origin category of a status.
///
/// The numeric code carried alongside a group is only meaningful relative to
/// the group: code `2` is `CONNECTION_FAILED` for [`Group::EndorserClient`]
/// but `BAD_PAYLOAD` for [`Group::EventServer`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Group {
    /// Origin could not be determined.
    #[default]
    Unknown = 0,
    /// Test-only statuses.
    Test = 1,
    /// Status reported by the gRPC transport.
    GrpcTransport = 2,
    /// Status reported by an HTTP transport.
    HttpTransport = 3,
    /// Status returned by an endorsing peer in a proposal response.
    EndorserServer = 4,
    /// Transaction validation code delivered by the event service.
    EventServer = 5,
    /// Status returned by an orderer broadcast.
    OrdererServer = 6,
    /// Status returned by a Fabric CA server.
    FabricCaServer = 7,
    /// Failure inferred by the client while talking to an endorser.
    EndorserClient = 8,
    /// Failure inferred by the client while talking to an orderer.
    OrdererClient = 9,
    /// Generic client-side failure.
    Client = 10,
    /// Status returned by chaincode.
    Chaincode = 11,
    /// Status returned by the discovery service.
    DiscoveryServer = 12,
}

impl Group {
    /// All groups in numeric order.
    pub const ALL: [Group; 13] = [
        Self::Unknown,
        Self::Test,
        Self::GrpcTransport,
        Self::HttpTransport,
        Self::EndorserServer,
        Self::EventServer,
        Self::OrdererServer,
        Self::FabricCaServer,
        Self::EndorserClient,
        Self::OrdererClient,
        Self::Client,
        Self::Chaincode,
        Self::DiscoveryServer,
    ];

    /// Returns the numeric value of the group.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Converts a numeric value to a group, returning `None` for unknown values.
    #[must_use]
    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.as_i32() == value)
    }

    /// Human-readable group name used when rendering statuses.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Test => "Test status",
            Self::GrpcTransport => "gRPC Transport Status",
            Self::HttpTransport => "HTTP Transport Status",
            Self::EndorserServer => "Endorser Server Status",
            Self::EventServer => "Event Server Status",
            Self::OrdererServer => "Orderer Server Status",
            Self::FabricCaServer => "Fabric CA Server Status",
            Self::EndorserClient => "Endorser Client Status",
            Self::OrdererClient => "Orderer Client Status",
            Self::Client => "Client Status",
            Self::Chaincode => "Chaincode status",
            Self::DiscoveryServer => "Discovery status",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
