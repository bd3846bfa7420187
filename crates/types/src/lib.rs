//! Status groups and protocol code tables for the Fabric client SDK.
//!
//! A failure observed by the SDK is described by a `(Group, Code)` pair. The
//! group names the origin of the failure (transport, a server role, the
//! client itself, chaincode) and the code is interpreted relative to that
//! group:
//!
//! | Group                          | Code space                         |
//! |--------------------------------|------------------------------------|
//! | `GrpcTransport`                | gRPC status codes                  |
//! | `EndorserServer`, `OrdererServer` | Fabric common status codes      |
//! | `EventServer`                  | transaction validation codes       |
//! | `EndorserClient`, `OrdererClient`, `Client` | SDK client codes      |
//! | everything else                | opaque                             |
//!
//! The retryable-code tables in [`retryable`] are pinned to the Fabric
//! protocol definitions these codes come from.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codes;
pub mod group;
pub mod retryable;

pub use codes::{ClientCode, Code, CommonStatus, TxValidationCode, code_name, grpc_code_name};
pub use group::Group;
pub use retryable::RetryableCodes;
