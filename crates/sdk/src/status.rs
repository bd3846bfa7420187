//! Structured, groupable status values.
//!
//! A [`Status`] is created where a failure is first detected (a dropped
//! connection, a non-success proposal response, a bad signature) and is
//! immutable from then on. It may be wrapped with [`SdkError::wrap`] and is
//! recovered through [`Status::from_error`].

use std::{fmt, sync::Arc};

use fabric_sdk_types::{ClientCode, Code, Group, code_name};

use crate::error::SdkError;

/// One opaque value attached to a [`Status`].
#[derive(Debug, Clone)]
pub enum Detail {
    /// Network address of the peer or orderer involved.
    Url(String),
    /// Free-form text.
    Text(String),
    /// Raw payload returned by the remote side.
    Payload(Vec<u8>),
    /// A nested error, e.g. one constituent of an aggregate.
    Error(Arc<SdkError>),
}

impl Detail {
    /// Returns the detail as a string if it is a URL or text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Url(value) | Self::Text(value) => Some(value.as_str()),
            Self::Payload(_) | Self::Error(_) => None,
        }
    }

    /// Returns the nested error if this detail holds one.
    #[must_use]
    pub fn as_error(&self) -> Option<&SdkError> {
        match self {
            Self::Error(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Nested errors compare by their rendered message.
impl PartialEq for Detail {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Url(a), Self::Url(b)) | (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Payload(a), Self::Payload(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => Arc::ptr_eq(a, b) || a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// A `(group, code, message, details)` descriptor of a failure or result.
///
/// The code is interpreted relative to the group; see
/// [`fabric_sdk_types::codes`] for the per-group code spaces.
///
/// # Example
///
/// ```
/// use fabric_sdk::{SdkError, Status};
/// use fabric_sdk_types::{ClientCode, Group};
///
/// let status = Status::connection_failed("grpcs://peer0.org1:7051", "connection refused");
/// assert_eq!(status.group(), Group::EndorserClient);
/// assert_eq!(status.code(), ClientCode::ConnectionFailed.as_code());
///
/// let err = SdkError::from(status.clone()).wrap("send proposal");
/// assert_eq!(Status::from_error(Some(&err)), Some(status));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    group: Group,
    code: Code,
    message: String,
    details: Vec<Detail>,
}

impl Status {
    /// Creates a status.
    #[must_use]
    pub fn new(group: Group, code: Code, message: impl Into<String>, details: Vec<Detail>) -> Self {
        Self { group, code, message: message.into(), details }
    }

    /// The status reported for the absence of an error.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(Group::Unknown, ClientCode::Ok.as_code(), "", Vec::new())
    }

    /// A client-side connection failure towards an endorser.
    ///
    /// The peer URL is stored as the first detail, where the greylist looks
    /// for it.
    #[must_use]
    pub fn connection_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            Group::EndorserClient,
            ClientCode::ConnectionFailed.as_code(),
            message,
            vec![Detail::Url(url.into())],
        )
    }

    /// A client-side connection failure towards an orderer.
    #[must_use]
    pub fn orderer_connection_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            Group::OrdererClient,
            ClientCode::ConnectionFailed.as_code(),
            message,
            vec![Detail::Url(url.into())],
        )
    }

    /// Converts a gRPC status into a transport status.
    ///
    /// Binary details carried by the gRPC status are kept as a payload.
    #[must_use]
    pub fn from_grpc_status(status: &tonic::Status) -> Self {
        let mut details = Vec::new();
        if !status.details().is_empty() {
            details.push(Detail::Payload(status.details().to_vec()));
        }
        Self::new(Group::GrpcTransport, status.code() as Code, status.message(), details)
    }

    /// Builds a status from a non-success proposal response returned by `url`.
    #[must_use]
    pub fn from_proposal_response(
        status: Code,
        message: impl Into<String>,
        payload: Vec<u8>,
        url: impl Into<String>,
    ) -> Self {
        Self::new(
            Group::EndorserServer,
            status,
            message,
            vec![Detail::Payload(payload), Detail::Url(url.into())],
        )
    }

    /// Builds a status from an error code and message extracted from chaincode.
    #[must_use]
    pub fn from_chaincode_error(code: Code, message: impl Into<String>) -> Self {
        Self::new(Group::Chaincode, code, message, Vec::new())
    }

    /// The aggregate status describing several errors from one operation.
    #[must_use]
    pub fn multiple_errors(errors: &[SdkError]) -> Self {
        let details = errors.iter().cloned().map(|err| Detail::Error(Arc::new(err))).collect();
        Self::new(
            Group::Client,
            ClientCode::MultipleErrors.as_code(),
            "Multiple errors occurred",
            details,
        )
    }

    /// Extracts a status from an error.
    ///
    /// - `None` yields [`Status::ok`].
    /// - A status error yields that status.
    /// - Context wrappers are unwrapped and the cause is checked again.
    /// - An aggregate yields a `Client`/`MultipleErrors` status whose details
    ///   are the constituent errors.
    /// - Anything else yields `None`.
    #[must_use]
    pub fn from_error(err: Option<&SdkError>) -> Option<Status> {
        let Some(mut err) = err else {
            return Some(Self::ok());
        };

        loop {
            match err {
                SdkError::Status { status } => return Some(status.clone()),
                SdkError::Multiple { errors } => return Some(Self::multiple_errors(errors)),
                SdkError::Context { source, .. } => err = source,
                SdkError::Unclassified { .. } | SdkError::Config { .. } | SdkError::Cancelled => {
                    return None;
                },
            }
        }
    }

    /// Converts a transport status back into a gRPC status.
    ///
    /// Returns `None` for statuses of any other group.
    #[must_use]
    pub fn to_grpc_status(&self) -> Option<tonic::Status> {
        if self.group != Group::GrpcTransport {
            return None;
        }
        Some(tonic::Status::new(tonic::Code::from_i32(self.code), self.message.clone()))
    }

    /// Returns the origin group.
    #[must_use]
    pub fn group(&self) -> Group {
        self.group
    }

    /// Returns the numeric code, interpreted relative to the group.
    #[must_use]
    pub fn code(&self) -> Code {
        self.code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the attached details in order.
    #[must_use]
    pub fn details(&self) -> &[Detail] {
        &self.details
    }

    /// Returns whether this status matches `group` and `code`.
    #[must_use]
    pub fn is(&self, group: Group, code: Code) -> bool {
        self.group == group && self.code == code
    }

    /// Returns the symbolic name of the code within the group.
    #[must_use]
    pub fn code_name(&self) -> std::borrow::Cow<'static, str> {
        code_name(self.group, self.code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Code: ({}) {}. Description: {}",
            self.group,
            self.code,
            self.code_name(),
            self.message
        )
    }
}

impl std::error::Error for Status {}
