//! Per-group code spaces.
//!
//! Codes are plain `i32` values. The enums here give names to the values the
//! SDK reasons about; any other value is still a valid code and renders as
//! its number.

use std::borrow::Cow;

use crate::group::Group;

/// Numeric status code, interpreted relative to a [`Group`].
pub type Code = i32;

/// Declares a `#[repr(i32)]` code enum with `as_code`, `from_code` and `name`.
macro_rules! code_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// Returns the numeric code value.
            #[must_use]
            pub const fn as_code(self) -> Code {
                self as Code
            }

            /// Converts a numeric code, returning `None` for values outside the table.
            #[must_use]
            pub const fn from_code(code: Code) -> Option<Self> {
                match code {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Symbolic name as defined by the protocol.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

code_table! {
    /// Codes inferred by the SDK itself (endorser client, orderer client and
    /// generic client groups).
    pub enum ClientCode {
        /// Operation succeeded.
        Ok = 0 => "OK",
        /// Unclassified failure.
        Unknown = 1 => "UNKNOWN",
        /// A connection to the target could not be established.
        ConnectionFailed = 2 => "CONNECTION_FAILED",
        /// Endorsers returned different proposal response payloads.
        EndorsementMismatch = 3 => "ENDORSEMENT_MISMATCH",
        /// The signing identity has no certificate.
        EmptyCert = 4 => "EMPTY_CERT",
        /// The operation timed out.
        Timeout = 5 => "TIMEOUT",
        /// No peers satisfied the selection criteria.
        NoPeersFound = 6 => "NO_PEERS_FOUND",
        /// Several failures occurred in one logical operation.
        MultipleErrors = 7 => "MULTIPLE_ERRORS",
        /// A response signature failed verification.
        SignatureVerificationFailed = 8 => "SIGNATURE_VERIFICATION_FAILED",
        /// A required endorsement is missing.
        MissingEndorsement = 9 => "MISSING_ENDORSEMENT",
        /// Querying endorsers from discovery failed.
        QueryEndorsers = 11 => "QUERY_ENDORSERS",
        /// A transient failure with no more specific code.
        GenericTransient = 12 => "GENERIC_TRANSIENT",
        /// Chaincode was invoked before it finished launching.
        PrematureChaincodeExecution = 21 => "PREMATURE_CHAINCODE_EXECUTION",
        /// Chaincode is still being launched by the peer.
        ChaincodeAlreadyLaunching = 22 => "CHAINCODE_ALREADY_LAUNCHING",
        /// The peer does not know the chaincode name yet.
        ChaincodeNameNotFound = 23 => "CHAINCODE_NAME_NOT_FOUND",
    }
}

code_table! {
    /// Fabric `common.Status` values returned by endorsers and orderers.
    pub enum CommonStatus {
        /// Unset status.
        Unknown = 0 => "UNKNOWN",
        /// Request succeeded.
        Success = 200 => "SUCCESS",
        /// Malformed request.
        BadRequest = 400 => "BAD_REQUEST",
        /// Caller is not authorized.
        Forbidden = 403 => "FORBIDDEN",
        /// Requested resource does not exist.
        NotFound = 404 => "NOT_FOUND",
        /// Request exceeds the maximum size.
        RequestEntityTooLarge = 413 => "REQUEST_ENTITY_TOO_LARGE",
        /// Server-side failure.
        InternalServerError = 500 => "INTERNAL_SERVER_ERROR",
        /// Operation is not implemented.
        NotImplemented = 501 => "NOT_IMPLEMENTED",
        /// Server is temporarily unable to handle the request.
        ServiceUnavailable = 503 => "SERVICE_UNAVAILABLE",
    }
}

code_table! {
    /// Fabric `TxValidationCode` values reported by the event service.
    pub enum TxValidationCode {
        /// Transaction is valid.
        Valid = 0 => "VALID",
        /// Envelope was nil.
        NilEnvelope = 1 => "NIL_ENVELOPE",
        /// Payload could not be decoded.
        BadPayload = 2 => "BAD_PAYLOAD",
        /// Common header is malformed.
        BadCommonHeader = 3 => "BAD_COMMON_HEADER",
        /// Creator signature is invalid.
        BadCreatorSignature = 4 => "BAD_CREATOR_SIGNATURE",
        /// Endorser transaction is invalid.
        InvalidEndorserTransaction = 5 => "INVALID_ENDORSER_TRANSACTION",
        /// Config transaction is invalid.
        InvalidConfigTransaction = 6 => "INVALID_CONFIG_TRANSACTION",
        /// Payload type is not supported.
        UnsupportedTxPayload = 7 => "UNSUPPORTED_TX_PAYLOAD",
        /// Proposal transaction id is malformed.
        BadProposalTxid = 8 => "BAD_PROPOSAL_TXID",
        /// Transaction id was already committed.
        DuplicateTxid = 9 => "DUPLICATE_TXID",
        /// Endorsements do not satisfy the endorsement policy.
        EndorsementPolicyFailure = 10 => "ENDORSEMENT_POLICY_FAILURE",
        /// Read set is stale.
        MvccReadConflict = 11 => "MVCC_READ_CONFLICT",
        /// Range query results changed.
        PhantomReadConflict = 12 => "PHANTOM_READ_CONFLICT",
        /// Transaction type is unknown.
        UnknownTxType = 13 => "UNKNOWN_TX_TYPE",
        /// Target channel does not exist.
        TargetChainNotFound = 14 => "TARGET_CHAIN_NOT_FOUND",
        /// Transaction could not be marshalled.
        MarshalTxError = 15 => "MARSHAL_TX_ERROR",
        /// Transaction action is nil.
        NilTxaction = 16 => "NIL_TXACTION",
        /// Chaincode has expired.
        ExpiredChaincode = 17 => "EXPIRED_CHAINCODE",
        /// Chaincode version does not match.
        ChaincodeVersionConflict = 18 => "CHAINCODE_VERSION_CONFLICT",
        /// Header extension is malformed.
        BadHeaderExtension = 19 => "BAD_HEADER_EXTENSION",
        /// Channel header is malformed.
        BadChannelHeader = 20 => "BAD_CHANNEL_HEADER",
        /// Response payload is malformed.
        BadResponsePayload = 21 => "BAD_RESPONSE_PAYLOAD",
        /// Read-write set is malformed.
        BadRwset = 22 => "BAD_RWSET",
        /// Write set touches a forbidden namespace.
        IllegalWriteset = 23 => "ILLEGAL_WRITESET",
        /// Write set is invalid.
        InvalidWriteset = 24 => "INVALID_WRITESET",
        /// Chaincode is invalid.
        InvalidChaincode = 25 => "INVALID_CHAINCODE",
        /// Transaction was not validated.
        NotValidated = 254 => "NOT_VALIDATED",
        /// Transaction failed validation for another reason.
        InvalidOtherReason = 255 => "INVALID_OTHER_REASON",
    }
}

/// Returns the gRPC name of a transport code, or `None` outside `0..=16`.
#[must_use]
pub fn grpc_code_name(code: Code) -> Option<&'static str> {
    use tonic::Code as Grpc;

    if !(0..=16).contains(&code) {
        return None;
    }

    let name = match Grpc::from_i32(code) {
        Grpc::Ok => "OK",
        Grpc::Cancelled => "Canceled",
        Grpc::Unknown => "Unknown",
        Grpc::InvalidArgument => "InvalidArgument",
        Grpc::DeadlineExceeded => "DeadlineExceeded",
        Grpc::NotFound => "NotFound",
        Grpc::AlreadyExists => "AlreadyExists",
        Grpc::PermissionDenied => "PermissionDenied",
        Grpc::ResourceExhausted => "ResourceExhausted",
        Grpc::FailedPrecondition => "FailedPrecondition",
        Grpc::Aborted => "Aborted",
        Grpc::OutOfRange => "OutOfRange",
        Grpc::Unimplemented => "Unimplemented",
        Grpc::Internal => "Internal",
        Grpc::Unavailable => "Unavailable",
        Grpc::DataLoss => "DataLoss",
        Grpc::Unauthenticated => "Unauthenticated",
    };
    Some(name)
}

/// Renders the symbolic name of `code` within `group`.
///
/// Groups with a known code table fall back to the raw number for codes
/// outside the table. Groups without a table render as `"Unknown"`.
#[must_use]
pub fn code_name(group: Group, code: Code) -> Cow<'static, str> {
    let name = match group {
        Group::GrpcTransport => grpc_code_name(code),
        Group::EndorserServer | Group::OrdererServer => {
            CommonStatus::from_code(code).map(CommonStatus::name)
        },
        Group::EventServer => TxValidationCode::from_code(code).map(TxValidationCode::name),
        Group::EndorserClient | Group::OrdererClient | Group::Client => {
            ClientCode::from_code(code).map(ClientCode::name)
        },
        _ => return Cow::Borrowed("Unknown"),
    };

    match name {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(code.to_string()),
    }
}
