//! SDK error type.
//!
//! Every failure the SDK reasons about is one of a closed set of shapes:
//! - **Classified**: a [`Status`] carrying `(group, code, message, details)`
//! - **Wrapped**: context added on top of another error
//! - **Aggregate**: several failures from one logical operation
//! - **Unclassified**: a failure with no status, never retried
//!
//! Retry and greylist decisions only look at classified failures, reached
//! through [`Status::from_error`].

use snafu::Snafu;

use crate::status::Status;

/// Result type alias for SDK operations.
pub type Result<T, E = SdkError> = std::result::Result<T, E>;

/// SDK error types.
#[derive(Debug, Clone, Snafu)]
#[snafu(visibility(pub))]
pub enum SdkError {
    /// A failure classified into a status.
    #[snafu(display("{status}"))]
    Status {
        /// The classified status.
        status: Status,
    },

    /// Context added on top of an underlying error.
    #[snafu(display("{message}: {source}"))]
    Context {
        /// Description of what was being attempted.
        message: String,
        /// The wrapped error.
        #[snafu(source(from(SdkError, Box::new)))]
        source: Box<SdkError>,
    },

    /// Several failures from one logical operation, in the order observed.
    #[snafu(display("Multiple errors occurred: {}", render_all(errors)))]
    Multiple {
        /// The constituent errors.
        errors: Vec<SdkError>,
    },

    /// A failure that carries no status.
    #[snafu(display("{message}"))]
    Unclassified {
        /// Error description.
        message: String,
    },

    /// Configuration validation error.
    #[snafu(display("Configuration error: {message}"))]
    Config {
        /// Error description.
        message: String,
    },

    /// The operation was cancelled before it completed.
    #[snafu(display("Operation cancelled"))]
    Cancelled,
}

impl SdkError {
    /// Wraps this error with a description of the failed operation.
    #[must_use]
    pub fn wrap(self, message: impl Into<String>) -> Self {
        Self::Context { message: message.into(), source: Box::new(self) }
    }

    /// Collapses a list of errors into one.
    ///
    /// Returns `None` for an empty list, the error itself for a single
    /// element, and [`SdkError::Multiple`] otherwise.
    #[must_use]
    pub fn from_errors(mut errors: Vec<SdkError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple { errors }),
        }
    }

    /// Extracts the status carried by this error, if any.
    ///
    /// See [`Status::from_error`] for the extraction rules.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        Status::from_error(Some(self))
    }
}

impl From<Status> for SdkError {
    fn from(status: Status) -> Self {
        Self::Status { status }
    }
}

impl From<tonic::Status> for SdkError {
    fn from(status: tonic::Status) -> Self {
        Self::Status { status: Status::from_grpc_status(&status) }
    }
}

fn render_all(errors: &[SdkError]) -> String {
    let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join("; "))
}
