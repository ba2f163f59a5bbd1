use thiserror::Error;
use transport::TransportError;

use crate::list::ListResult;
use crate::operation::ExchangeError;
use crate::status::Status;
use crate::value::ValueKind;

/// Errors produced while turning a response body into typed data
///
/// A well-formed document that carries a non-OK status is *not* a decode
/// error; it decodes successfully and the status is handled by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body is not an FSAPI response document at all
    #[error("Response is not a well-formed FSAPI document: {0}")]
    NotWellFormed(String),

    /// The value content cannot be parsed for its declared type
    #[error("Malformed {kind} value: {reason}")]
    Malformed { kind: ValueKind, reason: String },

    /// The value element carries a type tag this client does not know
    #[error("Unknown value type tag '{0}'")]
    UnknownType(String),

    /// A numeric value does not fit the range of its declared type
    #[error("Value '{text}' overflows {kind}")]
    NumericOverflow { kind: ValueKind, text: String },

    /// The device sent a differently typed value than the caller expected
    #[error("Expected {expected} value, device sent {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },
}

impl DecodeError {
    pub(crate) fn malformed(kind: ValueKind, reason: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            reason: reason.into(),
        }
    }
}

/// Why the device did not hand out a session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationFailure {
    /// The device refused the PIN
    #[error("device rejected the PIN")]
    PinRejected,

    /// The device answered with a non-OK status
    #[error("device answered {0}")]
    Status(Status),

    #[error("{0}")]
    Transport(TransportError),

    #[error("{0}")]
    Decode(DecodeError),
}

/// Errors from the session manager
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session creation failed: {0}")]
    CreationFailed(CreationFailure),
}

impl SessionError {
    /// True when the failure is a PIN rejection
    pub fn is_pin_rejected(&self) -> bool {
        matches!(
            self,
            SessionError::CreationFailed(CreationFailure::PinRejected)
        )
    }
}

/// Errors surfaced by the protocol engine's public operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    /// The device reported the session invalid again right after it was
    /// re-established
    #[error("Session expired and the retry with a fresh session failed")]
    SessionExpired,

    /// The device answered with a non-OK status other than session expiry
    #[error("Device rejected the request: {0}")]
    DeviceRejected(Status),

    /// The device reported different list sizes across pages of one retrieval
    #[error("List changed during retrieval: total count was {expected}, now {found}")]
    Inconsistent { expected: usize, found: usize },

    /// A page failed after earlier pages were retrieved
    ///
    /// `partial` holds the rows retrieved so far, always with
    /// `end_of_list == false`.
    #[error("List retrieval interrupted after {} rows: {source}", .partial.rows.len())]
    Interrupted {
        partial: ListResult,
        source: Box<ProtocolError>,
    },

    /// The caller passed an argument the engine cannot act on
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl ProtocolError {
    /// Rows retrieved before a list retrieval was interrupted, if any
    pub fn partial(&self) -> Option<&ListResult> {
        match self {
            ProtocolError::Interrupted { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// The device status behind a rejection, if this is one
    pub fn status(&self) -> Option<&Status> {
        match self {
            ProtocolError::DeviceRejected(status) => Some(status),
            ProtocolError::Interrupted { source, .. } => source.status(),
            _ => None,
        }
    }
}

impl From<ExchangeError> for ProtocolError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Transport(e) => ProtocolError::Transport(e),
            ExchangeError::Decode(e) => ProtocolError::Decode(e),
        }
    }
}

/// Type alias for results that can return a ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
