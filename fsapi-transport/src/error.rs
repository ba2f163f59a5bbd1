//! Error types for the HTTP transport

use thiserror::Error;

/// Errors that can occur while talking HTTP to a device
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The device could not be reached (DNS, refused connection, broken socket)
    #[error("Device unreachable: {0}")]
    Unreachable(String),

    /// Connecting to or reading from the device took longer than allowed
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The device answered with a non-2xx HTTP status
    ///
    /// Some firmwares report protocol failures this way while still sending a
    /// status document, so the body is kept when it could be read.
    #[error("HTTP error: status {status}")]
    HttpError {
        status: u16,
        body: Option<String>,
    },
}

impl TransportError {
    /// HTTP status code, if this is an HTTP-level failure
    pub fn http_status(&self) -> Option<u16> {
        match self {
            TransportError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}
