//! Private HTTP transport for FSAPI device communication
//!
//! This crate provides the lowest layer of the fsapi-sdk stack: it issues a
//! GET request against a device's API root and hands back the raw response
//! body bytes. It knows nothing about sessions, status codes, text encoding
//! or value types; those live in `fsapi-api`.

mod error;

pub use error::TransportError;

use std::error::Error as StdError;
use std::io::{self, Read};
use std::time::Duration;
use tracing::debug;

/// Default time allowed to establish the TCP connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed for reading the response
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that can carry one FSAPI request to a device and return its body
///
/// Each call is one round-trip; implementations never retry or cache. The
/// protocol engine is written against this trait so it can be driven by an
/// in-memory device in tests.
pub trait Transport: Send + Sync {
    /// Send a request for `path` (relative to the API root) with the given
    /// query parameters, returning the exact body bytes of a 2xx response.
    fn send(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<u8>, TransportError>;

    /// The API root this transport talks to
    fn base_url(&self) -> &str;
}

/// Blocking HTTP transport built on a shared `ureq` agent
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given API root with default timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT)
    }

    /// Create a transport with explicit connect and read timeouts
    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect_timeout)
                .timeout_read(read_timeout)
                .build(),
            base_url,
        }
    }

    /// Perform a plain GET against an absolute URL and return the body
    ///
    /// Used for documents that live outside the API root, such as the device
    /// description that announces where the API root is.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        debug!(url, "fetching document");
        let response = self.agent.get(url).call().map_err(map_ureq_error)?;
        read_body(response)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Transport for HttpTransport {
    fn send(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<u8>, TransportError> {
        let url = self.url_for(path);
        debug!(path, "sending request");

        let mut request = self.agent.get(&url);
        for (name, value) in params {
            request = request.query(name, value);
        }

        let response = request.call().map_err(map_ureq_error)?;
        read_body(response)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Read the body verbatim; decoding it as text is the caller's concern
fn read_body(response: ureq::Response) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| map_io_error(&e))?;
    Ok(body)
}

fn map_ureq_error(error: ureq::Error) -> TransportError {
    match error {
        ureq::Error::Status(status, response) => TransportError::HttpError {
            status,
            body: read_body(response)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .filter(|b| !b.trim().is_empty()),
        },
        ureq::Error::Transport(transport) => {
            if is_timeout(&transport) {
                TransportError::Timeout(transport.to_string())
            } else {
                TransportError::Unreachable(transport.to_string())
            }
        }
    }
}

fn map_io_error(error: &io::Error) -> TransportError {
    match error.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            TransportError::Timeout(error.to_string())
        }
        _ => TransportError::Unreachable(error.to_string()),
    }
}

/// Walk the source chain looking for a timed-out socket operation
fn is_timeout(transport: &ureq::Transport) -> bool {
    let mut source = transport.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        source = err.source();
    }
    false
}
