//! Operation framework for FSAPI requests
//!
//! Each request kind (session creation, get, set, list page) is a type
//! implementing [`FsapiOperation`]: it knows its path, its extra query
//! parameters, which statuses count as success, and how to pull its typed
//! output out of a decoded response.

use thiserror::Error;
use tracing::debug;
use transport::{Transport, TransportError};

use crate::error::DecodeError;
use crate::response::{self, Response};
use crate::status::Status;

/// Base trait for all FSAPI operations
pub trait FsapiOperation {
    /// Typed result of a successful exchange
    type Output;

    /// Request path relative to the API root, e.g. `GET/netRemote.sys.power`
    fn path(&self) -> String;

    /// Operation-specific query parameters (`pin` and `sid` are added by the
    /// caller)
    fn params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Whether `status` means the operation succeeded
    fn accepts(&self, status: &Status) -> bool {
        status.is_ok()
    }

    /// Extract the typed output from an accepted response
    fn parse_response(&self, response: &Response) -> Result<Self::Output, DecodeError>;
}

/// Result of one request/response exchange
#[derive(Debug)]
pub(crate) enum Exchange<T> {
    /// The device accepted the request
    Completed(T),
    /// The device answered with a status the operation does not accept
    Refused(Status),
}

/// Failure of a single exchange, before any session logic applies
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Perform one exchange for `op`: send, decode, check status, parse
///
/// An HTTP error whose body is a status document is treated as that status,
/// since devices report some protocol failures with a 4xx code.
pub(crate) fn exchange<Op: FsapiOperation>(
    transport: &dyn Transport,
    pin: &str,
    sid: Option<&str>,
    op: &Op,
) -> Result<Exchange<Op::Output>, ExchangeError> {
    let mut params = vec![("pin", pin.to_string())];
    if let Some(sid) = sid {
        params.push(("sid", sid.to_string()));
    }
    params.extend(op.params());

    let path = op.path();
    debug!(path = %path, session = sid.is_some(), "FSAPI request");
    let body = match transport.send(&path, &params) {
        Ok(body) => body,
        Err(TransportError::HttpError {
            status,
            body: Some(body),
        }) => match response::decode(&body) {
            Ok(decoded) => {
                debug!(path = %path, http_status = status, "status document in HTTP error response");
                return finish(op, &decoded);
            }
            Err(_) => {
                return Err(TransportError::HttpError {
                    status,
                    body: Some(body),
                }
                .into())
            }
        },
        Err(e) => return Err(e.into()),
    };

    let decoded = response::decode_bytes(&body)?;
    finish(op, &decoded)
}

fn finish<Op: FsapiOperation>(
    op: &Op,
    response: &Response,
) -> Result<Exchange<Op::Output>, ExchangeError> {
    if op.accepts(response.status()) {
        Ok(Exchange::Completed(op.parse_response(response)?))
    } else {
        Ok(Exchange::Refused(response.status().clone()))
    }
}
