//! Protocol status codes carried by every FSAPI response

use std::fmt;

/// Outcome code reported by the device in the `<status>` element
///
/// This is the authoritative success signal for a request, independent of the
/// HTTP status of the response that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// `FS_OK`
    Ok,
    /// `FS_FAIL` - the device refused the operation (e.g. read-only node)
    Fail,
    /// `FS_PACKET_BAD` - the request was malformed (e.g. value out of range)
    PacketBad,
    /// `FS_NODE_DOES_NOT_EXIST`
    NodeDoesNotExist,
    /// `FS_NODE_BLOCKED` - node exists but is unavailable in the current mode
    NodeBlocked,
    /// `FS_TIMEOUT`
    Timeout,
    /// `FS_SESSION_INVALID` - the session id is unknown or expired
    SessionInvalid,
    /// `FS_LIST_END` - no list items exist past the requested position
    ListEnd,
    /// `FS_UNKNOWN_ERROR`
    UnknownError,
    /// Any code not listed above, preserved verbatim
    Other(String),
}

impl Status {
    /// Map a wire status code to a `Status`
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "FS_OK" => Status::Ok,
            "FS_FAIL" => Status::Fail,
            "FS_PACKET_BAD" => Status::PacketBad,
            "FS_NODE_DOES_NOT_EXIST" => Status::NodeDoesNotExist,
            "FS_NODE_BLOCKED" => Status::NodeBlocked,
            "FS_TIMEOUT" => Status::Timeout,
            "FS_SESSION_INVALID" => Status::SessionInvalid,
            "FS_LIST_END" => Status::ListEnd,
            "FS_UNKNOWN_ERROR" => Status::UnknownError,
            other => Status::Other(other.to_string()),
        }
    }

    /// The wire representation of this status
    pub fn code(&self) -> &str {
        match self {
            Status::Ok => "FS_OK",
            Status::Fail => "FS_FAIL",
            Status::PacketBad => "FS_PACKET_BAD",
            Status::NodeDoesNotExist => "FS_NODE_DOES_NOT_EXIST",
            Status::NodeBlocked => "FS_NODE_BLOCKED",
            Status::Timeout => "FS_TIMEOUT",
            Status::SessionInvalid => "FS_SESSION_INVALID",
            Status::ListEnd => "FS_LIST_END",
            Status::UnknownError => "FS_UNKNOWN_ERROR",
            Status::Other(code) => code,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
