use fsapi_api::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Node {0} is write-only")]
    NotReadable(String),

    #[error("Node {0} is read-only")]
    NotWritable(String),

    #[error("Node {0} is a list")]
    ListNode(String),

    #[error("Node {0} is not a list")]
    NotAList(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Node {node} returned unexpected value '{value}'")]
    UnexpectedValue { node: String, value: String },
}

pub type Result<T> = std::result::Result<T, SdkError>;
