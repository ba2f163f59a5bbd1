//! GET operation for a single node value

use crate::error::DecodeError;
use crate::node::NodeRef;
use crate::operation::FsapiOperation;
use crate::response::Response;
use crate::value::{Value, ValueKind};

/// `GET/<node>` - read one typed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetValue {
    pub node: NodeRef,
    /// Tag the caller expects, checked against the one the device sends
    pub expected: Option<ValueKind>,
}

impl GetValue {
    pub fn new(node: impl Into<NodeRef>) -> Self {
        Self {
            node: node.into(),
            expected: None,
        }
    }

    pub fn expecting(node: impl Into<NodeRef>, kind: ValueKind) -> Self {
        Self {
            node: node.into(),
            expected: Some(kind),
        }
    }
}

impl FsapiOperation for GetValue {
    type Output = Value;

    fn path(&self) -> String {
        format!("GET/{}", self.node)
    }

    fn parse_response(&self, response: &Response) -> Result<Self::Output, DecodeError> {
        let value = response.value()?;
        match self.expected {
            Some(expected) if expected != value.kind() => Err(DecodeError::TypeMismatch {
                expected,
                found: value.kind(),
            }),
            _ => Ok(value),
        }
    }
}
