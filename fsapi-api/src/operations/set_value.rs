//! SET operation for a single node value

use crate::error::DecodeError;
use crate::node::NodeRef;
use crate::operation::FsapiOperation;
use crate::response::Response;
use crate::value::{encode_value, Value};

/// `SET/<node>?value=...` - write one value, acknowledged by status only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValue {
    pub node: NodeRef,
    pub value: Value,
}

impl SetValue {
    pub fn new(node: impl Into<NodeRef>, value: impl Into<Value>) -> Self {
        Self {
            node: node.into(),
            value: value.into(),
        }
    }
}

impl FsapiOperation for SetValue {
    type Output = ();

    fn path(&self) -> String {
        format!("SET/{}", self.node)
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let (_, text) = encode_value(&self.value);
        vec![("value", text)]
    }

    fn parse_response(&self, _response: &Response) -> Result<Self::Output, DecodeError> {
        Ok(())
    }
}
