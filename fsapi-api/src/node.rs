//! References to device nodes

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Identifies a node on the device
///
/// The engine never interprets a node reference; it is rendered into the
/// request path as-is. Symbolic names look like `netRemote.sys.audio.volume`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Id(u32),
    Name(String),
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Id(id) => write!(f, "{}", id),
            NodeRef::Name(name) => f.write_str(name),
        }
    }
}

impl From<u32> for NodeRef {
    fn from(id: u32) -> Self {
        NodeRef::Id(id)
    }
}

impl From<&str> for NodeRef {
    fn from(name: &str) -> Self {
        NodeRef::Name(name.to_string())
    }
}

impl From<String> for NodeRef {
    fn from(name: String) -> Self {
        NodeRef::Name(name)
    }
}

impl From<&NodeRef> for NodeRef {
    fn from(node: &NodeRef) -> Self {
        node.clone()
    }
}

impl FromStr for NodeRef {
    type Err = Infallible;

    /// All-digit input becomes an `Id`, anything else a `Name`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<u32>()
            .map(NodeRef::Id)
            .unwrap_or_else(|_| NodeRef::Name(s.to_string())))
    }
}
