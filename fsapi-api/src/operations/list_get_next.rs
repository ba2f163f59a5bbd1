//! LIST_GET_NEXT operation for one page of a list

use crate::error::DecodeError;
use crate::node::NodeRef;
use crate::operation::FsapiOperation;
use crate::response::{ListPage, Response};
use crate::status::Status;

/// `LIST_GET_NEXT/<node>/<after>?maxItems=N` - read one page of a list
///
/// The device returns the rows that follow position `<after>`, so a page
/// starting at offset `o` is requested with `<after> = o - 1` (`-1` for the
/// first page).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGetNext {
    pub node: NodeRef,
    pub start_offset: usize,
    pub max_items: usize,
}

impl ListGetNext {
    pub fn new(node: impl Into<NodeRef>, start_offset: usize, max_items: usize) -> Self {
        Self {
            node: node.into(),
            start_offset,
            max_items,
        }
    }

    fn after(&self) -> i64 {
        i64::try_from(self.start_offset).unwrap_or(i64::MAX) - 1
    }
}

impl FsapiOperation for ListGetNext {
    type Output = ListPage;

    fn path(&self) -> String {
        format!("LIST_GET_NEXT/{}/{}", self.node, self.after())
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![("maxItems", self.max_items.to_string())]
    }

    fn accepts(&self, status: &Status) -> bool {
        matches!(status, Status::Ok | Status::ListEnd)
    }

    fn parse_response(&self, response: &Response) -> Result<Self::Output, DecodeError> {
        response.list_page(self.start_offset)
    }
}
