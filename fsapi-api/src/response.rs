//! Decoding of FSAPI response documents
//!
//! Every response is an `<fsapiResponse>` document with a mandatory
//! `<status>` child. Depending on the request it also carries a session id,
//! a single typed `<value>`, or a page of list `<item>` rows:
//!
//! ```xml
//! <fsapiResponse>
//!   <status>FS_OK</status>
//!   <item key="0">
//!     <field name="label"><c8_array>Internet Radio</c8_array></field>
//!   </item>
//!   <listend/>
//! </fsapiResponse>
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;
use xmltree::{Element, XMLNode};

use crate::error::DecodeError;
use crate::list::ListRow;
use crate::status::Status;
use crate::value::{decode_value, Value, ValueKind};

const ROOT_ELEMENT: &str = "fsapiResponse";

/// A decoded response: its status plus the document for payload extraction
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    document: Element,
}

/// One page of list rows as reported by the device
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListPage {
    pub rows: Vec<ListRow>,
    pub total_count: Option<usize>,
    pub end_of_list: bool,
}

/// Parse a raw response body as received from the transport
///
/// # Errors
/// `DecodeError::NotWellFormed` if the body is not valid UTF-8, plus
/// everything [`decode`] rejects.
pub fn decode_bytes(raw: &[u8]) -> Result<Response, DecodeError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| DecodeError::NotWellFormed(format!("body is not valid UTF-8: {}", e)))?;
    decode(text)
}

/// Parse a response body
///
/// Succeeds for any well-formed status document, whatever the status says.
///
/// # Errors
/// `DecodeError::NotWellFormed` if the body is not XML, has the wrong root
/// element, or lacks a status.
pub fn decode(raw: &str) -> Result<Response, DecodeError> {
    let document = parse_document(raw)?;

    if document.name != ROOT_ELEMENT {
        return Err(DecodeError::NotWellFormed(format!(
            "expected <{}> root element, found <{}>",
            ROOT_ELEMENT, document.name
        )));
    }

    let status = document
        .get_child("status")
        .and_then(|s| s.get_text())
        .map(|code| Status::from_code(&code))
        .ok_or_else(|| DecodeError::NotWellFormed("missing <status> element".to_string()))?;

    Ok(Response { status, document })
}

impl Response {
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn document(&self) -> &Element {
        &self.document
    }

    /// Extract the single typed value of a GET response
    pub fn value(&self) -> Result<Value, DecodeError> {
        let value = self
            .document
            .get_child("value")
            .ok_or_else(|| DecodeError::NotWellFormed("missing <value> element".to_string()))?;
        decode_typed_child(value)
    }

    /// Extract the id handed out by a CREATE_SESSION response
    pub fn session_id(&self) -> Result<String, DecodeError> {
        self.document
            .get_child("sessionId")
            .and_then(|s| s.get_text())
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DecodeError::NotWellFormed("missing <sessionId> element".to_string()))
    }

    /// Extract a page of list rows, numbering them from `start_offset`
    ///
    /// A `FS_LIST_END` status yields an empty page marked as the end.
    pub fn list_page(&self, start_offset: usize) -> Result<ListPage, DecodeError> {
        if self.status == Status::ListEnd {
            return Ok(ListPage {
                rows: Vec::new(),
                total_count: None,
                end_of_list: true,
            });
        }

        let rows = child_elements(&self.document)
            .filter(|child| child.name == "item")
            .enumerate()
            .map(|(position, item)| decode_row(start_offset.saturating_add(position), item))
            .collect::<Result<Vec<_>, _>>()?;

        let total_count = match self.document.get_child("count") {
            Some(count) => Some(parse_count(count)?),
            None => None,
        };

        Ok(ListPage {
            rows,
            total_count,
            end_of_list: self.document.get_child("listend").is_some(),
        })
    }
}

/// Build an element tree keeping every text node verbatim
///
/// Whitespace-only text is content here (`<c8_array>   </c8_array>` is three
/// spaces), so the tree is built from reader events with trimming disabled.
fn parse_document(raw: &str) -> Result<Element, DecodeError> {
    let not_well_formed = |e: &dyn std::fmt::Display| DecodeError::NotWellFormed(e.to_string());

    let mut reader = Reader::from_str(raw);
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| not_well_formed(&e))?;
        match event {
            Event::Start(start) => open.push(start_element(&start)?),
            Event::Empty(start) => {
                let element = start_element(&start)?;
                close_element(&mut open, &mut root, element)?;
            }
            Event::End(_) => {
                let element = open
                    .pop()
                    .ok_or_else(|| DecodeError::NotWellFormed("unbalanced end tag".to_string()))?;
                close_element(&mut open, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| not_well_formed(&e))?;
                push_text(&mut open, text.into_owned())?;
            }
            Event::CData(cdata) => {
                let text = String::from_utf8(cdata.into_inner().into_owned())
                    .map_err(|e| not_well_formed(&e))?;
                push_text(&mut open, text)?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if !open.is_empty() {
        return Err(DecodeError::NotWellFormed("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| DecodeError::NotWellFormed("document has no root element".to_string()))
}

fn start_element(start: &quick_xml::events::BytesStart<'_>) -> Result<Element, DecodeError> {
    let not_well_formed = |e: &dyn std::fmt::Display| DecodeError::NotWellFormed(e.to_string());

    let binding = start.name();
    let name = std::str::from_utf8(binding.as_ref()).map_err(|e| not_well_formed(&e))?;
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| not_well_formed(&e))?;
        let key = std::str::from_utf8(attribute.key.as_ref()).map_err(|e| not_well_formed(&e))?;
        let value = attribute.unescape_value().map_err(|e| not_well_formed(&e))?;
        element.attributes.insert(key.to_string(), value.into_owned());
    }
    Ok(element)
}

fn close_element(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DecodeError> {
    match open.last_mut() {
        Some(parent) => parent.children.push(XMLNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(DecodeError::NotWellFormed(
                "more than one root element".to_string(),
            ))
        }
    }
    Ok(())
}

fn push_text(open: &mut [Element], text: String) -> Result<(), DecodeError> {
    match open.last_mut() {
        Some(parent) => parent.children.push(XMLNode::Text(text)),
        // Only whitespace may surround the root element
        None if text.trim().is_empty() => {}
        None => {
            return Err(DecodeError::NotWellFormed(
                "text outside the root element".to_string(),
            ))
        }
    }
    Ok(())
}

fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| node.as_element())
}

/// Decode the single typed element inside a `<value>` or `<field>` wrapper
fn decode_typed_child(wrapper: &Element) -> Result<Value, DecodeError> {
    let typed = child_elements(wrapper).next().ok_or_else(|| {
        DecodeError::NotWellFormed(format!("<{}> has no typed content", wrapper.name))
    })?;
    let text = typed.get_text().unwrap_or_default();
    decode_value(&typed.name, &text)
}

fn decode_row(index: usize, item: &Element) -> Result<ListRow, DecodeError> {
    let fields = child_elements(item)
        .filter(|child| child.name == "field")
        .map(|field| {
            let name = field.attributes.get("name").cloned().ok_or_else(|| {
                DecodeError::NotWellFormed("list <field> without a name attribute".to_string())
            })?;
            Ok((name, decode_typed_child(field)?))
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    Ok(ListRow {
        index,
        key: item.attributes.get("key").cloned(),
        fields,
    })
}

fn parse_count(count: &Element) -> Result<usize, DecodeError> {
    let text = count.get_text().unwrap_or_default();
    text.trim()
        .parse()
        .map_err(|_| DecodeError::malformed(ValueKind::U32, format!("bad list count '{}'", text)))
}
