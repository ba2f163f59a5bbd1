//! In-memory FSAPI device for driving the engine without a network

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use fsapi_api::{encode_value, Transport, TransportError, Value, ValueKind};
use parking_lot::Mutex;

pub const PIN: &str = "1234";

/// A request as the device saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl Request {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// How the device answers DELETE_SESSION when told to fail it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteFailure {
    Status,
    Timeout,
}

#[derive(Default)]
struct DeviceState {
    session: Option<String>,
    sessions_issued: usize,
    values: HashMap<String, Value>,
    lists: HashMap<String, Vec<Vec<(String, Value)>>>,
    invalidate_next: usize,
    report_count: bool,
    count_overrides: VecDeque<usize>,
    omit_listend: bool,
    ignore_offset: bool,
    delete_failure: Option<DeleteFailure>,
    list_requests: usize,
    fail_list_request: Option<usize>,
    expire_list_request: Option<usize>,
    log: Vec<Request>,
}

/// Scriptable device implementing [`Transport`]
///
/// Issues sequential session ids, serves node values and lists, and can be
/// told to expire the session, misreport list sizes or fail a list page.
pub struct FakeDevice {
    state: Mutex<DeviceState>,
}

impl FakeDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(DeviceState::default()),
        })
    }

    pub fn with_value(self: Arc<Self>, node: &str, value: Value) -> Arc<Self> {
        self.state.lock().values.insert(node.to_string(), value);
        self
    }

    /// A list of `len` rows, each with a `name` text field and an `id` u32 field
    pub fn with_list(self: Arc<Self>, node: &str, len: usize) -> Arc<Self> {
        let rows = (0..len)
            .map(|i| {
                vec![
                    ("name".to_string(), Value::Text(format!("Row {}", i))),
                    ("id".to_string(), Value::U32(i as u32)),
                ]
            })
            .collect();
        self.state.lock().lists.insert(node.to_string(), rows);
        self
    }

    pub fn reporting_count(self: Arc<Self>) -> Arc<Self> {
        self.state.lock().report_count = true;
        self
    }

    /// Never mark the end of a list; reads past the end get an empty FS_OK page
    pub fn without_listend(self: Arc<Self>) -> Arc<Self> {
        self.state.lock().omit_listend = true;
        self
    }

    /// Serve every list page from the first row, whatever offset is asked for
    pub fn ignoring_offset(self: Arc<Self>) -> Arc<Self> {
        self.state.lock().ignore_offset = true;
        self
    }

    /// Keep the session and fail every DELETE_SESSION request
    pub fn fail_delete_session(&self, failure: DeleteFailure) {
        self.state.lock().delete_failure = Some(failure);
    }

    /// Answer the next `n` session-bearing requests with FS_SESSION_INVALID
    pub fn invalidate_next(&self, n: usize) {
        self.state.lock().invalidate_next = n;
    }

    /// Report these total counts on successive list pages
    pub fn override_counts(&self, counts: &[usize]) {
        self.state.lock().count_overrides = counts.iter().copied().collect();
    }

    /// Time out the list request with this 0-based ordinal
    pub fn fail_list_request(&self, ordinal: usize) {
        self.state.lock().fail_list_request = Some(ordinal);
    }

    /// Expire the session on the list request with this 0-based ordinal
    pub fn expire_list_request(&self, ordinal: usize) {
        self.state.lock().expire_list_request = Some(ordinal);
    }

    pub fn value(&self, node: &str) -> Option<Value> {
        self.state.lock().values.get(node).cloned()
    }

    pub fn sessions_issued(&self) -> usize {
        self.state.lock().sessions_issued
    }

    pub fn has_session(&self) -> bool {
        self.state.lock().session.is_some()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().log.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn count_path_prefix(&self, prefix: &str) -> usize {
        self.paths().iter().filter(|p| p.starts_with(prefix)).count()
    }

    fn handle(
        state: &mut DeviceState,
        request: &Request,
    ) -> Result<String, TransportError> {
        if request.param("pin") != Some(PIN) {
            return Err(TransportError::HttpError {
                status: 403,
                body: None,
            });
        }

        if request.path == "CREATE_SESSION" {
            state.sessions_issued += 1;
            let id = format!("{}", 1000 + state.sessions_issued);
            state.session = Some(id.clone());
            return Ok(document("FS_OK", &format!("<sessionId>{}</sessionId>", id)));
        }

        if request.param("sid").is_none() || request.param("sid") != state.session.as_deref() {
            return Ok(document("FS_SESSION_INVALID", ""));
        }
        if state.invalidate_next > 0 {
            state.invalidate_next -= 1;
            state.session = None;
            return Ok(document("FS_SESSION_INVALID", ""));
        }

        if request.path == "DELETE_SESSION" {
            match state.delete_failure {
                Some(DeleteFailure::Status) => return Ok(document("FS_FAIL", "")),
                Some(DeleteFailure::Timeout) => {
                    return Err(TransportError::Timeout("read timed out".to_string()))
                }
                None => {}
            }
            state.session = None;
            return Ok(document("FS_OK", ""));
        }

        if let Some(node) = request.path.strip_prefix("GET/") {
            return Ok(match state.values.get(node) {
                Some(value) => document("FS_OK", &format!("<value>{}</value>", typed(value))),
                None => document("FS_NODE_DOES_NOT_EXIST", ""),
            });
        }

        if let Some(node) = request.path.strip_prefix("SET/") {
            let Some(current) = state.values.get(node) else {
                return Ok(document("FS_NODE_DOES_NOT_EXIST", ""));
            };
            let text = request.param("value").unwrap_or_default();
            return Ok(match Value::parse_as(current.kind(), text) {
                Ok(value) => {
                    state.values.insert(node.to_string(), value);
                    document("FS_OK", "")
                }
                Err(_) => document("FS_FAIL", ""),
            });
        }

        if let Some(rest) = request.path.strip_prefix("LIST_GET_NEXT/") {
            let ordinal = state.list_requests;
            state.list_requests += 1;
            if state.fail_list_request == Some(ordinal) {
                return Err(TransportError::Timeout("read timed out".to_string()));
            }
            if state.expire_list_request == Some(ordinal) {
                state.session = None;
                return Ok(document("FS_SESSION_INVALID", ""));
            }

            let (node, after) = rest.rsplit_once('/').unwrap_or((rest, "-1"));
            let after: i64 = after.parse().unwrap_or(-1);
            let max: usize = request
                .param("maxItems")
                .and_then(|m| m.parse().ok())
                .unwrap_or(usize::MAX);
            let Some(rows) = state.lists.get(node) else {
                return Ok(document("FS_NODE_DOES_NOT_EXIST", ""));
            };

            let start = if state.ignore_offset {
                0
            } else {
                usize::try_from(after + 1).unwrap_or(0)
            };
            if start >= rows.len() && !state.omit_listend {
                return Ok(document("FS_LIST_END", ""));
            }

            let end = rows.len().min(start.saturating_add(max));
            let mut body = String::new();
            if let Some(count) = state.count_overrides.pop_front() {
                body.push_str(&format!("<count>{}</count>", count));
            } else if state.report_count {
                body.push_str(&format!("<count>{}</count>", rows.len()));
            }
            for (i, fields) in rows.iter().enumerate().take(end).skip(start) {
                body.push_str(&format!("<item key=\"{}\">", i));
                for (name, value) in fields {
                    body.push_str(&format!("<field name=\"{}\">{}</field>", name, typed(value)));
                }
                body.push_str("</item>");
            }
            if end >= rows.len() && !state.omit_listend {
                body.push_str("<listend/>");
            }
            return Ok(document("FS_OK", &body));
        }

        Ok(document("FS_PACKET_BAD", ""))
    }
}

impl Transport for FakeDevice {
    fn send(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<u8>, TransportError> {
        let request = Request {
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        let mut state = self.state.lock();
        state.log.push(request.clone());
        Self::handle(&mut state, &request).map(String::into_bytes)
    }

    fn base_url(&self) -> &str {
        "http://fake-device/fsapi"
    }
}

fn document(status: &str, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><fsapiResponse><status>{}</status>{}</fsapiResponse>",
        status, body
    )
}

fn typed(value: &Value) -> String {
    let (kind, text) = encode_value(value);
    let text = match kind {
        ValueKind::Text => escape(&text),
        _ => text,
    };
    format!("<{tag}>{text}</{tag}>", tag = kind.tag())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
