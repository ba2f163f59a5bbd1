use std::sync::Arc;

use tracing::{debug, warn};
use transport::{HttpTransport, Transport};

use crate::config::ClientConfig;
use crate::endpoint::{self, DeviceInfo};
use crate::error::{ProtocolError, Result};
use crate::list::{ListQuery, ListResult};
use crate::node::NodeRef;
use crate::operation::{exchange, Exchange, FsapiOperation};
use crate::operations::{DeleteSession, GetValue, ListGetNext, SetValue};
use crate::session::{Session, SessionManager};
use crate::status::Status;
use crate::value::{Value, ValueKind};

/// A client for reading and writing nodes on one FSAPI device
///
/// The client owns the device session: it is created on the first request,
/// re-created once when the device reports it invalid, and released on
/// [`disconnect`](Self::disconnect) or drop. All operations block until the
/// last network round-trip completes.
///
/// The client is `Sync`; concurrent operations share one session.
///
/// # Example
/// ```rust,no_run
/// use fsapi_api::{FsapiClient, Value};
///
/// let client = FsapiClient::new("http://192.168.1.20/fsapi", "1234");
/// let volume = client.get_value("netRemote.sys.audio.volume")?;
/// client.set_value("netRemote.sys.audio.volume", Value::U8(8))?;
/// let modes = client.get_list("netRemote.sys.caps.validModes", 0, 20)?;
/// # Ok::<(), fsapi_api::ProtocolError>(())
/// ```
pub struct FsapiClient {
    transport: Arc<dyn Transport>,
    session: SessionManager,
    config: ClientConfig,
    device: Option<DeviceInfo>,
}

/// Outcome of a single attempt under the current session
enum Attempt<T> {
    Done(T),
    SessionInvalid,
}

impl FsapiClient {
    /// Create a client for a known API root with default configuration
    pub fn new(base_url: impl Into<String>, pin: impl Into<String>) -> Self {
        Self::with_config(base_url, pin, ClientConfig::default())
    }

    /// Create a client for a known API root
    pub fn with_config(
        base_url: impl Into<String>,
        pin: impl Into<String>,
        config: ClientConfig,
    ) -> Self {
        let transport = HttpTransport::with_timeouts(
            base_url,
            config.connect_timeout,
            config.read_timeout,
        );
        Self::with_transport(Arc::new(transport), pin, config)
    }

    /// Create a client by first resolving the API root from a device URL
    ///
    /// # Errors
    /// Transport errors fetching the description, or `Decode` errors if it
    /// does not name an API root.
    pub fn connect(
        device_url: &str,
        pin: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let description = HttpTransport::with_timeouts(
            device_url,
            config.connect_timeout,
            config.read_timeout,
        );
        let info = endpoint::resolve(&description, device_url)?;
        debug!(api_root = %info.webfsapi, "resolved FSAPI endpoint");

        let mut client = Self::with_config(info.webfsapi.clone(), pin, config);
        client.device = Some(info);
        Ok(client)
    }

    /// Create a client over any transport (used for testing and custom stacks)
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        pin: impl Into<String>,
        config: ClientConfig,
    ) -> Self {
        Self {
            session: SessionManager::new(Arc::clone(&transport), pin),
            transport,
            config,
            device: None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The device description, when the client was built with [`connect`](Self::connect)
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Make sure a session exists, creating one if needed
    pub fn ensure_session(&self) -> Result<Session> {
        Ok(self.session.ensure_session()?)
    }

    /// Read the value of a node
    ///
    /// # Errors
    /// - `SessionExpired` if the session is reported invalid twice in a row
    /// - `DeviceRejected` for any other non-OK status
    /// - `Transport` / `Decode` / `Session` failures from the layers below
    pub fn get_value(&self, node: impl Into<NodeRef>) -> Result<Value> {
        self.execute(&GetValue::new(node))
    }

    /// Read the value of a node, requiring it to have the given type
    ///
    /// A differently tagged value fails with `DecodeError::TypeMismatch`.
    pub fn get_value_as(&self, node: impl Into<NodeRef>, kind: ValueKind) -> Result<Value> {
        self.execute(&GetValue::expecting(node, kind))
    }

    /// Write the value of a node
    pub fn set_value(&self, node: impl Into<NodeRef>, value: impl Into<Value>) -> Result<()> {
        self.execute(&SetValue::new(node, value))
    }

    /// Read a list from `start_offset` to its end in pages of `max_rows`
    pub fn get_list(
        &self,
        node: impl Into<NodeRef>,
        start_offset: usize,
        max_rows: usize,
    ) -> Result<ListResult> {
        self.get_list_with(node, ListQuery::new(start_offset, max_rows))
    }

    /// Read a list page by page
    ///
    /// Pages are requested until the device signals the end of the list, a
    /// page comes back empty, the offset reaches the reported total count,
    /// or `query.limit` rows have been collected. A
    /// session expiry mid-list re-establishes the session and repeats only
    /// the failed page.
    ///
    /// # Errors
    /// - `InvalidArgument` if `page_size` is zero
    /// - `Inconsistent` if pages report different total counts; no rows are
    ///   returned in that case
    /// - `Interrupted` if a page fails after earlier pages succeeded; the
    ///   error carries the rows retrieved so far
    /// - otherwise the failure of the first page, unwrapped
    pub fn get_list_with(&self, node: impl Into<NodeRef>, query: ListQuery) -> Result<ListResult> {
        if query.page_size == 0 {
            return Err(ProtocolError::InvalidArgument(
                "list page size must be at least 1".to_string(),
            ));
        }

        let node = node.into();
        let mut result = ListResult::default();
        if query.limit == Some(0) {
            return Ok(result);
        }

        let mut offset = query.start_offset;
        loop {
            let wanted = match query.limit {
                Some(limit) => query.page_size.min(limit - result.rows.len()),
                None => query.page_size,
            };

            let op = ListGetNext::new(node.clone(), offset, wanted);
            let page = match self.execute(&op) {
                Ok(page) => page,
                Err(source) if result.rows.is_empty() => return Err(source),
                Err(source) => {
                    result.end_of_list = false;
                    return Err(ProtocolError::Interrupted {
                        partial: result,
                        source: Box::new(source),
                    });
                }
            };

            if let Some(found) = page.total_count {
                match result.total_count {
                    Some(expected) if expected != found => {
                        warn!(node = %node, expected, found, "list size changed during retrieval");
                        return Err(ProtocolError::Inconsistent { expected, found });
                    }
                    _ => result.total_count = Some(found),
                }
            }

            let returned = page.rows.len();
            debug!(node = %node, offset, returned, end = page.end_of_list, "list page");
            result.rows.extend(page.rows);
            offset = offset.saturating_add(returned);

            // An empty page ends the list even if the device did not say so
            if returned == 0 {
                result.end_of_list = true;
                break;
            }

            if let Some(limit) = query.limit {
                if result.rows.len() > limit {
                    result.rows.truncate(limit);
                    result.end_of_list = false;
                    break;
                }
                if result.rows.len() == limit {
                    result.end_of_list = page.end_of_list;
                    break;
                }
            }

            if page.end_of_list {
                result.end_of_list = true;
                break;
            }

            // Past the reported size; a device that ignores the offset would
            // otherwise repeat rows forever
            if let Some(total) = result.total_count {
                if offset >= total {
                    result.rows.truncate(total.saturating_sub(query.start_offset));
                    result.end_of_list = true;
                    break;
                }
            }
        }

        Ok(result)
    }

    /// Release the session on the device
    ///
    /// The local session is forgotten even if the device request fails.
    /// Does nothing when no session is active.
    pub fn disconnect(&self) -> Result<()> {
        let Some(session) = self.session.clear() else {
            return Ok(());
        };

        match exchange(self.transport.as_ref(), session.pin(), Some(session.id()), &DeleteSession)? {
            Exchange::Completed(()) => Ok(()),
            // Nothing left to release on the device
            Exchange::Refused(Status::SessionInvalid) => Ok(()),
            Exchange::Refused(status) => Err(ProtocolError::DeviceRejected(status)),
        }
    }

    /// Execute an operation under the session, re-establishing it once if
    /// the device reports it invalid
    fn execute<Op: FsapiOperation>(&self, op: &Op) -> Result<Op::Output> {
        let mut recreated = false;

        loop {
            let session = self.session.ensure_session()?;

            match self.attempt(op, &session)? {
                Attempt::Done(output) => return Ok(output),
                Attempt::SessionInvalid => {
                    self.session.invalidate(session.id());
                    if recreated {
                        warn!(path = %op.path(), "session invalid again after re-creation");
                        return Err(ProtocolError::SessionExpired);
                    }
                    warn!(path = %op.path(), "session reported invalid, re-establishing");
                    recreated = true;
                }
            }
        }
    }

    fn attempt<Op: FsapiOperation>(&self, op: &Op, session: &Session) -> Result<Attempt<Op::Output>> {
        match exchange(self.transport.as_ref(), session.pin(), Some(session.id()), op)? {
            Exchange::Completed(output) => Ok(Attempt::Done(output)),
            Exchange::Refused(Status::SessionInvalid) => Ok(Attempt::SessionInvalid),
            Exchange::Refused(status) => Err(ProtocolError::DeviceRejected(status)),
        }
    }
}

impl std::fmt::Debug for FsapiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsapiClient")
            .field("base_url", &self.base_url())
            .field("session", &self.session)
            .field("config", &self.config)
            .finish()
    }
}

impl Drop for FsapiClient {
    fn drop(&mut self) {
        if self.session.is_active() {
            if let Err(e) = self.disconnect() {
                warn!(base_url = %self.base_url(), error = %e, "failed to release session on drop");
            }
        }
    }
}
