//! Session management with lazy creation and reactive invalidation
//!
//! The device hands out an opaque session id in exchange for the PIN. The
//! id is required on every later request and silently expires on the device
//! side; expiry is only discovered when a request comes back with
//! `FS_SESSION_INVALID`.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use transport::{Transport, TransportError};

use crate::error::{CreationFailure, SessionError};
use crate::operation::{exchange, Exchange, ExchangeError};
use crate::operations::CreateSession;

/// An active session on the device
///
/// The id is only valid together with the PIN it was issued for, so both
/// travel together on every request made under the session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    pin: String,
    base_url: String,
    created_at: SystemTime,
}

impl Session {
    /// The opaque id issued by the device
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The PIN the session was created with
    pub fn pin(&self) -> &str {
        &self.pin
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// How long ago the session was created
    pub fn age(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.created_at)
            .unwrap_or(Duration::ZERO)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("pin", &"****")
            .field("base_url", &self.base_url)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[derive(Debug)]
enum SessionState {
    NoSession,
    Active(Session),
}

/// Owns the session id for one device
///
/// State machine: `NoSession -> Active(id)` on the first request (or an
/// explicit [`ensure_session`](Self::ensure_session)), `Active -> NoSession`
/// when the device reports the id invalid or the client disconnects.
///
/// Creation is serialized: concurrent callers that find no session wait for
/// a single CREATE_SESSION request rather than each issuing their own. Once
/// active, the id is shared by any number of concurrent requests.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    pin: RwLock<String>,
    state: RwLock<SessionState>,
    creation: Mutex<()>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>, pin: impl Into<String>) -> Self {
        Self {
            transport,
            pin: RwLock::new(pin.into()),
            state: RwLock::new(SessionState::NoSession),
            creation: Mutex::new(()),
        }
    }

    pub fn pin(&self) -> String {
        self.pin.read().clone()
    }

    /// Replace the PIN, dropping any session created with the old one
    pub fn set_pin(&self, pin: impl Into<String>) {
        let _creation = self.creation.lock();
        *self.pin.write() = pin.into();
        *self.state.write() = SessionState::NoSession;
    }

    /// The base URL of the device this manager creates sessions on
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// The current session, if one is active
    pub fn current(&self) -> Option<Session> {
        match &*self.state.read() {
            SessionState::Active(session) => Some(session.clone()),
            SessionState::NoSession => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(&*self.state.read(), SessionState::Active(_))
    }

    /// Return the active session, creating one if there is none
    ///
    /// # Errors
    /// `SessionError::CreationFailed` if the device rejects the PIN or the
    /// creation request fails at the transport or decoding layer.
    pub fn ensure_session(&self) -> Result<Session, SessionError> {
        if let Some(session) = self.current() {
            return Ok(session);
        }

        let _creation = self.creation.lock();

        // Another caller may have created it while we waited
        if let Some(session) = self.current() {
            return Ok(session);
        }

        let session = self.create()?;
        *self.state.write() = SessionState::Active(session.clone());
        Ok(session)
    }

    /// Drop the session if it is still the one identified by `stale_id`
    ///
    /// Returns whether a session was dropped. A session that a concurrent
    /// caller already replaced is left alone.
    pub fn invalidate(&self, stale_id: &str) -> bool {
        let mut state = self.state.write();
        match &*state {
            SessionState::Active(session) if session.id == stale_id => {
                debug!(base_url = %self.transport.base_url(), "session invalidated");
                *state = SessionState::NoSession;
                true
            }
            _ => false,
        }
    }

    /// Forget the current session unconditionally, returning it
    pub fn clear(&self) -> Option<Session> {
        let mut state = self.state.write();
        match std::mem::replace(&mut *state, SessionState::NoSession) {
            SessionState::Active(session) => Some(session),
            SessionState::NoSession => None,
        }
    }

    fn create(&self) -> Result<Session, SessionError> {
        let pin = self.pin();
        let failure = match exchange(self.transport.as_ref(), &pin, None, &CreateSession) {
            Ok(Exchange::Completed(id)) => {
                info!(base_url = %self.transport.base_url(), "created FSAPI session");
                return Ok(Session {
                    id,
                    pin,
                    base_url: self.transport.base_url().to_string(),
                    created_at: SystemTime::now(),
                });
            }
            Ok(Exchange::Refused(status)) => CreationFailure::Status(status),
            Err(ExchangeError::Transport(TransportError::HttpError { status, .. }))
                if status == 401 || status == 403 =>
            {
                CreationFailure::PinRejected
            }
            Err(ExchangeError::Transport(e)) => CreationFailure::Transport(e),
            Err(ExchangeError::Decode(e)) => CreationFailure::Decode(e),
        };
        Err(SessionError::CreationFailed(failure))
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("base_url", &self.transport.base_url())
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport answering CREATE_SESSION from a queue of scripted replies
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, TransportError>>>,
        calls: AtomicUsize,
        pins: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<&str, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
                calls: AtomicUsize::new(0),
                pins: Mutex::new(Vec::new()),
            })
        }
    }

    impl Transport for Scripted {
        fn send(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<u8>, TransportError> {
            assert_eq!(path, "CREATE_SESSION");
            assert!(params.iter().all(|(name, _)| *name != "sid"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some((_, pin)) = params.iter().find(|(name, _)| *name == "pin") {
                self.pins.lock().push(pin.clone());
            }
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Unreachable("script exhausted".into())))
                .map(String::into_bytes)
        }

        fn base_url(&self) -> &str {
            "http://radio/fsapi"
        }
    }

    fn session_reply(id: &str) -> String {
        format!(
            "<fsapiResponse><status>FS_OK</status><sessionId>{}</sessionId></fsapiResponse>",
            id
        )
    }

    #[test]
    fn test_lazy_creation_and_reuse() {
        let reply = session_reply("111");
        let transport = Scripted::new(vec![Ok(reply.as_str())]);
        let manager = SessionManager::new(transport.clone(), "1234");

        assert!(!manager.is_active());
        let first = manager.ensure_session().unwrap();
        let second = manager.ensure_session().unwrap();

        assert_eq!(first.id(), "111");
        assert_eq!(first, second);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalidate_only_matching_session() {
        let reply = session_reply("111");
        let transport = Scripted::new(vec![Ok(reply.as_str())]);
        let manager = SessionManager::new(transport, "1234");
        manager.ensure_session().unwrap();

        assert!(!manager.invalidate("999"));
        assert!(manager.is_active());
        assert!(manager.invalidate("111"));
        assert!(!manager.is_active());
        assert!(manager.current().is_none());
    }

    #[test]
    fn test_pin_rejected() {
        let transport = Scripted::new(vec![Err(TransportError::HttpError {
            status: 403,
            body: None,
        })]);
        let manager = SessionManager::new(transport, "0000");

        let err = manager.ensure_session().unwrap_err();
        assert!(err.is_pin_rejected());
        assert!(!manager.is_active());
    }

    #[test]
    fn test_non_ok_status_fails_creation() {
        let transport = Scripted::new(vec![Ok(
            "<fsapiResponse><status>FS_FAIL</status></fsapiResponse>",
        )]);
        let manager = SessionManager::new(transport, "1234");

        assert_eq!(
            manager.ensure_session(),
            Err(SessionError::CreationFailed(CreationFailure::Status(Status::Fail)))
        );
    }

    #[test]
    fn test_transport_failure_fails_creation() {
        let transport = Scripted::new(vec![Err(TransportError::Timeout("read".into()))]);
        let manager = SessionManager::new(transport, "1234");

        assert!(matches!(
            manager.ensure_session(),
            Err(SessionError::CreationFailed(CreationFailure::Transport(
                TransportError::Timeout(_)
            )))
        ));
    }

    #[test]
    fn test_garbage_body_fails_creation() {
        let transport = Scripted::new(vec![Ok("<html/>")]);
        let manager = SessionManager::new(transport, "1234");

        assert!(matches!(
            manager.ensure_session(),
            Err(SessionError::CreationFailed(CreationFailure::Decode(_)))
        ));
    }

    #[test]
    fn test_set_pin_drops_session() {
        let first = session_reply("1");
        let second = session_reply("2");
        let transport = Scripted::new(vec![Ok(first.as_str()), Ok(second.as_str())]);
        let manager = SessionManager::new(transport, "1234");

        assert_eq!(manager.ensure_session().unwrap().id(), "1");
        manager.set_pin("5678");
        assert!(!manager.is_active());
        assert_eq!(manager.pin(), "5678");
        assert_eq!(manager.ensure_session().unwrap().id(), "2");
    }

    #[test]
    fn test_session_keeps_the_pin_it_was_created_with() {
        let first = session_reply("1");
        let second = session_reply("2");
        let transport = Scripted::new(vec![Ok(first.as_str()), Ok(second.as_str())]);
        let manager = SessionManager::new(transport.clone(), "1234");

        let old = manager.ensure_session().unwrap();
        manager.set_pin("5678");
        let new = manager.ensure_session().unwrap();

        assert_eq!((old.id(), old.pin()), ("1", "1234"));
        assert_eq!((new.id(), new.pin()), ("2", "5678"));
        assert_eq!(new.base_url(), "http://radio/fsapi");
        assert_eq!(*transport.pins.lock(), vec!["1234".to_string(), "5678".to_string()]);
    }

    #[test]
    fn test_debug_hides_pin() {
        let reply = session_reply("9");
        let transport = Scripted::new(vec![Ok(reply.as_str())]);
        let manager = SessionManager::new(transport, "8642");

        let debug = format!("{:?}", manager.ensure_session().unwrap());
        assert!(debug.contains("\"9\""));
        assert!(!debug.contains("8642"));
    }

    #[test]
    fn test_concurrent_callers_share_one_creation() {
        let reply = session_reply("777");
        let transport = Scripted::new(vec![Ok(reply.as_str())]);
        let manager = Arc::new(SessionManager::new(transport.clone(), "1234"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || manager.ensure_session().map(|s| s.id().to_string()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "777");
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_returns_session() {
        let reply = session_reply("5");
        let transport = Scripted::new(vec![Ok(reply.as_str())]);
        let manager = SessionManager::new(transport, "1234");
        manager.ensure_session().unwrap();

        let cleared = manager.clear().unwrap();
        assert_eq!(cleared.id(), "5");
        assert!(cleared.age() < Duration::from_secs(60));
        assert!(manager.clear().is_none());
    }
}
