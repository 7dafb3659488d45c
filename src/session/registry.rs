//! Session registry - the session-id → connection/queue map.
//!
//! The registry is the one piece of shared mutable state in the proxy. It
//! is constructed once at process start with an [`EngineConfig`] and passed
//! by handle (`Arc<SessionRegistry>`) to every outward-facing collaborator;
//! there is no ambient singleton. Map mutations happen under a short-lived
//! lock, and no blocking I/O runs while it is held: connecting happens
//! before insertion, sends go through a per-connection channel.
//!
//! # Example
//!
//! ```ignore
//! use enginewire::{EngineConfig, SessionOptions, SessionRegistry};
//!
//! let registry = SessionRegistry::new(EngineConfig::new("127.0.0.1", 14000));
//!
//! let id = registry.setup(SessionOptions::new()).await?;
//! registry.send_integers(&id, &[42])?;
//! let reply = registry.pop_message_after(&id, Duration::from_millis(200)).await?;
//! registry.close_connection(&id);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;

use crate::codec::{BigIntCodec, IntegerCodec, PublicKeyCodec};
use crate::config::EngineConfig;
use crate::error::{EnginewireError, Result};
use crate::session::connection::{ClosedCallback, Connection, NotifyCallback};
use crate::session::InboundQueue;

/// Options for establishing a session.
///
/// All fields are optional; `SessionOptions::new()` yields a session with a
/// generated id, no auth material and no callbacks (the polling REST-style
/// consumer needs none).
#[derive(Default)]
pub struct SessionOptions {
    session_id: Option<String>,
    auth_material: Option<String>,
    on_message: Option<NotifyCallback>,
    on_closed: Option<ClosedCallback>,
}

impl SessionOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an externally supplied session id instead of a generated one.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    /// Opaque key material: a 64-character hex public key, transcoded and
    /// written as the first outbound message on the new connection.
    pub fn with_auth_material(mut self, hex_key: impl Into<String>) -> Self {
        self.auth_material = Some(hex_key.into());
        self
    }

    /// Register a no-payload notification fired whenever a frame completes.
    pub fn on_message(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_message = Some(Arc::new(callback));
        self
    }

    /// Register a notification fired once if the engine closes the
    /// transport.
    pub fn on_closed(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_closed = Some(Arc::new(callback));
        self
    }
}

/// Per-session state held by the registry.
///
/// A closed session keeps its entry (connection gone, queue empty) so that
/// `pop_message` can distinguish "never set up" from "closed or drained".
struct Session {
    connection: Option<Connection>,
    queue: Arc<InboundQueue>,
}

/// Owner of all session state and the operations on it.
///
/// Concurrency model: distinct session ids proceed independently; one
/// session's inbound bytes are processed sequentially by its single read
/// task. Insert/teardown for the same id are serialized by the map lock,
/// so a racing close cannot resurrect a torn-down session's queue (the old
/// read task is aborted before its queue handle is discarded).
pub struct SessionRegistry {
    config: EngineConfig,
    sessions: Mutex<HashMap<String, Session>>,
    next_session_id: AtomicU64,
}

impl SessionRegistry {
    /// Create a registry targeting the configured engine address.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
            next_session_id: AtomicU64::new(0),
        }
    }

    /// The configuration this registry was constructed with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Establish a session: close-if-exists-then-create.
    ///
    /// Resolves the session id (generating a monotonically increasing one
    /// when absent), tears down any session already registered for it -
    /// connection, reassembler and queued messages - then dials the engine
    /// and registers the fresh reassembler + queue. If auth material was
    /// supplied it is validated before the dial, encoded, and written as
    /// the first outbound message. Resolves with the session id; a failed
    /// connection attempt surfaces as `Err` and is not retried.
    pub async fn setup(&self, opts: SessionOptions) -> Result<String> {
        // Key material is validated and encoded before any I/O.
        let auth_framed = opts
            .auth_material
            .as_deref()
            .map(PublicKeyCodec::encode)
            .transpose()?;

        let session_id = opts.session_id.unwrap_or_else(|| {
            self.next_session_id
                .fetch_add(1, Ordering::Relaxed)
                .to_string()
        });

        // Tear down a stale session before dialing: never a silent merge.
        // Its queue is discarded here too, so a failed reconnect cannot
        // leave old messages poppable under the id.
        let stale = {
            let mut sessions = self.sessions.lock().expect("session map lock poisoned");
            sessions.get_mut(&session_id).map(|session| {
                session.queue.clear();
                (session.connection.take(), session.queue.clone())
            })
        };
        if let Some((old_connection, old_queue)) = stale {
            if let Some(old) = old_connection {
                tracing::debug!("session {}: replacing stale connection", session_id);
                old.close_with_queue(old_queue);
            }
        }

        let queue = Arc::new(InboundQueue::new());
        let connection = Connection::establish(
            &self.config.engine_addr(),
            session_id.clone(),
            queue.clone(),
            opts.on_message,
            opts.on_closed,
        )
        .await?;

        if let Some(framed) = auth_framed {
            if let Err(e) = connection.writer().send(framed).await {
                // The dial succeeded but the first write did not; don't
                // leave the connection's tasks running detached.
                connection.close_with_queue(queue);
                return Err(e);
            }
        }

        let displaced = {
            let mut sessions = self.sessions.lock().expect("session map lock poisoned");
            // A racing setup for the same id may have inserted meanwhile;
            // its connection loses the takeover.
            sessions.insert(
                session_id.clone(),
                Session {
                    connection: Some(connection),
                    queue,
                },
            )
        };
        if let Some(existing) = displaced {
            if let Some(conn) = existing.connection {
                conn.close_with_queue(existing.queue);
            }
        }

        Ok(session_id)
    }

    /// True iff a live connection is registered for this id.
    pub fn check_connection(&self, session_id: &str) -> bool {
        let sessions = self.sessions.lock().expect("session map lock poisoned");
        sessions
            .get(session_id)
            .and_then(|s| s.connection.as_ref())
            .map(Connection::is_alive)
            .unwrap_or(false)
    }

    /// Encode big-integer values and write them to the session's
    /// connection.
    ///
    /// `Ok(false)` when no live connection exists for the id; `Ok(true)`
    /// means the local write was issued, not that the engine received
    /// anything. Codec failures propagate as `Err`.
    pub fn send_big_integers<S: AsRef<str>>(
        &self,
        session_id: &str,
        values: &[S],
    ) -> Result<bool> {
        let framed = BigIntCodec::encode(values)?;
        Ok(self.send_framed(session_id, framed))
    }

    /// Encode 32-bit integers and write them to the session's connection.
    ///
    /// Same result contract as [`send_big_integers`](Self::send_big_integers).
    pub fn send_integers(&self, session_id: &str, values: &[i32]) -> Result<bool> {
        let framed = IntegerCodec::encode(values);
        Ok(self.send_framed(session_id, framed))
    }

    /// Hand a pre-framed buffer to the session's writer task.
    fn send_framed(&self, session_id: &str, framed: Bytes) -> bool {
        let sessions = self.sessions.lock().expect("session map lock poisoned");
        let Some(connection) = sessions
            .get(session_id)
            .and_then(|s| s.connection.as_ref())
            .filter(|c| c.is_alive())
        else {
            return false;
        };

        // Delivery is not acknowledged; a full channel or a writer that
        // died mid-send is invisible to the caller, like any engine-side
        // rejection.
        if let Err(e) = connection.writer().try_send(framed) {
            tracing::warn!("session {}: outbound write dropped: {}", session_id, e);
        }
        true
    }

    /// Tear down the session's connection and discard its reassembler and
    /// queued messages.
    ///
    /// Returns false when there was nothing live to close. The session id
    /// stays known afterwards so `pop_message` reports an empty queue, not
    /// a lookup failure.
    pub fn close_connection(&self, session_id: &str) -> bool {
        let (connection, queue) = {
            let mut sessions = self.sessions.lock().expect("session map lock poisoned");
            let Some(session) = sessions.get_mut(session_id) else {
                return false;
            };
            (session.connection.take(), session.queue.clone())
        };

        match connection {
            Some(conn) => {
                conn.close_with_queue(queue);
                tracing::debug!("session {}: closed", session_id);
                true
            }
            None => false,
        }
    }

    /// Remove and return the oldest queued message for this session.
    ///
    /// # Errors
    ///
    /// A lookup error if no session was ever set up for this id. An empty
    /// queue is the normal `Ok(None)`, never a failure.
    pub fn pop_message(&self, session_id: &str) -> Result<Option<Bytes>> {
        let queue = {
            let sessions = self.sessions.lock().expect("session map lock poisoned");
            sessions
                .get(session_id)
                .map(|s| s.queue.clone())
                .ok_or_else(|| EnginewireError::SessionNotFound(session_id.to_string()))?
        };
        Ok(queue.pop())
    }

    /// Pop with a single deferred re-check.
    ///
    /// Checks the queue, and if it is empty suspends for `wait` and checks
    /// exactly once more - not a long-poll loop. The deferred re-check
    /// no-ops (returns `Ok(None)`) if the session vanished in the interim.
    pub async fn pop_message_after(
        &self,
        session_id: &str,
        wait: Duration,
    ) -> Result<Option<Bytes>> {
        if let Some(message) = self.pop_message(session_id)? {
            return Ok(Some(message));
        }

        tokio::time::sleep(wait).await;

        match self.pop_message(session_id) {
            Ok(message) => Ok(message),
            Err(EnginewireError::SessionNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Number of session ids the registry knows (live or closed).
    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .len()
    }

    /// Number of sessions with a live connection.
    pub fn connected_count(&self) -> usize {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .values()
            .filter(|s| s.connection.as_ref().is_some_and(Connection::is_alive))
            .count()
    }

}
