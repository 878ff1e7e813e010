//! The authenticated publish session: one WebSocket connection, one
//! STOMP handshake, shared by every source runner in the process.
//!
//! Connection failures never propagate to runners as panics or process
//! errors; they surface through `state()` and through explicit publish
//! rejections. There is no automatic reconnection and no replay of frames
//! queued while disconnected.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::error::{UplinkError, UplinkResult};
use crate::stomp::{Command, Frame};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Bearer credential pair consumed by the engine; immutable for the
/// session's lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub user_id: i64,
}

/// The seam between runners and the wire. Production uses [`UplinkSession`];
/// tests substitute a recording sink.
#[async_trait]
pub trait PublishSink: Send + Sync {
    fn state(&self) -> ConnectionState;

    /// Hands one payload to the transport. Must reject with
    /// [`UplinkError::NotConnected`] instead of silently discarding when the
    /// session is not connected, and must not block the caller on network
    /// I/O.
    async fn publish(&self, destination: &str, payload: Vec<u8>) -> UplinkResult<()>;
}

pub struct UplinkSession {
    endpoint: String,
    credentials: Credentials,
    state: Arc<Mutex<ConnectionState>>,
    outgoing: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl UplinkSession {
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            outgoing: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.credentials.user_id
    }

    /// Opens the WebSocket (token as a query parameter) and completes the
    /// STOMP handshake. Transitions `Disconnected -> Connecting ->
    /// Connected`, or to `Failed` when the backend refuses us. Calling this
    /// on a session that already left `Disconnected` is a no-op.
    pub async fn connect(&self) -> UplinkResult<()> {
        {
            let mut state = self.state.lock().expect("connection state lock");
            if *state != ConnectionState::Disconnected {
                debug!(state = ?*state, "connect ignored");
                return Ok(());
            }
            *state = ConnectionState::Connecting;
        }

        let url = format!("{}?token={}", self.endpoint, self.credentials.token);
        let (ws, _response) = match connect_async(url.as_str()).await {
            Ok(ok) => ok,
            Err(e) => {
                self.set_state(ConnectionState::Failed);
                return Err(UplinkError::Handshake(e.to_string()));
            }
        };
        let (mut write, mut read) = ws.split();

        let connect_frame = Frame::connect(&host_of(&self.endpoint));
        if let Err(e) = write.send(Message::Text(connect_frame.encode())).await {
            self.set_state(ConnectionState::Failed);
            return Err(UplinkError::Handshake(e.to_string()));
        }

        // Wait for CONNECTED or ERROR before anything else goes out.
        let handshake = time::timeout(HANDSHAKE_TIMEOUT, async {
            while let Some(item) = read.next().await {
                let text = match item {
                    Ok(Message::Text(text)) => text,
                    Ok(_) => continue,
                    Err(e) => return Err(UplinkError::Handshake(e.to_string())),
                };
                match Frame::parse(&text) {
                    Some(frame) if frame.command == Command::Connected => return Ok(()),
                    Some(frame) if frame.command == Command::Error => {
                        let reason = frame
                            .header("message")
                            .map(str::to_owned)
                            .unwrap_or_else(|| frame.body.clone());
                        return Err(UplinkError::Handshake(reason));
                    }
                    _ => continue,
                }
            }
            Err(UplinkError::Handshake("connection closed during handshake".into()))
        })
        .await
        .unwrap_or_else(|_| Err(UplinkError::Handshake("handshake timed out".into())));

        if let Err(e) = handshake {
            self.set_state(ConnectionState::Failed);
            return Err(e);
        }

        // Writer drains queued frames onto the socket; a failed write
        // downgrades the whole session.
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let writer_state = Arc::clone(&self.state);
        let writer = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = write.send(message).await {
                    warn!(error = %e, "uplink write failed");
                    *writer_state.lock().expect("connection state lock") =
                        ConnectionState::Failed;
                    break;
                }
            }
        });

        // Reader drains inbound traffic so transport errors and server
        // ERROR frames are noticed between publishes.
        let reader_state = Arc::clone(&self.state);
        let reader = tokio::spawn(async move {
            while let Some(item) = read.next().await {
                match item {
                    Ok(Message::Text(text)) => {
                        if let Some(frame) = Frame::parse(&text) {
                            if frame.command == Command::Error {
                                warn!(
                                    message = frame.header("message").unwrap_or(""),
                                    "backend error frame"
                                );
                                *reader_state.lock().expect("connection state lock") =
                                    ConnectionState::Failed;
                                break;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        warn!("uplink closed by backend");
                        *reader_state.lock().expect("connection state lock") =
                            ConnectionState::Failed;
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "uplink read failed");
                        *reader_state.lock().expect("connection state lock") =
                            ConnectionState::Failed;
                        break;
                    }
                }
            }
        });

        *self.outgoing.lock().expect("outgoing lock") = Some(tx);
        self.tasks.lock().expect("session tasks lock").extend([writer, reader]);
        self.set_state(ConnectionState::Connected);
        info!(user_id = self.credentials.user_id, "uplink connected");
        Ok(())
    }

    /// Tears the connection down. Frames still queued in the writer are
    /// dropped, not persisted.
    pub fn disconnect(&self) {
        for task in self.tasks.lock().expect("session tasks lock").drain(..) {
            task.abort();
        }
        *self.outgoing.lock().expect("outgoing lock") = None;
        self.set_state(ConnectionState::Disconnected);
        info!("uplink disconnected");
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state.lock().expect("connection state lock") = next;
    }
}

#[async_trait]
impl PublishSink for UplinkSession {
    fn state(&self) -> ConnectionState {
        *self.state.lock().expect("connection state lock")
    }

    async fn publish(&self, destination: &str, payload: Vec<u8>) -> UplinkResult<()> {
        if self.state() != ConnectionState::Connected {
            return Err(UplinkError::NotConnected);
        }

        let body = String::from_utf8(payload)
            .map_err(|e| UplinkError::Transport(format!("non-utf8 payload: {e}")))?;
        let frame = Frame::send(destination, body);

        let sender = self
            .outgoing
            .lock()
            .expect("outgoing lock")
            .clone();
        let Some(sender) = sender else {
            return Err(UplinkError::NotConnected);
        };
        sender.send(Message::Text(frame.encode())).map_err(|_| {
            self.set_state(ConnectionState::Failed);
            UplinkError::Transport("uplink writer gone".into())
        })
    }
}

/// `wss://host:port/path` -> `host:port`; good enough for the fixed backend
/// origins this talks to.
fn host_of(endpoint: &str) -> String {
    let rest = endpoint
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(endpoint);
    rest.split('/').next().unwrap_or(rest).to_string()
}
