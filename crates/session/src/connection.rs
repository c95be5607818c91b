//! Session connection manager.
//!
//! Owns the WebSocket transport to the terminal server: the upgrade with
//! double authentication, the read loop, and the dispatch of inbound output
//! payloads to one primary handler plus any number of temporary listeners.
//!
//! Immediately after the handshake most remote programs dump a burst of
//! banner/MOTD/tool-loading text with no "ready" marker, so `connect()`
//! finishes with an initialization drain: it discards payloads until a
//! configurable silence window passes with no traffic. The drain has no
//! upper bound on total time - a slow startup that is still actively
//! printing keeps the drain open rather than leaking banner text into the
//! first command's output.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use protocol::{encode_input, encode_resize, ClientHello, Opcode, ProtocolError, TTY_SUBPROTOCOL};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::connect_async;
use url::Url;

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};

/// Capacity of the writer and dispatch channels.
const CHANNEL_CAPACITY: usize = 256;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not yet asked to connect.
    Idle,
    /// Transport and handshake in progress.
    Connecting,
    /// Connected, draining startup banner traffic.
    Initializing,
    /// Connected and routing to the primary handler.
    Connected,
    /// A transport or handshake error ended the connection.
    Failed,
    /// Explicit close in progress.
    Disconnecting,
    /// Explicitly closed.
    Disconnected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Initializing => "initializing",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
            ConnectionState::Disconnecting => "disconnecting",
            ConnectionState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// Opaque handle for a registered temporary listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Routing table for inbound output payloads.
#[derive(Default)]
struct Dispatch {
    /// The one primary handler; receives every payload once armed.
    primary: Option<mpsc::Sender<String>>,
    /// Temporary listeners; each receives a read-only copy concurrently.
    listeners: HashMap<ListenerId, mpsc::Sender<String>>,
}

/// Manages one WebSocket connection to the terminal server.
pub struct ConnectionManager {
    config: SessionConfig,
    state: Arc<RwLock<ConnectionState>>,
    dispatch: Arc<RwLock<Dispatch>>,
    writer: Arc<RwLock<Option<mpsc::Sender<WsMessage>>>>,
    error_tx: mpsc::Sender<SessionError>,
    error_rx: Arc<RwLock<Option<mpsc::Receiver<SessionError>>>>,
    next_listener_id: AtomicU64,
}

impl ConnectionManager {
    /// Create a manager for the given endpoint. Does not connect.
    pub fn new(config: SessionConfig) -> Self {
        let (error_tx, error_rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Idle)),
            dispatch: Arc::new(RwLock::new(Dispatch::default())),
            writer: Arc::new(RwLock::new(None)),
            error_tx,
            error_rx: Arc::new(RwLock::new(Some(error_rx))),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Whether the connection is up and past initialization.
    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Returns the receiver for transport errors.
    /// Returns None if the receiver has already been taken.
    pub async fn errors(&self) -> Option<mpsc::Receiver<SessionError>> {
        self.error_rx.write().await.take()
    }

    /// Updates the connection state, logging the transition.
    async fn set_state(&self, new_state: ConnectionState) {
        let mut state = self.state.write().await;
        if *state != new_state {
            tracing::debug!(from = %*state, to = %new_state, "connection state change");
            *state = new_state;
        }
    }

    /// Arm the primary payload handler.
    pub async fn set_primary(&self, handler: mpsc::Sender<String>) {
        self.dispatch.write().await.primary = Some(handler);
    }

    /// Disarm the primary payload handler.
    pub async fn clear_primary(&self) {
        self.dispatch.write().await.primary = None;
    }

    /// Register a temporary listener; it receives a copy of every payload
    /// until removed.
    pub async fn add_temp_listener(&self, listener: mpsc::Sender<String>) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.dispatch.write().await.listeners.insert(id, listener);
        id
    }

    /// Remove a temporary listener. Removing an unknown id is a no-op.
    pub async fn remove_temp_listener(&self, id: ListenerId) {
        self.dispatch.write().await.listeners.remove(&id);
    }

    /// Open the transport, perform the double authentication handshake,
    /// start the read loop, and drain startup banner traffic.
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected().await {
            tracing::warn!("already connected");
            return Ok(());
        }

        self.set_state(ConnectionState::Connecting).await;

        match self.connect_internal().await {
            Ok(()) => {
                self.set_state(ConnectionState::Initializing).await;
                self.drain_banner().await;
                self.set_state(ConnectionState::Connected).await;
                Ok(())
            }
            Err(err) => {
                self.set_state(ConnectionState::Failed).await;
                Err(err)
            }
        }
    }

    async fn connect_internal(&self) -> Result<()> {
        let endpoint = self.config.endpoint_url();
        Url::parse(&endpoint)
            .map_err(|e| SessionError::Connection(format!("invalid endpoint {}: {}", endpoint, e)))?;

        tracing::info!(endpoint = %endpoint, "connecting to terminal server");

        // First half of the double authentication: the Basic header at
        // upgrade time, plus the tty subprotocol the server requires.
        let credentials = self.config.credentials();
        let mut request = endpoint.as_str().into_client_request()?;
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&credentials.authorization_header())
                .map_err(|e| SessionError::Auth(e.to_string()))?,
        );
        request
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(TTY_SUBPROTOCOL));

        let (ws_stream, response) = connect_async(request).await?;
        tracing::debug!(status = %response.status(), "websocket upgrade accepted");

        let (mut ws_sink, mut ws_source) = ws_stream.split();

        // Writer task: serializes all outgoing frames through one channel.
        let (writer_tx, mut writer_rx) = mpsc::channel::<WsMessage>(CHANNEL_CAPACITY);
        tokio::spawn(async move {
            while let Some(msg) = writer_rx.recv().await {
                if let Err(e) = ws_sink.send(msg).await {
                    tracing::error!(error = %e, "failed to send frame");
                    break;
                }
            }
            let _ = ws_sink.close().await;
        });
        *self.writer.write().await = Some(writer_tx);

        // Read loop: decodes frames and routes output payloads.
        let dispatch = self.dispatch.clone();
        let state = self.state.clone();
        let error_tx = self.error_tx.clone();
        tokio::spawn(async move {
            loop {
                let Some(result) = ws_source.next().await else {
                    break;
                };
                match result {
                    Ok(WsMessage::Binary(data)) => Self::route_frame(&dispatch, &data).await,
                    Ok(WsMessage::Text(text)) => {
                        Self::route_frame(&dispatch, text.as_bytes()).await
                    }
                    Ok(WsMessage::Close(_)) => {
                        tracing::info!("server closed connection");
                        break;
                    }
                    Ok(_) => {} // ping/pong handled by the library
                    Err(e) => {
                        let err = SessionError::from(e);
                        tracing::error!(error = %err, "websocket receive error");
                        let _ = error_tx.send(err).await;
                        break;
                    }
                }
            }

            let mut state = state.write().await;
            if matches!(
                *state,
                ConnectionState::Disconnecting | ConnectionState::Disconnected
            ) {
                *state = ConnectionState::Disconnected;
            } else {
                *state = ConnectionState::Failed;
                drop(state);
                let _ = error_tx
                    .send(SessionError::Disconnected(
                        "connection lost".to_string(),
                    ))
                    .await;
            }
        });

        // Second half of the double authentication: the token and terminal
        // geometry as the first frame after the upgrade.
        let hello = ClientHello::new(&credentials, self.config.rows, self.config.columns);
        let hello_json = serde_json::to_string(&hello).map_err(ProtocolError::from)?;
        self.send_raw(WsMessage::Text(hello_json)).await?;
        self.resize(self.config.rows, self.config.columns).await?;

        Ok(())
    }

    /// Decode one inbound frame and route its payload.
    async fn route_frame(dispatch: &Arc<RwLock<Dispatch>>, data: &[u8]) {
        let frame = protocol::decode(data);
        match frame.opcode {
            Opcode::Output => {
                let payload = frame.payload_text_lossy();
                // clone the senders out so no lock is held across the sends
                let (primary, listeners) = {
                    let dispatch = dispatch.read().await;
                    (
                        dispatch.primary.clone(),
                        dispatch.listeners.values().cloned().collect::<Vec<_>>(),
                    )
                };
                if let Some(primary) = primary {
                    if primary.send(payload.clone()).await.is_err() {
                        tracing::debug!("primary handler dropped its receiver");
                    }
                }
                for listener in listeners {
                    let _ = listener.send(payload.clone()).await;
                }
            }
            Opcode::SetWindowTitle => {
                tracing::debug!(title = %frame.payload_text_lossy(), "window title update");
            }
            Opcode::SetPreferences => {
                tracing::debug!("preferences frame received");
            }
            Opcode::Unknown => {
                tracing::debug!(len = frame.payload.len(), "dropping unknown frame");
            }
        }
    }

    /// Discard the post-connect banner burst.
    ///
    /// Resettable silence window: every payload restarts it; it closes only
    /// after a full window with zero traffic. No upper bound on total time.
    async fn drain_banner(&self) {
        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
        let id = self.add_temp_listener(tx).await;
        let window = self.config.drain_silence();

        let mut discarded = 0usize;
        loop {
            match tokio::time::timeout(window, rx.recv()).await {
                Ok(Some(_)) => discarded += 1,
                Ok(None) | Err(_) => break,
            }
        }

        self.remove_temp_listener(id).await;
        tracing::debug!(discarded, "initialization drain complete");
    }

    async fn send_raw(&self, msg: WsMessage) -> Result<()> {
        let writer = self.writer.read().await.clone();
        match writer {
            Some(writer) => writer
                .send(msg)
                .await
                .map_err(|_| SessionError::Disconnected("writer task gone".to_string())),
            None => Err(SessionError::Disconnected("not connected".to_string())),
        }
    }

    /// Send raw terminal input.
    pub async fn send_input(&self, text: &str) -> Result<()> {
        self.send_raw(WsMessage::Binary(encode_input(text))).await
    }

    /// Send a command, ensuring the trailing newline the terminal needs.
    pub async fn send_command(&self, command: &str) -> Result<()> {
        if command.ends_with('\n') {
            self.send_input(command).await
        } else {
            let mut line = command.to_string();
            line.push('\n');
            self.send_input(&line).await
        }
    }

    /// Request a terminal resize.
    pub async fn resize(&self, rows: u16, columns: u16) -> Result<()> {
        let frame = encode_resize(rows, columns).map_err(SessionError::from)?;
        self.send_raw(WsMessage::Binary(frame)).await
    }

    /// Close the connection. State is not resumed; reconnecting is a fresh
    /// `connect()`.
    pub async fn disconnect(&self) {
        tracing::info!("disconnecting");
        self.set_state(ConnectionState::Disconnecting).await;

        let writer = self.writer.write().await.take();
        if let Some(writer) = writer {
            let _ = writer.send(WsMessage::Close(None)).await;
        }

        {
            let mut dispatch = self.dispatch.write().await;
            dispatch.primary = None;
            dispatch.listeners.clear();
        }

        self.set_state(ConnectionState::Disconnected).await;
    }
}
