//! Session facade and lifecycle state machine.
//!
//! [`TerminalSession`] ties the connection, classifier, and executor
//! together behind a small API: initialize, execute, resize, shutdown.
//!
//! One state machine is authoritative for the whole session. Everything
//! else (the connection's own state, the executor's in-flight record)
//! reports into it; nothing reads lifecycle state from anywhere else.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, RwLock};

use crate::classifier::{Classifier, StreamChunk};
use crate::config::SessionConfig;
use crate::connection::ConnectionManager;
use crate::error::{Result, SessionError};
use crate::executor::CommandExecutor;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connecting and draining the startup banner.
    Initializing,
    /// Ready for a command.
    Idle,
    /// A command is in flight.
    Busy,
    /// Initialization failed; a retry may recover.
    Error,
    /// The connection is gone; only re-initialization recovers.
    Unavailable,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Initializing => "initializing",
            SessionState::Idle => "idle",
            SessionState::Busy => "busy",
            SessionState::Error => "error",
            SessionState::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

/// The session's authoritative state machine.
///
/// Transitions outside the allowed table are rejected, not silently
/// applied; a rejected transition is a bug in the caller.
pub struct StateMachine {
    state: RwLock<SessionState>,
}

impl StateMachine {
    pub fn new(initial: SessionState) -> Self {
        Self {
            state: RwLock::new(initial),
        }
    }

    pub async fn current(&self) -> SessionState {
        *self.state.read().await
    }

    fn allowed(from: SessionState, to: SessionState) -> bool {
        use SessionState::*;
        if from == to {
            return true;
        }
        matches!(
            (from, to),
            (Initializing, Idle)
                | (Initializing, Error)
                | (Initializing, Unavailable)
                | (Idle, Busy)
                | (Idle, Error)
                | (Idle, Unavailable)
                | (Busy, Idle)
                | (Busy, Error)
                | (Busy, Unavailable)
                | (Error, Initializing)
                | (Error, Unavailable)
                | (Unavailable, Initializing)
        )
    }

    /// Apply a transition, rejecting anything outside the table.
    pub async fn transition(&self, to: SessionState) -> Result<()> {
        let mut state = self.state.write().await;
        let from = *state;
        if !Self::allowed(from, to) {
            tracing::warn!(from = %from, to = %to, "rejected state transition");
            return Err(SessionError::NotIdle(format!(
                "cannot go from {} to {}",
                from, to
            )));
        }
        if from != to {
            tracing::debug!(from = %from, to = %to, "session state change");
            *state = to;
        }
        Ok(())
    }

    /// Claim the session for one command. Fails unless idle.
    pub async fn begin_command(&self) -> Result<()> {
        let mut state = self.state.write().await;
        match *state {
            SessionState::Idle => {
                tracing::debug!(from = %*state, to = %SessionState::Busy, "session state change");
                *state = SessionState::Busy;
                Ok(())
            }
            other => Err(SessionError::NotIdle(other.to_string())),
        }
    }

    /// Release the session after a command. A no-op unless busy, because a
    /// transport failure may already have moved the state elsewhere.
    pub async fn finish_command(&self) {
        let mut state = self.state.write().await;
        if *state == SessionState::Busy {
            tracing::debug!(from = %*state, to = %SessionState::Idle, "session state change");
            *state = SessionState::Idle;
        }
    }
}

/// One interactive terminal session.
pub struct TerminalSession {
    config: SessionConfig,
    connection: Arc<ConnectionManager>,
    classifier: Arc<Mutex<Classifier>>,
    state: Arc<StateMachine>,
}

impl TerminalSession {
    /// Build a session from its configuration. Does not connect.
    pub fn new(config: SessionConfig) -> Self {
        let connection = Arc::new(ConnectionManager::new(config.clone()));
        let classifier = Arc::new(Mutex::new(Classifier::new(config.terminal_type)));
        Self {
            config,
            connection,
            classifier,
            state: Arc::new(StateMachine::new(SessionState::Initializing)),
        }
    }

    /// Connect, authenticate, and drain the startup banner.
    ///
    /// Returns whether the session is ready. On failure the session is in
    /// the error state and `initialize()` may be called again.
    pub async fn initialize(&self) -> bool {
        if let Err(err) = self.state.transition(SessionState::Initializing).await {
            tracing::warn!(error = %err, "cannot re-initialize from current state");
            return false;
        }

        match self.connection.connect().await {
            Ok(()) => {
                let _ = self.state.transition(SessionState::Idle).await;
                self.watch_connection_errors().await;
                tracing::info!(
                    terminal_type = %self.config.terminal_type,
                    "session initialized"
                );
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "session initialization failed");
                let _ = self.state.transition(SessionState::Error).await;
                false
            }
        }
    }

    /// Park a task on the connection's error channel; any transport error
    /// makes the session unavailable.
    ///
    /// The watcher lives as long as the error channel: it must survive
    /// re-initialization, because the receiver can only be taken once and a
    /// session that recovered from one transport failure still has to
    /// notice the next one.
    async fn watch_connection_errors(&self) {
        let Some(mut errors) = self.connection.errors().await else {
            return;
        };
        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(err) = errors.recv().await {
                tracing::error!(error = %err, "connection failed, session unavailable");
                let _ = state.transition(SessionState::Unavailable).await;
            }
        });
    }

    /// Send a command and stream its classified output.
    ///
    /// `silence_timeout` overrides the configured window for this command
    /// only. See [`CommandExecutor::execute_stream`] for the stream
    /// contract.
    pub async fn execute_stream(
        &self,
        command: &str,
        silence_timeout: Option<Duration>,
    ) -> mpsc::Receiver<StreamChunk> {
        let timeout = silence_timeout.unwrap_or_else(|| self.config.silence_timeout());
        let executor = CommandExecutor::new(
            self.connection.clone(),
            self.classifier.clone(),
            self.state.clone(),
            self.config.terminal_type,
        );
        executor.execute_stream(command, timeout).await
    }

    /// Request a terminal resize.
    pub async fn resize(&self, rows: u16, columns: u16) -> Result<()> {
        self.connection.resize(rows, columns).await
    }

    /// Current session state.
    pub async fn state(&self) -> SessionState {
        self.state.current().await
    }

    /// Whether a command would be accepted right now.
    pub async fn can_execute_command(&self) -> bool {
        self.state().await == SessionState::Idle
    }

    /// Close the connection and retire the session.
    pub async fn shutdown(&self) {
        self.connection.disconnect().await;
        let _ = self.state.transition(SessionState::Unavailable).await;
        tracing::info!("session shut down");
    }
}
