//! Command execution with inferred completion.
//!
//! The remote program never acknowledges a command, so the executor infers
//! completion from two signals raced against each other:
//!
//! - the classifier spots an idle-prompt marker in the output, or
//! - the traffic goes silent for the configured window.
//!
//! Marker completion wins whenever both could apply. The silence window is
//! resettable: every payload restarts it, so a long-running command that
//! keeps printing never times out. A hard ceiling bounds the worst case of
//! a program that keeps printing forever.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex};

use crate::classifier::{
    ChunkKind, Classified, Classifier, MetadataBuilder, StreamChunk,
};
use crate::config::TerminalType;
use crate::connection::ConnectionManager;
use crate::error::{Result, SessionError};
use crate::session::StateMachine;

/// Default absolute upper bound on one command, regardless of traffic.
pub const HARD_CEILING: Duration = Duration::from_secs(120);

/// How often the silence window and the ceiling are checked.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Capacity of the chunk channel handed to the caller.
const CHUNK_CHANNEL_CAPACITY: usize = 256;

/// Timing record for one in-flight command.
struct CommandExecution {
    command: String,
    started: Instant,
    last_activity: Instant,
}

impl CommandExecution {
    fn new(command: &str) -> Self {
        let now = Instant::now();
        Self {
            command: command.to_string(),
            started: now,
            last_activity: now,
        }
    }

    /// Record traffic, restarting the silence window.
    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Runs commands over an established connection, streaming typed chunks.
pub struct CommandExecutor {
    connection: Arc<ConnectionManager>,
    classifier: Arc<Mutex<Classifier>>,
    states: Arc<StateMachine>,
    terminal_type: TerminalType,
    hard_ceiling: Duration,
}

impl CommandExecutor {
    pub fn new(
        connection: Arc<ConnectionManager>,
        classifier: Arc<Mutex<Classifier>>,
        states: Arc<StateMachine>,
        terminal_type: TerminalType,
    ) -> Self {
        Self {
            connection,
            classifier,
            states,
            terminal_type,
            hard_ceiling: HARD_CEILING,
        }
    }

    /// Overrides the absolute per-command ceiling.
    pub fn with_hard_ceiling(mut self, ceiling: Duration) -> Self {
        self.hard_ceiling = ceiling;
        self
    }

    /// Send a command and stream its classified output.
    ///
    /// The returned channel yields zero or more non-terminal chunks followed
    /// by exactly one terminal chunk: a complete chunk carrying execution
    /// metadata, or a single error chunk if the command could not run. The
    /// stream never ends without a terminal chunk.
    pub async fn execute_stream(
        &self,
        command: &str,
        silence_timeout: Duration,
    ) -> mpsc::Receiver<StreamChunk> {
        let (tx, rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
        let terminal_type = self.terminal_type.as_str();

        // Single command in flight: refuse here, before touching the wire,
        // so a rejected call leaves the running command untouched.
        if let Err(err) = self.states.begin_command().await {
            tracing::warn!(command, error = %err, "command rejected");
            let chunk = StreamChunk::new(
                err.to_string(),
                ChunkKind::Error,
                MetadataBuilder::for_error(&err.to_string(), terminal_type),
            );
            let _ = tx.send(chunk).await;
            return rx;
        }

        let connection = self.connection.clone();
        let classifier = self.classifier.clone();
        let states = self.states.clone();
        let command = command.to_string();
        let hard_ceiling = self.hard_ceiling;

        tokio::spawn(async move {
            let mut execution = CommandExecution::new(&command);
            let outcome = Self::drive(
                &connection,
                &classifier,
                &mut execution,
                silence_timeout,
                hard_ceiling,
                &tx,
            )
            .await;
            connection.clear_primary().await;

            let elapsed = execution.elapsed().as_secs_f64();
            let terminal_chunk = match outcome {
                Ok(marker_complete) => {
                    if marker_complete {
                        tracing::debug!(command = %execution.command, elapsed, "command complete");
                    } else {
                        tracing::warn!(
                            command = %execution.command,
                            elapsed,
                            "command timed out, no completion marker"
                        );
                    }
                    StreamChunk::new(
                        "",
                        ChunkKind::Complete,
                        MetadataBuilder::for_complete(elapsed, marker_complete, terminal_type),
                    )
                }
                Err(err) => {
                    tracing::error!(command = %execution.command, error = %err, "command failed");
                    StreamChunk::new(
                        err.to_string(),
                        ChunkKind::Error,
                        MetadataBuilder::for_error(&err.to_string(), terminal_type),
                    )
                }
            };
            let _ = tx.send(terminal_chunk).await;

            states.finish_command().await;
        });

        rx
    }

    /// Pump payloads through the classifier until a completion signal.
    ///
    /// Returns `Ok(true)` on marker completion, `Ok(false)` on timeout.
    async fn drive(
        connection: &ConnectionManager,
        classifier: &Mutex<Classifier>,
        execution: &mut CommandExecution,
        silence_timeout: Duration,
        hard_ceiling: Duration,
        tx: &mpsc::Sender<StreamChunk>,
    ) -> Result<bool> {
        let (payload_tx, mut payload_rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
        connection.set_primary(payload_tx).await;
        classifier.lock().await.reset();

        connection.send_command(&execution.command).await?;

        let mut poll = tokio::time::interval(POLL_INTERVAL);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                payload = payload_rx.recv() => {
                    let Some(payload) = payload else {
                        return Err(SessionError::Disconnected(
                            "connection lost while command was running".to_string(),
                        ));
                    };
                    execution.touch();
                    match classifier.lock().await.classify(&payload) {
                        Some(Classified::Complete) => return Ok(true),
                        Some(Classified::Chunk(chunk)) => {
                            if tx.send(chunk).await.is_err() {
                                // caller dropped the stream; stop quietly
                                return Ok(false);
                            }
                        }
                        None => {}
                    }
                }
                _ = poll.tick() => {
                    if execution.idle_for() >= silence_timeout {
                        tracing::debug!(
                            idle_secs = execution.idle_for().as_secs_f64(),
                            "silence window elapsed"
                        );
                        return Ok(false);
                    }
                    if execution.elapsed() >= hard_ceiling {
                        tracing::warn!("hard ceiling reached");
                        return Ok(false);
                    }
                }
            }
        }
    }
}
