//! # ttylink Session Library
//!
//! Drives an interactive terminal program (a shell, or an AI command-line
//! assistant) over a ttyd WebSocket tunnel, turning its raw screen-redraw
//! stream into typed output chunks with inferred command completion.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────┐
//!                 │  TerminalSession │   facade + state machine
//!                 └────────┬─────────┘
//!                          │
//!          ┌───────────────┼────────────────┐
//!          │               │                │
//! ┌────────▼───────┐ ┌─────▼──────┐ ┌───────▼────────┐
//! │ ConnectionMgr  │ │ Classifier │ │ CommandExecutor │
//! │ ws + dispatch  │ │ rulesets   │ │ dual completion │
//! └────────┬───────┘ └─────┬──────┘ └────────────────┘
//!          │               │
//! ┌────────▼───────┐ ┌─────▼──────┐
//! │   protocol     │ │  cleaner   │
//! │ framing, auth  │ │ escape rm  │
//! └────────────────┘ └────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use session::{SessionConfig, TerminalSession, TerminalType};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SessionConfig::new("localhost", 7681)
//!         .with_credentials("admin", "secret")
//!         .with_terminal_type(TerminalType::Shell);
//!
//!     let session = TerminalSession::new(config);
//!     if session.initialize().await {
//!         let mut chunks = session.execute_stream("pwd", None).await;
//!         while let Some(chunk) = chunks.recv().await {
//!             println!("[{}] {}", chunk.kind, chunk.content);
//!         }
//!     }
//!     session.shutdown().await;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`cleaner`]: escape sequence removal
//! - [`classifier`]: typed chunk classification with per-terminal rulesets
//! - [`config`]: session configuration, file and environment loading
//! - [`connection`]: WebSocket transport, authentication, payload dispatch
//! - [`executor`]: command execution with inferred completion
//! - [`session`]: the session facade and lifecycle state machine
//! - [`error`]: error types

pub mod classifier;
pub mod cleaner;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod session;

pub use classifier::{
    ChunkKind, Classified, Classifier, Metadata, MetadataBuilder, Ruleset, StreamChunk,
};
pub use cleaner::clean;
pub use config::{SessionConfig, TerminalType};
pub use connection::{ConnectionManager, ConnectionState, ListenerId};
pub use error::{Result, SessionError};
pub use executor::CommandExecutor;
pub use session::{SessionState, StateMachine, TerminalSession};
