//! GhostWriter Core - Headless Chat Orchestration
//!
//! This crate is the UI-independent core of a chat assistant backed by a
//! local Ollama server. It relays the conversation to the server, streams
//! the generated text back one delta at a time, and drives any render
//! surface through a small typed message protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      UI Surface                           │
//! │          (webview, TUI, headless test harness)            │
//! │                                                           │
//! │            UiEvent (up)      UiMessage (down)             │
//! └───────────────────┬──────────────────▲───────────────────┘
//!                     │                  │
//! ┌───────────────────▼──────────────────┴───────────────────┐
//! │                      ChatSession                          │
//! │   ┌──────────────┐   ┌─────────────┐   ┌─────────────┐   │
//! │   │ Conversation │   │ ChatConfig  │   │ Completion  │   │
//! │   │  (turn log)  │   │ (settings)  │   │  Backend    │   │
//! │   └──────────────┘   └─────────────┘   └──────┬──────┘   │
//! └───────────────────────────────────────────────┼──────────┘
//!                                                 │
//!                                     NDJSON over HTTP
//!                                                 │
//!                                         ┌───────▼───────┐
//!                                         │ Ollama server │
//!                                         └───────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ChatSession`]: event loop wiring a surface to the backend
//! - [`Conversation`]: ordered turn log with one open assistant turn
//! - [`UiMessage`] / [`UiEvent`]: the core ⇄ surface protocol
//! - [`OllamaClient`]: streaming HTTP client ([`CompletionBackend`] impl)
//! - [`NdjsonDecoder`]: chunk-boundary-safe NDJSON record reassembly
//!
//! # Quick Start
//!
//! ```ignore
//! use ghostwriter_core::{ChatConfig, ChatSession, OllamaClient, UiEvent, UiMessage};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ChatConfig::load()?;
//!     let client = OllamaClient::new(&config.ollama_url);
//!     let (ui_tx, mut ui_rx) = mpsc::channel::<UiMessage>(100);
//!     let (event_tx, event_rx) = mpsc::channel::<UiEvent>(100);
//!
//!     tokio::spawn(async move {
//!         while let Some(message) = ui_rx.recv().await {
//!             // render `message` on the surface
//!         }
//!     });
//!
//!     ChatSession::new(client, config, ui_tx).run(event_rx).await
//! }
//! ```

pub mod backend;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod messages;
pub mod ndjson;

pub use backend::{CompletionBackend, DeltaStream, OllamaClient, PullProgress, PullStream};
pub use chat::ChatSession;
pub use config::{ChatConfig, ConfigError};
pub use conversation::{Conversation, Role, Turn, TurnInFlight};
pub use error::OllamaError;
pub use messages::{UiEvent, UiMessage};
pub use ndjson::{DecodeError, NdjsonDecoder};
