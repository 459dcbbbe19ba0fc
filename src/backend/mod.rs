//! Ollama Backend Integration
//!
//! This module provides access to the local Ollama server through a trait
//! interface, so the chat session can be driven against a scripted backend
//! in tests.
//!
//! # Usage
//!
//! ```ignore
//! use ghostwriter_core::backend::{CompletionBackend, OllamaClient};
//!
//! let client = OllamaClient::new("http://localhost:11434");
//! let mut deltas = client.stream_chat("llama3", conversation.turns()).await?;
//! while let Some(delta) = deltas.next().await { /* ... */ }
//! ```

mod ollama;
mod traits;
mod types;

pub use ollama::OllamaClient;
pub use traits::{CompletionBackend, DeltaStream, PullStream};
pub use types::{ChatChunk, ModelEntry, PullProgress, TagsResponse, VersionResponse};
