//! Backend Trait
//!
//! Trait seam between the chat session and the server it talks to. The real
//! implementation is [`OllamaClient`](super::OllamaClient); tests drive the
//! session against a scripted backend instead of a live server.
//!
//! Streaming calls return pull-based streams: the backend does not read
//! ahead of the consumer, so a slow consumer naturally throttles network
//! reads.

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::types::PullProgress;
use crate::conversation::Turn;
use crate::error::OllamaError;

/// Ordered stream of assistant text deltas.
///
/// Recoverable decode errors appear as `Err` items and the stream continues;
/// a transport error is the final item.
pub type DeltaStream = BoxStream<'static, Result<String, OllamaError>>;

/// Ordered stream of pull-progress events.
pub type PullStream = BoxStream<'static, Result<PullProgress, OllamaError>>;

/// A chat-completion server.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Liveness probe. Short timeout, never errors.
    async fn is_running(&self) -> bool;

    /// Server version string, or a connectivity error.
    async fn version(&self) -> Result<String, OllamaError>;

    /// Models installed on the server.
    ///
    /// Degrades to an empty list on any failure; the caller treats empty as
    /// "unknown", not as an error. This contract applies to this operation
    /// only — completion failures must stay visible.
    async fn installed_models(&self) -> Vec<String>;

    /// Curated library of models worth suggesting for a pull.
    fn library_models(&self) -> Vec<String>;

    /// Open a streaming chat completion for the full ordered log.
    ///
    /// Probes liveness first and checks model availability best-effort, so
    /// the request fails fast with an actionable error before any bytes
    /// stream. The call resolves when the transport ends; no further items
    /// follow a transport error.
    async fn stream_chat(&self, model: &str, turns: &[Turn]) -> Result<DeltaStream, OllamaError>;

    /// Pull a model, streaming progress records. Long-lived, no timeout.
    async fn pull_model(&self, name: &str) -> Result<PullStream, OllamaError>;
}
