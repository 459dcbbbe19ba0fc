//! Ollama Client
//!
//! HTTP client for the local Ollama server.
//!
//! # Ollama API
//!
//! - `GET /api/version` - liveness probe and version string
//! - `GET /api/tags` - installed models
//! - `POST /api/chat` - streaming chat completion (NDJSON)
//! - `POST /api/pull` - model download with streaming progress (NDJSON)
//!
//! The chat and pull response bodies are fed through a fresh
//! [`NdjsonDecoder`] per call. The returned streams are pull-based: the next
//! network chunk is read only after the consumer has taken every record the
//! previous chunk completed.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use super::traits::{CompletionBackend, DeltaStream, PullStream};
use super::types::{ChatChunk, ChatRequest, PullChunk, PullProgress, PullRequest, TagsResponse, VersionResponse};
use crate::conversation::Turn;
use crate::error::OllamaError;
use crate::ndjson::NdjsonDecoder;

/// Probe timeout for the liveness check
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Timeout for the model listing
const TAGS_TIMEOUT: Duration = Duration::from_secs(10);

/// Models worth suggesting for a pull when the server has none installed.
const LIBRARY_MODELS: &[&str] = &[
    "llama3",
    "llama3:8b",
    "llama3:70b",
    "codellama",
    "codellama:7b",
    "codellama:13b",
    "codellama:34b",
    "mistral",
    "mistral:7b",
    "mixtral",
    "mixtral:8x7b",
    "gemma",
    "gemma:2b",
    "gemma:7b",
    "phi",
    "phi:2.7b",
];

/// Ollama backend client
#[derive(Clone)]
pub struct OllamaClient {
    /// Base URL, no trailing slash
    base_url: String,
    /// HTTP client; no global timeout, streams are long-lived
    http: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for the given base URL (e.g. `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Installed models, with the failure visible to the caller.
    async fn tags(&self) -> Result<Vec<String>, OllamaError> {
        let response = self
            .http
            .get(self.url("/api/tags"))
            .timeout(TAGS_TIMEOUT)
            .send()
            .await?;
        let response = check_status(response).await?;
        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_OLLAMA_URL)
    }
}

#[async_trait]
impl CompletionBackend for OllamaClient {
    async fn is_running(&self) -> bool {
        self.http
            .get(self.url("/api/version"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    async fn version(&self) -> Result<String, OllamaError> {
        let response = self
            .http
            .get(self.url("/api/version"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|_| OllamaError::Connectivity {
                url: self.base_url.clone(),
            })?;
        let version: VersionResponse =
            response.json().await.map_err(|_| OllamaError::Connectivity {
                url: self.base_url.clone(),
            })?;
        Ok(version.version)
    }

    async fn installed_models(&self) -> Vec<String> {
        match self.tags().await {
            Ok(models) => models,
            Err(err) => {
                // Degrade to empty: the caller treats an empty list as
                // "unknown", not as a distinct failure.
                tracing::debug!(%err, "model listing failed");
                Vec::new()
            }
        }
    }

    fn library_models(&self) -> Vec<String> {
        LIBRARY_MODELS.iter().map(|m| (*m).to_string()).collect()
    }

    async fn stream_chat(&self, model: &str, turns: &[Turn]) -> Result<DeltaStream, OllamaError> {
        // Fail fast with remediation text instead of failing late inside
        // the stream.
        if !self.is_running().await {
            return Err(OllamaError::Connectivity {
                url: self.base_url.clone(),
            });
        }

        // Best-effort availability check; if the registry itself is down,
        // proceed and let the chat call surface any error.
        match self.tags().await {
            Ok(available) => {
                if !available.iter().any(|m| m == model) {
                    return Err(OllamaError::ModelUnavailable {
                        model: model.to_string(),
                        available,
                    });
                }
            }
            Err(err) => {
                tracing::debug!(%err, "model availability check failed, proceeding");
            }
        }

        let response = self
            .http
            .post(self.url("/api/chat"))
            .json(&ChatRequest {
                model,
                messages: turns,
                stream: true,
            })
            .send()
            .await?;
        let response = check_status(response).await?;

        tracing::debug!(model, turns = turns.len(), "chat stream opened");
        let mut body = response.bytes_stream();

        let stream = async_stream::stream! {
            let mut decoder: NdjsonDecoder<ChatChunk> = NdjsonDecoder::new();
            while let Some(chunk) = body.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        // Connection dropped mid-stream; whatever the
                        // decoder still buffers is invalid.
                        yield Err(OllamaError::Transport(err));
                        return;
                    }
                };
                for record in decoder.feed(&bytes) {
                    match record {
                        Ok(chunk) => {
                            if chunk.done {
                                tracing::trace!("completion flag received");
                            }
                            if !chunk.response.is_empty() {
                                yield Ok(chunk.response);
                            }
                        }
                        // Protocol violation on a non-terminal segment:
                        // report it, keep streaming.
                        Err(err) => yield Err(OllamaError::Decode(err)),
                    }
                }
            }
            if let Some(tail) = decoder.finish() {
                tracing::debug!(%tail, "discarding unterminated trailing record");
            }
        };

        Ok(Box::pin(stream))
    }

    async fn pull_model(&self, name: &str) -> Result<PullStream, OllamaError> {
        // No timeout: model downloads can run for a long time.
        let response = self
            .http
            .post(self.url("/api/pull"))
            .json(&PullRequest { name })
            .send()
            .await?;
        let response = check_status(response).await?;

        tracing::debug!(name, "pull stream opened");
        let mut body = response.bytes_stream();

        let stream = async_stream::stream! {
            let mut decoder: NdjsonDecoder<PullChunk> = NdjsonDecoder::new();
            while let Some(chunk) = body.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        yield Err(OllamaError::Transport(err));
                        return;
                    }
                };
                for record in decoder.feed(&bytes) {
                    match record {
                        Ok(chunk) => {
                            let progress = chunk.percent();
                            // Records without a status carry nothing to show.
                            if let Some(status) = chunk.status {
                                yield Ok(PullProgress { status, progress });
                            }
                        }
                        Err(err) => {
                            // Malformed progress records are dropped; only
                            // transport failures fail a pull.
                            tracing::debug!(%err, "dropping malformed pull record");
                        }
                    }
                }
            }
            if let Some(tail) = decoder.finish() {
                tracing::debug!(%tail, "discarding unterminated trailing record");
            }
        };

        Ok(Box::pin(stream))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, OllamaError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OllamaError::Http { status, body })
}
