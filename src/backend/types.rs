//! Ollama Wire Types
//!
//! Request and response shapes for the Ollama HTTP surface:
//! `/api/version`, `/api/tags`, `/api/chat` (NDJSON), `/api/pull` (NDJSON).

use serde::{Deserialize, Serialize};

use crate::conversation::Turn;

/// Body for `POST /api/chat`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    /// Full ordered log as `{role, content}` pairs
    pub messages: &'a [Turn],
    pub stream: bool,
}

/// One NDJSON record from the chat stream.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ChatChunk {
    /// Model that produced this record
    #[serde(default)]
    pub model: Option<String>,
    /// Server-side timestamp
    #[serde(default)]
    pub created_at: Option<String>,
    /// Incremental text delta (may be empty)
    #[serde(default)]
    pub response: String,
    /// Completion flag; end-of-stream is still the transport signal
    #[serde(default)]
    pub done: bool,
}

/// Response to `GET /api/version`.
#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    /// Server version string
    pub version: String,
}

/// One entry from `GET /api/tags`.
#[derive(Clone, Debug, Deserialize)]
pub struct ModelEntry {
    /// Model identifier
    pub name: String,
    /// Last-modified timestamp
    #[serde(default)]
    pub modified_at: Option<String>,
    /// Model size in bytes
    #[serde(default)]
    pub size: Option<u64>,
}

/// Response to `GET /api/tags`.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    /// Installed models
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// Body for `POST /api/pull`.
#[derive(Debug, Serialize)]
pub(crate) struct PullRequest<'a> {
    pub name: &'a str,
}

/// One NDJSON record from the pull stream.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct PullChunk {
    /// Server status line; records without one are dropped
    #[serde(default)]
    pub status: Option<String>,
    /// Bytes downloaded for the current layer
    #[serde(default)]
    pub completed: Option<u64>,
    /// Total bytes for the current layer
    #[serde(default)]
    pub total: Option<u64>,
}

impl PullChunk {
    /// Percentage complete, when the server reports byte counts.
    pub(crate) fn percent(&self) -> Option<f64> {
        match (self.completed, self.total) {
            (Some(completed), Some(total)) if total > 0 => {
                Some(completed as f64 / total as f64 * 100.0)
            }
            _ => None,
        }
    }
}

/// A semantic pull-progress event forwarded to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct PullProgress {
    /// Server status line (e.g. "downloading manifest")
    pub status: String,
    /// Percentage complete, when known
    pub progress: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chat_chunk_parses_stream_record() {
        let chunk: ChatChunk = serde_json::from_str(
            r#"{"model":"m","created_at":"t","response":"Hel","done":false}"#,
        )
        .unwrap();
        assert_eq!(chunk.response, "Hel");
        assert!(!chunk.done);

        // Terminal records may omit everything but the flag.
        let chunk: ChatChunk = serde_json::from_str(r#"{"response":"","done":true}"#).unwrap();
        assert!(chunk.done);
        assert!(chunk.response.is_empty());
    }

    #[test]
    fn chat_request_serializes_ordered_log() {
        use crate::conversation::Role;

        let turns = vec![
            Turn::new(Role::System, "sys"),
            Turn::new(Role::User, "hi"),
            Turn::new(Role::Assistant, ""),
        ];
        let body = serde_json::to_value(ChatRequest {
            model: "llama3",
            messages: &turns,
            stream: true,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "llama3",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": ""},
                ],
                "stream": true,
            })
        );
    }

    #[test]
    fn pull_chunk_percent() {
        let chunk: PullChunk =
            serde_json::from_str(r#"{"status":"downloading","completed":50,"total":200}"#).unwrap();
        assert_eq!(chunk.percent(), Some(25.0));

        let chunk: PullChunk = serde_json::from_str(r#"{"status":"verifying"}"#).unwrap();
        assert_eq!(chunk.percent(), None);

        let chunk: PullChunk =
            serde_json::from_str(r#"{"status":"x","completed":0,"total":0}"#).unwrap();
        assert_eq!(chunk.percent(), None);
    }
}
