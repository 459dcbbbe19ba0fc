//! Error Taxonomy
//!
//! Failures are split by where they surface and what the user can do about
//! them:
//!
//! - [`OllamaError::Connectivity`] — the server is unreachable; raised by the
//!   eager liveness probe so a streaming call fails fast, with remediation
//!   text, before any partial UI state exists.
//! - [`OllamaError::ModelUnavailable`] — the configured model is absent from
//!   the server's registry; carries the available list.
//! - [`OllamaError::Decode`] — a non-terminal NDJSON segment failed to parse.
//!   Reported mid-stream, never fatal to the call.
//! - [`OllamaError::Http`] / [`OllamaError::Transport`] — the request was
//!   rejected or the connection dropped; a streaming call fails and the open
//!   assistant turn is closed with whatever partial content it holds.

use thiserror::Error;

use crate::ndjson::DecodeError;

/// Errors from the Ollama backend client.
#[derive(Debug, Error)]
pub enum OllamaError {
    /// Server unreachable (liveness probe failed)
    #[error(
        "Could not connect to Ollama at {url}. Please ensure that:\n\
         1. Ollama is installed (visit https://ollama.ai to download)\n\
         2. Ollama is running (check your terminal or task manager)\n\
         3. The Ollama URL is correct: {url}\n\
         To start Ollama, open a terminal and run: ollama serve"
    )]
    Connectivity {
        /// Base URL that was probed
        url: String,
    },

    /// Configured model absent from the server's registry
    #[error(
        "The model \"{model}\" is not available in Ollama. \
         Available models: {}. \
         To pull the model, run: ollama pull {model}",
        available.join(", ")
    )]
    ModelUnavailable {
        /// The model that was requested
        model: String,
        /// Models the server reported
        available: Vec<String>,
    },

    /// A non-terminal NDJSON segment failed to parse (stream continues)
    #[error("protocol decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The server answered with a non-success status
    #[error("Ollama returned {status}: {body}")]
    Http {
        /// HTTP status code
        status: reqwest::StatusCode,
        /// Response body, if readable
        body: String,
    },

    /// Connection-level failure (request or mid-stream)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl OllamaError {
    /// Whether the stream survives this error.
    ///
    /// Decode errors are reported and skipped; everything else ends the call.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
