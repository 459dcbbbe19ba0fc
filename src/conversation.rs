//! Conversation State Machine
//!
//! Owns the ordered message log for one chat session and reconciles the
//! in-flight assistant turn with incoming stream deltas.
//!
//! # Lifecycle
//!
//! A session starts `Empty` (no turns, no system preamble). The first user
//! message inserts the system turn, then the user turn, then opens an empty
//! assistant turn; later messages skip the system insertion. While a turn is
//! open it is always the last element of the log and is the only mutable
//! turn; [`Conversation::complete_turn`] freezes it, keeping whatever
//! partial content it accumulated.
//!
//! # Invariants
//!
//! - At most one system turn, always first if present.
//! - At most one open assistant turn, always last.
//! - Exactly one completion request is issued per open turn: a second
//!   [`Conversation::begin_turn`] while a turn is open is rejected with
//!   [`TurnInFlight`] rather than racing the in-flight request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who a turn is attributed to.
///
/// Serializes lowercase, matching both the UI bus and the Ollama chat body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Conversation preamble
    System,
    /// User input
    User,
    /// Model output
    Assistant,
}

/// One conversation entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn
    pub role: Role,
    /// Turn text; mutable only while this is the open assistant turn
    pub content: String,
}

impl Turn {
    /// Create a turn.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A user message arrived while an assistant turn was still streaming.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("a response is already being generated")]
pub struct TurnInFlight;

/// Ordered message log with a single optional open assistant turn.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
    open: bool,
}

impl Conversation {
    /// Create an empty conversation (no system turn yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn and open a new assistant turn for the response.
    ///
    /// On the first user message the system preamble is inserted ahead of
    /// it; `system_prompt` is read by the caller at this moment, so later
    /// configuration changes never rewrite an already-inserted system turn.
    pub fn begin_turn(
        &mut self,
        text: impl Into<String>,
        system_prompt: &str,
    ) -> Result<(), TurnInFlight> {
        if self.open {
            return Err(TurnInFlight);
        }
        if self.turns.is_empty() {
            self.turns.push(Turn::new(Role::System, system_prompt));
        }
        self.turns.push(Turn::new(Role::User, text));
        self.turns.push(Turn::new(Role::Assistant, String::new()));
        self.open = true;
        Ok(())
    }

    /// Append a raw delta to the open assistant turn.
    ///
    /// Returns `false` (and drops the delta) if no turn is open, which can
    /// only happen if a stale stream outlives its turn.
    pub fn receive_delta(&mut self, delta: &str) -> bool {
        if !self.open {
            tracing::debug!(len = delta.len(), "delta with no open turn, dropped");
            return false;
        }
        // The open turn is always last.
        if let Some(turn) = self.turns.last_mut() {
            turn.content.push_str(delta);
        }
        true
    }

    /// Close the open assistant turn, freezing its content.
    ///
    /// Called on every stream outcome, success or failure, so a partial
    /// answer is preserved rather than discarded. Idempotent.
    pub fn complete_turn(&mut self) -> Option<&Turn> {
        if !self.open {
            return None;
        }
        self.open = false;
        self.turns.last()
    }

    /// Whether an assistant turn is currently open.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.open
    }

    /// Whether the log has no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The full ordered log, open turn included.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Content of the open assistant turn, if any.
    #[must_use]
    pub fn open_content(&self) -> Option<&str> {
        if self.open {
            self.turns.last().map(|t| t.content.as_str())
        } else {
            None
        }
    }

    /// Reset to `Empty`; the next user message re-inserts the system turn.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.open = false;
    }
}
