//! UI Message Bus Protocol
//!
//! The typed, bidirectional protocol between the chat core and a render
//! surface. The surface is a pure renderer: it forwards user actions as
//! [`UiEvent`]s and displays whatever [`UiMessage`]s the core sends back —
//! no business logic on the UI side.
//!
//! Both enums serialize with a camelCase `type` tag and camelCase fields,
//! so the wire form is exactly what a JavaScript surface posts and expects
//! (e.g. `{"type":"appendAssistantMessage","content":"..."}`).

use serde::{Deserialize, Serialize};

use crate::conversation::Role;

/// Messages from the chat core to the UI surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiMessage {
    /// Display a complete message bubble
    AddMessage {
        /// Who the message is attributed to
        role: Role,
        /// Message text (empty for a streaming placeholder)
        content: String,
    },

    /// Append a raw delta to the last assistant bubble
    AppendAssistantMessage {
        /// The delta text, never the accumulated content
        content: String,
    },

    /// Update the status line
    UpdateStatus {
        /// Status text
        text: String,
    },

    /// Current model selection
    ModelInfo {
        /// The configured model
        model: String,
        /// Models installed on the server, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        available_models: Option<Vec<String>>,
    },

    /// Server liveness report
    OllamaStatus {
        /// Whether the server answered the probe
        is_running: bool,
        /// Server version, when reachable
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },

    /// Curated library of pullable models
    AvailableModels {
        /// Model identifiers
        models: Vec<String>,
    },

    /// Models installed on the server
    InstalledModels {
        /// Model identifiers
        models: Vec<String>,
    },

    /// Progress record for an in-flight model pull
    ModelDownloadProgress {
        /// Model being pulled
        model: String,
        /// Server status line (e.g. "downloading manifest")
        status: String,
        /// Percentage complete, when the server reports byte counts
        #[serde(default, skip_serializing_if = "Option::is_none")]
        progress: Option<f64>,
    },

    /// Remove all chat bubbles
    ClearChat,
}

/// Events from the UI surface to the chat core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiEvent {
    /// User submitted a chat message
    SendMessage {
        /// The message text
        message: String,
    },

    /// Surface asks for the current model selection
    GetModelInfo,

    /// User asked to insert a code block into the host editor
    InsertCode {
        /// The code to insert
        code: String,
    },

    /// User selected a model
    SetModel {
        /// Model identifier
        model: String,
    },

    /// User cleared the conversation
    ClearChat,

    /// Surface asks for a fresh installed-model listing
    RefreshModels,

    /// Surface asks for a server liveness/version report
    CheckOllamaStatus,

    /// User asked to pull a model
    PullModel {
        /// Model identifier
        model: String,
    },

    /// The system prompt changed in the settings store; re-read it
    SetSystemPrompt,

    /// Surface asks for the curated model library
    GetAvailableModels,

    /// Surface asks for the installed-model listing
    GetInstalledModels,
}
