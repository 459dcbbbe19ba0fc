//! Chat Session
//!
//! The orchestrator for one chat surface: it owns the conversation log, the
//! settings, and a backend handle, consumes [`UiEvent`]s from the surface,
//! and answers with [`UiMessage`]s over a tokio mpsc channel.
//!
//! # Design Philosophy
//!
//! The surface is a pure renderer. Every decision — when to inject the
//! system preamble, how to reconcile stream deltas, what a failure looks
//! like — lives here, so any surface (webview, TUI, headless test) behaves
//! identically.
//!
//! Failures are never silent: every failed operation produces both a status
//! line update and a visible chat entry.

use std::path::PathBuf;

use anyhow::Result;
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::backend::CompletionBackend;
use crate::config::ChatConfig;
use crate::conversation::{Conversation, Role};
use crate::error::OllamaError;
use crate::messages::{UiEvent, UiMessage};

/// One chat session wired between a UI surface and a completion backend.
pub struct ChatSession<B: CompletionBackend> {
    backend: B,
    config: ChatConfig,
    /// Where settings are persisted and re-read; `None` disables persistence
    config_path: Option<PathBuf>,
    conversation: Conversation,
    ui_tx: mpsc::Sender<UiMessage>,
}

impl<B: CompletionBackend> ChatSession<B> {
    /// Create a session.
    ///
    /// `config` is read once here; the session re-reads the settings store
    /// only at defined refresh points ([`UiEvent::SetSystemPrompt`]).
    pub fn new(backend: B, config: ChatConfig, ui_tx: mpsc::Sender<UiMessage>) -> Self {
        Self {
            backend,
            config,
            config_path: ChatConfig::default_path(),
            conversation: Conversation::new(),
            ui_tx,
        }
    }

    /// Use a specific settings file instead of the XDG default.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Current settings.
    #[must_use]
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// The conversation log.
    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Drive the session until the surface closes its event channel.
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) -> Result<()> {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await?;
        }
        tracing::debug!("surface event channel closed, session ending");
        Ok(())
    }

    /// Handle one surface event.
    ///
    /// Errors here mean the UI channel itself is gone; backend failures are
    /// reported to the surface, not propagated.
    pub async fn handle_event(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::SendMessage { message } => self.send_message(message).await,
            UiEvent::GetModelInfo => self.send_model_info().await,
            UiEvent::SetModel { model } => self.set_model(model).await,
            UiEvent::SetSystemPrompt => self.refresh_system_prompt().await,
            UiEvent::ClearChat => self.clear_chat().await,
            UiEvent::CheckOllamaStatus => self.check_status().await,
            UiEvent::RefreshModels | UiEvent::GetInstalledModels => {
                let models = self.backend.installed_models().await;
                self.send(UiMessage::InstalledModels { models }).await
            }
            UiEvent::GetAvailableModels => {
                let models = self.backend.library_models();
                self.send(UiMessage::AvailableModels { models }).await
            }
            UiEvent::PullModel { model } => self.pull_model(model).await,
            UiEvent::InsertCode { code } => {
                // Editor insertion belongs to the host, not the chat core.
                tracing::debug!(len = code.len(), "insertCode is handled by the host surface");
                Ok(())
            }
        }
    }

    async fn send(&self, message: UiMessage) -> Result<()> {
        self.ui_tx.send(message).await?;
        Ok(())
    }

    /// Status line plus a visible chat entry for a failed operation.
    async fn report_failure(&self, status: &str, err: &OllamaError) -> Result<()> {
        tracing::error!(%err, "backend operation failed");
        self.send(UiMessage::AddMessage {
            role: Role::System,
            content: format!("Error: {err}"),
        })
        .await?;
        self.send(UiMessage::UpdateStatus {
            text: status.to_string(),
        })
        .await
    }

    async fn send_message(&mut self, text: String) -> Result<()> {
        if self.conversation.is_streaming() {
            // One request per open turn; a second message must not race the
            // in-flight stream.
            tracing::warn!("rejecting message while a response is in flight");
            return self
                .send(UiMessage::UpdateStatus {
                    text: "Still generating a response, please wait...".to_string(),
                })
                .await;
        }

        let system_prompt = self.config.system_prompt.clone();
        if self
            .conversation
            .begin_turn(text.clone(), &system_prompt)
            .is_err()
        {
            // Unreachable: is_streaming was checked above.
            return Ok(());
        }

        self.send(UiMessage::AddMessage {
            role: Role::User,
            content: text,
        })
        .await?;
        // Placeholder bubble the deltas will append into.
        self.send(UiMessage::AddMessage {
            role: Role::Assistant,
            content: String::new(),
        })
        .await?;
        self.send(UiMessage::UpdateStatus {
            text: "Generating response...".to_string(),
        })
        .await?;

        let model = self.config.model.clone();
        let outcome = match self
            .backend
            .stream_chat(&model, self.conversation.turns())
            .await
        {
            Ok(mut deltas) => {
                let mut outcome = Ok(());
                while let Some(item) = deltas.next().await {
                    match item {
                        Ok(delta) => {
                            self.conversation.receive_delta(&delta);
                            self.send(UiMessage::AppendAssistantMessage { content: delta })
                                .await?;
                        }
                        Err(err) if err.is_recoverable() => {
                            tracing::warn!(%err, "skipping malformed stream record");
                        }
                        Err(err) => {
                            outcome = Err(err);
                            break;
                        }
                    }
                }
                outcome
            }
            Err(err) => Err(err),
        };

        // Close the turn on every outcome so partial content is preserved.
        self.conversation.complete_turn();

        match outcome {
            Ok(()) => {
                self.send(UiMessage::UpdateStatus {
                    text: format!("Model: {model}"),
                })
                .await
            }
            Err(err) => {
                self.report_failure(
                    "Error: Could not generate response. Make sure Ollama is running.",
                    &err,
                )
                .await
            }
        }
    }

    async fn send_model_info(&self) -> Result<()> {
        let models = self.backend.installed_models().await;
        self.send(UiMessage::ModelInfo {
            model: self.config.model.clone(),
            // Empty means "unknown", not "none installed".
            available_models: if models.is_empty() { None } else { Some(models) },
        })
        .await
    }

    async fn set_model(&mut self, model: String) -> Result<()> {
        self.config.model = model.clone();
        if let Some(path) = &self.config_path {
            if let Err(err) = self.config.save_to(path) {
                tracing::warn!(%err, "model selection not persisted");
            }
        }
        self.send(UiMessage::UpdateStatus {
            text: format!("Model set to {model}"),
        })
        .await?;
        self.send(UiMessage::ModelInfo {
            model,
            available_models: None,
        })
        .await
    }

    /// Defined refresh point for the system prompt.
    ///
    /// An already-inserted system turn is not rewritten; the fresh prompt
    /// applies from the next empty conversation.
    async fn refresh_system_prompt(&mut self) -> Result<()> {
        let fresh = match &self.config_path {
            Some(path) if path.exists() => ChatConfig::load_from(path).map(|mut config| {
                config.apply_env();
                config
            }),
            _ => {
                let mut config = ChatConfig::default();
                config.apply_env();
                Ok(config)
            }
        };
        match fresh {
            Ok(fresh) => {
                self.config.system_prompt = fresh.system_prompt;
                self.send(UiMessage::UpdateStatus {
                    text: "System prompt updated".to_string(),
                })
                .await
            }
            Err(err) => {
                tracing::warn!(%err, "failed to reload settings");
                self.send(UiMessage::UpdateStatus {
                    text: "Could not reload settings".to_string(),
                })
                .await
            }
        }
    }

    async fn clear_chat(&mut self) -> Result<()> {
        if self.conversation.is_streaming() {
            return self
                .send(UiMessage::UpdateStatus {
                    text: "Cannot clear while a response is streaming".to_string(),
                })
                .await;
        }
        self.conversation.clear();
        self.send(UiMessage::ClearChat).await?;
        self.send(UiMessage::UpdateStatus {
            text: "Chat cleared".to_string(),
        })
        .await
    }

    async fn check_status(&self) -> Result<()> {
        let is_running = self.backend.is_running().await;
        let version = if is_running {
            self.backend.version().await.ok()
        } else {
            None
        };
        self.send(UiMessage::OllamaStatus {
            is_running,
            version,
        })
        .await
    }

    async fn pull_model(&mut self, model: String) -> Result<()> {
        self.send(UiMessage::UpdateStatus {
            text: format!("Pulling model {model}..."),
        })
        .await?;

        let failure = match self.backend.pull_model(&model).await {
            Ok(mut progress) => {
                let mut failure = None;
                while let Some(item) = progress.next().await {
                    match item {
                        Ok(record) => {
                            self.send(UiMessage::ModelDownloadProgress {
                                model: model.clone(),
                                status: record.status,
                                progress: record.progress,
                            })
                            .await?;
                        }
                        Err(err) => {
                            failure = Some(err);
                            break;
                        }
                    }
                }
                failure
            }
            Err(err) => Some(err),
        };

        match failure {
            None => {
                self.send(UiMessage::UpdateStatus {
                    text: format!("Model {model} pulled"),
                })
                .await?;
                let models = self.backend.installed_models().await;
                self.send(UiMessage::InstalledModels { models }).await
            }
            Some(err) => {
                self.report_failure(&format!("Error: Failed to pull model {model}"), &err)
                    .await
            }
        }
    }
}
