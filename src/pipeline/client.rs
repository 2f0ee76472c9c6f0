//! Completion client: send a message list, get the raw reply text back.
//!
//! [`CompletionClient`] is the seam between the pipeline and the model. The
//! pipeline only ever sees the reply as an opaque string; parsing is left to
//! [`crate::pipeline::parse`]. A failed call returns [`CompletionError`] and
//! never a partial reply. No retries happen here.

use crate::config::DigestConfig;
use crate::error::CompletionError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One `{role, content}` entry of a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    fn to_chat_message(&self) -> ChatMessage {
        match self.role {
            Role::System => ChatMessage::system(self.content.as_str()),
            Role::User => ChatMessage::user(self.content.as_str()),
        }
    }
}

/// Sends a structured message list to a language model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Return the model's raw reply text for `messages`.
    async fn call(&self, messages: &[Message]) -> Result<String, CompletionError>;
}

/// Reject requests without at least one non-empty user message.
pub fn validate_messages(messages: &[Message]) -> Result<(), CompletionError> {
    let has_user = messages
        .iter()
        .any(|m| m.role == Role::User && !m.content.trim().is_empty());
    if has_user {
        Ok(())
    } else {
        Err(CompletionError::InvalidRequest(
            "request needs at least one non-empty user message".into(),
        ))
    }
}

/// [`CompletionClient`] backed by an `edgequake-llm` provider.
pub struct ProviderCompletionClient {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl ProviderCompletionClient {
    /// Wrap a provider, taking sampling settings from `config`.
    pub fn new(provider: Arc<dyn LLMProvider>, config: &DigestConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }
}

#[async_trait]
impl CompletionClient for ProviderCompletionClient {
    async fn call(&self, messages: &[Message]) -> Result<String, CompletionError> {
        validate_messages(messages)?;
        let chat: Vec<ChatMessage> = messages.iter().map(Message::to_chat_message).collect();

        match self.provider.chat(&chat, Some(&self.options)).await {
            Ok(response) => {
                info!("LLM API call succeeded");
                debug!(
                    "{} input tokens, {} output tokens",
                    response.prompt_tokens, response.completion_tokens
                );
                Ok(response.content)
            }
            Err(e) => {
                error!("LLM API call failed: {}", e);
                Err(CompletionError::Upstream(e.to_string()))
            }
        }
    }
}

/// Build `CompletionOptions` from the run config.
fn build_options(config: &DigestConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
