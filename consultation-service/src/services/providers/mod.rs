//! Chat provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for chat completion
//! providers, allowing easy swapping between backends (OpenAI, mock).

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// One message in the two-message conversation sent to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Type alias for streams of delta fragments.
///
/// Each item is one incremental piece of generated text, in arrival order.
/// Fragments may be empty and may contain embedded newlines.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Trait for chat completion providers (e.g. OpenAI).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run the conversation to completion and return the full response text.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;

    /// Run the conversation and stream delta fragments as they arrive.
    async fn chat_stream(&self, messages: &[ChatMessage]) -> Result<ChatStream, ProviderError>;
}
