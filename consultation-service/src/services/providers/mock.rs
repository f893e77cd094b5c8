//! Mock provider implementation for testing.

use super::{ChatMessage, ChatProvider, ChatStream, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock chat provider for testing.
///
/// Replays scripted delta fragments, optionally followed by an injected
/// failure, and counts invocations so tests can assert the provider was
/// never called.
pub struct MockChatProvider {
    fragments: Vec<String>,
    fail_after_fragments: bool,
    invocations: Arc<AtomicUsize>,
}

impl MockChatProvider {
    pub fn new(fragments: Vec<&str>) -> Self {
        Self {
            fragments: fragments.into_iter().map(String::from).collect(),
            fail_after_fragments: false,
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// After replaying all fragments, end the stream with a provider error.
    /// On the non-streaming path, fail the call outright.
    pub fn failing(mut self) -> Self {
        self.fail_after_fragments = true;
        self
    }

    /// Handle to the invocation counter, shared across clones of the state.
    pub fn invocations(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.invocations)
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        if self.fail_after_fragments {
            return Err(ProviderError::ApiError(
                "Mock provider failure".to_string(),
            ));
        }

        Ok(self.fragments.concat())
    }

    async fn chat_stream(&self, _messages: &[ChatMessage]) -> Result<ChatStream, ProviderError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        let mut items: Vec<Result<String, ProviderError>> =
            self.fragments.iter().cloned().map(Ok).collect();

        if self.fail_after_fragments {
            items.push(Err(ProviderError::ApiError(
                "Mock provider failure".to_string(),
            )));
        }

        Ok(Box::pin(tokio_stream::iter(items)))
    }
}
