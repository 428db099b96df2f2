//! Mock LLM Provider
//!
//! For testing and demo purposes. Returns a canned reply (or a canned
//! failure) and records every request it receives.

use std::sync::Mutex;

use analyst_core::{
    error::{LlmError, Result},
    message::Message,
    provider::{Completion, GenerationOptions, LlmProvider, ProviderInfo},
};
use async_trait::async_trait;

/// What the mock answers with
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Raw model text
    Text(String),
    /// Behave as if the service could not be reached
    Unavailable(String),
    /// Behave as if the service answered without usable text
    Malformed(String),
}

/// Provider with a fixed reply
pub struct MockProvider {
    reply: MockReply,
    received: Mutex<Vec<Vec<Message>>>,
}

impl MockProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockReply::Text(text.into()))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(MockReply::Unavailable(reason.into()))
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::new(MockReply::Malformed(reason.into()))
    }

    /// Messages of every `complete` call so far, oldest first
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Mock".into(),
            model: "mock".into(),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!matches!(self.reply, MockReply::Unavailable(_)))
    }

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
        if let Ok(mut received) = self.received.lock() {
            received.push(messages.to_vec());
        }

        match &self.reply {
            MockReply::Text(text) => Ok(Completion {
                content: text.clone(),
                model: options.model.clone(),
                usage: None,
                finish_reason: Some("STOP".into()),
            }),
            MockReply::Unavailable(reason) => Err(LlmError::ProviderUnavailable(reason.clone())),
            MockReply::Malformed(reason) => Err(LlmError::MalformedResponse(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_requests() {
        let provider = MockProvider::replying("{}");
        let completion = provider
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(completion.content, "{}");
        assert_eq!(provider.requests().len(), 1);
        assert_eq!(provider.requests()[0][0].text(), "hi");
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let provider = MockProvider::unavailable("down");
        assert!(!provider.health_check().await.unwrap());
        let err = provider
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_unavailable());

        let provider = MockProvider::malformed("no candidates");
        let err = provider
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }
}
