use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// LLM completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// LLM completion response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Error type for LLM operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("rate limited")]
    RateLimited,
    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// Trait for LLM providers (OpenAI, Gemini, etc.)
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn complete(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + '_>>;
}

/// Mock provider for testing — returns a fixed response and records every
/// request it receives so tests can assert on prompt contents.
#[derive(Debug)]
pub struct MockProvider {
    pub response: String,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().expect("mock calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock calls lock").len()
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + '_>> {
        self.calls.lock().expect("mock calls lock").push(request);
        let content = self.response.clone();
        Box::pin(async move {
            Ok(CompletionResponse {
                content,
                input_tokens: 10,
                output_tokens: 20,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_provider_returns_response() {
        let mock = MockProvider::new("hello sana");
        let req = CompletionRequest {
            messages: vec![ChatMessage::user("hi")],
            max_tokens: 100,
            temperature: 0.7,
        };
        let resp = mock.complete(req).await.unwrap();
        assert_eq!(resp.content, "hello sana");
    }

    #[tokio::test]
    async fn mock_provider_records_calls() {
        let mock = MockProvider::new("ok");
        assert_eq!(mock.call_count(), 0);

        let req = CompletionRequest {
            messages: vec![
                ChatMessage::system("persona"),
                ChatMessage::user("first"),
            ],
            max_tokens: 50,
            temperature: 0.5,
        };
        mock.complete(req).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].messages[1].content, "first");
    }

    #[test]
    fn message_constructors() {
        assert_eq!(ChatMessage::system("s").role, Role::System);
        assert_eq!(ChatMessage::user("u").role, Role::User);
        assert_eq!(ChatMessage::assistant("a").role, Role::Assistant);
    }
}
