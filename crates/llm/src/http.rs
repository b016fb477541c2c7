//! HTTP-based LLM provider.
//!
//! Speaks the OpenAI-compatible chat completions format, which also covers
//! Google Gemini and DeepSeek through their compatibility endpoints.

use crate::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmError, LlmProvider, Role,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Inferred provider kind from model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Google,
    DeepSeek,
    /// Falls back to the OpenAI-compatible format.
    Unknown,
}

impl ProviderKind {
    /// Infer provider from model name prefix.
    pub fn from_model(model: &str) -> Self {
        let m = model.to_lowercase();
        if m.starts_with("gpt-") || m.starts_with("o1-") || m.starts_with("o3-") {
            Self::OpenAi
        } else if m.starts_with("gemini-") {
            Self::Google
        } else if m.starts_with("deepseek-") {
            Self::DeepSeek
        } else {
            Self::Unknown
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi | Self::Unknown => "https://api.openai.com/v1",
            Self::Google => "https://generativelanguage.googleapis.com/v1beta/openai",
            Self::DeepSeek => "https://api.deepseek.com",
        }
    }
}

// ── wire types ──

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn role_str(role: &Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// Parse error response, returning RateLimited for 429.
fn check_error(status: reqwest::StatusCode, body: String) -> LlmError {
    if status.as_u16() == 429 {
        LlmError::RateLimited
    } else {
        LlmError::RequestFailed(format!("{status}: {body}"))
    }
}

/// HTTP-based LLM provider over the OpenAI-compatible chat endpoint.
pub struct HttpProvider {
    kind: ProviderKind,
    model: String,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpProvider {
    /// Build from model name + API key + optional base URL override.
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Self {
        let kind = ProviderKind::from_model(&model);
        let base = base_url.unwrap_or_else(|| kind.default_base_url().to_owned());
        Self {
            kind,
            model,
            client: reqwest::Client::new(),
            base_url: base.trim_end_matches('/').to_owned(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn complete_inner(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let body = WireRequest {
            model: self.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m: &ChatMessage| WireMessage {
                    role: role_str(&m.role),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(provider = self.name(), %status, "llm request failed");
            return Err(check_error(status, text));
        }

        let api: WireResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let content = api
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        let (input_tokens, output_tokens) = api
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(CompletionResponse {
            content,
            input_tokens,
            output_tokens,
        })
    }
}

impl LlmProvider for HttpProvider {
    fn name(&self) -> &str {
        match self.kind {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Google => "google",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Unknown => "unknown",
        }
    }

    fn complete(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + '_>> {
        Box::pin(self.complete_inner(request))
    }
}

/// Build an LlmProvider from environment variables.
/// Reads `SANA_LLM_MODEL`, `SANA_LLM_API_KEY`, optionally `SANA_LLM_BASE_URL`.
/// Returns `None` if model or key is not set.
pub fn from_env() -> Option<HttpProvider> {
    let model = std::env::var("SANA_LLM_MODEL").ok()?;
    let api_key = std::env::var("SANA_LLM_API_KEY").ok()?;
    let base_url = std::env::var("SANA_LLM_BASE_URL").ok();
    Some(HttpProvider::new(model, api_key, base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_openai_models() {
        assert_eq!(ProviderKind::from_model("gpt-4o"), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::from_model("o1-preview"), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::from_model("o3-mini"), ProviderKind::OpenAi);
    }

    #[test]
    fn infer_google_models() {
        assert_eq!(
            ProviderKind::from_model("gemini-2.0-flash-001"),
            ProviderKind::Google
        );
        assert_eq!(ProviderKind::from_model("gemini-pro"), ProviderKind::Google);
    }

    #[test]
    fn infer_deepseek_models() {
        assert_eq!(
            ProviderKind::from_model("deepseek-chat"),
            ProviderKind::DeepSeek
        );
    }

    #[test]
    fn infer_unknown_falls_back() {
        assert_eq!(ProviderKind::from_model("llama-3"), ProviderKind::Unknown);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(ProviderKind::from_model("Gemini-Pro"), ProviderKind::Google);
    }

    #[test]
    fn openai_endpoint() {
        let p = HttpProvider::new("gpt-4o".into(), "sk-test".into(), None);
        assert_eq!(p.endpoint(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(p.name(), "openai");
    }

    #[test]
    fn google_endpoint() {
        let p = HttpProvider::new("gemini-2.0-flash-001".into(), "key".into(), None);
        assert_eq!(
            p.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
        assert_eq!(p.name(), "google");
    }

    #[test]
    fn custom_base_url_override() {
        let p = HttpProvider::new(
            "gpt-4o".into(),
            "sk-test".into(),
            Some("https://my-proxy.com/v1/".into()),
        );
        assert_eq!(p.endpoint(), "https://my-proxy.com/v1/chat/completions");
    }
}
