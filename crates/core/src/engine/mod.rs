//! The conversation engine: one entry point that merges trigger or user
//! input, attaches the windowed telemetry, calls the language model, and
//! commits history and the window cursor only on success.

pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use sana_llm::provider::{CompletionRequest, LlmError, LlmProvider};

use crate::clock::ClockSource;
use crate::config::CoachCfg;
use crate::session::SessionState;
use crate::telemetry::fixture::TelemetryFixture;
use crate::telemetry::window;
use crate::trigger::TriggerKind;

/// Effective input for one turn. A fired trigger takes the place of user
/// input for that cycle.
#[derive(Debug, Clone)]
pub enum TurnInput {
    User(String),
    Trigger(TriggerKind),
}

impl TurnInput {
    fn text(&self) -> &str {
        match self {
            Self::User(text) => text,
            Self::Trigger(kind) => kind.instruction(),
        }
    }
}

/// Turn failures. The session's cursor and history are left untouched so
/// the same window can be retried; trigger flags already set stay set.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
}

pub struct ConversationEngine {
    clock: Arc<ClockSource>,
    fixture: TelemetryFixture,
    llm: Arc<dyn LlmProvider>,
    model_timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl ConversationEngine {
    pub fn new(
        clock: Arc<ClockSource>,
        fixture: TelemetryFixture,
        llm: Arc<dyn LlmProvider>,
        cfg: &CoachCfg,
    ) -> Self {
        Self {
            clock,
            fixture,
            llm,
            model_timeout: cfg.model_timeout(),
            max_tokens: cfg.model_max_tokens,
            temperature: cfg.model_temperature,
        }
    }

    /// Run one conversation turn for the session behind `state`.
    ///
    /// On success: user turns append both roles to the history, trigger
    /// turns only the assistant side (there is no user utterance), and the
    /// window cursor advances to now. On failure nothing is committed.
    pub async fn turn(
        &self,
        state: &mut SessionState,
        input: TurnInput,
    ) -> Result<String, EngineError> {
        let now = self.clock.now();
        let windowed = window::filter(&self.fixture, state.cursor.previous_time, now);
        if windowed.is_empty() {
            tracing::debug!(
                from = %state.cursor.previous_time,
                to = %now,
                "telemetry window is empty"
            );
        }
        let telemetry = window::format(&windowed);
        let messages = prompt::build_messages(&telemetry, state.history.messages(), input.text());

        let request = CompletionRequest {
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let response = tokio::time::timeout(self.model_timeout, self.llm.complete(request))
            .await
            .map_err(|_| EngineError::Timeout(self.model_timeout))??;

        match &input {
            TurnInput::User(text) => {
                state.history.push_user(text.clone());
                state.history.push_assistant(response.content.clone());
            }
            TurnInput::Trigger(_) => {
                state.history.push_assistant(response.content.clone());
            }
        }
        state.cursor.advance(now);

        tracing::debug!(
            provider = self.llm.name(),
            response_len = response.content.len(),
            cursor = %now,
            "turn completed"
        );
        Ok(response.content)
    }
}
