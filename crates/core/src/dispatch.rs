//! Binds external events (clock changes, inbound user messages) to the
//! conversation engine and an abstract outbound message channel. Holds no
//! transport logic of its own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::clock::{ClockSource, ClockTime};
use crate::engine::{ConversationEngine, TurnInput};
use crate::session::store::SessionStore;
use crate::session::{Session, SessionState};
use crate::trigger::{self, MealSchedule, TriggerKind};

/// Outbound delivery capability. Called once per produced assistant
/// message; delivery failures are the channel's concern and are never
/// surfaced back into core state.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn deliver(&self, session_id: &str, text: &str);
}

/// User-visible fallback when a turn fails. Core state stays untouched so
/// the next turn retries the same window.
pub const MODEL_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't reach your health assistant just now. Please try again in a moment.";

#[derive(Clone)]
pub struct Dispatcher {
    clock: Arc<ClockSource>,
    engine: Arc<ConversationEngine>,
    sessions: Arc<SessionStore>,
    schedule: MealSchedule,
    channel: Arc<dyn MessageChannel>,
}

impl Dispatcher {
    pub fn new(
        clock: Arc<ClockSource>,
        engine: Arc<ConversationEngine>,
        sessions: Arc<SessionStore>,
        schedule: MealSchedule,
        channel: Arc<dyn MessageChannel>,
    ) -> Self {
        Self {
            clock,
            engine,
            sessions,
            schedule,
            channel,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Apply the new time, then re-evaluate triggers for every known
    /// session. Sessions run concurrently; within a session the meal turn
    /// and its spike analysis are delivered in that fixed order.
    pub async fn on_clock_changed(&self, new_time: ClockTime) {
        self.clock.apply_external_change(new_time);

        let sessions = self.sessions.snapshot();
        let mut handles = Vec::with_capacity(sessions.len());
        for session in sessions {
            let dispatcher = self.clone();
            handles.push(tokio::spawn(async move {
                dispatcher.run_trigger_cycle(&session).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Handle one inbound user message. Triggers are evaluated first; if a
    /// slot fires, the user's text is deferred behind the trigger turn and
    /// its spike analysis, then processed as its own turn — never dropped.
    pub async fn on_user_message(&self, session_id: &str, text: &str) {
        let session = self.sessions.get_or_create(session_id);
        let mut state = session.state.lock().await;

        if let Some(slot) = trigger::evaluate(&self.schedule, &mut state.trigger, self.clock.now())
        {
            tracing::info!(
                session = %session.id,
                slot = slot.as_str(),
                "meal trigger fired on user message, deferring user input"
            );
            self.run_turn(&session.id, &mut state, TurnInput::Trigger(TriggerKind::Meal(slot)))
                .await;
            self.run_turn(
                &session.id,
                &mut state,
                TurnInput::Trigger(TriggerKind::SpikeAnalysis),
            )
            .await;
        }

        self.run_turn(&session.id, &mut state, TurnInput::User(text.to_owned()))
            .await;
    }

    /// Explicit day rollover: reset every session's meal flags. The core
    /// never resets them implicitly.
    pub async fn on_day_rollover(&self) {
        for session in self.sessions.snapshot() {
            let mut state = session.state.lock().await;
            state.trigger.reset_day();
        }
        tracing::info!("meal trigger flags reset for new day");
    }

    async fn run_trigger_cycle(&self, session: &Session) {
        let mut state = session.state.lock().await;
        let Some(slot) = trigger::evaluate(&self.schedule, &mut state.trigger, self.clock.now())
        else {
            return;
        };
        tracing::info!(session = %session.id, slot = slot.as_str(), "meal trigger fired");

        self.run_turn(&session.id, &mut state, TurnInput::Trigger(TriggerKind::Meal(slot)))
            .await;
        self.run_turn(
            &session.id,
            &mut state,
            TurnInput::Trigger(TriggerKind::SpikeAnalysis),
        )
        .await;
    }

    async fn run_turn(&self, session_id: &str, state: &mut SessionState, input: TurnInput) {
        match self.engine.turn(state, input).await {
            Ok(text) => self.channel.deliver(session_id, &text).await,
            Err(e) => {
                tracing::warn!(session = %session_id, error = %e, "turn failed, delivering fallback");
                self.channel.deliver(session_id, MODEL_FAILURE_MESSAGE).await;
            }
        }
    }
}
