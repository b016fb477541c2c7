//! Per-session conversation state: ordered history, meal-trigger flags, and
//! the telemetry window cursor, all scoped to one stable session id.

pub mod history;
pub mod store;

use tokio::sync::Mutex;

use crate::clock::ClockTime;
use crate::trigger::TriggerState;
use history::History;

/// End of the last consumed telemetry slice. Advanced only after a turn
/// completes, so a failed model call leaves the window retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindowCursor {
    pub previous_time: ClockTime,
}

impl TimeWindowCursor {
    pub fn new() -> Self {
        Self {
            previous_time: ClockTime::START_OF_DAY,
        }
    }

    pub fn advance(&mut self, now: ClockTime) {
        self.previous_time = now;
    }
}

impl Default for TimeWindowCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable state owned by one session.
#[derive(Debug, Default)]
pub struct SessionState {
    pub history: History,
    pub trigger: TriggerState,
    pub cursor: TimeWindowCursor,
}

/// One logical conversation thread. The mutex serializes turns for this
/// session; turns for different sessions proceed concurrently.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub state: Mutex<SessionState>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(SessionState::default()),
        }
    }
}
