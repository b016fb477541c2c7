//! Simulated clock: a validated `HH:MM` time value, a process-wide source
//! with an externally injected override, and a file-watch adapter that turns
//! a watched time file into clock-change events.

use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Error type for clock operations. A malformed `HH:MM` value is a
/// configuration error and is fatal at construction time.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("malformed HH:MM value: {0:?}")]
    Format(String),
}

/// A minute-resolution time of day. Ordered by minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Default start of the simulated day; seeds each session's window cursor.
    pub const START_OF_DAY: ClockTime = ClockTime { minutes: 6 * 60 };

    /// Parse a `HH:MM` string. Hours must be 0-23, minutes 0-59.
    pub fn parse(s: &str) -> Result<Self, ClockError> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| ClockError::Format(s.to_owned()))?;
        let hour: u16 = h.parse().map_err(|_| ClockError::Format(s.to_owned()))?;
        let minute: u16 = m.parse().map_err(|_| ClockError::Format(s.to_owned()))?;
        if hour > 23 || minute > 59 {
            return Err(ClockError::Format(s.to_owned()));
        }
        Ok(Self {
            minutes: hour * 60 + minute,
        })
    }

    fn from_hm(hour: u32, minute: u32) -> Self {
        Self {
            minutes: (hour * 60 + minute) as u16,
        }
    }

    /// Minutes since midnight. All interval comparisons use this value.
    pub fn minutes(&self) -> u32 {
        self.minutes as u32
    }

    pub fn hour(&self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(&self) -> u32 {
        self.minutes() % 60
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for ClockTime {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ClockError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

/// Durable record of the last-applied override.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedClock {
    current_time: ClockTime,
}

/// Process-wide clock source. Returns the external override when one has
/// been applied, otherwise the wall clock rounded to the minute. The
/// override is cleared only by process restart.
#[derive(Debug)]
pub struct ClockSource {
    override_time: RwLock<Option<ClockTime>>,
    persist_path: Option<PathBuf>,
}

impl ClockSource {
    pub fn new() -> Self {
        Self {
            override_time: RwLock::new(None),
            persist_path: None,
        }
    }

    /// A clock source that writes the last-applied override to `path` and
    /// resumes from it on the next start. Durability aid only; load and
    /// write failures are logged, never surfaced.
    pub fn with_persistence(path: PathBuf) -> Self {
        let restored = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<PersistedClock>(&raw).ok())
            .map(|p| p.current_time);
        if let Some(t) = restored {
            tracing::info!(time = %t, "clock override restored from state file");
        }
        Self {
            override_time: RwLock::new(restored),
            persist_path: Some(path),
        }
    }

    /// Current time: the override if set, else the wall clock as `HH:MM`.
    pub fn now(&self) -> ClockTime {
        if let Some(t) = *self.override_time.read().expect("clock lock") {
            return t;
        }
        let local = chrono::Local::now();
        ClockTime::from_hm(local.hour(), local.minute())
    }

    /// Apply an externally signalled time change. Idempotent for state;
    /// callers re-run trigger evaluation regardless.
    pub fn apply_external_change(&self, t: ClockTime) {
        *self.override_time.write().expect("clock lock") = Some(t);
        tracing::info!(time = %t, "clock override applied");
        if let Some(path) = &self.persist_path {
            let record = PersistedClock { current_time: t };
            let raw = serde_json::to_string(&record).expect("clock state serializes");
            if let Err(e) = std::fs::write(path, raw) {
                tracing::warn!(error = %e, path = %path.display(), "failed to persist clock state");
            }
        }
    }

    /// The currently applied override, if any.
    pub fn override_value(&self) -> Option<ClockTime> {
        *self.override_time.read().expect("clock lock")
    }
}

impl Default for ClockSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Watch a plain-text time file (`HH:MM`) and emit each changed value.
/// The returned receiver yields a `ClockTime` whenever the parsed content
/// differs from the previously observed value. Malformed content is logged
/// and skipped. The task exits when the token is cancelled or the receiver
/// is dropped.
pub fn watch_time_file(
    path: PathBuf,
    poll_interval: Duration,
    token: CancellationToken,
) -> mpsc::Receiver<ClockTime> {
    let (tx, rx) = mpsc::channel(8);
    tokio::spawn(async move {
        let mut last_seen: Option<ClockTime> = None;
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    let Ok(raw) = std::fs::read_to_string(&path) else {
                        continue;
                    };
                    match ClockTime::parse(raw.trim()) {
                        Ok(t) => {
                            if last_seen != Some(t) {
                                last_seen = Some(t);
                                if tx.send(t).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, path = %path.display(), "ignoring unparseable time file");
                        }
                    }
                }
            }
        }
    });
    rx
}
