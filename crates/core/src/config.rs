use std::path::PathBuf;
use std::time::Duration;

use crate::clock::{ClockError, ClockTime};
use crate::trigger::{MealSchedule, ScheduleError};

/// Configuration errors are fatal: the engine refuses to start (and so
/// never evaluates a trigger) until the value is corrected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// All sana parameters. `Default` first, then env overrides via `from_env`.
#[derive(Debug, Clone)]
pub struct CoachCfg {
    /// Meal slot boundaries.
    pub schedule: MealSchedule,

    // model call
    pub model_timeout_secs: u64,
    pub model_max_tokens: u32,
    pub model_temperature: f32,

    /// Durable clock override state (optional).
    pub clock_state_path: Option<PathBuf>,
    /// Watched plain-text `HH:MM` file driving clock changes (optional).
    pub time_file: Option<PathBuf>,
    pub time_file_poll_ms: u64,
}

impl Default for CoachCfg {
    fn default() -> Self {
        Self {
            schedule: MealSchedule::default(),
            model_timeout_secs: 30,
            model_max_tokens: 1024,
            model_temperature: 0.7,
            clock_state_path: None,
            time_file: None,
            time_file_poll_ms: 500,
        }
    }
}

impl CoachCfg {
    /// Load config from the environment:
    /// `SANA_BREAKFAST` / `SANA_LUNCH` / `SANA_DINNER` (HH:MM),
    /// `SANA_MODEL_TIMEOUT_SECS`, `SANA_MODEL_MAX_TOKENS`,
    /// `SANA_MODEL_TEMPERATURE`, `SANA_CLOCK_STATE`, `SANA_TIME_FILE`,
    /// `SANA_TIME_POLL_MS`. A malformed time value is a fatal error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();

        let breakfast = env_time("SANA_BREAKFAST", d.schedule.breakfast)?;
        let lunch = env_time("SANA_LUNCH", d.schedule.lunch)?;
        let dinner = env_time("SANA_DINNER", d.schedule.dinner)?;
        let schedule = MealSchedule::new(breakfast, lunch, dinner)?;

        Ok(Self {
            schedule,
            model_timeout_secs: env_or("SANA_MODEL_TIMEOUT_SECS", d.model_timeout_secs),
            model_max_tokens: env_or("SANA_MODEL_MAX_TOKENS", d.model_max_tokens),
            model_temperature: env_or("SANA_MODEL_TEMPERATURE", d.model_temperature),
            clock_state_path: std::env::var("SANA_CLOCK_STATE").ok().map(PathBuf::from),
            time_file: std::env::var("SANA_TIME_FILE").ok().map(PathBuf::from),
            time_file_poll_ms: env_or("SANA_TIME_POLL_MS", d.time_file_poll_ms),
        })
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_time(key: &str, default: ClockTime) -> Result<ClockTime, ClockError> {
    match std::env::var(key) {
        Ok(raw) => ClockTime::parse(&raw),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_schedule() {
        let cfg = CoachCfg::default();
        assert_eq!(cfg.schedule.breakfast.to_string(), "08:00");
        assert_eq!(cfg.schedule.lunch.to_string(), "12:30");
        assert_eq!(cfg.schedule.dinner.to_string(), "19:00");
        assert_eq!(cfg.model_timeout(), Duration::from_secs(30));
        assert!(cfg.clock_state_path.is_none());
        assert!(cfg.time_file.is_none());
    }

    #[test]
    fn env_or_falls_back_on_missing_key() {
        assert_eq!(env_or("SANA_TEST_UNSET_KEY", 42u64), 42);
    }

    #[test]
    fn env_time_falls_back_on_missing_key() {
        let d = ClockTime::parse("08:00").unwrap();
        assert_eq!(env_time("SANA_TEST_UNSET_TIME", d).unwrap(), d);
    }
}
