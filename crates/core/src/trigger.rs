//! Meal-trigger scheduling: three ordered slots per simulated day, each
//! firing at most once, plus the always-on spike-analysis prompt.

use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;

/// The three proactive meal check-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }

    /// Instruction handed to the conversation engine when this slot fires.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Breakfast => "Ask the user what they had for breakfast.",
            Self::Lunch => "Ask the user what they had for lunch.",
            Self::Dinner => "Ask the user what they had for dinner.",
        }
    }
}

/// A scheduler-initiated prompt: a meal check-in or a spike analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Meal(MealSlot),
    SpikeAnalysis,
}

impl TriggerKind {
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Meal(slot) => slot.instruction(),
            Self::SpikeAnalysis => {
                "Please analyze any spikes in heart rate or blood pressure in the above recent data."
            }
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("meal boundaries must satisfy breakfast < lunch < dinner ({0})")]
    Unordered(String),
}

/// Fixed slot boundaries. Breakfast fires in `[breakfast, lunch)`, lunch in
/// `[lunch, dinner)`, dinner at or after `dinner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealSchedule {
    pub breakfast: ClockTime,
    pub lunch: ClockTime,
    pub dinner: ClockTime,
}

impl MealSchedule {
    pub fn new(
        breakfast: ClockTime,
        lunch: ClockTime,
        dinner: ClockTime,
    ) -> Result<Self, ScheduleError> {
        if breakfast >= lunch || lunch >= dinner {
            return Err(ScheduleError::Unordered(format!(
                "{breakfast} / {lunch} / {dinner}"
            )));
        }
        Ok(Self {
            breakfast,
            lunch,
            dinner,
        })
    }
}

impl Default for MealSchedule {
    fn default() -> Self {
        Self {
            breakfast: ClockTime::parse("08:00").expect("default schedule"),
            lunch: ClockTime::parse("12:30").expect("default schedule"),
            dinner: ClockTime::parse("19:00").expect("default schedule"),
        }
    }
}

/// Which meal check-ins have already fired for this session today.
/// Flags only transition false→true here; `reset_day` is the sole reset
/// path and is driven by an external day-rollover signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    pub asked_breakfast: bool,
    pub asked_lunch: bool,
    pub asked_dinner: bool,
}

impl TriggerState {
    pub fn reset_day(&mut self) {
        *self = Self::default();
    }
}

/// Decide whether a meal prompt should fire now. At most one flag flips per
/// call; once a slot has fired, re-evaluating in the same window returns
/// `None`. The window cursor is untouched — the conversation engine
/// advances it only after a completed turn.
pub fn evaluate(
    schedule: &MealSchedule,
    state: &mut TriggerState,
    now: ClockTime,
) -> Option<MealSlot> {
    let mins = now.minutes();
    if !state.asked_breakfast
        && mins >= schedule.breakfast.minutes()
        && mins < schedule.lunch.minutes()
    {
        state.asked_breakfast = true;
        Some(MealSlot::Breakfast)
    } else if !state.asked_lunch
        && mins >= schedule.lunch.minutes()
        && mins < schedule.dinner.minutes()
    {
        state.asked_lunch = true;
        Some(MealSlot::Lunch)
    } else if !state.asked_dinner && mins >= schedule.dinner.minutes() {
        state.asked_dinner = true;
        Some(MealSlot::Dinner)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    #[test]
    fn breakfast_fires_inside_its_window() {
        let schedule = MealSchedule::default();
        let mut state = TriggerState::default();

        let slot = evaluate(&schedule, &mut state, t("08:15"));
        assert_eq!(slot, Some(MealSlot::Breakfast));
        assert!(state.asked_breakfast);
        assert!(!state.asked_lunch);
    }

    #[test]
    fn slot_fires_at_most_once() {
        let schedule = MealSchedule::default();
        let mut state = TriggerState::default();

        assert!(evaluate(&schedule, &mut state, t("08:15")).is_some());
        assert_eq!(evaluate(&schedule, &mut state, t("08:20")), None);
        assert_eq!(evaluate(&schedule, &mut state, t("08:20")), None);
    }

    #[test]
    fn nothing_fires_before_breakfast() {
        let schedule = MealSchedule::default();
        let mut state = TriggerState::default();
        assert_eq!(evaluate(&schedule, &mut state, t("06:30")), None);
        assert_eq!(state, TriggerState::default());
    }

    #[test]
    fn at_most_one_slot_per_call() {
        // Fresh state late in the day: only dinner fires on this call.
        let schedule = MealSchedule::default();
        let mut state = TriggerState::default();

        let slot = evaluate(&schedule, &mut state, t("19:05"));
        assert_eq!(slot, Some(MealSlot::Dinner));
        assert!(!state.asked_breakfast);
        assert!(!state.asked_lunch);
        assert!(state.asked_dinner);
    }

    #[test]
    fn lunch_window_is_half_open() {
        let schedule = MealSchedule::default();
        let mut state = TriggerState::default();

        assert_eq!(
            evaluate(&schedule, &mut state, t("12:30")),
            Some(MealSlot::Lunch)
        );

        let mut fresh = TriggerState::default();
        assert_eq!(
            evaluate(&schedule, &mut fresh, t("12:29")),
            Some(MealSlot::Breakfast)
        );
    }

    #[test]
    fn dinner_has_no_upper_bound() {
        let schedule = MealSchedule::default();
        let mut state = TriggerState::default();
        assert_eq!(
            evaluate(&schedule, &mut state, t("23:59")),
            Some(MealSlot::Dinner)
        );
    }

    #[test]
    fn reset_day_reenables_slots() {
        let schedule = MealSchedule::default();
        let mut state = TriggerState::default();

        evaluate(&schedule, &mut state, t("08:15"));
        assert_eq!(evaluate(&schedule, &mut state, t("08:16")), None);

        state.reset_day();
        assert_eq!(
            evaluate(&schedule, &mut state, t("08:17")),
            Some(MealSlot::Breakfast)
        );
    }

    #[test]
    fn schedule_rejects_unordered_boundaries() {
        assert!(MealSchedule::new(t("12:00"), t("08:00"), t("19:00")).is_err());
        assert!(MealSchedule::new(t("08:00"), t("12:30"), t("12:30")).is_err());
        assert!(MealSchedule::new(t("08:00"), t("12:30"), t("19:00")).is_ok());
    }

    #[test]
    fn instructions_name_the_meal() {
        assert!(MealSlot::Breakfast.instruction().contains("breakfast"));
        assert!(MealSlot::Lunch.instruction().contains("lunch"));
        assert!(MealSlot::Dinner.instruction().contains("dinner"));
        assert!(TriggerKind::SpikeAnalysis.instruction().contains("spikes"));
    }
}
