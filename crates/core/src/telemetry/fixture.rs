use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;

/// A single blood-pressure reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpReading {
    pub time: ClockTime,
    pub systolic: u16,
    pub diastolic: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub readings: Vec<BpReading>,
}

/// Whole-night sleep summary. Not a time series; never window-filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepCycle {
    pub sleep_start: ClockTime,
    pub wake_time: ClockTime,
    pub duration: String,
    pub quality: String,
    pub rem_cycles: u8,
    pub interruptions: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInterval {
    pub time: ClockTime,
    pub steps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySteps {
    pub target_steps: u32,
    pub actual_steps: u32,
    pub active_minutes: u32,
    pub sedentary_minutes: u32,
    pub step_intervals: Vec<StepInterval>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateInterval {
    pub time: ClockTime,
    pub bpm: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRate {
    pub intervals: Vec<HeartRateInterval>,
}

/// The full simulated health-data set. Read-only; the windower hands out
/// owned copies and never mutates this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryFixture {
    pub blood_pressure: BloodPressure,
    pub sleep_cycle: SleepCycle,
    pub daily_steps: DailySteps,
    pub heart_rate: HeartRate,
}

impl TelemetryFixture {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Built-in simulated day of data, used by the demo binary and tests.
    pub fn simulated() -> Self {
        fn t(s: &str) -> ClockTime {
            ClockTime::parse(s).expect("fixture time literal")
        }
        Self {
            blood_pressure: BloodPressure {
                readings: vec![
                    BpReading { time: t("06:30"), systolic: 118, diastolic: 76 },
                    BpReading { time: t("08:00"), systolic: 122, diastolic: 79 },
                    BpReading { time: t("09:45"), systolic: 125, diastolic: 81 },
                    BpReading { time: t("12:29"), systolic: 131, diastolic: 84 },
                    BpReading { time: t("12:30"), systolic: 134, diastolic: 86 },
                    BpReading { time: t("15:10"), systolic: 127, diastolic: 82 },
                    BpReading { time: t("19:10"), systolic: 129, diastolic: 83 },
                ],
            },
            sleep_cycle: SleepCycle {
                sleep_start: t("23:30"),
                wake_time: t("06:15"),
                duration: "6h 45m".to_owned(),
                quality: "Good".to_owned(),
                rem_cycles: 4,
                interruptions: 2,
            },
            daily_steps: DailySteps {
                target_steps: 10_000,
                actual_steps: 7_350,
                active_minutes: 58,
                sedentary_minutes: 410,
                step_intervals: vec![
                    StepInterval { time: t("07:00"), steps: 640 },
                    StepInterval { time: t("09:00"), steps: 1_200 },
                    StepInterval { time: t("12:00"), steps: 950 },
                    StepInterval { time: t("15:00"), steps: 1_800 },
                    StepInterval { time: t("18:00"), steps: 1_460 },
                    StepInterval { time: t("19:30"), steps: 1_300 },
                ],
            },
            heart_rate: HeartRate {
                intervals: vec![
                    HeartRateInterval { time: t("06:30"), bpm: 62 },
                    HeartRateInterval { time: t("08:00"), bpm: 71 },
                    HeartRateInterval { time: t("10:15"), bpm: 78 },
                    HeartRateInterval { time: t("12:29"), bpm: 84 },
                    HeartRateInterval { time: t("12:30"), bpm: 88 },
                    HeartRateInterval { time: t("16:00"), bpm: 131 },
                    HeartRateInterval { time: t("19:05"), bpm: 93 },
                ],
            },
        }
    }
}
