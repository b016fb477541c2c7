//! Time-windowed slices of the telemetry fixture.

use crate::clock::ClockTime;
use crate::telemetry::fixture::{
    BpReading, DailySteps, HeartRateInterval, SleepCycle, TelemetryFixture,
};

/// An owned, independent slice of the fixture for one time window. The
/// sleep summary is carried through unfiltered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowedTelemetry {
    pub blood_pressure: Vec<BpReading>,
    pub sleep_cycle: SleepCycle,
    pub daily_steps: DailySteps,
    pub heart_rate: Vec<HeartRateInterval>,
}

impl WindowedTelemetry {
    /// True when every time-indexed series is empty (e.g. a rewound window).
    pub fn is_empty(&self) -> bool {
        self.blood_pressure.is_empty()
            && self.daily_steps.step_intervals.is_empty()
            && self.heart_rate.is_empty()
    }
}

/// Retain readings with `start <= time <= end` (inclusive both ends) in
/// every time-indexed series. A rewound range (`start > end`) yields empty
/// series; that is a valid result, not an error.
pub fn filter(fixture: &TelemetryFixture, start: ClockTime, end: ClockTime) -> WindowedTelemetry {
    let keep = |t: ClockTime| start.minutes() <= t.minutes() && t.minutes() <= end.minutes();

    WindowedTelemetry {
        blood_pressure: fixture
            .blood_pressure
            .readings
            .iter()
            .filter(|r| keep(r.time))
            .cloned()
            .collect(),
        sleep_cycle: fixture.sleep_cycle.clone(),
        daily_steps: DailySteps {
            step_intervals: fixture
                .daily_steps
                .step_intervals
                .iter()
                .filter(|s| keep(s.time))
                .cloned()
                .collect(),
            ..fixture.daily_steps.clone()
        },
        heart_rate: fixture
            .heart_rate
            .intervals
            .iter()
            .filter(|h| keep(h.time))
            .cloned()
            .collect(),
    }
}

/// Deterministic multi-line rendering embedded into the model prompt.
/// Field order is fixed; identical inputs produce byte-identical output.
pub fn format(w: &WindowedTelemetry) -> String {
    let bp = w
        .blood_pressure
        .iter()
        .map(|r| format!("{} {}/{} mmHg", r.time, r.systolic, r.diastolic))
        .collect::<Vec<_>>()
        .join("; ");
    let hr = w
        .heart_rate
        .iter()
        .map(|h| format!("{} {} bpm", h.time, h.bpm))
        .collect::<Vec<_>>()
        .join("; ");
    let sleep = &w.sleep_cycle;
    let steps = &w.daily_steps;
    format!(
        "Blood Pressure (mmHg): {bp}\n\
         Sleep: Start {}, Wake {}, Duration {}, Quality {}, REM cycles {}, Interruptions {}\n\
         Steps: {} of {} (Active: {} min, Sedentary: {} min)\n\
         Heart Rate: {hr}",
        sleep.sleep_start,
        sleep.wake_time,
        sleep.duration,
        sleep.quality,
        sleep.rem_cycles,
        sleep.interruptions,
        steps.actual_steps,
        steps.target_steps,
        steps.active_minutes,
        steps.sedentary_minutes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    #[test]
    fn boundaries_are_inclusive_both_ends() {
        let fixture = TelemetryFixture::simulated();
        let w = filter(&fixture, t("08:00"), t("12:29"));

        let times: Vec<String> = w.blood_pressure.iter().map(|r| r.time.to_string()).collect();
        assert!(times.contains(&"08:00".to_owned()));
        assert!(times.contains(&"12:29".to_owned()));
        assert!(!times.contains(&"12:30".to_owned()));
        assert!(!times.contains(&"06:30".to_owned()));
    }

    #[test]
    fn rewound_window_is_empty_but_keeps_sleep() {
        let fixture = TelemetryFixture::simulated();
        let w = filter(&fixture, t("13:00"), t("09:00"));

        assert!(w.is_empty());
        assert!(w.blood_pressure.is_empty());
        assert!(w.heart_rate.is_empty());
        assert!(w.daily_steps.step_intervals.is_empty());
        assert_eq!(w.sleep_cycle, fixture.sleep_cycle);
    }

    #[test]
    fn window_is_an_independent_copy() {
        let fixture = TelemetryFixture::simulated();
        let before = fixture.clone();
        let mut w = filter(&fixture, t("06:00"), t("23:59"));

        w.blood_pressure.clear();
        w.daily_steps.step_intervals.clear();
        w.sleep_cycle.quality = "mutated".to_owned();

        assert_eq!(fixture, before);
    }

    #[test]
    fn format_is_deterministic() {
        let fixture = TelemetryFixture::simulated();
        let a = format(&filter(&fixture, t("06:00"), t("20:00")));
        let b = format(&filter(&fixture, t("06:00"), t("20:00")));
        assert_eq!(a, b);
    }

    #[test]
    fn format_renders_expected_fields() {
        let fixture = TelemetryFixture::simulated();
        let rendered = format(&filter(&fixture, t("08:00"), t("08:00")));

        assert!(rendered.contains("Blood Pressure (mmHg): 08:00 122/79 mmHg"));
        assert!(rendered.contains("Heart Rate: 08:00 71 bpm"));
        assert!(rendered.contains("Sleep: Start 23:30, Wake 06:15, Duration 6h 45m"));
        assert!(rendered.contains("Steps: 7350 of 10000 (Active: 58 min, Sedentary: 410 min)"));
    }

    #[test]
    fn empty_window_renders_empty_series() {
        let fixture = TelemetryFixture::simulated();
        let rendered = format(&filter(&fixture, t("02:00"), t("03:00")));
        assert!(rendered.starts_with("Blood Pressure (mmHg): \n"));
        assert!(rendered.ends_with("Heart Rate: "));
    }
}
