//! Simulated smartwatch telemetry: the static fixture and the time windower
//! that slices it for each conversation turn.

pub mod fixture;
pub mod window;
