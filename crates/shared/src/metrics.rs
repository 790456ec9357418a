//! Training arithmetic shared by the renderers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneRepMaxFormula {
    #[default]
    Epley,
    Brzycki,
    Lombardi,
    Mayhew,
    OConner,
}

impl std::str::FromStr for OneRepMaxFormula {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to Epley.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "brzycki" => Self::Brzycki,
            "lombardi" => Self::Lombardi,
            "mayhew" => Self::Mayhew,
            "oconner" | "o'conner" => Self::OConner,
            _ => Self::Epley,
        })
    }
}

pub fn estimate_one_rep_max(reps: u32, weight: f64, formula: OneRepMaxFormula) -> Option<f64> {
    if reps == 0 || weight <= 0.0 {
        return None;
    }
    let reps = f64::from(reps);
    let estimate = match formula {
        OneRepMaxFormula::Epley => weight * (1.0 + reps / 30.0),
        OneRepMaxFormula::Brzycki => {
            // Undefined at 37+ reps.
            if reps >= 37.0 {
                return None;
            }
            weight * (36.0 / (37.0 - reps))
        }
        OneRepMaxFormula::Lombardi => weight * reps.powf(0.10),
        OneRepMaxFormula::Mayhew => (100.0 * weight) / (52.2 + 41.9 * (-0.055 * reps).exp()),
        OneRepMaxFormula::OConner => weight * (1.0 + 0.025 * reps),
    };
    Some(estimate)
}

pub fn pace_minutes_per_mile(distance: f64, duration: f64) -> Option<f64> {
    if distance <= 0.0 || duration <= 0.0 {
        return None;
    }
    Some(duration / distance)
}

/// `7.5` -> `"7:30"`.
pub fn format_pace(minutes_per_mile: f64) -> String {
    let total_seconds = (minutes_per_mile * 60.0).floor() as u64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Trims trailing zeros so `185.0` prints as `185` and `3.10` as `3.1`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let rendered = format!("{value:.2}");
        rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

#[cfg(test)]
#[path = "tests/metrics_tests.rs"]
mod tests;
