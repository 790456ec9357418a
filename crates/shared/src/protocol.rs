use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{GoalId, SessionId};

/// Normalises the date shapes the API emits (`YYYY-MM-DD`, ISO timestamps,
/// RFC 2822 from the JSON encoder) into a sortable calendar date.
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date());
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|ts| ts.date_naive())
}

pub fn display_date(raw: &str) -> String {
    parse_api_date(raw)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneRepMaxPoint {
    pub date: String,
    pub estimated_1rm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub date: String,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityPoint {
    pub date: String,
    pub set_number: u32,
    pub relative_intensity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioProgressPoint {
    pub date: String,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl CardioProgressPoint {
    pub fn pace(&self) -> Option<f64> {
        crate::metrics::pace_minutes_per_mile(self.distance?, self.duration?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrengthTrend {
    pub one_rep_max: Vec<OneRepMaxPoint>,
    pub volume: Vec<VolumePoint>,
    pub intensity: Vec<IntensityPoint>,
}

impl StrengthTrend {
    pub fn is_empty(&self) -> bool {
        self.one_rep_max.is_empty() && self.volume.is_empty() && self.intensity.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum TrendSeries {
    Strength(StrengthTrend),
    Cardio(Vec<CardioProgressPoint>),
}

impl TrendSeries {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Strength(trend) => trend.is_empty(),
            Self::Cardio(points) => points.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub exercise: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<String>,
    pub field: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub datetime: String,
    #[serde(default)]
    pub is_latest: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecordsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<String>,
    #[serde(default)]
    pub personal_records: Vec<PersonalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDetail {
    pub set_number: u32,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub exercise: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sets: Vec<SetDetail>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub pace: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub id: SessionId,
    pub date: String,
    #[serde(default)]
    pub entries: Vec<SessionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedSet {
    pub set_number: u32,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrengthInsight {
    #[serde(default)]
    pub recommended_sets: Vec<RecommendedSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_pace_min_per_mile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioRecommendation {
    pub improved_metric: String,
    #[serde(default)]
    pub recommended_session: RecommendedSession,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardioInsight {
    #[serde(default)]
    pub recommendations: Vec<CardioRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Insight {
    Strength(StrengthInsight),
    Cardio(CardioInsight),
}

impl Insight {
    /// An insight without recommendations (or, for strength, without a
    /// rationale) is shown as "not available" rather than left blank.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Strength(insight) => {
                !insight.recommended_sets.is_empty()
                    && insight
                        .rationale
                        .as_deref()
                        .is_some_and(|r| !r.trim().is_empty())
            }
            Self::Cardio(insight) => !insight.recommendations.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Reps,
    Sets,
    Distance,
    Duration,
    Weight,
    Sessions,
    Pace,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reps => "reps",
            Self::Sets => "sets",
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Weight => "weight",
            Self::Sessions => "sessions",
            Self::Pace => "pace",
        }
    }

    pub fn units(self) -> &'static str {
        match self {
            Self::Distance => "miles",
            Self::Duration => "min",
            Self::Weight => "lb",
            Self::Reps => "reps",
            Self::Sets => "sets",
            Self::Sessions => "sessions",
            Self::Pace => "min/mile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    SingleSession,
    Aggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalTarget {
    pub metric: Metric,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub metric: Metric,
    pub value_achieved: f64,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub goal_type: GoalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_name: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default)]
    pub targets: Vec<GoalTarget>,
    #[serde(default)]
    pub progress: Vec<GoalProgress>,
}

/// Progress toward one target metric of a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricProgress {
    pub metric: Metric,
    pub achieved: f64,
    pub target: f64,
}

impl MetricProgress {
    /// Pace is minutes per mile, so lower is better.
    pub fn is_complete(&self) -> bool {
        match self.metric {
            Metric::Pace => self.achieved > 0.0 && self.achieved <= self.target,
            _ => self.achieved >= self.target,
        }
    }

    pub fn percent(&self) -> f64 {
        if self.target <= 0.0 {
            return 100.0;
        }
        (self.achieved / self.target * 100.0).clamp(0.0, 100.0)
    }
}

impl Goal {
    /// Best achieved value per targeted metric, in metric order. Metrics with
    /// no progress entries report zero.
    pub fn metric_progress(&self) -> Vec<MetricProgress> {
        let mut best: BTreeMap<Metric, f64> = BTreeMap::new();
        for entry in &self.progress {
            let lower_is_better = entry.metric == Metric::Pace;
            if lower_is_better && entry.value_achieved <= 0.0 {
                continue;
            }
            best.entry(entry.metric)
                .and_modify(|value| {
                    *value = if lower_is_better {
                        value.min(entry.value_achieved)
                    } else {
                        value.max(entry.value_achieved)
                    }
                })
                .or_insert(entry.value_achieved);
        }

        let mut targets: BTreeMap<Metric, f64> = BTreeMap::new();
        for target in &self.targets {
            targets.insert(target.metric, target.value);
        }

        targets
            .into_iter()
            .map(|(metric, target)| MetricProgress {
                metric,
                achieved: best.get(&metric).copied().unwrap_or(0.0),
                target,
            })
            .collect()
    }

    /// Single-session goals and pace/weight targets are pass/fail rather than
    /// cumulative.
    pub fn uses_checkbox(&self, metric: Metric) -> bool {
        self.goal_type == GoalType::SingleSession || matches!(metric, Metric::Pace | Metric::Weight)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
