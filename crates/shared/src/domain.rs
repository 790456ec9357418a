use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(SessionId);
id_newtype!(GoalId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    #[default]
    Strength,
    Cardio,
}

impl ExerciseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Cardio => "cardio",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExerciseKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strength" => Ok(Self::Strength),
            "cardio" => Ok(Self::Cardio),
            other => Err(format!("unknown exercise kind: {other}")),
        }
    }
}

/// Identifies one refresh cycle. Minted by the controller once per accepted
/// selection; zero means no cycle has started yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

impl RequestToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("select an exercise to load its trends")]
    MissingExercise,
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Snapshot of the user's choice of exercise and optional date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub kind: ExerciseKind,
    pub exercise_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Selection {
    pub fn new(kind: ExerciseKind, exercise_name: impl Into<String>) -> Self {
        Self {
            kind,
            exercise_name: exercise_name.into(),
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_range(
        mut self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    pub fn exercise(&self) -> &str {
        self.exercise_name.trim()
    }

    pub fn has_exercise(&self) -> bool {
        !self.exercise().is_empty()
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        if !self.has_exercise() {
            return Err(SelectionError::MissingExercise);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(SelectionError::InvertedRange { start, end });
            }
        }
        Ok(())
    }

    /// `start_date` / `end_date` query pairs, only for the bounds that are set.
    pub fn date_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(start) = self.start_date {
            params.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.exercise(), self.kind)?;
        match (self.start_date, self.end_date) {
            (None, None) => Ok(()),
            (start, end) => write!(
                f,
                " {}..{}",
                start.map(|d| d.to_string()).unwrap_or_default(),
                end.map(|d| d.to_string()).unwrap_or_default()
            ),
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
