//! View model: per-region state machine plus the page-level notice.
//!
//! Regions move `Idle -> Loading -> {Rendered, Errored}` and only return to
//! `Loading` when a new cycle begins.

use std::collections::BTreeMap;

use shared::{
    domain::{ExerciseKind, RequestToken, Selection, SelectionError},
    protocol::{Goal, Insight, PersonalRecord, SessionDetail, TrendSeries},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Trend,
    PersonalRecords,
    Sessions,
    Insight,
    Goals,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Trend,
        Region::PersonalRecords,
        Region::Sessions,
        Region::Insight,
        Region::Goals,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Trend => "trend charts",
            Self::PersonalRecords => "personal records",
            Self::Sessions => "sessions",
            Self::Insight => "AI insights",
            Self::Goals => "goals",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Trend => "Trends",
            Self::PersonalRecords => "Personal Records",
            Self::Sessions => "Sessions",
            Self::Insight => "AI Insights",
            Self::Goals => "Exercise Goals",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionPayload {
    Trend(TrendSeries),
    PersonalRecords(Vec<PersonalRecord>),
    Sessions(Vec<SessionDetail>),
    Insight(Insight),
    Goals(Vec<Goal>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RegionState {
    #[default]
    Idle,
    Loading {
        token: RequestToken,
    },
    Rendered {
        token: RequestToken,
        payload: RegionPayload,
    },
    Errored {
        token: RequestToken,
        message: String,
    },
}

impl RegionState {
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            Self::Idle => None,
            Self::Loading { token }
            | Self::Rendered { token, .. }
            | Self::Errored { token, .. } => Some(*token),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Self::Errored { .. })
    }

    pub fn payload(&self) -> Option<&RegionPayload> {
        match self {
            Self::Rendered { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageNotice {
    /// User-correctable input problem; no fetch was issued.
    Validation(String),
    /// The whole refresh failed or something unexpected happened.
    Failure(String),
    /// Credentials are missing or expired; the user has to log in again.
    SignedOut(String),
}

impl PageNotice {
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) | Self::Failure(message) | Self::SignedOut(message) => {
                message
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    regions: BTreeMap<Region, RegionState>,
    notice: Option<PageNotice>,
    selection: Option<Selection>,
}

impl ViewModel {
    pub fn new(regions: &[Region]) -> Self {
        Self {
            regions: regions
                .iter()
                .map(|region| (*region, RegionState::Idle))
                .collect(),
            notice: None,
            selection: None,
        }
    }

    pub fn region(&self, region: Region) -> Option<&RegionState> {
        self.regions.get(&region)
    }

    pub fn regions(&self) -> impl Iterator<Item = (Region, &RegionState)> {
        self.regions.iter().map(|(region, state)| (*region, state))
    }

    pub fn notice(&self) -> Option<&PageNotice> {
        self.notice.as_ref()
    }

    /// Selection of the cycle currently shown.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn kind(&self) -> ExerciseKind {
        self.selection
            .as_ref()
            .map(|selection| selection.kind)
            .unwrap_or_default()
    }

    pub(crate) fn begin_cycle(&mut self, token: RequestToken, selection: Selection) {
        for state in self.regions.values_mut() {
            *state = RegionState::Loading { token };
        }
        self.notice = None;
        self.selection = Some(selection);
    }

    pub(crate) fn reject(&mut self, error: &SelectionError) {
        self.notice = Some(PageNotice::Validation(error.to_string()));
    }

    /// Settles a region that is still loading for `token`. Returns `false`
    /// without touching the region otherwise.
    pub(crate) fn apply(
        &mut self,
        token: RequestToken,
        region: Region,
        outcome: Result<RegionPayload, String>,
    ) -> bool {
        let Some(state) = self.regions.get_mut(&region) else {
            return false;
        };
        if *state != (RegionState::Loading { token }) {
            return false;
        }
        *state = match outcome {
            Ok(payload) => RegionState::Rendered { token, payload },
            Err(message) => RegionState::Errored { token, message },
        };
        true
    }

    pub(crate) fn set_notice(&mut self, notice: PageNotice) {
        self.notice = Some(notice);
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
