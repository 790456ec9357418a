//! Input events bound to the selection controls and output events describing
//! view transitions.

use chrono::NaiveDate;
use shared::domain::{ExerciseKind, RequestToken, Selection, SelectionError};

use crate::view::{PageNotice, Region};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ExerciseChanged(String),
    StartDateChanged(Option<NaiveDate>),
    EndDateChanged(Option<NaiveDate>),
    /// Switching between strength and cardio clears the exercise, since the
    /// catalogues differ.
    KindChanged(ExerciseKind),
}

#[derive(Debug, Clone)]
pub enum ViewEvent {
    CycleStarted {
        token: RequestToken,
        selection: Selection,
    },
    RegionApplied {
        token: RequestToken,
        region: Region,
        errored: bool,
    },
    StaleDiscarded {
        token: RequestToken,
        current: RequestToken,
        region: Region,
    },
    SelectionRejected(SelectionError),
    Notice(PageNotice),
}
