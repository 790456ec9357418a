//! Selection-driven refresh controller.
//!
//! Each accepted selection mints a new [`RequestToken`] and fans out one fetch
//! per region. A completed fetch is applied only while its token is still the
//! current one; anything older is dropped without touching the view. The
//! token check and the region update happen under the same lock as the token
//! increment, so a stale result can never land after a newer cycle began.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::NaiveDate;
use shared::domain::{ExerciseKind, RequestToken, Selection, SelectionError};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{
    auth::AuthFailure,
    config::ClientSettings,
    error::ClientError,
    events::{UiEvent, ViewEvent},
    source::TrendSource,
    view::{PageNotice, Region, RegionPayload, ViewModel},
};

const UNEXPECTED_FAILURE_NOTICE: &str =
    "Something went wrong while refreshing this view. Please try again.";

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub regions: Vec<Region>,
    pub fetch_timeout: Option<Duration>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            regions: Region::ALL.to_vec(),
            fetch_timeout: None,
        }
    }
}

impl ControllerOptions {
    pub fn from_settings(settings: &ClientSettings) -> Self {
        let regions = Region::ALL
            .into_iter()
            .filter(|region| settings.include_goals || *region != Region::Goals)
            .collect();
        Self {
            regions,
            fetch_timeout: settings.fetch_timeout(),
        }
    }

    pub fn with_regions(mut self, regions: impl IntoIterator<Item = Region>) -> Self {
        self.regions = regions.into_iter().collect();
        self.regions.sort();
        self.regions.dedup();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }
}

/// Current values of the selection controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionForm {
    pub kind: ExerciseKind,
    pub exercise: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SelectionForm {
    pub fn snapshot(&self) -> Selection {
        Selection::new(self.kind, self.exercise.clone()).with_range(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Rendered,
    Errored,
    /// Errored because credentials were missing or rejected.
    AuthFailed(AuthFailure),
    Stale,
}

impl Completion {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Errored | Self::AuthFailed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionCompletion {
    pub region: Region,
    pub completion: Completion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub token: RequestToken,
    pub completions: Vec<RegionCompletion>,
    pub unexpected: Option<String>,
}

impl CycleReport {
    pub fn count(&self, completion: Completion) -> usize {
        self.completions
            .iter()
            .filter(|c| c.completion == completion)
            .count()
    }

    pub fn completion(&self, region: Region) -> Option<Completion> {
        self.completions
            .iter()
            .find(|c| c.region == region)
            .map(|c| c.completion)
    }
}

/// Handle to an in-flight refresh cycle.
pub struct RefreshCycle {
    token: RequestToken,
    handle: JoinHandle<CycleReport>,
}

impl RefreshCycle {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Waits until every fetch of the cycle has completed and been applied or
    /// discarded.
    pub async fn settled(self) -> CycleReport {
        match self.handle.await {
            Ok(report) => report,
            Err(err) => CycleReport {
                token: self.token,
                completions: Vec::new(),
                unexpected: Some(err.to_string()),
            },
        }
    }
}

pub enum SelectionOutcome {
    /// No exercise selected; nothing happened.
    Ignored,
    /// Invalid input; the view shows a validation notice and no fetch ran.
    Rejected(SelectionError),
    Started(RefreshCycle),
}

impl SelectionOutcome {
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            Self::Started(cycle) => Some(cycle.token()),
            _ => None,
        }
    }

    pub fn into_cycle(self) -> Option<RefreshCycle> {
        match self {
            Self::Started(cycle) => Some(cycle),
            _ => None,
        }
    }
}

struct ControllerState {
    token: RequestToken,
    view: ViewModel,
    form: SelectionForm,
}

struct Shared {
    state: Mutex<ControllerState>,
    events: broadcast::Sender<ViewEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: ViewEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn complete(
        &self,
        token: RequestToken,
        region: Region,
        result: Result<RegionPayload, ClientError>,
    ) -> Completion {
        let mut state = self.lock();
        if state.token != token {
            debug!(%token, current = %state.token, ?region, "discarding stale result");
            self.emit(ViewEvent::StaleDiscarded {
                token,
                current: state.token,
                region,
            });
            return Completion::Stale;
        }

        let (completion, outcome) = match result {
            Ok(payload) => (Completion::Rendered, Ok(payload)),
            Err(err) => {
                warn!(%token, ?region, error = %err, "region fetch failed");
                let completion = match err.auth_failure() {
                    Some(failure) => Completion::AuthFailed(failure),
                    None => Completion::Errored,
                };
                (completion, Err(err.to_string()))
            }
        };
        if !state.view.apply(token, region, outcome) {
            debug!(%token, ?region, "region already settled for this cycle");
            return Completion::Stale;
        }

        debug!(%token, ?region, ?completion, "region applied");
        self.emit(ViewEvent::RegionApplied {
            token,
            region,
            errored: completion.is_failure(),
        });
        completion
    }

    fn finish_cycle(
        &self,
        token: RequestToken,
        completions: &[RegionCompletion],
        unexpected: bool,
    ) {
        let mut state = self.lock();
        if state.token != token {
            return;
        }
        // A rejected selection keeps the earlier cycle current; its guidance
        // outranks whatever that cycle reports.
        if let Some(PageNotice::Validation(_)) = state.view.notice() {
            debug!(%token, "validation notice kept over cycle outcome");
            return;
        }

        let auth_failure = completions.iter().find_map(|c| match c.completion {
            Completion::AuthFailed(failure) => Some(failure),
            _ => None,
        });
        let notice = if unexpected {
            PageNotice::Failure(UNEXPECTED_FAILURE_NOTICE.to_string())
        } else if let Some(failure) = auth_failure {
            PageNotice::SignedOut(failure.logout_message().to_string())
        } else if !completions.is_empty()
            && completions.iter().all(|c| c.completion.is_failure())
        {
            let exercise = state
                .view
                .selection()
                .map(|s| s.exercise().to_string())
                .unwrap_or_default();
            PageNotice::Failure(format!(
                "Unable to load data for {exercise}. Check your connection and try again."
            ))
        } else {
            return;
        };

        warn!(%token, notice = notice.message(), "refresh cycle failed");
        state.view.set_notice(notice.clone());
        self.emit(ViewEvent::Notice(notice));
    }
}

pub struct RefreshController {
    source: Arc<dyn TrendSource>,
    shared: Arc<Shared>,
    options: ControllerOptions,
}

impl RefreshController {
    pub fn new(source: Arc<dyn TrendSource>, options: ControllerOptions) -> Self {
        let (events, _) = broadcast::channel(256);
        let view = ViewModel::new(&options.regions);
        Self {
            source,
            shared: Arc::new(Shared {
                state: Mutex::new(ControllerState {
                    token: RequestToken::default(),
                    view,
                    form: SelectionForm::default(),
                }),
                events,
            }),
            options,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.shared.events.subscribe()
    }

    pub fn current_token(&self) -> RequestToken {
        self.shared.lock().token
    }

    pub fn view(&self) -> ViewModel {
        self.shared.lock().view.clone()
    }

    pub fn form(&self) -> SelectionForm {
        self.shared.lock().form.clone()
    }

    pub async fn exercises(&self, kind: ExerciseKind) -> Result<Vec<String>, ClientError> {
        self.source.exercises(kind).await
    }

    /// Applies a control change to the form and refreshes from the resulting
    /// selection. Date changes only refresh once an exercise is chosen.
    pub fn dispatch(&self, event: UiEvent) -> SelectionOutcome {
        let selection = {
            let mut state = self.shared.lock();
            let form = &mut state.form;
            match event {
                UiEvent::ExerciseChanged(exercise) => form.exercise = exercise,
                UiEvent::StartDateChanged(date) => form.start_date = date,
                UiEvent::EndDateChanged(date) => form.end_date = date,
                UiEvent::KindChanged(kind) => {
                    if form.kind != kind {
                        form.kind = kind;
                        form.exercise.clear();
                    }
                }
            }
            form.snapshot()
        };
        self.on_selection_changed(selection)
    }

    /// Entry point for a selection change. Must be called from within a tokio
    /// runtime; fetches run as spawned tasks.
    pub fn on_selection_changed(&self, selection: Selection) -> SelectionOutcome {
        if !selection.has_exercise() {
            debug!("selection without exercise ignored");
            return SelectionOutcome::Ignored;
        }

        let token = {
            let mut state = self.shared.lock();
            state.form = SelectionForm {
                kind: selection.kind,
                exercise: selection.exercise_name.clone(),
                start_date: selection.start_date,
                end_date: selection.end_date,
            };

            if let Err(err) = selection.validate() {
                info!(%selection, error = %err, "selection rejected");
                state.view.reject(&err);
                self.shared.emit(ViewEvent::SelectionRejected(err.clone()));
                return SelectionOutcome::Rejected(err);
            }

            let token = state.token.next();
            state.token = token;
            state.view.begin_cycle(token, selection.clone());
            self.shared.emit(ViewEvent::CycleStarted {
                token,
                selection: selection.clone(),
            });
            token
        };

        info!(%token, %selection, regions = self.options.regions.len(), "refresh cycle started");
        SelectionOutcome::Started(RefreshCycle {
            token,
            handle: self.spawn_cycle(token, Arc::new(selection)),
        })
    }

    fn spawn_cycle(
        &self,
        token: RequestToken,
        selection: Arc<Selection>,
    ) -> JoinHandle<CycleReport> {
        let tasks: Vec<(Region, JoinHandle<Completion>)> = self
            .options
            .regions
            .iter()
            .map(|&region| {
                let source = Arc::clone(&self.source);
                let shared = Arc::clone(&self.shared);
                let selection = Arc::clone(&selection);
                let timeout = self.options.fetch_timeout;
                let handle = tokio::spawn(async move {
                    let result = fetch_region(source.as_ref(), region, &selection, timeout).await;
                    shared.complete(token, region, result)
                });
                (region, handle)
            })
            .collect();

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let (regions, handles): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
            let joined = futures::future::join_all(handles).await;

            let mut completions = Vec::with_capacity(regions.len());
            let mut unexpected = None;
            for (region, outcome) in regions.into_iter().zip(joined) {
                let completion = match outcome {
                    Ok(completion) => completion,
                    Err(err) => {
                        error!(%token, ?region, error = %err, "region task aborted");
                        let message = format!("unexpected failure: {err}");
                        unexpected.get_or_insert(err.to_string());
                        let failure = ClientError::Rejected(message);
                        shared.complete(token, region, Err(failure))
                    }
                };
                completions.push(RegionCompletion { region, completion });
            }

            shared.finish_cycle(token, &completions, unexpected.is_some());
            CycleReport {
                token,
                completions,
                unexpected,
            }
        })
    }
}

async fn fetch_region(
    source: &dyn TrendSource,
    region: Region,
    selection: &Selection,
    timeout: Option<Duration>,
) -> Result<RegionPayload, ClientError> {
    let fetch = async {
        match region {
            Region::Trend => source.trend(selection).await.map(RegionPayload::Trend),
            Region::PersonalRecords => source
                .personal_records(selection)
                .await
                .map(RegionPayload::PersonalRecords),
            Region::Sessions => source
                .sessions(selection)
                .await
                .map(RegionPayload::Sessions),
            Region::Insight => source.insight(selection).await.map(RegionPayload::Insight),
            Region::Goals => source.goals(selection).await.map(RegionPayload::Goals),
        }
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .map_err(|_| ClientError::TimedOut(limit))?,
        None => fetch.await,
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
