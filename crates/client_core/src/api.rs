//! HTTP client for the workout API. Every request carries the bearer token
//! from the [`CredentialStore`]; a 401 or a missing token is reported to the
//! store before the error propagates.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ExerciseKind, Selection},
    protocol::{
        parse_api_date, CardioInsight, CardioProgressPoint, Goal, IntensityPoint, OneRepMaxPoint,
        PersonalRecord, PersonalRecordsResponse, SessionDetail, StrengthInsight, StrengthTrend,
        VolumePoint,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    auth::{AuthFailure, CredentialStore},
    error::ClientError,
};

pub struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(
        server_url: &str,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        Self::with_http_client(Client::new(), server_url, credentials)
    }

    pub fn with_http_client(
        http: Client,
        server_url: &str,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(server_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        what: &'static str,
    ) -> Result<T, ClientError> {
        let Some(token) = self.credentials.access_token() else {
            self.credentials.on_auth_failure(AuthFailure::MissingCredential);
            return Err(ClientError::MissingCredential);
        };

        debug!(%url, what, "GET");
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(%url, "401 Unauthorized");
            self.credentials.on_auth_failure(AuthFailure::SessionExpired);
            return Err(ClientError::Unauthorized {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status.as_u16(), &body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode { what, source })
    }

    pub async fn exercises(&self, kind: ExerciseKind) -> Result<Vec<String>, ClientError> {
        let url = self.endpoint(&["api", "exercises", kind.as_str()]);
        self.get_json(url, &[], "exercise list").await
    }

    pub async fn one_rep_max_trend(
        &self,
        selection: &Selection,
    ) -> Result<Vec<OneRepMaxPoint>, ClientError> {
        let url = self.endpoint(&[
            "api",
            "exercise-data",
            "strength",
            "1rm-trend",
            selection.exercise(),
        ]);
        self.get_json(url, &selection.date_params(), "1RM trend").await
    }

    pub async fn volume_trend(
        &self,
        selection: &Selection,
    ) -> Result<Vec<VolumePoint>, ClientError> {
        let url = self.endpoint(&[
            "api",
            "exercise-data",
            "strength",
            "volume-trend",
            selection.exercise(),
        ]);
        self.get_json(url, &selection.date_params(), "volume trend").await
    }

    pub async fn intensity_trend(
        &self,
        selection: &Selection,
    ) -> Result<Vec<IntensityPoint>, ClientError> {
        let url = self.endpoint(&[
            "api",
            "exercise-data",
            "strength",
            "relative-intensity",
            selection.exercise(),
        ]);
        self.get_json(url, &selection.date_params(), "intensity trend").await
    }

    /// The three strength series, requested concurrently. Any failure fails
    /// the whole trend.
    pub async fn strength_trend(
        &self,
        selection: &Selection,
    ) -> Result<StrengthTrend, ClientError> {
        let (one_rep_max, volume, intensity) = tokio::try_join!(
            self.one_rep_max_trend(selection),
            self.volume_trend(selection),
            self.intensity_trend(selection),
        )?;
        Ok(StrengthTrend {
            one_rep_max,
            volume,
            intensity,
        })
    }

    /// The progress endpoint does not filter by date, so the window is
    /// applied here. Points with unparseable dates are kept.
    pub async fn cardio_progress(
        &self,
        selection: &Selection,
    ) -> Result<Vec<CardioProgressPoint>, ClientError> {
        let url = self.endpoint(&["api", "progress", "cardio", selection.exercise()]);
        let mut points: Vec<CardioProgressPoint> = self
            .get_json(url, &selection.date_params(), "cardio progress")
            .await?;
        points.retain(|point| match parse_api_date(&point.date) {
            Some(date) => {
                selection.start_date.map_or(true, |start| date >= start)
                    && selection.end_date.map_or(true, |end| date <= end)
            }
            None => true,
        });
        Ok(points)
    }

    pub async fn personal_records(
        &self,
        selection: &Selection,
    ) -> Result<Vec<PersonalRecord>, ClientError> {
        let url = self.endpoint(&[
            "api",
            "personal-records",
            "by-exercise",
            selection.exercise(),
        ]);
        let body: PersonalRecordsResponse = self
            .get_json(url, &selection.date_params(), "personal records")
            .await?;
        if !body.success {
            return Err(ClientError::Rejected(
                body.error
                    .unwrap_or_else(|| "personal records unavailable".to_string()),
            ));
        }
        Ok(body.personal_records)
    }

    pub async fn sessions(&self, selection: &Selection) -> Result<Vec<SessionDetail>, ClientError> {
        let url = self.endpoint(&["api", "sessions", "by-exercise"]);
        let mut query = vec![("exercise", selection.exercise().to_string())];
        query.extend(selection.date_params());
        self.get_json(url, &query, "session list").await
    }

    pub async fn strength_insight(
        &self,
        selection: &Selection,
    ) -> Result<StrengthInsight, ClientError> {
        let url = self.endpoint(&[
            "api",
            "exercise-data",
            "strength",
            "ai-insights",
            selection.exercise(),
        ]);
        let insight: Option<StrengthInsight> = self
            .get_json(url, &selection.date_params(), "strength insight")
            .await?;
        Ok(insight.unwrap_or_default())
    }

    pub async fn cardio_insight(
        &self,
        selection: &Selection,
    ) -> Result<CardioInsight, ClientError> {
        let url = self.endpoint(&[
            "api",
            "exercise-data",
            "cardio",
            "ai-insights",
            selection.exercise(),
        ]);
        let insight: Option<CardioInsight> = self
            .get_json(url, &selection.date_params(), "cardio insight")
            .await?;
        Ok(insight.unwrap_or_default())
    }

    pub async fn goals_with_progress(
        &self,
        selection: &Selection,
    ) -> Result<Vec<Goal>, ClientError> {
        let url = self.endpoint(&["api", "goals", "with-progress"]);
        self.get_json(
            url,
            &[("exercise", selection.exercise().to_string())],
            "goal list",
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
