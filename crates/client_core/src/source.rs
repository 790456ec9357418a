use async_trait::async_trait;
use shared::{
    domain::{ExerciseKind, Selection},
    protocol::{Goal, Insight, PersonalRecord, SessionDetail, TrendSeries},
};

use crate::{api::ApiClient, error::ClientError};

/// Data the refresh controller pulls for one selection. Each method backs one
/// view region.
#[async_trait]
pub trait TrendSource: Send + Sync {
    async fn exercises(&self, kind: ExerciseKind) -> Result<Vec<String>, ClientError>;
    async fn trend(&self, selection: &Selection) -> Result<TrendSeries, ClientError>;
    async fn personal_records(
        &self,
        selection: &Selection,
    ) -> Result<Vec<PersonalRecord>, ClientError>;
    async fn sessions(&self, selection: &Selection) -> Result<Vec<SessionDetail>, ClientError>;
    async fn insight(&self, selection: &Selection) -> Result<Insight, ClientError>;
    async fn goals(&self, selection: &Selection) -> Result<Vec<Goal>, ClientError>;
}

#[async_trait]
impl TrendSource for ApiClient {
    async fn exercises(&self, kind: ExerciseKind) -> Result<Vec<String>, ClientError> {
        ApiClient::exercises(self, kind).await
    }

    async fn trend(&self, selection: &Selection) -> Result<TrendSeries, ClientError> {
        match selection.kind {
            ExerciseKind::Strength => self
                .strength_trend(selection)
                .await
                .map(TrendSeries::Strength),
            ExerciseKind::Cardio => self
                .cardio_progress(selection)
                .await
                .map(TrendSeries::Cardio),
        }
    }

    async fn personal_records(
        &self,
        selection: &Selection,
    ) -> Result<Vec<PersonalRecord>, ClientError> {
        ApiClient::personal_records(self, selection).await
    }

    async fn sessions(&self, selection: &Selection) -> Result<Vec<SessionDetail>, ClientError> {
        ApiClient::sessions(self, selection).await
    }

    async fn insight(&self, selection: &Selection) -> Result<Insight, ClientError> {
        match selection.kind {
            ExerciseKind::Strength => self.strength_insight(selection).await.map(Insight::Strength),
            ExerciseKind::Cardio => self.cardio_insight(selection).await.map(Insight::Cardio),
        }
    }

    async fn goals(&self, selection: &Selection) -> Result<Vec<Goal>, ClientError> {
        self.goals_with_progress(selection).await
    }
}
