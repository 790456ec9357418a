use std::time::Duration;

use shared::error::{ApiError, ErrorCode};

use crate::auth::AuthFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no access token available; log in to continue")]
    MissingCredential,
    #[error("session expired while requesting {url}")]
    Unauthorized { url: String },
    #[error("HTTP {status} - {}", .error.message)]
    Status { status: u16, error: ApiError },
    #[error("request rejected by server: {0}")]
    Rejected(String),
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error("request timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            error: ApiError::from_response(status, body),
        }
    }

    /// Auth failures are handed to the credential store, which owns the
    /// logout flow.
    pub fn auth_failure(&self) -> Option<AuthFailure> {
        match self {
            Self::MissingCredential => Some(AuthFailure::MissingCredential),
            Self::Unauthorized { .. } => Some(AuthFailure::SessionExpired),
            Self::Status { error, .. } if error.code == ErrorCode::Unauthorized => {
                Some(AuthFailure::SessionExpired)
            }
            _ => None,
        }
    }
}
