//! Bearer credential holder consulted by [`crate::api::ApiClient`] on every request.

use std::sync::{Mutex, MutexGuard};

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingCredential,
    SessionExpired,
}

impl AuthFailure {
    pub fn logout_message(self) -> &'static str {
        match self {
            Self::MissingCredential => "You need to log in to continue.",
            Self::SessionExpired => "Your session expired. Please log in again.",
        }
    }
}

pub trait CredentialStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn clear(&self);
    /// Called before the failing request's error is returned. Implementations
    /// send the user to their login flow.
    fn on_auth_failure(&self, failure: AuthFailure);
}

#[derive(Default)]
struct CredentialState {
    token: Option<String>,
    logout_message: Option<&'static str>,
}

#[derive(Default)]
pub struct MemoryCredentials {
    state: Mutex<CredentialState>,
}

impl MemoryCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self {
            state: Mutex::new(CredentialState {
                token: token.filter(|t| !t.trim().is_empty()),
                logout_message: None,
            }),
        }
    }

    /// Message left behind by the most recent auth failure, shown on the
    /// login screen.
    pub fn logout_message(&self) -> Option<&'static str> {
        self.lock().logout_message
    }

    fn lock(&self) -> MutexGuard<'_, CredentialState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentials {
    fn access_token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    fn clear(&self) {
        self.lock().token = None;
    }

    fn on_auth_failure(&self, failure: AuthFailure) {
        warn!(?failure, "authentication required");
        if failure == AuthFailure::SessionExpired {
            self.clear();
        }
        self.lock().logout_message = Some(failure.logout_message());
    }
}
