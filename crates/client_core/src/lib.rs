//! Client core for the workout trends view: the authenticated HTTP client,
//! the per-region view model and the stale-safe refresh controller.

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod render;
pub mod source;
pub mod view;

pub use api::ApiClient;
pub use auth::{AuthFailure, CredentialStore, MemoryCredentials};
pub use config::{load_settings, ClientSettings};
pub use controller::{
    Completion, ControllerOptions, CycleReport, RefreshController, RefreshCycle, SelectionForm,
    SelectionOutcome,
};
pub use error::ClientError;
pub use events::{UiEvent, ViewEvent};
pub use source::TrendSource;
pub use view::{PageNotice, Region, RegionPayload, RegionState, ViewModel};
